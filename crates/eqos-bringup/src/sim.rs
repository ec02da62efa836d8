//! Simulated platform and register bank.
//!
//! Everything the bring-up sequencing touches — the register window, the
//! interrupt line, the DMA subsystem — exists here as an in-memory model, so
//! the whole forward/teardown path runs in CI without silicon. The bank
//! models the one piece of hardware behaviour the sequencer depends on: the
//! software-reset bit self-clearing after a programmable number of polls.
//!
//! Fresh banks read back the databook reset values, including the all-ones
//! address-0 pair of an unprogrammed part.

use crate::dma::DmaProfile;
use crate::error::{EqosError, Result};
use crate::platform::{DmaEnabler, InterruptHandle, Platform};
use crate::regbank::RegisterBank;
use eqos_mac::regs::{
    DMA_MODE, DMA_SYSBUS_MODE, MAC_ADDRESS_COUNT, MAC_HW_FEATURE0, MAC_HW_FEATURE1,
    MAC_HW_FEATURE2, MAC_HW_FEATURE3, MAC_ONE_US_TIC_COUNTER, MAC_VERSION,
    REGISTER_WINDOW_SIZE, dma_mode, mac_address_high, mac_address_low,
};
use eqos_mac::MacAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// How the simulated reset bit behaves after a software-reset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetBehavior {
    /// The bit reads clear on the `n`-th poll after the request.
    ClearAfter(u32),
    /// The bit never clears; the sequencer must time out.
    NeverClears,
}

#[derive(Debug)]
struct SimBankInner {
    words: Vec<u32>,
    reset_behavior: ResetBehavior,
    reset_armed: bool,
    dma_mode_polls: u32,
}

/// In-memory register bank with databook reset values.
///
/// Cloning yields another handle to the same bank, which is how tests keep
/// visibility into a window the platform handed to the controller.
#[derive(Debug, Clone)]
pub struct SimBank {
    inner: Arc<Mutex<SimBankInner>>,
}

impl SimBank {
    /// Bank holding the databook reset values.
    #[must_use]
    pub fn new() -> Self {
        let mut words = vec![0u32; REGISTER_WINDOW_SIZE / 4];
        words[MAC_VERSION / 4] = 0x3051;
        words[MAC_HW_FEATURE0 / 4] = 0x1811_73F3;
        words[MAC_HW_FEATURE1 / 4] = 0x111E_01E8;
        words[MAC_HW_FEATURE2 / 4] = 0x1104_1041;
        words[MAC_HW_FEATURE3 / 4] = 0x0C37_0031;
        words[DMA_SYSBUS_MODE / 4] = 0x0001_0000;
        words[MAC_ONE_US_TIC_COUNTER / 4] = 0x3F;
        for index in 0..MAC_ADDRESS_COUNT {
            words[mac_address_high(index) / 4] = 0xFFFF;
            words[mac_address_low(index) / 4] = 0xFFFF_FFFF;
        }

        Self {
            inner: Arc::new(Mutex::new(SimBankInner {
                words,
                reset_behavior: ResetBehavior::ClearAfter(1),
                reset_armed: false,
                dma_mode_polls: 0,
            })),
        }
    }

    /// Raw word at `offset`, without reset-bit modelling.
    #[must_use]
    pub fn word(&self, offset: usize) -> u32 {
        self.inner.lock().expect("bank poisoned").words[offset / 4]
    }

    /// Overwrite the word at `offset`.
    pub fn set_word(&self, offset: usize, value: u32) {
        self.inner.lock().expect("bank poisoned").words[offset / 4] = value;
    }

    /// Program station address `index` as if burned in by the factory.
    pub fn set_station_address(&self, index: usize, addr: MacAddr) {
        let (high, low) = addr.to_register_pair();
        self.set_word(mac_address_high(index), high);
        self.set_word(mac_address_low(index), low);
    }

    /// Station address `index` as currently held in the bank.
    #[must_use]
    pub fn station_address(&self, index: usize) -> MacAddr {
        MacAddr::from_register_pair(
            self.word(mac_address_high(index)),
            self.word(mac_address_low(index)),
        )
    }

    /// Choose how the reset bit behaves from the next request on.
    pub fn set_reset_behavior(&self, behavior: ResetBehavior) {
        self.inner.lock().expect("bank poisoned").reset_behavior = behavior;
    }

    /// Number of `DMA_Mode` polls observed since the last reset request.
    #[must_use]
    pub fn dma_mode_polls(&self) -> u32 {
        self.inner.lock().expect("bank poisoned").dma_mode_polls
    }
}

impl Default for SimBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank for SimBank {
    fn read32(&self, offset: usize) -> u32 {
        let mut inner = self.inner.lock().expect("bank poisoned");
        if offset == DMA_MODE && inner.reset_armed {
            inner.dma_mode_polls += 1;
            if let ResetBehavior::ClearAfter(n) = inner.reset_behavior {
                if inner.dma_mode_polls >= n {
                    inner.words[DMA_MODE / 4] &= !dma_mode::SWR;
                    inner.reset_armed = false;
                }
            }
        }
        inner.words[offset / 4]
    }

    fn write32(&self, offset: usize, value: u32) {
        let mut inner = self.inner.lock().expect("bank poisoned");
        if offset == DMA_MODE && value & dma_mode::SWR != 0 {
            inner.reset_armed = true;
            inner.dma_mode_polls = 0;
        }
        inner.words[offset / 4] = value;
    }

    fn size(&self) -> usize {
        REGISTER_WINDOW_SIZE
    }
}

#[derive(Debug, Default)]
struct SimShared {
    mapped_windows: Mutex<Vec<(u64, u64)>>,
    active_windows: AtomicU32,
    interrupts: Mutex<Vec<(u32, u64)>>,
    dma_created: AtomicU32,
    dma_destroyed: AtomicU32,
    fail_window_map: AtomicBool,
    fail_interrupt: AtomicBool,
    fail_dma_create: AtomicBool,
    fail_dma_destroy: AtomicBool,
}

/// Simulated host platform over one [`SimBank`].
///
/// Records every mapping, interrupt connection, and DMA enabler operation so
/// tests can assert that teardown released exactly what was acquired, and
/// injects failures at each acquisition point.
#[derive(Debug, Clone)]
pub struct SimPlatform {
    bank: SimBank,
    shared: Arc<SimShared>,
}

impl SimPlatform {
    /// Platform over a fresh bank with databook reset values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bank: SimBank::new(),
            shared: Arc::new(SimShared::default()),
        }
    }

    /// Handle to the simulated register bank.
    #[must_use]
    pub fn bank(&self) -> SimBank {
        self.bank.clone()
    }

    /// Every `(start, length)` window mapping requested so far.
    #[must_use]
    pub fn mapped_windows(&self) -> Vec<(u64, u64)> {
        self.shared
            .mapped_windows
            .lock()
            .expect("platform poisoned")
            .clone()
    }

    /// Number of windows currently mapped (mapped minus unmapped).
    #[must_use]
    pub fn active_window_count(&self) -> u32 {
        self.shared.active_windows.load(Ordering::SeqCst)
    }

    /// Every `(vector, affinity)` interrupt connection so far.
    #[must_use]
    pub fn interrupts(&self) -> Vec<(u32, u64)> {
        self.shared
            .interrupts
            .lock()
            .expect("platform poisoned")
            .clone()
    }

    /// DMA enablers created so far.
    #[must_use]
    pub fn dma_created(&self) -> u32 {
        self.shared.dma_created.load(Ordering::SeqCst)
    }

    /// DMA enablers destroyed so far.
    #[must_use]
    pub fn dma_destroyed(&self) -> u32 {
        self.shared.dma_destroyed.load(Ordering::SeqCst)
    }

    /// Fail every window mapping from now on.
    pub fn inject_map_failure(&self) {
        self.shared.fail_window_map.store(true, Ordering::SeqCst);
    }

    /// Fail every interrupt connection from now on.
    pub fn inject_interrupt_failure(&self) {
        self.shared.fail_interrupt.store(true, Ordering::SeqCst);
    }

    /// Fail every DMA enabler creation from now on.
    pub fn inject_dma_failure(&self) {
        self.shared.fail_dma_create.store(true, Ordering::SeqCst);
    }

    /// Fail every DMA enabler destruction from now on (cleanup-error path).
    pub fn inject_dma_destroy_failure(&self) {
        self.shared.fail_dma_destroy.store(true, Ordering::SeqCst);
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Window handle returned by [`SimPlatform`]; tracks unmapping on drop.
#[derive(Debug)]
struct SimWindow {
    bank: SimBank,
    shared: Arc<SimShared>,
}

impl RegisterBank for SimWindow {
    fn read32(&self, offset: usize) -> u32 {
        self.bank.read32(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        self.bank.write32(offset, value);
    }

    fn size(&self) -> usize {
        self.bank.size()
    }
}

impl Drop for SimWindow {
    fn drop(&mut self) {
        self.shared.active_windows.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Platform for SimPlatform {
    fn map_register_window(&self, start: u64, length: u64) -> Result<Box<dyn RegisterBank>> {
        if self.shared.fail_window_map.load(Ordering::SeqCst) {
            return Err(EqosError::resource_exhausted(
                "simulated mapping failure",
            ));
        }
        self.shared
            .mapped_windows
            .lock()
            .expect("platform poisoned")
            .push((start, length));
        self.shared.active_windows.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimWindow {
            bank: self.bank.clone(),
            shared: Arc::clone(&self.shared),
        }))
    }

    fn connect_interrupt(&self, vector: u32, affinity: u64) -> Result<InterruptHandle> {
        if self.shared.fail_interrupt.load(Ordering::SeqCst) {
            return Err(EqosError::resource_exhausted(
                "simulated interrupt-object failure",
            ));
        }
        self.shared
            .interrupts
            .lock()
            .expect("platform poisoned")
            .push((vector, affinity));
        Ok(InterruptHandle::new(vector, affinity))
    }

    fn create_dma_enabler(
        &self,
        profile: DmaProfile,
        max_transfer_len: u32,
    ) -> Result<DmaEnabler> {
        if self.shared.fail_dma_create.load(Ordering::SeqCst) {
            return Err(EqosError::resource_exhausted(
                "simulated DMA-enabler failure",
            ));
        }
        self.shared.dma_created.fetch_add(1, Ordering::SeqCst);
        Ok(DmaEnabler::new(profile, max_transfer_len))
    }

    fn destroy_dma_enabler(&self, _enabler: DmaEnabler) -> Result<()> {
        if self.shared.fail_dma_destroy.load(Ordering::SeqCst) {
            return Err(EqosError::resource_exhausted(
                "simulated DMA-destroy failure",
            ));
        }
        self.shared.dma_destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_bank_reads_databook_defaults() {
        let bank = SimBank::new();
        assert_eq!(bank.word(MAC_VERSION), 0x3051);
        assert_eq!(bank.word(MAC_HW_FEATURE0), 0x1811_73F3);
        assert!(bank.station_address(0).is_broadcast());
    }

    #[test]
    fn reset_bit_clears_on_the_programmed_poll() {
        let bank = SimBank::new();
        bank.set_reset_behavior(ResetBehavior::ClearAfter(3));
        bank.write32(DMA_MODE, dma_mode::SWR);

        assert_ne!(bank.read32(DMA_MODE) & dma_mode::SWR, 0); // poll 1
        assert_ne!(bank.read32(DMA_MODE) & dma_mode::SWR, 0); // poll 2
        assert_eq!(bank.read32(DMA_MODE) & dma_mode::SWR, 0); // poll 3
        assert_eq!(bank.dma_mode_polls(), 3);
    }

    #[test]
    fn window_handles_track_unmapping() {
        let platform = SimPlatform::new();
        let window = platform.map_register_window(0x4000, 0x1200).unwrap();
        assert_eq!(platform.active_window_count(), 1);
        drop(window);
        assert_eq!(platform.active_window_count(), 0);
    }
}
