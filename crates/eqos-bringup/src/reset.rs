//! Software reset and bus tuning.
//!
//! The reset-request bit self-clears when the engine finishes. This code
//! runs where indefinite blocking is disallowed, so completion is awaited
//! with a bounded busy poll: a fixed per-iteration delay and a fixed
//! iteration budget give a deterministic worst-case latency and turn a
//! non-responsive part into a reportable `Timeout` instead of a hang.
//!
//! The tuning writes that follow assume default register contents restored
//! by the completed reset, which is why their order is fixed.

use crate::dma::DmaProfile;
use crate::error::{EqosError, Result};
use crate::regbank::RegisterBank;
use eqos_mac::regs::{
    self, channel, channel_control, dma_mode, mmc_control, sysbus, DMA_CHANNEL_COUNT, DMA_MODE,
    DMA_SYSBUS_MODE, MAC_ONE_US_TIC_COUNTER, MAC_RX_FLOW_CTRL, MAC_TX_FLOW_CTRL, MMC_CONTROL,
};
use std::time::Duration;

/// Maximum number of completion polls per reset attempt.
pub const RESET_POLL_LIMIT: u32 = 1000;

/// Delay between completion polls.
pub const RESET_POLL_INTERVAL: Duration = Duration::from_micros(20);

/// CSR bus clock feeding the MAC, used to derive the 1 µs reference tick.
pub const CSR_CLOCK_HZ: u64 = 125_000_000;

/// Bytes of a descriptor the DMA engine actually reads.
pub const DESCRIPTOR_BYTES: usize = 16;

/// Bytes each descriptor occupies in the ring; descriptors are padded so
/// each owns a whole cache line.
pub const DESCRIPTOR_STRIDE: usize = 64;

/// Bytes per bus beat; the skip length is programmed in beats.
pub const BUS_BEAT_BYTES: usize = 8;

/// Outstanding read requests allowed on the bus master.
pub const READ_OUTSTANDING_REQUESTS: u32 = 4;

/// Outstanding write requests allowed on the bus master.
pub const WRITE_OUTSTANDING_REQUESTS: u32 = 4;

/// Descriptor skip length in bus beats: the gap the engine jumps between
/// the end of one descriptor and the start of the next.
#[must_use]
pub const fn descriptor_skip_beats() -> u32 {
    ((DESCRIPTOR_STRIDE - DESCRIPTOR_BYTES) / BUS_BEAT_BYTES) as u32
}

/// Divisor programmed into the 1 µs tick counter register.
#[must_use]
pub const fn one_us_tick_divisor() -> u32 {
    (CSR_CLOCK_HZ / 1_000_000 - 1) as u32
}

/// Issue a software reset and poll for completion.
///
/// Returns the number of polls it took. The write and every poll touch the
/// same `DMA_Mode` register; the reset bit self-clears on completion.
///
/// # Errors
///
/// Returns `Timeout` after [`RESET_POLL_LIMIT`] polls without the bit
/// clearing. The attempt is not retried here; retry is the host's decision
/// on a later arrival event.
pub fn software_reset(bank: &dyn RegisterBank) -> Result<u32> {
    bank.write32(DMA_MODE, dma_mode::SWR);

    for polls in 1..=RESET_POLL_LIMIT {
        if bank.read32(DMA_MODE) & dma_mode::SWR == 0 {
            tracing::debug!("software reset complete after {polls} poll(s)");
            return Ok(polls);
        }
        std::thread::sleep(RESET_POLL_INTERVAL);
    }

    Err(EqosError::Timeout {
        operation: "software reset".into(),
        polls: RESET_POLL_LIMIT,
    })
}

/// Program bus arbitration and timing into known-good defaults.
///
/// Must run only after a completed reset: every write assumes the register
/// contents the reset restored.
pub fn tune_bus(bank: &dyn RegisterBank, profile: &DmaProfile) {
    // Descriptor ring geometry, so the engine can walk contiguous,
    // beat-aligned descriptor arrays on every channel.
    let skip = channel_control::descriptor_skip(descriptor_skip_beats());
    for index in 0..DMA_CHANNEL_COUNT {
        let offset = regs::dma_channel(index, channel::CONTROL);
        let control = bank.read32(offset) & !(channel_control::DSL_MASK << channel_control::DSL_SHIFT);
        bank.write32(offset, control | skip);
    }

    // Bus-master arbitration: fixed bursts, conservative outstanding limits,
    // wide addressing only when the negotiated profile needs it.
    let mut bus = sysbus::FB
        | sysbus::BLEN4
        | sysbus::BLEN8
        | sysbus::BLEN16
        | sysbus::read_outstanding_limit(READ_OUTSTANDING_REQUESTS)
        | sysbus::write_outstanding_limit(WRITE_OUTSTANDING_REQUESTS);
    if profile.needs_wide_addressing() {
        bus |= sysbus::EAME;
    }
    bank.write32(DMA_SYSBUS_MODE, bus);

    // Reference tick, so on-chip 1 µs timers count actual microseconds.
    bank.write32(MAC_ONE_US_TIC_COUNTER, one_us_tick_divisor());

    // Statistics counters cleared and frozen; flow control off.
    bank.write32(
        MMC_CONTROL,
        mmc_control::COUNTER_RESET | mmc_control::COUNTER_FREEZE,
    );
    bank.write32(MAC_TX_FLOW_CTRL, 0);
    bank.write32(MAC_RX_FLOW_CTRL, 0);

    tracing::debug!(
        "bus tuned: skip {} beats, tick divisor {}, osr {}r/{}w",
        descriptor_skip_beats(),
        one_us_tick_divisor(),
        READ_OUTSTANDING_REQUESTS,
        WRITE_OUTSTANDING_REQUESTS
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma;
    use crate::sim::{ResetBehavior, SimBank};
    use eqos_mac::AddressWidthClass;

    #[test]
    fn derived_constants() {
        assert_eq!(descriptor_skip_beats(), 6);
        assert_eq!(one_us_tick_divisor(), 124);
    }

    #[test]
    fn reset_counts_polls_exactly() {
        let bank = SimBank::new();
        bank.set_reset_behavior(ResetBehavior::ClearAfter(5));
        assert_eq!(software_reset(&bank).unwrap(), 5);
        assert_eq!(bank.dma_mode_polls(), 5);
    }

    #[test]
    fn reset_immediate_completion_is_one_poll() {
        let bank = SimBank::new();
        bank.set_reset_behavior(ResetBehavior::ClearAfter(1));
        assert_eq!(software_reset(&bank).unwrap(), 1);
    }

    #[test]
    fn reset_exhausts_exactly_the_budget() {
        let bank = SimBank::new();
        bank.set_reset_behavior(ResetBehavior::NeverClears);
        let err = software_reset(&bank).unwrap_err();
        assert!(matches!(
            err,
            EqosError::Timeout {
                polls: RESET_POLL_LIMIT,
                ..
            }
        ));
        assert_eq!(bank.dma_mode_polls(), RESET_POLL_LIMIT);
    }

    #[test]
    fn tuning_programs_the_documented_registers() {
        let bank = SimBank::new();
        let profile = dma::negotiate(AddressWidthClass::Bits40).unwrap();
        tune_bus(&bank, &profile);

        let ch0 = bank.word(regs::dma_channel(0, channel::CONTROL));
        assert_eq!(
            (ch0 >> channel_control::DSL_SHIFT) & channel_control::DSL_MASK,
            6
        );

        let bus = bank.word(DMA_SYSBUS_MODE);
        assert_ne!(bus & sysbus::FB, 0);
        assert_ne!(bus & sysbus::EAME, 0, "40-bit profile enables wide addressing");
        assert_eq!((bus >> sysbus::RD_OSR_LMT_SHIFT) & sysbus::OSR_LMT_MASK, 3);
        assert_eq!((bus >> sysbus::WR_OSR_LMT_SHIFT) & sysbus::OSR_LMT_MASK, 3);

        assert_eq!(bank.word(MAC_ONE_US_TIC_COUNTER), 124);
        assert_eq!(
            bank.word(MMC_CONTROL),
            mmc_control::COUNTER_RESET | mmc_control::COUNTER_FREEZE
        );
        assert_eq!(bank.word(MAC_TX_FLOW_CTRL), 0);
        assert_eq!(bank.word(MAC_RX_FLOW_CTRL), 0);
    }

    #[test]
    fn narrow_profile_leaves_wide_addressing_off() {
        let bank = SimBank::new();
        let profile = dma::negotiate(AddressWidthClass::Bits32).unwrap();
        tune_bus(&bank, &profile);
        assert_eq!(bank.word(DMA_SYSBUS_MODE) & sysbus::EAME, 0);
    }
}
