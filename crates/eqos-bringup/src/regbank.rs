//! Width-safe, ordering-safe register access.
//!
//! All hardware state is reached through [`RegisterBank`]: 32-bit volatile
//! accesses at checked offsets, no caching, no reordering. The same bring-up
//! logic runs against [`MappedWindow`] (real device memory) and against the
//! in-memory bank of [`crate::sim`], which is what makes the sequencing
//! testable without silicon.

use crate::error::{EqosError, Result};
use eqos_mac::regs::{self, REGISTER_WINDOW_SIZE};
use eqos_mac::MacAddr;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::File;
use std::os::unix::io::AsFd;
use std::ptr::NonNull;

/// A register window: 32-bit words at fixed byte offsets.
///
/// Offsets must be 4-byte aligned and inside the window; implementations
/// panic otherwise, as an out-of-window access is a programming error rather
/// than a runtime condition.
pub trait RegisterBank: Send {
    /// Read the 32-bit register at `offset`.
    fn read32(&self, offset: usize) -> u32;

    /// Write the 32-bit register at `offset`.
    fn write32(&self, offset: usize, value: u32);

    /// Window size in bytes.
    fn size(&self) -> usize;
}

/// Read station address `index` from its High16/Low32 register pair.
pub fn read_station_address(bank: &dyn RegisterBank, index: usize) -> MacAddr {
    let high = bank.read32(regs::mac_address_high(index));
    let low = bank.read32(regs::mac_address_low(index));
    MacAddr::from_register_pair(high, low)
}

/// Write station address `index` into its High16/Low32 register pair.
/// The two registers are written separately; the hardware latches the
/// address when the low word lands.
pub fn write_station_address(bank: &dyn RegisterBank, index: usize, addr: MacAddr) {
    let (high, low) = addr.to_register_pair();
    bank.write32(regs::mac_address_high(index), high);
    bank.write32(regs::mac_address_low(index), low);
}

/// Register window mapped over real device memory.
///
/// Accesses are volatile so the compiler neither caches nor reorders them.
/// The mapping is non-cached device memory owned exclusively by the
/// lifecycle controller; it is unmapped when this value drops.
#[derive(Debug)]
pub struct MappedWindow {
    ptr: NonNull<u8>,
    len: usize,
    _file: File,
}

// SAFETY: Send - MappedWindow owns its mapping exclusively. Moving it between
// threads does not invalidate the mapping (mmap'd memory is process-wide).
unsafe impl Send for MappedWindow {}

impl MappedWindow {
    /// Map `length` bytes of the device starting at byte `offset` of `file`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `length` cannot hold the register
    /// window, or `ResourceExhausted` if the mapping itself fails.
    pub fn map_file(file: File, offset: u64, length: usize) -> Result<Self> {
        if length < REGISTER_WINDOW_SIZE {
            return Err(EqosError::configuration(format!(
                "register window needs {REGISTER_WINDOW_SIZE:#x} bytes, resource has {length:#x}"
            )));
        }

        // SAFETY: mmap necessary for MMIO - maps the register window into the
        // process address space. Invariants: (1) file is open read/write;
        // (2) length validated non-zero above; (3) SHARED mapping so device
        // writes are visible; (4) ptr valid for length bytes or Err.
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                length,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                offset,
            )
            .map_err(|e| {
                EqosError::resource_exhausted(format!(
                    "cannot map register window at {offset:#x}: {e}"
                ))
            })?
        };

        let ptr = NonNull::new(ptr.cast::<u8>()).ok_or_else(|| {
            EqosError::resource_exhausted("register window mapped at null address")
        })?;

        tracing::debug!("mapped register window at {ptr:p}, {length:#x} bytes");

        Ok(Self {
            ptr,
            len: length,
            _file: file,
        })
    }
}

impl RegisterBank for MappedWindow {
    fn read32(&self, offset: usize) -> u32 {
        assert!(offset + 4 <= self.len, "register offset out of window");
        assert!(offset % 4 == 0, "register offset unaligned");
        // SAFETY: read_volatile necessary for MMIO - hardware can change the
        // value. Invariants: (1) ptr from mmap in map_file, valid for len;
        // (2) offset+4 <= len and 4-byte aligned (asserted above).
        unsafe { std::ptr::read_volatile(self.ptr.as_ptr().add(offset).cast::<u32>()) }
    }

    fn write32(&self, offset: usize, value: u32) {
        assert!(offset + 4 <= self.len, "register offset out of window");
        assert!(offset % 4 == 0, "register offset unaligned");
        // SAFETY: write_volatile necessary for MMIO - triggers hardware side
        // effects. Invariants: (1) ptr from mmap; (2) offset+4 <= len and
        // 4-byte aligned (asserted above).
        unsafe {
            std::ptr::write_volatile(self.ptr.as_ptr().add(offset).cast::<u32>(), value);
        }
    }

    fn size(&self) -> usize {
        self.len
    }
}

impl Drop for MappedWindow {
    fn drop(&mut self) {
        // SAFETY: munmap with the exact ptr/len returned by mmap in map_file.
        // Drop runs at most once and no other references to the mapping exist.
        unsafe {
            let _ = munmap(self.ptr.as_ptr().cast(), self.len);
        }
        tracing::debug!("unmapped register window");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBank;
    use eqos_mac::regs;

    #[test]
    fn station_address_pair_codec() {
        let bank = SimBank::new();
        let addr = MacAddr::new([0x00, 0x23, 0x45, 0x67, 0x89, 0xAB]);

        write_station_address(&bank, 0, addr);
        assert_eq!(bank.word(regs::mac_address_high(0)), 0xAB89);
        assert_eq!(bank.word(regs::mac_address_low(0)), 0x6745_2300);
        assert_eq!(read_station_address(&bank, 0), addr);
    }
}
