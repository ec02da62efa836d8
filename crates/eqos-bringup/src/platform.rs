//! Platform capability seam.
//!
//! The host platform owns physical memory, interrupt routing, and the DMA
//! subsystem. Bring-up reaches all three through [`Platform`] so the same
//! sequencing runs against real hardware ([`DevMemPlatform`]) and against
//! the simulated platform in [`crate::sim`].

use crate::dma::DmaProfile;
use crate::error::{EqosError, Result};
use crate::regbank::{MappedWindow, RegisterBank};
use std::fs::OpenOptions;
use std::path::PathBuf;

/// Handle to a host interrupt object associated with the device.
///
/// The handle is a token: arming and servicing the interrupt belong to the
/// datapath stages, and final disconnection belongs to the host's own
/// cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptHandle {
    vector: u32,
    affinity: u64,
}

impl InterruptHandle {
    /// Build a handle for a connected interrupt line.
    #[must_use]
    pub const fn new(vector: u32, affinity: u64) -> Self {
        Self { vector, affinity }
    }

    /// Interrupt vector number.
    #[must_use]
    pub const fn vector(&self) -> u32 {
        self.vector
    }

    /// Processor affinity mask.
    #[must_use]
    pub const fn affinity(&self) -> u64 {
        self.affinity
    }
}

/// Handle to a platform DMA enabler: the scatter/gather-capable DMA resource
/// the (out-of-scope) queue stages allocate descriptor rings and buffers
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaEnabler {
    profile: DmaProfile,
    max_transfer_len: u32,
}

impl DmaEnabler {
    /// Build a handle for a created DMA enabler.
    #[must_use]
    pub const fn new(profile: DmaProfile, max_transfer_len: u32) -> Self {
        Self {
            profile,
            max_transfer_len,
        }
    }

    /// The negotiated addressing profile the enabler was created with.
    #[must_use]
    pub const fn profile(&self) -> DmaProfile {
        self.profile
    }

    /// Largest single transfer the enabler was sized for, in bytes.
    #[must_use]
    pub const fn max_transfer_len(&self) -> u32 {
        self.max_transfer_len
    }
}

/// Host platform services used by bring-up.
pub trait Platform: Send + Sync {
    /// Map the device register window described by a memory resource.
    ///
    /// # Errors
    ///
    /// Returns `ResourceExhausted` when the mapping cannot be created.
    fn map_register_window(&self, start: u64, length: u64) -> Result<Box<dyn RegisterBank>>;

    /// Create an interrupt object for the device's interrupt line.
    ///
    /// # Errors
    ///
    /// Returns `ResourceExhausted` when the interrupt object cannot be
    /// created.
    fn connect_interrupt(&self, vector: u32, affinity: u64) -> Result<InterruptHandle>;

    /// Create a scatter/gather DMA enabler with the negotiated profile,
    /// sized to the configured maximum transfer unit.
    ///
    /// # Errors
    ///
    /// Returns `ResourceExhausted` when the DMA resource cannot be created.
    fn create_dma_enabler(&self, profile: DmaProfile, max_transfer_len: u32)
        -> Result<DmaEnabler>;

    /// Destroy a DMA enabler created by this platform.
    ///
    /// # Errors
    ///
    /// May fail; callers on teardown paths log the failure and continue.
    fn destroy_dma_enabler(&self, enabler: DmaEnabler) -> Result<()>;
}

/// Hosted platform backed by `/dev/mem`.
///
/// Maps physical register windows directly; interrupt and DMA handles are
/// recorded as tokens, since routing them is the kernel's business on a
/// hosted system.
#[derive(Debug, Clone)]
pub struct DevMemPlatform {
    device_memory: PathBuf,
}

impl DevMemPlatform {
    /// Platform over the default `/dev/mem` node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            device_memory: PathBuf::from("/dev/mem"),
        }
    }

    /// Platform over an alternate physical-memory node.
    #[must_use]
    pub fn with_device_path(path: impl Into<PathBuf>) -> Self {
        Self {
            device_memory: path.into(),
        }
    }
}

impl Default for DevMemPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for DevMemPlatform {
    fn map_register_window(&self, start: u64, length: u64) -> Result<Box<dyn RegisterBank>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.device_memory)
            .map_err(|e| {
                EqosError::resource_exhausted(format!(
                    "cannot open {}: {e}",
                    self.device_memory.display()
                ))
            })?;

        // Truncation acceptable: register windows are a few KiB
        #[allow(clippy::cast_possible_truncation)]
        let window = MappedWindow::map_file(file, start, length as usize)?;

        tracing::info!("mapped register window {start:#x}+{length:#x}");
        Ok(Box::new(window))
    }

    fn connect_interrupt(&self, vector: u32, affinity: u64) -> Result<InterruptHandle> {
        tracing::debug!("interrupt line bound: vector {vector}, affinity {affinity:#x}");
        Ok(InterruptHandle::new(vector, affinity))
    }

    fn create_dma_enabler(
        &self,
        profile: DmaProfile,
        max_transfer_len: u32,
    ) -> Result<DmaEnabler> {
        tracing::debug!(
            "DMA enabler created: {}-bit, max transfer {max_transfer_len}",
            profile.address_width_bits
        );
        Ok(DmaEnabler::new(profile, max_transfer_len))
    }

    fn destroy_dma_enabler(&self, enabler: DmaEnabler) -> Result<()> {
        tracing::debug!(
            "DMA enabler destroyed: {}-bit",
            enabler.profile().address_width_bits
        );
        Ok(())
    }
}
