//! Platform resource classification.
//!
//! The host supplies an ordered list of resource descriptors once per
//! hardware-arrival event, with no ordering guarantee. One pass buckets each
//! descriptor: the first adequately sized memory region becomes the register
//! window, the first interrupt line becomes the device interrupt, and
//! everything else is logged and ignored. Duplicates are a configuration
//! anomaly, not a failure; a missing window or interrupt is.

use crate::error::{EqosError, Result};
use crate::platform::{InterruptHandle, Platform};
use crate::regbank::RegisterBank;
use eqos_mac::regs::REGISTER_WINDOW_SIZE;

/// One platform-assigned hardware resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceDescriptor {
    /// A range of device memory.
    MemoryRegion {
        /// Physical start address.
        start: u64,
        /// Length in bytes.
        length: u64,
    },
    /// An interrupt line.
    InterruptLine {
        /// Interrupt vector number.
        vector: u32,
        /// Processor affinity mask.
        affinity: u64,
    },
    /// A resource type this device does not use.
    Other {
        /// Raw resource-type tag, for the log.
        kind: u32,
    },
}

/// Resources bound by a successful classification pass.
pub struct BoundResources {
    /// The mapped register window.
    pub bank: Box<dyn RegisterBank>,
    /// The connected interrupt object.
    pub interrupt: InterruptHandle,
    /// Physical start of the bound window (for diagnostics).
    pub window_start: u64,
    /// Length of the bound window (for diagnostics).
    pub window_length: u64,
}

impl std::fmt::Debug for BoundResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundResources")
            .field("bank", &format_args!("<dyn RegisterBank; size={}>", self.bank.size()))
            .field("interrupt", &self.interrupt)
            .field("window_start", &self.window_start)
            .field("window_length", &self.window_length)
            .finish()
    }
}

/// Classify a resource list, binding at most one register window and one
/// interrupt line.
///
/// # Errors
///
/// Returns `ResourceExhausted` immediately if mapping the window or creating
/// the interrupt object fails, aborting the scan, or `ConfigurationError` if
/// the list held no adequate memory region or no interrupt line.
pub fn classify(
    platform: &dyn Platform,
    resources: &[ResourceDescriptor],
) -> Result<BoundResources> {
    let mut window: Option<(Box<dyn RegisterBank>, u64, u64)> = None;
    let mut interrupt: Option<InterruptHandle> = None;

    for descriptor in resources {
        match *descriptor {
            ResourceDescriptor::MemoryRegion { start, length } => {
                if length < REGISTER_WINDOW_SIZE as u64 {
                    tracing::warn!(
                        "ignoring undersized memory region {start:#x}+{length:#x} \
                         (need {REGISTER_WINDOW_SIZE:#x})"
                    );
                } else if window.is_some() {
                    tracing::warn!("ignoring duplicate memory region {start:#x}+{length:#x}");
                } else {
                    let bank = platform.map_register_window(start, length)?;
                    window = Some((bank, start, length));
                }
            }
            ResourceDescriptor::InterruptLine { vector, affinity } => {
                if interrupt.is_some() {
                    tracing::warn!("ignoring duplicate interrupt line, vector {vector}");
                } else {
                    interrupt = Some(platform.connect_interrupt(vector, affinity)?);
                }
            }
            ResourceDescriptor::Other { kind } => {
                tracing::debug!("ignoring unexpected resource, kind {kind}");
            }
        }
    }

    let (bank, window_start, window_length) = window
        .ok_or_else(|| EqosError::configuration("resource list has no adequate memory region"))?;
    let interrupt = interrupt
        .ok_or_else(|| EqosError::configuration("resource list has no interrupt line"))?;

    Ok(BoundResources {
        bank,
        interrupt,
        window_start,
        window_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimPlatform;

    const WINDOW: u64 = REGISTER_WINDOW_SIZE as u64;

    #[test]
    fn binds_one_window_and_one_interrupt() {
        let platform = SimPlatform::new();
        let bound = classify(
            &platform,
            &[
                ResourceDescriptor::InterruptLine {
                    vector: 41,
                    affinity: 0x1,
                },
                ResourceDescriptor::MemoryRegion {
                    start: 0xFE40_0000,
                    length: WINDOW,
                },
            ],
        )
        .unwrap();

        assert_eq!(bound.window_start, 0xFE40_0000);
        assert_eq!(bound.interrupt.vector(), 41);
        assert_eq!(platform.mapped_windows(), vec![(0xFE40_0000, WINDOW)]);
    }

    #[test]
    fn first_adequate_region_wins() {
        let platform = SimPlatform::new();
        let bound = classify(
            &platform,
            &[
                ResourceDescriptor::MemoryRegion {
                    start: 0x1000,
                    length: 0x100, // too small
                },
                ResourceDescriptor::MemoryRegion {
                    start: 0x4000,
                    length: WINDOW,
                },
                ResourceDescriptor::MemoryRegion {
                    start: 0x8000,
                    length: WINDOW * 2, // duplicate, ignored
                },
                ResourceDescriptor::InterruptLine {
                    vector: 7,
                    affinity: 0,
                },
            ],
        )
        .unwrap();

        assert_eq!(bound.window_start, 0x4000);
        assert_eq!(platform.mapped_windows(), vec![(0x4000, WINDOW)]);
    }

    #[test]
    fn missing_window_is_a_configuration_error() {
        let platform = SimPlatform::new();
        let err = classify(
            &platform,
            &[ResourceDescriptor::InterruptLine {
                vector: 7,
                affinity: 0,
            }],
        )
        .unwrap_err();
        assert_eq!(err.kind(), "configuration-error");
    }

    #[test]
    fn missing_interrupt_is_a_configuration_error() {
        let platform = SimPlatform::new();
        let err = classify(
            &platform,
            &[ResourceDescriptor::MemoryRegion {
                start: 0x4000,
                length: WINDOW,
            }],
        )
        .unwrap_err();
        assert_eq!(err.kind(), "configuration-error");
        // the window bound before the failure was unmapped on the way out
        assert_eq!(platform.active_window_count(), 0);
    }

    #[test]
    fn unknown_resources_are_ignored() {
        let platform = SimPlatform::new();
        let bound = classify(
            &platform,
            &[
                ResourceDescriptor::Other { kind: 9 },
                ResourceDescriptor::MemoryRegion {
                    start: 0x4000,
                    length: WINDOW,
                },
                ResourceDescriptor::Other { kind: 2 },
                ResourceDescriptor::InterruptLine {
                    vector: 7,
                    affinity: 0,
                },
            ],
        )
        .unwrap();
        assert_eq!(bound.window_length, WINDOW);
    }

    #[test]
    fn mapping_failure_aborts_the_scan() {
        let platform = SimPlatform::new();
        platform.inject_map_failure();
        let err = classify(
            &platform,
            &[
                ResourceDescriptor::MemoryRegion {
                    start: 0x4000,
                    length: WINDOW,
                },
                ResourceDescriptor::InterruptLine {
                    vector: 7,
                    affinity: 0,
                },
            ],
        )
        .unwrap_err();
        assert_eq!(err.kind(), "resource-exhausted");
        // the interrupt after the failing region was never reached
        assert_eq!(platform.interrupts(), Vec::new());
    }
}
