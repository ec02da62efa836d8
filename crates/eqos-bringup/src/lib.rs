//! Bring-up and resource negotiation for the Synopsys DesignWare Ethernet
//! QoS (EQOS) MAC.
//!
//! Given the platform-assigned resources for one adapter — a memory-mapped
//! register window and an interrupt line — plus an optional configured
//! address override, this crate validates the silicon, derives operating
//! parameters, programs the MAC/DMA engine into a known-good idle state, and
//! publishes a capability report for the network stack. The datapath
//! (queues, interrupt servicing, PHY management) attaches afterwards and is
//! out of scope here.
//!
//! # Bring-up pipeline
//!
//! ```text
//! prepare-hardware:  resource classification → window mapped, interrupt bound
//! power-on:          address resolution → version gate → DMA negotiation
//!                    → software reset (bounded poll) → bus tuning → publish
//! power-off:         factory address restored
//! release-hardware:  DMA enabler destroyed, window unmapped
//! ```
//!
//! Any stage failure unwinds exactly the resources acquired so far and
//! leaves the instance in a terminal failed state; retrying is the host's
//! decision on a later arrival event.
//!
//! # Quick start
//!
//! ```no_run
//! use eqos_bringup::{BringupConfig, DevMemPlatform, EqosAdapter, ResourceDescriptor};
//!
//! # fn main() -> eqos_bringup::Result<()> {
//! let platform = Box::new(DevMemPlatform::new());
//! let mut adapter = EqosAdapter::new(platform, BringupConfig::default());
//!
//! adapter.prepare_hardware(&[
//!     ResourceDescriptor::MemoryRegion { start: 0xFE40_0000, length: 0x1200 },
//!     ResourceDescriptor::InterruptLine { vector: 41, affinity: 0x1 },
//! ])?;
//! let caps = adapter.power_on()?;
//!
//! println!("{} @ {}, DMA ceiling {:#x}",
//!          caps.current_address, caps.max_link_speed, caps.max_physical_address);
//! # Ok(())
//! # }
//! ```
//!
//! The whole pipeline also runs against the in-memory platform in [`sim`],
//! which is how the crate's own tests exercise it without silicon.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod config;
mod datapath;
mod dma;
mod error;
mod events;
mod identity;
mod lifecycle;
mod macpolicy;
mod platform;
mod regbank;
mod reset;
mod resources;
pub mod sim;
mod state;

pub use config::{BringupConfig, DEFAULT_MTU};
pub use eqos_mac::{AddressWidthClass, LinkSpeedClass, MacAddr, SiliconVersion};
pub use dma::{negotiate as negotiate_dma_profile, DmaProfile, TransferMode};
pub use error::{EqosError, Result};
pub use events::{BringupEvent, DiagnosticSink, MemorySink, Outcome, Stage, TraceSink};
pub use identity::{DeviceIdentity, MAX_CORE_VERSION, MIN_CORE_VERSION};
pub use lifecycle::{EqosAdapter, LinkCapabilities};
pub use macpolicy::{resolve as resolve_addresses, AddressSource, Entropy, OsEntropy, ResolvedAddresses};
pub use platform::{DevMemPlatform, DmaEnabler, InterruptHandle, Platform};
pub use regbank::{MappedWindow, RegisterBank};
pub use reset::{RESET_POLL_INTERVAL, RESET_POLL_LIMIT};
pub use resources::{BoundResources, ResourceDescriptor};
pub use state::BringupState;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        BringupConfig, BringupState, DevMemPlatform, EqosAdapter, EqosError, LinkCapabilities,
        Platform, RegisterBank, ResourceDescriptor, Result,
    };
}
