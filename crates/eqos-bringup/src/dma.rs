//! DMA addressing profile negotiation.
//!
//! The synthesized address-width class from `MAC_HW_Feature1` decides how
//! wide the descriptor and buffer addresses the DMA engine can emit are,
//! and therefore the highest physical address the upstream stack may hand
//! this device. The mapping is a pure total function of the class; an
//! unrecognized class has no legal profile and fails the bring-up.

use crate::error::{EqosError, Result};
use eqos_mac::AddressWidthClass;

/// Descriptor/buffer transfer mode of the negotiated profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Scatter/gather over descriptor rings.
    ScatterGather,
}

/// Negotiated DMA addressing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaProfile {
    /// Descriptor/buffer address width in bits: 32, 40, or 48.
    pub address_width_bits: u32,
    /// Highest addressable physical byte, `2^width - 1`.
    pub max_physical_address: u64,
    /// Transfer mode requested from the platform DMA subsystem.
    pub transfer_mode: TransferMode,
}

impl DmaProfile {
    const fn with_width(address_width_bits: u32) -> Self {
        Self {
            address_width_bits,
            max_physical_address: (1u64 << address_width_bits) - 1,
            transfer_mode: TransferMode::ScatterGather,
        }
    }

    /// True when addresses wider than 32 bits must be enabled on the bus
    /// master (enhanced address mode).
    #[must_use]
    pub const fn needs_wide_addressing(&self) -> bool {
        self.address_width_bits > 32
    }
}

/// Map an address-width class to its DMA profile.
///
/// # Errors
///
/// Returns `UnsupportedHardware` for a reserved class encoding.
pub fn negotiate(class: AddressWidthClass) -> Result<DmaProfile> {
    let profile = match class {
        AddressWidthClass::Bits32 => DmaProfile::with_width(32),
        AddressWidthClass::Bits40 => DmaProfile::with_width(40),
        AddressWidthClass::Bits48 => DmaProfile::with_width(48),
        AddressWidthClass::Unknown(raw) => {
            return Err(EqosError::unsupported(format!(
                "reserved DMA address-width class {raw:#x}"
            )));
        }
    };

    tracing::debug!(
        "negotiated {}-bit DMA profile, ceiling {:#x}",
        profile.address_width_bits,
        profile.max_physical_address
    );

    Ok(profile)
}
