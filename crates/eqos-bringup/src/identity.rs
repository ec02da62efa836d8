//! Device identity and the version gate.
//!
//! Identification and capability registers are read exactly once per prepare
//! cycle into an immutable [`DeviceIdentity`]. The version gate is a hard
//! compatibility fence: silicon outside the supported family fails bring-up
//! and stays failed until a driver update widens the bounds.

use crate::error::{EqosError, Result};
use crate::regbank::RegisterBank;
use eqos_mac::regs::{mac_hw_feature, MAC_HW_FEATURE_COUNT, MAC_VERSION};
use eqos_mac::{AddressWidthClass, FeatureWords, LinkSpeedClass, SiliconVersion};

/// Lowest supported Synopsys core revision (5.10a), inclusive.
pub const MIN_CORE_VERSION: u8 = 0x51;

/// Highest supported Synopsys core revision (5.20a), inclusive.
pub const MAX_CORE_VERSION: u8 = 0x52;

/// Immutable snapshot of the silicon's identification registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Decoded `MAC_Version` fields.
    pub version: SiliconVersion,
    /// All four raw `MAC_HW_Feature` words, preserved for diagnostics.
    pub features: FeatureWords,
}

impl DeviceIdentity {
    /// DMA address-width class synthesized into this part.
    #[must_use]
    pub const fn address_width_class(&self) -> AddressWidthClass {
        self.features.address_width_class()
    }

    /// Maximum link-speed class of this part.
    #[must_use]
    pub const fn link_speed_class(&self) -> LinkSpeedClass {
        self.features.link_speed_class()
    }
}

/// Read the version and feature registers.
pub fn read_identity(bank: &dyn RegisterBank) -> DeviceIdentity {
    let version = SiliconVersion::from_register(bank.read32(MAC_VERSION));

    let mut words = [0u32; MAC_HW_FEATURE_COUNT];
    for (index, word) in words.iter_mut().enumerate() {
        *word = bank.read32(mac_hw_feature(index));
    }

    let identity = DeviceIdentity {
        version,
        features: FeatureWords(words),
    };

    tracing::debug!(
        "silicon {}, features {:#010x} {:#010x} {:#010x} {:#010x}",
        identity.version,
        words[0],
        words[1],
        words[2],
        words[3]
    );

    identity
}

/// Validate the silicon revision against the supported family.
///
/// # Errors
///
/// Returns `UnsupportedHardware` when the core revision falls outside
/// `[MIN_CORE_VERSION, MAX_CORE_VERSION]`.
pub fn check_supported(identity: &DeviceIdentity) -> Result<()> {
    let core = identity.version.core;
    if core < MIN_CORE_VERSION || core > MAX_CORE_VERSION {
        return Err(EqosError::unsupported(format!(
            "core revision {core:#04x} outside supported range \
             [{MIN_CORE_VERSION:#04x}, {MAX_CORE_VERSION:#04x}]"
        )));
    }
    Ok(())
}
