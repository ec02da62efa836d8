//! Decoders for the identification and capability registers.
//!
//! `MAC_Version` carries two one-byte revision fields: the Synopsys core
//! revision (`SNPSVER`, e.g. 0x51 for 5.10a) and a vendor-assigned user
//! revision (`USERVER`). The four `MAC_HW_Feature` words describe which
//! optional silicon blocks were synthesized into this instance of the core.

use crate::regs::{feature0, feature1, version};
use std::fmt;

/// Silicon revision decoded from `MAC_Version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiliconVersion {
    /// Synopsys core revision (`SNPSVER` field).
    pub core: u8,
    /// Vendor user revision (`USERVER` field).
    pub user: u8,
}

impl SiliconVersion {
    /// Decode from the raw `MAC_Version` register value.
    #[must_use]
    pub const fn from_register(value: u32) -> Self {
        Self {
            core: ((value >> version::SNPSVER_SHIFT) & version::VER_MASK) as u8,
            user: ((value >> version::USERVER_SHIFT) & version::VER_MASK) as u8,
        }
    }
}

impl fmt::Display for SiliconVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "core {:#04x} user {:#04x}", self.core, self.user)
    }
}

/// The four raw `MAC_HW_Feature` words, kept whole for diagnostics even
/// though bring-up consumes only a few fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureWords(pub [u32; 4]);

impl FeatureWords {
    /// Raw feature word `index` (0..=3).
    #[must_use]
    pub const fn word(&self, index: usize) -> u32 {
        self.0[index]
    }

    /// DMA address-width class from `MAC_HW_Feature1`.
    #[must_use]
    pub const fn address_width_class(&self) -> AddressWidthClass {
        AddressWidthClass::from_feature1(self.0[1])
    }

    /// Link-speed class from `MAC_HW_Feature0`.
    #[must_use]
    pub const fn link_speed_class(&self) -> LinkSpeedClass {
        if self.0[0] & feature0::GMII != 0 {
            LinkSpeedClass::Gigabit
        } else {
            LinkSpeedClass::Standard
        }
    }

    /// MMC statistics block present.
    #[must_use]
    pub const fn has_mmc(&self) -> bool {
        self.0[0] & feature0::MMC != 0
    }

    /// IEEE 1588 timestamping present.
    #[must_use]
    pub const fn has_timestamping(&self) -> bool {
        self.0[0] & feature0::TIMESTAMP != 0
    }

    /// TCP segmentation offload present.
    #[must_use]
    pub const fn has_tso(&self) -> bool {
        self.0[1] & feature1::TSO != 0
    }
}

/// DMA address-width class synthesized into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressWidthClass {
    /// 32-bit descriptor/buffer addressing.
    Bits32,
    /// 40-bit descriptor/buffer addressing.
    Bits40,
    /// 48-bit descriptor/buffer addressing.
    Bits48,
    /// Reserved encoding; no legal profile exists for it.
    Unknown(u8),
}

impl AddressWidthClass {
    /// Decode from the raw `MAC_HW_Feature1` register value.
    #[must_use]
    pub const fn from_feature1(value: u32) -> Self {
        match (value >> feature1::ADDR64_SHIFT) & feature1::ADDR64_MASK {
            feature1::ADDR64_32BIT => Self::Bits32,
            feature1::ADDR64_40BIT => Self::Bits40,
            feature1::ADDR64_48BIT => Self::Bits48,
            other => Self::Unknown(other as u8),
        }
    }
}

/// Link-speed class of the synthesized MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSpeedClass {
    /// 10/100 Mbps only.
    Standard,
    /// Gigabit capable.
    Gigabit,
}

impl LinkSpeedClass {
    /// Maximum link speed in bits per second.
    #[must_use]
    pub const fn bits_per_second(&self) -> u64 {
        match self {
            Self::Standard => 100_000_000,
            Self::Gigabit => 1_000_000_000,
        }
    }
}

impl fmt::Display for LinkSpeedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "100 Mbps"),
            Self::Gigabit => write!(f, "1 Gbps"),
        }
    }
}
