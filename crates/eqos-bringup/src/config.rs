//! Inbound bring-up configuration.
//!
//! Retrieved once per prepare from whatever store the host keeps it in
//! (registry, device tree, config file). Only two knobs exist at this layer:
//! an optional operational-address override and the maximum transfer unit
//! the DMA enabler is sized for.

use eqos_mac::MacAddr;

/// Default maximum transfer unit in bytes.
pub const DEFAULT_MTU: u32 = 1500;

/// Bring-up configuration for one device instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BringupConfig {
    /// Administrator-configured operational address. Takes precedence over
    /// the burned-in address when valid; an invalid override is logged and
    /// skipped by the address policy, never an error.
    pub mac_override: Option<MacAddr>,

    /// Maximum transfer unit the DMA enabler is sized to.
    pub mtu: u32,
}

impl BringupConfig {
    /// Configuration with no override and the default MTU.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_override: None,
            mtu: DEFAULT_MTU,
        }
    }

    /// Set the operational-address override.
    #[must_use]
    pub const fn with_mac_override(mut self, addr: MacAddr) -> Self {
        self.mac_override = Some(addr);
        self
    }

    /// Set the maximum transfer unit.
    #[must_use]
    pub const fn with_mtu(mut self, mtu: u32) -> Self {
        self.mtu = mtu;
        self
    }
}

impl Default for BringupConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BringupConfig::default();
        assert_eq!(config.mac_override, None);
        assert_eq!(config.mtu, 1500);
    }

    #[test]
    fn builder_chain() {
        let addr: MacAddr = "02:00:00:11:22:33".parse().unwrap();
        let config = BringupConfig::new().with_mac_override(addr).with_mtu(9000);
        assert_eq!(config.mac_override, Some(addr));
        assert_eq!(config.mtu, 9000);
    }
}
