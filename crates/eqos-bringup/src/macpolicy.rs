//! Link-layer address resolution.
//!
//! Two addresses exist per device and are never conflated: the *permanent*
//! address is whatever the hardware holds, kept verbatim (even when invalid)
//! so it can be restored at teardown; the *current* address is the one the
//! device operates with and must always be unicast and not broadcast.
//!
//! Precedence for the current address, first satisfied wins:
//!
//! 1. configured override, if unicast and not broadcast;
//! 2. the hardware address, corrected if its group bit is set;
//! 3. a synthesized locally-administered address when the hardware was never
//!    programmed (reads back all-ones).

use eqos_mac::MacAddr;
use rand::rngs::OsRng;
use rand::RngCore;

/// Randomness capability for address synthesis.
///
/// Injected so tests can substitute a deterministic source; production uses
/// [`OsEntropy`].
pub trait Entropy: Send {
    /// Fill `buf` with random bytes.
    fn fill(&mut self, buf: &mut [u8]);
}

/// Operating-system randomness (cryptographically strong).
#[derive(Debug, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn fill(&mut self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }
}

/// Where the current address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    /// The configured override was valid and won.
    Configured,
    /// The hardware address was valid and used as-is.
    Hardware,
    /// The hardware address had its group bit set; it was cleared.
    Corrected,
    /// The hardware was never programmed; an address was synthesized.
    Synthesized,
}

impl AddressSource {
    /// Numeric code for structured diagnostic records.
    #[must_use]
    pub const fn code(&self) -> u64 {
        match self {
            Self::Configured => 0,
            Self::Hardware => 1,
            Self::Corrected => 2,
            Self::Synthesized => 3,
        }
    }

    /// Human-readable name for log lines.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::Hardware => "burned-in",
            Self::Corrected => "corrected burned-in",
            Self::Synthesized => "synthesized",
        }
    }
}

/// The resolved address pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAddresses {
    /// Raw hardware address, restored to the device at teardown.
    pub permanent: MacAddr,
    /// Operational address; always unicast and not broadcast.
    pub current: MacAddr,
    /// Which rule produced the current address.
    pub source: AddressSource,
}

/// Derive the permanent and current addresses.
///
/// `hardware` is the raw value of the address-0 register pair. The override
/// branch never consults it, so an administrator override works even on a
/// device with garbage in its address registers.
pub fn resolve(
    override_addr: Option<MacAddr>,
    hardware: MacAddr,
    entropy: &mut dyn Entropy,
) -> ResolvedAddresses {
    if let Some(configured) = override_addr {
        if configured.is_unicast_nonbroadcast() {
            tracing::info!("using configured address {configured}");
            return ResolvedAddresses {
                permanent: hardware,
                current: configured,
                source: AddressSource::Configured,
            };
        }
        tracing::warn!("ignoring configured address {configured}: multicast or broadcast");
    }

    if hardware.is_broadcast() {
        let synthesized = synthesize(entropy);
        tracing::warn!("hardware address never programmed; synthesized {synthesized}");
        return ResolvedAddresses {
            permanent: hardware,
            current: synthesized,
            source: AddressSource::Synthesized,
        };
    }

    if hardware.is_multicast() {
        let corrected = hardware.with_multicast_bit_cleared();
        tracing::warn!("hardware address {hardware} has the group bit set; using {corrected}");
        return ResolvedAddresses {
            permanent: hardware,
            current: corrected,
            source: AddressSource::Corrected,
        };
    }

    ResolvedAddresses {
        permanent: hardware,
        current: hardware,
        source: AddressSource::Hardware,
    }
}

/// Synthesize a locally-administered unicast address: fixed marker octet,
/// zero second octet, four random octets.
fn synthesize(entropy: &mut dyn Entropy) -> MacAddr {
    let mut octets = [0u8; 6];
    octets[0] = MacAddr::LOCAL_ADMIN_MARKER;
    octets[1] = 0x00;
    entropy.fill(&mut octets[2..]);
    MacAddr::new(octets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct SeededEntropy(StdRng);

    impl SeededEntropy {
        fn new(seed: u64) -> Self {
            Self(StdRng::seed_from_u64(seed))
        }
    }

    impl Entropy for SeededEntropy {
        fn fill(&mut self, buf: &mut [u8]) {
            self.0.fill_bytes(buf);
        }
    }

    #[test]
    fn valid_override_wins_over_any_hardware_content() {
        let override_addr: MacAddr = "02:00:00:11:22:33".parse().unwrap();
        let mut entropy = SeededEntropy::new(1);

        for hardware in [
            MacAddr::BROADCAST,
            MacAddr::new([0x01, 0x23, 0x45, 0x67, 0x89, 0xAB]),
            MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
        ] {
            let resolved = resolve(Some(override_addr), hardware, &mut entropy);
            assert_eq!(resolved.current, override_addr);
            assert_eq!(resolved.permanent, hardware);
            assert_eq!(resolved.source, AddressSource::Configured);
        }
    }

    #[test]
    fn multicast_override_falls_through_to_hardware() {
        let bad_override = MacAddr::new([0x01, 0x00, 0x00, 0x11, 0x22, 0x33]);
        let hardware = MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let mut entropy = SeededEntropy::new(1);

        let resolved = resolve(Some(bad_override), hardware, &mut entropy);
        assert_eq!(resolved.current, hardware);
        assert_eq!(resolved.source, AddressSource::Hardware);
    }

    #[test]
    fn broadcast_override_falls_through_to_hardware() {
        let hardware = MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let mut entropy = SeededEntropy::new(1);

        let resolved = resolve(Some(MacAddr::BROADCAST), hardware, &mut entropy);
        assert_eq!(resolved.current, hardware);
        assert_eq!(resolved.source, AddressSource::Hardware);
    }

    #[test]
    fn unprogrammed_hardware_synthesizes_local_admin_address() {
        let mut entropy = SeededEntropy::new(42);
        let resolved = resolve(None, MacAddr::BROADCAST, &mut entropy);

        assert_eq!(resolved.permanent, MacAddr::BROADCAST);
        assert_eq!(resolved.source, AddressSource::Synthesized);

        let octets = resolved.current.octets();
        assert_eq!(octets[0], MacAddr::LOCAL_ADMIN_MARKER);
        assert_eq!(octets[1], 0x00);
        assert!(resolved.current.is_unicast_nonbroadcast());
    }

    #[test]
    fn synthesis_uses_the_injected_entropy() {
        let mut a = SeededEntropy::new(7);
        let mut b = SeededEntropy::new(7);
        let first = resolve(None, MacAddr::BROADCAST, &mut a);
        let second = resolve(None, MacAddr::BROADCAST, &mut b);
        assert_eq!(first.current, second.current);

        let mut c = SeededEntropy::new(8);
        let third = resolve(None, MacAddr::BROADCAST, &mut c);
        assert_ne!(first.current, third.current);
    }

    #[test]
    fn multicast_hardware_gets_minimal_correction() {
        let hardware = MacAddr::new([0x01, 0x23, 0x45, 0x67, 0x89, 0xAB]);
        let mut entropy = SeededEntropy::new(1);

        let resolved = resolve(None, hardware, &mut entropy);
        assert_eq!(
            resolved.current.octets(),
            [0x00, 0x23, 0x45, 0x67, 0x89, 0xAB]
        );
        assert_eq!(resolved.permanent, hardware);
        assert_eq!(resolved.source, AddressSource::Corrected);
    }
}
