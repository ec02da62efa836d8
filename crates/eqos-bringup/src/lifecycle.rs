//! Lifecycle controller.
//!
//! The host's power/PnP orchestration drives one device instance through a
//! fixed sequence of callouts: prepare (classify and bind resources), power
//! on (validate, negotiate, reset, tune, publish), power off (restore the
//! factory address), release (unwind everything). Calls never overlap for
//! one instance — the host serializes them — so there is no locking here.
//!
//! [`EqosAdapter`] is a thin adapter from those callouts onto the
//! [`BringupState`] machine. Forward transitions happen only on stage
//! success; any failure unwinds exactly the resources acquired so far, in
//! reverse order, and returns the first error. Cleanup failures are logged,
//! never propagated — the original failure is the one the caller needs.

use crate::config::BringupConfig;
use crate::dma;
use crate::error::{EqosError, Result};
use crate::events::{BringupEvent, DiagnosticSink, Stage, TraceSink};
use crate::identity::{self, DeviceIdentity};
use crate::macpolicy::{self, Entropy, OsEntropy, ResolvedAddresses};
use crate::platform::{DmaEnabler, InterruptHandle, Platform};
use crate::regbank::{self, RegisterBank};
use crate::reset;
use crate::resources::{self, ResourceDescriptor};
use crate::state::BringupState;
use eqos_mac::{LinkSpeedClass, MacAddr};
use std::sync::Arc;

/// Capability report published to the upstream network stack once bring-up
/// succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkCapabilities {
    /// Operational link-layer address.
    pub current_address: MacAddr,
    /// Factory (burned-in) link-layer address, exposed as a distinct
    /// identity even when numerically equal to the current one.
    pub permanent_address: MacAddr,
    /// Maximum link speed of this part.
    pub max_link_speed: LinkSpeedClass,
    /// Maximum transfer unit the DMA enabler was sized for.
    pub max_transfer_unit: u32,
    /// Highest physical address the upstream stack may hand this device.
    pub max_physical_address: u64,
}

/// One MAC device instance, owned by the host's lifecycle callouts.
pub struct EqosAdapter {
    platform: Box<dyn Platform>,
    config: BringupConfig,
    sink: Arc<dyn DiagnosticSink>,
    entropy: Box<dyn Entropy>,
    state: BringupState,
    bank: Option<Box<dyn RegisterBank>>,
    interrupt: Option<InterruptHandle>,
    identity: Option<DeviceIdentity>,
    addresses: Option<ResolvedAddresses>,
    dma: Option<DmaEnabler>,
    capabilities: Option<LinkCapabilities>,
}

impl EqosAdapter {
    /// Adapter with the default diagnostics (tracing) and entropy (OS RNG).
    #[must_use]
    pub fn new(platform: Box<dyn Platform>, config: BringupConfig) -> Self {
        Self {
            platform,
            config,
            sink: Arc::new(TraceSink),
            entropy: Box::new(OsEntropy),
            state: BringupState::Idle,
            bank: None,
            interrupt: None,
            identity: None,
            addresses: None,
            dma: None,
            capabilities: None,
        }
    }

    /// Route diagnostic records to `sink` instead of tracing.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Substitute the randomness source used for address synthesis.
    #[must_use]
    pub fn with_entropy(mut self, entropy: Box<dyn Entropy>) -> Self {
        self.entropy = entropy;
        self
    }

    /// Current bring-up state.
    #[must_use]
    pub fn state(&self) -> BringupState {
        self.state
    }

    /// The published capability report, once running.
    #[must_use]
    pub fn capabilities(&self) -> Option<&LinkCapabilities> {
        self.capabilities.as_ref()
    }

    /// The device identity read during bring-up, for diagnostics.
    #[must_use]
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.identity.as_ref()
    }

    /// The bound interrupt handle, for the datapath stages that arm it.
    #[must_use]
    pub fn interrupt(&self) -> Option<InterruptHandle> {
        self.interrupt
    }

    /// Prepare-hardware callout: classify the resource list and bind the
    /// register window and interrupt line.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when a required resource is absent (or the call
    /// arrives out of order), `ResourceExhausted` when mapping fails. On
    /// failure the instance lands in [`BringupState::Failed`] with nothing
    /// held.
    pub fn prepare_hardware(&mut self, resources: &[ResourceDescriptor]) -> Result<()> {
        if self.state != BringupState::Idle {
            return Err(EqosError::configuration(format!(
                "prepare-hardware callout in state {}",
                self.state
            )));
        }

        match resources::classify(self.platform.as_ref(), resources) {
            Ok(bound) => {
                self.emit(BringupEvent::success(
                    Stage::ResourceScan,
                    vec![
                        ("window_start", bound.window_start),
                        ("window_length", bound.window_length),
                        ("interrupt_vector", u64::from(bound.interrupt.vector())),
                    ],
                ));
                self.bank = Some(bound.bank);
                self.interrupt = Some(bound.interrupt);
                self.state = BringupState::ResourcesBound;
                Ok(())
            }
            Err(error) => {
                self.emit(BringupEvent::failure(Stage::ResourceScan, &error));
                self.state = BringupState::Failed;
                Err(error)
            }
        }
    }

    /// Power-on callout: resolve addresses, gate the silicon, negotiate DMA,
    /// reset, tune the bus, and publish capabilities.
    ///
    /// # Errors
    ///
    /// Any stage error aborts the attempt; resources acquired so far are
    /// released in reverse order and the instance lands in
    /// [`BringupState::Failed`].
    pub fn power_on(&mut self) -> Result<LinkCapabilities> {
        if self.state != BringupState::ResourcesBound {
            return Err(EqosError::configuration(format!(
                "power-on callout in state {}",
                self.state
            )));
        }

        match self.bring_up() {
            Ok(capabilities) => Ok(capabilities),
            Err(error) => {
                self.unwind();
                self.state = BringupState::Failed;
                Err(error)
            }
        }
    }

    /// Power-off callout: restore the factory address so whatever touches
    /// the part next sees its burned-in identity.
    pub fn power_off(&mut self) {
        if !self.state.is_running() {
            tracing::warn!("power-off callout in state {}", self.state);
            return;
        }
        self.restore_permanent_address();
    }

    /// Release-hardware callout: restore the factory address, destroy the
    /// DMA enabler, unmap the register window, and forget the interrupt
    /// token (the interrupt object itself is the host's to clean up).
    /// Returns the instance to [`BringupState::Idle`] for a later arrival.
    pub fn release_hardware(&mut self) {
        if self.state.is_running() {
            self.restore_permanent_address();
        }
        self.unwind();
        self.state = BringupState::Idle;
    }

    fn bring_up(&mut self) -> Result<LinkCapabilities> {
        let Some(bank) = self.bank.as_deref() else {
            return Err(EqosError::configuration("register window not bound"));
        };

        // Address resolution. The permanent slot keeps the raw hardware
        // value even when invalid; only the current slot must be a legal
        // unicast address.
        let hardware = regbank::read_station_address(bank, 0);
        let resolved =
            macpolicy::resolve(self.config.mac_override, hardware, self.entropy.as_mut());
        self.emit(BringupEvent::success(
            Stage::AddressResolution,
            vec![
                ("source", resolved.source.code()),
                ("permanent", resolved.permanent.as_u64()),
                ("current", resolved.current.as_u64()),
            ],
        ));
        self.addresses = Some(resolved);

        // Version gate: a hard compatibility fence, not a warning.
        let identity = identity::read_identity(bank);
        if let Err(error) = identity::check_supported(&identity) {
            self.emit(BringupEvent::failure(Stage::VersionGate, &error));
            return Err(error);
        }
        self.emit(BringupEvent::success(
            Stage::VersionGate,
            vec![
                ("core_version", u64::from(identity.version.core)),
                ("user_version", u64::from(identity.version.user)),
                ("feature0", u64::from(identity.features.word(0))),
                ("feature1", u64::from(identity.features.word(1))),
                ("feature2", u64::from(identity.features.word(2))),
                ("feature3", u64::from(identity.features.word(3))),
            ],
        ));
        self.identity = Some(identity);
        self.state = BringupState::IdentityRead;

        // DMA negotiation.
        let profile = match dma::negotiate(identity.address_width_class()) {
            Ok(profile) => profile,
            Err(error) => {
                self.emit(BringupEvent::failure(Stage::DmaNegotiation, &error));
                return Err(error);
            }
        };
        let enabler = match self.platform.create_dma_enabler(profile, self.config.mtu) {
            Ok(enabler) => enabler,
            Err(error) => {
                self.emit(BringupEvent::failure(Stage::DmaNegotiation, &error));
                return Err(error);
            }
        };
        self.emit(BringupEvent::success(
            Stage::DmaNegotiation,
            vec![
                ("address_width_bits", u64::from(profile.address_width_bits)),
                ("max_physical_address", profile.max_physical_address),
                ("max_transfer_unit", u64::from(self.config.mtu)),
            ],
        ));
        self.dma = Some(enabler);
        self.state = BringupState::DmaBound;

        // Software reset with a bounded poll budget.
        let polls = match reset::software_reset(bank) {
            Ok(polls) => polls,
            Err(error) => {
                self.emit(BringupEvent::failure(Stage::Reset, &error));
                return Err(error);
            }
        };
        self.emit(BringupEvent::success(
            Stage::Reset,
            vec![("polls", u64::from(polls))],
        ));
        self.state = BringupState::Reset;

        // Bus tuning assumes reset-default register contents.
        reset::tune_bus(bank, &profile);
        self.emit(BringupEvent::success(
            Stage::BusTuning,
            vec![
                (
                    "descriptor_skip_beats",
                    u64::from(reset::descriptor_skip_beats()),
                ),
                ("tick_divisor", u64::from(reset::one_us_tick_divisor())),
            ],
        ));
        self.state = BringupState::BusConfigured;

        // Publish: the operational address goes into the hardware, the
        // capability report goes upstream.
        regbank::write_station_address(bank, 0, resolved.current);
        let capabilities = LinkCapabilities {
            current_address: resolved.current,
            permanent_address: resolved.permanent,
            max_link_speed: identity.link_speed_class(),
            max_transfer_unit: self.config.mtu,
            max_physical_address: profile.max_physical_address,
        };
        self.capabilities = Some(capabilities);
        self.state = BringupState::Running;
        self.emit(BringupEvent::success(
            Stage::Publish,
            vec![
                ("current", capabilities.current_address.as_u64()),
                ("permanent", capabilities.permanent_address.as_u64()),
                (
                    "max_bits_per_second",
                    capabilities.max_link_speed.bits_per_second(),
                ),
                ("max_transfer_unit", u64::from(capabilities.max_transfer_unit)),
                ("max_physical_address", capabilities.max_physical_address),
            ],
        ));

        tracing::info!(
            "bring-up complete: {} ({}), {}",
            capabilities.current_address,
            resolved.source.describe(),
            capabilities.max_link_speed
        );

        Ok(capabilities)
    }

    /// Release acquired resources in reverse acquisition order. Cleanup
    /// failures are logged, never propagated.
    fn unwind(&mut self) {
        let mut dma_released = 0u64;
        let mut window_unmapped = 0u64;

        if let Some(enabler) = self.dma.take() {
            if let Err(error) = self.platform.destroy_dma_enabler(enabler) {
                tracing::warn!("ignoring DMA enabler teardown failure: {error}");
            }
            dma_released = 1;
        }
        if let Some(bank) = self.bank.take() {
            drop(bank); // unmaps the register window
            window_unmapped = 1;
        }
        // The interrupt object is the host's to clean up; only our token
        // is dropped.
        self.interrupt = None;
        self.identity = None;
        self.addresses = None;
        self.capabilities = None;

        self.emit(BringupEvent::success(
            Stage::Teardown,
            vec![
                ("dma_released", dma_released),
                ("window_unmapped", window_unmapped),
            ],
        ));
    }

    fn restore_permanent_address(&self) {
        if let (Some(bank), Some(addresses)) = (self.bank.as_deref(), self.addresses) {
            regbank::write_station_address(bank, 0, addresses.permanent);
            tracing::info!("restored permanent address {}", addresses.permanent);
        }
    }

    fn emit(&self, event: BringupEvent) {
        self.sink.record(event);
    }
}

impl std::fmt::Debug for EqosAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EqosAdapter")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("identity", &self.identity)
            .field("addresses", &self.addresses)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
