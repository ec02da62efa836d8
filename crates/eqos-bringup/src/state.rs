//! Bring-up state machine.
//!
//! One instance per device. Transitions move forward only on stage success;
//! any failure lands in the terminal `Failed` state after the acquired
//! resources are unwound, and only a release returns the machine to `Idle`
//! for a later arrival event. Transition functions are pure; the lifecycle
//! controller is the only thing that applies them.

use std::fmt;

/// Per-device bring-up progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringupState {
    /// No resources held.
    Idle,
    /// Register window mapped and interrupt object created.
    ResourcesBound,
    /// Identification registers read and the version gate passed.
    IdentityRead,
    /// DMA profile negotiated and enabler created.
    DmaBound,
    /// Software reset completed.
    Reset,
    /// Bus arbitration and timing programmed.
    BusConfigured,
    /// Capabilities published; datapath may attach.
    Running,
    /// A stage failed; resources were unwound. Terminal until release.
    Failed,
}

impl BringupState {
    /// The next state on stage success, or `None` where no forward
    /// transition exists.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::ResourcesBound),
            Self::ResourcesBound => Some(Self::IdentityRead),
            Self::IdentityRead => Some(Self::DmaBound),
            Self::DmaBound => Some(Self::Reset),
            Self::Reset => Some(Self::BusConfigured),
            Self::BusConfigured => Some(Self::Running),
            Self::Running | Self::Failed => None,
        }
    }

    /// True once capabilities are published.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// True in the terminal failure state.
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for BringupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ResourcesBound => "resources-bound",
            Self::IdentityRead => "identity-read",
            Self::DmaBound => "dma-bound",
            Self::Reset => "reset",
            Self::BusConfigured => "bus-configured",
            Self::Running => "running",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_chain_reaches_running() {
        let mut state = BringupState::Idle;
        let mut hops = 0;
        while let Some(next) = state.next() {
            state = next;
            hops += 1;
        }
        assert_eq!(state, BringupState::Running);
        assert_eq!(hops, 6);
    }

    #[test]
    fn terminal_states_do_not_advance() {
        assert_eq!(BringupState::Running.next(), None);
        assert_eq!(BringupState::Failed.next(), None);
    }
}
