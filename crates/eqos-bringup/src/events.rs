//! Structured diagnostic records.
//!
//! Every bring-up stage emits one [`BringupEvent`] on both its success and
//! failure paths. Events flow to an injected [`DiagnosticSink`] so hosts can
//! route them wherever they like and tests can capture and assert on them.
//! This is an observability channel only — nothing reads events back to make
//! decisions.

use crate::error::EqosError;
use std::fmt;
use std::sync::Mutex;

/// A bring-up or teardown stage, as named in diagnostic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Platform resource-list classification.
    ResourceScan,
    /// Link-layer address derivation.
    AddressResolution,
    /// Silicon version and capability validation.
    VersionGate,
    /// DMA addressing profile selection and enabler creation.
    DmaNegotiation,
    /// Software reset of the MAC/DMA engine.
    Reset,
    /// Bus arbitration and timing programming.
    BusTuning,
    /// Capability publication to the network stack.
    Publish,
    /// Resource release and address restoration.
    Teardown,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResourceScan => "resource-scan",
            Self::AddressResolution => "address-resolution",
            Self::VersionGate => "version-gate",
            Self::DmaNegotiation => "dma-negotiation",
            Self::Reset => "reset",
            Self::BusTuning => "bus-tuning",
            Self::Publish => "publish",
            Self::Teardown => "teardown",
        };
        f.write_str(name)
    }
}

/// Outcome recorded in a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The stage completed.
    Success,
    /// The stage failed with the tagged error kind.
    Failure {
        /// Stable error-kind tag (see [`EqosError::kind`]).
        kind: &'static str,
    },
}

/// One structured diagnostic record.
#[derive(Debug, Clone)]
pub struct BringupEvent {
    /// The stage that emitted the record.
    pub stage: Stage,
    /// Success or tagged failure.
    pub outcome: Outcome,
    /// Register and field values relevant to the stage.
    pub values: Vec<(&'static str, u64)>,
}

impl BringupEvent {
    /// Build a success record.
    #[must_use]
    pub fn success(stage: Stage, values: Vec<(&'static str, u64)>) -> Self {
        Self {
            stage,
            outcome: Outcome::Success,
            values,
        }
    }

    /// Build a failure record from the error about to be returned.
    #[must_use]
    pub fn failure(stage: Stage, error: &EqosError) -> Self {
        Self {
            stage,
            outcome: Outcome::Failure { kind: error.kind() },
            values: Vec::new(),
        }
    }

    /// Look up a recorded value by name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<u64> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }
}

/// Destination for structured diagnostic records.
pub trait DiagnosticSink: Send + Sync {
    /// Record one event. Must not block for long; must not fail.
    fn record(&self, event: BringupEvent);
}

/// Default sink: forwards records to `tracing`.
#[derive(Debug, Default)]
pub struct TraceSink;

impl DiagnosticSink for TraceSink {
    fn record(&self, event: BringupEvent) {
        let mut rendered = String::new();
        for (name, value) in &event.values {
            if !rendered.is_empty() {
                rendered.push(' ');
            }
            rendered.push_str(&format!("{name}={value:#x}"));
        }

        match event.outcome {
            Outcome::Success => {
                tracing::info!(stage = %event.stage, "{rendered}");
            }
            Outcome::Failure { kind } => {
                tracing::warn!(stage = %event.stage, error = kind, "{rendered}");
            }
        }
    }
}

/// Recording sink for tests: keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<BringupEvent>>,
}

impl MemorySink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<BringupEvent> {
        self.events.lock().expect("sink poisoned").clone()
    }

    /// Events emitted by one stage.
    #[must_use]
    pub fn for_stage(&self, stage: Stage) -> Vec<BringupEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.stage == stage)
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, event: BringupEvent) {
        self.events.lock().expect("sink poisoned").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_and_filters() {
        let sink = MemorySink::new();
        sink.record(BringupEvent::success(
            Stage::ResourceScan,
            vec![("window_length", 0x1200)],
        ));
        sink.record(BringupEvent::failure(
            Stage::Reset,
            &EqosError::Timeout {
                operation: "software reset".into(),
                polls: 1000,
            },
        ));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].value("window_length"), Some(0x1200));
        assert_eq!(sink.for_stage(Stage::Reset).len(), 1);
        assert_eq!(
            sink.for_stage(Stage::Reset)[0].outcome,
            Outcome::Failure { kind: "timeout" }
        );
    }

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(Stage::ResourceScan.to_string(), "resource-scan");
        assert_eq!(Stage::DmaNegotiation.to_string(), "dma-negotiation");
    }
}
