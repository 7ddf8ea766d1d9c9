//! Execution traces.
//!
//! Nodes record their lifecycle transitions and the dispatcher records the
//! outcome of every action it runs. [`MemoryTelemetry`] keeps the entries in
//! process memory, which is what tests use to count transitions per node.

use crate::core::lifecycle::LifecycleState;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// What happened at a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// The node entered a new lifecycle state.
    Lifecycle(LifecycleState),
    /// The entry node resolved the first information to a durable id.
    Registered { information_id: String },
    /// A node produced a value for the next hop.
    Value { value: String },
    /// The output node delivered a final result.
    Finalized { output: String },
    /// The output node sent the computation back to the entry node.
    Requeued { output: String, expectation: String },
    /// The action failed for any other reason.
    Failed { error: String },
}

/// A single entry in the execution trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub timestamp: u64,
    pub node_id: String,
    pub kind: String,
    pub signal_id: Option<String>,
    pub event: TraceEvent,
}

impl TraceEntry {
    pub fn new(node_id: impl Into<String>, kind: impl Into<String>, event: TraceEvent) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            timestamp,
            node_id: node_id.into(),
            kind: kind.into(),
            signal_id: None,
            event,
        }
    }

    pub fn with_signal_id(mut self, signal_id: impl Into<String>) -> Self {
        self.signal_id = Some(signal_id.into());
        self
    }
}

/// Trait for recording execution traces.
pub trait Telemetry: Send + Sync {
    fn record(&self, entry: TraceEntry);
    fn flush(&self);
}

/// Simple in-memory collector for traces.
#[derive(Default)]
pub struct MemoryTelemetry {
    traces: Mutex<Vec<TraceEntry>>,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_traces(&self) -> Vec<TraceEntry> {
        self.traces.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Counts recorded events for one node matching `event`.
    pub fn count(&self, node_id: &str, event: &TraceEvent) -> usize {
        self.get_traces()
            .iter()
            .filter(|t| t.node_id == node_id && &t.event == event)
            .count()
    }
}

impl Telemetry for MemoryTelemetry {
    fn record(&self, entry: TraceEntry) {
        match self.traces.lock() {
            Ok(mut traces) => traces.push(entry),
            Err(_) => log::error!("Dropping trace entry for node {}: lock poisoned", entry.node_id),
        }
    }

    fn flush(&self) {
        // No-op for memory collector
    }
}
