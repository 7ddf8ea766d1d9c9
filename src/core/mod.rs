pub mod config;
pub mod context;
pub mod dispatch;
pub mod lifecycle;
pub mod node;
pub mod registry;
pub mod signal;
pub mod telemetry;

/// Positional argument value carried by a [`signal::Signal`].
pub type NodeValue = serde_json::Value;
