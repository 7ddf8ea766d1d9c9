//! # clg
//!
//! A signal-driven compute graph substrate. Nodes hand values to each other
//! through asynchronous signals; a request passes through the graph and ends
//! at an output node, which either delivers the result or, when the result
//! misses the expectation the request carries, sends the computation back to
//! the entry node for another pass.
//!
//! ## Features
//!
//! - **Once-only lifecycles**: boot and shutdown run at most once per node,
//!   concurrently across the registry
//! - **Immutable control context**: every hop extends a copy, and the first
//!   node and first information of a request can never be rewritten
//! - **Pluggable collaborators**: peer store, index, queue and result sink are
//!   async traits with in-memory implementations for tests and local runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clg::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn run() -> clg::Result<()> {
//! let wired = RegistryConfig::in_memory();
//! let registry = Arc::new(NodeRegistry::new(wired.config)?);
//! registry.boot().await;
//!
//! let dispatcher = Dispatcher::new(registry.clone());
//! let ctx = ControlContext::new()
//!     .with_expectation(Expectation::new("hello"))
//!     .with_destination_id(registry.input().id());
//! let outcome = dispatcher.dispatch(Signal::new(ctx, vec![json!("hello")])?).await?;
//!
//! registry.shutdown().await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`nodes`]: the node kinds
//! - [`services`]: collaborator traits and in-memory implementations
//! - [`error`]: the crate error type
//! - [`prelude`]: commonly used types (import with `use clg::prelude::*`)

// ============================================================================
// Core Module
// ============================================================================

mod core;

pub mod error;
pub mod nodes;
pub mod services;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use crate::core::NodeValue;
pub use crate::core::config::{InMemory, RegistryConfig};
pub use crate::core::context::{ContextKey, ControlContext, Expectation};
pub use crate::core::dispatch::{Dispatcher, Outcome};
pub use crate::core::lifecycle::{Lifecycle, LifecycleState};
pub use crate::core::node::{
    Action, ContextAction, InputAction, Node, NodeKind, NodeLogic, OutputAction, ValueAction,
};
pub use crate::core::registry::NodeRegistry;
pub use crate::core::signal::Signal;
pub use crate::core::telemetry::{MemoryTelemetry, Telemetry, TraceEntry, TraceEvent};
pub use error::{ClgError, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Everything needed to wire a registry and push signals through it.
///
/// # Example
/// ```rust
/// use clg::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        Action, ClgError, ControlContext, Dispatcher, Expectation, Node, NodeKind, NodeLogic,
        NodeRegistry, NodeValue, Outcome, RegistryConfig, Result, Signal,
    };
}

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
