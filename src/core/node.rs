//! Nodes and the actions they expose.
//!
//! A [`Node`] pairs a stable id with a [`NodeLogic`] implementation. The
//! logic decides the node's kind, builds its [`Action`] and may hook into
//! boot and shutdown. Actions are tagged by kind so a caller matches on the
//! variant to learn which arguments the node takes and what it returns.

use crate::core::context::ControlContext;
use crate::core::lifecycle::{Lifecycle, LifecycleState};
use crate::core::telemetry::{Telemetry, TraceEntry, TraceEvent};
use crate::error::Result;
use crate::services::id::IdService;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Input,
    Output,
    PassThrough,
    ReadInformationSequence,
    ReadSeparator,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Input => "input",
            NodeKind::Output => "output",
            NodeKind::PassThrough => "pass/through/string",
            NodeKind::ReadInformationSequence => "read/information/sequence",
            NodeKind::ReadSeparator => "read/separator",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(context, information) -> context` seeded with `first-information-id`.
pub type InputAction =
    Arc<dyn Fn(ControlContext, String) -> BoxFuture<'static, Result<ControlContext>> + Send + Sync>;

/// `(context, output) -> ()`, or the mismatch condition after a requeue.
pub type OutputAction =
    Arc<dyn Fn(ControlContext, String) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// `(context, value) -> value`.
pub type ValueAction =
    Arc<dyn Fn(ControlContext, String) -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// `(context) -> value`.
pub type ContextAction =
    Arc<dyn Fn(ControlContext) -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// A node's callable, tagged by kind. Callers match on the variant to learn
/// the argument and return shape.
#[derive(Clone)]
pub enum Action {
    Input(InputAction),
    Output(OutputAction),
    PassThrough(ValueAction),
    ReadInformationSequence(ValueAction),
    ReadSeparator(ContextAction),
}

impl Action {
    pub fn kind(&self) -> NodeKind {
        match self {
            Action::Input(_) => NodeKind::Input,
            Action::Output(_) => NodeKind::Output,
            Action::PassThrough(_) => NodeKind::PassThrough,
            Action::ReadInformationSequence(_) => NodeKind::ReadInformationSequence,
            Action::ReadSeparator(_) => NodeKind::ReadSeparator,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.kind())
    }
}

/// Defines the behaviour of a node kind.
#[async_trait]
pub trait NodeLogic: Send + Sync + 'static {
    fn kind(&self) -> NodeKind;

    /// Builds the callable for this node. The returned action keeps the logic
    /// alive for as long as it is held.
    fn action(self: Arc<Self>) -> Action;

    /// Node-specific metadata merged over the common keys.
    fn metadata(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    async fn on_boot(&self) {}

    async fn on_shutdown(&self) {}
}

/// A unit of computation with a stable identity, a kind-specific action and
/// a once-only lifecycle.
pub struct Node {
    id: String,
    kind: NodeKind,
    logic: Arc<dyn NodeLogic>,
    lifecycle: Lifecycle,
    metadata: HashMap<String, String>,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl Node {
    /// Creates a node, drawing its id from `id_service`.
    pub fn new<L: NodeLogic>(logic: L, id_service: &dyn IdService) -> Result<Self> {
        let id = id_service.new_id()?;
        let kind = logic.kind();

        let mut metadata = HashMap::from([
            ("id".to_string(), id.clone()),
            ("kind".to_string(), kind.as_str().to_string()),
            ("name".to_string(), "clg".to_string()),
            ("type".to_string(), "service".to_string()),
        ]);
        metadata.extend(logic.metadata());

        Ok(Node {
            id,
            kind,
            logic: Arc::new(logic),
            lifecycle: Lifecycle::new(),
            metadata,
            telemetry: None,
        })
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn action(&self) -> Action {
        self.logic.clone().action()
    }

    /// Returns a copy of the node's metadata.
    pub fn metadata(&self) -> HashMap<String, String> {
        self.metadata.clone()
    }

    pub async fn boot(&self) {
        if self.lifecycle.boot(self.logic.on_boot()).await {
            log::debug!("Booted {} node {}", self.kind, self.id);
            self.trace(LifecycleState::Booted);
        }
    }

    pub async fn shutdown(&self) {
        if self.lifecycle.shutdown(self.logic.on_shutdown()).await {
            log::debug!("Shut down {} node {}", self.kind, self.id);
            self.trace(LifecycleState::Shutdown);
        }
    }

    fn trace(&self, state: LifecycleState) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.record(TraceEntry::new(
                self.id.clone(),
                self.kind.as_str(),
                TraceEvent::Lifecycle(state),
            ));
        }
    }
}
