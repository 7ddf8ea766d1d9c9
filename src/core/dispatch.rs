//! Delivers signals to the nodes they are addressed to.

use crate::core::context::ControlContext;
use crate::core::node::{Action, Node, NodeKind};
use crate::core::registry::NodeRegistry;
use crate::core::signal::Signal;
use crate::core::telemetry::{TraceEntry, TraceEvent};
use crate::error::{ClgError, Result};
use crate::services::queue::SignalReceiver;
use std::sync::Arc;

/// What a dispatched action produced, by node kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The entry node's context, carrying `first-information-id`.
    Context(ControlContext),
    /// A value for the next hop.
    Value(String),
    /// The output that went to the result sink.
    Delivered(String),
}

pub struct Dispatcher {
    registry: Arc<NodeRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Runs the action of the node named by the signal's `destination-id`.
    ///
    /// The node sees the signal's context extended with its own id as
    /// `current-node-id`. The entry node additionally claims `first-node-id`
    /// unless an earlier pass already did.
    pub async fn dispatch(&self, signal: Signal) -> Result<Outcome> {
        let node = self
            .registry
            .get(signal.destination_id())
            .cloned()
            .ok_or_else(|| {
                ClgError::InvalidNodeId(format!(
                    "no node registered for destination-id '{}'",
                    signal.destination_id()
                ))
            })?;

        let mut ctx = signal.context().with_current_node_id(node.id());
        if node.kind() == NodeKind::Input {
            ctx = ctx.with_first_node_id(node.id());
        }

        log::debug!("Dispatching signal {} to {} node {}", signal.id(), node.kind(), node.id());
        let outcome = invoke(&node, ctx, &signal).await;
        self.trace(&node, &signal, &outcome);
        outcome
    }

    /// Dispatches signals until every sender of `receiver` is gone. Returns
    /// how many signals were handled.
    pub async fn run(&self, mut receiver: SignalReceiver) -> usize {
        let mut handled = 0;
        while let Some(signal) = receiver.recv().await {
            let id = signal.id().to_string();
            match self.dispatch(signal).await {
                Ok(_) => {}
                Err(err) if err.is_expectation_not_met() => {
                    log::info!("Signal {}: {}; another pass is queued", id, err);
                }
                Err(err) => log::error!("Signal {} failed: {}", id, err),
            }
            handled += 1;
        }
        handled
    }

    fn trace(&self, node: &Node, signal: &Signal, outcome: &Result<Outcome>) {
        let Some(telemetry) = self.registry.telemetry() else {
            return;
        };

        let event = match outcome {
            Ok(Outcome::Context(ctx)) => TraceEvent::Registered {
                information_id: ctx.first_information_id().unwrap_or_default().to_string(),
            },
            Ok(Outcome::Value(value)) => TraceEvent::Value {
                value: value.clone(),
            },
            Ok(Outcome::Delivered(output)) => TraceEvent::Finalized {
                output: output.clone(),
            },
            Err(ClgError::ExpectationNotMet {
                output,
                expectation,
            }) => TraceEvent::Requeued {
                output: output.clone(),
                expectation: expectation.clone(),
            },
            Err(err) => TraceEvent::Failed {
                error: err.to_string(),
            },
        };

        telemetry.record(
            TraceEntry::new(node.id(), node.kind().as_str(), event).with_signal_id(signal.id()),
        );
    }
}

async fn invoke(node: &Node, ctx: ControlContext, signal: &Signal) -> Result<Outcome> {
    match node.action() {
        Action::Input(action) => {
            let information = signal.string_argument(0)?.to_string();
            action(ctx, information).await.map(Outcome::Context)
        }
        Action::Output(action) => {
            let output = signal.string_argument(0)?.to_string();
            action(ctx, output.clone()).await?;
            Ok(Outcome::Delivered(output))
        }
        Action::PassThrough(action) | Action::ReadInformationSequence(action) => {
            let value = signal.string_argument(0)?.to_string();
            action(ctx, value).await.map(Outcome::Value)
        }
        Action::ReadSeparator(action) => action(ctx).await.map(Outcome::Value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RegistryConfig;
    use crate::core::context::Expectation;
    use crate::services::peer::PeerStore;
    use serde_json::json;

    fn signal_to(node: &Node, ctx: ControlContext, args: Vec<serde_json::Value>) -> Signal {
        Signal::new(ctx.with_destination_id(node.id()), args).unwrap()
    }

    #[tokio::test]
    async fn test_input_claims_first_node_id() {
        let wired = RegistryConfig::in_memory();
        let registry = Arc::new(NodeRegistry::new(wired.config).unwrap());
        let dispatcher = Dispatcher::new(registry.clone());
        let input = registry.input();

        let outcome = dispatcher
            .dispatch(signal_to(input, ControlContext::new(), vec![json!("hello")]))
            .await
            .unwrap();

        let Outcome::Context(ctx) = outcome else {
            panic!("input must return a context");
        };
        assert_eq!(ctx.first_node_id(), Some(input.id()));
        assert_eq!(ctx.current_node_id(), Some(input.id()));
        assert!(ctx.first_information_id().is_some());
        assert_eq!(wired.peers.len(), 1);

        let traces = wired.telemetry.get_traces();
        assert!(traces.iter().any(|t| t.node_id == input.id()
            && matches!(t.event, TraceEvent::Registered { .. })));
    }

    #[tokio::test]
    async fn test_unknown_destination() {
        let wired = RegistryConfig::in_memory();
        let dispatcher = Dispatcher::new(Arc::new(NodeRegistry::new(wired.config).unwrap()));
        let signal = Signal::new(
            ControlContext::new().with_destination_id("nowhere"),
            vec![json!("x")],
        )
        .unwrap();

        let err = dispatcher.dispatch(signal).await.unwrap_err();
        assert!(matches!(err, ClgError::InvalidNodeId(_)));
    }

    #[tokio::test]
    async fn test_wrong_argument_shape() {
        let wired = RegistryConfig::in_memory();
        let registry = Arc::new(NodeRegistry::new(wired.config).unwrap());
        let dispatcher = Dispatcher::new(registry.clone());

        let missing = signal_to(registry.pass_through(), ControlContext::new(), vec![]);
        let err = dispatcher.dispatch(missing).await.unwrap_err();
        assert!(matches!(err, ClgError::InvalidArguments(_)));

        let numeric = signal_to(registry.pass_through(), ControlContext::new(), vec![json!(7)]);
        let err = dispatcher.dispatch(numeric).await.unwrap_err();
        assert!(matches!(err, ClgError::InvalidArguments(_)));

        let failed = wired
            .telemetry
            .get_traces()
            .iter()
            .filter(|t| matches!(t.event, TraceEvent::Failed { .. }))
            .count();
        assert_eq!(failed, 2);
    }

    #[tokio::test]
    async fn test_output_delivers_and_traces() {
        let mut wired = RegistryConfig::in_memory();
        let registry = Arc::new(NodeRegistry::new(wired.config.clone()).unwrap());
        let dispatcher = Dispatcher::new(registry.clone());

        let ctx = ControlContext::new().with_expectation(Expectation::new("7"));
        let outcome = dispatcher
            .dispatch(signal_to(registry.output(), ctx, vec![json!("7")]))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Delivered("7".to_string()));
        assert_eq!(wired.results.try_recv().unwrap(), "7");
        assert_eq!(
            wired.telemetry.count(
                registry.output().id(),
                &TraceEvent::Finalized {
                    output: "7".to_string()
                }
            ),
            1
        );
    }

    #[tokio::test]
    async fn test_separator_through_dispatch() {
        let wired = RegistryConfig::in_memory();
        let registry = Arc::new(NodeRegistry::new(wired.config).unwrap());
        let dispatcher = Dispatcher::new(registry.clone());
        wired.peers.create("ab").await.unwrap();

        let node = registry.read_separator();
        let first = dispatcher
            .dispatch(signal_to(node, ControlContext::new(), vec![]))
            .await
            .unwrap();
        let second = dispatcher
            .dispatch(signal_to(node, ControlContext::new(), vec![]))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(wired.index.len(), 1);
    }

    #[tokio::test]
    async fn test_run_drains_until_closed() {
        let wired = RegistryConfig::in_memory();
        let registry = Arc::new(NodeRegistry::new(wired.config).unwrap());
        let dispatcher = Dispatcher::new(registry.clone());

        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        for value in ["a", "b", "a"] {
            sender
                .send(signal_to(registry.input(), ControlContext::new(), vec![json!(value)]))
                .unwrap();
        }
        sender
            .send(signal_to(registry.pass_through(), ControlContext::new(), vec![]))
            .unwrap();
        drop(sender);

        assert_eq!(dispatcher.run(receiver).await, 4);
        assert_eq!(wired.peers.len(), 2);
    }
}
