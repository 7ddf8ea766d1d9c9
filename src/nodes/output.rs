//! The output node closes the loop of a computation.
//!
//! Each invocation starts out evaluating the calculated output against the
//! expectation carried by the context. Without an expectation, or when the
//! two match, the output is final and goes to the result sink. Otherwise the
//! computation is sent back to the entry node of the current request with the
//! very first information as its argument, and the caller learns about the
//! mismatch through [`ClgError::ExpectationNotMet`].

use crate::core::NodeValue;
use crate::core::context::{ContextKey, ControlContext};
use crate::core::node::{Action, NodeKind, NodeLogic};
use crate::core::signal::Signal;
use crate::error::{ClgError, Result};
use crate::services::peer::PeerStore;
use crate::services::queue::SignalQueue;
use crate::services::result::ResultSink;
use futures::FutureExt;
use std::sync::Arc;

/// Outcome of evaluating a calculated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
    Finalize,
    Requeue { expectation: String },
}

pub(crate) fn evaluate(ctx: &ControlContext, output: &str) -> Verdict {
    match ctx.expectation() {
        None => Verdict::Finalize,
        Some(expectation) if expectation.output() == output => Verdict::Finalize,
        Some(expectation) => Verdict::Requeue {
            expectation: expectation.output().to_string(),
        },
    }
}

pub struct OutputNode {
    peers: Arc<dyn PeerStore>,
    signals: Arc<dyn SignalQueue>,
    results: Arc<dyn ResultSink>,
}

impl OutputNode {
    pub fn new(
        peers: Arc<dyn PeerStore>,
        signals: Arc<dyn SignalQueue>,
        results: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            peers,
            signals,
            results,
        }
    }

    pub async fn execute(&self, ctx: ControlContext, output: String) -> Result<()> {
        match evaluate(&ctx, &output) {
            Verdict::Finalize => {
                self.results.deliver(output.clone()).await?;
                log::info!("Finalized output '{}'", output);
                Ok(())
            }
            Verdict::Requeue { expectation } => {
                let signal = self.requeue_signal(&ctx).await?;
                let destination = signal.destination_id().to_string();
                self.signals.publish(signal).await?;
                log::info!(
                    "Output '{}' does not match '{}', requeued toward {}",
                    output,
                    expectation,
                    destination
                );

                Err(ClgError::ExpectationNotMet {
                    output,
                    expectation,
                })
            }
        }
    }

    /// Builds the signal that starts the next pass at the entry node, feeding
    /// it the information the client originally submitted.
    async fn requeue_signal(&self, ctx: &ControlContext) -> Result<Signal> {
        let information_id = ctx.first_information_id().ok_or_else(|| {
            ClgError::InvalidInformationId(format!(
                "{} must not be empty",
                ContextKey::FirstInformationId
            ))
        })?;
        let information = self.peers.search_by_id(information_id).await?;

        let first_node_id = ctx.first_node_id().ok_or_else(|| {
            ClgError::InvalidNodeId(format!("{} must not be empty", ContextKey::FirstNodeId))
        })?;
        let current_node_id = ctx.current_node_id().ok_or_else(|| {
            ClgError::InvalidNodeId(format!("{} must not be empty", ContextKey::CurrentNodeId))
        })?;

        let forward = ctx
            .with_destination_id(first_node_id)
            .with_source_ids(vec![current_node_id.to_string()]);

        Signal::new(
            forward,
            vec![NodeValue::String(information.value().to_string())],
        )
    }
}

impl NodeLogic for OutputNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Output
    }

    fn action(self: Arc<Self>) -> Action {
        Action::Output(Arc::new(move |ctx: ControlContext, output: String| {
            let node = self.clone();
            async move { node.execute(ctx, output).await }.boxed()
        }))
    }
}
