use crate::core::context::ControlContext;
use crate::core::node::{Action, NodeKind, NodeLogic};
use crate::error::Result;
use futures::FutureExt;
use std::sync::Arc;

/// Hands its string argument on unchanged.
#[derive(Debug, Default)]
pub struct PassThroughNode;

impl PassThroughNode {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, _ctx: ControlContext, value: String) -> Result<String> {
        Ok(value)
    }
}

impl NodeLogic for PassThroughNode {
    fn kind(&self) -> NodeKind {
        NodeKind::PassThrough
    }

    fn action(self: Arc<Self>) -> Action {
        Action::PassThrough(Arc::new(move |ctx: ControlContext, value: String| {
            let node = self.clone();
            async move { node.execute(ctx, value).await }.boxed()
        }))
    }
}
