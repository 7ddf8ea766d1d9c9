use crate::core::context::ControlContext;
use crate::core::node::{Action, NodeKind, NodeLogic};
use crate::error::Result;
use crate::services::peer::PeerStore;
use futures::FutureExt;
use std::sync::Arc;

/// Reads the information stored under an information id.
pub struct ReadInformationSequenceNode {
    peers: Arc<dyn PeerStore>,
}

impl ReadInformationSequenceNode {
    pub fn new(peers: Arc<dyn PeerStore>) -> Self {
        Self { peers }
    }

    pub async fn execute(&self, _ctx: ControlContext, information_id: String) -> Result<String> {
        let peer = self.peers.search_by_id(&information_id).await?;
        Ok(peer.value().to_string())
    }
}

impl NodeLogic for ReadInformationSequenceNode {
    fn kind(&self) -> NodeKind {
        NodeKind::ReadInformationSequence
    }

    fn action(self: Arc<Self>) -> Action {
        Action::ReadInformationSequence(Arc::new(move |ctx: ControlContext, id: String| {
            let node = self.clone();
            async move { node.execute(ctx, id).await }.boxed()
        }))
    }
}
