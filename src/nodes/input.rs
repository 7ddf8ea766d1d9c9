//! The entry to the graph. The input node resolves the information a client
//! submitted to a durable information id, registering the information the
//! first time it is seen, and seeds the context with that id.

use crate::core::context::ControlContext;
use crate::core::node::{Action, NodeKind, NodeLogic};
use crate::error::Result;
use crate::services::peer::{InformationPeer, PeerStore};
use futures::FutureExt;
use std::sync::Arc;

pub struct InputNode {
    peers: Arc<dyn PeerStore>,
}

impl InputNode {
    pub fn new(peers: Arc<dyn PeerStore>) -> Self {
        Self { peers }
    }

    /// Returns a new context carrying `first-information-id`. The given context
    /// is left as it is.
    pub async fn execute(&self, ctx: ControlContext, information: String) -> Result<ControlContext> {
        let peer = self.lookup_or_create(&information).await?;
        Ok(ctx.with_first_information_id(peer.id()))
    }

    async fn lookup_or_create(&self, information: &str) -> Result<InformationPeer> {
        match self.peers.search_by_value(information).await {
            Ok(peer) => {
                log::debug!("Information already known as {}", peer.id());
                Ok(peer)
            }
            Err(err) if err.is_not_found() => {
                // Concurrent registrations of the same information are resolved
                // by the store.
                let peer = self.peers.create(information).await?;
                log::info!("Registered information peer {}", peer.id());
                Ok(peer)
            }
            Err(err) => Err(err),
        }
    }
}

impl NodeLogic for InputNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Input
    }

    fn action(self: Arc<Self>) -> Action {
        Action::Input(Arc::new(move |ctx: ControlContext, information: String| {
            let node = self.clone();
            async move { node.execute(ctx, information).await }.boxed()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClgError;
    use crate::services::id::UuidIdService;
    use crate::services::peer::MemoryPeerStore;
    use async_trait::async_trait;

    fn node() -> (Arc<InputNode>, Arc<MemoryPeerStore>) {
        let peers = Arc::new(MemoryPeerStore::new(Arc::new(UuidIdService)));
        (Arc::new(InputNode::new(peers.clone())), peers)
    }

    #[tokio::test]
    async fn test_same_information_same_id() {
        let (input, peers) = node();

        let first = input.execute(ControlContext::new(), "hello".into()).await.unwrap();
        let second = input.execute(ControlContext::new(), "hello".into()).await.unwrap();
        let other = input.execute(ControlContext::new(), "world".into()).await.unwrap();

        let id1 = first.first_information_id().unwrap();
        assert_eq!(second.first_information_id(), Some(id1));
        assert_ne!(other.first_information_id(), Some(id1));
        assert_eq!(peers.len(), 2);
    }

    #[tokio::test]
    async fn test_given_context_is_not_mutated() {
        let (input, _) = node();
        let ctx = ControlContext::new().with_current_node_id("n-in");

        let next = input.execute(ctx.clone(), "hello".into()).await.unwrap();

        assert_eq!(ctx.first_information_id(), None);
        assert_eq!(next.current_node_id(), Some("n-in"));
        assert!(next.first_information_id().is_some());
    }

    #[tokio::test]
    async fn test_existing_peer_is_reused() {
        let (input, peers) = node();
        let known = peers.create("hello").await.unwrap();

        let ctx = input.execute(ControlContext::new(), "hello".into()).await.unwrap();

        assert_eq!(ctx.first_information_id(), Some(known.id()));
        assert_eq!(peers.len(), 1);
    }

    #[tokio::test]
    async fn test_action_dispatches_to_execute() {
        let (input, _) = node();
        let Action::Input(action) = input.action() else {
            panic!("input node must expose an input action");
        };
        let ctx = action(ControlContext::new(), "hello".into()).await.unwrap();
        assert!(ctx.first_information_id().is_some());
    }

    struct BrokenStore;

    #[async_trait]
    impl PeerStore for BrokenStore {
        async fn search_by_value(&self, _value: &str) -> Result<InformationPeer> {
            Err(ClgError::Storage("connection refused".into()))
        }

        async fn search_by_id(&self, _id: &str) -> Result<InformationPeer> {
            Err(ClgError::Storage("connection refused".into()))
        }

        async fn create(&self, _value: &str) -> Result<InformationPeer> {
            panic!("create must not be reached when search fails");
        }

        async fn random(&self) -> Result<InformationPeer> {
            Err(ClgError::Storage("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_store_errors_propagate_unchanged() {
        let input = InputNode::new(Arc::new(BrokenStore));
        let err = input
            .execute(ControlContext::new(), "hello".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ClgError::Storage(ref msg) if msg == "connection refused"));
    }
}
