//! Provides a separator that stays the same for a given node.
//!
//! The node identifies itself through `current-node-id` and looks up an index
//! mapping from that id to an information peer holding the separator. When no
//! mapping exists yet, a separator is made up by sampling one character of a
//! random known information, stored as a new peer, and mapped. Every later
//! call for the same node id returns that separator.

use crate::core::context::{ContextKey, ControlContext};
use crate::core::node::{Action, NodeKind, NodeLogic};
use crate::error::{ClgError, Result};
use crate::services::index::IndexService;
use crate::services::peer::PeerStore;
use crate::services::random::RandomService;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;

pub const NAMESPACE_SEPARATOR: &str = "separator";
pub const NAMESPACE_NODE_ID: &str = "node-id";
pub const NAMESPACE_INFORMATION_ID: &str = "information-id";

const NAMESPACES: [&str; 3] = [NAMESPACE_SEPARATOR, NAMESPACE_NODE_ID, NAMESPACE_INFORMATION_ID];

pub struct ReadSeparatorNode {
    index: Arc<dyn IndexService>,
    peers: Arc<dyn PeerStore>,
    random: Arc<dyn RandomService>,
}

impl ReadSeparatorNode {
    pub fn new(
        index: Arc<dyn IndexService>,
        peers: Arc<dyn PeerStore>,
        random: Arc<dyn RandomService>,
    ) -> Self {
        Self {
            index,
            peers,
            random,
        }
    }

    pub async fn execute(&self, ctx: ControlContext) -> Result<String> {
        let node_id = ctx.current_node_id().ok_or_else(|| {
            ClgError::InvalidNodeId(format!("{} must not be empty", ContextKey::CurrentNodeId))
        })?;

        match self.index.search(&NAMESPACES, node_id).await {
            Ok(information_id) => {
                let peer = self.peers.search_by_id(&information_id).await?;
                Ok(peer.value().to_string())
            }
            Err(err) if err.is_not_found() => self.create_separator(node_id).await,
            Err(err) => Err(err),
        }
    }

    async fn create_separator(&self, node_id: &str) -> Result<String> {
        let feature = self.peers.random().await?;
        let characters: Vec<char> = feature.value().chars().collect();
        let position = self.random.create_max(characters.len())?;
        let separator = characters.get(position).ok_or_else(|| {
            ClgError::Random(format!(
                "index {} out of range for {} characters",
                position,
                characters.len()
            ))
        })?;

        let peer = self.peers.create(&separator.to_string()).await?;
        self.index.create(&NAMESPACES, node_id, peer.id()).await?;

        // A concurrent first call may have mapped its own separator first.
        let mapped = self.index.search(&NAMESPACES, node_id).await?;
        if mapped != peer.id() {
            log::debug!("Separator for node {} already mapped to {}", node_id, mapped);
            return Ok(self.peers.search_by_id(&mapped).await?.value().to_string());
        }

        log::info!("Created separator peer {} for node {}", peer.id(), node_id);
        Ok(peer.value().to_string())
    }
}

impl NodeLogic for ReadSeparatorNode {
    fn kind(&self) -> NodeKind {
        NodeKind::ReadSeparator
    }

    fn action(self: Arc<Self>) -> Action {
        Action::ReadSeparator(Arc::new(move |ctx: ControlContext| {
            let node = self.clone();
            async move { node.execute(ctx).await }.boxed()
        }))
    }

    fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([("namespace".to_string(), NAMESPACES.join(":"))])
    }
}
