use crate::error::{ClgError, Result};
use crate::services::id::IdService;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A content-addressed record: a durable id and the value it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationPeer {
    id: String,
    value: String,
}

impl InformationPeer {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Storage of information peers.
///
/// Searches report a miss with [`ClgError::NotFound`]. `create` is
/// lookup-or-create: the same value always resolves to the same peer, and the
/// implementation is responsible for resolving concurrent creations of the
/// same value to a single winner.
#[async_trait]
pub trait PeerStore: Send + Sync {
    async fn search_by_value(&self, value: &str) -> Result<InformationPeer>;

    async fn search_by_id(&self, id: &str) -> Result<InformationPeer>;

    async fn create(&self, value: &str) -> Result<InformationPeer>;

    /// Returns any stored peer.
    async fn random(&self) -> Result<InformationPeer>;
}

#[derive(Default)]
struct PeerTable {
    values: HashMap<String, String>,
    ids: HashMap<String, String>,
    order: Vec<String>,
}

/// A [`PeerStore`] kept in process memory. Every create runs its lookup and
/// insert under one lock.
pub struct MemoryPeerStore {
    id_service: Arc<dyn IdService>,
    table: Mutex<PeerTable>,
}

impl MemoryPeerStore {
    pub fn new(id_service: Arc<dyn IdService>) -> Self {
        Self {
            id_service,
            table: Mutex::new(PeerTable::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|t| t.order.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, PeerTable>> {
        self.table
            .lock()
            .map_err(|_| ClgError::Storage("peer table lock poisoned".to_string()))
    }
}

#[async_trait]
impl PeerStore for MemoryPeerStore {
    async fn search_by_value(&self, value: &str) -> Result<InformationPeer> {
        let table = self.lock()?;
        table
            .ids
            .get(value)
            .map(|id| InformationPeer::new(id.clone(), value))
            .ok_or_else(|| ClgError::NotFound(format!("information peer with value '{}'", value)))
    }

    async fn search_by_id(&self, id: &str) -> Result<InformationPeer> {
        let table = self.lock()?;
        table
            .values
            .get(id)
            .map(|value| InformationPeer::new(id, value.clone()))
            .ok_or_else(|| ClgError::NotFound(format!("information peer with id '{}'", id)))
    }

    async fn create(&self, value: &str) -> Result<InformationPeer> {
        let mut table = self.lock()?;
        if let Some(id) = table.ids.get(value) {
            return Ok(InformationPeer::new(id.clone(), value));
        }

        let id = self.id_service.new_id()?;
        table.values.insert(id.clone(), value.to_string());
        table.ids.insert(value.to_string(), id.clone());
        table.order.push(id.clone());
        log::debug!("Created information peer {}", id);

        Ok(InformationPeer::new(id, value))
    }

    async fn random(&self) -> Result<InformationPeer> {
        let table = self.lock()?;
        let id = table
            .order
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| ClgError::NotFound("peer store is empty".to_string()))?;
        let value = table.values.get(id).cloned().unwrap_or_default();
        Ok(InformationPeer::new(id.clone(), value))
    }
}
