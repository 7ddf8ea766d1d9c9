//! Collaborator wiring for a [`NodeRegistry`](crate::core::registry::NodeRegistry).

use crate::core::telemetry::{MemoryTelemetry, Telemetry};
use crate::services::id::{IdService, UuidIdService};
use crate::services::index::{IndexService, MemoryIndex};
use crate::services::peer::{MemoryPeerStore, PeerStore};
use crate::services::queue::{ChannelSignalQueue, SignalQueue, SignalReceiver};
use crate::services::random::{RandomService, ThreadRandom};
use crate::services::result::{ChannelResultSink, ResultReceiver, ResultSink};
use std::sync::Arc;

/// Handles to every collaborator the nodes consume. All of them except
/// telemetry are required when the registry is built.
#[derive(Clone, Default)]
pub struct RegistryConfig {
    pub id_service: Option<Arc<dyn IdService>>,
    pub index: Option<Arc<dyn IndexService>>,
    pub peers: Option<Arc<dyn PeerStore>>,
    pub random: Option<Arc<dyn RandomService>>,
    pub results: Option<Arc<dyn ResultSink>>,
    pub signals: Option<Arc<dyn SignalQueue>>,
    pub telemetry: Option<Arc<dyn Telemetry>>,
}

/// A fully wired in-memory configuration, with the concrete collaborators and
/// the receiving ends of the channels kept for the caller.
pub struct InMemory {
    pub config: RegistryConfig,
    pub peers: Arc<MemoryPeerStore>,
    pub index: Arc<MemoryIndex>,
    pub telemetry: Arc<MemoryTelemetry>,
    pub signals: SignalReceiver,
    pub results: ResultReceiver,
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires the in-memory reference collaborators.
    pub fn in_memory() -> InMemory {
        let id_service: Arc<dyn IdService> = Arc::new(UuidIdService);
        let peers = Arc::new(MemoryPeerStore::new(id_service.clone()));
        let index = Arc::new(MemoryIndex::new());
        let telemetry = Arc::new(MemoryTelemetry::new());
        let (queue, signals) = ChannelSignalQueue::new();
        let (sink, results) = ChannelResultSink::new();

        let config = RegistryConfig::new()
            .with_id_service(id_service)
            .with_index(index.clone())
            .with_peers(peers.clone())
            .with_random(Arc::new(ThreadRandom))
            .with_results(Arc::new(sink))
            .with_signals(Arc::new(queue))
            .with_telemetry(telemetry.clone());

        InMemory {
            config,
            peers,
            index,
            telemetry,
            signals,
            results,
        }
    }

    pub fn with_id_service(mut self, id_service: Arc<dyn IdService>) -> Self {
        self.id_service = Some(id_service);
        self
    }

    pub fn with_index(mut self, index: Arc<dyn IndexService>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_peers(mut self, peers: Arc<dyn PeerStore>) -> Self {
        self.peers = Some(peers);
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomService>) -> Self {
        self.random = Some(random);
        self
    }

    pub fn with_results(mut self, results: Arc<dyn ResultSink>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_signals(mut self, signals: Arc<dyn SignalQueue>) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }
}
