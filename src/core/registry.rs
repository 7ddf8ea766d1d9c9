//! Ownership and lifecycle of the well-known nodes.
//!
//! The registry builds one node of every kind from a [`RegistryConfig`] and
//! drives their lifecycles together. [`NodeRegistry::boot`] and
//! [`NodeRegistry::shutdown`] spawn one task per node and wait for all of
//! them. Each runs at most once; later or concurrent callers wait for the
//! first call and return without doing anything.

use crate::core::config::RegistryConfig;
use crate::core::node::{Node, NodeLogic};
use crate::core::telemetry::Telemetry;
use crate::error::{ClgError, Result};
use crate::nodes::{
    InputNode, OutputNode, PassThroughNode, ReadInformationSequenceNode, ReadSeparatorNode,
};
use crate::services::id::IdService;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub struct NodeRegistry {
    input: Arc<Node>,
    output: Arc<Node>,
    pass_through: Arc<Node>,
    read_information_sequence: Arc<Node>,
    read_separator: Arc<Node>,
    nodes: Vec<Arc<Node>>,
    telemetry: Option<Arc<dyn Telemetry>>,
    booted: OnceCell<()>,
    shut_down: OnceCell<()>,
}

fn require<T: ?Sized>(handle: &Option<Arc<T>>, name: &str) -> Result<Arc<T>> {
    handle
        .clone()
        .ok_or_else(|| ClgError::InvalidConfig(format!("{} must not be empty", name)))
}

impl NodeRegistry {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let id_service = require(&config.id_service, "id service")?;
        let index = require(&config.index, "index service")?;
        let peers = require(&config.peers, "peer store")?;
        let random = require(&config.random, "random service")?;
        let results = require(&config.results, "result sink")?;
        let signals = require(&config.signals, "signal queue")?;
        let telemetry = config.telemetry.clone();

        let id_service = id_service.as_ref();

        let input = register(InputNode::new(peers.clone()), id_service, &telemetry)?;
        let output = register(
            OutputNode::new(peers.clone(), signals, results),
            id_service,
            &telemetry,
        )?;
        let pass_through = register(PassThroughNode::new(), id_service, &telemetry)?;
        let read_information_sequence = register(
            ReadInformationSequenceNode::new(peers.clone()),
            id_service,
            &telemetry,
        )?;
        let read_separator = register(
            ReadSeparatorNode::new(index, peers, random),
            id_service,
            &telemetry,
        )?;

        let nodes = vec![
            input.clone(),
            output.clone(),
            pass_through.clone(),
            read_information_sequence.clone(),
            read_separator.clone(),
        ];

        Ok(Self {
            input,
            output,
            pass_through,
            read_information_sequence,
            read_separator,
            nodes,
            telemetry,
            booted: OnceCell::new(),
            shut_down: OnceCell::new(),
        })
    }

    /// Boots every node and waits until all of them are booted.
    pub async fn boot(&self) {
        self.booted
            .get_or_init(|| async {
                fan_out(&self.nodes, |node| async move { node.boot().await }).await;
                log::info!("Booted {} nodes", self.nodes.len());
            })
            .await;
    }

    /// Shuts every node down and waits until all of them are shut down.
    pub async fn shutdown(&self) {
        self.shut_down
            .get_or_init(|| async {
                fan_out(&self.nodes, |node| async move { node.shutdown().await }).await;
                if let Some(telemetry) = &self.telemetry {
                    telemetry.flush();
                }
                log::info!("Shut down {} nodes", self.nodes.len());
            })
            .await;
    }

    pub fn input(&self) -> &Arc<Node> {
        &self.input
    }

    pub fn output(&self) -> &Arc<Node> {
        &self.output
    }

    pub fn pass_through(&self) -> &Arc<Node> {
        &self.pass_through
    }

    pub fn read_information_sequence(&self) -> &Arc<Node> {
        &self.read_information_sequence
    }

    pub fn read_separator(&self) -> &Arc<Node> {
        &self.read_separator
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Node>> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn telemetry(&self) -> Option<&Arc<dyn Telemetry>> {
        self.telemetry.as_ref()
    }
}

fn register<L: NodeLogic>(
    logic: L,
    id_service: &dyn IdService,
    telemetry: &Option<Arc<dyn Telemetry>>,
) -> Result<Arc<Node>> {
    let mut node = Node::new(logic, id_service)?;
    if let Some(telemetry) = telemetry {
        node = node.with_telemetry(telemetry.clone());
    }
    log::debug!("Registered {} node {}", node.kind(), node.id());
    Ok(Arc::new(node))
}

/// Runs `transition` for every node on its own task and waits for all of
/// them. A panicking task is re-raised on the caller.
async fn fan_out<F, Fut>(nodes: &[Arc<Node>], transition: F)
where
    F: Fn(Arc<Node>) -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let handles: Vec<_> = nodes
        .iter()
        .map(|node| tokio::spawn(transition(node.clone())))
        .collect();

    for joined in join_all(handles).await {
        if let Err(err) = joined {
            log::error!("Node lifecycle task failed: {}", err);
            if err.is_panic() {
                std::panic::resume_unwind(err.into_panic());
            }
            panic!("node lifecycle task was cancelled");
        }
    }
}
