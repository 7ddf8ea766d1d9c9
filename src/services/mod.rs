//! Interfaces of the collaborators the graph core consumes, together with
//! in-memory implementations of each.
//!
//! - [`PeerStore`] for content-addressed information peers
//! - [`IndexService`] for namespaced key lookups
//! - [`SignalQueue`] for publishing signals
//! - [`ResultSink`] for finalized outputs
//! - [`IdService`] and [`RandomService`] for identifiers and sampling

pub mod id;
pub mod index;
pub mod peer;
pub mod queue;
pub mod random;
pub mod result;

pub use id::{IdService, UuidIdService};
pub use index::{IndexService, MemoryIndex};
pub use peer::{InformationPeer, MemoryPeerStore, PeerStore};
pub use queue::{ChannelSignalQueue, SignalQueue, SignalReceiver};
pub use random::{RandomService, ThreadRandom};
pub use result::{ChannelResultSink, ResultReceiver, ResultSink};
