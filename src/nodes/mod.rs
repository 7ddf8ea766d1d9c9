//! The node kinds the registry owns.
//!
//! - [`InputNode`]: entry point, resolves information to a durable id
//! - [`OutputNode`]: finalizes a result or requeues toward the entry node
//! - [`ReadSeparatorNode`]: per-node memoized separator
//! - [`ReadInformationSequenceNode`]: information id to information
//! - [`PassThroughNode`]: identity

pub mod input;
pub mod output;
pub mod pass_through;
pub mod read_information_sequence;
pub mod read_separator;

pub use input::InputNode;
pub use output::OutputNode;
pub use pass_through::PassThroughNode;
pub use read_information_sequence::ReadInformationSequenceNode;
pub use read_separator::ReadSeparatorNode;
