use crate::core::NodeValue;
use crate::core::context::{ContextKey, ControlContext};
use crate::error::{ClgError, Result};
use serde::{Deserialize, Serialize};

/// A message addressed to exactly one node, carrying a context snapshot and
/// positional arguments for the destination's action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    id: String,
    context: ControlContext,
    arguments: Vec<NodeValue>,
}

impl Signal {
    /// Builds a signal from a context that already names its destination.
    pub fn new(context: ControlContext, arguments: Vec<NodeValue>) -> Result<Self> {
        if context.destination_id().is_none() {
            return Err(ClgError::InvalidSignal(format!(
                "{} must not be empty",
                ContextKey::DestinationId
            )));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            context,
            arguments,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn context(&self) -> &ControlContext {
        &self.context
    }

    pub fn arguments(&self) -> &[NodeValue] {
        &self.arguments
    }

    pub fn destination_id(&self) -> &str {
        // Checked in `new`, and the context is never handed out mutably.
        self.context.destination_id().unwrap_or_default()
    }

    pub fn source_ids(&self) -> &[String] {
        self.context.source_ids()
    }

    /// Returns the positional argument at `index` as a string.
    pub fn string_argument(&self, index: usize) -> Result<&str> {
        self.arguments
            .get(index)
            .and_then(NodeValue::as_str)
            .ok_or_else(|| {
                ClgError::InvalidArguments(format!(
                    "signal {} has no string argument at position {}",
                    self.id, index
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signal_requires_destination() {
        let err = Signal::new(ControlContext::new(), vec![]).unwrap_err();
        assert!(matches!(err, ClgError::InvalidSignal(_)));
    }

    #[test]
    fn test_signal_exposes_routing() {
        let ctx = ControlContext::new()
            .with_destination_id("n1")
            .with_source_ids(vec!["n-out".to_string()]);
        let signal = Signal::new(ctx, vec![json!("hello")]).unwrap();

        assert_eq!(signal.destination_id(), "n1");
        assert_eq!(signal.source_ids(), ["n-out".to_string()]);
        assert_eq!(signal.string_argument(0).unwrap(), "hello");
        assert!(!signal.id().is_empty());
    }

    #[test]
    fn test_string_argument_rejects_wrong_shape() {
        let ctx = ControlContext::new().with_destination_id("n1");
        let signal = Signal::new(ctx, vec![json!(42)]).unwrap();

        assert!(matches!(
            signal.string_argument(0),
            Err(ClgError::InvalidArguments(_))
        ));
        assert!(signal.string_argument(1).is_err());
    }
}
