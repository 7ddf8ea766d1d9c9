use thiserror::Error;

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ClgError>;

/// Every failure the graph core reports.
///
/// Contract violations (`Invalid*`) are logic errors in the caller or an
/// upstream node. [`ClgError::NotFound`] is the miss signal of the stores and
/// drives create-on-miss. [`ClgError::ExpectationNotMet`] is recoverable: a
/// further pass is already queued. The remaining variants wrap collaborator
/// failures and are propagated unchanged.
#[derive(Debug, Error)]
pub enum ClgError {
    /// A required collaborator was not provided at construction time.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// `first-information-id` was missing where the protocol requires it.
    #[error("invalid information id: {0}")]
    InvalidInformationId(String),

    /// A node id token was missing from the context or did not resolve to a node.
    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    /// A signal was built without a destination.
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    /// Positional arguments did not match the shape of the destination's action.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The calculated output did not match the expectation. A new pass toward
    /// the entry node has already been published when this is returned.
    #[error("expectation not met: '{output}' != '{expectation}'")]
    ExpectationNotMet { output: String, expectation: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("queue error: {0}")]
    Queue(String),

    #[error("result channel error: {0}")]
    ResultChannel(String),

    #[error("id service error: {0}")]
    Id(String),

    #[error("random service error: {0}")]
    Random(String),

}

impl ClgError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClgError::NotFound(_))
    }

    pub fn is_expectation_not_met(&self) -> bool {
        matches!(self, ClgError::ExpectationNotMet { .. })
    }

    pub fn is_invalid_config(&self) -> bool {
        matches!(self, ClgError::InvalidConfig(_))
    }

    /// Missing or unresolvable control tokens. These are logic errors and are
    /// never retried.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ClgError::InvalidInformationId(_)
                | ClgError::InvalidNodeId(_)
                | ClgError::InvalidSignal(_)
                | ClgError::InvalidArguments(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_carries_both_values() {
        let err = ClgError::ExpectationNotMet {
            output: "7".to_string(),
            expectation: "9".to_string(),
        };
        assert_eq!(err.to_string(), "expectation not met: '7' != '9'");
        assert!(err.is_expectation_not_met());
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn test_predicates() {
        assert!(ClgError::NotFound("x".into()).is_not_found());
        assert!(ClgError::InvalidNodeId("must not be empty".into()).is_contract_violation());
        assert!(ClgError::InvalidConfig("peer store must not be empty".into()).is_invalid_config());
        assert!(!ClgError::Storage("down".into()).is_not_found());
    }
}
