//! The request-scoped control context threaded through every node invocation.
//!
//! A [`ControlContext`] is never mutated in place. Every `with_*` method
//! returns a new value, so a node handing a context to the next hop can never
//! change what an earlier hop observed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The well-known keys a [`ControlContext`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    CurrentNodeId,
    FirstNodeId,
    FirstInformationId,
    DestinationId,
    SourceIds,
    Expectation,
}

impl ContextKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKey::CurrentNodeId => "current-node-id",
            ContextKey::FirstNodeId => "first-node-id",
            ContextKey::FirstInformationId => "first-information-id",
            ContextKey::DestinationId => "destination-id",
            ContextKey::SourceIds => "source-ids",
            ContextKey::Expectation => "expectation",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The output a computation is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    output: String,
}

impl Expectation {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

/// Immutable carrier of routing tokens for a single external request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlContext {
    current_node_id: Option<String>,
    first_node_id: Option<String>,
    first_information_id: Option<String>,
    destination_id: Option<String>,
    #[serde(default)]
    source_ids: Vec<String>,
    expectation: Option<Expectation>,
}

impl ControlContext {
    /// Creates an empty context for a fresh external request.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expectation(&self, expectation: Expectation) -> Self {
        let mut next = self.clone();
        next.expectation = Some(expectation);
        next
    }

    pub fn with_current_node_id(&self, id: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.current_node_id = Some(id.into());
        next
    }

    /// Records the entry node of this request. Once set the value sticks for
    /// every later pass, including requeues.
    pub fn with_first_node_id(&self, id: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.first_node_id = keep_first(&self.first_node_id, ContextKey::FirstNodeId, id.into());
        next
    }

    /// Records the durable id of the first information. Once set the value
    /// sticks for every later pass, including requeues.
    pub fn with_first_information_id(&self, id: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.first_information_id = keep_first(
            &self.first_information_id,
            ContextKey::FirstInformationId,
            id.into(),
        );
        next
    }

    pub fn with_destination_id(&self, id: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.destination_id = Some(id.into());
        next
    }

    pub fn with_source_ids(&self, ids: Vec<String>) -> Self {
        let mut next = self.clone();
        next.source_ids = ids;
        next
    }

    pub fn current_node_id(&self) -> Option<&str> {
        self.current_node_id.as_deref()
    }

    pub fn first_node_id(&self) -> Option<&str> {
        self.first_node_id.as_deref()
    }

    pub fn first_information_id(&self) -> Option<&str> {
        self.first_information_id.as_deref()
    }

    pub fn destination_id(&self) -> Option<&str> {
        self.destination_id.as_deref()
    }

    pub fn source_ids(&self) -> &[String] {
        &self.source_ids
    }

    pub fn expectation(&self) -> Option<&Expectation> {
        self.expectation.as_ref()
    }

    /// String view of a key. `source-ids` are joined with `,`; an empty list
    /// reads as unset.
    pub fn get(&self, key: ContextKey) -> Option<String> {
        match key {
            ContextKey::CurrentNodeId => self.current_node_id.clone(),
            ContextKey::FirstNodeId => self.first_node_id.clone(),
            ContextKey::FirstInformationId => self.first_information_id.clone(),
            ContextKey::DestinationId => self.destination_id.clone(),
            ContextKey::SourceIds if self.source_ids.is_empty() => None,
            ContextKey::SourceIds => Some(self.source_ids.join(",")),
            ContextKey::Expectation => self.expectation.as_ref().map(|e| e.output.clone()),
        }
    }
}

fn keep_first(current: &Option<String>, key: ContextKey, candidate: String) -> Option<String> {
    match current {
        Some(existing) => {
            if *existing != candidate {
                log::warn!(
                    "Refusing to overwrite {} '{}' with '{}'",
                    key,
                    existing,
                    candidate
                );
            }
            Some(existing.clone())
        }
        None => Some(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_does_not_touch_the_original() {
        let ctx = ControlContext::new();
        let next = ctx
            .with_current_node_id("n-1")
            .with_expectation(Expectation::new("9"));

        assert_eq!(ctx.current_node_id(), None);
        assert!(ctx.expectation().is_none());
        assert_eq!(next.current_node_id(), Some("n-1"));
        assert_eq!(next.expectation().map(Expectation::output), Some("9"));
    }

    #[test]
    fn test_first_tokens_are_never_overwritten() {
        let ctx = ControlContext::new()
            .with_first_node_id("entry-1")
            .with_first_information_id("info-1");

        let again = ctx
            .with_first_node_id("entry-2")
            .with_first_information_id("info-2");

        assert_eq!(again.first_node_id(), Some("entry-1"));
        assert_eq!(again.first_information_id(), Some("info-1"));
    }

    #[test]
    fn test_routing_hints_are_replaced() {
        let ctx = ControlContext::new()
            .with_destination_id("a")
            .with_source_ids(vec!["x".to_string()]);
        let next = ctx
            .with_destination_id("b")
            .with_source_ids(vec!["y".to_string(), "z".to_string()]);

        assert_eq!(next.destination_id(), Some("b"));
        assert_eq!(next.source_ids(), ["y".to_string(), "z".to_string()]);
        assert_eq!(ctx.destination_id(), Some("a"));
    }

    #[test]
    fn test_context_survives_serialization() {
        let ctx = ControlContext::new()
            .with_first_node_id("entry")
            .with_expectation(Expectation::new("hello"));
        let encoded = serde_json::to_string(&ctx).unwrap();
        let decoded: ControlContext = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, ctx);
    }

    #[test]
    fn test_string_view() {
        let ctx = ControlContext::new()
            .with_current_node_id("n-1")
            .with_source_ids(vec!["a".to_string(), "b".to_string()])
            .with_expectation(Expectation::new("7"));

        assert_eq!(ctx.get(ContextKey::CurrentNodeId).as_deref(), Some("n-1"));
        assert_eq!(ctx.get(ContextKey::SourceIds).as_deref(), Some("a,b"));
        assert_eq!(ctx.get(ContextKey::Expectation).as_deref(), Some("7"));
        assert_eq!(ctx.get(ContextKey::FirstNodeId), None);
        assert_eq!(ControlContext::new().get(ContextKey::SourceIds), None);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(ContextKey::FirstInformationId.to_string(), "first-information-id");
        assert_eq!(ContextKey::SourceIds.as_str(), "source-ids");
    }
}
