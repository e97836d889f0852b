/// Core workflow type definitions
///
/// Defines the node and edge structures handed over by the workflow editor.
/// These types are deserialized from the editor's JSON and never mutated by the engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single node in the workflow graph
///
/// Nodes represent one step of a run (start, text templating, HTTP call, email, end).
/// The `data` mapping carries the kind-specific configuration set in the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique node identifier within the workflow (e.g., "n1", "start")
    pub id: String,
    /// The kind of node which determines execution behavior
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Kind-specific configuration (string keys to arbitrary values)
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl NodeDefinition {
    /// Create a node with an empty configuration
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            data: Map::new(),
        }
    }

    /// Builder-style helper to set one configuration entry
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Read a configuration entry as a string slice
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// The closed set of node kinds the engine knows how to execute
///
/// - Start: entry marker, emits a "Workflow started" payload
/// - End: terminal marker, wraps whatever reached it as `finalData`
/// - Email: sends a templated email through the configured transport
/// - Api: issues an HTTP call and returns the parsed JSON body
/// - Text: templates a string, substituting `{{parentData}}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Expected data: none
    Start,
    /// Expected data: none
    End,
    /// Expected data: { "email": "to@example.com", "subject": "...", "message": "..." }
    /// Optional overrides: { "serviceId": "...", "templateId": "...", "publicKey": "..." }
    Email,
    /// Expected data: { "url": "https://api.example.com/data", "method": "GET", "headers": {...} }
    Api,
    /// Expected data: { "text": "Hello {{parentData}}" }
    Text,
}

impl NodeKind {
    /// Lowercase tag as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Email => "email",
            NodeKind::Api => "api",
            NodeKind::Text => "text",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed connection between two nodes
///
/// Edges define both execution order and data flow: the source node's
/// outcome data becomes the target node's parent data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDefinition {
    /// Edge identifier assigned by the editor
    pub id: String,
    /// Source node ID
    pub source: String,
    /// Target node ID
    pub target: String,
}

impl EdgeDefinition {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Request body the editor posts to run a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    pub workflow_id: String,
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_deserializes_type_tag() {
        let node: NodeDefinition = serde_json::from_value(json!({
            "id": "t",
            "type": "text",
            "data": { "text": "hi" }
        }))
        .unwrap();

        assert_eq!(node.kind, NodeKind::Text);
        assert_eq!(node.str_param("text"), Some("hi"));
    }

    #[test]
    fn test_node_data_defaults_to_empty() {
        let node: NodeDefinition = serde_json::from_value(json!({ "id": "s", "type": "start" })).unwrap();
        assert!(node.data.is_empty());
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let result = serde_json::from_value::<NodeDefinition>(json!({ "id": "x", "type": "loop" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_workflow_request_uses_camel_case() {
        let request: WorkflowRequest = serde_json::from_value(json!({
            "workflowId": "wf-1",
            "nodes": [{ "id": "s", "type": "start" }],
            "edges": []
        }))
        .unwrap();

        assert_eq!(request.workflow_id, "wf-1");
        assert_eq!(request.nodes.len(), 1);
    }
}
