//! Where in an operation a component is used.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use crate::resolve::{reference_of, schema_references_component};
use crate::types::{ComponentId, Document};

/// A top-level section of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Usage {
    Parameters,
    RequestBody,
    Responses,
}

impl Usage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Usage::Parameters => "parameters",
            Usage::RequestBody => "requestBody",
            Usage::Responses => "responses",
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sections of `operation` in which `target` appears.
///
/// Each parameter, the request body, and each response is checked for a
/// direct `$ref` to the target, then (after following one `$ref` to a
/// reusable parameter, body, response, or header) for the target in its
/// schemas and example references. Responses are probed through both
/// `content` and `headers`.
pub fn component_usage(operation: &Value, target: &ComponentId, doc: &Document) -> BTreeSet<Usage> {
    let probe = Probe { target, doc };
    let mut usage = BTreeSet::new();

    if let Some(Value::Array(parameters)) = operation.get("parameters")
        && parameters.iter().any(|p| probe.parameter(p))
    {
        usage.insert(Usage::Parameters);
    }
    if let Some(body) = operation.get("requestBody")
        && probe.request_body(body)
    {
        usage.insert(Usage::RequestBody);
    }
    if let Some(Value::Object(responses)) = operation.get("responses")
        && responses.values().any(|r| probe.response(r))
    {
        usage.insert(Usage::Responses);
    }

    usage
}

struct Probe<'a> {
    target: &'a ComponentId,
    doc: &'a Document,
}

impl Probe<'_> {
    fn is_target(&self, node: &Value) -> bool {
        reference_of(node).is_some_and(|r| self.target.matches(&r))
    }

    fn resolved<'v>(&'v self, node: &'v Value) -> &'v Value {
        reference_of(node)
            .and_then(|r| self.doc.resolve(&r))
            .unwrap_or(node)
    }

    fn schema(&self, node: &Value) -> bool {
        node.get("schema")
            .is_some_and(|schema| schema_references_component(schema, self.target, self.doc))
    }

    fn examples(&self, node: &Value) -> bool {
        node.get("examples")
            .and_then(Value::as_object)
            .is_some_and(|examples| examples.values().any(|e| self.is_target(e)))
    }

    fn content(&self, node: &Value) -> bool {
        node.get("content")
            .and_then(Value::as_object)
            .is_some_and(|media| media.values().any(|m| self.schema(m) || self.examples(m)))
    }

    fn parameter(&self, parameter: &Value) -> bool {
        if self.is_target(parameter) {
            return true;
        }
        let parameter = self.resolved(parameter);
        self.schema(parameter) || self.content(parameter) || self.examples(parameter)
    }

    fn request_body(&self, body: &Value) -> bool {
        self.is_target(body) || self.content(self.resolved(body))
    }

    fn header(&self, header: &Value) -> bool {
        if self.is_target(header) {
            return true;
        }
        let header = self.resolved(header);
        self.schema(header) || self.content(header)
    }

    fn response(&self, response: &Value) -> bool {
        if self.is_target(response) {
            return true;
        }
        let response = self.resolved(response);
        self.content(response)
            || response
                .get("headers")
                .and_then(Value::as_object)
                .is_some_and(|headers| headers.values().any(|h| self.header(h)))
    }
}
