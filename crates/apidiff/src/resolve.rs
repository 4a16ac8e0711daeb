//! Reference resolution over document fragments.
//!
//! All walks are iterative with an explicit stack, so self-referential or
//! mutually recursive components terminate without growing the call stack.

use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use tracing::trace;

use crate::types::{ComponentId, ComponentRef, Document};

/// The component a node points at, when the node is a `$ref` object into
/// `#/components/...`.
pub fn reference_of(node: &Value) -> Option<ComponentRef> {
    node.get("$ref")
        .and_then(Value::as_str)
        .and_then(ComponentRef::parse)
}

fn push_children<'a>(node: &'a Value, stack: &mut Vec<&'a Value>) {
    match node {
        Value::Object(map) => stack.extend(map.values()),
        Value::Array(items) => stack.extend(items.iter()),
        _ => {}
    }
}

/// Components referenced anywhere inside `node`, without following the
/// references themselves.
pub fn direct_references(node: &Value) -> BTreeSet<ComponentRef> {
    let mut found = BTreeSet::new();
    let mut stack = vec![node];

    while let Some(current) = stack.pop() {
        if let Some(target) = reference_of(current) {
            found.insert(target);
        }
        push_children(current, &mut stack);
    }

    found
}

/// Every component reachable from `node` through `$ref` edges.
///
/// Each referenced definition is entered once; a reference to a component
/// missing from `doc` is recorded but goes no further.
pub fn referenced_components(node: &Value, doc: &Document) -> BTreeSet<ComponentRef> {
    let mut found = BTreeSet::new();
    let mut stack = vec![node];

    while let Some(current) = stack.pop() {
        if let Some(target) = reference_of(current)
            && !found.contains(&target)
        {
            match doc.resolve(&target) {
                Some(definition) => stack.push(definition),
                None => trace!(reference = %target, "dangling reference"),
            }
            found.insert(target);
        }
        push_children(current, &mut stack);
    }

    found
}

const COMBINATORS: [&str; 3] = ["oneOf", "anyOf", "allOf"];

/// Whether `schema` leads to `target` through schema structure.
///
/// Follows `$ref`, the `oneOf`/`anyOf`/`allOf` combinators, `properties`,
/// `items`, and object-valued `additionalProperties`. Other keywords are not
/// inspected. A node already visited is skipped.
///
/// A `$ref` is a hit when [`ComponentId::matches`] accepts it. For a
/// name-only `target` that means any category: `#/components/responses/Pet`
/// matches `Pet` just like `#/components/schemas/Pet` does.
pub fn schema_references_component(schema: &Value, target: &ComponentId, doc: &Document) -> bool {
    let mut seen: HashSet<*const Value> = HashSet::new();
    let mut stack = vec![schema];

    while let Some(node) = stack.pop() {
        if !seen.insert(std::ptr::from_ref(node)) {
            continue;
        }
        let Some(obj) = node.as_object() else {
            continue;
        };

        if let Some(reference) = reference_of(node) {
            if target.matches(&reference) {
                return true;
            }
            if let Some(definition) = doc.resolve(&reference) {
                stack.push(definition);
            }
        }

        for combinator in COMBINATORS {
            if let Some(Value::Array(branches)) = obj.get(combinator) {
                stack.extend(branches.iter());
            }
        }
        if let Some(Value::Object(properties)) = obj.get("properties") {
            stack.extend(properties.values());
        }
        if let Some(items) = obj.get("items") {
            stack.push(items);
        }
        if let Some(extra @ Value::Object(_)) = obj.get("additionalProperties") {
            stack.push(extra);
        }
    }

    false
}
