//! Endpoint classification: added, removed, and modified operations.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::options::DiffOptions;
use crate::types::{Document, Field, Method, MethodChange};

/// Endpoint-level classification before rename detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointDiff {
    pub added: BTreeMap<String, BTreeSet<Method>>,
    pub removed: BTreeMap<String, BTreeSet<Method>>,
    pub modified: BTreeMap<String, Vec<MethodChange>>,
}

/// Tracked fields whose values differ between two versions of an operation.
pub fn changed_fields(before: &Value, after: &Value, options: &DiffOptions) -> BTreeSet<Field> {
    options
        .fields
        .fields()
        .iter()
        .copied()
        .filter(|field| !options.equality.same(field.get(before), field.get(after)))
        .collect()
}

/// Classify every operation of both revisions.
pub fn diff_endpoints(previous: &Document, current: &Document, options: &DiffOptions) -> EndpointDiff {
    let mut diff = EndpointDiff::default();

    for (path, method, operation) in current.operations() {
        match previous.operation(path, method) {
            None => {
                diff.added.entry(path.to_string()).or_default().insert(method);
            }
            Some(before) => {
                let changed_fields = changed_fields(before, operation, options);
                if !changed_fields.is_empty() {
                    diff.modified
                        .entry(path.to_string())
                        .or_default()
                        .push(MethodChange {
                            method,
                            changed_fields,
                        });
                }
            }
        }
    }

    for (path, method, _) in previous.operations() {
        if current.operation(path, method).is_none() {
            diff.removed.entry(path.to_string()).or_default().insert(method);
        }
    }

    debug!(
        added = diff.added.values().map(BTreeSet::len).sum::<usize>(),
        removed = diff.removed.values().map(BTreeSet::len).sum::<usize>(),
        modified = diff.modified.values().map(Vec::len).sum::<usize>(),
        "endpoints classified"
    );
    diff
}
