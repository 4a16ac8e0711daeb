//! Endpoints that depend on changed components.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::options::IdentityMode;
use crate::resolve::referenced_components;
use crate::types::{ComponentId, Document, Method};

/// For every operation of `current`, the changed components it reaches
/// through references. Operations reaching none are left out.
pub fn affected_endpoints(
    current: &Document,
    changed: &BTreeSet<ComponentId>,
    identity: IdentityMode,
) -> BTreeMap<String, BTreeMap<Method, BTreeSet<ComponentId>>> {
    let mut affected: BTreeMap<String, BTreeMap<Method, BTreeSet<ComponentId>>> = BTreeMap::new();
    if changed.is_empty() {
        return affected;
    }

    for (path, method, operation) in current.operations() {
        let hits: BTreeSet<ComponentId> = referenced_components(operation, current)
            .iter()
            .map(|target| identity.identify(target))
            .filter(|id| changed.contains(id))
            .collect();
        if !hits.is_empty() {
            affected
                .entry(path.to_string())
                .or_default()
                .insert(method, hits);
        }
    }

    debug!(
        endpoints = affected.values().map(BTreeMap::len).sum::<usize>(),
        "endpoints affected by component changes"
    );
    affected
}
