//! The full pipeline from two documents to a [`ChangeSet`].

use tracing::debug;

use crate::affected::affected_endpoints;
use crate::components::changed_components;
use crate::endpoints::diff_endpoints;
use crate::options::DiffOptions;
use crate::rename::detect_renames;
use crate::types::{ChangeSet, Document};

/// Diff two revisions with the default options.
pub fn diff(previous: &Document, current: &Document) -> ChangeSet {
    diff_with(previous, current, &DiffOptions::default())
}

/// Diff two revisions.
///
/// Stages run in order, each taking the values produced before it:
/// component detection, endpoint classification, rename detection, and
/// finally the endpoints affected by changed components.
pub fn diff_with(previous: &Document, current: &Document, options: &DiffOptions) -> ChangeSet {
    debug!(?options, "diffing documents");

    let changed_components = changed_components(previous, current, options);
    let endpoints = diff_endpoints(previous, current, options);
    let (endpoints, renamed) = detect_renames(previous, current, endpoints, options);
    let affected_by_components = affected_endpoints(current, &changed_components, options.identity);

    ChangeSet {
        added: endpoints.added,
        removed: endpoints.removed,
        modified: endpoints.modified,
        renamed,
        changed_components,
        affected_by_components,
    }
}
