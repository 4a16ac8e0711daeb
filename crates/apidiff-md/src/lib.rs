//! Render apidiff change-sets as markdown release notes.
//!
//! Each change class becomes a `## Heading` block (`Added`, `Modified`,
//! `Removed`, `Renamed`). Empty blocks are left out and the rest are
//! ordered alphabetically by heading. Endpoints affected only through a
//! changed component are listed under `Modified` after the direct
//! modifications; past [`RenderOptions::inline_affected_paths`] paths they
//! are folded into a `<details>` block.
//!
//! # Example
//!
//! ```
//! use apidiff::v1::{Document, diff};
//! use apidiff_md::{render, RenderOptions};
//! use serde_json::json;
//!
//! let previous = Document::from_value(json!({ "paths": {} })).unwrap();
//! let current = Document::from_value(json!({
//!     "paths": { "/pets": { "get": { "operationId": "listPets" } } }
//! })).unwrap();
//!
//! let changes = diff(&previous, &current);
//! let report = render(&changes, &current, &RenderOptions::default());
//! assert_eq!(report, "## Added\n- [GET] `/pets`\n");
//! ```

use std::collections::{BTreeMap, BTreeSet};

use apidiff::v1::{ChangeSet, ComponentId, Document, Method, MethodChange, component_usage};

/// Options controlling the rendered report.
pub struct RenderOptions {
    /// Component-affected paths listed before the rest are folded away.
    pub inline_affected_paths: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            inline_affected_paths: 5,
        }
    }
}

const DETAILS_OPEN: &str =
    "\n<details><summary>Show more routes affected by component changes...</summary>\n\n";
const DETAILS_CLOSE: &str = "</details>\n";

/// Render a [`ChangeSet`] as markdown. `current` is the document the
/// change-set was computed against; it is read to find where changed
/// components are used.
pub fn render(changes: &ChangeSet, current: &Document, options: &RenderOptions) -> String {
    let mut sections: Vec<String> = [
        render_added(changes),
        render_modified(changes, current, options),
        render_removed(changes),
        render_renamed(changes),
    ]
    .into_iter()
    .flatten()
    .collect();

    sections.sort_by(|a, b| heading(a).cmp(heading(b)));
    sections.join("\n")
}

fn heading(section: &str) -> &str {
    section.lines().next().unwrap_or_default()
}

fn method_list<'a>(methods: impl IntoIterator<Item = &'a Method>) -> String {
    let names: Vec<&str> = methods.into_iter().map(Method::as_str).collect();
    format!("[{}]", names.join("] ["))
}

fn render_endpoint_block(
    title: &str,
    endpoints: &BTreeMap<String, BTreeSet<Method>>,
) -> Option<String> {
    if endpoints.is_empty() {
        return None;
    }
    let mut section = format!("## {}\n", title);
    for (path, methods) in endpoints {
        section.push_str(&format!("- {} `{}`\n", method_list(methods), path));
    }
    Some(section)
}

/// The `## Added` block.
pub fn render_added(changes: &ChangeSet) -> Option<String> {
    render_endpoint_block("Added", &changes.added)
}

/// The `## Removed` block.
pub fn render_removed(changes: &ChangeSet) -> Option<String> {
    render_endpoint_block("Removed", &changes.removed)
}

/// The `## Renamed` block, one line per old path and new path.
pub fn render_renamed(changes: &ChangeSet) -> Option<String> {
    if changes.renamed.is_empty() {
        return None;
    }
    let mut section = String::from("## Renamed\n");
    for (old_path, renames) in &changes.renamed {
        let mut renames: Vec<_> = renames.iter().collect();
        renames.sort_by(|a, b| a.new_path.cmp(&b.new_path));
        for rename in renames {
            section.push_str(&format!(
                "- {} `{}` → `{}`\n",
                method_list(&rename.methods),
                old_path,
                rename.new_path
            ));
        }
    }
    Some(section)
}

type AffectedMethods<'a> = BTreeMap<Method, &'a BTreeSet<ComponentId>>;

/// Component-affected endpoints not already reported as directly modified.
fn affected_only(changes: &ChangeSet) -> BTreeMap<&str, AffectedMethods<'_>> {
    let mut affected: BTreeMap<&str, AffectedMethods<'_>> = BTreeMap::new();
    for (path, methods) in &changes.affected_by_components {
        for (method, components) in methods {
            if changes.is_modified(path, *method) {
                continue;
            }
            affected
                .entry(path.as_str())
                .or_default()
                .insert(*method, components);
        }
    }
    affected
}

/// The `## Modified` block: direct modifications, then endpoints affected
/// only through changed components.
pub fn render_modified(
    changes: &ChangeSet,
    current: &Document,
    options: &RenderOptions,
) -> Option<String> {
    let affected = affected_only(changes);
    if changes.modified.is_empty() && affected.is_empty() {
        return None;
    }

    let mut section = String::from("## Modified\n");
    for (path, method_changes) in &changes.modified {
        let mut method_changes: Vec<&MethodChange> = method_changes.iter().collect();
        method_changes.sort_by_key(|change| change.method);
        for change in method_changes {
            section.push_str(&format!("- [{}] `{}`\n", change.method, path));
            for field in &change.changed_fields {
                section.push_str(&format!("  - {}\n", field));
            }
        }
    }

    let split = options.inline_affected_paths.min(affected.len());
    let paths: Vec<(&str, &AffectedMethods<'_>)> =
        affected.iter().map(|(path, methods)| (*path, methods)).collect();
    let (inline, folded) = paths.split_at(split);

    if !changes.modified.is_empty() && !inline.is_empty() {
        section.push('\n');
    }
    for (path, methods) in inline {
        push_affected(&mut section, path, methods, current);
    }

    if !folded.is_empty() {
        section.push_str(DETAILS_OPEN);
        for (path, methods) in folded {
            push_affected(&mut section, path, methods, current);
        }
        section.push_str(DETAILS_CLOSE);
    }

    Some(section)
}

fn push_affected(
    section: &mut String,
    path: &str,
    methods: &AffectedMethods<'_>,
    current: &Document,
) {
    for (method, components) in methods {
        section.push_str(&format!("- [{}] `{}`\n", method, path));
        let Some(operation) = current.operation(path, *method) else {
            continue;
        };
        for component in components.iter() {
            let usage = component_usage(operation, component, current);
            if usage.is_empty() {
                continue;
            }
            let locations: Vec<&str> = usage.iter().map(|u| u.as_str()).collect();
            section.push_str(&format!(
                "  - `{}` modified in {}\n",
                component,
                locations.join(", ")
            ));
        }
    }
}
