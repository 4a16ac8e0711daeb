use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{ApiDiffError, Result};

// ============================================================================
// Document
// ============================================================================

/// One revision of an API description, validated and read-only.
///
/// Only two top-level sections are inspected: `components` (a mapping of
/// category to a mapping of name to definition) and `paths` (a mapping of
/// path to a path item whose HTTP-method keys hold operations). Either
/// section may be absent, which reads as empty.
///
/// Object key order is preserved from the source text, so iteration over
/// components and operations follows the order the document lists them.
///
/// # JSON shape
///
/// ```json
/// {
///   "paths": {
///     "/pets": {
///       "get": {
///         "operationId": "listPets",
///         "responses": {
///           "200": {
///             "content": {
///               "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } }
///             }
///           }
///         }
///       }
///     }
///   },
///   "components": { "schemas": { "Pet": { "type": "object" } } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

fn invalid(reason: impl Into<String>) -> ApiDiffError {
    ApiDiffError::InvalidDocument(reason.into())
}

impl Document {
    /// Parse and validate a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;
        Self::from_value(root)
    }

    /// Validate an already-parsed value as a document.
    ///
    /// Fails with [`ApiDiffError::InvalidDocument`] when the root, the
    /// `components` section or one of its categories, the `paths` section,
    /// a path item, or an operation is present but not an object.
    pub fn from_value(root: Value) -> Result<Self> {
        let obj = root
            .as_object()
            .ok_or_else(|| invalid("document root is not an object"))?;

        if let Some(components) = obj.get("components") {
            let categories = components
                .as_object()
                .ok_or_else(|| invalid("`components` is not an object"))?;
            for (category, entries) in categories {
                if !entries.is_object() {
                    return Err(invalid(format!("`components.{category}` is not an object")));
                }
            }
        }

        if let Some(paths) = obj.get("paths") {
            let paths = paths
                .as_object()
                .ok_or_else(|| invalid("`paths` is not an object"))?;
            for (path, item) in paths {
                let item = item
                    .as_object()
                    .ok_or_else(|| invalid(format!("path item `{path}` is not an object")))?;
                for (key, operation) in item {
                    if Method::parse(key).is_some() && !operation.is_object() {
                        return Err(invalid(format!("operation `{key} {path}` is not an object")));
                    }
                }
            }
        }

        Ok(Self { root })
    }

    /// The underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(&self.root)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.root)
    }

    fn section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.root.get(key).and_then(Value::as_object)
    }

    /// Look up `components.<category>.<name>`.
    pub fn component(&self, category: &str, name: &str) -> Option<&Value> {
        self.section("components")?.get(category)?.get(name)
    }

    /// Resolve a parsed reference. `None` for a dangling reference.
    pub fn resolve(&self, target: &ComponentRef) -> Option<&Value> {
        self.component(&target.category, &target.name)
    }

    /// Every component definition, in document order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentRef, &Value)> + '_ {
        self.section("components")
            .into_iter()
            .flat_map(|categories| categories.iter())
            .flat_map(|(category, entries)| {
                entries
                    .as_object()
                    .into_iter()
                    .flat_map(|entries| entries.iter())
                    .map(move |(name, definition)| {
                        (ComponentRef::new(category.as_str(), name.as_str()), definition)
                    })
            })
    }

    /// Every operation as `(path, method, operation)`, in document order.
    ///
    /// Path-item keys that are not HTTP methods (`parameters`, `summary`,
    /// `servers`, ...) are skipped.
    pub fn operations(&self) -> impl Iterator<Item = (&str, Method, &Value)> + '_ {
        self.section("paths")
            .into_iter()
            .flat_map(|paths| paths.iter())
            .flat_map(|(path, item)| {
                item.as_object()
                    .into_iter()
                    .flat_map(|ops| ops.iter())
                    .filter_map(move |(key, operation)| {
                        Method::parse(key).map(|method| (path.as_str(), method, operation))
                    })
            })
    }

    /// Look up one operation. Method keys match case-insensitively.
    pub fn operation(&self, path: &str, method: Method) -> Option<&Value> {
        self.section("paths")?
            .get(path)?
            .as_object()?
            .iter()
            .find(|(key, _)| Method::parse(key) == Some(method))
            .map(|(_, operation)| operation)
    }
}

// ============================================================================
// Identities
// ============================================================================

/// HTTP method of an operation.
///
/// Variants are declared in alphabetical order of their upper-case names, so
/// the derived ordering is the order methods are listed in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Delete,
        Method::Get,
        Method::Head,
        Method::Options,
        Method::Patch,
        Method::Post,
        Method::Put,
        Method::Trace,
    ];

    /// Parse a path-item key, ignoring case. `None` for non-method keys.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(key))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const COMPONENTS_PREFIX: &str = "#/components/";

/// The target of a `#/components/<category>/<name>` reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentRef {
    pub category: String,
    pub name: String,
}

impl ComponentRef {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }

    /// Parse a `$ref` string. Anything that does not point into
    /// `#/components/<category>/<name>` (external files, other local
    /// pointers) yields `None`. JSON-pointer escapes are decoded.
    pub fn parse(reference: &str) -> Option<Self> {
        let rest = reference.strip_prefix(COMPONENTS_PREFIX)?;
        let mut segments = rest.split('/');
        let category = segments.next().filter(|s| !s.is_empty())?;
        let name = segments.next().filter(|s| !s.is_empty())?;
        Some(Self::new(unescape_pointer(category), unescape_pointer(name)))
    }

    /// Render back to `#/components/<category>/<name>`.
    pub fn pointer(&self) -> String {
        format!(
            "{COMPONENTS_PREFIX}{}/{}",
            escape_pointer(&self.category),
            escape_pointer(&self.name)
        )
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Identity of a component in a [`ChangeSet`].
///
/// With no category the identity is the bare name, and every component
/// sharing that name in any category is the same identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub name: String,
}

impl ComponentId {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            category: None,
            name: name.into(),
        }
    }

    pub fn qualified(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            name: name.into(),
        }
    }

    /// Whether a reference target carries this identity.
    pub fn matches(&self, target: &ComponentRef) -> bool {
        self.name == target.name
            && self
                .category
                .as_ref()
                .is_none_or(|category| *category == target.category)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.category {
            Some(category) => write!(f, "{}/{}", category, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A `(path, method)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EndpointKey {
    pub path: String,
    pub method: Method,
}

impl EndpointKey {
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Operation fields compared between revisions.
///
/// Declared in alphabetical order of their JSON names so the derived
/// ordering sorts change lists the way reports print them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Description,
    OperationId,
    Parameters,
    RequestBody,
    Responses,
    Summary,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Description => "description",
            Field::OperationId => "operationId",
            Field::Parameters => "parameters",
            Field::RequestBody => "requestBody",
            Field::Responses => "responses",
            Field::Summary => "summary",
        }
    }

    /// This field's value on an operation, if present.
    pub fn get<'a>(&self, operation: &'a Value) -> Option<&'a Value> {
        operation.get(self.as_str())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ChangeSet
// ============================================================================

/// Changed fields of one method on a path present in both revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodChange {
    pub method: Method,
    pub changed_fields: BTreeSet<Field>,
}

/// Where the methods of a removed path reappeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rename {
    pub new_path: String,
    pub methods: BTreeSet<Method>,
}

/// Everything that changed between two revisions.
///
/// Each `(path, method)` sits in at most one of `added`, `removed`, and
/// `renamed`; `modified` only holds endpoints present in both revisions.
/// `renamed` is keyed by the old path and holds one entry per new path.
///
/// # JSON shape
///
/// ```json
/// {
///   "added": { "/orders": ["POST"] },
///   "removed": {},
///   "modified": { "/pets": [{ "method": "PUT", "changedFields": ["requestBody"] }] },
///   "renamed": { "/pets": [{ "newPath": "/pets/list", "methods": ["GET"] }] },
///   "changedComponents": [{ "name": "Pet" }],
///   "affectedByComponents": { "/pets/{id}": { "GET": [{ "name": "Pet" }] } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub added: BTreeMap<String, BTreeSet<Method>>,
    pub removed: BTreeMap<String, BTreeSet<Method>>,
    pub modified: BTreeMap<String, Vec<MethodChange>>,
    pub renamed: BTreeMap<String, Vec<Rename>>,
    pub changed_components: BTreeSet<ComponentId>,
    pub affected_by_components: BTreeMap<String, BTreeMap<Method, BTreeSet<ComponentId>>>,
}

impl ChangeSet {
    /// No endpoint or component changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.modified.is_empty()
            && self.renamed.is_empty()
            && self.changed_components.is_empty()
            && self.affected_by_components.is_empty()
    }

    pub fn is_added(&self, path: &str, method: Method) -> bool {
        self.added
            .get(path)
            .is_some_and(|methods| methods.contains(&method))
    }

    pub fn is_removed(&self, path: &str, method: Method) -> bool {
        self.removed
            .get(path)
            .is_some_and(|methods| methods.contains(&method))
    }

    pub fn is_modified(&self, path: &str, method: Method) -> bool {
        self.modified
            .get(path)
            .is_some_and(|changes| changes.iter().any(|c| c.method == method))
    }

    /// The new path `method` of `old_path` was renamed to, if any.
    pub fn renamed_to(&self, old_path: &str, method: Method) -> Option<&str> {
        self.renamed
            .get(old_path)?
            .iter()
            .find(|rename| rename.methods.contains(&method))
            .map(|rename| rename.new_path.as_str())
    }
}
