#![doc = include_str!("../README.md")]

mod affected;
mod components;
mod diff;
mod endpoints;
mod error;
mod options;
mod rename;
mod resolve;
mod types;
mod usage;

pub mod v1 {
    //! Versioned public API for the diff engine.
    //!
    //! Everything you need is re-exported from this module:
    //!
    //! # Documents and results
    //!
    //! - [`Document`] — one validated revision of an API description
    //! - [`ChangeSet`] — everything that changed between two revisions
    //! - [`diff`] / [`diff_with`] — build a [`ChangeSet`]
    //!
    //! # Identities
    //!
    //! - [`Method`], [`EndpointKey`] — what an endpoint is
    //! - [`ComponentRef`] — a parsed `#/components/<category>/<name>` target
    //! - [`ComponentId`] — the identity reported for a changed component
    //! - [`Field`], [`MethodChange`], [`Rename`] — change details
    //!
    //! # Configuration
    //!
    //! - [`DiffOptions`] with [`Propagation`], [`IdentityMode`],
    //!   [`Equality`], [`FieldSet`], and [`RenameMatching`]
    //!
    //! # Example — a path moved, nothing else changed
    //!
    //! ```
    //! use apidiff::v1::*;
    //! use serde_json::json;
    //!
    //! let get = json!({
    //!     "operationId": "listPets",
    //!     "responses": { "200": { "content": { "application/json": {
    //!         "schema": { "$ref": "#/components/schemas/Pet" }
    //!     } } } }
    //! });
    //! let components = json!({ "schemas": { "Pet": { "type": "object" } } });
    //!
    //! let previous = Document::from_value(json!({
    //!     "paths": { "/pets": { "get": get.clone() } },
    //!     "components": components.clone(),
    //! })).unwrap();
    //! let current = Document::from_value(json!({
    //!     "paths": { "/pets/list": { "get": get } },
    //!     "components": components,
    //! })).unwrap();
    //!
    //! let changes = diff(&previous, &current);
    //! assert_eq!(changes.renamed_to("/pets", Method::Get), Some("/pets/list"));
    //! assert!(changes.added.is_empty());
    //! assert!(changes.removed.is_empty());
    //! ```

    /// Reference resolution over document fragments.
    ///
    /// # Example — what does an operation depend on?
    ///
    /// ```
    /// use apidiff::v1::{ComponentId, ComponentRef, Document, resolve};
    /// use serde_json::json;
    ///
    /// let doc = Document::from_value(json!({
    ///     "components": { "schemas": {
    ///         "Pet": { "properties": { "owner": { "$ref": "#/components/schemas/Owner" } } },
    ///         "Owner": { "type": "object" }
    ///     } }
    /// })).unwrap();
    ///
    /// let schema = json!({ "$ref": "#/components/schemas/Pet" });
    /// let refs = resolve::referenced_components(&schema, &doc);
    /// assert!(refs.contains(&ComponentRef::new("schemas", "Owner")));
    /// assert!(resolve::schema_references_component(&schema, &ComponentId::named("Owner"), &doc));
    /// ```
    pub mod resolve {
        pub use crate::resolve::{
            direct_references, reference_of, referenced_components, schema_references_component,
        };
    }

    /// The individual pipeline stages, for callers that want them one at a time.
    pub mod stages {
        pub use crate::affected::affected_endpoints;
        pub use crate::components::{changed_components, directly_changed, referrers};
        pub use crate::endpoints::{EndpointDiff, changed_fields, diff_endpoints};
        pub use crate::rename::{detect_renames, similarity};
    }

    pub use crate::diff::{diff, diff_with};
    pub use crate::error::{ApiDiffError, Result};
    pub use crate::options::{
        DEFAULT_RENAME_THRESHOLD, DiffOptions, Equality, FieldSet, IdentityMode, Propagation,
        RenameMatching,
    };
    pub use crate::types::{
        ChangeSet, ComponentId, ComponentRef, Document, EndpointKey, Field, Method, MethodChange,
        Rename,
    };
    pub use crate::usage::{Usage, component_usage};
}
