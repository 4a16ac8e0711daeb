//! Strictness knobs for the diff engine.
//!
//! [`DiffOptions::default`] reproduces the long-standing report output;
//! [`DiffOptions::strict`] picks the stricter behavior for every knob.

use serde_json::Value;

use crate::types::{ComponentId, ComponentRef, Field};

/// How far a component change travels back to its referrers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// One scan over the current components: each one whose references,
    /// followed transitively, reach a directly changed component is marked.
    /// Components reaching only a marked identity are not.
    #[default]
    SinglePass,
    /// Keep scanning until nothing new is marked, so reaching any marked
    /// identity is enough.
    Closure,
}

/// What makes two components the same component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityMode {
    /// The bare name; `schemas/Pet` and `responses/Pet` are one identity.
    #[default]
    NameOnly,
    /// The `(category, name)` pair.
    Qualified,
}

impl IdentityMode {
    pub fn identify(&self, target: &ComponentRef) -> ComponentId {
        match self {
            IdentityMode::NameOnly => ComponentId::named(target.name.as_str()),
            IdentityMode::Qualified => {
                ComponentId::qualified(target.category.as_str(), target.name.as_str())
            }
        }
    }
}

/// How two JSON values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Equality {
    /// Compact serialization must match byte for byte, so object key order
    /// matters.
    #[default]
    Serialized,
    /// Deep equality; object key order is ignored.
    Structural,
}

impl Equality {
    /// Compare two optional values. Absent only equals absent.
    pub fn same(&self, a: Option<&Value>, b: Option<&Value>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => match self {
                Equality::Serialized => a.to_string() == b.to_string(),
                Equality::Structural => a == b,
            },
            _ => false,
        }
    }
}

/// Which operation fields count as a modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldSet {
    #[default]
    Core,
    /// `Core` plus `summary` and `description`.
    Extended,
}

impl FieldSet {
    pub fn fields(&self) -> &'static [Field] {
        match self {
            FieldSet::Core => &[
                Field::OperationId,
                Field::Parameters,
                Field::RequestBody,
                Field::Responses,
            ],
            FieldSet::Extended => &[
                Field::OperationId,
                Field::Parameters,
                Field::RequestBody,
                Field::Responses,
                Field::Summary,
                Field::Description,
            ],
        }
    }
}

/// How removed and added endpoints are paired up as renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameMatching {
    /// Never reclassify.
    Off,
    /// Removed endpoints in document order, each taking the first added
    /// endpoint (in document order) that qualifies and is still free.
    #[default]
    FirstMatch,
    /// Highest-scoring qualifying pairs are taken first; equal scores fall
    /// back to the `FirstMatch` order.
    BestScore,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    pub propagation: Propagation,
    pub identity: IdentityMode,
    pub equality: Equality,
    pub fields: FieldSet,
    pub renames: RenameMatching,
    /// Minimum similarity score for a rename.
    pub rename_threshold: u32,
}

pub const DEFAULT_RENAME_THRESHOLD: u32 = 4;

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            propagation: Propagation::default(),
            identity: IdentityMode::default(),
            equality: Equality::default(),
            fields: FieldSet::default(),
            renames: RenameMatching::default(),
            rename_threshold: DEFAULT_RENAME_THRESHOLD,
        }
    }
}

impl DiffOptions {
    /// Full closure, qualified identities, key-order-insensitive equality,
    /// extended field list, and best-score rename matching.
    pub fn strict() -> Self {
        Self {
            propagation: Propagation::Closure,
            identity: IdentityMode::Qualified,
            equality: Equality::Structural,
            fields: FieldSet::Extended,
            renames: RenameMatching::BestScore,
            rename_threshold: DEFAULT_RENAME_THRESHOLD,
        }
    }
}
