//! Component change detection and propagation.

use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::debug;

use crate::options::{DiffOptions, IdentityMode, Propagation};
use crate::resolve::referenced_components;
use crate::types::{ComponentId, Document};

/// Components of `current` that are new or differ from `previous`, in
/// document order.
pub fn directly_changed(
    previous: &Document,
    current: &Document,
    options: &DiffOptions,
) -> Vec<ComponentId> {
    let mut changed = Vec::new();
    for (target, definition) in current.components() {
        if !options
            .equality
            .same(previous.resolve(&target), Some(definition))
        {
            changed.push(options.identity.identify(&target));
        }
    }
    changed
}

/// For each identity, the current components whose definition reaches it,
/// directly or through the components it references.
pub fn referrers(doc: &Document, identity: IdentityMode) -> HashMap<ComponentId, BTreeSet<ComponentId>> {
    let mut edges: HashMap<ComponentId, BTreeSet<ComponentId>> = HashMap::new();
    for (source, definition) in doc.components() {
        let referrer = identity.identify(&source);
        for target in referenced_components(definition, doc) {
            let referenced = identity.identify(&target);
            if referenced != referrer {
                edges.entry(referenced).or_default().insert(referrer.clone());
            }
        }
    }
    edges
}

/// The changed-component set: direct changes plus their referrers, as far
/// as [`DiffOptions::propagation`] allows.
pub fn changed_components(
    previous: &Document,
    current: &Document,
    options: &DiffOptions,
) -> BTreeSet<ComponentId> {
    let direct = directly_changed(previous, current, options);
    let edges = referrers(current, options.identity);
    let mut changed: BTreeSet<ComponentId> = direct.iter().cloned().collect();

    match options.propagation {
        Propagation::SinglePass => {
            for id in &direct {
                if let Some(sources) = edges.get(id) {
                    changed.extend(sources.iter().cloned());
                }
            }
        }
        Propagation::Closure => {
            let mut queue: VecDeque<ComponentId> = direct.iter().cloned().collect();
            while let Some(id) = queue.pop_front() {
                for source in edges.get(&id).into_iter().flatten() {
                    if changed.insert(source.clone()) {
                        queue.push_back(source.clone());
                    }
                }
            }
        }
    }

    debug!(
        direct = direct.len(),
        total = changed.len(),
        "changed components detected"
    );
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    fn chain(a_type: &str) -> Document {
        doc(json!({
            "components": { "schemas": {
                "A": { "type": a_type },
                "B": { "properties": { "a": { "$ref": "#/components/schemas/A" } } },
                "C": { "items": { "$ref": "#/components/schemas/B" } },
                "D": { "type": "boolean" }
            } }
        }))
    }

    fn names(ids: &BTreeSet<ComponentId>) -> Vec<&str> {
        ids.iter().map(|id| id.name.as_str()).collect()
    }

    #[test]
    fn test_identical_documents_have_no_changes() {
        let d = chain("string");
        assert!(changed_components(&d, &d, &DiffOptions::default()).is_empty());
    }

    #[test]
    fn test_new_component_is_changed() {
        let prev = doc(json!({ "components": { "schemas": { "A": {} } } }));
        let curr = doc(json!({ "components": { "schemas": { "A": {}, "New": {} } } }));
        let changed = changed_components(&prev, &curr, &DiffOptions::default());
        assert_eq!(names(&changed), ["New"]);
    }

    #[test]
    fn test_removed_component_is_not_reported() {
        let prev = doc(json!({ "components": { "schemas": { "A": {}, "Gone": {} } } }));
        let curr = doc(json!({ "components": { "schemas": { "A": {} } } }));
        assert!(changed_components(&prev, &curr, &DiffOptions::default()).is_empty());
    }

    #[test]
    fn test_single_pass_marks_transitive_referrers() {
        let changed = changed_components(
            &chain("string"),
            &chain("integer"),
            &DiffOptions::default(),
        );
        assert_eq!(names(&changed), ["A", "B", "C"]);
    }

    /// `Outer` reaches `responses/Holder`, which shares a name with the
    /// marked `schemas/Holder` but never reaches `Pet` itself.
    fn shadowed(pet_type: &str) -> Document {
        doc(json!({
            "components": {
                "schemas": {
                    "Pet": { "type": pet_type },
                    "Holder": { "properties": { "pet": { "$ref": "#/components/schemas/Pet" } } }
                },
                "responses": { "Holder": { "description": "holder" } },
                "requestBodies": { "Outer": { "$ref": "#/components/responses/Holder" } }
            }
        }))
    }

    #[test]
    fn test_single_pass_does_not_follow_marked_names() {
        let changed = changed_components(
            &shadowed("object"),
            &shadowed("string"),
            &DiffOptions::default(),
        );
        assert_eq!(names(&changed), ["Holder", "Pet"]);
    }

    #[test]
    fn test_closure_follows_marked_names() {
        let options = DiffOptions {
            propagation: Propagation::Closure,
            ..DiffOptions::default()
        };
        let changed = changed_components(&shadowed("object"), &shadowed("string"), &options);
        assert_eq!(names(&changed), ["Holder", "Outer", "Pet"]);
    }

    #[test]
    fn test_closure_marks_transitive_referrers() {
        let options = DiffOptions {
            propagation: Propagation::Closure,
            ..DiffOptions::default()
        };
        let changed = changed_components(&chain("string"), &chain("integer"), &options);
        assert_eq!(names(&changed), ["A", "B", "C"]);
    }

    #[test]
    fn test_propagation_crosses_categories() {
        let make = |t: &str| {
            doc(json!({
                "components": {
                    "schemas": { "Pet": { "type": t } },
                    "responses": { "PetResponse": {
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                    } }
                }
            }))
        };
        let changed = changed_components(&make("object"), &make("string"), &DiffOptions::default());
        assert_eq!(names(&changed), ["Pet", "PetResponse"]);
    }

    #[test]
    fn test_name_only_identity_merges_categories() {
        let make = |t: &str| {
            doc(json!({
                "components": {
                    "schemas": { "Pet": { "type": t } },
                    "responses": { "Pet": { "description": "pet" } },
                    "requestBodies": { "Wrapper": { "$ref": "#/components/responses/Pet" } }
                }
            }))
        };
        let legacy = changed_components(&make("object"), &make("string"), &DiffOptions::default());
        assert_eq!(names(&legacy), ["Pet", "Wrapper"]);

        let qualified = DiffOptions {
            identity: IdentityMode::Qualified,
            ..DiffOptions::default()
        };
        let strict = changed_components(&make("object"), &make("string"), &qualified);
        assert_eq!(
            strict.into_iter().collect::<Vec<_>>(),
            [ComponentId::qualified("schemas", "Pet")]
        );
    }

    #[test]
    fn test_self_and_mutual_references_terminate() {
        let make = |t: &str| {
            doc(json!({
                "components": { "schemas": {
                    "Node": { "type": t, "properties": { "next": { "$ref": "#/components/schemas/Node" } } },
                    "A": { "properties": { "b": { "$ref": "#/components/schemas/B" } } },
                    "B": { "properties": { "a": { "$ref": "#/components/schemas/A" }, "n": { "$ref": "#/components/schemas/Node" } } }
                } }
            }))
        };
        let options = DiffOptions {
            propagation: Propagation::Closure,
            ..DiffOptions::default()
        };
        let changed = changed_components(&make("object"), &make("array"), &options);
        assert_eq!(names(&changed), ["A", "B", "Node"]);
    }

    #[test]
    fn test_key_order_counts_as_change_only_when_serialized() {
        let prev = doc(json!({ "components": { "schemas": { "A": { "type": "object", "title": "a" } } } }));
        let curr = doc(json!({ "components": { "schemas": { "A": { "title": "a", "type": "object" } } } }));
        assert_eq!(
            changed_components(&prev, &curr, &DiffOptions::default()).len(),
            1
        );
        assert!(changed_components(&prev, &curr, &DiffOptions::strict()).is_empty());
    }
}
