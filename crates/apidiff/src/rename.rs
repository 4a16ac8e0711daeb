//! Reclassify removed + added endpoint pairs as renames.
//!
//! A pair is only considered when both operations carry the same non-empty
//! `operationId` and the same method. The score is then the sum of:
//!
//! | criterion                                  | weight |
//! |--------------------------------------------|--------|
//! | `responses` equal                          | 2      |
//! | `parameters` equal                         | 2      |
//! | `requestBody` equal                        | 2      |
//! | `summary` equal and non-empty              | 1      |
//! | `description` equal and non-empty          | 1      |
//!
//! Equality of the heavy fields uses [`Equality`], so two operations that
//! both omit a field agree on it.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::endpoints::EndpointDiff;
use crate::options::{DiffOptions, Equality, RenameMatching};
use crate::types::{Document, EndpointKey, Field, Method, Rename};

fn operation_id(operation: &Value) -> Option<&str> {
    operation
        .get(Field::OperationId.as_str())
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

fn same_text(before: &Value, after: &Value, field: Field) -> bool {
    match (
        field.get(before).and_then(Value::as_str),
        field.get(after).and_then(Value::as_str),
    ) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    }
}

/// Similarity of two operations, or `None` when their `operationId`s do
/// not match.
pub fn similarity(before: &Value, after: &Value, equality: Equality) -> Option<u32> {
    let id = operation_id(before)?;
    if operation_id(after) != Some(id) {
        return None;
    }

    let mut score = 0;
    for field in [Field::Responses, Field::Parameters, Field::RequestBody] {
        if equality.same(field.get(before), field.get(after)) {
            score += 2;
        }
    }
    for field in [Field::Summary, Field::Description] {
        if same_text(before, after, field) {
            score += 1;
        }
    }
    Some(score)
}

struct Candidate {
    removed: usize,
    added: usize,
    score: u32,
}

fn take_method(endpoints: &mut BTreeMap<String, BTreeSet<Method>>, key: &EndpointKey) {
    if let Some(methods) = endpoints.get_mut(&key.path) {
        methods.remove(&key.method);
        if methods.is_empty() {
            endpoints.remove(&key.path);
        }
    }
}

/// Move matched pairs out of `added`/`removed` and into the returned rename
/// map, keyed by the old path.
pub fn detect_renames(
    previous: &Document,
    current: &Document,
    mut endpoints: EndpointDiff,
    options: &DiffOptions,
) -> (EndpointDiff, BTreeMap<String, Vec<Rename>>) {
    let mut renamed: BTreeMap<String, Vec<Rename>> = BTreeMap::new();
    if options.renames == RenameMatching::Off
        || endpoints.added.is_empty()
        || endpoints.removed.is_empty()
    {
        return (endpoints, renamed);
    }

    let removed: Vec<(EndpointKey, &Value)> = previous
        .operations()
        .filter(|(path, method, _)| {
            endpoints
                .removed
                .get(*path)
                .is_some_and(|methods| methods.contains(method))
        })
        .map(|(path, method, op)| (EndpointKey::new(path, method), op))
        .collect();
    let added: Vec<(EndpointKey, &Value)> = current
        .operations()
        .filter(|(path, method, _)| {
            endpoints
                .added
                .get(*path)
                .is_some_and(|methods| methods.contains(method))
        })
        .map(|(path, method, op)| (EndpointKey::new(path, method), op))
        .collect();

    let mut candidates = Vec::new();
    for (r, (old, before)) in removed.iter().enumerate() {
        for (a, (new, after)) in added.iter().enumerate() {
            if old.method != new.method {
                continue;
            }
            if let Some(score) = similarity(before, after, options.equality)
                && score >= options.rename_threshold
            {
                candidates.push(Candidate {
                    removed: r,
                    added: a,
                    score,
                });
            }
        }
    }

    for (r, (old, _)) in removed.iter().enumerate() {
        let rivals: Vec<&EndpointKey> = candidates
            .iter()
            .filter(|c| c.removed == r)
            .map(|c| &added[c.added].0)
            .collect();
        if rivals.len() > 1 {
            warn!(
                endpoint = %old,
                candidates = ?rivals.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "ambiguous rename; several added endpoints qualify"
            );
        }
    }

    if options.renames == RenameMatching::BestScore {
        // Stable, so equal scores keep removed-then-added document order.
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
    }

    let mut used_removed = HashSet::new();
    let mut used_added = HashSet::new();
    for candidate in candidates {
        if used_removed.contains(&candidate.removed) || used_added.contains(&candidate.added) {
            continue;
        }
        used_removed.insert(candidate.removed);
        used_added.insert(candidate.added);

        let old = &removed[candidate.removed].0;
        let new = &added[candidate.added].0;
        debug!(from = %old, to = %new, score = candidate.score, "rename detected");

        take_method(&mut endpoints.removed, old);
        take_method(&mut endpoints.added, new);

        let entries = renamed.entry(old.path.clone()).or_default();
        match entries.iter_mut().find(|rename| rename.new_path == new.path) {
            Some(rename) => {
                rename.methods.insert(old.method);
            }
            None => entries.push(Rename {
                new_path: new.path.clone(),
                methods: [old.method].into(),
            }),
        }
    }

    (endpoints, renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::diff_endpoints;
    use serde_json::json;

    fn doc(paths: Value) -> Document {
        Document::from_value(json!({ "paths": paths })).unwrap()
    }

    fn run(
        prev: &Document,
        curr: &Document,
        options: &DiffOptions,
    ) -> (EndpointDiff, BTreeMap<String, Vec<Rename>>) {
        let endpoints = diff_endpoints(prev, curr, options);
        detect_renames(prev, curr, endpoints, options)
    }

    fn list_pets() -> Value {
        json!({
            "operationId": "listPets",
            "parameters": [ { "name": "limit", "in": "query" } ],
            "requestBody": { "content": { "text/plain": {} } },
            "responses": { "200": { "description": "ok" } }
        })
    }

    #[test]
    fn test_similarity_requires_matching_operation_id() {
        let a = list_pets();
        let mut b = list_pets();
        assert_eq!(similarity(&a, &b, Equality::Serialized), Some(6));

        b["operationId"] = json!("other");
        assert_eq!(similarity(&a, &b, Equality::Serialized), None);

        let blank = json!({ "operationId": "" });
        assert_eq!(similarity(&blank, &blank, Equality::Serialized), None);
        assert_eq!(similarity(&json!({}), &json!({}), Equality::Serialized), None);
    }

    #[test]
    fn test_similarity_light_criteria() {
        let a = json!({ "operationId": "x", "summary": "s", "description": "d", "responses": {}, "parameters": [], "requestBody": {} });
        let b = json!({ "operationId": "x", "summary": "s", "description": "d", "responses": { "1": {} }, "parameters": [1], "requestBody": { "a": 1 } });
        assert_eq!(similarity(&a, &b, Equality::Serialized), Some(2));

        let c = json!({ "operationId": "x", "summary": "", "responses": {} });
        let d = json!({ "operationId": "x", "summary": "", "responses": { "1": {} } });
        // absent parameters and requestBody agree; blank summaries do not
        assert_eq!(similarity(&c, &d, Equality::Serialized), Some(4));
    }

    #[test]
    fn test_score_four_is_a_rename() {
        let mut moved = list_pets();
        moved["requestBody"] = json!({ "content": { "application/json": {} } });
        let prev = doc(json!({ "/pets": { "get": list_pets() } }));
        let curr = doc(json!({ "/animals": { "get": moved } }));

        let (endpoints, renamed) = run(&prev, &curr, &DiffOptions::default());
        assert!(endpoints.added.is_empty());
        assert!(endpoints.removed.is_empty());
        assert_eq!(
            renamed["/pets"],
            [Rename {
                new_path: "/animals".into(),
                methods: BTreeSet::from([Method::Get]),
            }]
        );
    }

    #[test]
    fn test_score_zero_stays_added_and_removed() {
        let prev = doc(json!({ "/pets": { "get": {
            "operationId": "listPets", "summary": "a", "description": "a",
            "parameters": [1], "requestBody": { "a": 1 }, "responses": { "200": {} }
        } } }));
        let curr = doc(json!({ "/animals": { "get": {
            "operationId": "listPets", "summary": "b", "description": "b",
            "parameters": [2], "requestBody": { "b": 1 }, "responses": { "201": {} }
        } } }));

        let (endpoints, renamed) = run(&prev, &curr, &DiffOptions::default());
        assert!(renamed.is_empty());
        assert!(endpoints.added.contains_key("/animals"));
        assert!(endpoints.removed.contains_key("/pets"));
    }

    #[test]
    fn test_methods_must_match() {
        let prev = doc(json!({ "/pets": { "get": list_pets() } }));
        let curr = doc(json!({ "/animals": { "post": list_pets() } }));
        let (endpoints, renamed) = run(&prev, &curr, &DiffOptions::default());
        assert!(renamed.is_empty());
        assert_eq!(endpoints.added.len(), 1);
        assert_eq!(endpoints.removed.len(), 1);
    }

    #[test]
    fn test_partial_path_rename_keeps_other_methods() {
        let prev = doc(json!({ "/pets": { "get": list_pets(), "delete": { "operationId": "purge" } } }));
        let curr = doc(json!({ "/animals": { "get": list_pets() } }));
        let (endpoints, renamed) = run(&prev, &curr, &DiffOptions::default());

        assert_eq!(renamed["/pets"][0].new_path, "/animals");
        assert_eq!(endpoints.removed["/pets"], BTreeSet::from([Method::Delete]));
        assert!(endpoints.added.is_empty());
    }

    #[test]
    fn test_methods_between_same_paths_are_merged() {
        let mut create = list_pets();
        create["operationId"] = json!("createPet");
        let prev = doc(json!({ "/pets": { "get": list_pets(), "post": create.clone() } }));
        let curr = doc(json!({ "/animals": { "get": list_pets(), "post": create } }));
        let (_, renamed) = run(&prev, &curr, &DiffOptions::default());

        assert_eq!(renamed["/pets"].len(), 1);
        assert_eq!(
            renamed["/pets"][0].methods,
            BTreeSet::from([Method::Get, Method::Post])
        );
    }

    #[test]
    fn test_first_match_consumes_in_document_order() {
        let mut weaker = list_pets();
        weaker["requestBody"] = json!({ "changed": true });
        let prev = doc(json!({ "/pets": { "get": list_pets() } }));
        let curr = doc(json!({
            "/a": { "get": weaker },
            "/b": { "get": list_pets() }
        }));

        let (endpoints, renamed) = run(&prev, &curr, &DiffOptions::default());
        assert_eq!(renamed["/pets"][0].new_path, "/a");
        assert!(endpoints.added.contains_key("/b"));
    }

    #[test]
    fn test_best_score_prefers_the_closest_candidate() {
        let mut weaker = list_pets();
        weaker["requestBody"] = json!({ "changed": true });
        let prev = doc(json!({ "/pets": { "get": list_pets() } }));
        let curr = doc(json!({
            "/a": { "get": weaker },
            "/b": { "get": list_pets() }
        }));
        let options = DiffOptions {
            renames: RenameMatching::BestScore,
            ..DiffOptions::default()
        };

        let (endpoints, renamed) = run(&prev, &curr, &options);
        assert_eq!(renamed["/pets"][0].new_path, "/b");
        assert!(endpoints.added.contains_key("/a"));
    }

    #[test]
    fn test_an_added_endpoint_is_claimed_once() {
        let prev = doc(json!({ "/a": { "get": list_pets() }, "/b": { "get": list_pets() } }));
        let curr = doc(json!({ "/c": { "get": list_pets() } }));
        let (endpoints, renamed) = run(&prev, &curr, &DiffOptions::default());

        assert_eq!(renamed.len(), 1);
        assert_eq!(renamed["/a"][0].new_path, "/c");
        assert_eq!(endpoints.removed["/b"], BTreeSet::from([Method::Get]));
    }

    #[test]
    fn test_off_leaves_everything_alone() {
        let prev = doc(json!({ "/pets": { "get": list_pets() } }));
        let curr = doc(json!({ "/animals": { "get": list_pets() } }));
        let options = DiffOptions {
            renames: RenameMatching::Off,
            ..DiffOptions::default()
        };
        let (endpoints, renamed) = run(&prev, &curr, &options);
        assert!(renamed.is_empty());
        assert_eq!(endpoints.added.len(), 1);
        assert_eq!(endpoints.removed.len(), 1);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let mut moved = list_pets();
        moved["requestBody"] = json!({ "changed": true });
        let prev = doc(json!({ "/pets": { "get": list_pets() } }));
        let curr = doc(json!({ "/animals": { "get": moved } }));
        let options = DiffOptions {
            rename_threshold: 6,
            ..DiffOptions::default()
        };
        let (_, renamed) = run(&prev, &curr, &options);
        assert!(renamed.is_empty());
    }
}
