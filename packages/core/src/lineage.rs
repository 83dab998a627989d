//! Structural validation of a lineage forest.
//!
//! A lineage is an ordered list of root [`LineageNode`](crate::LineageNode)
//! documents, each owning an ordered `children` list. [`validate_forest`]
//! walks it depth-first and reports:
//!
//! - per-node field errors (`strain_ref`, `relationship`, `generation_depth`,
//!   `sources`, `notes`, `children`);
//! - `CYCLE_DETECTED` at a node whose `strain_ref` equals the `strain_ref` of
//!   an ancestor on its own root-to-node path. Only the path is consulted, so
//!   a shared grandparent reached through two parents (a diamond) and
//!   duplicate siblings are both legal. The repeated subtree under a cycle
//!   point is not descended into;
//! - `OUT_OF_RANGE` when a `generation_depth` is below the nearest ancestor's;
//! - `DEPTH_EXCEEDED` once per node whose traversal depth (roots are 0) or
//!   `generation_depth` exceeds `max_depth`.
//!
//! The walk uses an explicit stack, so arbitrarily deep programmatic input
//! cannot overflow the call stack, and keeps only the current path's
//! identifiers: O(N) time over N nodes and O(depth) auxiliary space. Errors
//! are emitted in pre-order.

use std::collections::HashSet;

use serde_json::Value;

use crate::result::{ErrorCode, ValidationError};
use crate::rules::{field_path, index_path, kind_of, Fields, Presence};
use crate::types::Relationship;
use crate::validation::source_errors;

/// Validate a lineage forest rooted at `path` (e.g.
/// `"genetics_profile.lineage"`). Root `i` is addressed as `path[i]`.
pub fn validate_forest(roots: &[Value], path: &str, max_depth: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut stack: Vec<Step<'_>> = roots
        .iter()
        .enumerate()
        .rev()
        .map(|(i, node)| {
            Step::Enter(Visit {
                node,
                path: index_path(path, i),
                depth: 0,
                floor: None,
            })
        })
        .collect();

    // Identifiers on the current root-to-node path. A node whose identifier
    // is already on the path is never pushed, so the set and the stack stay
    // in lockstep.
    let mut path_refs: Vec<Option<&str>> = Vec::new();
    let mut on_path: HashSet<&str> = HashSet::new();

    while let Some(step) = stack.pop() {
        let visit = match step {
            Step::Leave => {
                if let Some(Some(r)) = path_refs.pop() {
                    on_path.remove(r);
                }
                continue;
            }
            Step::Enter(visit) => visit,
        };

        let Some(object) = visit.node.as_object() else {
            errors.push(ValidationError::new(
                &visit.path,
                ErrorCode::TypeMismatch,
                format!("expected lineage node object, found {}", kind_of(visit.node)),
            ));
            continue;
        };

        let mut fields = Fields::new(object, &visit.path);
        let strain_ref = fields.text("strain_ref", Presence::Required);
        fields.enumerated("relationship", Relationship::WIRE_NAMES, Presence::Required);
        let generation = fields.non_negative_integer("generation_depth", Presence::Optional);
        if let Some(sources) = fields.array("sources", Presence::Optional) {
            let sources_path = fields.path("sources");
            for (i, source) in sources.iter().enumerate() {
                fields.extend(source_errors(source, &index_path(&sources_path, i)));
            }
        }
        fields.string("notes", Presence::Optional);
        let children = fields.array("children", Presence::Optional);
        errors.extend(fields.finish());

        if let Some(r) = strain_ref {
            if on_path.contains(r) {
                errors.push(ValidationError::new(
                    &visit.path,
                    ErrorCode::CycleDetected,
                    format!("strain_ref {r:?} repeats an ancestor on its own lineage path"),
                ));
                continue;
            }
        }

        if let (Some(g), Some(floor)) = (generation, visit.floor) {
            if g < floor {
                errors.push(ValidationError::new(
                    field_path(&visit.path, "generation_depth"),
                    ErrorCode::OutOfRange,
                    format!("generation_depth {g} is below its ancestor's generation_depth {floor}"),
                ));
            }
        }

        let too_deep = visit.depth > max_depth;
        let generation_too_deep = generation.is_some_and(|g| g > max_depth as u64);
        if too_deep || generation_too_deep {
            let what = match (too_deep, generation) {
                (true, _) => format!("node sits at lineage depth {}", visit.depth),
                (false, Some(g)) => format!("generation_depth {g}"),
                (false, None) => unreachable!("generation_too_deep implies a depth"),
            };
            errors.push(ValidationError::new(
                &visit.path,
                ErrorCode::DepthExceeded,
                format!("{what} exceeds the maximum lineage depth of {max_depth}"),
            ));
        }

        let Some(children) = children else {
            continue;
        };
        if children.is_empty() {
            continue;
        }

        if let Some(r) = strain_ref {
            on_path.insert(r);
        }
        path_refs.push(strain_ref);
        stack.push(Step::Leave);

        let floor = match (generation, visit.floor) {
            (Some(g), Some(f)) => Some(g.max(f)),
            (g, f) => g.or(f),
        };
        let children_path = field_path(&visit.path, "children");
        for (i, child) in children.iter().enumerate().rev() {
            stack.push(Step::Enter(Visit {
                node: child,
                path: index_path(&children_path, i),
                depth: visit.depth + 1,
                floor,
            }));
        }
    }

    errors
}

enum Step<'a> {
    Enter(Visit<'a>),
    Leave,
}

struct Visit<'a> {
    node: &'a Value,
    path: String,
    /// Traversal depth; roots are 0.
    depth: usize,
    /// Highest `generation_depth` seen on the path above this node.
    floor: Option<u64>,
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(r: &str, depth: u64, children: Vec<Value>) -> Value {
        let mut n = json!({ "strain_ref": r, "relationship": "ancestor", "generation_depth": depth });
        if !children.is_empty() {
            n["children"] = Value::Array(children);
        }
        n
    }

    fn leaf(r: &str, depth: u64) -> Value {
        node(r, depth, vec![])
    }

    fn check(roots: Value) -> Vec<ValidationError> {
        validate_forest(roots.as_array().unwrap(), "lineage", 10)
    }

    #[test]
    fn empty_forest_is_valid() {
        assert!(check(json!([])).is_empty());
    }

    #[test]
    fn descendant_repeating_ancestor_is_one_cycle() {
        let forest = json!([node("A", 0, vec![node("B", 1, vec![leaf("A", 2)])])]);
        let errors = check(forest);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), ErrorCode::CycleDetected);
        assert_eq!(errors[0].path(), "lineage[0].children[0].children[0]");
    }

    #[test]
    fn direct_self_reference_is_a_cycle() {
        let errors = check(json!([node("A", 0, vec![leaf("A", 1)])]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path(), "lineage[0].children[0]");
    }

    #[test]
    fn cycle_subtree_is_not_descended() {
        let forest = json!([node("A", 0, vec![node("A", 1, vec![leaf("A", 2)])])]);
        let errors = check(forest);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn diamond_is_legal() {
        let forest = json!([node(
            "Child",
            0,
            vec![
                node("Mother", 1, vec![leaf("Grandma", 2)]),
                node("Father", 1, vec![leaf("Grandma", 2)]),
            ]
        )]);
        assert!(check(forest).is_empty());
    }

    #[test]
    fn same_ref_in_separate_roots_is_legal() {
        let forest = json!([node("A", 0, vec![leaf("X", 1)]), node("B", 0, vec![leaf("X", 1)])]);
        assert!(check(forest).is_empty());
    }

    #[test]
    fn duplicate_siblings_are_legal() {
        let forest = json!([node("A", 0, vec![leaf("B", 1), leaf("B", 1)])]);
        assert!(check(forest).is_empty());
    }

    #[test]
    fn sibling_subtrees_do_not_leak_ancestors() {
        // "B" under the second child is not below the first child's "B".
        let forest = json!([node("A", 0, vec![node("B", 1, vec![leaf("C", 2)]), node("C", 1, vec![leaf("B", 2)])])]);
        assert!(check(forest).is_empty());
    }

    #[test]
    fn depth_regression_is_out_of_range() {
        let errors = check(json!([node("A", 2, vec![leaf("B", 1)])]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), ErrorCode::OutOfRange);
        assert_eq!(errors[0].path(), "lineage[0].children[0].generation_depth");
    }

    #[test]
    fn depth_floor_skips_missing_generation() {
        let middle = json!({ "strain_ref": "B", "relationship": "parent", "children": [leaf("C", 1)] });
        let errors = check(json!([node("A", 3, vec![middle])]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path(), "lineage[0].children[0].children[0].generation_depth");
    }

    #[test]
    fn depth_exceeded_reported_per_node() {
        // chain of 13 nodes: traversal depths 0..=12, generation depth equal
        let mut chain = leaf("n12", 12);
        for i in (0..12).rev() {
            chain = node(&format!("n{i}"), i, vec![chain]);
        }
        let errors = validate_forest(&[chain], "lineage", 10);
        let exceeded: Vec<_> = errors
            .iter()
            .filter(|e| e.code() == ErrorCode::DepthExceeded)
            .collect();
        assert_eq!(exceeded.len(), 2);
        assert_eq!(errors.len(), 2);
        assert!(exceeded[0].path().ends_with("children[0]"));
        assert_ne!(exceeded[0].path(), exceeded[1].path());
    }

    #[test]
    fn generation_depth_over_max_on_shallow_node() {
        let errors = validate_forest(&[leaf("A", 5)], "lineage", 4);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), ErrorCode::DepthExceeded);
        assert_eq!(errors[0].path(), "lineage[0]");
    }

    #[test]
    fn node_field_errors_are_path_addressed() {
        let forest = json!([
            leaf("A", 0),
            {
                "strain_ref": "B",
                "relationship": "cousin",
                "generation_depth": -1,
                "sources": [{ "source_name": "Forum", "confidence": "certain" }]
            },
            "not a node"
        ]);
        let errors = check(forest);
        let found: Vec<(&str, ErrorCode)> = errors.iter().map(|e| (e.path(), e.code())).collect();
        assert_eq!(
            found,
            vec![
                ("lineage[1].relationship", ErrorCode::InvalidEnum),
                ("lineage[1].generation_depth", ErrorCode::OutOfRange),
                ("lineage[1].sources[0].confidence", ErrorCode::InvalidEnum),
                ("lineage[2]", ErrorCode::TypeMismatch),
            ]
        );
    }

    #[test]
    fn missing_strain_ref_still_descends() {
        let forest = json!([{ "relationship": "parent", "children": [{ "strain_ref": "X" }] }]);
        let found: Vec<(String, ErrorCode)> = check(forest)
            .into_iter()
            .map(|e| (e.path().to_string(), e.code()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("lineage[0].strain_ref".to_string(), ErrorCode::Required),
                ("lineage[0].children[0].relationship".to_string(), ErrorCode::Required),
            ]
        );
    }

    #[test]
    fn deep_input_does_not_overflow() {
        // Each level takes ownership of the one below; `json!` would copy the
        // whole chain on every pass.
        let mut chain = json!({ "strain_ref": "leaf", "relationship": "ancestor" });
        for i in 0..1_000 {
            let mut parent = serde_json::Map::new();
            parent.insert("strain_ref".into(), Value::String(format!("n{i}")));
            parent.insert("relationship".into(), Value::String("ancestor".into()));
            parent.insert("children".into(), Value::Array(vec![chain]));
            chain = Value::Object(parent);
        }
        let errors = validate_forest(std::slice::from_ref(&chain), "lineage", 10);
        assert_eq!(errors.len(), 1_001 - 11);
        assert!(errors.iter().all(|e| e.code() == ErrorCode::DepthExceeded));
    }
}
