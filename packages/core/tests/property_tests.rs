//! Property-based tests for the CDES validators and typed model.
//!
//! Properties checked:
//! 1. **No panics**: validators accept any JSON object without crashing
//! 2. **Determinism**: the same document always yields the same result
//! 3. **Soundness**: `valid` is true exactly when there are no errors
//! 4. **Boundaries**: range and percentage-group rules flip where expected
//! 5. **Round trip**: anything the builders produce validates cleanly
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test -p cdes --test property_tests
//! ```

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use cdes::{
    validate_cannabinoid_profile, validate_coa, validate_genetics_profile, validate_strain,
    validate_terpene_profile, BreedingTechnique, Confidence, ErrorCode, GeneticsProfile,
    GeneticsSource, LineageNode, ModelError, PhenotypeVariant, Relationship, Strain, StrainType,
    TerpeneProfile, ValidationResult,
};

// =============================================================================
// Strategies
// =============================================================================

/// Arbitrary JSON, a few levels deep.
fn any_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e3..1.0e3f64).prop_map(|n| json!(n)),
        "[a-z0-9 _-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(field_name(), inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Field names biased towards ones the validators know about.
fn field_name() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "id", "name", "type", "thc_range", "min", "max", "genetics", "genetics_profile",
            "indica_pct", "sativa_pct", "lineage", "strain_ref", "relationship", "children",
            "generation_depth", "sources", "confidence", "batch_id", "lab", "test_date",
            "terpenes", "percentage",
        ])
        .prop_map(String::from),
        "[a-z_]{1,10}",
    ]
}

fn any_object() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(field_name(), any_json(), 0..10)
        .prop_map(|m| m.into_iter().collect())
}

fn strain_id() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}(-[a-z0-9]{1,8}){0,3}"
}

fn strain_type() -> impl Strategy<Value = StrainType> {
    prop::sample::select(vec![
        StrainType::Indica,
        StrainType::Sativa,
        StrainType::Hybrid,
        StrainType::Cbd,
    ])
}

fn confidence() -> impl Strategy<Value = Confidence> {
    prop::sample::select(vec![
        Confidence::Verified,
        Confidence::High,
        Confidence::Medium,
        Confidence::Low,
        Confidence::Disputed,
    ])
}

fn assert_sound(result: &ValidationResult) -> Result<(), TestCaseError> {
    prop_assert_eq!(result.is_valid(), result.errors().is_empty());
    for e in result.errors() {
        prop_assert!(!e.path().is_empty());
        prop_assert!(!e.path().starts_with('$'));
        prop_assert!(!e.message().is_empty());
    }
    // serialized form must deserialize back to an equal result
    let text = serde_json::to_string(result).unwrap();
    let back: ValidationResult = serde_json::from_str(&text).unwrap();
    prop_assert_eq!(&back, result);
    Ok(())
}

// =============================================================================
// Validator properties
// =============================================================================

mod validator_tests {
    use super::*;

    proptest! {
        /// Every entity validator accepts any object without panicking and
        /// reports a sound result.
        #[test]
        fn never_panics_and_is_sound(object in any_object()) {
            let doc = Value::Object(object);
            for result in [
                validate_strain(&doc),
                validate_genetics_profile(&doc),
                validate_coa(&doc),
                validate_terpene_profile(&doc),
                validate_cannabinoid_profile(&doc),
            ] {
                assert_sound(&result.unwrap())?;
            }
        }

        /// Validation has no hidden state.
        #[test]
        fn validation_is_deterministic(object in any_object()) {
            let doc = Value::Object(object);
            let first = validate_strain(&doc).unwrap();
            let second = validate_strain(&doc).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Validating never mutates the input.
        #[test]
        fn input_is_untouched(object in any_object()) {
            let doc = Value::Object(object);
            let before = doc.clone();
            let _ = validate_genetics_profile(&doc);
            prop_assert_eq!(doc, before);
        }

        /// Non-objects are misuse, never a result.
        #[test]
        fn non_objects_are_rejected(value in any_json().prop_filter("not an object", |v| !v.is_object())) {
            prop_assert!(validate_strain(&value).is_err());
        }

        /// A thc_range is valid exactly when both bounds are in [0, 100] and
        /// min <= max.
        #[test]
        fn thc_range_boundaries(min in -10.0..110.0f64, max in -10.0..110.0f64) {
            let doc = json!({
                "id": "blue-dream", "name": "Blue Dream", "type": "hybrid",
                "thc_range": { "min": min, "max": max }
            });
            let result = validate_strain(&doc).unwrap();
            let in_bounds = |v: f64| (0.0..=100.0).contains(&v);
            prop_assert_eq!(result.is_valid(), in_bounds(min) && in_bounds(max) && min <= max);
            if in_bounds(min) && in_bounds(max) && min > max {
                prop_assert_eq!(result.errors().len(), 1);
                prop_assert_eq!(result.errors()[0].path(), "thc_range");
            }
        }

        /// indica + sativa must land within 0.5 of 100.
        #[test]
        fn composition_tolerance(indica in 0.0..=100.0f64, sativa in 0.0..=100.0f64) {
            let result = validate_genetics_profile(&json!({
                "indica_pct": indica, "sativa_pct": sativa
            }))
            .unwrap();
            let consistent = (indica + sativa - 100.0).abs() <= 0.5;
            prop_assert_eq!(result.is_valid(), consistent);
            if !consistent {
                let error = &result.errors()[0];
                prop_assert_eq!(error.code(), ErrorCode::InconsistentPercentage);
                prop_assert_eq!(error.path(), "indica_pct");
            }
        }

        /// Lineage chains report DEPTH_EXCEEDED once for every node deeper
        /// than the default maximum of 10.
        #[test]
        fn depth_errors_per_node(len in 1usize..30) {
            let mut chain = json!({ "strain_ref": format!("n{}", len - 1), "relationship": "ancestor" });
            for i in (0..len - 1).rev() {
                let mut parent = Map::new();
                parent.insert("strain_ref".into(), Value::String(format!("n{i}")));
                parent.insert("relationship".into(), json!("ancestor"));
                parent.insert("children".into(), Value::Array(vec![chain]));
                chain = Value::Object(parent);
            }
            let result = validate_genetics_profile(&json!({ "lineage": [chain] })).unwrap();
            let expected = len.saturating_sub(11);
            prop_assert_eq!(result.errors_with_code(ErrorCode::DepthExceeded).count(), expected);
            prop_assert_eq!(result.errors().len(), expected);
        }
    }
}

// =============================================================================
// Typed model round trip
// =============================================================================

mod model_tests {
    use super::*;

    proptest! {
        /// Any strain the builders accept validates cleanly.
        #[test]
        fn built_strain_validates(
            id in strain_id(),
            name in "[A-Za-z][A-Za-z ]{0,20}",
            t in strain_type(),
            a in 0.0..=100.0f64,
            b in 0.0..=100.0f64,
            indica in 0.0..=100.0f64,
            conf in confidence(),
            source_name in "[A-Za-z ]{0,12}",
            phenotype in "[A-Za-z ]{0,12}",
        ) {
            let mut profile = GeneticsProfile::new()
                .with_technique(BreedingTechnique::F1)
                .with_composition(indica, 100.0 - indica, None)
                .unwrap();

            // Empty names are refused up front, never emitted.
            match GeneticsSource::new(source_name.clone(), conf) {
                Ok(source) => profile.add_source(source),
                Err(e) => {
                    prop_assert!(source_name.is_empty());
                    prop_assert_eq!(e, ModelError::EmptyField("source_name"));
                }
            }
            match PhenotypeVariant::new(phenotype.clone()) {
                Ok(variant) => profile = profile.with_phenotype(variant).unwrap(),
                Err(e) => {
                    prop_assert!(phenotype.is_empty());
                    prop_assert_eq!(e, ModelError::EmptyField("name"));
                }
            }

            let strain = Strain::new(id, name, t)
                .unwrap()
                .with_thc_range(a.min(b), a.max(b))
                .unwrap()
                .with_genetics_profile(profile);

            let result = validate_strain(&strain.to_value().unwrap()).unwrap();
            prop_assert!(result.is_valid(), "{:?}", result.errors());

            let back: Strain = serde_json::from_value(strain.to_value().unwrap()).unwrap();
            prop_assert_eq!(back, strain);
        }

        /// Lineage chains assembled with add_child never trip the lineage
        /// checks.
        #[test]
        fn built_lineage_validates(len in 1u32..=10, repeat in 0u32..10) {
            let mut node = LineageNode::new(format!("s{}", len - 1), Relationship::Ancestor, len - 1).unwrap();
            for depth in (0..len - 1).rev() {
                node = LineageNode::new(format!("s{depth}"), Relationship::Ancestor, depth)
                    .unwrap()
                    .add_child(node)
                    .unwrap();
            }
            // Re-attaching any ancestor below the chain is always refused.
            let ancestor = format!("s{}", repeat % len);
            let looped = LineageNode::new("top", Relationship::Parent, 0)
                .unwrap()
                .add_child(node.clone())
                .unwrap();
            prop_assert!(node.contains_ref(&ancestor));
            prop_assert!(LineageNode::new(ancestor, Relationship::Parent, 0)
                .unwrap()
                .add_child(node.clone())
                .is_err());

            let profile = GeneticsProfile::new().with_lineage(looped);
            let result = validate_genetics_profile(&profile.to_value().unwrap()).unwrap();
            prop_assert!(result.is_valid(), "{:?}", result.errors());
        }

        /// Builder-made terpene profiles validate and are self-similar.
        #[test]
        fn built_terpene_profile_validates(values in prop::collection::vec(0.0..=5.0f64, 9)) {
            let mut profile = TerpeneProfile::new();
            for (id, v) in cdes::profile::VECTOR_TERPENES.iter().zip(&values) {
                profile = profile.with_terpene(id, *v).unwrap();
            }
            let result = validate_terpene_profile(&profile.to_value().unwrap()).unwrap();
            prop_assert!(result.is_valid(), "{:?}", result.errors());
            if values.iter().any(|v| *v > 0.0) {
                prop_assert!((profile.similarity(&profile) - 1.0).abs() < 1e-9);
            }
        }
    }
}
