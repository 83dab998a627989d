//! Conformance tests for the CDES validators.
//!
//! The bulk of the suite is table-driven: [`cdes_conformance::cases`] lists
//! sample documents and broken variants together with the exact
//! `(path, code)` errors expected, in report order. The remaining tests
//! cover behavior that is not a single document/result pair: misuse,
//! configuration, typed-model round trips and the reference library.
//!
//! # Coverage
//!
//! | Test | Area |
//! |------|------|
//! | `every_case_reports_exactly_the_expected_errors` | all entity validators |
//! | `case_names_are_unique` | suite hygiene |
//! | `results_are_reproducible` | purity |
//! | `results_serialize_to_the_wire_shape` | result JSON |
//! | `non_object_documents_are_rejected` | misuse |
//! | `config_changes_lineage_and_tolerance_limits` | `ValidatorConfig` |
//! | `typed_strain_round_trips` | typed model |
//! | `typed_lineage_refuses_cycles` | typed model |
//! | `reference_library_lookups` | reference data |
//! | `normalized_lab_output_builds_valid_profiles` | normalizer + profiles |

use std::collections::HashSet;

use cdes::{
    get_terpene_by_cas, get_terpene_by_id, get_terpene_library, normalize_terpene_id,
    BreedingTechnique, Concentration, ConcentrationUnit, Confidence, ErrorCode,
    GeneticsProfile, GeneticsSource, LineageNode, ModelError, PhenotypeVariant, Relationship,
    Stability, Strain, StrainType, TerpeneProfile, ValidationResult, Validator, ValidatorConfig,
};
use cdes_conformance::{blue_dream, blue_dream_genetics, cases, Entity};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Table-driven cases
// ---------------------------------------------------------------------------

#[test]
fn every_case_reports_exactly_the_expected_errors() {
    let mut failures = Vec::new();
    for case in cases() {
        let result = case
            .entity
            .validate(&case.document)
            .unwrap_or_else(|e| panic!("{}: {e}", case.name));
        let found: Vec<(&str, ErrorCode)> =
            result.errors().iter().map(|e| (e.path(), e.code())).collect();
        if found != case.expected {
            failures.push(format!(
                "{}:\n  expected {:?}\n  found    {:?}",
                case.name, case.expected, found
            ));
        }
        assert_eq!(result.is_valid(), case.expected.is_empty(), "{}", case.name);
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn case_names_are_unique() {
    let all = cases();
    let names: HashSet<&str> = all.iter().map(|c| c.name).collect();
    assert_eq!(names.len(), all.len());
}

#[test]
fn results_are_reproducible() {
    for case in cases() {
        let first = case.entity.validate(&case.document).unwrap();
        let second = case.entity.validate(&case.document).unwrap();
        assert_eq!(first, second, "{}", case.name);
    }
}

#[test]
fn results_serialize_to_the_wire_shape() {
    let mut doc = blue_dream();
    doc["thc_range"] = json!({ "min": 25, "max": 20 });
    let result = Entity::Strain.validate(&doc).unwrap();

    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["valid"], json!(false));
    assert_eq!(wire["errors"][0]["path"], json!("thc_range"));
    assert_eq!(wire["errors"][0]["code"], json!("OUT_OF_RANGE"));
    assert!(wire["errors"][0]["message"].is_string());

    let back: ValidationResult = serde_json::from_value(wire).unwrap();
    assert_eq!(back, result);

    // A result whose flag disagrees with its errors is not accepted.
    let forged = json!({ "valid": true, "errors": [{ "path": "id", "message": "x", "code": "REQUIRED" }] });
    assert!(serde_json::from_value::<ValidationResult>(forged).is_err());
}

// ---------------------------------------------------------------------------
// Misuse and configuration
// ---------------------------------------------------------------------------

#[test]
fn non_object_documents_are_rejected() {
    for entity in [
        Entity::Strain,
        Entity::GeneticsProfile,
        Entity::Coa,
        Entity::TerpeneProfile,
        Entity::CannabinoidProfile,
    ] {
        for bad in [Value::Null, json!("blue-dream"), json!([blue_dream()]), json!(3)] {
            assert!(entity.validate(&bad).is_err(), "{entity:?} accepted {bad}");
        }
    }
}

#[test]
fn config_changes_lineage_and_tolerance_limits() {
    let strict = Validator::new(ValidatorConfig {
        max_lineage_depth: 0,
        percentage_tolerance: 0.0,
    });
    let mut doc = blue_dream_genetics();
    doc["indica_pct"] = json!(40.2);

    let result = strict.validate_genetics_profile(&doc).unwrap();
    let codes: Vec<ErrorCode> = result.errors().iter().map(|e| e.code()).collect();
    assert_eq!(codes[0], ErrorCode::InconsistentPercentage);
    // Three grandparent nodes sit at traversal depth 1.
    assert_eq!(result.errors_with_code(ErrorCode::DepthExceeded).count(), 3);

    assert!(Validator::default().validate_genetics_profile(&doc).unwrap().is_valid());
}

// ---------------------------------------------------------------------------
// Typed model
// ---------------------------------------------------------------------------

#[test]
fn typed_strain_round_trips() -> Result<(), ModelError> {
    let mother = LineageNode::new("Blueberry", Relationship::Mother, 0)?
        .add_child(LineageNode::new("Afghani", Relationship::Grandparent, 1)?)?
        .add_child(
            LineageNode::new("Thai", Relationship::Grandparent, 1)?
                .with_source(GeneticsSource::new("DJ Short interview", Confidence::Medium)?),
        )?;
    let father = LineageNode::new("Haze", Relationship::Father, 0)?
        .add_child(LineageNode::new("Thai", Relationship::Grandparent, 1)?)?
        .with_notes("Haze Brothers line");

    let mut genetics = GeneticsProfile::new()
        .with_parents("Blueberry", Some("Haze".into()))
        .with_technique(BreedingTechnique::Cross)
        .with_stability(Stability::Stable)
        .with_composition(40.0, 60.0, None)?
        .with_lineage(mother)
        .with_lineage(father)
        .with_phenotype(PhenotypeVariant::new("Blueberry-leaning")?.with_prevalence(35.0)?)?
        .with_award("High Times Top 10 (2012)");
    genetics.add_source(
        GeneticsSource::new("SeedFinder", Confidence::High)?
            .with_type("database")
            .with_url("https://en.seedfinder.eu/strain-info/Blue_Dream/")?
            .verified(),
    );
    assert_eq!(genetics.provenance_score(), Some(0.8));
    assert_eq!(
        genetics.ancestor_refs(),
        vec!["Blueberry", "Afghani", "Thai", "Haze", "Thai"]
    );

    let strain = Strain::new("blue-dream", "Blue Dream", StrainType::Hybrid)?
        .with_thc_range(17.0, 24.0)?
        .with_genetics("Blueberry x Haze")
        .with_genetics_profile(genetics);

    let value = strain.to_value().expect("serialize strain");
    let result = cdes::validate_strain(&value).unwrap();
    assert!(result.is_valid(), "{:?}", result.errors());

    let back: Strain = serde_json::from_value(value).expect("deserialize strain");
    assert_eq!(back, strain);
    Ok(())
}

#[test]
fn typed_lineage_refuses_cycles() -> Result<(), ModelError> {
    let child = LineageNode::new("Afghani", Relationship::Grandparent, 1)?
        .add_child(LineageNode::new("Blueberry", Relationship::Ancestor, 2)?)?;
    let err = LineageNode::new("Blueberry", Relationship::Mother, 0)?
        .add_child(child)
        .unwrap_err();
    assert_eq!(err, ModelError::LineageCycle("Blueberry".into()));

    let err = LineageNode::new("Haze", Relationship::Father, 2)?
        .add_child(LineageNode::new("Thai", Relationship::Grandparent, 1)?)
        .unwrap_err();
    assert_eq!(err, ModelError::DepthRegression { parent: 2, child: 1 });
    Ok(())
}

// ---------------------------------------------------------------------------
// Reference data and normalization
// ---------------------------------------------------------------------------

#[test]
fn reference_library_lookups() {
    let library = get_terpene_library();
    assert_eq!(library.len(), 24);
    assert_eq!(get_terpene_by_id("terp-linalool").unwrap().cas_number, "78-70-6");
    assert_eq!(get_terpene_by_cas("123-35-3").unwrap().id, "terp-myrcene");

    let err = get_terpene_by_id("terp-nope").unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn normalized_lab_output_builds_valid_profiles() -> Result<(), ModelError> {
    // (raw name, value, unit) as a lab export might list them
    let rows = [
        ("β-Myrcene", 9.2, ConcentrationUnit::MgG),
        ("alpha pinene", 4_100.0, ConcentrationUnit::Ppm),
        ("Beta_Caryophyllene", 0.22, ConcentrationUnit::Percent),
    ];
    let mut profile = TerpeneProfile::new();
    for (name, value, unit) in rows {
        assert!(normalize_terpene_id(name).is_some(), "{name}");
        profile = profile.with_measured(name, Concentration::new(value, unit))?;
    }
    assert_eq!(profile.dominant().map(|t| t.id()), Some("terp-myrcene"));

    let value = profile.to_value().expect("serialize profile");
    assert!(cdes::validate_terpene_profile(&value).unwrap().is_valid());
    Ok(())
}
