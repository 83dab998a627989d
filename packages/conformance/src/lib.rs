//! Shared fixtures for the CDES conformance suite.
//!
//! Provides conformant sample documents for every entity the validators
//! cover, and [`cases`]: a table of deliberately broken variants of those
//! documents together with the exact `(path, code)` errors a conformant
//! validator must report, in order.

use cdes::{ErrorCode, InputError, ValidationResult};
use serde_json::{json, Value};

/// The entity a document is validated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Strain,
    GeneticsProfile,
    Coa,
    TerpeneProfile,
    CannabinoidProfile,
}

impl Entity {
    /// Run the matching default-config validator.
    pub fn validate(&self, document: &Value) -> Result<ValidationResult, InputError> {
        match self {
            Entity::Strain => cdes::validate_strain(document),
            Entity::GeneticsProfile => cdes::validate_genetics_profile(document),
            Entity::Coa => cdes::validate_coa(document),
            Entity::TerpeneProfile => cdes::validate_terpene_profile(document),
            Entity::CannabinoidProfile => cdes::validate_cannabinoid_profile(document),
        }
    }
}

/// One conformance case: a document and the errors it must produce.
#[derive(Debug, Clone)]
pub struct Case {
    pub name: &'static str,
    pub entity: Entity,
    pub document: Value,
    /// Expected errors in report order. Empty means the document is valid.
    pub expected: Vec<(&'static str, ErrorCode)>,
}

impl Case {
    fn new(name: &'static str, entity: Entity, document: Value) -> Self {
        Self {
            name,
            entity,
            document,
            expected: Vec::new(),
        }
    }

    fn expect(mut self, path: &'static str, code: ErrorCode) -> Self {
        self.expected.push((path, code));
        self
    }
}

// ---------------------------------------------------------------------------
// Conformant sample documents
// ---------------------------------------------------------------------------

/// A fully populated strain, including structured genetics.
pub fn blue_dream() -> Value {
    json!({
        "id": "blue-dream",
        "name": "Blue Dream",
        "type": "hybrid",
        "display_name": "Blue Dream",
        "description": "Sativa-leaning hybrid from Santa Cruz.",
        "breeder": "DJ Short (Blueberry line)",
        "effects": ["uplifted", "creative", "relaxed"],
        "flavors": ["blueberry", "sweet"],
        "aromas": ["berry", "herbal"],
        "aliases": ["BD"],
        "thc_range": { "min": 17, "max": 24 },
        "cbd_range": { "min": 0, "max": 2 },
        "genetics": "Blueberry x Haze",
        "genetics_profile": blue_dream_genetics()
    })
}

/// Genetics for [`blue_dream`]: two parents with a shared grandparent
/// (a diamond), sourced claims and phenotypes.
pub fn blue_dream_genetics() -> Value {
    json!({
        "parent_1": "Blueberry",
        "parent_2": "Haze",
        "breeder": "Unknown (California)",
        "breeding_technique": "cross",
        "stability": "stable",
        "indica_pct": 40,
        "sativa_pct": 60,
        "lineage": [
            {
                "strain_ref": "Blueberry",
                "relationship": "mother",
                "generation_depth": 0,
                "children": [
                    { "strain_ref": "Afghani", "relationship": "grandparent", "generation_depth": 1 },
                    {
                        "strain_ref": "Thai",
                        "relationship": "grandparent",
                        "generation_depth": 1,
                        "sources": [{ "source_name": "DJ Short interview", "confidence": "medium" }]
                    }
                ]
            },
            {
                "strain_ref": "Haze",
                "relationship": "father",
                "generation_depth": 0,
                "children": [
                    { "strain_ref": "Thai", "relationship": "grandparent", "generation_depth": 1 }
                ],
                "notes": "Haze Brothers line"
            }
        ],
        "sources": [
            {
                "source_name": "SeedFinder",
                "source_type": "database",
                "url": "https://en.seedfinder.eu/strain-info/Blue_Dream/",
                "confidence": "high",
                "verified": true
            }
        ],
        "phenotypes": [
            { "name": "Blueberry-leaning", "distinguishing_traits": ["purple hues"], "prevalence": 35 },
            { "name": "Haze-leaning", "prevalence": 65 }
        ],
        "awards": ["High Times Top 10 (2012)"]
    })
}

/// A lab Certificate of Analysis with nested assays.
pub fn blue_dream_coa() -> Value {
    json!({
        "batch_id": "BD-2025-0042",
        "lab": {
            "name": "SC Labs",
            "license_number": "C8-0000013-LIC",
            "accreditation": "ISO/IEC 17025:2017"
        },
        "test_date": "2025-03-14",
        "strain_id": "blue-dream",
        "strain_name": "Blue Dream",
        "sample_type": "flower",
        "total_thc": 21.4,
        "total_cbd": 0.1,
        "passed": true,
        "coa_url": "https://labs.example.com/coa/BD-2025-0042.pdf",
        "cannabinoid_profile": blue_dream_cannabinoids(),
        "terpene_profile": blue_dream_terpenes()
    })
}

pub fn blue_dream_terpenes() -> Value {
    json!({
        "terpenes": [
            { "id": "terp-myrcene", "name": "Myrcene", "percentage": 0.92, "cas_number": "123-35-3" },
            { "id": "terp-alpha-pinene", "name": "alpha-Pinene", "percentage": 0.41, "cas_number": "80-56-8" },
            { "id": "terp-caryophyllene", "percentage": 0.22 }
        ],
        "total": 1.55
    })
}

pub fn blue_dream_cannabinoids() -> Value {
    json!({
        "cannabinoids": [
            { "id": "cann-thca", "name": "THCA", "percentage": 23.1 },
            { "id": "cann-thc", "percentage": 1.2 },
            { "id": "cann-cbd", "percentage": 0.0, "is_below_loq": true }
        ],
        "total": 24.3
    })
}

// ---------------------------------------------------------------------------
// Case table
// ---------------------------------------------------------------------------

/// Every conformance case, conformant samples first.
pub fn cases() -> Vec<Case> {
    use Entity::*;
    use ErrorCode::*;

    let mut out = vec![
        Case::new("strain_sample", Strain, blue_dream()),
        Case::new("genetics_sample", GeneticsProfile, blue_dream_genetics()),
        Case::new("coa_sample", Coa, blue_dream_coa()),
        Case::new("terpene_sample", TerpeneProfile, blue_dream_terpenes()),
        Case::new("cannabinoid_sample", CannabinoidProfile, blue_dream_cannabinoids()),
        Case::new(
            "strain_minimal",
            Strain,
            json!({ "id": "og-kush", "name": "OG Kush", "type": "indica" }),
        ),
    ];

    // --- strain -----------------------------------------------------------

    out.push(
        Case::new("strain_empty", Strain, json!({}))
            .expect("id", Required)
            .expect("name", Required)
            .expect("type", Required),
    );
    out.push(
        Case::new(
            "strain_bad_scalars",
            Strain,
            with(blue_dream(), &[("id", json!("Blue_Dream")), ("name", json!("")), ("type", json!("purple"))]),
        )
        .expect("id", PatternMismatch)
        .expect("name", InvalidLength)
        .expect("type", InvalidEnum),
    );
    out.push(
        Case::new(
            "strain_wrong_types",
            Strain,
            with(blue_dream(), &[("effects", json!("happy")), ("flavors", json!(["sweet", 3])), ("breeder", json!(7))]),
        )
        .expect("breeder", TypeMismatch)
        .expect("effects", TypeMismatch)
        .expect("flavors[1]", TypeMismatch),
    );
    out.push(
        Case::new(
            "strain_inverted_thc_range",
            Strain,
            with(blue_dream(), &[("thc_range", json!({ "min": 25, "max": 20 }))]),
        )
        .expect("thc_range", OutOfRange),
    );
    out.push(Case::new(
        "strain_degenerate_range",
        Strain,
        with(blue_dream(), &[("thc_range", json!({ "min": 20, "max": 20 }))]),
    ));
    out.push(
        Case::new(
            "strain_range_bounds",
            Strain,
            with(blue_dream(), &[("cbd_range", json!({ "min": -1, "max": 100.5 }))]),
        )
        .expect("cbd_range.min", OutOfRange)
        .expect("cbd_range.max", OutOfRange),
    );
    out.push(
        Case::new(
            "strain_null_optional",
            Strain,
            with(blue_dream(), &[("description", Value::Null)]),
        )
        .expect("description", TypeMismatch),
    );

    // --- genetics ---------------------------------------------------------

    out.push(
        Case::new(
            "genetics_inconsistent_split",
            GeneticsProfile,
            with(blue_dream_genetics(), &[("indica_pct", json!(60))]),
        )
        .expect("indica_pct", InconsistentPercentage),
    );
    out.push(Case::new(
        "genetics_split_within_tolerance",
        GeneticsProfile,
        with(blue_dream_genetics(), &[("indica_pct", json!(40.5))]),
    ));
    out.push(Case::new(
        "genetics_three_way_split",
        GeneticsProfile,
        json!({ "indica_pct": 50, "sativa_pct": 30, "ruderalis_pct": 20 }),
    ));
    out.push(Case::new(
        "genetics_lone_indica",
        GeneticsProfile,
        json!({ "indica_pct": 70 }),
    ));
    out.push(
        Case::new(
            "genetics_bad_enums",
            GeneticsProfile,
            json!({ "breeding_technique": "f6", "stability": "rock solid" }),
        )
        .expect("breeding_technique", InvalidEnum)
        .expect("stability", InvalidEnum),
    );
    out.push(
        Case::new(
            "genetics_cycle",
            GeneticsProfile,
            json!({ "lineage": [{
                "strain_ref": "Blueberry", "relationship": "parent", "generation_depth": 0,
                "children": [{
                    "strain_ref": "Afghani", "relationship": "grandparent", "generation_depth": 1,
                    "children": [{ "strain_ref": "Blueberry", "relationship": "ancestor", "generation_depth": 2 }]
                }]
            }]}),
        )
        .expect("lineage[0].children[0].children[0]", CycleDetected),
    );
    out.push(
        Case::new(
            "genetics_depth_regression",
            GeneticsProfile,
            json!({ "lineage": [{
                "strain_ref": "Haze", "relationship": "parent", "generation_depth": 2,
                "children": [{ "strain_ref": "Thai", "relationship": "grandparent", "generation_depth": 1 }]
            }]}),
        )
        .expect("lineage[0].children[0].generation_depth", OutOfRange),
    );
    out.push(
        Case::new(
            "genetics_generation_too_deep",
            GeneticsProfile,
            json!({ "lineage": [{ "strain_ref": "Landrace", "relationship": "ancestor", "generation_depth": 11 }] }),
        )
        .expect("lineage[0]", DepthExceeded),
    );
    out.push(
        Case::new(
            "genetics_bad_sources",
            GeneticsProfile,
            json!({ "sources": [
                { "source_name": "Forum", "confidence": "trust me" },
                { "source_name": "Blog", "url": "blog.example.com", "confidence": "low" },
                { "confidence": "high", "verified": "yes" }
            ]}),
        )
        .expect("sources[0].confidence", InvalidEnum)
        .expect("sources[1].url", InvalidFormat)
        .expect("sources[2].source_name", Required)
        .expect("sources[2].verified", TypeMismatch),
    );
    out.push(
        Case::new(
            "genetics_phenotype_overflow",
            GeneticsProfile,
            json!({ "phenotypes": [
                { "name": "A", "prevalence": 80 },
                { "name": "B", "prevalence": 30 }
            ]}),
        )
        .expect("phenotypes", InconsistentPercentage),
    );

    // --- nested addressing -------------------------------------------------

    let mut nested = blue_dream();
    nested["genetics_profile"]["lineage"][1]["sources"] =
        json!([{ "source_name": "Anonymous", "confidence": "maybe" }]);
    out.push(
        Case::new("strain_nested_source_path", Strain, nested)
            .expect("genetics_profile.lineage[1].sources[0].confidence", InvalidEnum),
    );

    let mut nested = blue_dream();
    nested["genetics_profile"]["lineage"][0]["children"][1]["strain_ref"] = json!("");
    out.push(
        Case::new("strain_nested_child_path", Strain, nested)
            .expect("genetics_profile.lineage[0].children[1].strain_ref", InvalidLength),
    );

    // --- COA -------------------------------------------------------------

    out.push(
        Case::new("coa_empty", Coa, json!({}))
            .expect("batch_id", Required)
            .expect("lab", Required)
            .expect("test_date", Required),
    );
    out.push(
        Case::new(
            "coa_bad_fields",
            Coa,
            with(
                blue_dream_coa(),
                &[
                    ("test_date", json!("14/03/2025")),
                    ("sample_type", json!("bud")),
                    ("total_thc", json!(101)),
                    ("coa_url", json!("labs.example.com")),
                ],
            ),
        )
        .expect("test_date", InvalidFormat)
        .expect("sample_type", InvalidEnum)
        .expect("total_thc", OutOfRange)
        .expect("coa_url", InvalidFormat),
    );
    let mut coa = blue_dream_coa();
    coa["terpene_profile"]["terpenes"][0]["cas_number"] = json!("123353");
    coa["cannabinoid_profile"]["cannabinoids"][2]["is_below_loq"] = json!("no");
    out.push(
        Case::new("coa_nested_assays", Coa, coa)
            .expect("cannabinoid_profile.cannabinoids[2].is_below_loq", TypeMismatch)
            .expect("terpene_profile.terpenes[0].cas_number", PatternMismatch),
    );

    // --- assays ----------------------------------------------------------

    out.push(
        Case::new("terpenes_missing_list", TerpeneProfile, json!({ "total": 1.0 }))
            .expect("terpenes", Required),
    );
    out.push(
        Case::new(
            "cannabinoids_over_100",
            CannabinoidProfile,
            json!({ "cannabinoids": [
                { "id": "cann-thca", "percentage": 70 },
                { "id": "cann-thc", "percentage": 40 }
            ]}),
        )
        .expect("cannabinoids", InconsistentPercentage),
    );

    out
}

/// `document` with top-level fields replaced.
fn with(mut document: Value, fields: &[(&str, Value)]) -> Value {
    for (name, value) in fields {
        document[*name] = value.clone();
    }
    document
}
