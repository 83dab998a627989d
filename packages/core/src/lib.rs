//! Validation engine for the Cannabis Data Exchange Standard (CDES).
//!
//! This crate checks untyped JSON documents (strains, genetics profiles,
//! Certificates of Analysis, terpene and cannabinoid profiles) against the
//! CDES rules and reports every violation as a path-addressed
//! [`ValidationError`] with a stable [`ErrorCode`]. It also ships typed
//! builders that can only produce conformant documents, the canonical
//! terpene/cannabinoid reference library, and a name normalizer for raw lab
//! output.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`result`] | [`ErrorCode`], [`ValidationError`], [`ValidationResult`] |
//! | [`rules`] | Primitive field checks shared by every validator |
//! | [`lineage`] | Cycle, depth and depth-floor checks over a lineage forest |
//! | [`validation`] | Entity validators and the configured [`Validator`] |
//! | [`config`] | [`ValidatorConfig`], optionally read from the environment |
//! | [`types`] | Wire enums, [`Strain`], [`PercentRange`], [`ModelError`] |
//! | [`genetics`] | [`GeneticsProfile`], [`LineageNode`], [`GeneticsSource`], [`PhenotypeVariant`] |
//! | [`profile`] | [`TerpeneProfile`], [`CannabinoidProfile`], [`Concentration`] |
//! | [`reference`] | Read-only terpene and cannabinoid reference library |
//! | [`normalize`] | Raw names to canonical IDs and strain types |
//! | [`render`] | Plain-text rendering of results and lineage trees |
//!
//! # Quick start
//!
//! ```rust
//! use cdes::{validate_strain, ErrorCode};
//! use serde_json::json;
//!
//! let result = validate_strain(&json!({
//!     "id": "blue-dream",
//!     "name": "Blue Dream",
//!     "type": "hybrid",
//!     "thc_range": { "min": 25, "max": 20 }
//! }))
//! .unwrap();
//!
//! assert!(!result.is_valid());
//! let error = result.error_at("thc_range").unwrap();
//! assert_eq!(error.code(), ErrorCode::OutOfRange);
//! ```
//!
//! Typed records round-trip through the validators:
//!
//! ```rust
//! use cdes::{validate_strain, Strain, StrainType};
//!
//! let strain = Strain::new("blue-dream", "Blue Dream", StrainType::Hybrid)?
//!     .with_thc_range(17.0, 24.0)?;
//! let value = strain.to_value().unwrap();
//! assert!(validate_strain(&value).unwrap().is_valid());
//! # Ok::<(), cdes::ModelError>(())
//! ```

pub mod config;
pub mod genetics;
pub mod lineage;
pub mod normalize;
pub mod profile;
pub mod reference;
pub mod render;
pub mod result;
pub mod rules;
pub mod types;
pub mod validation;

pub use config::ValidatorConfig;
pub use genetics::{GeneticsProfile, GeneticsSource, LineageNode, PhenotypeVariant};
pub use normalize::{normalize_cannabinoid_id, normalize_strain_type, normalize_terpene_id};
pub use profile::{
    CannabinoidProfile, Concentration, ConcentrationUnit, TerpeneProfile,
};
pub use reference::{
    get_cannabinoid_by_cas, get_cannabinoid_by_id, get_cannabinoid_library, get_terpene_by_cas,
    get_terpene_by_id, get_terpene_library, Cannabinoid, CannabinoidLibrary, LookupError,
    Terpene, TerpeneLibrary,
};
pub use render::{render_lineage, render_result};
pub use result::{ErrorCode, ValidationError, ValidationResult};
pub use types::{
    BreedingTechnique, Confidence, ModelError, PercentRange, Relationship, SampleType,
    Stability, Strain, StrainType,
};
pub use validation::{
    validate_cannabinoid_profile, validate_coa, validate_genetics_profile,
    validate_strain, validate_terpene_profile, InputError, Validator,
};
