//! Core data types for CDES records.
//!
//! This module defines the wire-format enumerations shared across entities
//! ([`StrainType`], [`BreedingTechnique`], [`Stability`], [`Relationship`],
//! [`Confidence`], [`SampleType`]) together with the [`Strain`] record and its
//! [`PercentRange`]. Genetics types live in [`crate::genetics`], assay
//! profiles in [`crate::profile`].
//!
//! Constructors that could otherwise produce a non-conformant document
//! return [`ModelError`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::genetics::GeneticsProfile;
use crate::reference::LookupError;

/// Errors returned when a typed-model constructor or builder refuses a value
/// that would make the record fail validation.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("id must be lowercase alphanumeric with hyphens (e.g. blue-dream), got: {0:?}")]
    InvalidId(String),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("{field} must be between 0 and 100 inclusive, got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },

    #[error("range minimum {min} exceeds maximum {max}")]
    InvertedRange { min: f64, max: f64 },

    #[error("{group} percentages sum to {sum}, expected {expected}")]
    InconsistentPercentages {
        group: &'static str,
        sum: f64,
        expected: &'static str,
    },

    #[error("url must be an absolute http(s) URL, got: {0:?}")]
    InvalidUrl(String),

    #[error("lineage would make {0:?} its own ancestor")]
    LineageCycle(String),

    #[error("child generation depth {child} is below its parent's depth {parent}")]
    DepthRegression { parent: u32, child: u32 },

    #[error("lineage depth {depth} exceeds the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Declares a closed wire-format enumeration: the enum itself with serde
/// renames, `as_str`, `Display`, `FromStr`, and the `WIRE_NAMES` table the
/// validators use for enum checks.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($what:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:tt ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Every wire-format string, in declaration order.
            pub const WIRE_NAMES: &'static [&'static str] = &[$($wire),+];

            /// The wire-format string for this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    _ => Err(format!(
                        "unknown {} {:?}; expected one of: {}",
                        $what,
                        s,
                        Self::WIRE_NAMES.join(", ")
                    )),
                }
            }
        }
    };
}

wire_enum! {
    /// Broad classification of a strain.
    pub enum StrainType ("strain type") {
        Indica => "indica",
        Sativa => "sativa",
        Hybrid => "hybrid",
        /// CBD-dominant cultivar.
        Cbd => "cbd",
    }
}

wire_enum! {
    /// Method used to produce a strain.
    pub enum BreedingTechnique ("breeding technique") {
        Cross => "cross",
        Backcross => "backcross",
        Selfing => "selfing",
        Landrace => "landrace",
        TissueCulture => "tissue_culture",
        Clone => "clone",
        F1 => "f1",
        F2 => "f2",
        F3 => "f3",
        F4 => "f4",
        F5 => "f5",
        S1 => "s1",
        S2 => "s2",
        Bx1 => "bx1",
        Bx2 => "bx2",
        Bx3 => "bx3",
        Polyhybrid => "polyhybrid",
    }
}

wire_enum! {
    /// Genetic consistency of a strain across generations, least to most fixed.
    pub enum Stability ("stability") {
        Unstable => "unstable",
        Stable => "stable",
        /// Inbred line.
        Ibl => "ibl",
        Landrace => "landrace",
        CloneOnly => "clone_only",
    }
}

wire_enum! {
    /// How a lineage node relates to the strain that owns the lineage.
    pub enum Relationship ("relationship") {
        Parent => "parent",
        Mother => "mother",
        Father => "father",
        Grandparent => "grandparent",
        Ancestor => "ancestor",
        Sibling => "sibling",
        Child => "child",
    }
}

wire_enum! {
    /// How much trust a provenance claim deserves.
    pub enum Confidence ("confidence") {
        Verified => "verified",
        High => "high",
        Medium => "medium",
        Low => "low",
        Disputed => "disputed",
    }
}

impl Confidence {
    /// Numeric weight used for provenance scoring, from 1.0 (verified) down
    /// to 0.0 (disputed).
    pub fn weight(&self) -> f64 {
        match self {
            Confidence::Verified => 1.0,
            Confidence::High => 0.8,
            Confidence::Medium => 0.5,
            Confidence::Low => 0.25,
            Confidence::Disputed => 0.0,
        }
    }
}

wire_enum! {
    /// Product category of a tested sample.
    pub enum SampleType ("sample type") {
        Flower => "flower",
        Concentrate => "concentrate",
        Edible => "edible",
        Vape => "vape",
        Topical => "topical",
        Tincture => "tincture",
        Capsule => "capsule",
        PreRoll => "pre_roll",
        Rso => "rso",
        Other => "other",
    }
}

/// An inclusive percentage range with `0 <= min <= max <= 100`.
///
/// Serialises as `{ "min": <number>, "max": <number> }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PercentRange {
    min: f64,
    max: f64,
}

impl PercentRange {
    pub fn new(min: f64, max: f64) -> Result<Self, ModelError> {
        let min = check_percent("min", min)?;
        let max = check_percent("max", max)?;
        if min > max {
            return Err(ModelError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// A cannabis strain record.
///
/// Both `genetics` (free-text, legacy) and `genetics_profile` (structured) are
/// independently optional; neither is derived from the other.
///
/// Fields are private: build with [`Strain::new`] and the `with_*` builders,
/// read with the accessors. Deserialized strains are not re-checked; run them
/// through [`crate::validate_strain`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Strain {
    /// Stable identifier, lowercase alphanumeric with hyphens.
    id: String,

    name: String,

    #[serde(rename = "type")]
    strain_type: StrainType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    breeder: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    effects: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    flavors: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    aromas: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<String>,

    /// Typical THC content across batches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thc_range: Option<PercentRange>,

    /// Typical CBD content across batches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cbd_range: Option<PercentRange>,

    /// Legacy free-text cross description, e.g. `"Blueberry x Haze"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    genetics: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    genetics_profile: Option<GeneticsProfile>,
}

impl Strain {
    /// Create a strain with the three mandatory fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        strain_type: StrainType,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        if !STRAIN_ID_RE.is_match(&id) {
            return Err(ModelError::InvalidId(id));
        }
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::EmptyField("name"));
        }
        Ok(Self {
            id,
            name,
            strain_type,
            display_name: None,
            description: None,
            breeder: None,
            effects: Vec::new(),
            flavors: Vec::new(),
            aromas: Vec::new(),
            aliases: Vec::new(),
            thc_range: None,
            cbd_range: None,
            genetics: None,
            genetics_profile: None,
        })
    }

    pub fn with_thc_range(mut self, min: f64, max: f64) -> Result<Self, ModelError> {
        self.thc_range = Some(PercentRange::new(min, max)?);
        Ok(self)
    }

    pub fn with_cbd_range(mut self, min: f64, max: f64) -> Result<Self, ModelError> {
        self.cbd_range = Some(PercentRange::new(min, max)?);
        Ok(self)
    }

    pub fn with_genetics(mut self, genetics: impl Into<String>) -> Self {
        self.genetics = Some(genetics.into());
        self
    }

    pub fn with_genetics_profile(mut self, profile: GeneticsProfile) -> Self {
        self.genetics_profile = Some(profile);
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_breeder(mut self, breeder: impl Into<String>) -> Self {
        self.breeder = Some(breeder.into());
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effects.push(effect.into());
        self
    }

    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavors.push(flavor.into());
        self
    }

    pub fn with_aroma(mut self, aroma: impl Into<String>) -> Self {
        self.aromas.push(aroma.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strain_type(&self) -> StrainType {
        self.strain_type
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn breeder(&self) -> Option<&str> {
        self.breeder.as_deref()
    }

    pub fn effects(&self) -> &[String] {
        &self.effects
    }

    pub fn flavors(&self) -> &[String] {
        &self.flavors
    }

    pub fn aromas(&self) -> &[String] {
        &self.aromas
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn thc_range(&self) -> Option<PercentRange> {
        self.thc_range
    }

    pub fn cbd_range(&self) -> Option<PercentRange> {
        self.cbd_range
    }

    pub fn genetics(&self) -> Option<&str> {
        self.genetics.as_deref()
    }

    pub fn genetics_profile(&self) -> Option<&GeneticsProfile> {
        self.genetics_profile.as_ref()
    }

    /// Canonical JSON representation, suitable for [`crate::validate_strain`].
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`
pub(crate) static STRAIN_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("invalid strain id regex")
});

/// Accept `value` as a percentage in `[0, 100]`.
pub(crate) fn check_percent(field: &'static str, value: f64) -> Result<f64, ModelError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ModelError::PercentOutOfRange { field, value })
    }
}

// --- tests -------------------------------------------------------------------
