//! Typed terpene and cannabinoid assay profiles.
//!
//! Entries are keyed by reference-library ID (`terp-*`, `cann-*`), so a
//! profile built through these builders always serializes to a document that
//! [`crate::validate_terpene_profile`] / [`crate::validate_cannabinoid_profile`]
//! accept.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PERCENT_TOLERANCE;
use crate::normalize::{normalize_cannabinoid_id, normalize_terpene_id};
use crate::reference::{get_cannabinoid_by_id, get_terpene_by_id, LookupError};
use crate::types::{check_percent, ModelError};

/// The nine terpenes that make up a profile's similarity vector, in vector
/// order.
pub const VECTOR_TERPENES: [&str; 9] = [
    "terp-myrcene",
    "terp-limonene",
    "terp-caryophyllene",
    "terp-alpha-pinene",
    "terp-linalool",
    "terp-humulene",
    "terp-terpinolene",
    "terp-ocimene",
    "terp-bisabolol",
];

/// Unit a lab reported a concentration in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationUnit {
    Percent,
    /// Milligrams per gram.
    MgG,
    /// Parts per million.
    Ppm,
}

/// A measured amount and its unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Concentration {
    pub value: f64,
    pub unit: ConcentrationUnit,
}

impl Concentration {
    pub fn new(value: f64, unit: ConcentrationUnit) -> Self {
        Self { value, unit }
    }

    pub fn percent(value: f64) -> Self {
        Self::new(value, ConcentrationUnit::Percent)
    }

    /// The amount as percent by weight (1 % = 10 mg/g = 10 000 ppm).
    pub fn to_percent(&self) -> f64 {
        match self.unit {
            ConcentrationUnit::Percent => self.value,
            ConcentrationUnit::MgG => self.value / 10.0,
            ConcentrationUnit::Ppm => self.value / 10_000.0,
        }
    }
}

// --- terpenes ----------------------------------------------------------------

/// One terpene measurement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerpeneMeasurement {
    id: String,
    percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cas_number: Option<String>,
}

impl TerpeneMeasurement {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn cas_number(&self) -> Option<&str> {
        self.cas_number.as_deref()
    }
}

/// A terpene assay: measurements plus an optional lab-reported total.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TerpeneProfile {
    terpenes: Vec<TerpeneMeasurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<f64>,
}

impl TerpeneProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `percentage` for the library terpene `id`, replacing any
    /// earlier measurement of it. Name and CAS number are filled in from the
    /// reference library.
    pub fn with_terpene(mut self, id: &str, percentage: f64) -> Result<Self, ModelError> {
        let terpene = get_terpene_by_id(id)?;
        let percentage = check_percent("percentage", percentage)?;
        let measurement = TerpeneMeasurement {
            id: terpene.id.clone(),
            percentage,
            name: Some(terpene.name.clone()),
            cas_number: Some(terpene.cas_number.clone()),
        };
        match self.terpenes.iter_mut().find(|t| t.id == terpene.id) {
            Some(existing) => *existing = measurement,
            None => self.terpenes.push(measurement),
        }
        check_assay_sum("terpene", self.terpenes.iter().map(|t| t.percentage))?;
        Ok(self)
    }

    /// Record a measurement given a raw lab name (`"β-Myrcene"`, `"d-limonene"`)
    /// and a concentration in any unit.
    pub fn with_measured(self, raw_name: &str, amount: Concentration) -> Result<Self, ModelError> {
        let id = normalize_terpene_id(raw_name).ok_or_else(|| LookupError::NotFound {
            kind: "terpene",
            id: raw_name.to_string(),
        })?;
        self.with_terpene(id, amount.to_percent())
    }

    /// Set the lab-reported total.
    pub fn with_total(mut self, total: f64) -> Result<Self, ModelError> {
        self.total = Some(check_percent("total", total)?);
        Ok(self)
    }

    pub fn terpenes(&self) -> &[TerpeneMeasurement] {
        &self.terpenes
    }

    /// Percentage of `id`, or 0 when it was not measured.
    pub fn percentage(&self, id: &str) -> f64 {
        self.terpenes
            .iter()
            .find(|t| t.id == id)
            .map_or(0.0, |t| t.percentage)
    }

    /// The lab-reported total if set, else the sum of all measurements.
    pub fn total(&self) -> f64 {
        self.total
            .unwrap_or_else(|| self.terpenes.iter().map(|t| t.percentage).sum())
    }

    /// The highest non-zero measurement; the earliest wins a tie.
    pub fn dominant(&self) -> Option<&TerpeneMeasurement> {
        self.terpenes
            .iter()
            .filter(|t| t.percentage > 0.0)
            .fold(None, |best: Option<&TerpeneMeasurement>, t| match best {
                Some(b) if b.percentage >= t.percentage => Some(b),
                _ => Some(t),
            })
    }

    /// Percentages of [`VECTOR_TERPENES`], in order.
    pub fn to_vector(&self) -> [f64; 9] {
        VECTOR_TERPENES.map(|id| self.percentage(id))
    }

    /// Cosine similarity of the two profiles' vectors, in `[0, 1]`. A profile
    /// with none of the vector terpenes is similar to nothing (0).
    pub fn similarity(&self, other: &TerpeneProfile) -> f64 {
        let (a, b) = (self.to_vector(), other.to_vector());
        let dot: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        let norm = |v: &[f64; 9]| v.iter().map(|x| x * x).sum::<f64>().sqrt();
        let (na, nb) = (norm(&a), norm(&b));
        if na == 0.0 || nb == 0.0 {
            0.0
        } else {
            dot / (na * nb)
        }
    }

    /// Canonical JSON representation, suitable for
    /// [`crate::validate_terpene_profile`].
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

// --- cannabinoids --------------------------------------------------------------

/// One cannabinoid measurement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CannabinoidMeasurement {
    id: String,
    percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// Detected but below the lab's limit of quantitation.
    #[serde(default, skip_serializing_if = "is_false")]
    is_below_loq: bool,
}

impl CannabinoidMeasurement {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_below_loq(&self) -> bool {
        self.is_below_loq
    }
}

/// A cannabinoid potency assay.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CannabinoidProfile {
    cannabinoids: Vec<CannabinoidMeasurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<f64>,
}

impl CannabinoidProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `percentage` for the library cannabinoid `id`, replacing any
    /// earlier measurement of it.
    pub fn with_cannabinoid(self, id: &str, percentage: f64) -> Result<Self, ModelError> {
        self.record(id, percentage, false)
    }

    /// Record `id` as detected below the limit of quantitation.
    pub fn with_below_loq(self, id: &str) -> Result<Self, ModelError> {
        self.record(id, 0.0, true)
    }

    /// Record a measurement given a raw lab name (`"Delta-9-THC"`, `"CBD-A"`).
    pub fn with_measured(self, raw_name: &str, amount: Concentration) -> Result<Self, ModelError> {
        let id = normalize_cannabinoid_id(raw_name).ok_or_else(|| LookupError::NotFound {
            kind: "cannabinoid",
            id: raw_name.to_string(),
        })?;
        self.record(id, amount.to_percent(), false)
    }

    pub fn with_total(mut self, total: f64) -> Result<Self, ModelError> {
        self.total = Some(check_percent("total", total)?);
        Ok(self)
    }

    fn record(mut self, id: &str, percentage: f64, is_below_loq: bool) -> Result<Self, ModelError> {
        let cannabinoid = get_cannabinoid_by_id(id)?;
        let percentage = check_percent("percentage", percentage)?;
        let measurement = CannabinoidMeasurement {
            id: cannabinoid.id.clone(),
            percentage,
            name: Some(cannabinoid.name.clone()),
            is_below_loq,
        };
        match self.cannabinoids.iter_mut().find(|c| c.id == cannabinoid.id) {
            Some(existing) => *existing = measurement,
            None => self.cannabinoids.push(measurement),
        }
        check_assay_sum("cannabinoid", self.cannabinoids.iter().map(|c| c.percentage))?;
        Ok(self)
    }

    pub fn cannabinoids(&self) -> &[CannabinoidMeasurement] {
        &self.cannabinoids
    }

    /// Percentage of `id`, or 0 when it was not measured.
    pub fn percentage(&self, id: &str) -> f64 {
        self.cannabinoids
            .iter()
            .find(|c| c.id == id)
            .map_or(0.0, |c| c.percentage)
    }

    /// The lab-reported total if set, else the sum of all measurements.
    pub fn total(&self) -> f64 {
        self.total
            .unwrap_or_else(|| self.cannabinoids.iter().map(|c| c.percentage).sum())
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn check_assay_sum(group: &'static str, percentages: impl Iterator<Item = f64>) -> Result<(), ModelError> {
    let sum: f64 = percentages.sum();
    if sum > 100.0 + DEFAULT_PERCENT_TOLERANCE {
        return Err(ModelError::InconsistentPercentages {
            group,
            sum,
            expected: "at most 100",
        });
    }
    Ok(())
}

fn is_false(b: &bool) -> bool {
    !*b
}

// --- tests -------------------------------------------------------------------
