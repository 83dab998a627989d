use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::ValidatorConfig;
use crate::lineage::validate_forest;
use crate::result::{ErrorCode, ValidationError, ValidationResult};
use crate::rules::{index_path, kind_of, Fields, Format, Presence};
use crate::types::{
    BreedingTechnique, Confidence, SampleType, Stability, StrainType, STRAIN_ID_RE,
};

/// Errors returned when a validator is called with something that is not a
/// document at all. Invalid *data* is never an error; it is reported inside
/// the returned [`ValidationResult`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{entity} document must be a JSON object, got {found}")]
    NotAnObject {
        entity: &'static str,
        found: &'static str,
    },
}

/// Entity validators bound to a [`ValidatorConfig`].
///
/// Every method is pure: it reads the input and the config and nothing else,
/// so one `Validator` may be shared freely across threads. Checks run in a
/// fixed order (required fields, per-field rules, cross-field rules, nested
/// entities) and never stop at the first error.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a strain record.
    pub fn validate_strain(&self, data: &Value) -> Result<ValidationResult, InputError> {
        run("strain", data, |object| self.strain_errors(object, ""))
    }

    /// Validate a Certificate of Analysis.
    pub fn validate_coa(&self, data: &Value) -> Result<ValidationResult, InputError> {
        run("coa", data, |object| self.coa_errors(object, ""))
    }

    /// Validate a standalone genetics profile.
    pub fn validate_genetics_profile(&self, data: &Value) -> Result<ValidationResult, InputError> {
        run("genetics_profile", data, |object| {
            self.genetics_profile_errors(object, "")
        })
    }

    /// Validate a terpene profile (`{"terpenes": [...], "total": ...}`).
    pub fn validate_terpene_profile(&self, data: &Value) -> Result<ValidationResult, InputError> {
        run("terpene_profile", data, |object| {
            self.assay_errors(object, "", Assay::Terpenes)
        })
    }

    /// Validate a cannabinoid profile (`{"cannabinoids": [...], "total": ...}`).
    pub fn validate_cannabinoid_profile(
        &self,
        data: &Value,
    ) -> Result<ValidationResult, InputError> {
        run("cannabinoid_profile", data, |object| {
            self.assay_errors(object, "", Assay::Cannabinoids)
        })
    }

    // --- entities ----------------------------------------------------------

    fn strain_errors(&self, object: &Map<String, Value>, prefix: &str) -> Vec<ValidationError> {
        let mut f = Fields::new(object, prefix);

        f.pattern("id", &STRAIN_ID_RE, ID_DESCRIPTION, Presence::Required);
        f.text("name", Presence::Required);
        f.enumerated("type", StrainType::WIRE_NAMES, Presence::Required);

        f.string("display_name", Presence::Optional);
        f.string("description", Presence::Optional);
        f.string("breeder", Presence::Optional);
        for list in ["effects", "flavors", "aromas", "aliases"] {
            f.string_array(list, Presence::Optional);
        }

        percent_range(&mut f, "thc_range");
        percent_range(&mut f, "cbd_range");

        // Legacy and structured genetics are independent; no reconciliation.
        f.string("genetics", Presence::Optional);
        if let Some(profile) = f.object("genetics_profile", Presence::Optional) {
            let path = f.path("genetics_profile");
            f.extend(self.genetics_profile_errors(profile, &path));
        }

        f.finish()
    }

    fn genetics_profile_errors(
        &self,
        object: &Map<String, Value>,
        prefix: &str,
    ) -> Vec<ValidationError> {
        let tolerance = self.config.percentage_tolerance;
        let mut f = Fields::new(object, prefix);

        f.string("parent_1", Presence::Optional);
        f.string("parent_2", Presence::Optional);
        f.string("breeder", Presence::Optional);
        f.enumerated("breeding_technique", BreedingTechnique::WIRE_NAMES, Presence::Optional);
        f.enumerated("stability", Stability::WIRE_NAMES, Presence::Optional);

        let indica = f.percent("indica_pct", Presence::Optional);
        let sativa = f.percent("sativa_pct", Presence::Optional);
        let ruderalis = f.percent("ruderalis_pct", Presence::Optional);
        // A malformed ruderalis share was already reported; don't guess a sum.
        let ruderalis_usable = ruderalis.is_some() || !f.has("ruderalis_pct");
        if let (Some(indica), Some(sativa), true) = (indica, sativa, ruderalis_usable) {
            let sum = indica + sativa + ruderalis.unwrap_or(0.0);
            if (sum - 100.0).abs() > tolerance {
                let path = f.path("indica_pct");
                f.push(ValidationError::new(
                    path,
                    ErrorCode::InconsistentPercentage,
                    format!(
                        "indica_pct, sativa_pct and ruderalis_pct sum to {sum}; expected 100 (±{tolerance})"
                    ),
                ));
            }
        }

        if let Some(roots) = f.array("lineage", Presence::Optional) {
            let path = f.path("lineage");
            f.extend(validate_forest(roots, &path, self.config.max_lineage_depth));
        }

        if let Some(sources) = f.array("sources", Presence::Optional) {
            let path = f.path("sources");
            for (i, source) in sources.iter().enumerate() {
                f.extend(source_errors(source, &index_path(&path, i)));
            }
        }

        if let Some(phenotypes) = f.array("phenotypes", Presence::Optional) {
            let path = f.path("phenotypes");
            let mut prevalence_sum = 0.0;
            for (i, phenotype) in phenotypes.iter().enumerate() {
                let (errors, prevalence) = phenotype_errors(phenotype, &index_path(&path, i));
                f.extend(errors);
                prevalence_sum += prevalence.unwrap_or(0.0);
            }
            if prevalence_sum > 100.0 + tolerance {
                f.push(ValidationError::new(
                    path,
                    ErrorCode::InconsistentPercentage,
                    format!("phenotype prevalences sum to {prevalence_sum}; expected at most 100"),
                ));
            }
        }

        f.string_array("awards", Presence::Optional);

        f.finish()
    }

    fn coa_errors(&self, object: &Map<String, Value>, prefix: &str) -> Vec<ValidationError> {
        let mut f = Fields::new(object, prefix);

        // Required top-level fields are reported before anything nested.
        f.text("batch_id", Presence::Required);
        let lab = f.object("lab", Presence::Required);
        f.format("test_date", Format::Date, Presence::Required);
        if let Some(lab) = lab {
            let path = f.path("lab");
            let mut lab_fields = Fields::new(lab, &path);
            lab_fields.text("name", Presence::Required);
            lab_fields.string("license_number", Presence::Optional);
            lab_fields.string("accreditation", Presence::Optional);
            f.extend(lab_fields.finish());
        }

        f.pattern("strain_id", &STRAIN_ID_RE, ID_DESCRIPTION, Presence::Optional);
        f.string("strain_name", Presence::Optional);
        f.enumerated("sample_type", SampleType::WIRE_NAMES, Presence::Optional);
        f.percent("total_thc", Presence::Optional);
        f.percent("total_cbd", Presence::Optional);
        f.boolean("passed", Presence::Optional);
        f.format("coa_url", Format::Url, Presence::Optional);

        if let Some(profile) = f.object("cannabinoid_profile", Presence::Optional) {
            let path = f.path("cannabinoid_profile");
            f.extend(self.assay_errors(profile, &path, Assay::Cannabinoids));
        }
        if let Some(profile) = f.object("terpene_profile", Presence::Optional) {
            let path = f.path("terpene_profile");
            f.extend(self.assay_errors(profile, &path, Assay::Terpenes));
        }

        f.finish()
    }

    /// Shared shape of terpene and cannabinoid profiles: a required list of
    /// `{id, percentage, ...}` measurements and an optional `total`.
    fn assay_errors(
        &self,
        object: &Map<String, Value>,
        prefix: &str,
        assay: Assay,
    ) -> Vec<ValidationError> {
        let list = assay.list_field();
        let mut f = Fields::new(object, prefix);

        if let Some(entries) = f.array(list, Presence::Required) {
            let path = f.path(list);
            let mut sum = 0.0;
            for (i, entry) in entries.iter().enumerate() {
                let entry_path = index_path(&path, i);
                let Some(entry) = entry.as_object() else {
                    f.push(ValidationError::new(
                        &entry_path,
                        ErrorCode::TypeMismatch,
                        format!("expected measurement object, found {}", kind_of(entry)),
                    ));
                    continue;
                };
                let mut e = Fields::new(entry, &entry_path);
                e.text("id", Presence::Required);
                sum += e.percent("percentage", Presence::Required).unwrap_or(0.0);
                e.string("name", Presence::Optional);
                match assay {
                    Assay::Terpenes => {
                        e.pattern("cas_number", &CAS_RE, CAS_DESCRIPTION, Presence::Optional);
                    }
                    Assay::Cannabinoids => {
                        e.boolean("is_below_loq", Presence::Optional);
                    }
                }
                f.extend(e.finish());
            }
            if sum > 100.0 + self.config.percentage_tolerance {
                f.push(ValidationError::new(
                    path,
                    ErrorCode::InconsistentPercentage,
                    format!("{list} percentages sum to {sum}; expected at most 100"),
                ));
            }
        }

        f.percent("total", Presence::Optional);

        f.finish()
    }
}

// --- free-function entry points ----------------------------------------------

/// Validate a strain record with the default [`ValidatorConfig`].
///
/// ```rust
/// let result = cdes::validate_strain(&serde_json::json!({
///     "id": "blue-dream",
///     "name": "Blue Dream",
///     "type": "hybrid"
/// }))
/// .unwrap();
/// assert!(result.is_valid());
/// ```
pub fn validate_strain(data: &Value) -> Result<ValidationResult, InputError> {
    Validator::default().validate_strain(data)
}

/// Validate a Certificate of Analysis with the default [`ValidatorConfig`].
pub fn validate_coa(data: &Value) -> Result<ValidationResult, InputError> {
    Validator::default().validate_coa(data)
}

/// Validate a genetics profile with the default [`ValidatorConfig`].
pub fn validate_genetics_profile(data: &Value) -> Result<ValidationResult, InputError> {
    Validator::default().validate_genetics_profile(data)
}

pub fn validate_terpene_profile(data: &Value) -> Result<ValidationResult, InputError> {
    Validator::default().validate_terpene_profile(data)
}

pub fn validate_cannabinoid_profile(data: &Value) -> Result<ValidationResult, InputError> {
    Validator::default().validate_cannabinoid_profile(data)
}

// --- shared element validators ----------------------------------------------

/// Errors for one `GeneticsSource` element at `path`.
pub(crate) fn source_errors(value: &Value, path: &str) -> Vec<ValidationError> {
    let Some(object) = value.as_object() else {
        return vec![not_an_object(path, "genetics source", value)];
    };
    let mut f = Fields::new(object, path);
    f.text("source_name", Presence::Required);
    f.string("source_type", Presence::Optional);
    f.format("url", Format::Url, Presence::Optional);
    f.enumerated("confidence", Confidence::WIRE_NAMES, Presence::Required);
    f.boolean("verified", Presence::Optional);
    f.finish()
}

/// Errors for one `PhenotypeVariant` element at `path`, plus its prevalence
/// when that is well-formed.
fn phenotype_errors(value: &Value, path: &str) -> (Vec<ValidationError>, Option<f64>) {
    let Some(object) = value.as_object() else {
        return (vec![not_an_object(path, "phenotype", value)], None);
    };
    let mut f = Fields::new(object, path);
    f.text("name", Presence::Required);
    f.string_array("distinguishing_traits", Presence::Optional);
    let prevalence = f.percent("prevalence", Presence::Optional);
    (f.finish(), prevalence)
}

// --- helpers -----------------------------------------------------------------

#[derive(Clone, Copy)]
enum Assay {
    Terpenes,
    Cannabinoids,
}

impl Assay {
    fn list_field(&self) -> &'static str {
        match self {
            Assay::Terpenes => "terpenes",
            Assay::Cannabinoids => "cannabinoids",
        }
    }
}

fn run(
    entity: &'static str,
    data: &Value,
    check: impl FnOnce(&Map<String, Value>) -> Vec<ValidationError>,
) -> Result<ValidationResult, InputError> {
    let object = data.as_object().ok_or(InputError::NotAnObject {
        entity,
        found: kind_of(data),
    })?;
    let errors = check(object);
    tracing::debug!("validate_{entity}: {} error(s)", errors.len());
    Ok(ValidationResult::from_errors(errors))
}

/// `{min, max}` percentages with `min <= max`. The inverted-range error is
/// reported at the range itself.
fn percent_range(f: &mut Fields<'_>, name: &str) {
    let Some(range) = f.object(name, Presence::Optional) else {
        return;
    };
    let path = f.path(name);
    let mut r = Fields::new(range, &path);
    let min = r.percent("min", Presence::Required);
    let max = r.percent("max", Presence::Required);
    f.extend(r.finish());
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            f.push(ValidationError::new(
                path,
                ErrorCode::OutOfRange,
                format!("min {min} exceeds max {max}"),
            ));
        }
    }
}

fn not_an_object(path: &str, what: &str, found: &Value) -> ValidationError {
    ValidationError::new(
        path,
        ErrorCode::TypeMismatch,
        format!("expected {what} object, found {}", kind_of(found)),
    )
}

const ID_DESCRIPTION: &str = "lowercase alphanumeric with hyphens (e.g. blue-dream)";

const CAS_DESCRIPTION: &str = "a CAS registry number (e.g. 123-35-3)";

/// `^[0-9]{2,7}-[0-9]{2}-[0-9]$`, ASCII digits only.
static CAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2,7}-[0-9]{2}-[0-9]$").expect("invalid CAS regex"));

// --- tests -------------------------------------------------------------------
