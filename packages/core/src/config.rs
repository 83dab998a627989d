//! Validator configuration, optionally populated from environment variables.

/// Default maximum lineage depth (traversal depth and `generation_depth`).
pub const DEFAULT_MAX_LINEAGE_DEPTH: usize = 10;

/// Default tolerance, in percentage points, for grouped percentage sums.
pub const DEFAULT_PERCENT_TOLERANCE: f64 = 0.5;

/// Tunables shared by every entity validator.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `CDES_MAX_LINEAGE_DEPTH` | `10` | Deepest lineage node accepted before `DEPTH_EXCEEDED` |
/// | `CDES_PERCENT_TOLERANCE` | `0.5` | Allowed deviation from 100 for percentage groups |
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    /// Maximum traversal depth (roots are depth 0) and maximum
    /// `generation_depth` for lineage nodes.
    pub max_lineage_depth: usize,

    /// Allowed absolute deviation, in percentage points, when a percentage
    /// group must sum to 100.
    pub percentage_tolerance: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_lineage_depth: DEFAULT_MAX_LINEAGE_DEPTH,
            percentage_tolerance: DEFAULT_PERCENT_TOLERANCE,
        }
    }
}

impl ValidatorConfig {
    /// Populate config from environment variables, applying defaults where
    /// absent. Unparsable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_lineage_depth = parse_or(
            &lookup,
            "CDES_MAX_LINEAGE_DEPTH",
            DEFAULT_MAX_LINEAGE_DEPTH,
            |_| true,
        );
        let percentage_tolerance = parse_or(
            &lookup,
            "CDES_PERCENT_TOLERANCE",
            DEFAULT_PERCENT_TOLERANCE,
            |t: &f64| t.is_finite() && *t >= 0.0,
        );
        Self {
            max_lineage_depth,
            percentage_tolerance,
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    accept: impl Fn(&T) -> bool,
) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if accept(&v) => v,
        _ => {
            tracing::warn!("config: ignoring {key}={raw:?}; using default {default}");
            default
        }
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(ValidatorConfig::from_lookup(lookup(&[])), ValidatorConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = ValidatorConfig::from_lookup(lookup(&[
            ("CDES_MAX_LINEAGE_DEPTH", "4"),
            ("CDES_PERCENT_TOLERANCE", " 1.5 "),
        ]));
        assert_eq!(cfg.max_lineage_depth, 4);
        assert_eq!(cfg.percentage_tolerance, 1.5);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = ValidatorConfig::from_lookup(lookup(&[
            ("CDES_MAX_LINEAGE_DEPTH", "deep"),
            ("CDES_PERCENT_TOLERANCE", "-2"),
        ]));
        assert_eq!(cfg, ValidatorConfig::default());
    }
}
