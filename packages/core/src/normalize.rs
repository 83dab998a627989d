//! Mapping of the free-text names labs and menus use onto canonical
//! reference-library IDs and strain types.
//!
//! Matching ignores case and surrounding whitespace, treats `_` and runs of
//! spaces like `-`, and spells out Greek `α`/`β`/`Δ` prefixes, so
//! `"β_Caryophyllene"`, `"beta caryophyllene"` and `"BETA-CARYOPHYLLENE"` all
//! resolve to `terp-caryophyllene`.

use crate::types::StrainType;

/// Canonical terpene ID for a raw name, if it is a known alias.
///
/// ```rust
/// assert_eq!(cdes::normalize_terpene_id("d-Limonene"), Some("terp-limonene"));
/// assert_eq!(cdes::normalize_terpene_id("unobtainium"), None);
/// ```
pub fn normalize_terpene_id(raw: &str) -> Option<&'static str> {
    let key = fold(raw);
    // Canonical IDs resolve to themselves.
    if let Some(id) = TERPENE_ALIASES
        .iter()
        .map(|(_, id)| *id)
        .find(|id| *id == key)
    {
        return Some(id);
    }
    lookup(TERPENE_ALIASES, &key)
}

/// Canonical cannabinoid ID for a raw name, if it is a known alias.
pub fn normalize_cannabinoid_id(raw: &str) -> Option<&'static str> {
    let key = fold(raw);
    if let Some(id) = CANNABINOID_ALIASES
        .iter()
        .map(|(_, id)| *id)
        .find(|id| *id == key)
    {
        return Some(id);
    }
    lookup(CANNABINOID_ALIASES, &key)
}

/// Strain type for menu shorthand such as `"ind"`, `"Sativa Dominant"`,
/// `"50/50"` or `"high cbd"`. Dominance labels map to [`StrainType::Hybrid`].
/// Unknown or empty input yields `None`.
pub fn normalize_strain_type(raw: &str) -> Option<StrainType> {
    let key = fold(raw);
    STRAIN_TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, t)| *t)
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(alias, _)| *alias == key).map(|(_, id)| *id)
}

/// Lowercase, trim, spell out Greek prefixes, and collapse `_`/whitespace
/// runs to a single `-`.
fn fold(raw: &str) -> String {
    let lowered = raw
        .trim()
        .to_lowercase()
        .replace('α', "alpha-")
        .replace('β', "beta-")
        .replace('δ', "delta-");
    let mut out = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            pending_dash = true;
            continue;
        }
        if pending_dash && !out.is_empty() {
            out.push('-');
        }
        pending_dash = false;
        out.push(c);
    }
    out
}

const TERPENE_ALIASES: &[(&str, &str)] = &[
    ("myrcene", "terp-myrcene"),
    ("beta-myrcene", "terp-myrcene"),
    ("b-myrcene", "terp-myrcene"),
    ("limonene", "terp-limonene"),
    ("d-limonene", "terp-limonene"),
    ("caryophyllene", "terp-caryophyllene"),
    ("beta-caryophyllene", "terp-caryophyllene"),
    ("b-caryophyllene", "terp-caryophyllene"),
    ("pinene", "terp-alpha-pinene"),
    ("alpha-pinene", "terp-alpha-pinene"),
    ("a-pinene", "terp-alpha-pinene"),
    ("beta-pinene", "terp-beta-pinene"),
    ("b-pinene", "terp-beta-pinene"),
    ("linalool", "terp-linalool"),
    ("humulene", "terp-humulene"),
    ("alpha-humulene", "terp-humulene"),
    ("terpinolene", "terp-terpinolene"),
    ("ocimene", "terp-ocimene"),
    ("beta-ocimene", "terp-ocimene"),
    ("bisabolol", "terp-bisabolol"),
    ("alpha-bisabolol", "terp-bisabolol"),
    ("geraniol", "terp-geraniol"),
    ("eucalyptol", "terp-eucalyptol"),
    ("1,8-cineole", "terp-eucalyptol"),
    ("nerolidol", "terp-nerolidol"),
    ("valencene", "terp-valencene"),
    ("camphene", "terp-camphene"),
    ("carene", "terp-carene"),
    ("delta-3-carene", "terp-carene"),
    ("3-carene", "terp-carene"),
    ("borneol", "terp-borneol"),
    ("terpineol", "terp-terpineol"),
    ("alpha-terpineol", "terp-terpineol"),
    ("guaiol", "terp-guaiol"),
    ("caryophyllene-oxide", "terp-caryophyllene-oxide"),
    ("phytol", "terp-phytol"),
    ("sabinene", "terp-sabinene"),
    ("fenchol", "terp-fenchol"),
    ("isopulegol", "terp-isopulegol"),
];

const CANNABINOID_ALIASES: &[(&str, &str)] = &[
    ("thc", "cann-thc"),
    ("delta-9-thc", "cann-thc"),
    ("d9-thc", "cann-thc"),
    ("delta9-thc", "cann-thc"),
    ("thca", "cann-thca"),
    ("thc-a", "cann-thca"),
    ("cbd", "cann-cbd"),
    ("cbda", "cann-cbda"),
    ("cbd-a", "cann-cbda"),
    ("cbg", "cann-cbg"),
    ("cbga", "cann-cbga"),
    ("cbg-a", "cann-cbga"),
    ("cbn", "cann-cbn"),
    ("cbc", "cann-cbc"),
    ("thcv", "cann-thcv"),
    ("cbdv", "cann-cbdv"),
    ("delta-8-thc", "cann-delta8-thc"),
    ("d8-thc", "cann-delta8-thc"),
    ("delta8-thc", "cann-delta8-thc"),
];

const STRAIN_TYPE_ALIASES: &[(&str, StrainType)] = &[
    ("indica", StrainType::Indica),
    ("ind", StrainType::Indica),
    ("i", StrainType::Indica),
    ("sativa", StrainType::Sativa),
    ("sat", StrainType::Sativa),
    ("s", StrainType::Sativa),
    ("hybrid", StrainType::Hybrid),
    ("hyb", StrainType::Hybrid),
    ("h", StrainType::Hybrid),
    ("indica-dominant", StrainType::Hybrid),
    ("sativa-dominant", StrainType::Hybrid),
    ("balanced", StrainType::Hybrid),
    ("50/50", StrainType::Hybrid),
    ("cbd", StrainType::Cbd),
    ("cbd-dominant", StrainType::Cbd),
    ("high-cbd", StrainType::Cbd),
    ("hemp", StrainType::Cbd),
];
