//! Canonical reference data: terpenes and cannabinoids keyed by stable ID.
//!
//! Both libraries are process-wide, read-only fact bases built from fixed
//! literal datasets the first time they are touched. Initialisation goes
//! through [`LazyLock`], so concurrent first access from many threads builds
//! each library exactly once and every caller observes the same instance.
//!
//! Lookups that miss return [`LookupError::NotFound`]; absence is a normal
//! negative outcome the caller must handle, not a validation error.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version string of the bundled reference dataset.
pub const REFERENCE_DATA_VERSION: &str = "1.0.0";

/// Errors returned by reference-data lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("{kind} {id:?} not found in the reference library")]
    NotFound { kind: &'static str, id: String },
}

impl LookupError {
    /// Stable machine-readable code, `"NOT_FOUND"`.
    pub fn code(&self) -> &'static str {
        match self {
            LookupError::NotFound { .. } => "NOT_FOUND",
        }
    }
}

/// A canonical terpene entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Terpene {
    /// Stable identifier, e.g. `"terp-myrcene"`.
    pub id: String,
    pub name: String,
    /// CAS registry number, e.g. `"123-35-3"`.
    pub cas_number: String,
    /// Chemical class, e.g. `"monoterpene"`.
    pub category: String,
    pub aroma: Vec<String>,
    pub effects: Vec<String>,
}

/// The complete terpene reference set, ordered by ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TerpeneLibrary {
    pub version: String,
    terpenes: BTreeMap<String, Terpene>,
}

impl TerpeneLibrary {
    /// Look up a terpene by stable ID.
    pub fn get(&self, id: &str) -> Result<&Terpene, LookupError> {
        self.terpenes.get(id).ok_or_else(|| LookupError::NotFound {
            kind: "terpene",
            id: id.to_string(),
        })
    }

    /// Look up a terpene by CAS registry number.
    pub fn by_cas(&self, cas_number: &str) -> Result<&Terpene, LookupError> {
        self.terpenes
            .values()
            .find(|t| t.cas_number == cas_number)
            .ok_or_else(|| LookupError::NotFound {
                kind: "terpene with CAS number",
                id: cas_number.to_string(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.terpenes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.terpenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terpenes.is_empty()
    }

    /// All terpenes in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Terpene> {
        self.terpenes.values()
    }
}

/// A canonical cannabinoid entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cannabinoid {
    /// Stable identifier, e.g. `"cann-thc"`.
    pub id: String,
    pub name: String,
    /// Conventional abbreviation, e.g. `"THCA"`.
    pub abbreviation: String,
    pub cas_number: String,
    pub psychoactive: bool,
}

/// The complete cannabinoid reference set, ordered by ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CannabinoidLibrary {
    pub version: String,
    cannabinoids: BTreeMap<String, Cannabinoid>,
}

impl CannabinoidLibrary {
    pub fn get(&self, id: &str) -> Result<&Cannabinoid, LookupError> {
        self.cannabinoids.get(id).ok_or_else(|| LookupError::NotFound {
            kind: "cannabinoid",
            id: id.to_string(),
        })
    }

    pub fn by_cas(&self, cas_number: &str) -> Result<&Cannabinoid, LookupError> {
        self.cannabinoids
            .values()
            .find(|c| c.cas_number == cas_number)
            .ok_or_else(|| LookupError::NotFound {
                kind: "cannabinoid with CAS number",
                id: cas_number.to_string(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cannabinoids.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cannabinoids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cannabinoids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cannabinoid> {
        self.cannabinoids.values()
    }
}

/// The process-wide terpene library.
pub fn get_terpene_library() -> &'static TerpeneLibrary {
    &TERPENE_LIBRARY
}

/// Look up a terpene by stable ID in the process-wide library.
pub fn get_terpene_by_id(id: &str) -> Result<&'static Terpene, LookupError> {
    TERPENE_LIBRARY.get(id)
}

/// Look up a terpene by CAS registry number in the process-wide library.
pub fn get_terpene_by_cas(cas_number: &str) -> Result<&'static Terpene, LookupError> {
    TERPENE_LIBRARY.by_cas(cas_number)
}

/// The process-wide cannabinoid library.
pub fn get_cannabinoid_library() -> &'static CannabinoidLibrary {
    &CANNABINOID_LIBRARY
}

pub fn get_cannabinoid_by_id(id: &str) -> Result<&'static Cannabinoid, LookupError> {
    CANNABINOID_LIBRARY.get(id)
}

pub fn get_cannabinoid_by_cas(cas_number: &str) -> Result<&'static Cannabinoid, LookupError> {
    CANNABINOID_LIBRARY.by_cas(cas_number)
}

// --- data --------------------------------------------------------------------

static TERPENE_LIBRARY: LazyLock<TerpeneLibrary> = LazyLock::new(|| {
    let terpenes: BTreeMap<String, Terpene> = TERPENES
        .iter()
        .map(|r| {
            let t = Terpene {
                id: r.id.to_string(),
                name: r.name.to_string(),
                cas_number: r.cas_number.to_string(),
                category: r.category.to_string(),
                aroma: r.aroma.iter().map(|s| s.to_string()).collect(),
                effects: r.effects.iter().map(|s| s.to_string()).collect(),
            };
            (t.id.clone(), t)
        })
        .collect();
    tracing::info!(
        "reference: terpene library v{REFERENCE_DATA_VERSION} loaded ({} entries)",
        terpenes.len()
    );
    TerpeneLibrary {
        version: REFERENCE_DATA_VERSION.to_string(),
        terpenes,
    }
});

static CANNABINOID_LIBRARY: LazyLock<CannabinoidLibrary> = LazyLock::new(|| {
    let cannabinoids: BTreeMap<String, Cannabinoid> = CANNABINOIDS
        .iter()
        .map(|&(id, name, abbreviation, cas_number, psychoactive)| {
            let c = Cannabinoid {
                id: id.to_string(),
                name: name.to_string(),
                abbreviation: abbreviation.to_string(),
                cas_number: cas_number.to_string(),
                psychoactive,
            };
            (c.id.clone(), c)
        })
        .collect();
    tracing::info!(
        "reference: cannabinoid library v{REFERENCE_DATA_VERSION} loaded ({} entries)",
        cannabinoids.len()
    );
    CannabinoidLibrary {
        version: REFERENCE_DATA_VERSION.to_string(),
        cannabinoids,
    }
});

struct TerpeneRecord {
    id: &'static str,
    name: &'static str,
    cas_number: &'static str,
    category: &'static str,
    aroma: &'static [&'static str],
    effects: &'static [&'static str],
}

const TERPENES: &[TerpeneRecord] = &[
    TerpeneRecord {
        id: "terp-myrcene",
        name: "Myrcene",
        cas_number: "123-35-3",
        category: "monoterpene",
        aroma: &["earthy", "musky", "clove", "herbal"],
        effects: &["sedating", "relaxing", "muscle relaxant"],
    },
    TerpeneRecord {
        id: "terp-limonene",
        name: "Limonene",
        cas_number: "5989-27-5",
        category: "monoterpene",
        aroma: &["citrus", "lemon", "orange"],
        effects: &["mood elevation", "stress relief"],
    },
    TerpeneRecord {
        id: "terp-caryophyllene",
        name: "beta-Caryophyllene",
        cas_number: "87-44-5",
        category: "sesquiterpene",
        aroma: &["pepper", "spicy", "woody"],
        effects: &["anti-inflammatory", "analgesic"],
    },
    TerpeneRecord {
        id: "terp-alpha-pinene",
        name: "alpha-Pinene",
        cas_number: "80-56-8",
        category: "monoterpene",
        aroma: &["pine", "fresh", "resinous"],
        effects: &["alertness", "memory retention", "bronchodilator"],
    },
    TerpeneRecord {
        id: "terp-beta-pinene",
        name: "beta-Pinene",
        cas_number: "127-91-3",
        category: "monoterpene",
        aroma: &["pine", "woody", "herbal"],
        effects: &["alertness", "anti-inflammatory"],
    },
    TerpeneRecord {
        id: "terp-linalool",
        name: "Linalool",
        cas_number: "78-70-6",
        category: "monoterpenoid",
        aroma: &["floral", "lavender", "spicy"],
        effects: &["calming", "anxiolytic", "sedating"],
    },
    TerpeneRecord {
        id: "terp-humulene",
        name: "alpha-Humulene",
        cas_number: "6753-98-6",
        category: "sesquiterpene",
        aroma: &["hoppy", "earthy", "woody"],
        effects: &["appetite suppressant", "anti-inflammatory"],
    },
    TerpeneRecord {
        id: "terp-terpinolene",
        name: "Terpinolene",
        cas_number: "586-62-9",
        category: "monoterpene",
        aroma: &["floral", "herbal", "pine", "citrus"],
        effects: &["uplifting", "antioxidant"],
    },
    TerpeneRecord {
        id: "terp-ocimene",
        name: "beta-Ocimene",
        cas_number: "13877-91-3",
        category: "monoterpene",
        aroma: &["sweet", "herbal", "woody"],
        effects: &["uplifting", "antiviral"],
    },
    TerpeneRecord {
        id: "terp-bisabolol",
        name: "alpha-Bisabolol",
        cas_number: "23089-26-1",
        category: "sesquiterpenoid",
        aroma: &["floral", "chamomile", "honey"],
        effects: &["soothing", "anti-irritant"],
    },
    TerpeneRecord {
        id: "terp-geraniol",
        name: "Geraniol",
        cas_number: "106-24-1",
        category: "monoterpenoid",
        aroma: &["rose", "floral", "citrus"],
        effects: &["neuroprotective", "antioxidant"],
    },
    TerpeneRecord {
        id: "terp-eucalyptol",
        name: "Eucalyptol",
        cas_number: "470-82-6",
        category: "monoterpenoid",
        aroma: &["mint", "eucalyptus", "camphor"],
        effects: &["mental clarity", "anti-inflammatory"],
    },
    TerpeneRecord {
        id: "terp-nerolidol",
        name: "Nerolidol",
        cas_number: "7212-44-4",
        category: "sesquiterpenoid",
        aroma: &["woody", "floral", "citrus peel"],
        effects: &["sedating", "antifungal"],
    },
    TerpeneRecord {
        id: "terp-valencene",
        name: "Valencene",
        cas_number: "4630-07-3",
        category: "sesquiterpene",
        aroma: &["sweet orange", "citrus", "woody"],
        effects: &["uplifting", "anti-inflammatory"],
    },
    TerpeneRecord {
        id: "terp-camphene",
        name: "Camphene",
        cas_number: "79-92-5",
        category: "monoterpene",
        aroma: &["fir needles", "damp woodland", "herbal"],
        effects: &["antioxidant"],
    },
    TerpeneRecord {
        id: "terp-carene",
        name: "delta-3-Carene",
        cas_number: "13466-78-9",
        category: "monoterpene",
        aroma: &["sweet", "cedar", "pine"],
        effects: &["drying", "anti-inflammatory"],
    },
    TerpeneRecord {
        id: "terp-borneol",
        name: "Borneol",
        cas_number: "507-70-0",
        category: "monoterpenoid",
        aroma: &["camphor", "mint", "earthy"],
        effects: &["calming", "analgesic"],
    },
    TerpeneRecord {
        id: "terp-terpineol",
        name: "alpha-Terpineol",
        cas_number: "98-55-5",
        category: "monoterpenoid",
        aroma: &["lilac", "floral", "pine"],
        effects: &["relaxing", "sedating"],
    },
    TerpeneRecord {
        id: "terp-guaiol",
        name: "Guaiol",
        cas_number: "489-86-1",
        category: "sesquiterpenoid",
        aroma: &["pine", "rose", "woody"],
        effects: &["anti-inflammatory", "antimicrobial"],
    },
    TerpeneRecord {
        id: "terp-caryophyllene-oxide",
        name: "Caryophyllene Oxide",
        cas_number: "1139-30-6",
        category: "sesquiterpenoid",
        aroma: &["spicy", "woody", "sweet"],
        effects: &["antifungal"],
    },
    TerpeneRecord {
        id: "terp-phytol",
        name: "Phytol",
        cas_number: "150-86-7",
        category: "diterpenoid",
        aroma: &["floral", "balsamic", "grassy"],
        effects: &["relaxing"],
    },
    TerpeneRecord {
        id: "terp-sabinene",
        name: "Sabinene",
        cas_number: "3387-41-5",
        category: "monoterpene",
        aroma: &["spicy", "pepper", "citrus"],
        effects: &["antioxidant", "anti-inflammatory"],
    },
    TerpeneRecord {
        id: "terp-fenchol",
        name: "Fenchol",
        cas_number: "1632-73-1",
        category: "monoterpenoid",
        aroma: &["camphor", "lemon", "pine"],
        effects: &["antibacterial"],
    },
    TerpeneRecord {
        id: "terp-isopulegol",
        name: "Isopulegol",
        cas_number: "89-79-2",
        category: "monoterpenoid",
        aroma: &["mint", "herbal"],
        effects: &["anxiolytic"],
    },
];

/// `(id, name, abbreviation, cas_number, psychoactive)`
const CANNABINOIDS: &[(&str, &str, &str, &str, bool)] = &[
    ("cann-thc", "delta-9-Tetrahydrocannabinol", "THC", "1972-08-3", true),
    ("cann-thca", "Tetrahydrocannabinolic acid", "THCA", "23978-85-0", false),
    ("cann-cbd", "Cannabidiol", "CBD", "13956-29-1", false),
    ("cann-cbda", "Cannabidiolic acid", "CBDA", "1244-58-2", false),
    ("cann-cbg", "Cannabigerol", "CBG", "25654-31-3", false),
    ("cann-cbga", "Cannabigerolic acid", "CBGA", "25555-57-1", false),
    ("cann-cbn", "Cannabinol", "CBN", "521-35-7", false),
    ("cann-cbc", "Cannabichromene", "CBC", "20675-51-8", false),
    ("cann-thcv", "Tetrahydrocannabivarin", "THCV", "31262-37-0", false),
    ("cann-cbdv", "Cannabidivarin", "CBDV", "24274-48-4", false),
    ("cann-delta8-thc", "delta-8-Tetrahydrocannabinol", "D8-THC", "5957-75-5", true),
];

// --- tests -------------------------------------------------------------------
