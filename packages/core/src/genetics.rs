//! Genetics and lineage model: [`GeneticsProfile`], [`LineageNode`],
//! [`GeneticsSource`], and [`PhenotypeVariant`].
//!
//! The lineage is an explicit owned tree: every [`LineageNode`] exclusively
//! owns its `children`. Nodes are built bottom-up and [`LineageNode::add_child`]
//! refuses any attachment that would let a strain appear as its own
//! descendant, regress in `generation_depth`, or grow deeper than
//! [`DEFAULT_MAX_LINEAGE_DEPTH`]. Because every ancestor/descendant pair is
//! checked when the ancestor is attached, any tree built through this API
//! passes [`crate::lineage::validate_forest`] with the default config.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MAX_LINEAGE_DEPTH, DEFAULT_PERCENT_TOLERANCE};
use crate::rules::is_well_formed_url;
use crate::types::{check_percent, BreedingTechnique, Confidence, ModelError, Relationship, Stability};

/// One ancestor or descendant entry in a strain's breeding history.
///
/// Deserializing rebuilds the tree through [`LineageNode::new`] and
/// [`LineageNode::add_child`], so a cyclic or over-deep document is an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawLineageNode")]
pub struct LineageNode {
    strain_ref: String,
    relationship: Relationship,
    generation_depth: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<LineageNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sources: Vec<GeneticsSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl LineageNode {
    /// Create a leaf node. `generation_depth` 0 means a direct parent.
    pub fn new(
        strain_ref: impl Into<String>,
        relationship: Relationship,
        generation_depth: u32,
    ) -> Result<Self, ModelError> {
        let strain_ref = strain_ref.into();
        if strain_ref.is_empty() {
            return Err(ModelError::EmptyField("strain_ref"));
        }
        if generation_depth as usize > DEFAULT_MAX_LINEAGE_DEPTH {
            return Err(ModelError::DepthExceeded {
                depth: generation_depth as usize,
                max: DEFAULT_MAX_LINEAGE_DEPTH,
            });
        }
        Ok(Self {
            strain_ref,
            relationship,
            generation_depth,
            children: Vec::new(),
            sources: Vec::new(),
            notes: None,
        })
    }

    /// Attach `child` (and its whole subtree) below this node.
    pub fn add_child(mut self, child: LineageNode) -> Result<Self, ModelError> {
        if child.contains_ref(&self.strain_ref) {
            return Err(ModelError::LineageCycle(self.strain_ref));
        }
        if child.generation_depth < self.generation_depth {
            return Err(ModelError::DepthRegression {
                parent: self.generation_depth,
                child: child.generation_depth,
            });
        }
        let height = child.height() + 1;
        if height > DEFAULT_MAX_LINEAGE_DEPTH {
            return Err(ModelError::DepthExceeded {
                depth: height,
                max: DEFAULT_MAX_LINEAGE_DEPTH,
            });
        }
        self.children.push(child);
        Ok(self)
    }

    /// Attach a provenance claim about this ancestor.
    pub fn with_source(mut self, source: GeneticsSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn strain_ref(&self) -> &str {
        &self.strain_ref
    }

    pub fn relationship(&self) -> Relationship {
        self.relationship
    }

    pub fn generation_depth(&self) -> u32 {
        self.generation_depth
    }

    pub fn children(&self) -> &[LineageNode] {
        &self.children
    }

    pub fn sources(&self) -> &[GeneticsSource] {
        &self.sources
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Edges on the longest path from this node to a leaf (0 for a leaf).
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        max
    }

    /// Whether this node or any descendant has the given `strain_ref`.
    pub fn contains_ref(&self, strain_ref: &str) -> bool {
        self.descendants().any(|n| n.strain_ref == strain_ref) || self.strain_ref == strain_ref
    }

    /// All nodes below this one, depth-first in declaration order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.descendants().count()
    }
}

/// Unchecked wire shape of a [`LineageNode`].
#[derive(Deserialize)]
struct RawLineageNode {
    strain_ref: String,
    relationship: Relationship,
    generation_depth: u32,
    #[serde(default)]
    children: Vec<LineageNode>,
    #[serde(default)]
    sources: Vec<GeneticsSource>,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<RawLineageNode> for LineageNode {
    type Error = ModelError;

    fn try_from(raw: RawLineageNode) -> Result<Self, Self::Error> {
        let mut node = LineageNode::new(raw.strain_ref, raw.relationship, raw.generation_depth)?;
        for child in raw.children {
            node = node.add_child(child)?;
        }
        node.sources = raw.sources;
        node.notes = raw.notes;
        Ok(node)
    }
}

/// Pre-order iterator over a node's descendants. See [`LineageNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a LineageNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a LineageNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// An attributed claim about a strain's genetics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneticsSource {
    source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    confidence: Confidence,
    #[serde(default)]
    verified: bool,
}

impl GeneticsSource {
    pub fn new(source_name: impl Into<String>, confidence: Confidence) -> Result<Self, ModelError> {
        let source_name = source_name.into();
        if source_name.is_empty() {
            return Err(ModelError::EmptyField("source_name"));
        }
        Ok(Self {
            source_name,
            source_type: None,
            url: None,
            confidence,
            verified: false,
        })
    }

    /// Free-text kind of source, e.g. `"breeder"`, `"seed bank"`, `"lab"`.
    pub fn with_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Result<Self, ModelError> {
        let url = url.into();
        if !is_well_formed_url(&url) {
            return Err(ModelError::InvalidUrl(url));
        }
        self.url = Some(url);
        Ok(self)
    }

    /// Mark the claim as independently verified.
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn source_type(&self) -> Option<&str> {
        self.source_type.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

/// A named phenotype expressed by a strain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhenotypeVariant {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    distinguishing_traits: Vec<String>,
    /// Share of plants expressing this phenotype, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prevalence: Option<f64>,
}

impl PhenotypeVariant {
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::EmptyField("name"));
        }
        Ok(Self {
            name,
            distinguishing_traits: Vec::new(),
            prevalence: None,
        })
    }

    pub fn with_trait(mut self, t: impl Into<String>) -> Self {
        self.distinguishing_traits.push(t.into());
        self
    }

    pub fn with_prevalence(mut self, prevalence: f64) -> Result<Self, ModelError> {
        self.prevalence = Some(check_percent("prevalence", prevalence)?);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distinguishing_traits(&self) -> &[String] {
        &self.distinguishing_traits
    }

    pub fn prevalence(&self) -> Option<f64> {
        self.prevalence
    }
}

/// Structured genetics for a strain: parents, technique, composition,
/// full ancestry, provenance, phenotypes, and awards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneticsProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    breeder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    breeding_technique: Option<BreedingTechnique>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stability: Option<Stability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indica_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sativa_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ruderalis_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lineage: Vec<LineageNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sources: Vec<GeneticsSource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    phenotypes: Vec<PhenotypeVariant>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    awards: Vec<String>,
}

impl GeneticsProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the direct parents; `parent_2` is absent for selfed or clone lines.
    pub fn with_parents(mut self, parent_1: impl Into<String>, parent_2: Option<String>) -> Self {
        self.parent_1 = Some(parent_1.into());
        self.parent_2 = parent_2;
        self
    }

    pub fn with_breeder(mut self, breeder: impl Into<String>) -> Self {
        self.breeder = Some(breeder.into());
        self
    }

    pub fn with_technique(mut self, technique: BreedingTechnique) -> Self {
        self.breeding_technique = Some(technique);
        self
    }

    pub fn with_stability(mut self, stability: Stability) -> Self {
        self.stability = Some(stability);
        self
    }

    /// Set the indica/sativa (and optionally ruderalis) split. Each share
    /// must be in `[0, 100]` and together they must sum to 100.
    pub fn with_composition(
        mut self,
        indica: f64,
        sativa: f64,
        ruderalis: Option<f64>,
    ) -> Result<Self, ModelError> {
        let indica = check_percent("indica_pct", indica)?;
        let sativa = check_percent("sativa_pct", sativa)?;
        let ruderalis = ruderalis
            .map(|r| check_percent("ruderalis_pct", r))
            .transpose()?;
        let sum = indica + sativa + ruderalis.unwrap_or(0.0);
        if (sum - 100.0).abs() > DEFAULT_PERCENT_TOLERANCE {
            return Err(ModelError::InconsistentPercentages {
                group: "indica/sativa/ruderalis",
                sum,
                expected: "100",
            });
        }
        self.indica_pct = Some(indica);
        self.sativa_pct = Some(sativa);
        self.ruderalis_pct = ruderalis;
        Ok(self)
    }

    /// Append a root of the ancestry forest.
    pub fn with_lineage(mut self, root: LineageNode) -> Self {
        self.lineage.push(root);
        self
    }

    /// Append a provenance claim in place.
    pub fn add_source(&mut self, source: GeneticsSource) {
        self.sources.push(source);
    }

    /// Append a phenotype. Prevalences across all phenotypes may not exceed
    /// 100 percent.
    pub fn with_phenotype(mut self, phenotype: PhenotypeVariant) -> Result<Self, ModelError> {
        let sum: f64 = self
            .phenotypes
            .iter()
            .chain(std::iter::once(&phenotype))
            .filter_map(|p| p.prevalence)
            .sum();
        if sum > 100.0 + DEFAULT_PERCENT_TOLERANCE {
            return Err(ModelError::InconsistentPercentages {
                group: "phenotype prevalence",
                sum,
                expected: "at most 100",
            });
        }
        self.phenotypes.push(phenotype);
        Ok(self)
    }

    pub fn with_award(mut self, award: impl Into<String>) -> Self {
        self.awards.push(award.into());
        self
    }

    pub fn parent_1(&self) -> Option<&str> {
        self.parent_1.as_deref()
    }

    pub fn parent_2(&self) -> Option<&str> {
        self.parent_2.as_deref()
    }

    pub fn breeder(&self) -> Option<&str> {
        self.breeder.as_deref()
    }

    pub fn breeding_technique(&self) -> Option<BreedingTechnique> {
        self.breeding_technique
    }

    pub fn stability(&self) -> Option<Stability> {
        self.stability
    }

    pub fn indica_pct(&self) -> Option<f64> {
        self.indica_pct
    }

    pub fn sativa_pct(&self) -> Option<f64> {
        self.sativa_pct
    }

    pub fn ruderalis_pct(&self) -> Option<f64> {
        self.ruderalis_pct
    }

    pub fn lineage(&self) -> &[LineageNode] {
        &self.lineage
    }

    pub fn sources(&self) -> &[GeneticsSource] {
        &self.sources
    }

    pub fn phenotypes(&self) -> &[PhenotypeVariant] {
        &self.phenotypes
    }

    pub fn awards(&self) -> &[String] {
        &self.awards
    }

    /// Mean confidence weight of the profile's sources, or `None` when there
    /// are no sources. See [`Confidence::weight`].
    pub fn provenance_score(&self) -> Option<f64> {
        if self.sources.is_empty() {
            return None;
        }
        let total: f64 = self.sources.iter().map(|s| s.confidence.weight()).sum();
        Some(total / self.sources.len() as f64)
    }

    /// Every ancestor `strain_ref` in the lineage forest, pre-order, with
    /// repeats (diamonds) kept.
    pub fn ancestor_refs(&self) -> Vec<&str> {
        self.lineage
            .iter()
            .flat_map(|root| std::iter::once(root).chain(root.descendants()))
            .map(|n| n.strain_ref())
            .collect()
    }

    /// Canonical JSON representation, suitable for
    /// [`crate::validate_genetics_profile`].
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

// --- tests -------------------------------------------------------------------
