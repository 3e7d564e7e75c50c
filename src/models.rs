//! Core data types for the catalog engine.
//!
//! These are the entities built from the raw data sources and the result
//! values the resolver and ranker hand back to callers. Everything here is
//! plain data: immutable after the catalog is built, cheap to clone.

use serde::Serialize;

/// A product line, identified externally by its model number.
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub id: String,
    pub brand: String,
    pub model_number: String,
}

impl Model {
    /// The identifier used to build routes for this model: the external
    /// model number, falling back to the internal id when absent.
    pub fn route_id(&self) -> &str {
        if self.model_number.is_empty() {
            &self.id
        } else {
            &self.model_number
        }
    }
}

/// An exploded-view diagram belonging to one model.
#[derive(Debug, Clone, Serialize)]
pub struct Schematic {
    pub id: String,
    pub model_id: String,
    pub name: String,
    pub order: i64,
    pub image: String,
}

/// Join row associating a numbered diagram position to a part.
#[derive(Debug, Clone, Serialize)]
pub struct SchematicPartLink {
    pub schematic_id: String,
    pub diagram_no: i64,
    pub order: i64,
    pub part_id: String,
}

/// A sellable component.
#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub id: String,
    pub number: String,
    pub manufacturer: String,
    pub name: String,
    pub description: String,
    pub product_status: String,
    pub inventory: i64,
    /// Price in [0.00, 999.99], or `None` when the source had no usable
    /// amount. 0.00 is a real price; `None` means unknown.
    pub price: Option<f64>,
}

/// A link joined to its resolved part. Dangling part references are kept
/// (with `part` absent) rather than dropped.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLink<'a> {
    pub link: &'a SchematicPartLink,
    pub part: Option<&'a Part>,
}

/// Outcome of exact query resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "route")]
pub enum ResolveOutcome {
    /// Matched a model; routes on the model's external number.
    Model(String),
    /// Matched a part; routes on the part's internal id.
    Part(String),
    /// Matched a schematic; routes on the schematic's id.
    Schematic(String),
    /// A well-formed query that resolved to nothing. Not an error.
    NoMatch,
}

/// A fuzzy-ranked suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    /// Similarity score in [0, 1].
    pub score: f64,
    /// Primary display text (identifier).
    pub label: String,
    /// Secondary display text (brand, part name, owning model).
    pub sub: String,
    /// Identifier the caller appends as a query parameter to navigate.
    pub route: String,
}

/// Per-entity-type candidate buckets produced by the ranker.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedCandidates {
    pub models: Vec<Candidate>,
    pub parts: Vec<Candidate>,
    pub schematics: Vec<Candidate>,
    /// Set when one candidate is confident enough to auto-resolve: the top
    /// score clears the confidence bar and leads the runner-up by the
    /// configured gap.
    pub unique_route: Option<String>,
}

/// Row accounting for one loaded collection.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CollectionReport {
    /// Structurally parsed rows seen in the source.
    pub rows: usize,
    /// Rows that survived the entity invariants.
    pub kept: usize,
}

impl CollectionReport {
    pub fn discarded(&self) -> usize {
        self.rows - self.kept
    }

    /// Rows were present but none survived, almost always a schema
    /// mismatch upstream, worth surfacing even though it is not fatal.
    pub fn looks_mismatched(&self) -> bool {
        self.rows > 0 && self.kept == 0
    }
}

/// Aggregate diagnostics from a catalog build. Discards are silent per row;
/// this report is the only place they are observable.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LoadReport {
    pub models: CollectionReport,
    pub schematics: CollectionReport,
    pub links: CollectionReport,
    pub parts: CollectionReport,
}

impl LoadReport {
    /// Collection names that parsed rows but kept none.
    pub fn mismatch_warnings(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.models.looks_mismatched() {
            out.push("models");
        }
        if self.schematics.looks_mismatched() {
            out.push("schematics");
        }
        if self.links.looks_mismatched() {
            out.push("links");
        }
        if self.parts.looks_mismatched() {
            out.push("parts");
        }
        out
    }
}
