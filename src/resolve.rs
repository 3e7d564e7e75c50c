//! Exact query resolution.
//!
//! Tries to resolve a raw query string to exactly one entity using the
//! catalog's indexes. Precedence is fixed at Model > Part > Schematic: a
//! short numeric query can collide across entity types, and the engine
//! resolves that deterministically rather than by relevance. First hit wins.

use crate::catalog::Catalog;
use crate::models::ResolveOutcome;
use crate::normalize::norm_key;

/// Resolve a query to a single entity, or [`ResolveOutcome::NoMatch`].
///
/// Routes carry the canonical external identifier for each entity type:
/// model number for models (internal id only when no number exists), part id
/// for parts, schematic id for schematics.
pub fn resolve_exact(catalog: &Catalog, query: &str) -> ResolveOutcome {
    if norm_key(query).is_empty() {
        return ResolveOutcome::NoMatch;
    }

    if let Some(model) = catalog.model_by_query(query) {
        return ResolveOutcome::Model(model.route_id().to_string());
    }

    if let Some(part) = catalog.part_by_query(query) {
        let route = if part.id.is_empty() {
            part.number.clone()
        } else {
            part.id.clone()
        };
        return ResolveOutcome::Part(route);
    }

    if let Some(schematic) = catalog.schematic_by_id(query) {
        return ResolveOutcome::Schematic(schematic.id.clone());
    }
    // Name comparison is a linear scan; fine at catalog scale.
    let key = norm_key(query);
    for schematic in catalog.schematics() {
        if !schematic.name.is_empty() && norm_key(&schematic.name) == key {
            return ResolveOutcome::Schematic(schematic.id.clone());
        }
    }

    ResolveOutcome::NoMatch
}
