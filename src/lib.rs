//! # Parts Catalog
//!
//! An in-memory indexing and search-resolution engine for appliance part
//! catalogs.
//!
//! The engine loads flat CSV/JSON reference data (models, schematics,
//! schematic-part links, parts), builds lookup indexes once, and resolves
//! user queries to a model, part, or schematic. Exact identifier matches
//! resolve deterministically with fixed precedence; everything else falls
//! back to fuzzy candidate ranking with a confidence-gap heuristic for
//! automatic resolution.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌───────────┐
//! │  DataSource  │──▶│  Records +  │──▶│  Catalog  │
//! │  fs / http   │   │  Normalize  │   │  indexes  │
//! └──────────────┘   └────────────┘   └─────┬─────┘
//!                                           │
//!                         ┌─────────────────┤
//!                         ▼                 ▼
//!                   ┌───────────┐     ┌───────────┐
//!                   │  resolve  │     │   rank    │
//!                   │  (exact)  │     │  (fuzzy)  │
//!                   └───────────┘     └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pcat load                        # fetch + build, print diagnostics
//! pcat resolve "ACM-100"           # exact resolution
//! pcat suggest "acm 10"            # fuzzy candidate buckets
//! pcat schematic S1                # joined part listing
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Entity and result types |
//! | [`records`] | CSV/JSON record parsing with canonical headers |
//! | [`normalize`] | Field coercion and key normalization |
//! | [`source`] | Async data source abstraction (fs, http) |
//! | [`catalog`] | Catalog store, indexes, cached load/reload |
//! | [`resolve`] | Exact query resolution |
//! | [`rank`] | Fuzzy candidate ranking |

pub mod catalog;
pub mod config;
pub mod models;
pub mod normalize;
pub mod rank;
pub mod records;
pub mod resolve;
pub mod source;
