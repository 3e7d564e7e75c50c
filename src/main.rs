//! # Parts Catalog CLI (`pcat`)
//!
//! The `pcat` binary is the query surface for the catalog engine. It loads
//! the configured data sources into an in-memory catalog and runs one
//! operation against it per invocation.
//!
//! ## Usage
//!
//! ```bash
//! pcat --config ./config/catalog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pcat load` | Fetch and build the catalog, print load diagnostics |
//! | `pcat resolve "<query>"` | Resolve a query to exactly one entity |
//! | `pcat suggest "<query>"` | Rank fuzzy candidates per entity type |
//! | `pcat model <id>` | Show a model and its schematics |
//! | `pcat schematic <id>` | Show a schematic and its joined parts |
//! | `pcat part <id>` | Show a part by id or manufacturer number |

mod catalog;
mod config;
mod models;
mod normalize;
mod rank;
mod records;
mod resolve;
mod source;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::{Catalog, CatalogCell};
use crate::models::ResolveOutcome;
use crate::rank::RankLimits;

/// Parts Catalog CLI — load flat catalog exports into memory and resolve
/// model, part, and schematic queries against them.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/catalog.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "pcat",
    about = "Parts Catalog — an in-memory indexing and search-resolution engine for part catalogs",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/catalog.toml`. Data source locations and
    /// ranking thresholds are read from this file.
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Fetch the raw sources and build the catalog.
    ///
    /// Prints per-collection row counts and flags collections that parsed
    /// rows but kept none, which usually means a schema mismatch upstream.
    Load,

    /// Resolve a query to exactly one entity.
    ///
    /// Precedence is fixed: model number first, then part id/number, then
    /// schematic id/name. Falls back to fuzzy suggestions with `--suggest`.
    Resolve {
        /// The query string (model number, part id/number, schematic id/name).
        query: String,

        /// On no exact match, print ranked fuzzy candidates instead of
        /// "no match".
        #[arg(long)]
        suggest: bool,

        /// Emit the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Rank fuzzy candidates for a query.
    ///
    /// Scores every catalog entity, buckets survivors per entity type, and
    /// reports a unique route when one candidate is confident enough to
    /// auto-resolve.
    Suggest {
        /// The query string.
        query: String,

        /// Maximum model candidates to return.
        #[arg(long)]
        max_models: Option<usize>,

        /// Maximum part candidates to return.
        #[arg(long)]
        max_parts: Option<usize>,

        /// Maximum schematic candidates to return.
        #[arg(long)]
        max_schematics: Option<usize>,

        /// Emit the buckets as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a model and its schematics, sorted by diagram order.
    Model {
        /// Model id or model number.
        id: String,
    },

    /// Show a schematic and its part listing, sorted by diagram position.
    Schematic {
        /// Schematic id.
        id: String,
    },

    /// Show a part by id or manufacturer number.
    Part {
        /// Part id or number.
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let source = source::source_from_config(&cfg)?;

    let cell = CatalogCell::new();
    let catalog = cell.load(source.as_ref(), &cfg).await?;

    match cli.command {
        Commands::Load => {
            print_report(&catalog);
        }
        Commands::Resolve {
            query,
            suggest,
            json,
        } => {
            let outcome = resolve::resolve_exact(&catalog, &query);
            if outcome == ResolveOutcome::NoMatch && suggest {
                let ranked = rank::rank(
                    &catalog,
                    &query,
                    RankLimits::from(&cfg.ranking),
                    &cfg.ranking,
                );
                if json {
                    println!("{}", serde_json::to_string_pretty(&ranked)?);
                } else {
                    print_ranked(&ranked);
                }
            } else if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                match &outcome {
                    ResolveOutcome::Model(route) => println!("model ?id={route}"),
                    ResolveOutcome::Part(route) => println!("part ?id={route}"),
                    ResolveOutcome::Schematic(route) => println!("schematic ?id={route}"),
                    ResolveOutcome::NoMatch => println!("No match."),
                }
            }
        }
        Commands::Suggest {
            query,
            max_models,
            max_parts,
            max_schematics,
            json,
        } => {
            let mut limits = RankLimits::from(&cfg.ranking);
            if let Some(n) = max_models {
                limits.max_models = n;
            }
            if let Some(n) = max_parts {
                limits.max_parts = n;
            }
            if let Some(n) = max_schematics {
                limits.max_schematics = n;
            }
            let ranked = rank::rank(&catalog, &query, limits, &cfg.ranking);
            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                print_ranked(&ranked);
            }
        }
        Commands::Model { id } => {
            let model = catalog
                .model_by_id(&id)
                .or_else(|| catalog.model_by_query(&id));
            let Some(model) = model else {
                println!("No such model: {id}");
                return Ok(());
            };
            println!("{} {} (id: {})", model.brand, model.model_number, model.id);
            for schematic in catalog.schematics_for_model(&model.id) {
                println!(
                    "  [{}] {} (id: {})",
                    schematic.order, schematic.name, schematic.id
                );
            }
        }
        Commands::Schematic { id } => {
            let Some(schematic) = catalog.schematic_by_id(&id) else {
                println!("No such schematic: {id}");
                return Ok(());
            };
            println!(
                "{} (id: {}, model: {})",
                schematic.name, schematic.id, schematic.model_id
            );
            for row in catalog.parts_for_schematic(&schematic.id) {
                match row.part {
                    Some(part) => println!(
                        "  #{:<3} {} — {} {}",
                        row.link.diagram_no,
                        part.number,
                        part.name,
                        part.price
                            .map(|p| format!("${p:.2}"))
                            .unwrap_or_else(|| "(price unknown)".to_string()),
                    ),
                    None => println!(
                        "  #{:<3} {} (part not in catalog)",
                        row.link.diagram_no, row.link.part_id
                    ),
                }
            }
        }
        Commands::Part { id } => {
            let Some(part) = catalog.part_by_query(&id) else {
                println!("No such part: {id}");
                return Ok(());
            };
            println!("{} — {}", part.number, part.name);
            if !part.manufacturer.is_empty() {
                println!("  manufacturer: {}", part.manufacturer);
            }
            if !part.description.is_empty() {
                println!("  description: {}", part.description);
            }
            if !part.product_status.is_empty() {
                println!("  status: {}", part.product_status);
            }
            println!("  inventory: {}", part.inventory);
            match part.price {
                Some(price) => println!("  price: ${price:.2}"),
                None => println!("  price: unknown"),
            }
        }
    }

    Ok(())
}

fn print_report(catalog: &Catalog) {
    let report = catalog.report();
    println!("Catalog loaded.");
    for (name, c) in [
        ("models", report.models),
        ("schematics", report.schematics),
        ("links", report.links),
        ("parts", report.parts),
    ] {
        println!(
            "  {name}: {} rows, {} kept, {} discarded",
            c.rows,
            c.kept,
            c.discarded()
        );
    }
    for name in report.mismatch_warnings() {
        eprintln!("warning: '{name}' parsed rows but kept none; check the source schema");
    }
}

fn print_ranked(ranked: &models::RankedCandidates) {
    if let Some(route) = &ranked.unique_route {
        println!("unique: ?id={route}");
    }
    for (name, bucket) in [
        ("models", &ranked.models),
        ("parts", &ranked.parts),
        ("schematics", &ranked.schematics),
    ] {
        if bucket.is_empty() {
            continue;
        }
        println!("{name}:");
        for candidate in bucket {
            println!(
                "  [{:.2}] {} — {} (?id={})",
                candidate.score, candidate.label, candidate.sub, candidate.route
            );
        }
    }
    if ranked.models.is_empty() && ranked.parts.is_empty() && ranked.schematics.is_empty() {
        println!("No candidates.");
    }
}
