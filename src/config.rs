use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
}

/// Where the four raw sources live. Exactly one of `root` (filesystem) or
/// `base_url` (HTTP) must be set; the four names are resolved against it.
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_models_file")]
    pub models: String,
    #[serde(default = "default_schematics_file")]
    pub schematics: String,
    #[serde(default = "default_links_file")]
    pub links: String,
    #[serde(default = "default_parts_file")]
    pub parts: String,
}

fn default_models_file() -> String {
    "models.csv".to_string()
}
fn default_schematics_file() -> String {
    "schematics.csv".to_string()
}
fn default_links_file() -> String {
    "schematic_parts.csv".to_string()
}
fn default_parts_file() -> String {
    "parts.csv".to_string()
}

/// Scoring thresholds and suggestion limits for the fuzzy ranker.
///
/// Schematics carry a higher threshold than models and parts because their
/// comparisons run against free-text names, which are noisier than
/// identifiers.
#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    #[serde(default = "default_model_threshold")]
    pub model_threshold: f64,
    #[serde(default = "default_part_threshold")]
    pub part_threshold: f64,
    #[serde(default = "default_schematic_threshold")]
    pub schematic_threshold: f64,
    /// Minimum top score for unique auto-resolution.
    #[serde(default = "default_unique_score")]
    pub unique_score: f64,
    /// Minimum lead over the runner-up for unique auto-resolution.
    #[serde(default = "default_unique_gap")]
    pub unique_gap: f64,
    #[serde(default = "default_max_models")]
    pub max_models: usize,
    #[serde(default = "default_max_parts")]
    pub max_parts: usize,
    #[serde(default = "default_max_schematics")]
    pub max_schematics: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            model_threshold: default_model_threshold(),
            part_threshold: default_part_threshold(),
            schematic_threshold: default_schematic_threshold(),
            unique_score: default_unique_score(),
            unique_gap: default_unique_gap(),
            max_models: default_max_models(),
            max_parts: default_max_parts(),
            max_schematics: default_max_schematics(),
        }
    }
}

fn default_model_threshold() -> f64 {
    0.55
}
fn default_part_threshold() -> f64 {
    0.55
}
fn default_schematic_threshold() -> f64 {
    0.6
}
fn default_unique_score() -> f64 {
    0.9
}
fn default_unique_gap() -> f64 {
    0.12
}
fn default_max_models() -> usize {
    5
}
fn default_max_parts() -> usize {
    8
}
fn default_max_schematics() -> usize {
    5
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate data source
    match (&config.data.root, &config.data.base_url) {
        (Some(_), Some(_)) => {
            anyhow::bail!("data.root and data.base_url are mutually exclusive")
        }
        (None, None) => anyhow::bail!("one of data.root or data.base_url must be set"),
        _ => {}
    }

    // Validate ranking
    let r = &config.ranking;
    for (name, value) in [
        ("ranking.model_threshold", r.model_threshold),
        ("ranking.part_threshold", r.part_threshold),
        ("ranking.schematic_threshold", r.schematic_threshold),
        ("ranking.unique_score", r.unique_score),
        ("ranking.unique_gap", r.unique_gap),
    ] {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("{} must be in [0.0, 1.0]", name);
        }
    }

    for (name, value) in [
        ("ranking.max_models", r.max_models),
        ("ranking.max_parts", r.max_parts),
        ("ranking.max_schematics", r.max_schematics),
    ] {
        if value < 1 {
            anyhow::bail!("{} must be >= 1", name);
        }
    }

    Ok(config)
}
