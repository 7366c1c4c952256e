use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::elo::EloConfig;
use crate::match_sim::SimParams;
use crate::profile::ProfileConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub results: String,
    pub goals: String,
    pub former_names: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            results: "results.csv".to_string(),
            goals: "goalscorers.csv".to_string(),
            former_names: "former_names.csv".to_string(),
        }
    }
}

impl DataPaths {
    pub fn results_path(&self) -> PathBuf {
        self.data_dir.join(&self.results)
    }

    pub fn goals_path(&self) -> PathBuf {
        self.data_dir.join(&self.goals)
    }

    pub fn former_names_path(&self) -> PathBuf {
        self.data_dir.join(&self.former_names)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub simulations: usize,
    pub seed: u64,
    // None means rayon's global pool.
    pub threads: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            simulations: 1000,
            seed: 2026,
            threads: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data: DataPaths,
    pub elo: EloConfig,
    pub profile: ProfileConfig,
    pub sim: SimParams,
    pub batch: BatchConfig,
}

impl EngineConfig {
    /// Defaults, then the JSON file named by `WC26_CONFIG`, then individual
    /// environment overrides. `.env.local` / `.env` are read first.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let mut cfg = match std::env::var("WC26_CONFIG") {
            Ok(path) => Self::from_json_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        cfg.apply_env();
        debug!(?cfg, "engine config resolved");
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("WC26_DATA_DIR") {
            self.data.data_dir = PathBuf::from(dir);
        }
        if let Some(n) = env_parse::<usize>("WC26_SIMS") {
            self.batch.simulations = n.max(1);
        }
        if let Some(seed) = env_parse::<u64>("WC26_SEED") {
            self.batch.seed = seed;
        }
        if let Some(threads) = env_parse::<usize>("WC26_THREADS") {
            self.batch.threads = (threads > 0).then_some(threads);
        }
        if let Some(years) = env_parse::<u32>("WC26_RECENT_YEARS") {
            self.profile.recent_years = years.max(1);
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let raw = r#"{ "batch": { "simulations": 50 }, "sim": { "host_boost": 1.2 } }"#;
        let cfg: EngineConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.batch.simulations, 50);
        assert_eq!(cfg.batch.seed, 2026);
        assert_eq!(cfg.sim.host_boost, 1.2);
        assert_eq!(cfg.elo.initial_rating, 1200.0);
        assert_eq!(cfg.data.results, "results.csv");
    }
}
