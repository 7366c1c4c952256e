use std::collections::HashMap;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::BatchConfig;
use crate::snapshot::RatingSnapshot;
use crate::tournament::{SimOptions, Tournament};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Medals {
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

impl Medals {
    pub fn weighted_score(&self) -> u32 {
        3 * self.gold + 2 * self.silver + self.bronze
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedalRow {
    pub team: String,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
    pub score: u32,
    pub win_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedalTable {
    pub simulations: usize,
    pub rows: Vec<MedalRow>,
}

impl MedalTable {
    pub fn from_counts(simulations: usize, counts: HashMap<String, Medals>) -> Self {
        let mut rows: Vec<MedalRow> = counts
            .into_iter()
            .map(|(team, m)| MedalRow {
                score: m.weighted_score(),
                win_pct: if simulations == 0 {
                    0.0
                } else {
                    100.0 * m.gold as f64 / simulations as f64
                },
                team,
                gold: m.gold,
                silver: m.silver,
                bronze: m.bronze,
            })
            .collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.team.cmp(&b.team)));
        Self { simulations, rows }
    }

    pub fn get(&self, team: &str) -> Option<&MedalRow> {
        self.rows.iter().find(|r| r.team == team)
    }

    pub fn total_golds(&self) -> u32 {
        self.rows.iter().map(|r| r.gold).sum()
    }
}

/// Rng for run `index` of a batch. Each run owns its own ChaCha stream, so the
/// outcome of a run does not depend on which worker picked it up.
pub fn run_rng(seed: u64, index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index);
    rng
}

fn build_pool(threads: Option<usize>) -> Option<rayon::ThreadPool> {
    let threads = threads?;
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!(%err, threads, "falling back to the global rayon pool");
            None
        }
    }
}

fn with_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

fn merge(mut acc: HashMap<String, Medals>, other: HashMap<String, Medals>) -> HashMap<String, Medals> {
    for (team, m) in other {
        let entry = acc.entry(team).or_default();
        entry.gold += m.gold;
        entry.silver += m.silver;
        entry.bronze += m.bronze;
    }
    acc
}

/// Runs `cfg.simulations` fast-mode tournaments in parallel and tallies podiums.
pub fn run_batch(tournament: &Tournament, snapshot: &RatingSnapshot, cfg: &BatchConfig) -> MedalTable {
    let started = Instant::now();
    let pool = build_pool(cfg.threads);
    let opts = SimOptions { fast: true };

    let counts = with_pool(&pool, || {
        (0..cfg.simulations as u64)
            .into_par_iter()
            .fold(HashMap::new, |mut acc: HashMap<String, Medals>, i| {
                let mut rng = run_rng(cfg.seed, i);
                let result = tournament.simulate(snapshot, opts, &mut rng);
                acc.entry(result.champion).or_default().gold += 1;
                acc.entry(result.runner_up).or_default().silver += 1;
                acc.entry(result.third_place).or_default().bronze += 1;
                acc
            })
            .reduce(HashMap::new, merge)
    });

    let table = MedalTable::from_counts(cfg.simulations, counts);
    info!(
        simulations = cfg.simulations,
        seed = cfg.seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        leader = table.rows.first().map(|r| r.team.as_str()).unwrap_or("-"),
        "batch finished"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medal_rows_sort_by_score_then_name() {
        let mut counts = HashMap::new();
        counts.insert(
            "spain".to_string(),
            Medals {
                gold: 1,
                silver: 0,
                bronze: 1,
            },
        );
        counts.insert(
            "brazil".to_string(),
            Medals {
                gold: 0,
                silver: 2,
                bronze: 0,
            },
        );
        counts.insert(
            "france".to_string(),
            Medals {
                gold: 2,
                silver: 0,
                bronze: 0,
            },
        );
        let table = MedalTable::from_counts(4, counts);
        let order: Vec<&str> = table.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, ["france", "brazil", "spain"]);
        assert_eq!(table.get("france").map(|r| r.win_pct), Some(50.0));
        assert_eq!(table.total_golds(), 3);
    }

    #[test]
    fn run_streams_differ() {
        use rand::RngCore;
        let a = run_rng(7, 0).next_u64();
        let b = run_rng(7, 1).next_u64();
        assert_ne!(a, b);
        assert_eq!(a, run_rng(7, 0).next_u64());
    }
}
