use std::collections::HashMap;

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Poisson};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bulk::run_rng;
use crate::elo::{RatingTable, expected_score};
use crate::match_sim::{MatchResult, Resolution};
use crate::standings::GroupTable;

pub const WC2022_GROUPS: [(&str, [&str; 4]); 8] = [
    ("A", ["qatar", "ecuador", "senegal", "netherlands"]),
    ("B", ["england", "iran", "united states", "wales"]),
    ("C", ["argentina", "saudi arabia", "mexico", "poland"]),
    ("D", ["france", "australia", "denmark", "tunisia"]),
    ("E", ["spain", "costa rica", "germany", "japan"]),
    ("F", ["belgium", "canada", "morocco", "croatia"]),
    ("G", ["brazil", "serbia", "switzerland", "cameroon"]),
    ("H", ["portugal", "ghana", "uruguay", "south korea"]),
];

// (winner of group, runner-up of group), indices into WC2022_GROUPS.
const ROUND_OF_16: [(usize, usize); 8] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (1, 0),
    (3, 2),
    (5, 4),
    (7, 6),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finish {
    Winner,
    RunnerUp,
    Third,
    Fourth,
    QuarterFinal,
}

impl Finish {
    pub fn label(self) -> &'static str {
        match self {
            Finish::Winner => "Winner",
            Finish::RunnerUp => "Runner-up",
            Finish::Third => "3rd",
            Finish::Fourth => "4th",
            Finish::QuarterFinal => "Quarter-finals",
        }
    }
}

pub const WC2022_ACTUAL: [(&str, Finish); 8] = [
    ("argentina", Finish::Winner),
    ("france", Finish::RunnerUp),
    ("croatia", Finish::Third),
    ("morocco", Finish::Fourth),
    ("england", Finish::QuarterFinal),
    ("brazil", Finish::QuarterFinal),
    ("portugal", Finish::QuarterFinal),
    ("netherlands", Finish::QuarterFinal),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub runs: usize,
    pub seed: u64,
    pub as_of: NaiveDate,
    pub missing_rating: f64,
    pub goal_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            runs: 1000,
            seed: 2022,
            as_of: NaiveDate::from_ymd_opt(2022, 11, 20).unwrap_or_default(),
            missing_rating: 1600.0,
            goal_rate: 1.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub champion: String,
    pub finalists: Vec<String>,
    pub semi_finalists: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub wins: u32,
    pub finals: u32,
    pub semis: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub team: String,
    pub actual: Finish,
    pub semi_pct: f64,
    pub final_pct: f64,
    pub win_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub runs: usize,
    pub as_of: NaiveDate,
    pub counts: HashMap<String, StageCounts>,
    pub rows: Vec<ReportRow>,
}

impl BacktestReport {
    pub fn favourites(&self, take: usize) -> Vec<(&str, f64)> {
        let mut out: Vec<(&str, u32)> = self
            .counts
            .iter()
            .map(|(team, c)| (team.as_str(), c.wins))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        out.into_iter()
            .take(take)
            .map(|(team, wins)| (team, pct(wins, self.runs)))
            .collect()
    }
}

fn pct(count: u32, runs: usize) -> f64 {
    if runs == 0 {
        0.0
    } else {
        100.0 * count as f64 / runs as f64
    }
}

struct Model<'a> {
    ratings: &'a HashMap<String, f64>,
    scale: f64,
    cfg: &'a BacktestConfig,
}

impl Model<'_> {
    fn rating(&self, team: &str) -> f64 {
        self.ratings.get(team).copied().unwrap_or(self.cfg.missing_rating)
    }

    fn we(&self, a: &str, b: &str) -> f64 {
        expected_score(self.rating(a) - self.rating(b), self.scale)
    }

    fn goals<R: Rng + ?Sized>(&self, lambda: f64, rng: &mut R) -> u32 {
        match Poisson::new(lambda) {
            Ok(dist) => {
                let g: f64 = dist.sample(rng);
                g as u32
            }
            Err(_) => 0,
        }
    }

    fn group_match<R: Rng + ?Sized>(&self, a: &str, b: &str, rng: &mut R) -> MatchResult {
        let we = self.we(a, b);
        let goals_a = self.goals(self.cfg.goal_rate * we, rng);
        let goals_b = self.goals(self.cfg.goal_rate * (1.0 - we), rng);
        let winner = match goals_a.cmp(&goals_b) {
            std::cmp::Ordering::Greater => Some(a.to_string()),
            std::cmp::Ordering::Less => Some(b.to_string()),
            std::cmp::Ordering::Equal => None,
        };
        MatchResult {
            team_a: a.to_string(),
            team_b: b.to_string(),
            goals_a,
            goals_b,
            winner,
            resolution: Resolution::Regulation,
        }
    }

    fn knockout<'t, R: Rng + ?Sized>(&self, a: &'t str, b: &'t str, rng: &mut R) -> &'t str {
        if rng.gen_bool(self.we(a, b).clamp(0.0, 1.0)) { a } else { b }
    }

    fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> RunOutcome {
        let mut top_two: Vec<(String, String)> = Vec::with_capacity(WC2022_GROUPS.len());
        for (name, teams) in WC2022_GROUPS {
            let mut order: Vec<String> = teams.iter().map(|t| t.to_string()).collect();
            order.shuffle(rng);
            let mut table = GroupTable::new(name, &order);
            for (a, b) in table.fixtures() {
                let result = self.group_match(&a, &b, rng);
                table.record(&result);
            }
            let ranked = table.ranked();
            let first = ranked.first().map(|r| r.team.clone()).unwrap_or_default();
            let second = ranked.get(1).map(|r| r.team.clone()).unwrap_or_default();
            top_two.push((first, second));
        }

        let mut alive: Vec<String> = ROUND_OF_16
            .iter()
            .map(|&(w, r)| {
                let a = top_two[w].0.as_str();
                let b = top_two[r].1.as_str();
                self.knockout(a, b, rng).to_string()
            })
            .collect();

        let mut stages = Vec::new();
        while alive.len() > 1 {
            stages.push(alive.clone());
            alive = alive
                .chunks_exact(2)
                .map(|pair| self.knockout(&pair[0], &pair[1], rng).to_string())
                .collect();
        }

        // stages: [quarter-finalists, semi-finalists, finalists]
        let champion = alive.pop().unwrap_or_default();
        let finalists = stages.pop().unwrap_or_default();
        let semi_finalists = stages.pop().unwrap_or_default();
        RunOutcome {
            champion,
            finalists,
            semi_finalists,
        }
    }
}

/// One simulated 2022 tournament under the simplified model. `scale` is the
/// Elo scale the ratings were built with.
pub fn simulate_2022<R: Rng + ?Sized>(
    ratings: &HashMap<String, f64>,
    scale: f64,
    cfg: &BacktestConfig,
    rng: &mut R,
) -> RunOutcome {
    Model { ratings, scale, cfg }.run(rng)
}

pub fn run_backtest(table: &RatingTable, cfg: &BacktestConfig) -> BacktestReport {
    let ratings = table.ratings_as_of(cfg.as_of);
    info!(
        as_of = %cfg.as_of,
        rated = ratings.len(),
        runs = cfg.runs,
        "running 2022 backtest"
    );

    let counts = (0..cfg.runs as u64)
        .into_par_iter()
        .fold(HashMap::new, |mut acc: HashMap<String, StageCounts>, i| {
            let mut rng = run_rng(cfg.seed, i);
            let outcome = simulate_2022(&ratings, table.scale, cfg, &mut rng);
            acc.entry(outcome.champion).or_default().wins += 1;
            for t in outcome.finalists {
                acc.entry(t).or_default().finals += 1;
            }
            for t in outcome.semi_finalists {
                acc.entry(t).or_default().semis += 1;
            }
            acc
        })
        .reduce(HashMap::new, |mut acc, other| {
            for (team, c) in other {
                let e = acc.entry(team).or_default();
                e.wins += c.wins;
                e.finals += c.finals;
                e.semis += c.semis;
            }
            acc
        });

    let rows = WC2022_ACTUAL
        .iter()
        .map(|&(team, actual)| {
            let c = counts.get(team).cloned().unwrap_or_default();
            ReportRow {
                team: team.to_string(),
                actual,
                semi_pct: pct(c.semis, cfg.runs),
                final_pct: pct(c.finals, cfg.runs),
                win_pct: pct(c.wins, cfg.runs),
            }
        })
        .collect();

    BacktestReport {
        runs: cfg.runs,
        as_of: cfg.as_of,
        counts,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_produces_consistent_stages() {
        let ratings = HashMap::from([("brazil".to_string(), 2100.0)]);
        let cfg = BacktestConfig::default();
        let mut rng = run_rng(1, 0);
        let out = simulate_2022(&ratings, 600.0, &cfg, &mut rng);
        assert_eq!(out.semi_finalists.len(), 4);
        assert_eq!(out.finalists.len(), 2);
        assert!(out.finalists.contains(&out.champion));
        assert!(out.finalists.iter().all(|f| out.semi_finalists.contains(f)));
    }

    #[test]
    fn report_rows_follow_actual_order() {
        let table = RatingTable::from_ratings(1200.0, [("argentina", 2000.0)]);
        let cfg = BacktestConfig {
            runs: 50,
            ..BacktestConfig::default()
        };
        let report = run_backtest(&table, &cfg);
        assert_eq!(report.rows.len(), 8);
        assert_eq!(report.rows[0].team, "argentina");
        let wins: u32 = report.counts.values().map(|c| c.wins).sum();
        assert_eq!(wins, 50);
    }
}
