use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::{MatchRecord, Outcome, PlayedMatch};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    pub initial_rating: f64,
    pub home_advantage: f64,
    // Rating gap that makes the favourite ten times likelier: 600 here, not chess's 400.
    pub scale: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1200.0,
            home_advantage: 100.0,
            scale: 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionTier {
    WorldCupFinals,
    ContinentalFinals,
    Qualifier,
    RegionalMinor,
    Friendly,
    Other,
}

// Evaluated top to bottom; the first pattern contained in the label wins.
// Qualifying patterns sit above the finals patterns they contain.
const TIER_RULES: &[(&str, CompetitionTier)] = &[
    ("world cup qualification", CompetitionTier::Qualifier),
    ("qualification", CompetitionTier::Qualifier),
    ("qualifier", CompetitionTier::Qualifier),
    ("nations league", CompetitionTier::Qualifier),
    ("fifa world cup", CompetitionTier::WorldCupFinals),
    ("world cup", CompetitionTier::WorldCupFinals),
    ("uefa euro", CompetitionTier::ContinentalFinals),
    ("copa américa", CompetitionTier::ContinentalFinals),
    ("copa america", CompetitionTier::ContinentalFinals),
    ("african cup of nations", CompetitionTier::ContinentalFinals),
    ("africa cup of nations", CompetitionTier::ContinentalFinals),
    ("afc asian cup", CompetitionTier::ContinentalFinals),
    ("gold cup", CompetitionTier::ContinentalFinals),
    ("ofc nations cup", CompetitionTier::ContinentalFinals),
    ("confederations cup", CompetitionTier::ContinentalFinals),
    ("continental", CompetitionTier::ContinentalFinals),
    ("friendly", CompetitionTier::Friendly),
    ("cosafa", CompetitionTier::RegionalMinor),
    ("cecafa", CompetitionTier::RegionalMinor),
    ("gulf cup", CompetitionTier::RegionalMinor),
    ("aff championship", CompetitionTier::RegionalMinor),
    ("saff cup", CompetitionTier::RegionalMinor),
    ("eaff", CompetitionTier::RegionalMinor),
    ("waff", CompetitionTier::RegionalMinor),
    ("baltic cup", CompetitionTier::RegionalMinor),
    ("nordic championship", CompetitionTier::RegionalMinor),
    ("caribbean cup", CompetitionTier::RegionalMinor),
    ("uncaf", CompetitionTier::RegionalMinor),
    ("copa centroamericana", CompetitionTier::RegionalMinor),
    ("king's cup", CompetitionTier::RegionalMinor),
    ("kirin", CompetitionTier::RegionalMinor),
];

impl CompetitionTier {
    pub fn classify(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        TIER_RULES
            .iter()
            .find(|(pattern, _)| label.contains(pattern))
            .map(|(_, tier)| *tier)
            .unwrap_or(CompetitionTier::Other)
    }

    pub fn base_k(self) -> f64 {
        match self {
            CompetitionTier::WorldCupFinals => 60.0,
            CompetitionTier::ContinentalFinals => 50.0,
            CompetitionTier::Qualifier => 40.0,
            CompetitionTier::RegionalMinor => 30.0,
            CompetitionTier::Other => 20.0,
            CompetitionTier::Friendly => 15.0,
        }
    }
}

pub fn margin_multiplier(goal_difference: u16) -> f64 {
    match goal_difference {
        0 | 1 => 1.0,
        2 => 1.5,
        3 => 1.75,
        gd => 1.75 + (gd as f64 - 3.0) / 8.0,
    }
}

pub fn k_factor(tournament: &str, goal_difference: u16) -> f64 {
    CompetitionTier::classify(tournament).base_k() * margin_multiplier(goal_difference)
}

pub fn expected_score(rating_diff: f64, scale: f64) -> f64 {
    1.0 / (10.0_f64.powf(-rating_diff / scale) + 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingPoint {
    pub date: NaiveDate,
    pub rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRating {
    pub name: String,
    pub rating: f64,
    pub history: Vec<RatingPoint>,
}

impl TeamRating {
    fn new(name: &str, rating: f64) -> Self {
        Self {
            name: name.to_string(),
            rating,
            history: Vec::new(),
        }
    }

    pub fn matches_played(&self) -> usize {
        self.history.len()
    }

    pub fn rating_as_of(&self, date: NaiveDate) -> Option<f64> {
        let idx = self.history.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| self.history[i].rating)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingUpdate {
    pub date: NaiveDate,
    pub expected_home: f64,
    pub k: f64,
    pub home_delta: f64,
    pub away_delta: f64,
}

#[derive(Debug, Clone)]
pub struct RatingEngine {
    cfg: EloConfig,
    teams: HashMap<String, TeamRating>,
}

impl RatingEngine {
    pub fn new(cfg: EloConfig) -> Self {
        Self {
            cfg,
            teams: HashMap::new(),
        }
    }

    pub fn rating(&self, team: &str) -> f64 {
        self.teams
            .get(team)
            .map(|t| t.rating)
            .unwrap_or(self.cfg.initial_rating)
    }

    pub fn apply(&mut self, m: &PlayedMatch) -> RatingUpdate {
        let rh = self.rating(&m.home_team);
        let ra = self.rating(&m.away_team);

        let venue = if m.neutral { 0.0 } else { self.cfg.home_advantage };
        let expected_home = expected_score(rh - ra + venue, self.cfg.scale);
        let w = match m.outcome() {
            Outcome::Home => 1.0,
            Outcome::Draw => 0.5,
            Outcome::Away => 0.0,
        };
        let k = k_factor(&m.tournament, m.goal_difference());
        let delta = k * (w - expected_home);

        let initial = self.cfg.initial_rating;
        for (team, rating) in [(&m.home_team, rh + delta), (&m.away_team, ra - delta)] {
            let entry = self
                .teams
                .entry(team.clone())
                .or_insert_with(|| TeamRating::new(team, initial));
            entry.rating = rating;
            entry.history.push(RatingPoint {
                date: m.date,
                rating,
            });
        }

        RatingUpdate {
            date: m.date,
            expected_home,
            k,
            home_delta: delta,
            away_delta: -delta,
        }
    }

    pub fn finish(self, processed: usize, skipped: usize) -> RatingTable {
        RatingTable {
            initial_rating: self.cfg.initial_rating,
            scale: self.cfg.scale,
            teams: self.teams,
            processed,
            skipped,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingTable {
    pub initial_rating: f64,
    // Logistic scale the ratings were built with; the match model reads it from here.
    pub scale: f64,
    pub teams: HashMap<String, TeamRating>,
    pub processed: usize,
    pub skipped: usize,
}

impl Default for RatingTable {
    fn default() -> Self {
        let cfg = EloConfig::default();
        Self {
            initial_rating: cfg.initial_rating,
            scale: cfg.scale,
            teams: HashMap::new(),
            processed: 0,
            skipped: 0,
        }
    }
}

impl RatingTable {
    pub fn from_ratings<'a>(
        initial_rating: f64,
        ratings: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Self {
        let teams = ratings
            .into_iter()
            .map(|(name, rating)| (name.to_string(), TeamRating::new(name, rating)))
            .collect();
        Self {
            initial_rating,
            teams,
            ..Self::default()
        }
    }

    pub fn get(&self, team: &str) -> Option<&TeamRating> {
        self.teams.get(team)
    }

    pub fn rating(&self, team: &str) -> f64 {
        self.get(team).map(|t| t.rating).unwrap_or(self.initial_rating)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn rating_as_of(&self, team: &str, date: NaiveDate) -> Option<f64> {
        self.get(team)?.rating_as_of(date)
    }

    /// Every team's last rating on or before `date`; teams unseen by then are omitted.
    pub fn ratings_as_of(&self, date: NaiveDate) -> HashMap<String, f64> {
        self.teams
            .iter()
            .filter_map(|(name, t)| t.rating_as_of(date).map(|r| (name.clone(), r)))
            .collect()
    }

    pub fn ranked(&self) -> Vec<&TeamRating> {
        let mut out: Vec<&TeamRating> = self.teams.values().collect();
        out.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.name.cmp(&b.name)));
        out
    }
}

/// Replays the archive in date order. Rows without both scores or a valid
/// date are skipped; equal dates keep their input order.
pub fn compute_ratings(records: &[MatchRecord], cfg: EloConfig) -> RatingTable {
    let mut matches: Vec<PlayedMatch> = records.iter().filter_map(MatchRecord::as_played).collect();
    let skipped = records.len() - matches.len();
    matches.sort_by_key(|m| m.date);

    let mut engine = RatingEngine::new(cfg);
    for m in &matches {
        engine.apply(m);
    }

    let table = engine.finish(matches.len(), skipped);
    info!(
        teams = table.len(),
        processed = table.processed,
        skipped = table.skipped,
        "ratings replayed"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_rules_prefer_qualifying_over_finals() {
        assert_eq!(
            CompetitionTier::classify("FIFA World Cup qualification"),
            CompetitionTier::Qualifier
        );
        assert_eq!(
            CompetitionTier::classify("FIFA World Cup"),
            CompetitionTier::WorldCupFinals
        );
        assert_eq!(
            CompetitionTier::classify("UEFA Euro"),
            CompetitionTier::ContinentalFinals
        );
        assert_eq!(
            CompetitionTier::classify("UEFA Nations League"),
            CompetitionTier::Qualifier
        );
        assert_eq!(CompetitionTier::classify("COSAFA Cup"), CompetitionTier::RegionalMinor);
        assert_eq!(CompetitionTier::classify("Friendly"), CompetitionTier::Friendly);
        assert_eq!(CompetitionTier::classify("Merdeka Tournament"), CompetitionTier::Other);
    }

    #[test]
    fn margin_scaling_steps() {
        assert_eq!(margin_multiplier(0), 1.0);
        assert_eq!(margin_multiplier(1), 1.0);
        assert_eq!(margin_multiplier(2), 1.5);
        assert_eq!(margin_multiplier(3), 1.75);
        assert_eq!(margin_multiplier(5), 2.0);
    }

    #[test]
    fn expected_score_is_symmetric() {
        let we = expected_score(200.0, 600.0);
        assert!((we - 0.6826).abs() < 1e-3);
        assert!((we + expected_score(-200.0, 600.0) - 1.0).abs() < 1e-12);
        assert_eq!(expected_score(0.0, 600.0), 0.5);
    }

    #[test]
    fn table_carries_the_replay_scale() {
        let cfg = EloConfig {
            scale: 400.0,
            ..EloConfig::default()
        };
        assert_eq!(compute_ratings(&[], cfg).scale, 400.0);
        assert_eq!(RatingTable::from_ratings(1200.0, [("x", 1300.0)]).scale, 600.0);
    }

    #[test]
    fn history_lookup_by_date() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let team = TeamRating {
            name: "x".to_string(),
            rating: 1250.0,
            history: vec![
                RatingPoint { date: d("2020-01-01"), rating: 1210.0 },
                RatingPoint { date: d("2021-01-01"), rating: 1250.0 },
            ],
        };
        assert_eq!(team.rating_as_of(d("2019-12-31")), None);
        assert_eq!(team.rating_as_of(d("2020-01-01")), Some(1210.0));
        assert_eq!(team.rating_as_of(d("2020-06-01")), Some(1210.0));
        assert_eq!(team.rating_as_of(d("2030-01-01")), Some(1250.0));
    }
}
