use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::info;

use crate::confed::{self, Confederation, ConfederationTable};
use crate::config::EngineConfig;
use crate::dataset::MatchArchive;
use crate::elo::{self, RatingTable};
use crate::error::EngineResult;
use crate::match_sim::SimParams;
use crate::profile::{self, PlayStyle, TeamProfile};

static FALLBACK_PROFILE: Lazy<TeamProfile> = Lazy::new(TeamProfile::default);

#[derive(Debug, Clone)]
pub struct RatingSnapshot {
    pub ratings: RatingTable,
    pub profiles: HashMap<String, TeamProfile>,
    pub confederations: ConfederationTable,
    pub global_avg_goals: f64,
    pub params: SimParams,
    pub profile_window_start: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy)]
pub struct TeamView<'a> {
    pub name: &'a str,
    pub known: bool,
    pub rating: f64,
    pub profile: &'a TeamProfile,
    pub confederation: Confederation,
    pub confed_multiplier: f64,
    pub host: bool,
}

impl TeamView<'_> {
    pub fn style(&self) -> PlayStyle {
        self.profile.style
    }

    pub fn offense_index(&self) -> f64 {
        self.profile.offense_index
    }

    pub fn defense_index(&self) -> f64 {
        self.profile.defense_index
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub team: String,
    pub rating: f64,
    pub matches_played: usize,
    pub offense_index: f64,
    pub defense_index: f64,
    pub style: PlayStyle,
    pub form: String,
    pub confederation: Confederation,
}

impl RatingSnapshot {
    pub fn new(
        ratings: RatingTable,
        profiles: HashMap<String, TeamProfile>,
        confederations: ConfederationTable,
        global_avg_goals: f64,
        params: SimParams,
    ) -> Self {
        Self {
            ratings,
            profiles,
            confederations,
            global_avg_goals,
            params,
            profile_window_start: None,
        }
    }

    pub fn build(archive: &MatchArchive, cfg: &EngineConfig) -> EngineResult<Self> {
        let ratings = elo::compute_ratings(&archive.matches, cfg.elo);
        let profile_set =
            profile::build_profiles(&ratings, &archive.matches, &archive.goals, &cfg.profile);
        let confederations = confed::compute_multipliers(&ratings)?;

        info!(
            teams = ratings.len(),
            global_avg_goals = profile_set.global_avg_goals,
            "rating snapshot ready"
        );

        Ok(Self {
            ratings,
            profiles: profile_set.profiles,
            confederations,
            global_avg_goals: profile_set.global_avg_goals,
            params: cfg.sim.clone(),
            profile_window_start: profile_set.window_start,
        })
    }

    pub fn team<'a>(&'a self, name: &'a str) -> TeamView<'a> {
        let rated = self.ratings.get(name);
        let profile = self.profiles.get(name).unwrap_or(&*FALLBACK_PROFILE);
        let confederation = confed::confederation_of(name);
        TeamView {
            name,
            known: rated.is_some(),
            rating: rated.map(|t| t.rating).unwrap_or(self.ratings.initial_rating),
            profile,
            confederation,
            confed_multiplier: self.confederations.multiplier(confederation),
            host: self.params.is_host(name),
        }
    }

    pub fn leaderboard(&self, only: Option<&[String]>) -> Vec<LeaderboardRow> {
        self.ratings
            .ranked()
            .into_iter()
            .filter(|t| only.is_none_or(|list| list.iter().any(|n| *n == t.name)))
            .enumerate()
            .map(|(idx, t)| {
                let view = self.team(&t.name);
                LeaderboardRow {
                    rank: idx + 1,
                    team: t.name.clone(),
                    rating: t.rating,
                    matches_played: t.matches_played(),
                    offense_index: view.offense_index(),
                    defense_index: view.defense_index(),
                    style: view.style(),
                    form: view.profile.form_string(),
                    confederation: view.confederation,
                }
            })
            .collect()
    }
}
