use std::collections::HashMap;
use std::fmt;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::{GoalEvent, MatchRecord, PlayedMatch};
use crate::elo::RatingTable;

/// Per-team goals per match used when the recent window holds no matches.
pub const DEFAULT_GLOBAL_AVG_GOALS: f64 = 1.25;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub recent_years: u32,
    pub goal_event_years: u32,
    pub min_recent_matches: usize,
    pub min_goal_events: usize,
    pub form_length: usize,
    pub late_minute: u16,
    pub first_half_minute: u16,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            recent_years: 3,
            goal_event_years: 8,
            min_recent_matches: 5,
            min_goal_events: 10,
            form_length: 5,
            late_minute: 75,
            first_half_minute: 45,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayStyle {
    Dominant,
    Resilient,
    HighRiskReward,
    DefensiveWall,
    Disciplined,
    AggressiveStarter,
    SetPieceReliant,
    Attacking,
    Compact,
    LateSurge,
    OpenGame,
    Balanced,
}

impl PlayStyle {
    pub fn label(self) -> &'static str {
        match self {
            PlayStyle::Dominant => "Dominant",
            PlayStyle::Resilient => "Resilient",
            PlayStyle::HighRiskReward => "High Risk/Reward",
            PlayStyle::DefensiveWall => "Defensive Wall",
            PlayStyle::Disciplined => "Disciplined",
            PlayStyle::AggressiveStarter => "Aggressive Starter",
            PlayStyle::SetPieceReliant => "Set-Piece Reliant",
            PlayStyle::Attacking => "Attacking",
            PlayStyle::Compact => "Compact",
            PlayStyle::LateSurge => "Late Surge",
            PlayStyle::OpenGame => "Open Game",
            PlayStyle::Balanced => "Balanced",
        }
    }

    pub fn has_penalty_edge(self) -> bool {
        matches!(self, PlayStyle::SetPieceReliant)
    }
}

impl fmt::Display for PlayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StyleMetrics {
    pub offense_index: f64,
    pub defense_index: f64,
    pub clean_sheet_pct: f64,
    pub both_teams_scored_pct: f64,
    pub first_half_goal_pct: f64,
    pub late_goal_pct: f64,
    pub penalty_goal_pct: f64,
}

type StyleRule = (PlayStyle, fn(&StyleMetrics) -> bool);

// Priority order matters: the first rule that holds decides the label.
const STYLE_RULES: &[StyleRule] = &[
    (PlayStyle::Dominant, |m| m.offense_index >= 1.25 && m.defense_index <= 0.75),
    (PlayStyle::Resilient, |m| m.defense_index <= 0.85 && m.late_goal_pct >= 0.30),
    (PlayStyle::HighRiskReward, |m| m.offense_index >= 1.15 && m.defense_index >= 1.15),
    (PlayStyle::DefensiveWall, |m| m.offense_index <= 0.85 && m.clean_sheet_pct >= 0.45),
    (PlayStyle::Disciplined, |m| m.offense_index <= 1.0 && m.clean_sheet_pct >= 0.35),
    (PlayStyle::AggressiveStarter, |m| m.first_half_goal_pct >= 0.55),
    (PlayStyle::SetPieceReliant, |m| m.penalty_goal_pct >= 0.20 && m.offense_index <= 1.0),
    (PlayStyle::Attacking, |m| m.offense_index >= 1.20),
    (PlayStyle::Compact, |m| m.defense_index <= 0.80),
    (PlayStyle::LateSurge, |m| m.late_goal_pct >= 0.35),
    (PlayStyle::OpenGame, |m| m.both_teams_scored_pct >= 0.60),
];

pub fn classify_style(metrics: &StyleMetrics) -> PlayStyle {
    STYLE_RULES
        .iter()
        .find(|(_, holds)| holds(metrics))
        .map(|(style, _)| *style)
        .unwrap_or(PlayStyle::Balanced)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    pub fn symbol(self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamProfile {
    pub recent_matches: usize,
    pub goals_for_avg: f64,
    pub goals_against_avg: f64,
    pub offense_index: f64,
    pub defense_index: f64,
    pub style: PlayStyle,
    // Oldest first.
    pub recent_form: Vec<FormResult>,
    pub clean_sheet_pct: f64,
    pub both_teams_scored_pct: f64,
    pub first_half_goal_pct: f64,
    pub late_goal_pct: f64,
    pub penalty_goal_pct: f64,
}

impl Default for TeamProfile {
    fn default() -> Self {
        Self {
            recent_matches: 0,
            goals_for_avg: 0.0,
            goals_against_avg: 0.0,
            offense_index: 1.0,
            defense_index: 1.0,
            style: PlayStyle::Balanced,
            recent_form: Vec::new(),
            clean_sheet_pct: 0.0,
            both_teams_scored_pct: 0.0,
            first_half_goal_pct: 0.0,
            late_goal_pct: 0.0,
            penalty_goal_pct: 0.0,
        }
    }
}

impl TeamProfile {
    pub fn form_string(&self) -> String {
        self.recent_form.iter().map(|r| r.symbol()).collect()
    }

    pub fn metrics(&self) -> StyleMetrics {
        StyleMetrics {
            offense_index: self.offense_index,
            defense_index: self.defense_index,
            clean_sheet_pct: self.clean_sheet_pct,
            both_teams_scored_pct: self.both_teams_scored_pct,
            first_half_goal_pct: self.first_half_goal_pct,
            late_goal_pct: self.late_goal_pct,
            penalty_goal_pct: self.penalty_goal_pct,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    pub profiles: HashMap<String, TeamProfile>,
    pub global_avg_goals: f64,
    pub window_start: Option<NaiveDate>,
}

#[derive(Debug, Default)]
struct MatchAccum {
    matches: usize,
    goals_for: u32,
    goals_against: u32,
    clean_sheets: usize,
    both_scored: usize,
    form: Vec<FormResult>,
}

#[derive(Debug, Default)]
struct GoalAccum {
    total: usize,
    timed: usize,
    first_half: usize,
    late: usize,
    penalties: usize,
}

fn window_start(anchor: NaiveDate, years: u32) -> NaiveDate {
    anchor
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

pub fn build_profiles(
    ratings: &RatingTable,
    records: &[MatchRecord],
    goals: &[GoalEvent],
    cfg: &ProfileConfig,
) -> ProfileSet {
    let mut played: Vec<PlayedMatch> = records.iter().filter_map(MatchRecord::as_played).collect();
    played.sort_by_key(|m| m.date);

    let Some(anchor) = played.last().map(|m| m.date) else {
        return ProfileSet {
            profiles: HashMap::new(),
            global_avg_goals: DEFAULT_GLOBAL_AVG_GOALS,
            window_start: None,
        };
    };
    let recent_from = window_start(anchor, cfg.recent_years);
    let recent: Vec<&PlayedMatch> = played.iter().filter(|m| m.date > recent_from).collect();

    let global_avg_goals = if recent.is_empty() {
        DEFAULT_GLOBAL_AVG_GOALS
    } else {
        let total: u32 = recent
            .iter()
            .map(|m| u32::from(m.home_score) + u32::from(m.away_score))
            .sum();
        total as f64 / (2.0 * recent.len() as f64)
    };

    let mut per_team: HashMap<&str, MatchAccum> = HashMap::new();
    for m in &recent {
        for team in [m.home_team.as_str(), m.away_team.as_str()] {
            let Some((gf, ga)) = m.goals_for(team) else {
                continue;
            };
            let acc = per_team.entry(team).or_default();
            acc.matches += 1;
            acc.goals_for += u32::from(gf);
            acc.goals_against += u32::from(ga);
            if ga == 0 {
                acc.clean_sheets += 1;
            }
            if gf > 0 && ga > 0 {
                acc.both_scored += 1;
            }
            acc.form.push(if gf > ga {
                FormResult::Win
            } else if gf < ga {
                FormResult::Loss
            } else {
                FormResult::Draw
            });
        }
    }

    let goals_from = window_start(anchor, cfg.goal_event_years);
    let mut per_team_goals: HashMap<&str, GoalAccum> = HashMap::new();
    for g in goals {
        if !g.parsed_date().is_some_and(|d| d > goals_from) {
            continue;
        }
        let acc = per_team_goals.entry(g.team.as_str()).or_default();
        acc.total += 1;
        if g.penalty {
            acc.penalties += 1;
        }
        if let Some(minute) = g.minute {
            acc.timed += 1;
            if minute <= cfg.first_half_minute {
                acc.first_half += 1;
            }
            if minute >= cfg.late_minute {
                acc.late += 1;
            }
        }
    }

    let mut profiles = HashMap::with_capacity(ratings.len());
    for name in ratings.teams.keys() {
        let mut profile = TeamProfile::default();
        if let Some(acc) = per_team.get(name.as_str()) {
            let n = acc.matches as f64;
            profile.recent_matches = acc.matches;
            profile.goals_for_avg = acc.goals_for as f64 / n;
            profile.goals_against_avg = acc.goals_against as f64 / n;
            profile.clean_sheet_pct = ratio(acc.clean_sheets, acc.matches);
            profile.both_teams_scored_pct = ratio(acc.both_scored, acc.matches);
            let skip = acc.form.len().saturating_sub(cfg.form_length);
            profile.recent_form = acc.form[skip..].to_vec();
        }
        if let Some(g) = per_team_goals.get(name.as_str()) {
            if g.total >= cfg.min_goal_events {
                profile.first_half_goal_pct = ratio(g.first_half, g.timed);
                profile.late_goal_pct = ratio(g.late, g.timed);
                profile.penalty_goal_pct = ratio(g.penalties, g.total);
            }
        }

        if profile.recent_matches >= cfg.min_recent_matches && global_avg_goals > 0.0 {
            profile.offense_index = profile.goals_for_avg / global_avg_goals;
            profile.defense_index = profile.goals_against_avg / global_avg_goals;
            profile.style = classify_style(&profile.metrics());
        }
        profiles.insert(name.clone(), profile);
    }

    info!(
        teams = profiles.len(),
        recent_matches = recent.len(),
        global_avg_goals,
        %recent_from,
        "team profiles built"
    );
    debug!(goal_teams = per_team_goals.len(), %goals_from, "goal-event window");

    ProfileSet {
        profiles,
        global_avg_goals,
        window_start: Some(recent_from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> StyleMetrics {
        StyleMetrics {
            offense_index: 1.0,
            defense_index: 1.0,
            ..StyleMetrics::default()
        }
    }

    #[test]
    fn average_team_is_balanced() {
        assert_eq!(classify_style(&metrics()), PlayStyle::Balanced);
    }

    #[test]
    fn first_matching_rule_wins() {
        // Also qualifies as Resilient and Attacking; Dominant is listed first.
        let m = StyleMetrics {
            offense_index: 1.6,
            defense_index: 0.5,
            late_goal_pct: 0.5,
            ..metrics()
        };
        assert_eq!(classify_style(&m), PlayStyle::Dominant);

        let m = StyleMetrics {
            offense_index: 0.8,
            clean_sheet_pct: 0.5,
            penalty_goal_pct: 0.4,
            ..metrics()
        };
        assert_eq!(classify_style(&m), PlayStyle::DefensiveWall);

        let m = StyleMetrics {
            offense_index: 0.9,
            penalty_goal_pct: 0.3,
            ..metrics()
        };
        assert_eq!(classify_style(&m), PlayStyle::SetPieceReliant);
    }

    #[test]
    fn only_set_piece_teams_get_a_shootout_edge() {
        assert!(PlayStyle::SetPieceReliant.has_penalty_edge());
        assert!(!PlayStyle::Dominant.has_penalty_edge());
        assert!(!PlayStyle::Balanced.has_penalty_edge());
    }
}
