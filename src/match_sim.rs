use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use crate::elo::expected_score;
use crate::profile::PlayStyle;
use crate::snapshot::{RatingSnapshot, TeamView};

const MAX_GOALS_GRID: u32 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub host_boost: f64,
    pub host_nations: Vec<String>,
    pub extra_time_factor: f64,
    pub penalty_rating_divisor: f64,
    pub penalty_style_bonus: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            host_boost: 1.15,
            host_nations: vec![
                "united states".to_string(),
                "mexico".to_string(),
                "canada".to_string(),
            ],
            extra_time_factor: 0.33,
            penalty_rating_divisor: 4000.0,
            penalty_style_bonus: 0.10,
        }
    }
}

impl SimParams {
    pub fn is_host(&self, team: &str) -> bool {
        self.host_nations.iter().any(|h| h == team)
    }
}

// Tactical counters, keyed (own style, opponent style). Unlisted pairings are neutral.
const STYLE_MATRIX: &[((PlayStyle, PlayStyle), f64)] = &[
    ((PlayStyle::HighRiskReward, PlayStyle::Balanced), 1.05),
    ((PlayStyle::Resilient, PlayStyle::AggressiveStarter), 1.10),
    ((PlayStyle::SetPieceReliant, PlayStyle::HighRiskReward), 1.05),
    ((PlayStyle::AggressiveStarter, PlayStyle::SetPieceReliant), 1.10),
];

pub fn style_modifier(own: PlayStyle, opponent: PlayStyle) -> f64 {
    STYLE_MATRIX
        .iter()
        .find(|(pair, _)| *pair == (own, opponent))
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Group,
    Knockout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Regulation,
    ExtraTime,
    Penalties,
}

impl Resolution {
    pub fn label(self) -> &'static str {
        match self {
            Resolution::Regulation => "REG",
            Resolution::ExtraTime => "AET",
            Resolution::Penalties => "PENS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub team_a: String,
    pub team_b: String,
    pub goals_a: u32,
    pub goals_b: u32,
    // None only for a drawn group match.
    pub winner: Option<String>,
    pub resolution: Resolution,
}

impl MatchResult {
    pub fn loser(&self) -> Option<&str> {
        let winner = self.winner.as_deref()?;
        Some(if winner == self.team_a {
            self.team_b.as_str()
        } else {
            self.team_a.as_str()
        })
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedGoals {
    pub expected_a: f64,
    pub lambda_a: f64,
    pub lambda_b: f64,
}

pub fn expected_goals(
    snapshot: &RatingSnapshot,
    a: &TeamView<'_>,
    b: &TeamView<'_>,
) -> ExpectedGoals {
    let params = &snapshot.params;
    let we = expected_score(a.rating - b.rating, snapshot.ratings.scale);
    let elo_scale = 1.0 + (we - 0.5);

    let host_a = if a.host { params.host_boost } else { 1.0 };
    let host_b = if b.host { params.host_boost } else { 1.0 };

    let lambda_a = snapshot.global_avg_goals
        * a.offense_index()
        * b.defense_index()
        * elo_scale
        * style_modifier(a.style(), b.style())
        * host_a
        * a.confed_multiplier;
    let lambda_b = snapshot.global_avg_goals
        * b.offense_index()
        * a.defense_index()
        * (2.0 - elo_scale)
        * style_modifier(b.style(), a.style())
        * host_b
        * b.confed_multiplier;

    ExpectedGoals {
        expected_a: we,
        lambda_a,
        lambda_b,
    }
}

pub fn sample_goals<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> u32 {
    if !(lambda.is_finite() && lambda > 0.0) {
        return 0;
    }
    match Poisson::new(lambda) {
        Ok(dist) => {
            let goals: f64 = dist.sample(rng);
            goals as u32
        }
        Err(_) => 0,
    }
}

pub fn penalty_win_prob(params: &SimParams, a: &TeamView<'_>, b: &TeamView<'_>) -> f64 {
    let bonus = |t: &TeamView<'_>| {
        if t.style().has_penalty_edge() {
            params.penalty_style_bonus
        } else {
            0.0
        }
    };
    (0.5 + (a.rating - b.rating) / params.penalty_rating_divisor + bonus(a) - bonus(b))
        .clamp(0.0, 1.0)
}

/// Samples one match. Group matches may end level; knockout matches go to
/// extra time at a reduced rate and then a weighted shootout.
pub fn simulate_match<R: Rng + ?Sized>(
    snapshot: &RatingSnapshot,
    team_a: &str,
    team_b: &str,
    kind: MatchKind,
    rng: &mut R,
) -> MatchResult {
    let a = snapshot.team(team_a);
    let b = snapshot.team(team_b);
    let xg = expected_goals(snapshot, &a, &b);

    let mut goals_a = sample_goals(xg.lambda_a, rng);
    let mut goals_b = sample_goals(xg.lambda_b, rng);
    let mut resolution = Resolution::Regulation;

    if goals_a == goals_b && kind == MatchKind::Knockout {
        let factor = snapshot.params.extra_time_factor;
        goals_a += sample_goals(xg.lambda_a * factor, rng);
        goals_b += sample_goals(xg.lambda_b * factor, rng);
        resolution = Resolution::ExtraTime;
    }

    let winner = if goals_a > goals_b {
        Some(team_a)
    } else if goals_b > goals_a {
        Some(team_b)
    } else if kind == MatchKind::Knockout {
        resolution = Resolution::Penalties;
        let p = penalty_win_prob(&snapshot.params, &a, &b);
        Some(if rng.gen_bool(p) { team_a } else { team_b })
    } else {
        None
    };

    MatchResult {
        team_a: team_a.to_string(),
        team_b: team_b.to_string(),
        goals_a,
        goals_b,
        winner: winner.map(str::to_string),
        resolution,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeProbs {
    pub win_a: f64,
    pub draw: f64,
    pub win_b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchPrediction {
    pub rating_a: f64,
    pub rating_b: f64,
    pub lambda_a: f64,
    pub lambda_b: f64,
    pub regulation: OutcomeProbs,
}

pub fn predict(snapshot: &RatingSnapshot, team_a: &str, team_b: &str) -> MatchPrediction {
    let a = snapshot.team(team_a);
    let b = snapshot.team(team_b);
    let xg = expected_goals(snapshot, &a, &b);
    MatchPrediction {
        rating_a: a.rating,
        rating_b: b.rating,
        lambda_a: xg.lambda_a,
        lambda_b: xg.lambda_b,
        regulation: outcome_probs(xg.lambda_a, xg.lambda_b),
    }
}

/// Exact regulation-time outcome probabilities for independent Poisson scores.
pub fn outcome_probs(lambda_a: f64, lambda_b: f64) -> OutcomeProbs {
    let pmf_a = poisson_pmf(lambda_a, MAX_GOALS_GRID);
    let pmf_b = poisson_pmf(lambda_b, MAX_GOALS_GRID);

    let mut win_a = 0.0;
    let mut draw = 0.0;
    let mut win_b = 0.0;
    for (i, p_i) in pmf_a.iter().enumerate() {
        for (j, p_j) in pmf_b.iter().enumerate() {
            let p = p_i * p_j;
            if i > j {
                win_a += p;
            } else if i < j {
                win_b += p;
            } else {
                draw += p;
            }
        }
    }

    // Guard against tiny float drift.
    let sum = win_a + draw + win_b;
    if sum > 0.0 {
        OutcomeProbs {
            win_a: win_a / sum,
            draw: draw / sum,
            win_b: win_b / sum,
        }
    } else {
        OutcomeProbs {
            win_a: 1.0 / 3.0,
            draw: 1.0 / 3.0,
            win_b: 1.0 / 3.0,
        }
    }
}

fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let mut out = vec![0.0; max_k + 1];
    let lambda = lambda.max(0.0);

    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }

    // Fold the tail into the last bucket.
    let sum: f64 = out.iter().sum();
    if sum < 1.0 {
        out[max_k] += 1.0 - sum;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_style_pairs_are_neutral() {
        assert_eq!(style_modifier(PlayStyle::Balanced, PlayStyle::Balanced), 1.0);
        assert_eq!(style_modifier(PlayStyle::Dominant, PlayStyle::DefensiveWall), 1.0);
        assert_eq!(
            style_modifier(PlayStyle::Resilient, PlayStyle::AggressiveStarter),
            1.10
        );
        // Lookups are directional: the counter only helps the listed side.
        assert_eq!(
            style_modifier(PlayStyle::AggressiveStarter, PlayStyle::Resilient),
            1.0
        );
    }

    #[test]
    fn pmf_sums_to_one() {
        let pmf = poisson_pmf(1.7, MAX_GOALS_GRID);
        let sum: f64 = pmf.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn equal_rates_give_symmetric_outcomes() {
        let p = outcome_probs(1.25, 1.25);
        assert!((p.win_a - p.win_b).abs() < 1e-12);
        assert!((p.win_a + p.draw + p.win_b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_rate_never_scores() {
        let mut rng = rand::thread_rng();
        assert_eq!(sample_goals(0.0, &mut rng), 0);
        assert_eq!(sample_goals(f64::NAN, &mut rng), 0);
    }
}
