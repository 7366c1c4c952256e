use serde::{Deserialize, Serialize};

use crate::match_sim::MatchResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRow {
    pub team: String,
    pub played: u32,
    pub points: u32,
    pub goal_difference: i32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl GroupRow {
    pub fn new(team: &str) -> Self {
        Self {
            team: team.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference += scored as i32 - conceded as i32;
        if scored > conceded {
            self.wins += 1;
            self.points += 3;
        } else if scored < conceded {
            self.losses += 1;
        } else {
            self.draws += 1;
            self.points += 1;
        }
    }

    /// Points, then goal difference, then goals scored. Head-to-head is not used.
    pub fn ranking_key(&self) -> (u32, i32, u32) {
        (self.points, self.goal_difference, self.goals_for)
    }
}

/// Stable descending sort on the ranking key; fully tied rows keep their order.
pub fn sort_standings(rows: &mut [GroupRow]) {
    rows.sort_by(|a, b| b.ranking_key().cmp(&a.ranking_key()));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTable {
    pub name: String,
    rows: Vec<GroupRow>,
}

impl GroupTable {
    pub fn new(name: &str, teams: &[String]) -> Self {
        Self {
            name: name.to_string(),
            rows: teams.iter().map(|t| GroupRow::new(t)).collect(),
        }
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.team.as_str())
    }

    pub fn fixtures(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (i, a) in self.rows.iter().enumerate() {
            for b in &self.rows[i + 1..] {
                out.push((a.team.clone(), b.team.clone()));
            }
        }
        out
    }

    pub fn record(&mut self, result: &MatchResult) {
        for row in &mut self.rows {
            if row.team == result.team_a {
                row.record(result.goals_a, result.goals_b);
            } else if row.team == result.team_b {
                row.record(result.goals_b, result.goals_a);
            }
        }
    }

    pub fn ranked(&self) -> Vec<GroupRow> {
        let mut rows = self.rows.clone();
        sort_standings(&mut rows);
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPlaced {
    pub group: usize,
    pub row: GroupRow,
}

/// Ranks third-placed teams across groups with the group ranking key and keeps
/// the best `take`. Ties keep group order.
pub fn best_third_places(mut thirds: Vec<ThirdPlaced>, take: usize) -> Vec<ThirdPlaced> {
    thirds.sort_by(|a, b| b.row.ranking_key().cmp(&a.row.ranking_key()));
    thirds.truncate(take);
    thirds
}
