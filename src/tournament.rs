use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineResult;
use crate::format::{BracketSlot, GroupEntry, QualifierNode, TournamentFormat};
use crate::match_sim::{MatchKind, MatchResult, simulate_match};
use crate::snapshot::RatingSnapshot;
use crate::standings::{GroupRow, GroupTable, ThirdPlaced, best_third_places};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundKind {
    // Number of teams entering the round.
    RoundOf(usize),
    QuarterFinal,
    SemiFinal,
    ThirdPlace,
    Final,
}

impl RoundKind {
    pub fn for_fixtures(fixtures: usize) -> Self {
        match fixtures {
            1 => RoundKind::Final,
            2 => RoundKind::SemiFinal,
            4 => RoundKind::QuarterFinal,
            n => RoundKind::RoundOf(n * 2),
        }
    }

    pub fn label(self) -> String {
        match self {
            RoundKind::RoundOf(n) => format!("Round of {n}"),
            RoundKind::QuarterFinal => "Quarter-finals".to_string(),
            RoundKind::SemiFinal => "Semi-finals".to_string(),
            RoundKind::ThirdPlace => "Third-place play-off".to_string(),
            RoundKind::Final => "Final".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifierOutcome {
    pub path: String,
    pub winner: String,
    // Play order; empty in fast mode.
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStanding {
    pub group: String,
    pub rows: Vec<GroupRow>,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnockoutRound {
    pub round: RoundKind,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    pub champion: String,
    pub runner_up: String,
    pub third_place: String,
    pub fourth_place: String,
    pub qualifiers: Vec<QualifierOutcome>,
    pub groups: Vec<GroupStanding>,
    pub best_thirds: Vec<String>,
    pub rounds: Vec<KnockoutRound>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimOptions {
    // Skip tables, match logs and bracket rounds; podium only.
    pub fast: bool,
}

#[derive(Debug, Clone)]
pub struct Tournament {
    format: TournamentFormat,
}

impl Tournament {
    pub fn new(format: TournamentFormat) -> EngineResult<Self> {
        format.validate()?;
        Ok(Self { format })
    }

    pub fn world_cup_2026() -> EngineResult<Self> {
        Self::new(TournamentFormat::world_cup_2026())
    }

    pub fn format(&self) -> &TournamentFormat {
        &self.format
    }

    pub fn simulate<R: Rng + ?Sized>(
        &self,
        snapshot: &RatingSnapshot,
        opts: SimOptions,
        rng: &mut R,
    ) -> TournamentResult {
        let mut run = Run {
            snapshot,
            fast: opts.fast,
            rng,
        };

        let qualifiers = run.play_qualifiers(&self.format);
        let slots: HashMap<&str, &str> = qualifiers
            .iter()
            .map(|q| (q.path.as_str(), q.winner.as_str()))
            .collect();

        let mut ranked_groups = Vec::with_capacity(self.format.groups.len());
        let mut standings = Vec::new();
        for spec in &self.format.groups {
            let teams: Vec<String> = spec
                .entries
                .iter()
                .map(|entry| match entry {
                    GroupEntry::Team(name) => name.clone(),
                    GroupEntry::Qualifier(id) => {
                        slots.get(id.as_str()).copied().unwrap_or(id.as_str()).to_string()
                    }
                })
                .collect();
            let (rows, matches) = run.play_group(&spec.name, &teams);
            if !run.fast {
                standings.push(GroupStanding {
                    group: spec.name.clone(),
                    rows: rows.clone(),
                    matches,
                });
            }
            ranked_groups.push(rows);
        }

        let thirds = ranked_groups
            .iter()
            .enumerate()
            .filter_map(|(group, rows)| {
                rows.get(2).map(|row| ThirdPlaced {
                    group,
                    row: row.clone(),
                })
            })
            .collect();
        let best = best_third_places(thirds, self.format.best_thirds);

        let team_at = |slot: BracketSlot| -> String {
            let row = match slot {
                BracketSlot::Winner(g) => ranked_groups.get(g).and_then(|r| r.first()),
                BracketSlot::RunnerUp(g) => ranked_groups.get(g).and_then(|r| r.get(1)),
                BracketSlot::Third(k) => best.get(k).map(|t| &t.row),
            };
            row.map(|r| r.team.clone()).unwrap_or_default()
        };
        let fixtures: Vec<(String, String)> = self
            .format
            .opening_round
            .iter()
            .map(|(a, b)| (team_at(*a), team_at(*b)))
            .collect();

        let podium = run.play_knockouts(fixtures);
        debug!(champion = %podium.champion, "tournament simulated");

        TournamentResult {
            champion: podium.champion,
            runner_up: podium.runner_up,
            third_place: podium.third_place,
            fourth_place: podium.fourth_place,
            qualifiers: if run.fast {
                Vec::new()
            } else {
                qualifiers
            },
            groups: standings,
            best_thirds: best.into_iter().map(|t| t.row.team).collect(),
            rounds: podium.rounds,
        }
    }
}

struct Podium {
    champion: String,
    runner_up: String,
    third_place: String,
    fourth_place: String,
    rounds: Vec<KnockoutRound>,
}

struct Run<'a, R: ?Sized> {
    snapshot: &'a RatingSnapshot,
    fast: bool,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Run<'_, R> {
    fn knockout(&mut self, a: &str, b: &str) -> (MatchResult, String, String) {
        let result = simulate_match(self.snapshot, a, b, MatchKind::Knockout, &mut *self.rng);
        let winner = result.winner.clone().unwrap_or_else(|| a.to_string());
        let loser = if winner == a { b } else { a }.to_string();
        (result, winner, loser)
    }

    fn resolve_node(&mut self, node: &QualifierNode, log: &mut Vec<MatchResult>) -> String {
        match node {
            QualifierNode::Team(name) => name.clone(),
            QualifierNode::Tie(left, right) => {
                let a = self.resolve_node(left, log);
                let b = self.resolve_node(right, log);
                let (result, winner, _) = self.knockout(&a, &b);
                if !self.fast {
                    log.push(result);
                }
                winner
            }
        }
    }

    fn play_qualifiers(&mut self, format: &TournamentFormat) -> Vec<QualifierOutcome> {
        format
            .qualifiers
            .iter()
            .map(|path| {
                let mut matches = Vec::new();
                let winner = self.resolve_node(&path.bracket, &mut matches);
                QualifierOutcome {
                    path: path.id.clone(),
                    winner,
                    matches,
                }
            })
            .collect()
    }

    fn play_group(&mut self, name: &str, teams: &[String]) -> (Vec<GroupRow>, Vec<MatchResult>) {
        let mut table = GroupTable::new(name, teams);
        let mut matches = Vec::new();
        for (a, b) in table.fixtures() {
            let result = simulate_match(self.snapshot, &a, &b, MatchKind::Group, &mut *self.rng);
            table.record(&result);
            if !self.fast {
                matches.push(result);
            }
        }
        (table.ranked(), matches)
    }

    fn play_knockouts(&mut self, mut fixtures: Vec<(String, String)>) -> Podium {
        let mut rounds = Vec::new();
        let mut semi_losers = Vec::new();

        while fixtures.len() > 1 {
            let kind = RoundKind::for_fixtures(fixtures.len());
            let mut winners = Vec::with_capacity(fixtures.len());
            let mut matches = Vec::new();
            for (a, b) in &fixtures {
                let (result, winner, loser) = self.knockout(a, b);
                winners.push(winner);
                if kind == RoundKind::SemiFinal {
                    semi_losers.push(loser);
                }
                if !self.fast {
                    matches.push(result);
                }
            }
            if !self.fast {
                rounds.push(KnockoutRound {
                    round: kind,
                    matches,
                });
            }
            fixtures = winners
                .chunks_exact(2)
                .map(|pair| (pair[0].clone(), pair[1].clone()))
                .collect();
        }

        let (third_place, fourth_place) = match semi_losers.as_slice() {
            [a, b] => {
                let (result, winner, loser) = self.knockout(a, b);
                if !self.fast {
                    rounds.push(KnockoutRound {
                        round: RoundKind::ThirdPlace,
                        matches: vec![result],
                    });
                }
                (winner, loser)
            }
            _ => (String::new(), String::new()),
        };

        let (champion, runner_up) = match fixtures.first() {
            Some((a, b)) => {
                let (result, winner, loser) = self.knockout(a, b);
                if !self.fast {
                    rounds.push(KnockoutRound {
                        round: RoundKind::Final,
                        matches: vec![result],
                    });
                }
                (winner, loser)
            }
            None => (String::new(), String::new()),
        };

        Podium {
            champion,
            runner_up,
            third_place,
            fourth_place,
            rounds,
        }
    }
}
