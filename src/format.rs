use std::collections::HashSet;

use crate::error::{EngineError, EngineResult};

use BracketSlot::{RunnerUp, Third, Winner};

#[derive(Debug, Clone, PartialEq)]
pub enum QualifierNode {
    Team(String),
    Tie(Box<QualifierNode>, Box<QualifierNode>),
}

impl QualifierNode {
    pub fn team(name: &str) -> Self {
        QualifierNode::Team(name.to_string())
    }

    pub fn tie(a: QualifierNode, b: QualifierNode) -> Self {
        QualifierNode::Tie(Box::new(a), Box::new(b))
    }

    fn collect_teams<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            QualifierNode::Team(name) => out.push(name),
            QualifierNode::Tie(a, b) => {
                a.collect_teams(out);
                b.collect_teams(out);
            }
        }
    }

    pub fn teams(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_teams(&mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifierPath {
    pub id: String,
    pub bracket: QualifierNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupEntry {
    Team(String),
    // Filled by the winner of the qualifier path with this id.
    Qualifier(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    pub name: String,
    pub entries: Vec<GroupEntry>,
}

/// Source of one knockout position. Group slots index `TournamentFormat::groups`;
/// `Third(k)` is the k-th best third-placed team (0 = best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketSlot {
    Winner(usize),
    RunnerUp(usize),
    Third(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TournamentFormat {
    pub name: String,
    pub qualifiers: Vec<QualifierPath>,
    pub groups: Vec<GroupSpec>,
    pub best_thirds: usize,
    // Listed in bracket order: fixture 2i's winner meets fixture 2i+1's winner.
    pub opening_round: Vec<(BracketSlot, BracketSlot)>,
}

const A: usize = 0;
const B: usize = 1;
const C: usize = 2;
const D: usize = 3;
const E: usize = 4;
const F: usize = 5;
const G: usize = 6;
const H: usize = 7;
const I: usize = 8;
const J: usize = 9;
const K: usize = 10;
const L: usize = 11;

/// Round-of-32 pairings for the 12-group format. Group winners only meet
/// third-placed teams or runners-up from other groups; runners-up never meet
/// their own group-mates.
pub const WC2026_ROUND_OF_32: [(BracketSlot, BracketSlot); 16] = [
    (Winner(E), Third(0)),
    (Winner(I), Third(1)),
    (RunnerUp(A), RunnerUp(B)),
    (Winner(F), RunnerUp(C)),
    (RunnerUp(K), RunnerUp(L)),
    (Winner(H), RunnerUp(J)),
    (Winner(D), Third(2)),
    (Winner(G), Third(3)),
    (Winner(C), RunnerUp(F)),
    (RunnerUp(E), RunnerUp(I)),
    (Winner(A), Third(4)),
    (Winner(L), Third(5)),
    (Winner(J), RunnerUp(H)),
    (RunnerUp(D), RunnerUp(G)),
    (Winner(B), Third(6)),
    (Winner(K), Third(7)),
];

fn group(name: &str, entries: &[&str]) -> GroupSpec {
    GroupSpec {
        name: name.to_string(),
        entries: entries
            .iter()
            .map(|e| match e.strip_prefix('@') {
                Some(path) => GroupEntry::Qualifier(path.to_string()),
                None => GroupEntry::Team(e.to_string()),
            })
            .collect(),
    }
}

fn uefa_path(id: &str, semis: [(&str, &str); 2]) -> QualifierPath {
    let [(a, b), (c, d)] = semis;
    QualifierPath {
        id: id.to_string(),
        bracket: QualifierNode::tie(
            QualifierNode::tie(QualifierNode::team(a), QualifierNode::team(b)),
            QualifierNode::tie(QualifierNode::team(c), QualifierNode::team(d)),
        ),
    }
}

fn interconf_path(id: &str, seeded: &str, first_round: (&str, &str)) -> QualifierPath {
    QualifierPath {
        id: id.to_string(),
        bracket: QualifierNode::tie(
            QualifierNode::team(seeded),
            QualifierNode::tie(
                QualifierNode::team(first_round.0),
                QualifierNode::team(first_round.1),
            ),
        ),
    }
}

impl TournamentFormat {
    pub fn world_cup_2026() -> Self {
        let qualifiers = vec![
            uefa_path(
                "path-a",
                [("italy", "northern ireland"), ("wales", "bosnia and herzegovina")],
            ),
            uefa_path("path-b", [("ukraine", "sweden"), ("poland", "albania")]),
            uefa_path("path-c", [("turkey", "romania"), ("slovakia", "kosovo")]),
            uefa_path(
                "path-d",
                [
                    ("czech republic", "republic of ireland"),
                    ("denmark", "north macedonia"),
                ],
            ),
            interconf_path("icp-1", "jamaica", ("dr congo", "new caledonia")),
            interconf_path("icp-2", "iraq", ("bolivia", "suriname")),
        ];

        let groups = vec![
            group("A", &["mexico", "south africa", "south korea", "@path-d"]),
            group("B", &["canada", "switzerland", "qatar", "@path-a"]),
            group("C", &["brazil", "morocco", "haiti", "scotland"]),
            group("D", &["united states", "paraguay", "australia", "@path-c"]),
            group("E", &["germany", "curacao", "ivory coast", "ecuador"]),
            group("F", &["netherlands", "japan", "tunisia", "@path-b"]),
            group("G", &["belgium", "egypt", "iran", "new zealand"]),
            group("H", &["spain", "cape verde", "saudi arabia", "uruguay"]),
            group("I", &["france", "senegal", "norway", "@icp-2"]),
            group("J", &["argentina", "algeria", "austria", "jordan"]),
            group("K", &["portugal", "uzbekistan", "colombia", "@icp-1"]),
            group("L", &["england", "croatia", "ghana", "panama"]),
        ];

        Self {
            name: "FIFA World Cup 2026".to_string(),
            qualifiers,
            groups,
            best_thirds: 8,
            opening_round: WC2026_ROUND_OF_32.to_vec(),
        }
    }

    pub fn participants(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for g in &self.groups {
            for entry in &g.entries {
                if let GroupEntry::Team(name) = entry {
                    out.push(name.clone());
                }
            }
        }
        for q in &self.qualifiers {
            out.extend(q.bracket.teams().into_iter().map(str::to_string));
        }
        out
    }

    pub fn bracket_size(&self) -> usize {
        self.opening_round.len() * 2
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.groups.is_empty() {
            return Err(EngineError::format(&self.name, "no groups"));
        }

        let min_group = if self.best_thirds > 0 { 3 } else { 2 };
        let qualifier_ids: HashSet<&str> = self.qualifiers.iter().map(|q| q.id.as_str()).collect();
        if qualifier_ids.len() != self.qualifiers.len() {
            return Err(EngineError::format(&self.name, "duplicate qualifier path id"));
        }

        let mut used_paths = HashSet::new();
        for g in &self.groups {
            if g.entries.len() < min_group {
                return Err(EngineError::format(
                    format!("group {}", g.name),
                    format!("{} teams, need at least {min_group}", g.entries.len()),
                ));
            }
            for entry in &g.entries {
                if let GroupEntry::Qualifier(id) = entry {
                    if !qualifier_ids.contains(id.as_str()) {
                        return Err(EngineError::format(
                            format!("group {}", g.name),
                            format!("unknown qualifier path {id}"),
                        ));
                    }
                    if !used_paths.insert(id.as_str()) {
                        return Err(EngineError::format(
                            format!("group {}", g.name),
                            format!("qualifier path {id} fills more than one slot"),
                        ));
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        for team in self.participants() {
            if !seen.insert(team.clone()) {
                return Err(EngineError::format(&self.name, format!("{team} appears twice")));
            }
        }

        if self.best_thirds > self.groups.len() {
            return Err(EngineError::format(
                &self.name,
                format!(
                    "{} best thirds requested from {} groups",
                    self.best_thirds,
                    self.groups.len()
                ),
            ));
        }

        self.validate_bracket()
    }

    fn validate_bracket(&self) -> EngineResult<()> {
        let size = self.bracket_size();
        if size < 4 || !size.is_power_of_two() {
            return Err(EngineError::format(
                "opening round",
                format!("bracket of {size} teams is not a power of two of at least 4"),
            ));
        }

        let expected = self.groups.len() * 2 + self.best_thirds;
        if expected != size {
            return Err(EngineError::format(
                "opening round",
                format!("{expected} qualified teams for a bracket of {size}"),
            ));
        }

        let mut seen = HashSet::new();
        for (idx, (a, b)) in self.opening_round.iter().enumerate() {
            for slot in [a, b] {
                let in_range = match *slot {
                    BracketSlot::Winner(g) | BracketSlot::RunnerUp(g) => g < self.groups.len(),
                    BracketSlot::Third(k) => k < self.best_thirds,
                };
                if !in_range {
                    return Err(EngineError::format(
                        format!("opening round fixture {}", idx + 1),
                        format!("slot {slot:?} out of range"),
                    ));
                }
                if !seen.insert(*slot) {
                    return Err(EngineError::format(
                        format!("opening round fixture {}", idx + 1),
                        format!("slot {slot:?} used twice"),
                    ));
                }
            }
            let same_group = match (*a, *b) {
                (Winner(x) | RunnerUp(x), Winner(y) | RunnerUp(y)) => x == y,
                _ => false,
            };
            if same_group {
                return Err(EngineError::format(
                    format!("opening round fixture {}", idx + 1),
                    "pairs two teams from the same group",
                ));
            }
        }
        Ok(())
    }
}
