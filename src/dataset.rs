use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::DataPaths;
use crate::error::{EngineError, EngineResult};
use crate::names::AliasMap;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    pub tournament: String,
    pub neutral: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayedMatch {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u16,
    pub away_score: u16,
    pub tournament: String,
    pub neutral: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl MatchRecord {
    pub fn as_played(&self) -> Option<PlayedMatch> {
        let (Some(home_score), Some(away_score)) = (self.home_score, self.away_score) else {
            return None;
        };
        let date = parse_date(&self.date)?;
        Some(PlayedMatch {
            date,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            home_score,
            away_score,
            tournament: self.tournament.clone(),
            neutral: self.neutral,
        })
    }
}

impl PlayedMatch {
    pub fn outcome(&self) -> Outcome {
        if self.home_score > self.away_score {
            Outcome::Home
        } else if self.home_score < self.away_score {
            Outcome::Away
        } else {
            Outcome::Draw
        }
    }

    pub fn goal_difference(&self) -> u16 {
        self.home_score.abs_diff(self.away_score)
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Goals scored and conceded from `team`'s point of view.
    pub fn goals_for(&self, team: &str) -> Option<(u16, u16)> {
        if self.home_team == team {
            Some((self.home_score, self.away_score))
        } else if self.away_team == team {
            Some((self.away_score, self.home_score))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalEvent {
    pub date: String,
    pub team: String,
    pub scorer: String,
    pub minute: Option<u16>,
    pub penalty: bool,
    pub own_goal: bool,
}

impl GoalEvent {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Parses scoring minutes, including stoppage notation ("45+2" -> 45).
pub fn parse_minute(raw: &str) -> Option<u16> {
    let base = raw.trim().split('+').next()?.trim();
    if base.is_empty() {
        return None;
    }
    base.parse::<u16>().ok()
}

fn parse_score(raw: &str) -> Option<u16> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("na") {
        return None;
    }
    s.parse::<u16>().ok()
}

fn parse_flag(raw: &str) -> bool {
    let s = raw.trim();
    s.eq_ignore_ascii_case("true") || s == "1"
}

#[derive(Debug, Clone, Default)]
pub struct MatchArchive {
    pub matches: Vec<MatchRecord>,
    pub goals: Vec<GoalEvent>,
    pub aliases: AliasMap,
    pub skipped_rows: usize,
}

impl MatchArchive {
    pub fn from_records(
        matches: Vec<MatchRecord>,
        goals: Vec<GoalEvent>,
        aliases: AliasMap,
    ) -> Self {
        let matches = matches
            .into_iter()
            .map(|mut m| {
                m.home_team = aliases.resolve(&m.home_team);
                m.away_team = aliases.resolve(&m.away_team);
                m
            })
            .collect();
        let goals = goals
            .into_iter()
            .map(|mut g| {
                g.team = aliases.resolve(&g.team);
                g
            })
            .collect();
        Self {
            matches,
            goals,
            aliases,
            skipped_rows: 0,
        }
    }

    /// Loads the archive from disk. Only the results table is mandatory.
    pub fn load(paths: &DataPaths) -> EngineResult<Self> {
        let mut aliases = AliasMap::builtin();
        let former_path = paths.former_names_path();
        match read_former_names(&former_path) {
            Ok(rows) => {
                for (former, current) in rows {
                    aliases.insert(&former, &current);
                }
            }
            Err(err) => warn!("former names not loaded, using built-in aliases only: {err}"),
        }

        let results_path = paths.results_path();
        let (matches, skipped_rows) = read_results(&results_path)?;
        if matches.is_empty() {
            return Err(EngineError::MalformedInput {
                path: results_path,
                reason: "no parsable match rows".to_string(),
            });
        }

        let goals = match read_goals(&paths.goals_path()) {
            Ok(goals) => goals,
            Err(err) => {
                warn!("goal events not loaded, tactical profiles will be sparse: {err}");
                Vec::new()
            }
        };

        info!(
            matches = matches.len(),
            goals = goals.len(),
            aliases = aliases.len(),
            skipped_rows,
            "match archive loaded"
        );

        let mut archive = Self::from_records(matches, goals, aliases);
        archive.skipped_rows = skipped_rows;
        Ok(archive)
    }
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    date: String,
    home_team: String,
    away_team: String,
    #[serde(default)]
    home_score: String,
    #[serde(default)]
    away_score: String,
    #[serde(default)]
    tournament: String,
    #[serde(default)]
    neutral: String,
}

#[derive(Debug, Deserialize)]
struct GoalRow {
    date: String,
    team: String,
    #[serde(default)]
    scorer: String,
    #[serde(default)]
    minute: String,
    #[serde(default)]
    own_goal: String,
    #[serde(default)]
    penalty: String,
}

#[derive(Debug, Deserialize)]
struct FormerNameRow {
    current: String,
    former: String,
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

fn open_table(path: &Path) -> EngineResult<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| EngineError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn malformed(path: &Path, err: csv::Error) -> EngineError {
    EngineError::MalformedInput {
        path: PathBuf::from(path),
        reason: err.to_string(),
    }
}

fn read_results(path: &Path) -> EngineResult<(Vec<MatchRecord>, usize)> {
    let mut reader = open_table(path)?;
    reader.headers().map_err(|e| malformed(path, e))?;

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<ResultRow>() {
        let Ok(row) = row else {
            skipped += 1;
            continue;
        };
        out.push(MatchRecord {
            date: row.date,
            home_team: row.home_team,
            away_team: row.away_team,
            home_score: parse_score(&row.home_score),
            away_score: parse_score(&row.away_score),
            tournament: row.tournament,
            neutral: parse_flag(&row.neutral),
        });
    }
    Ok((out, skipped))
}

fn read_goals(path: &Path) -> EngineResult<Vec<GoalEvent>> {
    let mut reader = open_table(path)?;
    reader.headers().map_err(|e| malformed(path, e))?;

    Ok(reader
        .deserialize::<GoalRow>()
        .filter_map(Result::ok)
        .map(|row| GoalEvent {
            date: row.date,
            team: row.team,
            scorer: row.scorer,
            minute: parse_minute(&row.minute),
            penalty: parse_flag(&row.penalty),
            own_goal: parse_flag(&row.own_goal),
        })
        .collect())
}

fn read_former_names(path: &Path) -> EngineResult<Vec<(String, String)>> {
    let mut reader = open_table(path)?;
    reader.headers().map_err(|e| malformed(path, e))?;

    Ok(reader
        .deserialize::<FormerNameRow>()
        .filter_map(Result::ok)
        .map(|row| (row.former, row.current))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, home: Option<u16>, away: Option<u16>) -> MatchRecord {
        MatchRecord {
            date: date.to_string(),
            home_team: "a".to_string(),
            away_team: "b".to_string(),
            home_score: home,
            away_score: away,
            tournament: "Friendly".to_string(),
            neutral: false,
        }
    }

    #[test]
    fn stoppage_minutes_use_base_minute() {
        assert_eq!(parse_minute("45+2"), Some(45));
        assert_eq!(parse_minute(" 90+4 "), Some(90));
        assert_eq!(parse_minute("17"), Some(17));
        assert_eq!(parse_minute(""), None);
        assert_eq!(parse_minute("NA"), None);
    }

    #[test]
    fn incomplete_rows_are_not_played() {
        assert!(record("2023-03-01", Some(1), None).as_played().is_none());
        assert!(record("03/01/2023", Some(1), Some(0)).as_played().is_none());
        let played = record("2023-03-01", Some(3), Some(1)).as_played().unwrap();
        assert_eq!(played.outcome(), Outcome::Home);
        assert_eq!(played.goal_difference(), 2);
        assert_eq!(played.goals_for("b"), Some((1, 3)));
    }

    #[test]
    fn scores_and_flags_parse_leniently() {
        assert_eq!(parse_score("NA"), None);
        assert_eq!(parse_score(" 4 "), Some(4));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("FALSE"));
    }
}
