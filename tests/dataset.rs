use std::fs;
use std::path::Path;

use wc26_predictor::config::{DataPaths, EngineConfig};
use wc26_predictor::dataset::MatchArchive;
use wc26_predictor::error::EngineError;
use wc26_predictor::snapshot::RatingSnapshot;

const RESULTS: &str = "\
date,home_team,away_team,home_score,away_score,tournament,city,country,neutral
2023-03-24,Swaziland,Zambia,0,2,African Cup of Nations qualification,Mbabane,Eswatini,FALSE
2023-06-17,USA,Mexico,3,0,CONCACAF Nations League,Paradise,United States,TRUE
2023-09-08,Korea Republic,Wales,0,0,Friendly,Cardiff,Wales,FALSE
not-a-date,Brazil,Peru,1,0,Friendly,Lima,Peru,FALSE
2026-06-11,Mexico,South Africa,NA,NA,FIFA World Cup,Mexico City,Mexico,FALSE
";

const GOALS: &str = "\
date,home_team,away_team,team,scorer,minute,own_goal,penalty
2023-03-24,Swaziland,Zambia,Zambia,Someone,12,FALSE,FALSE
2023-06-17,USA,Mexico,USA,Someone Else,45+2,FALSE,TRUE
";

const FORMER: &str = "\
current,former,start_date,end_date
Eswatini,Swaziland,1968-01-01,2018-04-19
";

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn paths(dir: &Path) -> DataPaths {
    DataPaths {
        data_dir: dir.to_path_buf(),
        ..DataPaths::default()
    }
}

#[test]
fn loads_and_resolves_names() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "results.csv", RESULTS);
    write(dir.path(), "goalscorers.csv", GOALS);
    write(dir.path(), "former_names.csv", FORMER);

    let archive = MatchArchive::load(&paths(dir.path())).unwrap();
    assert_eq!(archive.matches.len(), 5);
    assert_eq!(archive.matches[0].home_team, "eswatini");
    assert_eq!(archive.matches[1].home_team, "united states");
    assert!(archive.matches[1].neutral);
    assert_eq!(archive.matches[2].home_team, "south korea");
    assert_eq!(archive.matches[4].home_score, None);

    assert_eq!(archive.goals.len(), 2);
    assert_eq!(archive.goals[1].team, "united states");
    assert_eq!(archive.goals[1].minute, Some(45));
    assert!(archive.goals[1].penalty);
}

#[test]
fn optional_tables_may_be_missing() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "results.csv", RESULTS);

    let archive = MatchArchive::load(&paths(dir.path())).unwrap();
    assert!(archive.goals.is_empty());
    // Built-in aliases still apply.
    assert_eq!(archive.matches[1].home_team, "united states");
    assert_eq!(archive.matches[0].home_team, "swaziland");
}

#[test]
fn missing_results_table_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = MatchArchive::load(&paths(dir.path())).unwrap_err();
    assert!(matches!(err, EngineError::InputUnavailable { .. }), "{err}");
}

#[test]
fn header_only_results_table_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "results.csv",
        "date,home_team,away_team,home_score,away_score,tournament,neutral\n",
    );
    let err = MatchArchive::load(&paths(dir.path())).unwrap_err();
    assert!(matches!(err, EngineError::MalformedInput { .. }), "{err}");
}

#[test]
fn snapshot_builds_from_loaded_archive() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "results.csv", RESULTS);
    write(dir.path(), "former_names.csv", FORMER);

    let cfg = EngineConfig {
        data: paths(dir.path()),
        ..EngineConfig::default()
    };
    let archive = MatchArchive::load(&cfg.data).unwrap();
    let snap = RatingSnapshot::build(&archive, &cfg).unwrap();

    // The undated and unplayed rows are skipped.
    assert_eq!(snap.ratings.processed, 3);
    assert_eq!(snap.ratings.skipped, 2);
    assert!(snap.team("zambia").rating > snap.team("eswatini").rating);
    assert!(!snap.team("atlantis").known);
    let board = snap.leaderboard(None);
    assert_eq!(board.len(), snap.ratings.len());
    assert_eq!(board[0].rank, 1);
}
