use approx::assert_relative_eq;
use chrono::NaiveDate;

use wc26_predictor::dataset::{GoalEvent, MatchRecord};
use wc26_predictor::elo::RatingTable;
use wc26_predictor::profile::{PlayStyle, ProfileConfig, build_profiles};

fn record(date: &str, home: &str, away: &str, hs: u16, as_: u16) -> MatchRecord {
    MatchRecord {
        date: date.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_score: Some(hs),
        away_score: Some(as_),
        tournament: "Friendly".to_string(),
        neutral: true,
    }
}

fn goal(date: &str, team: &str, minute: Option<u16>, penalty: bool) -> GoalEvent {
    GoalEvent {
        date: date.to_string(),
        team: team.to_string(),
        scorer: "someone".to_string(),
        minute,
        penalty,
        own_goal: false,
    }
}

#[test]
fn indices_form_and_style_from_the_recent_window() {
    let mut records = vec![record("2020-01-01", "x", "y", 0, 9)];
    for day in 1..=6 {
        records.push(record(&format!("2024-01-0{day}"), "x", "y", 3, 0));
    }
    records.push(record("2024-02-01", "x", "y", 0, 1));
    records.push(record("2024-03-01", "z", "y", 5, 0));
    let ratings = RatingTable::from_ratings(
        1200.0,
        [("x", 1500.0), ("y", 1100.0), ("z", 1300.0), ("w", 1250.0)],
    );

    let set = build_profiles(&ratings, &records, &[], &ProfileConfig::default());
    assert_eq!(set.window_start, NaiveDate::from_ymd_opt(2021, 3, 1));
    // 24 goals over 8 matches in the window; the 2020 rout is outside it.
    assert_relative_eq!(set.global_avg_goals, 1.5);
    assert_eq!(set.profiles.len(), 4);

    let x = &set.profiles["x"];
    assert_eq!(x.recent_matches, 7);
    assert_relative_eq!(x.offense_index, 18.0 / 7.0 / 1.5, epsilon = 1e-12);
    assert_relative_eq!(x.defense_index, 1.0 / 7.0 / 1.5, epsilon = 1e-12);
    assert_relative_eq!(x.clean_sheet_pct, 6.0 / 7.0, epsilon = 1e-12);
    assert_eq!(x.form_string(), "WWWWL");
    assert_eq!(x.style, PlayStyle::Dominant);

    let y = &set.profiles["y"];
    assert_eq!(y.recent_matches, 8);
    assert_eq!(y.form_string(), "LLLWL");
    assert_eq!(y.style, PlayStyle::Balanced);

    // One match is below the sample gate: neutral indices and style.
    let z = &set.profiles["z"];
    assert_eq!(z.recent_matches, 1);
    assert_eq!(z.form_string(), "W");
    assert_eq!(z.offense_index, 1.0);
    assert_eq!(z.defense_index, 1.0);
    assert_eq!(z.style, PlayStyle::Balanced);

    let w = &set.profiles["w"];
    assert_eq!(w.recent_matches, 0);
    assert!(w.form_string().is_empty());
}

#[test]
fn goal_timing_drives_style_once_enough_events_exist() {
    let records: Vec<MatchRecord> = (1..=5)
        .map(|day| record(&format!("2024-05-0{day}"), "p", "q", 1, 1))
        .collect();
    let mut goals = Vec::new();
    for i in 0..10u16 {
        goals.push(goal("2024-05-01", "p", Some(50 + i), i < 3));
        goals.push(goal("2024-05-01", "q", Some(10 + i), false));
    }
    goals.push(goal("2024-05-02", "q", None, false));
    for i in 0..9u16 {
        goals.push(goal("2024-05-03", "r", Some(80 + i), false));
    }
    let ratings =
        RatingTable::from_ratings(1200.0, [("p", 1400.0), ("q", 1400.0), ("r", 1300.0)]);

    let set = build_profiles(&ratings, &records, &goals, &ProfileConfig::default());
    assert_relative_eq!(set.global_avg_goals, 1.0);

    let p = &set.profiles["p"];
    assert_relative_eq!(p.penalty_goal_pct, 0.3);
    assert_eq!(p.first_half_goal_pct, 0.0);
    assert_eq!(p.late_goal_pct, 0.0);
    assert_eq!(p.both_teams_scored_pct, 1.0);
    assert_eq!(p.style, PlayStyle::SetPieceReliant);

    // Untimed goals count toward the total but not the timing split.
    let q = &set.profiles["q"];
    assert_eq!(q.first_half_goal_pct, 1.0);
    assert_eq!(q.penalty_goal_pct, 0.0);
    assert_eq!(q.style, PlayStyle::AggressiveStarter);

    // Nine events are too few for timing percentages.
    let r = &set.profiles["r"];
    assert_eq!(r.late_goal_pct, 0.0);
    assert_eq!(r.style, PlayStyle::Balanced);
}
