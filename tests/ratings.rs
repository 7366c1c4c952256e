use approx::assert_relative_eq;
use chrono::NaiveDate;

use wc26_predictor::dataset::{MatchRecord, PlayedMatch};
use wc26_predictor::elo::{EloConfig, RatingEngine, compute_ratings};

fn record(date: &str, home: &str, away: &str, hs: u16, as_: u16, tournament: &str) -> MatchRecord {
    MatchRecord {
        date: date.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_score: Some(hs),
        away_score: Some(as_),
        tournament: tournament.to_string(),
        neutral: false,
    }
}

fn sample_archive() -> Vec<MatchRecord> {
    vec![
        record("2021-03-01", "brazil", "peru", 3, 0, "FIFA World Cup qualification"),
        record("2021-06-10", "peru", "chile", 1, 1, "Copa América"),
        record("2021-09-05", "chile", "brazil", 0, 1, "Friendly"),
        record("2022-11-24", "brazil", "serbia", 2, 0, "FIFA World Cup"),
        record("2022-12-09", "croatia", "brazil", 1, 1, "FIFA World Cup"),
        MatchRecord {
            home_score: None,
            ..record("2026-06-12", "brazil", "morocco", 0, 0, "FIFA World Cup")
        },
    ]
}

#[test]
fn every_update_is_zero_sum() {
    let mut engine = RatingEngine::new(EloConfig::default());
    for m in sample_archive().iter().filter_map(MatchRecord::as_played) {
        let update = engine.apply(&m);
        assert_relative_eq!(update.home_delta + update.away_delta, 0.0);
    }
}

#[test]
fn total_rating_is_conserved() {
    let table = compute_ratings(&sample_archive(), EloConfig::default());
    let total: f64 = table.teams.values().map(|t| t.rating).sum();
    assert_relative_eq!(total, 1200.0 * table.len() as f64, epsilon = 1e-6);
    assert_eq!(table.processed, 5);
    assert_eq!(table.skipped, 1);
}

#[test]
fn replay_is_order_independent_for_distinct_dates() {
    let forward = compute_ratings(&sample_archive(), EloConfig::default());
    let mut shuffled = sample_archive();
    shuffled.reverse();
    let backward = compute_ratings(&shuffled, EloConfig::default());
    for (name, team) in &forward.teams {
        assert_relative_eq!(team.rating, backward.rating(name));
    }
}

#[test]
fn winner_gains_and_home_edge_counts() {
    let mut engine = RatingEngine::new(EloConfig::default());
    let m = PlayedMatch {
        date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        home_team: "a".to_string(),
        away_team: "b".to_string(),
        home_score: 1,
        away_score: 0,
        tournament: "Friendly".to_string(),
        neutral: false,
    };
    let update = engine.apply(&m);
    assert!(update.expected_home > 0.5);
    assert!(update.home_delta > 0.0);
    assert!(engine.rating("a") > engine.rating("b"));
}

#[test]
fn historical_lookup_uses_last_rating_before_date() {
    let table = compute_ratings(&sample_archive(), EloConfig::default());
    let before = NaiveDate::from_ymd_opt(2022, 11, 20).unwrap();
    let brazil = table.get("brazil").unwrap();
    let expected = brazil.history[1].rating;
    assert_relative_eq!(table.rating_as_of("brazil", before).unwrap(), expected);
    assert!(table.rating_as_of("serbia", before).is_none());
    assert!(!table.ratings_as_of(before).contains_key("croatia"));
    assert_eq!(
        table.rating_as_of("brazil", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
        None
    );
}
