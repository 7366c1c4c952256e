use std::collections::HashMap;

use wc26_predictor::bulk::run_batch;
use wc26_predictor::confed::ConfederationTable;
use wc26_predictor::config::BatchConfig;
use wc26_predictor::elo::RatingTable;
use wc26_predictor::match_sim::SimParams;
use wc26_predictor::snapshot::RatingSnapshot;
use wc26_predictor::tournament::Tournament;

fn snapshot() -> RatingSnapshot {
    RatingSnapshot::new(
        RatingTable::from_ratings(
            1200.0,
            [("spain", 2150.0), ("argentina", 2100.0), ("france", 2050.0)],
        ),
        HashMap::new(),
        ConfederationTable::default(),
        1.25,
        SimParams::default(),
    )
}

#[test]
fn medal_table_does_not_depend_on_thread_count() {
    let tournament = Tournament::world_cup_2026().unwrap();
    let snap = snapshot();
    let single = run_batch(
        &tournament,
        &snap,
        &BatchConfig {
            simulations: 60,
            seed: 99,
            threads: Some(1),
        },
    );
    let many = run_batch(
        &tournament,
        &snap,
        &BatchConfig {
            simulations: 60,
            seed: 99,
            threads: Some(4),
        },
    );
    assert_eq!(single, many);
}

#[test]
fn every_run_awards_each_medal_once() {
    let tournament = Tournament::world_cup_2026().unwrap();
    let table = run_batch(
        &tournament,
        &snapshot(),
        &BatchConfig {
            simulations: 40,
            seed: 1,
            threads: None,
        },
    );
    assert_eq!(table.simulations, 40);
    assert_eq!(table.total_golds(), 40);
    let silvers: u32 = table.rows.iter().map(|r| r.silver).sum();
    let bronzes: u32 = table.rows.iter().map(|r| r.bronze).sum();
    assert_eq!((silvers, bronzes), (40, 40));
    assert!(
        table
            .rows
            .windows(2)
            .all(|w| w[0].score > w[1].score || (w[0].score == w[1].score && w[0].team < w[1].team))
    );
    let pct: f64 = table.rows.iter().map(|r| r.win_pct).sum();
    assert!((pct - 100.0).abs() < 1e-6);
}

#[test]
fn different_seeds_usually_differ() {
    let tournament = Tournament::world_cup_2026().unwrap();
    let snap = snapshot();
    let a = run_batch(
        &tournament,
        &snap,
        &BatchConfig {
            simulations: 30,
            seed: 1,
            threads: None,
        },
    );
    let b = run_batch(
        &tournament,
        &snap,
        &BatchConfig {
            simulations: 30,
            seed: 2,
            threads: None,
        },
    );
    assert_ne!(a, b);
}
