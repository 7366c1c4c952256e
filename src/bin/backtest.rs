use chrono::NaiveDate;

use wc26_predictor::backtest::{self, BacktestConfig};
use wc26_predictor::config::EngineConfig;
use wc26_predictor::dataset::MatchArchive;
use wc26_predictor::elo;

// usage: backtest [runs] [as-of YYYY-MM-DD]
fn main() -> anyhow::Result<()> {
    wc26_predictor::init_logging("info");

    let cfg = EngineConfig::load()?;
    let mut bt = BacktestConfig {
        seed: cfg.batch.seed,
        ..BacktestConfig::default()
    };
    let mut args = std::env::args().skip(1);
    if let Some(runs) = args.next() {
        bt.runs = runs.parse::<usize>()?.max(1);
    }
    if let Some(date) = args.next() {
        bt.as_of = NaiveDate::parse_from_str(&date, "%Y-%m-%d")?;
    }

    let archive = MatchArchive::load(&cfg.data)?;
    let ratings = elo::compute_ratings(&archive.matches, cfg.elo);
    let report = backtest::run_backtest(&ratings, &bt);

    println!(
        "2022 World Cup backtest: {} runs, ratings as of {}",
        report.runs, report.as_of
    );
    println!("\nMost likely champions:");
    for (team, pct) in report.favourites(5) {
        println!("  {team:<16} {pct:>5.1}%");
    }

    println!(
        "\n{:<14} {:<16} {:>8} {:>8} {:>8}",
        "Team", "Real result", "Semis", "Final", "Win"
    );
    for row in &report.rows {
        println!(
            "{:<14} {:<16} {:>7.1}% {:>7.1}% {:>7.1}%",
            row.team,
            row.actual.label(),
            row.semi_pct,
            row.final_pct,
            row.win_pct
        );
    }

    Ok(())
}
