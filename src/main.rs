use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use wc26_predictor::bulk::{self, MedalTable};
use wc26_predictor::confed::{check_membership, confed_label};
use wc26_predictor::config::EngineConfig;
use wc26_predictor::dataset::MatchArchive;
use wc26_predictor::export;
use wc26_predictor::match_sim;
use wc26_predictor::snapshot::RatingSnapshot;
use wc26_predictor::tournament::{SimOptions, Tournament, TournamentResult};

const USAGE: &str = "usage: wc26_predictor <command>
  ratings [--wc-only]
  team <name>
  predict <team-a> <team-b>
  simulate [--seed N] [--json]
  bulk [N] [--seed N] [--export file.xlsx]";

fn main() -> Result<()> {
    wc26_predictor::init_logging("info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };
    let rest = &args[1..];

    let cfg = EngineConfig::load()?;
    check_membership()?;
    let archive = MatchArchive::load(&cfg.data)?;
    let snapshot = RatingSnapshot::build(&archive, &cfg)?;
    let tournament = Tournament::world_cup_2026()?;

    match command {
        "ratings" => cmd_ratings(&snapshot, &tournament, rest.iter().any(|a| a == "--wc-only")),
        "team" => {
            let name = rest.join(" ");
            if name.trim().is_empty() {
                bail!("team: missing team name");
            }
            cmd_team(&snapshot, &archive.aliases.resolve(&name));
        }
        "predict" => {
            let [a, b] = rest else {
                bail!("predict: expected two team names (quote multi-word names)");
            };
            cmd_predict(
                &snapshot,
                &archive.aliases.resolve(a),
                &archive.aliases.resolve(b),
            );
        }
        "simulate" => {
            let seed = flag_value(rest, "--seed")?.unwrap_or(cfg.batch.seed);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = tournament.simulate(&snapshot, SimOptions::default(), &mut rng);
            if rest.iter().any(|a| a == "--json") {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_tournament(&result);
            }
        }
        "bulk" => {
            let mut batch = cfg.batch.clone();
            if let Some(n) = rest.first().and_then(|a| a.parse::<usize>().ok()) {
                batch.simulations = n.max(1);
            }
            if let Some(seed) = flag_value(rest, "--seed")? {
                batch.seed = seed;
            }
            let table = bulk::run_batch(&tournament, &snapshot, &batch);
            print_medals(&table, 20);

            if let Some(path) = flag_str(rest, "--export") {
                let path = PathBuf::from(path);
                let board = snapshot.leaderboard(None);
                let report = export::export_workbook(&path, &table, &board)?;
                info!(
                    path = %path.display(),
                    medal_rows = report.medal_rows,
                    leaderboard_rows = report.leaderboard_rows,
                    "workbook written"
                );
            }
        }
        other => bail!("unknown command {other:?}\n{USAGE}"),
    }

    Ok(())
}

fn flag_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn flag_value(args: &[String], flag: &str) -> Result<Option<u64>> {
    flag_str(args, flag)
        .map(|v| v.parse::<u64>().with_context(|| format!("{flag} expects a number, got {v:?}")))
        .transpose()
}

fn cmd_ratings(snapshot: &RatingSnapshot, tournament: &Tournament, wc_only: bool) {
    let participants = tournament.format().participants();
    let board = snapshot.leaderboard(wc_only.then_some(participants.as_slice()));
    println!(
        "{:>4}  {:<24} {:>6} {:>5} {:>5} {:>5}  {:<18} {:<6} {}",
        "#", "Team", "Elo", "MP", "Off", "Def", "Style", "Form", "Confed"
    );
    for row in board {
        println!(
            "{:>4}  {:<24} {:>6.0} {:>5} {:>5.2} {:>5.2}  {:<18} {:<6} {}",
            row.rank,
            row.team,
            row.rating,
            row.matches_played,
            row.offense_index,
            row.defense_index,
            row.style.label(),
            row.form,
            confed_label(row.confederation)
        );
    }
}

fn cmd_team(snapshot: &RatingSnapshot, name: &str) {
    let view = snapshot.team(name);
    let p = view.profile;
    if !view.known {
        println!("{name}: no rated matches, using baseline values");
    }
    println!("{}", view.name);
    println!("  Elo            {:.0}", view.rating);
    println!(
        "  Confederation  {} (x{:.3})",
        confed_label(view.confederation),
        view.confed_multiplier
    );
    println!("  Style          {}", p.style);
    println!("  Form           {}", p.form_string());
    println!(
        "  Recent         {} matches, {:.2} scored / {:.2} conceded per match",
        p.recent_matches, p.goals_for_avg, p.goals_against_avg
    );
    println!(
        "  Indices        offense {:.2}, defense {:.2}",
        p.offense_index, p.defense_index
    );
    println!(
        "  Clean sheets   {:.0}%   both scored {:.0}%",
        p.clean_sheet_pct * 100.0,
        p.both_teams_scored_pct * 100.0
    );
    println!(
        "  Goal timing    first half {:.0}%   late {:.0}%   penalties {:.0}%",
        p.first_half_goal_pct * 100.0,
        p.late_goal_pct * 100.0,
        p.penalty_goal_pct * 100.0
    );
    if view.host {
        println!("  Host nation");
    }
}

fn cmd_predict(snapshot: &RatingSnapshot, a: &str, b: &str) {
    let p = match_sim::predict(snapshot, a, b);
    println!("{a} ({:.0}) vs {b} ({:.0})", p.rating_a, p.rating_b);
    println!("  expected goals  {:.2} - {:.2}", p.lambda_a, p.lambda_b);
    println!("  {a:<16} {:>5.1}%", p.regulation.win_a * 100.0);
    println!("  {:<16} {:>5.1}%", "draw", p.regulation.draw * 100.0);
    println!("  {b:<16} {:>5.1}%", p.regulation.win_b * 100.0);
}

fn print_tournament(result: &TournamentResult) {
    for q in &result.qualifiers {
        println!("Play-off {}: {}", q.path, q.winner);
    }
    for g in &result.groups {
        println!("\nGroup {}", g.group);
        for (idx, row) in g.rows.iter().enumerate() {
            println!(
                "  {}. {:<24} {:>2} pts  {:>+3} GD  {:>2} GF",
                idx + 1,
                row.team,
                row.points,
                row.goal_difference,
                row.goals_for
            );
        }
    }
    println!("\nBest third-placed: {}", result.best_thirds.join(", "));
    for round in &result.rounds {
        println!("\n{}", round.round.label());
        for m in &round.matches {
            println!(
                "  {} {}-{} {} [{}]",
                m.team_a,
                m.goals_a,
                m.goals_b,
                m.team_b,
                m.resolution.label()
            );
        }
    }
    println!("\nChampion:  {}", result.champion);
    println!("Runner-up: {}", result.runner_up);
    println!("Third:     {}", result.third_place);
    println!("Fourth:    {}", result.fourth_place);
}

fn print_medals(table: &MedalTable, take: usize) {
    println!("Medal table over {} tournaments", table.simulations);
    println!(
        "{:>4}  {:<24} {:>6} {:>6} {:>6} {:>6} {:>7}",
        "#", "Team", "Gold", "Silver", "Bronze", "Score", "Win %"
    );
    for (idx, r) in table.rows.iter().take(take).enumerate() {
        println!(
            "{:>4}  {:<24} {:>6} {:>6} {:>6} {:>6} {:>6.1}%",
            idx + 1,
            r.team,
            r.gold,
            r.silver,
            r.bronze,
            r.score,
            r.win_pct
        );
    }
}
