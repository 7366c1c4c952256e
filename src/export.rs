use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::bulk::MedalTable;
use crate::confed::confed_label;
use crate::snapshot::LeaderboardRow;

pub struct ExportReport {
    pub medal_rows: usize,
    pub leaderboard_rows: usize,
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn medal_rows(table: &MedalTable) -> Vec<Vec<String>> {
    let mut rows = vec![headers(&[
        "Rank", "Team", "Gold", "Silver", "Bronze", "Score", "Win %",
    ])];
    for (idx, r) in table.rows.iter().enumerate() {
        rows.push(vec![
            (idx + 1).to_string(),
            r.team.clone(),
            r.gold.to_string(),
            r.silver.to_string(),
            r.bronze.to_string(),
            r.score.to_string(),
            format!("{:.1}", r.win_pct),
        ]);
    }
    rows
}

fn leaderboard_rows(board: &[LeaderboardRow]) -> Vec<Vec<String>> {
    let mut rows = vec![headers(&[
        "Rank", "Team", "Elo", "Matches", "Offense", "Defense", "Style", "Form", "Confed",
    ])];
    for r in board {
        rows.push(vec![
            r.rank.to_string(),
            r.team.clone(),
            format!("{:.0}", r.rating),
            r.matches_played.to_string(),
            format!("{:.2}", r.offense_index),
            format!("{:.2}", r.defense_index),
            r.style.label().to_string(),
            r.form.clone(),
            confed_label(r.confederation).to_string(),
        ]);
    }
    rows
}

/// Writes the medal table and the rating leaderboard to an `.xlsx` workbook.
pub fn export_workbook(
    path: &Path,
    medals: &MedalTable,
    board: &[LeaderboardRow],
) -> Result<ExportReport> {
    let medal_rows = medal_rows(medals);
    let board_rows = leaderboard_rows(board);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Medals")?;
        write_rows(sheet, &medal_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Leaderboard")?;
        write_rows(sheet, &board_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        medal_rows: medal_rows.len() - 1,
        leaderboard_rows: board_rows.len() - 1,
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
