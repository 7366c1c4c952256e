use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::elo::RatingTable;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Confederation {
    AFC,
    CAF,
    CONCACAF,
    CONMEBOL,
    UEFA,
    OFC,
}

impl Confederation {
    pub const ALL: [Confederation; 6] = [
        Confederation::AFC,
        Confederation::CAF,
        Confederation::CONCACAF,
        Confederation::CONMEBOL,
        Confederation::UEFA,
        Confederation::OFC,
    ];

    pub const RESIDUAL: Confederation = Confederation::OFC;
}

pub fn confed_label(confed: Confederation) -> &'static str {
    match confed {
        Confederation::AFC => "AFC",
        Confederation::CAF => "CAF",
        Confederation::CONCACAF => "CONCACAF",
        Confederation::CONMEBOL => "CONMEBOL",
        Confederation::UEFA => "UEFA",
        Confederation::OFC => "OFC",
    }
}

const UEFA_TEAMS: &[&str] = &[
    "albania", "andorra", "armenia", "austria", "azerbaijan", "belarus", "belgium",
    "bosnia and herzegovina", "bulgaria", "croatia", "cyprus", "czech republic", "denmark",
    "east germany", "england", "estonia", "faroe islands", "finland", "france", "georgia",
    "germany", "gibraltar", "greece", "hungary", "iceland", "ireland", "israel", "italy",
    "kazakhstan",
    "kosovo", "latvia", "liechtenstein", "lithuania", "luxembourg", "malta", "moldova",
    "montenegro", "netherlands", "north macedonia", "northern ireland", "norway", "poland",
    "portugal", "republic of ireland", "romania", "russia", "saarland", "san marino", "scotland",
    "serbia", "slovakia", "slovenia", "spain", "sweden", "switzerland", "turkey", "ukraine",
    "wales",
];

const CONMEBOL_TEAMS: &[&str] = &[
    "argentina", "bolivia", "brazil", "chile", "colombia", "ecuador", "paraguay", "peru", "uruguay",
    "venezuela",
];

const CONCACAF_TEAMS: &[&str] = &[
    "anguilla", "antigua and barbuda", "aruba", "bahamas", "barbados", "belize", "bermuda",
    "canada", "cayman islands", "costa rica", "cuba", "curacao", "dominica", "dominican republic",
    "el salvador", "grenada", "guatemala", "guyana", "haiti", "honduras", "jamaica", "mexico",
    "montserrat", "nicaragua", "panama", "puerto rico", "saint kitts and nevis", "saint lucia",
    "saint vincent and the grenadines", "suriname", "trinidad and tobago",
    "turks and caicos islands", "united states",
];

const CAF_TEAMS: &[&str] = &[
    "algeria", "angola", "benin", "botswana", "burkina faso", "burundi", "cameroon", "cape verde",
    "central african republic", "chad", "comoros", "congo", "dr congo", "djibouti", "egypt",
    "equatorial guinea", "eritrea", "eswatini", "ethiopia", "gabon", "gambia", "ghana", "guinea",
    "guinea-bissau", "ivory coast", "kenya", "lesotho", "liberia", "libya", "madagascar", "malawi",
    "mali", "mauritania", "mauritius", "morocco", "mozambique", "namibia", "niger", "nigeria",
    "rwanda", "são tomé and príncipe", "senegal", "seychelles", "sierra leone", "somalia",
    "south africa", "south sudan", "sudan", "tanzania", "togo", "tunisia", "uganda", "zambia",
    "zimbabwe",
];

const AFC_TEAMS: &[&str] = &[
    "afghanistan", "australia", "bahrain", "bangladesh", "bhutan", "brunei", "cambodia", "china pr",
    "guam", "hong kong", "india", "indonesia", "iran", "iraq", "japan", "jordan", "kuwait",
    "kyrgyzstan", "laos", "lebanon", "macau", "malaysia", "maldives", "mongolia", "myanmar",
    "nepal", "north korea", "oman", "pakistan", "palestine", "philippines", "qatar", "saudi arabia",
    "singapore", "south korea", "sri lanka", "syria", "taiwan", "tajikistan", "thailand",
    "east timor", "turkmenistan", "united arab emirates", "uzbekistan", "vietnam",
    "vietnam republic", "yemen", "yemen dpr",
];

const OFC_TEAMS: &[&str] = &[
    "american samoa", "cook islands", "fiji", "new caledonia", "new zealand", "papua new guinea",
    "samoa", "solomon islands", "tahiti", "tonga", "vanuatu",
];

static MEMBERSHIP: Lazy<HashMap<&'static str, Confederation>> = Lazy::new(|| {
    let lists = [
        (Confederation::UEFA, UEFA_TEAMS),
        (Confederation::CONMEBOL, CONMEBOL_TEAMS),
        (Confederation::CONCACAF, CONCACAF_TEAMS),
        (Confederation::CAF, CAF_TEAMS),
        (Confederation::AFC, AFC_TEAMS),
        (Confederation::OFC, OFC_TEAMS),
    ];
    let mut out = HashMap::new();
    for (confed, teams) in lists {
        for team in teams {
            out.insert(*team, confed);
        }
    }
    out
});

/// Confederation of a canonical team name; unknown teams fall into the residual one.
pub fn confederation_of(team: &str) -> Confederation {
    MEMBERSHIP
        .get(team)
        .copied()
        .unwrap_or(Confederation::RESIDUAL)
}

pub fn members(confed: Confederation) -> impl Iterator<Item = &'static str> {
    MEMBERSHIP
        .iter()
        .filter(move |(_, c)| **c == confed)
        .map(|(team, _)| *team)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfederationStrength {
    pub confederation: Confederation,
    pub rated_teams: usize,
    pub elite_avg: f64,
    pub depth_avg: f64,
    pub composite: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfederationTable {
    pub strengths: HashMap<Confederation, ConfederationStrength>,
}

impl ConfederationTable {
    pub fn multiplier(&self, confed: Confederation) -> f64 {
        self.strengths
            .get(&confed)
            .map(|s| s.multiplier)
            .unwrap_or(1.0)
    }

    pub fn multiplier_for_team(&self, team: &str) -> f64 {
        self.multiplier(confederation_of(team))
    }

    pub fn ranked(&self) -> Vec<&ConfederationStrength> {
        let mut out: Vec<&ConfederationStrength> = self.strengths.values().collect();
        out.sort_by(|a, b| {
            b.composite
                .total_cmp(&a.composite)
                .then_with(|| a.confederation.cmp(&b.confederation))
        });
        out
    }
}

pub fn check_membership() -> EngineResult<()> {
    for confed in Confederation::ALL {
        if members(confed).next().is_none() {
            return Err(EngineError::EmptyConfederation(confed));
        }
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Composite strength per region: `0.6 * mean(top 3) + 0.4 * mean(top half)`.
pub fn composite_strength(mut ratings: Vec<f64>) -> (f64, f64, f64) {
    ratings.sort_by(|a, b| b.total_cmp(a));
    let elite = &ratings[..ratings.len().min(3)];
    let depth = &ratings[..(ratings.len() / 2).max(1).min(ratings.len())];
    let elite_avg = mean(elite);
    let depth_avg = mean(depth);
    (elite_avg, depth_avg, 0.6 * elite_avg + 0.4 * depth_avg)
}

pub fn compute_multipliers(ratings: &RatingTable) -> EngineResult<ConfederationTable> {
    check_membership()?;

    let mut pools: HashMap<Confederation, Vec<f64>> = HashMap::new();
    for (name, team) in &ratings.teams {
        pools
            .entry(confederation_of(name))
            .or_default()
            .push(team.rating);
    }
    if pools.is_empty() {
        return Ok(ConfederationTable::default());
    }

    let mut strengths = HashMap::new();
    for (confed, pool) in pools {
        let rated_teams = pool.len();
        let (elite_avg, depth_avg, composite) = composite_strength(pool);
        strengths.insert(
            confed,
            ConfederationStrength {
                confederation: confed,
                rated_teams,
                elite_avg,
                depth_avg,
                composite,
                multiplier: 1.0,
            },
        );
    }

    let best = strengths
        .values()
        .map(|s| s.composite)
        .fold(f64::NEG_INFINITY, f64::max);
    if !(best.is_finite() && best > 0.0) {
        return Err(EngineError::InvalidComposite);
    }
    for s in strengths.values_mut() {
        s.multiplier = round3(s.composite / best);
    }

    let table = ConfederationTable { strengths };
    for s in table.ranked() {
        info!(
            confed = confed_label(s.confederation),
            teams = s.rated_teams,
            composite = s.composite,
            multiplier = s.multiplier,
            "confederation strength"
        );
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_uses_top_three_and_top_half() {
        let (elite, depth, composite) =
            composite_strength(vec![1000.0, 1800.0, 1600.0, 1400.0, 1200.0, 1100.0]);
        assert_eq!(elite, (1800.0 + 1600.0 + 1400.0) / 3.0);
        assert_eq!(depth, (1800.0 + 1600.0 + 1400.0) / 3.0);
        assert!((composite - 1600.0).abs() < 1e-9);

        let (elite, depth, _) = composite_strength(vec![1500.0]);
        assert_eq!(elite, 1500.0);
        assert_eq!(depth, 1500.0);
    }

    #[test]
    fn every_confederation_has_members() {
        assert!(check_membership().is_ok());
        assert_eq!(confederation_of("brazil"), Confederation::CONMEBOL);
        assert_eq!(confederation_of("atlantis"), Confederation::RESIDUAL);
    }
}
