use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use gongzhu_bot::policy::PolicyKind;
use statrs::statistics::Statistics;

use super::Entrant;
use crate::config::ArenaConfig;

/// Running totals for one entrant, from its team's side of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct EntrantResults {
    pub deals: usize,
    pub wins: usize,
    pub total_margin: f64,
}

impl EntrantResults {
    pub fn record(&mut self, team_margin: f64) {
        self.deals += 1;
        if team_margin > 0.0 {
            self.wins += 1;
        }
        self.total_margin += team_margin;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntrantStanding {
    pub id: String,
    pub agent: String,
    pub kind: PolicyKind,
    pub rating: f64,
    pub deals: usize,
    pub wins: usize,
    pub mean_margin: f64,
}

/// Rating spread over every entrant of one policy kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindStanding {
    pub kind: PolicyKind,
    pub entrants: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Entrants sorted best rating first.
pub(super) fn standings(
    entrants: &[Entrant],
    ratings: &[f64],
    results: &[EntrantResults],
) -> Vec<EntrantStanding> {
    let mut rows: Vec<_> = entrants
        .iter()
        .zip(ratings)
        .zip(results)
        .map(|((entrant, &rating), results)| EntrantStanding {
            id: entrant.id.clone(),
            agent: entrant.agent.clone(),
            kind: entrant.kind,
            rating,
            deals: results.deals,
            wins: results.wins,
            mean_margin: if results.deals == 0 {
                0.0
            } else {
                results.total_margin / results.deals as f64
            },
        })
        .collect();
    rows.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.id.cmp(&b.id)));
    rows
}

pub(super) fn kind_standings(standings: &[EntrantStanding]) -> Vec<KindStanding> {
    PolicyKind::ALL
        .iter()
        .filter_map(|&kind| {
            let ratings: Vec<f64> = standings
                .iter()
                .filter(|row| row.kind == kind)
                .map(|row| row.rating)
                .collect();
            if ratings.is_empty() {
                return None;
            }
            Some(KindStanding {
                kind,
                entrants: ratings.len(),
                mean: ratings.iter().mean(),
                std_dev: ratings.iter().population_std_dev(),
                min: Statistics::min(ratings.iter()),
                max: Statistics::max(ratings.iter()),
            })
        })
        .collect()
}

pub(super) fn write_markdown(
    path: &Path,
    config: &ArenaConfig,
    deals_played: usize,
    kinds: &[KindStanding],
    standings: &[EntrantStanding],
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "# Arena `{}`", config.run_id)?;
    writeln!(out)?;
    writeln!(
        out,
        "{deals_played} deals, {} entrants, seed {}, declarations {}, K = {}",
        standings.len(),
        config
            .deals
            .seed
            .map_or_else(|| "0 (default)".to_string(), |seed| seed.to_string()),
        if config.deals.enable_declarations { "on" } else { "off" },
        config.rating.k_factor
    )?;
    writeln!(out)?;

    writeln!(out, "## Ratings by policy kind")?;
    writeln!(out)?;
    writeln!(out, "| Kind | Entrants | Mean | Std dev | Min | Max |")?;
    writeln!(out, "|------|---------:|-----:|--------:|----:|----:|")?;
    for row in kinds {
        writeln!(
            out,
            "| {} | {} | {:.1} | {:.1} | {:.1} | {:.1} |",
            row.kind, row.entrants, row.mean, row.std_dev, row.min, row.max
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Entrants")?;
    writeln!(out)?;
    writeln!(out, "| Entrant | Agent | Kind | Rating | Deals | Wins | Mean margin |")?;
    writeln!(out, "|---------|-------|------|-------:|------:|-----:|------------:|")?;
    for row in standings {
        writeln!(
            out,
            "| {} | {} | {} | {:.1} | {} | {} | {:+.1} |",
            row.id, row.agent, row.kind, row.rating, row.deals, row.wins, row.mean_margin
        )?;
    }

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrant(id: &str, kind: PolicyKind) -> Entrant {
        Entrant {
            id: id.to_string(),
            agent: id.to_string(),
            kind,
            blueprint: 0,
        }
    }

    #[test]
    fn results_count_wins_and_margin() {
        let mut results = EntrantResults::default();
        results.record(120.0);
        results.record(-40.0);
        results.record(0.0);
        assert_eq!(results.deals, 3);
        assert_eq!(results.wins, 1);
        assert_eq!(results.total_margin, 80.0);
    }

    #[test]
    fn kinds_aggregate_population_spread() {
        let entrants = [
            entrant("r1", PolicyKind::Random),
            entrant("r2", PolicyKind::Random),
            entrant("h1", PolicyKind::Heuristic),
        ];
        let ratings = [1490.0, 1510.0, 1560.0];
        let results = [EntrantResults::default(); 3];
        let rows = standings(&entrants, &ratings, &results);
        assert_eq!(rows[0].id, "h1");

        let kinds = kind_standings(&rows);
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds[0].kind, PolicyKind::Random);
        assert!((kinds[0].mean - 1500.0).abs() < 1e-9);
        assert!((kinds[0].std_dev - 10.0).abs() < 1e-9);
        assert_eq!(kinds[0].min, 1490.0);
        assert_eq!(kinds[1].std_dev, 0.0);
    }
}
