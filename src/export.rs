// Site upload CSV export.
//
// One row per lineup, one column per roster slot, cells formatted as
// "Player Name (id)" so the site importer can match on either.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::optimizer::{Lineup, OptimizerResult};
use crate::pool::PlayerPool;
use crate::roster::RosterTemplate;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create export file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write export CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("nothing to export: {0}")]
    NothingToExport(String),

    #[error("lineup {index} cannot be exported: {message}")]
    MalformedLineup { index: usize, message: String },
}

/// Write the upload CSV for an optimizer result to `path`.
///
/// Refuses results that produced no usable lineups, so an infeasible or
/// errored build never turns into an empty upload file.
pub fn export_upload_csv(
    result: &OptimizerResult,
    pool: &PlayerPool,
    template: &RosterTemplate,
    path: &Path,
) -> Result<(), ExportError> {
    if !result.is_usable() {
        return Err(ExportError::NothingToExport(format!(
            "optimizer result has status {:?}",
            result.status
        )));
    }

    let file = File::create(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_upload_csv(&result.lineups, pool, template, file)?;
    info!(
        "exported {} lineups to {}",
        result.lineups.len(),
        path.display()
    );
    Ok(())
}

// Writer-based so tests can target an in-memory buffer.
fn write_upload_csv<W: Write>(
    lineups: &[Lineup],
    pool: &PlayerPool,
    template: &RosterTemplate,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let header: Vec<&str> = template.slots.iter().map(|s| s.label.as_str()).collect();
    csv_writer.write_record(&header)?;

    for (index, lineup) in lineups.iter().enumerate() {
        if lineup.slots.len() != template.slots.len() {
            return Err(ExportError::MalformedLineup {
                index,
                message: format!(
                    "has {} slots, template has {}",
                    lineup.slots.len(),
                    template.slots.len()
                ),
            });
        }
        let mut row = Vec::with_capacity(lineup.slots.len());
        for filled in &lineup.slots {
            let player =
                pool.get(&filled.player_id)
                    .ok_or_else(|| ExportError::MalformedLineup {
                        index,
                        message: format!("references unknown player '{}'", filled.player_id),
                    })?;
            row.push(format!("{} ({})", player.name, player.id));
        }
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{FilledSlot, SolveStatus};
    use crate::pool::{Player, PlayerStatus};
    use crate::roster::{Site, Sport};

    fn player(id: &str, name: &str) -> Player {
        Player {
            id: id.into(),
            name: name.into(),
            team: "BUF".into(),
            opponent: None,
            positions: vec!["RB".into()],
            salary: 5000,
            projection: 10.0,
            ceiling: None,
            floor: None,
            ownership: None,
            volatility: None,
            weather_impact: None,
            stadium_factor: None,
            matchup_difficulty: None,
            status: PlayerStatus::Active,
        }
    }

    fn two_slot_template() -> RosterTemplate {
        RosterTemplate {
            sport: Sport::Nfl,
            site: Site::DraftKings,
            salary_cap: 50_000,
            slots: vec![
                crate::roster::RosterSlot {
                    label: "RB1".into(),
                    eligible: vec!["RB".into()],
                },
                crate::roster::RosterSlot {
                    label: "RB2".into(),
                    eligible: vec!["RB".into()],
                },
            ],
        }
    }

    fn lineup_of(ids: &[(&str, &str)]) -> Lineup {
        Lineup {
            slots: ids
                .iter()
                .map(|(slot, id)| FilledSlot {
                    slot: slot.to_string(),
                    player_id: id.to_string(),
                })
                .collect(),
            total_salary: 10_000,
            projected_points: 20.0,
            sim_ev: None,
            boom_bust_score: None,
            bust_risk: None,
            expected_roi: None,
        }
    }

    #[test]
    fn writes_header_and_name_id_cells() {
        let pool = PlayerPool::from_players(vec![
            player("p1", "James Cook"),
            player("p2", "Breece Hall"),
        ])
        .unwrap();
        let lineups = vec![lineup_of(&[("RB1", "p1"), ("RB2", "p2")])];

        let mut buf = Vec::new();
        write_upload_csv(&lineups, &pool, &two_slot_template(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("RB1,RB2"));
        assert_eq!(lines.next(), Some("James Cook (p1),Breece Hall (p2)"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn refuses_infeasible_result() {
        let pool = PlayerPool::from_players(vec![player("p1", "James Cook")]).unwrap();
        let result = OptimizerResult {
            status: SolveStatus::Infeasible,
            lineups: Vec::new(),
            message: Some("no feasible lineup".into()),
        };
        let err = export_upload_csv(
            &result,
            &pool,
            &two_slot_template(),
            Path::new("/tmp/should_not_exist.csv"),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::NothingToExport(_)));
    }

    #[test]
    fn unknown_player_in_lineup_fails() {
        let pool = PlayerPool::from_players(vec![player("p1", "James Cook")]).unwrap();
        let lineups = vec![lineup_of(&[("RB1", "p1"), ("RB2", "ghost")])];

        let mut buf = Vec::new();
        let err = write_upload_csv(&lineups, &pool, &two_slot_template(), &mut buf).unwrap_err();
        match err {
            ExportError::MalformedLineup { index, message } => {
                assert_eq!(index, 0);
                assert!(message.contains("ghost"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn slot_count_mismatch_fails() {
        let pool = PlayerPool::from_players(vec![player("p1", "James Cook")]).unwrap();
        let lineups = vec![lineup_of(&[("RB1", "p1")])];

        let mut buf = Vec::new();
        let err = write_upload_csv(&lineups, &pool, &two_slot_template(), &mut buf).unwrap_err();
        assert!(matches!(err, ExportError::MalformedLineup { .. }));
    }
}
