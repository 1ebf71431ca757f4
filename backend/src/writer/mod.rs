//! Serialize the two result tables.
//!
//! Both tables are rendered in memory first, then written to temporary
//! files next to their destinations and renamed into place. A failure
//! before the renames leaves no output behind. The two renames are
//! best-effort as a pair: if the second one fails, the stats file is
//! already replaced and the arrivals file keeps its previous content.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{WriteError, WriteResult};
use crate::models::{EnrichedTransfer, FinalPlayerStats};

pub const PLAYER_STATS_FILE: &str = "final_player_stats.csv";
pub const EPL_ARRIVALS_FILE: &str = "epl_arrivals_with_country.csv";

/// Header of `final_player_stats.csv`, in [`FinalPlayerStats`] field order.
pub const PLAYER_STATS_COLUMNS: &[&str] = &[
    "player_id",
    "player_club_id",
    "stint_id",
    "player_name",
    "goals",
    "assists",
    "minutes_played",
    "yellow_cards",
    "red_cards",
    "total_appearances",
    "first_app",
    "last_app",
    "club_name",
    "country_name",
    "competition_name",
];

/// Preferred arrival columns. The second element names the input column a
/// field is copied from when that column is optional in `transfers.csv`.
pub const ARRIVAL_COLUMNS: &[(&str, Option<&str>)] = &[
    ("player_id", None),
    ("player_name", Some("player_name")),
    ("transfer_date", None),
    ("season", None),
    ("from_club_id", None),
    ("selling_club_name", None),
    ("origin_competition_id", None),
    ("origin_league_name", None),
    ("origin_country", None),
    ("to_club_id", None),
    ("buying_club_name", None),
    ("buying_competition_id", None),
    ("buying_league_name", None),
    ("buying_country", None),
    ("transfer_fee", None),
    ("fee_cleaned", None),
    ("market_value_in_eur", None),
    ("date_of_birth", None),
    ("age_at_transfer", None),
];

/// Paths of the written tables.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub player_stats: PathBuf,
    pub epl_arrivals: PathBuf,
}

/// Arrival columns to emit given the headers of `transfers.csv`.
pub fn select_arrival_columns(transfer_headers: &[String]) -> Vec<&'static str> {
    ARRIVAL_COLUMNS
        .iter()
        .filter(|(_, source)| match source {
            Some(col) => transfer_headers.iter().any(|h| h == col),
            None => true,
        })
        .map(|(name, _)| *name)
        .collect()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn day(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn id(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render one arrival cell.
pub fn arrival_field(t: &EnrichedTransfer, column: &str) -> String {
    match column {
        "player_id" => t.transfer.player_id.to_string(),
        "player_name" => text(&t.transfer.player_name),
        "transfer_date" => day(t.transfer_date),
        "season" => text(&t.transfer.season),
        "from_club_id" => id(t.transfer.from_club_id),
        "selling_club_name" => text(&t.selling_club_name),
        "origin_competition_id" => text(&t.origin_competition_id),
        "origin_league_name" => text(&t.origin_league_name),
        "origin_country" => text(&t.origin_country),
        "to_club_id" => id(t.transfer.to_club_id),
        "buying_club_name" => text(&t.buying_club_name),
        "buying_competition_id" => text(&t.buying_competition_id),
        "buying_league_name" => text(&t.buying_league_name),
        "buying_country" => text(&t.buying_country),
        "transfer_fee" => text(&t.transfer.transfer_fee),
        "fee_cleaned" => t.fee_cleaned.to_string(),
        "market_value_in_eur" => number(t.transfer.market_value_in_eur),
        "date_of_birth" => day(t.date_of_birth),
        "age_at_transfer" => number(t.age_at_transfer),
        _ => String::new(),
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> WriteResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| WriteError::Buffer(e.error().to_string()))
}

/// Render `final_player_stats.csv`. The header is written even when empty.
pub fn player_stats_csv(rows: &[FinalPlayerStats]) -> WriteResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(PLAYER_STATS_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    finish(writer)
}

/// Render `epl_arrivals_with_country.csv` with the given projection.
pub fn arrivals_csv(rows: &[EnrichedTransfer], columns: &[&str]) -> WriteResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| arrival_field(row, c)))?;
    }
    finish(writer)
}

/// Write both tables into `dir`, creating it if needed.
pub fn write_outputs(
    dir: &Path,
    player_stats: &[FinalPlayerStats],
    arrivals: &[EnrichedTransfer],
    arrival_columns: &[&str],
) -> WriteResult<OutputPaths> {
    let stats_bytes = player_stats_csv(player_stats)?;
    let arrivals_bytes = arrivals_csv(arrivals, arrival_columns)?;

    fs::create_dir_all(dir)?;

    let paths = OutputPaths {
        player_stats: dir.join(PLAYER_STATS_FILE),
        epl_arrivals: dir.join(EPL_ARRIVALS_FILE),
    };
    let stats_tmp = dir.join(format!(".{}.tmp", PLAYER_STATS_FILE));
    let arrivals_tmp = dir.join(format!(".{}.tmp", EPL_ARRIVALS_FILE));

    let staged = fs::write(&stats_tmp, &stats_bytes).and_then(|_| fs::write(&arrivals_tmp, &arrivals_bytes));
    if let Err(e) = staged {
        let _ = fs::remove_file(&stats_tmp);
        let _ = fs::remove_file(&arrivals_tmp);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&stats_tmp, &paths.player_stats) {
        let _ = fs::remove_file(&stats_tmp);
        let _ = fs::remove_file(&arrivals_tmp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&arrivals_tmp, &paths.epl_arrivals) {
        let _ = fs::remove_file(&arrivals_tmp);
        return Err(e.into());
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transfer;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stats_row() -> FinalPlayerStats {
        FinalPlayerStats {
            player_id: 7,
            player_club_id: 3,
            stint_id: 2,
            player_name: "Ann, Jr.".into(),
            goals: 2,
            assists: 1,
            minutes_played: 180,
            yellow_cards: 0,
            red_cards: 0,
            total_appearances: 2,
            first_app: date(2021, 3, 1),
            last_app: date(2021, 3, 8),
            club_name: Some("Arsenal".into()),
            country_name: None,
            competition_name: None,
        }
    }

    #[test]
    fn test_player_stats_layout() {
        let bytes = player_stats_csv(&[stats_row()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), PLAYER_STATS_COLUMNS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "7,3,2,\"Ann, Jr.\",2,1,180,0,0,2,2021-03-01,2021-03-08,Arsenal,,"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_tables_keep_header() {
        let text = String::from_utf8(player_stats_csv(&[]).unwrap()).unwrap();
        assert_eq!(text.trim_end(), PLAYER_STATS_COLUMNS.join(","));

        let text = String::from_utf8(arrivals_csv(&[], &["player_id", "fee_cleaned"]).unwrap()).unwrap();
        assert_eq!(text.trim_end(), "player_id,fee_cleaned");
    }

    #[test]
    fn test_optional_columns_follow_input() {
        let without = select_arrival_columns(&["player_id".to_string()]);
        assert!(!without.contains(&"player_name"));
        assert_eq!(without.len(), ARRIVAL_COLUMNS.len() - 1);

        let with = select_arrival_columns(&["player_id".to_string(), "player_name".to_string()]);
        assert_eq!(with[1], "player_name");
        assert_eq!(with.len(), ARRIVAL_COLUMNS.len());
    }

    #[test]
    fn test_arrival_fields() {
        let row = EnrichedTransfer {
            transfer: Transfer {
                player_id: 5,
                to_club_id: Some(1),
                transfer_fee: Some("€12.5m".into()),
                ..Default::default()
            },
            fee_cleaned: 12_500_000.0,
            transfer_date: Some(date(2019, 7, 1)),
            age_at_transfer: Some(19.5),
            ..Default::default()
        };

        assert_eq!(arrival_field(&row, "player_id"), "5");
        assert_eq!(arrival_field(&row, "to_club_id"), "1");
        assert_eq!(arrival_field(&row, "from_club_id"), "");
        assert_eq!(arrival_field(&row, "fee_cleaned"), "12500000");
        assert_eq!(arrival_field(&row, "transfer_date"), "2019-07-01");
        assert_eq!(arrival_field(&row, "age_at_transfer"), "19.5");
        assert_eq!(arrival_field(&row, "date_of_birth"), "");
    }

    #[test]
    fn test_failed_arrivals_rename_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path();
        // A non-empty directory in the way makes the second rename fail
        let blocker = out_dir.join(EPL_ARRIVALS_FILE);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let err = write_outputs(out_dir, &[stats_row()], &[], &["player_id"]).unwrap_err();
        assert!(matches!(err, WriteError::Io(_)));

        assert!(out_dir.join(PLAYER_STATS_FILE).is_file());
        assert!(!out_dir.join(format!(".{}.tmp", EPL_ARRIVALS_FILE)).exists());
        assert!(!out_dir.join(format!(".{}.tmp", PLAYER_STATS_FILE)).exists());
    }

    #[test]
    fn test_write_outputs_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tmp.path().join("nested").join("out");
        let paths = write_outputs(&out_dir, &[stats_row()], &[], &["player_id"]).unwrap();

        assert!(paths.player_stats.is_file());
        assert!(paths.epl_arrivals.is_file());
        let leftovers: Vec<_> = fs::read_dir(&out_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
