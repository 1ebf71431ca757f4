//! Split each player's appearances at a club into stints.
//!
//! ```text
//! player 7 @ club 3        gap (days)   new stint?   stint_id
//! 2020-01-01                  -            yes          1
//! 2020-06-01                 152           no           1
//! 2021-03-01                 273           yes          2
//! ```
//!
//! A gap longer than the threshold means the player left and came back
//! (typically after a loan elsewhere); shorter gaps are injuries or the
//! off-season and stay inside the same spell.

use chrono::NaiveDate;

use crate::models::{Appearance, AppearanceWithDate, ClubId, PlayerId, SegmentedAppearance};

/// Gap, in days, above which the next appearance opens a new stint.
pub const DEFAULT_STINT_GAP_DAYS: i64 = 250;

/// Segmented rows plus the appearances that could not be placed.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Rows ordered by (player_id, player_club_id, date, game_id)
    pub rows: Vec<SegmentedAppearance>,
    /// Appearances dropped because they have no match date
    pub undated: usize,
}

impl Segmentation {
    /// Number of distinct (player, club, stint) groups.
    pub fn stint_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_new_stint).count()
    }
}

/// Running state of the scan within one (player, club) partition.
struct PartitionCursor {
    key: (PlayerId, ClubId),
    last_date: NaiveDate,
    stint_id: u32,
}

/// Assign a stint id to every dated appearance.
///
/// Rows are sorted by player, club and date, then scanned once. Within a
/// partition `days_since_last` is the distance to the previous row; the
/// first row of a partition, or any row more than `gap_days` after its
/// predecessor, starts a new stint. `stint_id` is the running count of
/// stint starts, so it begins at 1 and never decreases.
///
/// Appearances without a date are dropped and counted in
/// [`Segmentation::undated`].
pub fn segment_stints(rows: Vec<AppearanceWithDate>, gap_days: i64) -> Segmentation {
    let total = rows.len();
    let mut dated: Vec<(Appearance, NaiveDate)> = rows
        .into_iter()
        .filter_map(|r| r.date.map(|d| (r.appearance, d)))
        .collect();
    let undated = total - dated.len();

    dated.sort_by_key(|(a, date)| (a.player_id, a.player_club_id, *date, a.game_id));

    let mut cursor: Option<PartitionCursor> = None;
    let mut segmented = Vec::with_capacity(dated.len());

    for (appearance, date) in dated {
        let key = (appearance.player_id, appearance.player_club_id);

        let days_since_last = match &cursor {
            Some(c) if c.key == key => Some((date - c.last_date).num_days()),
            _ => None,
        };
        let is_new_stint = days_since_last.map_or(true, |days| days > gap_days);

        let stint_id = match &cursor {
            Some(c) if c.key == key => c.stint_id + u32::from(is_new_stint),
            _ => 1,
        };

        cursor = Some(PartitionCursor { key, last_date: date, stint_id });

        segmented.push(SegmentedAppearance {
            appearance,
            date,
            days_since_last,
            is_new_stint,
            stint_id,
        });
    }

    Segmentation { rows: segmented, undated }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(player_id: i64, club_id: i64, game_id: i64, date: Option<NaiveDate>) -> AppearanceWithDate {
        AppearanceWithDate {
            appearance: Appearance {
                game_id,
                player_id,
                player_club_id: club_id,
                player_name: format!("Player {player_id}"),
                goals: 0,
                assists: 0,
                minutes_played: 90,
                yellow_cards: 0,
                red_cards: 0,
            },
            date,
        }
    }

    fn stint_ids(seg: &Segmentation) -> Vec<u32> {
        seg.rows.iter().map(|r| r.stint_id).collect()
    }

    #[test]
    fn test_gap_over_threshold_splits() {
        let rows = vec![
            row(7, 3, 3, Some(date(2021, 3, 1))),
            row(7, 3, 1, Some(date(2020, 1, 1))),
            row(7, 3, 2, Some(date(2020, 6, 1))),
        ];
        let seg = segment_stints(rows, DEFAULT_STINT_GAP_DAYS);

        assert_eq!(stint_ids(&seg), vec![1, 1, 2]);
        assert_eq!(seg.rows[0].days_since_last, None);
        assert_eq!(seg.rows[1].days_since_last, Some(152));
        assert_eq!(seg.rows[2].days_since_last, Some(273));
        assert_eq!(seg.stint_count(), 2);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let start = date(2020, 1, 1);
        let rows = vec![
            row(1, 1, 1, Some(start)),
            row(1, 1, 2, Some(start + chrono::Duration::days(250))),
            row(1, 1, 3, Some(start + chrono::Duration::days(250 + 251))),
        ];
        let seg = segment_stints(rows, DEFAULT_STINT_GAP_DAYS);

        assert_eq!(stint_ids(&seg), vec![1, 1, 2]);
    }

    #[test]
    fn test_single_appearance_single_stint() {
        let seg = segment_stints(vec![row(4, 9, 1, Some(date(2019, 9, 1)))], DEFAULT_STINT_GAP_DAYS);
        assert_eq!(seg.rows.len(), 1);
        assert_eq!(seg.rows[0].stint_id, 1);
        assert!(seg.rows[0].is_new_stint);
    }

    #[test]
    fn test_partitions_are_independent() {
        // A loan spell at club 2 does not break the run at club 1.
        let rows = vec![
            row(1, 1, 1, Some(date(2020, 1, 1))),
            row(1, 2, 2, Some(date(2020, 2, 1))),
            row(1, 1, 3, Some(date(2020, 3, 1))),
            row(2, 1, 4, Some(date(2020, 3, 1))),
        ];
        let seg = segment_stints(rows, DEFAULT_STINT_GAP_DAYS);

        let keys: Vec<(i64, i64, u32)> = seg
            .rows
            .iter()
            .map(|r| (r.appearance.player_id, r.appearance.player_club_id, r.stint_id))
            .collect();
        assert_eq!(keys, vec![(1, 1, 1), (1, 1, 1), (1, 2, 1), (2, 1, 1)]);
    }

    #[test]
    fn test_undated_rows_dropped_and_counted() {
        let rows = vec![
            row(1, 1, 1, Some(date(2020, 1, 1))),
            row(1, 1, 2, None),
        ];
        let seg = segment_stints(rows, DEFAULT_STINT_GAP_DAYS);

        assert_eq!(seg.rows.len(), 1);
        assert_eq!(seg.undated, 1);
    }

    #[test]
    fn test_custom_threshold() {
        let rows = vec![
            row(1, 1, 1, Some(date(2020, 1, 1))),
            row(1, 1, 2, Some(date(2020, 1, 31))),
        ];
        assert_eq!(stint_ids(&segment_stints(rows.clone(), 29)), vec![1, 2]);
        assert_eq!(stint_ids(&segment_stints(rows, 30)), vec![1, 1]);
    }
}
