//! Group segmented appearances into per-stint statistics.
//!
//! ```text
//! Segmented rows                          →  Stint stats
//! ┌──────────────────────────────────┐       ┌──────────────────────────────┐
//! │ P7 C3 stint 1  2020-01-01  1 goal│       │ P7 C3 stint 1  2 apps 1 goal │
//! │ P7 C3 stint 1  2020-06-01  0 goal│  →    │ 2020-01-01 .. 2020-06-01     │
//! │ P7 C3 stint 2  2021-03-01  2 goal│       ├──────────────────────────────┤
//! └──────────────────────────────────┘       │ P7 C3 stint 2  1 app 2 goals │
//!                                            └──────────────────────────────┘
//! ```

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::{ClubId, GameId, PlayerClubStintStats, PlayerId, SegmentedAppearance};

type StintKey = (PlayerId, ClubId, u32);

/// Accumulates sums and the date range of one stint.
struct StintBuilder {
    goals: i64,
    assists: i64,
    minutes_played: i64,
    yellow_cards: i64,
    red_cards: i64,
    total_appearances: u64,
    first_app: NaiveDate,
    last_app: NaiveDate,
    /// Name on the latest appearance; ties broken by game id.
    player_name: String,
    name_rank: (NaiveDate, GameId),
}

impl StintBuilder {
    fn new(row: &SegmentedAppearance) -> Self {
        Self {
            goals: 0,
            assists: 0,
            minutes_played: 0,
            yellow_cards: 0,
            red_cards: 0,
            total_appearances: 0,
            first_app: row.date,
            last_app: row.date,
            player_name: row.appearance.player_name.clone(),
            name_rank: (row.date, row.appearance.game_id),
        }
    }

    fn add(&mut self, row: &SegmentedAppearance) {
        let app = &row.appearance;
        self.goals += app.goals;
        self.assists += app.assists;
        self.minutes_played += app.minutes_played;
        self.yellow_cards += app.yellow_cards;
        self.red_cards += app.red_cards;
        self.total_appearances += 1;
        self.first_app = self.first_app.min(row.date);
        self.last_app = self.last_app.max(row.date);

        let rank = (row.date, app.game_id);
        if !app.player_name.is_empty() && (self.player_name.is_empty() || rank > self.name_rank) {
            self.player_name = app.player_name.clone();
            self.name_rank = rank;
        }
    }

    fn build(self, (player_id, player_club_id, stint_id): StintKey) -> PlayerClubStintStats {
        PlayerClubStintStats {
            player_id,
            player_club_id,
            stint_id,
            player_name: self.player_name,
            goals: self.goals,
            assists: self.assists,
            minutes_played: self.minutes_played,
            yellow_cards: self.yellow_cards,
            red_cards: self.red_cards,
            total_appearances: self.total_appearances,
            first_app: self.first_app,
            last_app: self.last_app,
        }
    }
}

/// Aggregate segmented appearances into one row per (player, club, stint).
///
/// Sums, counts and min/max do not depend on row order. Output is ordered
/// by (player_id, player_club_id, stint_id).
pub fn aggregate_stints(rows: &[SegmentedAppearance]) -> Vec<PlayerClubStintStats> {
    let mut stints: BTreeMap<StintKey, StintBuilder> = BTreeMap::new();

    for row in rows {
        let key = (row.appearance.player_id, row.appearance.player_club_id, row.stint_id);
        stints
            .entry(key)
            .or_insert_with(|| StintBuilder::new(row))
            .add(row);
    }

    stints.into_iter().map(|(key, b)| b.build(key)).collect()
}
