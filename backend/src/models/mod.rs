//! Domain models for the stint and arrivals pipeline.
//!
//! Input relations (one per CSV file):
//!
//! - [`Appearance`] - one row per player per game
//! - [`Game`] - game id and match date
//! - [`Club`] - club reference with its domestic competition
//! - [`Competition`] - competition reference with its country
//! - [`Transfer`] - raw transfer rows
//! - [`Player`] - player reference with date of birth
//!
//! Derived relations:
//!
//! - [`AppearanceWithDate`] - appearance joined to its game date
//! - [`SegmentedAppearance`] - dated appearance tagged with its stint
//! - [`PlayerClubStintStats`] - aggregate over one stint
//! - [`FinalPlayerStats`] - stint stats with club/competition context
//! - [`EnrichedTransfer`] - transfer with buyer/seller context and age

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::parser::fields;

pub type PlayerId = i64;
pub type ClubId = i64;
pub type GameId = i64;

// =============================================================================
// Table metadata
// =============================================================================

/// A relation loaded from one input CSV file.
pub trait InputTable: DeserializeOwned {
    /// Short table name used in diagnostics.
    const NAME: &'static str;
    /// File name inside the input directory.
    const FILE_NAME: &'static str;
    /// Columns that must be present in the header row.
    const REQUIRED_COLUMNS: &'static [&'static str];
    /// Groups of interchangeable column names; one of each group must be present.
    const ALTERNATIVE_COLUMNS: &'static [&'static [&'static str]] = &[];
}

// =============================================================================
// Input relations
// =============================================================================

/// One player's line in one game.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Appearance {
    #[serde(deserialize_with = "fields::id")]
    pub game_id: GameId,
    #[serde(deserialize_with = "fields::id")]
    pub player_id: PlayerId,
    #[serde(deserialize_with = "fields::id")]
    pub player_club_id: ClubId,
    #[serde(default, deserialize_with = "fields::text")]
    pub player_name: String,
    #[serde(default, deserialize_with = "fields::count")]
    pub goals: i64,
    #[serde(default, deserialize_with = "fields::count")]
    pub assists: i64,
    #[serde(default, deserialize_with = "fields::count")]
    pub minutes_played: i64,
    #[serde(default, deserialize_with = "fields::count")]
    pub yellow_cards: i64,
    #[serde(default, deserialize_with = "fields::count")]
    pub red_cards: i64,
}

impl InputTable for Appearance {
    const NAME: &'static str = "appearances";
    const FILE_NAME: &'static str = "appearances.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "game_id",
        "player_id",
        "player_club_id",
        "player_name",
        "goals",
        "assists",
        "minutes_played",
        "yellow_cards",
        "red_cards",
    ];
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Game {
    #[serde(deserialize_with = "fields::id")]
    pub game_id: GameId,
    /// Raw match date, parsed by the date normalizer.
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub date: Option<String>,
}

impl InputTable for Game {
    const NAME: &'static str = "games";
    const FILE_NAME: &'static str = "games.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["game_id", "date"];
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Club {
    #[serde(deserialize_with = "fields::id")]
    pub club_id: ClubId,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub domestic_competition_id: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub name: Option<String>,
}

impl InputTable for Club {
    const NAME: &'static str = "clubs";
    const FILE_NAME: &'static str = "clubs.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["club_id", "domestic_competition_id", "name"];
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Competition {
    #[serde(deserialize_with = "fields::text")]
    pub competition_id: String,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub country_name: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub name: Option<String>,
}

impl InputTable for Competition {
    const NAME: &'static str = "competitions";
    const FILE_NAME: &'static str = "competitions.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["competition_id", "country_name", "name"];
}

/// A raw transfer row.
///
/// Dumps in the wild name the season column either `season` or
/// `transfer_season`; both are accepted.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Transfer {
    #[serde(deserialize_with = "fields::id")]
    pub player_id: PlayerId,
    #[serde(default, deserialize_with = "fields::optional_id")]
    pub from_club_id: Option<ClubId>,
    #[serde(default, deserialize_with = "fields::optional_id")]
    pub to_club_id: Option<ClubId>,
    #[serde(default, alias = "transfer_season", deserialize_with = "fields::optional_text")]
    pub season: Option<String>,
    /// Raw fee text; may read "End of loan", "free transfer", "€12.5m", ...
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub transfer_fee: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_number")]
    pub market_value_in_eur: Option<f64>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub transfer_date: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_number")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub from_club_name: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub to_club_name: Option<String>,
}

impl InputTable for Transfer {
    const NAME: &'static str = "transfers";
    const FILE_NAME: &'static str = "transfers.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "player_id",
        "from_club_id",
        "to_club_id",
        "transfer_fee",
        "market_value_in_eur",
    ];
    const ALTERNATIVE_COLUMNS: &'static [&'static [&'static str]] = &[&["season", "transfer_season"]];
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Player {
    #[serde(deserialize_with = "fields::id")]
    pub player_id: PlayerId,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub date_of_birth: Option<String>,
}

impl InputTable for Player {
    const NAME: &'static str = "players";
    const FILE_NAME: &'static str = "players.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["player_id", "date_of_birth"];
}

// =============================================================================
// Derived relations
// =============================================================================

/// Appearance joined to its game; `date` is `None` when the game is
/// unknown or its date does not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct AppearanceWithDate {
    pub appearance: Appearance,
    pub date: Option<NaiveDate>,
}

/// A dated appearance tagged with its stint within (player, club).
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedAppearance {
    pub appearance: Appearance,
    pub date: NaiveDate,
    /// Days since the previous appearance for the same player and club.
    pub days_since_last: Option<i64>,
    pub is_new_stint: bool,
    /// 1-based, monotonic per (player, club).
    pub stint_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerClubStintStats {
    pub player_id: PlayerId,
    pub player_club_id: ClubId,
    pub stint_id: u32,
    pub player_name: String,
    pub goals: i64,
    pub assists: i64,
    pub minutes_played: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub total_appearances: u64,
    pub first_app: NaiveDate,
    pub last_app: NaiveDate,
}

/// One row of `final_player_stats.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalPlayerStats {
    pub player_id: PlayerId,
    pub player_club_id: ClubId,
    pub stint_id: u32,
    pub player_name: String,
    pub goals: i64,
    pub assists: i64,
    pub minutes_played: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub total_appearances: u64,
    pub first_app: NaiveDate,
    pub last_app: NaiveDate,
    pub club_name: Option<String>,
    pub country_name: Option<String>,
    pub competition_name: Option<String>,
}

/// A transfer with both clubs, both leagues, and the player's age resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedTransfer {
    pub transfer: Transfer,
    pub fee_cleaned: f64,
    pub transfer_date: Option<NaiveDate>,
    pub buying_club_name: Option<String>,
    pub buying_competition_id: Option<String>,
    pub buying_league_name: Option<String>,
    pub buying_country: Option<String>,
    pub selling_club_name: Option<String>,
    pub origin_competition_id: Option<String>,
    pub origin_league_name: Option<String>,
    pub origin_country: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub age_at_transfer: Option<f64>,
}
