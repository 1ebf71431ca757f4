//! Date parsing and the appearance → game date join.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

use crate::models::{Appearance, AppearanceWithDate, Game, GameId};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a date cell. Timestamps keep their date part; anything else is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

pub fn parse_optional_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(parse_date)
}

/// First day of a season: July 1 of its starting year.
///
/// Accepts `"2019"`, `"2019/2020"`, `"2019-20"` and the short `"19/20"` form
/// (`YY` ≥ 50 is read as 19YY).
pub fn season_start_date(season: &str) -> Option<NaiveDate> {
    let start = season.trim().split(['/', '-']).next()?.trim();
    if start.is_empty() || !start.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let year: i32 = match start.len() {
        4 => start.parse().ok()?,
        2 => {
            let yy: i32 = start.parse().ok()?;
            if yy >= 50 { 1900 + yy } else { 2000 + yy }
        }
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, 7, 1)
}

/// Left join appearances to games on `game_id` and parse the match date.
///
/// Output has exactly one row per input appearance, in input order. An
/// appearance whose game is unknown, or whose date does not parse, gets
/// `date: None`.
pub fn attach_game_dates(appearances: Vec<Appearance>, games: &[Game]) -> Vec<AppearanceWithDate> {
    let mut dates: HashMap<GameId, Option<NaiveDate>> = HashMap::with_capacity(games.len());
    for game in games {
        dates
            .entry(game.game_id)
            .or_insert_with(|| parse_optional_date(game.date.as_deref()));
    }

    appearances
        .into_iter()
        .map(|appearance| {
            let date = dates.get(&appearance.game_id).copied().flatten();
            AppearanceWithDate { appearance, date }
        })
        .collect()
}
