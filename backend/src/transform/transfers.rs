//! Transfer cleaning, club context, the Premier League filter and
//! age at transfer.
//!
//! # Stages
//!
//! 1. [`build_transfer_context`] drops end-of-loan rows, cleans the fee,
//!    resolves the transfer date and joins buyer and seller context
//! 2. [`filter_epl_arrivals`] keeps transfers into the Premier League
//! 3. [`attach_ages`] joins players and computes `age_at_transfer`
//! 4. [`sort_arrivals`] orders the result as an arrival timeline

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::dates::{parse_date, parse_optional_date, season_start_date};
use super::enrich::ReferenceIndex;
use crate::models::{EnrichedTransfer, Player, PlayerId, Transfer};
use crate::parser::fields::parse_number;

/// Transfermarkt code of the English Premier League.
pub const PREMIER_LEAGUE_ID: &str = "GB1";

const DAYS_PER_YEAR: f64 = 365.25;

/// Display fees: `€12.5m`, `£500k`, `1,200Th.`, `€1.2bn`. The whole cell must match.
static FEE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*[€£$]?\s*(\d[\d,]*(?:\.\d+)?)\s*(bn|mio\.?|m|th\.?|k)?\s*[€£$]?\s*$")
        .expect("fee pattern is a valid regex")
});

// =============================================================================
// Fee cleaning
// =============================================================================

/// Outcome of cleaning a raw fee cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CleanedFee {
    /// The row records a loan return, not a transfer.
    EndOfLoan,
    /// Non-negative amount; unparseable or free moves are 0.
    Amount(f64),
}

pub fn is_end_of_loan(raw: &str) -> bool {
    raw.to_lowercase().contains("end of loan")
}

/// Clean a raw fee cell.
///
/// # Example
/// ```ignore
/// assert_eq!(clean_fee(Some("12000000.0")), CleanedFee::Amount(12_000_000.0));
/// assert_eq!(clean_fee(Some("€12.5m")), CleanedFee::Amount(12_500_000.0));
/// assert_eq!(clean_fee(Some("free transfer")), CleanedFee::Amount(0.0));
/// assert_eq!(clean_fee(Some("End of loan Jun 30, 2020")), CleanedFee::EndOfLoan);
/// ```
pub fn clean_fee(raw: Option<&str>) -> CleanedFee {
    let Some(raw) = raw else {
        return CleanedFee::Amount(0.0);
    };
    if is_end_of_loan(raw) {
        return CleanedFee::EndOfLoan;
    }
    if let Some(value) = parse_number(raw) {
        return CleanedFee::Amount(value.max(0.0));
    }
    CleanedFee::Amount(parse_display_fee(raw).unwrap_or(0.0))
}

fn parse_display_fee(raw: &str) -> Option<f64> {
    let caps = FEE_PATTERN.captures(raw)?;
    let number = normalize_separators(caps.get(1)?.as_str());
    let base: f64 = number.parse().ok()?;

    let multiplier = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        Some(unit) if unit == "bn" => 1e9,
        Some(unit) if unit.starts_with('m') => 1e6,
        Some(unit) if unit.starts_with("th") || unit == "k" => 1e3,
        _ => 1.0,
    };

    Some(base * multiplier).filter(|v| v.is_finite())
}

/// `1,200,000` → `1200000`; `12,5` → `12.5`.
fn normalize_separators(number: &str) -> String {
    if number.contains('.') {
        return number.replace(',', "");
    }
    match number.rsplit_once(',') {
        Some((_, tail)) if tail.len() == 3 => number.replace(',', ""),
        Some(_) => number.replace(',', "."),
        None => number.to_string(),
    }
}

// =============================================================================
// Transfer date
// =============================================================================

/// Provided date when it parses, else July 1 of the season's start year.
pub fn resolve_transfer_date(transfer: &Transfer) -> Option<NaiveDate> {
    parse_optional_date(transfer.transfer_date.as_deref())
        .or_else(|| transfer.season.as_deref().and_then(season_start_date))
}

// =============================================================================
// Context builder
// =============================================================================

/// Enriched transfers plus the rows dropped as loan returns.
#[derive(Debug, Clone, Default)]
pub struct TransferContext {
    pub rows: Vec<EnrichedTransfer>,
    pub end_of_loan_excluded: usize,
    /// Rows whose date could be neither parsed nor derived from the season
    pub undated: usize,
}

/// Clean every transfer and join its buying and selling club context.
pub fn build_transfer_context(transfers: Vec<Transfer>, index: &ReferenceIndex<'_>) -> TransferContext {
    let mut context = TransferContext::default();

    for transfer in transfers {
        let fee_cleaned = match clean_fee(transfer.transfer_fee.as_deref()) {
            CleanedFee::EndOfLoan => {
                context.end_of_loan_excluded += 1;
                continue;
            }
            CleanedFee::Amount(v) => v,
        };

        let transfer_date = resolve_transfer_date(&transfer);
        if transfer_date.is_none() {
            context.undated += 1;
        }

        let buyer = index.club_context(transfer.to_club_id);
        let seller = index.club_context(transfer.from_club_id);

        context.rows.push(EnrichedTransfer {
            fee_cleaned,
            transfer_date,
            buying_club_name: buyer.club_name.or_else(|| transfer.to_club_name.clone()),
            buying_competition_id: buyer.competition_id,
            buying_league_name: buyer.competition_name,
            buying_country: buyer.country_name,
            selling_club_name: seller.club_name.or_else(|| transfer.from_club_name.clone()),
            origin_competition_id: seller.competition_id,
            origin_league_name: seller.competition_name,
            origin_country: seller.country_name,
            date_of_birth: None,
            age_at_transfer: None,
            transfer,
        });
    }

    context
}

// =============================================================================
// EPL filter
// =============================================================================

/// Buying league is the Premier League by code, or by country and name.
///
/// Either test is enough; reference data that disagrees with itself still
/// qualifies.
pub fn is_epl_arrival(transfer: &EnrichedTransfer, epl_competition_id: &str) -> bool {
    let by_code = transfer
        .buying_competition_id
        .as_deref()
        .is_some_and(|id| id.eq_ignore_ascii_case(epl_competition_id));

    let by_name = transfer.buying_country.as_deref() == Some("England")
        && transfer
            .buying_league_name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains("premier league"));

    by_code || by_name
}

pub fn filter_epl_arrivals(rows: Vec<EnrichedTransfer>, epl_competition_id: &str) -> Vec<EnrichedTransfer> {
    rows.into_iter()
        .filter(|t| is_epl_arrival(t, epl_competition_id))
        .collect()
}

// =============================================================================
// Age at transfer
// =============================================================================

/// Age in years, rounded to one decimal.
pub fn age_in_years(date_of_birth: NaiveDate, at: NaiveDate) -> f64 {
    let years = (at - date_of_birth).num_days() as f64 / DAYS_PER_YEAR;
    (years * 10.0).round() / 10.0
}

/// Left join to players and compute `age_at_transfer`.
///
/// The computed age wins; the transfer's own `age` cell only fills rows
/// where birth date or transfer date is unknown.
pub fn attach_ages(rows: Vec<EnrichedTransfer>, players: &[Player]) -> Vec<EnrichedTransfer> {
    let mut births: HashMap<PlayerId, Option<NaiveDate>> = HashMap::with_capacity(players.len());
    for player in players {
        births
            .entry(player.player_id)
            .or_insert_with(|| player.date_of_birth.as_deref().and_then(parse_date));
    }

    rows.into_iter()
        .map(|mut row| {
            row.date_of_birth = births.get(&row.transfer.player_id).copied().flatten();
            let computed = match (row.date_of_birth, row.transfer_date) {
                (Some(dob), Some(at)) => Some(age_in_years(dob, at)),
                _ => None,
            };
            row.age_at_transfer = computed.or(row.transfer.age);
            row
        })
        .collect()
}

/// Arrival timeline: transfer date ascending, undated last, ties by player.
pub fn sort_arrivals(rows: &mut [EnrichedTransfer]) {
    rows.sort_by_key(|t| (t.transfer_date.is_none(), t.transfer_date, t.transfer.player_id));
}
