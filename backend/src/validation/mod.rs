//! Header validation for input tables.
//!
//! Every stage names the columns it reads through [`InputTable`]. A table
//! missing one of them cannot be processed, so the check runs on the header
//! row before any record is decoded.
//!
//! # Example
//!
//! ```rust,ignore
//! use tpp::validation::validate_columns;
//!
//! let headers = vec!["game_id".to_string(), "date".to_string()];
//! assert!(validate_columns(&headers, &["game_id", "date"], &[]).is_ok());
//!
//! let missing = validate_columns(&headers, &["game_id", "home_club_id"], &[]).unwrap_err();
//! assert_eq!(missing, vec!["home_club_id"]);
//! ```

use crate::models::InputTable;

/// Check a header row against required columns and alternative groups.
///
/// # Returns
/// * `Ok(())` if every required column and one member of each group is present
/// * `Err(Vec<String>)` with the missing names otherwise; an unmatched
///   group is reported as `a|b`
pub fn validate_columns(
    headers: &[String],
    required: &[&str],
    alternatives: &[&[&str]],
) -> Result<(), Vec<String>> {
    let has = |name: &str| headers.iter().any(|h| h == name);

    let mut missing: Vec<String> = required
        .iter()
        .filter(|col| !has(col))
        .map(|col| col.to_string())
        .collect();

    for group in alternatives {
        if !group.iter().any(|col| has(col)) {
            missing.push(group.join("|"));
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

/// Validate a header row against a table's declared columns.
pub fn validate_table_headers<T: InputTable>(headers: &[String]) -> Result<(), Vec<String>> {
    validate_columns(headers, T::REQUIRED_COLUMNS, T::ALTERNATIVE_COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Game, Transfer};

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_present() {
        let h = headers(&["game_id", "date", "home_club_id"]);
        assert!(validate_table_headers::<Game>(&h).is_ok());
    }

    #[test]
    fn test_missing_reported_in_order() {
        let h = headers(&["player_id"]);
        let missing = validate_columns(&h, &["player_id", "goals", "assists"], &[]).unwrap_err();
        assert_eq!(missing, vec!["goals", "assists"]);
    }

    #[test]
    fn test_alternative_group() {
        let base = ["player_id", "from_club_id", "to_club_id", "transfer_fee", "market_value_in_eur"];

        let mut with_alias = base.to_vec();
        with_alias.push("transfer_season");
        assert!(validate_table_headers::<Transfer>(&headers(&with_alias)).is_ok());

        let missing = validate_table_headers::<Transfer>(&headers(&base)).unwrap_err();
        assert_eq!(missing, vec!["season|transfer_season"]);
    }
}
