//! Club and competition lookups shared by the stats and transfer paths.
//!
//! Both joins are left joins: a missing club or competition leaves the
//! context fields empty and the row is kept.

use std::collections::HashMap;

use crate::models::{Club, ClubId, Competition, FinalPlayerStats, PlayerClubStintStats};

/// Context resolved for one club id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClubContext {
    pub club_name: Option<String>,
    pub competition_id: Option<String>,
    pub competition_name: Option<String>,
    pub country_name: Option<String>,
}

/// Key-indexed view over the club and competition reference tables.
///
/// Duplicate keys keep the first row seen.
pub struct ReferenceIndex<'a> {
    clubs: HashMap<ClubId, &'a Club>,
    competitions: HashMap<&'a str, &'a Competition>,
}

impl<'a> ReferenceIndex<'a> {
    pub fn new(clubs: &'a [Club], competitions: &'a [Competition]) -> Self {
        let mut club_index = HashMap::with_capacity(clubs.len());
        for club in clubs {
            club_index.entry(club.club_id).or_insert(club);
        }

        let mut competition_index = HashMap::with_capacity(competitions.len());
        for competition in competitions {
            competition_index
                .entry(competition.competition_id.as_str())
                .or_insert(competition);
        }

        Self {
            clubs: club_index,
            competitions: competition_index,
        }
    }

    pub fn club(&self, club_id: ClubId) -> Option<&'a Club> {
        self.clubs.get(&club_id).copied()
    }

    pub fn competition(&self, competition_id: &str) -> Option<&'a Competition> {
        self.competitions.get(competition_id).copied()
    }

    /// Club → domestic competition → country, each step optional.
    pub fn club_context(&self, club_id: Option<ClubId>) -> ClubContext {
        let Some(club) = club_id.and_then(|id| self.club(id)) else {
            return ClubContext::default();
        };

        let competition = club
            .domestic_competition_id
            .as_deref()
            .and_then(|id| self.competition(id));

        ClubContext {
            club_name: club.name.clone(),
            competition_id: club.domestic_competition_id.clone(),
            competition_name: competition.and_then(|c| c.name.clone()),
            country_name: competition.and_then(|c| c.country_name.clone()),
        }
    }
}

/// Attach club name, competition name and country to every stint row.
///
/// The join keys themselves (`club_id`, `domestic_competition_id`,
/// `competition_id`) are not carried into the output.
pub fn enrich_player_stats(
    stats: Vec<PlayerClubStintStats>,
    index: &ReferenceIndex<'_>,
) -> Vec<FinalPlayerStats> {
    stats
        .into_iter()
        .map(|s| {
            let ctx = index.club_context(Some(s.player_club_id));
            FinalPlayerStats {
                player_id: s.player_id,
                player_club_id: s.player_club_id,
                stint_id: s.stint_id,
                player_name: s.player_name,
                goals: s.goals,
                assists: s.assists,
                minutes_played: s.minutes_played,
                yellow_cards: s.yellow_cards,
                red_cards: s.red_cards,
                total_appearances: s.total_appearances,
                first_app: s.first_app,
                last_app: s.last_app,
                club_name: ctx.club_name,
                country_name: ctx.country_name,
                competition_name: ctx.competition_name,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clubs() -> Vec<Club> {
        vec![
            Club { club_id: 11, domestic_competition_id: Some("GB1".into()), name: Some("Arsenal".into()) },
            Club { club_id: 12, domestic_competition_id: Some("XX9".into()), name: Some("Nowhere FC".into()) },
            Club { club_id: 11, domestic_competition_id: Some("ES1".into()), name: Some("Duplicate".into()) },
        ]
    }

    fn competitions() -> Vec<Competition> {
        vec![Competition {
            competition_id: "GB1".into(),
            country_name: Some("England".into()),
            name: Some("Premier League".into()),
        }]
    }

    fn stats(club_id: i64) -> PlayerClubStintStats {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        PlayerClubStintStats {
            player_id: 1,
            player_club_id: club_id,
            stint_id: 1,
            player_name: "Ann".into(),
            goals: 3,
            assists: 0,
            minutes_played: 270,
            yellow_cards: 0,
            red_cards: 0,
            total_appearances: 3,
            first_app: d,
            last_app: d,
        }
    }

    #[test]
    fn test_full_context() {
        let (c, k) = (clubs(), competitions());
        let index = ReferenceIndex::new(&c, &k);
        let ctx = index.club_context(Some(11));

        assert_eq!(ctx.club_name.as_deref(), Some("Arsenal"));
        assert_eq!(ctx.competition_id.as_deref(), Some("GB1"));
        assert_eq!(ctx.competition_name.as_deref(), Some("Premier League"));
        assert_eq!(ctx.country_name.as_deref(), Some("England"));
    }

    #[test]
    fn test_missing_references_keep_row() {
        let (c, k) = (clubs(), competitions());
        let index = ReferenceIndex::new(&c, &k);
        let out = enrich_player_stats(vec![stats(11), stats(12), stats(99)], &index);

        assert_eq!(out.len(), 3);
        assert_eq!(out[1].club_name.as_deref(), Some("Nowhere FC"));
        assert_eq!(out[1].competition_name, None);
        assert_eq!(out[1].country_name, None);
        assert_eq!(out[2].club_name, None);
        assert_eq!(out[2].goals, 3);
    }

    #[test]
    fn test_no_club_id() {
        let (c, k) = (clubs(), competitions());
        let index = ReferenceIndex::new(&c, &k);
        assert_eq!(index.club_context(None), ClubContext::default());
    }
}
