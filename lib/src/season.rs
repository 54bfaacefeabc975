//! Season bookkeeping shared by the fetcher and the tables.

use crate::{error::Error, Result};
use chrono::{Datelike, NaiveDate};

/// First FPL season on record (2002/03)
pub const FIRST_SEASON: i64 = 2002;

pub const MAX_LEAGUE_ID: i64 = 999_999_999;

/// Start year of the FPL season containing `today`. Seasons roll over on
/// 1 August.
pub fn most_recent_august_start(today: NaiveDate) -> i64 {
    let year = i64::from(today.year());
    if today.month() >= 8 {
        year
    } else {
        year - 1
    }
}

pub fn validate_league_id(league_id: i64) -> Result<i64> {
    if (0..=MAX_LEAGUE_ID).contains(&league_id) {
        Ok(league_id)
    } else {
        Err(Error::InvalidLeagueId(league_id))
    }
}

pub fn validate_start_year(year: i64, latest: i64) -> Result<i64> {
    if (FIRST_SEASON..=latest).contains(&year) {
        Ok(year)
    } else {
        Err(Error::InvalidSeasonYear {
            year,
            first: FIRST_SEASON,
            latest,
        })
    }
}

/// Parses an archived season label such as "2021/22" into its start year
pub fn parse_season_name(season_name: &str) -> Result<i64> {
    let malformed = || Error::MalformedInput(format!("season name {:?}", season_name));

    let (start, end) = season_name.trim().split_once('/').ok_or_else(malformed)?;
    if start.len() != 4 || end.len() != 2 {
        return Err(malformed());
    }
    let start: i64 = start.parse().map_err(|_| malformed())?;
    let end: i64 = end.parse().map_err(|_| malformed())?;
    if (start + 1) % 100 != end {
        return Err(malformed());
    }
    Ok(start)
}

/// Formats a season start year the way FPL labels seasons, e.g. "2021/22"
pub fn season_label(start_year: i64) -> String {
    format!("{}/{:02}", start_year, (start_year + 1) % 100)
}

/// Drops a leading "The " so headers read "All-time Office League table"
pub fn remove_starting_the(text: &str) -> &str {
    text.strip_prefix("The ").unwrap_or(text)
}
