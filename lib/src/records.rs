//! Typed inputs to the summarizers.
//!
//! Every record type knows how to lay a slice of itself out as a DataFrame
//! with a fixed schema, so column presence is settled here and not at the
//! point where the frames are joined.

use crate::{error::Error, Result};
use polars::prelude::*;
use serde::Deserialize;

/// A classic league as reported by the standings endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct League {
    pub id: i64,
    pub name: String,
}

/// One team's current-season standing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamRecord {
    pub entry: i64,
    pub entry_name: String,
    pub total: i64,
    /// Position in the league standings
    pub rank: i64,
    pub favourite_team: Option<i64>,
}

impl TeamRecord {
    pub fn to_df(records: &[TeamRecord]) -> Result<DataFrame> {
        let df = df!(
            "entry" => records.iter().map(|r| r.entry).collect::<Vec<_>>(),
            "entry_name" => records.iter().map(|r| r.entry_name.clone()).collect::<Vec<_>>(),
            "total" => records.iter().map(|r| r.total).collect::<Vec<_>>(),
            "rank" => records.iter().map(|r| r.rank).collect::<Vec<_>>(),
            "favourite_team" => records.iter().map(|r| r.favourite_team).collect::<Vec<_>>(),
        )?;
        Ok(df)
    }
}

/// Manager identity and metadata for one entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManagerRecord {
    pub entry: i64,
    pub player_name: String,
    pub player_region_iso_code_long: Option<String>,
    /// Overall FPL rank across all players
    pub summary_overall_rank: Option<i64>,
}

impl ManagerRecord {
    pub fn to_df(records: &[ManagerRecord]) -> Result<DataFrame> {
        let df = df!(
            "entry" => records.iter().map(|r| r.entry).collect::<Vec<_>>(),
            "player_name" => records.iter().map(|r| r.player_name.clone()).collect::<Vec<_>>(),
            "player_region_iso_code_long" => records
                .iter()
                .map(|r| r.player_region_iso_code_long.clone())
                .collect::<Vec<_>>(),
            "summary_overall_rank" => records
                .iter()
                .map(|r| r.summary_overall_rank)
                .collect::<Vec<_>>(),
        )?;
        Ok(df)
    }
}

/// Premier League club id and display name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamReference {
    pub id: i64,
    pub name: String,
}

impl TeamReference {
    pub fn to_df(records: &[TeamReference]) -> Result<DataFrame> {
        let df = df!(
            "id" => records.iter().map(|r| r.id).collect::<Vec<_>>(),
            "name" => records.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
        )?;
        Ok(df)
    }
}

/// One team's archived result for a past season
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeasonHistoryRecord {
    pub entry: i64,
    pub team_name: String,
    pub manager_name: String,
    /// Start year of the season, e.g. 2021 for "2021/22"
    pub season_name: i64,
    pub total_points: i64,
    /// Overall FPL rank at the end of the season, smaller is better
    pub rank: i64,
}

impl SeasonHistoryRecord {
    pub fn to_df(records: &[SeasonHistoryRecord]) -> Result<DataFrame> {
        let df = df!(
            "entry" => records.iter().map(|r| r.entry).collect::<Vec<_>>(),
            "team_name" => records.iter().map(|r| r.team_name.clone()).collect::<Vec<_>>(),
            "manager_name" => records.iter().map(|r| r.manager_name.clone()).collect::<Vec<_>>(),
            "season_name" => records.iter().map(|r| r.season_name).collect::<Vec<_>>(),
            "total_points" => records.iter().map(|r| r.total_points).collect::<Vec<_>>(),
            "rank" => records.iter().map(|r| r.rank).collect::<Vec<_>>(),
        )?;
        Ok(df)
    }
}

/// Fails when the same key appears twice, which would fan a one-to-one join out
pub(crate) fn ensure_unique<I>(keys: I, what: &str) -> Result<()>
where
    I: IntoIterator<Item = i64>,
{
    let mut seen = std::collections::HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(Error::MalformedInput(format!("duplicate {} {}", what, key)));
        }
    }
    Ok(())
}

pub(crate) fn required<T>(value: Option<T>, column: &str) -> Result<T> {
    value.ok_or_else(|| Error::MalformedInput(format!("null value in column {}", column)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_record_schema() {
        let teams = vec![TeamRecord {
            entry: 7,
            entry_name: "Slow Starters".to_string(),
            total: 1200,
            rank: 3,
            favourite_team: None,
        }];
        let df = TeamRecord::to_df(&teams).unwrap();
        assert_eq!(
            df.get_column_names(),
            &["entry", "entry_name", "total", "rank", "favourite_team"]
        );
        assert_eq!(df.column("favourite_team").unwrap().null_count(), 1);
    }

    #[test]
    fn test_empty_records_keep_schema() {
        let df = SeasonHistoryRecord::to_df(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 6);
        assert_eq!(df.column("rank").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_ensure_unique() {
        assert!(ensure_unique([1, 2, 3], "entry").is_ok());
        let err = ensure_unique([1, 2, 1], "entry").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(msg) if msg == "duplicate entry 1"));
    }

    #[test]
    fn test_deserialize_manager_ignores_extra_fields() {
        let json = r#"{"entry": 4, "player_name": "Ana", "player_region_iso_code_long": null,
                       "summary_overall_rank": 1234, "joined_time": "2019-08-01"}"#;
        let manager: ManagerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(manager.entry, 4);
        assert_eq!(manager.player_region_iso_code_long, None);
        assert_eq!(manager.summary_overall_rank, Some(1234));
    }
}
