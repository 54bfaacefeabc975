use crate::{
    error::Error,
    records::{ensure_unique, required, League, ManagerRecord, TeamRecord, TeamReference},
    JoinPolicy, Result,
};
use derive_deref::Deref;
use itertools::izip;
use polars::prelude::*;

const ROW_NR: &str = "row_nr";

/// Joined column -> output column, in output order after `season_name`
const SEASON_CURRENT_COLUMNS: [(&str, &str); 8] = [
    ("total", "total_points"),
    ("summary_overall_rank", "rank"),
    ("entry", "team_id"),
    ("entry_name", "team_name"),
    ("player_name", "manager_name"),
    ("rank", "league_position"),
    ("player_region_iso_code_long", "nationality"),
    ("name", "favourite_team"),
];

/// One team's standing in the season in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonCurrentRow {
    pub season_name: i64,
    pub total_points: i64,
    pub rank: Option<i64>,
    pub team_id: i64,
    pub team_name: String,
    pub manager_name: Option<String>,
    pub league_position: i64,
    pub nationality: Option<String>,
    pub favourite_team: Option<String>,
}

#[derive(Clone, Debug, Deref)]
pub struct SeasonCurrentDf(DataFrame);

impl SeasonCurrentDf {
    pub fn new(df: DataFrame) -> Self {
        SeasonCurrentDf(df)
    }

    pub fn into_inner(self) -> DataFrame {
        self.0
    }

    fn empty() -> Result<Self> {
        let df = df!(
            "season_name" => Vec::<i64>::new(),
            "total_points" => Vec::<i64>::new(),
            "rank" => Vec::<i64>::new(),
            "team_id" => Vec::<i64>::new(),
            "team_name" => Vec::<String>::new(),
            "manager_name" => Vec::<String>::new(),
            "league_position" => Vec::<i64>::new(),
            "nationality" => Vec::<String>::new(),
            "favourite_team" => Vec::<String>::new(),
        )?;
        Ok(SeasonCurrentDf(df))
    }

    pub fn rows(&self) -> Result<Vec<SeasonCurrentRow>> {
        izip!(
            self.column("season_name")?.i64()?,
            self.column("total_points")?.i64()?,
            self.column("rank")?.i64()?,
            self.column("team_id")?.i64()?,
            self.column("team_name")?.str()?,
            self.column("manager_name")?.str()?,
            self.column("league_position")?.i64()?,
            self.column("nationality")?.str()?,
            self.column("favourite_team")?.str()?,
        )
        .map(
            |(
                season_name,
                total_points,
                rank,
                team_id,
                team_name,
                manager_name,
                league_position,
                nationality,
                favourite_team,
            )| {
                Ok(SeasonCurrentRow {
                    season_name: required(season_name, "season_name")?,
                    total_points: required(total_points, "total_points")?,
                    rank,
                    team_id: required(team_id, "team_id")?,
                    team_name: required(team_name, "team_name")?.to_string(),
                    manager_name: manager_name.map(String::from),
                    league_position: required(league_position, "league_position")?,
                    nationality: nationality.map(String::from),
                    favourite_team: favourite_team.map(String::from),
                })
            },
        )
        .collect()
    }
}

/// Joins the league standings with manager metadata and the club reference
/// table, producing one row per team stamped with `current_season_year`.
///
/// Rows come out in the order of `team_data`. Under [`JoinPolicy::Inner`]
/// teams without a manager record, or whose favourite club cannot be resolved,
/// are dropped without error.
pub fn summarise_season_current(
    league: &League,
    team_data: &[TeamRecord],
    manager_information: &[ManagerRecord],
    current_season_year: i64,
    team_ids: &[TeamReference],
    policy: JoinPolicy,
) -> Result<SeasonCurrentDf> {
    log::trace!("current::summarise_season_current");
    ensure_unique(manager_information.iter().map(|m| m.entry), "manager entry")?;
    ensure_unique(team_ids.iter().map(|t| t.id), "team id")?;

    let teams_df = TeamRecord::to_df(team_data)?.with_row_index(ROW_NR, None)?;
    let managers_df = ManagerRecord::to_df(manager_information)?;
    let clubs_df = TeamReference::to_df(team_ids)?;

    let join_type = match policy {
        JoinPolicy::Inner => JoinType::Inner,
        JoinPolicy::Left | JoinPolicy::Strict => JoinType::Left,
    };
    let join_args = JoinArgs::new(join_type).with_coalesce(JoinCoalesce::CoalesceColumns);

    let merged_df = teams_df.join(&managers_df, ["entry"], ["entry"], join_args.clone())?;
    log::debug!("{} teams joined to a manager", merged_df.height());
    if policy == JoinPolicy::Strict {
        ensure_matched(&merged_df, "player_name", "manager record")?;
    }

    let merged_df = merged_df.join(&clubs_df, ["favourite_team"], ["id"], join_args)?;
    log::debug!("{} teams joined to a favourite club", merged_df.height());
    if policy == JoinPolicy::Strict {
        ensure_matched(&merged_df, "name", "favourite team")?;
    }

    log::info!(
        "{}: {} of {} teams in season {}",
        league.name,
        merged_df.height(),
        team_data.len(),
        current_season_year
    );
    if merged_df.height() == 0 {
        return SeasonCurrentDf::empty();
    }

    let mut projection = vec![lit(current_season_year)
        .cast(DataType::Int64)
        .alias("season_name")];
    projection.extend(
        SEASON_CURRENT_COLUMNS
            .iter()
            .map(|&(source, output)| col(source).alias(output)),
    );

    let df = merged_df
        .lazy()
        .sort([ROW_NR], SortMultipleOptions::default())
        .select(projection)
        .collect()?;
    Ok(SeasonCurrentDf(df))
}

/// Errors with the entries whose `column` came back null from a left join
fn ensure_matched(df: &DataFrame, column: &str, missing: &'static str) -> Result<()> {
    let mask = df.column(column)?.is_null();
    let unmatched = df.column("entry")?.i64()?.filter(&mask)?;
    let entries: Vec<i64> = unmatched.into_iter().flatten().collect();
    if entries.is_empty() {
        Ok(())
    } else {
        Err(Error::UnmatchedJoin { missing, entries })
    }
}
