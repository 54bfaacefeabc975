//! League tables rendered from the two summarizer outputs.
//!
//! A season counts as completed when it is in the archived history, or when it
//! is the current season and its final gameweek has finished.

use crate::{
    current::SeasonCurrentDf,
    history::{HistoryFilter, SeasonHistoryDf},
    season::{remove_starting_the, season_label},
    Result,
};
use polars::prelude::*;

const INPUT_NR: &str = "input_nr";
const POSITION_NR: &str = "position_nr";

const FINISH_COLUMNS: [&str; 6] = [
    "season_name",
    "team_id",
    "team_name",
    "manager_name",
    "total_points",
    "league_position",
];

pub struct LeagueTables {
    pub kpis: LeagueKpis,
    pub champions: DataFrame,
    pub list_of_champions: DataFrame,
    pub all_time: DataFrame,
    pub season_overview: DataFrame,
    pub previous_seasons: DataFrame,
    pub current_season: DataFrame,
}

impl LeagueTables {
    pub fn build(
        current: &SeasonCurrentDf,
        history: &SeasonHistoryDf,
        season_start_year: i64,
        current_finished: bool,
    ) -> Result<Self> {
        let completed = completed_seasons(current, history, season_start_year, current_finished)?;
        log::debug!("{} completed season finishes", completed.height());

        let champions = titles_won(&completed)?;
        let kpis = LeagueKpis::new(current, &completed, &champions)?;
        Ok(Self {
            kpis,
            champions,
            list_of_champions: top_three(&completed)?,
            all_time: all_time_table(&completed)?,
            season_overview: season_overview(&completed)?,
            previous_seasons: previous_seasons(history, season_start_year)?,
            current_season: current_season_table(current)?,
        })
    }
}

/// Past finishes from `season_start_year` on, plus the current season once it
/// has finished
///
/// FPL standings give tied teams the same rank, so current-season positions are
/// re-numbered 1..=N by league rank, then standings order, to match history.
pub fn completed_seasons(
    current: &SeasonCurrentDf,
    history: &SeasonHistoryDf,
    season_start_year: i64,
    current_finished: bool,
) -> Result<DataFrame> {
    let past = history
        .clone()
        .into_inner()
        .lazy()
        .filter(HistoryFilter::new().from_season(season_start_year).build())
        .with_column(col("entry").alias("team_id"))
        .select([cols(FINISH_COLUMNS)]);

    let df = if current_finished {
        let present = current
            .clone()
            .into_inner()
            .lazy()
            .filter(col("season_name").gt_eq(lit(season_start_year)))
            .with_row_index(INPUT_NR, None)
            .sort(
                ["league_position", INPUT_NR],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .with_row_index(POSITION_NR, Some(1))
            .with_column(col(POSITION_NR).cast(DataType::Int64).alias("league_position"))
            .select([cols(FINISH_COLUMNS)]);
        concat([past, present], UnionArgs::default())?.collect()?
    } else {
        past.collect()?
    };
    Ok(df)
}

fn finishes(league_position: i64) -> Expr {
    col("league_position")
        .eq(lit(league_position))
        .cast(DataType::Int64)
        .sum()
}

fn podium(league_position: i64) -> Expr {
    col("manager_name")
        .filter(col("league_position").eq(lit(league_position)))
        .first()
}

/// One row per completed season with the top three managers
pub fn top_three(completed: &DataFrame) -> Result<DataFrame> {
    let df = completed
        .clone()
        .lazy()
        .group_by([col("season_name")])
        .agg([
            podium(1).alias("champion"),
            podium(2).alias("runner_up"),
            podium(3).alias("third"),
        ])
        .sort(["season_name"], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

/// Podium finishes per team, best record first; teams that never made the
/// podium are left out
pub fn titles_won(completed: &DataFrame) -> Result<DataFrame> {
    let df = completed
        .clone()
        .lazy()
        .group_by([col("team_id")])
        .agg([
            col("manager_name").last(),
            finishes(1).alias("titles"),
            finishes(2).alias("runner_ups"),
            finishes(3).alias("thirds"),
        ])
        .filter((col("titles") + col("runner_ups") + col("thirds")).gt(lit(0)))
        .sort(
            ["titles", "runner_ups", "thirds", "manager_name"],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, true, true, false])
                .with_maintain_order(true),
        )
        .select([cols(["manager_name", "titles", "runner_ups", "thirds"])])
        .collect()?;
    Ok(df)
}

/// Cumulative points across completed seasons, highest first
pub fn all_time_table(completed: &DataFrame) -> Result<DataFrame> {
    let df = completed
        .clone()
        .lazy()
        .group_by([col("team_id")])
        .agg([
            col("manager_name").last(),
            col("team_name").last(),
            col("season_name").count().cast(DataType::Int64).alias("seasons"),
            col("total_points").sum(),
            finishes(1).alias("titles"),
            col("league_position").min().alias("best_position"),
            col("league_position")
                .cast(DataType::Float64)
                .mean()
                .round(2)
                .alias("average_position"),
        ])
        .sort(
            ["total_points", "team_id"],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .with_row_index("position", Some(1))
        .with_column(col("position").cast(DataType::Int64))
        .select([cols([
            "position",
            "manager_name",
            "team_name",
            "seasons",
            "total_points",
            "titles",
            "best_position",
            "average_position",
        ])])
        .collect()?;
    log::debug!("{} teams in the all-time table", df.height());
    Ok(df)
}

/// Per-team record across completed seasons, alphabetical by manager
pub fn season_overview(completed: &DataFrame) -> Result<DataFrame> {
    let df = completed
        .clone()
        .lazy()
        .group_by([col("team_id")])
        .agg([
            col("manager_name").last(),
            col("team_name").last(),
            col("season_name").count().cast(DataType::Int64).alias("seasons"),
            col("total_points").sum(),
            col("total_points")
                .cast(DataType::Float64)
                .mean()
                .round(1)
                .alias("average_points"),
            col("league_position").min().alias("best_finish"),
            col("league_position").max().alias("worst_finish"),
            col("league_position")
                .lt_eq(lit(3))
                .cast(DataType::Int64)
                .sum()
                .alias("podiums"),
        ])
        .sort(
            ["manager_name", "team_id"],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .select([cols([
            "manager_name",
            "team_name",
            "seasons",
            "total_points",
            "average_points",
            "best_finish",
            "worst_finish",
            "podiums",
        ])])
        .collect()?;
    Ok(df)
}

pub fn previous_seasons(history: &SeasonHistoryDf, season_start_year: i64) -> Result<DataFrame> {
    let df = history
        .clone()
        .filter(HistoryFilter::new().from_season(season_start_year).build())?
        .into_inner()
        .lazy()
        .select([cols([
            "season_name",
            "league_position",
            "team_name",
            "manager_name",
            "total_points",
            "rank",
        ])])
        .collect()?;
    Ok(df)
}

pub fn current_season_table(current: &SeasonCurrentDf) -> Result<DataFrame> {
    let df = current
        .clone()
        .into_inner()
        .lazy()
        .sort(
            ["league_position"],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .select([cols([
            "league_position",
            "team_name",
            "manager_name",
            "total_points",
            "rank",
            "nationality",
            "favourite_team",
        ])])
        .collect()?;
    Ok(df)
}

/// Headline figures for the league
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueKpis {
    pub managers: usize,
    pub seasons: usize,
    pub first_season: Option<i64>,
    pub most_titles: Vec<String>,
    pub most_titles_count: i64,
}

impl LeagueKpis {
    fn new(
        current: &SeasonCurrentDf,
        completed: &DataFrame,
        champions: &DataFrame,
    ) -> Result<Self> {
        let seasons = completed.column("season_name")?;
        let titles = champions.column("titles")?.i64()?;
        let names = champions.column("manager_name")?.str()?;

        let most_titles_count = titles.max().unwrap_or(0);
        let most_titles = titles
            .into_iter()
            .zip(names)
            .filter(|(count, _)| most_titles_count > 0 && *count == Some(most_titles_count))
            .filter_map(|(_, name)| name.map(String::from))
            .collect();

        Ok(Self {
            managers: current.height(),
            seasons: seasons.n_unique()?,
            first_season: seasons.i64()?.min(),
            most_titles,
            most_titles_count,
        })
    }

    /// Two-column table: figure name, then its value under the league's name
    pub fn to_df(&self, league_name: &str) -> Result<DataFrame> {
        let most_titles = if self.most_titles.is_empty() {
            "-".to_string()
        } else {
            format!("{} ({})", self.most_titles.join(", "), self.most_titles_count)
        };
        let df = df!(
            "figure" => ["Managers", "Completed seasons", "First season", "Most titles"],
            league_name => [
                self.managers.to_string(),
                self.seasons.to_string(),
                self.first_season.map(season_label).unwrap_or_else(|| "-".to_string()),
                most_titles,
            ],
        )?;
        Ok(df)
    }
}

pub fn all_time_header(league_name: &str) -> String {
    format!("All-time {} table", remove_starting_the(league_name))
}

pub fn previous_seasons_header(league_name: &str) -> String {
    format!("Previous {} seasons", remove_starting_the(league_name))
}

pub const SEASON_OVERVIEW_HEADER: &str = "Team Summary Statistics";

pub fn current_season_header(current_gameweek: Option<i64>, final_gw_finished: bool) -> String {
    match (final_gw_finished, current_gameweek) {
        (true, _) => "Current Season (Completed)".to_string(),
        (false, Some(gameweek)) => format!("Current Season (GW {})", gameweek),
        (false, None) => "Current Season (Not Started)".to_string(),
    }
}
