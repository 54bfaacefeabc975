use crate::{
    error::Error,
    records::{required, SeasonHistoryRecord},
    Result,
};
use derive_deref::Deref;
use itertools::izip;
use polars::prelude::*;

const INPUT_NR: &str = "input_nr";
const SORTED_NR: &str = "sorted_nr";

/// Output columns, carried through from the input plus the derived position
const SEASON_HISTORY_COLUMNS: [&str; 7] = [
    "entry",
    "team_name",
    "manager_name",
    "season_name",
    "total_points",
    "rank",
    "league_position",
];

/// One team's finish in a past season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonHistoryRow {
    pub entry: i64,
    pub team_name: String,
    pub manager_name: String,
    pub season_name: i64,
    pub total_points: i64,
    pub rank: i64,
    pub league_position: i64,
}

#[derive(Clone, Debug, Deref)]
pub struct SeasonHistoryDf(DataFrame);

impl SeasonHistoryDf {
    pub fn new(df: DataFrame) -> Self {
        SeasonHistoryDf(df)
    }

    pub fn into_inner(self) -> DataFrame {
        self.0
    }

    pub fn filter(self, filter: Expr) -> Result<Self> {
        let df = self.0.lazy().filter(filter).collect()?;
        Ok(SeasonHistoryDf(df))
    }

    pub fn rows(&self) -> Result<Vec<SeasonHistoryRow>> {
        izip!(
            self.column("entry")?.i64()?,
            self.column("team_name")?.str()?,
            self.column("manager_name")?.str()?,
            self.column("season_name")?.i64()?,
            self.column("total_points")?.i64()?,
            self.column("rank")?.i64()?,
            self.column("league_position")?.i64()?,
        )
        .map(
            |(entry, team_name, manager_name, season_name, total_points, rank, league_position)| {
                Ok(SeasonHistoryRow {
                    entry: required(entry, "entry")?,
                    team_name: required(team_name, "team_name")?.to_string(),
                    manager_name: required(manager_name, "manager_name")?.to_string(),
                    season_name: required(season_name, "season_name")?,
                    total_points: required(total_points, "total_points")?,
                    rank: required(rank, "rank")?,
                    league_position: required(league_position, "league_position")?,
                })
            },
        )
        .collect()
    }
}

/// Ranks every team within its season by ascending raw `rank`.
///
/// `league_position` runs 1..=N inside each season with no gaps; teams that
/// share a raw rank keep their input order. The output is sorted by
/// `season_name` then `league_position`.
pub fn summarise_season_history(season_history: &[SeasonHistoryRecord]) -> Result<SeasonHistoryDf> {
    log::trace!("history::summarise_season_history");
    if let Some(record) = season_history.iter().find(|r| r.rank < 1) {
        return Err(Error::MalformedInput(format!(
            "entry {} has rank {} in season {}",
            record.entry, record.rank, record.season_name
        )));
    }

    let mut df = SeasonHistoryRecord::to_df(season_history)?;
    if df.height() == 0 {
        df.with_column(Series::new("league_position", Vec::<i64>::new()))?;
        return Ok(SeasonHistoryDf(df));
    }

    let position = col(SORTED_NR)
        .rank(
            RankOptions {
                method: RankMethod::Ordinal,
                descending: false,
            },
            None,
        )
        .over([col("season_name")])
        .cast(DataType::Int64)
        .alias("league_position");

    let df = df
        .lazy()
        .with_row_index(INPUT_NR, None)
        .sort(
            ["season_name", "rank", INPUT_NR],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .with_row_index(SORTED_NR, None)
        .with_column(position)
        .select([cols(SEASON_HISTORY_COLUMNS)])
        .collect()?;
    log::debug!("{} season finishes ranked", df.height());
    Ok(SeasonHistoryDf(df))
}

/// Builds a row filter over a season-history frame
#[derive(Clone, Default)]
pub struct HistoryFilter {
    filter_expr: Option<Expr>,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self { filter_expr: None }
    }

    /// Seasons starting in `year` or later
    pub fn from_season(self, year: i64) -> Self {
        let expr = col("season_name").gt_eq(lit(year));
        self.extend_filter(expr)
    }

    /// Seasons starting in `year` or earlier
    pub fn to_season(self, year: i64) -> Self {
        let expr = col("season_name").lt_eq(lit(year));
        self.extend_filter(expr)
    }

    pub fn entry(self, entry: i64) -> Self {
        let expr = col("entry").eq(lit(entry));
        self.extend_filter(expr)
    }

    pub fn manager(self, manager_name: &str) -> Self {
        let expr = col("manager_name").eq(lit(manager_name));
        self.extend_filter(expr)
    }

    /// Finishes at or above `league_position`
    pub fn top(self, league_position: i64) -> Self {
        let expr = col("league_position").lt_eq(lit(league_position));
        self.extend_filter(expr)
    }

    // Combines the current filter with a new one using AND logic
    fn extend_filter(mut self, new_expr: Expr) -> Self {
        self.filter_expr = match self.filter_expr.take() {
            Some(existing_expr) => Some(existing_expr.and(new_expr)),
            None => Some(new_expr),
        };
        self
    }

    pub fn build(self) -> Expr {
        self.filter_expr.unwrap_or_else(|| lit(true))
    }
}
