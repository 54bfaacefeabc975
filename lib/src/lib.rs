use parse_display::{Display, FromStr};

pub mod config;
pub mod current;
mod error;
pub mod fpl;
pub mod history;
pub mod records;
pub mod season;
pub mod tables;

pub use config::Config;
pub use current::{summarise_season_current, SeasonCurrentDf, SeasonCurrentRow};
pub use error::Error;
pub use fpl::{fetch_league_data, FplSource, HttpSource, LeagueData};
pub use history::{summarise_season_history, HistoryFilter, SeasonHistoryDf, SeasonHistoryRow};
pub use records::{League, ManagerRecord, SeasonHistoryRecord, TeamRecord, TeamReference};
pub use tables::LeagueTables;

pub type Result<T> = std::result::Result<T, error::Error>;

/// How the current-season summarizer treats teams that fail to join to a
/// manager record or to their favourite club.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, FromStr)]
#[display(style = "lowercase")]
pub enum JoinPolicy {
    /// Drop unmatched teams without raising
    #[default]
    Inner,
    /// Keep unmatched teams with null fields
    Left,
    /// Fail when any team is left unmatched
    Strict,
}
