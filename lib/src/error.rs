use itertools::Itertools;
use polars::error::PolarsError;
use std::io::Error as IoError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] IoError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("FPL API returned {status} for {path}")]
    Upstream {
        status: reqwest::StatusCode,
        path: String,
    },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("No {missing} found for entries: {}", .entries.iter().join(", "))]
    UnmatchedJoin {
        missing: &'static str,
        entries: Vec<i64>,
    },

    #[error("League id {0} is outside 0..=999999999")]
    InvalidLeagueId(i64),

    #[error("Season {year} is outside {first}..={latest}")]
    InvalidSeasonYear { year: i64, first: i64, latest: i64 },
}
