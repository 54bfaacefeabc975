//! FPL public API client
//!
//! Fetches a classic league's standings, each member's entry and history, and
//! the static club list, and assembles the typed records the summarizers take.
//! Every call goes to the network; nothing is cached between requests.

use crate::{
    config::Config,
    error::Error,
    records::{League, ManagerRecord, SeasonHistoryRecord, TeamRecord, TeamReference},
    season::{parse_season_name, validate_league_id},
    Result,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

// ============================================================================
// API response structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StandingsResponse {
    pub league: League,
    pub standings: Standings,
}

#[derive(Debug, Deserialize)]
pub struct Standings {
    pub has_next: bool,
    pub page: u32,
    pub results: Vec<StandingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingEntry {
    pub entry: i64,
    pub entry_name: String,
    pub player_name: String,
    pub rank: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct EntryResponse {
    pub id: i64,
    pub player_first_name: String,
    pub player_last_name: String,
    pub player_region_iso_code_long: Option<String>,
    pub summary_overall_rank: Option<i64>,
    pub favourite_team: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EntryHistoryResponse {
    pub past: Vec<PastSeason>,
}

#[derive(Debug, Deserialize)]
pub struct PastSeason {
    pub season_name: String,
    pub total_points: i64,
    pub rank: i64,
}

#[derive(Debug, Deserialize)]
pub struct BootstrapResponse {
    pub events: Vec<Event>,
    pub teams: Vec<TeamReference>,
}

/// A gameweek
#[derive(Debug, Deserialize)]
pub struct Event {
    pub id: i64,
    pub finished: bool,
    pub is_current: bool,
}

/// Everything one request needs, fetched fresh
#[derive(Debug, Clone)]
pub struct LeagueData {
    pub league: League,
    pub team_data: Vec<TeamRecord>,
    pub manager_information: Vec<ManagerRecord>,
    pub season_history: Vec<SeasonHistoryRecord>,
    pub team_ids: Vec<TeamReference>,
    pub current_gameweek: Option<i64>,
    pub final_gw_finished: bool,
}

// ============================================================================
// Sources
// ============================================================================

/// Anything that can answer FPL API paths with JSON bodies
pub trait FplSource {
    /// Fetches `path`, relative to the API root, and decodes the body
    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T>;
}

/// Decodes a response body, reporting a shape mismatch as malformed input
pub fn parse_payload<T: DeserializeOwned>(path: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::MalformedInput(format!("{}: {}", path, e)))
}

pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
    max_attempts: u32,
}

impl HttpSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            max_attempts: config.max_attempts.max(1),
        })
    }

    fn get_text(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status,
                path: path.to_string(),
            });
        }
        Ok(response.text()?)
    }
}

impl FplSource for HttpSource {
    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = with_retry(|| self.get_text(path), self.max_attempts)?;
        parse_payload(path, &body)
    }
}

/// Transport failures and 429/5xx answers are worth another attempt
fn is_retryable(err: &Error) -> bool {
    match err {
        Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        Error::Upstream { status, .. } => {
            status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
        }
        _ => false,
    }
}

const BASE_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF_MS: u64 = 30_000;

/// Doubles from `BASE_BACKOFF_MS` per failed attempt, capped at `MAX_BACKOFF_MS`
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(BASE_BACKOFF_MS.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

/// Retry an operation with exponential backoff
fn with_retry<T, F>(mut operation: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 1;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_attempts && is_retryable(&e) => {
                log::warn!("Attempt {} failed: {}", attempt, e);
                std::thread::sleep(backoff_delay(attempt));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// ============================================================================
// Assembly
// ============================================================================

pub fn standings_path(league_id: i64, page: u32) -> String {
    format!("leagues-classic/{}/standings/?page_standings={}", league_id, page)
}

pub fn entry_path(entry: i64) -> String {
    format!("entry/{}/", entry)
}

pub fn entry_history_path(entry: i64) -> String {
    format!("entry/{}/history/", entry)
}

pub const BOOTSTRAP_PATH: &str = "bootstrap-static/";

/// Classic league pages hold 50 entries; no real league comes near this
pub const MAX_STANDINGS_PAGES: u32 = 1000;

/// Walks every standings page of a classic league
///
/// Stops at the first page without `has_next`, or at an empty page even if the
/// API claims there is more.
pub fn fetch_standings<S: FplSource>(
    source: &S,
    league_id: i64,
) -> Result<(League, Vec<StandingEntry>)> {
    let mut results = Vec::new();
    let mut page = 1;
    let league = loop {
        let response: StandingsResponse = source.get_json(&standings_path(league_id, page))?;
        log::info!(
            "{}: page {} with {} entries",
            response.league.name,
            response.standings.page,
            response.standings.results.len()
        );
        if response.standings.results.is_empty() {
            if response.standings.has_next {
                log::warn!("Empty standings page {} claims more pages; stopping", page);
            }
            break response.league;
        }
        results.extend(response.standings.results);
        if !response.standings.has_next {
            break response.league;
        }
        if page >= MAX_STANDINGS_PAGES {
            return Err(Error::MalformedInput(format!(
                "league {} standings still paging after {} pages",
                league_id, MAX_STANDINGS_PAGES
            )));
        }
        page += 1;
    };
    Ok((league, results))
}

/// Fetches and assembles everything needed to summarise `league_id`
pub fn fetch_league_data<S: FplSource>(source: &S, league_id: i64) -> Result<LeagueData> {
    let league_id = validate_league_id(league_id)?;
    let (league, standings) = fetch_standings(source, league_id)?;

    let bootstrap: BootstrapResponse = source.get_json(BOOTSTRAP_PATH)?;
    let current_gameweek = bootstrap.events.iter().find(|e| e.is_current).map(|e| e.id);
    let final_gw_finished = bootstrap.events.last().map(|e| e.finished).unwrap_or(false);

    let mut team_data = Vec::with_capacity(standings.len());
    let mut manager_information = Vec::with_capacity(standings.len());
    let mut season_history = Vec::new();

    for standing in standings {
        let entry: EntryResponse = source.get_json(&entry_path(standing.entry))?;
        let history: EntryHistoryResponse = source.get_json(&entry_history_path(standing.entry))?;

        for past in history.past {
            season_history.push(SeasonHistoryRecord {
                entry: standing.entry,
                team_name: standing.entry_name.clone(),
                manager_name: standing.player_name.clone(),
                season_name: parse_season_name(&past.season_name)?,
                total_points: past.total_points,
                rank: past.rank,
            });
        }

        manager_information.push(ManagerRecord {
            entry: entry.id,
            player_name: format!("{} {}", entry.player_first_name, entry.player_last_name),
            player_region_iso_code_long: entry.player_region_iso_code_long,
            summary_overall_rank: entry.summary_overall_rank,
        });
        team_data.push(TeamRecord {
            entry: standing.entry,
            entry_name: standing.entry_name,
            total: standing.total,
            rank: standing.rank,
            favourite_team: entry.favourite_team,
        });
    }
    log::debug!(
        "{} teams, {} past season finishes",
        team_data.len(),
        season_history.len()
    );

    Ok(LeagueData {
        league,
        team_data,
        manager_information,
        season_history,
        team_ids: bootstrap.teams,
        current_gameweek,
        final_gw_finished,
    })
}
