//! End-to-end: API payloads -> summarizers -> league tables, without network

use fplh::fpl::{self, parse_payload, FplSource};
use fplh::{
    fetch_league_data, summarise_season_current, summarise_season_history, Error, JoinPolicy,
    LeagueTables, Result,
};
use std::collections::HashMap;

/// Answers API paths from canned JSON bodies
struct FixtureSource {
    bodies: HashMap<String, String>,
}

impl FplSource for FixtureSource {
    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.bodies.get(path).ok_or_else(|| Error::Upstream {
            status: reqwest::StatusCode::NOT_FOUND,
            path: path.to_string(),
        })?;
        parse_payload(path, body)
    }
}

fn standings_page(page: u32, has_next: bool, results: &str) -> String {
    format!(
        r#"{{"league": {{"id": 314, "name": "The Office League"}},
            "standings": {{"has_next": {}, "page": {}, "results": [{}]}}}}"#,
        has_next, page, results
    )
}

fn standing(entry: i64, name: &str, player: &str, rank: i64, total: i64) -> String {
    format!(
        r#"{{"id": {}, "event_total": 50, "player_name": "{}", "rank": {}, "last_rank": {},
            "rank_sort": {}, "total": {}, "entry": {}, "entry_name": "{}"}}"#,
        entry * 10, player, rank, rank, rank, total, entry, name
    )
}

fn entry(id: i64, first: &str, last: &str, favourite_team: Option<i64>) -> String {
    let favourite = favourite_team.map(|t| t.to_string()).unwrap_or_else(|| "null".to_string());
    format!(
        r#"{{"id": {}, "player_first_name": "{}", "player_last_name": "{}",
            "player_region_iso_code_long": "ENG", "summary_overall_rank": {},
            "favourite_team": {}, "name": "ignored"}}"#,
        id, first, last, id * 1000, favourite
    )
}

fn entry_history(past: &[(&str, i64, i64)]) -> String {
    let past = past
        .iter()
        .map(|(season, points, rank)| {
            format!(
                r#"{{"season_name": "{}", "total_points": {}, "rank": {}}}"#,
                season, points, rank
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(r#"{{"current": [], "past": [{}], "chips": []}}"#, past)
}

fn bootstrap(finished: bool) -> String {
    format!(
        r#"{{"events": [
                {{"id": 1, "finished": true, "is_current": false}},
                {{"id": 2, "finished": {}, "is_current": true}}
            ],
            "teams": [
                {{"id": 1, "name": "Arsenal", "short_name": "ARS"}},
                {{"id": 14, "name": "Liverpool", "short_name": "LIV"}}
            ]}}"#,
        finished
    )
}

fn fixture(finished: bool) -> FixtureSource {
    let mut bodies = HashMap::new();
    bodies.insert(
        fpl::standings_path(314, 1),
        standing_results_page_one(),
    );
    bodies.insert(
        fpl::standings_path(314, 2),
        standings_page(2, false, &standing(3, "Gamma Rays", "Cy Ng", 3, 700)),
    );
    bodies.insert(fpl::BOOTSTRAP_PATH.to_string(), bootstrap(finished));

    bodies.insert(fpl::entry_path(1), entry(1, "Ana", "Silva", Some(1)));
    bodies.insert(fpl::entry_path(2), entry(2, "Ben", "Okafor", Some(14)));
    // Favourite club that no longer exists in the reference table
    bodies.insert(fpl::entry_path(3), entry(3, "Cy", "Ng", Some(99)));

    bodies.insert(
        fpl::entry_history_path(1),
        entry_history(&[("2021/22", 2300, 50_000), ("2022/23", 2400, 20_000)]),
    );
    bodies.insert(
        fpl::entry_history_path(2),
        entry_history(&[("2021/22", 2350, 30_000), ("2022/23", 2350, 40_000)]),
    );
    bodies.insert(fpl::entry_history_path(3), entry_history(&[("2022/23", 2100, 90_000)]));
    FixtureSource { bodies }
}

fn standing_results_page_one() -> String {
    let results = [
        standing(1, "Silva Linings", "Ana Silva", 1, 900),
        standing(2, "Okafor Town", "Ben Okafor", 2, 800),
    ]
    .join(", ");
    standings_page(1, true, &results)
}

#[test]
fn fetches_all_standings_pages() {
    let data = fetch_league_data(&fixture(false), 314).unwrap();
    assert_eq!(data.league.name, "The Office League");
    assert_eq!(data.team_data.len(), 3);
    assert_eq!(data.manager_information[1].player_name, "Ben Okafor");
    assert_eq!(data.team_data[2].favourite_team, Some(99));
    assert_eq!(data.season_history.len(), 5);
    assert_eq!(data.season_history[0].season_name, 2021);
    assert_eq!(data.current_gameweek, Some(2));
    assert!(!data.final_gw_finished);
}

#[test]
fn summarises_fetched_league() {
    let data = fetch_league_data(&fixture(true), 314).unwrap();

    let current = summarise_season_current(
        &data.league,
        &data.team_data,
        &data.manager_information,
        2023,
        &data.team_ids,
        JoinPolicy::Inner,
    )
    .unwrap();
    let current_rows = current.rows().unwrap();
    assert_eq!(current_rows.len(), 2);
    assert_eq!(current_rows[0].favourite_team.as_deref(), Some("Arsenal"));
    assert_eq!(current_rows[1].favourite_team.as_deref(), Some("Liverpool"));

    let history = summarise_season_history(&data.season_history).unwrap();
    let positions: Vec<(i64, i64, i64)> = history
        .rows()
        .unwrap()
        .iter()
        .map(|r| (r.season_name, r.entry, r.league_position))
        .collect();
    assert_eq!(
        positions,
        vec![(2021, 2, 1), (2021, 1, 2), (2022, 1, 1), (2022, 2, 2), (2022, 3, 3)]
    );

    let tables = LeagueTables::build(&current, &history, 2021, data.final_gw_finished).unwrap();
    assert_eq!(tables.list_of_champions.height(), 3);
    assert_eq!(tables.kpis.managers, 2);
    assert_eq!(tables.kpis.seasons, 3);
    assert_eq!(tables.season_overview.height(), 3);
}

#[test]
fn strict_policy_reports_unknown_club() {
    let data = fetch_league_data(&fixture(false), 314).unwrap();
    let err = summarise_season_current(
        &data.league,
        &data.team_data,
        &data.manager_information,
        2023,
        &data.team_ids,
        JoinPolicy::Strict,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "No favourite team found for entries: 3");
}

#[test]
fn unknown_league_propagates_upstream_error() {
    let err = fetch_league_data(&fixture(false), 42).unwrap_err();
    assert!(matches!(err, Error::Upstream { .. }));
}

#[test]
fn rejects_out_of_range_league_id() {
    let err = fetch_league_data(&fixture(false), 1_000_000_000).unwrap_err();
    assert!(matches!(err, Error::InvalidLeagueId(1_000_000_000)));
}

#[test]
fn malformed_season_name_fails_fast() {
    let mut source = fixture(false);
    source.bodies.insert(
        fpl::entry_history_path(2),
        entry_history(&[("last year", 2350, 30_000)]),
    );
    let err = fetch_league_data(&source, 314).unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
}
