use anyhow::{Context, Result};
use clap::Parser;
use fplh::{
    season::{most_recent_august_start, validate_start_year, FIRST_SEASON},
    summarise_season_current, summarise_season_history, tables, Config, HttpSource, JoinPolicy,
    LeagueTables,
};
use log::LevelFilter;
use polars::prelude::*;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

#[derive(Parser, Debug)]
#[command(author, version, about = "FPL league history tables")]
struct Args {
    /// Classic league id, from https://fantasy.premierleague.com/leagues/<id>/standings/c
    #[arg(short = 'l', long = "league-id")]
    league_id: i64,

    /// First season to include, e.g. 2015 for 2015/16
    #[arg(short = 's', long = "start-year", default_value_t = FIRST_SEASON)]
    start_year: i64,

    /// How to treat teams without a manager record or a known favourite club
    #[arg(long, default_value = "inner")]
    join_policy: JoinPolicy,

    /// TOML file overriding the API settings
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn print_table(header: &str, df: &DataFrame) {
    println!("\n{}\n{}", header, df);
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set the default level based on verbosity
    let default_level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_config = ConfigBuilder::new().add_filter_allow_str("fplh").build();
    TermLogger::init(
        default_level,
        log_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("failed to initialise logging")?;

    log::trace!("Args {:#?}", args);

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    let current_season_year = most_recent_august_start(chrono::Local::now().date_naive());
    let season_start_year = validate_start_year(args.start_year, current_season_year)?;

    let source = HttpSource::new(&config)?;
    let data = fplh::fetch_league_data(&source, args.league_id)
        .with_context(|| format!("failed to fetch league {}", args.league_id))?;
    log::info!(
        "Loaded {} teams and {} past season finishes",
        data.team_data.len(),
        data.season_history.len()
    );

    let current = summarise_season_current(
        &data.league,
        &data.team_data,
        &data.manager_information,
        current_season_year,
        &data.team_ids,
        args.join_policy,
    )?;
    let history = summarise_season_history(&data.season_history)?;
    let league_tables = LeagueTables::build(
        &current,
        &history,
        season_start_year,
        data.final_gw_finished,
    )?;

    // Print every row of the small tables
    std::env::set_var("POLARS_FMT_MAX_ROWS", "-1");
    std::env::set_var("POLARS_FMT_MAX_COLS", "-1");

    let league_name = &data.league.name;
    println!("{}", league_name);
    println!("{}", league_tables.kpis.to_df(league_name)?);
    print_table("Champions", &league_tables.champions);
    print_table("List of Champions", &league_tables.list_of_champions);
    print_table(&tables::all_time_header(league_name), &league_tables.all_time);
    print_table(tables::SEASON_OVERVIEW_HEADER, &league_tables.season_overview);
    print_table(
        &tables::previous_seasons_header(league_name),
        &league_tables.previous_seasons,
    );
    print_table(
        &tables::current_season_header(data.current_gameweek, data.final_gw_finished),
        &league_tables.current_season,
    );

    Ok(())
}
