use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hogql::clickhouse_query_generator::DefaultPropertyResolver;
use hogql::config::{CliConfig, QueryConfig};
use hogql::events_query::EventsQueryRunner;
use hogql::executor::ClickHouseExecutor;
use hogql::testing::{InMemoryActions, InMemoryPersons};
use hogql::{EventsQuery, TeamContext};

/// HogQL - compile events queries to ClickHouse SQL
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file holding an EventsQuery (reads stdin when omitted)
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Team the query runs for
    #[arg(long, default_value_t = 1)]
    team_id: i64,

    /// Team timezone (defaults to the configured timezone)
    #[arg(long)]
    timezone: Option<String>,

    /// YAML file with action definitions referenced by actionId
    #[arg(long)]
    actions: Option<PathBuf>,

    /// YAML configuration file (HOGQL_* environment variables otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rows returned when the query sets no limit
    #[arg(long)]
    default_limit: Option<i64>,

    /// ClickHouse max_execution_time in seconds
    #[arg(long)]
    max_execution_time: Option<u32>,

    /// Run the query against ClickHouse instead of printing the SQL
    #[arg(long)]
    execute: bool,
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        CliConfig {
            default_limit: cli.default_limit,
            max_execution_time: cli.max_execution_time,
            timezone: cli.timezone.clone(),
        }
    }
}

fn read_query(cli: &Cli) -> anyhow::Result<EventsQuery> {
    let content = match &cli.query_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading query file {}", path.display()))?,
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("reading query from stdin")?;
            content
        }
    };
    serde_json::from_str(&content).context("parsing EventsQuery JSON")
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let base = match &cli.config {
        Some(path) => QueryConfig::from_yaml_file(path)?,
        None => QueryConfig::from_env()?,
    };
    let config = base.merge_cli(CliConfig::from(&cli))?;

    let actions = match &cli.actions {
        Some(path) => InMemoryActions::from_yaml(
            &std::fs::read_to_string(path)
                .with_context(|| format!("reading actions file {}", path.display()))?,
        )?,
        None => InMemoryActions::default(),
    };
    let team = TeamContext::new(cli.team_id).with_timezone(config.timezone.as_str());
    let query = read_query(&cli)?;
    let runner = EventsQueryRunner::new(
        config.clone(),
        Arc::new(InMemoryPersons::new()),
        Arc::new(actions),
    );

    if cli.execute {
        let executor = ClickHouseExecutor::from_env(config.settings())?;
        let response = runner.run(&executor, &query, &team).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        let assembled = runner.build(&query, &team).await?;
        let sql = runner.to_clickhouse_sql(&assembled, &team, &DefaultPropertyResolver::new())?;
        println!("{}", sql);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
