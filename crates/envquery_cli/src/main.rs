#![forbid(unsafe_code)]

mod config;
mod error;
mod table;
mod transport;

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use envquery::{
    AgentEnvelope, HistoryStore, JsonFileHistoryStore, NormalizedResult, QueryOutcome,
    QuerySession,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::error::Error;
use crate::table::{SortDirection, SortKey};
use crate::transport::CommandTransport;

#[derive(Debug, Parser)]
#[command(name = "envquery", version)]
#[command(about = "Ask an agent for environment variables and show them as a table")]
struct Cli {
    /// Path to a config file (defaults to `./envquery.toml` when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize a saved agent response (file or stdin) and print its variables.
    Normalize(NormalizeArgs),
    /// Send a query to the configured agent command and print its variables.
    Ask(AskArgs),
    /// Inspect or clear the query history.
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    /// Envelope JSON file; reads stdin when omitted or `-`.
    path: Option<PathBuf>,

    #[command(flatten)]
    display: DisplayArgs,
}

#[derive(Debug, Args)]
struct AskArgs {
    /// Natural-language description of the variables you want.
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Override the configured agent id.
    #[arg(long)]
    agent_id: Option<String>,

    #[command(flatten)]
    display: DisplayArgs,
}

#[derive(Debug, Args)]
struct DisplayArgs {
    /// Print the normalized result as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Sort variables by column; source order is kept otherwise.
    #[arg(long, value_enum)]
    sort: Option<SortKey>,

    /// Sort descending.
    #[arg(long, requires = "sort")]
    desc: bool,
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    /// List past queries, newest first.
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete all recorded queries.
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    let cwd = std::env::current_dir()?;
    let config = config::load(cli.config.as_deref(), &cwd)?;
    match cli.command {
        Command::Normalize(args) => normalize(args),
        Command::Ask(args) => ask(args, config).await,
        Command::History(cmd) => history(cmd, &config),
    }
}

fn normalize(args: NormalizeArgs) -> Result<(), Error> {
    let text = match args.path.as_deref() {
        Some(p) if p.as_os_str() != "-" => fs::read_to_string(p)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let envelope: AgentEnvelope = serde_json::from_str(&text)?;
    present(QueryOutcome::from_envelope(&envelope), &args.display)
}

async fn ask(args: AskArgs, mut config: CliConfig) -> Result<(), Error> {
    if let Some(agent_id) = args.agent_id {
        config.agent_id = agent_id;
    }
    let agent = config.agent.as_ref().ok_or(Error::MissingAgentCommand)?;
    let store = history_store(&config);

    let session = QuerySession::new(CommandTransport::from_config(agent), config.session_config());
    session.restore_history(store.load()?.to_vec());

    let query = args.query.join(" ");
    let outcome = session.submit(&query).await?;
    if outcome.is_recordable() {
        store.save(&session.history())?;
        debug!(path = %store.path().display(), "history saved");
    }
    present(outcome, &args.display)
}

fn history(cmd: HistoryCommand, config: &CliConfig) -> Result<(), Error> {
    let store = history_store(config);
    match cmd {
        HistoryCommand::List { limit } => {
            let history = store.load()?;
            let limit = limit.unwrap_or(usize::MAX);
            print!("{}", table::render_history(history.recent().take(limit)));
        }
        HistoryCommand::Clear => {
            store.clear()?;
            println!("History cleared.");
        }
    }
    Ok(())
}

fn history_store(config: &CliConfig) -> JsonFileHistoryStore {
    JsonFileHistoryStore::new(config.history_path.clone(), config.history_capacity)
}

fn present(outcome: QueryOutcome, display: &DisplayArgs) -> Result<(), Error> {
    let mut result: NormalizedResult = match outcome {
        QueryOutcome::Found(result) | QueryOutcome::NoMatch(result) => result,
        QueryOutcome::Failed(failure) => return Err(Error::QueryFailed(failure.error)),
    };
    if let Some(key) = display.sort {
        let direction = if display.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        table::sort_variables(&mut result.variables, key, direction);
    }
    if display.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", table::render_result(&result));
    }
    Ok(())
}
