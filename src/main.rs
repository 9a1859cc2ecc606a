//! aggr workspace CLI
//!
//! Drives the workspace store over a data directory, the way the app shell
//! does: resolve and activate the current workspace, then apply one action.

use std::path::PathBuf;
use std::sync::Arc;

use aggr_workspaces::{
    DomainError, DomainResult, FileEnvironment, NoopBootstrap, StoreConfig, WorkspaceStore,
};
use clap::{Parser, Subcommand};
use serde::Serialize;

const DEFAULT_DATA_DIR: &str = "aggr-data";

#[derive(Parser)]
#[command(
    name = "aggr",
    version,
    about = "Manage aggr workspaces stored in a local data directory"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory holding the database, the workspace hint and the logs
    /// (default: $AGGR_DATA_DIR, then ./aggr-data).
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Address the workspace is resolved from, e.g. /ab12.
    #[arg(long = "path", value_name = "/ID", default_value = "/", global = true)]
    path: String,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current workspace.
    Current,

    /// List workspaces, least recently updated first.
    List,

    /// Create and activate a new workspace.
    New,

    /// Copy the current workspace and activate the copy.
    Duplicate,

    /// Rename the current workspace.
    Rename { name: String },

    /// Delete a workspace.
    Remove { id: String },

    /// Write the current workspace to a directory.
    Export {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Register an exported workspace and activate it.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Read or change the states of the current workspace.
    #[command(subcommand)]
    State(StateCommand),

    /// List series presets.
    Series,

    /// Delete the database and the workspace hint.
    Reset,
}

#[derive(Subcommand)]
enum StateCommand {
    /// Print a state.
    Get { name: String },

    /// Store a state given as JSON.
    Set { name: String, json: String },

    /// Remove a state.
    Rm { name: String },
}

impl Cli {
    fn config(&self) -> StoreConfig {
        let mut config = StoreConfig::from_env();
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if config.data_dir.is_none() {
            config.data_dir = Some(PathBuf::from(DEFAULT_DATA_DIR));
        }
        config
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> DomainResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(config: StoreConfig, location: String, command: Command) -> DomainResult<()> {
    let hints_path = config
        .hints_path()
        .ok_or_else(|| DomainError::InvalidInput("no data directory".into()))?;
    let environment = Arc::new(FileEnvironment::open(hints_path, location)?);

    let mut store = WorkspaceStore::open(&config, environment, Arc::new(NoopBootstrap)).await?;
    let workspace = store.resolve_current().await?;
    store.activate(workspace).await?;

    match command {
        Command::Current => print_json(&store.current()),
        Command::List => print_json(&store.list().await?),
        Command::New => {
            let workspace = store.create().await?;
            print_json(&store.activate(workspace).await?)
        }
        Command::Duplicate => print_json(&store.duplicate().await?),
        Command::Rename { name } => print_json(&store.rename(&name).await?),
        Command::Remove { id } => store.remove(&id).await,
        Command::Export { dir } => {
            let path = store.export_to(&dir)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Import { file } => {
            let contents = std::fs::read_to_string(file)?;
            let workspace = store.import_json(&contents).await?;
            print_json(&store.activate(workspace).await?)
        }
        Command::State(StateCommand::Get { name }) => print_json(&store.get_state(&name)?),
        Command::State(StateCommand::Set { name, json }) => {
            let state: serde_json::Value = serde_json::from_str(&json)
                .map_err(|e| DomainError::InvalidInput(format!("state: {}", e)))?;
            let workspace = store.set_state(&name, &state).await?;
            print_json(&workspace.states.get(&name))
        }
        Command::State(StateCommand::Rm { name }) => store.remove_state(&name).await.map(|_| ()),
        Command::Series => print_json(&store.list_series().await?),
        Command::Reset => store.reset().await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config();

    if let Some(log_dir) = config.log_dir() {
        match rolling_logger::init_logger(log_dir, "aggr") {
            Ok(path) => rolling_logger::info(&format!("logging to {}", path.display())),
            Err(e) => eprintln!("{}", e),
        }
    }

    let command = cli.command.unwrap_or(Command::Current);
    if let Err(e) = run(config, cli.path, command).await {
        rolling_logger::error(&e.to_string());
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
