//! projmgr CLI
//!
//! Lists installed CMSIS packs and devices and validates solution files.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use projmgr::commands::{self, list::Subject, OutputFormat};
use projmgr::config::Config;
use projmgr::{logging, Manager};

#[derive(Parser)]
#[command(name = "projmgr")]
#[command(about = "Project manager for CMSIS solutions")]
#[command(version)]
struct Cli {
    /// Pack root directory (overrides CMSIS_PACK_ROOT and the config file)
    #[arg(long, global = true)]
    pack_root: Option<PathBuf>,

    /// Config file (default: <config dir>/projmgr/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More diagnostic output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed packs and devices
    List {
        #[command(subcommand)]
        subject: Option<ListSubject>,

        #[command(flatten)]
        query: QueryArgs,
    },
    /// Validate a solution file and the projects it references
    Validate {
        /// Path to the *.csolution.yml file
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum ListSubject {
    /// List installed packs
    Packs(QueryArgs),
    /// List installed devices
    Devices(ProjectQueryArgs),
    /// List components of installed packs
    Components(ProjectQueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// Filter words, all of which must match (default: list.architecture from config)
    filter: Option<String>,

    /// List everything, ignoring the default filter
    #[arg(long, conflicts_with = "filter")]
    all: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args)]
struct ProjectQueryArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Only consider the packs this *.cproject.yml selects
    #[arg(short, long)]
    project: Option<PathBuf>,
}

impl QueryArgs {
    fn resolve_filter(&self, default: &str) -> String {
        if self.all {
            return String::new();
        }
        self.filter.clone().unwrap_or_else(|| default.to_string())
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("error projmgr: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    let manager = Manager::from_config(&config, cli.pack_root.as_deref())
        .context("failed to load installed packs")?;

    match cli.command {
        Commands::List { subject, query } => {
            let (subject, query, project) = match subject {
                None => (None, query, None),
                Some(ListSubject::Packs(q)) => (Some(Subject::Packs), q, None),
                Some(ListSubject::Devices(q)) => (Some(Subject::Devices), q.query, q.project),
                Some(ListSubject::Components(q)) => {
                    (Some(Subject::Components), q.query, q.project)
                }
            };
            // Components have no architecture; only an explicit filter applies.
            let default = match subject {
                Some(Subject::Components) => "",
                _ => config.list.architecture.as_str(),
            };
            let filter = query.resolve_filter(default);
            commands::list::run(&manager, subject, &filter, project.as_deref(), query.format)
        }
        Commands::Validate { path, format } => commands::validate::run(&manager, &path, format),
    }
}
