mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "actions",
    about = "Custom actions: add, edit, delete, and preview user-defined shortcuts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .actions/ or .git/)
    #[arg(long, global = true, env = "ACTIONS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize custom action storage in the current project
    Init {
        /// Storage backend: yaml or redb
        #[arg(long, default_value = "yaml")]
        backend: String,
    },

    /// List committed actions in presentation order
    List,

    /// Add an action from form fields (e.g. --field name=MDN --field url=https://...)
    Add {
        /// Form field as name=value; repeat in submission order
        #[arg(long = "field", short = 'f', value_name = "NAME=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Edit the action with the given url and save it
    Edit {
        url: String,
        /// Field to change as name=value; applied in order
        #[arg(long = "set", short = 's', value_name = "NAME=VALUE", required = true)]
        set: Vec<String>,
    },

    /// Delete the action with the given url
    Delete { url: String },

    /// Render the action list as text
    Show,

    /// Inspect the project config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve the HTTP API and live views
    Ui {
        /// Port to listen on
        #[arg(long, default_value = "3142")]
        port: u16,
        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { backend } => cmd::init::run(&root, &backend),
        Commands::List => cmd::list::run(&root, cli.json),
        Commands::Add { fields } => cmd::add::run(&root, &fields, cli.json),
        Commands::Edit { url, set } => cmd::edit::run(&root, &url, &set, cli.json),
        Commands::Delete { url } => cmd::delete::run(&root, &url, cli.json),
        Commands::Show => cmd::show::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Ui { port, no_open } => cmd::ui::run(&root, port, no_open),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
