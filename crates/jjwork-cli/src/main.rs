mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::hook::HookSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jjwork",
    about = "jj workspace hooks for parallel agent sessions",
    version,
    propagate_version = true
)]
struct Cli {
    /// Settings file (default: ~/.claude/settings.json)
    #[arg(long, global = true, env = "JJWORK_SETTINGS")]
    settings: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install hook entries into the settings file
    Install {
        /// Binary the installed hooks invoke (default: this executable)
        #[arg(long)]
        bin: Option<String>,
    },

    /// Remove this tool's hook entries from the settings file
    Uninstall,

    /// Show tool availability and installed hook entries
    Status,

    /// Open a zellij tab in an existing workspace
    Open { name: String },

    /// Hook handlers invoked by the host runtime (JSON on stdin)
    Hook {
        #[command(subcommand)]
        subcommand: HookSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = cli.settings.as_deref();

    let result = match cli.command {
        Commands::Install { bin } => cmd::install::run(settings, bin.as_deref(), cli.json),
        Commands::Uninstall => cmd::uninstall::run(settings, cli.json),
        Commands::Status => cmd::status::run(settings, cli.json),
        Commands::Open { name } => cmd::open::run(&name),
        Commands::Hook { subcommand } => cmd::hook::run(subcommand),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
