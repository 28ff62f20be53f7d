//! Turmite CLI - run, watch and inspect turmite colonies.

mod commands;
mod config;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "turmite")]
#[command(author, version, about = "Turmite - multi-agent Langton's ants on a torus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new turmite project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run ticks as fast as possible and save the result
    Run {
        /// Number of ticks to run
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Ignore the current session and start from the config
        #[arg(long)]
        fresh: bool,
    },

    /// Watch the colony in the terminal at the configured pace
    Watch {
        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(short, long)]
        seconds: Option<u64>,

        /// Target steps per second (overrides the config)
        #[arg(short, long)]
        rate: Option<f64>,

        /// Speed control position 1..100 (overrides the config)
        #[arg(long, conflicts_with = "rate")]
        slider: Option<f64>,

        /// Ignore the current session and start from the config
        #[arg(long)]
        fresh: bool,
    },

    /// List the built-in rule presets
    Presets {
        /// Print one preset's table
        #[arg(short, long)]
        show: Option<String>,
    },

    /// Change the shared rule table (re-seeds the colony)
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },

    /// Clear the grid, keeping the ants
    Clear,

    /// Manage sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Show colony statistics
    Stats {
        /// List every ant
        #[arg(short, long)]
        ants: bool,
    },
}

#[derive(Subcommand)]
enum RulesCommands {
    /// Use a built-in preset
    Preset {
        /// Preset name, e.g. langtons or busy-beaver-3
        name: String,
    },

    /// Load a rule table from a JSON file
    Load {
        /// Path, or a file name in the user rules directory
        file: String,
    },

    /// Generate a random table
    Random {
        #[arg(short, long, default_value = "2")]
        states: usize,

        #[arg(short, long, default_value = "2")]
        colors: usize,
    },

    /// Print the current table
    Show,
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Save current session
    Save {
        /// Session name
        name: String,
    },

    /// Load a saved session
    Load {
        /// Session name
        name: String,
    },

    /// List saved sessions
    List,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run { ticks, fresh } => commands::run::run(ticks, fresh, cli.verbose),
        Commands::Watch {
            seconds,
            rate,
            slider,
            fresh,
        } => commands::watch::run(seconds, rate, slider, fresh),
        Commands::Presets { show } => commands::presets::run(show.as_deref()),
        Commands::Rules { command } => match command {
            RulesCommands::Preset { name } => commands::rules::preset(&name),
            RulesCommands::Load { file } => commands::rules::load(&file),
            RulesCommands::Random { states, colors } => commands::rules::random(states, colors),
            RulesCommands::Show => commands::rules::show(),
        },
        Commands::Clear => commands::rules::clear(),
        Commands::Session { command } => match command {
            SessionCommands::Save { name } => commands::session::save(&name),
            SessionCommands::Load { name } => commands::session::load(&name),
            SessionCommands::List => commands::session::list(),
        },
        Commands::Stats { ants } => commands::stats::run(ants),
    }
}
