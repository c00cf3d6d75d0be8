use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use cpia_cli::OutputFormat;
use cpia_cli::commands::{self, analyze::AnalyzeOptions, config::ConfigCommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cpia")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "A CLI client for the Cross Publication Insight Assistant analysis service",
    long_about = "cpia submits repository analysis requests, waits for the service to finish, \
                  and renders the resulting report. It can also inspect service health and metrics."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Settings file (defaults to the per-user cpia/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base URL of the analysis service (overrides settings and CPIA_API_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the analysis service is up
    Health {
        /// Also fetch the detailed monitoring health snapshot
        #[arg(long)]
        detailed: bool,
    },

    /// Show the service's metrics snapshot
    Metrics,

    /// Start a repository analysis and wait for the report
    Analyze {
        /// Repository to analyze (URL or owner/name)
        #[arg(value_name = "PRIMARY_REPO")]
        primary_repo: String,

        /// Question to answer about the repository
        #[arg(short, long)]
        query: String,

        /// Repository to compare against (repeatable)
        #[arg(short, long = "compare", value_name = "REPO")]
        compare: Vec<String>,

        /// Print the session identifier and return without polling
        #[arg(long)]
        no_wait: bool,

        /// Maximum number of result fetches
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Seconds to wait between result fetches
        #[arg(long, value_name = "SECONDS")]
        delay: Option<u64>,
    },

    /// Fetch the results of an existing session
    Results {
        /// Session identifier returned by `analyze`
        #[arg(value_name = "SESSION_ID")]
        session_id: String,

        /// Poll until the analysis finishes
        #[arg(long)]
        wait: bool,
    },

    /// Format a saved analysis payload (file or stdin) without contacting the service
    Format {
        /// JSON file holding the payload or a full results response; `-` or omitted reads stdin
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:
    bash, zsh, fish, powershell, elvish

INSTALLATION:
    Bash:  cpia completion --shell bash >> ~/.bashrc
    Zsh:   cpia completion --shell zsh > ~/.zfunc/_cpia   (then add ~/.zfunc to fpath in ~/.zshrc)
    Fish:  cpia completion --shell fish > ~/.config/fish/completions/cpia.fish")]
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);
    tracing::debug!("Output format: {}", cli.format.as_str());

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Health { detailed } => {
            let settings = commands::load_settings(config, cli.base_url)?;
            commands::health::execute(&settings, detailed, cli.format)
        }
        Commands::Metrics => {
            let settings = commands::load_settings(config, cli.base_url)?;
            commands::metrics::execute(&settings, cli.format)
        }
        Commands::Analyze {
            primary_repo,
            query,
            compare,
            no_wait,
            max_attempts,
            delay,
        } => {
            let settings = commands::load_settings(config, cli.base_url)?;
            let options = AnalyzeOptions {
                primary_repo,
                query,
                compare,
                no_wait,
                max_attempts,
                delay_secs: delay,
            };
            commands::analyze::execute(&settings, options, cli.format)
        }
        Commands::Results { session_id, wait } => {
            let settings = commands::load_settings(config, cli.base_url)?;
            commands::results::execute(&settings, &session_id, wait, cli.format)
        }
        Commands::Format { file } => commands::format::execute(file.as_deref(), cli.format),
        Commands::Config { command } => {
            commands::config::execute(command, config, cli.base_url, cli.format)
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            commands::completion::execute(shell, &mut cmd)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("cpia=debug,cpia_cli=debug,cpia_core=debug,cpia_client=debug")
    } else {
        EnvFilter::new("cpia=info,cpia_cli=info,cpia_client=warn,cpia_core=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
