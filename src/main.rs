use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use itinerary_guard::cli::commands::{self, OutputFormat};

#[derive(Parser)]
#[command(name = "itinerary-guard")]
#[command(
    version,
    about = "Inspect how AI itinerary output is parsed, normalized and enriched"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the global/project/env chain
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a saved model response through the recovery tiers
    Parse {
        #[arg(help = "Response file, or '-' for stdin")]
        input: PathBuf,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: OutputFormat,
    },

    /// Normalize free-form cost strings
    Cost {
        #[arg(required = true, help = "Cost strings to normalize")]
        values: Vec<String>,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: OutputFormat,
    },

    /// Fetch the weather reference for destinations
    Weather {
        #[arg(required = true, help = "Destination names")]
        destinations: Vec<String>,
        #[arg(long, help = "Trip start date (YYYY-MM-DD)")]
        start: NaiveDate,
        #[arg(long, default_value = "7", help = "Trip length in days")]
        days: u32,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: OutputFormat,
    },

    /// Run the full pipeline over a request and a saved model response
    Process {
        #[arg(long, help = "GenerationRequest JSON file")]
        request: PathBuf,
        #[arg(long, help = "Model response file, or '-' for stdin")]
        response: PathBuf,
        #[arg(long, default_value = "unknown", help = "Model name recorded in the audit log")]
        model: String,
        #[arg(long, help = "Print the audit log entry")]
        log: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mitinerary-guard encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = itinerary_guard::cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse { input, format } => {
            commands::parse::run(&config, &input, format)?;
        }
        Commands::Cost { values, format } => {
            commands::cost::run(&values, format)?;
        }
        Commands::Weather {
            destinations,
            start,
            days,
            format,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::weather::run(
                &config,
                &destinations,
                start,
                days,
                format,
            ))?;
        }
        Commands::Process {
            request,
            response,
            model,
            log,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::process::run(
                &config, &request, &response, &model, log,
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&config, &format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
        },
    }

    Ok(())
}
