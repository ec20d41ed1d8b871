use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;

use ad_preflight::engine::{self, RunOptions};
use ad_preflight::reporter::cli::CliReporter;
use ad_preflight::reporter::json::JsonReporter;
use ad_preflight::reporter::{score_only, Reporter};

#[derive(Parser)]
#[command(
    name = "ad-preflight",
    version,
    about = "Score ad copy violations against platform advertising policy"
)]
struct Cli {
    /// Check request file, or a directory of request files (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Cli)]
    format: Format,

    /// Only output the score (0-100)
    #[arg(long)]
    score: bool,

    /// Override the platform of every request (meta, tiktok, google, youtube, ...)
    #[arg(long)]
    platform: Option<String>,

    /// Override the product category of every request
    #[arg(long)]
    category: Option<String>,

    /// Policy database JSON with platform overrides and category metadata
    #[arg(long)]
    policy_db: Option<PathBuf>,

    /// Config file (defaults to ad-preflight.toml next to the input)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show ids, confidences, disclaimers and the highlighted copy
    #[arg(long, short)]
    verbose: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Cli,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = ad_preflight::telemetry::init(&cli.log_level) {
        eprintln!("Warning: {e}");
    }

    let options = RunOptions {
        platform: cli.platform,
        category: cli.category,
        policy_db: cli.policy_db,
        config: cli.config,
    };

    match engine::run(&cli.path, &options) {
        Ok(result) => {
            let output = if cli.score {
                for skip in &result.skipped {
                    eprintln!("Skipped {}: {}", skip.source, skip.reason);
                }
                score_only(&result.outcomes)
            } else {
                match cli.format {
                    Format::Cli => {
                        CliReporter.format(&result.outcomes, &result.skipped, cli.verbose)
                    }
                    Format::Json => {
                        JsonReporter.format(&result.outcomes, &result.skipped, cli.verbose)
                    }
                }
            };
            print!("{output}");
            process::exit(if result.passed() { 0 } else { 1 });
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    }
}
