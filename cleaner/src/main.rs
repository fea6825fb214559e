//! Life expectancy CLI - clean the Eurostat extract into a tidy PT series
//!
//! ```bash
//! life-expectancy                          # clean with configured paths
//! life-expectancy clean -o pt.csv          # clean to a specific output
//! life-expectancy preview -n 10            # print the first clean rows as JSON
//! ```
//!
//! Paths default to `data/`, and can be set with `LIFE_EXPECTANCY_INPUT` /
//! `LIFE_EXPECTANCY_OUTPUT` (also read from `.env`).

use clap::{Parser, Subcommand};
use life_expectancy::logs::log_error;
use life_expectancy::{clean_data, preview, Config, TransformOptions};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "life-expectancy")]
#[command(about = "Reshape the EU life expectancy table into a tidy PT series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run extract, transform and load
    Clean {
        /// Input TSV file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the first cleaned rows as JSON without writing
    Preview {
        /// Input TSV file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of rows to print
        #[arg(short = 'n', long, default_value = "5")]
        rows: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_env();
    let command = cli.command.unwrap_or(Commands::Clean {
        input: None,
        output: None,
    });

    let result = match command {
        Commands::Clean { input, output } => cmd_clean(config.with_overrides(input, output)),
        Commands::Preview { input, rows } => cmd_preview(config.with_overrides(input, None), rows),
    };

    if let Err(e) = result {
        log_error(e.to_string());
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_clean(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", config.input_path.display());

    let summary = clean_data(&config)?;

    eprintln!("   Raw rows: {}", summary.stats.raw_rows);
    eprintln!("   Year columns: {}", summary.stats.year_columns);
    eprintln!("   Clean rows: {}", summary.stats.clean_rows);
    eprintln!("💾 Output written to: {}", summary.output_path.display());
    Ok(())
}

fn cmd_preview(config: Config, rows: usize) -> Result<(), Box<dyn std::error::Error>> {
    let records = preview(&config.input_path, &TransformOptions::default(), rows)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
