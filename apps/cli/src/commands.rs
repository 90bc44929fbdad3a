//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use releasewatch_core::pipeline::{ProcessConfig, ProgressReporter, RunSummary};
use releasewatch_shared::{AppConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// releasewatch — track new music releases from saved catalog pages.
#[derive(Parser)]
#[command(
    name = "releasewatch",
    version,
    about = "Process saved catalog pages into a daily snapshot and a new-releases report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Process saved pages: extract, dedupe, diff, and report.
    Process {
        /// Directory of saved page snapshots (overrides config).
        #[arg(short, long)]
        snapshots: Option<PathBuf>,

        /// Directory for daily snapshots and reports (overrides config).
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "releasewatch=info",
        1 => "releasewatch=debug",
        _ => "releasewatch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Process {
            snapshots,
            data_dir,
        } => cmd_process(snapshots.as_deref(), data_dir.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_process(snapshots: Option<&Path>, data_dir: Option<&Path>) -> Result<()> {
    let config = load_config()?;

    // CLI flags override config file values.
    let snapshot_dir = snapshots
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.paths.snapshot_dir));
    let data_dir = data_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.paths.data_dir));

    let process_config = ProcessConfig::new(snapshot_dir, data_dir);

    info!(
        snapshots = %process_config.snapshot_dir.display(),
        data_dir = %process_config.data_dir.display(),
        date = %process_config.today,
        "processing saved pages"
    );

    let reporter = CliProgress::new();
    let summary = releasewatch_core::pipeline::process_snapshots(&process_config, &reporter)?;

    println!();
    println!("  Run complete for {}", process_config.today);
    println!(
        "  Files:      {} found, {} processed",
        summary.files_found, summary.files_processed
    );
    println!("  Extracted:  {}", summary.records_extracted);
    println!("  Unique:     {}", summary.unique_records);
    println!("  New:        {}", summary.new_records);
    if let Some(path) = &summary.snapshot_path {
        println!("  Snapshot:   {}", path.display());
    }
    if let Some(path) = &summary.report_path {
        println!("  Report:     {}", path.display());
    }
    println!("  Time:       {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    // The run's data is still in the summary, but a snapshot that did not
    // land on disk means the next run diffs against stale history.
    if let Some(err) = summary.persist_error {
        return Err(eyre!("daily snapshot was not saved: {err}"));
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_processed(&self, name: &str, records: usize, current: usize, total: usize) {
        self.spinner.set_message(format!(
            "Extracting [{current}/{total}] {name} ({records} releases)"
        ));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
