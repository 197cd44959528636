//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use regwatch_core::{
    MonitorConfig, ProgressReporter, RunSummary, SourceReport, configured_sources, run_monitor,
};
use regwatch_digest::SmtpDigestTransport;
use regwatch_shared::{
    AppConfig, EmailCredentials, config_file_path, init_config_at, load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// regwatch: track ESG regulatory developments across regulator feeds.
#[derive(Parser)]
#[command(
    name = "regwatch",
    version,
    about = "Monitor regulator feeds for ESG regulations and send a weekly digest.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.regwatch/regwatch.toml).
    #[arg(long, global = true, env = "REGWATCH_CONFIG")]
    pub config: Option<PathBuf>,

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
    /// Run one monitoring pass over every configured source.
    Run {
        /// Use the Google News backfill catalog instead of the regular sources.
        #[arg(long)]
        backfill: bool,

        /// Fetch and classify, but write nothing and send nothing.
        #[arg(long)]
        dry_run: bool,

        /// Never send the digest this run.
        #[arg(long)]
        no_email: bool,

        /// Send the digest even if today is not the digest weekday.
        #[arg(long, conflicts_with = "no_email")]
        force_digest: bool,

        /// Record store path (overrides `defaults.store_path`).
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// List the sources a run would monitor.
    Sources {
        /// Show the backfill catalog instead.
        #[arg(long)]
        backfill: bool,
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
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
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
        0 => "regwatch=info",
        1 => "regwatch=debug",
        _ => "regwatch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Run {
            backfill,
            dry_run,
            no_email,
            force_digest,
            store,
        } => {
            let flags = RunFlags {
                backfill,
                dry_run,
                no_email,
                force_digest,
                store,
            };
            cmd_run(config_path.as_deref(), flags).await
        }
        Command::Sources { backfill } => cmd_sources(config_path.as_deref(), backfill),
        Command::Config { action } => match action {
            ConfigAction::Init { force } => cmd_config_init(config_path.as_deref(), force),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

/// `--config` when given, otherwise the default location.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

struct RunFlags {
    backfill: bool,
    dry_run: bool,
    no_email: bool,
    force_digest: bool,
    store: Option<PathBuf>,
}

async fn cmd_run(config_path: Option<&Path>, flags: RunFlags) -> Result<()> {
    let app = resolve_config(config_path)?;
    let today = chrono::Local::now().date_naive();

    let sources = configured_sources(&app, flags.backfill);
    if sources.is_empty() {
        return Err(eyre!(
            "no sources configured: enable sources.builtin or add [[sources.custom]]"
        ));
    }

    let mut config = MonitorConfig::from_app(&app, sources, today);
    if let Some(store) = flags.store {
        config.store_path = store;
    }
    config.dry_run = flags.dry_run;
    config.email_enabled = !flags.no_email;
    config.digest.force = flags.force_digest;

    info!(
        sources = config.sources.len(),
        store = %config.store_path.display(),
        backfill = flags.backfill,
        dry_run = config.dry_run,
        "starting monitoring run"
    );

    let credentials = EmailCredentials::from_env();
    let transport = SmtpDigestTransport::from_config(&app.digest);
    let reporter = CliProgress::new();

    let summary = run_monitor(&config, credentials, &transport, &reporter).await?;
    print_summary(&summary);

    if summary.all_sources_failed() {
        return Err(eyre!(
            "all {} sources failed; check network access and feed URLs",
            summary.sources.len()
        ));
    }
    if let Some(error) = &summary.store_error {
        return Err(eyre!("record store not written: {error}"));
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    if summary.dry_run {
        println!("  Dry run: nothing was written or sent.");
    }
    println!("  Run date:  {}", summary.run_date);
    println!(
        "  Sources:   {} ({} failed)",
        summary.sources.len(),
        summary.failed_sources()
    );
    println!("  New:       {}", summary.new_records);
    println!("  Total:     {}", summary.total_records);
    if summary.skipped_records > 0 {
        println!("  Skipped:   {} unreadable stored records", summary.skipped_records);
    }
    if let Some(path) = &summary.quarantined {
        println!("  Original store kept at {}", path.display());
    }
    match (&summary.store_error, summary.store_written) {
        (Some(error), _) => println!("  Store:     failed: {error}"),
        (None, true) => println!("  Store:     written"),
        (None, false) => println!("  Store:     not written"),
    }
    println!("  Dashboard: {}", summary.dashboard);
    println!("  Digest:    {}", summary.digest);
    println!("  Time:      {:.1}s", summary.elapsed.as_secs_f64());

    let failed: Vec<&SourceReport> = summary.sources.iter().filter(|s| s.failed()).collect();
    if !failed.is_empty() {
        println!();
        println!("  Failed sources:");
        for report in failed {
            let reason = report
                .failures
                .first()
                .map(|f| f.error.as_str())
                .unwrap_or("unknown error");
            println!("    {:<24} {reason}", report.id);
        }
    }
    println!();
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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn source_started(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {name}"));
    }

    fn source_finished(&self, report: &SourceReport) {
        if report.failed() {
            self.spinner
                .println(format!("  ✗ {}: every feed failed", report.name));
        } else if report.added > 0 {
            self.spinner
                .println(format!("  + {}: {} new", report.name, report.added));
        }
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// sources
// ---------------------------------------------------------------------------

fn cmd_sources(config_path: Option<&Path>, backfill: bool) -> Result<()> {
    let app = resolve_config(config_path)?;
    let sources = configured_sources(&app, backfill);

    if sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    println!(
        "{:<26} {:<14} {:<14} {:>5}  NAME",
        "ID", "CATEGORY", "JURISDICTION", "FEEDS"
    );
    for source in &sources {
        let feeds = match source.feed_urls() {
            Ok(urls) => urls.len().to_string(),
            Err(e) => {
                warn!(source = %source.id, error = %e, "invalid feed URL");
                "!".into()
            }
        };
        println!(
            "{:<26} {:<14} {:<14} {:>5}  {}",
            source.id,
            source.category.as_str(),
            source.jurisdiction,
            feeds,
            source.name
        );
    }
    println!();
    println!("{} sources", sources.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    if path.exists() && !force {
        return Err(eyre!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }
    init_config_at(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
