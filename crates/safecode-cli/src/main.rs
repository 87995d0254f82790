//! safecode binary.
//!
//! # Usage
//!
//! ```bash
//! # Dry run against the simulated panel, every wait shortened 1000x.
//! # codes.txt is read for resume but never written by the mock driver.
//! safecode --driver mock --time-scale 0.001 run --max 20
//!
//! # Real search on a LabJack U3, resuming from codes.txt
//! safecode --driver labjack run
//!
//! # How far along is the search?
//! safecode status
//!
//! # Wiring check: dial 0005 without pressing execute
//! safecode --driver labjack dial 0005
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use safecode_core::SecurityCode;
use safecode_core::constants::{
    DEFAULT_ATTEMPT_LOG, DEFAULT_ATTEMPTS_PER_WINDOW, DEFAULT_COOLDOWN_SECS, DEFAULT_MAX_CODE,
};
use safecode_hardware::mock::MockPins;
use safecode_hardware::{AnyPinDriver, TokioClock};
use safecode_panel::{ButtonPanel, CodeEntrySequencer};
use safecode_search::{SearchConfig, SearchOutcome, SearchScheduler};
use safecode_storage::{AttemptStore, FileAttemptStore, MemoryAttemptStore};

/// Brute-force search over a rotary-button security panel
#[derive(Parser, Debug)]
#[command(name = "safecode")]
#[command(about = "Dial and submit untried codes on a rotary-button security panel")]
#[command(version)]
struct Cli {
    /// Attempt log, one code per line
    #[arg(long, default_value = DEFAULT_ATTEMPT_LOG, global = true)]
    log: PathBuf,

    /// Pin driver backend
    #[arg(long, value_enum, default_value_t = DriverKind::Mock, global = true)]
    driver: DriverKind,

    /// Multiply every wait by this factor (use with the mock driver)
    #[arg(long, default_value_t = 1.0, global = true)]
    time_scale: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the search until every code in range was tried
    Run(RunArgs),

    /// Report search progress from the attempt log
    Status {
        /// Exclusive upper bound of the searched range
        #[arg(long, default_value_t = DEFAULT_MAX_CODE)]
        max: u16,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dial a code on the panel without executing it
    Dial {
        /// Code to dial, e.g. 0005
        code: SecurityCode,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Exclusive upper bound of the searched range
    #[arg(long, default_value_t = DEFAULT_MAX_CODE)]
    max: u16,

    /// Attempts allowed before each cooldown
    #[arg(long, default_value_t = DEFAULT_ATTEMPTS_PER_WINDOW)]
    attempts_per_window: u32,

    /// Cooldown length in seconds
    #[arg(long, default_value_t = DEFAULT_COOLDOWN_SECS)]
    cooldown_secs: u64,

    /// Seed for candidate selection
    #[arg(long)]
    seed: Option<u64>,

    /// Wait out one cooldown before the first attempt
    #[arg(long)]
    cooldown_on_start: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX_CODE,
            attempts_per_window: DEFAULT_ATTEMPTS_PER_WINDOW,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            seed: None,
            cooldown_on_start: false,
        }
    }
}

impl RunArgs {
    fn to_config(&self) -> SearchConfig {
        let config = SearchConfig::new(self.max)
            .attempts_per_window(self.attempts_per_window)
            .cooldown(Duration::from_secs(self.cooldown_secs))
            .cooldown_on_start(self.cooldown_on_start);
        match self.seed {
            Some(seed) => config.seed(seed),
            None => config,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DriverKind {
    /// Simulated panel, no hardware
    Mock,
    /// LabJack U3 over USB
    Labjack,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let clock = TokioClock::scaled(cli.time_scale);
    match cli.command {
        None => run(&cli.log, cli.driver, clock, RunArgs::default()).await,
        Some(Command::Run(args)) => run(&cli.log, cli.driver, clock, args).await,
        Some(Command::Status { max, json }) => status(&cli.log, max, json).await,
        Some(Command::Dial { code }) => dial(cli.driver, clock, code).await,
    }
}

async fn run(log: &Path, driver: DriverKind, clock: TokioClock, args: RunArgs) -> anyhow::Result<()> {
    let config = args.to_config();
    tracing::info!(
        driver = ?driver,
        log = %log.display(),
        range = config.max_code,
        "safecode starting"
    );

    let driver = open_driver(driver)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current attempt");
            let _ = shutdown_tx.send(true);
        }
    });

    if driver.is_mock() {
        // Simulated attempts resume from the log but must not land in it
        let history = FileAttemptStore::new(log)
            .read_log()
            .await
            .with_context(|| format!("failed to read {}", log.display()))?;
        tracing::warn!(
            log = %log.display(),
            "Mock driver: attempts are kept in memory, the log is left untouched"
        );
        let store = MemoryAttemptStore::with_records(history.codes);
        search(driver, clock, store, config, shutdown_rx).await
    } else {
        search(driver, clock, FileAttemptStore::new(log), config, shutdown_rx).await
    }
}

async fn search<S: AttemptStore>(
    driver: AnyPinDriver,
    clock: TokioClock,
    store: S,
    config: SearchConfig,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let mut scheduler = SearchScheduler::new(driver, clock, store, config)
        .context("invalid search configuration")?
        .with_shutdown(shutdown);
    let summary = scheduler.run().await.context("search aborted")?;

    match summary.outcome {
        SearchOutcome::Exhausted => tracing::info!(
            tried = summary.tried_total,
            "Every code in range was tried"
        ),
        SearchOutcome::Interrupted => tracing::info!(
            remaining = scheduler.remaining(),
            "Search stopped; rerun to resume"
        ),
    }
    Ok(())
}

async fn status(log: &Path, max: u16, json: bool) -> anyhow::Result<()> {
    let parsed = FileAttemptStore::new(log)
        .read_log()
        .await
        .with_context(|| format!("failed to read {}", log.display()))?;
    let tried = parsed.tried();
    let in_range = tried.count_below(max);
    let remaining = usize::from(max).saturating_sub(in_range);

    if json {
        let report = serde_json::json!({
            "log": log.display().to_string(),
            "range": max,
            "records": parsed.record_count(),
            "malformed": parsed.malformed.len(),
            "tried": in_range,
            "remaining": remaining,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Attempt log:  {}", log.display());
        println!("Records:      {}", parsed.record_count());
        println!("Malformed:    {}", parsed.malformed.len());
        println!("Tried:        {in_range} of {max}");
        println!("Remaining:    {remaining}");
    }
    Ok(())
}

async fn dial(driver: DriverKind, clock: TokioClock, code: SecurityCode) -> anyhow::Result<()> {
    let driver = open_driver(driver)?;
    let mut panel = ButtonPanel::new(driver, clock);
    panel.initialize().await.context("failed to initialize panel")?;

    let report = CodeEntrySequencer::new()
        .dial(&mut panel, code)
        .await
        .with_context(|| format!("failed to dial {code}"))?;

    tracing::info!(%code, presses = ?report.presses, total = report.total(), "Code dialed; not executed");
    Ok(())
}

fn open_driver(kind: DriverKind) -> anyhow::Result<AnyPinDriver> {
    match kind {
        DriverKind::Mock => {
            let (pins, _handle) = MockPins::new();
            Ok(AnyPinDriver::Mock(pins))
        }
        #[cfg(feature = "hardware-labjack")]
        DriverKind::Labjack => {
            let device = safecode_hardware::labjack::LabJackU3::open()
                .context("failed to open LabJack U3")?;
            Ok(AnyPinDriver::LabJack(device))
        }
        #[cfg(not(feature = "hardware-labjack"))]
        DriverKind::Labjack => {
            anyhow::bail!("built without LabJack support; rebuild with --features hardware-labjack")
        }
    }
}
