//! Search scheduler: the attempt loop.
//!
//! Owns the panel, the attempt store and the rate window for the whole run.
//! Every attempt runs to completion in a fixed order:
//!
//! ```text
//! select → dial → execute → reset → persist → (cooldown) → select ...
//! ```
//!
//! Any hardware or storage error aborts the run. A shutdown request is only
//! honoured between attempts, so an interrupted run never loses a code that
//! was submitted to the device.

use chrono::{Local, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info};

use safecode_core::SecurityCode;
use safecode_hardware::{Clock, PinDriver};
use safecode_panel::{ButtonPanel, CodeEntrySequencer, ExecutionController};
use safecode_storage::{AttemptStore, TriedSet};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::rate_limit::RateLimiter;
use crate::state_machine::{SearchMachine, SearchState, StateTransition};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Every code in range has been attempted.
    Exhausted,
    /// Shutdown was requested between attempts.
    Interrupted,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    /// Whether the range was exhausted or the run was interrupted.
    pub outcome: SearchOutcome,
    /// Attempts made by this run.
    pub attempts: usize,
    /// Cooldowns completed by this run.
    pub cooldowns: u32,
    /// Codes in range attempted overall, including earlier runs.
    pub tried_total: usize,
    /// Preset presses issued by this run.
    pub presses: u64,
}

/// Drives the search until the range is exhausted or shutdown is requested.
pub struct SearchScheduler<D, C, S> {
    panel: ButtonPanel<D, C>,
    sequencer: CodeEntrySequencer,
    executor: ExecutionController,
    store: S,
    limiter: RateLimiter,
    machine: SearchMachine,
    tried: TriedSet,
    config: SearchConfig,
    rng: StdRng,
    shutdown: Option<watch::Receiver<bool>>,
    attempts: usize,
}

impl<D: PinDriver, C: Clock, S: AttemptStore> SearchScheduler<D, C, S> {
    /// Create a scheduler. Nothing touches the device until [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(driver: D, clock: C, store: S, config: SearchConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            panel: ButtonPanel::with_timing(driver, clock, config.panel_timing),
            sequencer: CodeEntrySequencer::new(),
            executor: ExecutionController::new(config.execute_timing),
            store,
            limiter: RateLimiter::new(config.attempts_per_window, config.cooldown),
            machine: SearchMachine::new(),
            tried: TriedSet::new(),
            config,
            rng,
            shutdown: None,
            attempts: 0,
        })
    }

    /// Stop between attempts once `shutdown` reads `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run the search to completion.
    ///
    /// # Errors
    ///
    /// Returns the first hardware or storage error; the run is over at that
    /// point and [`state`](Self::state) tells where it failed.
    pub async fn run(&mut self) -> Result<SearchSummary> {
        let result = self.run_inner().await;
        if let Err(e) = &result {
            let state = self.state();
            error!(
                state = %state,
                attempt_in_flight = state.is_attempt_in_flight(),
                error = %e,
                "Search aborted"
            );
        }
        result
    }

    async fn run_inner(&mut self) -> Result<SearchSummary> {
        self.panel.initialize().await?;
        self.enter(SearchState::Loading)?;

        self.tried = self.store.load().await?;
        info!(
            range = self.config.max_code,
            tried = self.tried.count_below(self.config.max_code),
            remaining = self.remaining(),
            "Search starting"
        );

        if self.config.cooldown_on_start && self.remaining() > 0 {
            self.enter(SearchState::RateLimited)?;
            if !self.cool_down().await {
                return self.finish(SearchState::Stopped);
            }
        }
        self.enter(SearchState::Selecting)?;

        loop {
            if self.shutdown_requested() {
                return self.finish(SearchState::Stopped);
            }
            let Some(code) = self.select() else {
                return self.finish(SearchState::Done);
            };

            self.attempt(code).await?;

            if self.limiter.record_attempt() && self.remaining() > 0 {
                self.enter(SearchState::RateLimited)?;
                if !self.cool_down().await {
                    return self.finish(SearchState::Stopped);
                }
            }
            self.enter(SearchState::Selecting)?;
        }
    }

    /// One full attempt: dial, execute, reset, persist.
    async fn attempt(&mut self, code: SecurityCode) -> Result<()> {
        self.enter(SearchState::Dialing)?;
        info!(
            "Trying code {} ({} of {})",
            code,
            self.tried.count_below(self.config.max_code) + 1,
            self.config.max_code
        );
        self.sequencer.dial(&mut self.panel, code).await?;

        self.enter(SearchState::Executing)?;
        self.executor.execute(&mut self.panel).await?;

        self.enter(SearchState::Resetting)?;
        self.panel.reset().await?;

        // Durable first: the log is the only truth after a crash
        self.enter(SearchState::Persisting)?;
        self.store.record(code).await?;
        self.tried.insert(code);
        self.attempts += 1;
        Ok(())
    }

    /// Draw an untried code from `[0, max_code)`, or `None` once exhausted.
    fn select(&mut self) -> Option<SecurityCode> {
        if self.remaining() == 0 {
            return None;
        }
        loop {
            let candidate = SecurityCode::new(self.rng.gen_range(0..self.config.max_code)).ok()?;
            if !self.tried.contains(candidate) {
                return Some(candidate);
            }
        }
    }

    /// Wait out the cooldown. Returns `false` if shutdown cut it short.
    async fn cool_down(&mut self) -> bool {
        let cooldown = self.limiter.cooldown();
        let now = Local::now();
        let resume = TimeDelta::from_std(cooldown)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta));
        match resume {
            Some(resume) => info!(
                "Waiting since {} (resuming around {})",
                now.format("%I:%M %p"),
                resume.format("%I:%M %p")
            ),
            None => info!("Waiting since {}", now.format("%I:%M %p")),
        }

        let wait = self.panel.clock().sleep(cooldown);
        match self.shutdown.as_mut() {
            Some(shutdown) => {
                tokio::select! {
                    _ = wait => {}
                    _ = shutdown_signalled(shutdown) => {
                        info!("Shutdown requested during cooldown");
                        return false;
                    }
                }
            }
            None => wait.await,
        }

        self.limiter.complete_cooldown();
        debug!(
            cooldowns = self.limiter.cooldowns_completed(),
            waited = ?self.machine.time_in_current_state(),
            "Cooldown complete"
        );
        true
    }

    fn enter(&mut self, state: SearchState) -> Result<StateTransition> {
        Ok(self.machine.transition_to(state)?)
    }

    fn finish(&mut self, state: SearchState) -> Result<SearchSummary> {
        self.enter(state)?;
        let outcome = match state {
            SearchState::Done => SearchOutcome::Exhausted,
            _ => SearchOutcome::Interrupted,
        };
        let summary = self.summary(outcome);
        info!(
            outcome = ?summary.outcome,
            attempts = summary.attempts,
            cooldowns = summary.cooldowns,
            tried = summary.tried_total,
            "Search finished"
        );
        Ok(summary)
    }

    fn summary(&self, outcome: SearchOutcome) -> SearchSummary {
        SearchSummary {
            outcome,
            attempts: self.attempts,
            cooldowns: self.limiter.cooldowns_completed(),
            tried_total: self.tried.count_below(self.config.max_code),
            presses: self.panel.press_count(),
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Codes in range not yet attempted.
    pub fn remaining(&self) -> usize {
        usize::from(self.config.max_code) - self.tried.count_below(self.config.max_code)
    }

    /// The current search state.
    pub fn state(&self) -> SearchState {
        *self.machine.current_state()
    }

    /// The state machine, with its transition history.
    pub fn machine(&self) -> &SearchMachine {
        &self.machine
    }

    /// Codes attempted so far, including those loaded from the store.
    pub fn tried(&self) -> &TriedSet {
        &self.tried
    }

    /// The panel.
    pub fn panel(&self) -> &ButtonPanel<D, C> {
        &self.panel
    }

    /// The attempt store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The configuration in effect.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

/// Resolves once the flag reads `true`. A dropped sender never resolves.
async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
