//! Search state machine.
//!
//! Tracks which phase of the search loop is running and rejects any
//! transition the loop must never make, such as persisting before the
//! panel was reset or selecting a new code in the middle of a cooldown.
//!
//! # States
//!
//! - `Init`: acquiring the device and clearing the panel
//! - `Loading`: reading previously attempted codes
//! - `Selecting`: drawing the next untried code
//! - `Dialing`: pressing presets until the code is shown
//! - `Executing`: long press on execute and device settle
//! - `Resetting`: clearing the panel back to `1000`
//! - `Persisting`: appending the attempt to the durable log
//! - `RateLimited`: waiting out the device's lockout window
//! - `Done`: every code in range was attempted
//! - `Stopped`: interrupted between attempts
//!
//! # Valid Transitions
//!
//! - Init → Loading → Selecting (or RateLimited when starting with a cooldown)
//! - Selecting → Dialing → Executing → Resetting → Persisting
//! - Persisting → Selecting | RateLimited
//! - RateLimited → Selecting | Stopped
//! - Selecting → Done | Stopped
//!
//! # Examples
//!
//! ```
//! use safecode_search::{SearchMachine, SearchState};
//!
//! let mut machine = SearchMachine::new();
//! assert_eq!(machine.current_state(), &SearchState::Init);
//!
//! machine.transition_to(SearchState::Loading).unwrap();
//! assert!(machine.transition_to(SearchState::Persisting).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

use safecode_core::{Error, Result};

/// Maximum number of state transitions to keep in history.
///
/// One attempt is five transitions, so this covers the last dozen or so
/// attempts and their cooldowns.
const MAX_HISTORY_SIZE: usize = 64;

/// Phases of the search loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    /// Acquiring the device and clearing the panel.
    Init,

    /// Reading previously attempted codes.
    Loading,

    /// Drawing the next untried code.
    Selecting,

    /// Pressing presets until the candidate is shown.
    Dialing,

    /// Submitting the candidate with the execute button.
    Executing,

    /// Clearing the panel.
    Resetting,

    /// Appending the attempt to the durable log.
    Persisting,

    /// Waiting out the lockout window.
    RateLimited,

    /// Every code in range was attempted.
    Done,

    /// Interrupted between attempts.
    Stopped,
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            SearchState::Init => "Init",
            SearchState::Loading => "Loading",
            SearchState::Selecting => "Selecting",
            SearchState::Dialing => "Dialing",
            SearchState::Executing => "Executing",
            SearchState::Resetting => "Resetting",
            SearchState::Persisting => "Persisting",
            SearchState::RateLimited => "RateLimited",
            SearchState::Done => "Done",
            SearchState::Stopped => "Stopped",
        };
        write!(f, "{}", state_str)
    }
}

impl SearchState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use safecode_search::SearchState;
    ///
    /// assert!(SearchState::Persisting.can_transition_to(&SearchState::RateLimited));
    /// assert!(!SearchState::RateLimited.can_transition_to(&SearchState::Dialing));
    /// ```
    pub fn can_transition_to(&self, target: &SearchState) -> bool {
        matches!(
            (self, target),
            (SearchState::Init, SearchState::Loading)
                | (SearchState::Loading, SearchState::Selecting | SearchState::RateLimited)
                | (
                    SearchState::Selecting,
                    SearchState::Dialing | SearchState::Done | SearchState::Stopped
                )
                | (SearchState::Dialing, SearchState::Executing)
                | (SearchState::Executing, SearchState::Resetting)
                | (SearchState::Resetting, SearchState::Persisting)
                | (SearchState::Persisting, SearchState::Selecting | SearchState::RateLimited)
                | (SearchState::RateLimited, SearchState::Selecting | SearchState::Stopped)
        )
    }

    /// Whether the search loop has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchState::Done | SearchState::Stopped)
    }

    /// Whether the device is mid-attempt, so interruption is unsafe.
    pub fn is_attempt_in_flight(&self) -> bool {
        matches!(
            self,
            SearchState::Dialing
                | SearchState::Executing
                | SearchState::Resetting
                | SearchState::Persisting
        )
    }
}

/// A single state transition with timestamp.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: SearchState,

    /// The state transitioned to.
    pub to: SearchState,

    /// When the transition occurred.
    pub timestamp: Instant,
}

impl StateTransition {
    /// Create a new state transition record stamped now.
    pub fn new(from: SearchState, to: SearchState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// State machine for the search loop.
///
/// Validates every transition and keeps a bounded history.
#[derive(Debug)]
pub struct SearchMachine {
    current_state: SearchState,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
}

impl SearchMachine {
    /// Create a machine in the `Init` state.
    pub fn new() -> Self {
        Self {
            current_state: SearchState::Init,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// The current state.
    pub fn current_state(&self) -> &SearchState {
        &self.current_state
    }

    /// Time spent in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// The last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not
    /// allowed from the current state; the machine is left unchanged.
    pub fn transition_to(&mut self, new_state: SearchState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        trace!(from = %transition.from, to = %transition.to, "Search state change");

        self.current_state = new_state;
        self.state_entered_at = transition.timestamp;
        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(transition)
    }
}

impl Default for SearchMachine {
    fn default() -> Self {
        Self::new()
    }
}
