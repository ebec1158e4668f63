//! Cool-down flow — guided conflict resolution in three steps.
//!
//! Step 1 is a timed breathing exercise: its gate opens only when the
//! configured breathing period has elapsed, driven by a one-shot timer
//! rather than user input. A separate 1-second ticker cycles the 4-7-8
//! breathing display. Both timers are owned by the [`CoolDownSession`] and
//! aborted when it is dropped, so navigating away mid-exercise cannot
//! mutate a torn-down flow.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{
    BREATHING_EXHALE_SECS, BREATHING_HOLD_SECS, BREATHING_INHALE_SECS, CoolDownConfig,
};
use crate::error::FlowError;
use crate::store::RelationshipStore;

use super::engine::{FlowSpec, GuidedFlow, StepData};

pub const TOTAL_STEPS: u32 = 3;

/// Canned partner statement shown on the empathy step until partner sync
/// exists.
pub const PARTNER_STATEMENT: &str =
    "I feel overwhelmed because I thought you weren't listening to me";

/// Step-data field keys.
pub mod fields {
    /// Set by the auto-advance timer once the breathing period elapses.
    pub const BREATHING_ELAPSED: &str = "breathing_elapsed";
    /// The user's "I feel…" statement.
    pub const STATEMENT: &str = "statement";
}

/// Spec for the cool-down flow.
pub struct CoolDownFlow {
    store: Arc<RelationshipStore>,
}

impl CoolDownFlow {
    /// Start a bare flow with no timers attached. Prefer
    /// [`CoolDownSession::begin`] outside of tests.
    pub fn start(store: Arc<RelationshipStore>) -> GuidedFlow<Self> {
        GuidedFlow::new(Self { store })
    }
}

#[async_trait]
impl FlowSpec for CoolDownFlow {
    fn name(&self) -> &'static str {
        "cool_down"
    }

    fn total_steps(&self) -> u32 {
        TOTAL_STEPS
    }

    fn can_advance(&self, step: u32, data: &StepData) -> bool {
        match step {
            // No amount of clicking skips the breathing exercise
            1 => data.flag(fields::BREATHING_ELAPSED),
            2 => data.has_text(fields::STATEMENT),
            3 => true,
            _ => false,
        }
    }

    async fn terminal_effect(&self, _data: &StepData) -> Result<(), FlowError> {
        self.store.resolve_conflict().await;
        Ok(())
    }
}

/// Phases of the 4-7-8 breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathingPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathingPhase {
    pub fn duration_secs(&self) -> u64 {
        match self {
            Self::Inhale => BREATHING_INHALE_SECS,
            Self::Hold => BREATHING_HOLD_SECS,
            Self::Exhale => BREATHING_EXHALE_SECS,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Inhale => Self::Hold,
            Self::Hold => Self::Exhale,
            Self::Exhale => Self::Inhale,
        }
    }
}

impl std::fmt::Display for BreathingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inhale => write!(f, "inhale"),
            Self::Hold => write!(f, "hold"),
            Self::Exhale => write!(f, "exhale"),
        }
    }
}

/// What the breathing circle shows right now.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BreathingDisplay {
    pub phase: BreathingPhase,
    pub seconds_remaining: u64,
}

impl BreathingDisplay {
    fn initial() -> Self {
        Self {
            phase: BreathingPhase::Inhale,
            seconds_remaining: BreathingPhase::Inhale.duration_secs(),
        }
    }
}

/// Abort-on-drop guard for a spawned timer task.
struct TimerGuard {
    handle: JoinHandle<()>,
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A live cool-down run: the flow plus its two timers.
///
/// Dropping the session aborts both timer tasks; a session abandoned
/// before its terminal step leaves no trace in the store.
pub struct CoolDownSession {
    flow: Arc<Mutex<GuidedFlow<CoolDownFlow>>>,
    display: watch::Receiver<BreathingDisplay>,
    _auto_advance: TimerGuard,
    _phase_ticker: TimerGuard,
}

impl CoolDownSession {
    /// Start a cool-down run and spawn its timers.
    pub fn begin(store: Arc<RelationshipStore>, config: &CoolDownConfig) -> Self {
        let flow = Arc::new(Mutex::new(CoolDownFlow::start(store)));

        let (display_tx, display_rx) = watch::channel(BreathingDisplay::initial());
        let phase_ticker = TimerGuard {
            handle: spawn_phase_ticker(display_tx, config.tick),
        };
        let auto_advance = TimerGuard {
            handle: spawn_auto_advance(Arc::clone(&flow), config.breathing),
        };

        Self {
            flow,
            display: display_rx,
            _auto_advance: auto_advance,
            _phase_ticker: phase_ticker,
        }
    }

    /// Shared handle to the underlying flow.
    pub fn flow(&self) -> Arc<Mutex<GuidedFlow<CoolDownFlow>>> {
        Arc::clone(&self.flow)
    }

    /// Receiver for breathing-display updates.
    pub fn display(&self) -> watch::Receiver<BreathingDisplay> {
        self.display.clone()
    }
}

/// One-shot timer: after `delay`, open the breathing gate and advance the
/// flow off step 1. Fires once; independent of the display cycle.
fn spawn_auto_advance(
    flow: Arc<Mutex<GuidedFlow<CoolDownFlow>>>,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let mut flow = flow.lock().await;
        if flow.is_complete() || flow.current_step() != 1 {
            return;
        }
        flow.capture(fields::BREATHING_ELAPSED, true);
        match flow.advance().await {
            Ok(_) => debug!("Breathing period elapsed, advanced to statement step"),
            Err(e) => warn!(error = %e, "Auto-advance failed"),
        }
    })
}

/// Periodic ticker cycling the 4-7-8 display. Runs until aborted.
fn spawn_phase_ticker(
    display_tx: watch::Sender<BreathingDisplay>,
    tick: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        // Skip immediate first tick
        interval.tick().await;

        let mut phase = BreathingPhase::Inhale;
        let mut remaining = phase.duration_secs();

        loop {
            interval.tick().await;
            if remaining > 1 {
                remaining -= 1;
            } else {
                phase = phase.next();
                remaining = phase.duration_secs();
            }
            if display_tx
                .send(BreathingDisplay {
                    phase,
                    seconds_remaining: remaining,
                })
                .is_err()
            {
                // All receivers dropped
                break;
            }
        }
    })
}
