//! Guided flow engine — linear step sequencing with per-step gates and a
//! single terminal effect.
//!
//! Every multi-step screen in the app (onboarding, check-in, cool-down,
//! ritual, chat compose) is an instance of [`GuidedFlow`] over a concrete
//! [`FlowSpec`]. The engine owns the step counter and the accumulated step
//! data; the spec supplies the gate predicate and the one store mutation
//! fired when the last step is confirmed.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FlowError;

/// Step-scoped captured values, accumulated across steps and never reset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepData(serde_json::Map<String, Value>);

impl StepData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a captured value under a field key, replacing any prior value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The trimmed string under `key`, if present and non-empty.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether `key` holds a non-empty string.
    pub fn has_text(&self, key: &str) -> bool {
        self.text(key).is_some()
    }

    /// Whether `key` holds a boolean `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Per-flow configuration: step count, gate predicate, terminal effect.
#[async_trait]
pub trait FlowSpec: Send + Sync {
    /// Flow name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Number of steps, fixed per flow. Steps are 1-indexed.
    fn total_steps(&self) -> u32;

    /// Pure gate predicate: may the flow advance past `step`?
    fn can_advance(&self, step: u32, data: &StepData) -> bool;

    /// The single store mutation representing this flow's outcome, fired
    /// when the terminal step is confirmed.
    async fn terminal_effect(&self, data: &StepData) -> Result<(), FlowError>;

    /// Whether the flow exposes a back action.
    fn allows_retreat(&self) -> bool {
        false
    }
}

/// Outcome of an [`GuidedFlow::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The gate was closed (or the flow already completed); nothing changed.
    Held,
    /// Moved to the given step.
    Moved(u32),
    /// The terminal effect ran and the flow is complete.
    Completed,
}

/// One live run of a flow. Not resumable after completion — re-entering a
/// flow means constructing a fresh instance at step 1.
pub struct GuidedFlow<S> {
    spec: S,
    current_step: u32,
    data: StepData,
    completed: bool,
}

impl<S: FlowSpec> GuidedFlow<S> {
    pub fn new(spec: S) -> Self {
        Self {
            spec,
            current_step: 1,
            data: StepData::new(),
            completed: false,
        }
    }

    pub fn spec(&self) -> &S {
        &self.spec
    }

    /// Current step, 1-indexed.
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn data(&self) -> &StepData {
        &self.data
    }

    /// Capture a step-scoped input value. Ignored once the flow completed.
    pub fn capture(&mut self, key: &str, value: impl Into<Value>) {
        if self.completed {
            debug!(flow = self.spec.name(), key, "Ignoring capture after completion");
            return;
        }
        self.data.set(key, value);
    }

    /// Try to advance one step.
    ///
    /// With a closed gate this is a no-op returning [`Advance::Held`]. On
    /// the terminal step it runs the terminal effect exactly once and
    /// latches the flow complete; if the effect fails the flow stays
    /// un-completed on the terminal step and the error propagates, leaving
    /// the flow retryable.
    pub async fn advance(&mut self) -> Result<Advance, FlowError> {
        if self.completed {
            debug!(flow = self.spec.name(), "Advance after completion is a no-op");
            return Ok(Advance::Held);
        }
        if !self.spec.can_advance(self.current_step, &self.data) {
            debug!(
                flow = self.spec.name(),
                step = self.current_step,
                "Gate closed, holding"
            );
            return Ok(Advance::Held);
        }

        if self.current_step < self.spec.total_steps() {
            self.current_step += 1;
            debug!(
                flow = self.spec.name(),
                step = self.current_step,
                "Advanced"
            );
            return Ok(Advance::Moved(self.current_step));
        }

        match self.spec.terminal_effect(&self.data).await {
            Ok(()) => {
                self.completed = true;
                debug!(flow = self.spec.name(), "Flow completed");
                Ok(Advance::Completed)
            }
            Err(e) => {
                warn!(
                    flow = self.spec.name(),
                    error = %e,
                    "Terminal effect failed; flow stays on terminal step"
                );
                Err(e)
            }
        }
    }

    /// Step back one step, floored at 1. Only honored for flows whose spec
    /// exposes a back action, and never after completion.
    pub fn retreat(&mut self) -> u32 {
        if self.spec.allows_retreat() && !self.completed && self.current_step > 1 {
            self.current_step -= 1;
            debug!(
                flow = self.spec.name(),
                step = self.current_step,
                "Retreated"
            );
        }
        self.current_step
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use super::*;

    /// Minimal three-step spec: step 2 gates on a "ready" text field, the
    /// terminal effect counts invocations and can be made to fail.
    struct CountingSpec {
        effects: Arc<AtomicU32>,
        fail_effect: Arc<AtomicBool>,
    }

    #[async_trait]
    impl FlowSpec for CountingSpec {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn total_steps(&self) -> u32 {
            3
        }

        fn can_advance(&self, step: u32, data: &StepData) -> bool {
            match step {
                2 => data.has_text("ready"),
                _ => true,
            }
        }

        async fn terminal_effect(&self, _data: &StepData) -> Result<(), FlowError> {
            if self.fail_effect.load(Ordering::SeqCst) {
                return Err(FlowError::MissingField {
                    flow: "counting",
                    field: "ready",
                });
            }
            self.effects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn allows_retreat(&self) -> bool {
            true
        }
    }

    fn counting_flow() -> (GuidedFlow<CountingSpec>, Arc<AtomicU32>, Arc<AtomicBool>) {
        let effects = Arc::new(AtomicU32::new(0));
        let fail = Arc::new(AtomicBool::new(false));
        let flow = GuidedFlow::new(CountingSpec {
            effects: Arc::clone(&effects),
            fail_effect: Arc::clone(&fail),
        });
        (flow, effects, fail)
    }

    #[tokio::test]
    async fn closed_gate_holds_without_mutating() {
        let (mut flow, effects, _) = counting_flow();

        assert_eq!(flow.advance().await.unwrap(), Advance::Moved(2));

        // Step 2 requires "ready"
        assert_eq!(flow.advance().await.unwrap(), Advance::Held);
        assert_eq!(flow.current_step(), 2);
        assert_eq!(effects.load(Ordering::SeqCst), 0);

        flow.capture("ready", "yes");
        assert_eq!(flow.advance().await.unwrap(), Advance::Moved(3));
    }

    #[tokio::test]
    async fn terminal_effect_fires_exactly_once() {
        let (mut flow, effects, _) = counting_flow();
        flow.capture("ready", "yes");

        flow.advance().await.unwrap();
        flow.advance().await.unwrap();
        assert_eq!(flow.advance().await.unwrap(), Advance::Completed);
        assert!(flow.is_complete());

        // Rapid double-submit: every further advance is a no-op
        for _ in 0..5 {
            assert_eq!(flow.advance().await.unwrap(), Advance::Held);
        }
        assert_eq!(effects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_effect_leaves_flow_retryable() {
        let (mut flow, effects, fail) = counting_flow();
        flow.capture("ready", "yes");
        flow.advance().await.unwrap();
        flow.advance().await.unwrap();

        fail.store(true, Ordering::SeqCst);
        assert!(flow.advance().await.is_err());
        assert!(!flow.is_complete());
        assert_eq!(flow.current_step(), 3);
        assert_eq!(effects.load(Ordering::SeqCst), 0);

        // Retry after the failure clears
        fail.store(false, Ordering::SeqCst);
        assert_eq!(flow.advance().await.unwrap(), Advance::Completed);
        assert_eq!(effects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retreat_floors_at_step_one() {
        let (mut flow, _, _) = counting_flow();
        flow.advance().await.unwrap();
        assert_eq!(flow.current_step(), 2);

        assert_eq!(flow.retreat(), 1);
        assert_eq!(flow.retreat(), 1);
    }

    #[tokio::test]
    async fn retreat_is_refused_after_completion() {
        let (mut flow, _, _) = counting_flow();
        flow.capture("ready", "yes");
        flow.advance().await.unwrap();
        flow.advance().await.unwrap();
        flow.advance().await.unwrap();
        assert!(flow.is_complete());

        assert_eq!(flow.retreat(), 3);
    }

    #[tokio::test]
    async fn capture_after_completion_is_ignored() {
        let (mut flow, _, _) = counting_flow();
        flow.capture("ready", "yes");
        flow.advance().await.unwrap();
        flow.advance().await.unwrap();
        flow.advance().await.unwrap();

        flow.capture("late", "value");
        assert!(flow.data().get("late").is_none());
        // Pre-completion data is still readable
        assert_eq!(flow.data().text("ready"), Some("yes"));
    }

    #[test]
    fn step_data_text_trims_and_filters_empty() {
        let mut data = StepData::new();
        data.set("name", "  Jordan  ");
        data.set("blank", "   ");
        data.set("count", 3);

        assert_eq!(data.text("name"), Some("Jordan"));
        assert!(data.has_text("name"));
        assert!(!data.has_text("blank"));
        assert!(!data.has_text("count"));
        assert!(!data.has_text("missing"));
    }
}
