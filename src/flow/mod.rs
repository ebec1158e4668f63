//! Guided flows — the generic step engine and the five concrete flows
//! built on it.

pub mod chat;
pub mod check_in;
pub mod cool_down;
pub mod engine;
pub mod onboarding;
pub mod ritual;

pub use chat::ComposeFlow;
pub use check_in::CheckInFlow;
pub use cool_down::{BreathingDisplay, BreathingPhase, CoolDownFlow, CoolDownSession};
pub use engine::{Advance, FlowSpec, GuidedFlow, StepData};
pub use onboarding::OnboardingFlow;
pub use ritual::RitualFlow;
