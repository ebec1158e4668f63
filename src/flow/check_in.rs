//! Daily check-in flow — pick an emotion, optionally add a note.
//!
//! Two input steps; the confirmation screen the app shows afterwards is
//! presentation and owns no state. The terminal effect records today's
//! self entry in the store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FlowError;
use crate::store::{Emotion, RelationshipStore};

use super::engine::{FlowSpec, GuidedFlow, StepData};

pub const TOTAL_STEPS: u32 = 2;

/// Step-data field keys.
pub mod fields {
    pub const EMOTION: &str = "emotion";
    pub const NOTE: &str = "note";
}

/// Spec for the daily check-in flow.
pub struct CheckInFlow {
    store: Arc<RelationshipStore>,
}

impl CheckInFlow {
    /// Start a fresh check-in run.
    pub fn start(store: Arc<RelationshipStore>) -> GuidedFlow<Self> {
        GuidedFlow::new(Self { store })
    }
}

#[async_trait]
impl FlowSpec for CheckInFlow {
    fn name(&self) -> &'static str {
        "daily_check_in"
    }

    fn total_steps(&self) -> u32 {
        TOTAL_STEPS
    }

    fn can_advance(&self, step: u32, data: &StepData) -> bool {
        match step {
            // A recognized emotion must be selected before moving on
            1 => data
                .text(fields::EMOTION)
                .and_then(Emotion::from_tag)
                .is_some(),
            // The note is optional
            2 => true,
            _ => false,
        }
    }

    async fn terminal_effect(&self, data: &StepData) -> Result<(), FlowError> {
        let emotion = data
            .text(fields::EMOTION)
            .and_then(Emotion::from_tag)
            .ok_or(FlowError::MissingField {
                flow: "daily_check_in",
                field: fields::EMOTION,
            })?;
        let note = data.text(fields::NOTE).map(str::to_string);

        self.store.record_check_in(emotion, note).await?;
        Ok(())
    }
}
