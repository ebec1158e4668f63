//! Onboarding flow — four steps from welcome to a configured relationship.
//!
//! Steps: welcome → partner info → relationship date → timezones. The
//! terminal effect installs the partner and start date in the store; the
//! bootstrap layer flips the "onboarded" flag when it sees the flow
//! complete.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::FlowError;
use crate::store::{Participant, RelationshipStore};

use super::engine::{FlowSpec, GuidedFlow, StepData};

pub const TOTAL_STEPS: u32 = 4;

/// Default avatar for a partner created through onboarding; they pick their
/// own glyph when they first sign in.
const DEFAULT_PARTNER_AVATAR: &str = "🧑";

/// Step-data field keys.
pub mod fields {
    pub const PARTNER_NAME: &str = "partner_name";
    pub const PARTNER_EMAIL: &str = "partner_email";
    pub const RELATIONSHIP_START: &str = "relationship_start";
    pub const USER_TIMEZONE: &str = "user_timezone";
    pub const PARTNER_TIMEZONE: &str = "partner_timezone";
}

/// Title shown above each step.
pub fn step_title(step: u32) -> &'static str {
    match step {
        1 => "Welcome to LoveSync",
        2 => "Your partner",
        3 => "When did it all start?",
        4 => "Where are you both?",
        _ => "",
    }
}

/// Spec for the onboarding flow.
pub struct OnboardingFlow {
    store: Arc<RelationshipStore>,
}

impl OnboardingFlow {
    /// Start a fresh onboarding run.
    pub fn start(store: Arc<RelationshipStore>) -> GuidedFlow<Self> {
        GuidedFlow::new(Self { store })
    }
}

#[async_trait]
impl FlowSpec for OnboardingFlow {
    fn name(&self) -> &'static str {
        "onboarding"
    }

    fn total_steps(&self) -> u32 {
        TOTAL_STEPS
    }

    fn can_advance(&self, step: u32, data: &StepData) -> bool {
        match step {
            1 => true,
            2 => data.has_text(fields::PARTNER_NAME) && data.has_text(fields::PARTNER_EMAIL),
            3 => data.has_text(fields::RELATIONSHIP_START),
            4 => data.has_text(fields::USER_TIMEZONE) && data.has_text(fields::PARTNER_TIMEZONE),
            _ => false,
        }
    }

    async fn terminal_effect(&self, data: &StepData) -> Result<(), FlowError> {
        let name = data
            .text(fields::PARTNER_NAME)
            .ok_or(FlowError::MissingField {
                flow: "onboarding",
                field: fields::PARTNER_NAME,
            })?;
        let email = data
            .text(fields::PARTNER_EMAIL)
            .ok_or(FlowError::MissingField {
                flow: "onboarding",
                field: fields::PARTNER_EMAIL,
            })?;
        let start_raw =
            data.text(fields::RELATIONSHIP_START)
                .ok_or(FlowError::MissingField {
                    flow: "onboarding",
                    field: fields::RELATIONSHIP_START,
                })?;
        let user_timezone =
            data.text(fields::USER_TIMEZONE)
                .ok_or(FlowError::MissingField {
                    flow: "onboarding",
                    field: fields::USER_TIMEZONE,
                })?;
        let partner_timezone =
            data.text(fields::PARTNER_TIMEZONE)
                .ok_or(FlowError::MissingField {
                    flow: "onboarding",
                    field: fields::PARTNER_TIMEZONE,
                })?;

        let start_date = NaiveDate::parse_from_str(start_raw, "%Y-%m-%d").map_err(|e| {
            FlowError::InvalidField {
                flow: "onboarding",
                field: fields::RELATIONSHIP_START,
                reason: e.to_string(),
            }
        })?;

        let partner = Participant::new(name, DEFAULT_PARTNER_AVATAR, email, partner_timezone);
        self.store
            .apply_onboarding(partner, start_date, user_timezone)
            .await;
        Ok(())
    }
}
