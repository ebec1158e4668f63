//! Ritual flow — review the active ritual, work through its instructions,
//! and record completion.
//!
//! Two steps: overview → instructions. The instructions step exposes a
//! back action; completing it bumps the completed-rituals counter without
//! touching progress flags or auto-selecting a successor.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::FlowError;
use crate::store::{Difficulty, RelationshipStore, Ritual, RitualProgress};

use super::engine::{FlowSpec, GuidedFlow, StepData};

pub const TOTAL_STEPS: u32 = 2;

/// Spec for the ritual flow.
pub struct RitualFlow {
    store: Arc<RelationshipStore>,
}

impl RitualFlow {
    /// Start a fresh ritual run.
    pub fn start(store: Arc<RelationshipStore>) -> GuidedFlow<Self> {
        GuidedFlow::new(Self { store })
    }
}

#[async_trait]
impl FlowSpec for RitualFlow {
    fn name(&self) -> &'static str {
        "ritual"
    }

    fn total_steps(&self) -> u32 {
        TOTAL_STEPS
    }

    fn can_advance(&self, step: u32, _data: &StepData) -> bool {
        // Neither step collects gated input; completion is the only commitment
        step <= TOTAL_STEPS
    }

    async fn terminal_effect(&self, _data: &StepData) -> Result<(), FlowError> {
        self.store.complete_ritual().await?;
        Ok(())
    }

    fn allows_retreat(&self) -> bool {
        true
    }
}

fn ritual(
    title: &str,
    description: &str,
    duration: &str,
    category: &str,
    difficulty: Difficulty,
    benefits: &[&str],
    instructions: &[&str],
) -> Ritual {
    Ritual {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: description.to_string(),
        duration: duration.to_string(),
        category: category.to_string(),
        difficulty,
        benefits: benefits.iter().map(|s| s.to_string()).collect(),
        instructions: instructions.iter().map(|s| s.to_string()).collect(),
        progress: RitualProgress::default(),
    }
}

/// The built-in ritual catalog, in display order. Each call returns fresh
/// instances with zeroed progress.
pub fn catalog() -> Vec<Ritual> {
    vec![
        ritual(
            "Daily Gratitude",
            "Share one thing you're grateful for about your partner every day",
            "7 days",
            "Appreciation",
            Difficulty::Easy,
            &[
                "Increases positivity",
                "Strengthens bond",
                "Builds appreciation",
            ],
            &[
                "Think of something specific your partner did that you appreciate",
                "Write it down or say it out loud",
                "Share it with your partner through the app",
                "Take turns - one person shares each day",
            ],
        ),
        ritual(
            "Parallel Sunset",
            "Watch the sunset together over video call, no matter the time difference",
            "3 days",
            "Connection",
            Difficulty::Medium,
            &[
                "Shared experiences",
                "Romantic connection",
                "Mindfulness",
            ],
            &[
                "Find sunset time in both your locations",
                "Schedule a video call for the earlier sunset",
                "Watch in comfortable silence together",
                "Share one word about how it made you feel",
            ],
        ),
        ritual(
            "Love Letter Week",
            "Write and photograph handwritten love notes to each other",
            "7 days",
            "Romance",
            Difficulty::Easy,
            &[
                "Emotional intimacy",
                "Tangible memories",
                "Creative expression",
            ],
            &[
                "Write a short love note by hand each day",
                "Take a photo of your handwritten note",
                "Share the photo with your partner",
                "Keep the physical notes as keepsakes",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::engine::Advance;
    use crate::store::relationship::RelationshipState;

    fn store_with_active_ritual() -> Arc<RelationshipStore> {
        RelationshipStore::with_state(RelationshipState {
            active_ritual: Some(catalog().remove(0)),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn instructions_step_allows_stepping_back() {
        let mut flow = RitualFlow::start(store_with_active_ritual());

        assert_eq!(flow.advance().await.unwrap(), Advance::Moved(2));
        assert_eq!(flow.retreat(), 1);
        assert_eq!(flow.advance().await.unwrap(), Advance::Moved(2));
    }

    #[tokio::test]
    async fn completion_increments_counter_once() {
        let store = store_with_active_ritual();
        let mut flow = RitualFlow::start(Arc::clone(&store));

        flow.advance().await.unwrap();
        assert_eq!(flow.advance().await.unwrap(), Advance::Completed);
        assert_eq!(flow.advance().await.unwrap(), Advance::Held);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.metrics.completed_rituals, 1);
        // Progress flags and the active ritual are untouched
        assert!(snapshot.active_ritual.is_some());
    }

    #[tokio::test]
    async fn completion_fails_without_an_active_ritual() {
        let store = RelationshipStore::new();
        let mut flow = RitualFlow::start(Arc::clone(&store));

        flow.advance().await.unwrap();
        assert!(flow.advance().await.is_err());
        assert!(!flow.is_complete());
        assert_eq!(store.snapshot().await.metrics.completed_rituals, 0);
    }

    #[test]
    fn catalog_has_three_rituals_with_fresh_progress() {
        let rituals = catalog();
        assert_eq!(rituals.len(), 3);
        for ritual in &rituals {
            assert!(!ritual.progress.user);
            assert!(!ritual.progress.partner);
            assert!(!ritual.benefits.is_empty());
            assert!(!ritual.instructions.is_empty());
        }
        assert_eq!(rituals[0].title, "Daily Gratitude");
        assert_eq!(rituals[1].difficulty, Difficulty::Medium);
    }

    #[test]
    fn catalog_ids_are_fresh_per_call() {
        // Selecting a catalog ritual twice must not alias progress state
        let first = catalog().remove(0);
        let second = catalog().remove(0);
        assert_ne!(first.id, second.id);
    }
}
