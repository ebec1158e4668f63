//! Message-compose flow — the degenerate single-step case of the engine.
//!
//! One step, gated on a non-empty draft; the terminal effect appends the
//! message. Each sent message is a fresh instance.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FlowError;
use crate::store::{MessageKind, RelationshipStore};

use super::engine::{FlowSpec, GuidedFlow, StepData};

/// Step-data field keys.
pub mod fields {
    pub const CONTENT: &str = "content";
}

/// Spec for composing a single chat message.
pub struct ComposeFlow {
    store: Arc<RelationshipStore>,
}

impl ComposeFlow {
    /// Start composing one message.
    pub fn start(store: Arc<RelationshipStore>) -> GuidedFlow<Self> {
        GuidedFlow::new(Self { store })
    }
}

#[async_trait]
impl FlowSpec for ComposeFlow {
    fn name(&self) -> &'static str {
        "compose"
    }

    fn total_steps(&self) -> u32 {
        1
    }

    fn can_advance(&self, step: u32, data: &StepData) -> bool {
        step == 1 && data.has_text(fields::CONTENT)
    }

    async fn terminal_effect(&self, data: &StepData) -> Result<(), FlowError> {
        let content = data.text(fields::CONTENT).ok_or(FlowError::MissingField {
            flow: "compose",
            field: fields::CONTENT,
        })?;
        self.store.record_message(content, MessageKind::Text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::engine::Advance;
    use crate::store::model::Participant;
    use crate::store::relationship::RelationshipState;

    fn store_with_user() -> Arc<RelationshipStore> {
        RelationshipStore::with_state(RelationshipState {
            user: Some(Participant::new(
                "Alex",
                "👨‍💻",
                "alex@example.com",
                "UTC",
            )),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn empty_draft_cannot_be_sent() {
        let store = store_with_user();
        let mut flow = ComposeFlow::start(Arc::clone(&store));

        assert_eq!(flow.advance().await.unwrap(), Advance::Held);
        flow.capture(fields::CONTENT, "   ");
        assert_eq!(flow.advance().await.unwrap(), Advance::Held);

        assert!(store.snapshot().await.messages.is_empty());
    }

    #[tokio::test]
    async fn sending_appends_one_message() {
        let store = store_with_user();
        let mut flow = ComposeFlow::start(Arc::clone(&store));

        flow.capture(fields::CONTENT, "Miss you already");
        assert_eq!(flow.advance().await.unwrap(), Advance::Completed);
        // Double-submit is a no-op
        assert_eq!(flow.advance().await.unwrap(), Advance::Held);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].content, "Miss you already");
    }
}
