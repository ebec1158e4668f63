//! RelationshipStore — the single owner of shared relationship state.
//!
//! Every mutation goes through the operations here; readers only ever get
//! value snapshots. Each mutation broadcasts a [`StoreEvent`] so the
//! navigation/presentation layer can react without polling.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;

use super::model::{
    CheckInEntry, DailyCheckIn, Emotion, Memory, MemoryKind, Message, MessageKind, NewMemory,
    NotificationPrefs, Participant, RelationshipMetrics, Ritual, RitualProgress, Role,
};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Event emitted after a store mutation commits.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    MessageRecorded { id: Uuid },
    CheckInRecorded { role: Role, date: NaiveDate },
    ConflictResolved { metrics: RelationshipMetrics },
    RitualCompleted { metrics: RelationshipMetrics },
    RitualSelected { id: Uuid },
    RitualProgressMarked { role: Role },
    MemoryAdded { id: Uuid },
    OnboardingApplied,
    PremiumChanged { premium: bool },
    PrefsUpdated,
}

/// The full relationship state. Cloned out of the store as a read-only
/// snapshot; never handed out by reference.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationshipState {
    pub user: Option<Participant>,
    pub partner: Option<Participant>,
    pub premium: bool,
    pub metrics: RelationshipMetrics,
    pub check_in: DailyCheckIn,
    pub active_ritual: Option<Ritual>,
    pub messages: Vec<Message>,
    pub memories: Vec<Memory>,
    pub prefs: NotificationPrefs,
}

impl RelationshipState {
    /// Today's check-in entry for a role, treating stale entries as absent.
    pub fn check_in_today(&self, role: Role) -> Option<&CheckInEntry> {
        self.check_in.entry_on(role, Utc::now().date_naive())
    }
}

/// Owned state container for the relationship session.
pub struct RelationshipStore {
    state: RwLock<RelationshipState>,
    events: broadcast::Sender<StoreEvent>,
}

impl RelationshipStore {
    /// Create an empty store (pre-onboarding session).
    pub fn new() -> Arc<Self> {
        Self::with_state(RelationshipState::default())
    }

    /// Create a store seeded with an initial state.
    pub fn with_state(state: RelationshipState) -> Arc<Self> {
        let (events, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            state: RwLock::new(state),
            events,
        })
    }

    /// Subscribe to store events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Read-only snapshot of the whole state.
    pub async fn snapshot(&self) -> RelationshipState {
        self.state.read().await.clone()
    }

    /// Append a message from the user, stamped with the current time.
    ///
    /// Rejects empty or whitespace-only content and refuses to write a
    /// message with no authenticated user participant.
    pub async fn record_message(
        &self,
        content: &str,
        kind: MessageKind,
    ) -> Result<Message, StoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::EmptyMessage);
        }

        let mut state = self.state.write().await;
        let sender = state
            .user
            .as_ref()
            .ok_or_else(|| StoreError::MissingParticipant {
                role: Role::User.to_string(),
            })?;

        let message = Message {
            id: Uuid::new_v4(),
            sender_id: sender.id,
            content: content.to_string(),
            timestamp: Utc::now(),
            kind,
        };
        state.messages.push(message.clone());
        drop(state);

        debug!(id = %message.id, "Message recorded");
        let _ = self.events.send(StoreEvent::MessageRecorded { id: message.id });
        Ok(message)
    }

    /// Replace today's self check-in entry.
    ///
    /// The first check-in of a new calendar day bumps the check-in streak;
    /// re-checking-in the same day just overwrites the entry. The partner's
    /// entry is left untouched — if it is from an earlier day, readers see
    /// it as absent via [`DailyCheckIn::entry_on`].
    pub async fn record_check_in(
        &self,
        emotion: Emotion,
        note: Option<String>,
    ) -> Result<CheckInEntry, StoreError> {
        let today = Utc::now().date_naive();

        let mut state = self.state.write().await;
        if state.user.is_none() {
            return Err(StoreError::MissingParticipant {
                role: Role::User.to_string(),
            });
        }

        let first_today = state
            .check_in
            .entry_on(Role::User, today)
            .is_none();

        let entry = CheckInEntry {
            emotion,
            note: note.filter(|n| !n.trim().is_empty()),
            recorded_on: today,
        };
        state.check_in.user = Some(entry.clone());
        if first_today {
            state.metrics.check_in_streak += 1;
        }
        drop(state);

        info!(emotion = %emotion, date = %today, "Daily check-in recorded");
        let _ = self.events.send(StoreEvent::CheckInRecorded {
            role: Role::User,
            date: today,
        });
        Ok(entry)
    }

    /// Record a resolved conflict: bumps the conflicts-resolved counter and
    /// the current streak.
    ///
    /// Not idempotent — callers (the cool-down flow) must fire this exactly
    /// once per completed cool-down.
    pub async fn resolve_conflict(&self) -> RelationshipMetrics {
        let mut state = self.state.write().await;
        state.metrics.conflicts_resolved += 1;
        state.metrics.current_streak += 1;
        let metrics = state.metrics.clone();
        drop(state);

        info!(
            conflicts_resolved = metrics.conflicts_resolved,
            current_streak = metrics.current_streak,
            "Conflict resolved"
        );
        let _ = self.events.send(StoreEvent::ConflictResolved {
            metrics: metrics.clone(),
        });
        metrics
    }

    /// Record a completed ritual: bumps the completed-rituals counter.
    ///
    /// Does not reset progress flags or select a successor — choosing the
    /// next ritual is a separate, explicit action.
    pub async fn complete_ritual(&self) -> Result<RelationshipMetrics, StoreError> {
        let mut state = self.state.write().await;
        if state.active_ritual.is_none() {
            return Err(StoreError::NoActiveRitual);
        }
        state.metrics.completed_rituals += 1;
        let metrics = state.metrics.clone();
        drop(state);

        info!(
            completed_rituals = metrics.completed_rituals,
            "Ritual completed"
        );
        let _ = self.events.send(StoreEvent::RitualCompleted {
            metrics: metrics.clone(),
        });
        Ok(metrics)
    }

    /// Make `ritual` the active ritual, replacing the previous one wholesale.
    /// The prior ritual's progress flags are discarded with it.
    pub async fn select_ritual(&self, ritual: Ritual) {
        let id = ritual.id;
        let mut state = self.state.write().await;
        state.active_ritual = Some(ritual);
        drop(state);

        info!(id = %id, "Ritual selected");
        let _ = self.events.send(StoreEvent::RitualSelected { id });
    }

    /// Mark one side's progress on the active ritual. Monotone: a done flag
    /// never reverts while the ritual stays active.
    pub async fn mark_ritual_progress(&self, role: Role) -> Result<RitualProgress, StoreError> {
        let mut state = self.state.write().await;
        let ritual = state
            .active_ritual
            .as_mut()
            .ok_or(StoreError::NoActiveRitual)?;
        ritual.progress.mark(role);
        let progress = ritual.progress;
        drop(state);

        debug!(role = %role, "Ritual progress marked");
        let _ = self.events.send(StoreEvent::RitualProgressMarked { role });
        Ok(progress)
    }

    /// Append a memory to the timeline with a generated id. No dedup.
    pub async fn add_memory(&self, new: NewMemory) -> Memory {
        let memory = Memory {
            id: Uuid::new_v4(),
            title: new.title,
            date: new.date,
            kind: new.kind,
            image: new.image,
            description: new.description,
        };

        let mut state = self.state.write().await;
        state.memories.push(memory.clone());
        drop(state);

        debug!(id = %memory.id, kind = ?memory.kind, "Memory added");
        let _ = self.events.send(StoreEvent::MemoryAdded { id: memory.id });
        memory
    }

    /// Apply the outcome of a completed onboarding: install the partner,
    /// set the relationship start date, and correct the user's timezone.
    pub async fn apply_onboarding(
        &self,
        partner: Participant,
        start_date: NaiveDate,
        user_timezone: &str,
    ) {
        let mut state = self.state.write().await;
        state.partner = Some(partner);
        state.metrics.start_date = Some(start_date);
        if let Some(user) = state.user.as_mut() {
            user.timezone = user_timezone.to_string();
        }
        drop(state);

        info!(start_date = %start_date, "Onboarding applied");
        let _ = self.events.send(StoreEvent::OnboardingApplied);
    }

    /// Toggle the premium flag.
    pub async fn set_premium(&self, premium: bool) {
        self.state.write().await.premium = premium;
        info!(premium, "Premium flag changed");
        let _ = self.events.send(StoreEvent::PremiumChanged { premium });
    }

    /// Replace the notification preferences.
    pub async fn update_notification_prefs(&self, prefs: NotificationPrefs) {
        self.state.write().await.prefs = prefs;
        debug!("Notification preferences updated");
        let _ = self.events.send(StoreEvent::PrefsUpdated);
    }
}
