//! Relationship domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the relationship an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Partner,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Partner => write!(f, "partner"),
        }
    }
}

/// One of the two people in the relationship.
///
/// Immutable after creation apart from the timezone, which onboarding may
/// correct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    /// Emoji glyph shown next to the name.
    pub avatar: String,
    pub email: String,
    /// IANA timezone name, e.g. "America/New_York".
    pub timezone: String,
}

impl Participant {
    pub fn new(name: &str, avatar: &str, email: &str, timezone: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            avatar: avatar.to_string(),
            email: email.to_string(),
            timezone: timezone.to_string(),
        }
    }
}

/// Aggregate relationship counters. Updated only by completion events and
/// never decremented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipMetrics {
    /// When the relationship started.
    pub start_date: Option<NaiveDate>,
    pub conflicts_resolved: u32,
    /// Consecutive days of app activity.
    pub current_streak: u32,
    /// Consecutive days with a completed check-in.
    pub check_in_streak: u32,
    pub completed_rituals: u32,
}

impl Default for RelationshipMetrics {
    fn default() -> Self {
        Self {
            start_date: None,
            conflicts_resolved: 0,
            current_streak: 0,
            check_in_streak: 0,
            completed_rituals: 0,
        }
    }
}

/// The emotions offered by the daily check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Sad,
    Stressed,
    Tired,
    Loved,
    Frustrated,
    Peaceful,
    Thoughtful,
}

impl Emotion {
    /// All emotions, in the order the check-in screen presents them.
    pub const ALL: [Emotion; 8] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Stressed,
        Emotion::Tired,
        Emotion::Loved,
        Emotion::Frustrated,
        Emotion::Peaceful,
        Emotion::Thoughtful,
    ];

    /// Parse the snake_case tag used in step data and serialization.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|emotion| emotion.to_string() == tag)
    }

    /// Emoji shown on the check-in card.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Sad => "😔",
            Self::Stressed => "😰",
            Self::Tired => "😴",
            Self::Loved => "🤗",
            Self::Frustrated => "😤",
            Self::Peaceful => "😌",
            Self::Thoughtful => "🤔",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Stressed => "stressed",
            Self::Tired => "tired",
            Self::Loved => "loved",
            Self::Frustrated => "frustrated",
            Self::Peaceful => "peaceful",
            Self::Thoughtful => "thoughtful",
        };
        write!(f, "{s}")
    }
}

/// One participant's emotional self-report for a single day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInEntry {
    pub emotion: Emotion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// The calendar day this entry was written. Always stamped by the store.
    pub recorded_on: NaiveDate,
}

/// Today's check-in record for both sides.
///
/// Entries are replaced, never accumulated: at most one per participant per
/// day. An entry from an earlier day is kept until overwritten but must be
/// read through [`DailyCheckIn::entry_on`], which treats it as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyCheckIn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<CheckInEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<CheckInEntry>,
}

impl DailyCheckIn {
    /// The stored entry for a role regardless of age.
    pub fn entry(&self, role: Role) -> Option<&CheckInEntry> {
        match role {
            Role::User => self.user.as_ref(),
            Role::Partner => self.partner.as_ref(),
        }
    }

    /// The entry for a role only if it was recorded on `date`.
    ///
    /// A stale entry from a previous day reads as "no entry today".
    pub fn entry_on(&self, role: Role, date: NaiveDate) -> Option<&CheckInEntry> {
        self.entry(role).filter(|entry| entry.recorded_on == date)
    }
}

/// Message type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Text
    }
}

/// A chat message between the two participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
}

/// Memory type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Milestone,
    Achievement,
    Photo,
}

/// A timeline entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub kind: MemoryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A memory before the store assigns it an id.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub title: String,
    pub date: NaiveDate,
    pub kind: MemoryKind,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Ritual difficulty rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Per-participant ritual completion flags. Monotone: once a side is marked
/// done it never reverts for the lifetime of that ritual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualProgress {
    pub user: bool,
    pub partner: bool,
}

impl RitualProgress {
    /// Mark one side done. Already-done sides stay done.
    pub fn mark(&mut self, role: Role) {
        match role {
            Role::User => self.user = true,
            Role::Partner => self.partner = true,
        }
    }

    pub fn is_done(&self, role: Role) -> bool {
        match role {
            Role::User => self.user,
            Role::Partner => self.partner,
        }
    }
}

/// A scripted multi-day relationship exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ritual {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Human-readable length, e.g. "7 days".
    pub duration: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub benefits: Vec<String>,
    pub instructions: Vec<String>,
    pub progress: RitualProgress,
}

/// Notification toggles from the settings screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub daily_check_in: bool,
    pub cool_down_requests: bool,
    pub ritual_reminders: bool,
    pub partner_activity: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            daily_check_in: true,
            cool_down_requests: true,
            ritual_reminders: true,
            partner_activity: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_display_matches_serde() {
        for emotion in Emotion::ALL {
            let display = format!("{emotion}");
            let json = serde_json::to_string(&emotion).unwrap();
            // JSON wraps in quotes
            assert_eq!(
                format!("\"{display}\""),
                json,
                "Display and serde should match for {emotion:?}"
            );
        }
    }

    #[test]
    fn emotion_from_tag_round_trips() {
        for emotion in Emotion::ALL {
            let tag = emotion.to_string();
            assert_eq!(Emotion::from_tag(&tag), Some(emotion));
        }
        assert_eq!(Emotion::from_tag("furious"), None);
    }

    #[test]
    fn stale_entry_reads_as_absent() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let yesterday = today.pred_opt().unwrap();

        let check_in = DailyCheckIn {
            user: Some(CheckInEntry {
                emotion: Emotion::Happy,
                note: None,
                recorded_on: today,
            }),
            partner: Some(CheckInEntry {
                emotion: Emotion::Tired,
                note: Some("long day".to_string()),
                recorded_on: yesterday,
            }),
        };

        assert!(check_in.entry_on(Role::User, today).is_some());
        assert!(check_in.entry_on(Role::Partner, today).is_none());
        // The stale entry itself is still stored
        assert!(check_in.entry(Role::Partner).is_some());
    }

    #[test]
    fn ritual_progress_is_monotone() {
        let mut progress = RitualProgress::default();
        assert!(!progress.is_done(Role::User));

        progress.mark(Role::User);
        assert!(progress.is_done(Role::User));
        assert!(!progress.is_done(Role::Partner));

        // Marking again keeps it done
        progress.mark(Role::User);
        assert!(progress.is_done(Role::User));
    }

    #[test]
    fn participant_serde_roundtrip() {
        let participant = Participant::new("Alex", "👨‍💻", "alex@example.com", "America/New_York");
        let json = serde_json::to_string(&participant).unwrap();
        let parsed: Participant = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, participant.id);
        assert_eq!(parsed.name, "Alex");
        assert_eq!(parsed.timezone, "America/New_York");
    }

    #[test]
    fn default_metrics_are_zeroed() {
        let metrics = RelationshipMetrics::default();
        assert!(metrics.start_date.is_none());
        assert_eq!(metrics.conflicts_resolved, 0);
        assert_eq!(metrics.current_streak, 0);
        assert_eq!(metrics.check_in_streak, 0);
        assert_eq!(metrics.completed_rituals, 0);
    }
}
