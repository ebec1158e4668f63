//! Demo-session seeding.

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use super::model::{
    Memory, MemoryKind, Message, MessageKind, Participant, RelationshipMetrics, Role,
};
use super::relationship::RelationshipState;
use crate::flow::ritual;

/// Build the demo session state: Alex and Jordan, an in-progress ritual,
/// a short message history, and a couple of timeline entries.
pub fn demo_state() -> RelationshipState {
    let user = Participant::new("Alex", "👨‍💻", "alex@example.com", "America/New_York");
    let partner = Participant::new("Jordan", "👩‍💼", "jordan@example.com", "Europe/London");

    let start_date =
        NaiveDate::from_ymd_opt(2023, 6, 15).unwrap_or_else(|| Utc::now().date_naive());

    let mut active_ritual = ritual::catalog().remove(0);
    active_ritual.progress.mark(Role::User);

    let now = Utc::now();
    let messages = vec![
        Message {
            id: Uuid::new_v4(),
            sender_id: user.id,
            content: "Good morning beautiful! ☀️".to_string(),
            timestamp: now - Duration::minutes(60),
            kind: MessageKind::Text,
        },
        Message {
            id: Uuid::new_v4(),
            sender_id: partner.id,
            content: "Morning love! Hope you have an amazing day 💕".to_string(),
            timestamp: now - Duration::minutes(50),
            kind: MessageKind::Text,
        },
    ];

    let memories = vec![
        Memory {
            id: Uuid::new_v4(),
            title: "First Video Call".to_string(),
            date: start_date,
            kind: MemoryKind::Milestone,
            image: Some(
                "https://images.unsplash.com/photo-1516589178581-6cd7833ae3b2?w=400&h=300&fit=crop"
                    .to_string(),
            ),
            description: None,
        },
        Memory {
            id: Uuid::new_v4(),
            title: "Conflict Resolved".to_string(),
            date: now.date_naive(),
            kind: MemoryKind::Achievement,
            image: None,
            description: Some("Successfully used Cool Down mode".to_string()),
        },
    ];

    RelationshipState {
        user: Some(user),
        partner: Some(partner),
        premium: false,
        metrics: RelationshipMetrics {
            start_date: Some(start_date),
            conflicts_resolved: 47,
            current_streak: 23,
            check_in_streak: 15,
            completed_rituals: 8,
        },
        check_in: Default::default(),
        active_ritual: Some(active_ritual),
        messages,
        memories,
        prefs: Default::default(),
    }
}
