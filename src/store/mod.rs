//! Shared relationship state — models, the owning store, and demo seeding.

pub mod model;
pub mod relationship;
pub mod seed;

pub use model::{
    CheckInEntry, DailyCheckIn, Difficulty, Emotion, Memory, MemoryKind, Message, MessageKind,
    NewMemory, NotificationPrefs, Participant, RelationshipMetrics, Ritual, RitualProgress, Role,
};
pub use relationship::{RelationshipState, RelationshipStore, StoreEvent};
