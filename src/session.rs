//! Session bootstrap — the two persisted flags and screen routing guards.
//!
//! The store and flow engine never touch these; only the bootstrap and
//! presentation layers consult them to pick and guard screens.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Abstraction over the two persisted session flags.
pub trait FlagStore: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn set_authenticated(&self, value: bool);
    fn is_onboarded(&self) -> bool;
    fn set_onboarded(&self, value: bool);
}

/// In-memory flag store.
pub struct InMemoryFlags {
    authenticated: AtomicBool,
    onboarded: AtomicBool,
}

impl InMemoryFlags {
    pub fn new(authenticated: bool, onboarded: bool) -> Self {
        Self {
            authenticated: AtomicBool::new(authenticated),
            onboarded: AtomicBool::new(onboarded),
        }
    }
}

impl Default for InMemoryFlags {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl FlagStore for InMemoryFlags {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn set_authenticated(&self, value: bool) {
        self.authenticated.store(value, Ordering::SeqCst);
    }

    fn is_onboarded(&self) -> bool {
        self.onboarded.load(Ordering::SeqCst)
    }

    fn set_onboarded(&self, value: bool) {
        self.onboarded.store(value, Ordering::SeqCst);
    }
}

/// The app's screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Landing,
    Onboarding,
    Dashboard,
    CoolDown,
    CheckIn,
    Ritual,
    Chat,
    Timeline,
    Settings,
    Premium,
}

/// The screen shown at startup, derived from the two flags.
pub fn initial_screen(flags: &dyn FlagStore) -> Screen {
    if !flags.is_authenticated() {
        Screen::Landing
    } else if !flags.is_onboarded() {
        Screen::Onboarding
    } else {
        Screen::Dashboard
    }
}

/// Route guard: where a request for `requested` actually lands.
pub fn resolve(requested: Screen, flags: &dyn FlagStore) -> Screen {
    if !flags.is_authenticated() {
        return Screen::Landing;
    }
    match requested {
        // Onboarding is only reachable while not yet onboarded
        Screen::Onboarding if flags.is_onboarded() => Screen::Dashboard,
        Screen::Landing => initial_screen(flags),
        // Everything past onboarding requires the onboarded flag
        _ if !flags.is_onboarded() && requested != Screen::Onboarding => Screen::Onboarding,
        _ => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_screen_follows_the_flags() {
        assert_eq!(
            initial_screen(&InMemoryFlags::new(false, false)),
            Screen::Landing
        );
        assert_eq!(
            initial_screen(&InMemoryFlags::new(true, false)),
            Screen::Onboarding
        );
        assert_eq!(
            initial_screen(&InMemoryFlags::new(true, true)),
            Screen::Dashboard
        );
    }

    #[test]
    fn unauthenticated_requests_land_on_landing() {
        let flags = InMemoryFlags::new(false, false);
        for screen in [Screen::Dashboard, Screen::CoolDown, Screen::Settings] {
            assert_eq!(resolve(screen, &flags), Screen::Landing);
        }
    }

    #[test]
    fn not_onboarded_requests_redirect_to_onboarding() {
        let flags = InMemoryFlags::new(true, false);
        assert_eq!(resolve(Screen::Dashboard, &flags), Screen::Onboarding);
        assert_eq!(resolve(Screen::Onboarding, &flags), Screen::Onboarding);
    }

    #[test]
    fn onboarded_cannot_reenter_onboarding() {
        let flags = InMemoryFlags::new(true, true);
        assert_eq!(resolve(Screen::Onboarding, &flags), Screen::Dashboard);
        assert_eq!(resolve(Screen::Chat, &flags), Screen::Chat);
        assert_eq!(resolve(Screen::Premium, &flags), Screen::Premium);
    }

    #[test]
    fn flags_are_independently_settable() {
        let flags = InMemoryFlags::default();
        flags.set_authenticated(true);
        assert!(flags.is_authenticated());
        assert!(!flags.is_onboarded());

        flags.set_onboarded(true);
        assert!(flags.is_onboarded());
    }
}
