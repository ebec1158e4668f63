//! Configuration types.

use std::time::Duration;

/// Seconds spent inhaling in the 4-7-8 breathing cycle.
pub const BREATHING_INHALE_SECS: u64 = 4;
/// Seconds spent holding in the 4-7-8 breathing cycle.
pub const BREATHING_HOLD_SECS: u64 = 7;
/// Seconds spent exhaling in the 4-7-8 breathing cycle.
pub const BREATHING_EXHALE_SECS: u64 = 8;

/// Default length of the cool-down breathing step before it auto-advances.
///
/// The product intent is a full 90-second exercise. Override with
/// `LOVESYNC_BREATHING_SECS` for demos.
pub const DEFAULT_BREATHING_SECS: u64 = 90;

/// Cool-down flow configuration.
#[derive(Debug, Clone)]
pub struct CoolDownConfig {
    /// How long the breathing step runs before auto-advancing to step 2.
    pub breathing: Duration,
    /// Cadence of breathing-display updates.
    pub tick: Duration,
}

impl Default for CoolDownConfig {
    fn default() -> Self {
        Self {
            breathing: Duration::from_secs(DEFAULT_BREATHING_SECS),
            tick: Duration::from_secs(1),
        }
    }
}

/// Post-completion redirect delays consumed by the presentation layer.
#[derive(Debug, Clone)]
pub struct NavigationConfig {
    /// Delay before leaving the cool-down completion screen.
    pub cool_down_redirect: Duration,
    /// Delay before leaving the check-in completion screen.
    pub check_in_redirect: Duration,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            cool_down_redirect: Duration::from_secs(3),
            check_in_redirect: Duration::from_secs(2),
        }
    }
}

/// App configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub cool_down: CoolDownConfig,
    pub navigation: NavigationConfig,
}

impl AppConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Recognized variables:
    /// - `LOVESYNC_BREATHING_SECS` — breathing step length in seconds
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("LOVESYNC_BREATHING_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    config.cool_down.breathing = Duration::from_secs(secs);
                }
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "Ignoring invalid LOVESYNC_BREATHING_SECS"
                    );
                }
            }
        }

        config
    }
}
