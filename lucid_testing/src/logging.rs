//! Exclusive access to the process-wide `log` capture.
//!
//! The engine logs through `tracing` with its `log` bridge enabled, so every
//! event also reaches [`logtest::Logger`]. Only one logger can be installed
//! per process; [`EngineLog`] serialises tests that read it.

use std::{
    ops::{Deref, DerefMut},
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use log::Level;
use logtest::Logger;
use rstest::fixture;

/// One captured event, reduced to what tests assert on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Severity.
    pub level: Level,
    /// Rendered message, including any structured fields.
    pub message: String,
}

/// Guard over the global [`Logger`].
pub struct EngineLog {
    guard: MutexGuard<'static, Logger>,
}

impl EngineLog {
    /// Acquire the logger, discarding events left by earlier tests.
    #[must_use]
    pub fn acquire() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        let guard = logger.lock().unwrap_or_else(PoisonError::into_inner);
        let mut log = Self { guard };
        log.drain();
        log
    }

    /// Take every event captured so far.
    pub fn drain(&mut self) -> Vec<CapturedEvent> {
        std::iter::from_fn(|| self.guard.pop())
            .map(|record| CapturedEvent {
                level: record.level(),
                message: record.args().to_string(),
            })
            .collect()
    }

    /// Take every event and report whether one at `level` contains `needle`.
    pub fn contains(&mut self, level: Level, needle: &str) -> bool {
        self.drain()
            .iter()
            .any(|event| event.level == level && event.message.contains(needle))
    }
}

impl Deref for EngineLog {
    type Target = Logger;

    fn deref(&self) -> &Self::Target { &self.guard }
}

impl DerefMut for EngineLog {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.guard }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn engine_log() -> EngineLog { EngineLog::acquire() }
