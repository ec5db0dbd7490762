//! Background scheduling loop.
//!
//! A single task ticks the matcher once per idle interval and backs off to
//! the cooldown interval after a notification, so the same trigger minute is
//! never matched twice. UI writes go through [`SchedulerHandle`], which takes
//! the same lock as a tick, so a tick never sees a half-applied cascade.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::clock::ClockSource;
use crate::error::{Result, StoreError, ValidationError};
use crate::matcher::{NotificationCandidate, NotificationMatcher};
use crate::message::{self, Message};
use crate::notifier::Notifier;
use crate::notify_state::{NotifyId, StateChange};
use crate::preferences::Preferences;
use crate::storage::{Config, MAX_INTERVAL_SECS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Global switch; when off, ticks still match but nothing is delivered.
    pub deliver: bool,
    pub idle_tick: Duration,
    pub cooldown: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            deliver: config.notifications.enabled,
            idle_tick: Duration::from_secs(bounded(config.scheduler.idle_tick_secs)),
            cooldown: Duration::from_secs(bounded(config.scheduler.cooldown_secs)),
        }
    }
}

fn bounded(secs: u64) -> u64 {
    secs.clamp(1, MAX_INTERVAL_SECS)
}

/// Result of one evaluated tick.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub candidates: Vec<NotificationCandidate>,
    pub message: Option<Message>,
    pub delivered: bool,
}

struct Shared {
    matcher: NotificationMatcher,
    preferences: Preferences,
}

fn lock(state: &Mutex<Shared>) -> std::result::Result<MutexGuard<'_, Shared>, StoreError> {
    state.lock().map_err(StoreError::from)
}

pub struct Scheduler {
    state: Arc<Mutex<Shared>>,
    clock: Arc<dyn ClockSource>,
    notifier: Arc<dyn Notifier>,
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(
        catalog: Arc<Catalog>,
        preferences: Preferences,
        clock: Arc<dyn ClockSource>,
        notifier: Arc<dyn Notifier>,
        settings: SchedulerSettings,
    ) -> Self {
        let mut matcher = NotificationMatcher::new(catalog);
        match clock.now() {
            Ok(now) => {
                let today = matcher.catalog().rotation_date(now);
                if preferences.restore_rotation(matcher.rotation_mut(), today) {
                    debug!(order = ?matcher.rotation().order(), "rotation restored");
                }
            }
            Err(e) => warn!(error = %e, "clock unavailable, rotation not restored"),
        }

        Self {
            state: Arc::new(Mutex::new(Shared {
                matcher,
                preferences,
            })),
            clock,
            notifier,
            settings,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            state: Arc::clone(&self.state),
        }
    }

    pub fn settings(&self) -> SchedulerSettings {
        self.settings
    }

    /// Evaluate a single tick and deliver its message.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock cannot be read or the shared state is
    /// poisoned. Delivery failures are logged, not returned.
    pub fn tick_once(&self) -> Result<TickOutcome> {
        let now = self.clock.now()?;

        let (candidates, offset) = {
            let mut guard = lock(&self.state)?;
            let shared = &mut *guard;
            let today = shared.matcher.catalog().rotation_date(now);
            if shared.matcher.advance_rotation(today) {
                shared.preferences.save_rotation(shared.matcher.rotation());
            }
            let offset = shared.preferences.offset_minutes();
            let candidates = shared
                .matcher
                .tick(now, offset, shared.preferences.tree());
            (candidates, offset)
        };

        let message = message::message(&candidates, offset);
        let mut delivered = false;
        if let Some(m) = &message {
            if self.settings.deliver {
                match self.notifier.send(m) {
                    Ok(()) => delivered = true,
                    Err(e) => warn!(error = %e, "notification delivery failed"),
                }
            } else {
                debug!(matched = candidates.len(), "notifications disabled, skipping delivery");
            }
        }

        Ok(TickOutcome {
            candidates,
            message,
            delivered,
        })
    }

    /// Run until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            idle_secs = self.settings.idle_tick.as_secs(),
            cooldown_secs = self.settings.cooldown.as_secs(),
            "scheduler started"
        );

        loop {
            let delay = match self.tick_once() {
                Ok(outcome) if outcome.message.is_some() => self.settings.cooldown,
                Ok(_) => self.settings.idle_tick,
                Err(e) => {
                    warn!(error = %e, "tick skipped");
                    self.settings.idle_tick
                }
            };

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("scheduler stopped");
    }
}

/// Cloneable write path for UI-originated changes.
#[derive(Clone)]
pub struct SchedulerHandle {
    state: Arc<Mutex<Shared>>,
}

impl SchedulerHandle {
    pub fn toggle(&self, id: &NotifyId, enabled: bool) -> Result<Vec<StateChange>> {
        let mut guard = lock(&self.state)?;
        Ok(guard.preferences.toggle(id, enabled)?)
    }

    pub fn set_offset(&self, minutes: u32) -> Result<()> {
        let mut guard = lock(&self.state)?;
        Ok(guard.preferences.set_offset(minutes)?)
    }

    pub fn offset_minutes(&self) -> Result<u32> {
        Ok(lock(&self.state)?.preferences.offset_minutes())
    }

    pub fn is_enabled(&self, id: &NotifyId) -> Result<bool> {
        let guard = lock(&self.state)?;
        if !guard.preferences.tree().contains(id) {
            return Err(ValidationError::UnknownIdentifier(id.to_string()).into());
        }
        Ok(guard.preferences.is_enabled(id))
    }

    /// Current slot order of the rotation.
    pub fn rotation_order(&self) -> Result<Vec<String>> {
        Ok(lock(&self.state)?.matcher.rotation().order().to_vec())
    }
}
