//! Live user preferences backed by a [`PreferenceStore`].
//!
//! In-memory state is merged from the store once at startup and written
//! through on every mutation. A failed write does not fail the mutation: the
//! value stays queued and is retried with the next write.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::notify_state::{NotifyId, NotifyStateTree, StateChange};
use crate::schedule::RotationState;
use crate::storage::PreferenceStore;

pub const OFFSET_KEY: &str = "notify_offset_minutes";
pub const ROTATION_ORDER_KEY: &str = "rotation.order";
pub const ROTATION_DATE_KEY: &str = "rotation.last_advanced";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Store key holding the flag for `id`.
pub fn notify_key(id: &NotifyId) -> String {
    format!("notify.{id}")
}

pub struct Preferences {
    tree: NotifyStateTree,
    offset_minutes: u32,
    offset_choices: Vec<u32>,
    store: Box<dyn PreferenceStore>,
    pending: BTreeMap<String, String>,
}

impl Preferences {
    /// Merge stored values into `tree` and the offset.
    ///
    /// Unreadable or malformed entries are logged and fall back to the
    /// in-memory default.
    pub fn restore(
        mut tree: NotifyStateTree,
        store: Box<dyn PreferenceStore>,
        default_offset: u32,
        offset_choices: Vec<u32>,
    ) -> Self {
        let ids: Vec<NotifyId> = tree.toggles().cloned().collect();
        for id in &ids {
            let default = tree.get(id);
            match store.get_bool(&notify_key(id), default) {
                Ok(enabled) => tree.restore(id, enabled),
                Err(e) => warn!(id = %id, error = %e, "using default notify state"),
            }
        }

        let offset_minutes = match store.get_string(OFFSET_KEY, &default_offset.to_string()) {
            Ok(raw) => match raw.parse::<u32>() {
                Ok(v) if offset_choices.contains(&v) => v,
                _ => {
                    warn!(value = %raw, default = default_offset, "ignoring stored notify offset");
                    default_offset
                }
            },
            Err(e) => {
                warn!(error = %e, "using default notify offset");
                default_offset
            }
        };

        debug!(toggles = ids.len(), offset_minutes, "preferences restored");
        Self {
            tree,
            offset_minutes,
            offset_choices,
            store,
            pending: BTreeMap::new(),
        }
    }

    pub fn tree(&self) -> &NotifyStateTree {
        &self.tree
    }

    pub fn offset_minutes(&self) -> u32 {
        self.offset_minutes
    }

    pub fn offset_choices(&self) -> &[u32] {
        &self.offset_choices
    }

    pub fn is_enabled(&self, id: &NotifyId) -> bool {
        self.tree.get(id)
    }

    /// UI toggle: cascades for grouping identifiers and persists every
    /// written flag independently.
    pub fn toggle(
        &mut self,
        id: &NotifyId,
        enabled: bool,
    ) -> Result<Vec<StateChange>, ValidationError> {
        if !self.tree.contains(id) {
            return Err(ValidationError::UnknownIdentifier(id.to_string()));
        }
        let changes = self.tree.toggle(id, enabled);
        for change in &changes {
            self.pending
                .insert(notify_key(&change.id), change.enabled.to_string());
        }
        self.flush();
        Ok(changes)
    }

    pub fn set_offset(&mut self, minutes: u32) -> Result<(), ValidationError> {
        if !self.offset_choices.contains(&minutes) {
            return Err(ValidationError::InvalidValue {
                field: OFFSET_KEY.into(),
                message: format!("{minutes} is not one of {:?}", self.offset_choices),
            });
        }
        self.offset_minutes = minutes;
        self.pending.insert(OFFSET_KEY.into(), minutes.to_string());
        self.flush();
        Ok(())
    }

    /// Apply the persisted rotation order if it was saved for `today`.
    pub fn restore_rotation(&self, rotation: &mut RotationState, today: NaiveDate) -> bool {
        let date = match self.store.get_string(ROTATION_DATE_KEY, "") {
            Ok(raw) => NaiveDate::parse_from_str(&raw, DATE_FORMAT).ok(),
            Err(e) => {
                warn!(error = %e, "cannot read rotation date");
                None
            }
        };
        if date != Some(today) {
            return false;
        }
        let order = match self.store.get_string(ROTATION_ORDER_KEY, "") {
            Ok(raw) if !raw.is_empty() => raw.split(',').map(str::to_string).collect(),
            Ok(_) => return false,
            Err(e) => {
                warn!(error = %e, "cannot read rotation order");
                return false;
            }
        };
        rotation.restore(order, today)
    }

    pub fn save_rotation(&mut self, rotation: &RotationState) {
        let Some(date) = rotation.last_advanced() else {
            return;
        };
        self.pending
            .insert(ROTATION_ORDER_KEY.into(), rotation.order().join(","));
        self.pending
            .insert(ROTATION_DATE_KEY.into(), date.format(DATE_FORMAT).to_string());
        self.flush();
    }

    /// Write every queued value. Returns how many remain queued.
    pub fn flush(&mut self) -> usize {
        let queued = std::mem::take(&mut self.pending);
        for (key, value) in queued {
            if let Err(e) = self.store.set_string(&key, &value) {
                warn!(key = %key, error = %e, "preference write failed, will retry");
                self.pending.insert(key, value);
            }
        }
        self.pending.len()
    }

    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }
}
