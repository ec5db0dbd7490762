//! Delivery of formatted messages.

use std::sync::Mutex;

use tracing::info;

use crate::error::NotifyError;
use crate::message::Message;

/// Every delivery channel implements this trait.
/// Failures are logged by the caller and never stop the scheduler.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;

    fn send(&self, message: &Message) -> Result<(), NotifyError> {
        self.notify(message.title(), &message.text)
    }
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(title, body, "notification");
        Ok(())
    }
}

/// Keeps every delivered message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered `(title, body)` pairs, oldest first.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|_| NotifyError::Delivery("recorder lock poisoned".into()))?
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}
