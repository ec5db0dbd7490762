//! Notification text for one tick's candidates.

use std::fmt;

use serde::Serialize;

use crate::matcher::NotificationCandidate;

/// Names listed before the footer line takes over.
pub const DISPLAY_LIMIT: usize = 3;

/// Title used when a single event needs no caption.
pub const DEFAULT_TITLE: &str = "Starwatch";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Only set for multi-event messages.
    pub caption: Option<String>,
    pub text: String,
}

impl Message {
    pub fn title(&self) -> &str {
        self.caption.as_deref().unwrap_or(DEFAULT_TITLE)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.caption {
            Some(caption) => write!(f, "{caption}\n{}", self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// Build the message for `candidates`, or `None` if nothing matched.
///
/// One event reads `"<phrase> in <N> minutes!"`. Several events get the
/// caption `"Multiple events starting in <N> minutes!"` and one name per
/// line: the first three, then the fourth name if it is the last one, or
/// `"...and <K> more events"` for the K events after the third.
pub fn message(candidates: &[NotificationCandidate], offset_minutes: u32) -> Option<Message> {
    let suffix = format!(" in {offset_minutes} minutes!");
    match candidates {
        [] => None,
        [single] => Some(Message {
            caption: None,
            text: format!("{}{suffix}", single.kind.phrase(&single.display_name)),
        }),
        many => {
            let mut lines: Vec<String> = many
                .iter()
                .take(DISPLAY_LIMIT)
                .map(|c| c.display_name.clone())
                .collect();
            match many.len().saturating_sub(DISPLAY_LIMIT) {
                0 => {}
                1 => lines.push(many[DISPLAY_LIMIT].display_name.clone()),
                remaining => lines.push(format!("...and {remaining} more events")),
            }
            Some(Message {
                caption: Some(format!("Multiple events starting{suffix}")),
                text: lines.join("\n"),
            })
        }
    }
}

/// Full display text, caption first. Empty when nothing matched.
pub fn format(candidates: &[NotificationCandidate], offset_minutes: u32) -> String {
    message(candidates, offset_minutes)
        .map(|m| m.to_string())
        .unwrap_or_default()
}
