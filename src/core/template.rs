// McNotify - core/template.rs
//
// Notification text rendering. One template per event kind, taken from the
// `messages` config map with built-in fallbacks.
//
// Placeholders:
//   {player}   the player name
//   {message}  the full death message ("Bob was slain by Zombie");
//              for join/leave it renders as the player name

use crate::core::model::{EventKind, PlayerEvent};
use crate::util::constants::{DEFAULT_DEATH_TEMPLATE, DEFAULT_JOIN_TEMPLATE, DEFAULT_LEAVE_TEMPLATE};
use std::collections::HashMap;

/// Message templates for every event kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    pub join: String,
    pub leave: String,
    pub death: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            join: DEFAULT_JOIN_TEMPLATE.to_string(),
            leave: DEFAULT_LEAVE_TEMPLATE.to_string(),
            death: DEFAULT_DEATH_TEMPLATE.to_string(),
        }
    }
}

impl MessageTemplates {
    /// Build templates from the config `messages` map.
    ///
    /// Returns the templates and the keys that were not recognised, so the
    /// config loader can report them as warnings.
    pub fn from_map(messages: &HashMap<String, String>) -> (Self, Vec<String>) {
        let mut templates = Self::default();
        let mut unknown = Vec::new();

        for (key, value) in messages {
            match key.to_lowercase().as_str() {
                "join" => templates.join = value.clone(),
                "leave" => templates.leave = value.clone(),
                "death" => templates.death = value.clone(),
                _ => unknown.push(key.clone()),
            }
        }
        unknown.sort();

        (templates, unknown)
    }

    pub fn template_for(&self, kind: EventKind) -> &str {
        match kind {
            EventKind::Join => &self.join,
            EventKind::Leave => &self.leave,
            EventKind::Death => &self.death,
        }
    }

    /// Render the notification text for `event`.
    pub fn render(&self, event: &PlayerEvent) -> String {
        let message = event.message().unwrap_or(event.player());
        self.template_for(event.kind())
            .replace("{player}", event.player())
            .replace("{message}", message)
    }
}
