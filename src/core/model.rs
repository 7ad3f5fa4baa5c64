// McNotify - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies. These types are the shared vocabulary across
// all layers.

use std::fmt;

// =============================================================================
// Event kind
// =============================================================================

/// The kinds of player activity extracted from the server log.
///
/// Closed set: adding a variant requires a matching rule in the classifier
/// and a template in `MessageTemplates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Join,
    Leave,
    Death,
}

impl EventKind {
    /// Returns all variants in classification priority order.
    pub fn all() -> &'static [EventKind] {
        &[EventKind::Join, EventKind::Leave, EventKind::Death]
    }

    /// Lower-case key used for template lookup in the `messages` config map.
    pub fn key(&self) -> &'static str {
        match self {
            EventKind::Join => "join",
            EventKind::Leave => "leave",
            EventKind::Death => "death",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Player event
// =============================================================================

/// A single player-activity event recognised in the server log.
///
/// Immutable once built. Only the classifier constructs these; downstream
/// stages (dispatcher, delivery) read them through the accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEvent {
    kind: EventKind,
    /// 1-16 characters of `[A-Za-z0-9_]`.
    player: String,
    /// Source line with ANSI / colour codes and trailing CR/LF removed.
    raw_line: String,
    /// `"{player} {death phrase...}"`, only set for `Death`.
    message: Option<String>,
}

impl PlayerEvent {
    pub(crate) fn new(
        kind: EventKind,
        player: impl Into<String>,
        raw_line: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            kind,
            player: player.into(),
            raw_line: raw_line.into(),
            message,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// The full death message. `None` for join and leave events.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(m) => write!(f, "{}: {m}", self.kind),
            None => write!(f, "{}: {}", self.kind, self.player),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_keys_are_lowercase() {
        let keys: Vec<_> = EventKind::all().iter().map(|k| k.key()).collect();
        assert_eq!(keys, ["join", "leave", "death"]);
        assert_eq!(EventKind::Death.to_string(), "death");
    }

    #[test]
    fn test_player_event_display() {
        let join = PlayerEvent::new(EventKind::Join, "Alice", "Alice joined the game", None);
        assert_eq!(join.to_string(), "join: Alice");

        let death = PlayerEvent::new(
            EventKind::Death,
            "Bob",
            "[12:00:01] [Server thread/INFO]: Bob drowned",
            Some("Bob drowned".to_string()),
        );
        assert_eq!(death.to_string(), "death: Bob drowned");
        assert_eq!(death.message(), Some("Bob drowned"));
    }
}
