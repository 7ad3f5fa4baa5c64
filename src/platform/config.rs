// McNotify - platform/config.rs
//
// Platform data directory resolution and config file loading with startup
// validation.
//
// The config file is TOML; a file with a `.json` extension is read as JSON
// instead, with the same keys. Missing or invalid *required* fields
// (`channel_id`, `log_path`) are fatal. Optional fields that are out of
// range produce a warning and fall back to their default.
//
// Everything here runs before logging is initialised, so nothing logs:
// problems come back as a `ConfigError` or as warning strings the caller
// logs once the subscriber is installed.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance when locating the default config and state
// files.

use crate::core::template::MessageTemplates;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved platform paths for McNotify data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/mcnotify/).
    pub config_dir: PathBuf,

    /// Data directory for the tail state file.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined. Runs before logging is initialised, so it does not log;
    /// the caller reports the resolved paths once a subscriber exists.
    pub fn resolve() -> Self {
        match ProjectDirs::from("", "", constants::APP_ID) {
            Some(proj_dirs) => Self {
                config_dir: proj_dirs.config_dir().to_path_buf(),
                data_dir: proj_dirs.data_dir().to_path_buf(),
            },
            None => {
                let fallback = PathBuf::from(".");
                Self {
                    config_dir: fallback.clone(),
                    data_dir: fallback,
                }
            }
        }
    }

    /// Config file to use when none was given on the command line:
    /// `config.toml` in the working directory if it exists, otherwise the
    /// one in the platform config directory.
    pub fn default_config_file(&self) -> PathBuf {
        self.config_file_in(Path::new("."))
    }

    fn config_file_in(&self, working_dir: &Path) -> PathBuf {
        let local = working_dir.join(constants::CONFIG_FILE_NAME);
        if local.is_file() {
            local
        } else {
            self.config_dir.join(constants::CONFIG_FILE_NAME)
        }
    }
}

// =============================================================================
// Raw file shape
// =============================================================================

/// Raw deserialisable shape of the config file.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Discord channel that receives notifications.
    pub channel_id: Option<ChannelIdValue>,
    /// Path of the server's `latest.log`.
    pub log_path: Option<String>,
    /// Skip the existing backlog when there is no usable saved state.
    pub start_from_end: Option<bool>,
    /// Seconds between polls of the log file.
    pub poll_interval_seconds: Option<f64>,
    /// Seconds during which a repeated (kind, player) event is suppressed.
    pub debounce_seconds: Option<f64>,
    /// Message templates keyed by event kind.
    pub messages: Option<HashMap<String, String>>,
    /// Tail state file override.
    pub state_path: Option<String>,
    /// Capacity of the hand-off queue.
    pub queue_capacity: Option<usize>,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `channel_id` may be written as a number or as a numeric string (JSON
/// configs often quote snowflake IDs).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChannelIdValue {
    Number(i64),
    Text(String),
}

/// `[logging]` config section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

// =============================================================================
// Validated config
// =============================================================================

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub channel_id: u64,
    pub log_path: PathBuf,
    pub start_from_end: bool,
    pub poll_interval: Duration,
    pub debounce: Duration,
    pub templates: MessageTemplates,
    /// `None` means "use the platform data directory".
    pub state_path: Option<PathBuf>,
    pub queue_capacity: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

/// Load and validate the config file at `path`.
///
/// Returns the validated config plus non-fatal warnings. Any error is fatal
/// at startup: the file is unreadable or unparseable, or a required field
/// is missing or invalid.
pub fn load_config(path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let raw: RawConfig = if is_json {
        serde_json::from_str(&content).map_err(|source| ConfigError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?
    };

    validate(raw)
}

/// Validate a parsed config, accumulating warnings for optional fields.
pub fn validate(raw: RawConfig) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let mut warnings: Vec<String> = Vec::new();

    // -- Required: channel_id --
    let channel_id = match raw.channel_id {
        None => return Err(ConfigError::MissingField { field: "channel_id" }),
        Some(value) => parse_channel_id(&value)?,
    };

    // -- Required: log_path --
    let log_path = match raw.log_path.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => return Err(ConfigError::MissingField { field: "log_path" }),
    };

    // -- poll_interval_seconds --
    let mut poll_secs = constants::DEFAULT_POLL_INTERVAL_SECS;
    if let Some(secs) = raw.poll_interval_seconds {
        if secs.is_finite()
            && (constants::MIN_POLL_INTERVAL_SECS..=constants::MAX_POLL_INTERVAL_SECS).contains(&secs)
        {
            poll_secs = secs;
        } else {
            warnings.push(format!(
                "poll_interval_seconds = {secs} is out of range ({}-{}). Using default ({}).",
                constants::MIN_POLL_INTERVAL_SECS,
                constants::MAX_POLL_INTERVAL_SECS,
                constants::DEFAULT_POLL_INTERVAL_SECS,
            ));
        }
    }

    // -- debounce_seconds --
    let mut debounce_secs = constants::DEFAULT_DEBOUNCE_SECS;
    if let Some(secs) = raw.debounce_seconds {
        if secs.is_finite() && (0.0..=constants::MAX_DEBOUNCE_SECS).contains(&secs) {
            debounce_secs = secs;
        } else {
            warnings.push(format!(
                "debounce_seconds = {secs} is out of range (0-{}). Using default ({}).",
                constants::MAX_DEBOUNCE_SECS,
                constants::DEFAULT_DEBOUNCE_SECS,
            ));
        }
    }

    // -- queue_capacity --
    let mut queue_capacity = constants::DEFAULT_QUEUE_CAPACITY;
    if let Some(cap) = raw.queue_capacity {
        if (1..=constants::MAX_QUEUE_CAPACITY).contains(&cap) {
            queue_capacity = cap;
        } else {
            warnings.push(format!(
                "queue_capacity = {cap} is out of range (1-{}). Using default ({}).",
                constants::MAX_QUEUE_CAPACITY,
                constants::DEFAULT_QUEUE_CAPACITY,
            ));
        }
    }

    // -- messages --
    let templates = match raw.messages {
        Some(ref map) => {
            let (templates, unknown) = MessageTemplates::from_map(map);
            for key in unknown {
                warnings.push(format!(
                    "messages.{key} is not recognised. Valid keys: join, leave, death.",
                ));
            }
            for (key, template) in [("join", &templates.join), ("leave", &templates.leave)] {
                if !template.contains("{player}") {
                    warnings.push(format!(
                        "messages.{key} has no {{player}} placeholder; every notification will read the same.",
                    ));
                }
            }
            templates
        }
        None => MessageTemplates::default(),
    };

    // -- state_path --
    let state_path = raw
        .state_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    // -- Logging: level --
    let mut log_level = None;
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    let log_file = raw.logging.file.filter(|f| !f.is_empty());

    let config = AppConfig {
        channel_id,
        log_path,
        start_from_end: raw.start_from_end.unwrap_or(true),
        poll_interval: Duration::from_secs_f64(poll_secs),
        debounce: Duration::from_secs_f64(debounce_secs),
        templates,
        state_path,
        queue_capacity,
        log_level,
        log_file,
    };

    Ok((config, warnings))
}

fn parse_channel_id(value: &ChannelIdValue) -> Result<u64, ConfigError> {
    let parsed = match value {
        ChannelIdValue::Number(n) => u64::try_from(*n).ok(),
        ChannelIdValue::Text(s) => s.trim().parse::<u64>().ok(),
    };

    match parsed {
        Some(id) if id > 0 => Ok(id),
        _ => Err(ConfigError::ValueOutOfRange {
            field: "channel_id".to_string(),
            value: match value {
                ChannelIdValue::Number(n) => n.to_string(),
                ChannelIdValue::Text(s) => s.clone(),
            },
            expected: "a positive Discord channel ID".to_string(),
        }),
    }
}

// =============================================================================
// Unit tests
// =============================================================================
