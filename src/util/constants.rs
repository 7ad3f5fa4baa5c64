// McNotify - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every tunable that appears in config validation has its bounds here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "McNotify";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "McNotify";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Live tail limits
// =============================================================================

/// Default interval between two polls of the server log (seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 0.25;

/// Minimum user-configurable poll interval (seconds).
pub const MIN_POLL_INTERVAL_SECS: f64 = 0.01;

/// Maximum user-configurable poll interval (seconds).
pub const MAX_POLL_INTERVAL_SECS: f64 = 60.0;

/// How often the stop flag is checked within each poll sleep interval (ms).
/// The tailer thread wakes every this many ms to check for a stop request.
pub const TAIL_CANCEL_CHECK_INTERVAL_MS: u64 = 50;

/// Size of a single read from the log file. A poll reads every new byte up
/// to the observed file size, in chunks of this size.
pub const TAIL_READ_CHUNK_BYTES: usize = 64 * 1_024; // 64 KiB

/// Maximum accumulated size of the partial (in-progress) line buffer.
///
/// Guards against unbounded growth when the log produces no newlines
/// (binary content, or the wrong file configured). When exceeded the
/// fragment is discarded and a warning is emitted.
pub const MAX_TAIL_PARTIAL_BYTES: usize = 1_024 * 1_024; // 1 MiB

// =============================================================================
// Event delivery
// =============================================================================

/// Default debounce window for repeated (kind, player) events (seconds).
pub const DEFAULT_DEBOUNCE_SECS: f64 = 2.0;

/// Maximum user-configurable debounce window (seconds).
pub const MAX_DEBOUNCE_SECS: f64 = 3_600.0;

/// Default capacity of the tailer -> delivery hand-off queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Maximum user-configurable queue capacity.
pub const MAX_QUEUE_CAPACITY: usize = 65_536;

/// Default message for a join event. `{player}` is substituted.
pub const DEFAULT_JOIN_TEMPLATE: &str = "**{player}** joined";

/// Default message for a leave event.
pub const DEFAULT_LEAVE_TEMPLATE: &str = "**{player}** left";

/// Default message for a death event. `{message}` is the full death line
/// starting with the player name.
pub const DEFAULT_DEATH_TEMPLATE: &str = "{message}";

// =============================================================================
// Discord
// =============================================================================

/// Base URL of the Discord REST API.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Environment variable holding the bot token.
pub const DISCORD_TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Optional file in the working directory holding `DISCORD_TOKEN=...`.
pub const DOTENV_FILE_NAME: &str = ".env";

/// Per-request timeout of the Discord HTTP client (seconds).
pub const DISCORD_HTTP_TIMEOUT_SECS: u64 = 15;

/// User-Agent sent with every Discord request (required by the API).
pub const DISCORD_USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/swatto86/mcnotify, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Longest response body kept in a `DeliveryError::Rejected` (chars).
pub const MAX_ERROR_BODY_CHARS: usize = 300;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name (looked up in the working directory by default).
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Tail state file name (stored in the platform data directory).
pub const STATE_FILE_NAME: &str = "state.json";
