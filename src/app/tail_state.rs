// McNotify - app/tail_state.rs
//
// Tail state persistence: the log path, how far into it we have read, and
// the file size observed at that time. Lets the tailer resume after a
// restart without replaying or skipping lines.
//
// Design principles:
// - State is saved atomically (write->temp, rename->final) so a crash
//   during save leaves either the previous or the new state. Rename
//   atomicity is best-effort on some filesystems; this is a known gap.
// - Load never fails: a missing, unreadable, or malformed file is "no
//   state" and the tailer falls back to its start-from-end policy.
// - Missing fields default to zero/empty so older or hand-edited state
//   files still load.
// - A crash between reading bytes and saving state re-delivers those lines
//   on restart. Exactly-once delivery is not attempted.

use crate::util::error::StateError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Durable tailer progress.
///
/// Written by the tailer after every poll that managed to stat the log
/// file, read once at startup. The tailer is the only writer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailState {
    /// Log file this state refers to, as configured.
    pub log_path: String,

    /// Number of bytes of the log already consumed.
    pub offset_bytes: u64,

    /// Size of the log file when the state was written.
    pub file_size_bytes: u64,
}

/// Resolve the default state file path from the platform data directory.
pub fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join(crate::util::constants::STATE_FILE_NAME)
}

/// Save `state` to `path` atomically (write temp -> rename).
///
/// Creates all parent directories as needed. The tailer logs and ignores
/// failures; the next poll tries again.
pub fn save(path: &Path, state: &TailState) -> Result<(), StateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StateError::Io {
            path: parent.to_path_buf(),
            operation: "create directory for",
            source,
        })?;
    }

    let json =
        serde_json::to_string_pretty(state).map_err(|source| StateError::Serialise { source })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes()).map_err(|source| StateError::Io {
        path: tmp.clone(),
        operation: "write",
        source,
    })?;

    std::fs::rename(&tmp, path).map_err(|source| {
        // Clean up the temp file on failure; ignore any secondary error.
        let _ = std::fs::remove_file(&tmp);
        StateError::Io {
            path: path.to_path_buf(),
            operation: "finalise",
            source,
        }
    })?;

    tracing::trace!(
        path = %path.display(),
        offset = state.offset_bytes,
        size = state.file_size_bytes,
        "Tail state saved"
    );
    Ok(())
}

/// Load a `TailState` from `path`.
///
/// Returns `None` on any error (file not found, unreadable, JSON parse
/// failure). The caller treats `None` as "no previous run".
pub fn load(path: &Path) -> Option<TailState> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            // "Not found" is the normal first run.
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read tail state file");
            }
        })
        .ok()?;

    let state: TailState = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Tail state file is malformed; ignoring it"
            );
        })
        .ok()?;

    tracing::debug!(
        path = %path.display(),
        log_path = %state.log_path,
        offset = state.offset_bytes,
        "Tail state loaded"
    );
    Some(state)
}

// =============================================================================
// Unit tests
// =============================================================================
