// McNotify - app/tail.rs
//
// Resumable log tailer: polls the server log for appended bytes, splits
// them into lines, classifies each line, and hands events to a callback.
//
// Architecture:
//   - `LogTailer::run` executes on a dedicated thread. All blocking file I/O
//     and sleeping stays on that thread.
//   - An `Arc<AtomicBool>` stop flag (`TailStopHandle`) ends the loop
//     cooperatively: it is checked at the top of each poll and between the
//     sleep slices, never in the middle of a read.
//   - Progress (`TailState`) is persisted after every poll that managed to
//     stat the file, so a restart resumes at the last consumed byte.
//
// Phases: Initializing -> Polling -> Stopped.
//
// Failure handling:
//   - A missing or unreadable log file skips the poll; it is reported once
//     per outage at WARN and at DEBUG afterwards.
//   - Read errors are logged and the poll ends early; bytes consumed before
//     the error stay consumed.
//   - Truncation/rotation (size < offset) resets the offset to 0 and drops
//     the partial-line buffer. A replacement file that is already larger
//     than the old offset looks like ordinary growth and is not detected.
//   - Lines are decoded as lossy UTF-8; the partial-line buffer holds raw
//     bytes so multi-byte characters split across reads decode correctly.

use crate::app::tail_state::{self, TailState};
use crate::core::classifier;
use crate::core::model::PlayerEvent;
use crate::platform::fs;
use crate::util::constants::{
    DEBUG_MAX_LINE_PREVIEW, MAX_TAIL_PARTIAL_BYTES, TAIL_CANCEL_CHECK_INTERVAL_MS,
    TAIL_READ_CHUNK_BYTES,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// Public types
// =============================================================================

/// Everything the tailer needs to know about the file it follows.
#[derive(Debug, Clone)]
pub struct TailerSettings {
    /// Server log to follow (e.g. `logs/latest.log`).
    pub log_path: PathBuf,
    /// Where progress is persisted between runs.
    pub state_path: PathBuf,
    /// With no usable saved state: skip the existing backlog (true) or
    /// replay the whole file (false).
    pub start_from_end: bool,
    /// Sleep between two polls.
    pub poll_interval: Duration,
}

/// Lifecycle of a `LogTailer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailerPhase {
    Initializing,
    Polling,
    Stopped,
}

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The log file could not be stat'ed; nothing was read or persisted.
    FileMissing,
    /// The file had no new bytes.
    Idle { truncated: bool },
    /// `bytes` new bytes were consumed and produced `events` events.
    Read {
        bytes: u64,
        events: usize,
        truncated: bool,
    },
}

/// Cloneable handle used to stop a running tailer from another thread.
#[derive(Debug, Clone)]
pub struct TailStopHandle(Arc<AtomicBool>);

impl TailStopHandle {
    /// Request the tailer to stop. It exits before starting another poll.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// LogTailer
// =============================================================================

/// Polling, offset-tracked follower of a single log file.
pub struct LogTailer {
    settings: TailerSettings,
    phase: TailerPhase,
    /// Byte position of the next unread byte. Only moves forward, except
    /// when truncation resets it to 0.
    offset: u64,
    /// Bytes after the last newline seen: an incomplete line waiting for
    /// the rest of its content.
    partial: Vec<u8>,
    /// Set after an oversized partial line was discarded: input is dropped
    /// up to and including the next newline, so the tail of that line is
    /// never classified on its own.
    skip_to_newline: bool,
    stop: Arc<AtomicBool>,
    /// True while the log file is missing and the outage was already reported.
    missing_reported: bool,
}

impl LogTailer {
    pub fn new(settings: TailerSettings) -> Self {
        Self {
            settings,
            phase: TailerPhase::Initializing,
            offset: 0,
            partial: Vec::new(),
            skip_to_newline: false,
            stop: Arc::new(AtomicBool::new(false)),
            missing_reported: false,
        }
    }

    pub fn stop_handle(&self) -> TailStopHandle {
        TailStopHandle(Arc::clone(&self.stop))
    }

    pub fn phase(&self) -> TailerPhase {
        self.phase
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The buffered incomplete line, if any.
    pub fn partial_line(&self) -> &[u8] {
        &self.partial
    }

    /// Compute the offset to start polling from.
    ///
    /// Saved state is honoured only when it names the configured log
    /// (case-insensitive). Its offset is resumed when it still fits inside
    /// the file; a larger offset means the log shrank while we were down,
    /// so reading restarts at 0. Without applicable state `start_from_end`
    /// picks between the current size and 0. A missing log file always
    /// starts at 0.
    pub fn initial_offset(&self) -> u64 {
        let size = match fs::file_len(&self.settings.log_path) {
            Ok(size) => size,
            Err(e) => {
                tracing::debug!(
                    file = %self.settings.log_path.display(),
                    error = %e,
                    "Log file not available at startup; starting at offset 0"
                );
                return 0;
            }
        };

        if let Some(state) = tail_state::load(&self.settings.state_path) {
            let configured = self.settings.log_path.to_string_lossy();
            if fs::same_path(&state.log_path, &configured) {
                if state.offset_bytes <= size {
                    tracing::info!(
                        file = %self.settings.log_path.display(),
                        offset = state.offset_bytes,
                        size,
                        "Resuming from saved tail state"
                    );
                    return state.offset_bytes;
                }
                // Truncated or rotated while we were not running.
                tracing::info!(
                    file = %self.settings.log_path.display(),
                    saved_offset = state.offset_bytes,
                    size,
                    "Log shrank since the last run; reading it from the start"
                );
                return 0;
            }
            tracing::info!(
                saved_path = %state.log_path,
                saved_offset = state.offset_bytes,
                size,
                "Saved tail state does not apply to the current log; ignoring it"
            );
        }

        if self.settings.start_from_end {
            size
        } else {
            0
        }
    }

    /// Leave `Initializing`: seed the offset and enter `Polling`.
    pub fn start(&mut self) -> u64 {
        self.offset = self.initial_offset();
        self.partial.clear();
        self.skip_to_newline = false;
        self.phase = TailerPhase::Polling;
        tracing::info!(
            file = %self.settings.log_path.display(),
            offset = self.offset,
            start_from_end = self.settings.start_from_end,
            "Log tailer started"
        );
        self.offset
    }

    /// Poll until the stop handle fires, calling `on_event` for every
    /// recognised line. Blocks the calling thread.
    pub fn run<F: FnMut(PlayerEvent)>(&mut self, mut on_event: F) {
        if self.phase == TailerPhase::Initializing {
            self.start();
        }

        while !self.stop.load(Ordering::SeqCst) {
            let outcome = self.poll_once(&mut on_event);
            tracing::trace!(?outcome, offset = self.offset, "Tail poll complete");

            if self.sleep_interruptibly() {
                break;
            }
        }

        self.phase = TailerPhase::Stopped;
        tracing::info!(
            file = %self.settings.log_path.display(),
            offset = self.offset,
            "Log tailer stopped"
        );
    }

    /// Run one poll iteration: stat, handle truncation, read new bytes,
    /// classify complete lines, persist state. Never returns an error.
    pub fn poll_once<F: FnMut(PlayerEvent)>(&mut self, on_event: &mut F) -> PollOutcome {
        // -----------------------------------------------------------------
        // 1. Check current file size.
        // -----------------------------------------------------------------
        let size = match fs::file_len(&self.settings.log_path) {
            Ok(size) => {
                if self.missing_reported {
                    tracing::info!(file = %self.settings.log_path.display(), "Log file available again");
                    self.missing_reported = false;
                }
                size
            }
            Err(e) => {
                if self.missing_reported {
                    tracing::debug!(file = %self.settings.log_path.display(), error = %e, "Tail: stat error");
                } else {
                    tracing::warn!(
                        file = %self.settings.log_path.display(),
                        error = %e,
                        "Log file not available; will keep retrying"
                    );
                    self.missing_reported = true;
                }
                return PollOutcome::FileMissing;
            }
        };

        // -----------------------------------------------------------------
        // 2. Handle rotation / truncation.
        // -----------------------------------------------------------------
        let truncated = size < self.offset;
        if truncated {
            tracing::info!(
                file = %self.settings.log_path.display(),
                old_offset = self.offset,
                new_size = size,
                "Log truncated or rotated; resetting offset to 0"
            );
            self.offset = 0;
            self.partial.clear();
            self.skip_to_newline = false;
        }

        // -----------------------------------------------------------------
        // 3. Read everything up to the observed size.
        // -----------------------------------------------------------------
        let (bytes, events) = if size > self.offset {
            self.read_new_bytes(size, on_event)
        } else {
            (0, 0)
        };

        // -----------------------------------------------------------------
        // 4. Persist progress, even when nothing was read, so the stored
        //    file size stays fresh.
        // -----------------------------------------------------------------
        self.persist(size);

        if bytes == 0 {
            PollOutcome::Idle { truncated }
        } else {
            PollOutcome::Read {
                bytes,
                events,
                truncated,
            }
        }
    }

    /// Feed raw bytes through the line splitter and classifier.
    ///
    /// Complete lines (terminated by `\n`) are classified immediately; the
    /// trailing fragment is buffered and prefixed to the next call.
    /// Returns the number of events emitted.
    pub fn feed<F: FnMut(PlayerEvent)>(&mut self, bytes: &[u8], on_event: &mut F) -> usize {
        let mut bytes = bytes;
        if self.skip_to_newline {
            match bytes.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    bytes = &bytes[pos + 1..];
                    self.skip_to_newline = false;
                }
                None => return 0,
            }
        }
        self.partial.extend_from_slice(bytes);

        let mut events = 0;
        let mut start = 0;
        while let Some(pos) = self.partial[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            let line = String::from_utf8_lossy(&self.partial[start..end]);

            if let Some(event) = classifier::classify(&line) {
                tracing::debug!(
                    kind = %event.kind(),
                    player = event.player(),
                    line = %preview(event.raw_line()),
                    "Player event"
                );
                on_event(event);
                events += 1;
            }
            start = end + 1;
        }
        self.partial.drain(..start);

        if self.partial.len() > MAX_TAIL_PARTIAL_BYTES {
            tracing::warn!(
                file = %self.settings.log_path.display(),
                bytes = self.partial.len(),
                limit = MAX_TAIL_PARTIAL_BYTES,
                "Discarding oversized incomplete line"
            );
            self.partial.clear();
            self.skip_to_newline = true;
        }

        events
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Read from `self.offset` up to `size` in bounded chunks, advancing the
    /// offset by exactly the bytes read. Returns (bytes, events).
    fn read_new_bytes<F: FnMut(PlayerEvent)>(&mut self, size: u64, on_event: &mut F) -> (u64, usize) {
        let wanted = size - self.offset;
        let file = match fs::open_at(&self.settings.log_path, self.offset) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(file = %self.settings.log_path.display(), error = %e, "Tail: open error");
                return (0, 0);
            }
        };

        let mut reader = file.take(wanted);
        let chunk = usize::try_from(wanted)
            .unwrap_or(usize::MAX)
            .min(TAIL_READ_CHUNK_BYTES);
        let mut buf = vec![0u8; chunk];

        let mut bytes = 0u64;
        let mut events = 0;
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    // Advance unconditionally: these bytes are consumed whether
                    // or not they complete a line.
                    self.offset += n as u64;
                    bytes += n as u64;
                    events += self.feed(&buf[..n], on_event);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(
                        file = %self.settings.log_path.display(),
                        offset = self.offset,
                        error = %e,
                        "Tail: read error"
                    );
                    break;
                }
            }
        }

        (bytes, events)
    }

    fn persist(&self, size: u64) {
        let state = TailState {
            log_path: self.settings.log_path.to_string_lossy().into_owned(),
            offset_bytes: self.offset,
            file_size_bytes: size,
        };
        if let Err(e) = tail_state::save(&self.settings.state_path, &state) {
            tracing::warn!(error = %e, "Failed to persist tail state");
        }
    }

    /// Sleep for one poll interval, waking every
    /// `TAIL_CANCEL_CHECK_INTERVAL_MS` to check the stop flag.
    /// Returns true if a stop was requested.
    fn sleep_interruptibly(&self) -> bool {
        let deadline = Instant::now() + self.settings.poll_interval;
        let slice = Duration::from_millis(TAIL_CANCEL_CHECK_INTERVAL_MS);

        loop {
            if self.stop.load(Ordering::SeqCst) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(slice.min(deadline - now));
        }
    }
}

/// Shorten a line for debug output.
fn preview(line: &str) -> &str {
    match line.char_indices().nth(DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EventKind;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "[12:00:00] [Server thread/INFO]: ";

    fn settings(dir: &TempDir, start_from_end: bool) -> TailerSettings {
        TailerSettings {
            log_path: dir.path().join("latest.log"),
            state_path: dir.path().join("state.json"),
            start_from_end,
            poll_interval: Duration::from_millis(10),
        }
    }

    fn append(path: &std::path::Path, text: &str) {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        f.write_all(text.as_bytes()).unwrap();
    }

    fn poll(tailer: &mut LogTailer) -> (PollOutcome, Vec<PlayerEvent>) {
        let mut events = Vec::new();
        let outcome = tailer.poll_once(&mut |e| events.push(e));
        (outcome, events)
    }

    #[test]
    fn test_feed_buffers_partial_line() {
        let dir = TempDir::new().unwrap();
        let mut tailer = LogTailer::new(settings(&dir, false));

        let mut events = Vec::new();
        let n = tailer.feed(b"Steve joined the game\npartial", &mut |e| events.push(e));

        assert_eq!(n, 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::Join);
        assert_eq!(events[0].player(), "Steve");
        assert_eq!(tailer.partial_line(), b"partial");

        // Completing the fragment classifies the whole line exactly once.
        let n = tailer.feed(b" line\n", &mut |e| events.push(e));
        assert_eq!(n, 0);
        assert!(tailer.partial_line().is_empty());
    }

    /// A line split across two reads is classified once, as a whole.
    #[test]
    fn test_feed_joins_split_line() {
        let dir = TempDir::new().unwrap();
        let mut tailer = LogTailer::new(settings(&dir, false));

        let mut events = Vec::new();
        assert_eq!(tailer.feed(format!("{HEADER}Ali").as_bytes(), &mut |e| events.push(e)), 0);
        assert_eq!(tailer.feed(b"ce left the game\r\n", &mut |e| events.push(e)), 1);
        assert_eq!(events[0].kind(), EventKind::Leave);
        assert_eq!(events[0].player(), "Alice");
    }

    /// Multi-byte characters split across reads must not be mangled or panic.
    #[test]
    fn test_feed_multibyte_split_and_invalid_bytes() {
        let dir = TempDir::new().unwrap();
        let mut tailer = LogTailer::new(settings(&dir, false));

        let mut events = Vec::new();
        tailer.feed(format!("{HEADER}Pepe se ahog").as_bytes(), &mut |e| events.push(e));
        tailer.feed(b"\xc3", &mut |e| events.push(e));
        tailer.feed(b"\xb3\n\xff\xfe garbage\n", &mut |e| events.push(e));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::Death);
        assert_eq!(events[0].message(), Some("Pepe se ahogó"));
    }

    #[test]
    fn test_feed_discards_oversized_partial() {
        let dir = TempDir::new().unwrap();
        let mut tailer = LogTailer::new(settings(&dir, false));

        let blob = vec![b'x'; MAX_TAIL_PARTIAL_BYTES + 1];
        tailer.feed(&blob, &mut |_| {});
        assert!(tailer.partial_line().is_empty());
    }

    /// The remainder of a discarded line is skipped up to its newline and
    /// never classified as a line of its own.
    #[test]
    fn test_feed_skips_rest_of_discarded_line() {
        let dir = TempDir::new().unwrap();
        let mut tailer = LogTailer::new(settings(&dir, false));
        let mut events = Vec::new();

        let blob = vec![b'x'; MAX_TAIL_PARTIAL_BYTES + 1];
        tailer.feed(&blob, &mut |e| events.push(e));
        assert_eq!(tailer.feed(b"more filler", &mut |e| events.push(e)), 0);
        assert!(tailer.partial_line().is_empty());

        let n = tailer.feed(
            format!("{HEADER}Steve joined the game\n{HEADER}Alex joined the game\n").as_bytes(),
            &mut |e| events.push(e),
        );

        assert_eq!(n, 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].player(), "Alex");
    }

    /// A log path that can be stat'ed but not read (a directory) ends the
    /// poll quietly: nothing consumed, state still saved.
    #[test]
    fn test_read_error_keeps_offset_and_persists_state() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("latest.log");
        std::fs::create_dir(&log_dir).unwrap();
        std::fs::write(log_dir.join("filler"), b"x").unwrap();

        let s = settings(&dir, false);
        let state_path = s.state_path.clone();
        let mut tailer = LogTailer::new(s);
        assert_eq!(tailer.start(), 0);

        let (outcome, events) = poll(&mut tailer);
        assert_eq!(outcome, PollOutcome::Idle { truncated: false });
        assert!(events.is_empty());
        assert_eq!(tailer.offset(), 0);

        let saved = tail_state::load(&state_path).expect("state saved after read error");
        assert_eq!(saved.offset_bytes, 0);
        assert_eq!(
            saved.file_size_bytes,
            std::fs::metadata(&log_dir).unwrap().len()
        );
    }

    #[test]
    fn test_start_from_end_skips_backlog() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, true);
        append(&s.log_path, &format!("{HEADER}Alice joined the game\n"));

        let mut tailer = LogTailer::new(s.clone());
        assert_eq!(tailer.start(), std::fs::metadata(&s.log_path).unwrap().len());
        assert_eq!(tailer.phase(), TailerPhase::Polling);

        let (outcome, events) = poll(&mut tailer);
        assert_eq!(outcome, PollOutcome::Idle { truncated: false });
        assert!(events.is_empty());

        append(&s.log_path, &format!("{HEADER}Bob joined the game\n"));
        let (_, events) = poll(&mut tailer);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].player(), "Bob");
    }

    #[test]
    fn test_start_from_beginning_replays_backlog() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, false);
        append(
            &s.log_path,
            &format!("{HEADER}Alice joined the game\n{HEADER}Bob was slain by Zombie\n"),
        );

        let mut tailer = LogTailer::new(s);
        assert_eq!(tailer.start(), 0);

        let (outcome, events) = poll(&mut tailer);
        assert!(matches!(outcome, PollOutcome::Read { events: 2, .. }));
        assert_eq!(events[0].kind(), EventKind::Join);
        assert_eq!(events[1].kind(), EventKind::Death);
    }

    /// Offset never decreases without truncation and always equals the
    /// cumulative number of bytes read.
    #[test]
    fn test_offset_monotonic_and_cumulative() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, false);
        append(&s.log_path, "");
        let mut tailer = LogTailer::new(s.clone());
        tailer.start();

        let mut total = 0u64;
        let mut last = 0u64;
        for i in 0..5 {
            let chunk = format!("{HEADER}line {i} of noise\n");
            append(&s.log_path, &chunk);
            let (outcome, _) = poll(&mut tailer);
            let bytes = match outcome {
                PollOutcome::Read { bytes, .. } => bytes,
                other => panic!("expected a read, got {other:?}"),
            };
            total += bytes;
            assert!(tailer.offset() >= last);
            assert_eq!(tailer.offset(), total);
            last = tailer.offset();
        }

        let state = tail_state::load(&s.state_path).unwrap();
        assert_eq!(state.offset_bytes, total);
        assert_eq!(state.file_size_bytes, total);
    }

    #[test]
    fn test_truncation_resets_to_start() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, false);
        append(&s.log_path, &format!("{HEADER}Alice joined the game\n{HEADER}noise noise\n"));

        let mut tailer = LogTailer::new(s.clone());
        tailer.start();
        let (_, events) = poll(&mut tailer);
        assert_eq!(events.len(), 1);

        // Rotation: the file is replaced by a shorter one.
        std::fs::write(&s.log_path, format!("{HEADER}Bob joined the game\n")).unwrap();
        let (outcome, events) = poll(&mut tailer);
        assert!(matches!(outcome, PollOutcome::Read { truncated: true, events: 1, .. }));
        assert_eq!(events[0].player(), "Bob");
        assert_eq!(tailer.offset(), std::fs::metadata(&s.log_path).unwrap().len());
    }

    /// Truncation also discards a buffered incomplete line from the old file.
    #[test]
    fn test_truncation_clears_partial() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, false);
        append(&s.log_path, &format!("{HEADER}padding padding padding\n{HEADER}Ali"));

        let mut tailer = LogTailer::new(s.clone());
        tailer.start();
        poll(&mut tailer);
        assert!(!tailer.partial_line().is_empty());

        std::fs::write(&s.log_path, "").unwrap();
        let (outcome, _) = poll(&mut tailer);
        assert_eq!(outcome, PollOutcome::Idle { truncated: true });
        assert!(tailer.partial_line().is_empty());
        assert_eq!(tailer.offset(), 0);
    }

    /// A restart with valid saved state resumes without re-emitting events.
    #[test]
    fn test_resume_does_not_reemit() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, false);
        append(&s.log_path, &format!("{HEADER}Alice joined the game\n"));

        let mut first = LogTailer::new(s.clone());
        first.start();
        let (_, events) = poll(&mut first);
        assert_eq!(events.len(), 1);
        let consumed = first.offset();
        drop(first);

        append(&s.log_path, &format!("{HEADER}Bob joined the game\n"));

        let mut second = LogTailer::new(s);
        assert_eq!(second.start(), consumed);
        let (_, events) = poll(&mut second);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].player(), "Bob");
    }

    #[test]
    fn test_resume_path_compare_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, true);
        append(&s.log_path, &format!("{HEADER}Alice joined the game\n"));

        let saved = TailState {
            log_path: s.log_path.to_string_lossy().to_uppercase(),
            offset_bytes: 0,
            file_size_bytes: 0,
        };
        tail_state::save(&s.state_path, &saved).unwrap();

        let tailer = LogTailer::new(s);
        assert_eq!(tailer.initial_offset(), 0);
    }

    #[test]
    fn test_saved_state_for_other_log_is_ignored() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, true);
        append(&s.log_path, "0123456789\n");

        let saved = TailState {
            log_path: "/somewhere/else/latest.log".to_string(),
            offset_bytes: 3,
            file_size_bytes: 11,
        };
        tail_state::save(&s.state_path, &saved).unwrap();

        assert_eq!(LogTailer::new(s).initial_offset(), 11);
    }

    /// Saved offset beyond the file end restarts at 0 and replays the
    /// shrunken file, even when configured to start from the end.
    #[test]
    fn test_saved_offset_beyond_size_rereads_from_start() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, true);
        append(&s.log_path, &format!("{HEADER}Alice joined the game\n"));

        let saved = TailState {
            log_path: s.log_path.to_string_lossy().into_owned(),
            offset_bytes: 10_000,
            file_size_bytes: 10_000,
        };
        tail_state::save(&s.state_path, &saved).unwrap();

        let mut tailer = LogTailer::new(s);
        assert_eq!(tailer.start(), 0);
        let (_, events) = poll(&mut tailer);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].player(), "Alice");
    }

    #[test]
    fn test_missing_file_skips_poll_without_persisting() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, true);
        let mut tailer = LogTailer::new(s.clone());
        assert_eq!(tailer.start(), 0);

        let (outcome, events) = poll(&mut tailer);
        assert_eq!(outcome, PollOutcome::FileMissing);
        assert!(events.is_empty());
        assert!(!s.state_path.exists());

        // The file appears later and is read from the start.
        append(&s.log_path, &format!("{HEADER}Alice joined the game\n"));
        let (_, events) = poll(&mut tailer);
        assert_eq!(events.len(), 1);
    }

    /// An idle poll still refreshes the persisted file size.
    #[test]
    fn test_idle_poll_persists_state() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, true);
        append(&s.log_path, "abc\n");

        let mut tailer = LogTailer::new(s.clone());
        tailer.start();
        let (outcome, _) = poll(&mut tailer);
        assert_eq!(outcome, PollOutcome::Idle { truncated: false });

        let state = tail_state::load(&s.state_path).unwrap();
        assert_eq!(state.offset_bytes, 4);
        assert_eq!(state.file_size_bytes, 4);
        assert_eq!(state.log_path, s.log_path.to_string_lossy());
    }

    #[test]
    fn test_run_stops_on_handle() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, false);
        append(&s.log_path, &format!("{HEADER}Alice joined the game\n"));

        let mut tailer = LogTailer::new(s);
        let stop = tailer.stop_handle();
        let (tx, rx) = std::sync::mpsc::channel();

        let worker = std::thread::spawn(move || {
            tailer.run(|e| {
                let _ = tx.send(e);
            });
            tailer
        });

        let event = rx.recv_timeout(Duration::from_secs(5)).expect("event from tailer thread");
        assert_eq!(event.player(), "Alice");

        stop.stop();
        assert!(stop.is_stopped());
        let tailer = worker.join().unwrap();
        assert_eq!(tailer.phase(), TailerPhase::Stopped);
    }

    /// A tailer started before `run` keeps the seeded offset, so lines
    /// written between `start` and the first poll are not skipped.
    #[test]
    fn test_run_keeps_offset_seeded_by_start() {
        let dir = TempDir::new().unwrap();
        let s = settings(&dir, true);
        append(&s.log_path, &format!("{HEADER}Old joined the game\n"));

        let mut tailer = LogTailer::new(s.clone());
        let seeded = tailer.start();
        assert_eq!(tailer.phase(), TailerPhase::Polling);
        append(&s.log_path, &format!("{HEADER}Steve joi"));

        let stop = tailer.stop_handle();
        let (tx, rx) = std::sync::mpsc::channel();
        let worker = std::thread::spawn(move || {
            tailer.run(|e| {
                let _ = tx.send(e);
            });
        });

        append(&s.log_path, "ned the game\n");
        let event = rx.recv_timeout(Duration::from_secs(5)).expect("event from tailer thread");
        assert_eq!(event.player(), "Steve");
        assert!(seeded > 0);

        stop.stop();
        worker.join().unwrap();
    }

    #[test]
    fn test_preview_truncates_long_lines() {
        let long = "x".repeat(DEBUG_MAX_LINE_PREVIEW + 50);
        assert_eq!(preview(&long).len(), DEBUG_MAX_LINE_PREVIEW);
        assert_eq!(preview("short"), "short");
    }
}
