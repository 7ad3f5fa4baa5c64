// McNotify - platform/fs.rs
//
// Small filesystem helpers used by the tailer. Kept here so the tail loop
// reads as policy and the platform quirks (path case, separators) live in
// one place.

use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::Path;

/// Current size of the file at `path` in bytes.
pub fn file_len(path: &Path) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Open `path` for reading, positioned at byte `offset`.
pub fn open_at(path: &Path, offset: u64) -> io::Result<File> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    Ok(file)
}

/// Compare two configured paths case-insensitively.
///
/// Backslashes are treated as forward slashes so a state file written on
/// Windows still matches the same path typed with either separator.
pub fn same_path(a: &str, b: &str) -> bool {
    normalise(a) == normalise(b)
}

fn normalise(path: &str) -> String {
    path.trim().replace('\\', "/").to_lowercase()
}
