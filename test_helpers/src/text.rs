//! Text helpers for asserting on command output.

/// Returns the trimmed, non-empty lines of `output`.
#[must_use]
pub fn non_empty_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Decodes captured process output, replacing invalid UTF-8.
#[must_use]
pub fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
