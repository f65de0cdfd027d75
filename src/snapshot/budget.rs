// src/snapshot/budget.rs
// =============================================================================
// Size limits and the growing snapshot string.
//
// All lengths are counted in chars (Unicode scalar values), not bytes, and
// we never cut a character in half. A README full of emoji gets the same
// budget as one full of ASCII.
// =============================================================================

/// Appended after any text that was cut short
pub const TRUNCATION_MARKER: &str = "\n... [truncated]\n";

/// Limits applied while assembling a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budgets {
    /// How many files (README not included) may be embedded
    pub max_files: usize,
    /// Longest single file body, README included
    pub max_file_chars: usize,
    /// Ceiling for the whole snapshot, checked before every file block
    pub total_chars_cap: usize,
    /// Optional ceiling for the directory tree section; None = unbounded
    pub max_tree_chars: Option<usize>,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            max_files: 80,
            max_file_chars: 15_000,
            total_chars_cap: 200_000,
            max_tree_chars: None,
        }
    }
}

// Returns the first `max` chars of `s` (or all of it)
pub fn clip_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}

// Clips `s` to `max` chars and appends TRUNCATION_MARKER if anything was cut
pub fn truncate_with_marker(mut s: String, max: usize) -> String {
    if let Some((byte_index, _)) = s.char_indices().nth(max) {
        s.truncate(byte_index);
        s.push_str(TRUNCATION_MARKER);
    }
    s
}

/// The snapshot being built, with a running char count so we never have
/// to rescan the whole string.
#[derive(Debug, Default)]
pub struct SnapshotText {
    text: String,
    chars: usize,
}

impl SnapshotText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chars(&self) -> usize {
        self.chars
    }

    /// Appends without any cap check (README and tree sections).
    pub fn push(&mut self, s: &str) {
        self.text.push_str(s);
        self.chars += s.chars().count();
    }

    /// Appends as much of `s` as fits under `cap`.
    ///
    /// Returns true if all of `s` fit.
    pub fn push_capped(&mut self, s: &str, cap: usize) -> bool {
        let remaining = cap.saturating_sub(self.chars);
        let clipped = clip_chars(s, remaining);
        self.push(clipped);
        clipped.len() == s.len()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
