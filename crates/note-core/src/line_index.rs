use std::sync::LazyLock;

use regex::Regex;

/// A logical line starts after a block-level markup tag or a raw newline.
static LINE_BREAK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:br|p|div|li)[^>]*>|\n").expect("valid pattern"));

/// Upper bound on index entries, so a pathological buffer cannot make the
/// table itself a memory problem. Hitting the cap degrades line mapping past
/// that point; it is never fatal.
pub const DEFAULT_MAX_LINES: usize = 500_000;

/// Sorted table of absolute byte offsets, one per logical line start.
///
/// Built once per buffer with [`LineOffsetIndex::build`] and never mutated
/// afterwards; the owning document rebuilds it whenever the buffer is
/// replaced wholesale. The first entry is always 0, and entries are strictly
/// increasing.
#[derive(Debug, Clone)]
pub struct LineOffsetIndex {
    offsets: Vec<usize>,
    truncated: bool,
}

impl LineOffsetIndex {
    /// Index for content that has not been scanned (or an empty buffer):
    /// a single line starting at offset 0.
    pub fn empty() -> Self {
        Self {
            offsets: vec![0],
            truncated: false,
        }
    }

    /// Single forward scan over the buffer, recording the end offset of every
    /// line-break marker. O(n) time, O(lines) space.
    ///
    /// Stops early once `max_lines` entries exist; the truncation is logged
    /// and the index stays usable up to the cap.
    pub fn build(buffer: &str, max_lines: usize) -> Self {
        if buffer.is_empty() {
            return Self::empty();
        }

        let mut offsets = vec![0usize];
        let mut truncated = false;

        for break_match in LINE_BREAK_PATTERN.find_iter(buffer) {
            if offsets.len() >= max_lines {
                truncated = true;
                log::warn!(
                    "line index capped at {max_lines} entries; offsets past byte {} collapse into the last line",
                    break_match.start()
                );
                break;
            }
            offsets.push(break_match.end());
        }

        log::debug!("indexed {} logical lines over {} bytes", offsets.len(), buffer.len());

        Self { offsets, truncated }
    }

    /// 0-based line number containing the byte at `pos`.
    ///
    /// Rightmost insertion point over the sorted table, so a position sitting
    /// exactly on a line start belongs to that line. O(log n).
    pub fn line_for_offset(&self, pos: usize) -> usize {
        self.offsets
            .partition_point(|&start| start <= pos)
            .saturating_sub(1)
    }

    /// Byte offset where `line` starts, clamped into the valid range.
    pub fn offset_for_line(&self, line: usize) -> usize {
        let clamped = line.min(self.offsets.len() - 1);
        self.offsets[clamped]
    }

    /// Byte range covered by `line`: its start offset up to the next line
    /// start, or `buffer_len` for the last indexed line.
    pub fn line_span(&self, line: usize, buffer_len: usize) -> std::ops::Range<usize> {
        let clamped = line.min(self.offsets.len() - 1);
        let start = self.offsets[clamped];
        let end = self
            .offsets
            .get(clamped + 1)
            .copied()
            .unwrap_or(buffer_len)
            .max(start);
        start..end
    }

    /// Total number of logical lines known to the index.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the build scan hit the line cap before reaching the buffer end.
    #[inline]
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}
