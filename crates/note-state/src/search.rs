use note_core::search::{
    MatchSpan, SearchOptions, build_pattern, count_matches, find_before, find_from, strip_tags,
};

use crate::adapter::EditorAdapter;
use crate::paging::{LoadState, PagingController};

/// One search hit, located both absolutely and logically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// 0-based logical line containing the match.
    pub line: usize,
    /// Absolute byte offset of the match start in the backing buffer.
    pub start: usize,
    /// Absolute byte offset one past the match end.
    pub end: usize,
}

/// One line of a [`MatchesSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummaryEntry {
    /// 0-based logical line number.
    pub line: usize,
    /// The matched line with markup tags stripped.
    pub preview: String,
}

/// Structured report of every matching line in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchesSummary {
    pub query: String,
    /// Total matching lines found, including those past the entry cap.
    pub total_lines: usize,
    pub entries: Vec<MatchSummaryEntry>,
    /// How many matching lines were dropped by the cap.
    pub omitted: usize,
}

impl std::fmt::Display for MatchesSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "No matches found in the entire document.");
        }

        writeln!(f, "SEARCH RESULTS FOR: '{}'", self.query)?;
        writeln!(f, "Total occurrences: {} matching lines found.", self.total_lines)?;
        writeln!(f, "---")?;
        for entry in &self.entries {
            writeln!(f, "Line {}: {}", entry.line + 1, entry.preview)?;
        }
        if self.omitted > 0 {
            writeln!(f, "+{} more", self.omitted)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Logical lines rendered either side of a match that lies outside the
    /// materialized window.
    pub context_lines: usize,
    /// Maximum line entries in a matches summary.
    pub summary_cap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            context_lines: 100,
            summary_cap: 500,
        }
    }
}

/// Count, find-next and summarize over a partially materialized document.
///
/// All operations are read-only with respect to loading: no search ever
/// advances the loaded prefix.
#[derive(Debug, Default)]
pub struct SearchEngine {
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Number of non-overlapping occurrences.
    ///
    /// Fully loaded documents are counted against the live surface text, so
    /// in-progress edits are reflected. While paging, the count runs against
    /// the backing buffer and does not see edits made inside the
    /// materialized window; that is a documented limitation of the source
    /// design, kept as-is.
    pub fn count_occurrences<A: EditorAdapter>(
        &self,
        controller: &PagingController<A>,
        query: &str,
        options: SearchOptions,
    ) -> usize {
        let Some(pattern) = build_pattern(query, options) else {
            return 0;
        };

        if controller.state() == LoadState::FullyLoaded && !controller.is_detached() {
            count_matches(&controller.adapter().window_text(), &pattern)
        } else {
            count_matches(controller.backing(), &pattern)
        }
    }

    /// Next match relative to the current cursor, in either direction.
    ///
    /// Fast path: the live materialized window, searched from the cursor and
    /// highlighted directly. Otherwise the backing buffer is scanned from
    /// the cursor's absolute position; backward search is an exhaustive
    /// forward scan keeping the last match before the cutoff. A hit outside
    /// the window is returned unhighlighted; the caller jumps there with
    /// [`load_content_for_line`](Self::load_content_for_line).
    pub fn find_global<A: EditorAdapter>(
        &self,
        controller: &mut PagingController<A>,
        query: &str,
        backward: bool,
        options: SearchOptions,
    ) -> Option<SearchMatch> {
        let pattern = build_pattern(query, options)?;
        let window = controller.adapter().window_text();
        let cursor = controller.adapter().cursor_selection_range();

        let local = if backward {
            find_before(&window, cursor.start.min(window.len()), &pattern)
        } else {
            find_from(&window, cursor.end, &pattern)
        };
        if let Some(span) = local {
            controller.adapter_mut().select_range(span.start, span.end);
            return Some(self.locate(controller, span, controller.window_base_offset()));
        }

        let base = controller.window_base_offset();
        let origin = base + if backward { cursor.start } else { cursor.end };
        let backing = controller.backing();
        let span = if backward {
            find_before(backing, origin.min(backing.len()), &pattern)
        } else {
            find_from(backing, origin, &pattern)
        }?;

        Some(SearchMatch {
            line: controller.line_index().line_for_offset(span.start),
            start: span.start,
            end: span.end,
        })
    }

    /// First match in the whole document, ignoring the cursor. Used by the
    /// wrap-around path of the find bar.
    pub fn find_from_top<A: EditorAdapter>(
        &self,
        controller: &mut PagingController<A>,
        query: &str,
        options: SearchOptions,
    ) -> Option<SearchMatch> {
        let pattern = build_pattern(query, options)?;
        let span = find_from(controller.backing(), 0, &pattern)?;
        self.select_if_visible(controller, span);
        Some(SearchMatch {
            line: controller.line_index().line_for_offset(span.start),
            start: span.start,
            end: span.end,
        })
    }

    /// Last match in the whole document, ignoring the cursor.
    pub fn find_from_end<A: EditorAdapter>(
        &self,
        controller: &mut PagingController<A>,
        query: &str,
        options: SearchOptions,
    ) -> Option<SearchMatch> {
        let pattern = build_pattern(query, options)?;
        let backing = controller.backing();
        let span = find_before(backing, backing.len().saturating_add(1), &pattern)?;
        self.select_if_visible(controller, span);
        Some(SearchMatch {
            line: controller.line_index().line_for_offset(span.start),
            start: span.start,
            end: span.end,
        })
    }

    /// Jumps to a match that lies outside the materialized window: renders a
    /// context slice around `line` through the adapter (never the whole
    /// buffer), re-anchors the window, then runs the local find that places
    /// the highlight.
    pub fn load_content_for_line<A: EditorAdapter>(
        &self,
        controller: &mut PagingController<A>,
        line: usize,
        query: &str,
        options: SearchOptions,
    ) -> Option<SearchMatch> {
        let pattern = build_pattern(query, options)?;
        let rendered = controller.render_window_around(line, self.config.context_lines);
        if rendered.is_empty() {
            return None;
        }

        let target = controller
            .line_index()
            .offset_for_line(line)
            .saturating_sub(rendered.start);
        let window = controller.adapter().window_text();
        let span =
            find_from(&window, target, &pattern).or_else(|| find_before(&window, target, &pattern))?;

        controller.adapter_mut().select_range(span.start, span.end);
        Some(self.locate(controller, span, rendered.start))
    }

    /// Scans the full backing buffer and reports every matching line once,
    /// with a tag-stripped preview, capped at the configured entry count.
    ///
    /// This is the only operation allowed a full O(n) pass; it is
    /// user-initiated and bounded by output size.
    pub fn get_matches_summary<A: EditorAdapter>(
        &self,
        controller: &PagingController<A>,
        query: &str,
        case_sensitive: bool,
    ) -> MatchesSummary {
        let mut summary = MatchesSummary {
            query: query.to_string(),
            total_lines: 0,
            entries: Vec::new(),
            omitted: 0,
        };
        let options = SearchOptions {
            case_sensitive,
            whole_word: false,
        };
        let Some(pattern) = build_pattern(query, options) else {
            return summary;
        };

        let backing = controller.backing();
        let index = controller.line_index();
        let mut last_line = None;

        // Matches arrive in offset order, so same-line hits are consecutive.
        for found in pattern.find_iter(backing) {
            let line = index.line_for_offset(found.start());
            if last_line == Some(line) {
                continue;
            }
            last_line = Some(line);
            summary.total_lines += 1;

            if summary.entries.len() < self.config.summary_cap {
                let span = index.line_span(line, backing.len());
                summary.entries.push(MatchSummaryEntry {
                    line,
                    preview: strip_tags(&backing[span]),
                });
            } else {
                summary.omitted += 1;
            }
        }

        summary
    }

    /// Highlights a backing-buffer span when it happens to fall inside the
    /// materialized window; out-of-window spans are the caller's jump.
    fn select_if_visible<A: EditorAdapter>(
        &self,
        controller: &mut PagingController<A>,
        span: MatchSpan,
    ) {
        if controller.window_contains(span.start) {
            let base = controller.window_base_offset();
            controller
                .adapter_mut()
                .select_range(span.start - base, span.end - base);
        }
    }

    fn locate<A: EditorAdapter>(
        &self,
        controller: &PagingController<A>,
        span: MatchSpan,
        base: usize,
    ) -> SearchMatch {
        let start = base + span.start;
        SearchMatch {
            line: controller.line_index().line_for_offset(start),
            start,
            end: base + span.end,
        }
    }
}
