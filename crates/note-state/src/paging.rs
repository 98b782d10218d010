use note_core::chunk;
use note_core::line_index::{DEFAULT_MAX_LINES, LineOffsetIndex};

use crate::adapter::EditorAdapter;
use crate::guard::LoadingGuard;

/// Appended to the materialized content exactly once, when the last chunk of
/// a paged document lands.
pub const END_OF_DOCUMENT_MARKER: &str = "\n<p><i>--- End of document ---</i></p>";

#[derive(Debug, Clone)]
pub struct PagingConfig {
    /// Chunk size in bytes; buffers at or under this render in one shot.
    pub page_size: usize,
    /// Line index entry cap, see [`LineOffsetIndex::build`].
    pub max_lines: usize,
    /// Scroll fraction past which the next chunk loads.
    pub scroll_threshold: f64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 250_000,
            max_lines: DEFAULT_MAX_LINES,
            scroll_threshold: 0.9,
        }
    }
}

/// Where the open document sits in its loading lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No buffer assigned (deferred content may still be registered).
    Empty,
    /// A prefix of the buffer is materialized; more chunks remain.
    Paging,
    /// The whole buffer has been pushed to the surface.
    FullyLoaded,
}

/// Outcome of one [`PagingController::load_next_chunk`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep {
    /// A chunk of this many bytes was appended; more remain.
    Appended(usize),
    /// The final chunk of this many bytes landed; the end marker went with it.
    Completed(usize),
    /// A load is already in flight; the call was ignored.
    AlreadyLoading,
    /// Everything is materialized; nothing to do.
    AlreadyFull,
    /// No buffer is assigned.
    NoContent,
    /// The surface shows a mid-document context window, not the loaded
    /// prefix; appending here would interleave unrelated content.
    WindowDetached,
}

/// Owns the buffer, the loaded-prefix length, and the chunked-loading state
/// machine for one open document.
///
/// The buffer is replaced wholesale by [`set_content`](Self::set_content) and
/// never mutated in place; edits happen in the editing surface and are
/// reconciled externally on save. The line index and load state share the
/// buffer's lifetime exactly.
#[derive(Debug)]
pub struct PagingController<A> {
    adapter: A,
    config: PagingConfig,
    buffer: Option<String>,
    deferred: Option<String>,
    line_index: LineOffsetIndex,
    loaded_length: usize,
    /// Byte range of the backing buffer currently materialized in the surface.
    window: std::ops::Range<usize>,
    /// True after a context jump; chunked prefix loading is suspended.
    detached: bool,
    end_marker_appended: bool,
    guard: LoadingGuard,
}

/*

===================================
===== CREATION & CONTENT FLOW =====
===================================

*/

impl<A: EditorAdapter> PagingController<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_config(adapter, PagingConfig::default())
    }

    pub fn with_config(adapter: A, config: PagingConfig) -> Self {
        Self {
            adapter,
            config,
            buffer: None,
            deferred: None,
            line_index: LineOffsetIndex::empty(),
            loaded_length: 0,
            window: 0..0,
            detached: false,
            end_marker_appended: false,
            guard: LoadingGuard::default(),
        }
    }

    /// Assigns the full buffer, resetting all prior state, and materializes
    /// either the whole content or its first tag-safe chunk.
    pub fn set_content(&mut self, content: String) -> LoadState {
        self.deferred = None;
        self.loaded_length = 0;
        self.window = 0..0;
        self.detached = false;
        self.end_marker_appended = false;
        self.guard = LoadingGuard::default();
        self.line_index = LineOffsetIndex::build(&content, self.config.max_lines);

        if content.len() <= self.config.page_size {
            self.loaded_length = content.len();
            self.window = 0..content.len();
            self.adapter.render_full(&content);
            self.buffer = Some(content);
            return LoadState::FullyLoaded;
        }

        let first = chunk::next_chunk(&content, 0, self.config.page_size);
        self.loaded_length = first.range.end;
        self.window = 0..first.range.end;
        log::info!(
            "massive document detected ({} bytes, {} logical lines); paging enabled",
            content.len(),
            self.line_index.line_count()
        );
        self.adapter.render_full(first.text(&content));
        self.buffer = Some(content);
        LoadState::Paging
    }

    /// Registers content for a document that is not yet visible. No index is
    /// built and nothing is pushed until [`load_deferred`](Self::load_deferred).
    pub fn set_deferred_content(&mut self, content: String) {
        log::debug!("deferred content registered ({} bytes)", content.len());
        self.deferred = Some(content);
        self.buffer = None;
        self.loaded_length = 0;
        self.window = 0..0;
        self.detached = false;
        self.end_marker_appended = false;
        self.line_index = LineOffsetIndex::empty();
    }

    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// Materializes registered deferred content; false if there was none.
    pub fn load_deferred(&mut self) -> bool {
        match self.deferred.take() {
            Some(content) => {
                self.set_content(content);
                true
            }
            None => false,
        }
    }
}

/*

============================
===== CHUNKED LOADING ======
============================

*/

impl<A: EditorAdapter> PagingController<A> {
    /// Scroll notification from the host. Loads the next chunk once the
    /// surface is scrolled past the threshold, unless a load is in flight or
    /// everything is already materialized.
    pub fn check_scroll(&mut self, scroll_fraction: f64) {
        if self.is_fully_loaded() || self.guard.is_engaged() || self.detached {
            return;
        }
        if scroll_fraction > self.config.scroll_threshold {
            let _ = self.load_next_chunk();
        }
    }

    /// Appends the next tag-safe chunk and advances the loaded prefix.
    ///
    /// Guarded against re-entry: the guard stays engaged until the host calls
    /// [`settle`](Self::settle) after draining the events the append raised.
    pub fn load_next_chunk(&mut self) -> LoadStep {
        if self.detached {
            return LoadStep::WindowDetached;
        }
        let total = match self.buffer.as_ref() {
            Some(buffer) => buffer.len(),
            None => return LoadStep::NoContent,
        };
        if self.loaded_length >= total {
            return LoadStep::AlreadyFull;
        }
        if !self.guard.try_engage() {
            return LoadStep::AlreadyLoading;
        }

        let next = chunk::next_chunk(
            self.buffer.as_deref().unwrap_or_default(),
            self.loaded_length,
            self.config.page_size,
        );
        let appended = next.len();
        self.loaded_length = next.range.end;
        self.window.end = next.range.end;
        self.adapter
            .append(&self.buffer.as_deref().unwrap_or_default()[next.range]);

        self.guard.schedule_release();

        if self.loaded_length >= total {
            if !self.end_marker_appended {
                self.adapter.append(END_OF_DOCUMENT_MARKER);
                self.end_marker_appended = true;
            }
            log::info!("document fully loaded ({total} bytes)");
            return LoadStep::Completed(appended);
        }

        LoadStep::Appended(appended)
    }

    /// Host tick, called after the event queue has drained; releases a
    /// pending loading-guard hold.
    pub fn settle(&mut self) {
        self.guard.settle();
    }
}

/*

=============================
===== WINDOW & QUERIES ======
=============================

*/

impl<A: EditorAdapter> PagingController<A> {
    /// Materializes a context window of `context_lines` logical lines either
    /// side of `line`, re-anchoring the window so relative-position math
    /// stays correct. Returns the byte range rendered.
    ///
    /// Chunked prefix loading is suspended afterwards (the surface no longer
    /// shows the prefix) until the next [`set_content`](Self::set_content).
    pub fn render_window_around(
        &mut self,
        line: usize,
        context_lines: usize,
    ) -> std::ops::Range<usize> {
        let total = match self.buffer.as_ref() {
            Some(buffer) => buffer.len(),
            None => return 0..0,
        };

        let last_line = self.line_index.line_count() - 1;
        let first = line.saturating_sub(context_lines);
        let last = line.saturating_add(context_lines).min(last_line);
        let start = self.line_index.offset_for_line(first);
        let end = self.line_index.line_span(last, total).end;

        self.window = start..end;
        self.detached = true;
        self.adapter
            .render_full(&self.buffer.as_deref().unwrap_or_default()[start..end]);

        start..end
    }

    /// The content searches run against when the surface is not fully
    /// loaded: the buffer, else the deferred slot, else empty.
    pub fn backing(&self) -> &str {
        self.buffer
            .as_deref()
            .or(self.deferred.as_deref())
            .unwrap_or_default()
    }

    pub fn state(&self) -> LoadState {
        match self.buffer.as_ref() {
            None => LoadState::Empty,
            Some(buffer) if self.loaded_length >= buffer.len() => LoadState::FullyLoaded,
            Some(_) => LoadState::Paging,
        }
    }

    #[inline]
    pub fn is_fully_loaded(&self) -> bool {
        matches!(self.state(), LoadState::FullyLoaded)
    }

    #[inline]
    pub fn loaded_length(&self) -> usize {
        self.loaded_length
    }

    /// True after a context jump, while the surface shows a mid-document
    /// window instead of the loaded prefix.
    #[inline]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Absolute byte offset of the start of the materialized window.
    #[inline]
    pub fn window_base_offset(&self) -> usize {
        self.window.start
    }

    /// Logical line the materialized window starts at.
    pub fn window_start_line(&self) -> usize {
        self.line_index.line_for_offset(self.window.start)
    }

    /// Whether an absolute buffer offset falls inside the materialized window.
    pub fn window_contains(&self, offset: usize) -> bool {
        offset >= self.window.start && offset < self.window.end
    }

    #[inline]
    pub fn line_index(&self) -> &LineOffsetIndex {
        &self.line_index
    }

    #[inline]
    pub fn config(&self) -> &PagingConfig {
        &self.config
    }

    #[inline]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    #[inline]
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestEditor;

    fn paged(content: String, page_size: usize) -> PagingController<TestEditor> {
        let mut controller = PagingController::with_config(
            TestEditor::default(),
            PagingConfig {
                page_size,
                ..PagingConfig::default()
            },
        );
        controller.set_content(content);
        controller
    }

    // --- SET_CONTENT TESTS ---

    #[test]
    fn test_small_buffer_fully_loads() {
        let content = "<p>alpha</p><p>beta</p><p>alpha</p>".to_string();
        let controller = paged(content.clone(), 1000);

        assert_eq!(controller.state(), LoadState::FullyLoaded);
        assert_eq!(controller.loaded_length(), content.len());
        assert_eq!(controller.adapter().content, content);
    }

    #[test]
    fn test_large_buffer_starts_paging() {
        let content = "<p>0123456789</p>".repeat(100);
        let controller = paged(content.clone(), 200);

        assert_eq!(controller.state(), LoadState::Paging);
        assert!(controller.loaded_length() <= 200);
        assert!(controller.loaded_length() > 0);
        assert_eq!(
            controller.adapter().content,
            content[..controller.loaded_length()]
        );
    }

    #[test]
    fn test_set_content_replaces_all_state() {
        let mut controller = paged("<p>x</p>".repeat(100), 100);
        assert_eq!(controller.state(), LoadState::Paging);

        controller.set_content("tiny".to_string());
        assert_eq!(controller.state(), LoadState::FullyLoaded);
        assert_eq!(controller.loaded_length(), 4);
        assert_eq!(controller.adapter().content, "tiny");
    }

    #[test]
    fn test_empty_buffer_is_fully_loaded() {
        let controller = paged(String::new(), 1000);
        assert_eq!(controller.state(), LoadState::FullyLoaded);
        assert_eq!(controller.loaded_length(), 0);
    }

    // --- LOADING TESTS ---

    #[test]
    fn test_loads_monotonically_to_completion() {
        let content = "<p>0123456789</p>".repeat(50); // 850 bytes
        let mut controller = paged(content.clone(), 200);

        let mut previous = controller.loaded_length();
        let mut steps = 0;
        loop {
            match controller.load_next_chunk() {
                LoadStep::Appended(_) => {
                    assert!(controller.loaded_length() > previous);
                    previous = controller.loaded_length();
                    controller.settle();
                }
                LoadStep::Completed(_) => break,
                other => panic!("unexpected step {other:?}"),
            }
            steps += 1;
            assert!(steps < 100, "loader failed to make progress");
        }

        assert_eq!(controller.loaded_length(), content.len());
        assert_eq!(controller.state(), LoadState::FullyLoaded);
        assert!(controller.adapter().content.ends_with(END_OF_DOCUMENT_MARKER));
    }

    #[test]
    fn test_end_marker_appended_exactly_once() {
        let content = "x".repeat(300);
        let mut controller = paged(content, 250);

        assert!(matches!(controller.load_next_chunk(), LoadStep::Completed(50)));
        controller.settle();
        assert!(matches!(controller.load_next_chunk(), LoadStep::AlreadyFull));

        let rendered = &controller.adapter().content;
        assert_eq!(rendered.matches(END_OF_DOCUMENT_MARKER).count(), 1);
    }

    #[test]
    fn test_scenario_300k_document() {
        let content = "y".repeat(300_000);
        let mut controller = paged(content, 250_000);

        assert!(controller.loaded_length() <= 250_000);

        assert!(matches!(
            controller.load_next_chunk(),
            LoadStep::Completed(50_000)
        ));
        assert_eq!(controller.loaded_length(), 300_000);
        controller.settle();
        assert!(matches!(controller.load_next_chunk(), LoadStep::AlreadyFull));
    }

    // --- SCROLL & GUARD TESTS ---

    #[test]
    fn test_check_scroll_threshold() {
        let content = "z".repeat(1000);
        let mut controller = paged(content, 200);

        controller.check_scroll(0.5);
        assert_eq!(controller.loaded_length(), 200);

        controller.check_scroll(0.95);
        assert_eq!(controller.loaded_length(), 400);
    }

    #[test]
    fn test_guard_blocks_scroll_storm_until_settle() {
        let content = "z".repeat(1000);
        let mut controller = paged(content, 200);

        controller.check_scroll(1.0);
        assert_eq!(controller.loaded_length(), 400);

        // The append raised more scroll events; none may trigger a load
        // before the host settles.
        controller.check_scroll(1.0);
        controller.check_scroll(1.0);
        controller.check_scroll(1.0);
        assert_eq!(controller.loaded_length(), 400);

        controller.settle();
        controller.check_scroll(1.0);
        assert_eq!(controller.loaded_length(), 600);
    }

    #[test]
    fn test_reentrant_load_is_ignored() {
        let content = "z".repeat(1000);
        let mut controller = paged(content, 200);

        assert!(matches!(controller.load_next_chunk(), LoadStep::Appended(200)));
        assert!(matches!(
            controller.load_next_chunk(),
            LoadStep::AlreadyLoading
        ));
        controller.settle();
        assert!(matches!(controller.load_next_chunk(), LoadStep::Appended(200)));
    }

    #[test]
    fn test_check_scroll_noop_when_fully_loaded() {
        let mut controller = paged("small".to_string(), 1000);
        controller.check_scroll(1.0);
        assert_eq!(controller.adapter().render_calls, 1);
        assert_eq!(controller.adapter().append_calls, 0);
    }

    // --- DEFERRED TESTS ---

    #[test]
    fn test_deferred_holds_no_state_until_shown() {
        let mut controller = PagingController::new(TestEditor::default());
        controller.set_deferred_content("<p>hidden</p>".to_string());

        assert!(controller.has_deferred());
        assert_eq!(controller.state(), LoadState::Empty);
        assert_eq!(controller.line_index().line_count(), 1);
        assert_eq!(controller.adapter().render_calls, 0);
        assert_eq!(controller.backing(), "<p>hidden</p>");
    }

    #[test]
    fn test_load_deferred_materializes_once() {
        let mut controller = PagingController::new(TestEditor::default());
        controller.set_deferred_content("<p>hidden</p>".to_string());

        assert!(controller.load_deferred());
        assert_eq!(controller.state(), LoadState::FullyLoaded);
        assert_eq!(controller.adapter().content, "<p>hidden</p>");
        assert!(!controller.has_deferred());
        assert!(!controller.load_deferred());
    }

    // --- WINDOW TESTS ---

    #[test]
    fn test_render_window_around_detaches_paging() {
        let content = "<p>0123456789</p>".repeat(100);
        let mut controller = paged(content.clone(), 200);

        let rendered = controller.render_window_around(50, 5);
        assert_eq!(controller.window_start_line(), 45);
        assert_eq!(controller.window_base_offset(), rendered.start);
        assert_eq!(
            controller.adapter().content,
            content[rendered.start..rendered.end]
        );

        assert!(matches!(
            controller.load_next_chunk(),
            LoadStep::WindowDetached
        ));
        controller.check_scroll(1.0); // also a no-op now
        assert_eq!(controller.adapter().append_calls, 0);
    }

    #[test]
    fn test_window_clamps_at_document_edges() {
        let content = "<p>0123456789</p>".repeat(20);
        let mut controller = paged(content.clone(), 100);

        let rendered = controller.render_window_around(1, 100);
        assert_eq!(rendered.start, 0);
        assert_eq!(rendered.end, content.len());
    }
}
