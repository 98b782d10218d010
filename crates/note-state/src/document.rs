use note_core::search::SearchOptions;

use crate::adapter::EditorAdapter;
use crate::paging::{LoadState, PagingConfig, PagingController};
use crate::search::{MatchesSummary, SearchConfig, SearchEngine, SearchMatch};

/// One open note: the paging controller and search engine pair, plus the
/// find-bar option toggles, bundled behind the API the host UI consumes.
///
/// Constructed when the note is opened (or registered hidden) and dropped
/// when it closes; nothing here outlives the document.
#[derive(Debug)]
pub struct NoteDocument<A: EditorAdapter> {
    pub controller: PagingController<A>,
    pub engine: SearchEngine,
    pub options: SearchOptions,
}

impl<A: EditorAdapter> NoteDocument<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            controller: PagingController::new(adapter),
            engine: SearchEngine::new(),
            options: SearchOptions::default(),
        }
    }

    pub fn with_config(adapter: A, paging: PagingConfig, search: SearchConfig) -> Self {
        Self {
            controller: PagingController::with_config(adapter, paging),
            engine: SearchEngine::with_config(search),
            options: SearchOptions::default(),
        }
    }

    /// Assigns and materializes content for a visible note.
    pub fn open(&mut self, content: String) -> LoadState {
        self.controller.set_content(content)
    }

    /// Registers content for a note that is not yet visible.
    pub fn open_deferred(&mut self, content: String) {
        self.controller.set_deferred_content(content);
    }

    /// Visibility trigger from the host; materializes deferred content.
    pub fn on_shown(&mut self) -> bool {
        self.controller.load_deferred()
    }

    pub fn check_scroll(&mut self, scroll_fraction: f64) {
        self.controller.check_scroll(scroll_fraction);
    }

    /// Host tick after the event queue drained; releases a pending
    /// loading-guard hold.
    pub fn settle(&mut self) {
        self.controller.settle();
    }

    pub fn get_total_matches(&self, query: &str) -> usize {
        self.engine
            .count_occurrences(&self.controller, query, self.options)
    }

    pub fn get_matches_summary(&self, query: &str) -> MatchesSummary {
        self.engine
            .get_matches_summary(&self.controller, query, self.options.case_sensitive)
    }

    /// Directional find with wrap-around, as the find bar drives it.
    pub fn find_global(&mut self, query: &str, backward: bool) -> Option<SearchMatch> {
        if backward {
            self.find_prev(query)
        } else {
            self.find_next(query)
        }
    }

    /// Next match after the cursor; wraps back to the first match in the
    /// document when the end is reached.
    pub fn find_next(&mut self, query: &str) -> Option<SearchMatch> {
        match self
            .engine
            .find_global(&mut self.controller, query, false, self.options)
        {
            Some(hit) => self.reveal(hit, query),
            None => {
                // Wrap: restart from the very top of the document.
                let hit = self
                    .engine
                    .find_from_top(&mut self.controller, query, self.options)?;
                self.reveal(hit, query)
            }
        }
    }

    /// Previous match before the cursor; wraps to the last match in the
    /// document when the start is reached.
    pub fn find_prev(&mut self, query: &str) -> Option<SearchMatch> {
        match self
            .engine
            .find_global(&mut self.controller, query, true, self.options)
        {
            Some(hit) => self.reveal(hit, query),
            None => {
                // Wrap: restart from the very end of the document.
                let hit = self
                    .engine
                    .find_from_end(&mut self.controller, query, self.options)?;
                self.reveal(hit, query)
            }
        }
    }

    /// Positions and highlights `query` at a known line (a search-result
    /// pick from the sidebar); `line == 0` means "first occurrence".
    pub fn highlight(&mut self, query: &str, line: usize) -> Option<SearchMatch> {
        if query.is_empty() {
            return None;
        }

        if line == 0 {
            let hit = self
                .engine
                .find_from_top(&mut self.controller, query, self.options)?;
            return self.reveal(hit, query);
        }

        let offset = self.controller.line_index().offset_for_line(line);
        if self.controller.window_contains(offset) {
            let relative = offset - self.controller.window_base_offset();
            self.controller.adapter_mut().select_range(relative, relative);
            return self.find_next(query);
        }

        self.engine
            .load_content_for_line(&mut self.controller, line, query, self.options)
    }

    /// A hit inside the materialized window is already highlighted by the
    /// fast path; anything else needs a context jump first.
    fn reveal(&mut self, hit: SearchMatch, query: &str) -> Option<SearchMatch> {
        if self.controller.window_contains(hit.start) {
            return Some(hit);
        }
        self.engine
            .load_content_for_line(&mut self.controller, hit.line, query, self.options)
            .or(Some(hit))
    }
}
