use crate::adapter::EditorAdapter;

/// Scripted editing surface for unit tests: records everything pushed into
/// it and plays back whatever scroll/cursor state a test assigns.
#[derive(Debug, Default)]
pub struct TestEditor {
    pub content: String,
    pub cursor: std::ops::Range<usize>,
    pub scroll: f64,
    pub render_calls: usize,
    pub append_calls: usize,
    pub selections: Vec<(usize, usize)>,
}

impl EditorAdapter for TestEditor {
    fn render_full(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor = 0..0;
        self.render_calls += 1;
    }

    fn append(&mut self, chunk: &str) {
        self.content.push_str(chunk);
        self.append_calls += 1;
    }

    fn window_text(&self) -> String {
        self.content.clone()
    }

    fn scroll_fraction(&self) -> f64 {
        self.scroll
    }

    fn set_scroll_value(&mut self, value: f64) {
        self.scroll = value;
    }

    fn viewport_height(&self) -> f64 {
        600.0
    }

    fn cursor_selection_range(&self) -> std::ops::Range<usize> {
        self.cursor.clone()
    }

    fn select_range(&mut self, start: usize, end: usize) {
        self.cursor = start..end;
        self.selections.push((start, end));
    }
}
