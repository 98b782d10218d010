/// The rendering surface this core pushes content into and reads scroll and
/// cursor state from. Implemented by the host's editor widget, never by this
/// crate.
///
/// Contract notes for implementors:
/// - [`append`](EditorAdapter::append) must not disturb the current scroll
///   position, and must not call back into the controller synchronously:
///   change notifications raised by the append go into the host's event
///   queue and are drained after the call returns. The controller is not
///   re-entrancy safe against a synchronous callback.
/// - Once [`select_range`](EditorAdapter::select_range) lands on a match,
///   centering it is the surface's job:
///   `new_scroll = clamp(current_scroll + match_y - viewport_height / 2, 0, max_scroll)`.
///   The core supplies the span, not the scroll math.
/// - All offsets are byte offsets into the currently materialized window
///   text, not into the full backing buffer.
pub trait EditorAdapter {
    /// Replaces all materialized content.
    fn render_full(&mut self, content: &str);

    /// Appends a chunk after the current materialized content.
    fn append(&mut self, chunk: &str);

    /// The live materialized text, including any in-progress edits.
    fn window_text(&self) -> String;

    /// Vertical scroll position as a fraction of the maximum, in `0.0..=1.0`.
    fn scroll_fraction(&self) -> f64;

    fn set_scroll_value(&mut self, value: f64);

    fn viewport_height(&self) -> f64;

    /// Current cursor selection as a window-relative byte range; an empty
    /// range when nothing is selected.
    fn cursor_selection_range(&self) -> std::ops::Range<usize>;

    /// Selects (and highlights) a window-relative byte range.
    fn select_range(&mut self, start: usize, end: usize);
}
