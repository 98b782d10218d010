use note_state::adapter::EditorAdapter;
use note_state::document::NoteDocument;
use util::{EventQueue, Sender};

/// Notification raised by the surface while the host is mid-tick. Drained
/// once per loop iteration; never delivered synchronously.
#[derive(Debug, Clone, Copy)]
enum SurfaceEvent {
    ScrollChanged(f64),
}

/// Minimal headless editing surface: a text body plus a byte-granular scroll
/// model. Every scroll movement, including the ones caused by appends, is
/// reported through the event queue the way a real widget emits signals.
#[derive(Debug)]
struct HeadlessEditor {
    content: String,
    cursor: std::ops::Range<usize>,
    scroll_value: f64,
    viewport: f64,
    events: Sender<SurfaceEvent>,
}

impl HeadlessEditor {
    fn new(events: Sender<SurfaceEvent>) -> Self {
        Self {
            content: String::new(),
            cursor: 0..0,
            scroll_value: 0.0,
            viewport: 4_000.0,
            events,
        }
    }

    fn max_scroll(&self) -> f64 {
        (self.content.len() as f64 - self.viewport).max(0.0)
    }

    fn scroll_to_bottom(&mut self) {
        self.set_scroll_value(self.max_scroll());
    }

    fn notify_scroll(&self) {
        let _ = self.events.send(SurfaceEvent::ScrollChanged(self.scroll_fraction()));
    }
}

impl EditorAdapter for HeadlessEditor {
    fn render_full(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor = 0..0;
        self.scroll_value = 0.0;
    }

    fn append(&mut self, chunk: &str) {
        self.content.push_str(chunk);
        // Growing the content moves the relative scroll position, which a
        // real widget reports before the append call returns.
        self.notify_scroll();
    }

    fn window_text(&self) -> String {
        self.content.clone()
    }

    fn scroll_fraction(&self) -> f64 {
        let max = self.max_scroll();
        if max == 0.0 { 0.0 } else { self.scroll_value / max }
    }

    fn set_scroll_value(&mut self, value: f64) {
        self.scroll_value = value.clamp(0.0, self.max_scroll());
        self.notify_scroll();
    }

    fn viewport_height(&self) -> f64 {
        self.viewport
    }

    fn cursor_selection_range(&self) -> std::ops::Range<usize> {
        self.cursor.clone()
    }

    fn select_range(&mut self, start: usize, end: usize) {
        self.cursor = start..end;
        let target = start as f64;
        let centered = self.scroll_value + target - self.viewport / 2.0;
        self.set_scroll_value(centered);
    }
}

fn synthetic_note(paragraphs: usize) -> String {
    let mut content = String::new();
    for i in 0..paragraphs {
        if i % 97 == 0 {
            content.push_str(&format!("<p>entry {i} mentions alpha today</p>\n"));
        } else {
            content.push_str(&format!("<p>entry {i} is ordinary filler text</p>\n"));
        }
    }
    content
}

pub fn main() {
    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .expect("logger init");

    let args: Vec<String> = std::env::args().collect();
    let content = match args.get(1) {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|err| {
            log::error!("cannot read {path}: {err}");
            std::process::exit(1);
        }),
        None => synthetic_note(20_000),
    };
    let query = args.get(2).cloned().unwrap_or_else(|| "alpha".to_string());

    let events: EventQueue<SurfaceEvent> = EventQueue::new();
    let mut doc = NoteDocument::new(HeadlessEditor::new(events.sender()));
    doc.open(content);

    // Host loop: keep the user "scrolled to the bottom" until the whole
    // document is materialized. Events are drained once per tick and the
    // controller settles only after the drain, mirroring a deferred callback.
    let mut ticks = 0u32;
    while !doc.controller.is_fully_loaded() {
        doc.controller.adapter_mut().scroll_to_bottom();
        for event in events.drain() {
            match event {
                SurfaceEvent::ScrollChanged(fraction) => doc.check_scroll(fraction),
            }
        }
        doc.settle();

        ticks += 1;
        if ticks > 100_000 {
            log::error!("loader made no progress; aborting demo loop");
            break;
        }
    }
    log::info!(
        "materialized {} bytes in {ticks} ticks",
        doc.controller.loaded_length()
    );

    println!("Total matches for '{query}': {}", doc.get_total_matches(&query));
    if let Some(hit) = doc.find_global(&query, false) {
        println!("First match at line {} (byte {})", hit.line + 1, hit.start);
    }
    println!("{}", doc.get_matches_summary(&query));
}
