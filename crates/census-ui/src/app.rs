//! Main application state and TUI event loop for house-census.
//!
//! [`App`] owns the theme, the range editor, the chart store and the latest
//! chart snapshot. The dataset arrives once from the fetch task; every Enter
//! reruns the aggregation through the store.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::{mpsc, watch};

use census_core::models::RangeInput;
use census_runtime::orchestrator::FetchEvent;
use census_runtime::store::{ChartSnapshot, ChartStore};

use crate::chart_view;
use crate::components::header::Header;
use crate::components::range_input::RangeEditor;
use crate::themes::Theme;

// ── LoadState ─────────────────────────────────────────────────────────────────

/// Progress of the one-shot dataset fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    /// Number of records received.
    Loaded(usize),
    /// Failure text shown in the status line.
    Failed(String),
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the census TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Dataset origin shown in the header.
    pub source: String,
    pub editor: RangeEditor,
    pub load_state: LoadState,
    /// Validation message for the last rejected range, if any.
    pub input_error: Option<String>,
    /// Index of the bar shown in the tooltip line.
    pub selected: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent chart, `None` until the first Enter.
    pub snapshot: Option<ChartSnapshot>,
    store: ChartStore,
    snapshots: watch::Receiver<Option<ChartSnapshot>>,
}

impl App {
    pub fn new(theme_name: &str, source: String, input: RangeInput, categories: Vec<String>) -> Self {
        let store = ChartStore::new(categories);
        let snapshots = store.subscribe();
        Self {
            theme: Theme::from_name(theme_name),
            source,
            editor: RangeEditor::new(input),
            load_state: LoadState::Loading,
            input_error: None,
            selected: 0,
            should_quit: false,
            snapshot: None,
            store,
            snapshots,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the interactive chart, receiving the dataset from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while the
    /// fetch result arrives on the async channel via `try_recv`.
    pub async fn run(mut self, rx: mpsc::Receiver<FetchEvent>) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, rx);

        // Restore terminal state even when the loop failed.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        rx: mpsc::Receiver<FetchEvent>,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);
        let mut rx = Some(rx);

        loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            self.poll_fetch(&mut rx);
            self.sync_snapshot();

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Take the fetch result if it has arrived. Drops the channel once it
    /// closes; a close without a result counts as a failed fetch.
    fn poll_fetch(&mut self, rx: &mut Option<mpsc::Receiver<FetchEvent>>) {
        let Some(channel) = rx.as_mut() else {
            return;
        };
        match channel.try_recv() {
            Ok(event) => self.update_from_fetch(event),
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {
                if self.load_state == LoadState::Loading {
                    self.update_from_fetch(FetchEvent::Failed(
                        "fetch task ended without a result".to_string(),
                    ));
                }
                *rx = None;
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.editor.focus_next(),
            KeyCode::BackTab => self.editor.focus_prev(),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.clear_focused(),
            KeyCode::Left => self.selected = self.selected.saturating_sub(1),
            KeyCode::Right => {
                let bars = self.snapshot.as_ref().map_or(0, |s| s.counts().len());
                if self.selected + 1 < bars {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => self.apply_range(),
            KeyCode::Char(c) => {
                self.editor.push_char(c);
            }
            _ => {}
        }
    }

    /// Validate the editor contents and, if valid, recompute the chart.
    ///
    /// A rejected range leaves the previous chart in place.
    pub fn apply_range(&mut self) {
        match self.editor.input().to_range() {
            Ok(range) => {
                self.input_error = None;
                self.store.apply(range);
                self.sync_snapshot();
            }
            Err(e) => {
                tracing::warn!(error = %e, "range rejected");
                self.input_error = Some(e.to_string());
            }
        }
    }

    /// Take a fetch outcome into the store.
    ///
    /// The chart is not recomputed; the next Enter uses the new records.
    pub fn update_from_fetch(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Loaded(records) => {
                self.load_state = LoadState::Loaded(records.len());
                self.store.replace_records(records);
            }
            FetchEvent::Failed(message) => self.load_state = LoadState::Failed(message),
        }
    }

    /// Pull the latest published snapshot, if it changed.
    fn sync_snapshot(&mut self) {
        if !self.snapshots.has_changed().unwrap_or(false) {
            return;
        }
        self.snapshot = self.snapshots.borrow_and_update().clone();
        let bars = self.snapshot.as_ref().map_or(0, |s| s.counts().len());
        self.selected = self.selected.min(bars.saturating_sub(1));
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(8),
            ])
            .split(frame.area());

        let header = Header::new(&self.source, self.editor.variant().as_str(), &self.theme);
        frame.render_widget(Paragraph::new(header.to_lines()), chunks[0]);

        self.editor.render(frame, chunks[1], &self.theme);
        frame.render_widget(Paragraph::new(self.status_line()), chunks[2]);

        match self.snapshot {
            Some(ref snapshot) => {
                chart_view::render_chart_view(frame, chunks[3], snapshot, self.selected, &self.theme)
            }
            None => chart_view::render_no_chart(frame, chunks[3], &self.theme),
        }
    }

    fn status_line(&self) -> Line<'static> {
        let mut spans = vec![match self.load_state {
            LoadState::Loading => Span::styled(" ⏳ Loading dataset...", self.theme.info),
            LoadState::Loaded(n) => Span::styled(format!(" ✓ {n} records"), self.theme.success),
            LoadState::Failed(ref message) => {
                Span::styled(format!(" ✗ Fetch failed: {message}"), self.theme.error)
            }
        }];
        if let Some(ref message) = self.input_error {
            spans.push(Span::styled("  │  ", self.theme.separator));
            spans.push(Span::styled(message.clone(), self.theme.warning));
        }
        Line::from(spans)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use census_core::models::{default_categories, Record, RangeVariant};
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    fn app(variant: RangeVariant) -> App {
        App::new(
            "dark",
            "fixtures/characters.json".to_string(),
            RangeInput::empty(variant),
            default_categories(),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(press(KeyCode::Char(c)));
        }
    }

    fn loaded() -> FetchEvent {
        let records: Vec<Record> = vec![
            Record::new("Harry Potter", "Gryffindor", "31-07-1980", true),
            Record::new("Ron Weasley", "Gryffindor", "01-03-1980", true),
            Record::new("Cedric Diggory", "Hufflepuff", "", true),
            Record::new("Albus Dumbledore", "Gryffindor", "", false),
            Record::new("Cho Chang", "Ravenclaw", "07-07-1979", true),
        ];
        FetchEvent::Loaded(Arc::from(records))
    }

    fn status_text(app: &App) -> String {
        app.status_line()
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect()
    }

    // ── App::new ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_creation_defaults() {
        let app = app(RangeVariant::Separate);
        assert_eq!(app.load_state, LoadState::Loading);
        assert!(app.snapshot.is_none());
        assert!(!app.should_quit);
        assert_eq!(app.selected, 0);
        assert_eq!(app.editor.variant(), RangeVariant::Separate);
    }

    #[test]
    fn test_app_creation_unknown_theme_falls_back() {
        let app = App::new(
            "neon",
            "x".to_string(),
            RangeInput::empty(RangeVariant::Combined),
            default_categories(),
        );
        assert_eq!(app.editor.variant(), RangeVariant::Combined);
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_quit_keys() {
        for key in [
            press(KeyCode::Esc),
            press(KeyCode::Char('q')),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = app(RangeVariant::Separate);
            app.handle_key(key);
            assert!(app.should_quit, "{key:?} should quit");
        }
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut app = app(RangeVariant::Separate);
        let mut key = press(KeyCode::Esc);
        key.kind = KeyEventKind::Release;
        app.handle_key(key);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_typing_edits_focused_field() {
        let mut app = app(RangeVariant::Separate);
        type_text(&mut app, "1980-01-01");
        app.handle_key(press(KeyCode::Tab));
        type_text(&mut app, "1980-12-31x");
        app.handle_key(press(KeyCode::Backspace));

        assert_eq!(
            app.editor.input(),
            RangeInput::Separate {
                start: "1980-01-01".to_string(),
                end: "1980-12-3".to_string(),
            }
        );
    }

    // ── Enter / aggregation ───────────────────────────────────────────────────

    #[test]
    fn test_enter_before_fetch_yields_zeros() {
        let mut app = app(RangeVariant::Separate);
        app.handle_key(press(KeyCode::Enter));

        let snapshot = app.snapshot.as_ref().expect("chart built");
        assert_eq!(snapshot.counts().len(), 4);
        assert!(snapshot.counts().iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_enter_after_fetch_counts_records() {
        let mut app = app(RangeVariant::Separate);
        app.update_from_fetch(loaded());
        assert_eq!(app.load_state, LoadState::Loaded(5));
        assert!(app.snapshot.is_none());

        app.handle_key(press(KeyCode::Enter));
        let counts: Vec<u64> = app
            .snapshot
            .as_ref()
            .unwrap()
            .counts()
            .iter()
            .map(|c| c.count)
            .collect();
        assert_eq!(counts, vec![2, 0, 0, 1]);
    }

    #[test]
    fn test_enter_with_range_filters() {
        let mut app = app(RangeVariant::Combined);
        app.update_from_fetch(loaded());
        type_text(&mut app, "1980-01-01..1980-12-31");
        app.handle_key(press(KeyCode::Enter));

        let snapshot = app.snapshot.as_ref().unwrap();
        assert_eq!(
            snapshot.range.start,
            NaiveDate::from_ymd_opt(1980, 1, 1)
        );
        assert_eq!(snapshot.counts()[0].count, 2);
        assert_eq!(snapshot.counts()[3].count, 0);
    }

    #[test]
    fn test_invalid_range_keeps_previous_chart() {
        let mut app = app(RangeVariant::Separate);
        app.update_from_fetch(loaded());
        app.handle_key(press(KeyCode::Enter));
        let revision = app.snapshot.as_ref().unwrap().revision;

        type_text(&mut app, "1980-13-45");
        app.handle_key(press(KeyCode::Enter));

        assert!(app.input_error.is_some());
        assert_eq!(app.snapshot.as_ref().unwrap().revision, revision);
        assert!(status_text(&app).contains("Invalid date range input"));

        app.handle_key(press(KeyCode::Delete));
        app.handle_key(press(KeyCode::Enter));
        assert!(app.input_error.is_none());
        assert_eq!(app.snapshot.as_ref().unwrap().revision, revision + 1);
    }

    #[test]
    fn test_new_records_do_not_recompute() {
        let mut app = app(RangeVariant::Separate);
        app.handle_key(press(KeyCode::Enter));
        app.update_from_fetch(loaded());
        app.sync_snapshot();

        let snapshot = app.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.record_count, 0);
        assert_eq!(snapshot.revision, 1);
    }

    #[test]
    fn test_fetch_failure_is_reported() {
        let mut app = app(RangeVariant::Separate);
        app.update_from_fetch(FetchEvent::Failed("HTTP request failed".to_string()));
        assert_eq!(
            app.load_state,
            LoadState::Failed("HTTP request failed".to_string())
        );
        assert!(status_text(&app).contains("Fetch failed: HTTP request failed"));
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    #[test]
    fn test_selection_stays_within_bars() {
        let mut app = app(RangeVariant::Separate);
        app.handle_key(press(KeyCode::Right));
        assert_eq!(app.selected, 0, "no chart, nothing to select");

        app.handle_key(press(KeyCode::Enter));
        for _ in 0..10 {
            app.handle_key(press(KeyCode::Right));
        }
        assert_eq!(app.selected, 3);
        app.handle_key(press(KeyCode::Left));
        assert_eq!(app.selected, 2);
        for _ in 0..10 {
            app.handle_key(press(KeyCode::Left));
        }
        assert_eq!(app.selected, 0);
    }

    // ── poll_fetch ────────────────────────────────────────────────────────────

    #[test]
    fn test_poll_fetch_takes_event_then_drops_closed_channel() {
        let mut app = app(RangeVariant::Separate);
        let (tx, rx) = mpsc::channel(1);
        let mut rx = Some(rx);

        app.poll_fetch(&mut rx);
        assert_eq!(app.load_state, LoadState::Loading);

        tx.try_send(loaded()).unwrap();
        drop(tx);
        app.poll_fetch(&mut rx);
        assert_eq!(app.load_state, LoadState::Loaded(5));
        assert!(rx.is_some());

        app.poll_fetch(&mut rx);
        assert!(rx.is_none());
        assert_eq!(app.load_state, LoadState::Loaded(5));
    }

    #[test]
    fn test_poll_fetch_closed_without_result_is_failure() {
        let mut app = app(RangeVariant::Separate);
        let (tx, rx) = mpsc::channel::<FetchEvent>(1);
        drop(tx);
        let mut rx = Some(rx);

        app.poll_fetch(&mut rx);
        assert!(rx.is_none());
        assert!(matches!(app.load_state, LoadState::Failed(ref m) if m.contains("without a result")));
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_before_and_after_chart() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut app = app(RangeVariant::Separate);
        terminal.draw(|frame| app.render(frame)).unwrap();

        app.update_from_fetch(loaded());
        app.handle_key(press(KeyCode::Enter));
        terminal.draw(|frame| app.render(frame)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(rendered.contains("HOGWARTS STUDENTS BY HOUSE"));
        assert!(rendered.contains("5 records"));
    }
}
