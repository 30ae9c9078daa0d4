use std::io::Stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use unicode_width::UnicodeWidthStr;

use super::state::Focus;
use crate::clipboard::Clipboard;
use crate::config::{Action, Config};
use crate::grid::{
    CellCoord, CellValue, CommitOutcome, FocusProxy, FocusRequest, GridHost, GridKeyResult,
    PointerButton, PointerEvent, ResultSet, ResultsGrid,
};
use crate::source::load_result_file;
use crate::sql::append_where_clause;
use crate::ui::{compute_column_widths, grid_status_line, DataGrid, GridLayout, GridViewport};

/// How long a status message stays up.
const MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: isize = 3;

/// Everything the grid engine is allowed to touch: the query text it filters,
/// the clipboard, and the viewport it scrolls.
pub struct AppHost {
    pub query: String,
    pub focus: Focus,
    pub clipboard: Option<Clipboard>,
    pub viewport: GridViewport,
    pub layout: GridLayout,
    pub col_widths: Vec<u16>,
    message: Option<(String, Instant)>,
}

impl AppHost {
    pub fn new(clipboard: Option<Clipboard>) -> Self {
        Self {
            query: String::new(),
            focus: Focus::Grid,
            clipboard,
            viewport: GridViewport::default(),
            layout: GridLayout::default(),
            col_widths: Vec::new(),
            message: None,
        }
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some((msg.into(), Instant::now()));
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(m, _)| m.as_str())
    }

    fn expire_message(&mut self, now: Instant) {
        if self
            .message
            .as_ref()
            .is_some_and(|(_, at)| now.duration_since(*at) >= MESSAGE_TTL)
        {
            self.message = None;
        }
    }
}

impl FocusProxy for AppHost {
    fn focus_element(&mut self, coord: CellCoord) {
        self.viewport.ensure_visible(
            coord,
            self.layout.body.height as usize,
            &self.col_widths,
            self.layout.data_w,
        );
    }
}

impl GridHost for AppHost {
    fn write_clipboard(&mut self, text: &str) -> Result<()> {
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.copy(text),
            None => Err(anyhow!("No clipboard backend available")),
        };
        if result.is_err() {
            self.set_message("Copy failed (see log)");
        }
        result
    }

    fn add_where_clause(&mut self, column: &str, value: &CellValue) {
        self.query = append_where_clause(&self.query, column, value);
        self.focus = Focus::Query;
        tracing::debug!(column, "filter appended to query");
    }
}

pub struct App {
    pub grid: ResultsGrid,
    pub host: AppHost,
    config: Config,
    source: Option<PathBuf>,
    query_area: Rect,
}

impl App {
    pub fn new(config: Config, clipboard: Option<Clipboard>) -> Self {
        let grid = ResultsGrid::new(
            config.grid_keymap(),
            Duration::from_millis(config.grid.double_click_ms),
        );
        Self {
            grid,
            host: AppHost::new(clipboard),
            config,
            source: None,
            query_area: Rect::default(),
        }
    }

    /// Remembers `path` and loads it. F5 reloads it later.
    pub fn open(&mut self, path: PathBuf) {
        self.source = Some(path);
        self.reload();
    }

    pub fn reload(&mut self) {
        let Some(path) = self.source.clone() else {
            self.host.set_message("No result file to reload");
            return;
        };
        self.grid.set_executing();
        match load_result_file(&path) {
            Ok(loaded) => {
                if let Some(query) = loaded.apply(&mut self.grid) {
                    self.host.query = query;
                }
            }
            Err(e) => {
                tracing::warn!("failed to load {}: {:#}", path.display(), e);
                self.grid.set_error(format!("{:#}", e));
            }
        }
        self.on_result_replaced();
    }

    /// Loads a result directly, for callers that already have one.
    pub fn set_result(&mut self, result: ResultSet) {
        self.grid.set_result(result);
        self.on_result_replaced();
    }

    fn on_result_replaced(&mut self) {
        self.host.viewport.reset();
        self.host.col_widths = self
            .grid
            .result()
            .map(|rs| compute_column_widths(rs, &self.config.display))
            .unwrap_or_default();
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            let now = Instant::now();
            self.grid.tick(now);
            self.host.expire_message(now);

            terminal.draw(|frame| self.draw(frame))?;

            // The edit cell exists on screen only after this frame, so scroll to it now.
            if let Some(FocusRequest::EditInput(coord)) = self.grid.take_deferred_focus() {
                self.host.focus = Focus::Grid;
                self.host.focus_element(coord);
            }

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.on_key(key) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.on_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());
        let (query_area, grid_area, status_area) = (chunks[0], chunks[1], chunks[2]);

        self.query_area = query_area;
        let query_focused = self.host.focus == Focus::Query;
        let border = if query_focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let query = Paragraph::new(self.host.query.as_str()).block(
            Block::default()
                .title("Query (Tab to switch, F5 reload)")
                .borders(Borders::ALL)
                .border_style(border),
        );
        frame.render_widget(query, query_area);
        if query_focused {
            let x = query_area.x + 1 + self.host.query.width() as u16;
            let max_x = query_area.right().saturating_sub(2);
            frame.set_cursor_position(Position::new(x.min(max_x), query_area.y + 1));
        }

        self.host.layout = GridLayout::compute(
            grid_area,
            self.grid.result(),
            &self.host.col_widths,
            &self.host.viewport,
            self.config.display.show_row_numbers,
        );
        frame.render_widget(
            DataGrid {
                grid: &self.grid,
                layout: &self.host.layout,
                focused: !query_focused,
            },
            grid_area,
        );

        let status = grid_status_line(&self.grid, self.host.message(), status_area.width);
        frame.render_widget(Paragraph::new(status), status_area);
    }

    /// Returns true when the app should exit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('q') && key.modifiers == KeyModifiers::CONTROL {
            return true;
        }
        if key.code == KeyCode::F(5) {
            self.reload();
            return false;
        }

        match self.host.focus {
            Focus::Query => self.on_query_key(key),
            Focus::Grid => self.on_grid_key(key),
        }
    }

    fn on_query_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.host.focus = Focus::Grid,
            KeyCode::Backspace => {
                self.host.query.pop();
            }
            KeyCode::Char(ch)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.host.query.push(ch);
            }
            _ => {}
        }
        false
    }

    fn on_grid_key(&mut self, key: KeyEvent) -> bool {
        let editing = self.grid.edit_session().is_editing();
        if key.code == KeyCode::Tab && !editing {
            self.host.focus = Focus::Query;
            return false;
        }

        match self.grid.handle_key(key, &mut self.host) {
            GridKeyResult::Quit => true,
            GridKeyResult::Ignored => {
                // Quit still works when there is no table to interact with.
                !editing && self.grid.keymap().get_action(&key) == Some(Action::Quit)
            }
            GridKeyResult::Copied { rows, cols } => {
                self.host
                    .set_message(format!("Copied {} row(s) × {} col(s)", rows, cols));
                false
            }
            GridKeyResult::Committed(outcome) => {
                self.report_commit(outcome);
                false
            }
            GridKeyResult::Handled => false,
        }
    }

    fn report_commit(&mut self, outcome: CommitOutcome) {
        match outcome {
            CommitOutcome::Modified => self.host.set_message("Cell modified"),
            CommitOutcome::Reverted => self.host.set_message("Cell reverted"),
            CommitOutcome::Unchanged => {}
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);
        match mouse.kind {
            MouseEventKind::Down(button) => {
                if let Some(coord) = self.host.layout.cell_at(mouse.column, mouse.row) {
                    self.host.focus = Focus::Grid;
                    let button = match button {
                        MouseButton::Left => PointerButton::Primary,
                        MouseButton::Right => PointerButton::Secondary,
                        MouseButton::Middle => PointerButton::Middle,
                    };
                    let event = PointerEvent::Press {
                        coord,
                        button,
                        shift,
                        at: Instant::now(),
                    };
                    if let GridKeyResult::Committed(outcome) =
                        self.grid.handle_pointer(event, &mut self.host)
                    {
                        self.report_commit(outcome);
                    }
                } else if self.query_area.contains(Position::new(mouse.column, mouse.row)) {
                    // Clicking away from the editor commits it.
                    self.grid.blur();
                    self.host.focus = Focus::Query;
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(coord) = self.host.layout.nearest_cell(mouse.column, mouse.row) {
                    self.grid
                        .handle_pointer(PointerEvent::Move { coord }, &mut self.host);
                }
            }
            MouseEventKind::Up(_) => {
                self.grid.handle_pointer(PointerEvent::Release, &mut self.host);
            }
            MouseEventKind::ScrollDown => self.scroll(WHEEL_ROWS),
            MouseEventKind::ScrollUp => self.scroll(-WHEEL_ROWS),
            _ => {}
        }
    }

    fn scroll(&mut self, delta: isize) {
        let rows = self.grid.result().map_or(0, |rs| rs.row_count());
        self.host.viewport.scroll_rows(delta, rows);
    }
}
