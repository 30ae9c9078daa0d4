use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::DisplayConfig;
use crate::grid::{
    format_cell, ActiveEdit, CellCoord, CellHighlight, GridView, ResultSet, ResultsGrid,
};

const COL_PADDING: u16 = 1;

/// Which part of the result is scrolled into view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GridViewport {
    pub row_offset: usize,
    pub col_offset: usize,
}

impl GridViewport {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Scrolls the least amount needed to show `coord`.
    pub fn ensure_visible(&mut self, coord: CellCoord, body_rows: usize, col_widths: &[u16], data_w: u16) {
        if body_rows > 0 {
            if coord.row < self.row_offset {
                self.row_offset = coord.row;
            } else if coord.row >= self.row_offset + body_rows {
                self.row_offset = coord.row + 1 - body_rows;
            }
        }

        if coord.col < self.col_offset {
            self.col_offset = coord.col;
            return;
        }
        // Advance the first visible column until `coord.col` fits entirely.
        while self.col_offset < coord.col && span_width(col_widths, self.col_offset, coord.col) > data_w {
            self.col_offset += 1;
        }
    }

    /// Mouse wheel.
    pub fn scroll_rows(&mut self, delta: isize, row_count: usize) {
        let max = row_count.saturating_sub(1);
        self.row_offset = self.row_offset.saturating_add_signed(delta).min(max);
    }
}

/// Width of columns `from..=to` including the gaps between them.
fn span_width(col_widths: &[u16], from: usize, to: usize) -> u16 {
    col_widths
        .iter()
        .take(to + 1)
        .skip(from)
        .fold(0u16, |acc, w| acc.saturating_add(*w).saturating_add(COL_PADDING))
        .saturating_sub(COL_PADDING)
}

/// Column widths from the header and formatted values, clamped to the display limits.
pub fn compute_column_widths(result: &ResultSet, display: &DisplayConfig) -> Vec<u16> {
    let min_w = display.min_column_width.max(1);
    let max_w = display.max_column_width.max(min_w);
    let clamp = |w: usize| (w.min(u16::MAX as usize) as u16).clamp(min_w, max_w);

    let mut widths: Vec<u16> = result
        .columns
        .iter()
        .map(|h| clamp(display_width(h)))
        .collect();

    for row in &result.rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(clamp(display_width(&format_cell(cell))));
        }
    }
    widths
}

/// A column on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleColumn {
    pub col: usize,
    pub x: u16,
    pub width: u16,
}

/// Screen geometry of the last rendered grid, used for hit-testing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub area: Rect,
    pub header_y: u16,
    pub body: Rect,
    pub row_number_width: u16,
    pub data_x: u16,
    pub data_w: u16,
    pub row_offset: usize,
    pub row_count: usize,
    pub columns: Vec<VisibleColumn>,
}

impl GridLayout {
    /// Lays out `result` inside a bordered block covering `area`.
    pub fn compute(
        area: Rect,
        result: Option<&ResultSet>,
        col_widths: &[u16],
        viewport: &GridViewport,
        show_row_numbers: bool,
    ) -> Self {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let mut layout = GridLayout {
            area,
            ..Default::default()
        };
        let Some(rs) = result else {
            return layout;
        };
        if inner.height < 2 || inner.width == 0 {
            return layout;
        }

        layout.header_y = inner.y;
        layout.body = Rect {
            x: inner.x,
            y: inner.y + 1,
            width: inner.width,
            height: inner.height - 1,
        };
        layout.row_count = rs.row_count();
        layout.row_offset = viewport.row_offset.min(rs.row_count().saturating_sub(1));

        // Sticky row-number column: digits of the largest row number plus a gap.
        layout.row_number_width = if show_row_numbers {
            (rs.row_count().max(1).to_string().len() as u16 + 1).min(inner.width)
        } else {
            0
        };
        layout.data_x = inner.x + layout.row_number_width;
        layout.data_w = inner.width - layout.row_number_width;

        let max_x = layout.data_x.saturating_add(layout.data_w);
        let mut x = layout.data_x;
        for (col, w) in col_widths.iter().enumerate().skip(viewport.col_offset) {
            if x >= max_x {
                break;
            }
            // A partially visible last column is still drawn and clickable.
            let width = (*w).min(max_x - x);
            layout.columns.push(VisibleColumn { col, x, width });
            x = x.saturating_add(width).saturating_add(COL_PADDING);
        }
        layout
    }

    pub fn visible_rows(&self) -> usize {
        (self.body.height as usize).min(self.row_count.saturating_sub(self.row_offset))
    }

    /// The cell under the pointer, if any.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<CellCoord> {
        if !is_inside(x, y, self.body) {
            return None;
        }
        let row = self.row_offset + (y - self.body.y) as usize;
        if row >= self.row_count {
            return None;
        }
        self.columns
            .iter()
            .find(|c| x >= c.x && x < c.x + c.width)
            .map(|c| CellCoord::new(row, c.col))
    }

    /// Like [`cell_at`](Self::cell_at) but snaps to the nearest visible cell.
    /// Drags that leave the grid keep extending toward its edge.
    pub fn nearest_cell(&self, x: u16, y: u16) -> Option<CellCoord> {
        let first = self.columns.first()?;
        let last = self.columns.last()?;
        let visible = self.visible_rows();
        if visible == 0 {
            return None;
        }

        let rel_y = y.saturating_sub(self.body.y) as usize;
        let row = self.row_offset + rel_y.min(visible - 1);

        let col = if x < first.x {
            first.col
        } else {
            self.columns
                .iter()
                .find(|c| x < c.x + c.width + COL_PADDING)
                .unwrap_or(last)
                .col
        };
        Some(CellCoord::new(row, col))
    }
}

pub struct DataGrid<'a> {
    pub grid: &'a ResultsGrid,
    pub layout: &'a GridLayout,
    pub focused: bool,
}

impl DataGrid<'_> {
    fn title(&self) -> String {
        let Some(rs) = self.grid.result() else {
            return "Results".to_string();
        };
        let pending = self.grid.ledger().len();
        if pending > 0 {
            format!(
                "Results ({} rows, {}ms, {} modified)",
                rs.row_count(),
                rs.execution_time_ms,
                pending
            )
        } else {
            format!("Results ({} rows, {}ms)", rs.row_count(), rs.execution_time_ms)
        }
    }
}

impl Widget for DataGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let view = self.grid.view();
        if let Some(message) = view.message() {
            let style = match view {
                GridView::Failed(_) => Style::default().fg(Color::Red),
                _ => Style::default().fg(Color::Gray),
            };
            Paragraph::new(message)
                .style(style)
                .wrap(Wrap { trim: false })
                .render(inner, buf);
            return;
        }

        let Some(rs) = self.grid.result() else {
            return;
        };
        let layout = self.layout;
        if layout.body.height == 0 {
            Paragraph::new("Window too small")
                .style(Style::default().fg(Color::Gray))
                .render(inner, buf);
            return;
        }

        // Header row (frozen).
        let header_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        let gutter = " ".repeat(layout.row_number_width as usize);
        buf.set_string(inner.x, layout.header_y, &gutter, Style::default());
        for vc in &layout.columns {
            let name = rs.column_name(vc.col).unwrap_or("");
            buf.set_string(vc.x, layout.header_y, fit_to_width(name, vc.width), header_style);
        }

        if rs.row_count() == 0 {
            Paragraph::new("(no rows)")
                .style(Style::default().fg(Color::Gray))
                .render(layout.body, buf);
            return;
        }

        let row_number_style = Style::default().fg(Color::DarkGray);
        for i in 0..layout.visible_rows() {
            let row = layout.row_offset + i;
            let y = layout.body.y + i as u16;

            if layout.row_number_width > 0 {
                let label = format!(
                    "{:>width$} ",
                    row + 1,
                    width = layout.row_number_width.saturating_sub(1) as usize
                );
                buf.set_string(
                    layout.body.x,
                    y,
                    fit_to_width(&label, layout.row_number_width),
                    row_number_style,
                );
            }

            for vc in &layout.columns {
                let coord = CellCoord::new(row, vc.col);
                self.render_cell(coord, vc, y, buf);
            }
        }
    }
}

impl DataGrid<'_> {
    fn render_cell(&self, coord: CellCoord, vc: &VisibleColumn, y: u16, buf: &mut Buffer) {
        let highlight = self.grid.highlight(coord);

        if highlight == CellHighlight::Editing {
            if let Some(edit) = self.grid.edit_session().active() {
                render_editor(edit, vc, y, buf);
            }
            return;
        }

        let text = self.grid.display_text(coord).unwrap_or_default();
        let is_null = self.grid.ledger().get(coord).is_none()
            && self
                .grid
                .result()
                .and_then(|rs| rs.value(coord))
                .is_some_and(|v| v.is_null());

        let mut style = match highlight {
            CellHighlight::Copied => Style::default().fg(Color::Black).bg(Color::Green),
            CellHighlight::Focus => Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            CellHighlight::Selected => Style::default().bg(Color::Blue),
            CellHighlight::Modified => Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            CellHighlight::Editing | CellHighlight::None => Style::default(),
        };
        if is_null && highlight != CellHighlight::Copied {
            style = style.fg(Color::DarkGray);
        }
        if self.grid.ledger().contains(coord) && highlight != CellHighlight::Modified {
            style = style.add_modifier(Modifier::ITALIC);
        }

        buf.set_string(vc.x, y, fit_to_width(&text, vc.width), style);
    }
}

fn is_inside(x: u16, y: u16, rect: Rect) -> bool {
    // u32 so that x + width cannot overflow at the screen edge.
    let (x, y) = (x as u32, y as u32);
    x >= rect.x as u32
        && x < rect.x as u32 + rect.width as u32
        && y >= rect.y as u32
        && y < rect.y as u32 + rect.height as u32
}

/// Draws the in-cell editor, scrolled so the caret stays visible. Text that
/// is still fully selected is drawn reversed.
fn render_editor(edit: &ActiveEdit, vc: &VisibleColumn, y: u16, buf: &mut Buffer) {
    let style = Style::default().fg(Color::Black).bg(Color::Yellow);
    let text_style = if edit.replace_on_type {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    };
    let text_w = vc.width.saturating_sub(1) as usize;

    let split = edit
        .buffer
        .char_indices()
        .nth(edit.cursor)
        .map_or(edit.buffer.len(), |(i, _)| i);
    let (before, after) = edit.buffer.split_at(split);
    let shown_before = tail_by_display_width(before, text_w);
    let before_w = display_width(&shown_before);
    let mut room = text_w - before_w;
    let shown_after: String = after
        .chars()
        .take_while(|c| {
            let w = UnicodeWidthChar::width(*c).unwrap_or(0);
            let fits = w <= room;
            room = room.saturating_sub(w);
            fits
        })
        .collect();
    let visible: String = format!("{}{}", shown_before, shown_after)
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    buf.set_string(vc.x, y, " ".repeat(vc.width as usize), style);
    buf.set_string(vc.x, y, visible, text_style);

    let under = after.chars().next().filter(|c| !c.is_control()).unwrap_or(' ');
    buf.set_string(
        vc.x + before_w as u16,
        y,
        under.to_string(),
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::SLOW_BLINK),
    );
}

fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn fit_to_width(s: &str, width: u16) -> String {
    let width = width as usize;
    if width == 0 {
        return String::new();
    }
    // Tabs and newlines would break the row.
    let s: String = s
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    let current = display_width(&s);
    if current <= width {
        let mut out = s;
        out.push_str(&" ".repeat(width - current));
        return out;
    }

    if width <= 3 {
        return truncate_by_display_width(&s, width);
    }
    let mut out = truncate_by_display_width(&s, width - 3);
    out.truncate(out.trim_end().len());
    out.push_str("...");
    truncate_by_display_width(&out, width)
}

fn truncate_by_display_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

/// The longest suffix of `s` that fits in `width` columns.
fn tail_by_display_width(s: &str, width: usize) -> String {
    let mut used = 0usize;
    let mut start = s.len();
    for (idx, ch) in s.char_indices().rev() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    s[start..].to_string()
}
