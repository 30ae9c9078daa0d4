//! Status line with priority-based segments that drop out as the terminal narrows.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::grid::{InteractionMode, ResultsGrid};

/// Lower values survive longer when space runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

#[derive(Debug, Clone)]
pub struct StatusSegment {
    pub content: String,
    pub priority: Priority,
    pub style: Style,
    pub right_align: bool,
}

impl StatusSegment {
    pub fn new(content: impl Into<String>, priority: Priority) -> Self {
        Self {
            content: content.into(),
            priority,
            style: Style::default(),
            right_align: false,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn right_align(mut self) -> Self {
        self.right_align = true;
        self
    }

    pub fn width(&self) -> u16 {
        self.content.chars().count() as u16
    }
}

pub struct StatusLineBuilder {
    segments: Vec<StatusSegment>,
    separator: String,
    separator_style: Style,
}

impl Default for StatusLineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLineBuilder {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            separator: " │ ".to_string(),
            separator_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn segment(mut self, segment: StatusSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn segment_if(self, condition: bool, segment: StatusSegment) -> Self {
        if condition {
            self.segment(segment)
        } else {
            self
        }
    }

    /// Lay the segments out in `available_width` columns.
    pub fn build(self, available_width: u16) -> Line<'static> {
        if available_width == 0 {
            return Line::from("");
        }
        let sep_w = self.separator.chars().count() as u16;

        let (mut right, mut left): (Vec<_>, Vec<_>) =
            self.segments.into_iter().partition(|s| s.right_align);
        left.sort_by_key(|s| s.priority);
        right.sort_by_key(|s| s.priority);

        let right_w: u16 = right.iter().map(|s| s.width()).sum::<u16>()
            + sep_w * right.len().saturating_sub(1) as u16;
        let left_budget = available_width
            .saturating_sub(right_w)
            .saturating_sub(if right.is_empty() { 0 } else { sep_w });

        let mut used: u16 = 0;
        let mut shown: Vec<&StatusSegment> = Vec::new();
        for seg in &left {
            let needed = seg.width() + if shown.is_empty() { 0 } else { sep_w };
            if used + needed <= left_budget {
                used += needed;
                shown.push(seg);
            }
        }

        let mut spans: Vec<Span<'static>> = Vec::new();
        for (i, seg) in shown.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(self.separator.clone(), self.separator_style));
            }
            spans.push(Span::styled(seg.content.clone(), seg.style));
        }

        let right_block = if right.is_empty() { 0 } else { right_w + sep_w };
        let padding = available_width.saturating_sub(used).saturating_sub(right_block);
        if padding > 0 {
            spans.push(Span::raw(" ".repeat(padding as usize)));
        }

        for (i, seg) in right.iter().enumerate() {
            if i > 0 || !shown.is_empty() || padding > 0 {
                spans.push(Span::styled(self.separator.clone(), self.separator_style));
            }
            spans.push(Span::styled(seg.content.clone(), seg.style));
        }

        Line::from(spans)
    }
}

/// The grid's status line: mode, focus position, selection size, pending
/// edits and the latest transient message.
pub fn grid_status_line(grid: &ResultsGrid, message: Option<&str>, width: u16) -> Line<'static> {
    let (mode_label, mode_color) = match grid.mode() {
        InteractionMode::Navigating => ("GRID", Color::Cyan),
        InteractionMode::Dragging => ("SELECT", Color::Magenta),
        InteractionMode::Editing => ("EDIT", Color::Yellow),
    };
    let mode = StatusSegment::new(format!(" {} ", mode_label), Priority::Critical).style(
        Style::default()
            .fg(Color::Black)
            .bg(mode_color)
            .add_modifier(Modifier::BOLD),
    );

    let position = grid.selection().focus().and_then(|focus| {
        let rs = grid.result()?;
        let column = rs.column_name(focus.col)?;
        Some(format!("{}:{} {}", focus.row + 1, focus.col + 1, column))
    });

    let extent = grid
        .selection()
        .bounds()
        .filter(|b| b.row_count() * b.col_count() > 1)
        .map(|b| format!("{}x{} selected", b.row_count(), b.col_count()));

    let pending = grid.ledger().len();

    let size = grid
        .result()
        .map(|rs| format!("{} rows × {} cols", rs.row_count(), rs.col_count()));

    let mut builder = StatusLineBuilder::new().segment(mode);
    if let Some(msg) = message {
        builder = builder.segment(
            StatusSegment::new(msg.to_string(), Priority::High).style(Style::default().fg(Color::Green)),
        );
    }
    if let Some(pos) = position {
        builder = builder.segment(StatusSegment::new(pos, Priority::Medium));
    }
    if let Some(extent) = extent {
        builder = builder.segment(StatusSegment::new(extent, Priority::Medium));
    }
    builder = builder.segment_if(
        pending > 0,
        StatusSegment::new(format!("{} modified", pending), Priority::High)
            .style(Style::default().fg(Color::Yellow)),
    );
    if let Some(size) = size {
        builder = builder.segment(
            StatusSegment::new(size, Priority::Low)
                .style(Style::default().fg(Color::DarkGray))
                .right_align(),
        );
    }
    builder.build(width)
}
