//! Editable birth-date range widget.
//!
//! The same editor serves both input shapes: two fields (`from` / `to`) for
//! [`RangeVariant::Separate`] or one `START..END` field for
//! [`RangeVariant::Combined`].

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use census_core::models::{RangeInput, RangeVariant};

use crate::themes::Theme;

/// Longest text a single field accepts.
const MAX_FIELD_LEN: usize = 32;

/// Minimum on-screen width of a field, enough for `YYYY-MM-DD`.
const MIN_FIELD_WIDTH: usize = 10;

pub struct RangeEditor {
    variant: RangeVariant,
    fields: Vec<String>,
    focus: usize,
}

impl RangeEditor {
    /// Editor pre-filled with `input`, focused on the first field.
    pub fn new(input: RangeInput) -> Self {
        let variant = input.variant();
        let fields = match input {
            RangeInput::Separate { start, end } => vec![start, end],
            RangeInput::Combined(text) => vec![text],
        };
        Self {
            variant,
            fields,
            focus: 0,
        }
    }

    pub fn variant(&self) -> RangeVariant {
        self.variant
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Current contents as a [`RangeInput`] (not yet validated).
    pub fn input(&self) -> RangeInput {
        match self.variant {
            RangeVariant::Separate => RangeInput::Separate {
                start: self.fields[0].clone(),
                end: self.fields[1].clone(),
            },
            RangeVariant::Combined => RangeInput::Combined(self.fields[0].clone()),
        }
    }

    /// Append `c` to the focused field. Only date characters are accepted.
    ///
    /// Returns `true` when the character was taken.
    pub fn push_char(&mut self, c: char) -> bool {
        if !(c.is_ascii_digit() || c == '-' || c == '.') {
            return false;
        }
        let field = &mut self.fields[self.focus];
        if field.len() >= MAX_FIELD_LEN {
            return false;
        }
        field.push(c);
        true
    }

    pub fn backspace(&mut self) {
        self.fields[self.focus].pop();
    }

    pub fn clear_focused(&mut self) {
        self.fields[self.focus].clear();
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    fn labels(&self) -> &'static [&'static str] {
        match self.variant {
            RangeVariant::Separate => &["Born from", "to"],
            RangeVariant::Combined => &["Born between (START..END)"],
        }
    }

    /// The widget as a single line of label / field pairs.
    pub fn to_line(&self, theme: &Theme) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, (label, text)) in self.labels().iter().zip(&self.fields).enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(format!("{label}: "), theme.label));

            let focused = i == self.focus;
            let cursor = if focused { "_" } else { "" };
            let shown = format!(" {text}{cursor}");
            let width = MIN_FIELD_WIDTH.max(text.len() + 1) + 2;
            let style = if focused {
                theme.input_focused
            } else {
                theme.input
            };
            spans.push(Span::styled(format!("{shown:<width$}"), style));
        }
        spans.push(Span::styled("   [Enter] build chart", theme.dim));
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.separator)
            .title(" Date of birth ");
        frame.render_widget(Paragraph::new(self.to_line(theme)).block(block), area);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
