//! House bar chart for the census TUI.
//!
//! Draws one bar per [`CategoryCount`] with an integer-only y axis and grid
//! rules, followed by a legend line, a tooltip line for the selected bar and
//! a one-line summary of the aggregation.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use census_core::models::CategoryCount;
use census_runtime::store::ChartSnapshot;

use crate::themes::Theme;

/// Gap between neighbouring bars, in columns.
const BAR_GAP: u16 = 2;

/// Widest a single bar is allowed to grow.
const MAX_BAR_WIDTH: u16 = 14;

// ── Axis ──────────────────────────────────────────────────────────────────────

/// Integer y-axis: the top value and the tick values from 0 upwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisScale {
    pub max: u64,
    pub ticks: Vec<u64>,
}

/// Build an integer axis covering `max_count` with at most `max_ticks` ticks.
///
/// Ticks are evenly spaced whole numbers starting at 0; the axis top is the
/// last tick, so it may exceed `max_count`. An all-zero chart gets a 0..1 axis.
pub fn integer_axis(max_count: u64, max_ticks: usize) -> AxisScale {
    let slots = max_ticks.max(2) as u64;
    if max_count == 0 {
        return AxisScale {
            max: 1,
            ticks: vec![0, 1],
        };
    }

    let step = max_count.div_ceil(slots - 1).max(1);
    let top = step * max_count.div_ceil(step);
    let ticks = (0..=top).step_by(step as usize).collect();
    AxisScale { max: top, ticks }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render the chart, legend, tooltip and summary for `snapshot` into `area`.
///
/// `selected` indexes the bar shown in the tooltip; out-of-range values show
/// no tooltip.
pub fn render_chart_view(
    frame: &mut Frame,
    area: Rect,
    snapshot: &ChartSnapshot,
    selected: usize,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_bars(frame, chunks[0], snapshot.counts(), selected, theme);

    frame.render_widget(Paragraph::new(legend_line(theme)), chunks[1]);
    frame.render_widget(
        Paragraph::new(tooltip_line(snapshot.counts(), selected, theme)),
        chunks[2],
    );
    frame.render_widget(Paragraph::new(summary_line(snapshot, theme)), chunks[3]);
}

/// Placeholder shown until the first chart has been built.
pub fn render_no_chart(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No chart yet", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Enter a date-of-birth range (or leave it empty) and press Enter.",
            theme.dim,
        )),
        Line::from(Span::styled("Press Esc or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.chart_border)
                .title(" Students per house "),
        ),
        area,
    );
}

fn render_bars(
    frame: &mut Frame,
    area: Rect,
    counts: &[CategoryCount],
    selected: usize,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.chart_border)
        .title(" Students per house ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // The bottom row of the plot holds the category labels.
    let bar_rows = inner.height.saturating_sub(1);
    if bar_rows == 0 || inner.width < 4 {
        return;
    }

    let max_count = counts.iter().map(|c| c.count).max().unwrap_or(0);
    let axis = integer_axis(max_count, (bar_rows as usize / 2).max(2));
    let label_width = axis.max.to_string().len() as u16;
    let axis_width = (label_width + 2).min(inner.width - 1);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(axis_width), Constraint::Min(1)])
        .split(inner);
    let (axis_area, plot_area) = (columns[0], columns[1]);

    let buf = frame.buffer_mut();
    for &tick in &axis.ticks {
        let offset = (tick * u64::from(bar_rows) / axis.max) as u16;
        let y = axis_area.y + bar_rows - offset.min(bar_rows);
        let label = format!("{tick:>width$} ┤", width = label_width as usize);
        buf.set_string(axis_area.x, y, label, theme.axis);
        if tick > 0 {
            buf.set_string(
                plot_area.x,
                y,
                "┄".repeat(plot_area.width as usize),
                theme.grid,
            );
        }
    }

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::default()
                .value(c.count)
                .label(Line::from(c.category.clone()))
                .text_value(c.count.to_string())
                .style(theme.bar_style(i == selected))
                .value_style(theme.bar_value)
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(plot_area.width, counts.len()))
        .bar_gap(BAR_GAP)
        .label_style(theme.bar_label)
        .max(axis.max);
    frame.render_widget(chart, plot_area);
}

/// Widest bar that still fits `bars` bars into `width` columns.
fn bar_width(width: u16, bars: usize) -> u16 {
    let bars = bars.max(1) as u16;
    let gaps = BAR_GAP * (bars - 1);
    (width.saturating_sub(gaps) / bars).clamp(1, MAX_BAR_WIDTH)
}

fn legend_line(theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(" ■ ", theme.bar),
        Span::styled("count", theme.label),
        Span::styled("    ←/→ select a house", theme.dim),
    ])
}

fn tooltip_line(counts: &[CategoryCount], selected: usize, theme: &Theme) -> Line<'static> {
    match counts.get(selected) {
        Some(c) => Line::from(vec![
            Span::styled(" ▶ ", theme.bar_selected),
            Span::styled(c.category.clone(), theme.value),
            Span::styled("  count: ", theme.label),
            Span::styled(c.count.to_string(), theme.value),
        ]),
        None => Line::from(""),
    }
}

fn summary_line(snapshot: &ChartSnapshot, theme: &Theme) -> Line<'static> {
    let s = &snapshot.summary;
    Line::from(vec![
        Span::styled(format!(" {} ", snapshot.range), theme.info),
        Span::styled(
            format!(
                "· {} counted of {} students · {} without usable birth date · {} outside range ",
                s.total(),
                s.considered,
                s.unparseable_dates,
                s.out_of_range,
            ),
            theme.label,
        ),
        Span::styled(
            format!(
                "· rev {} at {}",
                snapshot.revision,
                snapshot.computed_at.format("%H:%M:%S")
            ),
            theme.dim,
        ),
    ])
}

// ── Tests ──────────────────────────────────────────────────────────────────────
