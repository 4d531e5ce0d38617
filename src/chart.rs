//! Text rendering of closing-price charts.
//!
//! Charts are drawn with ratatui widgets into an off-screen [`Buffer`] and
//! flattened to plain lines, so the same page works in a terminal, a pipe or
//! a file.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::market::PriceSeries;

/// Two panels wide enough for the longest fund title plus borders
pub const MIN_WIDTH: u16 = 90;
pub const MIN_HEIGHT: u16 = 8;
pub const DEFAULT_WIDTH: u16 = 120;
pub const DEFAULT_HEIGHT: u16 = 20;

/// Most date labels along the x axis
const MAX_DATE_LABELS: usize = 6;

/// Columns reserved per date label ("YYYY-MM-DD" plus spacing)
const DATE_LABEL_SPAN: usize = 12;

pub const TEAL: Color = Color::Rgb(0, 128, 128);
pub const ORANGE: Color = Color::Rgb(255, 165, 0);

/// One titled price panel
pub struct PriceChart<'a> {
    series: &'a PriceSeries,
    title: String,
    legend: String,
    color: Color,
}

impl<'a> PriceChart<'a> {
    pub fn new(series: &'a PriceSeries, title: impl Into<String>) -> Self {
        Self {
            series,
            title: title.into(),
            legend: series.symbol.clone(),
            color: TEAL,
        }
    }

    pub fn legend(mut self, legend: impl Into<String>) -> Self {
        self.legend = legend.into();
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title(self.title.clone());

        let (y_min, y_max) = match self.series.bounds() {
            Some(bounds) => padded_bounds(bounds),
            None => {
                Paragraph::new("No data")
                    .alignment(Alignment::Center)
                    .block(block)
                    .render(area, buf);
                return;
            }
        };

        let data: Vec<(f64, f64)> = self
            .series
            .closes()
            .into_iter()
            .enumerate()
            .map(|(i, close)| (i as f64, close))
            .collect();
        let x_max = (data.len().saturating_sub(1)).max(1) as f64;

        let dataset = Dataset::default()
            .name(self.legend.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.color))
            .data(&data);

        let y_labels = vec![
            format!("{:.2}", y_min),
            format!("{:.2}", (y_min + y_max) / 2.0),
            format!("{:.2}", y_max),
        ];

        Chart::new(vec![dataset])
            .block(block)
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
            .x_axis(
                Axis::default()
                    .title("Date")
                    .bounds([0.0, x_max])
                    .labels(date_labels(self.series, date_label_count(area.width))),
            )
            .y_axis(
                Axis::default()
                    .title("Closing Price")
                    .bounds([y_min, y_max])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}

/// Pad the y range by 5%, widening a flat series so the line stays visible
fn padded_bounds((lo, hi): (f64, f64)) -> (f64, f64) {
    let range = hi - lo;
    if range <= f64::EPSILON {
        let half = (lo.abs() * 0.01).max(1.0);
        (lo - half, hi + half)
    } else {
        let pad = range * 0.05;
        (lo - pad, hi + pad)
    }
}

/// How many date labels fit in a panel of the given width
pub fn date_label_count(panel_width: u16) -> usize {
    // Borders and the y-axis labels take roughly one span
    let usable = (panel_width as usize).saturating_sub(DATE_LABEL_SPAN);
    (usable / DATE_LABEL_SPAN + 1).clamp(2, MAX_DATE_LABELS)
}

/// Evenly spaced dates (first and last always included)
pub fn date_labels(series: &PriceSeries, count: usize) -> Vec<String> {
    let n = series.len();
    if n == 0 || count == 0 {
        return Vec::new();
    }
    if n == 1 || count == 1 {
        return vec![series.points[0].date.format("%Y-%m-%d").to_string()];
    }

    let count = count.min(n);
    (0..count)
        .map(|i| {
            let idx = i * (n - 1) / (count - 1);
            series.points[idx].date.format("%Y-%m-%d").to_string()
        })
        .collect()
}

/// Draw two charts next to each other and return the panel as text lines
pub fn render_side_by_side(left: PriceChart<'_>, right: PriceChart<'_>, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width.max(MIN_WIDTH), height.max(MIN_HEIGHT));
    let mut buf = Buffer::empty(area);

    let panels = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    left.render(panels[0], &mut buf);
    right.render(panels[1], &mut buf);

    buffer_to_string(&buf)
}

/// Flatten a buffer into lines, dropping trailing blanks
pub fn buffer_to_string(buf: &Buffer) -> String {
    let width = buf.area.width.max(1) as usize;
    buf.content
        .chunks(width)
        .map(|row| {
            let line: String = row.iter().map(|cell| cell.symbol()).collect();
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
