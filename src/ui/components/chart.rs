use ratatui::layout::{Alignment, Direction, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Paragraph, Wrap};
use ratatui::Frame;

use crate::records::{Bucket, FeatureShare, SeriesPoint};
use crate::ui::styles::{panel, secondary_line, value_color, ACCENT};
use crate::utils::{format_compact, truncate_to_width};

/// Values are drawn at 1/100 resolution since bar heights are integers.
const BAR_SCALE: f64 = 100.0;
const MAX_LABEL_WIDTH: usize = 14;

/// One horizontal bar ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry {
    pub label: String,
    pub height: u64,
    pub text: String,
    pub value: f64,
}

pub fn bar_height(value: f64) -> u64 {
    if value.is_finite() {
        (value.abs() * BAR_SCALE).round() as u64
    } else {
        0
    }
}

/// Shape series points into bars, truncating labels to `label_width` columns.
pub fn bar_entries(points: &[SeriesPoint], label_width: usize) -> Vec<BarEntry> {
    points
        .iter()
        .map(|point| BarEntry {
            label: truncate_to_width(&point.label, label_width),
            height: bar_height(point.value),
            text: format_compact(point.value),
            value: point.value,
        })
        .collect()
}

pub fn feature_entries(shares: &[FeatureShare], label_width: usize) -> Vec<BarEntry> {
    shares
        .iter()
        .map(|share| BarEntry {
            label: truncate_to_width(&share.feature, label_width),
            height: bar_height(share.percent),
            text: format!("{:.1}%", share.percent),
            value: share.percent,
        })
        .collect()
}

pub fn render_bar_panel(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    points: &[SeriesPoint],
    focused: bool,
) {
    if points.is_empty() {
        render_placeholder(f, area, title, "No businesses above the threshold.", focused);
        return;
    }
    let entries = bar_entries(points, label_width(area));
    render_horizontal(f, area, title, &entries, focused);
}

pub fn render_feature_panel(f: &mut Frame<'_>, area: Rect, shares: &[FeatureShare], focused: bool) {
    let title = "Feature Importance (%)";
    if shares.is_empty() {
        render_placeholder(f, area, title, "No feature importance available.", focused);
        return;
    }
    let entries = feature_entries(shares, label_width(area));
    render_horizontal(f, area, title, &entries, focused);
}

pub fn render_histogram(f: &mut Frame<'_>, area: Rect, buckets: &[Bucket], focused: bool) {
    let title = "Growth Distribution (count)";
    if buckets.is_empty() {
        render_placeholder(f, area, title, "No businesses above the threshold.", focused);
        return;
    }

    let block = panel(title, focused);
    let inner_width = block.inner(area).width;
    let slots = u16::try_from(buckets.len()).unwrap_or(u16::MAX).max(1);
    let bar_width = (inner_width / slots).saturating_sub(1).clamp(1, 9);

    let bars: Vec<Bar> = buckets
        .iter()
        .map(|bucket| {
            Bar::default()
                .value(bucket.count as u64)
                .label(Line::from(bucket.label()))
                .style(Style::default().fg(ACCENT))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

/// Bordered panel holding a single centered message.
pub fn render_placeholder(f: &mut Frame<'_>, area: Rect, title: &str, message: &str, focused: bool) {
    let body = Paragraph::new(secondary_line(message.to_string()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(panel(title.to_string(), focused));
    f.render_widget(body, area);
}

fn render_horizontal(f: &mut Frame<'_>, area: Rect, title: &str, entries: &[BarEntry], focused: bool) {
    let max = entries.iter().map(|e| e.height).max().unwrap_or(0).max(1);
    let bars: Vec<Bar> = entries
        .iter()
        .map(|entry| {
            Bar::default()
                .value(entry.height)
                .label(Line::from(entry.label.clone()))
                .text_value(entry.text.clone())
                .style(Style::default().fg(value_color(entry.value)))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel(title.to_string(), focused))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(max)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn label_width(area: Rect) -> usize {
    usize::from(area.width / 3).clamp(4, MAX_LABEL_WIDTH)
}
