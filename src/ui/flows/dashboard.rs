use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::debug;
use ratatui::prelude::Stylize;
use ratatui::{prelude::*, widgets::*};

use crate::app::SessionState;
use crate::error::Result;
use crate::fetch::{ApiClient, FeatureImportance, ProcessedData, ScopedTask};
use crate::records::{growth_histogram, metric_series, Bucket, Metric, SeriesPoint};
use crate::ui::components::chart::{
    render_bar_panel, render_feature_panel, render_histogram, render_placeholder,
};
use crate::ui::components::utils::{centered_rect, grid, spinner_frame, split_vertical};
use crate::ui::styles::{error_line, header_text, secondary_line, success_line};
use crate::ui::{DashboardExit, TerminalGuard, UiRoute};
use crate::utils::clock_label;

const PANEL_COUNT: usize = 6;
const HISTOGRAM_PANEL: usize = 4;
const FEATURE_PANEL: usize = 5;
const PAGE_STEPS: i32 = 5;

/// Chart series derived from the current filtered view.
#[derive(Debug, Clone, Default)]
pub struct PanelData {
    pub series: Vec<(Metric, Vec<SeriesPoint>)>,
    pub histogram: Vec<Bucket>,
}

impl PanelData {
    pub fn build(session: &SessionState) -> Self {
        let settings = &session.config().dashboard;
        let (view, _) = session.filtered();
        Self {
            series: Metric::ALL
                .iter()
                .map(|metric| (*metric, metric_series(&view, *metric, settings.max_bars)))
                .collect(),
            histogram: growth_histogram(&view, settings.histogram_bucket),
        }
    }
}

/// The two requests a dashboard visit depends on. Dropping it aborts both.
struct Fetches {
    data: ScopedTask<ProcessedData>,
    features: ScopedTask<FeatureImportance>,
    data_error: Option<String>,
    features_error: Option<String>,
    refreshing: bool,
}

impl Fetches {
    fn start(client: &ApiClient, refreshing: bool) -> Self {
        let data_client = client.clone();
        let feature_client = client.clone();
        Self {
            data: ScopedTask::spawn(async move { data_client.get_processed_data().await }),
            features: ScopedTask::spawn(async move {
                feature_client.get_feature_importance().await
            }),
            data_error: None,
            features_error: None,
            refreshing,
        }
    }

    fn is_pending(&self) -> bool {
        self.data.is_pending() || self.features.is_pending()
    }

    /// Move finished results into the session. Each request owns its own slot.
    ///
    /// Returns a notice to replace the current one when a failure lands, or
    /// when a refresh has fully settled.
    fn collect(&mut self, session: &mut SessionState) -> Option<Notice> {
        let mut landed = None;
        if let Some(result) = self.features.try_take() {
            match result {
                Ok(importance) => session.apply_feature_importance(importance),
                Err(err) => {
                    debug!("feature importance unavailable: {err}");
                    let text = err.user_message("Loading feature importance");
                    self.features_error = Some(text.clone());
                    landed = Some(Notice::Error(text));
                }
            }
        }
        if let Some(result) = self.data.try_take() {
            match result {
                Ok(data) => session.apply_processed_data(data),
                Err(err) => {
                    debug!("processed data unavailable: {err}");
                    let text = err.user_message("Loading data");
                    self.data_error = Some(text.clone());
                    landed = Some(Notice::Error(text));
                }
            }
        }

        if self.refreshing && !self.is_pending() {
            self.refreshing = false;
            if landed.is_none() && self.data_error.is_none() && self.features_error.is_none() {
                landed = Some(Notice::Info(format!("Data refreshed at {}", clock_label())));
            }
        }
        landed
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Notice {
    Info(String),
    Error(String),
}

/// Results for a dashboard-level export of the current view.
fn export_notice(session: &SessionState) -> Notice {
    let count = session.filtered().1.count;
    match session.export_filtered() {
        Ok(path) => Notice::Info(format!(
            "Exported {} rows to {} at {}",
            count,
            path.display(),
            clock_label()
        )),
        Err(err) => Notice::Error(err.user_message("Export")),
    }
}

pub async fn run_dashboard(
    session: &mut SessionState,
    client: &ApiClient,
    welcome: Option<String>,
) -> Result<DashboardExit> {
    let mut guard = TerminalGuard::new()?;
    let mut fetches = Fetches::start(client, false);
    let mut link: Option<String> = None;
    let mut notice = welcome.map(Notice::Info);
    let mut focus = 0usize;
    let mut zoomed = false;
    let mut tick = 0usize;

    loop {
        if let Some(landed) = fetches.collect(session) {
            notice = Some(landed);
        }
        let panels = PanelData::build(session);

        tick = tick.wrapping_add(1);
        guard.draw(|f| {
            draw_dashboard(f, session, &panels, &fetches, notice.as_ref(), focus, zoomed, tick);
            if let Some(link) = &link {
                render_download_link(f, link);
            }
        })?;

        if !event::poll(Duration::from_millis(100))? {
            tokio::task::yield_now().await;
            continue;
        }
        let Event::Key(k) = event::read()? else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        if link.take().is_some() {
            continue;
        }

        let exit = match k.code {
            KeyCode::Left | KeyCode::Char('h') => {
                session.step_threshold(-1);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                session.step_threshold(1);
                None
            }
            KeyCode::PageDown => {
                session.step_threshold(-PAGE_STEPS);
                None
            }
            KeyCode::PageUp => {
                session.step_threshold(PAGE_STEPS);
                None
            }
            KeyCode::Tab => {
                focus = (focus + 1) % PANEL_COUNT;
                None
            }
            KeyCode::BackTab => {
                focus = (focus + PANEL_COUNT - 1) % PANEL_COUNT;
                None
            }
            KeyCode::Enter | KeyCode::Char('z') => {
                zoomed = !zoomed;
                None
            }
            KeyCode::Char('e') => {
                notice = Some(export_notice(session));
                None
            }
            KeyCode::Char('d') => {
                match session.export_link() {
                    Ok(uri) => link = Some(uri),
                    Err(err) => notice = Some(Notice::Error(err.user_message("Download link"))),
                }
                None
            }
            KeyCode::Char('r') => {
                debug!("refreshing dashboard data");
                fetches = Fetches::start(client, true);
                notice = Some(Notice::Info("Refreshing data…".to_string()));
                None
            }
            KeyCode::Char('p') => Some(DashboardExit::Predict),
            KeyCode::Char('u') => Some(DashboardExit::Upload),
            KeyCode::Esc if zoomed => {
                zoomed = false;
                None
            }
            KeyCode::Esc | KeyCode::Char('q') => Some(DashboardExit::Back),
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(DashboardExit::Back)
            }
            _ => None,
        };

        if let Some(exit) = exit {
            // Dropping `fetches` here aborts anything still in flight.
            drop(fetches);
            guard.restore()?;
            return Ok(exit);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_dashboard(
    f: &mut Frame<'_>,
    session: &SessionState,
    panels: &PanelData,
    fetches: &Fetches,
    notice: Option<&Notice>,
    focus: usize,
    zoomed: bool,
    tick: usize,
) {
    let chunks = split_vertical(
        f.size(),
        &[
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(1),
        ],
    );

    draw_header(f, chunks[0], session, fetches, tick);

    if zoomed {
        draw_panel(f, chunks[1], focus, session, panels, fetches, true);
    } else {
        for (idx, cell) in grid(chunks[1], 2, 3).into_iter().enumerate() {
            draw_panel(f, cell, idx, session, panels, fetches, idx == focus);
        }
    }

    f.render_widget(Paragraph::new(status_line(notice, fetches)), chunks[2]);

    f.render_widget(
        Paragraph::new(secondary_line(
            "←/→ threshold • PgUp/PgDn ±5 • Tab panel • Enter zoom • e export • d link • r refresh • p predict • u upload • Esc back",
        )),
        chunks[3],
    );
}

/// The latest notice wins; with none, a fetch failure is shown.
fn status_line<'a>(notice: Option<&'a Notice>, fetches: &'a Fetches) -> Line<'a> {
    match notice {
        Some(Notice::Info(text)) => success_line(text.as_str()),
        Some(Notice::Error(text)) => error_line(text.as_str()),
        None => match (&fetches.data_error, &fetches.features_error) {
            (Some(err), _) | (None, Some(err)) => error_line(err.as_str()),
            (None, None) => secondary_line(""),
        },
    }
}

/// Overlay with the browser download link for the current view.
fn render_download_link(f: &mut Frame<'_>, link: &str) {
    let area = centered_rect(80, 60, f.size());
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Download link (any key to close)");
    f.render_widget(
        Paragraph::new(link.to_string())
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_header(f: &mut Frame<'_>, area: Rect, session: &SessionState, fetches: &Fetches, tick: usize) {
    let (_, summary) = session.filtered();
    let accuracy = session
        .accuracy()
        .map(|a| format!("RMSE {:.2} | R² {:.2}", a.rmse, a.r2))
        .unwrap_or_else(|| "RMSE - | R² -".to_string());
    let loading = if fetches.is_pending() {
        format!("  {} loading", spinner_frame(tick))
    } else {
        String::new()
    };

    let mut text = header_text(format!("{}{}", UiRoute::Dashboard.title(), loading));
    text.lines.push(Line::from(vec![
        format!("Growth > {:.0}%", session.threshold()).bold(),
        "  |  ".dim(),
        format!("Businesses: {}", summary.count).into(),
        "  |  ".dim(),
        format!("Average growth: {}%", summary.avg_growth_display()).into(),
        "  |  ".dim(),
        accuracy.into(),
    ]));
    text.lines.push(secondary_line(format!(
        "{} records loaded • {} predictions",
        session.dataset().len(),
        session.prediction_count()
    )));
    f.render_widget(Paragraph::new(text), area);
}

fn draw_panel(
    f: &mut Frame<'_>,
    area: Rect,
    idx: usize,
    session: &SessionState,
    panels: &PanelData,
    fetches: &Fetches,
    focused: bool,
) {
    if idx == FEATURE_PANEL {
        if session.features().is_empty() {
            let message = waiting_message(fetches.features.is_pending(), &fetches.features_error);
            render_placeholder(f, area, "Feature Importance (%)", &message, focused);
        } else {
            render_feature_panel(f, area, session.features(), focused);
        }
        return;
    }

    let title = match panels.series.get(idx) {
        Some((metric, _)) => metric.label(),
        None => "Growth Distribution (count)",
    };
    if !session.has_data() {
        let message = waiting_message(fetches.data.is_pending(), &fetches.data_error);
        render_placeholder(f, area, title, &message, focused);
        return;
    }

    if idx == HISTOGRAM_PANEL {
        render_histogram(f, area, &panels.histogram, focused);
    } else if let Some((metric, points)) = panels.series.get(idx) {
        render_bar_panel(f, area, metric.label(), points, focused);
    }
}

fn waiting_message(pending: bool, error: &Option<String>) -> String {
    match (pending, error) {
        (true, _) => "Loading…".to_string(),
        (false, Some(err)) => err.clone(),
        (false, None) => "No data yet. Upload a CSV first.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AppError;
    use crate::fetch::Accuracy;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    fn session_with(rows: serde_json::Value) -> SessionState {
        let mut session = SessionState::new(Config::builtin());
        let data: ProcessedData = serde_json::from_value(json!({
            "processed_data": rows,
            "accuracy": { "RMSE": 1.0, "R2": 0.5 }
        }))
        .expect("processed data");
        session.apply_processed_data(data);
        session
    }

    #[test]
    fn panels_follow_threshold() {
        let mut session = session_with(json!([
            { "Business_Name": "X", "Growth_Rate (%)": 25, "Revenue_Growth_Rate": 0.3 },
            { "Business_Name": "Y", "Growth_Rate (%)": 15, "Revenue_Growth_Rate": 0.1 },
            { "Business_Name": "Z", "Growth_Rate (%)": 30, "Revenue_Growth_Rate": 0.2 }
        ]));

        let panels = PanelData::build(&session);
        let (metric, growth) = &panels.series[0];
        assert_eq!(*metric, Metric::GrowthRate);
        let labels: Vec<&str> = growth.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["X", "Z"]);
        assert_eq!(panels.series[1].1.len(), 2);
        assert_eq!(panels.histogram.iter().map(|b| b.count).sum::<usize>(), 2);

        session.set_threshold(26.0);
        let panels = PanelData::build(&session);
        assert_eq!(panels.series[0].1.len(), 1);
        assert_eq!(session.accuracy(), Some(Accuracy { rmse: 1.0, r2: 0.5 }));
    }

    #[test]
    fn bar_panels_are_capped() {
        let rows: Vec<serde_json::Value> = (0..30)
            .map(|i| json!({ "Business_Name": format!("B{i}"), "Growth_Rate (%)": 40 }))
            .collect();
        let session = session_with(serde_json::Value::Array(rows));

        let panels = PanelData::build(&session);

        assert_eq!(panels.series[0].1.len(), session.config().dashboard.max_bars);
        assert_eq!(panels.histogram.len(), 1);
        assert_eq!(panels.histogram[0].count, 30);
    }

    #[test]
    fn waiting_message_prefers_loading() {
        assert_eq!(waiting_message(true, &Some("x".into())), "Loading…");
        assert_eq!(waiting_message(false, &Some("boom".into())), "boom");
        assert!(waiting_message(false, &None).contains("Upload"));
    }

    #[test]
    fn export_notice_reports_empty_view() {
        let session = session_with(json!([{ "Business_Name": "Low", "Growth_Rate (%)": 2 }]));
        match export_notice(&session) {
            Notice::Error(text) => assert_eq!(text, "No data to export."),
            Notice::Info(text) => panic!("unexpected export: {text}"),
        }
    }

    fn failing_refresh() -> Fetches {
        Fetches {
            data: ScopedTask::spawn(async { Err(AppError::message("connection refused")) }),
            features: ScopedTask::idle(),
            data_error: None,
            features_error: None,
            refreshing: true,
        }
    }

    async fn settle(fetches: &mut Fetches, session: &mut SessionState) -> Option<Notice> {
        for _ in 0..100 {
            if let Some(notice) = fetches.collect(session) {
                return Some(notice);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        None
    }

    fn rendered(session: &SessionState, fetches: &Fetches, notice: Option<&Notice>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).expect("test terminal");
        let panels = PanelData::build(session);
        terminal
            .draw(|f| draw_dashboard(f, session, &panels, fetches, notice, 0, false, 0))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn failed_refresh_replaces_refreshing_notice() {
        let mut session = session_with(json!([{ "Business_Name": "X", "Growth_Rate (%)": 25 }]));
        let mut fetches = failing_refresh();
        let mut notice = Some(Notice::Info("Refreshing data…".to_string()));

        if let Some(landed) = settle(&mut fetches, &mut session).await {
            notice = Some(landed);
        }

        assert_eq!(
            notice,
            Some(Notice::Error("Loading data failed. Please try again.".to_string()))
        );
        let screen = rendered(&session, &fetches, notice.as_ref());
        assert!(screen.contains("Loading data failed. Please try again."));
        assert!(!screen.contains("Refreshing data"));
    }

    #[tokio::test]
    async fn successful_refresh_reports_completion() {
        let mut session = SessionState::new(Config::builtin());
        let mut fetches = Fetches {
            data: ScopedTask::spawn(async {
                Ok(ProcessedData {
                    processed_data: Vec::new(),
                    accuracy: None,
                    growth_predictions: Vec::new(),
                })
            }),
            features: ScopedTask::idle(),
            data_error: None,
            features_error: None,
            refreshing: true,
        };

        match settle(&mut fetches, &mut session).await {
            Some(Notice::Info(text)) => assert!(text.starts_with("Data refreshed at ")),
            other => panic!("unexpected notice: {other:?}"),
        }
        assert!(fetches.collect(&mut session).is_none());
    }

    #[test]
    fn status_falls_back_to_fetch_error() {
        let fetches = Fetches {
            data: ScopedTask::idle(),
            features: ScopedTask::idle(),
            data_error: None,
            features_error: Some("Loading feature importance failed. Please try again.".into()),
            refreshing: false,
        };
        let text = |line: Line<'_>| line.spans.iter().map(|s| s.content.to_string()).collect::<String>();
        assert_eq!(
            text(status_line(None, &fetches)),
            "Loading feature importance failed. Please try again."
        );

        let notice = Notice::Info("Exported 2 rows".into());
        assert_eq!(text(status_line(Some(&notice), &fetches)), "Exported 2 rows");
    }
}
