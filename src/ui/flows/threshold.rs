use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::info;
use ratatui::prelude::Stylize;
use ratatui::{prelude::*, widgets::*};

use crate::app::SessionState;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::ui::components::utils::{centered_rect, split_vertical};
use crate::ui::styles::{header_text, secondary_line, ACCENT};
use crate::ui::{TerminalGuard, UiRoute};

/// Uncommitted slider position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdDraft {
    value: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl ThresholdDraft {
    pub fn new(current: f64, settings: &DashboardConfig) -> Self {
        Self {
            value: settings.clamp_threshold(current),
            min: settings.threshold_min,
            max: settings.threshold_max,
            step: settings.threshold_step,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn nudge(&mut self, steps: i32) {
        self.value = (self.value + self.step * f64::from(steps)).clamp(self.min, self.max);
    }

    pub fn jump_to_min(&mut self) {
        self.value = self.min;
    }

    pub fn jump_to_max(&mut self) {
        self.value = self.max;
    }

    /// Position along the slider in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 1.0;
        }
        ((self.value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Slider editor for the growth threshold. Enter commits, Esc discards.
pub fn run_threshold_editor(session: &mut SessionState) -> Result<()> {
    let mut guard = TerminalGuard::new()?;
    let mut draft = ThresholdDraft::new(session.threshold(), &session.config().dashboard);

    loop {
        let preview = session.dataset().filter_and_summarize(draft.value()).1;
        let loaded = session.has_data();
        guard.draw(|f| {
            let size = f.size();
            let chunks = split_vertical(
                size,
                &[Constraint::Length(2), Constraint::Min(1), Constraint::Length(1)],
            );
            f.render_widget(
                Paragraph::new(header_text(format!(
                    "{} — minimum growth rate shown on the dashboard",
                    UiRoute::Threshold.title()
                ))),
                chunks[0],
            );

            let area = centered_rect(70, 50, chunks[1]);
            f.render_widget(Clear, area);
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!("Growth > {:.0}%", draft.value()));
            let inner = block.inner(area);
            f.render_widget(block, area);

            let rows = split_vertical(
                inner,
                &[
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ],
            );
            let gauge = LineGauge::default()
                .gauge_style(Style::default().fg(ACCENT))
                .line_set(symbols::line::THICK)
                .label(format!("{:>3.0}%", draft.value()))
                .ratio(draft.ratio());
            f.render_widget(gauge, rows[0]);
            f.render_widget(
                Paragraph::new(secondary_line(format!(
                    "{:.0}%{:>width$}",
                    draft.min,
                    format!("{:.0}%", draft.max),
                    width = usize::from(inner.width.saturating_sub(4))
                ))),
                rows[1],
            );

            let preview_line = if loaded {
                Line::from(vec![
                    format!("{}", preview.count).bold().fg(ACCENT),
                    format!(
                        " businesses above this threshold • average {}%",
                        preview.avg_growth_display()
                    )
                    .into(),
                ])
            } else {
                secondary_line("Load data on the dashboard to preview matches.")
            };
            f.render_widget(Paragraph::new(preview_line), rows[3]);

            f.render_widget(
                Paragraph::new(secondary_line(
                    "←/→ or h/l adjust • PgUp/PgDn ±5 • Home/End min/max • Enter apply • Esc cancel",
                )),
                chunks[2],
            );
        })?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(k) = event::read()? else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        match k.code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Down | KeyCode::Char('j') => draft.nudge(-1),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Up | KeyCode::Char('k') => draft.nudge(1),
            KeyCode::PageDown => draft.nudge(-5),
            KeyCode::PageUp => draft.nudge(5),
            KeyCode::Home => draft.jump_to_min(),
            KeyCode::End => draft.jump_to_max(),
            KeyCode::Enter => {
                session.set_threshold(draft.value());
                info!("growth threshold set to {}", session.threshold());
                guard.restore()?;
                return Ok(());
            }
            KeyCode::Esc => {
                guard.restore()?;
                return Ok(());
            }
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                guard.restore()?;
                return Ok(());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn draft_moves_in_steps_within_range() {
        let settings = Config::builtin().dashboard;
        let mut draft = ThresholdDraft::new(20.0, &settings);

        draft.nudge(3);
        assert_eq!(draft.value(), 23.0);
        draft.nudge(100);
        assert_eq!(draft.value(), 50.0);
        draft.jump_to_min();
        assert_eq!(draft.value(), 5.0);
        draft.nudge(-1);
        assert_eq!(draft.value(), 5.0);
    }

    #[test]
    fn ratio_spans_the_slider() {
        let settings = Config::builtin().dashboard;
        assert_eq!(ThresholdDraft::new(5.0, &settings).ratio(), 0.0);
        assert_eq!(ThresholdDraft::new(50.0, &settings).ratio(), 1.0);
        assert!((ThresholdDraft::new(27.5, &settings).ratio() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_start_is_clamped() {
        let settings = Config::builtin().dashboard;
        assert_eq!(ThresholdDraft::new(80.0, &settings).value(), 50.0);
    }
}
