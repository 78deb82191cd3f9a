use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::info;
use ratatui::prelude::Stylize;
use ratatui::{prelude::*, widgets::*};

use crate::error::Result;
use crate::fetch::{ApiClient, FetchResult, Prediction, ScopedTask};
use crate::records::{PredictionInput, PREDICTION_FEATURES};
use crate::ui::components::render_loading;
use crate::ui::components::utils::split_vertical;
use crate::ui::styles::{error_line, header_text, panel, secondary_line, selection_style, ACCENT};
use crate::ui::{TerminalGuard, UiRoute};

const ACTION: &str = "Prediction";

#[derive(Debug, Clone, PartialEq)]
pub enum FormResult {
    Predicted(f64),
    Failed(String),
}

/// Text fields for the prediction form, one per model feature.
pub struct PredictionForm {
    fields: Vec<(String, String)>,
    selected: usize,
    result: Option<FormResult>,
}

impl Default for PredictionForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionForm {
    pub fn new() -> Self {
        Self {
            fields: PREDICTION_FEATURES
                .iter()
                .map(|(key, _)| ((*key).to_string(), String::new()))
                .collect(),
            selected: 0,
            result: None,
        }
    }

    pub fn result(&self) -> Option<&FormResult> {
        self.result.as_ref()
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.fields.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + self.fields.len() - 1) % self.fields.len();
    }

    /// Append to the selected field. Only characters of a decimal number are kept.
    pub fn push_char(&mut self, ch: char) {
        if !(ch.is_ascii_digit() || matches!(ch, '.' | '-' | 'e' | 'E' | '+')) {
            return;
        }
        if let Some((_, text)) = self.fields.get_mut(self.selected) {
            text.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some((_, text)) = self.fields.get_mut(self.selected) {
            text.pop();
        }
    }

    pub fn clear(&mut self) {
        for (_, text) in &mut self.fields {
            text.clear();
        }
        self.result = None;
    }

    /// Parse the form, recording a validation failure on the form itself.
    pub fn to_input(&mut self) -> Option<PredictionInput> {
        match PredictionInput::from_form(&self.fields) {
            Ok(input) => Some(input),
            Err(err) => {
                self.result = Some(FormResult::Failed(err.user_message(ACTION)));
                None
            }
        }
    }

    pub fn apply_result(&mut self, result: FetchResult<Prediction>) {
        self.result = Some(match result {
            Ok(prediction) => {
                info!("predicted growth {:.2}", prediction.predicted_growth);
                FormResult::Predicted(prediction.predicted_growth)
            }
            Err(err) => FormResult::Failed(err.user_message(ACTION)),
        });
    }
}

pub async fn run_prediction_form(client: &ApiClient) -> Result<()> {
    let mut guard = TerminalGuard::new()?;
    let mut form = PredictionForm::new();
    let mut task: ScopedTask<Prediction> = ScopedTask::idle();
    let mut tick = 0usize;

    loop {
        if let Some(result) = task.try_take() {
            form.apply_result(result);
        }

        tick = tick.wrapping_add(1);
        let pending = task.is_pending();
        guard.draw(|f| {
            draw_form(f, &form);
            if pending {
                render_loading(f, "Predicting", "Asking the model", tick);
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
        let ctrl_c = k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL);

        if pending {
            if k.code == KeyCode::Esc || ctrl_c {
                task.cancel();
                form.result = Some(FormResult::Failed(format!("{ACTION} cancelled.")));
            }
            continue;
        }

        match k.code {
            _ if ctrl_c => break,
            KeyCode::Esc => break,
            KeyCode::Down | KeyCode::Tab => form.select_next(),
            KeyCode::Up | KeyCode::BackTab => form.select_prev(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Delete => form.clear(),
            KeyCode::Enter => {
                if let Some(input) = form.to_input() {
                    let client = client.clone();
                    task = ScopedTask::spawn(async move { client.predict_growth(&input).await });
                }
            }
            KeyCode::Char(ch) => form.push_char(ch),
            _ => {}
        }
    }

    guard.restore()?;
    Ok(())
}

fn draw_form(f: &mut Frame<'_>, form: &PredictionForm) {
    let chunks = split_vertical(
        f.size(),
        &[
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ],
    );

    f.render_widget(
        Paragraph::new(header_text(format!(
            "{} — enter business details, blank fields count as 0",
            UiRoute::Predict.title()
        ))),
        chunks[0],
    );

    let rows: Vec<ListItem> = form
        .fields
        .iter()
        .zip(PREDICTION_FEATURES.iter())
        .enumerate()
        .map(|(i, ((_, text), (_, label)))| {
            let cursor = if i == form.selected { "_" } else { "" };
            let line: Line = vec![
                Span::from(format!("{:<24}", label)).bold(),
                Span::from(format!("{text}{cursor}")),
            ]
            .into();
            let item = ListItem::new(line);
            if i == form.selected {
                item.style(selection_style())
            } else {
                item
            }
        })
        .collect();
    f.render_widget(List::new(rows).block(panel("Features", true)), chunks[1]);

    let result = match form.result() {
        Some(FormResult::Predicted(value)) => Line::from(vec![
            "Predicted growth: ".into(),
            format!("{value:.2}%").bold().fg(ACCENT),
        ]),
        Some(FormResult::Failed(message)) => error_line(message.clone()),
        None => secondary_line("Press Enter to predict."),
    };
    f.render_widget(Paragraph::new(result).block(panel("Result", false)), chunks[2]);

    f.render_widget(
        Paragraph::new(secondary_line(
            "↑/↓ or Tab move • type digits • Backspace erase • Delete clear all • Enter predict • Esc back",
        )),
        chunks[3],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn typing_keeps_numeric_characters_only() {
        let mut form = PredictionForm::new();
        for ch in "4a0.5x".chars() {
            form.push_char(ch);
        }
        form.select_next();
        form.push_char('-');
        form.push_char('3');

        let input = form.to_input().expect("valid numbers");

        assert_eq!(input.values()[0], ("Employees".to_string(), 40.5));
        assert_eq!(input.values()[1], ("Years_in_Operation".to_string(), -3.0));
        assert_eq!(input.values().len(), PREDICTION_FEATURES.len());
    }

    #[test]
    fn malformed_number_is_shown_on_the_form() {
        let mut form = PredictionForm::new();
        form.push_char('1');
        form.push_char('.');
        form.push_char('.');

        assert!(form.to_input().is_none());
        match form.result() {
            Some(FormResult::Failed(text)) => assert!(text.contains("Employees")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn results_replace_each_other() {
        let mut form = PredictionForm::new();
        form.apply_result(Ok(Prediction { predicted_growth: 18.5 }));
        assert_eq!(form.result(), Some(&FormResult::Predicted(18.5)));

        form.apply_result(Err(AppError::Service("Model not trained".to_string())));
        assert_eq!(
            form.result(),
            Some(&FormResult::Failed("Model not trained".to_string()))
        );
    }

    #[test]
    fn selection_wraps() {
        let mut form = PredictionForm::new();
        form.select_prev();
        form.push_char('7');
        let input = form.to_input().expect("valid");
        let last = input.values().last().expect("fields");
        assert_eq!(last, &("District".to_string(), 7.0));
    }
}
