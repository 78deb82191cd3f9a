use ratatui::{prelude::*, widgets::*};

use super::utils::{centered_rect, spinner_frame, split_vertical};

/// Modal overlay shown while a request is outstanding.
pub fn render_loading(f: &mut Frame<'_>, title: &str, message: &str, tick: usize) {
    let area = centered_rect(60, 25, f.size());
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = split_vertical(
        inner,
        &[
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ],
    );
    f.render_widget(
        Paragraph::new(format!("{} {}", spinner_frame(tick), message)).alignment(Alignment::Center),
        rows[0],
    );
    f.render_widget(
        Paragraph::new("Please wait").alignment(Alignment::Center),
        rows[1],
    );
    f.render_widget(
        Paragraph::new("Esc to cancel")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        rows[2],
    );
}
