use std::borrow::Cow;

use ratatui::prelude::Stylize;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders};

/// Accent color used for prompts, highlights, and status badges.
pub const ACCENT: Color = Color::Indexed(208);
pub const POSITIVE: Color = Color::Green;
pub const NEGATIVE: Color = Color::Red;

pub fn header_text<'a>(text: impl Into<Cow<'a, str>>) -> Text<'a> {
    let owned = text.into().into_owned();
    Text::from(owned.bold().fg(ACCENT))
}

/// Dimmed line for hints and descriptions.
pub fn secondary_line<'a>(text: impl Into<Cow<'a, str>>) -> Line<'a> {
    let owned = text.into().into_owned();
    Line::from(owned.dim())
}

pub fn secondary_span<'a>(text: impl Into<Cow<'a, str>>) -> Span<'a> {
    let owned = text.into().into_owned();
    Span::from(owned).dim()
}

pub fn error_line<'a>(text: impl Into<Cow<'a, str>>) -> Line<'a> {
    let owned = text.into().into_owned();
    Line::from(owned.fg(NEGATIVE).bold())
}

pub fn success_line<'a>(text: impl Into<Cow<'a, str>>) -> Line<'a> {
    let owned = text.into().into_owned();
    Line::from(owned.fg(POSITIVE))
}

pub fn selection_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Bordered block with a title; `focused` blocks get the accent border.
pub fn panel<'a>(title: impl Into<Cow<'a, str>>, focused: bool) -> Block<'a> {
    let border = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::from(title.into().into_owned()).bold())
}

/// Bar color by sign: negative values use the warning color.
pub fn value_color(value: f64) -> Color {
    if value < 0.0 {
        NEGATIVE
    } else {
        ACCENT
    }
}
