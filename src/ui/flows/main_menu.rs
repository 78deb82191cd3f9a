use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::prelude::Stylize;
use ratatui::{prelude::*, widgets::*};

use crate::app::SessionState;
use crate::error::Result;
use crate::ui::components::utils::split_vertical;
use crate::ui::styles::{header_text, panel, secondary_line, secondary_span, selection_style};
use crate::ui::{MenuAction, TerminalGuard, UiRoute};

const HERO_TITLE: &str = "Scale Up - MSME Growth Predictor";
const HERO_LINES: [&str; 3] = [
    "Unlock business trends with AI-powered predictions.",
    "Upload registration data to see which businesses are growing fastest,",
    "what drives that growth, and how a new business is likely to fare.",
];

const ITEMS: [(MenuAction, &str); 5] = [
    (MenuAction::Upload, "Send a CSV dataset to the analytics service"),
    (MenuAction::Dashboard, "Charts for businesses above the growth threshold"),
    (MenuAction::Threshold, "Change the minimum growth rate shown"),
    (MenuAction::Predict, "Estimate growth for a single business"),
    (MenuAction::Exit, "Leave the console"),
];

/// Landing view: navigation bar, hero text and session status.
pub fn run_main_menu(session: &SessionState) -> Result<MenuAction> {
    let mut guard = TerminalGuard::new()?;
    let mut selected = if session.has_data() { 1 } else { 0 };

    loop {
        guard.draw(|f| draw_menu(f, session, selected))?;

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
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                selected = (selected + ITEMS.len() - 1) % ITEMS.len();
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                selected = (selected + 1) % ITEMS.len();
            }
            KeyCode::Char('u') => return leave(&mut guard, MenuAction::Upload),
            KeyCode::Char('d') => return leave(&mut guard, MenuAction::Dashboard),
            KeyCode::Char('p') => return leave(&mut guard, MenuAction::Predict),
            KeyCode::Enter => return leave(&mut guard, ITEMS[selected].0),
            KeyCode::Esc | KeyCode::Char('q') => return leave(&mut guard, MenuAction::Exit),
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                return leave(&mut guard, MenuAction::Exit)
            }
            _ => {}
        }
    }
}

fn leave(guard: &mut TerminalGuard, action: MenuAction) -> Result<MenuAction> {
    guard.restore()?;
    Ok(action)
}

fn draw_menu(f: &mut Frame<'_>, session: &SessionState, selected: usize) {
    let chunks = split_vertical(
        f.size(),
        &[
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(5),
            Constraint::Length(1),
        ],
    );

    let titles: Vec<Line> = ITEMS
        .iter()
        .map(|(action, _)| Line::from(action.route().title()))
        .collect();
    let nav = Tabs::new(titles)
        .select(selected)
        .highlight_style(selection_style())
        .divider(" | ")
        .block(Block::default().borders(Borders::ALL).title(UiRoute::MainMenu.title()));
    f.render_widget(nav, chunks[0]);

    let mut hero = header_text(HERO_TITLE);
    hero.lines.push(Line::default());
    hero.lines.extend(HERO_LINES.iter().map(|line| Line::from((*line).italic())));
    f.render_widget(
        Paragraph::new(hero)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[1],
    );

    let items: Vec<ListItem> = ITEMS
        .iter()
        .enumerate()
        .map(|(i, (action, description))| {
            let line: Line = vec![
                Span::from(format!("{:<18}", action.route().title())).bold(),
                "  ".into(),
                secondary_span(*description),
            ]
            .into();
            let item = ListItem::new(line);
            if i == selected {
                item.style(selection_style())
            } else {
                item
            }
        })
        .collect();
    let body = split_vertical(chunks[2], &[Constraint::Min(3), Constraint::Length(5)]);
    f.render_widget(List::new(items).block(panel("Navigate", true)), body[0]);

    let status = vec![
        secondary_line(format!("Service: {}", session.config().api.base_url)),
        secondary_line(match session.uploaded_file() {
            Some(name) => format!("Uploaded file: {name}"),
            None => "Uploaded file: none".to_string(),
        }),
        secondary_line(format!(
            "Records loaded: {} | Growth threshold: {:.0}%",
            session.dataset().len(),
            session.threshold()
        )),
    ];
    f.render_widget(Paragraph::new(status).block(panel("Session", false)), body[1]);

    f.render_widget(
        Paragraph::new(secondary_line(
            "←/→ or h/l navigate • Enter select • u upload • d dashboard • p predict • Esc exit",
        )),
        chunks[3],
    );
}
