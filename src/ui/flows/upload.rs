use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;
use ratatui::prelude::Stylize;
use ratatui::{prelude::*, widgets::*};

use crate::error::Result;
use crate::fetch::{validate_upload_path, ApiClient, FetchResult, ScopedTask, UploadReceipt};
use crate::ui::components::render_loading;
use crate::ui::components::utils::split_vertical;
use crate::ui::styles::{error_line, header_text, panel, secondary_line, selection_style};
use crate::ui::{TerminalGuard, UiRoute, UploadOutcome};
use crate::utils::{format_file_modified, list_csv_files, FileEntry};

const ACTION: &str = "Upload";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Browse,
    Typing,
}

/// Picker and typed-path state for the upload view.
pub struct UploadView {
    dir: PathBuf,
    files: Vec<FileEntry>,
    selected: usize,
    mode: InputMode,
    path_input: String,
    error: Option<String>,
}

impl UploadView {
    pub fn new(dir: &Path) -> Self {
        let files = list_csv_files(dir);
        let mode = if files.is_empty() {
            InputMode::Typing
        } else {
            InputMode::Browse
        };
        Self {
            dir: dir.to_path_buf(),
            files,
            selected: 0,
            mode,
            path_input: String::new(),
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_path_input(&mut self, text: &str) {
        self.mode = InputMode::Typing;
        self.path_input = text.to_string();
    }

    /// The file the next submit would send, if any.
    pub fn chosen_path(&self) -> Option<PathBuf> {
        match self.mode {
            InputMode::Browse => self.files.get(self.selected).map(|entry| entry.path.clone()),
            InputMode::Typing => {
                let typed = self.path_input.trim();
                (!typed.is_empty()).then(|| PathBuf::from(typed))
            }
        }
    }

    /// Check the chosen file before sending it. Problems stay on the view.
    pub fn prepare_submit(&mut self) -> Option<PathBuf> {
        let Some(path) = self.chosen_path() else {
            self.error = Some("Choose a CSV file first.".to_string());
            return None;
        };
        match validate_upload_path(&path) {
            Ok(()) => {
                self.error = None;
                Some(path)
            }
            Err(err) => {
                self.error = Some(err.user_message(ACTION));
                None
            }
        }
    }

    /// Fold an upload result into the view. `Some` means the view should close.
    pub fn apply_result(
        &mut self,
        path: &Path,
        result: FetchResult<UploadReceipt>,
    ) -> Option<UploadOutcome> {
        match result {
            Ok(receipt) => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let message = receipt
                    .message
                    .unwrap_or_else(|| "Upload complete.".to_string());
                info!("upload of {} accepted: {}", file_name, message);
                self.error = None;
                Some(UploadOutcome::Uploaded { file_name, message })
            }
            Err(err) => {
                self.error = Some(err.user_message(ACTION));
                None
            }
        }
    }

    fn rescan(&mut self) {
        self.files = list_csv_files(&self.dir);
        self.selected = self.selected.min(self.files.len().saturating_sub(1));
    }

    fn move_selection(&mut self, forward: bool) {
        let len = self.files.len();
        if len == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            InputMode::Browse => InputMode::Typing,
            InputMode::Typing if !self.files.is_empty() => InputMode::Browse,
            InputMode::Typing => InputMode::Typing,
        };
    }
}

enum KeyResult {
    Stay,
    Submit,
    Leave,
}

pub async fn run_upload(client: &ApiClient, dir: &Path) -> Result<UploadOutcome> {
    let mut guard = TerminalGuard::new()?;
    let mut view = UploadView::new(dir);
    let mut task: ScopedTask<UploadReceipt> = ScopedTask::idle();
    let mut in_flight: Option<PathBuf> = None;
    let mut tick = 0usize;

    loop {
        if let Some(result) = task.try_take() {
            if let Some(path) = in_flight.take() {
                if let Some(outcome) = view.apply_result(&path, result) {
                    guard.restore()?;
                    return Ok(outcome);
                }
            }
        }

        tick = tick.wrapping_add(1);
        let uploading = in_flight.as_deref().map(|path| path.display().to_string());
        guard.draw(|f| {
            draw_upload(f, &view);
            if let Some(name) = &uploading {
                render_loading(f, "Uploading", &format!("Sending {name}"), tick);
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

        if task.is_pending() {
            if is_cancel(&k) {
                task.cancel();
                in_flight = None;
                view.error = Some(format!("{ACTION} cancelled."));
            }
            continue;
        }

        match handle_key(&mut view, k) {
            KeyResult::Stay => {}
            KeyResult::Leave => {
                guard.restore()?;
                return Ok(UploadOutcome::Back);
            }
            KeyResult::Submit => {
                if let Some(path) = view.prepare_submit() {
                    let client = client.clone();
                    let target = path.clone();
                    task = ScopedTask::spawn(async move { client.upload_file(&target).await });
                    in_flight = Some(path);
                }
            }
        }
    }
}

fn is_cancel(k: &KeyEvent) -> bool {
    k.code == KeyCode::Esc
        || (k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL))
}

fn handle_key(view: &mut UploadView, k: KeyEvent) -> KeyResult {
    if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyResult::Leave;
    }
    match (view.mode, k.code) {
        (_, KeyCode::Enter) => KeyResult::Submit,
        (_, KeyCode::Tab) => {
            view.toggle_mode();
            KeyResult::Stay
        }
        (InputMode::Browse, KeyCode::Esc) => KeyResult::Leave,
        (InputMode::Browse, KeyCode::Up | KeyCode::Char('k')) => {
            view.move_selection(false);
            KeyResult::Stay
        }
        (InputMode::Browse, KeyCode::Down | KeyCode::Char('j')) => {
            view.move_selection(true);
            KeyResult::Stay
        }
        (InputMode::Browse, KeyCode::Char('r')) => {
            view.rescan();
            KeyResult::Stay
        }
        (InputMode::Typing, KeyCode::Esc) => {
            if view.files.is_empty() {
                KeyResult::Leave
            } else {
                view.mode = InputMode::Browse;
                KeyResult::Stay
            }
        }
        (InputMode::Typing, KeyCode::Backspace) => {
            view.path_input.pop();
            KeyResult::Stay
        }
        (InputMode::Typing, KeyCode::Char(ch)) => {
            view.path_input.push(ch);
            KeyResult::Stay
        }
        _ => KeyResult::Stay,
    }
}

fn draw_upload(f: &mut Frame<'_>, view: &UploadView) {
    let chunks = split_vertical(
        f.size(),
        &[
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ],
    );

    f.render_widget(
        Paragraph::new(header_text(format!(
            "{} — choose a .csv file from {}",
            UiRoute::Upload.title(),
            view.dir.display()
        ))),
        chunks[0],
    );

    let browsing = view.mode == InputMode::Browse;
    if view.files.is_empty() {
        f.render_widget(
            Paragraph::new(secondary_line("No CSV files here. Press Tab and type a path instead."))
                .block(panel("Files", browsing)),
            chunks[1],
        );
    } else {
        let items: Vec<ListItem> = view
            .files
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let text = format!(
                    "{}  —  {}  —  {:.1} KB",
                    entry.name,
                    format_file_modified(entry.modified),
                    entry.size_kb()
                );
                let item = ListItem::new(Line::from(text));
                if browsing && i == view.selected {
                    item.style(selection_style())
                } else {
                    item
                }
            })
            .collect();
        f.render_widget(List::new(items).block(panel("Files", browsing)), chunks[1]);
    }

    let cursor = if browsing { "" } else { "_" };
    f.render_widget(
        Paragraph::new(format!("{}{}", view.path_input, cursor)).block(panel("Path", !browsing)),
        chunks[2],
    );

    let status = match view.error() {
        Some(message) => error_line(message.to_string()),
        None => Line::from("Only .csv files are accepted.".dim()),
    };
    f.render_widget(Paragraph::new(status), chunks[3]);

    let help = if browsing {
        "↑/↓ or j/k move • Enter upload • Tab type a path • r rescan • Esc back"
    } else {
        "Type a path • Enter upload • Tab file list • Esc back"
    };
    f.render_widget(Paragraph::new(secondary_line(help)), chunks[4]);
}
