use std::io::Stdout;

use crossterm::{execute, terminal, ExecutableCommand};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use crate::error::Result;

type Backend = CrosstermBackend<Stdout>;

/// Keeps raw mode and the alternate screen scoped to one view.
pub struct TerminalGuard {
    terminal: Terminal<Backend>,
    restored: bool,
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Render one frame.
    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Frame<'_>),
    {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Leave raw/alternate mode. Safe to call more than once.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.terminal.show_cursor()?;
        self.terminal
            .backend_mut()
            .execute(terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        self.restored = true;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
