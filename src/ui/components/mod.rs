pub mod chart;
pub mod loading;
pub mod terminal;
pub mod utils;

pub use loading::render_loading;
pub use terminal::TerminalGuard;
