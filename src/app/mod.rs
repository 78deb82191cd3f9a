pub mod bootstrap;
pub mod controller;
pub mod state;

pub use bootstrap::run;
pub use controller::{route_after_dashboard, route_after_upload, AppController};
pub use state::SessionState;
