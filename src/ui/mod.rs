pub mod components;
pub mod flows;
pub mod navigation;
pub mod styles;

pub use components::TerminalGuard;
pub use flows::{
    run_dashboard, run_main_menu, run_prediction_form, run_threshold_editor, run_upload,
};
pub use navigation::{DashboardExit, MenuAction, UiRoute, UploadOutcome};
