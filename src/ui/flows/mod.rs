pub mod dashboard;
pub mod main_menu;
pub mod predict;
pub mod threshold;
pub mod upload;

pub use dashboard::run_dashboard;
pub use main_menu::run_main_menu;
pub use predict::run_prediction_form;
pub use threshold::run_threshold_editor;
pub use upload::run_upload;
