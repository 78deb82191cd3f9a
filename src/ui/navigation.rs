/// Views the controller can route between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiRoute {
    MainMenu,
    Upload,
    Dashboard,
    Threshold,
    Predict,
    Exit,
}

impl UiRoute {
    /// Human readable label used by headers and logs.
    pub fn title(self) -> &'static str {
        match self {
            UiRoute::MainMenu => "Home",
            UiRoute::Upload => "Upload CSV",
            UiRoute::Dashboard => "Dashboard",
            UiRoute::Threshold => "Growth Threshold",
            UiRoute::Predict => "Predict Growth",
            UiRoute::Exit => "Exit",
        }
    }
}

/// Choices offered by the navigation bar on the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Upload,
    Dashboard,
    Threshold,
    Predict,
    Exit,
}

impl MenuAction {
    pub fn route(self) -> UiRoute {
        match self {
            MenuAction::Upload => UiRoute::Upload,
            MenuAction::Dashboard => UiRoute::Dashboard,
            MenuAction::Threshold => UiRoute::Threshold,
            MenuAction::Predict => UiRoute::Predict,
            MenuAction::Exit => UiRoute::Exit,
        }
    }
}

/// How the upload view was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The service accepted the file; carries the file name and its reply.
    Uploaded { file_name: String, message: String },
    Back,
}

/// Follow-up requested when the dashboard closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardExit {
    Back,
    Predict,
    Upload,
}
