use log::{debug, info};

use crate::app::state::SessionState;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::ApiClient;
use crate::ui::{
    run_dashboard, run_main_menu, run_prediction_form, run_threshold_editor, run_upload,
    DashboardExit, UiRoute, UploadOutcome,
};

/// Owns the session and the HTTP client, and routes between views.
pub struct AppController {
    client: ApiClient,
    session: SessionState,
}

/// An accepted upload opens the dashboard; backing out returns home.
pub fn route_after_upload(outcome: &UploadOutcome) -> UiRoute {
    match outcome {
        UploadOutcome::Uploaded { .. } => UiRoute::Dashboard,
        UploadOutcome::Back => UiRoute::MainMenu,
    }
}

pub fn route_after_dashboard(exit: DashboardExit) -> UiRoute {
    match exit {
        DashboardExit::Back => UiRoute::MainMenu,
        DashboardExit::Predict => UiRoute::Predict,
        DashboardExit::Upload => UiRoute::Upload,
    }
}

impl AppController {
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(&config.api)?;
        Ok(Self {
            client,
            session: SessionState::new(config),
        })
    }

    pub async fn run(mut self) -> Result<()> {
        let mut route = UiRoute::MainMenu;
        let mut welcome: Option<String> = None;

        loop {
            debug!("entering {}", route.title());
            route = match route {
                UiRoute::MainMenu => run_main_menu(&self.session)?.route(),
                UiRoute::Upload => {
                    let dir = self.session.config().upload.directory.clone();
                    let outcome = run_upload(&self.client, &dir).await?;
                    if let UploadOutcome::Uploaded { file_name, message } = &outcome {
                        self.session.set_uploaded_file(Some(file_name.clone()));
                        welcome = Some(message.clone());
                    }
                    route_after_upload(&outcome)
                }
                UiRoute::Dashboard => {
                    let exit = run_dashboard(&mut self.session, &self.client, welcome.take()).await?;
                    route_after_dashboard(exit)
                }
                UiRoute::Threshold => {
                    run_threshold_editor(&mut self.session)?;
                    UiRoute::MainMenu
                }
                UiRoute::Predict => {
                    run_prediction_form(&self.client).await?;
                    UiRoute::MainMenu
                }
                UiRoute::Exit => {
                    info!("exiting");
                    return Ok(());
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::fetch::UploadReceipt;
    use crate::ui::flows::upload::UploadView;
    use std::path::Path;

    #[test]
    fn rejected_upload_stays_on_upload_view() {
        let dir = std::env::temp_dir().join(format!("msme-route-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create dir");
        let mut view = UploadView::new(&dir);

        let outcome = view.apply_result(
            Path::new("data.csv"),
            Err(AppError::Service("bad file".to_string())),
        );

        assert!(outcome.is_none());
        assert_eq!(view.error(), Some("bad file"));

        let outcome = view
            .apply_result(Path::new("data.csv"), Ok(UploadReceipt::default()))
            .expect("accepted upload closes the view");
        assert_eq!(route_after_upload(&outcome), UiRoute::Dashboard);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn backing_out_of_upload_returns_home() {
        assert_eq!(route_after_upload(&UploadOutcome::Back), UiRoute::MainMenu);
    }

    #[test]
    fn dashboard_exits_map_to_routes() {
        assert_eq!(route_after_dashboard(DashboardExit::Back), UiRoute::MainMenu);
        assert_eq!(route_after_dashboard(DashboardExit::Predict), UiRoute::Predict);
        assert_eq!(route_after_dashboard(DashboardExit::Upload), UiRoute::Upload);
    }

    #[test]
    fn controller_builds_from_builtin_config() {
        assert!(AppController::new(Config::builtin()).is_ok());
    }
}
