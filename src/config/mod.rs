use std::path::PathBuf;

pub mod loader;
pub mod validator;

pub use loader::{load_config, BASE_URL_ENV};

/// Where the analytics service lives and how long a single call may take.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Threshold slider bounds and chart sizing for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub default_threshold: f64,
    pub threshold_min: f64,
    pub threshold_max: f64,
    pub threshold_step: f64,
    pub max_bars: usize,
    pub histogram_bucket: f64,
}

impl DashboardConfig {
    /// Keep a user-adjusted threshold inside the slider range.
    pub fn clamp_threshold(&self, value: f64) -> f64 {
        value.clamp(self.threshold_min, self.threshold_max)
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub file_name: String,
}

impl ExportConfig {
    pub fn target_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub export: ExportConfig,
    pub upload: UploadConfig,
}

impl Config {
    pub fn builtin() -> Self {
        Config {
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
                timeout_secs: 30,
            },
            dashboard: DashboardConfig {
                default_threshold: 20.0,
                threshold_min: 5.0,
                threshold_max: 50.0,
                threshold_step: 1.0,
                max_bars: 12,
                histogram_bucket: 10.0,
            },
            export: ExportConfig {
                directory: PathBuf::from("."),
                file_name: "filtered_data.csv".to_string(),
            },
            upload: UploadConfig {
                directory: PathBuf::from("."),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}
