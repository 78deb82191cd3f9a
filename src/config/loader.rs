use std::{fs, path::Path};

use log::debug;
use serde::Deserialize;

use crate::error::{Context, Result};

use super::{validator, ApiConfig, Config, DashboardConfig, ExportConfig, UploadConfig};

/// Environment variable that overrides `api.base_url`.
pub const BASE_URL_ENV: &str = "MSME_API_BASE_URL";

/// Load `assets/config.json` under `root` on top of the built-in defaults.
///
/// A missing file is not an error; the defaults are used as-is. The
/// `MSME_API_BASE_URL` variable wins over both, and the merged result is
/// validated before it is returned.
pub fn load_config(root: &Path) -> Result<Config> {
    let path = root.join("assets").join("config.json");

    let raw = if path.exists() {
        let json = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config JSON at {}", path.display()))?;
        let raw: RawConfig = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse config JSON at {}", path.display()))?;
        debug!("loaded configuration from {}", path.display());
        raw
    } else {
        debug!("no config at {}, using built-in defaults", path.display());
        RawConfig::default()
    };

    let mut config = raw.into_config(Config::builtin());
    apply_env_overrides(&mut config, std::env::var(BASE_URL_ENV).ok());

    validator::validate_config(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, base_url: Option<String>) {
    if let Some(url) = base_url.map(|url| url.trim().to_string()) {
        if !url.is_empty() {
            config.api.base_url = url;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    api: RawApiConfig,
    #[serde(default)]
    dashboard: RawDashboardConfig,
    #[serde(default)]
    export: RawExportConfig,
    #[serde(default)]
    upload: RawUploadConfig,
}

impl RawConfig {
    fn into_config(self, defaults: Config) -> Config {
        Config {
            api: self.api.into_api(defaults.api),
            dashboard: self.dashboard.into_dashboard(defaults.dashboard),
            export: self.export.into_export(defaults.export),
            upload: self.upload.into_upload(defaults.upload),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawApiConfig {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl RawApiConfig {
    fn into_api(self, defaults: ApiConfig) -> ApiConfig {
        ApiConfig {
            base_url: self
                .base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawDashboardConfig {
    default_threshold: Option<f64>,
    threshold_min: Option<f64>,
    threshold_max: Option<f64>,
    threshold_step: Option<f64>,
    max_bars: Option<usize>,
    histogram_bucket: Option<f64>,
}

impl RawDashboardConfig {
    fn into_dashboard(self, defaults: DashboardConfig) -> DashboardConfig {
        DashboardConfig {
            default_threshold: self.default_threshold.unwrap_or(defaults.default_threshold),
            threshold_min: self.threshold_min.unwrap_or(defaults.threshold_min),
            threshold_max: self.threshold_max.unwrap_or(defaults.threshold_max),
            threshold_step: self.threshold_step.unwrap_or(defaults.threshold_step),
            max_bars: self.max_bars.unwrap_or(defaults.max_bars),
            histogram_bucket: self.histogram_bucket.unwrap_or(defaults.histogram_bucket),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawExportConfig {
    directory: Option<String>,
    file_name: Option<String>,
}

impl RawExportConfig {
    fn into_export(self, defaults: ExportConfig) -> ExportConfig {
        ExportConfig {
            directory: self
                .directory
                .map(Into::into)
                .unwrap_or(defaults.directory),
            file_name: self.file_name.unwrap_or(defaults.file_name),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawUploadConfig {
    directory: Option<String>,
}

impl RawUploadConfig {
    fn into_upload(self, defaults: UploadConfig) -> UploadConfig {
        UploadConfig {
            directory: self
                .directory
                .map(Into::into)
                .unwrap_or(defaults.directory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_shipped_config() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let config = load_config(root).expect("shipped config loads");
        assert_eq!(config.dashboard.default_threshold, 20.0);
        assert_eq!(config.dashboard.threshold_min, 5.0);
        assert_eq!(config.dashboard.threshold_max, 50.0);
        assert_eq!(config.export.file_name, "filtered_data.csv");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "api": { "base_url": "http://10.0.0.2:8000/" } }"#)
                .expect("partial config parses");
        let config = raw.into_config(Config::builtin());

        assert_eq!(config.api.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.dashboard.max_bars, 12);
        assert_eq!(config.upload.directory, Path::new("."));
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut config = Config::builtin();
        apply_env_overrides(&mut config, Some(" http://analytics.local:5000 ".to_string()));
        assert_eq!(config.api.base_url, "http://analytics.local:5000");

        apply_env_overrides(&mut config, Some("   ".to_string()));
        assert_eq!(config.api.base_url, "http://analytics.local:5000");
    }
}
