use crate::error::{AppError, Result};

use super::{ApiConfig, Config, DashboardConfig, ExportConfig};

/// Validate the merged configuration and surface every problem at once.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_api(&config.api, &mut issues);
    validate_dashboard(&config.dashboard, &mut issues);
    validate_export(&config.export, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "configuration invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_api(api: &ApiConfig, issues: &mut Vec<String>) {
    let url = api.base_url.trim();
    if url.is_empty() {
        issues.push("api.base_url must not be empty".to_string());
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        issues.push(format!(
            "api.base_url `{url}` must start with http:// or https://"
        ));
    }

    if api.timeout_secs == 0 {
        issues.push("api.timeout_secs must be greater than zero".to_string());
    }
}

fn validate_dashboard(dashboard: &DashboardConfig, issues: &mut Vec<String>) {
    let bounds = [
        ("default_threshold", dashboard.default_threshold),
        ("threshold_min", dashboard.threshold_min),
        ("threshold_max", dashboard.threshold_max),
        ("threshold_step", dashboard.threshold_step),
        ("histogram_bucket", dashboard.histogram_bucket),
    ];
    let mut finite = true;
    for (name, value) in bounds {
        if !value.is_finite() {
            issues.push(format!("dashboard.{name} must be a finite number"));
            finite = false;
        }
    }
    if !finite {
        return;
    }

    if dashboard.threshold_min > dashboard.threshold_max {
        issues.push(format!(
            "dashboard threshold range has lower bound {} greater than upper bound {}",
            dashboard.threshold_min, dashboard.threshold_max
        ));
    } else if dashboard.default_threshold < dashboard.threshold_min
        || dashboard.default_threshold > dashboard.threshold_max
    {
        issues.push(format!(
            "dashboard.default_threshold {} lies outside [{}, {}]",
            dashboard.default_threshold, dashboard.threshold_min, dashboard.threshold_max
        ));
    }

    if dashboard.threshold_step <= 0.0 {
        issues.push("dashboard.threshold_step must be positive".to_string());
    }
    if dashboard.histogram_bucket <= 0.0 {
        issues.push("dashboard.histogram_bucket must be positive".to_string());
    }
    if dashboard.max_bars == 0 {
        issues.push("dashboard.max_bars must be at least 1".to_string());
    }
}

fn validate_export(export: &ExportConfig, issues: &mut Vec<String>) {
    let name = export.file_name.trim();
    if name.is_empty() {
        issues.push("export.file_name must not be empty".to_string());
    } else if name.contains('/') || name.contains('\\') {
        issues.push(format!(
            "export.file_name `{name}` must be a bare file name; use export.directory for paths"
        ));
    }
}
