use std::path::PathBuf;

use log::info;

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{Accuracy, FeatureImportance, ProcessedData};
use crate::records::{
    csv_data_uri, export_csv, feature_shares, write_csv_file, Dataset, FeatureShare, FilteredView, Summary,
};

/// Session-scoped data shared by the dashboard, threshold editor and menus.
///
/// The filtered view is never stored; it is derived from the dataset and
/// threshold each time it is asked for.
pub struct SessionState {
    config: Config,
    dataset: Dataset,
    accuracy: Option<Accuracy>,
    prediction_count: usize,
    features: Vec<FeatureShare>,
    threshold: f64,
    uploaded_file: Option<String>,
}

impl SessionState {
    pub fn new(config: Config) -> Self {
        let threshold = config.dashboard.default_threshold;
        Self {
            config,
            dataset: Dataset::default(),
            accuracy: None,
            prediction_count: 0,
            features: Vec::new(),
            threshold,
            uploaded_file: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Set the threshold, kept inside the configured slider range.
    pub fn set_threshold(&mut self, value: f64) {
        if value.is_finite() {
            self.threshold = self.config.dashboard.clamp_threshold(value);
        }
    }

    /// Move the threshold by `steps` slider increments.
    pub fn step_threshold(&mut self, steps: i32) {
        let step = self.config.dashboard.threshold_step;
        self.set_threshold(self.threshold + step * f64::from(steps));
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn has_data(&self) -> bool {
        !self.dataset.is_empty()
    }

    pub fn accuracy(&self) -> Option<Accuracy> {
        self.accuracy
    }

    pub fn prediction_count(&self) -> usize {
        self.prediction_count
    }

    pub fn features(&self) -> &[FeatureShare] {
        &self.features
    }

    pub fn uploaded_file(&self) -> Option<&str> {
        self.uploaded_file.as_deref()
    }

    pub fn set_uploaded_file(&mut self, name: Option<String>) {
        self.uploaded_file = name;
    }

    /// Replace the dataset and accuracy with a fresh service response.
    pub fn apply_processed_data(&mut self, data: ProcessedData) {
        self.dataset.replace(data.processed_data);
        self.accuracy = data.accuracy;
        self.prediction_count = data.growth_predictions.len();
    }

    pub fn apply_feature_importance(&mut self, importance: FeatureImportance) {
        self.features = feature_shares(&importance.feature_importance);
        info!("loaded importance for {} features", self.features.len());
    }

    pub fn filtered(&self) -> (FilteredView<'_>, Summary) {
        self.dataset.filter_and_summarize(self.threshold)
    }

    /// Write the current filtered rows to the configured export file.
    pub fn export_filtered(&self) -> Result<PathBuf> {
        let (view, _) = self.filtered();
        write_csv_file(&view, &self.config.export.target_path())
    }

    /// The current filtered rows as a `data:` link a browser can download.
    pub fn export_link(&self) -> Result<String> {
        let (view, _) = self.filtered();
        Ok(csv_data_uri(&export_csv(&view)?))
    }
}
