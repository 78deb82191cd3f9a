pub mod export;
pub mod features;
pub mod growth;
pub mod series;

pub use export::{csv_data_uri, export_csv, write_csv_file};
pub use features::{feature_shares, FeatureShare, PredictionInput, PREDICTION_FEATURES};
pub use growth::{filter_and_summarize, Dataset, FilteredView, GrowthRecord, Summary};
pub use series::{growth_histogram, metric_series, record_label, Bucket, Metric, SeriesPoint};
