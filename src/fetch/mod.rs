use crate::error::Result;

pub mod client;
pub mod decode;
pub mod task;

pub use client::{validate_upload_path, ApiClient, Endpoint};
pub use decode::{Accuracy, FeatureImportance, Prediction, ProcessedData, UploadReceipt};
pub use task::ScopedTask;

pub type FetchResult<T> = Result<T>;
