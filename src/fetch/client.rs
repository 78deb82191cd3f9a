use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::{AppError, Context};
use crate::records::PredictionInput;

use super::decode::{
    decode_response, FeatureImportance, Prediction, ProcessedData, UploadReceipt,
};
use super::FetchResult;

/// Routes exposed by the analytics service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endpoint {
    Upload,
    ProcessedData,
    FeatureImportance,
    Predict,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Upload => "/upload",
            Endpoint::ProcessedData => "/get-processed-data",
            Endpoint::FeatureImportance => "/get-feature-importance",
            Endpoint::Predict => "/predict",
        }
    }
}

/// Thin wrapper over `reqwest::Client` bound to the service base URL.
///
/// Every call is a single attempt; failures are returned to the caller as-is.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to construct HTTP client")?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Send a CSV file as the multipart field `file`.
    pub async fn upload_file(&self, path: &Path) -> FetchResult<UploadReceipt> {
        validate_upload_path(path)?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.csv")
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        info!("uploading {} ({} bytes)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(Endpoint::Upload))
            .multipart(form)
            .send()
            .await?;
        read_json(Endpoint::Upload, response).await
    }

    pub async fn get_processed_data(&self) -> FetchResult<ProcessedData> {
        let response = self
            .client
            .get(self.url(Endpoint::ProcessedData))
            .send()
            .await?;
        let data: ProcessedData = read_json(Endpoint::ProcessedData, response).await?;
        debug!("received {} processed records", data.processed_data.len());
        Ok(data)
    }

    pub async fn get_feature_importance(&self) -> FetchResult<FeatureImportance> {
        let response = self
            .client
            .get(self.url(Endpoint::FeatureImportance))
            .send()
            .await?;
        read_json(Endpoint::FeatureImportance, response).await
    }

    pub async fn predict_growth(&self, input: &PredictionInput) -> FetchResult<Prediction> {
        let response = self
            .client
            .post(self.url(Endpoint::Predict))
            .json(&input.to_json())
            .send()
            .await?;
        read_json(Endpoint::Predict, response).await
    }
}

/// Client-side check mirroring the upload control's `.csv` filter.
pub fn validate_upload_path(path: &Path) -> FetchResult<()> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return Err(AppError::validation(format!(
            "{} is not a CSV file. Please choose a .csv file.",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(AppError::validation(format!(
            "{} does not exist.",
            path.display()
        )));
    }
    Ok(())
}

async fn read_json<T: DeserializeOwned>(endpoint: Endpoint, response: Response) -> FetchResult<T> {
    let status = response.status();
    let body = response.text().await?;
    let decoded = decode_response(status, &body);
    if let Err(err) = &decoded {
        debug!("{} failed ({}): {}", endpoint.path(), status, err);
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, answer with `status` and `body`, and hand back
    /// the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (ApiClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub address");

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write");
            let _ = socket.shutdown().await;
            request
        });

        (client_for(&format!("http://{addr}")), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.expect("read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok());
            match length {
                Some(length) if buf.len() >= end + 4 + length => break,
                Some(_) => continue,
                None if head.contains("transfer-encoding: chunked") => {
                    if buf.ends_with(b"0\r\n\r\n") {
                        break;
                    }
                }
                None => break,
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn client_for(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .expect("client builds")
    }

    fn temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).expect("write temp csv");
        path
    }

    #[test]
    fn builds_endpoint_urls() {
        let client = client_for("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.url(Endpoint::ProcessedData),
            "http://localhost:5000/get-processed-data"
        );
        assert_eq!(client.url(Endpoint::Upload), "http://localhost:5000/upload");
    }

    #[tokio::test]
    async fn upload_error_field_is_a_service_error() {
        let (client, server) = serve_once("400 BAD REQUEST", r#"{"error":"bad file"}"#).await;
        let path = temp_csv("bad.csv", "a,b\n1,2\n");

        let err = client.upload_file(&path).await.expect_err("upload must fail");
        let request = server.await.expect("stub finished");

        assert!(matches!(err, AppError::Service(ref msg) if msg == "bad file"));
        assert!(request.starts_with("POST /upload "), "unexpected: {request}");
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("Content-Type: text/csv") || request.contains("content-type: text/csv"));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn upload_success_returns_receipt() {
        let (client, server) =
            serve_once("200 OK", r#"{"message":"Data processed successfully!"}"#).await;
        let path = temp_csv("good.csv", "Business_Name,Employees\nAcme,4\n");

        let receipt = client.upload_file(&path).await.expect("upload succeeds");
        let request = server.await.expect("stub finished");

        assert_eq!(receipt.message.as_deref(), Some("Data processed successfully!"));
        assert!(request.contains("Acme,4"));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn non_csv_upload_is_rejected_before_sending() {
        let client = client_for("http://127.0.0.1:9");
        let path = temp_csv("notes.txt", "hello");

        let err = client.upload_file(&path).await.expect_err("must be rejected");

        assert!(matches!(err, AppError::Validation(_)));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn fetches_processed_data() {
        let (client, server) = serve_once(
            "200 OK",
            r#"{"processed_data":[{"Business_Name":"X","Growth_Rate (%)":25},{"Business_Name":"Y","Growth_Rate (%)":15}],"accuracy":{"RMSE":2.5,"R2":0.9}}"#,
        )
        .await;

        let data = client.get_processed_data().await.expect("fetch succeeds");
        let request = server.await.expect("stub finished");

        assert!(request.starts_with("GET /get-processed-data "));
        assert_eq!(data.processed_data.len(), 2);
        assert_eq!(data.processed_data[0].growth_rate(), Some(25.0));
        assert_eq!(data.accuracy.map(|a| a.r2), Some(0.9));
    }

    #[tokio::test]
    async fn fetches_feature_importance() {
        let (client, _server) = serve_once(
            "200 OK",
            r#"{"feature_importance":{"Credit_Score":0.4,"Employees":0.6}}"#,
        )
        .await;

        let importance = client.get_feature_importance().await.expect("fetch succeeds");

        let expected = HashMap::from([
            ("Credit_Score".to_string(), 0.4),
            ("Employees".to_string(), 0.6),
        ]);
        assert_eq!(importance.feature_importance, expected);
    }

    #[tokio::test]
    async fn predict_posts_named_features() {
        let (client, server) = serve_once("200 OK", r#"{"predicted_growth":23.75}"#).await;
        let input = PredictionInput::from_form(&[
            ("Employees".to_string(), "40".to_string()),
            ("Credit_Score".to_string(), "700".to_string()),
        ])
        .expect("valid input");

        let prediction = client.predict_growth(&input).await.expect("predict succeeds");
        let request = server.await.expect("stub finished");

        assert!((prediction.predicted_growth - 23.75).abs() < 1e-9);
        assert!(request.starts_with("POST /predict "));
        assert!(request.contains(r#"{"Employees":40.0,"Credit_Score":700.0}"#));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("address");
        drop(listener);

        let err = client_for(&format!("http://{addr}"))
            .get_processed_data()
            .await
            .expect_err("nothing is listening");

        assert!(matches!(err, AppError::Reqwest(_)));
        assert_eq!(
            err.user_message("Loading data"),
            "Loading data failed. Please try again."
        );
    }
}
