use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::{ApiError, ApiErrorKind, ConvertOutput, ConvertRequest, FilePart, JsonSource, Mode};

/// The one message every transport failure is normalized to.
pub const CONNECTION_ERROR_MESSAGE: &str = "Error connecting to the server";

const EXCEL_TO_JSON_DEFAULT: &str = "Error converting Excel to JSON";
const JSON_TO_EXCEL_DEFAULT: &str = "Error converting JSON to Excel";
const GENERATE_SCHEMA_DEFAULT: &str = "Error generating schema";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Seam between the engine runtime and the conversion backend, so tests can
/// drive the runtime without a network.
#[async_trait::async_trait]
pub trait ConvertBackend: Send + Sync {
    async fn convert(
        &self,
        request: &ConvertRequest,
        mode: Mode,
    ) -> Result<ConvertOutput, ApiError>;
}

/// HTTP facade over the conversion backend. Each call is exactly one round
/// trip; there are no retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(ApiErrorKind::ConnectionFailed, err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn convert_to_json(
        &self,
        file: &FilePart,
        enhance: bool,
    ) -> Result<Value, ApiError> {
        let mut url = format!("{}/excel-to-json", self.base_url);
        if enhance {
            url.push_str("?useAI=true");
        }
        let form = Form::new().part("file", file_part(file));
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|_| connection_failed())?;
        if !response.status().is_success() {
            return Err(rejected(response, EXCEL_TO_JSON_DEFAULT).await);
        }
        response
            .json::<Value>()
            .await
            .map_err(|_| connection_failed())
    }

    /// Text payloads are parsed and posted as a JSON body to the `raw`
    /// endpoint; file payloads go up as multipart with a `useAI` field.
    pub async fn convert_to_spreadsheet(
        &self,
        source: &JsonSource,
        enhance: bool,
    ) -> Result<Bytes, ApiError> {
        let response = match source {
            JsonSource::Text(text) => {
                let payload: Value = serde_json::from_str(text).map_err(|err| {
                    ApiError::new(
                        ApiErrorKind::RequestRejected,
                        format!("JSON to Excel failed: {err}"),
                    )
                })?;
                let url = format!("{}/json-to-excel/raw?useAI={}", self.base_url, enhance);
                self.client.post(&url).json(&payload).send().await
            }
            JsonSource::File(file) => {
                let form = Form::new()
                    .part("file", file_part(file))
                    .text("useAI", if enhance { "true" } else { "false" });
                let url = format!("{}/json-to-excel", self.base_url);
                self.client.post(&url).multipart(form).send().await
            }
        }
        .map_err(|_| connection_failed())?;

        if !response.status().is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = extract_error_message(&body, JSON_TO_EXCEL_DEFAULT);
            return Err(ApiError::new(
                ApiErrorKind::RequestRejected,
                format!("JSON to Excel failed: {message}"),
            ));
        }
        response.bytes().await.map_err(|_| connection_failed())
    }

    pub async fn generate_schema(&self, file: &FilePart) -> Result<Value, ApiError> {
        let url = format!("{}/generate-schema", self.base_url);
        let form = Form::new().part("file", file_part(file));
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|_| connection_failed())?;
        if !response.status().is_success() {
            return Err(rejected(response, GENERATE_SCHEMA_DEFAULT).await);
        }
        response
            .json::<Value>()
            .await
            .map_err(|_| connection_failed())
    }
}

#[async_trait::async_trait]
impl ConvertBackend for ApiClient {
    async fn convert(
        &self,
        request: &ConvertRequest,
        mode: Mode,
    ) -> Result<ConvertOutput, ApiError> {
        let enhance = mode == Mode::Enhanced;
        match request {
            ConvertRequest::SpreadsheetToJson { file } => self
                .convert_to_json(file, enhance)
                .await
                .map(ConvertOutput::Json),
            ConvertRequest::JsonToSpreadsheet { source } => self
                .convert_to_spreadsheet(source, enhance)
                .await
                .map(ConvertOutput::Binary),
            ConvertRequest::GenerateSchema { file } => {
                self.generate_schema(file).await.map(ConvertOutput::Json)
            }
        }
    }
}

fn file_part(file: &FilePart) -> Part {
    let part = Part::bytes(file.bytes.to_vec()).file_name(file.name.clone());
    match &file.media_type {
        Some(media_type) => part
            .mime_str(media_type)
            .unwrap_or_else(|_| Part::bytes(file.bytes.to_vec()).file_name(file.name.clone())),
        None => part,
    }
}

fn connection_failed() -> ApiError {
    ApiError::new(ApiErrorKind::ConnectionFailed, CONNECTION_ERROR_MESSAGE)
}

async fn rejected(response: reqwest::Response, default: &str) -> ApiError {
    let body = response.bytes().await.unwrap_or_default();
    ApiError::new(
        ApiErrorKind::RequestRejected,
        extract_error_message(&body, default),
    )
}

/// Layered error-body decode: bytes -> UTF-8 text -> structured `message`
/// field -> raw text -> per-operation default. The spreadsheet endpoint
/// answers binary on success, but its error bodies are still text or JSON.
fn extract_error_message(body: &[u8], default: &str) -> String {
    let text = match std::str::from_utf8(body) {
        Ok(text) => text.trim(),
        Err(_) => return default.to_string(),
    };
    if text.is_empty() {
        return default.to_string();
    }
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    text.to_string()
}
