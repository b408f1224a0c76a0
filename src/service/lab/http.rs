//! HTTP implementation of the Lab Reader API client.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::multipart;
use tracing::{info, instrument, warn};

use crate::base::{
    config::Config,
    texts,
    types::{Language, Res, TaskKind},
};

use super::{GenericLabClient, LabClient, LabError};

// Extra methods on `LabClient` applied by the http implementation.

impl LabClient {
    /// Creates an HTTP client against the configured Lab Reader API.
    pub fn http(config: &Config) -> Res<Self> {
        let client = HttpLabClient::new(&config.lab_api_url, Duration::from_secs(config.lab_request_timeout_secs))?;
        Ok(Self::new(Arc::new(client)))
    }
}

// Specific implementations.

/// HTTP Lab Reader API client implementation.
#[derive(Clone)]
struct HttpLabClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLabClient {
    /// Create a new HTTP client with the given base URL and per-request timeout.
    #[instrument(name = "HttpLabClient::new", skip_all)]
    fn new(base_url: &str, timeout: Duration) -> Res<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send one multipart upload attempt.
    async fn post_document(&self, task: TaskKind, language: Language, file_name: &str, bytes: &[u8]) -> Result<reqwest::Response, reqwest::Error> {
        let part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        self.client
            .post(format!("{}{}", self.base_url, task.endpoint()))
            .query(&[("language", language.as_str())])
            .multipart(form)
            .send()
            .await
    }
}

#[async_trait]
impl GenericLabClient for HttpLabClient {
    #[instrument(name = "HttpLabClient::read_document", skip(self, bytes))]
    async fn read_document(&self, task: TaskKind, language: Language, file_name: &str, bytes: Vec<u8>) -> Result<String, LabError> {
        const MAX_RETRIES: u32 = 3;
        const RETRY_DELAY_MS: u64 = 250;

        let mut retries = 0;

        // Transport failures and timeouts are retried with backoff; an HTTP
        // response, success or not, ends the loop.
        let response = loop {
            match self.post_document(task, language, file_name, &bytes).await {
                Ok(response) => {
                    if retries > 0 {
                        info!("Lab API call succeeded after {} attempts", retries + 1);
                    }
                    break response;
                }
                Err(err) => {
                    if retries >= MAX_RETRIES {
                        return Err(LabError::Transport(err));
                    }
                    retries += 1;
                    warn!("Lab API call failed, retrying {retries}/{MAX_RETRIES}: {err}");

                    let delay = Duration::from_millis(RETRY_DELAY_MS * 2_u64.pow(retries - 1));
                    tokio::time::sleep(delay).await;
                }
            }
        };

        let status = response.status();

        if status.is_success() {
            let body: serde_json::Value = response.json().await?;

            let analysis = body
                .get("analysis")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
                .unwrap_or_else(|| texts::NO_ANALYSIS.to_string());

            Ok(analysis)
        } else {
            // FastAPI error bodies carry `detail`, which may be a plain string
            // or structured validation output.
            let detail = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("detail").cloned())
                .map(|detail| match detail {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "Unknown error".to_string());

            Err(LabError::Api { status: status.as_u16(), detail })
        }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> HttpLabClient {
        HttpLabClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn read_analysis_hits_the_analysis_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/lab/read-analysis").query_param("language", "English");
            then.status(200).json_body(json!({"analysis": "Everything looks normal."}));
        });

        let client = client_for(&server);
        let result = client
            .read_document(TaskKind::Analysis, Language::English, "report.pdf", b"fake pdf".to_vec())
            .await
            .unwrap();

        assert_eq!(result, "Everything looks normal.");
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn read_medication_hits_the_medication_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/lab/read-medication").query_param("language", "French");
            then.status(200).json_body(json!({"analysis": "Prenez un comprimé par jour."}));
        });

        let client = client_for(&server);
        let result = client
            .read_document(TaskKind::Medication, Language::French, "photo_1.jpg", b"fake jpg".to_vec())
            .await
            .unwrap();

        assert_eq!(result, "Prenez un comprimé par jour.");
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn missing_analysis_field_yields_placeholder() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lab/read-analysis");
            then.status(200).json_body(json!({"something_else": true}));
        });

        let client = client_for(&server);
        let result = client
            .read_document(TaskKind::Analysis, Language::English, "report.pdf", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(result, texts::NO_ANALYSIS);
    }

    #[tokio::test]
    async fn api_rejection_surfaces_detail_without_retrying() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/lab/read-analysis");
            then.status(422).json_body(json!({"detail": "Unsupported file type"}));
        });

        let client = client_for(&server);
        let err = client
            .read_document(TaskKind::Analysis, Language::Spanish, "notes.txt", vec![0])
            .await
            .unwrap_err();

        match err {
            LabError::Api { status, detail } => {
                assert_eq!(status, 422);
                assert_eq!(detail, "Unsupported file type");
            }
            other => panic!("expected Api error, got {other:?}"),
        }

        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn structured_detail_is_stringified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lab/read-medication");
            then.status(422).json_body(json!({"detail": [{"loc": ["file"], "msg": "field required"}]}));
        });

        let client = client_for(&server);
        let err = client
            .read_document(TaskKind::Medication, Language::English, "x.pdf", vec![0])
            .await
            .unwrap_err();

        match err {
            LabError::Api { detail, .. } => assert!(detail.contains("field required")),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_without_json_body_falls_back_to_unknown() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/lab/read-analysis");
            then.status(500).body("internal server error");
        });

        let client = client_for(&server);
        let err = client
            .read_document(TaskKind::Analysis, Language::English, "report.pdf", vec![0])
            .await
            .unwrap_err();

        match err {
            LabError::Api { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "Unknown error");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        // Nothing listens here; every attempt fails at the connection level.
        let client = HttpLabClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();

        let err = client
            .read_document(TaskKind::Analysis, Language::English, "report.pdf", vec![0])
            .await
            .unwrap_err();

        assert!(matches!(err, LabError::Transport(_)));
    }
}
