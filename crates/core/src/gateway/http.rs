use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::domain::benchmark::{Benchmark, BenchmarkQuery};
use crate::domain::evaluation::EvaluationMetrics;
use crate::domain::feedback::{FeedbackAck, FeedbackJudgment};
use crate::domain::recommendation::{AnalyzeAck, Recommendation};
use crate::domain::simulation::{SimulatedAction, SimulationReport};
use crate::domain::upload::{CampaignRow, ExportFile, UploadReport, PREVIEW_ROWS};
use crate::gateway::{AnalysisGateway, GatewayError};

/// All service routes live under this prefix.
const API_PREFIX: &str = "/api";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRIES: u32 = 3;

/// `AnalysisGateway` over HTTP/JSON.
///
/// Reads are retried with exponential backoff on transient failures. Writes
/// (upload, analyze, feedback, simulate) are sent exactly once, since the
/// workflow layer owns their at-most-once semantics.
#[derive(Debug, Clone)]
pub struct HttpAnalysisGateway {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl HttpAnalysisGateway {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_options(
            base_url,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            DEFAULT_RETRIES,
        )
    }

    pub fn with_options(
        base_url: impl Into<String>,
        timeout: Duration,
        retries: u32,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build analysis gateway http client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            retries: retries.max(1),
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::with_options(
            settings.require_gateway_base_url()?,
            Duration::from_secs(settings.gateway_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            settings.gateway_retries.unwrap_or(DEFAULT_RETRIES),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.get_once(endpoint, &url, params).await {
                Ok(body) => return decode(endpoint, &body),
                Err(err) if attempt < self.retries && err.is_retryable() => {
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(
                        endpoint,
                        attempt,
                        backoff_secs = backoff.as_secs(),
                        error = %err,
                        "gateway call failed; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once(
        &self,
        endpoint: &'static str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<String, GatewayError> {
        let mut request = self.http.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }
        let response = request.send().await.map_err(|source| GatewayError::Transport {
            endpoint: endpoint.into(),
            source,
        })?;
        read_body(endpoint, response).await
    }

    async fn post_once(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, GatewayError> {
        let response = request.send().await.map_err(|source| GatewayError::Transport {
            endpoint: endpoint.into(),
            source,
        })?;
        read_body(endpoint, response).await
    }
}

#[async_trait::async_trait]
impl AnalysisGateway for HttpAnalysisGateway {
    async fn upload_csv(&self, file: &ExportFile) -> Result<UploadReport, GatewayError> {
        const ENDPOINT: &str = "POST /upload-csv";
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str("text/csv")
            .map_err(|source| GatewayError::Transport {
                endpoint: ENDPOINT.into(),
                source,
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let body = self
            .post_once(ENDPOINT, self.http.post(self.url("/upload-csv")).multipart(form))
            .await?;
        let mut report: UploadReport = decode(ENDPOINT, &body)?;
        // The service may echo back the whole dataset; keep a bounded preview.
        report.preview.truncate(PREVIEW_ROWS);
        Ok(report)
    }

    async fn campaigns(&self) -> Result<Vec<CampaignRow>, GatewayError> {
        self.get_json("GET /campaigns", "/campaigns", &[]).await
    }

    async fn analyze(&self) -> Result<AnalyzeAck, GatewayError> {
        const ENDPOINT: &str = "POST /analyze";
        let body = self
            .post_once(ENDPOINT, self.http.post(self.url("/analyze")))
            .await?;
        decode_ack(ENDPOINT, &body)
    }

    async fn recommendations(&self) -> Result<Vec<Recommendation>, GatewayError> {
        const ENDPOINT: &str = "GET /recommendations";
        let recommendations: Vec<Recommendation> =
            self.get_json(ENDPOINT, "/recommendations", &[]).await?;
        for recommendation in &recommendations {
            recommendation
                .validate()
                .map_err(|err| GatewayError::Contract {
                    endpoint: ENDPOINT.into(),
                    detail: format!("{err:#}"),
                })?;
        }
        Ok(recommendations)
    }

    async fn benchmarks(&self, query: &BenchmarkQuery) -> Result<Vec<Benchmark>, GatewayError> {
        self.get_json("GET /benchmarks", "/benchmarks", &query.params())
            .await
    }

    async fn benchmark_by_id(&self, id: &str) -> Result<Option<Benchmark>, GatewayError> {
        const ENDPOINT: &str = "GET /benchmarks/{id}";
        match self
            .get_json::<Benchmark>(ENDPOINT, &format!("/benchmarks/{id}"), &[])
            .await
        {
            Ok(benchmark) => Ok(Some(benchmark)),
            Err(GatewayError::Status { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn submit_feedback(
        &self,
        judgment: &FeedbackJudgment,
    ) -> Result<FeedbackAck, GatewayError> {
        const ENDPOINT: &str = "POST /feedback";
        let body = self
            .post_once(ENDPOINT, self.http.post(self.url("/feedback")).json(judgment))
            .await?;
        decode_ack(ENDPOINT, &body)
    }

    async fn evaluation_metrics(&self) -> Result<EvaluationMetrics, GatewayError> {
        self.get_json("GET /evaluation/metrics", "/evaluation/metrics", &[])
            .await
    }

    async fn simulate(
        &self,
        campaign_name: &str,
        action: SimulatedAction,
    ) -> Result<SimulationReport, GatewayError> {
        const ENDPOINT: &str = "POST /simulate";
        let request = self.http.post(self.url("/simulate")).query(&[
            ("campaign_name", campaign_name),
            ("action", action.as_str()),
        ]);
        let body = self.post_once(ENDPOINT, request).await?;
        decode(ENDPOINT, &body)
    }
}

async fn read_body(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<String, GatewayError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|source| GatewayError::Transport {
            endpoint: endpoint.into(),
            source,
        })?;
    if !status.is_success() {
        return Err(GatewayError::Status {
            endpoint: endpoint.into(),
            status: status.as_u16(),
            detail: extract_detail(&text),
        });
    }
    Ok(text)
}

fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|source| GatewayError::Decode {
        endpoint: endpoint.into(),
        source,
    })
}

/// Acks may legitimately come back with an empty body.
fn decode_ack<T: DeserializeOwned + Default>(
    endpoint: &'static str,
    body: &str,
) -> Result<T, GatewayError> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    decode(endpoint, body)
}

/// FastAPI-style error bodies carry a top-level string "detail" field.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?.as_str()?.trim();
    if detail.is_empty() {
        None
    } else {
        Some(detail.to_string())
    }
}
