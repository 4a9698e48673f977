use serde_json::Value;
use std::{error::Error as StdError, fmt};

use oncopanel_core::prediction::TaskName;
use oncopanel_core::snapshot::ClinicalContextSnapshot;

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionHttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl PredictionHttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PredictionHttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct PredictionHttpError {
    kind: PredictionHttpErrorKind,
    status: Option<u16>,
    url: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl PredictionHttpError {
    pub fn kind(&self) -> PredictionHttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn from_reqwest(err: reqwest::Error, url: String) -> Self {
        let kind = if err.is_timeout() {
            PredictionHttpErrorKind::Timeout
        } else if err.is_connect() {
            PredictionHttpErrorKind::Connect
        } else if err.is_request() {
            PredictionHttpErrorKind::Request
        } else if err.is_body() {
            PredictionHttpErrorKind::Body
        } else if err.is_decode() {
            PredictionHttpErrorKind::Decode
        } else {
            PredictionHttpErrorKind::Unknown
        };
        let status = err.status().map(|s| s.as_u16());
        let message = err.to_string();
        PredictionHttpError {
            kind,
            status,
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }

    fn status_error(status: u16, url: String, preview: String) -> Self {
        PredictionHttpError {
            kind: PredictionHttpErrorKind::Status,
            status: Some(status),
            url: Some(url),
            message: preview,
            source: None,
        }
    }

    fn decode_error(status: u16, url: String, err: serde_json::Error, preview: String) -> Self {
        let message = format!("failed to decode response body: {} | body={}", err, preview);
        PredictionHttpError {
            kind: PredictionHttpErrorKind::Decode,
            status: Some(status),
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }
}

impl fmt::Display for PredictionHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prediction http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for PredictionHttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

async fn parse_json_response(resp: reqwest::Response) -> anyhow::Result<Value> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp
        .text()
        .await
        .map_err(|err| PredictionHttpError::from_reqwest(err, url.clone()))?;

    if !status.is_success() {
        let preview = preview_body(&body);
        return Err(PredictionHttpError::status_error(status.as_u16(), url, preview).into());
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str::<Value>(&body).map_err(|err| {
        let preview = preview_body(&body);
        PredictionHttpError::decode_error(status.as_u16(), url, err, preview).into()
    })
}

#[derive(Clone)]
pub struct HttpClient {
    api_key: String,
    http: reqwest::Client,
    // Pre-built URL endpoints for performance (avoid repeated format! and trim)
    url_adverse_events: String,
    url_treatment_response: String,
    url_discovery: String,
    url_rwe: String,
    url_monitoring: String,
}

impl HttpClient {
    pub fn new(base_url: String, api_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        let normalized = base_url.trim_end_matches('/');
        Ok(Self {
            api_key,
            http,
            url_adverse_events: format!("{}/v1/predict/adverse-events", normalized),
            url_treatment_response: format!("{}/v1/predict/treatment-response", normalized),
            url_discovery: format!("{}/v1/predict/combinatorial-discovery", normalized),
            url_rwe: format!("{}/v1/predict/real-world-evidence", normalized),
            url_monitoring: format!("{}/v1/predict/real-time-monitoring", normalized),
        })
    }

    fn url_for(&self, task: TaskName) -> &str {
        match task {
            TaskName::AdverseEvents => &self.url_adverse_events,
            TaskName::TreatmentResponse => &self.url_treatment_response,
            TaskName::CombinatorialDiscovery => &self.url_discovery,
            TaskName::RealWorldEvidence => &self.url_rwe,
            TaskName::RealTimeMonitoring => &self.url_monitoring,
        }
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }

    /// POST the snapshot to the task's prediction endpoint and return the
    /// raw payload JSON. Typed decoding is the caller's concern.
    pub async fn predict(
        &self,
        task: TaskName,
        snapshot: &ClinicalContextSnapshot,
    ) -> anyhow::Result<Value> {
        let url = self.url_for(task);
        tracing::debug!(
            target: "oncopanel.remote",
            stage = "predict.http.in",
            url = %url,
            task = %task,
            invocation_id = %snapshot.invocation_id,
            drugs = snapshot.drugs.len()
        );
        let req = self.http.post(url).json(snapshot);
        let resp = self
            .auth(req)
            .send()
            .await
            .map_err(|err| PredictionHttpError::from_reqwest(err, url.to_string()))?;
        let status = resp.status();
        let v = parse_json_response(resp).await?;
        tracing::debug!(
            target: "oncopanel.remote",
            stage = "predict.http.out",
            task = %task,
            status = %status
        );
        Ok(v)
    }
}
