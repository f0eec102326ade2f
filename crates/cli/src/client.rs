// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for `devlogd`'s loopback ingest surface (spec §4.J/§6.2).

use devlog_config::{ConfigSubstrate, PermissiveValidator};
use devlog_core::Event;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::paths::Paths;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("devlogd is not running")]
    DaemonNotRunning,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("devlogd returned an error: {error}: {detail}")]
    Daemon { error: String, detail: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    detail: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub event_count: u64,
    pub uptime_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    pub filtered: bool,
    pub id: String,
}

pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
}

impl DaemonClient {
    pub fn new(port: u16) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("http://127.0.0.1:{port}"),
        }
    }

    /// Build a client targeting the port recorded in the on-disk config,
    /// defaulting to the standard port if no config has been written yet.
    pub fn discover(paths: &Paths) -> Self {
        let port = ConfigSubstrate::load(&paths.config_path, &PermissiveValidator)
            .map(|substrate| substrate.document().http.port)
            .unwrap_or(devlog_config::DEFAULT_HTTP_PORT);
        Self::new(port)
    }

    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        self.get("/api/v1/status", &[]).await
    }

    pub async fn ingest(&self, event: &Event) -> Result<IngestResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/v1/ingest", self.base_url))
            .json(event)
            .send()
            .await
            .map_err(to_client_error)?;
        decode(response).await
    }

    pub async fn recent(&self, limit: u32, source: Option<&str>) -> Result<Vec<Event>, ClientError> {
        let mut query = vec![("limit".to_string(), limit.to_string())];
        if let Some(source) = source {
            query.push(("source".to_string(), source.to_string()));
        }
        self.get("/api/v1/events", &query).await
    }

    pub async fn search(&self, q: &str, since: Option<&str>, limit: u32) -> Result<Vec<Event>, ClientError> {
        let mut query = vec![("q".to_string(), q.to_string()), ("limit".to_string(), limit.to_string())];
        if let Some(since) = since {
            query.push(("since".to_string(), since.to_string()));
        }
        self.get("/api/v1/search", &query).await
    }

    pub async fn metrics(&self) -> Result<Value, ClientError> {
        self.get("/api/v1/metrics", &[]).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(to_client_error)?;
        decode(response).await
    }
}

fn to_client_error(err: reqwest::Error) -> ClientError {
    if err.is_connect() {
        ClientError::DaemonNotRunning
    } else {
        ClientError::Request(err)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
            error: "unknown".to_string(),
            detail: "devlogd returned a non-success status".to_string(),
        });
        Err(ClientError::Daemon {
            error: body.error,
            detail: body.detail,
        })
    }
}
