//! Control actions against the simulation HTTP API
//!
//! Fire-and-forget semantics: success is any 2xx, a failure leaves every
//! store untouched and is only logged by the caller, and there is no retry.

use std::time::Duration;

use tracing::debug;

use crate::shared::error::{ControlAction, ControlError};
use crate::shared::types::TraderSummary;

/// HTTP client for the simulation's control endpoints
#[derive(Debug, Clone)]
pub struct ControlClient {
    base_url: String,
    http: reqwest::Client,
}

impl ControlClient {
    /// Create a client for `base_url` (trailing slash optional)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ControlError> {
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(ControlError::Client)?;
        Ok(Self { base_url, http })
    }

    /// POST /api/start
    pub async fn start(&self) -> Result<(), ControlError> {
        self.post(ControlAction::Start, "/api/start").await
    }

    /// POST /api/stop
    pub async fn stop(&self) -> Result<(), ControlError> {
        self.post(ControlAction::Stop, "/api/stop").await
    }

    /// POST /api/reset
    pub async fn reset(&self) -> Result<(), ControlError> {
        self.post(ControlAction::Reset, "/api/reset").await
    }

    /// GET /api/traders, the trader view's initial load
    ///
    /// The result is applied exactly like a pushed `traders_update`.
    pub async fn fetch_traders(&self) -> Result<Vec<TraderSummary>, ControlError> {
        let action = ControlAction::FetchTraders;
        let url = self.url("/api/traders");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ControlError::Http { action, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControlError::Status { action, status });
        }

        response
            .json::<Vec<TraderSummary>>()
            .await
            .map_err(|source| ControlError::Http { action, source })
    }

    async fn post(&self, action: ControlAction, path: &str) -> Result<(), ControlError> {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|source| ControlError::Http { action, source })?;

        let status = response.status();
        if status.is_success() {
            debug!("{} accepted by {}", action, url);
            Ok(())
        } else {
            Err(ControlError::Status { action, status })
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
