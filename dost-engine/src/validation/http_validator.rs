//! HTTP validator client
//!
//! POSTs the [`ValidationRequest`] as JSON and decodes the reply as a
//! [`ValidatorVerdict`]. Language-model backends often wrap their JSON in a
//! markdown code fence; the fence is stripped before decoding.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{PortionValidator, ValidationRequest, ValidatorError, ValidatorVerdict};

const USER_AGENT: &str = concat!("dost-engine/", env!("CARGO_PKG_VERSION"));

/// Validator reached over HTTP
pub struct HttpPortionValidator {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpPortionValidator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ValidatorError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ValidatorError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl PortionValidator for HttpPortionValidator {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidatorVerdict, ValidatorError> {
        debug!(
            endpoint = %self.endpoint,
            request = request.request_index,
            attempt = request.attempt,
            "Calling validator"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ValidatorError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ValidatorError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ValidatorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_verdict(&body)
    }
}

/// Decode a verdict, tolerating a surrounding ```json fence
pub fn parse_verdict(body: &str) -> Result<ValidatorVerdict, ValidatorError> {
    serde_json::from_str(strip_fence(body)).map_err(|e| ValidatorError::Parse(e.to_string()))
}

fn strip_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
