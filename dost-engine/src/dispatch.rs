//! Resource-creation boundary
//!
//! Synthesized payloads are handed to a [`ResourceSink`]. Each payload is one
//! call; a failing call is recorded in its [`DispatchOutcome`] and the rest of
//! the batch still goes out.

use async_trait::async_trait;
use dost_common::config::DispatchConfig;
use dost_common::TaskType;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::builders::Payload;
use crate::error::EngineResult;

const USER_AGENT: &str = concat!("dost-engine/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Resource API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unreadable response: {0}")]
    Parse(String),
}

/// Creates one resource per payload
#[async_trait]
pub trait ResourceSink: Send + Sync {
    async fn create(&self, payload: &Payload) -> Result<Value, DispatchError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub payload_index: usize,
    pub task_type: TaskType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Send every payload in order, recording each result
pub async fn dispatch_all(sink: &dyn ResourceSink, payloads: &[Payload]) -> Vec<DispatchOutcome> {
    let mut outcomes = Vec::with_capacity(payloads.len());

    for (index, payload) in payloads.iter().enumerate() {
        let label = payload.label();
        let (response, error) = match sink.create(payload).await {
            Ok(response) => {
                debug!(index, label = %label, "Payload dispatched");
                (Some(response), None)
            }
            Err(e) => {
                error!(index, label = %label, error = %e, "Payload dispatch failed");
                (None, Some(e.to_string()))
            }
        };
        outcomes.push(DispatchOutcome {
            payload_index: index,
            task_type: payload.task_type(),
            label,
            response,
            error,
        });
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    info!(total = outcomes.len(), failed, "Dispatch complete");
    outcomes
}

/// Resource API reached over HTTP
pub struct HttpResourceSink {
    http_client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpResourceSink {
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    /// Sink for the `[dispatch]` config section
    ///
    /// # Errors
    /// [`dost_common::Error::Config`] when no `base_url` is configured.
    pub fn from_config(config: &DispatchConfig) -> EngineResult<Self> {
        let base_url = config.base_url.clone().ok_or_else(|| {
            dost_common::Error::Config("dispatch.base_url is not configured".to_string())
        })?;
        Ok(Self::new(
            base_url,
            config.auth_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)
    }
}

/// Endpoint path and request body for one payload
pub fn route(payload: &Payload) -> Result<(&'static str, Value), DispatchError> {
    match payload {
        Payload::Concept(concept) => Ok((
            "/shorturl/create",
            json!({
                "shorturl": concept.shorturl,
                "longurl": concept.longurl,
                "meta": concept.meta,
            }),
        )),
        other => {
            let body = serde_json::to_value(other).map_err(|e| DispatchError::Parse(e.to_string()))?;
            Ok(("/combined/create", json!({ "requestList": [body] })))
        }
    }
}

#[async_trait]
impl ResourceSink for HttpResourceSink {
    async fn create(&self, payload: &Payload) -> Result<Value, DispatchError> {
        let (path, body) = route(payload)?;
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DispatchError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DispatchError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| DispatchError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::concept::ConceptMeta;
    use crate::builders::{ConceptPayload, PickingPayload};
    use std::sync::Mutex;

    /// Fails for chapters listed in `fail`, echoes the label otherwise
    struct RecordingSink {
        fail: Vec<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ResourceSink for RecordingSink {
        async fn create(&self, payload: &Payload) -> Result<Value, DispatchError> {
            let label = payload.label();
            self.seen.lock().unwrap().push(label.clone());
            if self.fail.contains(&label.as_str()) {
                return Err(DispatchError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(json!({ "created": label }))
        }
    }

    fn picking(chapter: &str) -> Payload {
        Payload::PickingPower(PickingPayload {
            user: None,
            chapter: chapter.to_string(),
            subject: "Physics".to_string(),
        })
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_siblings() {
        let sink = RecordingSink {
            fail: vec!["Gravitation"],
            seen: Mutex::new(Vec::new()),
        };
        let payloads = vec![picking("Kinematics"), picking("Gravitation"), picking("Electrostatics")];

        let outcomes = dispatch_all(&sink, &payloads).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[0].response, Some(json!({"created": "Kinematics"})));
        assert!(!outcomes[1].is_success());
        assert!(outcomes[1].error.as_deref().unwrap().contains("500"));
        assert!(outcomes[2].is_success());
        assert_eq!(sink.seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_routes() {
        let (path, body) = route(&picking("Kinematics")).unwrap();
        assert_eq!(path, "/combined/create");
        assert_eq!(body["requestList"][0]["bulkRequestType"], json!("pickingPower"));

        let concept = Payload::Concept(ConceptPayload {
            studentid: None,
            shorturl: "cb-1".to_string(),
            longurl: "/dosts/share-concept-basket/view/cb-1".to_string(),
            meta: ConceptMeta {
                chapter: "Gravitation".to_string(),
                discription: "Concept Basket".to_string(),
                concept_basket_data: vec![],
            },
        });
        let (path, body) = route(&concept).unwrap();
        assert_eq!(path, "/shorturl/create");
        assert_eq!(body["shorturl"], json!("cb-1"));
        assert_eq!(body["meta"]["chapter"], json!("Gravitation"));
        assert!(body.get("studentid").is_none());
    }

    #[test]
    fn test_sink_needs_base_url() {
        let err = HttpResourceSink::from_config(&DispatchConfig::default()).err().unwrap();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let sink = HttpResourceSink::new("https://api.example.test/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(sink.base_url, "https://api.example.test");
    }
}
