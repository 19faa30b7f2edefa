//! Validation round and bounded retries
//!
//! An external validator (typically a language model behind HTTP) looks at
//! each resolution and either accepts it or returns corrected hints. The
//! [`ValidationRetryCoordinator`] re-resolves with the corrections until the
//! validator accepts, the retry budget runs out, or the validator breaks the
//! protocol.
//!
//! # Decision order per attempt
//! 1. Valid verdict on a structurally sound resolution: done.
//! 2. Valid verdict on a structurally empty resolution: the verdict is not
//!    trusted; retry with chapter-only hints for the chapters that resolved.
//! 3. Rejection with corrected hints: retry with them.
//! 4. Rejection without corrected hints: protocol violation, fatal for the
//!    request (checked before the retry budget).
//! 5. Unparseable reply: retry with the same hints.
//! 6. Transport or status failure: fatal for the request.
//!
//! Attempts run strictly one after another for a single request.

pub mod http_validator;

use async_trait::async_trait;
use dost_common::TaskType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::resolver::{Miss, Resolution, TaxonomyResolver};
use crate::types::{RawTaskRequest, ResolvedGroup, TaskHints};

pub use http_validator::HttpPortionValidator;

/// Validator failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    /// Reply could not be decoded into a verdict
    #[error("Malformed validator reply: {0}")]
    Parse(String),

    /// Network communication error
    #[error("Validator unreachable: {0}")]
    Transport(String),

    /// Validator answered with a non-success status
    #[error("Validator returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// What the validator is asked to judge
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRequest {
    pub request_index: usize,
    pub task_type: TaskType,
    pub attempt: u32,
    /// Hints this attempt was resolved from
    pub hints: Vec<TaskHints>,
    pub groups: Vec<ResolvedGroup>,
    pub misses: Vec<Miss>,
}

/// Validator reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorVerdict {
    #[serde(alias = "context_correct")]
    pub valid: bool,

    /// Required when `valid` is false
    #[serde(default, alias = "corrected_groups", skip_serializing_if = "Option::is_none")]
    pub corrected_hints: Option<Vec<TaskHints>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidatorVerdict {
    pub fn accept() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    pub fn reject(corrected: Vec<TaskHints>) -> Self {
        Self {
            valid: false,
            corrected_hints: Some(corrected),
            reason: None,
        }
    }
}

/// Judges resolved portions
#[async_trait]
pub trait PortionValidator: Send + Sync {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidatorVerdict, ValidatorError>;
}

/// Accepts every resolution; used when no validator endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllValidator;

#[async_trait]
impl PortionValidator for AcceptAllValidator {
    async fn validate(&self, _request: &ValidationRequest) -> Result<ValidatorVerdict, ValidatorError> {
        Ok(ValidatorVerdict::accept())
    }
}

/// Final state of a validated resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ResolutionStatus {
    Validated,
    /// Best effort after the loop gave up; not fit for synthesis
    Unresolved { reason: String },
}

/// Resolution plus its validation outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedResolution {
    pub groups: Vec<ResolvedGroup>,
    pub misses: Vec<Miss>,
    pub status: ResolutionStatus,
    pub attempts: u32,
}

impl ValidatedResolution {
    pub fn is_validated(&self) -> bool {
        self.status == ResolutionStatus::Validated
    }

    fn new(resolution: Resolution, status: ResolutionStatus, attempts: u32) -> Self {
        Self {
            groups: resolution.groups,
            misses: resolution.misses,
            status,
            attempts,
        }
    }
}

/// Runs resolve → validate → re-resolve with a bounded retry count
#[derive(Clone)]
pub struct ValidationRetryCoordinator {
    resolver: Arc<TaxonomyResolver>,
    validator: Arc<dyn PortionValidator>,
    max_retries: u32,
}

impl ValidationRetryCoordinator {
    pub fn new(
        resolver: Arc<TaxonomyResolver>,
        validator: Arc<dyn PortionValidator>,
        max_retries: u32,
    ) -> Self {
        Self {
            resolver,
            validator,
            max_retries,
        }
    }

    /// Resolve and validate one request
    ///
    /// # Returns
    /// The validated resolution, or the last attempt marked
    /// [`ResolutionStatus::Unresolved`] when the loop gave up.
    ///
    /// # Errors
    /// - [`EngineError::Protocol`] if the validator rejects without corrected hints
    /// - [`EngineError::Validator`] on transport or status failures
    pub async fn resolve(
        &self,
        request_index: usize,
        request: &RawTaskRequest,
    ) -> EngineResult<ValidatedResolution> {
        let mut hints = request.hint_groups.clone();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let resolution = self.resolver.resolve_all(&hints);
            let validation = ValidationRequest {
                request_index,
                task_type: request.task_type,
                attempt,
                hints: hints.clone(),
                groups: resolution.groups.clone(),
                misses: resolution.misses.clone(),
            };

            let (next_hints, reason) = match self.validator.validate(&validation).await {
                Ok(verdict) if verdict.valid => {
                    if !resolution.is_structurally_empty() {
                        info!(
                            request = request_index,
                            attempt,
                            groups = resolution.groups.len(),
                            "Resolution validated"
                        );
                        return Ok(ValidatedResolution::new(
                            resolution,
                            ResolutionStatus::Validated,
                            attempt,
                        ));
                    }

                    warn!(
                        request = request_index,
                        attempt,
                        "Validator accepted a structurally empty resolution, forcing retry"
                    );
                    let rewritten = chapter_only_hints(&resolution, &hints);
                    if rewritten == hints {
                        return Ok(ValidatedResolution::new(
                            resolution,
                            ResolutionStatus::Unresolved {
                                reason: "no chapter could be resolved".to_string(),
                            },
                            attempt,
                        ));
                    }
                    (rewritten, "resolution structurally empty".to_string())
                }
                Ok(verdict) => match verdict.corrected_hints.filter(|h| !h.is_empty()) {
                    Some(corrected) => {
                        debug!(
                            request = request_index,
                            attempt,
                            reason = verdict.reason.as_deref().unwrap_or(""),
                            "Validator supplied corrected hints"
                        );
                        (
                            corrected,
                            verdict
                                .reason
                                .unwrap_or_else(|| "rejected by validator".to_string()),
                        )
                    }
                    None => {
                        error!(
                            request = request_index,
                            attempt,
                            "Validator rejected resolution without corrected hints"
                        );
                        return Err(EngineError::Protocol(format!(
                            "request {}: rejection on attempt {} carried no corrected hints",
                            request_index, attempt
                        )));
                    }
                },
                Err(ValidatorError::Parse(msg)) => {
                    warn!(
                        request = request_index,
                        attempt,
                        error = %msg,
                        "Validator reply unparseable, retrying"
                    );
                    (hints.clone(), format!("validator reply unparseable: {}", msg))
                }
                Err(e) => {
                    error!(request = request_index, attempt, error = %e, "Validator call failed");
                    return Err(e.into());
                }
            };

            if attempt > self.max_retries {
                warn!(
                    request = request_index,
                    attempts = attempt,
                    reason = %reason,
                    "Validation retries exhausted"
                );
                return Ok(ValidatedResolution::new(
                    resolution,
                    ResolutionStatus::Unresolved {
                        reason: format!("retries exhausted: {}", reason),
                    },
                    attempt,
                ));
            }
            hints = next_hints;
        }
    }
}

/// Chapter-only hints for every chapter that resolved; the input when none did
fn chapter_only_hints(resolution: &Resolution, current: &[TaskHints]) -> Vec<TaskHints> {
    if resolution.is_empty() {
        return current.to_vec();
    }
    resolution
        .chapters_by_subject()
        .into_iter()
        .map(|(subject, chapters)| TaskHints::chapter_only(&subject, chapters))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dost_common::config::ResolverConfig;
    use dost_common::CurriculumTree;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const SNAPSHOT: &str = r#"{
        "JEE": {
            "Physics": {
                "Kinematics": {"Projectile Motion": ["Time of Flight"]},
                "Newton's Laws of Motion": {"Friction": ["Pseudo Force"]}
            }
        }
    }"#;

    /// Replays scripted replies and records what it was asked
    struct ScriptedValidator {
        replies: Mutex<VecDeque<Result<ValidatorVerdict, ValidatorError>>>,
        seen: Mutex<Vec<ValidationRequest>>,
    }

    impl ScriptedValidator {
        fn new(replies: Vec<Result<ValidatorVerdict, ValidatorError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PortionValidator for ScriptedValidator {
        async fn validate(&self, request: &ValidationRequest) -> Result<ValidatorVerdict, ValidatorError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ValidatorVerdict::accept()))
        }
    }

    fn coordinator(validator: Arc<dyn PortionValidator>) -> ValidationRetryCoordinator {
        let tree = Arc::new(CurriculumTree::from_json_str(SNAPSHOT).unwrap());
        let resolver = Arc::new(TaxonomyResolver::new(tree, ResolverConfig::default()));
        ValidationRetryCoordinator::new(resolver, validator, 2)
    }

    fn request(hints: TaskHints) -> RawTaskRequest {
        RawTaskRequest::new(TaskType::Formula, hints)
    }

    #[tokio::test]
    async fn test_accept_first_attempt() {
        let result = coordinator(Arc::new(AcceptAllValidator))
            .resolve(0, &request(TaskHints::new("Physics").chapter("Kinematics")))
            .await
            .unwrap();

        assert!(result.is_validated());
        assert_eq!(result.attempts, 1);
        assert_eq!(result.groups[0].chapter(), "Kinematics");
    }

    #[tokio::test]
    async fn test_corrected_hints_are_resolved_again() {
        let validator = ScriptedValidator::new(vec![
            Ok(ValidatorVerdict::reject(vec![
                TaskHints::new("Physics").chapter("Newtons laws of motion").concept("friction"),
            ])),
            Ok(ValidatorVerdict::accept()),
        ]);
        let result = coordinator(validator.clone())
            .resolve(0, &request(TaskHints::new("Physics").chapter("Kinematics")))
            .await
            .unwrap();

        assert!(result.is_validated());
        assert_eq!(result.attempts, 2);
        assert_eq!(result.groups[0].chapter(), "Newton's Laws of Motion");
        assert_eq!(result.groups[0].concepts(), &["Friction"]);
        assert_eq!(validator.calls(), 2);
    }

    #[tokio::test]
    async fn test_rejection_without_hints_is_protocol_violation() {
        let validator = ScriptedValidator::new(vec![Ok(ValidatorVerdict {
            valid: false,
            corrected_hints: Some(vec![]),
            reason: None,
        })]);
        let err = coordinator(validator)
            .resolve(3, &request(TaskHints::new("Physics").chapter("Kinematics")))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Protocol(msg) if msg.contains("request 3")));
    }

    #[tokio::test]
    async fn test_protocol_checked_before_retry_budget() {
        let hints = TaskHints::new("Physics").chapter("Kinematics");
        let validator = ScriptedValidator::new(vec![
            Ok(ValidatorVerdict::reject(vec![hints.clone()])),
            Ok(ValidatorVerdict::reject(vec![hints.clone()])),
            Ok(ValidatorVerdict {
                valid: false,
                ..Default::default()
            }),
        ]);
        let err = coordinator(validator)
            .resolve(0, &request(hints))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_retries_exhausted_marks_unresolved() {
        let hints = TaskHints::new("Physics").chapter("Kinematics");
        let validator = ScriptedValidator::new(vec![
            Ok(ValidatorVerdict::reject(vec![hints.clone()])),
            Ok(ValidatorVerdict::reject(vec![hints.clone()])),
            Ok(ValidatorVerdict::reject(vec![hints.clone()])),
        ]);
        let result = coordinator(validator.clone())
            .resolve(0, &request(hints))
            .await
            .unwrap();

        assert_eq!(result.attempts, 3);
        assert_eq!(validator.calls(), 3);
        assert!(matches!(
            result.status,
            ResolutionStatus::Unresolved { ref reason } if reason.starts_with("retries exhausted")
        ));
        // Best effort is kept, not dropped
        assert_eq!(result.groups.len(), 1);
    }

    #[tokio::test]
    async fn test_structurally_empty_acceptance_forces_chapter_only_retry() {
        let validator = ScriptedValidator::new(vec![]);
        let result = coordinator(validator.clone())
            .resolve(
                0,
                &request(TaskHints::new("Physics").chapter("Kinematics").concept("Thermal Expansion")),
            )
            .await
            .unwrap();

        assert!(result.is_validated());
        assert_eq!(result.attempts, 2);
        assert!(result.groups[0].is_chapter_only());

        let seen = validator.seen.lock().unwrap();
        assert_eq!(
            seen[1].hints,
            vec![TaskHints::chapter_only("Physics", vec!["Kinematics".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_nothing_resolvable_stops_without_futile_retries() {
        let validator = ScriptedValidator::new(vec![]);
        let result = coordinator(validator.clone())
            .resolve(0, &request(TaskHints::new("Physics").chapter("Organic Chemistry")))
            .await
            .unwrap();

        assert!(!result.is_validated());
        assert!(result.groups.is_empty());
        assert_eq!(validator.calls(), 1);
    }

    #[tokio::test]
    async fn test_parse_error_retries_with_same_hints() {
        let validator = ScriptedValidator::new(vec![
            Err(ValidatorError::Parse("expected value at line 1".to_string())),
            Ok(ValidatorVerdict::accept()),
        ]);
        let result = coordinator(validator.clone())
            .resolve(0, &request(TaskHints::new("Physics").chapter("Kinematics")))
            .await
            .unwrap();

        assert!(result.is_validated());
        assert_eq!(result.attempts, 2);
        let seen = validator.seen.lock().unwrap();
        assert_eq!(seen[0].hints, seen[1].hints);
    }

    #[tokio::test]
    async fn test_transport_error_is_fatal() {
        let validator = ScriptedValidator::new(vec![Err(ValidatorError::Transport(
            "connection refused".to_string(),
        ))]);
        let err = coordinator(validator)
            .resolve(0, &request(TaskHints::new("Physics").chapter("Kinematics")))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validator(ValidatorError::Transport(_))));
    }
}
