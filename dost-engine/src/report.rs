//! Per-request diagnostics
//!
//! Nothing a batch drops is lost silently: every skipped request, degraded
//! resolution and empty synthesis is reported here.

use dost_common::TaskType;
use serde::Serialize;

use crate::resolver::Miss;
use crate::types::ResolvedGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// Record could not be parsed
    InvalidRequest,
    /// No portion could be resolved; request skipped
    Unresolved,
    /// Some fragments were dropped but the request went ahead
    Degraded,
    /// Validator rejected without corrected hints
    ProtocolViolation,
    /// Validator unreachable or failing
    ValidatorFailed,
    InvalidParams,
    /// Synthesis produced nothing for a combined task
    NoPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDiagnostic {
    pub request_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl RequestDiagnostic {
    pub fn new(
        request_index: usize,
        task_type: Option<TaskType>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request_index,
            task_type,
            kind,
            message: message.into(),
        }
    }
}

/// A request whose validation loop gave up, with its best-effort resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedRequest {
    pub request_index: usize,
    pub task_type: TaskType,
    pub reason: String,
    pub attempts: u32,
    pub groups: Vec<ResolvedGroup>,
    pub misses: Vec<Miss>,
}
