//! Batch orchestration
//!
//! parse → resolve and validate (concurrently, one future per request) →
//! aggregate → synthesize, with optional dispatch of the result. A bad
//! request never fails the batch; it ends up as a diagnostic instead.

use chrono::{DateTime, Utc};
use dost_common::config::{ResolverConfig, TomlConfig};
use dost_common::{CurriculumTree, ParamSpecTable};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::aggregation::{MergePolicy, ResolvedRequest, TaskAggregator};
use crate::builders::{BuildOutput, Payload, PayloadSynthesizer};
use crate::dispatch::{dispatch_all, DispatchOutcome, ResourceSink};
use crate::error::{EngineError, EngineResult};
use crate::report::{DiagnosticKind, RequestDiagnostic, UnresolvedRequest};
use crate::resolver::TaxonomyResolver;
use crate::types::RawTaskRequest;
use crate::validation::{PortionValidator, ResolutionStatus, ValidationRetryCoordinator};

/// Everything the pipeline needs besides the tree and the validator
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub resolver: ResolverConfig,
    pub max_retries: u32,
    pub merge_policy: MergePolicy,
    pub student_id: Option<String>,
    pub params: ParamSpecTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            max_retries: 2,
            merge_policy: MergePolicy::default(),
            student_id: None,
            params: ParamSpecTable::builtin(),
        }
    }
}

impl PipelineConfig {
    /// Settings from a loaded TOML config
    pub fn from_toml(config: &TomlConfig) -> EngineResult<Self> {
        Ok(Self {
            resolver: config.resolver,
            max_retries: config.validation.max_retries,
            merge_policy: config.aggregation.merge_policy.parse::<MergePolicy>()?,
            student_id: config.student_id.clone(),
            params: config.param_table()?,
        })
    }
}

/// Outcome of one batch
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub generated_at: DateTime<Utc>,
    /// One entry per combined task that produced something
    pub payloads: Vec<BuildOutput>,
    pub diagnostics: Vec<RequestDiagnostic>,
    pub unresolved: Vec<UnresolvedRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dispatch: Vec<DispatchOutcome>,
}

impl PipelineReport {
    fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            payloads: Vec::new(),
            diagnostics: Vec::new(),
            unresolved: Vec::new(),
            dispatch: Vec::new(),
        }
    }

    /// Every payload, flattened in task order
    pub fn all_payloads(&self) -> Vec<&Payload> {
        self.payloads
            .iter()
            .flat_map(|output| match output {
                BuildOutput::Empty => Vec::new(),
                BuildOutput::Single(payload) => vec![payload],
                BuildOutput::Many(payloads) => payloads.iter().collect(),
            })
            .collect()
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> Vec<&RequestDiagnostic> {
        self.diagnostics.iter().filter(|d| d.kind == kind).collect()
    }
}

pub struct Pipeline {
    coordinator: ValidationRetryCoordinator,
    aggregator: TaskAggregator,
    synthesizer: PayloadSynthesizer,
}

impl Pipeline {
    pub fn new(tree: Arc<CurriculumTree>, validator: Arc<dyn PortionValidator>, config: PipelineConfig) -> Self {
        let resolver = Arc::new(TaxonomyResolver::new(tree.clone(), config.resolver));
        Self {
            coordinator: ValidationRetryCoordinator::new(resolver, validator, config.max_retries),
            aggregator: TaskAggregator::new(tree.clone(), Arc::new(config.params), config.merge_policy),
            synthesizer: PayloadSynthesizer::new(tree, config.student_id),
        }
    }

    /// Run a batch of raw JSON request records
    pub async fn run(&self, records: Vec<Value>) -> PipelineReport {
        let mut report = PipelineReport::new();
        let mut requests = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            match RawTaskRequest::from_value(record) {
                Ok(request) => requests.push((index, request)),
                Err(e) => {
                    warn!(request = index, error = %e, "Request rejected");
                    report.diagnostics.push(RequestDiagnostic::new(
                        index,
                        None,
                        DiagnosticKind::InvalidRequest,
                        e.to_string(),
                    ));
                }
            }
        }

        self.process(requests, report).await
    }

    /// Run a batch of already-parsed requests
    pub async fn run_requests(&self, requests: Vec<RawTaskRequest>) -> PipelineReport {
        self.process(requests.into_iter().enumerate().collect(), PipelineReport::new())
            .await
    }

    /// Send every payload in the report to `sink`, recording the outcomes
    pub async fn dispatch(&self, sink: &dyn ResourceSink, report: &mut PipelineReport) {
        let payloads: Vec<Payload> = report.all_payloads().into_iter().cloned().collect();
        report.dispatch = dispatch_all(sink, &payloads).await;
    }

    async fn process(&self, requests: Vec<(usize, RawTaskRequest)>, mut report: PipelineReport) -> PipelineReport {
        info!(requests = requests.len(), policy = %self.aggregator.policy(), "Batch started");

        let resolutions = join_all(
            requests
                .iter()
                .map(|(index, request)| self.coordinator.resolve(*index, request)),
        )
        .await;

        let mut resolved = Vec::with_capacity(requests.len());
        for ((index, request), result) in requests.into_iter().zip(resolutions) {
            let task_type = Some(request.task_type);
            match result {
                Ok(resolution) => match resolution.status {
                    ResolutionStatus::Validated => {
                        if !resolution.misses.is_empty() {
                            let dropped: Vec<String> = resolution
                                .misses
                                .iter()
                                .map(|m| format!("{} '{}'", m.level, m.fragment))
                                .collect();
                            report.diagnostics.push(RequestDiagnostic::new(
                                index,
                                task_type,
                                DiagnosticKind::Degraded,
                                format!("unmatched fragments dropped: {}", dropped.join(", ")),
                            ));
                        }
                        resolved.push(ResolvedRequest {
                            index,
                            request,
                            groups: resolution.groups,
                        });
                    }
                    ResolutionStatus::Unresolved { reason } => {
                        report.diagnostics.push(RequestDiagnostic::new(
                            index,
                            task_type,
                            DiagnosticKind::Unresolved,
                            reason.clone(),
                        ));
                        report.unresolved.push(UnresolvedRequest {
                            request_index: index,
                            task_type: request.task_type,
                            reason,
                            attempts: resolution.attempts,
                            groups: resolution.groups,
                            misses: resolution.misses,
                        });
                    }
                },
                Err(e) => {
                    let kind = match e {
                        EngineError::Protocol(_) => DiagnosticKind::ProtocolViolation,
                        EngineError::Validator(_) => DiagnosticKind::ValidatorFailed,
                        EngineError::InvalidParams(_) => DiagnosticKind::InvalidParams,
                        _ => DiagnosticKind::InvalidRequest,
                    };
                    report
                        .diagnostics
                        .push(RequestDiagnostic::new(index, task_type, kind, e.to_string()));
                }
            }
        }

        let outcome = self.aggregator.aggregate(resolved);
        report.diagnostics.extend(outcome.diagnostics);

        for task in &outcome.tasks {
            let output = self.synthesizer.synthesize(task);
            if output.is_empty() {
                let first = task.source_requests.first().copied().unwrap_or_default();
                report.diagnostics.push(RequestDiagnostic::new(
                    first,
                    Some(task.task_type()),
                    DiagnosticKind::NoPayload,
                    format!(
                        "nothing to build for {} (requests {:?})",
                        task.task_type(),
                        task.source_requests
                    ),
                ));
            } else {
                report.payloads.push(output);
            }
        }

        report.diagnostics.sort_by_key(|d| d.request_index);
        info!(
            tasks = outcome.tasks.len(),
            payloads = report.all_payloads().len(),
            diagnostics = report.diagnostics.len(),
            unresolved = report.unresolved.len(),
            "Batch complete"
        );
        report
    }
}
