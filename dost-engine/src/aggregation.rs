//! Task aggregation
//!
//! Turns resolved requests into [`CombinedTask`]s. Each request gets complete
//! typed parameters and enriched groups, then joins the task for its
//! aggregation key `(task type, subject, merge slot)`. Tasks come out in the
//! order their first request was seen.
//!
//! The merge slot is set by [`MergePolicy`]:
//!
//! | policy | slot | effect |
//! |---|---|---|
//! | `per-request` | request index | one task per request |
//! | `extractor-marked` | `combine_key`, else request index | merge only requests the extractor marked |
//! | `by-subject` | shared | every same-type, same-subject request merges |

use dost_common::{CurriculumTree, ParamSpecTable, TaskType};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::params::TaskParams;
use crate::report::{DiagnosticKind, RequestDiagnostic};
use crate::types::{push_merged, CombinedTask, RawTaskRequest, ResolvedGroup};

/// How same-type, same-subject requests are grouped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    PerRequest,
    #[default]
    ExtractorMarked,
    BySubject,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::PerRequest => "per-request",
            MergePolicy::ExtractorMarked => "extractor-marked",
            MergePolicy::BySubject => "by-subject",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = dost_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-request" => Ok(MergePolicy::PerRequest),
            "extractor-marked" => Ok(MergePolicy::ExtractorMarked),
            "by-subject" => Ok(MergePolicy::BySubject),
            other => Err(dost_common::Error::Config(format!(
                "Unknown merge policy '{}' (expected per-request, extractor-marked or by-subject)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MergeSlot {
    Request(usize),
    Marked(String),
    Shared,
}

/// A request that made it through resolution and validation
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub index: usize,
    pub request: RawTaskRequest,
    pub groups: Vec<ResolvedGroup>,
}

#[derive(Debug, Clone, Default)]
pub struct AggregationOutcome {
    pub tasks: Vec<CombinedTask>,
    pub diagnostics: Vec<RequestDiagnostic>,
}

/// Groups resolved requests into combined tasks
pub struct TaskAggregator {
    tree: Arc<CurriculumTree>,
    params: Arc<ParamSpecTable>,
    policy: MergePolicy,
}

impl TaskAggregator {
    pub fn new(tree: Arc<CurriculumTree>, params: Arc<ParamSpecTable>, policy: MergePolicy) -> Self {
        Self {
            tree,
            params,
            policy,
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// One pass over the requests, in the order given
    pub fn aggregate(&self, requests: Vec<ResolvedRequest>) -> AggregationOutcome {
        let mut outcome = AggregationOutcome::default();
        let mut index: HashMap<(TaskType, String, MergeSlot), usize> = HashMap::new();

        for item in requests {
            let task_type = item.request.task_type;

            if item.groups.is_empty() {
                warn!(request = item.index, task_type = %task_type, "Request has no resolved portion, skipped");
                outcome.diagnostics.push(RequestDiagnostic::new(
                    item.index,
                    Some(task_type),
                    DiagnosticKind::Unresolved,
                    "no chapter could be resolved",
                ));
                continue;
            }

            let params = match TaskParams::resolve(task_type, &item.request.extra_params, &self.params) {
                Ok((params, filled)) => {
                    if !filled.is_empty() {
                        debug!(request = item.index, filled = ?filled, "Parameters filled from defaults");
                    }
                    params
                }
                Err(e) => {
                    warn!(request = item.index, error = %e, "Invalid parameters, request skipped");
                    outcome.diagnostics.push(RequestDiagnostic::new(
                        item.index,
                        Some(task_type),
                        DiagnosticKind::InvalidParams,
                        e.to_string(),
                    ));
                    continue;
                }
            };

            let groups: Vec<ResolvedGroup> = item.groups.into_iter().map(|g| self.enrich(g)).collect();
            let subject = groups[0].subject().to_string();
            let slot = match self.policy {
                MergePolicy::PerRequest => MergeSlot::Request(item.index),
                MergePolicy::ExtractorMarked => match &item.request.combine_key {
                    Some(key) => MergeSlot::Marked(key.clone()),
                    None => MergeSlot::Request(item.index),
                },
                MergePolicy::BySubject => MergeSlot::Shared,
            };
            let key = (task_type, subject.clone(), slot);

            match index.get(&key) {
                Some(&position) => {
                    let task = &mut outcome.tasks[position];
                    for group in groups {
                        push_merged(&mut task.chapter_groups, group);
                    }
                    task.source_requests.push(item.index);
                    debug!(
                        request = item.index,
                        task = position,
                        "Request merged into existing task"
                    );
                }
                None => {
                    index.insert(key, outcome.tasks.len());
                    let mut chapter_groups = Vec::with_capacity(groups.len());
                    for group in groups {
                        push_merged(&mut chapter_groups, group);
                    }
                    outcome.tasks.push(CombinedTask {
                        subject,
                        chapter_groups,
                        params,
                        source_requests: vec![item.index],
                    });
                }
            }
        }

        info!(
            policy = %self.policy,
            tasks = outcome.tasks.len(),
            skipped = outcome.diagnostics.len(),
            "Aggregation complete"
        );
        outcome
    }

    /// Spell out implicit selections from the tree
    ///
    /// A chapter-only group lists every concept of the chapter; a concept
    /// without a subconcept selection gets the tree's full list.
    fn enrich(&self, group: ResolvedGroup) -> ResolvedGroup {
        let Some(chapter) = self.tree.find_chapter(group.subject(), group.chapter()) else {
            return group;
        };

        let mut enriched = ResolvedGroup::new(group.subject(), group.chapter());
        if group.is_chapter_only() {
            for concept in &chapter.concepts {
                enriched.add_concept(concept.name.clone(), concept.subconcepts.clone());
            }
            return enriched;
        }

        for concept in group.concepts() {
            let subconcepts = if group.has_subconcept_selection(concept) {
                group.subconcepts_of(concept).to_vec()
            } else {
                chapter
                    .concept(concept)
                    .map(|c| c.subconcepts.clone())
                    .unwrap_or_default()
            };
            enriched.add_concept(concept.clone(), subconcepts);
        }
        enriched
    }
}
