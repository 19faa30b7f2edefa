//! Payload synthesis
//!
//! Routes each [`CombinedTask`] to the builder for its task type. Every
//! builder emits the exact record the resource-creation API expects; the
//! record is tagged with `bulkRequestType`.
//!
//! | type | builder | output |
//! |---|---|---|
//! | practiceAssignment | [`practice::build_assignment`] | single |
//! | practiceTest | [`practice::build_test`] | single |
//! | formula | [`formula::build_formula`] | single |
//! | revision | [`revision::build_revision`] | single |
//! | concept | [`concept::build_concept`] | single |
//! | clickingPower, pickingPower, speedRace | [`speed`] | one per chapter |
//!
//! A builder that finds nothing usable in its groups returns no payload
//! rather than an empty or malformed record.

pub mod concept;
pub mod formula;
pub mod practice;
pub mod revision;
pub mod speed;

use dost_common::{CurriculumTree, TaskType};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::params::TaskParams;
use crate::types::{CombinedTask, ResolvedGroup};

pub use concept::ConceptPayload;
pub use formula::FormulaPayload;
pub use practice::{AssignmentPayload, PortionEntry, TestPayload};
pub use revision::RevisionPayload;
pub use speed::{ClickingPayload, PickingPayload, SpeedRacePayload};

/// One creation record for the resource API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "bulkRequestType", rename_all = "camelCase")]
pub enum Payload {
    PracticeAssignment(AssignmentPayload),
    PracticeTest(TestPayload),
    Formula(FormulaPayload),
    Revision(RevisionPayload),
    Concept(ConceptPayload),
    ClickingPower(ClickingPayload),
    PickingPower(PickingPayload),
    SpeedRace(SpeedRacePayload),
}

impl Payload {
    pub fn task_type(&self) -> TaskType {
        match self {
            Payload::PracticeAssignment(_) => TaskType::PracticeAssignment,
            Payload::PracticeTest(_) => TaskType::PracticeTest,
            Payload::Formula(_) => TaskType::Formula,
            Payload::Revision(_) => TaskType::Revision,
            Payload::Concept(_) => TaskType::Concept,
            Payload::ClickingPower(_) => TaskType::ClickingPower,
            Payload::PickingPower(_) => TaskType::PickingPower,
            Payload::SpeedRace(_) => TaskType::SpeedRace,
        }
    }

    /// Human-readable label for logs and dispatch reports
    pub fn label(&self) -> String {
        match self {
            Payload::PracticeAssignment(p) => p.title.clone(),
            Payload::PracticeTest(p) => p.title.clone(),
            Payload::Formula(p) => p.title.clone(),
            Payload::Revision(p) => p.title.clone(),
            Payload::Concept(p) => p.meta.chapter.clone(),
            Payload::ClickingPower(p) => p.chapters.join(" + "),
            Payload::PickingPower(p) => p.chapter.clone(),
            Payload::SpeedRace(p) => p.chapters.join(" + "),
        }
    }
}

/// Result of synthesizing one combined task
///
/// Serializes as `null`, the payload itself, or `{"requestList": [...]}`.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutput {
    Empty,
    Single(Payload),
    Many(Vec<Payload>),
}

impl BuildOutput {
    pub fn from_payloads(mut payloads: Vec<Payload>) -> Self {
        match payloads.len() {
            0 => BuildOutput::Empty,
            1 => BuildOutput::Single(payloads.remove(0)),
            _ => BuildOutput::Many(payloads),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BuildOutput::Empty)
    }

    pub fn into_payloads(self) -> Vec<Payload> {
        match self {
            BuildOutput::Empty => Vec::new(),
            BuildOutput::Single(payload) => vec![payload],
            BuildOutput::Many(payloads) => payloads,
        }
    }
}

impl From<Option<Payload>> for BuildOutput {
    fn from(payload: Option<Payload>) -> Self {
        match payload {
            Some(p) => BuildOutput::Single(p),
            None => BuildOutput::Empty,
        }
    }
}

impl Serialize for BuildOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BuildOutput::Empty => serializer.serialize_none(),
            BuildOutput::Single(payload) => payload.serialize(serializer),
            BuildOutput::Many(payloads) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("requestList", payloads)?;
                map.end()
            }
        }
    }
}

/// Read-only inputs shared by all builders
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub tree: &'a CurriculumTree,
    pub student_id: Option<&'a str>,
}

impl BuildContext<'_> {
    fn user(&self) -> Option<String> {
        self.student_id.map(str::to_string)
    }
}

/// Unique chapter names in first-seen order, joined with " + "
pub fn chapter_title(groups: &[ResolvedGroup]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for group in groups {
        if !seen.contains(&group.chapter()) {
            seen.push(group.chapter());
        }
    }
    seen.join(" + ")
}

/// Routes combined tasks to their builders
pub struct PayloadSynthesizer {
    tree: Arc<CurriculumTree>,
    student_id: Option<String>,
}

impl PayloadSynthesizer {
    pub fn new(tree: Arc<CurriculumTree>, student_id: Option<String>) -> Self {
        Self { tree, student_id }
    }

    pub fn synthesize(&self, task: &CombinedTask) -> BuildOutput {
        let groups = &task.chapter_groups;
        if groups.is_empty() {
            warn!(task_type = %task.task_type(), "Combined task has no chapter groups");
            return BuildOutput::Empty;
        }

        let ctx = BuildContext {
            tree: &self.tree,
            student_id: self.student_id.as_deref(),
        };

        let output = match &task.params {
            TaskParams::PracticeAssignment(params) => {
                practice::build_assignment(&ctx, groups, params).map(Payload::PracticeAssignment).into()
            }
            TaskParams::PracticeTest(params) => {
                practice::build_test(&ctx, groups, params).map(Payload::PracticeTest).into()
            }
            TaskParams::Formula => formula::build_formula(&ctx, groups).map(Payload::Formula).into(),
            TaskParams::Revision(params) => {
                revision::build_revision(&ctx, groups, params).map(Payload::Revision).into()
            }
            TaskParams::Concept => concept::build_concept(&ctx, groups).map(Payload::Concept).into(),
            TaskParams::ClickingPower(params) => BuildOutput::from_payloads(
                speed::build_clicking(&ctx, groups, params)
                    .into_iter()
                    .map(Payload::ClickingPower)
                    .collect(),
            ),
            TaskParams::PickingPower => BuildOutput::from_payloads(
                speed::build_picking(&ctx, groups)
                    .into_iter()
                    .map(Payload::PickingPower)
                    .collect(),
            ),
            TaskParams::SpeedRace(params) => BuildOutput::from_payloads(
                speed::build_race(&ctx, groups, params)
                    .into_iter()
                    .map(Payload::SpeedRace)
                    .collect(),
            ),
        };

        debug!(
            task_type = %task.task_type(),
            subject = %task.subject,
            groups = groups.len(),
            empty = output.is_empty(),
            "Task synthesized"
        );
        output
    }
}
