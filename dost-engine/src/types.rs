//! Request and resolution data types
//!
//! - [`RawTaskRequest`]: one task request as proposed by the upstream
//!   extractor. Names inside it are free text and may be misspelled.
//! - [`TaskHints`]: one set of free-text portion hints (subject, chapters,
//!   concepts, subconcepts). A request carries one or more.
//! - [`ResolvedGroup`]: a portion whose subject and chapter are exact tree
//!   keys, with concepts and subconcepts drawn only from that chapter.
//! - [`CombinedTask`]: resolved groups merged under one task for synthesis.
//!
//! # Request wire format
//!
//! Flat shape:
//! ```json
//! {"type": "formula", "subject": "Physics",
//!  "chapters": ["Newtons law of motion"], "concepts": ["Friction"],
//!  "subconcepts": [], "combine_key": "t1", "difficulty": "hard"}
//! ```
//!
//! Nested shape:
//! ```json
//! {"type": "revision", "subject": "Physics", "allotedDay": 4,
//!  "chapter_groups": [
//!     {"chapter": "Kinematics", "concepts": ["Projectile Motion"]},
//!     {"subject": "Chemistry", "chapter": "Mole Concept"}
//!  ]}
//! ```
//!
//! Every field that is not part of the hints, `type` or `combine_key` is kept
//! verbatim in [`RawTaskRequest::extra_params`].

use dost_common::TaskType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::params::TaskParams;

/// Keys consumed from a request object as portion hints
const HINT_KEYS: [&str; 7] = [
    "subject",
    "subject_hint",
    "chapter",
    "chapters",
    "concepts",
    "subconcepts",
    "chapter_groups",
];

// ============================================================================
// Hints
// ============================================================================

/// Subconcept hints: a flat list, or lists keyed by the concept they belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubconceptHints {
    Flat(Vec<String>),
    ByConcept(BTreeMap<String, Vec<String>>),
}

impl Default for SubconceptHints {
    fn default() -> Self {
        SubconceptHints::Flat(Vec::new())
    }
}

impl SubconceptHints {
    pub fn is_empty(&self) -> bool {
        match self {
            SubconceptHints::Flat(list) => list.is_empty(),
            SubconceptHints::ByConcept(map) => map.values().all(Vec::is_empty),
        }
    }

    /// Every fragment, regardless of shape
    pub fn fragments(&self) -> Vec<&str> {
        match self {
            SubconceptHints::Flat(list) => list.iter().map(String::as_str).collect(),
            SubconceptHints::ByConcept(map) => {
                map.values().flatten().map(String::as_str).collect()
            }
        }
    }
}

/// Free-text portion hints for one group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HintsWire")]
pub struct TaskHints {
    pub subject: String,
    pub chapters: Vec<String>,
    pub concepts: Vec<String>,
    pub subconcepts: SubconceptHints,
}

impl TaskHints {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapters.push(chapter.into());
        self
    }

    pub fn concept(mut self, concept: impl Into<String>) -> Self {
        self.concepts.push(concept.into());
        self
    }

    pub fn subconcept(mut self, subconcept: impl Into<String>) -> Self {
        if let SubconceptHints::Flat(list) = &mut self.subconcepts {
            list.push(subconcept.into());
        } else {
            self.subconcepts = SubconceptHints::Flat(vec![subconcept.into()]);
        }
        self
    }

    /// Chapter-only hints for the given resolved chapters
    pub fn chapter_only(subject: &str, chapters: Vec<String>) -> Self {
        Self {
            subject: subject.to_string(),
            chapters,
            ..Default::default()
        }
    }
}

/// Lenient decoding: `chapter` or `chapters`, single strings or lists, nulls
#[derive(Deserialize)]
struct HintsWire {
    #[serde(default, alias = "subject_hint")]
    subject: Option<String>,
    #[serde(default)]
    chapter: Option<OneOrMany>,
    #[serde(default)]
    chapters: Option<OneOrMany>,
    #[serde(default)]
    concepts: Option<OneOrMany>,
    #[serde(default)]
    subconcepts: Option<SubconceptHints>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

fn clean(fragments: Vec<String>) -> Vec<String> {
    fragments
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

impl From<HintsWire> for TaskHints {
    fn from(wire: HintsWire) -> Self {
        let mut chapters = wire.chapter.map(OneOrMany::into_vec).unwrap_or_default();
        chapters.extend(wire.chapters.map(OneOrMany::into_vec).unwrap_or_default());

        Self {
            subject: wire.subject.unwrap_or_default().trim().to_string(),
            chapters: clean(chapters),
            concepts: clean(wire.concepts.map(OneOrMany::into_vec).unwrap_or_default()),
            subconcepts: match wire.subconcepts.unwrap_or_default() {
                SubconceptHints::Flat(list) => SubconceptHints::Flat(clean(list)),
                SubconceptHints::ByConcept(map) => SubconceptHints::ByConcept(
                    map.into_iter()
                        .map(|(k, v)| (k.trim().to_string(), clean(v)))
                        .collect(),
                ),
            },
        }
    }
}

// ============================================================================
// Raw request
// ============================================================================

/// One task request from the extractor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTaskRequest {
    #[serde(rename = "type")]
    pub task_type: TaskType,

    /// Request-level subject hint, inherited by groups that name none
    pub subject: String,

    /// One or more hint sets, resolved independently
    #[serde(rename = "chapter_groups")]
    pub hint_groups: Vec<TaskHints>,

    /// Requests sharing a key (and type/subject) are merged into one task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combine_key: Option<String>,

    /// Type-specific free parameters (difficulty, duration, ...)
    #[serde(flatten)]
    pub extra_params: Map<String, Value>,
}

impl RawTaskRequest {
    pub fn new(task_type: TaskType, hints: TaskHints) -> Self {
        Self {
            task_type,
            subject: hints.subject.clone(),
            hint_groups: vec![hints],
            combine_key: None,
            extra_params: Map::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: Value) -> Self {
        self.extra_params.insert(name.to_string(), value);
        self
    }

    pub fn with_combine_key(mut self, key: impl Into<String>) -> Self {
        self.combine_key = Some(key.into());
        self
    }

    /// Parse one request record
    ///
    /// # Errors
    /// [`EngineError::InvalidRequest`] when the record is not an object, has no
    /// `type` (or `dost_type`), names an unknown task type, or carries malformed hints.
    pub fn from_value(value: Value) -> EngineResult<Self> {
        let Value::Object(mut fields) = value else {
            return Err(EngineError::InvalidRequest(
                "request must be a JSON object".to_string(),
            ));
        };

        // `dost_type` is the extractor's spelling
        let dost_type = fields.remove("dost_type");
        let type_name = match fields.remove("type").or(dost_type) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(EngineError::InvalidRequest(format!(
                    "'type' must be a string, got {}",
                    other
                )))
            }
            None => return Err(EngineError::InvalidRequest("missing 'type'".to_string())),
        };
        let task_type: TaskType = type_name.parse().map_err(|_| {
            EngineError::InvalidRequest(format!("unknown task type '{}'", type_name))
        })?;

        let combine_key = match fields.remove("combine_key") {
            None | Some(Value::Null) => None,
            Some(Value::String(key)) => Some(key),
            Some(other) => Some(other.to_string()),
        };

        let mut hint_fields = Map::new();
        for key in HINT_KEYS {
            if let Some(v) = fields.remove(key) {
                hint_fields.insert(key.to_string(), v);
            }
        }
        let nested = hint_fields.remove("chapter_groups");

        let top: TaskHints = serde_json::from_value(Value::Object(hint_fields))
            .map_err(|e| EngineError::InvalidRequest(format!("malformed hints: {}", e)))?;
        let subject = top.subject.clone();

        let hint_groups = match nested {
            None | Some(Value::Null) => vec![top],
            Some(Value::Array(groups)) => {
                let mut parsed = Vec::with_capacity(groups.len());
                for group in groups {
                    let mut hints: TaskHints = serde_json::from_value(group).map_err(|e| {
                        EngineError::InvalidRequest(format!("malformed chapter group: {}", e))
                    })?;
                    if hints.subject.is_empty() {
                        hints.subject = subject.clone();
                    }
                    parsed.push(hints);
                }
                parsed
            }
            Some(other) => {
                return Err(EngineError::InvalidRequest(format!(
                    "'chapter_groups' must be a list, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            task_type,
            subject,
            hint_groups,
            combine_key,
            extra_params: fields,
        })
    }
}

impl<'de> Deserialize<'de> for RawTaskRequest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RawTaskRequest::from_value(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Resolved group
// ============================================================================

/// Portion fragment matched to exact tree entries
///
/// `concepts` keeps insertion order. A concept with a selection of
/// subconcepts has an entry in `subconcepts`; a concept without one means the
/// whole concept. An empty `concepts` list means the whole chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedGroup {
    subject: String,
    chapter: String,
    concepts: Vec<String>,
    subconcepts: BTreeMap<String, Vec<String>>,
}

impl ResolvedGroup {
    pub fn new(subject: impl Into<String>, chapter: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            chapter: chapter.into(),
            concepts: Vec::new(),
            subconcepts: BTreeMap::new(),
        }
    }

    /// Add a concept with its selected subconcepts (empty = no selection)
    ///
    /// Re-adding a concept unions the subconcept lists, keeping first-seen order.
    pub fn with_concept(mut self, concept: impl Into<String>, subconcepts: Vec<String>) -> Self {
        self.add_concept(concept.into(), subconcepts);
        self
    }

    pub fn add_concept(&mut self, concept: String, subconcepts: Vec<String>) {
        if !self.concepts.contains(&concept) {
            self.concepts.push(concept.clone());
        }
        if subconcepts.is_empty() {
            return;
        }
        let entry = self.subconcepts.entry(concept).or_default();
        for sub in subconcepts {
            if !entry.contains(&sub) {
                entry.push(sub);
            }
        }
    }

    /// Fold another group for the same chapter into this one
    pub fn merge(&mut self, other: ResolvedGroup) {
        let ResolvedGroup {
            concepts,
            mut subconcepts,
            ..
        } = other;
        for concept in concepts {
            let subs = subconcepts.remove(&concept).unwrap_or_default();
            self.add_concept(concept, subs);
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    pub fn concepts(&self) -> &[String] {
        &self.concepts
    }

    /// Selected subconcepts of `concept` (empty when none were selected)
    pub fn subconcepts_of(&self, concept: &str) -> &[String] {
        self.subconcepts
            .get(concept)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_subconcept_selection(&self, concept: &str) -> bool {
        self.subconcepts.contains_key(concept)
    }

    pub fn is_chapter_only(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn same_chapter(&self, other: &ResolvedGroup) -> bool {
        self.subject == other.subject && self.chapter == other.chapter
    }
}

/// Append `group`, merging it into an existing group for the same chapter
pub(crate) fn push_merged(groups: &mut Vec<ResolvedGroup>, group: ResolvedGroup) {
    match groups.iter_mut().find(|g| g.same_chapter(&group)) {
        Some(existing) => existing.merge(group),
        None => groups.push(group),
    }
}

// ============================================================================
// Combined task
// ============================================================================

/// One or more resolved groups destined for a single synthesis call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedTask {
    pub subject: String,
    pub chapter_groups: Vec<ResolvedGroup>,
    pub params: TaskParams,
    /// Indices of the requests merged into this task
    pub source_requests: Vec<usize>,
}

impl CombinedTask {
    pub fn task_type(&self) -> TaskType {
        self.params.task_type()
    }
}
