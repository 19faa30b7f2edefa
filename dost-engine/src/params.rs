//! Typed task parameters
//!
//! Request parameters arrive as a free JSON map. After the expected fields are
//! filled from the [`ParamSpecTable`], the remaining table defaults are laid
//! under the map and the result is decoded into the struct for the task type.
//! Builders only ever see complete, validated parameters.

use dost_common::{ParamSpecTable, TaskType};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};

/// Question difficulty; accepted case-insensitively
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Upper-case level string used by practice payloads
    pub fn level(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "moderate" => Ok(Difficulty::Medium),
            "hard" | "difficult" => Ok(Difficulty::Hard),
            other => Err(de::Error::custom(format!("unknown difficulty '{}'", other))),
        }
    }
}

/// Number of questions per question type in an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTypeSplit {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub scq: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub mcq: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub integer_question: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub passage_question: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub match_question: u32,
}

impl Default for QuestionTypeSplit {
    fn default() -> Self {
        Self {
            scq: 20,
            mcq: 10,
            integer_question: 5,
            passage_question: 0,
            match_question: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentParams {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub type_split: QuestionTypeSplit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParams {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_duration", deserialize_with = "lenient_u32")]
    pub duration_minutes: u32,
    #[serde(default = "default_paper_pattern", rename = "paperPattern")]
    pub paper_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionParams {
    #[serde(default = "default_alloted_day", deserialize_with = "lenient_u32")]
    pub alloted_day: u32,
    #[serde(default = "one", deserialize_with = "lenient_u32")]
    pub alloted_time: u32,
    #[serde(default = "one", deserialize_with = "lenient_u32")]
    pub strategy: u32,
    #[serde(default = "default_time_per_portion", deserialize_with = "lenient_u32")]
    pub daywise_time_per_portion: u32,
    #[serde(default = "default_revision_task_types")]
    pub task_types: Vec<String>,
    /// Concept name → importance label
    #[serde(default)]
    pub importance: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickingParams {
    #[serde(default = "default_total_questions", deserialize_with = "lenient_u32")]
    pub total_questions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedRaceParams {
    #[serde(default = "default_rank", deserialize_with = "lenient_u32")]
    pub rank: u32,
    #[serde(default = "default_opponent")]
    pub opponent_type: String,
    #[serde(default)]
    pub scheduled_time: String,
    #[serde(default)]
    pub duration: String,
}

/// Complete parameters for one task, one variant per task type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TaskParams {
    PracticeAssignment(AssignmentParams),
    PracticeTest(TestParams),
    Formula,
    Revision(RevisionParams),
    Concept,
    ClickingPower(ClickingParams),
    PickingPower,
    SpeedRace(SpeedRaceParams),
}

fn default_duration() -> u32 {
    60
}

fn default_paper_pattern() -> String {
    "Mains".to_string()
}

fn default_alloted_day() -> u32 {
    3
}

fn one() -> u32 {
    1
}

fn default_time_per_portion() -> u32 {
    60
}

fn default_revision_task_types() -> Vec<String> {
    vec!["assignment".to_string(), "test".to_string()]
}

fn default_total_questions() -> u32 {
    10
}

fn default_rank() -> u32 {
    100
}

fn default_opponent() -> String {
    "bot".to_string()
}

/// Accept `60`, `60.0` or `"60"`
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberLike {
        Int(u64),
        Float(f64),
        Text(String),
    }

    let value = match NumberLike::deserialize(deserializer)? {
        NumberLike::Int(n) => n,
        NumberLike::Float(f) if f >= 0.0 && f.fract() == 0.0 => f as u64,
        NumberLike::Float(f) => {
            return Err(de::Error::custom(format!("expected a whole number, got {}", f)))
        }
        NumberLike::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got '{}'", s)))?,
    };
    u32::try_from(value).map_err(|_| de::Error::custom(format!("{} is out of range", value)))
}

/// snake_case spellings accepted for camelCase parameter names
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("alloted_day", "allotedDay"),
    ("alloted_time", "allotedTime"),
    ("daywise_time_per_portion", "daywiseTimePerPortion"),
    ("task_types", "taskTypes"),
    ("total_questions", "totalQuestions"),
    ("opponent_type", "opponentType"),
    ("scheduled_time", "scheduledTime"),
    ("paper_pattern", "paperPattern"),
];

/// Rename alias keys to their canonical names; a canonical key already present wins
fn canonicalize_keys(params: &mut Map<String, Value>) {
    for (alias, canonical) in FIELD_ALIASES {
        if let Some(value) = params.remove(*alias) {
            if !params.contains_key(*canonical) {
                params.insert(canonical.to_string(), value);
            }
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(task_type: TaskType, params: Map<String, Value>) -> EngineResult<T> {
    serde_json::from_value(Value::Object(params))
        .map_err(|e| EngineError::InvalidParams(format!("{}: {}", task_type, e)))
}

impl TaskParams {
    /// Decode complete parameters for `task_type`
    ///
    /// snake_case aliases (`alloted_day`, `total_questions`, ...) are renamed
    /// to their canonical keys. Expected fields are filled first (see [`ParamSpecTable::apply`]); table
    /// defaults for every other absent field follow; explicit `null`s count as
    /// absent. Unknown fields are ignored.
    ///
    /// # Returns
    /// The typed parameters and the names of the expected fields that were filled
    ///
    /// # Errors
    /// [`EngineError::InvalidParams`] when a value has the wrong type or violates
    /// a range constraint (`allotedDay ≥ 1`, `duration_minutes ≥ 1`).
    pub fn resolve(
        task_type: TaskType,
        extra_params: &Map<String, Value>,
        table: &ParamSpecTable,
    ) -> EngineResult<(Self, Vec<String>)> {
        let mut params: Map<String, Value> = extra_params
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        canonicalize_keys(&mut params);
        let filled = table.apply(task_type, &mut params);
        for (field, default) in &table.get(task_type).defaults {
            if !params.contains_key(field) && !default.is_null() {
                params.insert(field.clone(), default.clone());
            }
        }

        let typed = match task_type {
            TaskType::PracticeAssignment => TaskParams::PracticeAssignment(decode(task_type, params)?),
            TaskType::PracticeTest => {
                let test: TestParams = decode(task_type, params)?;
                if test.duration_minutes == 0 {
                    return Err(EngineError::InvalidParams(
                        "practiceTest: duration_minutes must be at least 1".to_string(),
                    ));
                }
                TaskParams::PracticeTest(test)
            }
            TaskType::Formula => TaskParams::Formula,
            TaskType::Revision => {
                let revision: RevisionParams = decode(task_type, params)?;
                if revision.alloted_day == 0 {
                    return Err(EngineError::InvalidParams(
                        "revision: allotedDay must be at least 1".to_string(),
                    ));
                }
                TaskParams::Revision(revision)
            }
            TaskType::Concept => TaskParams::Concept,
            TaskType::ClickingPower => TaskParams::ClickingPower(decode(task_type, params)?),
            TaskType::PickingPower => TaskParams::PickingPower,
            TaskType::SpeedRace => TaskParams::SpeedRace(decode(task_type, params)?),
        };
        Ok((typed, filled))
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            TaskParams::PracticeAssignment(_) => TaskType::PracticeAssignment,
            TaskParams::PracticeTest(_) => TaskType::PracticeTest,
            TaskParams::Formula => TaskType::Formula,
            TaskParams::Revision(_) => TaskType::Revision,
            TaskParams::Concept => TaskType::Concept,
            TaskParams::ClickingPower(_) => TaskType::ClickingPower,
            TaskParams::PickingPower => TaskType::PickingPower,
            TaskParams::SpeedRace(_) => TaskType::SpeedRace,
        }
    }
}
