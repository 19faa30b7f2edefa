//! Per-type parameter specification table
//!
//! Single source of truth for which parameters each task type expects and
//! what value each takes when the upstream extractor leaves it out.
//!
//! # Usage
//!
//! ```rust
//! use dost_common::{ParamSpecTable, TaskType};
//! use serde_json::{json, Map};
//!
//! let table = ParamSpecTable::builtin();
//! let mut params = Map::new();
//! params.insert("difficulty".into(), json!("hard"));
//!
//! let filled = table.apply(TaskType::PracticeTest, &mut params);
//! assert_eq!(filled, vec!["duration_minutes".to_string()]);
//! assert_eq!(params["duration_minutes"], json!(60));
//! ```
//!
//! The table is built once at startup (built-in values, optionally overridden
//! from the TOML `[params.<taskType>]` tables) and never changes afterwards.

use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::{Error, Result, TaskType};

/// Expected fields and default values for one task type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSpec {
    /// Fields the extractor is expected to supply (filled from defaults when missing)
    pub expected_fields: Vec<String>,
    /// Default values, including for fields that are not expected
    pub defaults: Map<String, Value>,
}

/// Parameter specifications for every task type
#[derive(Debug, Clone)]
pub struct ParamSpecTable {
    specs: HashMap<TaskType, ParamSpec>,
}

fn spec(expected: &[&str], defaults: Value) -> ParamSpec {
    ParamSpec {
        expected_fields: expected.iter().map(|f| f.to_string()).collect(),
        defaults: match defaults {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

impl ParamSpecTable {
    /// Built-in table
    pub fn builtin() -> Self {
        let mut specs = HashMap::new();

        specs.insert(
            TaskType::PracticeAssignment,
            spec(
                &["difficulty", "type_split"],
                json!({
                    "difficulty": "easy",
                    "type_split": {
                        "scq": 20,
                        "mcq": 10,
                        "integerQuestion": 5,
                        "passageQuestion": 0,
                        "matchQuestion": 0
                    }
                }),
            ),
        );
        specs.insert(
            TaskType::PracticeTest,
            spec(
                &["difficulty", "duration_minutes"],
                json!({ "difficulty": "easy", "duration_minutes": 60 }),
            ),
        );
        specs.insert(TaskType::Formula, spec(&[], json!({})));
        specs.insert(
            TaskType::Revision,
            spec(
                &[],
                json!({
                    "allotedDay": 3,
                    "allotedTime": 1,
                    "strategy": 1,
                    "daywiseTimePerPortion": 60,
                    "taskTypes": ["assignment", "test"],
                    "importance": null
                }),
            ),
        );
        specs.insert(TaskType::ClickingPower, spec(&[], json!({ "totalQuestions": 10 })));
        specs.insert(TaskType::PickingPower, spec(&[], json!({})));
        specs.insert(
            TaskType::SpeedRace,
            spec(
                &["rank"],
                json!({
                    "rank": 100,
                    "opponentType": "bot",
                    "scheduledTime": "",
                    "duration": ""
                }),
            ),
        );
        specs.insert(TaskType::Concept, spec(&[], json!({})));

        Self { specs }
    }

    /// Replace default values from `[params.<taskType>]` TOML tables
    ///
    /// # Errors
    /// [`Error::Config`] for an unknown task type key or a value that cannot be
    /// represented as JSON.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, toml::Table>) -> Result<Self> {
        for (type_name, table) in overrides {
            let task_type: TaskType = type_name
                .parse()
                .map_err(|_| Error::Config(format!("Unknown task type in [params]: {}", type_name)))?;

            let spec = self.specs.entry(task_type).or_default();
            for (field, value) in table {
                let value = serde_json::to_value(value).map_err(|e| {
                    Error::Config(format!("Invalid value for params.{}.{}: {}", type_name, field, e))
                })?;
                debug!(task_type = %task_type, field = %field, "Parameter default overridden");
                spec.defaults.insert(field.clone(), value);
            }
        }
        Ok(self)
    }

    pub fn get(&self, task_type: TaskType) -> &ParamSpec {
        // builtin() covers every TaskType; with_overrides only adds
        &self.specs[&task_type]
    }

    /// Fill every missing expected field from the defaults
    ///
    /// A field present with an explicit `null` counts as missing.
    ///
    /// # Returns
    /// Names of the fields that were filled, in expected-field order
    pub fn apply(&self, task_type: TaskType, params: &mut Map<String, Value>) -> Vec<String> {
        let spec = self.get(task_type);
        let mut filled = Vec::new();

        for field in &spec.expected_fields {
            let missing = params.get(field).map_or(true, Value::is_null);
            if missing {
                let default = spec.defaults.get(field).cloned().unwrap_or(Value::Null);
                params.insert(field.clone(), default);
                filled.push(field.clone());
            }
        }

        filled
    }
}

impl Default for ParamSpecTable {
    fn default() -> Self {
        Self::builtin()
    }
}
