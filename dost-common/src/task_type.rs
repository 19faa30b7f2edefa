//! Task type catalogue
//!
//! Every learning resource the engine can build is one of eight task types,
//! grouped into five product families. Wire names are camelCase
//! (`practiceAssignment`, `speedRace`, ...) and are shared by the request
//! records, the parameter table and the output payload tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Kind of learning resource requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskType {
    PracticeAssignment,
    PracticeTest,
    Formula,
    Revision,
    Concept,
    ClickingPower,
    PickingPower,
    SpeedRace,
}

/// Product family a task type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskFamily {
    Concept,
    Revision,
    Formula,
    Practice,
    SpeedBooster,
}

impl TaskType {
    /// All task types, in catalogue order
    pub const ALL: [TaskType; 8] = [
        TaskType::PracticeAssignment,
        TaskType::PracticeTest,
        TaskType::Formula,
        TaskType::Revision,
        TaskType::Concept,
        TaskType::ClickingPower,
        TaskType::PickingPower,
        TaskType::SpeedRace,
    ];

    /// Wire name (`practiceAssignment`, `speedRace`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::PracticeAssignment => "practiceAssignment",
            TaskType::PracticeTest => "practiceTest",
            TaskType::Formula => "formula",
            TaskType::Revision => "revision",
            TaskType::Concept => "concept",
            TaskType::ClickingPower => "clickingPower",
            TaskType::PickingPower => "pickingPower",
            TaskType::SpeedRace => "speedRace",
        }
    }

    pub fn family(&self) -> TaskFamily {
        match self {
            TaskType::Concept => TaskFamily::Concept,
            TaskType::Revision => TaskFamily::Revision,
            TaskType::Formula => TaskFamily::Formula,
            TaskType::PracticeAssignment | TaskType::PracticeTest => TaskFamily::Practice,
            TaskType::ClickingPower | TaskType::PickingPower | TaskType::SpeedRace => {
                TaskFamily::SpeedBooster
            }
        }
    }
}

impl TaskFamily {
    /// Display name used by the upstream extractor ("Practice Dost", ...)
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskFamily::Concept => "Concept Dost",
            TaskFamily::Revision => "Revision Dost",
            TaskFamily::Formula => "Formula Dost",
            TaskFamily::Practice => "Practice Dost",
            TaskFamily::SpeedBooster => "Speed Booster Dost",
        }
    }

    /// Task types belonging to this family
    pub fn members(&self) -> Vec<TaskType> {
        TaskType::ALL
            .iter()
            .copied()
            .filter(|t| t.family() == *self)
            .collect()
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidInput(format!("Unknown task type: {}", s)))
    }
}
