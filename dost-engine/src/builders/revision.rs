//! Revision plan payload
//!
//! One portion item per concept, spread over `allotedDay` days. Days before
//! the last get `max(1, items / days)` items each in input order, and the last
//! day takes whatever remains. Slices clamp to the items available, so with
//! fewer items than days the trailing days are empty.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use super::{chapter_title, BuildContext};
use crate::params::RevisionParams;
use crate::types::ResolvedGroup;

const AREA: &str = "Red";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskEntry {
    #[serde(rename = "type")]
    pub task_type: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakEntry {
    pub subject: String,
    pub chapter: String,
    pub concept: String,
    pub sub_concept: String,
    pub area: String,
    pub importance: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionItem {
    pub subject: String,
    pub chapter: String,
    pub concept: String,
    pub importance: Option<Value>,
    pub ratio: Option<f64>,
    pub area: String,
    pub time: u32,
    pub star: u32,
    pub task: Vec<TaskEntry>,
    pub impratio: u32,
    pub weak_data: Vec<WeakEntry>,
}

/// Items per day; serializes as `{"day1": {"portion": [...]}, ...}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DaywisePortion(pub Vec<Vec<RevisionItem>>);

impl DaywisePortion {
    pub fn days(&self) -> &[Vec<RevisionItem>] {
        &self.0
    }
}

#[derive(Serialize)]
struct DayEntry<'a> {
    portion: &'a [RevisionItem],
}

impl Serialize for DaywisePortion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, portion) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("day{}", i + 1), &DayEntry { portion })?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionPayload {
    pub user_id: Option<String>,
    pub title: String,
    pub alloted_day: u32,
    pub alloted_time: u32,
    pub strategy: u32,
    pub daywise_portion: DaywisePortion,
}

pub fn build_revision(
    ctx: &BuildContext<'_>,
    groups: &[ResolvedGroup],
    params: &RevisionParams,
) -> Option<RevisionPayload> {
    let items: Vec<RevisionItem> = groups
        .iter()
        .flat_map(|group| group.concepts().iter().map(move |concept| revision_item(group, concept, params)))
        .collect();

    if items.is_empty() {
        return None;
    }

    Some(RevisionPayload {
        user_id: ctx.user(),
        title: format!("{} Revision Plan", chapter_title(groups)),
        alloted_day: params.alloted_day,
        alloted_time: params.alloted_time,
        strategy: params.strategy,
        daywise_portion: DaywisePortion(bucket_by_day(items, params.alloted_day)),
    })
}

/// Split items into `days` buckets (at least one)
pub fn bucket_by_day<T>(items: Vec<T>, days: u32) -> Vec<Vec<T>> {
    let days = days.max(1) as usize;
    let per_day = (items.len() / days).max(1);

    let mut remaining = items.into_iter();
    let mut buckets = Vec::with_capacity(days);
    for day in 1..=days {
        let bucket: Vec<T> = if day == days {
            remaining.by_ref().collect()
        } else {
            remaining.by_ref().take(per_day).collect()
        };
        buckets.push(bucket);
    }
    buckets
}

fn revision_item(group: &ResolvedGroup, concept: &str, params: &RevisionParams) -> RevisionItem {
    let importance = params
        .importance
        .as_ref()
        .and_then(|map| map.get(concept))
        .filter(|v| !v.is_null())
        .cloned();

    let weak = |sub_concept: &str| WeakEntry {
        subject: group.subject().to_string(),
        chapter: group.chapter().to_string(),
        concept: concept.to_string(),
        sub_concept: sub_concept.to_string(),
        area: AREA.to_string(),
        importance: importance.clone(),
    };

    let subconcepts = group.subconcepts_of(concept);
    let weak_data = if subconcepts.is_empty() {
        vec![weak("")]
    } else {
        subconcepts.iter().map(|s| weak(s)).collect()
    };

    RevisionItem {
        subject: group.subject().to_string(),
        chapter: group.chapter().to_string(),
        concept: concept.to_string(),
        importance,
        ratio: None,
        area: AREA.to_string(),
        time: params.daywise_time_per_portion,
        star: 1,
        task: params
            .task_types
            .iter()
            .map(|t| TaskEntry {
                task_type: t.clone(),
                completed: false,
            })
            .collect(),
        impratio: 3,
        weak_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dost_common::CurriculumTree;
    use serde_json::json;

    fn sizes(buckets: &[Vec<u32>]) -> Vec<usize> {
        buckets.iter().map(Vec::len).collect()
    }

    fn params(days: u32) -> RevisionParams {
        serde_json::from_value(json!({
            "allotedDay": days,
            "importance": {"Friction": "High"}
        }))
        .unwrap()
    }

    #[test]
    fn test_last_day_takes_remainder() {
        let buckets = bucket_by_day((0..10).collect(), 3);
        assert_eq!(sizes(&buckets), vec![3, 3, 4]);
        assert_eq!(buckets[2], vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_fewer_items_than_days_leaves_trailing_days_empty() {
        let buckets = bucket_by_day(vec![1, 2], 5);
        assert_eq!(sizes(&buckets), vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_zero_days_treated_as_one() {
        assert_eq!(sizes(&bucket_by_day(vec![1, 2, 3], 0)), vec![3]);
    }

    #[test]
    fn test_revision_payload_shape() {
        let tree = CurriculumTree::from_json_str(r#"{"JEE": {"Physics": {}}}"#).unwrap();
        let ctx = BuildContext { tree: &tree, student_id: Some("s1") };
        let groups = vec![ResolvedGroup::new("Physics", "Newton's Laws of Motion")
            .with_concept("Friction", vec!["Pseudo Force".into(), "Angle of Repose".into()])
            .with_concept("Circular Dynamics", vec![])];

        let payload = build_revision(&ctx, &groups, &params(2)).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["title"], json!("Newton's Laws of Motion Revision Plan"));
        assert_eq!(value["allotedDay"], json!(2));
        let day1 = &value["daywisePortion"]["day1"]["portion"][0];
        assert_eq!(day1["concept"], json!("Friction"));
        assert_eq!(day1["importance"], json!("High"));
        assert_eq!(day1["ratio"], json!(null));
        assert_eq!(day1["area"], json!("Red"));
        assert_eq!(day1["time"], json!(60));
        assert_eq!(day1["impratio"], json!(3));
        assert_eq!(day1["task"], json!([
            {"type": "assignment", "completed": false},
            {"type": "test", "completed": false}
        ]));
        assert_eq!(day1["weakData"].as_array().unwrap().len(), 2);

        let day2 = &value["daywisePortion"]["day2"]["portion"][0];
        assert_eq!(day2["importance"], json!(null));
        assert_eq!(day2["weakData"][0]["subConcept"], json!(""));
    }

    #[test]
    fn test_day_keys_in_order() {
        let tree = CurriculumTree::from_json_str(r#"{"JEE": {"Physics": {}}}"#).unwrap();
        let ctx = BuildContext { tree: &tree, student_id: None };
        let groups = vec![ResolvedGroup::new("Physics", "Gravitation").with_concept("Kepler's Laws", vec![])];

        let value = serde_json::to_value(build_revision(&ctx, &groups, &params(3)).unwrap()).unwrap();
        let keys: Vec<&String> = value["daywisePortion"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["day1", "day2", "day3"]);
    }
}
