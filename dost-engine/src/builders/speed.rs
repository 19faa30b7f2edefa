//! Per-chapter payloads: clicking power, picking power and speed race
//!
//! These types fan out to one payload per distinct (subject, chapter), so
//! concept and subconcept selections play no part.

use serde::{Serialize, Serializer};

use super::BuildContext;
use crate::params::{ClickingParams, SpeedRaceParams};
use crate::types::ResolvedGroup;

const RACE_QUESTIONS: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickingPayload {
    pub user: Option<String>,
    pub chapters: Vec<String>,
    pub subject: String,
    /// Sent as a string by the resource API convention
    #[serde(serialize_with = "as_string")]
    pub total_questions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickingPayload {
    pub user: Option<String>,
    pub chapter: String,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedRacePayload {
    pub subject: String,
    pub chapters: Vec<String>,
    pub total_questions: u32,
    pub scheduled_time: String,
    pub duration: String,
    pub opponent_type: String,
    pub rank: u32,
    pub user: Option<String>,
}

pub fn build_clicking(
    ctx: &BuildContext<'_>,
    groups: &[ResolvedGroup],
    params: &ClickingParams,
) -> Vec<ClickingPayload> {
    distinct_chapters(groups)
        .into_iter()
        .map(|(subject, chapter)| ClickingPayload {
            user: ctx.user(),
            chapters: vec![chapter.to_string()],
            subject: subject.to_string(),
            total_questions: params.total_questions,
        })
        .collect()
}

pub fn build_picking(ctx: &BuildContext<'_>, groups: &[ResolvedGroup]) -> Vec<PickingPayload> {
    distinct_chapters(groups)
        .into_iter()
        .map(|(subject, chapter)| PickingPayload {
            user: ctx.user(),
            chapter: chapter.to_string(),
            subject: subject.to_string(),
        })
        .collect()
}

pub fn build_race(
    ctx: &BuildContext<'_>,
    groups: &[ResolvedGroup],
    params: &SpeedRaceParams,
) -> Vec<SpeedRacePayload> {
    distinct_chapters(groups)
        .into_iter()
        .map(|(subject, chapter)| SpeedRacePayload {
            subject: subject.to_string(),
            chapters: vec![chapter.to_string()],
            total_questions: RACE_QUESTIONS,
            scheduled_time: params.scheduled_time.clone(),
            duration: params.duration.clone(),
            opponent_type: params.opponent_type.clone(),
            rank: params.rank,
            user: ctx.user(),
        })
        .collect()
}

fn distinct_chapters(groups: &[ResolvedGroup]) -> Vec<(&str, &str)> {
    let mut seen: Vec<(&str, &str)> = Vec::new();
    for group in groups {
        let key = (group.subject(), group.chapter());
        if !seen.contains(&key) {
            seen.push(key);
        }
    }
    seen
}

fn as_string<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
