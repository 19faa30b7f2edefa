//! Practice assignment and practice test payloads
//!
//! Both carry a practice portion: one leaf-level entry per (concept,
//! subconcept), or one entry with an empty `subConcept` for a concept that has
//! no subconcepts. Every entry is checked against the tree; a group whose
//! subject is wrong is re-homed to the subject that owns the chapter.

use serde::Serialize;
use tracing::warn;

use super::{chapter_title, BuildContext};
use crate::params::{AssignmentParams, QuestionTypeSplit, TestParams};
use crate::types::ResolvedGroup;

const SECTION_ORDER: [&str; 5] = [
    "singleQuestions",
    "multipleQuestions",
    "integerQuestions",
    "passageQuestions",
    "matchQuestions",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortionContent {
    pub subject: String,
    pub chapter: String,
    pub concept: String,
    pub sub_concept: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortionEntry {
    pub id: String,
    pub content: PortionContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub user_id: Option<String>,
    pub practice_type: String,
    pub title: String,
    #[serde(rename = "isNCERT")]
    pub is_ncert: bool,
    pub level: String,
    pub assignment_ques_count: QuestionTypeSplit,
    pub practice_portion: Vec<PortionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPayload {
    pub user_id: Option<String>,
    pub practice_type: String,
    pub title: String,
    pub paper_pattern: String,
    pub level: String,
    pub nature_of_test: String,
    pub no_of_minutes: u32,
    pub coaching_view: String,
    pub batchs: Vec<String>,
    pub section_order: Vec<String>,
    pub passage_question_limit: u32,
    #[serde(rename = "isNCERT")]
    pub is_ncert: bool,
    pub help_required: bool,
    pub is_multiple: bool,
    pub practice_portion: Vec<PortionEntry>,
}

pub fn build_assignment(
    ctx: &BuildContext<'_>,
    groups: &[ResolvedGroup],
    params: &AssignmentParams,
) -> Option<AssignmentPayload> {
    let portion = practice_portion(ctx, groups);
    if portion.is_empty() {
        warn!("Assignment portion is empty, no payload");
        return None;
    }

    Some(AssignmentPayload {
        user_id: ctx.user(),
        practice_type: "assignment".to_string(),
        title: format!("{} Assignment", chapter_title(groups)),
        is_ncert: false,
        level: params.difficulty.level().to_string(),
        assignment_ques_count: params.type_split,
        practice_portion: portion,
    })
}

pub fn build_test(
    ctx: &BuildContext<'_>,
    groups: &[ResolvedGroup],
    params: &TestParams,
) -> Option<TestPayload> {
    let portion = practice_portion(ctx, groups);
    if portion.is_empty() {
        warn!("Test portion is empty, no payload");
        return None;
    }

    Some(TestPayload {
        user_id: ctx.user(),
        practice_type: "test".to_string(),
        title: format!("{} Test", chapter_title(groups)),
        paper_pattern: params.paper_pattern.clone(),
        level: params.difficulty.level().to_string(),
        nature_of_test: "Random".to_string(),
        no_of_minutes: params.duration_minutes,
        coaching_view: "PACE".to_string(),
        batchs: Vec::new(),
        section_order: SECTION_ORDER.iter().map(|s| s.to_string()).collect(),
        passage_question_limit: 3,
        is_ncert: false,
        help_required: false,
        is_multiple: false,
        practice_portion: portion,
    })
}

/// Leaf-level portion entries for every group, validated against the tree
pub fn practice_portion(ctx: &BuildContext<'_>, groups: &[ResolvedGroup]) -> Vec<PortionEntry> {
    let tree = ctx.tree;
    let mut portion = Vec::new();

    for group in groups {
        let chapter = group.chapter();
        let subject = if tree.has_chapter(group.subject(), chapter) {
            group.subject()
        } else {
            match tree.chapters().find(|c| c.chapter.name == chapter) {
                Some(found) => {
                    warn!(
                        chapter = %chapter,
                        from = %group.subject(),
                        to = %found.subject,
                        "Subject corrected for portion"
                    );
                    found.subject
                }
                None => {
                    warn!(subject = %group.subject(), chapter = %chapter, "Chapter not in tree, group skipped");
                    continue;
                }
            }
        };

        for concept in group.concepts() {
            if !tree.has_concept(subject, chapter, concept) {
                warn!(chapter = %chapter, concept = %concept, "Concept not in tree, skipped");
                continue;
            }

            let subconcepts = group.subconcepts_of(concept);
            if subconcepts.is_empty() {
                portion.push(entry(subject, chapter, concept, ""));
                continue;
            }
            for sub in subconcepts {
                if tree.has_subconcept(subject, chapter, concept, sub) {
                    portion.push(entry(subject, chapter, concept, sub));
                } else {
                    warn!(concept = %concept, subconcept = %sub, "Subconcept not in tree, skipped");
                }
            }
        }
    }

    portion
}

fn entry(subject: &str, chapter: &str, concept: &str, sub_concept: &str) -> PortionEntry {
    PortionEntry {
        id: String::new(),
        content: PortionContent {
            subject: subject.to_string(),
            chapter: chapter.to_string(),
            concept: concept.to_string(),
            sub_concept: sub_concept.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Difficulty;
    use dost_common::CurriculumTree;
    use serde_json::json;

    const SNAPSHOT: &str = r#"{
        "JEE": {
            "Physics": {
                "Kinematics": {"Projectile Motion": ["Time of Flight", "Horizontal Range"]},
                "Newton's Laws of Motion": {"Circular Dynamics": [], "Friction": ["Pseudo Force"]}
            },
            "Chemistry": {
                "Mole Concept": {"Stoichiometry": ["Limiting Reagent"]}
            }
        }
    }"#;

    fn tree() -> CurriculumTree {
        CurriculumTree::from_json_str(SNAPSHOT).unwrap()
    }

    #[test]
    fn test_portion_one_entry_per_subconcept() {
        let tree = tree();
        let ctx = BuildContext { tree: &tree, student_id: None };
        let groups = vec![ResolvedGroup::new("Physics", "Kinematics").with_concept(
            "Projectile Motion",
            vec!["Time of Flight".into(), "Horizontal Range".into()],
        )];

        let portion = practice_portion(&ctx, &groups);
        assert_eq!(portion.len(), 2);
        assert_eq!(portion[1].content.sub_concept, "Horizontal Range");
        assert_eq!(portion[0].id, "");
    }

    #[test]
    fn test_portion_bare_concept_has_empty_subconcept() {
        let tree = tree();
        let ctx = BuildContext { tree: &tree, student_id: None };
        let groups = vec![ResolvedGroup::new("Physics", "Newton's Laws of Motion")
            .with_concept("Circular Dynamics", vec![])];

        let portion = practice_portion(&ctx, &groups);
        assert_eq!(portion.len(), 1);
        assert_eq!(
            serde_json::to_value(&portion[0]).unwrap(),
            json!({"id": "", "content": {
                "subject": "Physics",
                "chapter": "Newton's Laws of Motion",
                "concept": "Circular Dynamics",
                "subConcept": ""
            }})
        );
    }

    #[test]
    fn test_portion_skips_unknown_and_corrects_subject() {
        let tree = tree();
        let ctx = BuildContext { tree: &tree, student_id: None };
        let groups = vec![
            ResolvedGroup::new("Physics", "Optics").with_concept("Lenses", vec![]),
            ResolvedGroup::new("Physics", "Mole Concept")
                .with_concept("Stoichiometry", vec!["Limiting Reagent".into(), "Molarity".into()]),
        ];

        let portion = practice_portion(&ctx, &groups);
        assert_eq!(portion.len(), 1);
        assert_eq!(portion[0].content.subject, "Chemistry");
        assert_eq!(portion[0].content.sub_concept, "Limiting Reagent");
    }

    #[test]
    fn test_assignment_payload_shape() {
        let tree = tree();
        let ctx = BuildContext { tree: &tree, student_id: Some("s1") };
        let groups = vec![
            ResolvedGroup::new("Physics", "Kinematics").with_concept("Projectile Motion", vec!["Time of Flight".into()]),
            ResolvedGroup::new("Physics", "Newton's Laws of Motion").with_concept("Friction", vec![]),
            ResolvedGroup::new("Physics", "Kinematics").with_concept("Projectile Motion", vec!["Horizontal Range".into()]),
        ];
        let params = AssignmentParams {
            difficulty: Difficulty::Medium,
            type_split: QuestionTypeSplit::default(),
        };

        let payload = build_assignment(&ctx, &groups, &params).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["title"], json!("Kinematics + Newton's Laws of Motion Assignment"));
        assert_eq!(value["level"], json!("MEDIUM"));
        assert_eq!(value["userId"], json!("s1"));
        assert_eq!(value["isNCERT"], json!(false));
        assert_eq!(value["assignmentQuesCount"]["integerQuestion"], json!(5));
        assert_eq!(value["practicePortion"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_test_payload_fixed_fields() {
        let tree = tree();
        let ctx = BuildContext { tree: &tree, student_id: None };
        let groups = vec![ResolvedGroup::new("Physics", "Kinematics")
            .with_concept("Projectile Motion", vec!["Time of Flight".into()])];
        let params = TestParams {
            difficulty: Difficulty::Hard,
            duration_minutes: 45,
            paper_pattern: "Advanced".to_string(),
        };

        let value = serde_json::to_value(build_test(&ctx, &groups, &params).unwrap()).unwrap();

        assert_eq!(value["title"], json!("Kinematics Test"));
        assert_eq!(value["noOfMinutes"], json!(45));
        assert_eq!(value["paperPattern"], json!("Advanced"));
        assert_eq!(value["natureOfTest"], json!("Random"));
        assert_eq!(value["coachingView"], json!("PACE"));
        assert_eq!(value["passageQuestionLimit"], json!(3));
        assert_eq!(value["sectionOrder"][0], json!("singleQuestions"));
        assert_eq!(value["sectionOrder"][4], json!("matchQuestions"));
        assert_eq!(value["batchs"], json!([]));
    }

    #[test]
    fn test_unusable_groups_give_no_payload() {
        let tree = tree();
        let ctx = BuildContext { tree: &tree, student_id: None };
        let groups = vec![ResolvedGroup::new("Physics", "Optics").with_concept("Lenses", vec![])];
        let params = AssignmentParams {
            difficulty: Difficulty::Easy,
            type_split: QuestionTypeSplit::default(),
        };
        assert!(build_assignment(&ctx, &groups, &params).is_none());
    }
}
