//! Concept basket payload

use serde::Serialize;
use uuid::Uuid;

use super::{chapter_title, BuildContext};
use crate::types::ResolvedGroup;

const LONG_URL_PREFIX: &str = "/dosts/share-concept-basket/view/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketEntry {
    pub subject: String,
    pub sub_subject: String,
    pub chapter: String,
    pub concept: String,
    pub sub_concept: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMeta {
    pub chapter: String,
    pub discription: String,
    pub concept_basket_data: Vec<BasketEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptPayload {
    pub studentid: Option<String>,
    pub shorturl: String,
    pub longurl: String,
    pub meta: ConceptMeta,
}

/// Basket of every selected (concept, subconcept); a concept without
/// subconcepts is one entry with an empty `subConcept`. Repeats are dropped.
pub fn build_concept(ctx: &BuildContext<'_>, groups: &[ResolvedGroup]) -> Option<ConceptPayload> {
    let mut basket: Vec<BasketEntry> = Vec::new();
    let mut push = |entry: BasketEntry| {
        if !basket.contains(&entry) {
            basket.push(entry);
        }
    };

    for group in groups {
        for concept in group.concepts() {
            let subconcepts = group.subconcepts_of(concept);
            if subconcepts.is_empty() {
                push(basket_entry(group, concept, ""));
            }
            for sub in subconcepts {
                push(basket_entry(group, concept, sub));
            }
        }
    }

    if basket.is_empty() {
        return None;
    }

    let shorturl = format!("cb-{}", Uuid::new_v4());
    Some(ConceptPayload {
        studentid: ctx.user(),
        longurl: format!("{}{}", LONG_URL_PREFIX, shorturl),
        shorturl,
        meta: ConceptMeta {
            chapter: chapter_title(groups),
            discription: "Concept Basket".to_string(),
            concept_basket_data: basket,
        },
    })
}

fn basket_entry(group: &ResolvedGroup, concept: &str, sub_concept: &str) -> BasketEntry {
    BasketEntry {
        subject: group.subject().to_string(),
        sub_subject: group.subject().to_string(),
        chapter: group.chapter().to_string(),
        concept: concept.to_string(),
        sub_concept: sub_concept.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dost_common::CurriculumTree;
    use serde_json::json;

    #[test]
    fn test_basket_deduplicates_and_links_urls() {
        let tree = CurriculumTree::from_json_str(r#"{"JEE": {"Physics": {}}}"#).unwrap();
        let ctx = BuildContext { tree: &tree, student_id: Some("s1") };
        let groups = vec![
            ResolvedGroup::new("Physics", "Gravitation").with_concept("Kepler's Laws", vec![]),
            ResolvedGroup::new("Physics", "Newton's Laws of Motion")
                .with_concept("Friction", vec!["Pseudo Force".into()]),
            ResolvedGroup::new("Physics", "Gravitation").with_concept("Kepler's Laws", vec![]),
        ];

        let payload = build_concept(&ctx, &groups).unwrap();

        assert!(payload.shorturl.starts_with("cb-"));
        assert_eq!(payload.longurl, format!("/dosts/share-concept-basket/view/{}", payload.shorturl));
        assert_eq!(payload.meta.chapter, "Gravitation + Newton's Laws of Motion");
        assert_eq!(payload.meta.concept_basket_data.len(), 2);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["meta"]["discription"], json!("Concept Basket"));
        assert_eq!(
            value["meta"]["conceptBasketData"][1],
            json!({
                "subject": "Physics",
                "subSubject": "Physics",
                "chapter": "Newton's Laws of Motion",
                "concept": "Friction",
                "subConcept": "Pseudo Force"
            })
        );
    }

    #[test]
    fn test_empty_basket_no_payload() {
        let tree = CurriculumTree::from_json_str(r#"{"JEE": {"Physics": {}}}"#).unwrap();
        let ctx = BuildContext { tree: &tree, student_id: None };
        assert!(build_concept(&ctx, &[ResolvedGroup::new("Physics", "Gravitation")]).is_none());
    }
}
