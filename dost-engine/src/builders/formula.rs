//! Formula sheet payload
//!
//! One cart item per selected subconcept. A concept with no subconcepts
//! contributes a single item whose text is the concept name.

use serde::Serialize;
use uuid::Uuid;

use super::{chapter_title, BuildContext};
use crate::types::ResolvedGroup;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaContent {
    pub subject: String,
    pub chapter: String,
    pub concept: String,
    pub sub_concept: String,
    pub text: String,
    pub selected: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaCartItem {
    pub id: String,
    pub content: FormulaContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaPayload {
    pub studentid: Option<String>,
    pub title: String,
    #[serde(rename = "formulaCart")]
    pub formula_cart: Vec<FormulaCartItem>,
}

pub fn build_formula(ctx: &BuildContext<'_>, groups: &[ResolvedGroup]) -> Option<FormulaPayload> {
    let mut cart = Vec::new();

    for group in groups {
        for concept in group.concepts() {
            let subconcepts = group.subconcepts_of(concept);
            if subconcepts.is_empty() {
                cart.push(cart_item(group, concept, "", concept));
            } else {
                for sub in subconcepts {
                    cart.push(cart_item(group, concept, sub, sub));
                }
            }
        }
    }

    if cart.is_empty() {
        return None;
    }

    Some(FormulaPayload {
        studentid: ctx.user(),
        title: format!("{} Formula Sheet", chapter_title(groups)),
        formula_cart: cart,
    })
}

fn cart_item(group: &ResolvedGroup, concept: &str, sub_concept: &str, text: &str) -> FormulaCartItem {
    FormulaCartItem {
        id: Uuid::new_v4().to_string(),
        content: FormulaContent {
            subject: group.subject().to_string(),
            chapter: group.chapter().to_string(),
            concept: concept.to_string(),
            sub_concept: sub_concept.to_string(),
            text: text.to_string(),
            selected: true,
            disabled: false,
        },
    }
}
