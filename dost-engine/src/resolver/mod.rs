//! Taxonomy resolution
//!
//! Matches free-text portion hints against the curriculum tree and returns
//! groups whose names are exact tree keys. Nothing is ever invented: a
//! fragment that matches nothing is dropped and recorded as a [`Miss`].
//!
//! # Algorithm
//!
//! 1. Each chapter fragment is ranked against every chapter of the tree at
//!    `chapter_cutoff`; fragments that fail are retried once at
//!    `relaxed_chapter_cutoff`.
//! 2. When a chapter fragment still fails (or none was given), each concept
//!    fragment is tried as a chapter name at `chapter_cutoff`. A fragment
//!    that adds a new chapter is consumed; one naming an already resolved
//!    chapter stays a concept fragment.
//! 3. When no chapter has resolved yet, concept fragments and then
//!    subconcept fragments are searched across the whole tree and the owning
//!    chapter is adopted.
//! 4. Within each resolved chapter, concept fragments are matched at
//!    `concept_cutoff` and subconcept fragments at `subconcept_cutoff`.
//!    A concept with no matched subconcepts carries its full list; a chapter
//!    whose requested concepts all failed stays chapter-only.
//!
//! Ranking is pure: every candidate is scored, the maximum at or above the
//! cutoff wins, and ties go to the hinted subject, then to tree order.

pub mod similarity;

use dost_common::config::ResolverConfig;
use dost_common::curriculum::{Chapter, ChapterRef};
use dost_common::CurriculumTree;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::types::{push_merged, ResolvedGroup, SubconceptHints, TaskHints};
use similarity::{best_match, Candidate};

/// Tree level a fragment was matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
    Chapter,
    Concept,
    Subconcept,
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchLevel::Chapter => "chapter",
            MatchLevel::Concept => "concept",
            MatchLevel::Subconcept => "subconcept",
        })
    }
}

/// A fragment that matched nothing at its level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Miss {
    pub level: MatchLevel,
    pub fragment: String,
}

/// Result of resolving one or more hint sets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub groups: Vec<ResolvedGroup>,
    pub misses: Vec<Miss>,
    /// Concept fragments left after chapter promotion
    pub concepts_requested: usize,
    pub concepts_matched: usize,
}

impl Resolution {
    /// No chapter resolved at all
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// No group, or concepts were requested and none of them resolved
    pub fn is_structurally_empty(&self) -> bool {
        self.groups.is_empty() || (self.concepts_requested > 0 && self.concepts_matched == 0)
    }

    /// Resolved chapters grouped by subject, in first-seen order
    pub fn chapters_by_subject(&self) -> Vec<(String, Vec<String>)> {
        let mut out: Vec<(String, Vec<String>)> = Vec::new();
        for group in &self.groups {
            match out.iter_mut().find(|(s, _)| s == group.subject()) {
                Some((_, chapters)) => chapters.push(group.chapter().to_string()),
                None => out.push((group.subject().to_string(), vec![group.chapter().to_string()])),
            }
        }
        out
    }

    fn absorb(&mut self, other: Resolution) {
        for group in other.groups {
            push_merged(&mut self.groups, group);
        }
        self.misses.extend(other.misses);
        self.concepts_requested += other.concepts_requested;
        self.concepts_matched += other.concepts_matched;
    }
}

/// Fuzzy matcher over a shared curriculum tree
#[derive(Debug, Clone)]
pub struct TaxonomyResolver {
    tree: Arc<CurriculumTree>,
    config: ResolverConfig,
}

impl TaxonomyResolver {
    pub fn new(tree: Arc<CurriculumTree>, config: ResolverConfig) -> Self {
        Self { tree, config }
    }

    pub fn tree(&self) -> &Arc<CurriculumTree> {
        &self.tree
    }

    /// Resolve every hint set and merge the results
    ///
    /// Groups for the same (subject, chapter) coming from different hint sets
    /// are merged into one.
    pub fn resolve_all(&self, hint_groups: &[TaskHints]) -> Resolution {
        let mut resolution = Resolution::default();
        for hints in hint_groups {
            resolution.absorb(self.resolve(hints));
        }
        resolution
    }

    /// Resolve one hint set
    pub fn resolve(&self, hints: &TaskHints) -> Resolution {
        let subject_hint = hints.subject.trim().to_lowercase();
        let mut misses = Vec::new();
        let mut chapters: Vec<ChapterRef<'_>> = Vec::new();

        // Step 1: chapter fragments, two tiers
        let mut chapter_failed = hints.chapters.is_empty();
        for fragment in &hints.chapters {
            match self.match_chapter(fragment, &subject_hint) {
                Some(found) => {
                    push_chapter(&mut chapters, found);
                }
                None => {
                    warn!(fragment = %fragment, "Chapter fragment unresolved");
                    misses.push(Miss {
                        level: MatchLevel::Chapter,
                        fragment: fragment.clone(),
                    });
                    chapter_failed = true;
                }
            }
        }

        // Step 2: concept fragments reinterpreted as chapters
        let mut promoted = vec![false; hints.concepts.len()];
        if chapter_failed {
            for (i, fragment) in hints.concepts.iter().enumerate() {
                if let Some(found) =
                    self.rank_chapters(fragment, &subject_hint, self.config.chapter_cutoff)
                {
                    debug!(
                        fragment = %fragment,
                        chapter = %found.chapter.name,
                        "Concept fragment promoted to chapter"
                    );
                    // Consumed only when it names a chapter not already resolved
                    promoted[i] = push_chapter(&mut chapters, found);
                }
            }
        }

        let concept_fragments: Vec<&str> = hints
            .concepts
            .iter()
            .zip(&promoted)
            .filter(|(_, p)| !**p)
            .map(|(c, _)| c.as_str())
            .collect();

        // Step 3: tree-wide search when nothing located a chapter
        if chapters.is_empty() {
            self.search_tree(&concept_fragments, &hints.subconcepts, &subject_hint, &mut chapters);
        }

        // Step 4: concepts and subconcepts within each chapter
        let mut concept_hits = vec![false; concept_fragments.len()];
        let sub_fragments = hints.subconcepts.fragments();
        let mut sub_hits = vec![false; sub_fragments.len()];
        let mut groups: Vec<ResolvedGroup> = Vec::new();

        for chapter in &chapters {
            let group = self.resolve_within(
                chapter,
                &concept_fragments,
                &hints.subconcepts,
                &mut concept_hits,
                &mut sub_hits,
            );
            push_merged(&mut groups, group);
        }

        for (fragment, hit) in concept_fragments.iter().zip(&concept_hits) {
            if !hit {
                misses.push(Miss {
                    level: MatchLevel::Concept,
                    fragment: fragment.to_string(),
                });
            }
        }
        for (fragment, hit) in sub_fragments.iter().zip(&sub_hits) {
            if !hit {
                misses.push(Miss {
                    level: MatchLevel::Subconcept,
                    fragment: fragment.to_string(),
                });
            }
        }

        debug!(
            subject = %hints.subject,
            groups = groups.len(),
            misses = misses.len(),
            "Hints resolved"
        );

        Resolution {
            groups,
            misses,
            concepts_requested: concept_fragments.len(),
            concepts_matched: concept_hits.iter().filter(|h| **h).count(),
        }
    }

    /// Primary tier, then the single relaxed tier
    fn match_chapter(&self, fragment: &str, subject_hint: &str) -> Option<ChapterRef<'_>> {
        if let Some(found) = self.rank_chapters(fragment, subject_hint, self.config.chapter_cutoff) {
            return Some(found);
        }
        let relaxed =
            self.rank_chapters(fragment, subject_hint, self.config.relaxed_chapter_cutoff)?;
        debug!(
            fragment = %fragment,
            chapter = %relaxed.chapter.name,
            cutoff = self.config.relaxed_chapter_cutoff,
            "Chapter matched at relaxed cutoff"
        );
        Some(relaxed)
    }

    /// Chapters reachable by (subject, name); later duplicates are shadowed
    fn chapter_candidates(&self) -> impl Iterator<Item = ChapterRef<'_>> + '_ {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        self.tree
            .chapters()
            .filter(move |c| seen.insert((c.subject, c.chapter.name.as_str())))
    }

    fn rank_chapters(&self, fragment: &str, subject_hint: &str, cutoff: f64) -> Option<ChapterRef<'_>> {
        let candidates = self.chapter_candidates().map(|c| Candidate {
            name: c.chapter.name.as_str(),
            preferred: is_hinted(c.subject, subject_hint),
            item: c,
        });
        let ranked = best_match(fragment, candidates, cutoff)?;
        debug!(
            fragment = %fragment,
            chapter = %ranked.item.chapter.name,
            score = ranked.score,
            "Chapter matched"
        );
        Some(ranked.item)
    }

    fn search_tree<'a>(
        &'a self,
        concept_fragments: &[&str],
        subconcepts: &SubconceptHints,
        subject_hint: &str,
        chapters: &mut Vec<ChapterRef<'a>>,
    ) {
        for fragment in concept_fragments {
            let candidates = self.chapter_candidates().flat_map(|c| {
                c.chapter.concepts.iter().map(move |k| Candidate {
                    name: k.name.as_str(),
                    preferred: is_hinted(c.subject, subject_hint),
                    item: c,
                })
            });
            if let Some(ranked) = best_match(fragment, candidates, self.config.concept_cutoff) {
                debug!(
                    fragment = %fragment,
                    chapter = %ranked.item.chapter.name,
                    score = ranked.score,
                    "Chapter located through concept"
                );
                push_chapter(chapters, ranked.item);
            }
        }
        if !chapters.is_empty() {
            return;
        }

        for fragment in subconcepts.fragments() {
            let candidates = self.chapter_candidates().flat_map(|c| {
                c.chapter.concepts.iter().flat_map(move |k| {
                    k.subconcepts.iter().map(move |s| Candidate {
                        name: s.as_str(),
                        preferred: is_hinted(c.subject, subject_hint),
                        item: c,
                    })
                })
            });
            if let Some(ranked) = best_match(fragment, candidates, self.config.subconcept_cutoff) {
                debug!(
                    fragment = %fragment,
                    chapter = %ranked.item.chapter.name,
                    score = ranked.score,
                    "Chapter located through subconcept"
                );
                push_chapter(chapters, ranked.item);
            }
        }
    }

    fn match_concept<'c>(&self, chapter: &'c Chapter, fragment: &str) -> Option<&'c str> {
        let candidates = chapter.concepts.iter().map(|k| Candidate {
            name: k.name.as_str(),
            preferred: false,
            item: k.name.as_str(),
        });
        best_match(fragment, candidates, self.config.concept_cutoff).map(|r| r.item)
    }

    fn resolve_within(
        &self,
        chapter: &ChapterRef<'_>,
        concept_fragments: &[&str],
        subconcepts: &SubconceptHints,
        concept_hits: &mut [bool],
        sub_hits: &mut [bool],
    ) -> ResolvedGroup {
        let ch = chapter.chapter;
        let mut selected: Vec<&str> = Vec::new();
        let mut selection: HashMap<&str, Vec<&str>> = HashMap::new();

        for (i, fragment) in concept_fragments.iter().enumerate() {
            if let Some(name) = self.match_concept(ch, fragment) {
                concept_hits[i] = true;
                if !selected.contains(&name) {
                    selected.push(name);
                }
            }
        }

        match subconcepts {
            SubconceptHints::ByConcept(map) => {
                let mut sub_index = 0;
                for (concept_fragment, fragments) in map {
                    let owner = self.match_concept(ch, concept_fragment);
                    for fragment in fragments {
                        let idx = sub_index;
                        sub_index += 1;
                        let Some(owner) = owner else { continue };
                        let Some(concept) = ch.concept(owner) else { continue };
                        let candidates = concept.subconcepts.iter().map(|s| Candidate {
                            name: s.as_str(),
                            preferred: false,
                            item: s.as_str(),
                        });
                        if let Some(ranked) =
                            best_match(fragment, candidates, self.config.subconcept_cutoff)
                        {
                            sub_hits[idx] = true;
                            if !selected.contains(&owner) {
                                selected.push(owner);
                            }
                            let entry = selection.entry(owner).or_default();
                            if !entry.contains(&ranked.item) {
                                entry.push(ranked.item);
                            }
                        }
                    }
                }
            }
            SubconceptHints::Flat(fragments) => {
                // Search the selected concepts, or the whole chapter when none
                let scope: Vec<&str> = if selected.is_empty() {
                    ch.concept_names()
                } else {
                    selected.clone()
                };
                for (idx, fragment) in fragments.iter().enumerate() {
                    let candidates = scope
                        .iter()
                        .filter_map(|name| ch.concept(name))
                        .flat_map(|k| {
                            k.subconcepts.iter().map(move |s| Candidate {
                                name: s.as_str(),
                                preferred: false,
                                item: (k.name.as_str(), s.as_str()),
                            })
                        });
                    if let Some(ranked) =
                        best_match(fragment, candidates, self.config.subconcept_cutoff)
                    {
                        let (owner, sub) = ranked.item;
                        sub_hits[idx] = true;
                        if !selected.contains(&owner) {
                            selected.push(owner);
                        }
                        let entry = selection.entry(owner).or_default();
                        if !entry.contains(&sub) {
                            entry.push(sub);
                        }
                    }
                }
            }
        }

        let mut group = ResolvedGroup::new(chapter.subject, ch.name.as_str());
        for name in selected {
            let subs: Vec<String> = match selection.get(name) {
                Some(subs) if !subs.is_empty() => subs.iter().map(|s| s.to_string()).collect(),
                _ => ch
                    .concept(name)
                    .map(|k| k.subconcepts.clone())
                    .unwrap_or_default(),
            };
            group.add_concept(name.to_string(), subs);
        }
        group
    }
}

fn is_hinted(subject: &str, subject_hint: &str) -> bool {
    !subject_hint.is_empty() && subject.to_lowercase() == subject_hint
}

/// Returns whether `found` was new
fn push_chapter<'a>(chapters: &mut Vec<ChapterRef<'a>>, found: ChapterRef<'a>) -> bool {
    if chapters
        .iter()
        .any(|c| std::ptr::eq(c.chapter, found.chapter))
    {
        return false;
    }
    chapters.push(found);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "JEE": {
            "Physics": {
                "Kinematics": {
                    "Projectile Motion": ["Time of Flight", "Horizontal Range"],
                    "Relative Velocity": []
                },
                "Newton's Laws of Motion": {
                    "Laws of Motion": ["First Law", "Second Law"],
                    "Friction": ["Pseudo Force"],
                    "Circular Dynamics": []
                },
                "Gravitation": {
                    "Kepler's Laws": []
                },
                "Electrostatics": {
                    "Coulomb's Law": ["Superposition Principle"]
                }
            },
            "Mathematics": {
                "Quadratic Equations": {
                    "Nature of Roots": ["Discriminant"]
                }
            }
        },
        "NEET": {
            "Physics": {
                "Kinematics": {
                    "Motion in a Plane": []
                }
            },
            "Biology": {
                "Kinematics": {
                    "Animal Locomotion": []
                }
            }
        }
    }"#;

    fn resolver() -> TaxonomyResolver {
        let tree = CurriculumTree::from_json_str(SNAPSHOT).unwrap();
        TaxonomyResolver::new(Arc::new(tree), ResolverConfig::default())
    }

    fn names(group: &ResolvedGroup) -> (&str, &str) {
        (group.subject(), group.chapter())
    }

    #[test]
    fn test_exact_chapter_resolves_whole_chapter() {
        let r = resolver().resolve(&TaskHints::new("Physics").chapter("Kinematics"));
        assert_eq!(r.groups.len(), 1);
        assert_eq!(names(&r.groups[0]), ("Physics", "Kinematics"));
        assert!(r.groups[0].is_chapter_only());
        assert!(r.misses.is_empty());
        assert!(!r.is_structurally_empty());
    }

    #[test]
    fn test_misspelled_chapter_at_primary_cutoff() {
        let r = resolver().resolve(&TaskHints::new("Physics").chapter("Newtons law of motion"));
        assert_eq!(names(&r.groups[0]), ("Physics", "Newton's Laws of Motion"));
    }

    #[test]
    fn test_relaxed_tier_catches_abbreviation() {
        // 0.68 similarity: below 0.7, above 0.5
        let r = resolver().resolve(&TaskHints::new("Mathematics").chapter("Quadratic Eqn"));
        assert_eq!(names(&r.groups[0]), ("Mathematics", "Quadratic Equations"));
    }

    #[test]
    fn test_chapter_beyond_both_tiers_is_unresolved() {
        let r = resolver().resolve(&TaskHints::new("Physics").chapter("Newton laws"));
        assert!(r.is_empty());
        assert_eq!(
            r.misses,
            vec![Miss {
                level: MatchLevel::Chapter,
                fragment: "Newton laws".to_string()
            }]
        );
    }

    #[test]
    fn test_tie_prefers_hinted_subject() {
        let r = resolver().resolve(&TaskHints::new("biology").chapter("Kinematics"));
        assert_eq!(names(&r.groups[0]), ("Biology", "Kinematics"));

        // No hint: first in tree order
        let r = resolver().resolve(&TaskHints::default().chapter("Kinematics"));
        assert_eq!(names(&r.groups[0]), ("Physics", "Kinematics"));
        assert_eq!(r.groups.len(), 1);
    }

    #[test]
    fn test_later_stream_duplicate_is_shadowed() {
        let r = resolver().resolve(&TaskHints::new("Physics").chapter("Kinematics").concept("Motion in a Plane"));
        assert_eq!(r.groups.len(), 1);
        assert!(r.groups[0].is_chapter_only());
        assert_eq!(r.concepts_matched, 0);

        // Only reachable through the shadowed NEET chapter
        let r = resolver().resolve(&TaskHints::new("Physics").concept("Motion in a Plane"));
        assert!(r.is_empty());
    }

    #[test]
    fn test_concept_promoted_to_chapter() {
        let r = resolver().resolve(&TaskHints::new("Physics").concept("Electrostatic"));
        assert_eq!(r.groups.len(), 1);
        assert_eq!(names(&r.groups[0]), ("Physics", "Electrostatics"));
        assert!(r.groups[0].is_chapter_only());
        assert_eq!(r.concepts_requested, 0);
    }

    #[test]
    fn test_promotion_after_failed_chapter() {
        let r = resolver().resolve(
            &TaskHints::new("Physics")
                .chapter("Newton laws")
                .concept("Electrostatic")
                .concept("Coulombs law"),
        );
        assert_eq!(names(&r.groups[0]), ("Physics", "Electrostatics"));
        assert_eq!(r.groups[0].concepts(), &["Coulomb's Law"]);
        assert_eq!(r.misses.len(), 1);
    }

    #[test]
    fn test_promotion_keeps_concept_of_resolved_chapter() {
        let tree = CurriculumTree::from_json_str(
            r#"{"JEE": {"Physics": {
                "Electromagnetic Induction": {
                    "Electromagnetic Induction": ["Faraday's Law"],
                    "Eddy Currents": []
                },
                "Optics": {"Refraction": []}
            }}}"#,
        )
        .unwrap();
        let resolver = TaxonomyResolver::new(Arc::new(tree), ResolverConfig::default());

        let r = resolver.resolve(
            &TaskHints::new("Physics")
                .chapter("Electromagnetic Induction")
                .chapter("Quantum Chromodynamics")
                .concept("Electromagnetic Induction"),
        );
        assert_eq!(r.groups.len(), 1);
        assert_eq!(names(&r.groups[0]), ("Physics", "Electromagnetic Induction"));
        assert_eq!(r.groups[0].concepts(), &["Electromagnetic Induction"]);
        assert_eq!(r.concepts_requested, 1);
        assert_eq!(r.concepts_matched, 1);
        assert_eq!(
            r.misses,
            vec![Miss {
                level: MatchLevel::Chapter,
                fragment: "Quantum Chromodynamics".to_string()
            }]
        );
    }

    #[test]
    fn test_concept_locates_chapter_tree_wide() {
        let r = resolver().resolve(&TaskHints::new("Physics").concept("Keplers laws"));
        assert_eq!(names(&r.groups[0]), ("Physics", "Gravitation"));
        assert_eq!(r.groups[0].concepts(), &["Kepler's Laws"]);
    }

    #[test]
    fn test_subconcept_locates_chapter_tree_wide() {
        let r = resolver().resolve(&TaskHints::new("Physics").subconcept("Pseudo Force"));
        assert_eq!(names(&r.groups[0]), ("Physics", "Newton's Laws of Motion"));
        assert_eq!(r.groups[0].concepts(), &["Friction"]);
        assert_eq!(r.groups[0].subconcepts_of("Friction"), &["Pseudo Force"]);
    }

    #[test]
    fn test_concepts_carry_full_subconcept_lists() {
        let r = resolver().resolve(
            &TaskHints::new("Physics")
                .chapter("Newton's Laws of Motion")
                .concept("laws of motion")
                .concept("Circular dynamics"),
        );
        let group = &r.groups[0];
        assert_eq!(group.concepts(), &["Laws of Motion", "Circular Dynamics"]);
        assert_eq!(group.subconcepts_of("Laws of Motion"), &["First Law", "Second Law"]);
        assert!(group.subconcepts_of("Circular Dynamics").is_empty());
    }

    #[test]
    fn test_unmatched_concepts_degrade_to_chapter() {
        let r = resolver().resolve(
            &TaskHints::new("Physics")
                .chapter("Kinematics")
                .concept("Thermal Expansion"),
        );
        assert_eq!(r.groups.len(), 1);
        assert!(r.groups[0].is_chapter_only());
        assert!(r.is_structurally_empty());
        assert_eq!(r.misses[0].level, MatchLevel::Concept);
    }

    #[test]
    fn test_unmatched_subconcepts_degrade_to_concept() {
        let r = resolver().resolve(
            &TaskHints::new("Physics")
                .chapter("Kinematics")
                .concept("Projectile Motion")
                .subconcept("Magnetic Flux"),
        );
        let group = &r.groups[0];
        assert_eq!(group.concepts(), &["Projectile Motion"]);
        assert_eq!(
            group.subconcepts_of("Projectile Motion"),
            &["Time of Flight", "Horizontal Range"]
        );
        assert_eq!(r.misses[0].level, MatchLevel::Subconcept);
    }

    #[test]
    fn test_subconcepts_keyed_by_concept() {
        let mut hints = TaskHints::new("Physics").chapter("Kinematics");
        hints.subconcepts = SubconceptHints::ByConcept(
            [("projectile motion".to_string(), vec!["time of flight".to_string()])]
                .into_iter()
                .collect(),
        );
        let r = resolver().resolve(&hints);
        let group = &r.groups[0];
        assert_eq!(group.concepts(), &["Projectile Motion"]);
        assert_eq!(group.subconcepts_of("Projectile Motion"), &["Time of Flight"]);
    }

    #[test]
    fn test_resolved_names_are_tree_entries() {
        let resolver = resolver();
        let r = resolver.resolve(
            &TaskHints::new("Physics")
                .chapter("kinematic")
                .chapter("Newtons laws of motion")
                .concept("Friction")
                .concept("projectile")
                .subconcept("pseudo forces")
                .subconcept("Range of projectile"),
        );
        let tree = resolver.tree();
        for group in &r.groups {
            assert!(tree.has_chapter(group.subject(), group.chapter()));
            for concept in group.concepts() {
                assert!(tree.has_concept(group.subject(), group.chapter(), concept));
                for sub in group.subconcepts_of(concept) {
                    assert!(tree.has_subconcept(group.subject(), group.chapter(), concept, sub));
                }
            }
        }
    }

    #[test]
    fn test_duplicate_chapters_merge() {
        let hints = vec![
            TaskHints::new("Physics").chapter("Kinematics").concept("Projectile Motion"),
            TaskHints::new("Physics").chapter("kinematics").concept("Relative Velocity"),
        ];
        let r = resolver().resolve_all(&hints);
        assert_eq!(r.groups.len(), 1);
        assert_eq!(r.groups[0].concepts(), &["Projectile Motion", "Relative Velocity"]);
        assert_eq!(r.concepts_requested, 2);
        assert_eq!(r.concepts_matched, 2);
    }
}
