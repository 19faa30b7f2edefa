//! Curriculum tree
//!
//! Immutable four-level knowledge base:
//! stream → subject → chapter → concept → ordered subconcept names.
//!
//! # Snapshot format
//! ```json
//! {
//!   "JEE": {
//!     "Physics": {
//!       "Newton's Laws of Motion": {
//!         "Friction": ["Pseudo Force", "Static Friction"]
//!       }
//!     }
//!   }
//! }
//! ```
//! A concept value may also be an object, in which case its keys are the
//! subconcepts (older snapshots stored them that way).
//!
//! # Invariants
//! - Chapter names are unique within a (stream, subject)
//! - Concept names are unique within a chapter
//! - Subconcept names are unique within a concept
//! - Document order is preserved and is the canonical iteration order
//!
//! Violations are rejected at load time with [`Error::Load`]. The tree is
//! never mutated after construction; share it as `Arc<CurriculumTree>`.

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use tracing::info;

use crate::{Error, Result};

/// Top-level grouping (exam stream, e.g. "JEE" or "NEET")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub name: String,
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub name: String,
    pub concepts: Vec<Concept>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    pub name: String,
    pub subconcepts: Vec<String>,
}

/// Borrowed view of one chapter together with its location in the tree
#[derive(Debug, Clone, Copy)]
pub struct ChapterRef<'a> {
    pub stream: &'a str,
    pub subject: &'a str,
    pub chapter: &'a Chapter,
}

/// Node counts, logged after load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub streams: usize,
    pub subjects: usize,
    pub chapters: usize,
    pub concepts: usize,
    pub subconcepts: usize,
}

/// The curriculum hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurriculumTree {
    streams: Vec<Stream>,
}

impl Chapter {
    pub fn concept(&self, name: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.name == name)
    }

    pub fn concept_names(&self) -> Vec<&str> {
        self.concepts.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Concept {
    pub fn has_subconcept(&self, name: &str) -> bool {
        self.subconcepts.iter().any(|s| s == name)
    }
}

impl CurriculumTree {
    /// Load the snapshot from a JSON file
    ///
    /// # Errors
    /// [`Error::Load`] if the file is missing, unreadable, not valid JSON, has
    /// the wrong shape, or violates the uniqueness invariants. Fatal at startup.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Load(format!("Cannot read snapshot {}: {}", path.display(), e))
        })?;
        let tree = Self::from_json_str(&content)?;

        let stats = tree.stats();
        info!(
            path = %path.display(),
            streams = stats.streams,
            subjects = stats.subjects,
            chapters = stats.chapters,
            concepts = stats.concepts,
            subconcepts = stats.subconcepts,
            "Curriculum tree loaded"
        );
        Ok(tree)
    }

    /// Parse a snapshot from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Entries<Entries<Entries<Entries<SubconceptList>>>> = serde_json::from_str(json)
            .map_err(|e| Error::Load(format!("Corrupt snapshot: {}", e)))?;
        Self::from_entries(raw)
    }

    /// Build from an already-parsed JSON document
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: Entries<Entries<Entries<Entries<SubconceptList>>>> = serde_json::from_value(value)
            .map_err(|e| Error::Load(format!("Corrupt snapshot: {}", e)))?;
        Self::from_entries(raw)
    }

    fn from_entries(raw: Entries<Entries<Entries<Entries<SubconceptList>>>>) -> Result<Self> {
        let mut streams = Vec::with_capacity(raw.0.len());

        for (stream_name, subjects_raw) in raw.0 {
            let mut subjects = Vec::with_capacity(subjects_raw.0.len());
            for (subject_name, chapters_raw) in subjects_raw.0 {
                let mut chapters = Vec::with_capacity(chapters_raw.0.len());
                for (chapter_name, concepts_raw) in chapters_raw.0 {
                    let mut concepts = Vec::with_capacity(concepts_raw.0.len());
                    for (concept_name, subs) in concepts_raw.0 {
                        let subconcepts = subs.into_names();
                        let mut seen = HashSet::new();
                        if let Some(dup) = subconcepts.iter().find(|s| !seen.insert(s.as_str())) {
                            return Err(Error::Load(format!(
                                "Duplicate subconcept '{}' under {} > {} > {} > {}",
                                dup, stream_name, subject_name, chapter_name, concept_name
                            )));
                        }
                        concepts.push(Concept {
                            name: concept_name,
                            subconcepts,
                        });
                    }
                    chapters.push(Chapter {
                        name: chapter_name,
                        concepts,
                    });
                }
                subjects.push(Subject {
                    name: subject_name,
                    chapters,
                });
            }
            streams.push(Stream {
                name: stream_name,
                subjects,
            });
        }

        Ok(Self { streams })
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    /// Every (stream, subject) pair in canonical order
    pub fn subjects(&self) -> impl Iterator<Item = (&str, &Subject)> + '_ {
        self.streams
            .iter()
            .flat_map(|s| s.subjects.iter().map(move |sub| (s.name.as_str(), sub)))
    }

    /// Every chapter in canonical order
    pub fn chapters(&self) -> impl Iterator<Item = ChapterRef<'_>> + '_ {
        self.subjects().flat_map(|(stream, subject)| {
            subject.chapters.iter().map(move |chapter| ChapterRef {
                stream,
                subject: subject.name.as_str(),
                chapter,
            })
        })
    }

    /// First chapter named `chapter` under a subject named `subject` (streams in order)
    pub fn find_chapter(&self, subject: &str, chapter: &str) -> Option<&Chapter> {
        self.subjects()
            .filter(|(_, s)| s.name == subject)
            .find_map(|(_, s)| s.chapters.iter().find(|c| c.name == chapter))
    }

    pub fn concepts(&self, subject: &str, chapter: &str) -> Option<&[Concept]> {
        self.find_chapter(subject, chapter)
            .map(|c| c.concepts.as_slice())
    }

    pub fn subconcepts(&self, subject: &str, chapter: &str, concept: &str) -> Option<&[String]> {
        self.find_chapter(subject, chapter)?
            .concept(concept)
            .map(|c| c.subconcepts.as_slice())
    }

    pub fn has_chapter(&self, subject: &str, chapter: &str) -> bool {
        self.find_chapter(subject, chapter).is_some()
    }

    pub fn has_concept(&self, subject: &str, chapter: &str, concept: &str) -> bool {
        self.subconcepts(subject, chapter, concept).is_some()
    }

    pub fn has_subconcept(&self, subject: &str, chapter: &str, concept: &str, sub: &str) -> bool {
        self.subconcepts(subject, chapter, concept)
            .map(|subs| subs.iter().any(|s| s == sub))
            .unwrap_or(false)
    }

    /// Candidate names one level below the most specific key given
    ///
    /// | subject | chapter | concept | returns |
    /// |---|---|---|---|
    /// | – | – | – | subject names (deduplicated across streams) |
    /// | S | – | – | chapter names of S |
    /// | S? | C | – | concept names of C (any subject when S is absent) |
    /// | S? | C | K | subconcepts of K |
    /// | S? | – | K | chapters containing concept K |
    pub fn lookup(
        &self,
        subject: Option<&str>,
        chapter: Option<&str>,
        concept: Option<&str>,
    ) -> Vec<&str> {
        let subject_matches = |name: &str| subject.map_or(true, |s| s == name);

        match (chapter, concept) {
            (None, None) => match subject {
                None => {
                    let mut names: Vec<&str> = Vec::new();
                    for (_, s) in self.subjects() {
                        if !names.contains(&s.name.as_str()) {
                            names.push(s.name.as_str());
                        }
                    }
                    names
                }
                Some(_) => self
                    .chapters()
                    .filter(|c| subject_matches(c.subject))
                    .map(|c| c.chapter.name.as_str())
                    .collect(),
            },
            (Some(ch), None) => self
                .chapters()
                .filter(|c| subject_matches(c.subject) && c.chapter.name == ch)
                .map(|c| c.chapter.concept_names())
                .next()
                .unwrap_or_default(),
            (Some(ch), Some(k)) => self
                .chapters()
                .filter(|c| subject_matches(c.subject) && c.chapter.name == ch)
                .find_map(|c| c.chapter.concept(k))
                .map(|c| c.subconcepts.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            (None, Some(k)) => self
                .chapters()
                .filter(|c| subject_matches(c.subject) && c.chapter.concept(k).is_some())
                .map(|c| c.chapter.name.as_str())
                .collect(),
        }
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            streams: self.streams.len(),
            ..Default::default()
        };
        for (_, subject) in self.subjects() {
            stats.subjects += 1;
            for chapter in &subject.chapters {
                stats.chapters += 1;
                stats.concepts += chapter.concepts.len();
                stats.subconcepts += chapter
                    .concepts
                    .iter()
                    .map(|c| c.subconcepts.len())
                    .sum::<usize>();
            }
        }
        stats
    }
}

// ============================================================================
// Ordered map deserialization
// ============================================================================

/// JSON object decoded as ordered `(key, value)` pairs, rejecting duplicate keys
struct Entries<T>(Vec<(String, T)>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, T)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(key) = map.next_key::<String>()? {
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(de::Error::custom(format!("duplicate key '{}'", key)));
                    }
                    let value = map.next_value::<T>()?;
                    entries.push((key, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Subconcepts as a list, or as the keys of an object
#[derive(Deserialize)]
#[serde(untagged)]
enum SubconceptList {
    List(Vec<String>),
    Keys(Entries<IgnoredAny>),
}

impl SubconceptList {
    fn into_names(self) -> Vec<String> {
        match self {
            SubconceptList::List(names) => names,
            SubconceptList::Keys(entries) => entries.0.into_iter().map(|(k, _)| k).collect(),
        }
    }
}
