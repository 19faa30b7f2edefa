//! String similarity and best-candidate ranking

use strsim::normalized_levenshtein;

/// Lowercase, trim, collapse internal whitespace
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalized Levenshtein similarity in [0.0, 1.0] (1.0 = identical)
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&normalize(a), &normalize(b))
}

/// One entry offered to [`best_match`]
#[derive(Debug, Clone)]
pub struct Candidate<'a, T> {
    pub name: &'a str,
    /// Wins ties against non-preferred candidates (e.g. subject matches the hint)
    pub preferred: bool,
    pub item: T,
}

/// Winning candidate and its score
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub score: f64,
}

/// Score every candidate and return the best one at or above `cutoff`
///
/// Ties go to a preferred candidate first, then to the earliest candidate.
/// The result depends only on the scores and the candidate order.
pub fn best_match<'a, T>(
    query: &str,
    candidates: impl IntoIterator<Item = Candidate<'a, T>>,
    cutoff: f64,
) -> Option<Ranked<T>> {
    let query = normalize(query);
    let mut best: Option<(Ranked<T>, bool)> = None;

    for candidate in candidates {
        let score = normalized_levenshtein(&query, &normalize(candidate.name));
        if score < cutoff {
            continue;
        }
        let better = match &best {
            None => true,
            Some((current, current_preferred)) => {
                score > current.score
                    || (score == current.score && candidate.preferred && !current_preferred)
            }
        };
        if better {
            best = Some((
                Ranked {
                    item: candidate.item,
                    score,
                },
                candidate.preferred,
            ));
        }
    }

    best.map(|(ranked, _)| ranked)
}
