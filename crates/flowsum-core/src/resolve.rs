// ── Fuzzy entity resolution ──
//
// Resolves a human-typed name ("chicago", "york") to the closest site or
// application. Scores are a case-insensitive Levenshtein indel ratio in
// 0..=100. There is no minimum score: the best candidate always wins and
// the score travels with it so callers can flag weak matches.

use tracing::{debug, trace};

use crate::error::CoreError;
use crate::model::{EntityKind, Match, Named};

/// Similarity of two strings as a 0..=100 ratio, ignoring case.
///
/// `round(100 * (len(a) + len(b) - indel(a, b)) / (len(a) + len(b)))`, where
/// the indel distance allows only insertions and deletions (a substitution
/// costs 2). Lengths are in chars. Either side empty scores 0.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn similarity(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }

    let total = a.len() + b.len();
    let indel = total - 2 * lcs_len(&a, &b);
    let ratio = 100.0 * (total - indel) as f64 / total as f64;
    ratio.round_ties_even() as u8
}

/// Length of the longest common subsequence, single-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diag + 1
            } else {
                above.max(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}

/// Pick the candidate whose display name best matches `query`.
///
/// Candidates are scanned in order and replaced only by a strictly higher
/// score, so ties go to the earliest candidate.
pub fn resolve<T: Named>(
    candidates: impl IntoIterator<Item = T>,
    query: &str,
    kind: EntityKind,
) -> Result<Match<T>, CoreError> {
    let mut best: Option<Match<T>> = None;

    for candidate in candidates {
        let score = similarity(query, candidate.display_name());
        trace!(%kind, name = candidate.display_name(), score, "scored candidate");

        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(Match {
                entity: candidate,
                score,
            });
        }
    }

    let best = best.ok_or_else(|| CoreError::NoCandidates {
        entity_type: kind.to_string(),
    })?;
    debug!(
        %kind,
        query,
        matched = best.entity.display_name(),
        score = best.score,
        "resolved"
    );
    Ok(best)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Entity;

    fn sites(names: &[&str]) -> Vec<Entity> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Entity::new(EntityKind::Site, format!("id-{i}"), *name))
            .collect()
    }

    #[test]
    fn identical_ignoring_case_scores_full() {
        assert_eq!(similarity("Chicago", "chicago"), 100);
    }

    #[test]
    fn empty_side_scores_zero() {
        assert_eq!(similarity("", "chicago"), 0);
        assert_eq!(similarity("chicago", ""), 0);
        assert_eq!(similarity("", ""), 0);
    }

    #[test]
    fn ratio_counts_substitution_as_two_edits() {
        // one substitution: indel 2 over 8 chars -> 75
        assert_eq!(similarity("abcd", "abce"), 75);
        // "chicago" in "chicago-1": 14 of 16 -> 87.5, ties to even
        assert_eq!(similarity("chicago", "Chicago-1"), 88);
        assert_eq!(similarity("york", "New York Branch"), 42);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(similarity("abc", "xyz"), 0);
    }

    #[test]
    fn best_score_wins() {
        let m = resolve(sites(&["Denver", "New York Branch", "Newark"]), "york", EntityKind::Site)
            .unwrap();
        assert_eq!(m.entity.display_name, "New York Branch");
    }

    #[test]
    fn ties_keep_first_candidate() {
        let m = resolve(sites(&["Chicago-1", "Chicago-2"]), "chicago", EntityKind::Site).unwrap();
        assert_eq!(m.entity.display_name, "Chicago-1");
        assert_eq!(m.score, 88);
    }

    #[test]
    fn poor_match_is_still_returned() {
        let m = resolve(sites(&["Denver", "Austin"]), "zzz", EntityKind::Site).unwrap();
        assert_eq!(m.entity.display_name, "Denver");
        assert_eq!(m.score, 0);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let err = resolve(Vec::<Entity>::new(), "chicago", EntityKind::Application).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NoCandidates { ref entity_type } if entity_type == "application"
        ));
    }

    #[test]
    fn non_ascii_names_compare_by_char() {
        assert_eq!(similarity("zürich", "ZÜRICH"), 100);
        assert_eq!(similarity("zürich", "zurich"), 83);
    }
}
