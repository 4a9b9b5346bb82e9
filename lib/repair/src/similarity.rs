//! String similarity for term repair.
//!
//! Candidate names are scored with the Ratcliff-Obershelp sequence ratio:
//! twice the number of matching characters (summed over the recursively
//! found longest common blocks) divided by the total length of both inputs.
//! The repair thresholds are calibrated against this exact measure.

use std::collections::HashMap;

/// Similarity of two strings in `[0, 1]`.
///
/// Two empty strings are considered identical (ratio 1.0).
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matches = matching_chars(&a, &b);
    2.0 * matches as f64 / total as f64
}

/// Normalizes a local name or label for comparison: lower-cased with every
/// non-alphanumeric character removed.
pub fn normalize_term(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_match(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Finds the longest block of characters common to `a` and `b`.
///
/// Ties resolve to the earliest position in `a`, then in `b`.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // j2len[j] is the length of the common block ending at a[..i] / b[..=j].
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, &ca) in a.iter().enumerate() {
        let mut next_j2len = HashMap::new();
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                let length = if j == 0 {
                    1
                } else {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                };
                next_j2len.insert(j, length);
                if length > best.2 {
                    best = (i + 1 - length, j + 1 - length, length);
                }
            }
        }
        j2len = next_j2len;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(sequence_ratio("name", "name"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(sequence_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn transposition_scores_between() {
        // "nmae" vs "name": blocks "n" + "a" + "e" match.
        let score = sequence_ratio("nmae", "name");
        assert!(score > 0.6 && score < 1.0, "score was {score}");
    }

    #[test]
    fn ratio_is_exact_at_the_repair_boundary() {
        // 3 matching characters out of 10 total: 2 * 3 / 10 = 0.6 exactly.
        assert_eq!(sequence_ratio("abcd", "abcxyz"), 0.6);
        // One extra character pushes the same match below the boundary.
        assert!(sequence_ratio("abcd", "abcxyzw") < 0.6);
    }

    #[test]
    fn ratio_is_length_symmetric() {
        assert_eq!(
            sequence_ratio("short", "a-much-longer-string"),
            sequence_ratio("a-much-longer-string", "short")
        );
    }

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        assert_eq!(normalize_term("Has-Name_2"), "hasname2");
        assert_eq!(normalize_term("---"), "");
    }
}
