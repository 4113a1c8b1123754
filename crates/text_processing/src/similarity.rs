//! Fuzzy string similarity
//!
//! Gestalt pattern matching (Ratcliff/Obershelp): find the longest common
//! block, recurse on both sides, and score `2 * matched / total_len`.

/// Minimum similarity for [`closest_match`]
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Similarity of two strings in [0, 1]; two empty strings score 1.0
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// Longest common block; earliest in `a`, then earliest in `b`, on ties
fn longest_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // run lengths ending at (i - 1, j - 1) from the previous row
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            curr[j] = if a[i - 1] == b[j - 1] { prev[j - 1] + 1 } else { 0 };
            let len = curr[j];
            if len > best.2 {
                best = (i - len, j - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

/// Best option with similarity at or above `cutoff`, compared case-insensitively.
///
/// Returns the option as given, original casing kept.
pub fn closest_match<'a, S: AsRef<str>>(text: &str, options: &'a [S], cutoff: f64) -> Option<&'a str> {
    let needle = text.trim().to_lowercase();
    let mut best: Option<(&'a str, f64)> = None;

    for option in options {
        let option = option.as_ref();
        let score = ratio(&needle, &option.to_lowercase());
        if score >= cutoff && best.map_or(true, |(_, s)| score > s) {
            best = Some((option, score));
        }
    }

    best.map(|(option, _)| option)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_known_values() {
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abc", ""), 0.0);
        assert_eq!(ratio("balance", "balance"), 1.0);
        // 3 matching chars over 8: "abcd" vs "bcde"
        assert!((ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
        assert!((ratio("transfer", "transfr") - 14.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_recurses_on_both_sides() {
        // "ab" + "d" match around the differing middle
        assert!((ratio("abxd", "abyd") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_closest_match() {
        let options = ["Check Balance", "Transfer Money", "View Transactions"];
        assert_eq!(
            closest_match("transfer mony", &options, DEFAULT_CUTOFF),
            Some("Transfer Money")
        );
        assert_eq!(
            closest_match("CHECK BALANCE", &options, DEFAULT_CUTOFF),
            Some("Check Balance")
        );
        assert_eq!(closest_match("order pizza", &options, DEFAULT_CUTOFF), None);
    }

    #[test]
    fn test_closest_match_empty_options() {
        let options: Vec<String> = Vec::new();
        assert_eq!(closest_match("anything", &options, DEFAULT_CUTOFF), None);
    }
}
