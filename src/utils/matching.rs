//! Tolerant string matching for catalog names.

use regex::RegexBuilder;

/// Default largest edit distance at which two names still match
pub const DEFAULT_TOLERANCE: usize = 2;

/// [`matches_with_tolerance`] with [`DEFAULT_TOLERANCE`]
pub fn matches(s1: &str, s2: &str) -> bool {
    matches_with_tolerance(s1, s2, DEFAULT_TOLERANCE)
}

/// Whether two names plausibly refer to the same thing.
///
/// True when they are equal, when either contains the other ignoring case,
/// or when their edit distance is at most `tolerance`.
pub fn matches_with_tolerance(s1: &str, s2: &str, tolerance: usize) -> bool {
    s1 == s2
        || contains_ignore_case(s1, s2)
        || contains_ignore_case(s2, s1)
        || levenshtein(s1, s2) <= tolerance
}

/// Case-insensitive literal substring test. The needle is escaped, so
/// characters like `(` or `*` in album titles match themselves.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    match RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.is_match(haystack),
        Err(e) => {
            tracing::debug!("Could not build matcher for {:?}: {}", needle, e);
            false
        }
    }
}

/// Levenshtein edit distance over Unicode scalar values.
///
/// Uses a single rolling row sized by the shorter input.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let mut a: Vec<char> = a.chars().collect();
    let mut b: Vec<char> = b.chars().collect();
    if a.len() < b.len() {
        std::mem::swap(&mut a, &mut b);
    }
    if b.is_empty() {
        return a.len();
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[b.len()]
}
