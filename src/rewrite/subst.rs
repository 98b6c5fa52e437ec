//! Counting substitution primitives shared by every rule.

use regex::{Captures, Regex, Replacer};

/// Replace every match, returning the new text and the number of replacements.
pub fn subn<R: Replacer>(re: &Regex, text: &str, rep: R) -> (String, usize) {
    subn_limited(re, text, 0, rep)
}

/// Like [`subn`] but stops after `limit` replacements (`0` means no limit).
pub fn subn_limited<R: Replacer>(
    re: &Regex,
    text: &str,
    limit: usize,
    mut rep: R,
) -> (String, usize) {
    let mut count = 0;
    let out = re.replacen(text, limit, |caps: &Captures<'_>| {
        count += 1;
        let mut dst = String::new();
        rep.replace_append(caps, &mut dst);
        dst
    });
    (out.into_owned(), count)
}

/// Exact text replacement, counting non-overlapping occurrences.
pub fn replace_literal(text: &str, from: &str, to: &str) -> (String, usize) {
    if from.is_empty() {
        return (text.to_string(), 0);
    }
    let count = text.matches(from).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    (text.replace(from, to), count)
}

/// Apply `re` until it stops matching or `cap` passes have run.
///
/// Returns the total number of replacements across all passes.
pub fn subn_fixpoint(re: &Regex, text: &str, template: &str, cap: usize) -> (String, usize) {
    let mut current = text.to_string();
    let mut total = 0;
    for _ in 0..cap {
        let (next, count) = subn(re, &current, template);
        if count == 0 {
            break;
        }
        total += count;
        current = next;
    }
    (current, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::NoExpand;

    #[test]
    fn test_subn_counts_all_matches() {
        let re = Regex::new(r"a(\d)").unwrap();
        let (out, count) = subn(&re, "a1 a2 b3", "<$1>");
        assert_eq!(out, "<1> <2> b3");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_subn_no_match_is_zero() {
        let re = Regex::new("zzz").unwrap();
        let (out, count) = subn(&re, "abc", "x");
        assert_eq!(out, "abc");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_subn_limited_stops() {
        let re = Regex::new("x").unwrap();
        let (out, count) = subn_limited(&re, "xxx", 1, NoExpand("y"));
        assert_eq!(out, "yxx");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_replace_literal_counts() {
        let (out, count) = replace_literal("a-b-c", "-", "+");
        assert_eq!(out, "a+b+c");
        assert_eq!(count, 2);
        assert_eq!(replace_literal("abc", "", "x"), ("abc".to_string(), 0));
    }

    #[test]
    fn test_fixpoint_respects_cap() {
        // Each pass creates a new match: never converges on its own.
        let re = Regex::new("a").unwrap();
        let (out, count) = subn_fixpoint(&re, "a", "aa", 3);
        assert_eq!(out, "aaaaaaaa");
        assert_eq!(count, 7);
    }

    #[test]
    fn test_fixpoint_stops_when_nothing_matches() {
        let re = Regex::new("ab").unwrap();
        let (out, count) = subn_fixpoint(&re, "aaab", "b", 64);
        assert_eq!(out, "b");
        assert_eq!(count, 3);
    }
}
