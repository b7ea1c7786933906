//! Suggestion filters for completers.
//!
//! Each filter keeps the suggestions whose text matches `sub` and preserves
//! their order. An empty `sub` keeps everything. With `ignore_case`, both
//! sides are upper-cased before comparing.

use crate::completion::Suggestion;

/// Signature shared by all filters: `(suggestions, sub, ignore_case)`.
pub type Filter = fn(&[Suggestion], &str, bool) -> Vec<Suggestion>;

/// Suggestions whose text starts with `sub`.
#[must_use]
pub fn has_prefix(suggestions: &[Suggestion], sub: &str, ignore_case: bool) -> Vec<Suggestion> {
    filter_by(suggestions, sub, ignore_case, |text, sub| text.starts_with(sub))
}

/// Suggestions whose text ends with `sub`.
#[must_use]
pub fn has_suffix(suggestions: &[Suggestion], sub: &str, ignore_case: bool) -> Vec<Suggestion> {
    filter_by(suggestions, sub, ignore_case, |text, sub| text.ends_with(sub))
}

/// Suggestions whose text contains `sub`.
#[must_use]
pub fn contains(suggestions: &[Suggestion], sub: &str, ignore_case: bool) -> Vec<Suggestion> {
    filter_by(suggestions, sub, ignore_case, |text, sub| text.contains(sub))
}

/// Suggestions whose text contains the chars of `sub` in order, with
/// anything in between (`"gco"` matches `"git checkout"`).
#[must_use]
pub fn fuzzy(suggestions: &[Suggestion], sub: &str, ignore_case: bool) -> Vec<Suggestion> {
    filter_by(suggestions, sub, ignore_case, is_subsequence)
}

fn is_subsequence(text: &str, sub: &str) -> bool {
    let mut chars = text.chars();
    sub.chars().all(|wanted| chars.any(|c| c == wanted))
}

fn filter_by(
    suggestions: &[Suggestion],
    sub: &str,
    ignore_case: bool,
    matches: impl Fn(&str, &str) -> bool,
) -> Vec<Suggestion> {
    if sub.is_empty() {
        return suggestions.to_vec();
    }

    if ignore_case {
        let sub = sub.to_uppercase();
        suggestions
            .iter()
            .filter(|s| matches(&s.text.to_uppercase(), &sub))
            .cloned()
            .collect()
    } else {
        suggestions
            .iter()
            .filter(|s| matches(&s.text, sub))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn list(texts: &[&str]) -> Vec<Suggestion> {
        texts.iter().map(|t| Suggestion::new(*t, "")).collect()
    }

    fn texts(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn empty_sub_keeps_all() {
        let all = list(&["abcde", "fghij"]);
        assert_eq!(has_prefix(&all, "", false), all);
        assert_eq!(fuzzy(&all, "", true), all);
    }

    #[test]
    fn prefix() {
        let all = list(&["abcde", "fghij", "ABCDE"]);
        assert_eq!(texts(&has_prefix(&all, "abc", false)), vec!["abcde"]);
        assert_eq!(texts(&has_prefix(&all, "abc", true)), vec!["abcde", "ABCDE"]);
    }

    #[test]
    fn suffix() {
        let all = list(&["abcde", "fghij", "ABCDE"]);
        assert_eq!(texts(&has_suffix(&all, "de", false)), vec!["abcde"]);
        assert_eq!(texts(&has_suffix(&all, "de", true)), vec!["abcde", "ABCDE"]);
    }

    #[test]
    fn substring() {
        let all = list(&["abcde", "fghij", "ABCDE"]);
        assert_eq!(texts(&contains(&all, "cd", false)), vec!["abcde"]);
        assert_eq!(texts(&contains(&all, "cd", true)), vec!["abcde", "ABCDE"]);
        assert!(contains(&all, "xyz", true).is_empty());
    }

    #[test]
    fn fuzzy_needs_order() {
        let all = list(&["git checkout", "git commit", "cargo"]);
        assert_eq!(texts(&fuzzy(&all, "gco", false)), vec!["git checkout", "git commit"]);
        assert_eq!(texts(&fuzzy(&all, "ogc", false)), Vec::<&str>::new());
    }

    #[test]
    fn filters_fit_the_alias() {
        let filters: [Filter; 4] = [has_prefix, has_suffix, contains, fuzzy];
        let all = list(&["apple"]);
        for f in filters {
            assert_eq!(f(&all, "apple", false).len(), 1);
        }
    }
}
