use std::sync::LazyLock;

use regex::Regex;

/// Markup tags, stripped from summary previews.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid pattern"));

/// Find-bar toggles, mirrored on every search entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
}

/// Byte span of a single match within the haystack it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

/// Compiles the query into a literal pattern honoring the search options.
///
/// Returns `None` for an empty query: callers treat that as zero results
/// rather than an error.
pub fn build_pattern(query: &str, options: SearchOptions) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }

    let mut pattern = regex::escape(query);
    if options.whole_word {
        pattern = format!(r"\b{pattern}\b");
    }
    if !options.case_sensitive {
        pattern = format!("(?i){pattern}");
    }

    Regex::new(&pattern).ok()
}

/// Number of non-overlapping matches in `haystack`.
pub fn count_matches(haystack: &str, pattern: &Regex) -> usize {
    pattern.find_iter(haystack).count()
}

/// First match starting at or after `pos`. Direct scan to the end.
pub fn find_from(haystack: &str, pos: usize, pattern: &Regex) -> Option<MatchSpan> {
    if pos > haystack.len() {
        return None;
    }
    let from = ceil_char_boundary(haystack, pos);

    pattern.find_at(haystack, from).map(|found| MatchSpan {
        start: found.start(),
        end: found.end(),
    })
}

/// Last match starting strictly before `pos`.
///
/// There is no reverse substring search here; this is an exhaustive forward
/// scan that keeps the most recent hit, stopping once the cutoff is passed.
pub fn find_before(haystack: &str, pos: usize, pattern: &Regex) -> Option<MatchSpan> {
    let mut last = None;

    for found in pattern.find_iter(haystack) {
        if found.start() >= pos {
            break;
        }
        last = Some(MatchSpan {
            start: found.start(),
            end: found.end(),
        });
    }

    last
}

/// Replaces markup tags with spaces and trims, for human-readable previews.
pub fn strip_tags(line: &str) -> String {
    TAG_PATTERN.replace_all(line, " ").trim().to_string()
}

fn ceil_char_boundary(haystack: &str, mut pos: usize) -> usize {
    pos = pos.min(haystack.len());
    while !haystack.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(query: &str, case_sensitive: bool, whole_word: bool) -> Regex {
        build_pattern(
            query,
            SearchOptions {
                case_sensitive,
                whole_word,
            },
        )
        .expect("non-empty query")
    }

    // --- PATTERN TESTS ---

    #[test]
    fn test_empty_query_has_no_pattern() {
        assert!(build_pattern("", SearchOptions::default()).is_none());
    }

    #[test]
    fn test_query_is_treated_literally() {
        let re = pattern("a.b(c)", true, false);
        assert_eq!(count_matches("xa.b(c)x azbc", &re), 1);
    }

    // --- COUNT TESTS ---

    #[test]
    fn test_count_case_modes() {
        let haystack = "Alpha alpha ALPHA alphabet";

        assert_eq!(count_matches(haystack, &pattern("alpha", false, false)), 4);
        assert_eq!(count_matches(haystack, &pattern("alpha", true, false)), 2);
    }

    #[test]
    fn test_count_whole_word() {
        let haystack = "alpha alphabet alpha-beta alpha";
        assert_eq!(count_matches(haystack, &pattern("alpha", false, true)), 3);
    }

    #[test]
    fn test_count_is_non_overlapping() {
        assert_eq!(count_matches("aaaa", &pattern("aa", true, false)), 2);
    }

    // --- DIRECTIONAL SCAN TESTS ---

    #[test]
    fn test_find_from_is_inclusive() {
        let re = pattern("ab", true, false);
        let hit = find_from("ab cd ab", 0, &re).unwrap();
        assert_eq!((hit.start, hit.end), (0, 2));
    }

    #[test]
    fn test_find_from_advances() {
        let re = pattern("ab", true, false);
        let hit = find_from("ab cd ab", 1, &re).unwrap();
        assert_eq!(hit.start, 6);
        assert!(find_from("ab cd ab", 7, &re).is_none());
    }

    #[test]
    fn test_find_before_keeps_last_hit() {
        let re = pattern("ab", true, false);
        let hit = find_before("ab ab ab", 6, &re).unwrap();
        assert_eq!(hit.start, 3);
        assert!(find_before("ab ab ab", 0, &re).is_none());
    }

    #[test]
    fn test_whole_word_boundary_respected_mid_scan() {
        // find_at must see the boundary context before the start position.
        let re = pattern("bet", true, true);
        assert!(find_from("alphabet bet", 3, &re).is_some());
        let hit = find_from("alphabet bet", 3, &re).unwrap();
        assert_eq!(hit.start, 9);
    }

    // --- PREVIEW TESTS ---

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>alpha <b>beta</b></p>"), "alpha  beta");
        assert_eq!(strip_tags("no markup"), "no markup");
    }
}
