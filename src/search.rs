use serde::Serialize;

use crate::views::SearchSummary;

/// What a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Venue,
    Artist,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub results: Vec<SearchSummary>,
    /// Echo of the term as submitted, before trimming.
    pub search_term: String,
}

impl SearchResults {
    pub fn new(search_term: impl Into<String>, results: Vec<SearchSummary>) -> Self {
        SearchResults {
            count: results.len(),
            results,
            search_term: search_term.into(),
        }
    }
}

/// Term actually matched: surrounding whitespace is dropped.
pub fn normalize_term(raw: &str) -> &str {
    raw.trim()
}

/// Case-insensitive substring containment. An empty needle matches every name.
pub fn matches_name(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(&needle.to_lowercase())
}

/// `ILIKE` pattern matching `needle` literally anywhere in the column.
/// Use with `ESCAPE '\'`.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const VENUES: [&str; 2] = ["The Musical Hop", "Park Square Live Music & Coffee"];

    fn hits(term: &str) -> Vec<&'static str> {
        let needle = normalize_term(term);
        VENUES.into_iter().filter(|name| matches_name(name, needle)).collect()
    }

    #[test]
    fn hop_matches_only_the_musical_hop() {
        assert_eq!(hits("Hop"), vec!["The Musical Hop"]);
        assert_eq!(hits("hOP"), vec!["The Musical Hop"]);
    }

    #[test]
    fn music_matches_both_venues() {
        assert_eq!(hits("Music"), VENUES.to_vec());
    }

    #[test]
    fn blank_term_matches_everything() {
        assert_eq!(hits("   "), VENUES.to_vec());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(hits("  hop \t"), vec!["The Musical Hop"]);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Hop"), "%Hop%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn results_count_matches_hits() {
        let results = SearchResults::new(" a ", vec![SearchSummary::new(1, "Guns N Petals", 2)]);
        assert_eq!(results.count, 1);
        assert_eq!(results.search_term, " a ");
    }
}
