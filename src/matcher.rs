use crate::models::{MatchResult, WatchlistEntry};

/// Case-insensitive substring search of every entry name against the page text.
///
/// Entries are tested independently and results keep watchlist order, so a
/// duplicated entry yields a duplicated result.
pub fn find_matches(page_text: &str, watchlist: &[WatchlistEntry]) -> Vec<MatchResult> {
    let haystack = page_text.to_lowercase();

    watchlist
        .iter()
        .filter(|entry| !entry.name.is_empty())
        .filter(|entry| haystack.contains(&entry.name.to_lowercase()))
        .map(MatchResult::from)
        .collect()
}
