//! Fuzzy text matching used by loose string comparisons.
//!
//! A [`Needle`] is prepared once per distinct search string and matched
//! against any number of haystacks. Loose comparisons go through a
//! [`NeedleCache`] so that a query evaluated over many records prepares each
//! needle only once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use strsim::jaro_winkler;

/// Default number of needles kept before the cache is cleared.
pub const DEFAULT_NEEDLE_CACHE_CAPACITY: usize = 1000;

/// Terms shorter than this only match as substrings.
const MIN_TYPO_TERM_LEN: usize = 4;

/// Minimum Jaro-Winkler similarity for a typo-tolerant word match.
const TYPO_SIMILARITY: f64 = 0.9;

/// A prepared search string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Needle {
    terms: Vec<String>,
}

impl Needle {
    /// The lowercased search terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Prepares a needle from raw search text.
///
/// Returns `None` for empty or whitespace-only input, which callers treat as
/// "match everything".
pub fn prepare_needle(raw: &str) -> Option<Needle> {
    let terms: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
    if terms.is_empty() {
        None
    } else {
        Some(Needle { terms })
    }
}

/// Returns true if every term of the needle is found in some haystack.
///
/// A term is found when it occurs as a substring of a lowercased haystack or,
/// for terms of four or more characters, when a word of a haystack is close
/// to it by Jaro-Winkler similarity.
pub fn fuzzy_match(haystacks: &[&str], needle: &Needle) -> bool {
    let haystacks: Vec<String> = haystacks.iter().map(|h| h.to_lowercase()).collect();

    needle.terms.iter().all(|term| {
        haystacks.iter().any(|haystack| {
            haystack.contains(term.as_str()) || (is_typo_candidate(term) && has_similar_word(haystack, term))
        })
    })
}

fn is_typo_candidate(term: &str) -> bool {
    term.chars().count() >= MIN_TYPO_TERM_LEN
}

fn has_similar_word(haystack: &str, term: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| jaro_winkler(word, term) >= TYPO_SIMILARITY)
}

/// A bounded, thread-safe cache of prepared needles.
///
/// When the number of entries exceeds the capacity the whole cache is
/// discarded before the next insertion.
#[derive(Debug)]
pub struct NeedleCache {
    capacity: usize,
    needles: Mutex<HashMap<String, Arc<Needle>>>,
}

impl Default for NeedleCache {
    fn default() -> Self {
        Self::new(DEFAULT_NEEDLE_CACHE_CAPACITY)
    }
}

impl NeedleCache {
    /// Creates an empty cache with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            needles: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the needle for `raw`, preparing and caching it on first use.
    pub fn get_or_prepare(&self, raw: &str) -> Option<Arc<Needle>> {
        let mut needles = self.needles.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(needle) = needles.get(raw) {
            tracing::trace!(needle = raw, "needle cache hit");
            return Some(Arc::clone(needle));
        }

        let needle = Arc::new(prepare_needle(raw)?);
        if needles.len() > self.capacity {
            tracing::debug!(entries = needles.len(), "clearing needle cache");
            needles.clear();
        }
        needles.insert(raw.to_string(), Arc::clone(&needle));
        Some(needle)
    }

    /// Number of cached needles.
    pub fn len(&self) -> usize {
        self.needles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_needle_empty() {
        assert!(prepare_needle("").is_none());
        assert!(prepare_needle("   \t").is_none());
    }

    #[test]
    fn test_prepare_needle_lowercases_terms() {
        let needle = prepare_needle("Fight  COMBAT").unwrap();
        assert_eq!(needle.terms(), ["fight", "combat"]);
    }

    #[test]
    fn test_fuzzy_match_substring() {
        let needle = prepare_needle("roland").unwrap();
        assert!(fuzzy_match(&["Roland Banks"], &needle));
        assert!(!fuzzy_match(&["Wendy Adams"], &needle));
    }

    #[test]
    fn test_fuzzy_match_requires_every_term() {
        let needle = prepare_needle("fight combat").unwrap();
        assert!(fuzzy_match(
            &["<b>Fight.</b> You get +1 [combat] for this test."],
            &needle
        ));
        assert!(!fuzzy_match(&["<b>Fight.</b> Deal 1 damage."], &needle));
    }

    #[test]
    fn test_fuzzy_match_terms_across_haystacks() {
        let needle = prepare_needle("roland guardian").unwrap();
        assert!(fuzzy_match(&["Roland Banks", "guardian"], &needle));
    }

    #[test]
    fn test_fuzzy_match_tolerates_typos_in_long_terms() {
        let needle = prepare_needle("investigte").unwrap();
        assert!(fuzzy_match(&["Investigate. You get +2"], &needle));

        // Short terms only match as substrings
        let needle = prepare_needle("tst").unwrap();
        assert!(!fuzzy_match(&["test"], &needle));
    }

    #[test]
    fn test_needle_cache_reuses_needles() {
        let cache = NeedleCache::new(10);
        let first = cache.get_or_prepare("fight").unwrap();
        let second = cache.get_or_prepare("fight").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_needle_cache_clears_when_over_capacity() {
        let cache = NeedleCache::new(2);
        for term in ["a", "b", "c"] {
            cache.get_or_prepare(term);
        }
        assert_eq!(cache.len(), 3);

        // The fourth insertion finds the cache over capacity and starts over
        cache.get_or_prepare("d");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_needle_cache_skips_empty_needles() {
        let cache = NeedleCache::default();
        assert!(cache.get_or_prepare("  ").is_none());
        assert!(cache.is_empty());
    }
}
