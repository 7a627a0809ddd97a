//! Hyperlinks and the bounded link registry
//!
//! `links` records every outbound URL ever seen on a page, in discovery
//! order. The registry is bounded: once full, the oldest third is evicted to
//! make room, on the assumption that links which entered long ago no longer
//! appear on the page. Entries are deduplicated against the full retained
//! history, not just within one batch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An outbound hyperlink together with its anchor text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperLink {
    pub url: String,

    /// Anchor text; can be used to sniff an article title
    #[serde(default)]
    pub anchor: String,

    /// Position of the anchor within the source page, -1 when unknown
    #[serde(default = "default_order")]
    pub order: i32,
}

fn default_order() -> i32 {
    -1
}

impl HyperLink {
    pub fn new(url: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anchor: anchor.into(),
            order: -1,
        }
    }

    pub fn with_order(url: impl Into<String>, anchor: impl Into<String>, order: i32) -> Self {
        Self {
            url: url.into(),
            anchor: anchor.into(),
            order,
        }
    }
}

impl fmt::Display for HyperLink {
    /// The stringified form used by the link listing endpoint
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{{\"url\":{:?}}}", self.url),
        }
    }
}

/// Bounded, deduplicated, order-preserving FIFO of discovered link URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkRegistry(Vec<String>);

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.iter().any(|u| u == url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Appends URLs under the registry bound
    ///
    /// If the registry is full, the oldest third is evicted first. Each URL
    /// is then appended only if absent from the retained content, and only
    /// while the registry stays within `max`.
    ///
    /// Returns the number of URLs actually appended.
    pub fn append_bounded(&mut self, urls: impl IntoIterator<Item = String>, max: usize) -> usize {
        if self.0.len() >= max {
            let evict = self.0.len() / 3;
            self.0.drain(..evict);
        }

        let mut appended = 0;
        for url in urls {
            if self.0.len() >= max {
                break;
            }
            if !self.contains(&url) {
                self.0.push(url);
                appended += 1;
            }
        }

        appended
    }

    /// Replaces the whole registry, for rehydration and bulk rewrites
    pub fn replace(&mut self, links: Vec<String>) {
        self.0 = links;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("https://example.com/{}", i)).collect()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut reg = LinkRegistry::new();
        let added = reg.append_bounded(urls(0..3), 100);
        assert_eq!(added, 3);
        assert_eq!(
            reg.as_slice(),
            &[
                "https://example.com/0",
                "https://example.com/1",
                "https://example.com/2"
            ]
        );
    }

    #[test]
    fn test_duplicates_suppressed_within_batch() {
        let mut reg = LinkRegistry::new();
        let batch = vec![
            "https://example.com/a".to_string(),
            "https://example.com/a".to_string(),
        ];
        assert_eq!(reg.append_bounded(batch, 100), 1);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_duplicates_suppressed_across_history() {
        let mut reg = LinkRegistry::new();
        reg.append_bounded(urls(0..5), 100);
        let added = reg.append_bounded(urls(3..8), 100);
        assert_eq!(added, 3);
        assert_eq!(reg.len(), 8);
    }

    #[test]
    fn test_never_exceeds_bound() {
        let mut reg = LinkRegistry::new();
        for start in (0..300).step_by(10) {
            reg.append_bounded(urls(start..start + 10), 30);
            assert!(reg.len() <= 30, "len {} exceeded bound", reg.len());
        }
    }

    #[test]
    fn test_full_registry_evicts_oldest_third() {
        let mut reg = LinkRegistry::new();
        reg.append_bounded(urls(0..30), 30);
        assert_eq!(reg.len(), 30);

        reg.append_bounded(urls(100..101), 30);

        // The first ten (oldest third) are gone, the new url is at the tail
        assert!(!reg.contains("https://example.com/0"));
        assert!(!reg.contains("https://example.com/9"));
        assert!(reg.contains("https://example.com/10"));
        assert!(reg.contains("https://example.com/100"));
        assert_eq!(reg.len(), 21);
    }

    #[test]
    fn test_no_duplicates_after_many_rounds() {
        let mut reg = LinkRegistry::new();
        for _ in 0..10 {
            reg.append_bounded(urls(0..40), 30);
        }
        let mut seen = std::collections::HashSet::new();
        for url in reg.iter() {
            assert!(seen.insert(url.clone()), "duplicate {}", url);
        }
    }

    #[test]
    fn test_hyperlink_display_is_json() {
        let link = HyperLink::with_order("https://example.com/a", "A page", 3);
        let json = link.to_string();
        let parsed: HyperLink = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, link);
    }
}
