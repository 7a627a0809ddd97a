//! Explicit serialization codec for crawl records
//!
//! [`RawRecord`] is the persisted shape of a record: every first-class field,
//! the link collections, the metadata sidecar and the mark set, flattened
//! into one serde struct and encoded as JSON bytes. The in-memory aggregate
//! stays a plain struct; nothing about its layout leaks into storage except
//! through this file.
//!
//! The transient variable cache and the cached-content override are absent
//! here on purpose; they are process-local.

use super::StorageError;
use crate::record::{CrawlRecord, HyperLink, LinkRegistry, Marks, Metadata, PageCategory, Sequencer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The persisted form of a [`CrawlRecord`]
///
/// Fields the loader can default are marked so, letting records written by
/// older versions (or trimmed by hand) still decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_distance")]
    pub distance: i32,
    #[serde(default)]
    pub fetch_priority: i32,

    pub create_time: DateTime<Utc>,
    pub fetch_time: DateTime<Utc>,
    pub prev_fetch_time: DateTime<Utc>,
    #[serde(default)]
    pub fetch_interval_secs: u64,
    pub modified_time: DateTime<Utc>,
    pub prev_modified_time: DateTime<Utc>,
    pub content_publish_time: DateTime<Utc>,
    pub prev_content_publish_time: DateTime<Utc>,
    pub ref_content_publish_time: DateTime<Utc>,
    pub prev_ref_content_publish_time: DateTime<Utc>,
    pub content_modified_time: DateTime<Utc>,
    pub prev_content_modified_time: DateTime<Utc>,

    #[serde(default)]
    pub fetch_count: u32,
    #[serde(default)]
    pub fetch_retries: u32,
    #[serde(default)]
    pub crawl_status: u8,

    #[serde(default)]
    pub content: Option<Vec<u8>>,
    #[serde(default)]
    pub signature: Option<Vec<u8>>,
    #[serde(default)]
    pub prev_signature: Option<Vec<u8>>,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub encoding: Option<String>,

    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub anchor: String,
    #[serde(default)]
    pub referrer: String,
    #[serde(default)]
    pub page_category: PageCategory,

    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub content_score: f32,
    #[serde(default)]
    pub sort_score: String,

    #[serde(default)]
    pub live_links: BTreeMap<String, HyperLink>,
    #[serde(default)]
    pub vivid_links: BTreeMap<String, String>,
    #[serde(default)]
    pub dead_links: Vec<String>,
    #[serde(default)]
    pub links: LinkRegistry,
    #[serde(default)]
    pub inlinks: BTreeMap<String, String>,

    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub marks: Marks,
}

fn default_distance() -> i32 {
    -1
}

/// Encodes a record into its stored byte form
pub fn encode(record: &CrawlRecord) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec(&record.to_raw())?)
}

/// Decodes stored bytes back into a live record
///
/// The caller supplies the `(url, key)` pair the bytes were stored under;
/// the codec never trusts the payload for identity.
pub fn decode(
    url: &str,
    key: &str,
    bytes: &[u8],
    seq: &Sequencer,
) -> Result<CrawlRecord, StorageError> {
    let raw: RawRecord = serde_json::from_slice(bytes)?;
    Ok(CrawlRecord::hydrate(url, key, raw, seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::record::{CrawlStatus, Mark, MetaName};
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_encode_decode_preserves_all_fields() {
        let seq = Sequencer::new();
        let config = ModelConfig::default();
        let mut record = CrawlRecord::new("https://news.example.com/story?id=9", &seq);

        record.set_location("https://news.example.com/story-final");
        record.set_distance(4);
        record.set_fetch_priority(8);
        record.set_crawl_status(CrawlStatus::RedirPerm);
        record.set_fetch_count(11);
        record.set_fetch_retries(2);
        record.set_fetch_interval(std::time::Duration::from_secs(3600));
        record.set_content_type("text/html");
        record.set_encoding(Some("utf-8"));
        record.set_page_title("Story");
        record.set_anchor("the story");
        record.set_referrer("https://news.example.com/");
        record.set_page_category(PageCategory::Detail);
        record.set_score(0.5);
        record.set_content_score(1.25);
        record.set_sort_score("0042");
        record.set_content(Some(b"content".to_vec()));
        record.update_signature();
        record.set_prev_signature(Some(vec![1, 2, 3]));
        record.marks_mut().put(Mark::Fetch);
        record.metadata_mut().set(MetaName::Query, Some("id=9"));
        record.add_links(&config, vec!["https://other.com/a".to_string()]);
        record.vivid_links_mut().insert(
            "https://other.com/v".to_string(),
            "vivid".to_string(),
        );
        record.set_dead_links(vec!["https://other.com/dead".to_string()]);
        record.add_inlink("https://referrer.example.com/", "inbound");

        let t = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        record.set_create_time(t);
        record.set_fetch_time(t + Duration::days(1));
        record.set_prev_fetch_time(t);
        record.set_modified_time(t);
        record.set_prev_modified_time(t - Duration::days(1));
        record.set_content_publish_time(t);
        record.set_content_modified_time(t);
        record.set_ref_content_publish_time(t);

        let bytes = encode(&record).unwrap();
        let back = decode(record.url(), record.key(), &bytes, &seq).unwrap();

        assert_eq!(back.location(), "https://news.example.com/story-final");
        assert_eq!(back.distance(), 4);
        assert_eq!(back.sniff_fetch_priority(&config), 8);
        assert_eq!(back.crawl_status(), CrawlStatus::RedirPerm);
        assert_eq!(back.fetch_count(), 11);
        assert_eq!(back.fetch_retries(), 2);
        assert_eq!(back.fetch_interval(), std::time::Duration::from_secs(3600));
        assert_eq!(back.content_type(), "text/html");
        assert_eq!(back.encoding(), Some("utf-8"));
        assert_eq!(back.page_title(), "Story");
        assert_eq!(back.anchor(), "the story");
        assert_eq!(back.referrer(), "https://news.example.com/");
        assert_eq!(back.page_category(), PageCategory::Detail);
        assert_eq!(back.score(), 0.5);
        assert_eq!(back.content_score(), 1.25);
        assert_eq!(back.sort_score(), "0042");
        assert_eq!(back.uncached_content(), Some(&b"content"[..]));
        assert_eq!(back.signature_as_string(), record.signature_as_string());
        assert_eq!(back.prev_signature(), Some(&[1u8, 2, 3][..]));
        assert!(back.has_mark(Mark::Fetch));
        assert_eq!(back.query(), Some("id=9"));
        assert_eq!(back.links().as_slice(), record.links().as_slice());
        assert_eq!(back.vivid_links().len(), 1);
        assert_eq!(back.dead_links(), record.dead_links());
        assert_eq!(back.inlinks().len(), 1);
        assert_eq!(back.create_time(), t);
        assert_eq!(back.fetch_time(), t + Duration::days(1));
        assert_eq!(back.prev_fetch_time(), t);
        assert_eq!(back.modified_time(), t);
        assert_eq!(back.prev_modified_time(), t - Duration::days(1));
        assert_eq!(back.content_publish_time(), t);
        assert_eq!(back.content_modified_time(), t);
        assert_eq!(back.ref_content_publish_time(), t);
    }

    #[test]
    fn test_decode_trusts_supplied_identity() {
        let seq = Sequencer::new();
        let record = CrawlRecord::new("https://example.com/a", &seq);
        let bytes = encode(&record).unwrap();

        let back = decode("https://example.com/a", "com.example:https/a", &bytes, &seq).unwrap();
        assert_eq!(back.url(), "https://example.com/a");
        assert_eq!(back.key(), "com.example:https/a");
    }

    #[test]
    fn test_decode_defaults_missing_location_to_url() {
        let seq = Sequencer::new();
        let record = CrawlRecord::new("https://example.com/a", &seq);
        let mut raw = record.to_raw();
        raw.location = String::new();

        let bytes = serde_json::to_vec(&raw).unwrap();
        let back = decode(record.url(), record.key(), &bytes, &seq).unwrap();
        assert_eq!(back.location(), "https://example.com/a");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let seq = Sequencer::new();
        assert!(decode("https://example.com/a", "com.example:https/a", b"{oops", &seq).is_err());
    }

    #[test]
    fn test_negative_stored_distance_reads_infinite() {
        let seq = Sequencer::new();
        let record = CrawlRecord::new("https://example.com/a", &seq);
        let bytes = encode(&record).unwrap();
        let back = decode(record.url(), record.key(), &bytes, &seq).unwrap();
        assert_eq!(back.distance(), crate::record::DISTANCE_INFINITE);
    }
}
