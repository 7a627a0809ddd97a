//! Link listing over the internal metrics record
//!
//! The pipeline keeps an internal record at a well-known home URL and parks
//! collected links on it as live links. This module renders that collection
//! as a JSON array string for operators, without pulling a web framework into
//! the crate; an HTTP layer can serve the string verbatim.

use crate::storage::{RecordDb, StorageError, Store};

/// Renders up to `limit` live links of the record at `home_url`
///
/// An absent record and a record with no live links both render as `"[]"`;
/// the caller cannot distinguish them and does not need to. Each entry is
/// the JSON form of a hyperlink, one per line inside the brackets.
pub fn list_live_links<S: Store>(
    db: &RecordDb<S>,
    home_url: &str,
    limit: usize,
) -> Result<String, StorageError> {
    let record = match db.get_record(home_url)? {
        Some(record) => record,
        None => {
            tracing::debug!(home_url, "no metrics record, rendering empty listing");
            return Ok("[]".to_string());
        }
    };

    let entries: Vec<String> = record
        .live_links()
        .values()
        .take(limit)
        .map(|link| link.to_string())
        .collect();

    if entries.is_empty() {
        return Ok("[]".to_string());
    }

    Ok(format!("[\n{}\n]", entries.join(",\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CrawlRecord, HyperLink};
    use crate::storage::SqliteStore;

    const HOME: &str = "https://internal.crawl-ledger/metrics";

    fn db() -> RecordDb<SqliteStore> {
        RecordDb::new(SqliteStore::new_in_memory().unwrap())
    }

    fn seed_home(db: &RecordDb<SqliteStore>, links: Vec<HyperLink>) {
        let mut record = CrawlRecord::internal(HOME, "metrics", "", db.sequencer());
        record.set_live_links(links);
        db.put_record(&record).unwrap();
    }

    #[test]
    fn test_absent_record_renders_empty_array() {
        let db = db();
        assert_eq!(list_live_links(&db, HOME, 1000).unwrap(), "[]");
    }

    #[test]
    fn test_no_live_links_renders_empty_array() {
        let db = db();
        seed_home(&db, Vec::new());
        assert_eq!(list_live_links(&db, HOME, 1000).unwrap(), "[]");
    }

    #[test]
    fn test_listing_shape() {
        let db = db();
        seed_home(
            &db,
            vec![
                HyperLink::new("https://a.example.com/", "a"),
                HyperLink::new("https://b.example.com/", "b"),
            ],
        );

        let listing = list_live_links(&db, HOME, 1000).unwrap();
        assert!(listing.starts_with("[\n"));
        assert!(listing.ends_with("\n]"));
        assert!(listing.contains(",\n"));

        // The whole listing is parseable JSON of hyperlinks
        let parsed: Vec<HyperLink> = serde_json::from_str(&listing).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].url, "https://a.example.com/");
    }

    #[test]
    fn test_limit_caps_entries() {
        let db = db();
        let links: Vec<HyperLink> = (0..10)
            .map(|i| HyperLink::new(format!("https://example.com/{}", i), ""))
            .collect();
        seed_home(&db, links);

        let listing = list_live_links(&db, HOME, 3).unwrap();
        let parsed: Vec<HyperLink> = serde_json::from_str(&listing).unwrap();
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn test_single_entry_listing() {
        let db = db();
        seed_home(&db, vec![HyperLink::new("https://only.example.com/", "")]);

        let listing = list_live_links(&db, HOME, 1000).unwrap();
        assert!(!listing.contains(",\n"));
        let parsed: Vec<HyperLink> = serde_json::from_str(&listing).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
