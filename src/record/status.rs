//! Crawl status codes, marks and the lossy metadata enums
//!
//! The record never enforces a status transition table; the fetch and
//! scheduling collaborators set the status and the record just carries it.
//! All enums that parse from stored strings recover lossily: an unrecognized
//! value becomes the `Unknown` variant instead of an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel value stored for a present mark
pub const YES_STRING: &str = "y";

/// Fetch state of a record as last reported by the fetch collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CrawlStatus {
    /// Never fetched, or reset for a refetch
    #[default]
    Unfetched,

    /// Fetched successfully
    Fetched,

    /// Permanently gone (404 and friends)
    Gone,

    /// Temporary redirect encountered
    RedirTemp,

    /// Permanent redirect encountered
    RedirPerm,

    /// Transient failure, scheduled for retry
    Retry,

    /// Not modified since the previous fetch
    NotModified,

    /// Any code this version does not recognize
    Unknown,
}

impl CrawlStatus {
    /// The small-integer code stored on the wire
    pub fn code(&self) -> u8 {
        match self {
            Self::Unfetched => 1,
            Self::Fetched => 2,
            Self::Gone => 3,
            Self::RedirTemp => 4,
            Self::RedirPerm => 5,
            Self::Retry => 6,
            Self::NotModified => 7,
            Self::Unknown => 0,
        }
    }

    /// Decodes a stored status code, recovering unknown codes as `Unknown`
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Unfetched,
            2 => Self::Fetched,
            3 => Self::Gone,
            4 => Self::RedirTemp,
            5 => Self::RedirPerm,
            6 => Self::Retry,
            7 => Self::NotModified,
            _ => Self::Unknown,
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched | Self::NotModified)
    }

    pub fn is_unfetched(&self) -> bool {
        matches!(self, Self::Unfetched)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirTemp | Self::RedirPerm)
    }

    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Gone)
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, Self::Retry)
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unfetched => "unfetched",
            Self::Fetched => "fetched",
            Self::Gone => "gone",
            Self::RedirTemp => "redir_temp",
            Self::RedirPerm => "redir_perm",
            Self::Retry => "retry",
            Self::NotModified => "not_modified",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// A boolean tag attached to a record; presence carries the meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    /// Utility record created by the pipeline itself, never fetched
    Internal,

    /// Excluded from scheduling
    Inactive,

    /// Member of the seed set
    Seed,

    /// Selected by the generator for the current batch
    Generate,

    /// Fetched in the current batch
    Fetch,

    /// Parsed in the current batch
    Parse,

    /// Indexed in the current batch
    Index,

    /// Outgraph updated in the current batch
    Update,
}

impl Mark {
    /// The storage key this mark occupies in the mark set
    pub fn value(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Inactive => "inactive",
            Self::Seed => "seed",
            Self::Generate => "generate",
            Self::Fetch => "fetch",
            Self::Parse => "parse",
            Self::Index => "index",
            Self::Update => "update",
        }
    }
}

/// The tag set of a record, persisted as key -> "y" pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks(BTreeMap<String, String>);

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, mark: Mark) {
        self.0.insert(mark.value().to_string(), YES_STRING.to_string());
    }

    pub fn remove(&mut self, mark: Mark) {
        self.0.remove(mark.value());
    }

    pub fn contains(&self, mark: Mark) -> bool {
        self.0.contains_key(mark.value())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Protocol selection hint recorded before a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    #[default]
    Unknown,
    Native,
    Proxy,
    Crowdsourcing,
    Browser,
}

impl FetchMode {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Native => "native",
            Self::Proxy => "proxy",
            Self::Crowdsourcing => "crowdsourcing",
            Self::Browser => "browser",
        }
    }

    /// Lossy parse; anything unrecognized is `Unknown`
    pub fn from_db_string(s: &str) -> Self {
        match s {
            "native" => Self::Native,
            "proxy" => Self::Proxy,
            "crowdsourcing" => Self::Crowdsourcing,
            "browser" => Self::Browser,
            _ => Self::Unknown,
        }
    }
}

/// The browser engine that produced the last fetched content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserType {
    #[default]
    Unknown,
    Native,
    Chrome,
    HeadlessChrome,
}

impl BrowserType {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Native => "native",
            Self::Chrome => "chrome",
            Self::HeadlessChrome => "headless_chrome",
        }
    }

    /// Lossy parse; anything unrecognized is `Unknown`
    pub fn from_db_string(s: &str) -> Self {
        match s {
            "native" => Self::Native,
            "chrome" => Self::Chrome,
            "headless_chrome" => Self::HeadlessChrome,
            _ => Self::Unknown,
        }
    }
}

/// Verdict on whether the last fetched document is structurally whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtmlIntegrity {
    #[default]
    Unknown,
    Ok,
    Empty,
    TooSmall,
    NoBody,
    NoAnchor,
    Forbidden,
}

impl HtmlIntegrity {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Ok => "ok",
            Self::Empty => "empty",
            Self::TooSmall => "too_small",
            Self::NoBody => "no_body",
            Self::NoAnchor => "no_anchor",
            Self::Forbidden => "forbidden",
        }
    }

    /// Lossy parse; anything unrecognized is `Unknown`
    pub fn from_db_string(s: &str) -> Self {
        match s {
            "ok" => Self::Ok,
            "empty" => Self::Empty,
            "too_small" => Self::TooSmall,
            "no_body" => Self::NoBody,
            "no_anchor" => Self::NoAnchor,
            "forbidden" => Self::Forbidden,
            _ => Self::Unknown,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Coarse page classification assigned by the parse collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageCategory {
    #[default]
    Unknown,
    Index,
    Detail,
    Review,
    Media,
    Search,
}

impl PageCategory {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Index => "index",
            Self::Detail => "detail",
            Self::Review => "review",
            Self::Media => "media",
            Self::Search => "search",
        }
    }

    /// Lossy parse; anything unrecognized is `Unknown`
    pub fn from_db_string(s: &str) -> Self {
        match s {
            "index" => Self::Index,
            "detail" => Self::Detail,
            "review" => Self::Review,
            "media" => Self::Media,
            "search" => Self::Search,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_roundtrip() {
        for status in [
            CrawlStatus::Unfetched,
            CrawlStatus::Fetched,
            CrawlStatus::Gone,
            CrawlStatus::RedirTemp,
            CrawlStatus::RedirPerm,
            CrawlStatus::Retry,
            CrawlStatus::NotModified,
            CrawlStatus::Unknown,
        ] {
            assert_eq!(CrawlStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn test_unknown_code_recovers() {
        assert_eq!(CrawlStatus::from_code(99), CrawlStatus::Unknown);
    }

    #[test]
    fn test_status_predicates() {
        assert!(CrawlStatus::Fetched.is_fetched());
        assert!(CrawlStatus::NotModified.is_fetched());
        assert!(!CrawlStatus::Unfetched.is_fetched());
        assert!(CrawlStatus::Unfetched.is_unfetched());
        assert!(CrawlStatus::RedirTemp.is_redirect());
        assert!(CrawlStatus::RedirPerm.is_redirect());
        assert!(!CrawlStatus::Gone.is_redirect());
        assert!(CrawlStatus::Gone.is_gone());
        assert!(CrawlStatus::Retry.is_retry());
    }

    #[test]
    fn test_marks_presence() {
        let mut marks = Marks::new();
        assert!(!marks.contains(Mark::Seed));

        marks.put(Mark::Seed);
        marks.put(Mark::Internal);
        assert!(marks.contains(Mark::Seed));
        assert!(marks.contains(Mark::Internal));
        assert!(!marks.contains(Mark::Fetch));

        marks.remove(Mark::Seed);
        assert!(!marks.contains(Mark::Seed));
        assert!(marks.contains(Mark::Internal));
    }

    #[test]
    fn test_marks_put_is_idempotent() {
        let mut marks = Marks::new();
        marks.put(Mark::Parse);
        marks.put(Mark::Parse);
        assert!(marks.contains(Mark::Parse));
        marks.remove(Mark::Parse);
        assert!(marks.is_empty());
    }

    #[test]
    fn test_fetch_mode_lossy_parse() {
        assert_eq!(FetchMode::from_db_string("browser"), FetchMode::Browser);
        assert_eq!(FetchMode::from_db_string("teleport"), FetchMode::Unknown);
        assert_eq!(FetchMode::from_db_string(""), FetchMode::Unknown);
    }

    #[test]
    fn test_browser_type_lossy_parse() {
        assert_eq!(BrowserType::from_db_string("chrome"), BrowserType::Chrome);
        assert_eq!(BrowserType::from_db_string("netscape"), BrowserType::Unknown);
    }

    #[test]
    fn test_html_integrity_lossy_parse() {
        assert_eq!(HtmlIntegrity::from_db_string("ok"), HtmlIntegrity::Ok);
        assert!(HtmlIntegrity::from_db_string("ok").is_ok());
        assert_eq!(
            HtmlIntegrity::from_db_string("mangled"),
            HtmlIntegrity::Unknown
        );
    }

    #[test]
    fn test_page_category_lossy_parse() {
        assert_eq!(PageCategory::from_db_string("detail"), PageCategory::Detail);
        assert_eq!(
            PageCategory::from_db_string("front_page"),
            PageCategory::Unknown
        );
    }

    #[test]
    fn test_enum_db_string_roundtrip() {
        for mode in [
            FetchMode::Unknown,
            FetchMode::Native,
            FetchMode::Proxy,
            FetchMode::Crowdsourcing,
            FetchMode::Browser,
        ] {
            assert_eq!(FetchMode::from_db_string(mode.to_db_string()), mode);
        }
        for cat in [
            PageCategory::Unknown,
            PageCategory::Index,
            PageCategory::Detail,
            PageCategory::Review,
            PageCategory::Media,
            PageCategory::Search,
        ] {
            assert_eq!(PageCategory::from_db_string(cat.to_db_string()), cat);
        }
    }
}
