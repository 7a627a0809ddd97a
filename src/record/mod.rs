//! The crawl record: one record per discovered URL
//!
//! This module owns the aggregate entity the whole pipeline revolves around.
//! A [`CrawlRecord`] carries fetch scheduling state, raw content, link
//! collections, scoring and the metadata sidecar, and exposes the derived-
//! field reconciliation logic (temporal sniffing, monotonic distance and
//! priority updates, content bookkeeping) the fetch, parse and index stages
//! rely on.
//!
//! A record instance has a single owner at a time. There is no internal
//! locking; concurrent writers must coordinate through the backing store's
//! per-key consistency.

mod links;
mod metadata;
mod status;
mod variables;

pub use links::{HyperLink, LinkRegistry};
pub use metadata::{MetaName, Metadata};
pub use status::{
    BrowserType, CrawlStatus, FetchMode, HtmlIntegrity, Mark, Marks, PageCategory, YES_STRING,
};
pub use variables::Variables;

use crate::config::ModelConfig;
use crate::datetime::{self, construct_time_history, first_instant_of_history};
use crate::storage::codec::RawRecord;
use crate::url::reverse_url_or_empty;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Sentinel distance for a record not reachable from any seed
pub const DISTANCE_INFINITE: i32 = 10_000;

/// Fetch interval assigned to internal records, effectively "never refetch"
const INTERNAL_FETCH_INTERVAL_SECS: u64 = 100 * 365 * 24 * 3600;

/// Issues process-scoped record ids
///
/// Owned by the caller (a pipeline run, a test) rather than being global
/// state, so id assignment is deterministic under test. Ids restart with the
/// sequencer and are never persisted; they order records within one process
/// only.
#[derive(Debug, Default)]
pub struct Sequencer(AtomicU64);

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, AtomicOrdering::Relaxed) + 1
    }
}

/// The per-URL crawl-state record
///
/// Identity is the permanent `url`; the reversed form of it is the storage
/// key. All optional fields resolve to defined defaults through the
/// accessors, so callers never observe an absent value.
#[derive(Debug)]
pub struct CrawlRecord {
    /// Process-scoped sequence number, a debugging and ordering aid only
    id: u64,
    /// Permanent canonical address, immutable after construction
    url: String,
    /// Storage key derived from `url`; empty means "not persistable"
    reversed_url: String,

    location: String,
    distance: i32,
    fetch_priority: i32,

    create_time: DateTime<Utc>,
    fetch_time: DateTime<Utc>,
    prev_fetch_time: DateTime<Utc>,
    fetch_interval_secs: u64,
    modified_time: DateTime<Utc>,
    prev_modified_time: DateTime<Utc>,
    content_publish_time: DateTime<Utc>,
    prev_content_publish_time: DateTime<Utc>,
    ref_content_publish_time: DateTime<Utc>,
    prev_ref_content_publish_time: DateTime<Utc>,
    content_modified_time: DateTime<Utc>,
    prev_content_modified_time: DateTime<Utc>,

    fetch_count: u32,
    fetch_retries: u32,
    crawl_status: CrawlStatus,

    content: Option<Vec<u8>>,
    /// In-process override of `content`, never persisted
    cached_content: Option<Vec<u8>>,
    signature: Option<Vec<u8>>,
    prev_signature: Option<Vec<u8>>,
    content_type: String,
    encoding: Option<String>,

    page_title: String,
    anchor: String,
    referrer: String,
    page_category: PageCategory,

    score: f32,
    content_score: f32,
    sort_score: String,

    live_links: std::collections::BTreeMap<String, HyperLink>,
    vivid_links: std::collections::BTreeMap<String, String>,
    dead_links: Vec<String>,
    links: LinkRegistry,
    inlinks: std::collections::BTreeMap<String, String>,

    metadata: Metadata,
    marks: Marks,
    variables: Variables,
}

impl CrawlRecord {
    /// Creates a fresh, never-fetched record for a discovered URL
    ///
    /// Scheduling fields start at their defaults and the status is
    /// `Unfetched`. A URL that cannot be keyed yields a record with an empty
    /// reversed URL; such a record is usable in memory but not persistable.
    pub fn new(url: impl Into<String>, seq: &Sequencer) -> Self {
        let url = url.into();
        let reversed_url = reverse_url_or_empty(&url);
        let epoch = datetime::epoch();

        Self {
            id: seq.next(),
            location: url.clone(),
            url,
            reversed_url,
            distance: -1,
            fetch_priority: 0,
            create_time: Utc::now(),
            fetch_time: epoch,
            prev_fetch_time: epoch,
            fetch_interval_secs: 0,
            modified_time: epoch,
            prev_modified_time: epoch,
            content_publish_time: epoch,
            prev_content_publish_time: epoch,
            ref_content_publish_time: epoch,
            prev_ref_content_publish_time: epoch,
            content_modified_time: epoch,
            prev_content_modified_time: epoch,
            fetch_count: 0,
            fetch_retries: 0,
            crawl_status: CrawlStatus::Unfetched,
            content: None,
            cached_content: None,
            signature: None,
            prev_signature: None,
            content_type: String::new(),
            encoding: None,
            page_title: String::new(),
            anchor: String::new(),
            referrer: String::new(),
            page_category: PageCategory::Unknown,
            score: 0.0,
            content_score: 0.0,
            sort_score: String::new(),
            live_links: Default::default(),
            vivid_links: Default::default(),
            dead_links: Vec::new(),
            links: LinkRegistry::new(),
            inlinks: Default::default(),
            metadata: Metadata::new(),
            marks: Marks::new(),
            variables: Variables::new(),
        }
    }

    /// Creates an internal utility record
    ///
    /// Internal records belong to the pipeline itself (status pages, link
    /// collectors); they are marked INTERNAL and INACTIVE and scheduled so
    /// far in the future that no fetcher ever picks them up.
    pub fn internal(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<Vec<u8>>,
        seq: &Sequencer,
    ) -> Self {
        let mut record = Self::new(url, seq);

        record.modified_time = datetime::epoch();
        record.prev_fetch_time = datetime::epoch();
        record.fetch_time = datetime::doomsday();
        record.fetch_interval_secs = INTERNAL_FETCH_INTERVAL_SECS;
        record.distance = DISTANCE_INFINITE;
        record.marks.put(Mark::Internal);
        record.marks.put(Mark::Inactive);
        record.page_title = title.into();
        record.set_content(Some(content.into()));

        record
    }

    /// Boxes an existing persisted record around its `(url, reversed_url)`
    /// pair
    ///
    /// The transient cache and the cached-content override start empty; the
    /// location defaults to the url when the stored record carries none.
    pub fn hydrate(
        url: impl Into<String>,
        reversed_url: impl Into<String>,
        raw: RawRecord,
        seq: &Sequencer,
    ) -> Self {
        let url = url.into();
        let location = if raw.location.is_empty() {
            url.clone()
        } else {
            raw.location
        };

        Self {
            id: seq.next(),
            url,
            reversed_url: reversed_url.into(),
            location,
            distance: raw.distance,
            fetch_priority: raw.fetch_priority,
            create_time: raw.create_time,
            fetch_time: raw.fetch_time,
            prev_fetch_time: raw.prev_fetch_time,
            fetch_interval_secs: raw.fetch_interval_secs,
            modified_time: raw.modified_time,
            prev_modified_time: raw.prev_modified_time,
            content_publish_time: raw.content_publish_time,
            prev_content_publish_time: raw.prev_content_publish_time,
            ref_content_publish_time: raw.ref_content_publish_time,
            prev_ref_content_publish_time: raw.prev_ref_content_publish_time,
            content_modified_time: raw.content_modified_time,
            prev_content_modified_time: raw.prev_content_modified_time,
            fetch_count: raw.fetch_count,
            fetch_retries: raw.fetch_retries,
            crawl_status: CrawlStatus::from_code(raw.crawl_status),
            content: raw.content,
            cached_content: None,
            signature: raw.signature,
            prev_signature: raw.prev_signature,
            content_type: raw.content_type,
            encoding: raw.encoding,
            page_title: raw.page_title,
            anchor: raw.anchor,
            referrer: raw.referrer,
            page_category: raw.page_category,
            score: raw.score,
            content_score: raw.content_score,
            sort_score: raw.sort_score,
            live_links: raw.live_links,
            vivid_links: raw.vivid_links,
            dead_links: raw.dead_links,
            links: raw.links,
            inlinks: raw.inlinks,
            metadata: raw.metadata,
            marks: raw.marks,
            variables: Variables::new(),
        }
    }

    /// Extracts the persisted form of this record
    ///
    /// The transient cache and the cached-content override are not part of
    /// the persisted form by design.
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            location: self.location.clone(),
            distance: self.distance,
            fetch_priority: self.fetch_priority,
            create_time: self.create_time,
            fetch_time: self.fetch_time,
            prev_fetch_time: self.prev_fetch_time,
            fetch_interval_secs: self.fetch_interval_secs,
            modified_time: self.modified_time,
            prev_modified_time: self.prev_modified_time,
            content_publish_time: self.content_publish_time,
            prev_content_publish_time: self.prev_content_publish_time,
            ref_content_publish_time: self.ref_content_publish_time,
            prev_ref_content_publish_time: self.prev_ref_content_publish_time,
            content_modified_time: self.content_modified_time,
            prev_content_modified_time: self.prev_content_modified_time,
            fetch_count: self.fetch_count,
            fetch_retries: self.fetch_retries,
            crawl_status: self.crawl_status.code(),
            content: self.content.clone(),
            signature: self.signature.clone(),
            prev_signature: self.prev_signature.clone(),
            content_type: self.content_type.clone(),
            encoding: self.encoding.clone(),
            page_title: self.page_title.clone(),
            anchor: self.anchor.clone(),
            referrer: self.referrer.clone(),
            page_category: self.page_category,
            score: self.score,
            content_score: self.content_score,
            sort_score: self.sort_score.clone(),
            live_links: self.live_links.clone(),
            vivid_links: self.vivid_links.clone(),
            dead_links: self.dead_links.clone(),
            links: self.links.clone(),
            inlinks: self.inlinks.clone(),
            metadata: self.metadata.clone(),
            marks: self.marks.clone(),
        }
    }

    // ===== Identity =====

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The permanent canonical address
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The storage key; alias of [`Self::reversed_url`]
    pub fn key(&self) -> &str {
        &self.reversed_url
    }

    pub fn reversed_url(&self) -> &str {
        &self.reversed_url
    }

    /// Whether the record can be handed to storage (it has a non-empty key)
    pub fn is_persistable(&self) -> bool {
        !self.reversed_url.is_empty()
    }

    /// The last working address; may differ from `url` after redirects
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    // ===== Marks =====

    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    pub fn marks_mut(&mut self) -> &mut Marks {
        &mut self.marks
    }

    pub fn has_mark(&self, mark: Mark) -> bool {
        self.marks.contains(mark)
    }

    pub fn is_internal(&self) -> bool {
        self.has_mark(Mark::Internal)
    }

    pub fn mark_seed(&mut self) {
        self.metadata.set(MetaName::IsSeed, Some(YES_STRING));
    }

    pub fn unmark_seed(&mut self) {
        self.metadata.remove(MetaName::IsSeed);
    }

    pub fn is_seed(&self) -> bool {
        self.metadata.contains(MetaName::IsSeed)
    }

    // ===== Metadata and the transient cache =====

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    /// Memoizing read of a rich metadata value
    ///
    /// Checks the transient cache first; on miss, deserializes the persisted
    /// JSON string under `key`, populates the cache and returns the value.
    /// Returns None when the slot is absent or does not parse as `T`.
    pub fn get_cached_json<T>(&mut self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        if let Some(cached) = self.variables.get::<T>(key) {
            return Some(cached.clone());
        }

        let json = self.metadata.get_raw(key)?;
        let value: T = serde_json::from_str(json).ok()?;
        self.variables.set(key, value.clone());
        Some(value)
    }

    /// Writes a rich metadata value to both tiers
    ///
    /// Postcondition: the serialized form is in the metadata store (and will
    /// be persisted with the record) and the object form is in the transient
    /// cache. Persistence only ever reflects the metadata store.
    pub fn set_cached_json<T>(&mut self, key: &str, value: T) -> Result<(), serde_json::Error>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        let json = serde_json::to_string(&value)?;
        self.metadata.set_raw(key, Some(&json));
        self.variables.set(key, value);
        Ok(())
    }

    pub fn query(&self) -> Option<&str> {
        self.metadata.get(MetaName::Query)
    }

    pub fn set_query(&mut self, query: Option<&str>) {
        self.metadata.set(MetaName::Query, query);
    }

    pub fn proxy(&self) -> Option<&str> {
        self.metadata.get(MetaName::Proxy)
    }

    pub fn set_proxy(&mut self, proxy: Option<&str>) {
        self.metadata.set(MetaName::Proxy, proxy);
    }

    pub fn fetch_mode(&self) -> FetchMode {
        FetchMode::from_db_string(self.metadata.get_or_default(MetaName::FetchMode, ""))
    }

    /// Fetch mode determines the protocol, so it must be set before fetch
    pub fn set_fetch_mode(&mut self, mode: FetchMode) {
        self.metadata.set(MetaName::FetchMode, Some(mode.to_db_string()));
    }

    pub fn last_browser(&self) -> BrowserType {
        BrowserType::from_db_string(self.metadata.get_or_default(MetaName::Browser, ""))
    }

    pub fn set_last_browser(&mut self, browser: BrowserType) {
        self.metadata.set(MetaName::Browser, Some(browser.to_db_string()));
    }

    pub fn html_integrity(&self) -> HtmlIntegrity {
        HtmlIntegrity::from_db_string(self.metadata.get_or_default(MetaName::HtmlIntegrity, ""))
    }

    pub fn set_html_integrity(&mut self, integrity: HtmlIntegrity) {
        self.metadata
            .set(MetaName::HtmlIntegrity, Some(integrity.to_db_string()));
    }

    pub fn generate_time(&self) -> DateTime<Utc> {
        self.metadata
            .get_instant(MetaName::GenerateTime, datetime::epoch())
    }

    pub fn set_generate_time(&mut self, time: DateTime<Utc>) {
        self.metadata.set_instant(MetaName::GenerateTime, time);
    }

    /// Response time of the last fetch, zero when unrecorded
    pub fn last_timeout(&self) -> std::time::Duration {
        let millis = self
            .metadata
            .get(MetaName::ResponseTime)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);
        std::time::Duration::from_millis(millis)
    }

    pub fn set_last_timeout(&mut self, timeout: std::time::Duration) {
        self.metadata
            .set(MetaName::ResponseTime, Some(&timeout.as_millis().to_string()));
    }

    // ===== Distance and priority =====

    /// Hop count from the seed set; negative stored values read as infinite
    pub fn distance(&self) -> i32 {
        if self.distance < 0 {
            DISTANCE_INFINITE
        } else {
            self.distance
        }
    }

    pub fn set_distance(&mut self, distance: i32) {
        self.distance = distance;
    }

    /// Monotonic shrink: a page can get closer to a seed but never farther
    ///
    /// Returns whether the distance was updated.
    pub fn update_distance(&mut self, new_distance: i32) -> bool {
        if new_distance < self.distance() {
            self.distance = new_distance;
            true
        } else {
            false
        }
    }

    /// Explicit priority, falling back to the configured default when unset
    pub fn fetch_priority(&self, config: &ModelConfig) -> i32 {
        if self.fetch_priority > 0 {
            self.fetch_priority
        } else {
            config.fetch_priority_default
        }
    }

    pub fn set_fetch_priority(&mut self, priority: i32) {
        self.fetch_priority = priority;
    }

    /// Effective priority: shallow pages are boosted regardless of explicit
    /// priority, deep pages rely on the explicit priority alone
    pub fn sniff_fetch_priority(&self, config: &ModelConfig) -> i32 {
        let mut priority = self.fetch_priority(config);

        let depth = self.distance();
        if depth < config.fetch_priority_depth_base {
            priority = priority.max(config.fetch_priority_depth_base - depth);
        }

        priority
    }

    // ===== Scheduling times =====

    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    pub fn set_create_time(&mut self, time: DateTime<Utc>) {
        self.create_time = time;
    }

    pub fn fetch_time(&self) -> DateTime<Utc> {
        self.fetch_time
    }

    pub fn set_fetch_time(&mut self, time: DateTime<Utc>) {
        self.fetch_time = time;
    }

    pub fn prev_fetch_time(&self) -> DateTime<Utc> {
        self.prev_fetch_time
    }

    pub fn set_prev_fetch_time(&mut self, time: DateTime<Utc>) {
        self.prev_fetch_time = time;
    }

    /// Advances the scheduled fetch time, keeping the displaced value
    pub fn update_fetch_time(&mut self, next: DateTime<Utc>) {
        self.prev_fetch_time = self.fetch_time;
        self.fetch_time = next;
    }

    /// The most recent completed fetch, as opposed to the next scheduled one
    ///
    /// A fetch time in the future means the scheduler already advanced it for
    /// the next run; the previous fetch time is the completed one then.
    pub fn last_fetch_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if self.fetch_time > now {
            self.prev_fetch_time
        } else {
            self.fetch_time
        }
    }

    pub fn fetch_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_interval_secs)
    }

    pub fn set_fetch_interval(&mut self, interval: std::time::Duration) {
        self.fetch_interval_secs = interval.as_secs();
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count
    }

    pub fn set_fetch_count(&mut self, count: u32) {
        self.fetch_count = count;
    }

    pub fn increase_fetch_count(&mut self) {
        self.fetch_count += 1;
    }

    pub fn fetch_retries(&self) -> u32 {
        self.fetch_retries
    }

    pub fn set_fetch_retries(&mut self, retries: u32) {
        self.fetch_retries = retries;
    }

    pub fn crawl_status(&self) -> CrawlStatus {
        self.crawl_status
    }

    pub fn set_crawl_status(&mut self, status: CrawlStatus) {
        self.crawl_status = status;
    }

    // ===== Temporal reconciliation =====

    /// Whether an instant falls inside the plausibility window
    ///
    /// Valid candidates are strictly after the configured minimum publish
    /// instant and strictly before now + 2 days (tolerance for clock skew
    /// and scheduled-ahead publication).
    pub fn is_valid_publish_time(&self, config: &ModelConfig, time: DateTime<Utc>) -> bool {
        time > config.min_publish_instant() && time < Utc::now() + Duration::days(2)
    }

    pub fn modified_time(&self) -> DateTime<Utc> {
        self.modified_time
    }

    pub fn set_modified_time(&mut self, time: DateTime<Utc>) {
        self.modified_time = time;
    }

    pub fn prev_modified_time(&self) -> DateTime<Utc> {
        self.prev_modified_time
    }

    pub fn set_prev_modified_time(&mut self, time: DateTime<Utc>) {
        self.prev_modified_time = time;
    }

    /// Guarded monotonic update of the authoritative modified time
    pub fn update_modified_time(&mut self, new_time: DateTime<Utc>) -> bool {
        if new_time > self.modified_time {
            self.prev_modified_time = self.modified_time;
            self.modified_time = new_time;
            true
        } else {
            false
        }
    }

    /// The header-reported last-modified instant, epoch when absent
    pub fn header_modified_time(&self) -> DateTime<Utc> {
        self.metadata
            .get_instant(MetaName::HeaderLastModified, datetime::epoch())
    }

    pub fn set_header_modified_time(&mut self, time: DateTime<Utc>) {
        self.metadata.set_instant(MetaName::HeaderLastModified, time);
    }

    /// Merges the noisy modified-time signals into a best-known value
    ///
    /// Best-effort max over valid candidates, evaluated in header -> content
    /// -> publish precedence, each compared against the running maximum. A
    /// result more than one day ahead of now is clamped to now; such values
    /// come from corrupt inputs.
    pub fn sniff_modified_time(&self, config: &ModelConfig) -> DateTime<Utc> {
        let mut modified_time = self.modified_time;

        let candidates = [
            self.header_modified_time(),
            self.content_modified_time,
            self.content_publish_time,
        ];
        for candidate in candidates {
            if self.is_valid_publish_time(config, candidate) && candidate > modified_time {
                modified_time = candidate;
            }
        }

        let now = Utc::now();
        if modified_time > now + Duration::days(1) {
            tracing::warn!(
                url = %self.url,
                sniffed = %modified_time,
                "implausible modified time, clamping to now"
            );
            modified_time = now;
        }

        modified_time
    }

    pub fn content_publish_time(&self) -> DateTime<Utc> {
        self.content_publish_time
    }

    pub fn set_content_publish_time(&mut self, time: DateTime<Utc>) {
        self.content_publish_time = time;
    }

    pub fn prev_content_publish_time(&self) -> DateTime<Utc> {
        self.prev_content_publish_time
    }

    /// Guarded monotonic update of the content publish time
    ///
    /// Rejects implausible instants; otherwise advances only when the new
    /// time is strictly later, rotating the displaced value into the prev
    /// slot. Returns whether an update occurred.
    pub fn update_content_publish_time(
        &mut self,
        config: &ModelConfig,
        new_time: DateTime<Utc>,
    ) -> bool {
        if !self.is_valid_publish_time(config, new_time) {
            return false;
        }

        if new_time > self.content_publish_time {
            self.prev_content_publish_time = self.content_publish_time;
            self.content_publish_time = new_time;
            true
        } else {
            false
        }
    }

    pub fn content_modified_time(&self) -> DateTime<Utc> {
        self.content_modified_time
    }

    pub fn set_content_modified_time(&mut self, time: DateTime<Utc>) {
        self.content_modified_time = time;
    }

    pub fn prev_content_modified_time(&self) -> DateTime<Utc> {
        self.prev_content_modified_time
    }

    /// Guarded monotonic update of the content modified time
    pub fn update_content_modified_time(
        &mut self,
        config: &ModelConfig,
        new_time: DateTime<Utc>,
    ) -> bool {
        if !self.is_valid_publish_time(config, new_time) {
            return false;
        }

        if new_time > self.content_modified_time {
            self.prev_content_modified_time = self.content_modified_time;
            self.content_modified_time = new_time;
            true
        } else {
            false
        }
    }

    pub fn ref_content_publish_time(&self) -> DateTime<Utc> {
        self.ref_content_publish_time
    }

    pub fn set_ref_content_publish_time(&mut self, time: DateTime<Utc>) {
        self.ref_content_publish_time = time;
    }

    pub fn prev_ref_content_publish_time(&self) -> DateTime<Utc> {
        self.prev_ref_content_publish_time
    }

    /// Guarded monotonic update of the referred-content publish time
    pub fn update_ref_content_publish_time(
        &mut self,
        config: &ModelConfig,
        new_time: DateTime<Utc>,
    ) -> bool {
        if !self.is_valid_publish_time(config, new_time) {
            return false;
        }

        if new_time > self.ref_content_publish_time {
            self.prev_ref_content_publish_time = self.ref_content_publish_time;
            self.ref_content_publish_time = new_time;
            true
        } else {
            false
        }
    }

    // ===== Fetch / index time histories =====

    pub fn fetch_time_history<'a>(&'a self, default: &'a str) -> &'a str {
        self.metadata.get_or_default(MetaName::FetchTimeHistory, default)
    }

    pub fn put_fetch_time_history(&mut self, config: &ModelConfig, fetch_time: DateTime<Utc>) {
        let history = construct_time_history(
            self.metadata.get(MetaName::FetchTimeHistory),
            fetch_time,
            config.time_history_cap,
        );
        self.metadata.set(MetaName::FetchTimeHistory, Some(&history));
    }

    /// The oldest recorded fetch instant, or `default` for a fresh record
    pub fn first_crawl_time(&self, default: DateTime<Utc>) -> DateTime<Utc> {
        first_instant_of_history(self.fetch_time_history("")).unwrap_or(default)
    }

    pub fn index_time_history<'a>(&'a self, default: &'a str) -> &'a str {
        self.metadata.get_or_default(MetaName::IndexTimeHistory, default)
    }

    pub fn put_index_time_history(&mut self, config: &ModelConfig, index_time: DateTime<Utc>) {
        let history = construct_time_history(
            self.metadata.get(MetaName::IndexTimeHistory),
            index_time,
            config.time_history_cap,
        );
        self.metadata.set(MetaName::IndexTimeHistory, Some(&history));
    }

    pub fn first_index_time(&self, default: DateTime<Utc>) -> DateTime<Utc> {
        first_instant_of_history(self.index_time_history("")).unwrap_or(default)
    }

    // ===== Content =====

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// The raw content, preferring the in-process cached view
    ///
    /// A pipeline stage may attach a decoded or transformed view via
    /// [`Self::set_cached_content`] without touching the persisted bytes.
    pub fn content(&self) -> Option<&[u8]> {
        self.cached_content.as_deref().or(self.content.as_deref())
    }

    /// The persisted content, ignoring any cached view
    pub fn uncached_content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    pub fn cached_content(&self) -> Option<&[u8]> {
        self.cached_content.as_deref()
    }

    pub fn set_cached_content(&mut self, content: Option<Vec<u8>>) {
        self.cached_content = content;
    }

    pub fn content_as_string(&self) -> String {
        String::from_utf8_lossy(self.content().unwrap_or_default()).into_owned()
    }

    /// Stores fetched content and maintains the content-size statistics
    ///
    /// A non-empty buffer records its byte length and folds it into the
    /// running average over fetches; empty or absent content leaves the
    /// statistics untouched.
    pub fn set_content(&mut self, content: Option<Vec<u8>>) {
        match content {
            Some(bytes) => {
                let len = bytes.len();
                self.content = Some(bytes);
                self.record_content_bytes(len);
            }
            None => {
                self.content = None;
            }
        }
    }

    fn record_content_bytes(&mut self, bytes: usize) {
        if bytes == 0 {
            return;
        }

        self.metadata.set_int(MetaName::ContentBytes, bytes as i32);

        // `count` is the fetch count before the increment for this fetch
        let count = i64::from(self.fetch_count);
        let last_ave = i64::from(self.metadata.get_int(MetaName::AveContentBytes, 0));

        let ave = if count > 0 && last_ave == 0 {
            // record written by an old version that kept no average
            bytes as i64
        } else {
            (last_ave * count + bytes as i64) / (count + 1)
        };

        self.metadata.set_int(MetaName::AveContentBytes, ave as i32);
    }

    pub fn content_bytes(&self) -> i32 {
        self.metadata.get_int(MetaName::ContentBytes, 0)
    }

    pub fn ave_content_bytes(&self) -> i32 {
        self.metadata.get_int(MetaName::AveContentBytes, 0)
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        self.content_type = content_type.trim().to_lowercase();
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn encoding_or_default<'a>(&'a self, default: &'a str) -> &'a str {
        self.encoding.as_deref().unwrap_or(default)
    }

    /// Records the detected encoding together with the conversion hint the
    /// parse stage reads from metadata
    pub fn set_encoding(&mut self, encoding: Option<&str>) {
        self.encoding = encoding.map(|e| e.to_string());
        self.metadata
            .set(MetaName::CharEncodingForConversion, encoding);
    }

    pub fn encoding_clues(&self) -> &str {
        self.metadata.get_or_default(MetaName::EncodingClues, "")
    }

    pub fn set_encoding_clues(&mut self, clues: &str) {
        self.metadata.set(MetaName::EncodingClues, Some(clues));
    }

    // ===== Signature =====

    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    pub fn set_signature(&mut self, signature: Vec<u8>) {
        self.signature = Some(signature);
    }

    pub fn signature_as_string(&self) -> String {
        hex::encode(self.signature.as_deref().unwrap_or_default())
    }

    pub fn prev_signature(&self) -> Option<&[u8]> {
        self.prev_signature.as_deref()
    }

    pub fn set_prev_signature(&mut self, signature: Option<Vec<u8>>) {
        self.prev_signature = signature;
    }

    pub fn prev_signature_as_string(&self) -> String {
        hex::encode(self.prev_signature.as_deref().unwrap_or_default())
    }

    /// Refingerprints the current content, keeping the displaced signature
    /// for change detection by collaborators
    pub fn update_signature(&mut self) {
        self.prev_signature = self.signature.take();
        self.signature = Some(compute_signature(self.content().unwrap_or_default()));
    }

    // ===== Links =====

    /// Embedded hyperlinks which direct outside the current domain
    pub fn live_links(&self) -> &std::collections::BTreeMap<String, HyperLink> {
        &self.live_links
    }

    pub fn simple_live_links(&self) -> impl Iterator<Item = &String> {
        self.live_links.keys()
    }

    pub fn set_live_links(&mut self, links: impl IntoIterator<Item = HyperLink>) {
        self.live_links.clear();
        for link in links {
            self.live_links.insert(link.url.clone(), link);
        }
    }

    pub fn add_live_link(&mut self, link: HyperLink) {
        self.live_links.insert(link.url.clone(), link);
    }

    pub fn vivid_links(&self) -> &std::collections::BTreeMap<String, String> {
        &self.vivid_links
    }

    pub fn vivid_links_mut(&mut self) -> &mut std::collections::BTreeMap<String, String> {
        &mut self.vivid_links
    }

    pub fn dead_links(&self) -> &[String] {
        &self.dead_links
    }

    pub fn set_dead_links(&mut self, links: Vec<String>) {
        self.dead_links = links;
    }

    pub fn inlinks(&self) -> &std::collections::BTreeMap<String, String> {
        &self.inlinks
    }

    pub fn add_inlink(&mut self, url: impl Into<String>, anchor: impl Into<String>) {
        self.inlinks.insert(url.into(), anchor.into());
    }

    /// All outbound URLs ever discovered on this page, bounded FIFO
    pub fn links(&self) -> &LinkRegistry {
        &self.links
    }

    pub fn set_links(&mut self, links: Vec<String>) {
        self.links.replace(links);
    }

    /// Records newly discovered outbound URLs
    ///
    /// Returns the number of links actually appended; the imprecise link
    /// counter advances by the same amount.
    pub fn add_links(
        &mut self,
        config: &ModelConfig,
        urls: impl IntoIterator<Item = String>,
    ) -> usize {
        let appended = self.links.append_bounded(urls, config.max_links_per_page);
        if appended > 0 {
            self.increase_imprecise_link_count(appended as i32);
        }
        appended
    }

    /// [`Self::add_links`] over hyperlinks, keeping only their URLs
    pub fn add_hyper_links(
        &mut self,
        config: &ModelConfig,
        links: impl IntoIterator<Item = HyperLink>,
    ) -> usize {
        self.add_links(config, links.into_iter().map(|l| l.url))
    }

    /// Cumulative count of discovered outbound links
    ///
    /// Imprecise by design: once the registry has evicted old entries this
    /// counter diverges from `links().len()`.
    pub fn imprecise_link_count(&self) -> i32 {
        self.metadata.get_int(MetaName::TotalOutLinks, 0)
    }

    pub fn set_imprecise_link_count(&mut self, count: i32) {
        self.metadata.set_int(MetaName::TotalOutLinks, count);
    }

    pub fn increase_imprecise_link_count(&mut self, count: i32) {
        let old = self.imprecise_link_count();
        self.set_imprecise_link_count(old + count);
    }

    pub fn inlink_anchors(&self) -> Vec<String> {
        self.metadata
            .get_or_default(MetaName::Anchors, "")
            .split('\n')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    pub fn set_inlink_anchors(&mut self, anchors: &[String]) {
        self.metadata.set(MetaName::Anchors, Some(&anchors.join("\n")));
    }

    // ===== Page text fields =====

    pub fn page_title(&self) -> &str {
        &self.page_title
    }

    pub fn set_page_title(&mut self, title: impl Into<String>) {
        self.page_title = title.into();
    }

    /// Anchor text this page was discovered under
    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn set_anchor(&mut self, anchor: impl Into<String>) {
        self.anchor = anchor.into();
    }

    pub fn referrer(&self) -> &str {
        &self.referrer
    }

    pub fn set_referrer(&mut self, referrer: impl Into<String>) {
        self.referrer = referrer.into();
    }

    pub fn page_category(&self) -> PageCategory {
        self.page_category
    }

    pub fn set_page_category(&mut self, category: PageCategory) {
        self.page_category = category;
    }

    // ===== Scoring =====

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn set_score(&mut self, score: f32) {
        self.score = score;
    }

    pub fn content_score(&self) -> f32 {
        self.content_score
    }

    pub fn set_content_score(&mut self, score: f32) {
        self.content_score = score;
    }

    pub fn sort_score(&self) -> &str {
        &self.sort_score
    }

    pub fn set_sort_score(&mut self, score: impl Into<String>) {
        self.sort_score = score.into();
    }

    pub fn cash(&self) -> f32 {
        self.metadata.get_float(MetaName::CashKey, 0.0)
    }

    pub fn set_cash(&mut self, cash: f32) {
        self.metadata.set_float(MetaName::CashKey, cash);
    }
}

/// SHA-256 fingerprint of a content buffer
pub fn compute_signature(content: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher.finalize().to_vec()
}

// Record identity is the url alone; id is process-scoped noise.

impl PartialEq for CrawlRecord {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for CrawlRecord {}

impl PartialOrd for CrawlRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CrawlRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.url.cmp(&other.url)
    }
}

impl Hash for CrawlRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}
