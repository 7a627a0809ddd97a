//! The persisted metadata sidecar of a record
//!
//! Soft fields without a first-class storage slot live here as string
//! key/value pairs. The key vocabulary is enumerated in [`MetaName`] so
//! callers cannot typo a slot name, but the map itself stays open: fields can
//! be added without a schema migration, and unknown keys written by newer
//! versions survive a round trip untouched.

use crate::datetime::{format_instant, parse_instant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The enumerated key vocabulary of the metadata store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaName {
    Query,
    Proxy,
    FetchMode,
    Browser,
    HtmlIntegrity,
    GenerateTime,
    FetchTimeHistory,
    IndexTimeHistory,
    TotalOutLinks,
    AveContentBytes,
    ContentBytes,
    Anchors,
    EncodingClues,
    CashKey,
    IsSeed,
    CharEncodingForConversion,
    HeaderLastModified,
    ResponseTime,
}

impl MetaName {
    /// The string key this name occupies in the store
    pub fn key(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Proxy => "proxy",
            Self::FetchMode => "fetch_mode",
            Self::Browser => "browser",
            Self::HtmlIntegrity => "html_integrity",
            Self::GenerateTime => "generate_time",
            Self::FetchTimeHistory => "fetch_time_history",
            Self::IndexTimeHistory => "index_time_history",
            Self::TotalOutLinks => "total_out_links",
            Self::AveContentBytes => "ave_content_bytes",
            Self::ContentBytes => "content_bytes",
            Self::Anchors => "anchors",
            Self::EncodingClues => "encoding_clues",
            Self::CashKey => "cash",
            Self::IsSeed => "is_seed",
            Self::CharEncodingForConversion => "char_encoding_for_conversion",
            Self::HeaderLastModified => "header_last_modified",
            Self::ResponseTime => "response_time",
        }
    }
}

/// Persisted string-keyed map of typed values layered under the record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: MetaName) -> Option<&str> {
        self.get_raw(name.key())
    }

    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn get_or_default<'a>(&'a self, name: MetaName, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn get_int(&self, name: MetaName, default: i32) -> i32 {
        self.get(name)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    pub fn get_float(&self, name: MetaName, default: f32) -> f32 {
        self.get(name)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    pub fn get_instant(&self, name: MetaName, default: DateTime<Utc>) -> DateTime<Utc> {
        self.get(name)
            .map(|s| parse_instant(s, default))
            .unwrap_or(default)
    }

    /// Writes a value under the name; `None` removes the key rather than
    /// storing an empty string
    pub fn set(&mut self, name: MetaName, value: Option<&str>) {
        self.set_raw(name.key(), value);
    }

    pub fn set_raw(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(v) => {
                self.0.insert(key.to_string(), v.to_string());
            }
            None => {
                self.0.remove(key);
            }
        }
    }

    pub fn set_int(&mut self, name: MetaName, value: i32) {
        self.set(name, Some(&value.to_string()));
    }

    pub fn set_float(&mut self, name: MetaName, value: f32) {
        self.set(name, Some(&value.to_string()));
    }

    pub fn set_instant(&mut self, name: MetaName, value: DateTime<Utc>) {
        self.set(name, Some(&format_instant(value)));
    }

    pub fn contains(&self, name: MetaName) -> bool {
        self.0.contains_key(name.key())
    }

    pub fn remove(&mut self, name: MetaName) -> Option<String> {
        self.0.remove(name.key())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}
