//! URL key handling
//!
//! Records are stored under a reversed form of their URL so that pages from
//! the same host occupy a contiguous key range in sorted storage. This module
//! implements the reversible key codec.

mod key;

pub use key::{reverse_host, reverse_url, reverse_url_or_empty, unreverse_url};
