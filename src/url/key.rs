use crate::{UrlError, UrlResult};
use url::Url;

/// Derives the storage key for a URL by reversing the order of its host
/// labels and folding the scheme (and explicit port) into the key prefix
///
/// # Key Shape
///
/// ```text
/// http://bar.foo.com:8983/to/index.html?a=b
///   -> com.foo.bar:http:8983/to/index.html?a=b
/// ```
///
/// Path, query and fragment are carried over untouched, so keys for the same
/// host sort together while remaining exactly invertible via [`unreverse_url`].
///
/// # Arguments
///
/// * `url_str` - An absolute http(s) URL
///
/// # Returns
///
/// * `Ok(String)` - The reversed storage key
/// * `Err(UrlError)` - The URL is malformed, non-http(s), or has no host
///
/// # Examples
///
/// ```
/// use crawl_ledger::url::reverse_url;
///
/// let key = reverse_url("https://a.b.com/x").unwrap();
/// assert_eq!(key, "com.b.a:https/x");
/// ```
pub fn reverse_url(url_str: &str) -> UrlResult<String> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?;

    let mut key = String::with_capacity(url_str.len() + 8);
    key.push_str(&reverse_host(host));
    key.push(':');
    key.push_str(url.scheme());
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(url.path());
    if let Some(query) = url.query() {
        key.push('?');
        key.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        key.push('#');
        key.push_str(fragment);
    }

    Ok(key)
}

/// Derives the storage key for a URL, or an empty string if the URL cannot
/// be keyed
///
/// An empty key means "not persistable"; callers must check before handing
/// the record to storage.
pub fn reverse_url_or_empty(url_str: &str) -> String {
    reverse_url(url_str).unwrap_or_default()
}

/// Reconstructs the original URL from a reversed storage key
///
/// Exact inverse of [`reverse_url`] for any key it produced.
///
/// # Arguments
///
/// * `key` - A reversed storage key
///
/// # Returns
///
/// * `Ok(String)` - The original URL
/// * `Err(UrlError)` - The key does not have the reversed-key shape
pub fn unreverse_url(key: &str) -> UrlResult<String> {
    // Everything before the first '/' is "<reversed-host>:<scheme>[:<port>]";
    // the rest is path + query + fragment, carried over verbatim.
    let split = key.find('/').unwrap_or(key.len());
    let (prefix, rest) = key.split_at(split);

    let mut parts = prefix.split(':');
    let reversed_host = parts
        .next()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| UrlError::MalformedKey(key.to_string()))?;
    let scheme = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UrlError::MalformedKey(key.to_string()))?;
    let port = parts.next();
    if parts.next().is_some() {
        return Err(UrlError::MalformedKey(key.to_string()));
    }
    if let Some(port) = port {
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UrlError::MalformedKey(key.to_string()));
        }
    }

    let mut url = String::with_capacity(key.len() + 8);
    url.push_str(scheme);
    url.push_str("://");
    url.push_str(&reverse_host(reversed_host));
    if let Some(port) = port {
        url.push(':');
        url.push_str(port);
    }
    url.push_str(rest);

    Ok(url)
}

/// Reverses the label order of a host name
///
/// `bar.foo.com` becomes `com.foo.bar`. Applying it twice yields the input.
pub fn reverse_host(host: &str) -> String {
    host.split('.').rev().collect::<Vec<_>>().join(".")
}
