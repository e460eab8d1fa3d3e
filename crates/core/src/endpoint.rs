//! AtomPub endpoint URIs
//!
//! `blog_domain` is used verbatim; resolving a short blog ID to the full
//! domain is up to the caller.

use crate::credentials::BlogCredentials;
use crate::error::HatenaError;

pub const DEFAULT_BASE_URL: &str = "https://blog.hatena.ne.jp";

/// Hosts that may be reached over plain `http://`
const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

/// Reject base URLs that would send credentials in cleartext.
///
/// Only `https://` is accepted, except `http://` to a loopback host.
pub fn validate_base_url(base_url: &str) -> Result<(), HatenaError> {
    let lower = base_url.trim().to_ascii_lowercase();

    if let Some(rest) = lower.strip_prefix("https://") {
        if !rest.is_empty() {
            return Ok(());
        }
    } else if let Some(rest) = lower.strip_prefix("http://") {
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let host = match authority.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => host,
            _ => authority,
        };
        if LOOPBACK_HOSTS.contains(&host) {
            return Ok(());
        }
        return Err(HatenaError::Configuration(format!(
            "Base URL {base_url:?} is not HTTPS; credentials are only sent over HTTPS"
        )));
    }

    Err(HatenaError::Configuration(format!(
        "Base URL {base_url:?} must start with https://"
    )))
}

/// Service document: `{base}/{hatena_id}/{blog_domain}/atom`
pub fn service_document_uri(base_url: &str, credentials: &BlogCredentials) -> String {
    format!(
        "{}/{}/{}/atom",
        base_url.trim_end_matches('/'),
        credentials.hatena_id,
        credentials.blog_domain
    )
}

/// Collection URI, optionally positioned at a pagination cursor
pub fn collection_uri(
    base_url: &str,
    credentials: &BlogCredentials,
    cursor: Option<&str>,
) -> String {
    let uri = format!("{}/entry", service_document_uri(base_url, credentials));
    match cursor {
        Some(cursor) => format!("{uri}?page={}", urlencoding::encode(cursor)),
        None => uri,
    }
}

/// Member URI of a single entry
pub fn member_uri(base_url: &str, credentials: &BlogCredentials, entry_id: &str) -> String {
    format!(
        "{}/{}",
        collection_uri(base_url, credentials, None),
        entry_id
    )
}
