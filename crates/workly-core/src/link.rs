//! Link identity normalization.
//!
//! Two postings are the same posting when their links normalize to the same
//! identity: scheme and lowercased host kept, path without trailing slash
//! (`/` when empty), query and fragment dropped.

use sha2::{Digest, Sha256};
use url::Url;

/// Normalize a link into its identity form.
///
/// Links that do not parse as absolute URLs are normalized textually with the
/// same rules, so the function never fails.
#[must_use]
pub fn link_identity(link: &str) -> String {
    let link = link.trim();
    if link.is_empty() {
        return String::new();
    }

    match Url::parse(link) {
        Ok(url) if url.has_host() => {
            let host = url.host_str().unwrap_or_default().to_lowercase();
            let authority = match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host,
            };
            let path = url.path().trim_end_matches('/');
            let path = if path.is_empty() { "/" } else { path };
            format!("{}://{}{}", url.scheme(), authority, path)
        }
        _ => {
            let end = link.find(|c: char| c == '?' || c == '#').unwrap_or(link.len());
            let trimmed = link[..end].trim_end_matches('/');
            if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}

/// Lowercase hex SHA-256 of the link identity.
#[must_use]
pub fn link_hash(link: &str) -> String {
    let identity = link_identity(link);
    hex::encode(Sha256::digest(identity.as_bytes()))
}

/// Make a site-relative link absolute against `base_url`.
///
/// Absolute links are returned unchanged; empty links stay empty.
#[must_use]
pub fn absolutize(link: &str, base_url: &str) -> String {
    let link = link.trim();
    if link.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), link)
    } else {
        link.to_string()
    }
}
