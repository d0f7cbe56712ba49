//! URL handling module for Quote-Trawler
//!
//! Origin validation, the robots.txt location, and resolution of pagination
//! links against the origin.

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and checks a crawl origin
///
/// The origin must be an absolute `http` or `https` URL with a host.
///
/// # Examples
///
/// ```
/// use quote_trawler::url::parse_origin;
///
/// let origin = parse_origin("https://quotes.toscrape.com").unwrap();
/// assert_eq!(origin.as_str(), "https://quotes.toscrape.com/");
/// assert!(parse_origin("mailto:someone@example.com").is_err());
/// ```
pub fn parse_origin(origin: &str) -> UrlResult<Url> {
    let url = Url::parse(origin.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns the robots.txt location for an origin
///
/// `robots.txt` is resolved against the origin the same way a relative link
/// would be, so an origin with a path keeps its directory.
pub fn robots_url(origin: &Url) -> UrlResult<Url> {
    origin
        .join("robots.txt")
        .map_err(|e| UrlError::Parse(e.to_string()))
}

/// Resolves a link href against a base URL
///
/// Returns None if the link cannot be followed:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: schemes
/// - hrefs that do not resolve to an HTTP(S) URL
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}
