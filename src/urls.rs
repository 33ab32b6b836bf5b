//! Line-delimited URL list parsing
//!
//! Job requests carry one absolute URL per line. Every line must hold a URL
//! with both a scheme and a host; blank lines are rejected like any other
//! invalid line.
//!
//! Parsed URLs keep the text they came from. The `url` crate lowercases
//! hosts, but link classification compares hosts exactly as written.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors raised while parsing a URL list
#[derive(Debug, Error)]
pub enum UrlListError {
    #[error("failed to parse url on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid url on line {line}: {url:?}")]
    Invalid { line: usize, url: String },
}

impl UrlListError {
    /// Returns the 1-based line the error refers to
    pub fn line(&self) -> usize {
        match self {
            Self::Parse { line, .. } | Self::Invalid { line, .. } => *line,
        }
    }
}

/// An absolute URL together with the text it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    text: String,
    url: Url,
}

impl TargetUrl {
    /// Parses an absolute URL, keeping its text with surrounding whitespace trimmed
    pub fn parse(text: &str) -> Result<Self, url::ParseError> {
        let text = text.trim();
        Ok(Self {
            url: Url::parse(text)?,
            text: text.to_string(),
        })
    }

    /// The normalized URL used for fetching
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL as it was submitted
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The host as it was submitted, case preserved
    pub fn host(&self) -> Option<&str> {
        authority_host(&self.text)
    }
}

impl From<Url> for TargetUrl {
    fn from(url: Url) -> Self {
        Self {
            text: url.to_string(),
            url,
        }
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for TargetUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// Extracts the host of a URL reference from its raw text
///
/// Only references with an authority (`scheme://host...` or `//host...`)
/// have a host. Userinfo, port and IPv6 brackets are stripped; case is kept.
///
/// ```
/// use link_census::urls::authority_host;
///
/// assert_eq!(authority_host("http://user@EXAMPLE.com:8080/x"), Some("EXAMPLE.com"));
/// assert_eq!(authority_host("//cdn.example.com/lib.js"), Some("cdn.example.com"));
/// assert_eq!(authority_host("/relative/path"), None);
/// assert_eq!(authority_host("mailto:someone@example.com"), None);
/// ```
pub fn authority_host(text: &str) -> Option<&str> {
    let text = text.trim();

    let rest = match text.strip_prefix("//") {
        Some(rest) => rest,
        None => {
            let (scheme, rest) = text.split_once(':')?;
            if !is_scheme(scheme) {
                return None;
            }
            rest.strip_prefix("//")?
        }
    };

    let end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#' | '\\'))
        .unwrap_or(rest.len());
    let authority = &rest[..end];
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let host = match host_port.strip_prefix('[') {
        Some(bracketed) => bracketed.split_once(']').map_or(bracketed, |(host, _)| host),
        None => host_port.split_once(':').map_or(host_port, |(host, _)| host),
    };

    (!host.is_empty()).then_some(host)
}

fn is_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Parses a body holding one absolute URL per line
///
/// An empty body yields an empty list; deciding whether that is acceptable is
/// up to the caller.
///
/// # Example
///
/// ```
/// use link_census::urls::parse_url_list;
///
/// let urls = parse_url_list("https://example.com/\nhttp://localhost/page1\n").unwrap();
/// assert_eq!(urls.len(), 2);
///
/// let err = parse_url_list("https://example.com/\nnot a url").unwrap_err();
/// assert_eq!(err.line(), 2);
/// ```
pub fn parse_url_list(body: &str) -> Result<Vec<TargetUrl>, UrlListError> {
    let mut urls = Vec::new();

    for (index, text) in body.lines().enumerate() {
        let line = index + 1;

        let url = match TargetUrl::parse(text) {
            Ok(url) => url,
            // A blank line has no scheme, same as any other relative reference
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Err(UrlListError::Invalid {
                    line,
                    url: text.to_string(),
                })
            }
            Err(source) => return Err(UrlListError::Parse { line, source }),
        };

        if url.url().host_str().map_or(true, str::is_empty) {
            return Err(UrlListError::Invalid {
                line,
                url: text.to_string(),
            });
        }

        urls.push(url);
    }

    Ok(urls)
}
