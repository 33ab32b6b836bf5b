//! Link classifier for counting internal and external anchors
//!
//! This module walks a parsed HTML document and sorts every `<a href>` into
//! internal or external relative to the page the document was fetched from.

use crate::urls::authority_host;
use scraper::{Html, Selector};
use url::{ParseError, Url};

/// Internal and external link totals for one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounts {
    pub internal: u32,
    pub external: u32,
}

/// What the classifier needs to know about an href once parsed
#[derive(Debug, PartialEq, Eq)]
struct LinkTarget<'a> {
    /// Host as written in the href, case preserved
    host: Option<&'a str>,
    has_path: bool,
}

/// Counts the internal and external links of a parsed document
///
/// # Classification Rules
///
/// Applied in order to every `<a>` with a non-empty `href`:
///
/// | Condition | Result |
/// |-----------|--------|
/// | Host equals the page host (case-sensitive, subdomains differ) | internal |
/// | No host but a non-empty path (`/about`, `page.html`) | internal |
/// | Anything else (`#top`, `mailto:`, other hosts) | external |
///
/// Anchors without an `href`, or with an empty one, are not counted at all.
/// An href that fails to parse is skipped without affecting the rest of the page.
///
/// Hosts are compared byte for byte as written, in both `page` and the hrefs,
/// so `EXAMPLE.com` and `example.com` are different hosts. Ports are ignored.
///
/// # Example
///
/// ```
/// use link_census::scrape::classify_links;
/// use scraper::Html;
///
/// let document = Html::parse_document(
///     r#"<a href="/about">About</a><a href="https://other.com/">Other</a>"#,
/// );
/// let counts = classify_links("http://example.com/", &document);
/// assert_eq!(counts.internal, 1);
/// assert_eq!(counts.external, 1);
/// ```
pub fn classify_links(page: &str, document: &Html) -> LinkCounts {
    let mut counts = LinkCounts::default();

    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return counts;
    };

    let page_host = authority_host(page);

    for element in document.select(&anchor_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        let target = match parse_href(href) {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!("Skipping malformed href {:?} on {}: {}", href, page, e);
                continue;
            }
        };

        match target.host {
            Some(host) if Some(host) == page_host => counts.internal += 1,
            None if target.has_path => counts.internal += 1,
            _ => counts.external += 1,
        }
    }

    counts
}

/// Parses an href as a URL reference
///
/// Absolute URLs go through the regular parser. Relative references carry no
/// host; their path is whatever precedes the query or fragment.
fn parse_href(href: &str) -> Result<LinkTarget<'_>, ParseError> {
    match Url::parse(href) {
        Ok(url) => Ok(target_of(&url, href)),
        Err(ParseError::RelativeUrlWithoutBase) => parse_relative(href),
        Err(e) => Err(e),
    }
}

fn parse_relative(href: &str) -> Result<LinkTarget<'_>, ParseError> {
    let reference = href.trim();

    // Network-path reference ("//host/path") keeps its authority
    if reference.starts_with("//") {
        let url = Url::parse(&format!("http:{}", reference))?;
        return Ok(target_of(&url, reference));
    }

    let path_end = reference
        .find(|c: char| c == '?' || c == '#')
        .unwrap_or(reference.len());

    Ok(LinkTarget {
        host: None,
        has_path: path_end > 0,
    })
}

fn target_of<'a>(url: &Url, href: &'a str) -> LinkTarget<'a> {
    let host = authority_host(href);

    // Opaque URLs (mailto:, javascript:) have no hierarchical path. Neither
    // does "http:host", which the url crate reads as having a host.
    let opaque = url.cannot_be_a_base() || (url.has_host() && host.is_none());
    let has_path = !opaque && !url.path().is_empty();

    LinkTarget { host, has_path }
}

/// Parses an HTML body and classifies its links in one step
///
/// `Html` is not `Send`, so callers inside spawned tasks go through this
/// function to keep the document out of any `.await`.
pub fn classify_body(page: &str, body: &str) -> LinkCounts {
    let document = Html::parse_document(body);
    classify_links(page, &document)
}
