//! Parsing of storage listing pages (`ListBucketResult` XML documents).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static CONTENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Contents>(.*?)</Contents>").expect("valid regex"));

static TRUNCATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<IsTruncated>\s*([^<]*?)\s*</IsTruncated>").expect("valid regex")
});

/// One object entry as it appears in a listing page, before validation.
///
/// Fields are kept as raw text so that a bad entry can be skipped on its own
/// instead of failing the whole page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawObject {
    /// Object key.
    pub key: Option<String>,
    /// Size in bytes, as text.
    pub size: Option<String>,
    /// Last modification timestamp, as text.
    pub last_modified: Option<String>,
}

/// A single page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Objects on this page in backend order.
    pub objects: Vec<RawObject>,
    /// Whether the backend holds more objects after this page.
    pub is_truncated: bool,
}

impl ListingPage {
    /// Returns the marker to request the next page with: the key of the last
    /// entry on this page. `None` if the page is empty or its last entry has
    /// no key.
    #[must_use]
    pub fn next_marker(&self) -> Option<&str> {
        self.objects.last().and_then(|o| o.key.as_deref())
    }
}

/// Parses one listing page.
///
/// # Errors
///
/// Returns an error if the document has no `IsTruncated` element.
pub fn parse_page(xml: &str) -> Result<ListingPage> {
    let truncated = TRUNCATED_RE
        .captures(xml)
        .and_then(|cap| cap.get(1))
        .ok_or_else(|| Error::Listing("response has no IsTruncated element".to_string()))?;
    let is_truncated = truncated.as_str().eq_ignore_ascii_case("true");

    let objects = CONTENTS_RE
        .captures_iter(xml)
        .filter_map(|cap| cap.get(1))
        .map(|body| RawObject {
            key: element_text(body.as_str(), "Key"),
            size: element_text(body.as_str(), "Size"),
            last_modified: element_text(body.as_str(), "LastModified"),
        })
        .collect();

    Ok(ListingPage {
        objects,
        is_truncated,
    })
}

/// Returns the unescaped text of the first `<tag>` element in `body`.
fn element_text(body: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = start + body[start..].find(&close)?;
    Some(unescape_xml(&body[start..end]))
}

/// Decodes the predefined XML entities and numeric character references.
fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';') else { break };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        if let Some(c) = decoded {
            out.push(c);
            rest = &rest[semi + 1..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}
