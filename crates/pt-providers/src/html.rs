//! Minimal HTML extraction for the tracking pages we scrape.
//!
//! The pages are small and machine-generated, so a handful of regexes is
//! enough. None of this handles nested elements of the same tag.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<([a-z][a-z0-9]*)(\s[^>]*)?>").unwrap());

static CLOSE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</([a-z][a-z0-9]*)\s*>").unwrap());

/// An `id` attribute on its own, not the tail of `data-id` and the like.
static ID_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)id\s*=\s*["']([^"']*)["']"#).unwrap());

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

/// Returns the inner HTML of the first element with the given `id`.
///
/// An element missing its closing tag runs to the end of `html`.
pub fn inner_by_id<'a>(html: &'a str, id: &str) -> Option<&'a str> {
    let open = OPEN_TAG_RE.captures_iter(html).find(|caps| {
        caps.get(2)
            .and_then(|attrs| ID_ATTR_RE.captures(attrs.as_str()))
            .is_some_and(|attr| &attr[1] == id)
    })?;
    let start = open.get(0)?.end();
    let end = find_close(html, start, &open[1]).map_or(html.len(), |(end, _)| end);
    Some(&html[start..end])
}

/// Returns the inner HTML of every closed `<tag>` element in `html`, in order.
pub fn inner_all<'a>(html: &'a str, tag: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(open) = OPEN_TAG_RE.captures_at(html, pos) {
        let (Some(whole), Some(name)) = (open.get(0), open.get(1)) else {
            break;
        };
        pos = whole.end();
        if !name.as_str().eq_ignore_ascii_case(tag) {
            continue;
        }
        let Some((end, after)) = find_close(html, pos, tag) else {
            break;
        };
        found.push(&html[pos..end]);
        pos = after;
    }
    found
}

/// Finds the first `</tag>` at or after `from`. Returns where it starts and
/// where it ends.
fn find_close(html: &str, from: usize, tag: &str) -> Option<(usize, usize)> {
    let mut pos = from;
    while let Some(close) = CLOSE_TAG_RE.captures_at(html, pos) {
        let whole = close.get(0)?;
        if close[1].eq_ignore_ascii_case(tag) {
            return Some((whole.start(), whole.end()));
        }
        pos = whole.end();
    }
    None
}

/// Returns the text content of an HTML fragment: tags removed, entities
/// decoded, surrounding whitespace trimmed.
pub fn text(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, "");
    unescape(&stripped).trim().to_string()
}

/// Decodes character references. Unknown named entities are left as-is.
pub fn unescape(s: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(s, |caps: &Captures<'_>| {
        let entity = &caps[1];
        let decoded = match entity {
            "quot" => Some('"'),
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                .and_then(Result::ok)
                .and_then(char::from_u32),
        };
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
}
