//! URL extraction from message bodies
//!
//! Two different things are pulled out of a message:
//!
//! - *reloaded content*: resources a mail client fetches while rendering the
//!   HTML body (`src` and `background` attributes), which is how tracking
//!   pixels work
//! - *clickable URLs*: link targets from `href`/`originalsrc` attributes plus
//!   URLs a client would auto-link in HTML or plain text
//!
//! Attribute matches need a leading space so that `data-src` and friends are
//! not picked up. The freeform pattern only accepts URLs with a scheme; bare
//! domains such as `example.com/path` are never auto-linked by Outlook and
//! would produce far too many false positives.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// A URL found in an HTML attribute, with the attribute value it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoundUrl {
    /// Unescaped and percent-decoded URL
    pub url: String,

    /// Attribute value exactly as it appears in the HTML
    pub original: String,
}

static RELOADED_CONTENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i) (?:src|background)=(?:"(.+?)"|'(.+?)')"#).unwrap()
});

static CLICKABLE_ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i) (?:href|originalsrc)=(?:"(.+?)"|'(.+?)')"#).unwrap()
});

// Greedy on the path: Outlook makes trailing markup part of the link as well
static FREEFORM_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:http|https|ftp|ftps)://[a-zA-Z0-9\-\.]+\.[a-zA-Z]{2,3}(?:/\S*)?").unwrap()
});

static HTML_ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]+);?|#[xX]([0-9a-fA-F]+);?|([A-Za-z][A-Za-z0-9]*;?))").unwrap()
});

/// Named references HTML still accepts without the closing semicolon
const LEGACY_ENTITIES: [&str; 106] = [
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr",
    "micro", "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm",
    "oslash", "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy",
    "sup1", "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Quoted attribute value of a match, whichever quote style was used
fn attribute_value<'h>(caps: &Captures<'h>) -> Option<&'h str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// `cid:` points at an attachment and `data:` is inline; neither is fetched
fn is_embedded_reference(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("cid:") || lower.starts_with("data:")
}

/// Resources the HTML body makes a client fetch, in document order.
///
/// Duplicates are kept since every occurrence is a separate fetch.
#[must_use]
pub fn reloaded_content_from_html(html: &str) -> Vec<String> {
    RELOADED_CONTENT_REGEX
        .captures_iter(html)
        .filter_map(|caps| attribute_value(&caps))
        .filter(|source| !is_embedded_reference(source))
        .map(percent_decode)
        .collect()
}

/// The HTML with every `src`/`background` attribute removed
#[must_use]
pub fn html_without_reloaded_content(html: &str) -> String {
    RELOADED_CONTENT_REGEX.replace_all(html, "").into_owned()
}

/// Link targets from `href` and `originalsrc` attributes, in document order
#[must_use]
pub fn clickable_urls_from_html(html: &str) -> Vec<FoundUrl> {
    CLICKABLE_ATTRIBUTE_REGEX
        .captures_iter(html)
        .filter_map(|caps| attribute_value(&caps))
        .map(|original| FoundUrl {
            url: percent_decode(&unescape_html(original)),
            original: original.to_string(),
        })
        .collect()
}

/// Erase the attribute values behind `found` so that a link is not reported
/// again when the freeform pattern runs over the same HTML.
///
/// Longer values go first. An occurrence that runs on into more URL
/// characters is a different URL and is left in place.
#[must_use]
pub fn html_without_found_urls(html: &str, found: &[FoundUrl]) -> String {
    let mut originals: Vec<&str> = found.iter().map(|f| f.original.as_str()).collect();
    originals.sort_by_key(|original| std::cmp::Reverse(original.len()));

    originals
        .into_iter()
        .fold(html.to_string(), |remaining, original| {
            erase_complete(&remaining, original)
        })
}

fn erase_complete(html: &str, original: &str) -> String {
    if original.is_empty() {
        return html.to_string();
    }

    let mut result = String::with_capacity(html.len());
    let mut copied = 0;
    for (start, _) in html.match_indices(original) {
        let end = start + original.len();
        if html[end..].chars().next().is_none_or(is_url_boundary) {
            result.push_str(&html[copied..start]);
            copied = end;
        }
    }
    result.push_str(&html[copied..]);
    result
}

const fn is_url_boundary(c: char) -> bool {
    c.is_ascii_whitespace() || matches!(c, '"' | '\'' | '<' | '>')
}

/// URLs a mail client would auto-link in freeform text, in match order
#[must_use]
pub fn urls_from_text(text: &str) -> Vec<String> {
    FREEFORM_URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Every clickable URL of an HTML body.
///
/// Reloaded content is removed first so image sources never count as links,
/// then attribute links are collected and erased before the freeform scan.
#[must_use]
pub fn embedded_urls_from_html(html: &str) -> BTreeSet<String> {
    let html = html_without_reloaded_content(html);
    let links = clickable_urls_from_html(&html);
    let remaining = html_without_found_urls(&html, &links);

    let mut urls: BTreeSet<String> = urls_from_text(&remaining).into_iter().collect();
    urls.extend(links.into_iter().map(|link| link.url));
    urls
}

/// Resolve character references the way a browser reads attribute values
fn unescape_html(value: &str) -> String {
    HTML_ENTITY_REGEX
        .replace_all(value, |caps: &Captures| {
            if let Some(digits) = caps.get(1) {
                numeric_reference(digits.as_str(), 10)
            } else if let Some(digits) = caps.get(2) {
                numeric_reference(digits.as_str(), 16)
            } else {
                named_reference(&caps[3]).unwrap_or_else(|| caps[0].to_string())
            }
        })
        .into_owned()
}

/// NUL, surrogates and out-of-range values become U+FFFD, the C1 range is
/// read as windows-1252 and remaining control characters are dropped
fn numeric_reference(digits: &str, radix: u32) -> String {
    let Ok(code) = u32::from_str_radix(digits, radix) else {
        return char::REPLACEMENT_CHARACTER.to_string();
    };

    let c = match code {
        0 => char::REPLACEMENT_CHARACTER,
        0x80..=0x9f => encoding_rs::WINDOWS_1252
            .decode_without_bom_handling(&[code.to_le_bytes()[0]])
            .0
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER),
        _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
    };

    let is_noncharacter =
        matches!(code, 0xfdd0..=0xfdef) || (code <= 0x0010_ffff && code & 0xfffe == 0xfffe);
    if (c.is_control() && !matches!(c, '\t' | '\n' | '\x0c' | '\r')) || is_noncharacter {
        String::new()
    } else {
        c.to_string()
    }
}

/// `name;` through the entity table; without the semicolon only the longest
/// legacy name at the start counts and the rest stays text
fn named_reference(reference: &str) -> Option<String> {
    if reference.ends_with(';')
        && let Ok(decoded) = htmlescape::decode_html(&format!("&{reference}"))
    {
        return Some(decoded);
    }

    let name = reference.trim_end_matches(';');
    let legacy = LEGACY_ENTITIES
        .iter()
        .filter(|legacy| name.starts_with(**legacy))
        .max_by_key(|legacy| legacy.len())?;
    // The upper-case spellings (`AMP`, `COPY`, ...) share their lower-case
    // entity's value
    let decoded = htmlescape::decode_html(&format!("&{legacy};"))
        .or_else(|_| htmlescape::decode_html(&format!("&{};", legacy.to_ascii_lowercase())))
        .ok()?;

    Some(format!("{decoded}{}", &reference[legacy.len()..]))
}

fn percent_decode(value: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned()
}
