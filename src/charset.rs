//! Charset resolution for part payloads
//!
//! Mail in the wild regularly lies about its encoding, so a payload is tried
//! against every charset its headers declare and then against a fixed list of
//! common fallbacks. The first charset that decodes without error wins.

use encoding_rs::Encoding;
use tracing::debug;

/// Charsets tried after the ones declared by the part, in this order
pub const FALLBACK_CHARSETS: [&str; 5] = [
    "utf-8",
    "windows-1251",
    "iso-8859-1",
    "us-ascii",
    "iso-8859-15",
];

/// Build the ordered, duplicate-free list of charsets to try for a part.
///
/// Every `charset=` parameter of every `Content-Type` header comes first, in
/// header order, lower-cased and unquoted. The fallbacks follow.
#[must_use]
pub fn candidate_charsets(headers: &[(String, String)]) -> Vec<String> {
    let mut candidates = Vec::new();

    for (key, value) in headers {
        if !key.trim().eq_ignore_ascii_case("content-type") {
            continue;
        }
        for entry in value.to_lowercase().split(';') {
            if let Some(charset) = entry.trim().strip_prefix("charset=") {
                push_unique(&mut candidates, charset.replace(['"', '\''], "").trim());
            }
        }
    }

    for fallback in FALLBACK_CHARSETS {
        push_unique(&mut candidates, fallback);
    }

    candidates
}

fn push_unique(candidates: &mut Vec<String>, charset: &str) {
    if !charset.is_empty() && !candidates.iter().any(|c| c == charset) {
        candidates.push(charset.to_string());
    }
}

/// Decode a payload with the first candidate that accepts it
#[must_use]
pub fn decode_payload(payload: &[u8], candidates: &[String]) -> Option<String> {
    candidates.iter().find_map(|charset| {
        let decoded = decode_with_charset(charset, payload);
        if decoded.is_none() {
            debug!(charset = %charset, "Payload rejected by charset");
        }
        decoded
    })
}

/// Strictly decode bytes with a named charset.
///
/// Returns `None` for unknown labels and for malformed input; nothing is
/// replaced with U+FFFD.
#[must_use]
pub fn decode_with_charset(label: &str, bytes: &[u8]) -> Option<String> {
    let label = label.trim().to_ascii_lowercase();

    // The WHATWG tables treat ASCII as windows-1252, which never fails
    if matches!(label.as_str(), "us-ascii" | "ascii") {
        return if bytes.is_ascii() {
            std::str::from_utf8(bytes).ok().map(str::to_owned)
        } else {
            None
        };
    }

    let encoding = Encoding::for_label_no_replacement(label.as_bytes())?;
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(std::borrow::Cow::into_owned)
}
