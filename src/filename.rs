//! Filename normalization
//!
//! Filenames come straight out of MIME headers. They may still carry RFC 2047
//! encoded words, path separators or control characters, so every filename
//! surfaced by this crate goes through [`printable_filename`] first.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::{Captures, Regex};
use tracing::debug;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

use crate::charset::decode_with_charset;

static BASE64_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)=\?([^?\s]+)\?B\?(.+?)\?=").unwrap());

static QUOTED_PRINTABLE_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)=\?([^?\s]+)\?Q\?(.+?)\?=").unwrap());

/// Characters kept as-is besides letters and digits
const ALLOWED_PUNCTUATION: [char; 6] = ['_', '.', '(', ')', '-', ' '];

/// Normalize an optional filename; `None` passes through
#[must_use]
pub fn printable_filename(filename: Option<&str>) -> Option<String> {
    filename.map(make_printable)
}

/// Decode encoded words, then reduce the result to a safe path component.
///
/// Letters, digits and `_ . ( ) - space` are kept. Any other printable
/// character becomes `_`, non-printable characters are dropped.
#[must_use]
pub fn make_printable(original: &str) -> String {
    decode_encoded_words(original)
        .chars()
        .filter(|c| is_printable(*c))
        .map(|c| {
            if c.is_alphanumeric() || ALLOWED_PUNCTUATION.contains(&c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Replace `=?charset?B?...?=` and then `=?charset?Q?...?=` tokens with
/// their decoded text. Tokens that fail to decode are left untouched.
#[must_use]
pub fn decode_encoded_words(value: &str) -> String {
    let value = BASE64_WORD_REGEX.replace_all(value, |caps: &Captures| {
        STANDARD
            .decode(&caps[2])
            .ok()
            .and_then(|bytes| decode_with_charset(charset_name(&caps[1]), &bytes))
            .unwrap_or_else(|| {
                debug!(word = &caps[0], "Leaving undecodable base64 word");
                caps[0].to_string()
            })
    });

    QUOTED_PRINTABLE_WORD_REGEX
        .replace_all(&value, |caps: &Captures| {
            decode_q_encoding(&caps[2])
                .and_then(|bytes| decode_with_charset(charset_name(&caps[1]), &bytes))
                .unwrap_or_else(|| {
                    debug!(word = &caps[0], "Leaving undecodable quoted-printable word");
                    caps[0].to_string()
                })
        })
        .into_owned()
}

/// Strip an RFC 2231 language suffix (`utf-8*en`)
fn charset_name(declared: &str) -> &str {
    declared.split('*').next().unwrap_or(declared)
}

/// Quoted-printable: `=XX` is a byte, everything else is literal, so `_`
/// stays an underscore. A broken escape fails the word.
fn decode_q_encoding(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'=' => {
                let hex = bytes.get(i + 1..i + 3)?;
                if !hex.iter().all(u8::is_ascii_hexdigit) {
                    return None;
                }
                let hex = std::str::from_utf8(hex).ok()?;
                result.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }

    Some(result)
}

/// Printable means anything but separators, controls, format characters,
/// surrogates, private use and unassigned code points. A plain space counts.
fn is_printable(c: char) -> bool {
    c == ' '
        || !matches!(
            c.general_category(),
            GeneralCategory::Control
                | GeneralCategory::Format
                | GeneralCategory::Surrogate
                | GeneralCategory::PrivateUse
                | GeneralCategory::Unassigned
                | GeneralCategory::SpaceSeparator
                | GeneralCategory::LineSeparator
                | GeneralCategory::ParagraphSeparator
        )
}
