//! Owned MIME tree
//!
//! The tokenizer output borrows the raw input, so it is converted once into a
//! tree of [`MimePart`]s owning their headers and transfer-decoded payloads.
//! Every query in this crate runs against that tree.

use mailparse::{MailHeaderMap, ParsedMail};
use tracing::{debug, warn};

use crate::charset::{candidate_charsets, decode_payload};
use crate::error::PayloadDecodingError;
use crate::filename::printable_filename;

/// How many `message/rfc822` layers are unwrapped into child parts
pub const MAX_NESTING_DEPTH: usize = 32;

const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// One node of a message body tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    headers: Vec<(String, String)>,
    content_type: String,
    content_disposition: Option<String>,
    filename: Option<String>,
    body: Option<Vec<u8>>,
    children: Vec<MimePart>,
}

impl MimePart {
    pub(crate) fn from_parsed(parsed: &ParsedMail<'_>) -> Self {
        Self::from_parsed_at_depth(parsed, 0)
    }

    fn from_parsed_at_depth(parsed: &ParsedMail<'_>, depth: usize) -> Self {
        let headers: Vec<(String, String)> = parsed
            .headers
            .iter()
            .map(|h| {
                (
                    h.get_key(),
                    String::from_utf8_lossy(h.get_value_raw()).into_owned(),
                )
            })
            .collect();

        let content_type = normalize_content_type(&parsed.ctype.mimetype);

        let disposition_header = parsed.headers.get_first_value("Content-Disposition");
        let content_disposition = disposition_header.as_deref().map(disposition_type);
        let filename = disposition_header
            .as_deref()
            .and_then(|value| {
                mailparse::parse_content_disposition(value)
                    .params
                    .get("filename")
                    .cloned()
            })
            .or_else(|| parsed.ctype.params.get("name").cloned());

        let mut children: Vec<Self> = parsed
            .subparts
            .iter()
            .map(|part| Self::from_parsed_at_depth(part, depth + 1))
            .collect();

        let body = if children.is_empty() {
            match parsed.get_body_raw() {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(content_type = %content_type, error = %e, "Could not reverse transfer encoding");
                    None
                }
            }
        } else {
            None
        };

        if content_type == "message/rfc822"
            && children.is_empty()
            && let Some(inner) = body.as_deref().and_then(|raw| embedded_message(raw, depth))
        {
            children.push(inner);
        }

        Self {
            headers,
            content_type,
            content_disposition,
            filename,
            body,
            children,
        }
    }

    /// Header entries of this part, raw and in original order
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Lower-case `type/subtype`
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn content_disposition(&self) -> Option<&str> {
        self.content_disposition.as_deref()
    }

    /// Filename exactly as declared by the headers
    #[must_use]
    pub fn raw_filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Filename made safe for display and for use as a path component
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        printable_filename(self.raw_filename())
    }

    /// Transfer-decoded payload; `None` for containers and undecodable bodies
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first, pre-order traversal starting with this part
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// First part in pre-order whose content type equals `content_type`
    #[must_use]
    pub fn find_first(&self, content_type: &str) -> Option<&Self> {
        self.walk().find(|part| part.content_type == content_type)
    }

    /// Decode the payload as text using the charset candidates of this part
    pub fn decode_text(&self) -> Result<String, PayloadDecodingError> {
        let candidates = candidate_charsets(&self.headers);
        self.body
            .as_deref()
            .and_then(|body| decode_payload(body, &candidates))
            .ok_or_else(|| PayloadDecodingError {
                content_type: self.content_type.clone(),
                tried: candidates,
            })
    }
}

/// Pre-order iterator over a part and its descendants
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a MimePart>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a MimePart;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        self.stack.extend(part.children.iter().rev());
        Some(part)
    }
}

fn embedded_message(raw: &[u8], depth: usize) -> Option<MimePart> {
    if depth >= MAX_NESTING_DEPTH {
        debug!(depth, "Not unwrapping embedded message past nesting limit");
        return None;
    }
    match mailparse::parse_mail(raw) {
        Ok(inner) => Some(MimePart::from_parsed_at_depth(&inner, depth + 1)),
        Err(e) => {
            debug!(error = %e, "Embedded message could not be parsed");
            None
        }
    }
}

fn normalize_content_type(mimetype: &str) -> String {
    let content_type = mimetype.trim().to_lowercase();
    if content_type.matches('/').count() == 1 {
        content_type
    } else {
        DEFAULT_CONTENT_TYPE.to_string()
    }
}

/// Disposition value before any parameter, lower-cased
fn disposition_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
