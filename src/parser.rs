//! Message entry point and body extraction

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{ParsingError, Result};
use crate::extracted::{embedded_urls_from_html, reloaded_content_from_html, urls_from_text};
use crate::mime::MimePart;
use crate::types::{Attachment, StructureNode};

/// Longest excerpt of a rejected first line kept in the error
const EXCERPT_LEN: usize = 40;

/// State of the lazily decoded HTML body
#[derive(Debug, Clone, PartialEq, Eq)]
enum HtmlBody {
    NotComputed,
    Present(String),
    Absent,
}

/// A message parsed once and queried many times.
///
/// All queries are read-only. The only interior state is the decoded HTML
/// body, computed on first use, and the log of warnings collected while
/// decoding payloads. Neither is synchronized, so the type is not `Sync`.
#[derive(Debug)]
pub struct ParsedEmail {
    root: MimePart,
    html: RefCell<HtmlBody>,
    error_messages: RefCell<Vec<String>>,
}

impl ParsedEmail {
    /// Parse a complete message given as text.
    ///
    /// Only text is accepted; raw bytes have to be turned into a string by
    /// the caller, who knows where they came from.
    ///
    /// ```compile_fail
    /// let email = eml_analyzer::ParsedEmail::parse(b"Subject: x\r\n\r\nbody");
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let message = skip_separator_line(raw);
        check_first_line(message)?;

        let parsed = mailparse::parse_mail(message.as_bytes())
            .map_err(|e| ParsingError::Structure(e.to_string()))?;
        let root = MimePart::from_parsed(&parsed);

        debug!(
            parts = root.walk().count(),
            content_type = root.content_type(),
            "Parsed message"
        );

        Ok(Self {
            root,
            html: RefCell::new(HtmlBody::NotComputed),
            error_messages: RefCell::new(Vec::new()),
        })
    }

    /// Root of the MIME tree
    #[must_use]
    pub const fn root(&self) -> &MimePart {
        &self.root
    }

    /// Warnings collected so far, oldest first
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.error_messages.borrow().clone()
    }

    fn add_error_message(&self, message: String) {
        warn!("{message}");
        self.error_messages.borrow_mut().push(message);
    }

    /// Top-level header entries in original order, duplicates included
    #[must_use]
    pub fn header(&self) -> Vec<(String, String)> {
        self.root.headers().to_vec()
    }

    #[must_use]
    pub fn structure(&self) -> StructureNode {
        StructureNode::from_part(&self.root)
    }

    /// First `text/plain` body, decoded
    #[must_use]
    pub fn text_content(&self) -> Option<String> {
        self.decoded_payload_with_first_matching_type("text/plain")
    }

    /// First `text/html` body, decoded once and cached
    #[must_use]
    pub fn html_content(&self) -> Option<String> {
        let mut cache = self.html.borrow_mut();
        if *cache == HtmlBody::NotComputed {
            *cache = self
                .decoded_payload_with_first_matching_type("text/html")
                .map_or(HtmlBody::Absent, HtmlBody::Present);
        }

        match &*cache {
            HtmlBody::Present(html) => Some(html.clone()),
            HtmlBody::Absent | HtmlBody::NotComputed => None,
        }
    }

    fn decoded_payload_with_first_matching_type(&self, content_type: &str) -> Option<String> {
        let part = self.root.find_first(content_type)?;
        match part.decode_text() {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(error = %e, "Giving up on payload");
                self.add_error_message(format!(
                    "Payload with the type \"{content_type}\" could not be decoded"
                ));
                None
            }
        }
    }

    /// Every part carrying a filename, numbered from 1 in document order
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        let mut attachments = Vec::new();
        for part in self.root.walk() {
            if let Some(attachment) = Attachment::from_part(part, attachments.len() + 1) {
                attachments.push(attachment);
            }
        }
        attachments
    }

    /// Attachment with the given 1-based index
    #[must_use]
    pub fn attachment(&self, index: usize) -> Option<Attachment> {
        self.attachments().into_iter().find(|a| a.index == index)
    }

    /// Sources the HTML body reloads from outside the message
    #[must_use]
    pub fn reloaded_content_from_html(&self) -> Vec<String> {
        self.html_content()
            .map(|html| reloaded_content_from_html(&html))
            .unwrap_or_default()
    }

    /// Clickable URLs from the HTML and plain text bodies, de-duplicated
    #[must_use]
    pub fn embedded_clickable_urls_from_html_and_text(&self) -> BTreeSet<String> {
        let mut urls = self
            .html_content()
            .map(|html| embedded_urls_from_html(&html))
            .unwrap_or_default();

        if let Some(text) = self.text_content() {
            urls.extend(urls_from_text(&text));
        }

        urls
    }
}

impl FromStr for ParsedEmail {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Skip a UTF-8 BOM and an mbox `From ` separator line
fn skip_separator_line(raw: &str) -> &str {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    // `From : someone` is an (obsolete) header field, not a separator
    if let Some(rest) = raw.strip_prefix("From ")
        && !rest.trim_start().starts_with(':')
        && let Some(pos) = raw.find('\n')
    {
        return &raw[pos + 1..];
    }
    raw
}

/// A message has to open with a header field (a name of printable ASCII
/// followed by a colon) or with the blank line ending an empty header section
fn check_first_line(message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(ParsingError::Empty);
    }

    let first_line = message.lines().next().unwrap_or_default();
    if first_line.is_empty() {
        return Ok(());
    }

    let is_header = first_line.split_once(':').is_some_and(|(name, _)| {
        let name = name.trim_end_matches([' ', '\t']);
        !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic())
    });

    if is_header {
        Ok(())
    } else {
        Err(ParsingError::MissingHeader(
            first_line.chars().take(EXCERPT_LEN).collect(),
        ))
    }
}
