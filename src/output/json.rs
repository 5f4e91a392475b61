//! Structured JSON report

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::ReportOutput;
use crate::parser::ParsedEmail;
use crate::types::Attachment;

/// Collects the requested sections into one JSON object
#[derive(Debug, Default)]
pub struct JsonOutput {
    result: Map<String, Value>,
}

#[derive(Serialize)]
struct AttachmentEntry<'a> {
    #[serde(flatten)]
    attachment: &'a Attachment,

    #[serde(skip_serializing_if = "Option::is_none")]
    content_in_base64: Option<String>,
}

impl JsonOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert<T: Serialize>(&mut self, section: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.result.insert(section.to_string(), value);
            }
            Err(e) => warn!(section, error = %e, "Could not serialize report section"),
        }
    }
}

impl ReportOutput for JsonOutput {
    fn show_header(&mut self, email: &ParsedEmail) {
        // Keys keep the order they first appear in; repeated fields collect
        // their values in message order
        let mut headers = Map::new();
        for (key, value) in email.header() {
            let values = headers
                .entry(key)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(values) = values {
                values.push(Value::String(value));
            }
        }
        self.result.insert("headers".into(), Value::Object(headers));
    }

    fn show_structure(&mut self, email: &ParsedEmail) {
        self.insert("structure", &email.structure());
    }

    fn show_urls(&mut self, email: &ParsedEmail) {
        self.insert("urls", &email.embedded_clickable_urls_from_html_and_text());
    }

    fn show_reloaded_content(&mut self, email: &ParsedEmail) {
        self.insert("reloaded_content", &email.reloaded_content_from_html());
    }

    fn show_attachments(&mut self, email: &ParsedEmail, include_content: bool) {
        let attachments = email.attachments();
        let entries: Vec<AttachmentEntry<'_>> = attachments
            .iter()
            .map(|attachment| AttachmentEntry {
                attachment,
                content_in_base64: include_content.then(|| attachment.content_base64()),
            })
            .collect();
        self.insert("attachments", &entries);
    }

    fn show_text(&mut self, email: &ParsedEmail) {
        if let Some(text) = email.text_content() {
            self.result.insert("text".into(), Value::String(text));
        }
    }

    fn show_html(&mut self, email: &ParsedEmail) {
        if let Some(html) = email.html_content() {
            self.result.insert("html".into(), Value::String(html));
        }
    }

    fn final_output(&mut self, email: &ParsedEmail) -> String {
        let warnings = email.error_messages();
        if !warnings.is_empty() {
            self.insert("warnings", &warnings);
        }
        format!("{:#}", Value::Object(std::mem::take(&mut self.result)))
    }
}
