//! Human-readable plain text report

use std::fmt::Write;

use super::ReportOutput;
use crate::parser::ParsedEmail;
use crate::types::StructureNode;

/// Column the filename is printed at in the structure tree
const STRUCTURE_WIDTH: usize = 40;

/// Renders sections as text blocks under a headline
#[derive(Debug, Default)]
pub struct StandardOutput {
    buffer: String,
}

impl StandardOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn headline(&mut self, title: &str) {
        let rule = "=".repeat(title.len() + 8);
        let _ = writeln!(self.buffer, "{rule}\n    {title}\n{rule}");
    }

    fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn info(&mut self, text: &str) {
        let _ = writeln!(self.buffer, "[INFO] {text}");
    }

    fn structure_tree(&mut self, node: &StructureNode, level: usize) {
        let branch = format!("{}|- {}", "|  ".repeat(level), node.content_type);
        match &node.filename {
            Some(filename) => {
                let _ = writeln!(
                    self.buffer,
                    "{branch:<width$} [{filename}]",
                    width = STRUCTURE_WIDTH
                );
            }
            None => self.line(&branch),
        }
        for child in &node.children {
            self.structure_tree(child, level + 1);
        }
    }
}

impl ReportOutput for StandardOutput {
    fn show_header(&mut self, email: &ParsedEmail) {
        self.headline("Header");
        let header = email.header();
        let width = header.iter().map(|(key, _)| key.len()).max().unwrap_or(0) + 5;

        for (key, value) in &header {
            let mut lines = value.lines();
            let first = lines.next().unwrap_or_default();
            let _ = writeln!(self.buffer, "{key}{} {first}", ".".repeat(width - key.len()));
            for continuation in lines {
                let _ = writeln!(self.buffer, "{:width$} {}", "", continuation.trim());
            }
        }
        self.line("");
    }

    fn show_structure(&mut self, email: &ParsedEmail) {
        self.headline("Structure");
        self.structure_tree(&email.structure(), 0);
        self.line("");
    }

    fn show_urls(&mut self, email: &ParsedEmail) {
        self.headline("URLs in HTML and text part");
        let urls = email.embedded_clickable_urls_from_html_and_text();
        if urls.is_empty() {
            self.info("No URLs found in the html or text part");
        }
        for url in &urls {
            let _ = writeln!(self.buffer, " - {url}");
        }
        self.line("");
    }

    fn show_reloaded_content(&mut self, email: &ParsedEmail) {
        self.headline("Reloaded Content (aka. Tracking Pixels)");
        if email.html_content().is_none() {
            self.info("Email contains no HTML");
        } else {
            let sources = email.reloaded_content_from_html();
            if sources.is_empty() {
                self.info("No content found which will be reloaded from external resources");
            }
            for source in &sources {
                let _ = writeln!(self.buffer, " - {source}");
            }
        }
        self.line("");
    }

    fn show_attachments(&mut self, email: &ParsedEmail, _include_content: bool) {
        self.headline("Attachments");
        let attachments = email.attachments();
        if attachments.is_empty() {
            self.info("E-Mail contains no attachments");
        } else {
            let name_width = attachments.iter().map(|a| a.filename.len()).max().unwrap_or(0) + 7;
            let type_width = attachments.iter().map(|a| a.content_type.len()).max().unwrap_or(0) + 7;
            for attachment in &attachments {
                let _ = writeln!(
                    self.buffer,
                    "[{}] {:name_width$} {:type_width$} {}",
                    attachment.index,
                    attachment.filename,
                    attachment.content_type,
                    attachment.content_disposition.as_deref().unwrap_or_default(),
                );
            }
        }
        self.line("");
    }

    fn show_text(&mut self, email: &ParsedEmail) {
        self.headline("Plaintext");
        match email.text_content() {
            Some(text) => self.line(&text),
            None => self.info("Email contains no plaintext"),
        }
        self.line("");
    }

    fn show_html(&mut self, email: &ParsedEmail) {
        self.headline("HTML");
        match email.html_content() {
            Some(html) => self.line(&html),
            None => self.info("Email contains no HTML"),
        }
        self.line("");
    }

    fn final_output(&mut self, email: &ParsedEmail) -> String {
        for warning in email.error_messages() {
            let _ = writeln!(self.buffer, "[WARNING] {warning}");
        }
        std::mem::take(&mut self.buffer)
    }
}
