//! Report renderers
//!
//! A caller picks the sections it wants and calls the matching methods in
//! order, then [`ReportOutput::final_output`] once. Renderers only use the
//! public query surface of [`ParsedEmail`].

mod json;
mod standard;

pub use json::JsonOutput;
pub use standard::StandardOutput;

use crate::parser::ParsedEmail;

/// One method per report section
pub trait ReportOutput {
    fn show_header(&mut self, email: &ParsedEmail);

    fn show_structure(&mut self, email: &ParsedEmail);

    fn show_urls(&mut self, email: &ParsedEmail);

    fn show_reloaded_content(&mut self, email: &ParsedEmail);

    /// List attachments; `include_content` adds their bytes where the format
    /// can carry them
    fn show_attachments(&mut self, email: &ParsedEmail, include_content: bool);

    fn show_text(&mut self, email: &ParsedEmail);

    fn show_html(&mut self, email: &ParsedEmail);

    /// Everything rendered so far followed by the collected warnings
    fn final_output(&mut self, email: &ParsedEmail) -> String;
}
