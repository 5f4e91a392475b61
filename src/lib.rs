// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! EML Analyzer
//!
//! A read-only view into raw Internet Message Format emails for analysts and
//! forensics tooling. Nothing is rendered, fetched or written to disk.
//!
//! # Features
//!
//! - Ordered header listing, duplicates included
//! - MIME structure tree
//! - Plain text and HTML bodies decoded under uncertain charsets
//! - Attachments with encoded filenames made safe
//! - Clickable URLs from anchors, safelinks and auto-linked text
//! - Reloaded content such as tracking pixels
//!
//! # Example
//!
//! ```rust
//! use eml_analyzer::ParsedEmail;
//!
//! let raw = "From: sender@example.com\r\n\
//!            Subject: Hello\r\n\
//!            \r\n\
//!            See https://example.com/welcome";
//! let email = ParsedEmail::parse(raw).unwrap();
//!
//! assert_eq!(email.structure().content_type, "text/plain");
//! assert!(email
//!     .embedded_clickable_urls_from_html_and_text()
//!     .contains("https://example.com/welcome"));
//! ```

pub mod charset;
mod error;
pub mod extracted;
pub mod filename;
pub mod mime;
pub mod output;
mod parser;
mod types;

pub use error::{ParsingError, PayloadDecodingError, Result};
pub use extracted::FoundUrl;
pub use mime::MimePart;
pub use output::{JsonOutput, ReportOutput, StandardOutput};
pub use parser::ParsedEmail;
pub use types::*;
