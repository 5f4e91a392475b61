//! Read-only projections of a parsed message

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::mime::MimePart;

/// One node of the message structure, as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    /// Lower-case content type, e.g. `multipart/mixed`
    #[serde(rename = "type")]
    pub content_type: String,

    /// Normalized filename
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Content disposition, e.g. `attachment`
    #[serde(rename = "disposition", skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,

    /// Child nodes in the order the message lists them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    /// Project a part and all of its descendants
    #[must_use]
    pub fn from_part(part: &MimePart) -> Self {
        Self {
            content_type: part.content_type().to_string(),
            filename: part.filename(),
            content_disposition: part.content_disposition().map(str::to_string),
            children: part.children().iter().map(Self::from_part).collect(),
        }
    }

    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A part that carries a filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// 1-based position among the parts that carry a filename
    pub index: usize,

    /// Normalized filename, safe to use as a path component
    #[serde(rename = "name")]
    pub filename: String,

    #[serde(rename = "type")]
    pub content_type: String,

    #[serde(rename = "disposition", skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,

    /// Transfer-decoded bytes; empty for containers and undecodable bodies
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl Attachment {
    /// Build the attachment for `part`, or `None` when it has no filename
    #[must_use]
    pub fn from_part(part: &MimePart, index: usize) -> Option<Self> {
        let filename = part.filename()?;

        Some(Self {
            index,
            filename,
            content_type: part.content_type().to_string(),
            content_disposition: part.content_disposition().map(str::to_string),
            content: part.body().map(<[u8]>::to_vec).unwrap_or_default(),
        })
    }

    /// Size of the decoded content in bytes
    #[must_use]
    pub const fn size(&self) -> usize {
        self.content.len()
    }

    /// Content as standard, padded base64
    #[must_use]
    pub fn content_base64(&self) -> String {
        STANDARD.encode(&self.content)
    }

    /// Default location for extracting this attachment: its filename,
    /// inside `directory` when one is given. Nothing is touched on disk.
    #[must_use]
    pub fn output_path(&self, directory: Option<&Path>) -> PathBuf {
        directory.map_or_else(
            || PathBuf::from(&self.filename),
            |dir| dir.join(&self.filename),
        )
    }
}
