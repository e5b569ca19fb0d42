//! The script unit of work.

use super::identifier::IdentifierPattern;
use super::tag::Tag;
use crate::error::Result;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Compute the checksum of script content.
///
/// Lowercase hex BLAKE3 digest of the UTF-8 bytes.
pub fn checksum(content: &str) -> String {
    hex::encode(blake3::hash(content.as_bytes()).as_bytes())
}

/// Paths are reported as text; bytes that are not UTF-8 become U+FFFD.
fn serialize_path_lossy<S>(path: &Path, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

/// A named, versioned unit of work.
///
/// Content, checksum and identifier are computed once at construction and
/// never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Script {
    name: String,
    #[serde(serialize_with = "serialize_path_lossy")]
    path: PathBuf,
    #[serde(skip)]
    content: String,
    checksum: String,
    identifier: String,
    tags: BTreeSet<Tag>,
}

impl Script {
    /// Build a script from its path (relative to the scan root) and content.
    ///
    /// The name is the last component of `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        pattern: &IdentifierPattern,
    ) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let identifier = pattern.extract(&name)?;
        let content = content.into();

        Ok(Self {
            checksum: checksum(&content),
            name,
            path,
            content,
            identifier,
            tags: BTreeSet::new(),
        })
    }

    /// Attach tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// The script file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the scan root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Script content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content checksum.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Ordering identifier extracted from the name.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Tags carried by the script.
    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    /// Whether the script carries any of `tags`.
    pub fn has_any_tag<'a>(&self, tags: impl IntoIterator<Item = &'a Tag>) -> bool {
        tags.into_iter().any(|tag| self.tags.contains(tag))
    }
}
