//! Identifier extraction from script names.

use crate::error::{Error, Result};
use regex::Regex;

/// Default identifier pattern: the whole name is the identifier.
pub const DEFAULT_IDENTIFIER_PATTERN: &str = "(.*)";

/// Pattern that extracts a script identifier from its name.
///
/// The pattern must match the whole name. The first capture group is the
/// identifier; a pattern without groups yields the whole name.
#[derive(Debug, Clone)]
pub struct IdentifierPattern {
    source: String,
    regex: Regex,
}

impl IdentifierPattern {
    /// Compile a pattern.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let source = pattern.into();
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| Error::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { source, regex })
    }

    /// The pattern as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Extract the identifier of `name`.
    pub fn extract(&self, name: &str) -> Result<String> {
        let captures = self
            .regex
            .captures(name)
            .ok_or_else(|| Error::IdentifierExtraction {
                name: name.to_string(),
                pattern: self.source.clone(),
            })?;

        // captures_len counts the implicit group 0.
        let identifier = if self.regex.captures_len() > 1 {
            captures.get(1).map_or("", |m| m.as_str())
        } else {
            captures.get(0).map_or(name, |m| m.as_str())
        };
        Ok(identifier.to_string())
    }
}

impl Default for IdentifierPattern {
    fn default() -> Self {
        Self {
            source: DEFAULT_IDENTIFIER_PATTERN.to_string(),
            regex: Regex::new("^(?:(.*))$").expect("default identifier pattern is valid"),
        }
    }
}

impl std::fmt::Display for IdentifierPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
