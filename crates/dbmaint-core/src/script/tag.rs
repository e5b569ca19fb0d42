//! Tags and path-glob tag matchers.

use super::Script;
use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// A label attached to scripts, used for filtering and re-run decisions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Create a tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether `script` carries this tag.
    pub fn is_included(&self, script: &Script) -> bool {
        script.tags().contains(self)
    }

    /// Parse a comma separated tag list, ignoring blank entries.
    pub fn parse_list(list: &str) -> Vec<Tag> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Tag::new)
            .collect()
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::new(name)
    }
}

/// Associates a tag with the script paths matching any of its globs.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    tag: Tag,
    globs: Vec<Pattern>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl TagMatcher {
    /// Create a matcher from glob strings.
    pub fn new<I, S>(tag: Tag, globs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let globs = globs
            .into_iter()
            .map(|glob| {
                Pattern::new(glob.as_ref()).map_err(|e| Error::InvalidTagMatcher {
                    definition: format!("{}={}", tag, glob.as_ref()),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { tag, globs })
    }

    /// The tag this matcher assigns.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// The glob patterns of this matcher.
    pub fn globs(&self) -> impl Iterator<Item = &str> {
        self.globs.iter().map(Pattern::as_str)
    }

    /// Whether any glob matches the given path (relative to the scan root).
    pub fn matches_path(&self, path: &Path) -> bool {
        self.globs
            .iter()
            .any(|glob| glob.matches_path_with(path, MATCH_OPTIONS))
    }

    /// Whether any glob matches the path of `script`.
    pub fn matches(&self, script: &Script) -> bool {
        self.matches_path(script.path())
    }
}

/// Parses `NAME=[glob1, glob2]`; brackets are optional.
impl FromStr for TagMatcher {
    type Err = Error;

    fn from_str(definition: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidTagMatcher {
            definition: definition.to_string(),
            reason: reason.to_string(),
        };

        let (name, globs) = definition
            .split_once('=')
            .ok_or_else(|| invalid("expected NAME=[glob, ...]"))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("tag name is empty"));
        }

        let globs = globs.trim();
        let globs = globs
            .strip_prefix('[')
            .and_then(|g| g.strip_suffix(']'))
            .unwrap_or(globs);

        let globs: Vec<&str> = globs
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .collect();

        TagMatcher::new(Tag::new(name), globs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::IdentifierPattern;

    #[test]
    fn test_parse_list() {
        let tags = Tag::parse_list(" a, b ,,c ");
        assert_eq!(tags, vec![Tag::new("a"), Tag::new("b"), Tag::new("c")]);
    }

    #[test]
    fn test_parse_matcher() {
        let matcher: TagMatcher = "seed=[data/*.js, fixtures/**/*.js]".parse().unwrap();
        assert_eq!(matcher.tag().name(), "seed");
        assert_eq!(matcher.globs().collect::<Vec<_>>(), vec!["data/*.js", "fixtures/**/*.js"]);
    }

    #[test]
    fn test_parse_matcher_without_brackets() {
        let matcher: TagMatcher = "ops=ops/*".parse().unwrap();
        assert!(matcher.matches_path(Path::new("ops/reindex.js")));
    }

    #[test]
    fn test_parse_matcher_rejects_missing_name() {
        assert!("=[a/*]".parse::<TagMatcher>().is_err());
        assert!("no-equals".parse::<TagMatcher>().is_err());
    }

    #[test]
    fn test_parse_matcher_rejects_bad_glob() {
        let err = "broken=[a/**b]".parse::<TagMatcher>().unwrap_err();
        assert!(matches!(err, Error::InvalidTagMatcher { .. }));
    }

    #[test]
    fn test_single_star_does_not_cross_directories() {
        let matcher = TagMatcher::new(Tag::new("top"), ["*.js"]).unwrap();
        assert!(matcher.matches_path(Path::new("init.js")));
        assert!(!matcher.matches_path(Path::new("nested/init.js")));
    }

    #[test]
    fn test_matches_script_path() {
        let pattern = IdentifierPattern::default();
        let script = Script::new("seed/V2__seed.js", "db.users.insert({})", &pattern).unwrap();
        let matcher = TagMatcher::new(Tag::new("seed"), ["seed/**"]).unwrap();
        assert!(matcher.matches(&script));
    }

    #[test]
    fn test_is_included() {
        let pattern = IdentifierPattern::default();
        let script = Script::new("V1", "x", &pattern)
            .unwrap()
            .with_tags([Tag::new("rerun")]);
        assert!(Tag::new("rerun").is_included(&script));
        assert!(!Tag::new("other").is_included(&script));
    }
}
