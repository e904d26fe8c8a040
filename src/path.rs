//! Slash-separated remote paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Immutable, normalized path of a remote file or folder.
///
/// Both `/` and `\` separate components and empty components are dropped,
/// so `"a//b\\c/"` and `"a/b/c"` are the same path. The root path has no
/// components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RemotePath {
    parts: Vec<String>,
}

impl RemotePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a raw path string. Never fails.
    pub fn parse(raw: &str) -> Self {
        Self {
            parts: raw
                .split(['/', '\\'])
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Path components.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Last component, or `""` for the root.
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parent path. The parent of the root is the root.
    pub fn parent(&self) -> Self {
        let mut parts = self.parts.clone();
        parts.pop();
        Self { parts }
    }

    /// Concatenate `other` onto this path.
    pub fn join(&self, other: impl Into<RemotePath>) -> Self {
        let mut parts = self.parts.clone();
        parts.extend(other.into().parts);
        Self { parts }
    }

    /// Render the path as a directory string.
    ///
    /// The dashboard keys folders by `"a/b/"` (trailing separator, no
    /// leading one) and the root by `""`; see [`RemotePath::dir_key`].
    pub fn as_dir(&self, leading_sep: bool, trailing_sep: bool) -> String {
        let mut out = String::new();
        if leading_sep {
            out.push('/');
        }
        out.push_str(&self.parts.join("/"));
        if trailing_sep {
            out.push('/');
        }
        out
    }

    /// Directory key used by the dashboard endpoints.
    pub fn dir_key(&self) -> String {
        self.as_dir(false, !self.is_root())
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("/"))
    }
}

impl FromStr for RemotePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for RemotePath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for RemotePath {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&RemotePath> for RemotePath {
    fn from(path: &RemotePath) -> Self {
        path.clone()
    }
}

impl Serialize for RemotePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RemotePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_empty_segments() {
        let path = RemotePath::parse("//a\\\\b///c/");
        assert_eq!(path.parts(), &["a", "b", "c"]);
        assert_eq!(path.as_dir(true, true), "/a/b/c/");
        assert_eq!(path.to_string(), "a/b/c");
    }

    #[test]
    fn test_root() {
        let root = RemotePath::parse("///");
        assert!(root.is_root());
        assert_eq!(root, RemotePath::root());
        assert_eq!(root.dir_key(), "");
        assert_eq!(root.name(), "");
    }

    #[test]
    fn test_parent_chain_reaches_root() {
        let mut path = RemotePath::parse("a/b/c");
        for _ in 0..5 {
            path = path.parent();
            let _ = path.as_dir(true, true);
        }
        assert!(path.is_root());
        assert_eq!(RemotePath::root().parent(), RemotePath::root());
    }

    #[test]
    fn test_join_and_dir_key() {
        let base = RemotePath::parse("docs");
        let joined = base.join("2024/report.pdf");
        assert_eq!(joined.parts(), &["docs", "2024", "report.pdf"]);
        assert_eq!(joined.name(), "report.pdf");
        assert_eq!(base.dir_key(), "docs/");
        assert_eq!(RemotePath::root().join(&base), base);
    }

    #[test]
    fn test_serde_as_string() {
        let path: RemotePath = serde_json::from_str("\"photos/2023/\"").unwrap();
        assert_eq!(path.parts(), &["photos", "2023"]);
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"photos/2023\"");
    }
}
