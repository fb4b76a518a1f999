//! Item paths for the virtual directory hierarchy
//!
//! Provides [`ItemPath`], the normalized `/`-delimited location of an item.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path separator used by the wire format
pub const SEPARATOR: char = '/';

/// Normalized location of an item within the virtual directory hierarchy
///
/// Every segment is trimmed and empty segments are dropped, so `" a / /b/"`
/// and `"a/b"` are the same path. The empty path is the root.
///
/// # Examples
/// - `"ops/net"` → `["ops", "net"]`
/// - `""`, `"  "`, `"/"` → root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ItemPath(Vec<String>);

impl ItemPath {
    /// Parse and normalize a raw path string
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(SEPARATOR)
                .map(str::trim)
                .filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Normalize an optional raw path; `None` is the root
    #[inline]
    #[must_use]
    pub fn from_optional(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    /// Root path (no segments)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this is the root path
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Alias of [`ItemPath::is_root`]
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Parent path (if not root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Last segment, i.e. the folder name (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning a new path
    ///
    /// The segment is normalized like any other input, so appending `" x/y "`
    /// adds two segments and appending whitespace adds none.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let mut new = self.clone();
        new.0.extend(Self::parse(segment).0);
        new
    }

    /// Check if this path is a prefix of another (or equal to it)
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Check if this path is a strict ancestor of another
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Every non-root prefix, shortest first (`a`, `a/b`, `a/b/c`)
    pub fn prefixes(&self) -> impl Iterator<Item = ItemPath> + '_ {
        (1..=self.0.len()).map(|n| Self(self.0[..n].to_vec()))
    }

    /// Wire representation: `None` for root, the joined path otherwise
    #[must_use]
    pub fn to_wire(&self) -> Option<String> {
        if self.is_root() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl Display for ItemPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            if !first {
                write!(f, "{SEPARATOR}")?;
            }
            first = false;
            f.write_str(seg)?;
        }
        Ok(())
    }
}

impl FromStr for ItemPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ItemPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for ItemPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemPath {
    /// Accepts a string or `null`; `null` is the root
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_optional(raw.as_deref()))
    }
}
