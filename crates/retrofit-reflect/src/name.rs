//! Qualified type names
//!
//! Provides [`TypeName`] for addressing registered types by dotted path.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Fully qualified type name
///
/// Dotted, non-empty segments of alphanumerics and underscores.
///
/// # Examples
/// - `geom.Shape`
/// - `billing.v2.Invoice`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeName(pub(crate) Arc<str>);

impl TypeName {
    /// Parse and validate a name
    ///
    /// # Errors
    /// Returns error if the name is empty or a segment is malformed
    pub fn new(name: &str) -> Result<Self, NameError> {
        name.parse()
    }

    /// Get the full dotted name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterator over segments
    #[inline]
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Last segment (`Shape` for `geom.Shape`)
    #[inline]
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Everything before the last segment, if any
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(ns, _)| ns)
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TypeName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }

        for seg in s.split('.') {
            if seg.is_empty() {
                return Err(NameError::EmptySegment);
            }
            if seg.contains(|c: char| !c.is_alphanumeric() && c != '_') {
                return Err(NameError::InvalidSegment(seg.to_string()));
            }
        }

        Ok(Self(Arc::from(s)))
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors related to type names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// Empty name
    #[error("type name is empty")]
    Empty,

    /// Empty segment in name
    #[error("type name contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0} (must be alphanumeric or underscore)")]
    InvalidSegment(String),
}
