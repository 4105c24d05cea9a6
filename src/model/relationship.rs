//! Relationship type.
//!
//! Relationships are the connections between persons. Only marriages and the
//! parentage kinds influence layout; emotional bonds are drawn by the renderer
//! and ignored here.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::person::deserialize_id;

/// Kind of a relationship line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RelationshipKind {
    Marriage,
    Biological,
    Adopted,
    Foster,
    /// Any emotional bond. Unrecognised relationship types also land here.
    Emotional,
}

impl RelationshipKind {
    /// Whether this kind links a parent (`from`) to a child (`to`).
    #[inline]
    pub fn is_parentage(self) -> bool {
        matches!(self, Self::Biological | Self::Adopted | Self::Foster)
    }

    #[inline]
    pub fn is_marriage(self) -> bool {
        self == Self::Marriage
    }
}

impl From<String> for RelationshipKind {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "marriage" => Self::Marriage,
            "biological" => Self::Biological,
            "adopted" => Self::Adopted,
            "foster" => Self::Foster,
            _ => Self::Emotional,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Marriage => "marriage",
            Self::Biological => "biological",
            Self::Adopted => "adopted",
            Self::Foster => "foster",
            Self::Emotional => "emotional",
        };
        f.write_str(name)
    }
}

/// A typed connection between two persons.
///
/// For parentage kinds `from` is the parent and `to` the child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(deserialize_with = "deserialize_id")]
    pub from: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub to: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
}

impl Relationship {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationshipKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    /// Marriage between two persons.
    pub fn marriage(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(a, b, RelationshipKind::Marriage)
    }

    /// Biological parent → child link.
    pub fn biological(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(parent, child, RelationshipKind::Biological)
    }

    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}
