//! Person type and the id lookup used throughout a layout run.
//!
//! A person has:
//! - An opaque identifier, stable across layout runs
//! - A position (x, y) written by the layout engine
//! - A gender, used only to order partners inside a couple
//! - The client flag (`isCT`), used only as the fallback layout root

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Gender as recorded on the genogram node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

/// A person node on the genogram canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub gender: Gender,
    /// Marks the client (focal person) of the genogram.
    #[serde(rename = "isCT", default)]
    pub is_client: bool,
}

impl Person {
    /// Create a person at the origin with unknown gender.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x: 0.0,
            y: 0.0,
            gender: Gender::Unknown,
            is_client: false,
        }
    }

    /// Builder-style gender setter.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// Builder-style client flag setter.
    pub fn as_client(mut self) -> Self {
        self.is_client = true;
        self
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "Person({})", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// Editor projects store ids either as strings or as numeric timestamps.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Integer(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

/// Id → slot lookup over the caller's person slice.
///
/// When an id is duplicated the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct PersonIndex {
    slots: HashMap<String, usize>,
}

impl PersonIndex {
    /// Build the index for a person slice.
    pub fn new(persons: &[Person]) -> Self {
        let mut slots = HashMap::with_capacity(persons.len());
        for (slot, person) in persons.iter().enumerate() {
            slots.entry(person.id.clone()).or_insert(slot);
        }
        Self { slots }
    }

    /// Slot of the person with this id.
    #[inline]
    pub fn get(&self, id: &str) -> Option<usize> {
        self.slots.get(id).copied()
    }

    /// Look up the person record itself.
    pub fn person<'a>(&self, persons: &'a [Person], id: &str) -> Option<&'a Person> {
        self.get(id).and_then(|slot| persons.get(slot))
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
