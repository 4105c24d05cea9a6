//! Genogram domain model.
//!
//! Persons and relationships are owned by the canvas layer. The layout engine
//! borrows them for the duration of one run and only writes back `x`/`y`.

mod person;
mod relationship;

pub use person::{Gender, Person, PersonIndex};
pub use relationship::{Relationship, RelationshipKind};
