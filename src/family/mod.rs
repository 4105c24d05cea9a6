//! Family structure derived from the raw relationship list.
//!
//! This module turns persons and relationships into the indices the layout
//! needs: who is married to whom, which parents have which children (family
//! units), the parent→child graph, and one generation level per person.

mod generations;
mod graph;
mod issues;
mod map;

pub use generations::{Generations, assign_generations, fallback_root, select_roots};
pub use graph::FamilyGraph;
pub use issues::{FamilyIssue, diagnose};
pub use map::{FamilyMap, ParentKey};
