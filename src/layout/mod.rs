//! Automatic genogram layout.
//!
//! This module computes positions for every person of a genogram: generations
//! stack vertically, couples sit side by side, children are centred under
//! their parents, and neighbouring family groups do not overlap.

pub mod config;
pub mod engine;
pub mod grid;
pub mod grouping;
pub mod positioner;
pub mod widths;

pub use config::LayoutConfig;
pub use engine::{GenogramLayout, LayoutReport, layout};
pub use grid::{Bounds, bounds, snap_to_grid};
pub use grouping::{GroupKind, PersonGroup, group_couples_and_singles};
pub use positioner::{GenerationPositioner, Placements};
pub use widths::{DescendantWidths, calculate_descendant_widths};
