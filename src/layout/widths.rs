//! Descendant width calculation.
//!
//! For every family unit, the horizontal space its whole descendant subtree
//! needs. Rows are processed from the deepest generation up, so a child's own
//! unit is always measured before the unit it belongs to.

use std::collections::{HashMap, HashSet};

use super::config::LayoutConfig;
use crate::family::{FamilyMap, Generations, ParentKey};
use crate::observer::{LayoutEvent, LayoutObserver};

/// Memoised unit widths for one layout run.
#[derive(Debug, Clone, Default)]
pub struct DescendantWidths {
    widths: HashMap<ParentKey, f64>,
}

impl DescendantWidths {
    pub fn get(&self, key: &ParentKey) -> Option<f64> {
        self.widths.get(key).copied()
    }

    /// Widest unit headed by `id` (alone or with any spouse).
    pub fn widest_headed_by(&self, family: &FamilyMap, id: &str) -> Option<f64> {
        family
            .units_of_parent(id)
            .iter()
            .filter_map(|key| self.get(key))
            .reduce(f64::max)
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

/// Measure every unit, bottom-up.
///
/// Each child takes one slot, plus one for a married-in spouse who has no
/// recorded parents. The result is the larger of that and the widest unit the
/// children head themselves, and never less than one slot.
pub fn calculate_descendant_widths(
    generations: &Generations,
    family: &FamilyMap,
    config: &LayoutConfig,
    observer: &mut dyn LayoutObserver,
) -> DescendantWidths {
    let spacing = config.horizontal_spacing;
    let mut result = DescendantWidths::default();
    let mut measured: HashSet<&ParentKey> = HashSet::new();

    for (_, row) in generations.rows().rev() {
        for parent in row {
            for key in family.units_of_parent(parent) {
                if !measured.insert(key) {
                    continue;
                }

                let children = family.children_of(key);
                let mut width: f64 = children
                    .iter()
                    .map(|child| match family.spouse_of(child) {
                        Some(spouse) if !family.has_parents(spouse) => 2.0 * spacing,
                        _ => spacing,
                    })
                    .sum();

                for child in children {
                    if let Some(subtree) = result.widest_headed_by(family, child) {
                        width = width.max(subtree);
                    }
                }
                let width = width.max(spacing);

                observer.on_event(&LayoutEvent::DescendantWidth {
                    key: key.clone(),
                    width,
                });
                result.widths.insert(key.clone(), width);
            }
        }
    }

    result
}
