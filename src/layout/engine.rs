//! The genogram layout pipeline.
//!
//! One synchronous pass over the whole person/relationship collection:
//!
//! 1. **Resolve** marriages and family units.
//! 2. **Build** the parent→child graph and assign generation levels.
//! 3. **Measure** descendant widths, deepest generation first.
//! 4. **Position** generations top-down.
//! 5. **Snap and centre** the finished diagram on the target point.
//!
//! Nothing is cached between runs; only `Person::x`/`Person::y` survive.

use serde::Serialize;

use super::config::LayoutConfig;
use super::grid::{Bounds, bounds, center_on};
use super::positioner::GenerationPositioner;
use super::widths::calculate_descendant_widths;
use crate::family::{FamilyGraph, FamilyMap, assign_generations};
use crate::model::{Person, PersonIndex, Relationship};
use crate::observer::{LayoutEvent, LayoutObserver, TracingObserver};

/// Summary of a layout run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    /// Number of generation rows.
    pub generation_count: usize,
    /// Persons that received coordinates.
    pub laid_out: usize,
    /// Persons placed without a parent group.
    pub orphans: Vec<String>,
    /// Bounding box after centring.
    pub bounds: Option<Bounds>,
}

/// The genogram layout engine.
#[derive(Debug, Clone, Default)]
pub struct GenogramLayout {
    config: LayoutConfig,
}

impl GenogramLayout {
    /// Create a layout engine with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `persons`, reporting through `tracing`.
    pub fn layout(&self, persons: &mut [Person], relationships: &[Relationship]) -> LayoutReport {
        self.layout_with_observer(persons, relationships, &mut TracingObserver)
    }

    /// Lay out `persons`, writing `x`/`y` of every person.
    ///
    /// Empty input is a no-op. Relationships pointing at unknown ids are
    /// skipped; no input makes this fail.
    pub fn layout_with_observer(
        &self,
        persons: &mut [Person],
        relationships: &[Relationship],
        observer: &mut dyn LayoutObserver,
    ) -> LayoutReport {
        if persons.is_empty() {
            return LayoutReport::default();
        }

        let index = PersonIndex::new(persons);
        let family = FamilyMap::build(relationships, &index);
        family.report(observer);

        let graph = FamilyGraph::new(persons, &family);
        let generations = assign_generations(persons, &graph, &family, observer);
        let widths = calculate_descendant_widths(&generations, &family, &self.config, observer);

        let positioned = GenerationPositioner::new(
            &self.config,
            persons,
            &index,
            &family,
            &generations,
            &widths,
        )
        .run(observer);

        let mut laid_out = 0;
        for person in persons.iter_mut() {
            if let Some((x, y)) = positioned.placements.get(&person.id) {
                person.x = x;
                person.y = y;
                laid_out += 1;
            }
        }

        let target = (self.config.target_center_x, self.config.target_center_y);
        let (dx, dy) = center_on(persons, target, self.config.grid_size);
        observer.on_event(&LayoutEvent::Centered { dx, dy });

        LayoutReport {
            generation_count: generations.len(),
            laid_out,
            orphans: positioned.orphans,
            bounds: bounds(persons),
        }
    }
}

/// Lay out with the default configuration.
pub fn layout(persons: &mut [Person], relationships: &[Relationship]) -> LayoutReport {
    GenogramLayout::default().layout(persons, relationships)
}
