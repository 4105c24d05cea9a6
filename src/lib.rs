//! Genogram Layout - WASM Module
//!
//! This crate computes automatic layouts for genograms (family diagrams): it
//! assigns every person an (x, y) position so that generations stack
//! vertically, couples sit side by side and children are centred under their
//! parents. It is compiled to WebAssembly and exposes a JavaScript-friendly
//! API via wasm-bindgen; native callers use [`layout`] directly.
//!
//! # Architecture
//!
//! - `model`: Person and relationship records as stored by the editor
//! - `family`: Marriage/family-unit resolution, parent→child graph, generations
//! - `layout`: Descendant widths, row positioning, grid snapping and centring
//! - `observer`: Structured trace events and their sinks
//! - `error`: Errors raised at the JS boundary

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod family;
pub mod layout;
pub mod model;
pub mod observer;

pub use error::{GenogramError, Result};
pub use family::{FamilyIssue, diagnose};
pub use layout::{Bounds, GenogramLayout, LayoutConfig, LayoutReport, bounds, layout};
pub use model::{Gender, Person, Relationship, RelationshipKind};
pub use observer::{LayoutEvent, LayoutObserver};

#[cfg(target_arch = "wasm32")]
type HostObserver = observer::ConsoleObserver;
#[cfg(not(target_arch = "wasm32"))]
type HostObserver = observer::TracingObserver;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Main entry point for the layout engine.
///
/// Holds a validated configuration; each call lays out the collection it is
/// given and keeps no state between calls.
#[wasm_bindgen]
pub struct GenogramLayoutWasm {
    engine: GenogramLayout,
}

#[wasm_bindgen]
impl GenogramLayoutWasm {
    /// Create a layout engine with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: GenogramLayout::default(),
        }
    }

    /// Create a layout engine from a (possibly partial) config object.
    ///
    /// Missing fields take their defaults. Fails on non-positive spacing or
    /// grid size.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> std::result::Result<GenogramLayoutWasm, JsValue> {
        let config: LayoutConfig = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(GenogramError::input("config"))?
        };
        config.validate()?;
        Ok(Self {
            engine: GenogramLayout::new(config),
        })
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out a genogram.
    ///
    /// Takes the persons and relationships arrays of a project and returns
    /// the persons array with `x`/`y` replaced.
    pub fn layout(
        &self,
        persons: JsValue,
        relationships: JsValue,
    ) -> std::result::Result<JsValue, JsValue> {
        let (mut persons, relationships) = decode(persons, relationships)?;
        self.run(&mut persons, &relationships);
        let out = serde_wasm_bindgen::to_value(&persons)
            .map_err(GenogramError::serialize("persons"))?;
        Ok(out)
    }

    /// Lay out a genogram and return only the coordinates.
    ///
    /// Returns a Float64Array `[x0, y0, x1, y1, ...]` in input order.
    #[wasm_bindgen(js_name = layoutPositions)]
    pub fn layout_positions(
        &self,
        persons: JsValue,
        relationships: JsValue,
    ) -> std::result::Result<Float64Array, JsValue> {
        let (mut persons, relationships) = decode(persons, relationships)?;
        self.run(&mut persons, &relationships);
        Ok(Float64Array::from(&interleave_positions(&persons)[..]))
    }

    /// Human-readable descriptions of input problems the layout tolerates.
    pub fn validate(
        &self,
        persons: JsValue,
        relationships: JsValue,
    ) -> std::result::Result<Vec<String>, JsValue> {
        let (persons, relationships) = decode(persons, relationships)?;
        Ok(diagnose(&persons, &relationships)
            .iter()
            .map(ToString::to_string)
            .collect())
    }

    /// Bounding box `[minX, minY, maxX, maxY]`, or `undefined` when empty.
    pub fn bounds(&self, persons: JsValue) -> std::result::Result<Option<Vec<f64>>, JsValue> {
        let persons: Vec<Person> =
            serde_wasm_bindgen::from_value(persons).map_err(GenogramError::input("persons"))?;
        Ok(bounds(&persons).map(|b| vec![b.min_x, b.min_y, b.max_x, b.max_y]))
    }
}

impl GenogramLayoutWasm {
    fn run(&self, persons: &mut [Person], relationships: &[Relationship]) -> LayoutReport {
        self.engine
            .layout_with_observer(persons, relationships, &mut HostObserver::default())
    }
}

impl Default for GenogramLayoutWasm {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(persons: JsValue, relationships: JsValue) -> Result<(Vec<Person>, Vec<Relationship>)> {
    let persons =
        serde_wasm_bindgen::from_value(persons).map_err(GenogramError::input("persons"))?;
    let relationships = if relationships.is_undefined() || relationships.is_null() {
        Vec::new()
    } else {
        serde_wasm_bindgen::from_value(relationships)
            .map_err(GenogramError::input("relationships"))?
    };
    Ok((persons, relationships))
}

/// Interleave x and y into `[x0, y0, x1, y1, ...]`.
fn interleave_positions(persons: &[Person]) -> Vec<f64> {
    let mut positions = Vec::with_capacity(persons.len() * 2);
    for person in persons {
        positions.push(person.x);
        positions.push(person.y);
    }
    positions
}
