//! Structured trace events emitted during a layout run.
//!
//! The engine never writes to a console directly. It reports what it decided
//! through a [`LayoutObserver`], so tests can assert on the structure of a run
//! and hosts can route diagnostics wherever they like.

use std::fmt;

use crate::family::ParentKey;

/// One step of a layout run worth reporting.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// BFS seeds were chosen. `fallback` is set when no natural root existed.
    RootsSelected { roots: Vec<String>, fallback: bool },
    /// A generation row was finalised (levels already normalised).
    GenerationAssigned { level: u32, persons: Vec<String> },
    /// A person was not reachable from any root and was pushed below everyone.
    Unreachable { person: String, level: u32 },
    /// A family unit (parent key + children) was resolved.
    FamilyUnitResolved { key: ParentKey, children: Vec<String> },
    /// A child with an unsupported parent count was left out of every unit.
    ChildExcluded { child: String, parent_count: usize },
    /// Horizontal extent computed for a unit's descendant subtree.
    DescendantWidth { key: ParentKey, width: f64 },
    /// A row holds exactly two far-apart parent groups, each laid out under
    /// its own parents.
    SplitFamily { left: ParentKey, right: ParentKey },
    /// A person received coordinates.
    PersonPlaced { person: String, x: f64, y: f64 },
    /// A person already placed got different coordinates (last write wins).
    PositionOverwritten {
        person: String,
        previous: (f64, f64),
        x: f64,
        y: f64,
    },
    /// The whole diagram was translated onto the target centre.
    Centered { dx: f64, dy: f64 },
}

impl LayoutEvent {
    /// Whether the event signals degraded input rather than normal progress.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::ChildExcluded { .. } | Self::PositionOverwritten { .. }
        ) || matches!(self, Self::RootsSelected { fallback: true, .. })
    }
}

impl fmt::Display for LayoutEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootsSelected { roots, fallback } => {
                write!(f, "roots [{}]", roots.join(", "))?;
                if *fallback {
                    f.write_str(" (fallback)")?;
                }
                Ok(())
            }
            Self::GenerationAssigned { level, persons } => {
                write!(f, "generation {level}: [{}]", persons.join(", "))
            }
            Self::Unreachable { person, level } => {
                write!(f, "{person} unreachable, placed at generation {level}")
            }
            Self::FamilyUnitResolved { key, children } => {
                write!(f, "unit {key} -> [{}]", children.join(", "))
            }
            Self::ChildExcluded { child, parent_count } => {
                write!(f, "{child} has {parent_count} parents, excluded from family units")
            }
            Self::DescendantWidth { key, width } => write!(f, "unit {key} needs width {width}"),
            Self::SplitFamily { left, right } => {
                write!(f, "independent family sides {left} and {right}")
            }
            Self::PersonPlaced { person, x, y } => write!(f, "{person} at ({x}, {y})"),
            Self::PositionOverwritten {
                person,
                previous,
                x,
                y,
            } => write!(
                f,
                "{person} moved from ({}, {}) to ({x}, {y})",
                previous.0, previous.1
            ),
            Self::Centered { dx, dy } => write!(f, "centered by ({dx}, {dy})"),
        }
    }
}

/// Receiver for layout trace events.
pub trait LayoutObserver {
    fn on_event(&mut self, event: &LayoutEvent);
}

impl<T: LayoutObserver + ?Sized> LayoutObserver for &mut T {
    fn on_event(&mut self, event: &LayoutEvent) {
        (**self).on_event(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl LayoutObserver for NullObserver {
    fn on_event(&mut self, _event: &LayoutEvent) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LayoutObserver for TracingObserver {
    fn on_event(&mut self, event: &LayoutEvent) {
        if event.is_warning() {
            tracing::warn!(target: "genogram_layout", "{event}");
        } else {
            tracing::debug!(target: "genogram_layout", "{event}");
        }
    }
}

/// Writes events to the browser console.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

#[cfg(target_arch = "wasm32")]
impl LayoutObserver for ConsoleObserver {
    fn on_event(&mut self, event: &LayoutEvent) {
        let message = wasm_bindgen::JsValue::from_str(&event.to_string());
        if event.is_warning() {
            web_sys::console::warn_1(&message);
        } else {
            web_sys::console::debug_1(&message);
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub events: Vec<LayoutEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events that signal degraded input.
    pub fn warnings(&self) -> impl Iterator<Item = &LayoutEvent> {
        self.events.iter().filter(|e| e.is_warning())
    }
}

impl LayoutObserver for RecordingObserver {
    fn on_event(&mut self, event: &LayoutEvent) {
        self.events.push(event.clone());
    }
}
