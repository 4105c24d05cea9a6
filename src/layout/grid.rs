//! Grid snapping, bounding boxes and global centring.

use serde::Serialize;

use crate::model::Person;

/// Snap a coordinate to the nearest multiple of `grid`.
///
/// Half-way values round towards positive infinity on both sides of zero, so
/// evenly spaced runs stay evenly spaced when they cross the origin.
#[inline]
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    (value / grid + 0.5).floor() * grid
}

/// Axis-aligned bounding box of person positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Bounding box of all persons, or `None` for an empty slice.
pub fn bounds(persons: &[Person]) -> Option<Bounds> {
    let first = persons.first()?;
    let mut b = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in &persons[1..] {
        b.min_x = b.min_x.min(p.x);
        b.max_x = b.max_x.max(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_y = b.max_y.max(p.y);
    }
    Some(b)
}

/// Translate every person so the bounding-box centre lands on `target`.
///
/// The translation is itself snapped to the grid, so grid-aligned input stays
/// aligned and the centre ends up within half a cell of the target.
/// Returns the applied `(dx, dy)`.
pub fn center_on(persons: &mut [Person], target: (f64, f64), grid: f64) -> (f64, f64) {
    let Some(b) = bounds(persons) else {
        return (0.0, 0.0);
    };
    let (cx, cy) = b.center();
    let dx = snap_to_grid(target.0 - cx, grid);
    let dy = snap_to_grid(target.1 - cy, grid);

    for p in persons.iter_mut() {
        p.x += dx;
        p.y += dy;
    }
    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(id: &str, x: f64, y: f64) -> Person {
        let mut p = Person::new(id, "");
        p.x = x;
        p.y = y;
        p
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(0.0, 50.0), 0.0);
        assert_eq!(snap_to_grid(74.0, 50.0), 50.0);
        assert_eq!(snap_to_grid(76.0, 50.0), 100.0);
        assert_eq!(snap_to_grid(-74.0, 50.0), -50.0);
        assert_eq!(snap_to_grid(425.0, 50.0), 450.0);
        assert_eq!(snap_to_grid(-25.0, 50.0), 0.0);
        assert_eq!(snap_to_grid(-475.0, 50.0), -450.0);
    }

    #[test]
    fn test_snapped_run_keeps_spacing_across_zero() {
        let snapped: Vec<f64> = (0..14)
            .map(|i| snap_to_grid(-475.0 + f64::from(i) * 150.0, 50.0))
            .collect();
        for pair in snapped.windows(2) {
            assert_eq!(pair[1] - pair[0], 150.0, "uneven run: {snapped:?}");
        }
    }

    #[test]
    fn test_bounds() {
        let persons = vec![at("a", -10.0, -5.0), at("b", 10.0, 5.0)];
        let b = bounds(&persons).unwrap();

        assert_eq!(b, Bounds { min_x: -10.0, min_y: -5.0, max_x: 10.0, max_y: 5.0 });
        assert_eq!(b.center(), (0.0, 0.0));
        assert_eq!(b.width(), 20.0);
        assert!(bounds(&[]).is_none());
    }

    #[test]
    fn test_center_on_keeps_grid_alignment() {
        let mut persons = vec![at("a", 450.0, 100.0), at("b", 600.0, 250.0)];
        let (dx, dy) = center_on(&mut persons, (500.0, 300.0), 50.0);

        assert_eq!(dx % 50.0, 0.0);
        assert_eq!(dy % 50.0, 0.0);
        for p in &persons {
            assert_eq!(p.x % 50.0, 0.0, "x of {} off grid", p.id);
            assert_eq!(p.y % 50.0, 0.0, "y of {} off grid", p.id);
        }

        let (cx, cy) = bounds(&persons).unwrap().center();
        assert!((cx - 500.0).abs() <= 25.0, "center x {cx}");
        assert!((cy - 300.0).abs() <= 25.0, "center y {cy}");
    }
}
