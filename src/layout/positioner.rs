//! Generation positioner.
//!
//! Assigns coordinates one row at a time, top-down, so every parent already
//! has a position when its children are placed.
//!
//! # Layout Strategy
//!
//! - **Top row:** couples and singles spread evenly around the canonical
//!   centre. Two grandparent couples are pushed apart in proportion to the
//!   width of their descendants.
//! - **Lower rows:** children are grouped by family unit and centred under
//!   their parents' midpoint. Groups are swept left to right and pushed right
//!   when they would run into the previous group.
//! - **Orphans:** persons without a placed parent group go after the last
//!   group of their row.

use std::collections::{HashMap, HashSet};

use super::config::LayoutConfig;
use super::grid::snap_to_grid;
use super::grouping::{PersonGroup, flatten, group_couples_and_singles};
use super::widths::DescendantWidths;
use crate::family::{FamilyMap, Generations, ParentKey};
use crate::model::{Gender, Person, PersonIndex};
use crate::observer::{LayoutEvent, LayoutObserver};

/// Grid-snapped coordinates per person id.
///
/// Placing a person twice is allowed: the last write wins and a differing
/// second write is reported as [`LayoutEvent::PositionOverwritten`].
#[derive(Debug, Clone, Default)]
pub struct Placements {
    positions: HashMap<String, (f64, f64)>,
}

impl Placements {
    pub fn get(&self, id: &str) -> Option<(f64, f64)> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn place(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        grid: f64,
        observer: &mut dyn LayoutObserver,
    ) {
        let (x, y) = (snap_to_grid(x, grid), snap_to_grid(y, grid));
        match self.positions.insert(id.to_string(), (x, y)) {
            Some(previous) if previous != (x, y) => {
                observer.on_event(&LayoutEvent::PositionOverwritten {
                    person: id.to_string(),
                    previous,
                    x,
                    y,
                });
            }
            Some(_) => {}
            None => observer.on_event(&LayoutEvent::PersonPlaced {
                person: id.to_string(),
                x,
                y,
            }),
        }
    }
}

/// Children of one family unit in the row being placed.
#[derive(Debug)]
struct FamilyGroup {
    key: ParentKey,
    /// Mean x of the unit's parents.
    center_x: f64,
    members: Vec<String>,
}

/// Output of the positioner.
#[derive(Debug, Default)]
pub struct Positioned {
    pub placements: Placements,
    /// Persons placed without a parent group, in placement order.
    pub orphans: Vec<String>,
}

pub struct GenerationPositioner<'a> {
    config: &'a LayoutConfig,
    persons: &'a [Person],
    index: &'a PersonIndex,
    family: &'a FamilyMap,
    generations: &'a Generations,
    widths: &'a DescendantWidths,
}

impl<'a> GenerationPositioner<'a> {
    pub fn new(
        config: &'a LayoutConfig,
        persons: &'a [Person],
        index: &'a PersonIndex,
        family: &'a FamilyMap,
        generations: &'a Generations,
        widths: &'a DescendantWidths,
    ) -> Self {
        Self {
            config,
            persons,
            index,
            family,
            generations,
            widths,
        }
    }

    fn gender_of(&self, id: &str) -> Gender {
        self.index
            .person(self.persons, id)
            .map(|p| p.gender)
            .unwrap_or_default()
    }

    fn group(&self, ids: &[String]) -> Vec<PersonGroup> {
        group_couples_and_singles(ids, self.family, |id| self.gender_of(id))
    }

    fn row_y(&self, level: u32) -> f64 {
        self.config.start_y + f64::from(level) * self.config.vertical_spacing
    }

    /// Place every person of every generation.
    pub fn run(&self, observer: &mut dyn LayoutObserver) -> Positioned {
        let mut out = Positioned::default();

        for (row_number, (level, row)) in self.generations.rows().enumerate() {
            let y = self.row_y(level);
            if row_number == 0 {
                self.place_first_generation(row, y, &mut out, observer);
            } else {
                self.place_generation(row, y, &mut out, observer);
            }
        }

        out
    }

    /// Place `ids` left to right starting at `start_x`. Returns the end x.
    fn place_run(
        &self,
        ids: &[String],
        start_x: f64,
        y: f64,
        out: &mut Positioned,
        observer: &mut dyn LayoutObserver,
    ) -> f64 {
        let spacing = self.config.horizontal_spacing;
        for (i, id) in ids.iter().enumerate() {
            out.placements
                .place(id, start_x + i as f64 * spacing, y, self.config.grid_size, observer);
        }
        start_x + self.run_width(ids.len())
    }

    fn run_width(&self, count: usize) -> f64 {
        count.saturating_sub(1) as f64 * self.config.horizontal_spacing
    }

    fn place_first_generation(
        &self,
        row: &[String],
        y: f64,
        out: &mut Positioned,
        observer: &mut dyn LayoutObserver,
    ) {
        let groups = self.group(row);
        let center_x = self.config.first_generation_center_x;

        if let [left, right] = groups.as_slice() {
            if left.is_couple() && right.is_couple() {
                self.place_grandparent_sides(left, right, y, out, observer);
                return;
            }
        }

        let ids = flatten(&groups);
        let start = center_x - self.run_width(ids.len()) / 2.0;
        self.place_run(&ids, start, y, out, observer);
    }

    /// Paternal and maternal grandparents: spread apart by descendant width.
    fn place_grandparent_sides(
        &self,
        left: &PersonGroup,
        right: &PersonGroup,
        y: f64,
        out: &mut Positioned,
        observer: &mut dyn LayoutObserver,
    ) {
        let spacing = self.config.horizontal_spacing;
        let width_of =
            |group: &PersonGroup| self.widths.get(&group.parent_key()).unwrap_or(spacing);
        let total = width_of(left) + width_of(right);
        let offset = (total / 4.0).max(self.config.min_grandparent_gap);
        let center_x = self.config.first_generation_center_x;

        for (group, group_center) in [(left, center_x - offset), (right, center_x + offset)] {
            let start = group_center - self.run_width(group.ids.len()) / 2.0;
            self.place_run(&group.ids, start, y, out, observer);
        }
    }

    fn place_generation(
        &self,
        row: &[String],
        y: f64,
        out: &mut Positioned,
        observer: &mut dyn LayoutObserver,
    ) {
        let mut groups = self.family_groups(row, &out.placements);
        groups.sort_by(|a, b| a.center_x.total_cmp(&b.center_x));

        if self.is_split_family(&groups) {
            observer.on_event(&LayoutEvent::SplitFamily {
                left: groups[0].key.clone(),
                right: groups[1].key.clone(),
            });
        }

        let mut placed: HashSet<&str> = HashSet::new();
        let mut last_end: Option<f64> = None;

        // Distant sides stay centred under their own parents: the push below
        // only fires when a group would start inside the previous one.
        for group in &groups {
            let ids = flatten(&self.group(&group.members));
            let width = self.run_width(ids.len());
            let mut start = group.center_x - width / 2.0;
            if let Some(end) = last_end {
                start = start.max(end + self.config.min_group_gap);
            }
            let end = self.place_run(&ids, start, y, out, observer);
            last_end = Some(last_end.map_or(end, |e| e.max(end)));
            placed.extend(group.members.iter().map(String::as_str));
        }

        let mut orphans: Vec<&String> = row
            .iter()
            .filter(|id| !placed.contains(id.as_str()))
            .collect();
        if orphans.is_empty() {
            return;
        }
        orphans.sort_by_key(|id| self.index.get(id).unwrap_or(usize::MAX));
        let orphans: Vec<String> = orphans.into_iter().cloned().collect();
        let ids = flatten(&self.group(&orphans));

        let start = match last_end {
            Some(end) => end + self.config.horizontal_spacing,
            None => self.config.first_generation_center_x - self.run_width(ids.len()) / 2.0,
        };
        self.place_run(&ids, start, y, out, observer);
        out.orphans.extend(ids);
    }

    /// Exactly two parent groups whose parents sit far apart: both sides of
    /// the family, each centred under its own parents.
    fn is_split_family(&self, groups: &[FamilyGroup]) -> bool {
        match groups {
            [left, right] => {
                (right.center_x - left.center_x).abs() > self.config.split_family_threshold
            }
            _ => false,
        }
    }

    /// Resolve the family groups of a row against already placed parents.
    ///
    /// A child of unmarried co-parents joins both parents' groups. A married-in
    /// spouse without parents joins the group of the first spouse met here.
    fn family_groups(&self, row: &[String], placements: &Placements) -> Vec<FamilyGroup> {
        let in_row: HashSet<&str> = row.iter().map(String::as_str).collect();
        let mut groups: Vec<FamilyGroup> = Vec::new();
        let mut slot_of: HashMap<&ParentKey, usize> = HashMap::new();
        let mut folded: HashSet<&str> = HashSet::new();

        for id in row {
            for key in self.family.units_of_child(id) {
                let slot = match slot_of.get(key) {
                    Some(&slot) => slot,
                    None => {
                        let Some(center_x) = Self::parent_center(key, placements) else {
                            continue;
                        };
                        groups.push(FamilyGroup {
                            key: key.clone(),
                            center_x,
                            members: Vec::new(),
                        });
                        slot_of.insert(key, groups.len() - 1);
                        groups.len() - 1
                    }
                };

                let members = &mut groups[slot].members;
                if !members.contains(id) {
                    members.push(id.clone());
                }
                for spouse in self.family.spouses_of(id) {
                    let married_in = in_row.contains(spouse.as_str())
                        && !self.family.has_parents(spouse)
                        && !folded.contains(spouse.as_str());
                    if married_in {
                        folded.insert(spouse.as_str());
                        members.push(spouse.clone());
                    }
                }
            }
        }

        groups
    }

    /// Mean x of a unit's parents, if all of them are placed.
    fn parent_center(key: &ParentKey, placements: &Placements) -> Option<f64> {
        let parents = key.parents();
        let mut sum = 0.0;
        for parent in &parents {
            sum += placements.get(parent)?.0;
        }
        Some(sum / parents.len() as f64)
    }
}

impl std::fmt::Debug for GenerationPositioner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPositioner")
            .field("config", self.config)
            .field("generations", &self.generations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{FamilyGraph, assign_generations};
    use crate::layout::widths::calculate_descendant_widths;
    use crate::model::Relationship;
    use crate::observer::{NullObserver, RecordingObserver};

    fn position(
        persons: &[Person],
        rels: &[Relationship],
        observer: &mut dyn LayoutObserver,
    ) -> Positioned {
        let config = LayoutConfig::default();
        let index = PersonIndex::new(persons);
        let family = FamilyMap::build(rels, &index);
        let graph = FamilyGraph::new(persons, &family);
        let gens = assign_generations(persons, &graph, &family, &mut NullObserver);
        let widths = calculate_descendant_widths(&gens, &family, &config, &mut NullObserver);
        GenerationPositioner::new(&config, persons, &index, &family, &gens, &widths).run(observer)
    }

    fn people(ids: &[&str]) -> Vec<Person> {
        ids.iter().map(|id| Person::new(*id, "")).collect()
    }

    fn x(out: &Positioned, id: &str) -> f64 {
        out.placements.get(id).map(|(x, _)| x).unwrap()
    }

    fn y(out: &Positioned, id: &str) -> f64 {
        out.placements.get(id).map(|(_, y)| y).unwrap()
    }

    #[test]
    fn test_top_row_centered_on_canonical_x() {
        let persons = vec![
            Person::new("b", "").with_gender(Gender::Female),
            Person::new("a", "").with_gender(Gender::Male),
        ];
        let out = position(&persons, &[Relationship::marriage("b", "a")], &mut NullObserver);

        assert_eq!(x(&out, "a"), 450.0);
        assert_eq!(x(&out, "b"), 600.0);
        assert_eq!(y(&out, "a"), 100.0);
    }

    #[test]
    fn test_children_centered_under_parents() {
        let persons = people(&["p1", "p2", "c1", "c2", "c3"]);
        let mut rels = vec![Relationship::marriage("p1", "p2")];
        for c in ["c1", "c2", "c3"] {
            rels.push(Relationship::biological("p1", c));
            rels.push(Relationship::biological("p2", c));
        }
        let out = position(&persons, &rels, &mut NullObserver);

        let parents_mid = (x(&out, "p1") + x(&out, "p2")) / 2.0;
        let kids_mid = (x(&out, "c1") + x(&out, "c3")) / 2.0;
        assert!((parents_mid - kids_mid).abs() <= 25.0, "{parents_mid} vs {kids_mid}");
        assert_eq!(y(&out, "c2"), 250.0);
        assert!(x(&out, "c1") < x(&out, "c2") && x(&out, "c2") < x(&out, "c3"));
    }

    #[test]
    fn test_grandparent_couples_on_opposite_sides() {
        let persons = people(&["g1a", "g1b", "g2a", "g2b", "f1", "f2", "c"]);
        let rels = vec![
            Relationship::marriage("g1a", "g1b"),
            Relationship::marriage("g2a", "g2b"),
            Relationship::biological("g1a", "f1"),
            Relationship::biological("g1b", "f1"),
            Relationship::biological("g2a", "f2"),
            Relationship::biological("g2b", "f2"),
            Relationship::marriage("f1", "f2"),
            Relationship::biological("f1", "c"),
            Relationship::biological("f2", "c"),
        ];
        let out = position(&persons, &rels, &mut NullObserver);

        let left_mid = (x(&out, "g1a") + x(&out, "g1b")) / 2.0;
        let right_mid = (x(&out, "g2a") + x(&out, "g2b")) / 2.0;
        assert!(left_mid < 500.0 && right_mid > 500.0, "{left_mid} / {right_mid}");
        assert!(x(&out, "g1a").max(x(&out, "g1b")) < x(&out, "g2a").min(x(&out, "g2b")));
        assert!(x(&out, "f1") < x(&out, "f2"));
        let mid = (x(&out, "f1") + x(&out, "f2")) / 2.0;
        assert!((x(&out, "c") - mid).abs() <= 25.0);
    }

    #[test]
    fn test_groups_do_not_overlap() {
        // Two single parents next to each other, each with three children.
        let persons = people(&["a", "b", "a1", "a2", "a3", "b1", "b2", "b3"]);
        let mut rels = Vec::new();
        for c in ["a1", "a2", "a3"] {
            rels.push(Relationship::biological("a", c));
        }
        for c in ["b1", "b2", "b3"] {
            rels.push(Relationship::biological("b", c));
        }
        let out = position(&persons, &rels, &mut NullObserver);

        assert!(
            x(&out, "b1") >= x(&out, "a3") + 50.0,
            "b1 at {} overlaps a3 at {}",
            x(&out, "b1"),
            x(&out, "a3")
        );
    }

    #[test]
    fn test_orphan_after_last_group() {
        // "odd" has three recorded parents and belongs to no unit.
        let persons = people(&["p1", "p2", "q", "c1", "c2", "odd"]);
        let rels = vec![
            Relationship::marriage("p1", "p2"),
            Relationship::biological("p1", "c1"),
            Relationship::biological("p2", "c1"),
            Relationship::biological("p1", "c2"),
            Relationship::biological("p2", "c2"),
            Relationship::biological("p1", "odd"),
            Relationship::biological("p2", "odd"),
            Relationship::biological("q", "odd"),
        ];
        let out = position(&persons, &rels, &mut NullObserver);

        assert_eq!(out.orphans, vec!["odd".to_string()]);
        assert_eq!(y(&out, "odd"), y(&out, "c1"));
        assert!(x(&out, "odd") >= x(&out, "c2") + 150.0);
    }

    #[test]
    fn test_married_in_spouse_sits_with_child() {
        let persons = people(&["gp", "son", "wife"]);
        let rels = vec![
            Relationship::biological("gp", "son"),
            Relationship::marriage("son", "wife"),
        ];
        let out = position(&persons, &rels, &mut NullObserver);

        assert!(out.orphans.is_empty());
        assert_eq!(y(&out, "son"), y(&out, "wife"));
        assert_eq!((x(&out, "wife") - x(&out, "son")).abs(), 150.0);
    }

    #[test]
    fn test_coparent_child_written_twice() {
        let persons = people(&["p1", "p2", "x", "c"]);
        let rels = vec![
            Relationship::biological("p1", "x"),
            Relationship::biological("p1", "c"),
            Relationship::biological("p2", "c"),
        ];
        let mut recorder = RecordingObserver::new();
        let out = position(&persons, &rels, &mut recorder);

        assert!(out.placements.contains("c"));
        assert_eq!(out.placements.len(), 4);
        let overwrites = recorder
            .events
            .iter()
            .filter(|e| {
                matches!(e, LayoutEvent::PositionOverwritten { person, .. } if person == "c")
            })
            .count();
        assert!(overwrites <= 1);
    }

    #[test]
    fn test_distant_sides_stay_under_own_parents() {
        let persons = people(&["a", "m", "b", "ka", "kb"]);
        let rels = vec![
            Relationship::biological("a", "ka"),
            Relationship::biological("b", "kb"),
        ];
        let mut recorder = RecordingObserver::new();
        let out = position(&persons, &rels, &mut recorder);

        assert_eq!(x(&out, "ka"), x(&out, "a"));
        assert_eq!(x(&out, "kb"), x(&out, "b"));
        assert!(recorder.events.contains(&LayoutEvent::SplitFamily {
            left: ParentKey::single("a"),
            right: ParentKey::single("b"),
        }));
    }

    #[test]
    fn test_wide_top_row_evenly_spaced() {
        let mut persons = people(&["s0", "s1", "s2"]);
        persons.push(Person::new("h", "").with_gender(Gender::Male));
        persons.push(Person::new("w", "").with_gender(Gender::Female));
        persons.extend(people(&["s5", "s6", "s7", "s8", "s9", "s10", "s11", "s12", "s13"]));
        let out = position(&persons, &[Relationship::marriage("h", "w")], &mut NullObserver);

        let xs: Vec<f64> = persons.iter().map(|p| x(&out, &p.id)).collect();
        let gaps: Vec<f64> = xs.windows(2).map(|pair| pair[1] - pair[0]).collect();
        assert!(xs[0] < 0.0, "row should cross zero: {xs:?}");
        assert!(gaps.iter().all(|&gap| gap == 150.0), "uneven gaps: {gaps:?}");
        assert_eq!(x(&out, "w") - x(&out, "h"), 150.0);
    }

    #[test]
    fn test_wide_grandparent_subtrees_push_sides_apart() {
        let persons = people(&[
            "g1a", "g1b", "g2a", "g2b", "k1", "k2", "k3", "k4", "k5", "k6", "k7", "k8",
        ]);
        let mut rels = vec![
            Relationship::marriage("g1a", "g1b"),
            Relationship::marriage("g2a", "g2b"),
        ];
        for (parents, kids) in [
            (["g1a", "g1b"], ["k1", "k2", "k3", "k4"]),
            (["g2a", "g2b"], ["k5", "k6", "k7", "k8"]),
        ] {
            for kid in kids {
                for parent in parents {
                    rels.push(Relationship::biological(parent, kid));
                }
            }
        }
        let out = position(&persons, &rels, &mut NullObserver);

        let left_mid = (x(&out, "g1a") + x(&out, "g1b")) / 2.0;
        let right_mid = (x(&out, "g2a") + x(&out, "g2b")) / 2.0;
        assert_eq!(right_mid - left_mid, 600.0, "sides at {left_mid} and {right_mid}");

        let left_end = ["k1", "k2", "k3", "k4"]
            .map(|k| x(&out, k))
            .into_iter()
            .fold(f64::MIN, f64::max);
        let right_start = ["k5", "k6", "k7", "k8"]
            .map(|k| x(&out, k))
            .into_iter()
            .fold(f64::MAX, f64::min);
        assert!(left_end < right_start, "child rows overlap: {left_end} vs {right_start}");
    }
}
