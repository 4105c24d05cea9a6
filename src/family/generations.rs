//! Generation level assignment.
//!
//! Levels come from a breadth-first walk over the family graph that moves in
//! both directions: stepping to a child adds one level, stepping to a parent
//! subtracts one. Roots are picked heuristically, so the walk has to be able
//! to climb above them when the real top generation was not a root.
//!
//! # Algorithm
//!
//! 1. **Root selection:** parentless persons, minus married-in spouses, one
//!    representative per parentless couple ([`select_roots`]). With no
//!    candidate at all, [`fallback_root`] supplies one.
//! 2. **Walk:** BFS from every root at level 0. Spouses are seeded at the
//!    level of the person that reached them.
//! 3. **Settling:** BFS from several roots can reach a child through its
//!    shallower parent first. Children are pushed below their deepest parent
//!    and spouses onto one row until nothing moves (bounded for cyclic input).
//! 4. **Unreachable persons:** assigned `max + 1`.
//! 5. **Normalisation:** shift so the smallest level is 0, then group into rows.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use super::graph::FamilyGraph;
use super::map::FamilyMap;
use crate::model::Person;
use crate::observer::{LayoutEvent, LayoutObserver};

/// Generation level per person, and the persons of each level.
#[derive(Debug, Clone, Default)]
pub struct Generations {
    levels: HashMap<String, u32>,
    /// Level → person ids in discovery order.
    rows: BTreeMap<u32, Vec<String>>,
}

impl Generations {
    pub fn level_of(&self, id: &str) -> Option<u32> {
        self.levels.get(id).copied()
    }

    /// Rows from the top generation down.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = (u32, &[String])> {
        self.rows
            .iter()
            .map(|(&level, ids)| (level, ids.as_slice()))
    }

    pub fn row(&self, level: u32) -> &[String] {
        self.rows.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct levels.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn person_count(&self) -> usize {
        self.levels.len()
    }
}

/// Pick the BFS seeds.
///
/// A parentless person whose spouse has recorded parents married into the
/// family and is reached through that spouse instead. Of a couple where
/// neither partner has parents only the first one encountered is kept; the
/// walk seeds the partner at the same level.
pub fn select_roots(persons: &[Person], family: &FamilyMap) -> Vec<String> {
    let mut roots = Vec::new();
    let mut covered: HashSet<&str> = HashSet::new();

    for person in persons {
        let id = person.id.as_str();
        if family.has_parents(id) || covered.contains(id) {
            continue;
        }

        let spouses = family.spouses_of(id);
        if spouses.iter().any(|s| family.has_parents(s)) {
            continue;
        }

        covered.insert(id);
        covered.extend(spouses.iter().map(String::as_str));
        roots.push(person.id.clone());
    }

    roots
}

/// Root used when no natural root exists: the client, else the first person.
pub fn fallback_root(persons: &[Person]) -> Option<&Person> {
    persons
        .iter()
        .find(|p| p.is_client)
        .or_else(|| persons.first())
}

struct LevelWalk<'a> {
    family: &'a FamilyMap,
    levels: HashMap<String, i64>,
    discovery: Vec<String>,
    queue: VecDeque<(String, i64)>,
}

impl LevelWalk<'_> {
    /// Assign `level` to `id` and its unvisited spouses.
    fn visit(&mut self, id: &str, level: i64) {
        if self.levels.contains_key(id) {
            return;
        }
        self.mark(id, level);
        let family = self.family;
        for spouse in family.spouses_of(id) {
            if !self.levels.contains_key(spouse) {
                self.mark(spouse, level);
            }
        }
    }

    fn mark(&mut self, id: &str, level: i64) {
        self.levels.insert(id.to_string(), level);
        self.discovery.push(id.to_string());
        self.queue.push_back((id.to_string(), level));
    }

    /// Push children below their deepest parent and keep spouses on one row.
    fn settle(&mut self) {
        let family = self.family;
        let rounds = self.levels.len() + 1;
        for _ in 0..rounds {
            let mut changed = false;
            for link in family.parent_links() {
                let (Some(&parent), Some(&child)) =
                    (self.levels.get(&link.parent), self.levels.get(&link.child))
                else {
                    continue;
                };
                if child <= parent {
                    self.levels.insert(link.child.clone(), parent + 1);
                    changed = true;
                }
            }
            for id in &self.discovery {
                let Some(&level) = self.levels.get(id) else {
                    continue;
                };
                for spouse in family.spouses_of(id) {
                    if self.levels.get(spouse).is_some_and(|&other| other < level) {
                        self.levels.insert(spouse.clone(), level);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }
}

/// Assign every person a generation level.
pub fn assign_generations(
    persons: &[Person],
    graph: &FamilyGraph,
    family: &FamilyMap,
    observer: &mut dyn LayoutObserver,
) -> Generations {
    if persons.is_empty() {
        return Generations::default();
    }

    let mut roots = select_roots(persons, family);
    let fallback = roots.is_empty();
    if fallback {
        if let Some(root) = fallback_root(persons) {
            roots.push(root.id.clone());
        }
    }
    observer.on_event(&LayoutEvent::RootsSelected {
        roots: roots.clone(),
        fallback,
    });

    let mut walk = LevelWalk {
        family,
        levels: HashMap::with_capacity(persons.len()),
        discovery: Vec::with_capacity(persons.len()),
        queue: VecDeque::new(),
    };

    for root in &roots {
        walk.visit(root, 0);
    }

    while let Some((id, level)) = walk.queue.pop_front() {
        for spouse in family.spouses_of(&id) {
            walk.visit(spouse, level);
        }
        for child in graph.children(&id) {
            walk.visit(child, level + 1);
        }
        for parent in graph.parents(&id) {
            walk.visit(parent, level - 1);
        }
    }
    walk.settle();

    let unreachable: Vec<String> = graph
        .persons()
        .filter(|id| !walk.levels.contains_key(*id))
        .map(str::to_string)
        .collect();
    if !unreachable.is_empty() {
        let below = walk.levels.values().copied().max().unwrap_or(-1) + 1;
        for id in &unreachable {
            walk.levels.insert(id.clone(), below);
            walk.discovery.push(id.clone());
        }
    }

    let min_level = walk.levels.values().copied().min().unwrap_or(0);
    let shift = if min_level < 0 { -min_level } else { 0 };

    let mut generations = Generations::default();
    for id in walk.discovery {
        let level = (walk.levels[&id] + shift) as u32;
        generations.levels.insert(id.clone(), level);
        generations.rows.entry(level).or_default().push(id);
    }

    for id in &unreachable {
        observer.on_event(&LayoutEvent::Unreachable {
            person: id.clone(),
            level: generations.levels[id],
        });
    }
    for (level, ids) in generations.rows() {
        observer.on_event(&LayoutEvent::GenerationAssigned {
            level,
            persons: ids.to_vec(),
        });
    }

    generations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PersonIndex, Relationship};
    use crate::observer::{NullObserver, RecordingObserver};

    fn run(persons: &[Person], rels: &[Relationship]) -> Generations {
        let index = PersonIndex::new(persons);
        let family = FamilyMap::build(rels, &index);
        let graph = FamilyGraph::new(persons, &family);
        assign_generations(persons, &graph, &family, &mut NullObserver)
    }

    fn people(ids: &[&str]) -> Vec<Person> {
        ids.iter().map(|id| Person::new(*id, "")).collect()
    }

    #[test]
    fn test_nuclear_family_levels() {
        let persons = people(&["p1", "p2", "c1", "c2"]);
        let rels = vec![
            Relationship::marriage("p1", "p2"),
            Relationship::biological("p1", "c1"),
            Relationship::biological("p2", "c1"),
            Relationship::biological("p1", "c2"),
            Relationship::biological("p2", "c2"),
        ];
        let gens = run(&persons, &rels);

        assert_eq!(gens.len(), 2);
        assert_eq!(gens.row(0), ["p1", "p2"]);
        assert_eq!(gens.row(1), ["c1", "c2"]);
    }

    #[test]
    fn test_married_in_spouse_is_not_a_root() {
        // gp → dad; mom married in with no recorded parents
        let persons = people(&["mom", "gp", "dad", "kid"]);
        let rels = vec![
            Relationship::biological("gp", "dad"),
            Relationship::marriage("dad", "mom"),
            Relationship::biological("dad", "kid"),
            Relationship::biological("mom", "kid"),
        ];
        let index = PersonIndex::new(&persons);
        let family = FamilyMap::build(&rels, &index);
        assert_eq!(select_roots(&persons, &family), vec!["gp".to_string()]);

        let gens = run(&persons, &rels);
        assert_eq!(gens.level_of("gp"), Some(0));
        assert_eq!(gens.level_of("dad"), Some(1));
        assert_eq!(gens.level_of("mom"), Some(1));
        assert_eq!(gens.level_of("kid"), Some(2));
        assert_eq!(gens.row(1), ["dad", "mom"]);
    }

    #[test]
    fn test_parentless_couple_keeps_one_representative() {
        let persons = people(&["a", "b"]);
        let rels = vec![Relationship::marriage("a", "b")];
        let index = PersonIndex::new(&persons);
        let family = FamilyMap::build(&rels, &index);

        assert_eq!(select_roots(&persons, &family), vec!["a".to_string()]);
        let gens = run(&persons, &rels);
        assert_eq!(gens.row(0), ["a", "b"]);
    }

    #[test]
    fn test_child_settles_below_deepest_parent() {
        // "other" is a root one level too high for its co-parent's child;
        // the walk reaches "kid" from "other" before it gets there via "mid".
        let persons = people(&["kid", "mid", "top", "other"]);
        let rels = vec![
            Relationship::biological("top", "mid"),
            Relationship::biological("mid", "kid"),
            Relationship::biological("other", "kid"),
        ];
        let gens = run(&persons, &rels);

        assert_eq!(gens.level_of("top"), Some(0));
        assert_eq!(gens.level_of("other"), Some(0));
        assert_eq!(gens.level_of("mid"), Some(1));
        assert_eq!(gens.level_of("kid"), Some(2));
    }

    #[test]
    fn test_upward_expansion_from_spouse() {
        // The married-in spouse's own parent appears after normalisation.
        let persons = people(&["root", "child", "inlaw", "inlaw_parent"]);
        let rels = vec![
            Relationship::biological("root", "child"),
            Relationship::marriage("child", "inlaw"),
            Relationship::biological("inlaw_parent", "inlaw"),
        ];
        let gens = run(&persons, &rels);

        assert_eq!(gens.level_of("root"), Some(0));
        assert_eq!(gens.level_of("inlaw_parent"), Some(0));
        assert_eq!(gens.level_of("child"), Some(1));
        assert_eq!(gens.level_of("inlaw"), Some(1));
    }

    #[test]
    fn test_fallback_root_prefers_client() {
        let persons = vec![
            Person::new("a", ""),
            Person::new("b", "").as_client(),
        ];
        assert_eq!(fallback_root(&persons).map(|p| p.id.as_str()), Some("b"));
        assert_eq!(fallback_root(&persons[..1]).map(|p| p.id.as_str()), Some("a"));
        assert!(fallback_root(&[]).is_none());
    }

    #[test]
    fn test_cycle_uses_fallback_root() {
        let persons = vec![Person::new("a", ""), Person::new("b", "").as_client()];
        let rels = vec![
            Relationship::biological("a", "b"),
            Relationship::biological("b", "a"),
        ];
        let index = PersonIndex::new(&persons);
        let family = FamilyMap::build(&rels, &index);
        let graph = FamilyGraph::new(&persons, &family);
        let mut recorder = RecordingObserver::new();
        let gens = assign_generations(&persons, &graph, &family, &mut recorder);

        assert_eq!(gens.person_count(), 2);
        assert!(recorder.events.contains(&LayoutEvent::RootsSelected {
            roots: vec!["b".to_string()],
            fallback: true,
        }));
    }

    #[test]
    fn test_unreachable_component_goes_below_everyone() {
        // Main family plus a rootless two-person cycle.
        let persons = people(&["p", "c", "x", "y"]);
        let rels = vec![
            Relationship::biological("p", "c"),
            Relationship::biological("x", "y"),
            Relationship::biological("y", "x"),
        ];
        let index = PersonIndex::new(&persons);
        let family = FamilyMap::build(&rels, &index);
        let graph = FamilyGraph::new(&persons, &family);
        let mut recorder = RecordingObserver::new();
        let gens = assign_generations(&persons, &graph, &family, &mut recorder);

        assert_eq!(gens.level_of("p"), Some(0));
        assert_eq!(gens.level_of("c"), Some(1));
        assert_eq!(gens.level_of("x"), Some(2));
        assert_eq!(gens.level_of("y"), Some(2));
        assert_eq!(
            recorder
                .events
                .iter()
                .filter(|e| matches!(e, LayoutEvent::Unreachable { .. }))
                .count(),
            2
        );
    }
}
