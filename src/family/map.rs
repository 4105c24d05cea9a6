//! Family unit resolution.
//!
//! A family unit is a parent key (one parent, or a married couple) together
//! with its children. A child of two parents who are not married to each
//! other is listed under *both* single-parent keys, so the unit table is a
//! multimap from child to keys.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::model::{PersonIndex, Relationship, RelationshipKind};
use crate::observer::{LayoutEvent, LayoutObserver};

/// Canonical identifier of a family unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParentKey {
    /// A single (or unmarried) parent.
    Single(String),
    /// Two married parents, stored in sorted order.
    Couple(String, String),
}

impl ParentKey {
    /// Separator used when rendering a couple key.
    pub const SEPARATOR: char = '|';

    pub fn single(id: impl Into<String>) -> Self {
        Self::Single(id.into())
    }

    /// Couple key; the partners are sorted so argument order does not matter.
    pub fn couple(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b { Self::Couple(a, b) } else { Self::Couple(b, a) }
    }

    /// Parent ids of this unit.
    pub fn parents(&self) -> Vec<&str> {
        match self {
            Self::Single(id) => vec![id.as_str()],
            Self::Couple(a, b) => vec![a.as_str(), b.as_str()],
        }
    }

    #[inline]
    pub fn is_couple(&self) -> bool {
        matches!(self, Self::Couple(..))
    }
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(id) => f.write_str(id),
            Self::Couple(a, b) => write!(f, "{a}{}{b}", Self::SEPARATOR),
        }
    }
}

/// A parent→child link that survived endpoint validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    pub parent: String,
    pub child: String,
    pub kind: RelationshipKind,
}

/// Marriage and parentage indices for one layout run.
#[derive(Debug, Clone, Default)]
pub struct FamilyMap {
    /// Married pairs, each stored sorted.
    married_pairs: HashSet<(String, String)>,
    /// Spouses per person in declaration order.
    spouses: HashMap<String, Vec<String>>,
    /// Recorded parents per child.
    parents_of_child: HashMap<String, BTreeSet<String>>,
    /// Unique parent links in declaration order.
    parent_links: Vec<ParentLink>,
    /// Family units.
    children_by_parents: BTreeMap<ParentKey, Vec<String>>,
    /// Reverse index: child → units listing it.
    units_of_child: HashMap<String, Vec<ParentKey>>,
    /// Reverse index: parent → units it heads.
    units_of_parent: HashMap<String, Vec<ParentKey>>,
    /// Children left out of every unit, with their parent count.
    excluded: Vec<(String, usize)>,
}

impl FamilyMap {
    /// Resolve marriages and family units.
    ///
    /// Relationships with an endpoint missing from `index`, and relationships
    /// of a person with themselves, contribute nothing.
    pub fn build(relationships: &[Relationship], index: &PersonIndex) -> Self {
        let mut map = Self::default();
        let valid = |rel: &&Relationship| {
            !rel.is_self_loop() && index.contains(&rel.from) && index.contains(&rel.to)
        };

        for rel in relationships.iter().filter(valid) {
            if rel.kind.is_marriage() {
                map.add_marriage(&rel.from, &rel.to);
            }
        }

        let mut child_order: Vec<String> = Vec::new();
        for rel in relationships.iter().filter(valid) {
            if !rel.kind.is_parentage() {
                continue;
            }
            let parents = map.parents_of_child.entry(rel.to.clone()).or_default();
            if parents.is_empty() {
                child_order.push(rel.to.clone());
            }
            if parents.insert(rel.from.clone()) {
                map.parent_links.push(ParentLink {
                    parent: rel.from.clone(),
                    child: rel.to.clone(),
                    kind: rel.kind,
                });
            }
        }

        for child in child_order {
            let parents: Vec<String> = map.parents_of_child[&child].iter().cloned().collect();
            match parents.as_slice() {
                [single] => map.add_unit_child(ParentKey::single(single.clone()), &child),
                [a, b] if map.are_married(a, b) => {
                    map.add_unit_child(ParentKey::couple(a.clone(), b.clone()), &child)
                }
                [a, b] => {
                    map.add_unit_child(ParentKey::single(a.clone()), &child);
                    map.add_unit_child(ParentKey::single(b.clone()), &child);
                }
                _ => map.excluded.push((child.clone(), parents.len())),
            }
        }

        map
    }

    fn add_marriage(&mut self, a: &str, b: &str) {
        let pair = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        if !self.married_pairs.insert(pair) {
            return;
        }
        self.spouses.entry(a.to_string()).or_default().push(b.to_string());
        self.spouses.entry(b.to_string()).or_default().push(a.to_string());
    }

    fn add_unit_child(&mut self, key: ParentKey, child: &str) {
        let children = self.children_by_parents.entry(key.clone()).or_default();
        if children.is_empty() {
            for parent in key.parents() {
                self.units_of_parent
                    .entry(parent.to_string())
                    .or_default()
                    .push(key.clone());
            }
        }
        children.push(child.to_string());
        self.units_of_child
            .entry(child.to_string())
            .or_default()
            .push(key);
    }

    /// Whether `a` and `b` were declared married to each other.
    pub fn are_married(&self, a: &str, b: &str) -> bool {
        let pair = if a <= b { (a, b) } else { (b, a) };
        self.married_pairs
            .contains(&(pair.0.to_string(), pair.1.to_string()))
    }

    /// Current spouse: the most recently declared one.
    pub fn spouse_of(&self, id: &str) -> Option<&str> {
        self.spouses
            .get(id)
            .and_then(|s| s.last())
            .map(String::as_str)
    }

    /// Every spouse of `id`, in declaration order.
    pub fn spouses_of(&self, id: &str) -> &[String] {
        self.spouses.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Recorded parents of `id` (any count).
    pub fn parents_of(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.parents_of_child.get(id)
    }

    #[inline]
    pub fn has_parents(&self, id: &str) -> bool {
        self.parents_of_child
            .get(id)
            .is_some_and(|parents| !parents.is_empty())
    }

    /// Children of a unit, in discovery order.
    pub fn children_of(&self, key: &ParentKey) -> &[String] {
        self.children_by_parents
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All family units, ordered by key.
    pub fn units(&self) -> impl Iterator<Item = (&ParentKey, &[String])> {
        self.children_by_parents
            .iter()
            .map(|(key, children)| (key, children.as_slice()))
    }

    pub fn unit_count(&self) -> usize {
        self.children_by_parents.len()
    }

    /// Units listing `id` as a child.
    pub fn units_of_child(&self, id: &str) -> &[ParentKey] {
        self.units_of_child
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Units headed by `id`, alone or with a spouse.
    pub fn units_of_parent(&self, id: &str) -> &[ParentKey] {
        self.units_of_parent
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn parent_links(&self) -> &[ParentLink] {
        &self.parent_links
    }

    /// Children that belong to no unit, with their recorded parent count.
    pub fn excluded_children(&self) -> &[(String, usize)] {
        &self.excluded
    }

    /// Report resolved units and exclusions.
    pub fn report(&self, observer: &mut dyn LayoutObserver) {
        for (key, children) in self.units() {
            observer.on_event(&LayoutEvent::FamilyUnitResolved {
                key: key.clone(),
                children: children.to_vec(),
            });
        }
        for (child, parent_count) in &self.excluded {
            observer.on_event(&LayoutEvent::ChildExcluded {
                child: child.clone(),
                parent_count: *parent_count,
            });
        }
    }
}
