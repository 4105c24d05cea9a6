//! Couple/single grouping within a row.

use std::collections::HashSet;

use crate::family::{FamilyMap, ParentKey};
use crate::model::Gender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Couple,
    Single,
}

/// Persons that sit next to each other: a couple (two ids) or a single.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonGroup {
    pub kind: GroupKind,
    pub ids: Vec<String>,
}

impl PersonGroup {
    fn single(id: &str) -> Self {
        Self {
            kind: GroupKind::Single,
            ids: vec![id.to_string()],
        }
    }

    pub fn is_couple(&self) -> bool {
        self.kind == GroupKind::Couple
    }

    /// The unit key this group heads (couple key or single key).
    pub fn parent_key(&self) -> ParentKey {
        match self.ids.as_slice() {
            [a, b] => ParentKey::couple(a.clone(), b.clone()),
            [a, ..] => ParentKey::single(a.clone()),
            [] => ParentKey::single(String::new()),
        }
    }
}

/// Pair each person with a spouse from the same list.
///
/// Groups follow first-encounter order. A male/female couple is ordered male
/// left; any other couple keeps list order. With several spouses in the list
/// the most recently married one is paired first.
pub fn group_couples_and_singles<F>(
    ids: &[String],
    family: &FamilyMap,
    gender_of: F,
) -> Vec<PersonGroup>
where
    F: Fn(&str) -> Gender,
{
    let members: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut processed: HashSet<&str> = HashSet::with_capacity(ids.len());
    let mut groups = Vec::new();

    for id in ids {
        let id = id.as_str();
        if !processed.insert(id) {
            continue;
        }

        let partner = family
            .spouses_of(id)
            .iter()
            .rev()
            .map(String::as_str)
            .find(|s| members.contains(s) && !processed.contains(s));

        match partner {
            Some(partner) => {
                processed.insert(partner);
                let ordered = match (gender_of(id), gender_of(partner)) {
                    (Gender::Female, Gender::Male) => [partner, id],
                    _ => [id, partner],
                };
                groups.push(PersonGroup {
                    kind: GroupKind::Couple,
                    ids: ordered.iter().map(|s| s.to_string()).collect(),
                });
            }
            None => groups.push(PersonGroup::single(id)),
        }
    }

    groups
}

/// Person ids of all groups, left to right.
pub fn flatten(groups: &[PersonGroup]) -> Vec<String> {
    groups.iter().flat_map(|g| g.ids.iter().cloned()).collect()
}
