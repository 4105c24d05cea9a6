//! Non-fatal input diagnostics.
//!
//! The layout tolerates all of these; hosts use them to tell the user why a
//! person ended up somewhere unexpected.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use thiserror::Error;

use crate::model::{Person, PersonIndex, Relationship};

/// A problem found in the person/relationship collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FamilyIssue {
    #[error("relationship {from} -> {to} references unknown person {missing}")]
    DanglingReference {
        from: String,
        to: String,
        missing: String,
    },

    #[error("{person} has a relationship with themselves")]
    SelfRelationship { person: String },

    #[error("{child} has {count} parents; only one or two are laid out as a family")]
    TooManyParents { child: String, count: usize },

    #[error("person id {id} appears {count} times; only the first is used")]
    DuplicatePerson { id: String, count: usize },
}

/// Collect every issue, in input order per category.
pub fn diagnose(persons: &[Person], relationships: &[Relationship]) -> Vec<FamilyIssue> {
    let mut issues = Vec::new();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();
    for person in persons {
        let count = counts.entry(&person.id).or_insert(0);
        if *count == 0 {
            order.push(&person.id);
        }
        *count += 1;
    }
    for id in order {
        let count = counts[id];
        if count > 1 {
            issues.push(FamilyIssue::DuplicatePerson {
                id: id.to_string(),
                count,
            });
        }
    }

    let index = PersonIndex::new(persons);
    let mut parents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut child_order: Vec<&str> = Vec::new();
    let mut reported_self: HashSet<&str> = HashSet::new();

    for rel in relationships {
        if let Some(missing) = [&rel.from, &rel.to].into_iter().find(|id| !index.contains(id)) {
            issues.push(FamilyIssue::DanglingReference {
                from: rel.from.clone(),
                to: rel.to.clone(),
                missing: missing.clone(),
            });
            continue;
        }
        if rel.is_self_loop() {
            if reported_self.insert(&rel.from) {
                issues.push(FamilyIssue::SelfRelationship {
                    person: rel.from.clone(),
                });
            }
            continue;
        }
        if rel.kind.is_parentage() {
            let set = parents.entry(&rel.to).or_default();
            if set.is_empty() {
                child_order.push(&rel.to);
            }
            set.insert(&rel.from);
        }
    }

    for child in child_order {
        let count = parents[child].len();
        if count > 2 {
            issues.push(FamilyIssue::TooManyParents {
                child: child.to_string(),
                count,
            });
        }
    }

    issues
}
