//! FamilyGraph - parent→child topology.
//!
//! Persons are nodes of a petgraph `StableGraph`, parentage links are directed
//! edges from parent to child. Neighbours are always returned in edge
//! insertion order so traversals are reproducible run to run.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::map::FamilyMap;
use crate::model::{Person, RelationshipKind};

pub struct FamilyGraph {
    /// Nodes store the person id, edges the parentage kind.
    graph: StableGraph<String, RelationshipKind, Directed>,

    /// Map from person id to petgraph NodeIndex
    id_to_index: HashMap<String, NodeIndex>,

    /// Node indices in input order (duplicates collapsed)
    order: Vec<NodeIndex>,
}

impl FamilyGraph {
    /// Build the graph from the caller's persons and resolved parent links.
    pub fn new(persons: &[Person], family: &FamilyMap) -> Self {
        let links = family.parent_links();
        let mut graph = StableGraph::with_capacity(persons.len(), links.len());
        let mut id_to_index = HashMap::with_capacity(persons.len());
        let mut order = Vec::with_capacity(persons.len());

        for person in persons {
            if id_to_index.contains_key(&person.id) {
                continue;
            }
            let index = graph.add_node(person.id.clone());
            id_to_index.insert(person.id.clone(), index);
            order.push(index);
        }

        for link in links {
            if let (Some(&parent), Some(&child)) =
                (id_to_index.get(&link.parent), id_to_index.get(&link.child))
            {
                graph.add_edge(parent, child, link.kind);
            }
        }

        Self {
            graph,
            id_to_index,
            order,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Person ids in input order.
    pub fn persons(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(|&index| self.graph[index].as_str())
    }

    /// Children of `id`, in link declaration order.
    pub fn children(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Parents of `id`, in link declaration order.
    pub fn parents(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(&index) = self.id_to_index.get(id) else {
            return Vec::new();
        };

        // petgraph yields the newest edge first
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(index, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (edge.id(), other)
            })
            .collect();
        edges.sort_by_key(|&(edge, _)| edge);

        edges
            .into_iter()
            .map(|(_, other)| self.graph[other].as_str())
            .collect()
    }
}
