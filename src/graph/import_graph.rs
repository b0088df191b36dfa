//! Weighted directed import graph
//!
//! Nodes are module labels, stored once; an edge A→B with weight w means A
//! was observed importing B across w occurrences. petgraph's node storage is
//! the label arena (indices are never reused because nodes are never
//! removed), and an `FxHashMap` supplies the label→id direction.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct ImportGraph {
    graph: DiGraph<String, f64>,
    ids: FxHashMap<String, NodeIndex>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotently resolve a label to its node, creating the node on first
    /// sighting. The id returned for a label never changes for the lifetime
    /// of the graph.
    pub fn add_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.graph.add_node(label.to_owned());
        self.ids.insert(label.to_owned(), id);
        id
    }

    /// Record one observation of `source` importing `target`: the ordered
    /// edge is created with weight 1.0, or its weight grows by 1.0.
    ///
    /// Repeated observations of the same pair happen when imports are
    /// collected per file, so accumulation is the norm in file granularity.
    pub fn update_edge(&mut self, source: &str, target: &str) {
        let (a, b) = (self.add_node(source), self.add_node(target));
        if let Some(edge) = self.graph.find_edge(a, b) {
            if let Some(weight) = self.graph.edge_weight_mut(edge) {
                *weight += 1.0;
            }
        } else {
            self.graph.add_edge(a, b, 1.0);
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The label for a node id.
    pub fn label(&self, id: NodeIndex) -> Option<&str> {
        self.graph.node_weight(id).map(String::as_str)
    }

    /// The node id for a label, if the label has been seen.
    pub fn node_id(&self, label: &str) -> Option<NodeIndex> {
        self.ids.get(label).copied()
    }

    /// Weight of the ordered edge between two labels, if present.
    pub fn edge_weight(&self, source: &str, target: &str) -> Option<f64> {
        let (a, b) = (self.node_id(source)?, self.node_id(target)?);
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Labels in node-id order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Edges as (source index, target index, weight) triples.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
    }

    /// Edges as (source label, target label, weight) triples.
    pub fn labeled_edges(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.graph.edge_references().filter_map(|e| {
            let src = self.label(e.source())?;
            let dst = self.label(e.target())?;
            Some((src, dst, *e.weight()))
        })
    }
}
