//! Road graph representation and builder.
//!
//! # Data layout
//!
//! Edges keep the `EdgeId` they were given at insertion, so anything keyed by
//! edge (parking spaces, routes) is stable across builds of the same input.
//! Three derived structures are built once:
//!
//! - a CSR index of outgoing edges per node:
//!
//!   ```text
//!   out_edges[ out_start[n] .. out_start[n+1] ]
//!   ```
//!
//! - a dense `node_count × node_count` adjacency matrix of `Option<EdgeId>`,
//!   which the router turns into a weight matrix.  O(N²) memory, paid once
//!   per run;
//!
//! - the opposite-edge table used to forbid immediate U-turns.

use std::collections::HashMap;

use ps_core::{EdgeId, NodeId};

use crate::{SpatialError, SpatialResult};

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Immutable directed road graph.  Construct with [`RoadGraphBuilder`].
#[derive(Debug, Clone)]
pub struct RoadGraph {
    node_names:  Vec<String>,
    node_lookup: HashMap<String, NodeId>,

    edge_names:  Vec<String>,
    edge_lookup: HashMap<String, EdgeId>,
    edge_from:   Vec<NodeId>,
    edge_to:     Vec<NodeId>,
    edge_length: Vec<f64>,

    /// CSR row pointer, length `node_count + 1`.
    out_start: Vec<u32>,
    /// Outgoing edges grouped by source node, ascending `EdgeId` within a node.
    out_edges: Vec<EdgeId>,

    /// Opposite edge per `EdgeId`.
    opposite: Vec<Option<EdgeId>>,

    /// Row-major adjacency matrix: `matrix[from * n + to]`.
    matrix: Vec<Option<EdgeId>>,
}

impl RoadGraph {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_names.is_empty()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edge_count()).map(|i| EdgeId(i as u32))
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn node_name(&self, node: NodeId) -> &str {
        &self.node_names[node.index()]
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_lookup.get(name).copied()
    }

    pub fn edge_name(&self, edge: EdgeId) -> &str {
        &self.edge_names[edge.index()]
    }

    pub fn edge_by_name(&self, name: &str) -> Option<EdgeId> {
        self.edge_lookup.get(name).copied()
    }

    #[inline]
    pub fn edge_from(&self, edge: EdgeId) -> NodeId {
        self.edge_from[edge.index()]
    }

    #[inline]
    pub fn edge_to(&self, edge: EdgeId) -> NodeId {
        self.edge_to[edge.index()]
    }

    /// Length of `edge` in metres.
    #[inline]
    pub fn edge_length(&self, edge: EdgeId) -> f64 {
        self.edge_length[edge.index()]
    }

    /// All edge lengths, indexed by `EdgeId`.
    pub fn edge_lengths(&self) -> &[f64] {
        &self.edge_length
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Outgoing edges of `node`, ascending `EdgeId`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        let start = self.out_start[node.index()] as usize;
        let end   = self.out_start[node.index() + 1] as usize;
        &self.out_edges[start..end]
    }

    /// Every edge departing the target node of `edge` (U-turn included).
    #[inline]
    pub fn successors(&self, edge: EdgeId) -> &[EdgeId] {
        self.out_edges(self.edge_to(edge))
    }

    /// The reverse-direction twin of `edge`, if one was paired.
    #[inline]
    pub fn opposite(&self, edge: EdgeId) -> Option<EdgeId> {
        self.opposite[edge.index()]
    }

    /// The edge from `from` to `to` in the adjacency matrix.
    #[inline]
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.matrix[from.index() * self.node_count() + to.index()]
    }

    /// Convert a node path into the edges joining consecutive nodes.
    pub fn node_path_to_edges(&self, nodes: &[NodeId]) -> SpatialResult<Vec<EdgeId>> {
        nodes
            .windows(2)
            .map(|w| {
                self.edge_between(w[0], w[1])
                    .ok_or(SpatialError::NotAdjacent { from: w[0], to: w[1] })
            })
            .collect()
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes and edges are validated as they are added, so `build` cannot fail.
///
/// # Example
///
/// ```
/// use ps_spatial::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node("A").unwrap();
/// let c = b.add_node("C").unwrap();
/// b.add_two_way("AC", "CA", a, c, 120.0).unwrap();
/// let graph = b.build();
/// assert_eq!(graph.edge_count(), 2);
/// assert!(graph.opposite(graph.edge_by_name("AC").unwrap()).is_some());
/// ```
#[derive(Default)]
pub struct RoadGraphBuilder {
    node_names:    Vec<String>,
    node_lookup:   HashMap<String, NodeId>,
    raw_edges:     Vec<RawEdge>,
    edge_lookup:   HashMap<String, EdgeId>,
    opposites:     Vec<(EdgeId, EdgeId)>,
    pair_reverse:  bool,
}

struct RawEdge {
    name:   String,
    from:   NodeId,
    to:     NodeId,
    length: f64,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an intersection and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, name: impl Into<String>) -> SpatialResult<NodeId> {
        let name = name.into();
        if self.node_lookup.contains_key(&name) {
            return Err(SpatialError::DuplicateNode(name));
        }
        let id = NodeId(self.node_names.len() as u32);
        self.node_lookup.insert(name.clone(), id);
        self.node_names.push(name);
        Ok(id)
    }

    /// Add a **directed** edge of `length` metres.
    pub fn add_edge(
        &mut self,
        name:   impl Into<String>,
        from:   NodeId,
        to:     NodeId,
        length: f64,
    ) -> SpatialResult<EdgeId> {
        let name = name.into();
        if self.edge_lookup.contains_key(&name) {
            return Err(SpatialError::DuplicateEdge(name));
        }
        for node in [from, to] {
            if node.index() >= self.node_names.len() {
                return Err(SpatialError::NodeNotFound(node));
            }
        }
        if !length.is_finite() || length < 0.0 {
            return Err(SpatialError::InvalidLength { edge: name, length });
        }
        let id = EdgeId(self.raw_edges.len() as u32);
        self.edge_lookup.insert(name.clone(), id);
        self.raw_edges.push(RawEdge { name, from, to, length });
        Ok(id)
    }

    /// Convenience: add both directions of a street and pair them as
    /// opposites.
    pub fn add_two_way(
        &mut self,
        forward:  impl Into<String>,
        backward: impl Into<String>,
        a:        NodeId,
        b:        NodeId,
        length:   f64,
    ) -> SpatialResult<(EdgeId, EdgeId)> {
        let ab = self.add_edge(forward, a, b, length)?;
        let ba = self.add_edge(backward, b, a, length)?;
        self.set_opposite(ab, ba)?;
        Ok((ab, ba))
    }

    /// Declare `a` and `b` opposites of each other.
    pub fn set_opposite(&mut self, a: EdgeId, b: EdgeId) -> SpatialResult<()> {
        let (ea, eb) = match (self.raw_edges.get(a.index()), self.raw_edges.get(b.index())) {
            (Some(ea), Some(eb)) => (ea, eb),
            (None, _) => return Err(SpatialError::EdgeNotFound(a)),
            (_, None) => return Err(SpatialError::EdgeNotFound(b)),
        };
        if ea.from != eb.to || ea.to != eb.from || a == b {
            return Err(SpatialError::NotOpposite(a, b));
        }
        self.opposites.push((a, b));
        Ok(())
    }

    /// Pair every edge that has no explicit opposite with the edge running
    /// the reverse way between the same nodes, if one exists.
    pub fn pair_reverse_edges(mut self) -> Self {
        self.pair_reverse = true;
        self
    }

    pub fn node_count(&self) -> usize { self.node_names.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(N²) for the adjacency matrix + O(E log E) for the
    /// CSR sort.
    pub fn build(self) -> RoadGraph {
        let node_count = self.node_names.len();
        let raw = self.raw_edges;

        // Adjacency matrix.  Parallel edges keep the shortest, first on ties.
        let mut matrix: Vec<Option<EdgeId>> = vec![None; node_count * node_count];
        for (i, e) in raw.iter().enumerate() {
            let cell = &mut matrix[e.from.index() * node_count + e.to.index()];
            match *cell {
                Some(existing) if raw[existing.index()].length <= e.length => {}
                _ => *cell = Some(EdgeId(i as u32)),
            }
        }

        // CSR over insertion order; stable sort keeps ascending EdgeId per node.
        let mut order: Vec<EdgeId> = (0..raw.len()).map(|i| EdgeId(i as u32)).collect();
        order.sort_by_key(|e| raw[e.index()].from);
        let mut out_start = vec![0u32; node_count + 1];
        for e in &raw {
            out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[node_count] as usize, raw.len());

        // Opposites: explicit pairs first, then reverse-edge pairing.
        let mut opposite: Vec<Option<EdgeId>> = vec![None; raw.len()];
        for &(a, b) in &self.opposites {
            opposite[a.index()] = Some(b);
            opposite[b.index()] = Some(a);
        }
        if self.pair_reverse {
            for (i, e) in raw.iter().enumerate() {
                if opposite[i].is_none() && e.from != e.to {
                    opposite[i] = matrix[e.to.index() * node_count + e.from.index()];
                }
            }
        }

        let mut edge_names  = Vec::with_capacity(raw.len());
        let mut edge_from   = Vec::with_capacity(raw.len());
        let mut edge_to     = Vec::with_capacity(raw.len());
        let mut edge_length = Vec::with_capacity(raw.len());
        for e in raw {
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_length.push(e.length);
            edge_names.push(e.name);
        }

        RoadGraph {
            node_names:  self.node_names,
            node_lookup: self.node_lookup,
            edge_names,
            edge_lookup: self.edge_lookup,
            edge_from,
            edge_to,
            edge_length,
            out_start,
            out_edges: order,
            opposite,
            matrix,
        }
    }
}
