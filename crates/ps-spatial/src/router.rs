//! Multi-origin shortest-path routing over the road graph's weight matrix.
//!
//! # Weight strategies
//!
//! Individual and cooperative routing run the *same* Dijkstra over the *same*
//! graph; they differ only in the [`EdgeWeights`] strategy used to fill the
//! [`WeightMatrix`].  [`StaticLengths`] gives plain shortest paths.  A
//! cooperative strategy (anything that turns shared occupancy information
//! into an edge cost) is supplied by the caller; closures
//! `Fn(&RoadGraph, EdgeId) -> f64` implement the trait directly.
//!
//! # Matrix semantics
//!
//! A cell holding exactly `0.0` means "no edge".  An edge whose effective
//! weight is zero is therefore never traversed, matching the adjacency-matrix
//! convention the router is built around.
//!
//! # Determinism
//!
//! The priority queue orders entries by `(cost, NodeId)`, so equal-cost ties
//! settle the lowest node index first and relaxation only accepts strictly
//! shorter paths.  The same graph and origin always yield the same tree, with
//! or without the `parallel` feature.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use log::debug;
use ps_core::{EdgeId, NodeId};

use crate::network::RoadGraph;
use crate::{SpatialError, SpatialResult};

// ── Edge weights ──────────────────────────────────────────────────────────────

/// Effective edge cost used to fill the router's weight matrix.
///
/// Implementations must be `Send + Sync` so per-origin searches can share the
/// matrix across Rayon workers.
pub trait EdgeWeights: Send + Sync {
    /// Cost of traversing `edge`.  Must be finite and non-negative; zero
    /// removes the edge from routing.
    fn weight(&self, graph: &RoadGraph, edge: EdgeId) -> f64;
}

/// Edge length in metres: the individual (non-cooperative) strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLengths;

impl EdgeWeights for StaticLengths {
    #[inline]
    fn weight(&self, graph: &RoadGraph, edge: EdgeId) -> f64 {
        graph.edge_length(edge)
    }
}

impl<F> EdgeWeights for F
where
    F: Fn(&RoadGraph, EdgeId) -> f64 + Send + Sync,
{
    #[inline]
    fn weight(&self, graph: &RoadGraph, edge: EdgeId) -> f64 {
        self(graph, edge)
    }
}

// ── WeightMatrix ──────────────────────────────────────────────────────────────

/// Node-indexed `n × n` matrix of effective edge weights, `0.0` = no edge.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    n:     usize,
    cells: Vec<f64>,
}

impl WeightMatrix {
    /// Fill the matrix from the graph's adjacency matrix using `weights`.
    pub fn from_graph<W: EdgeWeights + ?Sized>(graph: &RoadGraph, weights: &W) -> SpatialResult<Self> {
        let n = graph.node_count();
        let mut cells = vec![0.0; n * n];
        for from in 0..n {
            for to in 0..n {
                let (f, t) = (NodeId(from as u32), NodeId(to as u32));
                if let Some(edge) = graph.edge_between(f, t) {
                    let weight = weights.weight(graph, edge);
                    if !weight.is_finite() || weight < 0.0 {
                        return Err(SpatialError::InvalidWeight { edge, weight });
                    }
                    cells[from * n + to] = weight;
                }
            }
        }
        Ok(Self { n, cells })
    }

    /// Build from explicit rows (`rows[from][to]`).  The matrix must be
    /// square with finite, non-negative entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> SpatialResult<Self> {
        let n = rows.len();
        let mut cells = Vec::with_capacity(n * n);
        for (from, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(SpatialError::MatrixShape { row: from, len: row.len(), expected: n });
            }
            for (to, &weight) in row.iter().enumerate() {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(SpatialError::InvalidCell { from, to, weight });
                }
                cells.push(weight);
            }
        }
        Ok(Self { n, cells })
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Weight of the cell `from → to` (`0.0` if there is no edge).
    #[inline]
    pub fn get(&self, from: NodeId, to: NodeId) -> f64 {
        self.cells[from.index() * self.n + to.index()]
    }

    #[inline]
    fn row(&self, from: usize) -> &[f64] {
        &self.cells[from * self.n..(from + 1) * self.n]
    }
}

// ── ShortestPathTree ──────────────────────────────────────────────────────────

/// Single-origin Dijkstra result: distances and predecessors for every node.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPathTree {
    origin: NodeId,
    /// `f64::INFINITY` for unreached nodes.
    dist:   Vec<f64>,
    pred:   Vec<Option<NodeId>>,
}

impl ShortestPathTree {
    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn node_count(&self) -> usize {
        self.dist.len()
    }

    /// Shortest distance to `node`, `None` if unreachable or out of range.
    pub fn distance_to(&self, node: NodeId) -> Option<f64> {
        self.dist.get(node.index()).copied().filter(|d| d.is_finite())
    }

    /// The node preceding `node` on its shortest path.
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.pred.get(node.index()).copied().flatten()
    }
}

/// Walk predecessors from `destination` back to the tree's origin and return
/// the path in origin → destination order.
///
/// `destination == origin` yields `[origin]`.  Fails with
/// [`SpatialError::Unreachable`] if the chain does not reach the origin
/// within `node_count` steps.
pub fn reconstruct(tree: &ShortestPathTree, destination: NodeId) -> SpatialResult<Vec<NodeId>> {
    let n = tree.node_count();
    if destination.index() >= n {
        return Err(SpatialError::NodeNotFound(destination));
    }
    let mut path = vec![destination];
    let mut cur = destination;
    for _ in 0..n {
        if cur == tree.origin {
            path.reverse();
            return Ok(path);
        }
        match tree.predecessor(cur) {
            Some(prev) => {
                path.push(prev);
                cur = prev;
            }
            None => break,
        }
    }
    Err(SpatialError::Unreachable { from: tree.origin, to: destination })
}

// ── ShortestPathForest ────────────────────────────────────────────────────────

/// One [`ShortestPathTree`] per distinct origin.
#[derive(Debug, Clone, Default)]
pub struct ShortestPathForest {
    trees: BTreeMap<NodeId, ShortestPathTree>,
}

impl ShortestPathForest {
    pub fn get(&self, origin: NodeId) -> Option<&ShortestPathTree> {
        self.trees.get(&origin)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Node path `origin → destination`.  An origin that was not part of the
    /// precomputation reports [`SpatialError::NodeNotFound`].
    pub fn path(&self, origin: NodeId, destination: NodeId) -> SpatialResult<Vec<NodeId>> {
        let tree = self.get(origin).ok_or(SpatialError::NodeNotFound(origin))?;
        reconstruct(tree, destination)
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Dijkstra over a [`WeightMatrix`], one tree per origin.
#[derive(Debug, Clone)]
pub struct Router {
    matrix: WeightMatrix,
}

impl Router {
    /// Build the weight matrix of `graph` under `weights`.
    pub fn new<W: EdgeWeights + ?Sized>(graph: &RoadGraph, weights: &W) -> SpatialResult<Self> {
        Ok(Self { matrix: WeightMatrix::from_graph(graph, weights)? })
    }

    pub fn from_matrix(matrix: WeightMatrix) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &WeightMatrix {
        &self.matrix
    }

    /// Shortest-path tree rooted at `origin`.
    pub fn shortest_from(&self, origin: NodeId) -> SpatialResult<ShortestPathTree> {
        if origin.index() >= self.matrix.node_count() {
            return Err(SpatialError::NodeNotFound(origin));
        }
        Ok(dijkstra(&self.matrix, origin))
    }

    /// Trees for every distinct origin in `origins`.
    ///
    /// With the `parallel` feature the independent searches run on Rayon's
    /// thread pool; the result is identical either way.
    pub fn shortest_paths(&self, origins: &[NodeId]) -> SpatialResult<ShortestPathForest> {
        let distinct: Vec<NodeId> = origins.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        #[cfg(not(feature = "parallel"))]
        let trees: Vec<(NodeId, ShortestPathTree)> = distinct
            .iter()
            .map(|&o| self.shortest_from(o).map(|t| (o, t)))
            .collect::<SpatialResult<_>>()?;

        #[cfg(feature = "parallel")]
        let trees: Vec<(NodeId, ShortestPathTree)> = {
            use rayon::prelude::*;
            distinct
                .par_iter()
                .map(|&o| self.shortest_from(o).map(|t| (o, t)))
                .collect::<SpatialResult<_>>()?
        };

        debug!("computed {} shortest-path trees for {} origins", trees.len(), origins.len());
        Ok(ShortestPathForest { trees: trees.into_iter().collect() })
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap key with a total order over `f64`.
#[derive(Clone, Copy, Debug)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(matrix: &WeightMatrix, origin: NodeId) -> ShortestPathTree {
    let n = matrix.node_count();
    let mut dist    = vec![f64::INFINITY; n];
    let mut pred    = vec![None; n];
    let mut settled = vec![false; n];

    dist[origin.index()] = 0.0;

    // Min-heap via Reverse; NodeId as secondary key for deterministic ties.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), origin)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if settled[node.index()] {
            continue;
        }
        settled[node.index()] = true;

        for (to, &weight) in matrix.row(node.index()).iter().enumerate() {
            if weight == 0.0 || settled[to] {
                continue;
            }
            let candidate = cost + weight;
            if candidate < dist[to] {
                dist[to] = candidate;
                pred[to] = Some(node);
                heap.push(Reverse((Cost(candidate), NodeId(to as u32))));
            }
        }
    }

    ShortestPathTree { origin, dist, pred }
}
