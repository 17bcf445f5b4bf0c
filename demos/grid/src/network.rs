//! Synthetic street grid with four entry roads.
//!
//! `SIZE × SIZE` intersections joined by two-way 100 m streets.  The middle
//! row and column are avenues.  One one-way entry road leads into the middle
//! of each side of the grid; they are the only origins of the demand.

use anyhow::Result;
use ps_core::EdgeId;
use ps_spatial::{RoadGraph, RoadGraphBuilder};

const SIZE: usize = 5;
const BLOCK_M: f64 = 100.0;
const ENTRY_M: f64 = 60.0;

fn node_name(row: usize, col: usize) -> String {
    format!("n{row}_{col}")
}

/// Avenues run along the middle row and column.
fn is_avenue(name: &str) -> bool {
    name.starts_with("av")
}

pub fn build_network() -> Result<RoadGraph> {
    let mut b = RoadGraphBuilder::new();
    let mid = SIZE / 2;

    let mut nodes = Vec::with_capacity(SIZE * SIZE);
    for row in 0..SIZE {
        for col in 0..SIZE {
            nodes.push(b.add_node(node_name(row, col))?);
        }
    }
    let at = |row: usize, col: usize| nodes[row * SIZE + col];

    for row in 0..SIZE {
        for col in 0..SIZE - 1 {
            let prefix = if row == mid { "av" } else { "st" };
            b.add_two_way(
                format!("{prefix}_{row}_{col}_e"),
                format!("{prefix}_{row}_{}_w", col + 1),
                at(row, col),
                at(row, col + 1),
                BLOCK_M,
            )?;
        }
    }
    for col in 0..SIZE {
        for row in 0..SIZE - 1 {
            let prefix = if col == mid { "av" } else { "st" };
            b.add_two_way(
                format!("{prefix}_{row}_{col}_s"),
                format!("{prefix}_{}_{col}_n", row + 1),
                at(row, col),
                at(row + 1, col),
                BLOCK_M,
            )?;
        }
    }

    let gates = [
        ("north", at(0, mid)),
        ("south", at(SIZE - 1, mid)),
        ("west", at(mid, 0)),
        ("east", at(mid, SIZE - 1)),
    ];
    for (side, target) in gates {
        let gate = b.add_node(format!("gate_{side}"))?;
        b.add_edge(format!("entry_{side}"), gate, target, ENTRY_M)?;
    }

    Ok(b.build())
}

/// Cooperative routes stay off the avenues where they can.
pub fn avoid_avenues(graph: &RoadGraph, edge: EdgeId) -> f64 {
    let length = graph.edge_length(edge);
    if is_avenue(graph.edge_name(edge)) { length * 1.5 } else { length }
}
