//! PageRank centrality over the weighted import graph
//!
//! Power iteration with damping 0.85 and tolerance 1e-4. A node's score is
//! redistributed to its out-edge targets in proportion to edge weight; a
//! node with no out-edges gives its whole score to the uniform restart
//! distribution, so scores stay a probability distribution (a lone isolated
//! node scores 1.0 no matter the damping).

use rayon::prelude::*;
use std::str::FromStr;
use thiserror::Error;

use super::ImportGraph;

const DAMPING: f64 = 0.85;
const TOLERANCE: f64 = 1e-4;
const MAX_ITERATIONS: usize = 100;

#[derive(Error, Debug)]
pub enum MeasureError {
    #[error("unsupported centrality measure: {name}")]
    Unsupported { name: String },
}

/// A method of measuring node centrality. Exactly one is implemented;
/// adding another is a new variant plus a `compute` arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentralityMeasure {
    Pagerank,
}

impl FromStr for CentralityMeasure {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pagerank" => Ok(Self::Pagerank),
            other => Err(MeasureError::Unsupported {
                name: other.to_string(),
            }),
        }
    }
}

impl CentralityMeasure {
    /// Rank every node in the graph, most central first. Ties are broken
    /// lexicographically by label so the ordering is deterministic.
    pub fn compute(&self, graph: &ImportGraph) -> Vec<(String, f64)> {
        match self {
            Self::Pagerank => pagerank(graph, DAMPING, TOLERANCE),
        }
    }
}

fn pagerank(graph: &ImportGraph, damping: f64, tolerance: f64) -> Vec<(String, f64)> {
    let n = graph.len();
    if n == 0 {
        return Vec::new();
    }

    // Who points at each node, with weights, plus each node's total
    // outgoing weight for proportional redistribution.
    let mut incoming: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut out_weight: Vec<f64> = vec![0.0; n];
    for (src, dst, weight) in graph.edges() {
        incoming[dst].push((src, weight));
        out_weight[src] += weight;
    }

    let uniform = 1.0 / n as f64;
    let base = (1.0 - damping) * uniform;
    let mut scores = vec![uniform; n];

    for _ in 0..MAX_ITERATIONS {
        // Mass held by out-edge-free nodes restarts uniformly.
        let dangling: f64 = scores
            .iter()
            .zip(&out_weight)
            .filter(|(_, &ow)| ow == 0.0)
            .map(|(score, _)| score)
            .sum();
        let restart = base + damping * dangling * uniform;

        let next: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|node| {
                let mut score = restart;
                for &(src, weight) in &incoming[node] {
                    score += damping * scores[src] * weight / out_weight[src];
                }
                score
            })
            .collect();

        let diff: f64 = scores
            .par_iter()
            .zip(next.par_iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        scores = next;
        if diff < tolerance {
            break;
        }
    }

    let mut ranked: Vec<(String, f64)> = graph
        .labels()
        .map(str::to_owned)
        .zip(scores)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
