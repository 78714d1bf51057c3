//! Orientation of the residual 3-hypergraph: every edge picks one of its
//! vertices (its *hinge*) and no vertex is picked twice.

use crate::residual::ResidualSystem;

const NONE: u32 = u32::MAX;

/// Assigns a hinge to every residual edge.
///
/// Returns one local vertex per edge, or `None` if no injective assignment
/// exists.
pub trait Orienter {
    fn orient(&mut self, system: &ResidualSystem) -> Option<Vec<u32>>;
}

/// Exact orientation as a bipartite matching between edges and vertices.
///
/// Vertices of degree one are matched first, peeling-style (matching a leaf
/// with its only edge never makes a perfect matching impossible); the rest is
/// completed with augmenting paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingOrienter;

impl Orienter for MatchingOrienter {
    fn orient(&mut self, system: &ResidualSystem) -> Option<Vec<u32>> {
        let num_edges = system.num_edges();
        let num_vertices = system.num_vertices();
        if num_edges > num_vertices {
            tracing::debug!(
                edges = num_edges,
                vertices = num_vertices,
                "more edges than vertices"
            );
            return None;
        }

        let mut hinge = vec![NONE; num_edges];
        let mut owner = vec![NONE; num_vertices];

        // Distinct unoriented edges per vertex; occurrence lists are sorted.
        let mut degree: Vec<u32> = system
            .vertex_edges
            .iter()
            .map(|list| {
                let mut d = list.len() as u32;
                d -= list.windows(2).filter(|w| w[0] == w[1]).count() as u32;
                d
            })
            .collect();

        let mut visit: Vec<u32> = (0..num_vertices as u32)
            .filter(|&v| degree[v as usize] == 1)
            .collect();
        while let Some(v) = visit.pop() {
            if degree[v as usize] != 1 {
                continue;
            }
            let Some(&e) = system.vertex_edges[v as usize]
                .iter()
                .find(|&&e| hinge[e as usize] == NONE)
            else {
                continue;
            };
            hinge[e as usize] = v;
            owner[v as usize] = e;
            let triple = system.edges[e as usize];
            for (slot, &w) in triple.iter().enumerate() {
                // Count each distinct vertex once.
                if triple[..slot].contains(&w) {
                    continue;
                }
                degree[w as usize] -= 1;
                if degree[w as usize] == 1 {
                    visit.push(w);
                }
            }
        }

        let peeled = hinge.iter().filter(|&&h| h != NONE).count();
        tracing::debug!(peeled, edges = num_edges, "orienting residual hypergraph");

        let mut visited = vec![0u32; num_vertices];
        let mut stamp = 0u32;
        let mut path: Vec<(u32, usize)> = Vec::new();
        for e in 0..num_edges as u32 {
            if hinge[e as usize] != NONE {
                continue;
            }
            stamp += 1;
            if !augment(system, e, stamp, &mut visited, &mut path, &mut hinge, &mut owner) {
                tracing::debug!(edge = e, "no augmenting path");
                return None;
            }
        }
        Some(hinge)
    }
}

/// Depth-first search for an augmenting path from the unmatched edge `root`;
/// on success the path is flipped.
fn augment(
    system: &ResidualSystem,
    root: u32,
    stamp: u32,
    visited: &mut [u32],
    path: &mut Vec<(u32, usize)>,
    hinge: &mut [u32],
    owner: &mut [u32],
) -> bool {
    path.clear();
    path.push((root, 0));

    while let Some((e, slot)) = path.last_mut() {
        if *slot == 3 {
            path.pop();
            continue;
        }
        let w = system.edges[*e as usize][*slot];
        *slot += 1;
        if visited[w as usize] == stamp {
            continue;
        }
        visited[w as usize] = stamp;

        match owner[w as usize] {
            NONE => {
                // Each edge on the path takes the vertex through which the
                // next one was reached; the last takes `w`.
                let mut target = w;
                for &(f, _) in path.iter().rev() {
                    let prev = hinge[f as usize];
                    hinge[f as usize] = target;
                    owner[target as usize] = f;
                    target = prev;
                }
                return true;
            }
            f => path.push((f, 0)),
        }
    }
    false
}
