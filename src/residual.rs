//! The 2-core left by peeling, as an explicit sparse system.
//!
//! This is the only place where real adjacency lists exist: elimination and
//! orientation need to enumerate the neighbours of a vertex, which the XOR
//! accumulators cannot provide.

use crate::field::Trit;
use crate::hypergraph::XorGraph;
use crate::solver::SolverError;

/// Unpeeled edges renumbered from zero, over the vertices they touch, also
/// renumbered from zero ("local" indices).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidualSystem {
    /// Local vertex triple of each residual edge, in slot order.
    pub edges: Vec<[u32; 3]>,
    /// For each local vertex, the residual edges incident to it, once per
    /// occurrence (an edge listing a vertex twice appears twice).
    pub vertex_edges: Vec<Vec<u32>>,
    /// Local → global vertex index.
    pub globals: Vec<u32>,
    /// Residual edge → original edge index.
    pub origin: Vec<u32>,
}

impl ResidualSystem {
    /// Compacts the unpeeled edges of `graph`; edges keep their relative
    /// order, vertices are numbered by first appearance.
    pub fn from_graph(graph: &XorGraph) -> Self {
        let num_edges = graph.num_edges() as usize;
        let core_edges = num_edges - graph.peeled_edges();
        let mut local = vec![u32::MAX; graph.num_vertices() as usize];
        let mut sys = ResidualSystem {
            edges: Vec::with_capacity(core_edges),
            vertex_edges: Vec::new(),
            globals: Vec::new(),
            origin: Vec::with_capacity(core_edges),
        };

        for e in (0..num_edges).filter(|&e| !graph.is_peeled(e)) {
            let j = sys.edges.len() as u32;
            let mut triple = [0u32; 3];
            for (slot, &v) in graph.edge(e).iter().enumerate() {
                let l = &mut local[v as usize];
                if *l == u32::MAX {
                    *l = sys.globals.len() as u32;
                    sys.globals.push(v);
                    // The core degree is exact once peeling has stopped.
                    sys.vertex_edges
                        .push(Vec::with_capacity(graph.degree(v as usize) as usize));
                }
                triple[slot] = *l;
                sys.vertex_edges[*l as usize].push(j);
            }
            sys.edges.push(triple);
            sys.origin.push(e as u32);
        }
        sys
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.globals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Per-edge values aligned with the residual edges.
    pub fn gather<T: Copy>(&self, values: &[T]) -> Vec<T> {
        self.origin.iter().map(|&e| values[e as usize]).collect()
    }

    /// Turns one hinge (local vertex) per edge into the slot it occupies in
    /// its edge: the constant term of the oriented system.
    pub fn hinge_slots(&self, hinges: &[u32]) -> Result<Vec<Trit>, SolverError> {
        if hinges.len() != self.edges.len() {
            return Err(SolverError::SolutionLength {
                expected: self.edges.len(),
                found: hinges.len(),
            });
        }
        self.edges
            .iter()
            .zip(hinges)
            .enumerate()
            .map(|(j, (triple, &h))| {
                triple
                    .iter()
                    .position(|&v| v == h)
                    .map(|k| Trit::new(k as u32))
                    .ok_or(SolverError::BadHinge { edge: j, hinge: h })
            })
            .collect()
    }
}
