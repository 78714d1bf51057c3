//! The random 3-hypergraph of a linear system, its peeling and the
//! back-substitution along the peeling order.
//!
//! Edges are equations, vertices are variables. Instead of adjacency lists
//! every vertex keeps its degree and the XOR of the indices of its live
//! incident edges: peeling only looks at a vertex when its degree is one, and
//! then the XOR *is* the edge ("Cache-oblivious peeling of random
//! hypergraphs", Belazzougui, Boldi, Ottaviano, Venturini and Vigna, DCC
//! 2014).

use crate::field::{ConstantTerms, Field};
use crate::hash::{ToTriple, to_equation};
use crate::solver::SolverError;

const INITIAL_VISIT_CAPACITY: usize = 1024;

/// Buffers sized once for `(num_vertices, num_edges)` and reused by every
/// attempt.
#[derive(Debug, Clone)]
pub struct XorGraph {
    num_vertices: u32,
    num_edges: u32,
    /// Live degree of each vertex.
    degree: Vec<u32>,
    /// XOR of the indices of the live edges incident to each vertex.
    xor_edge: Vec<u32>,
    /// The three vertices of each edge, in slot order.
    edge2vertex: [Vec<u32>; 3],
    peeled: Vec<bool>,
    /// Vertices in peeling order; `stack[..top]` is live.
    stack: Vec<u32>,
    top: usize,
    /// Scratch list of vertices to visit.
    visit: Vec<u32>,
}

impl XorGraph {
    /// # Panics
    ///
    /// If there are edges but no vertices.
    pub fn new(num_vertices: u32, num_edges: u32) -> Self {
        assert!(
            num_vertices > 0 || num_edges == 0,
            "{num_edges} edges need at least one vertex"
        );
        let (n, m) = (num_vertices as usize, num_edges as usize);
        Self {
            num_vertices,
            num_edges,
            degree: vec![0; n],
            xor_edge: vec![0; n],
            edge2vertex: [vec![0; m], vec![0; m], vec![0; m]],
            peeled: vec![false; m],
            stack: vec![0; m],
            top: 0,
            visit: Vec::with_capacity(INITIAL_VISIT_CAPACITY),
        }
    }

    /// Returns the graph to its freshly constructed state.
    pub fn reset(&mut self) {
        self.degree.fill(0);
        self.xor_edge.fill(0);
        self.peeled.fill(false);
        self.top = 0;
        self.visit.clear();
    }

    #[inline]
    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    #[inline]
    pub fn num_edges(&self) -> u32 {
        self.num_edges
    }

    #[inline]
    pub fn degree(&self, v: usize) -> u32 {
        self.degree[v]
    }

    #[inline]
    pub fn is_peeled(&self, e: usize) -> bool {
        self.peeled[e]
    }

    #[inline]
    pub fn edge(&self, e: usize) -> [u32; 3] {
        [
            self.edge2vertex[0][e],
            self.edge2vertex[1][e],
            self.edge2vertex[2][e],
        ]
    }

    /// Number of edges peeled by the last [`XorGraph::peel`].
    #[inline]
    pub fn peeled_edges(&self) -> usize {
        self.top
    }

    /// Vertices in the order they were peeled.
    #[inline]
    pub fn peeling_order(&self) -> &[u32] {
        &self.stack[..self.top]
    }

    /// Generates one edge per key. The graph must have been [reset](XorGraph::reset).
    pub fn build<K, I>(&mut self, keys: I, seed: u64) -> Result<(), SolverError>
    where
        K: ToTriple,
        I: IntoIterator<Item = K>,
    {
        let expected = self.num_edges as usize;
        let mut keys = keys.into_iter();
        for e in 0..expected {
            let Some(key) = keys.next() else {
                return Err(SolverError::TooFewKeys { expected, found: e });
            };
            // `new` rules out edges without vertices.
            let Some(vs) = to_equation(&key, seed, self.num_vertices) else {
                unreachable!("edges require at least one vertex");
            };
            for (slot, &v) in vs.iter().enumerate() {
                self.edge2vertex[slot][e] = v;
                self.degree[v as usize] += 1;
                self.xor_edge[v as usize] ^= e as u32;
            }
        }
        if keys.next().is_some() {
            return Err(SolverError::TooManyKeys { expected });
        }
        Ok(())
    }

    /// Peels the graph, recording the peeling order.
    ///
    /// Returns true if every edge was peeled; otherwise the unpeeled edges
    /// form the 2-core.
    pub fn peel(&mut self) -> bool {
        tracing::debug!(
            vertices = self.num_vertices,
            edges = self.num_edges,
            "peeling hypergraph"
        );
        self.top = 0;
        for v in 0..self.num_vertices {
            if self.degree[v as usize] == 1 {
                self.peel_from(v);
            }
        }

        if self.top == self.num_edges as usize {
            tracing::debug!("peeling completed");
            return true;
        }
        tracing::debug!(
            peeled = self.top,
            edges = self.num_edges,
            "peeling left a non-empty core"
        );
        false
    }

    fn peel_from(&mut self, x: u32) {
        self.visit.clear();
        self.visit.push(x);

        while let Some(v) = self.visit.pop() {
            if self.degree[v as usize] != 1 {
                continue;
            }
            let e = self.xor_edge[v as usize] as usize;
            if self.peeled[e] {
                continue;
            }
            self.peeled[e] = true;
            self.stack[self.top] = v;
            self.top += 1;

            for slot in 0..3 {
                let w = self.edge2vertex[slot][e];
                // v keeps e in its accumulator: that is how back-substitution
                // finds the edge v was peeled on.
                if w != v {
                    self.xor_edge[w as usize] ^= e as u32;
                }
                let d = &mut self.degree[w as usize];
                *d -= 1;
                if *d == 1 {
                    self.visit.push(w);
                }
            }
        }
    }

    /// Edge on which a peeled vertex was peeled, and the slot of the vertex
    /// in that edge.
    #[inline]
    fn hinge_of(&self, v: u32) -> (usize, usize) {
        let e = self.xor_edge[v as usize] as usize;
        let slot = (0..3)
            .find(|&s| self.edge2vertex[s][e] == v)
            .unwrap_or(2);
        debug_assert_eq!(self.edge2vertex[slot][e], v, "{v} not in edge {e}");
        (e, slot)
    }

    /// Assigns every peeled vertex, in reverse peeling order, so that the
    /// equation of the edge it was peeled on holds.
    ///
    /// Values of the 2-core vertices must already be in `solution`.
    /// Consumes the peeling stack.
    pub fn assign<F, C>(&mut self, solution: &mut [F::Value], constants: &C)
    where
        F: Field,
        C: ConstantTerms<F> + ?Sized,
    {
        while self.top > 0 {
            self.top -= 1;
            let v = self.stack[self.top];
            let (e, slot) = self.hinge_of(v);
            let vs = self.edge(e);

            let others = F::add(
                solution[vs[(slot + 1) % 3] as usize],
                solution[vs[(slot + 2) % 3] as usize],
            );
            let c = constants.constant(e, slot);
            solution[v as usize] = F::sub(c, others);

            debug_assert!(
                F::satisfies(c, vs.map(|x| solution[x as usize])),
                "equation {e} <{},{},{}> does not hold",
                vs[0],
                vs[1],
                vs[2]
            );
        }
    }
}
