use crate::field::{Field, Gf2, Gf3, HingeSlots, Trit};
use crate::gauss::{LazyGaussian, ResidualSolver};
use crate::hash::ToTriple;
use crate::hypergraph::XorGraph;
use crate::orient::{MatchingOrienter, Orienter};
use crate::residual::ResidualSystem;
use std::marker::PhantomData;
use thiserror::Error;

/// Contract violations. Unsolvable or unorientable systems are not errors:
/// they are reported as `Ok(false)` and counted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("expected {expected} keys, the input provided only {found}")]
    TooFewKeys { expected: usize, found: usize },
    #[error("expected {expected} keys, the input provided more")]
    TooManyKeys { expected: usize },
    #[error("expected {expected} values (one per key), got {found}")]
    ValueCount { expected: usize, found: usize },
    #[error("residual collaborator returned {found} entries, expected {expected}")]
    SolutionLength { expected: usize, found: usize },
    #[error("hinge {hinge} of residual edge {edge} is not one of its vertices")]
    BadHinge { edge: usize, hinge: u32 },
}

/// Generates and solves a random 3-regular linear system on GF(2)
/// ([`Gf2`]: constants supplied by the caller) or GF(3) ([`Gf3`]: constants
/// obtained by orienting the hypergraph of the system).
///
/// An instance is sized once for a number of variables and of equations and
/// then reused: every call to `generate_and_solve` starts from a clean state,
/// so a caller retries with a new seed until an attempt succeeds. Only one
/// attempt may run at a time (`&mut self`).
///
/// The solution of the last successful attempt is available through
/// [`Linear3Solver::solution`]; after a failed attempt its content is
/// unspecified.
#[derive(Debug, Clone)]
pub struct Linear3Solver<F: Field> {
    graph: XorGraph,
    solution: Vec<F::Value>,
    peeled: usize,
    unsolvable: u32,
    unorientable: u32,
    _field: PhantomData<F>,
}

impl<F: Field> Linear3Solver<F> {
    /// # Panics
    ///
    /// If there are equations but no variables.
    pub fn new(num_variables: u32, num_equations: u32) -> Self {
        assert!(
            num_variables > 0 || num_equations == 0,
            "{num_equations} equations need at least one variable"
        );
        Self {
            graph: XorGraph::new(num_variables, num_equations),
            solution: vec![F::Value::default(); num_variables as usize],
            peeled: 0,
            unsolvable: 0,
            unorientable: 0,
            _field: PhantomData,
        }
    }

    /// Brings the instance back to its freshly constructed state. Idempotent.
    pub fn reset(&mut self) {
        self.graph.reset();
        self.solution.fill(F::Value::default());
        self.peeled = 0;
        self.unsolvable = 0;
        self.unorientable = 0;
    }

    #[inline]
    pub fn num_variables(&self) -> u32 {
        self.graph.num_vertices()
    }

    #[inline]
    pub fn num_equations(&self) -> u32 {
        self.graph.num_edges()
    }

    /// One value per variable.
    #[inline]
    pub fn solution(&self) -> &[F::Value] {
        &self.solution
    }

    /// 1 if the last attempt produced an unsolvable residual system.
    #[inline]
    pub fn unsolvable(&self) -> u32 {
        self.unsolvable
    }

    /// 1 if the last attempt produced an unorientable residual hypergraph.
    #[inline]
    pub fn unorientable(&self) -> u32 {
        self.unorientable
    }

    /// Equations removed by peeling in the last attempt; the others went to
    /// the residual solver.
    #[inline]
    pub fn peeled_edges(&self) -> usize {
        self.peeled
    }

    /// Re-arms the instance, builds the hypergraph and peels it. Returns the
    /// residual system, empty if peeling removed every edge.
    fn generate<K, I>(&mut self, keys: I, seed: u64) -> Result<ResidualSystem, SolverError>
    where
        K: ToTriple,
        I: IntoIterator<Item = K>,
    {
        self.reset();
        self.graph.build(keys, seed)?;
        let complete = self.graph.peel();
        self.peeled = self.graph.peeled_edges();
        Ok(if complete {
            ResidualSystem::default()
        } else {
            ResidualSystem::from_graph(&self.graph)
        })
    }
}

fn check_len(expected: usize, found: usize) -> Result<(), SolverError> {
    if expected != found {
        return Err(SolverError::SolutionLength { expected, found });
    }
    Ok(())
}

impl Linear3Solver<Gf2> {
    /// Solves `v0 ⊕ v1 ⊕ v2 = values[i]` for the equation of the `i`-th key,
    /// bitwise on 64-bit words.
    ///
    /// Returns `Ok(false)` if the system turned out unsolvable; try again
    /// with another seed.
    pub fn generate_and_solve<K, I>(
        &mut self,
        keys: I,
        seed: u64,
        values: &[u64],
    ) -> Result<bool, SolverError>
    where
        K: ToTriple,
        I: IntoIterator<Item = K>,
    {
        self.generate_and_solve_with(keys, seed, values, &mut LazyGaussian)
    }

    /// As [`generate_and_solve`](Self::generate_and_solve), with a custom
    /// solver for the residual system.
    pub fn generate_and_solve_with<K, I, S>(
        &mut self,
        keys: I,
        seed: u64,
        values: &[u64],
        solver: &mut S,
    ) -> Result<bool, SolverError>
    where
        K: ToTriple,
        I: IntoIterator<Item = K>,
        S: ResidualSolver<u64> + ?Sized,
    {
        let expected = self.num_equations() as usize;
        if values.len() != expected {
            return Err(SolverError::ValueCount {
                expected,
                found: values.len(),
            });
        }

        let core = self.generate(keys, seed)?;
        if !core.is_empty() {
            let c = core.gather(values);
            let variables: Vec<u32> = (0..core.num_vertices() as u32).collect();
            let Some(partial) = solver.solve(&core, &c, &variables) else {
                self.unsolvable += 1;
                tracing::debug!(core = core.num_edges(), "system is unsolvable");
                return Ok(false);
            };
            check_len(core.num_vertices(), partial.len())?;
            for (&v, x) in core.globals.iter().zip(partial) {
                self.solution[v as usize] = x;
            }
        }

        self.graph.assign::<Gf2, _>(&mut self.solution, values);
        Ok(true)
    }
}

impl Linear3Solver<Gf3> {
    /// Solves `v0 + v1 + v2 ≡ k (mod 3)` where `k` is the slot of the hinge
    /// of each equation in an orientation of the hypergraph.
    ///
    /// Exactly one variable per equation is assigned (its hinge, or the
    /// vertex it was peeled on); all the others stay `None` and read as zero.
    ///
    /// Returns `Ok(false)` if the hypergraph could not be oriented or the
    /// system turned out unsolvable; try again with another seed.
    pub fn generate_and_solve<K, I>(&mut self, keys: I, seed: u64) -> Result<bool, SolverError>
    where
        K: ToTriple,
        I: IntoIterator<Item = K>,
    {
        self.generate_and_solve_with(keys, seed, &mut MatchingOrienter, &mut LazyGaussian)
    }

    /// As [`generate_and_solve`](Self::generate_and_solve), with a custom
    /// orienter and residual solver.
    pub fn generate_and_solve_with<K, I, O, S>(
        &mut self,
        keys: I,
        seed: u64,
        orienter: &mut O,
        solver: &mut S,
    ) -> Result<bool, SolverError>
    where
        K: ToTriple,
        I: IntoIterator<Item = K>,
        O: Orienter + ?Sized,
        S: ResidualSolver<Trit> + ?Sized,
    {
        let core = self.generate(keys, seed)?;
        if !core.is_empty() {
            let Some(hinges) = orienter.orient(&core) else {
                self.unorientable += 1;
                tracing::debug!(core = core.num_edges(), "hypergraph cannot be oriented");
                return Ok(false);
            };
            let slots = core.hinge_slots(&hinges)?;
            // Non-hinge vertices stay unassigned: one assigned vertex per equation.
            let Some(partial) = solver.solve(&core, &slots, &hinges) else {
                self.unsolvable += 1;
                tracing::debug!(core = core.num_edges(), "system is unsolvable");
                return Ok(false);
            };
            check_len(core.num_vertices(), partial.len())?;

            for &h in &hinges {
                self.solution[core.globals[h as usize] as usize] = Some(partial[h as usize]);
            }
        }

        self.graph.assign::<Gf3, _>(&mut self.solution, &HingeSlots);
        Ok(true)
    }

    /// The solution with `0` for unassigned variables and `3` for an assigned
    /// zero (see [`Trit::encode`]).
    pub fn encoded_solution(&self) -> impl Iterator<Item = u8> + '_ {
        self.solution.iter().map(|&t| Trit::encode(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Keys that already are equations.
    #[derive(Clone, Copy)]
    struct Fixed([u32; 3]);

    impl ToTriple for Fixed {
        fn hash_triple(&self, _seed: u64) -> [u64; 3] {
            self.0.map(u64::from)
        }
    }

    fn keys(edges: &[[u32; 3]]) -> Vec<Fixed> {
        edges.iter().map(|&e| Fixed(e)).collect()
    }

    struct Refuse;

    impl ResidualSolver<u64> for Refuse {
        fn solve(&mut self, _: &ResidualSystem, _: &[u64], _: &[u32]) -> Option<Vec<u64>> {
            None
        }
    }

    struct ShortSolver;

    impl ResidualSolver<u64> for ShortSolver {
        fn solve(&mut self, _: &ResidualSystem, _: &[u64], _: &[u32]) -> Option<Vec<u64>> {
            Some(Vec::new())
        }
    }

    struct NoOrientation;

    impl Orienter for NoOrientation {
        fn orient(&mut self, _: &ResidualSystem) -> Option<Vec<u32>> {
            None
        }
    }

    #[test]
    fn empty_system() {
        let mut gf2 = Linear3Solver::<Gf2>::new(0, 0);
        assert_eq!(gf2.generate_and_solve(Vec::<[u64; 3]>::new(), 1, &[]), Ok(true));
        assert!(gf2.solution().is_empty());

        let mut gf3 = Linear3Solver::<Gf3>::new(0, 0);
        assert_eq!(gf3.generate_and_solve(Vec::<[u64; 3]>::new(), 1), Ok(true));
        assert_eq!(gf3.encoded_solution().count(), 0);
    }

    #[test]
    #[should_panic]
    fn equations_without_variables() {
        let _ = Linear3Solver::<Gf2>::new(0, 1);
    }

    #[test]
    fn value_count_is_checked_first() {
        let mut s = Linear3Solver::<Gf2>::new(4, 2);
        let err = s
            .generate_and_solve(keys(&[[0, 1, 2], [1, 2, 3]]), 0, &[1])
            .unwrap_err();
        assert_eq!(err, SolverError::ValueCount { expected: 2, found: 1 });
    }

    #[test]
    fn custom_solver_failure_counts_as_unsolvable() {
        let mut s = Linear3Solver::<Gf2>::new(3, 2);
        let ks = keys(&[[0, 1, 2], [0, 1, 2]]);
        assert_eq!(s.generate_and_solve_with(ks.clone(), 0, &[1, 1], &mut Refuse), Ok(false));
        assert_eq!(s.unsolvable(), 1);
        assert_eq!(
            s.generate_and_solve_with(ks, 0, &[1, 1], &mut ShortSolver),
            Err(SolverError::SolutionLength { expected: 3, found: 0 })
        );
    }

    #[test]
    fn custom_orienter_failure_counts_as_unorientable() {
        let mut s = Linear3Solver::<Gf3>::new(3, 2);
        let ks = keys(&[[0, 1, 2], [0, 1, 2]]);
        let r = s.generate_and_solve_with(ks, 0, &mut NoOrientation, &mut LazyGaussian);
        assert_eq!(r, Ok(false));
        assert_eq!((s.unorientable(), s.unsolvable()), (1, 0));
    }

    #[test]
    fn core_values_reach_the_solution() {
        // Edges 0 and 1 are a 2-core on {0, 1, 2}; edge 2 peels off through 3.
        let edges = [[0, 1, 2], [1, 2, 0], [2, 3, 1]];
        let values = [0b01u64, 0b01, 0b10];
        let mut s = Linear3Solver::<Gf2>::new(4, 3);
        assert_eq!(s.generate_and_solve(keys(&edges), 0, &values), Ok(true));
        assert_eq!(s.peeled_edges(), 1);
        let sol = s.solution();
        for (e, vs) in edges.iter().enumerate() {
            assert_eq!(sol[vs[0] as usize] ^ sol[vs[1] as usize] ^ sol[vs[2] as usize], values[e]);
        }
    }

    #[test]
    fn gf3_hinges_are_assigned() {
        // A 2-core of three edges on four vertices plus a pendant edge.
        let edges = [[0, 1, 2], [1, 2, 3], [2, 3, 0], [0, 4, 5]];
        let mut s = Linear3Solver::<Gf3>::new(6, 4);
        assert_eq!(s.generate_and_solve(keys(&edges), 0), Ok(true));
        assert_eq!(s.peeled_edges(), 1);
        let encoded: Vec<u8> = s.encoded_solution().collect();
        // The pendant edge was peeled on 4 or 5: that vertex is assigned.
        assert!(encoded[4] != 0 || encoded[5] != 0);
        assert!(encoded.iter().all(|&x| x <= 3));
        // Three hinges in the core, one peeled vertex.
        assert_eq!(encoded.iter().filter(|&&x| x != 0).count(), 4);
    }
}
