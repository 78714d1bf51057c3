use crate::field::{Field, Gf2, Gf3};
use crate::hash::ToTriple;
use crate::solver::{Linear3Solver, SolverError};
use ahash::RandomState;
use hashbrown::HashSet;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use thiserror::Error;

/// Retry parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Seeds the generator of per-attempt seeds.
    pub seed: u64,
    /// How many seeds to try before giving up.
    pub max_attempts: u32,
    /// Reject duplicate keys before the first attempt. Duplicates produce
    /// identical equations, so with distinct values no seed can succeed.
    pub check_duplicates: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            seed: 0xC0FF_EE00_D15E_A5E,
            max_attempts: 64,
            check_duplicates: true,
        }
    }
}

/// Outcome of a successful retry loop. Counters are totals over the failed
/// attempts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solved {
    /// Seed of the attempt that succeeded.
    pub seed: u64,
    pub attempts: u32,
    pub unsolvable: u32,
    pub unorientable: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("duplicate key detected before solving")]
    DuplicateKey,
    #[error(
        "no solution after {attempts} attempts ({unsolvable} unsolvable, {unorientable} unorientable)"
    )]
    Exhausted {
        attempts: u32,
        unsolvable: u32,
        unorientable: u32,
    },
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Drives a [`Linear3Solver`] through seeds until an attempt succeeds.
///
/// The solver instance is reused across attempts; on success its
/// [`solution`](Linear3Solver::solution) belongs to the returned seed.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    cfg: BuildConfig,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            cfg: BuildConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: BuildConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Solves the GF(2) system of `keys` with one value per key.
    pub fn solve_gf2<K>(
        &self,
        solver: &mut Linear3Solver<Gf2>,
        keys: &[K],
        values: &[u64],
    ) -> Result<Solved, BuildError>
    where
        K: ToTriple + Hash + Eq,
    {
        self.retry(solver, keys, |s, seed| {
            s.generate_and_solve(keys, seed, values)
        })
    }

    /// Solves the oriented GF(3) system of `keys`.
    pub fn solve_gf3<K>(
        &self,
        solver: &mut Linear3Solver<Gf3>,
        keys: &[K],
    ) -> Result<Solved, BuildError>
    where
        K: ToTriple + Hash + Eq,
    {
        self.retry(solver, keys, |s, seed| s.generate_and_solve(keys, seed))
    }

    fn retry<F, K, A>(
        &self,
        solver: &mut Linear3Solver<F>,
        keys: &[K],
        mut attempt: A,
    ) -> Result<Solved, BuildError>
    where
        F: Field,
        K: Hash + Eq,
        A: FnMut(&mut Linear3Solver<F>, u64) -> Result<bool, SolverError>,
    {
        if self.cfg.check_duplicates {
            check_unique(keys)?;
        }

        let mut rng = StdRng::seed_from_u64(self.cfg.seed);
        let mut unsolvable = 0;
        let mut unorientable = 0;
        for round in 1..=self.cfg.max_attempts {
            let seed = rng.next_u64();
            if attempt(solver, seed)? {
                tracing::info!(
                    attempts = round,
                    seed,
                    peeled = solver.peeled_edges(),
                    equations = solver.num_equations(),
                    "system solved"
                );
                return Ok(Solved {
                    seed,
                    attempts: round,
                    unsolvable,
                    unorientable,
                });
            }
            unsolvable += solver.unsolvable();
            unorientable += solver.unorientable();
            tracing::debug!(attempt = round, seed, "attempt failed, trying another seed");
        }

        Err(BuildError::Exhausted {
            attempts: self.cfg.max_attempts,
            unsolvable,
            unorientable,
        })
    }
}

/// Exact uniqueness check, no probabilistic filtering.
fn check_unique<K: Hash + Eq>(keys: &[K]) -> Result<(), BuildError> {
    let mut seen: HashSet<&K, RandomState> =
        HashSet::with_capacity_and_hasher(keys.len(), RandomState::new());
    for k in keys {
        if !seen.insert(k) {
            return Err(BuildError::DuplicateKey);
        }
    }
    Ok(())
}
