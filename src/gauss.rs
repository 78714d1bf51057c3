//! Lazy Gaussian elimination on the residual system.
//!
//! Follows Genuzio, Ottaviano and Vigna, "Fast scalable construction of
//! (minimal perfect hash) functions", SEA 2016: variables start *idle*; an
//! equation with a single idle variable is solved for it and the variable is
//! eliminated everywhere else; when no such equation exists the heaviest
//! idle variable is made *active*. Equations left with active variables only
//! form a small dense system, solved by ordinary elimination. Solved
//! variables are then recovered from their pivot equations.

use crate::field::Trit;
use crate::residual::ResidualSystem;

/// Solver for the residual system left by peeling.
///
/// `constants` holds one constant term per residual edge. Only the local
/// vertices listed in `variables` are unknowns; every other vertex is fixed
/// at zero and its occurrences are dropped from the equations. The result
/// holds one value per residual (local) vertex, zero outside `variables`, or
/// `None` if the system has no solution.
pub trait ResidualSolver<C> {
    fn solve(
        &mut self,
        system: &ResidualSystem,
        constants: &[C],
        variables: &[u32],
    ) -> Option<Vec<C>>;
}

/// Lazy Gaussian elimination over GF(2) (64 systems at once, one per bit of
/// a `u64`) and over GF(3).
///
/// Rows are dense over the residual vertices from the start (one bit per
/// vertex on GF(2), one byte on GF(3)), so memory is quadratic in the size of
/// the 2-core: meant for chunks of keys, not for whole key sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LazyGaussian;

impl ResidualSolver<u64> for LazyGaussian {
    fn solve(
        &mut self,
        system: &ResidualSystem,
        constants: &[u64],
        variables: &[u32],
    ) -> Option<Vec<u64>> {
        lazy_gaussian_elimination::<Mod2Row>(system, constants, variables)
    }
}

impl ResidualSolver<Trit> for LazyGaussian {
    fn solve(
        &mut self,
        system: &ResidualSystem,
        constants: &[Trit],
        variables: &[u32],
    ) -> Option<Vec<Trit>> {
        lazy_gaussian_elimination::<Mod3Row>(system, constants, variables)
    }
}

/// A dense equation over all residual variables.
trait Row: Clone {
    type Value: Copy + Default;

    fn new(num_vars: usize, c: Self::Value) -> Self;
    /// Adds one occurrence of `var` (coefficients accumulate).
    fn add_var(&mut self, var: usize);
    fn has_var(&self, var: usize) -> bool;
    /// Smallest variable with a non-zero coefficient satisfying `pred`.
    fn find_var(&self, pred: impl FnMut(usize) -> bool) -> Option<usize>;
    fn num_vars(&self) -> usize;
    /// 0 = c with c ≠ 0.
    fn is_inconsistent(&self) -> bool;
    /// Subtracts the multiple of `pivot` that clears `var`.
    fn eliminate(&mut self, pivot: &Self, var: usize);
    /// Value of `var` satisfying the equation given the other values.
    fn solve_for(&self, var: usize, solution: &[Self::Value]) -> Self::Value;

    #[inline]
    fn first_var(&self) -> Option<usize> {
        self.find_var(|_| true)
    }
}

#[derive(Clone, Debug)]
struct Mod2Row {
    bits: Vec<u64>,
    c: u64,
}

impl Row for Mod2Row {
    type Value = u64;

    fn new(num_vars: usize, c: u64) -> Self {
        Self {
            bits: vec![0; num_vars.div_ceil(64)],
            c,
        }
    }

    #[inline]
    fn add_var(&mut self, var: usize) {
        self.bits[var / 64] ^= 1 << (var % 64);
    }

    #[inline]
    fn has_var(&self, var: usize) -> bool {
        (self.bits[var / 64] >> (var % 64)) & 1 != 0
    }

    fn find_var(&self, mut pred: impl FnMut(usize) -> bool) -> Option<usize> {
        for (i, &word) in self.bits.iter().enumerate() {
            let mut w = word;
            while w != 0 {
                let v = i * 64 + w.trailing_zeros() as usize;
                if pred(v) {
                    return Some(v);
                }
                w &= w - 1;
            }
        }
        None
    }

    fn num_vars(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn is_inconsistent(&self) -> bool {
        self.c != 0 && self.bits.iter().all(|&w| w == 0)
    }

    fn eliminate(&mut self, pivot: &Self, var: usize) {
        if !self.has_var(var) {
            return;
        }
        for (x, y) in self.bits.iter_mut().zip(&pivot.bits) {
            *x ^= y;
        }
        self.c ^= pivot.c;
    }

    fn solve_for(&self, var: usize, solution: &[u64]) -> u64 {
        let mut s = self.c;
        for (i, &word) in self.bits.iter().enumerate() {
            let mut w = word;
            while w != 0 {
                let u = i * 64 + w.trailing_zeros() as usize;
                if u != var {
                    s ^= solution[u];
                }
                w &= w - 1;
            }
        }
        s
    }
}

#[derive(Clone, Debug)]
struct Mod3Row {
    coeffs: Vec<Trit>,
    c: Trit,
}

impl Row for Mod3Row {
    type Value = Trit;

    fn new(num_vars: usize, c: Trit) -> Self {
        Self {
            coeffs: vec![Trit::Zero; num_vars],
            c,
        }
    }

    #[inline]
    fn add_var(&mut self, var: usize) {
        self.coeffs[var] = self.coeffs[var] + Trit::One;
    }

    #[inline]
    fn has_var(&self, var: usize) -> bool {
        self.coeffs[var] != Trit::Zero
    }

    fn find_var(&self, mut pred: impl FnMut(usize) -> bool) -> Option<usize> {
        (0..self.coeffs.len()).find(|&v| self.coeffs[v] != Trit::Zero && pred(v))
    }

    fn num_vars(&self) -> usize {
        self.coeffs.iter().filter(|&&t| t != Trit::Zero).count()
    }

    fn is_inconsistent(&self) -> bool {
        self.c != Trit::Zero && self.coeffs.iter().all(|&t| t == Trit::Zero)
    }

    fn eliminate(&mut self, pivot: &Self, var: usize) {
        if !self.has_var(var) {
            return;
        }
        let f = self.coeffs[var] * pivot.coeffs[var].inv();
        for (x, &y) in self.coeffs.iter_mut().zip(&pivot.coeffs) {
            *x = *x - f * y;
        }
        self.c = self.c - f * pivot.c;
    }

    fn solve_for(&self, var: usize, solution: &[Trit]) -> Trit {
        let s = self
            .coeffs
            .iter()
            .zip(solution)
            .enumerate()
            .filter(|&(u, _)| u != var)
            .fold(self.c, |acc, (_, (&a, &x))| acc - a * x);
        s * self.coeffs[var].inv()
    }
}

/// `(&mut v[target], &v[source])` for distinct indices.
fn pair_mut<T>(v: &mut [T], target: usize, source: usize) -> (&mut T, &T) {
    debug_assert_ne!(target, source);
    if target < source {
        let (lo, hi) = v.split_at_mut(source);
        (&mut lo[target], &hi[0])
    } else {
        let (lo, hi) = v.split_at_mut(target);
        (&mut hi[0], &lo[source])
    }
}

fn lazy_gaussian_elimination<R: Row>(
    system: &ResidualSystem,
    constants: &[R::Value],
    variables: &[u32],
) -> Option<Vec<R::Value>> {
    assert_eq!(
        constants.len(),
        system.num_edges(),
        "one constant per residual equation"
    );
    let num_vars = system.num_vertices();
    let num_equations = system.num_edges();

    let mut unknown = vec![false; num_vars];
    for &v in variables {
        unknown[v as usize] = true;
    }

    let mut equations: Vec<R> = system
        .edges
        .iter()
        .zip(constants)
        .map(|(triple, &c)| {
            let mut eq = R::new(num_vars, c);
            for &v in triple.iter().filter(|&&v| unknown[v as usize]) {
                eq.add_var(v as usize);
            }
            eq
        })
        .collect();

    // Occurrence lists, without the equations in which a repeated variable
    // cancelled out. Fixed vertices occur nowhere.
    let var_to_eqs: Vec<Vec<usize>> = system
        .vertex_edges
        .iter()
        .enumerate()
        .map(|(v, list)| {
            let mut eqs: Vec<usize> = list.iter().map(|&j| j as usize).collect();
            eqs.dedup();
            eqs.retain(|&j| equations[j].has_var(v));
            eqs
        })
        .collect();

    let mut weight: Vec<usize> = var_to_eqs.iter().map(Vec::len).collect();
    let mut priority: Vec<usize> = equations.iter().map(R::num_vars).collect();
    let mut idle = vec![true; num_vars];

    // Lightest first: activation pops from the end.
    let mut by_weight: Vec<usize> = (0..num_vars).collect();
    by_weight.sort_by_key(|&v| weight[v]);

    let mut ready: Vec<usize> = (0..num_equations).rev().filter(|&j| priority[j] <= 1).collect();
    let mut dense: Vec<usize> = Vec::new();
    let mut pivots: Vec<(usize, usize)> = Vec::new();

    let mut remaining = num_equations;
    while remaining != 0 {
        let Some(first) = ready.pop() else {
            // No equation with a single idle variable: activate the heaviest one.
            let var = loop {
                let v = by_weight.pop()?;
                if weight[v] != 0 && idle[v] {
                    break v;
                }
            };
            idle[var] = false;
            for &j in &var_to_eqs[var] {
                priority[j] -= 1;
                if priority[j] == 1 {
                    ready.push(j);
                }
            }
            continue;
        };
        remaining -= 1;

        if priority[first] == 0 {
            if equations[first].is_inconsistent() {
                return None;
            }
            if equations[first].first_var().is_some() {
                dense.push(first);
            }
            continue;
        }

        let Some(pivot) = equations[first].find_var(|v| idle[v]) else {
            unreachable!("equation {first} has priority 1 but no idle variable");
        };
        pivots.push((first, pivot));
        idle[pivot] = false;
        weight[pivot] = 0;
        for &j in &var_to_eqs[pivot] {
            if j == first {
                continue;
            }
            priority[j] -= 1;
            if priority[j] == 1 {
                ready.push(j);
            }
            let (eq, pivot_eq) = pair_mut(&mut equations, j, first);
            eq.eliminate(pivot_eq, pivot);
        }
    }

    tracing::debug!(
        equations = num_equations,
        dense = dense.len(),
        solved = pivots.len(),
        "lazy Gaussian elimination"
    );

    let mut solution = dense_elimination(&mut equations, &dense, num_vars)?;

    for &(eq, pivot) in &pivots {
        solution[pivot] = equations[eq].solve_for(pivot, &solution);
    }
    Some(solution)
}

/// Plain elimination on the rows listed in `rows`; free variables get the
/// default value.
fn dense_elimination<R: Row>(
    equations: &mut [R],
    rows: &[usize],
    num_vars: usize,
) -> Option<Vec<R::Value>> {
    // basis[v]: the row whose leading variable is v.
    let mut basis: Vec<Option<usize>> = vec![None; num_vars];
    for &r in rows {
        loop {
            match equations[r].first_var() {
                None if equations[r].is_inconsistent() => return None,
                None => break,
                Some(v) => match basis[v] {
                    Some(b) => {
                        let (eq, pivot_eq) = pair_mut(equations, r, b);
                        eq.eliminate(pivot_eq, v);
                    }
                    None => {
                        basis[v] = Some(r);
                        break;
                    }
                },
            }
        }
    }

    // Every other variable of a basis row is larger than its leading one.
    let mut solution = vec![R::Value::default(); num_vars];
    for v in (0..num_vars).rev() {
        if let Some(r) = basis[v] {
            solution[v] = equations[r].solve_for(v, &solution);
        }
    }
    Some(solution)
}
