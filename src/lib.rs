//! linear3: random 3-regular linear systems on GF(2) and GF(3), solved by
//! hypergraph peeling.
//!
//! - Each key hashes to an equation on three of `n` variables.
//! - Peeling removes most equations in linear time; the 2-core that is left
//!   goes to lazy Gaussian elimination.
//! - GF(2): `v0 ⊕ v1 ⊕ v2 = value` on 64-bit words (retrieval structures).
//! - GF(3): constants come from orienting the hypergraph (MPHF-style).
//! - A failed attempt is reported, not raised: retry with another seed, or
//!   let [`Builder`] do it.

mod builder;
mod field;
mod gauss;
mod hash;
mod hypergraph;
mod orient;
mod residual;
mod solver;
mod util;

pub use builder::{BuildConfig, BuildError, Builder, Solved};
pub use field::{ConstantTerms, Field, Gf2, Gf3, HingeSlots, Trit};
pub use gauss::{LazyGaussian, ResidualSolver};
pub use hash::{ToTriple, bit_vector_to_equation, to_equation, triple_to_equation};
pub use hypergraph::XorGraph;
pub use orient::{MatchingOrienter, Orienter};
pub use residual::ResidualSystem;
pub use solver::{Linear3Solver, SolverError};
pub use util::BitVector;
