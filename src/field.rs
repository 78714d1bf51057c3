//! Field algebra shared by peeling back-substitution.
//!
//! The peeling and back-substitution skeleton is the same on GF(2) and GF(3);
//! it only needs to add and subtract solution values and to know the
//! constant term of an equation. [`Field`] provides the former, a
//! [`ConstantTerms`] provider the latter.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Arithmetic on solution values.
pub trait Field {
    /// Value stored per variable in the solution vector.
    type Value: Copy + Default + PartialEq + std::fmt::Debug;

    fn add(a: Self::Value, b: Self::Value) -> Self::Value;
    fn sub(a: Self::Value, b: Self::Value) -> Self::Value;
    fn is_zero(a: Self::Value) -> bool;

    /// Whether `values` (in slot order) satisfy an equation with constant `c`.
    #[inline]
    fn satisfies(c: Self::Value, values: [Self::Value; 3]) -> bool {
        Self::is_zero(Self::sub(Self::add(Self::add(values[0], values[1]), values[2]), c))
    }
}

/// Constant term of edge `edge` as seen from the vertex sitting in `slot`.
pub trait ConstantTerms<F: Field> {
    fn constant(&self, edge: usize, slot: usize) -> F::Value;
}

/// GF(2), 64 independent bit planes per word.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gf2;

impl Field for Gf2 {
    type Value = u64;

    #[inline]
    fn add(a: u64, b: u64) -> u64 {
        a ^ b
    }
    #[inline]
    fn sub(a: u64, b: u64) -> u64 {
        a ^ b
    }
    #[inline]
    fn is_zero(a: u64) -> bool {
        a == 0
    }
}

/// Caller-supplied values, one per edge.
impl ConstantTerms<Gf2> for [u64] {
    #[inline]
    fn constant(&self, edge: usize, _slot: usize) -> u64 {
        self[edge]
    }
}

/// An element of GF(3).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Trit {
    #[default]
    Zero = 0,
    One = 1,
    Two = 2,
}

impl Trit {
    /// Reduces `x` modulo 3.
    #[inline]
    pub fn new(x: u32) -> Self {
        match x % 3 {
            0 => Trit::Zero,
            1 => Trit::One,
            _ => Trit::Two,
        }
    }

    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Multiplicative inverse; 1 and 2 are their own inverses.
    ///
    /// # Panics
    ///
    /// On `Zero`.
    #[inline]
    pub fn inv(self) -> Trit {
        assert!(self != Trit::Zero, "zero has no inverse in GF(3)");
        self
    }

    /// Encoding of a solution cell in which 0 is reserved for "unassigned":
    /// `None → 0`, `One → 1`, `Two → 2`, `Zero → 3`.
    #[inline]
    pub fn encode(cell: Option<Trit>) -> u8 {
        match cell {
            None => 0,
            Some(Trit::Zero) => 3,
            Some(t) => t.value(),
        }
    }

    /// Inverse of [`Trit::encode`]; values above 3 are rejected.
    #[inline]
    pub fn decode(x: u8) -> Option<Option<Trit>> {
        match x {
            0 => Some(None),
            1 => Some(Some(Trit::One)),
            2 => Some(Some(Trit::Two)),
            3 => Some(Some(Trit::Zero)),
            _ => None,
        }
    }
}

impl std::ops::Add for Trit {
    type Output = Trit;
    #[inline]
    fn add(self, other: Trit) -> Trit {
        Trit::new(self as u32 + other as u32)
    }
}

impl std::ops::Sub for Trit {
    type Output = Trit;
    #[inline]
    fn sub(self, other: Trit) -> Trit {
        Trit::new(self as u32 + 3 - other as u32)
    }
}

impl std::ops::Mul for Trit {
    type Output = Trit;
    #[inline]
    fn mul(self, other: Trit) -> Trit {
        Trit::new(self as u32 * other as u32)
    }
}

impl std::ops::Neg for Trit {
    type Output = Trit;
    #[inline]
    fn neg(self) -> Trit {
        Trit::Zero - self
    }
}

/// GF(3) with an explicit unassigned state.
///
/// `None` reads as zero in arithmetic; results are always `Some`, so every
/// vertex that receives a value through back-substitution is assigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gf3;

impl Field for Gf3 {
    type Value = Option<Trit>;

    #[inline]
    fn add(a: Option<Trit>, b: Option<Trit>) -> Option<Trit> {
        Some(a.unwrap_or_default() + b.unwrap_or_default())
    }
    #[inline]
    fn sub(a: Option<Trit>, b: Option<Trit>) -> Option<Trit> {
        Some(a.unwrap_or_default() - b.unwrap_or_default())
    }
    #[inline]
    fn is_zero(a: Option<Trit>) -> bool {
        a.unwrap_or_default() == Trit::Zero
    }
}

/// The constant of an oriented equation is the slot of its hinge; a peeled
/// vertex is the hinge of the edge it was peeled on.
#[derive(Debug, Clone, Copy, Default)]
pub struct HingeSlots;

impl ConstantTerms<Gf3> for HingeSlots {
    #[inline]
    fn constant(&self, _edge: usize, slot: usize) -> Option<Trit> {
        Some(Trit::new(slot as u32))
    }
}
