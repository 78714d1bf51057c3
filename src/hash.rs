//! Seeded key → equation mapping.
//!
//! Keys reach the solver already digested: either as a 192-bit signature
//! (`[u64; 3]`) or as a bit vector. The seed perturbs only this last step, so
//! a failed attempt can regenerate a different system without touching the
//! original keys.

use crate::util::BitVector;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Three independent-looking 64-bit hashes of a key under a seed.
pub trait ToTriple {
    fn hash_triple(&self, seed: u64) -> [u64; 3];
}

impl ToTriple for [u64; 3] {
    #[inline]
    fn hash_triple(&self, seed: u64) -> [u64; 3] {
        let mut bytes = [0u8; 24];
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(self) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        let s1 = seed ^ 0x9E37_79B9_7F4A_7C15;
        let s2 = seed.wrapping_mul(0xA24B_1F6F);
        let s3 = seed ^ 0x853C_49E6_0A6C_9D39;
        [
            xxh3_64_with_seed(&bytes, s1),
            xxh3_64_with_seed(&bytes, s2),
            xxh3_64_with_seed(&bytes, s3),
        ]
    }
}

/// 1× wyhash over the words + splitmix64 → three values.
impl ToTriple for BitVector {
    #[inline]
    fn hash_triple(&self, seed: u64) -> [u64; 3] {
        let mut bytes = Vec::with_capacity(self.words().len() * 8);
        for w in self.words() {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        // Length goes into the seed: trailing zero bits must change the hash.
        let base = wyhash::wyhash(&bytes, seed ^ (self.len() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        [
            splitmix64(base ^ 0x9E37_79B9_7F4A_7C15),
            splitmix64(base.wrapping_add(0xA24B_1F6F)),
            splitmix64(base ^ 0x853C_49E6_0A6C_9D39),
        ]
    }
}

impl ToTriple for [u8] {
    #[inline]
    fn hash_triple(&self, seed: u64) -> [u64; 3] {
        BitVector::from_bytes(self).hash_triple(seed)
    }
}

impl ToTriple for Vec<u8> {
    #[inline]
    fn hash_triple(&self, seed: u64) -> [u64; 3] {
        self.as_slice().hash_triple(seed)
    }
}

impl ToTriple for str {
    #[inline]
    fn hash_triple(&self, seed: u64) -> [u64; 3] {
        self.as_bytes().hash_triple(seed)
    }
}

impl ToTriple for String {
    #[inline]
    fn hash_triple(&self, seed: u64) -> [u64; 3] {
        self.as_str().hash_triple(seed)
    }
}

impl<T: ToTriple + ?Sized> ToTriple for &T {
    #[inline]
    fn hash_triple(&self, seed: u64) -> [u64; 3] {
        (**self).hash_triple(seed)
    }
}

/// Maps a key to the three variables of its equation.
///
/// Returns `None` when there are no variables; that is only meaningful for an
/// empty system.
#[inline]
pub fn to_equation<K: ToTriple + ?Sized>(key: &K, seed: u64, num_vars: u32) -> Option<[u32; 3]> {
    if num_vars == 0 {
        return None;
    }
    let m = num_vars as u64;
    let h = key.hash_triple(seed);
    Some([
        ((h[0] & 0x7FFF_FFFF_FFFF_FFFF) % m) as u32,
        ((h[1] & 0x7FFF_FFFF_FFFF_FFFF) % m) as u32,
        ((h[2] & 0x7FFF_FFFF_FFFF_FFFF) % m) as u32,
    ])
}

/// [`to_equation`] for a 192-bit signature.
#[inline]
pub fn triple_to_equation(triple: &[u64; 3], seed: u64, num_vars: u32) -> Option<[u32; 3]> {
    to_equation(triple, seed, num_vars)
}

/// [`to_equation`] for a bit vector.
#[inline]
pub fn bit_vector_to_equation(bv: &BitVector, seed: u64, num_vars: u32) -> Option<[u32; 3]> {
    to_equation(bv, seed, num_vars)
}

#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_variables_gives_no_equation() {
        assert_eq!(triple_to_equation(&[1, 2, 3], 42, 0), None);
        assert_eq!(to_equation("key", 42, 0), None);
    }

    #[test]
    fn deterministic_and_in_range() {
        for i in 0..1000u64 {
            let t = [i, i.wrapping_mul(31), !i];
            let a = triple_to_equation(&t, 7, 1001).unwrap();
            let b = triple_to_equation(&t, 7, 1001).unwrap();
            assert_eq!(a, b);
            assert!(a.iter().all(|&v| v < 1001));
        }
    }

    #[test]
    fn seed_changes_equation() {
        let t = [0xDEAD_BEEF, 0xCAFE_BABE, 0x1234_5678];
        let differing = (0..32u64)
            .filter(|&s| triple_to_equation(&t, s, 1 << 20) != triple_to_equation(&t, s + 1, 1 << 20))
            .count();
        assert!(differing > 28);
    }

    #[test]
    fn byte_keys_go_through_bit_vectors() {
        let bv = BitVector::from_bytes(b"hello");
        assert_eq!(
            bit_vector_to_equation(&bv, 3, 97),
            to_equation(b"hello".as_slice(), 3, 97)
        );
        assert_eq!(to_equation("hello", 3, 97), to_equation(&b"hello".to_vec(), 3, 97));
    }

    #[test]
    fn trailing_zero_bits_matter() {
        let mut short = BitVector::new(3);
        short.set(0, true);
        let mut long = BitVector::new(4);
        long.set(0, true);
        assert_eq!(short.words(), long.words());
        assert_ne!(short.hash_triple(0), long.hash_triple(0));
    }
}
