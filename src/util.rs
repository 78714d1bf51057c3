/// Owned bit vector: the generic pre-hashed key representation.
///
/// Bits are packed little-endian into `u64` words; bits past `len` in the
/// last word are always zero, so two vectors with the same bits hash alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitVector {
    bits: Vec<u64>,
    len: usize,
}

impl BitVector {
    /// All-zero vector of `len` bits.
    pub fn new(len: usize) -> Self {
        let words = len.div_ceil(64);
        Self {
            bits: vec![0; words],
            len,
        }
    }

    /// Bit vector holding the bytes of `bytes`, 8 bits per byte, LSB first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut bits = vec![0u64; bytes.len().div_ceil(8)];
        for (i, chunk) in bytes.chunks(8).enumerate() {
            let mut w = [0u8; 8];
            w[..chunk.len()].copy_from_slice(chunk);
            bits[i] = u64::from_le_bytes(w);
        }
        Self {
            bits,
            len: bytes.len() * 8,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        assert!(idx < self.len, "bit index {idx} out of range ({})", self.len);
        let (w, b) = (idx / 64, idx % 64);
        (self.bits[w] >> b) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, idx: usize, value: bool) {
        assert!(idx < self.len, "bit index {idx} out of range ({})", self.len);
        let (w, b) = (idx / 64, idx % 64);
        if value {
            self.bits[w] |= 1u64 << b;
        } else {
            self.bits[w] &= !(1u64 << b);
        }
    }

    pub fn push(&mut self, value: bool) {
        if self.len % 64 == 0 {
            self.bits.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, value);
    }

    /// Backing words; unused high bits of the last word are zero.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.bits
    }
}

impl From<&[u8]> for BitVector {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}
