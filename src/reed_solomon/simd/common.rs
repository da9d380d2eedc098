//! Common SIMD utilities shared across all implementations
//!
//! Provides the nibble tables used by every shuffle-based kernel and the scalar
//! kernels that handle remainder bytes and CPUs without vector support.

/// Nibble lookup tables for one GF(256) coefficient
///
/// For coefficient `c`:
/// - `lo[n] = n * c` (low nibble contribution)
/// - `hi[n] = (n << 4) * c` (high nibble contribution)
///
/// so `x * c = lo[x & 0x0F] ^ hi[x >> 4]`. Each table is exactly one 128-bit
/// register, which is what PSHUFB and NEON `vqtbl1q_u8` index into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct NibbleTables {
    pub lo: [u8; 16],
    pub hi: [u8; 16],
}

/// Build nibble lookup tables from a 256-entry product row (`row[x] = x * c`)
///
/// # Example
/// ```rust
/// # use cauchy256::reed_solomon::galois::Gf256;
/// # use cauchy256::reed_solomon::simd::common::build_nibble_tables;
/// let field = Gf256::new().unwrap();
/// let tables = build_nibble_tables(field.mul_row(0x53));
/// assert_eq!(tables.lo[0x7] ^ tables.hi[0xA], field.mul(0xA7, 0x53));
/// ```
pub fn build_nibble_tables(row: &[u8; 256]) -> NibbleTables {
    let mut tables = NibbleTables::default();

    for nib in 0..16 {
        tables.lo[nib] = row[nib];
        tables.hi[nib] = row[nib << 4];
    }

    tables
}

/// Specifies how to combine the multiplication result with the output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Direct write: output = coefficient * input (replaces contents)
    Direct,
    /// Accumulate: output = output XOR (coefficient * input)
    Add,
}

/// Scalar GF(256) multiply using a full product row
///
/// The simple loop lets the compiler unroll for the target CPU.
///
/// # Safety
/// - `src` must be valid for `len` reads and `dst` for `len` reads and writes
/// - `dst` and `src` may be the same pointer (in-place multiply) but must not
///   otherwise overlap
#[inline]
pub unsafe fn multiply_scalar(
    dst: *mut u8,
    src: *const u8,
    len: usize,
    row: &[u8; 256],
    op: WriteOp,
) {
    for idx in 0..len {
        let product = row[*src.add(idx) as usize];
        let out = dst.add(idx);
        match op {
            WriteOp::Direct => *out = product,
            WriteOp::Add => *out ^= product,
        }
    }
}

/// `dst ^= src`, eight bytes at a time
///
/// Processes `min(dst.len(), src.len())` bytes. Field addition needs no tables,
/// so this path is used for unit coefficients.
pub fn xor_slice(dst: &mut [u8], src: &[u8]) {
    let len = dst.len().min(src.len());
    let (dst, src) = (&mut dst[..len], &src[..len]);

    let mut dst_words = dst.chunks_exact_mut(8);
    let mut src_words = src.chunks_exact(8);

    for (d, s) in (&mut dst_words).zip(&mut src_words) {
        let word =
            bytemuck::pod_read_unaligned::<u64>(d) ^ bytemuck::pod_read_unaligned::<u64>(s);
        d.copy_from_slice(bytemuck::bytes_of(&word));
    }

    for (d, s) in dst_words
        .into_remainder()
        .iter_mut()
        .zip(src_words.remainder())
    {
        *d ^= s;
    }
}
