//! SIMD-optimized GF(256) multiplication for erasure coding
//!
//! Provides platform-specific kernels selected at runtime:
//! - x86_64: AVX2 (32-byte `vpshufb`) → SSSE3 (16-byte `pshufb`) → scalar
//! - aarch64: NEON (`vqtbl1q_u8`) → scalar
//! - other: scalar
//!
//! Detection happens once, when the field context is built. Kernels only cover
//! whole registers; the scalar kernel finishes the remaining bytes.
//!
//! # Note
//! This module is public for benchmarks and tests but not part of the stable API.
//! Use the bulk methods on [`Gf256`](super::galois::Gf256) instead.

pub mod common;

#[cfg(target_arch = "aarch64")]
pub mod neon;
#[cfg(target_arch = "x86_64")]
pub mod pshufb;

pub use common::{build_nibble_tables, xor_slice, NibbleTables, WriteOp};

/// SIMD implementation to use for the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimdLevel {
    /// No vector kernel, table-driven scalar loop
    Scalar,
    /// x86_64 SSSE3 (128-bit PSHUFB)
    Ssse3,
    /// x86_64 AVX2 (256-bit PSHUFB)
    Avx2,
    /// ARM64 NEON (128-bit TBL)
    Neon,
}

impl SimdLevel {
    /// Whether this CPU can run the kernel
    pub fn is_supported(self) -> bool {
        match self {
            SimdLevel::Scalar => true,
            SimdLevel::Ssse3 => {
                #[cfg(target_arch = "x86_64")]
                {
                    is_x86_feature_detected!("ssse3")
                }
                #[cfg(not(target_arch = "x86_64"))]
                {
                    false
                }
            }
            SimdLevel::Avx2 => {
                #[cfg(target_arch = "x86_64")]
                {
                    is_x86_feature_detected!("avx2")
                }
                #[cfg(not(target_arch = "x86_64"))]
                {
                    false
                }
            }
            SimdLevel::Neon => {
                #[cfg(target_arch = "aarch64")]
                {
                    std::arch::is_aarch64_feature_detected!("neon")
                }
                #[cfg(not(target_arch = "aarch64"))]
                {
                    false
                }
            }
        }
    }

    /// Bytes handled per vector step
    pub fn width(self) -> usize {
        match self {
            SimdLevel::Scalar => 1,
            SimdLevel::Ssse3 | SimdLevel::Neon => 16,
            SimdLevel::Avx2 => 32,
        }
    }

    /// Every level this CPU supports, scalar first
    pub fn available() -> Vec<SimdLevel> {
        [
            SimdLevel::Scalar,
            SimdLevel::Ssse3,
            SimdLevel::Avx2,
            SimdLevel::Neon,
        ]
        .into_iter()
        .filter(|level| level.is_supported())
        .collect()
    }
}

/// Detect best available SIMD implementation for current platform
pub fn detect_simd_support() -> SimdLevel {
    [SimdLevel::Avx2, SimdLevel::Ssse3, SimdLevel::Neon]
        .into_iter()
        .find(|level| level.is_supported())
        .unwrap_or(SimdLevel::Scalar)
}

#[cfg(target_arch = "x86_64")]
unsafe fn multiply_vector_prefix(
    level: SimdLevel,
    dst: *mut u8,
    src: *const u8,
    len: usize,
    tables: &NibbleTables,
    op: WriteOp,
) -> usize {
    match level {
        SimdLevel::Avx2 => pshufb::multiply_avx2(dst, src, len, tables, op),
        SimdLevel::Ssse3 => pshufb::multiply_ssse3(dst, src, len, tables, op),
        SimdLevel::Scalar | SimdLevel::Neon => 0,
    }
}

#[cfg(target_arch = "aarch64")]
unsafe fn multiply_vector_prefix(
    level: SimdLevel,
    dst: *mut u8,
    src: *const u8,
    len: usize,
    tables: &NibbleTables,
    op: WriteOp,
) -> usize {
    match level {
        SimdLevel::Neon => neon::multiply_neon(dst, src, len, tables, op),
        SimdLevel::Scalar | SimdLevel::Ssse3 | SimdLevel::Avx2 => 0,
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
unsafe fn multiply_vector_prefix(
    _level: SimdLevel,
    _dst: *mut u8,
    _src: *const u8,
    _len: usize,
    _tables: &NibbleTables,
    _op: WriteOp,
) -> usize {
    0
}

/// Multiply `len` bytes of `src` by one coefficient into `dst`
///
/// Runs the vector kernel for `level` over whole registers, then the scalar
/// kernel over the tail.
///
/// # Safety
/// - `level` must be supported by the running CPU
/// - `src` must be valid for `len` reads and `dst` for `len` reads and writes
/// - `dst` may equal `src` (in-place) but must not otherwise overlap it
/// - `row` and `tables` must describe the same coefficient
#[doc(hidden)]
pub unsafe fn multiply_region(
    level: SimdLevel,
    dst: *mut u8,
    src: *const u8,
    len: usize,
    row: &[u8; 256],
    tables: &NibbleTables,
    op: WriteOp,
) {
    let done = if len >= level.width() && level != SimdLevel::Scalar {
        multiply_vector_prefix(level, dst, src, len, tables, op)
    } else {
        0
    };

    if done < len {
        common::multiply_scalar(dst.add(done), src.add(done), len - done, row, op);
    }
}
