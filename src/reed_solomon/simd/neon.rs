//! ARM NEON SIMD kernel for GF(256) multiplication
//!
//! Same nibble technique as the PSHUFB kernels, using the `vqtbl1q_u8` table
//! lookup. Every AArch64 CPU has NEON, but detection still goes through the
//! runtime check so the dispatch logic is identical on every platform.

use super::common::{NibbleTables, WriteOp};
use std::arch::aarch64::*;

/// NEON kernel, 16 bytes per step
///
/// Returns the number of bytes processed (a multiple of 16).
///
/// # Safety
/// - Requires NEON support
/// - `src` must be valid for `len` reads and `dst` for `len` reads and writes
/// - `dst` may equal `src` (in-place) but must not otherwise overlap it
#[target_feature(enable = "neon")]
pub unsafe fn multiply_neon(
    dst: *mut u8,
    src: *const u8,
    len: usize,
    tables: &NibbleTables,
    op: WriteOp,
) -> usize {
    let table_lo = vld1q_u8(tables.lo.as_ptr());
    let table_hi = vld1q_u8(tables.hi.as_ptr());
    let mask = vdupq_n_u8(0x0F);

    let end = (len / 16) * 16;
    let mut idx = 0;

    while idx < end {
        let data = vld1q_u8(src.add(idx));

        let lo_nibbles = vandq_u8(data, mask);
        let hi_nibbles = vshrq_n_u8(data, 4);

        let mut product = veorq_u8(
            vqtbl1q_u8(table_lo, lo_nibbles),
            vqtbl1q_u8(table_hi, hi_nibbles),
        );

        if op == WriteOp::Add {
            product = veorq_u8(vld1q_u8(dst.add(idx)), product);
        }

        vst1q_u8(dst.add(idx), product);
        idx += 16;
    }

    end
}
