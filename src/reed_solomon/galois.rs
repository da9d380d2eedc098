//! Galois Field GF(2^8) arithmetic for Cauchy Reed-Solomon coding
//!
//! ## Field polynomial
//!
//! Elements are bytes, addition is XOR, and multiplication is polynomial
//! multiplication modulo the primitive polynomial 0x14D
//! (x⁸ + x⁶ + x³ + x² + 1) with generator 2.
//!
//! ## Tables
//!
//! [`Gf256`] owns every table the codec needs and is built once:
//! - `exp` / `log`: exponent and logarithm tables; `exp` is doubled to 510 entries
//!   so `exp[log a + log b]` needs no reduction
//! - a full 256×256 product table used by the scalar kernel
//! - an inverse table
//! - per-coefficient nibble tables used by the shuffle-based vector kernels
//!
//! The context is immutable after construction and can be shared freely
//! between threads.

use crate::error::{CodecError, Result};
use crate::reed_solomon::simd::{
    build_nibble_tables, detect_simd_support, multiply_region, xor_slice, NibbleTables, SimdLevel,
    WriteOp,
};
use std::fmt;

/// Primitive polynomial x⁸ + x⁶ + x³ + x² + 1
pub const POLYNOMIAL: u16 = 0x14D;

/// Number of nonzero field elements (order of the multiplicative group)
const GROUP_ORDER: usize = 255;

/// Table-driven GF(256) arithmetic context
pub struct Gf256 {
    exp: [u8; 2 * GROUP_ORDER],
    log: [u8; 256],
    inverse: [u8; 256],
    products: Box<[[u8; 256]]>,
    nibbles: Box<[NibbleTables]>,
    simd_level: SimdLevel,
}

impl Gf256 {
    /// Build all tables and select the best vector kernel for this CPU
    ///
    /// # Errors
    /// `FieldInitialization` if the generator does not cycle through all
    /// 255 nonzero elements.
    pub fn new() -> Result<Self> {
        Self::build(detect_simd_support())
    }

    /// Build all tables with a specific vector kernel
    ///
    /// # Errors
    /// `UnsupportedSimd` if the running CPU cannot execute `level`.
    pub fn with_simd_level(level: SimdLevel) -> Result<Self> {
        if !level.is_supported() {
            return Err(CodecError::UnsupportedSimd(level));
        }
        Self::build(level)
    }

    fn build(simd_level: SimdLevel) -> Result<Self> {
        let (exp, log) = build_exp_log()?;

        let mut inverse = [0u8; 256];
        for a in 1..256 {
            inverse[a] = exp[GROUP_ORDER - log[a] as usize];
        }

        let mut products = vec![[0u8; 256]; 256].into_boxed_slice();
        for a in 1..256 {
            let log_a = log[a] as usize;
            for b in 1..256 {
                products[a][b] = exp[log_a + log[b] as usize];
            }
        }

        let nibbles: Box<[NibbleTables]> = products.iter().map(build_nibble_tables).collect();

        log::info!(
            "GF(256) tables built (polynomial {:#05x}, SIMD level {:?})",
            POLYNOMIAL,
            simd_level
        );

        Ok(Self {
            exp,
            log,
            inverse,
            products,
            nibbles,
            simd_level,
        })
    }

    /// Vector kernel used by the bulk operations
    #[inline]
    pub fn simd_level(&self) -> SimdLevel {
        self.simd_level
    }

    #[inline]
    pub fn add(&self, a: u8, b: u8) -> u8 {
        a ^ b
    }

    #[inline]
    pub fn mul(&self, a: u8, b: u8) -> u8 {
        self.products[a as usize][b as usize]
    }

    /// `a / b`, or `None` when `b == 0`
    #[inline]
    pub fn div(&self, a: u8, b: u8) -> Option<u8> {
        if b == 0 {
            return None;
        }
        if a == 0 {
            return Some(0);
        }
        let log_diff = self.log[a as usize] as usize + GROUP_ORDER - self.log[b as usize] as usize;
        Some(self.exp[log_diff])
    }

    /// Multiplicative inverse, or `None` for zero
    #[inline]
    pub fn inv(&self, a: u8) -> Option<u8> {
        (a != 0).then(|| self.inverse[a as usize])
    }

    pub fn pow(&self, a: u8, exponent: u32) -> u8 {
        if exponent == 0 {
            return 1;
        }
        if a == 0 {
            return 0;
        }
        let log_val = self.log[a as usize] as u64 * exponent as u64;
        self.exp[(log_val % GROUP_ORDER as u64) as usize]
    }

    /// `exp[n] = 2^n`
    #[inline]
    pub fn exp(&self, n: u8) -> u8 {
        self.exp[n as usize]
    }

    /// Discrete logarithm base 2, or `None` for zero
    #[inline]
    pub fn log(&self, a: u8) -> Option<u8> {
        (a != 0).then(|| self.log[a as usize])
    }

    /// Product row for coefficient `c`: `row[x] = x * c`
    #[inline]
    pub fn mul_row(&self, c: u8) -> &[u8; 256] {
        &self.products[c as usize]
    }

    #[inline]
    pub fn nibble_tables(&self, c: u8) -> &NibbleTables {
        &self.nibbles[c as usize]
    }

    /// `dst[i] ^= src[i] * c` over `min(dst.len(), src.len())` bytes
    pub fn mul_add_slice(&self, dst: &mut [u8], src: &[u8], c: u8) {
        let len = dst.len().min(src.len());
        match c {
            0 => {}
            1 => xor_slice(dst, src),
            _ => unsafe {
                // SAFETY: both pointers are valid for `len` bytes and the borrow
                // checker rules out overlap; the level was checked at construction.
                multiply_region(
                    self.simd_level,
                    dst.as_mut_ptr(),
                    src.as_ptr(),
                    len,
                    self.mul_row(c),
                    self.nibble_tables(c),
                    WriteOp::Add,
                )
            },
        }
    }

    /// `dst[i] = src[i] * c` over `min(dst.len(), src.len())` bytes
    pub fn mul_slice(&self, dst: &mut [u8], src: &[u8], c: u8) {
        let len = dst.len().min(src.len());
        match c {
            0 => dst[..len].fill(0),
            1 => dst[..len].copy_from_slice(&src[..len]),
            _ => unsafe {
                // SAFETY: as in `mul_add_slice`
                multiply_region(
                    self.simd_level,
                    dst.as_mut_ptr(),
                    src.as_ptr(),
                    len,
                    self.mul_row(c),
                    self.nibble_tables(c),
                    WriteOp::Direct,
                )
            },
        }
    }

    /// `buf[i] = buf[i] * c`
    pub fn mul_slice_in_place(&self, buf: &mut [u8], c: u8) {
        match c {
            0 => buf.fill(0),
            1 => {}
            _ => {
                let ptr = buf.as_mut_ptr();
                // SAFETY: kernels read each position before writing it, so
                // passing the same buffer as source and destination is allowed.
                unsafe {
                    multiply_region(
                        self.simd_level,
                        ptr,
                        ptr,
                        buf.len(),
                        self.mul_row(c),
                        self.nibble_tables(c),
                        WriteOp::Direct,
                    )
                }
            }
        }
    }

    /// `dst[i] ^= src[i]`, field addition over a buffer
    #[inline]
    pub fn xor_slice(&self, dst: &mut [u8], src: &[u8]) {
        xor_slice(dst, src);
    }
}

impl fmt::Debug for Gf256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gf256")
            .field("polynomial", &format_args!("{:#05x}", POLYNOMIAL))
            .field("simd_level", &self.simd_level)
            .finish_non_exhaustive()
    }
}

/// Walk the powers of 2 and fill the exponent and logarithm tables
fn build_exp_log() -> Result<([u8; 2 * GROUP_ORDER], [u8; 256])> {
    let mut exp = [0u8; 2 * GROUP_ORDER];
    let mut log = [0u8; 256];
    let mut seen = [false; 256];

    let mut x: u16 = 1;
    for power in 0..GROUP_ORDER {
        if seen[x as usize] {
            return Err(CodecError::FieldInitialization(format!(
                "generator repeats element {:#04x} after {} steps",
                x, power
            )));
        }
        seen[x as usize] = true;
        exp[power] = x as u8;
        log[x as usize] = power as u8;

        x <<= 1;
        if x & 0x100 != 0 {
            x ^= POLYNOMIAL;
        }
    }

    if x != 1 {
        return Err(CodecError::FieldInitialization(format!(
            "polynomial {:#05x} is not primitive",
            POLYNOMIAL
        )));
    }

    exp.copy_within(0..GROUP_ORDER, GROUP_ORDER);
    Ok((exp, log))
}
