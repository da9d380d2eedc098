//! Cauchy Reed-Solomon erasure coding over GF(2^8)
//!
//! - [`galois`]: field tables and bulk multiply-accumulate
//! - [`simd`]: runtime-selected vector kernels behind the bulk operations
//! - [`matrix`]: Cauchy generator, elimination, generator cache
//! - [`encoder`] / [`decoder`]: the two codec operations over explicit contexts
//! - [`codec`]: field + cache bundle and the process-wide default

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod galois;
pub mod matrix;
pub mod simd;

pub use codec::{initialize, Codec};
pub use decoder::RecoverySet;
pub use galois::Gf256;
pub use matrix::{EliminationPlan, EliminationStep, GeneratorMatrix, MatrixCache, SquareMatrix};
pub use simd::{detect_simd_support, SimdLevel};
