//! Cauchy Reed-Solomon erasure codec over GF(256)
//!
//! Encode `k` equal-sized original blocks into `m` recovery blocks; any `k`
//! of the `k + m` blocks reconstruct the originals.
//!
//! ```rust
//! use cauchy256::{Block, EncoderParams};
//!
//! let params = EncoderParams::new(4, 3, 2).unwrap();
//! let originals = vec![b"abcd".to_vec(), b"efgh".to_vec(), b"ijkl".to_vec()];
//! let mut recovery = vec![vec![0u8; 4]; 2];
//! cauchy256::encode(&params, &originals, &mut recovery).unwrap();
//!
//! // originals 0 and 2 are lost; both recovery blocks arrive
//! let mut slot_a = recovery[1].clone();
//! let mut slot_b = originals[1].clone();
//! let mut slot_c = recovery[0].clone();
//! let mut blocks = [
//!     Block::new(params.recovery_block_index(1), &mut slot_a),
//!     Block::new(1, &mut slot_b),
//!     Block::new(params.recovery_block_index(0), &mut slot_c),
//! ];
//! cauchy256::decode(&params, &mut blocks).unwrap();
//!
//! for block in &blocks {
//!     assert_eq!(block.data, originals[block.index as usize].as_slice());
//! }
//! ```
//!
//! The free functions use a process-wide [`Codec`] built on first use. Build
//! a [`Gf256`] and [`Codec`] explicitly to choose the SIMD level or to keep
//! separate generator caches.

pub mod error;
pub mod params;
pub mod reed_solomon;

pub use error::{CodecError, Result};
pub use params::{Block, EncoderParams, MAX_BLOCKS};
pub use reed_solomon::{Codec, Gf256, SimdLevel};

/// Build the process-wide field tables and codec
///
/// Optional: every free function initializes on first use. Calling it early
/// surfaces initialization failure up front. Later calls are no-ops.
pub fn initialize() -> Result<&'static Codec<'static>> {
    reed_solomon::initialize()
}

/// Fill `recovery` with the `params.recovery_count()` recovery blocks
pub fn encode<O, R>(params: &EncoderParams, originals: &[O], recovery: &mut [R]) -> Result<()>
where
    O: AsRef<[u8]>,
    R: AsMut<[u8]>,
{
    initialize()?.encode(params, originals, recovery)
}

/// Compute only recovery block `recovery_index`
pub fn encode_block<O>(
    params: &EncoderParams,
    originals: &[O],
    recovery_index: usize,
    out: &mut [u8],
) -> Result<()>
where
    O: AsRef<[u8]>,
{
    initialize()?.encode_block(params, originals, recovery_index, out)
}

/// Reconstruct erased originals in place
///
/// `blocks` holds exactly `original_count` slots in any order. Each recovery
/// slot is overwritten with an erased original and its `index` rewritten.
pub fn decode(params: &EncoderParams, blocks: &mut [Block<'_>]) -> Result<()> {
    initialize()?.decode(params, blocks)
}
