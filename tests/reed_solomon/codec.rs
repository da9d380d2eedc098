//! End-to-end encode/decode scenarios

use cauchy256::{Block, Codec, CodecError, EncoderParams, Gf256};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Multiply without any tables: shift-and-add modulo 0x14D
fn reference_mul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        let high = a & 0x80 != 0;
        a <<= 1;
        if high {
            a ^= 0x4D;
        }
        b >>= 1;
    }
    product
}

fn reference_inv(a: u8) -> u8 {
    (1..=255u8)
        .find(|&b| reference_mul(a, b) == 1)
        .expect("nonzero element has an inverse")
}

fn random_blocks(rng: &mut StdRng, count: usize, bytes: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|_| (0..bytes).map(|_| rng.random()).collect())
        .collect()
}

#[test]
fn four_plus_two_sixteen_byte_blocks() {
    init_logging();
    let params = EncoderParams::new(16, 4, 2).unwrap();
    let originals: Vec<Vec<u8>> = [
        "000102030405060708090a0b0c0d0e0f",
        "48656c6c6f2c2043617563687921210a",
        "deadbeefcafebabe0123456789abcdef",
        "ffffffffffffffff0000000000000000",
    ]
    .iter()
    .map(|h| hex::decode(h).unwrap())
    .collect();
    let mut recovery = vec![vec![0u8; 16]; 2];

    cauchy256::encode(&params, &originals, &mut recovery).unwrap();

    // recovery[r][i] = sum_c original[c][i] / ((4 + r) ^ c)
    for (r, block) in recovery.iter().enumerate() {
        let coefficients: Vec<u8> = (0..4u8).map(|c| reference_inv((4 + r as u8) ^ c)).collect();
        for i in 0..16 {
            let expected = (0..4).fold(0u8, |acc, c| {
                acc ^ reference_mul(originals[c][i], coefficients[c])
            });
            assert_eq!(block[i], expected, "recovery {} byte {}", r, i);
        }
    }

    // lose originals 1 and 3, put the recovery blocks in their slots
    let mut slot0 = originals[0].clone();
    let mut slot1 = recovery[0].clone();
    let mut slot2 = originals[2].clone();
    let mut slot3 = recovery[1].clone();
    let mut blocks = [
        Block::new(0, &mut slot0),
        Block::new(params.recovery_block_index(0), &mut slot1),
        Block::new(2, &mut slot2),
        Block::new(params.recovery_block_index(1), &mut slot3),
    ];

    cauchy256::decode(&params, &mut blocks).unwrap();

    assert_eq!(blocks[1].index, 1);
    assert_eq!(blocks[3].index, 3);
    assert_eq!(slot0, originals[0]);
    assert_eq!(slot1, originals[1]);
    assert_eq!(slot2, originals[2]);
    assert_eq!(slot3, originals[3]);
}

#[test]
fn zero_recovery_blocks() {
    let params = EncoderParams::new(8, 3, 0).unwrap();
    let originals = vec![vec![1u8; 8], vec![2u8; 8], vec![3u8; 8]];
    let mut recovery: Vec<Vec<u8>> = Vec::new();

    cauchy256::encode(&params, &originals, &mut recovery).unwrap();
    assert!(recovery.is_empty());

    let mut data = originals.clone();
    let mut blocks: Vec<Block<'_>> = data
        .iter_mut()
        .enumerate()
        .map(|(i, b)| Block::new(i as u8, b))
        .collect();
    cauchy256::decode(&params, &mut blocks).unwrap();
    drop(blocks);

    assert_eq!(data, originals);
}

#[test]
fn three_erasures_with_two_recovery_blocks_fail() {
    let params = EncoderParams::new(8, 4, 2).unwrap();
    let originals: Vec<Vec<u8>> = (0..4).map(|i| vec![i as u8; 8]).collect();
    let mut recovery = vec![vec![0u8; 8]; 2];
    cauchy256::encode(&params, &originals, &mut recovery).unwrap();

    // only three blocks survive
    let mut survivors = vec![originals[2].clone(), recovery[0].clone(), recovery[1].clone()];
    let snapshot = survivors.clone();
    let mut blocks: Vec<Block<'_>> = survivors
        .iter_mut()
        .zip([2u8, 4, 5])
        .map(|(b, t)| Block::new(t, b))
        .collect();
    assert_eq!(
        cauchy256::decode(&params, &mut blocks),
        Err(CodecError::BlockCountMismatch {
            expected: 4,
            actual: 3
        })
    );

    // padding the frame with a repeated recovery block is no better
    let mut padded = vec![
        originals[2].clone(),
        recovery[0].clone(),
        recovery[1].clone(),
        recovery[1].clone(),
    ];
    let mut blocks: Vec<Block<'_>> = padded
        .iter_mut()
        .zip([2u8, 4, 5, 5])
        .map(|(b, t)| Block::new(t, b))
        .collect();
    assert_eq!(
        cauchy256::decode(&params, &mut blocks),
        Err(CodecError::DuplicateIndex(5))
    );

    // or with a tag past the last recovery block
    let mut blocks: Vec<Block<'_>> = padded
        .iter_mut()
        .zip([2u8, 4, 5, 6])
        .map(|(b, t)| Block::new(t, b))
        .collect();
    assert_eq!(
        cauchy256::decode(&params, &mut blocks),
        Err(CodecError::IndexOutOfRange { index: 6, limit: 6 })
    );

    assert_eq!(survivors, snapshot);
}

#[test]
fn present_originals_are_not_touched() {
    let mut rng = StdRng::seed_from_u64(7);
    let params = EncoderParams::new(64, 6, 3).unwrap();
    let originals = random_blocks(&mut rng, 6, 64);
    let mut recovery = vec![vec![0u8; 64]; 3];
    cauchy256::encode(&params, &originals, &mut recovery).unwrap();

    let mut data = vec![
        originals[0].clone(),
        recovery[2].clone(),
        originals[2].clone(),
        originals[3].clone(),
        recovery[0].clone(),
        originals[5].clone(),
    ];
    let tags = [0u8, 8, 2, 3, 6, 5];
    let ptrs: Vec<*const u8> = data.iter().map(|b| b.as_ptr()).collect();
    let mut blocks: Vec<Block<'_>> = data
        .iter_mut()
        .zip(tags)
        .map(|(b, t)| Block::new(t, b))
        .collect();

    cauchy256::decode(&params, &mut blocks).unwrap();

    let indices: Vec<u8> = blocks.iter().map(|b| b.index).collect();
    drop(blocks);
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    for (i, block) in data.iter().enumerate() {
        assert_eq!(block, &originals[i]);
        assert_eq!(block.as_ptr(), ptrs[i]);
    }
}

#[test]
fn every_erasure_pattern_small_code() {
    let mut rng = StdRng::seed_from_u64(42);
    let k = 5;
    let m = 3;
    let params = EncoderParams::new(9, k, m).unwrap();
    let originals = random_blocks(&mut rng, k, 9);
    let mut recovery = vec![vec![0u8; 9]; m];
    cauchy256::encode(&params, &originals, &mut recovery).unwrap();

    // every subset of k surviving blocks out of k + m
    for mask in 0u32..(1 << (k + m)) {
        if mask.count_ones() as usize != k {
            continue;
        }
        let survivors: Vec<usize> = (0..k + m).filter(|i| mask & (1 << i) != 0).collect();
        let mut data: Vec<Vec<u8>> = survivors
            .iter()
            .map(|&i| {
                if i < k {
                    originals[i].clone()
                } else {
                    recovery[i - k].clone()
                }
            })
            .collect();
        let mut blocks: Vec<Block<'_>> = data
            .iter_mut()
            .zip(&survivors)
            .map(|(b, &i)| Block::new(i as u8, b))
            .collect();

        cauchy256::decode(&params, &mut blocks).unwrap();

        for block in &blocks {
            assert_eq!(
                block.data,
                originals[block.index as usize].as_slice(),
                "survivors {:?}",
                survivors
            );
        }
    }
}

#[test]
fn single_original_replication() {
    let params = EncoderParams::new(32, 1, 4).unwrap();
    let original = vec![(0..32u8).collect::<Vec<u8>>()];
    let mut recovery = vec![vec![0u8; 32]; 4];
    cauchy256::encode(&params, &original, &mut recovery).unwrap();
    assert!(recovery.iter().all(|r| r == &original[0]));

    let mut slot = recovery[3].clone();
    let mut blocks = [Block::new(params.recovery_block_index(3), &mut slot)];
    cauchy256::decode(&params, &mut blocks).unwrap();
    assert_eq!(blocks[0].index, 0);
    assert_eq!(slot, original[0]);
}

#[test]
fn maximum_block_count() {
    let mut rng = StdRng::seed_from_u64(256);
    let k = 200;
    let m = 56;
    let params = EncoderParams::new(3, k, m).unwrap();
    let originals = random_blocks(&mut rng, k, 3);
    let mut recovery = vec![vec![0u8; 3]; m];
    cauchy256::encode(&params, &originals, &mut recovery).unwrap();

    // lose the first 56 originals
    let mut data: Vec<Vec<u8>> = recovery.clone();
    data.extend(originals[m..].iter().cloned());
    let tags: Vec<u8> = (0..m)
        .map(|r| params.recovery_block_index(r))
        .chain((m..k).map(|i| i as u8))
        .collect();
    let mut blocks: Vec<Block<'_>> = data
        .iter_mut()
        .zip(tags)
        .map(|(b, t)| Block::new(t, b))
        .collect();

    cauchy256::decode(&params, &mut blocks).unwrap();

    for block in &blocks {
        assert_eq!(block.data, originals[block.index as usize].as_slice());
    }
}

#[test]
fn streamed_blocks_match_batch_encode() {
    let mut rng = StdRng::seed_from_u64(3);
    let params = EncoderParams::new(100, 10, 4).unwrap();
    let originals = random_blocks(&mut rng, 10, 100);
    let mut batch = vec![vec![0u8; 100]; 4];
    cauchy256::encode(&params, &originals, &mut batch).unwrap();

    for (r, expected) in batch.iter().enumerate() {
        let mut out = vec![0u8; 100];
        cauchy256::encode_block(&params, &originals, r, &mut out).unwrap();
        assert_eq!(&out, expected);
    }
}

#[test]
fn every_simd_level_decodes_identically() {
    let mut rng = StdRng::seed_from_u64(99);
    let params = EncoderParams::new(1000, 8, 4).unwrap();
    let originals = random_blocks(&mut rng, 8, 1000);
    let mut reference: Option<Vec<Vec<u8>>> = None;

    for level in cauchy256::SimdLevel::available() {
        let field = Gf256::with_simd_level(level).unwrap();
        let codec = Codec::new(&field);
        let mut recovery = vec![vec![0u8; 1000]; 4];
        codec.encode(&params, &originals, &mut recovery).unwrap();

        match &reference {
            None => reference = Some(recovery.clone()),
            Some(expected) => assert_eq!(&recovery, expected, "{:?}", level),
        }

        let mut data = vec![
            recovery[3].clone(),
            originals[1].clone(),
            recovery[1].clone(),
            originals[3].clone(),
            originals[4].clone(),
            recovery[0].clone(),
            originals[6].clone(),
            recovery[2].clone(),
        ];
        let tags = [11u8, 1, 9, 3, 4, 8, 6, 10];
        let mut blocks: Vec<Block<'_>> = data
            .iter_mut()
            .zip(tags)
            .map(|(b, t)| Block::new(t, b))
            .collect();
        codec.decode(&params, &mut blocks).unwrap();

        for block in &blocks {
            assert_eq!(block.data, originals[block.index as usize].as_slice());
        }
    }
}

#[test]
fn concurrent_use_of_default_codec() {
    use rayon::prelude::*;

    cauchy256::initialize().unwrap();

    (0..32u64).into_par_iter().for_each(|seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let k = rng.random_range(1..=16usize);
        let m = rng.random_range(1..=8usize);
        let bytes = rng.random_range(1..=300usize);
        let params = EncoderParams::new(bytes, k, m).unwrap();
        let originals = random_blocks(&mut rng, k, bytes);
        let mut recovery = vec![vec![0u8; bytes]; m];
        cauchy256::encode(&params, &originals, &mut recovery).unwrap();

        let lost = rng.random_range(0..=k.min(m));
        let erased = rand::seq::index::sample(&mut rng, k, lost).into_vec();
        let rows = rand::seq::index::sample(&mut rng, m, lost).into_vec();

        let mut data: Vec<Vec<u8>> = Vec::with_capacity(k);
        let mut tags: Vec<u8> = Vec::with_capacity(k);
        let mut substitutes = rows.iter();
        for i in 0..k {
            if erased.contains(&i) {
                let r = *substitutes.next().unwrap();
                data.push(recovery[r].clone());
                tags.push(params.recovery_block_index(r));
            } else {
                data.push(originals[i].clone());
                tags.push(i as u8);
            }
        }
        let mut blocks: Vec<Block<'_>> = data
            .iter_mut()
            .zip(tags)
            .map(|(b, t)| Block::new(t, b))
            .collect();

        cauchy256::decode(&params, &mut blocks).unwrap();

        for block in &blocks {
            assert_eq!(block.data, originals[block.index as usize].as_slice());
        }
    });
}
