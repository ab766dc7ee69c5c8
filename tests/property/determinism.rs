//! Property-based tests for Merkle aggregation

use dirnotary::tree::hasher::{hash_bytes, hash_pair};
use dirnotary::{compute_root, Digest, MerkleTree};
use proptest::prelude::*;

fn leaves() -> impl Strategy<Value = Vec<Digest>> {
    prop::collection::vec(any::<[u8; 32]>(), 1..64)
}

/// Reference fold: pair left to right, carry an odd trailing node up unchanged
fn reference_root(leaves: &[Digest]) -> Digest {
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                [single] => *single,
                _ => unreachable!(),
            })
            .collect();
    }
    level[0]
}

/// Test that the root is a pure function of the leaf sequence
#[test]
fn test_root_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&leaves(), |leaves| {
            let root1 = compute_root(&leaves).unwrap();
            let root2 = compute_root(&leaves).unwrap();
            prop_assert_eq!(root1, root2);
            prop_assert_eq!(root1, reference_root(&leaves));
            Ok(())
        })
        .unwrap();
}

/// Test that changing any single byte of any file changes the root
#[test]
fn test_single_byte_change_alters_root() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::vec(prop::collection::vec(any::<u8>(), 1..64), 1..16),
                any::<prop::sample::Index>(),
                any::<prop::sample::Index>(),
                1u8..=255,
            ),
            |(files, file_idx, byte_idx, delta)| {
                let digests: Vec<Digest> = files.iter().map(|f| hash_bytes(f)).collect();
                let original = compute_root(&digests).unwrap();

                let mut files = files;
                let target = file_idx.index(files.len());
                let position = byte_idx.index(files[target].len());
                files[target][position] = files[target][position].wrapping_add(delta);
                let changed: Vec<Digest> = files.iter().map(|f| hash_bytes(f)).collect();

                prop_assert_ne!(original, compute_root(&changed).unwrap());
                Ok(())
            },
        )
        .unwrap();
}

/// Test that swapping two distinct leaves changes the root
#[test]
fn test_leaf_order_sensitivity() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::vec(any::<[u8; 32]>(), 2..32),
                any::<prop::sample::Index>(),
                any::<prop::sample::Index>(),
            ),
            |(leaves, i, j)| {
                let (i, j) = (i.index(leaves.len()), j.index(leaves.len()));
                prop_assume!(leaves[i] != leaves[j]);

                let mut swapped = leaves.clone();
                swapped.swap(i, j);
                prop_assert_ne!(
                    compute_root(&leaves).unwrap(),
                    compute_root(&swapped).unwrap()
                );
                Ok(())
            },
        )
        .unwrap();
}

/// Test that the tree records every leaf and a logarithmic depth
#[test]
fn test_tree_shape_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&leaves(), |leaves| {
            let tree = MerkleTree::build(&leaves).unwrap();
            prop_assert_eq!(tree.leaf_count(), leaves.len());
            let mut expected_depth = 0;
            let mut width = leaves.len();
            while width > 1 {
                width = width.div_ceil(2);
                expected_depth += 1;
            }
            prop_assert_eq!(tree.depth(), expected_depth);
            Ok(())
        })
        .unwrap();
}
