//! Merkle aggregator: folds an ordered leaf sequence into one root digest
//!
//! Pairing is left-to-right. When a level has an odd number of nodes the last
//! node is promoted to the next level unchanged; it is never paired with a
//! copy of itself. For leaves `[A, B, C]` the root is `H(H(A || B) || C)`.
//! Leaves are used as given (file content digests) and are not re-hashed.

use crate::error::MerkleError;
use crate::tree::hasher;
use crate::types::Digest;

/// Node of the aggregation tree. Leaves have no children; a promoted node is
/// carried upward as-is, so every internal node has exactly two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleNode {
    pub digest: Digest,
    pub left: Option<Box<MerkleNode>>,
    pub right: Option<Box<MerkleNode>>,
}

impl MerkleNode {
    fn leaf(digest: Digest) -> Self {
        Self {
            digest,
            left: None,
            right: None,
        }
    }

    fn join(left: MerkleNode, right: MerkleNode) -> Self {
        Self {
            digest: hasher::hash_pair(&left.digest, &right.digest),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Binary hash tree over an ordered digest sequence
#[derive(Debug, Clone)]
pub struct MerkleTree {
    root: MerkleNode,
    leaf_count: usize,
    depth: usize,
}

impl MerkleTree {
    /// Build the tree bottom-up, level by level.
    pub fn build(leaves: &[Digest]) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let mut level: Vec<MerkleNode> = leaves.iter().copied().map(MerkleNode::leaf).collect();
        let mut depth = 0;

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut nodes = level.into_iter();
            while let Some(left) = nodes.next() {
                match nodes.next() {
                    Some(right) => next.push(MerkleNode::join(left, right)),
                    None => next.push(left),
                }
            }
            level = next;
            depth += 1;
        }

        let root = level.pop().ok_or(MerkleError::EmptyInput)?;
        Ok(Self {
            root,
            leaf_count: leaves.len(),
            depth,
        })
    }

    pub fn root(&self) -> Digest {
        self.root.digest
    }

    pub fn root_node(&self) -> &MerkleNode {
        &self.root
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of levels above the leaves
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Compute the root digest of an ordered leaf sequence
pub fn compute_root(leaves: &[Digest]) -> Result<Digest, MerkleError> {
    MerkleTree::build(leaves).map(|tree| tree.root())
}
