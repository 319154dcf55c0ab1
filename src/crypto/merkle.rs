//! Merkle audit paths for transaction inclusion proofs
//!
//! The block transaction tree follows RFC 6962: leaves are hashed as
//! `sha256(0x00 || data)`, interior nodes as `sha256(0x01 || left || right)`,
//! and a node without a right sibling is promoted unchanged.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hash::sha256;
use crate::core::types::H256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("Leaf index {index} out of range for tree of size {size}")]
    IndexOutOfRange { index: u64, size: u64 },
    #[error("Constructed root hash {constructed} differs from provided root hash {expected}")]
    ConstructedRootMismatch { constructed: H256, expected: H256 },
    #[error("Audit path exhausted before reaching the root")]
    PathExhausted,
    #[error("Audit path has {0} unconsumed entries")]
    UnconsumedPath(usize),
    #[error("Left subtree is not full")]
    LeftSubtreeNotFull,
    #[error("Subtree hash count {actual} does not match expected {expected}")]
    HashCountMismatch { expected: usize, actual: usize },
}

// =============================================================================
// Node hashing
// =============================================================================

/// Hash of the empty tree
pub fn hash_empty() -> H256 {
    H256::ZERO
}

pub fn hash_leaf(data: &[u8]) -> H256 {
    let mut buf = Vec::with_capacity(1 + data.len());
    buf.push(0x00);
    buf.extend_from_slice(data);
    H256(sha256(&buf))
}

pub fn hash_children(left: &H256, right: &H256) -> H256 {
    let mut buf = Vec::with_capacity(65);
    buf.push(0x01);
    buf.extend_from_slice(&left.0);
    buf.extend_from_slice(&right.0);
    H256(sha256(&buf))
}

// =============================================================================
// Verification
// =============================================================================

/// Fold an audit path up from a leaf, returning the reconstructed root
///
/// At each level an odd index takes its sibling from the left, an even
/// index below the last node takes it from the right, and the lone
/// rightmost node is promoted without consuming an entry.
pub fn root_from_audit_path(
    leaf_hash: &H256,
    leaf_index: u64,
    audit_path: &[H256],
    tree_size: u64,
) -> Result<H256, MerkleError> {
    if leaf_index >= tree_size {
        return Err(MerkleError::IndexOutOfRange {
            index: leaf_index,
            size: tree_size,
        });
    }

    let mut node_index = leaf_index;
    let mut last_node = tree_size - 1;
    let mut current = *leaf_hash;
    let mut path = audit_path.iter();

    while last_node > 0 {
        if node_index % 2 == 1 {
            let sibling = path.next().ok_or(MerkleError::PathExhausted)?;
            current = hash_children(sibling, &current);
        } else if node_index < last_node {
            let sibling = path.next().ok_or(MerkleError::PathExhausted)?;
            current = hash_children(&current, sibling);
        }
        node_index /= 2;
        last_node /= 2;
    }

    match path.len() {
        0 => Ok(current),
        remaining => Err(MerkleError::UnconsumedPath(remaining)),
    }
}

/// Check that `leaf_hash` sits at `leaf_index` in the tree with `root_hash`
///
/// A path that cannot be folded yields `Ok(false)`. A path that folds to a
/// different root is an inconsistent proof and yields
/// `ConstructedRootMismatch`.
pub fn verify_leaf_hash_inclusion(
    leaf_hash: &H256,
    leaf_index: u64,
    audit_path: &[H256],
    root_hash: &H256,
    tree_size: u64,
) -> Result<bool, MerkleError> {
    let constructed = match root_from_audit_path(leaf_hash, leaf_index, audit_path, tree_size) {
        Ok(root) => root,
        Err(e @ (MerkleError::PathExhausted | MerkleError::UnconsumedPath(_))) => {
            warn!("Merkle audit path could not be folded: {}", e);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    if constructed != *root_hash {
        return Err(MerkleError::ConstructedRootMismatch {
            constructed,
            expected: *root_hash,
        });
    }
    debug!("Leaf {} verified against root {}", leaf_index, root_hash);
    Ok(true)
}

/// Side on which a proof sibling sits relative to the running hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

/// One direction-tagged sibling of a proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProofNode {
    pub direction: Direction,
    pub target_hash: H256,
}

/// Label each audit-path entry with the side it is combined on
pub fn proof_nodes(
    leaf_index: u64,
    audit_path: &[H256],
    tree_size: u64,
) -> Result<Vec<ProofNode>, MerkleError> {
    if leaf_index >= tree_size {
        return Err(MerkleError::IndexOutOfRange {
            index: leaf_index,
            size: tree_size,
        });
    }

    let mut nodes = Vec::with_capacity(audit_path.len());
    let mut node_index = leaf_index;
    let mut last_node = tree_size - 1;
    let mut path = audit_path.iter();

    while last_node > 0 {
        let direction = if node_index % 2 == 1 {
            Some(Direction::Left)
        } else if node_index < last_node {
            Some(Direction::Right)
        } else {
            None
        };
        if let Some(direction) = direction {
            let target_hash = *path.next().ok_or(MerkleError::PathExhausted)?;
            nodes.push(ProofNode {
                direction,
                target_hash,
            });
        }
        node_index /= 2;
        last_node /= 2;
    }

    Ok(nodes)
}

/// Fold direction-tagged nodes from a leaf and compare with the root
pub fn verify_proof_nodes(
    leaf_hash: &H256,
    nodes: &[ProofNode],
    root_hash: &H256,
) -> Result<bool, MerkleError> {
    let constructed = nodes
        .iter()
        .fold(*leaf_hash, |current, node| match node.direction {
            Direction::Left => hash_children(&node.target_hash, &current),
            Direction::Right => hash_children(&current, &node.target_hash),
        });

    if constructed.is_zero() {
        return Ok(false);
    }
    if constructed != *root_hash {
        return Err(MerkleError::ConstructedRootMismatch {
            constructed,
            expected: *root_hash,
        });
    }
    Ok(true)
}

// =============================================================================
// Construction
// =============================================================================

/// Root and the perfect-subtree hashes covering `[0, n)`
struct Subtree {
    root: H256,
    hashes: Vec<H256>,
}

/// Largest power of two strictly below `width` (`width >= 2`)
fn split_point(width: usize) -> usize {
    1 << (usize::BITS - (width - 1).leading_zeros() - 1)
}

fn hash_full(leaves: &[H256]) -> Result<Subtree, MerkleError> {
    match leaves.len() {
        0 => Ok(Subtree {
            root: hash_empty(),
            hashes: Vec::new(),
        }),
        1 => Ok(Subtree {
            root: leaves[0],
            hashes: vec![leaves[0]],
        }),
        width => {
            let split = split_point(width);
            let left = hash_full(&leaves[..split])?;
            if left.hashes.len() != 1 {
                return Err(MerkleError::LeftSubtreeNotFull);
            }
            let right = hash_full(&leaves[split..])?;
            let root = hash_children(&left.root, &right.root);
            let hashes = if split * 2 == width {
                vec![root]
            } else {
                let mut hashes = left.hashes;
                hashes.extend(right.hashes);
                hashes
            };
            Ok(Subtree { root, hashes })
        }
    }
}

/// Root of the tree over already-hashed leaves
pub fn hash_full_tree_with_leaf_hashes(leaf_hashes: &[H256]) -> Result<H256, MerkleError> {
    let tree = hash_full(leaf_hashes)?;
    let expected = leaf_hashes.len().count_ones() as usize;
    if tree.hashes.len() != expected {
        return Err(MerkleError::HashCountMismatch {
            expected,
            actual: tree.hashes.len(),
        });
    }
    Ok(tree.root)
}

/// Root of the tree over raw leaf data
pub fn hash_full_tree(leaves: &[Vec<u8>]) -> Result<H256, MerkleError> {
    let leaf_hashes: Vec<H256> = leaves.iter().map(|leaf| hash_leaf(leaf)).collect();
    hash_full_tree_with_leaf_hashes(&leaf_hashes)
}

/// Bottom-up audit path for the leaf at `index`
pub fn audit_path(leaf_hashes: &[H256], index: usize) -> Result<Vec<H256>, MerkleError> {
    if index >= leaf_hashes.len() {
        return Err(MerkleError::IndexOutOfRange {
            index: index as u64,
            size: leaf_hashes.len() as u64,
        });
    }
    let mut path = Vec::new();
    collect_path(leaf_hashes, index, &mut path)?;
    Ok(path)
}

fn collect_path(leaves: &[H256], index: usize, path: &mut Vec<H256>) -> Result<(), MerkleError> {
    if leaves.len() <= 1 {
        return Ok(());
    }
    let split = split_point(leaves.len());
    if index < split {
        collect_path(&leaves[..split], index, path)?;
        path.push(hash_full(&leaves[split..])?.root);
    } else {
        collect_path(&leaves[split..], index - split, path)?;
        path.push(hash_full(&leaves[..split])?.root);
    }
    Ok(())
}

// =============================================================================
// Proof payload
// =============================================================================

/// Result of the node's `getmerkleproof` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MerkleProof {
    #[serde(rename = "Type", default)]
    pub proof_type: String,
    pub transactions_root: H256,
    pub block_height: u32,
    pub cur_block_root: H256,
    pub cur_block_height: u32,
    pub target_hashes: Vec<H256>,
}

impl MerkleProof {
    /// Check that the block's transaction root is included in the current
    /// block root
    pub fn verify(&self) -> Result<bool, MerkleError> {
        verify_leaf_hash_inclusion(
            &self.transactions_root,
            u64::from(self.block_height),
            &self.target_hashes,
            &self.cur_block_root,
            u64::from(self.cur_block_height) + 1,
        )
    }

    /// Direction-tagged form of the target hashes
    pub fn nodes(&self) -> Result<Vec<ProofNode>, MerkleError> {
        proof_nodes(
            u64::from(self.block_height),
            &self.target_hashes,
            u64::from(self.cur_block_height) + 1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<H256> {
        (0..n).map(|i| hash_leaf(format!("tx{}", i).as_bytes())).collect()
    }

    #[test]
    fn test_domain_separation() {
        let a = hash_leaf(b"a");
        let b = hash_leaf(b"b");
        let mut concat = Vec::new();
        concat.extend_from_slice(&a.0);
        concat.extend_from_slice(&b.0);
        assert_ne!(hash_children(&a, &b), hash_leaf(&concat));
    }

    #[test]
    fn test_three_leaf_tree() {
        let tree = [hash_leaf(b"a"), hash_leaf(b"b"), hash_leaf(b"c")];
        let root = hash_full_tree_with_leaf_hashes(&tree).unwrap();
        assert_eq!(
            root,
            hash_children(&hash_children(&tree[0], &tree[1]), &tree[2])
        );
        assert_eq!(
            hash_full_tree(&[b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]).unwrap(),
            root
        );

        let path = audit_path(&tree, 0).unwrap();
        assert_eq!(path, vec![tree[1], tree[2]]);
        assert!(verify_leaf_hash_inclusion(&tree[0], 0, &path, &root, 3).unwrap());

        let mut tampered = path.clone();
        tampered[1] = H256::ZERO;
        assert!(matches!(
            verify_leaf_hash_inclusion(&tree[0], 0, &tampered, &root, 3),
            Err(MerkleError::ConstructedRootMismatch { .. })
        ));
    }

    #[test]
    fn test_every_leaf_verifies() {
        for n in 1..=17 {
            let tree = leaves(n);
            let root = hash_full_tree_with_leaf_hashes(&tree).unwrap();
            for i in 0..n {
                let path = audit_path(&tree, i).unwrap();
                assert!(
                    verify_leaf_hash_inclusion(&tree[i], i as u64, &path, &root, n as u64)
                        .unwrap(),
                    "leaf {} of {}",
                    i,
                    n
                );
            }
        }
    }

    #[test]
    fn test_bit_flip_never_verifies() {
        let tree = leaves(11);
        let root = hash_full_tree_with_leaf_hashes(&tree).unwrap();
        for i in 0..tree.len() {
            let path = audit_path(&tree, i).unwrap();
            for j in 0..path.len() {
                let mut tampered = path.clone();
                tampered[j].0[5] ^= 0x10;
                let result =
                    verify_leaf_hash_inclusion(&tree[i], i as u64, &tampered, &root, 11);
                assert!(!matches!(result, Ok(true)));
            }
        }
    }

    #[test]
    fn test_malformed_paths_fail_without_error() {
        let tree = leaves(5);
        let root = hash_full_tree_with_leaf_hashes(&tree).unwrap();
        let path = audit_path(&tree, 2).unwrap();

        let short = &path[..path.len() - 1];
        assert!(!verify_leaf_hash_inclusion(&tree[2], 2, short, &root, 5).unwrap());
        assert_eq!(
            root_from_audit_path(&tree[2], 2, short, 5),
            Err(MerkleError::PathExhausted)
        );

        let mut long = path.clone();
        long.push(H256::ZERO);
        assert!(!verify_leaf_hash_inclusion(&tree[2], 2, &long, &root, 5).unwrap());
        assert_eq!(
            root_from_audit_path(&tree[2], 2, &long, 5),
            Err(MerkleError::UnconsumedPath(1))
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let leaf = hash_leaf(b"x");
        assert_eq!(
            verify_leaf_hash_inclusion(&leaf, 3, &[], &leaf, 3),
            Err(MerkleError::IndexOutOfRange { index: 3, size: 3 })
        );
        assert!(matches!(
            audit_path(&[leaf], 1),
            Err(MerkleError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_single_leaf_tree() {
        let leaf = hash_leaf(b"only");
        assert_eq!(hash_full_tree_with_leaf_hashes(&[leaf]).unwrap(), leaf);
        assert!(audit_path(&[leaf], 0).unwrap().is_empty());
        assert!(verify_leaf_hash_inclusion(&leaf, 0, &[], &leaf, 1).unwrap());
    }

    #[test]
    fn test_empty_tree_root() {
        assert_eq!(hash_full_tree_with_leaf_hashes(&[]).unwrap(), hash_empty());
    }

    #[test]
    fn test_proof_nodes_fold_to_root() {
        let tree = leaves(6);
        let root = hash_full_tree_with_leaf_hashes(&tree).unwrap();
        let path = audit_path(&tree, 5).unwrap();
        let nodes = proof_nodes(5, &path, 6).unwrap();

        assert_eq!(nodes.len(), path.len());
        assert_eq!(nodes[0].direction, Direction::Left);
        assert!(verify_proof_nodes(&tree[5], &nodes, &root).unwrap());
    }

    #[test]
    fn test_proof_node_json_shape() {
        let node = ProofNode {
            direction: Direction::Right,
            target_hash: H256::ZERO,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["Direction"], "Right");
        assert_eq!(json["TargetHash"], "0".repeat(64));
    }

    #[test]
    fn test_merkle_proof_payload() {
        let tree = leaves(4);
        let root = hash_full_tree_with_leaf_hashes(&tree).unwrap();
        let path = audit_path(&tree, 2).unwrap();

        let json = serde_json::json!({
            "Type": "MerkleProof",
            "TransactionsRoot": tree[2].to_string(),
            "BlockHeight": 2,
            "CurBlockRoot": root.to_string(),
            "CurBlockHeight": 3,
            "TargetHashes": path.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        });
        let proof: MerkleProof = serde_json::from_value(json).unwrap();
        assert!(proof.verify().unwrap());
        assert_eq!(proof.nodes().unwrap().len(), 2);
    }

    #[test]
    fn test_split_point() {
        assert_eq!(split_point(2), 1);
        assert_eq!(split_point(3), 2);
        assert_eq!(split_point(4), 2);
        assert_eq!(split_point(5), 4);
        assert_eq!(split_point(8), 4);
        assert_eq!(split_point(9), 8);
    }
}
