//! Keccak-256 Merkle tree over an allowlist of addresses.
//!
//! Hashes are carried as 64-character lowercase hex strings without a `0x`
//! prefix. A leaf is the hash of the address text exactly as listed, and a
//! parent is the hash of its two children's hex strings concatenated. Nodes
//! are paired left to right on each level; an odd trailing node moves up
//! unchanged.

use alloy_primitives::{hex, keccak256};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while building a tree.
#[derive(Debug, Error)]
pub enum MerkleError {
	#[error("Cannot build a Merkle tree from an empty address list")]
	Empty,
	#[error("Failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// A node of the tree. Leaves have no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerkleNode {
	pub hash: String,
	pub left: Option<Box<MerkleNode>>,
	pub right: Option<Box<MerkleNode>>,
}

impl MerkleNode {
	fn leaf(hash: String) -> Self {
		Self {
			hash,
			left: None,
			right: None,
		}
	}

	fn parent(left: MerkleNode, right: MerkleNode) -> Self {
		Self {
			hash: hash_pair(&left.hash, &right.hash),
			left: Some(Box::new(left)),
			right: Some(Box::new(right)),
		}
	}

	pub fn is_leaf(&self) -> bool {
		self.left.is_none() && self.right.is_none()
	}
}

/// Which side of the pair a proof sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
	Left,
	Right,
}

/// One sibling on the path from a leaf to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofStep {
	pub hash: String,
	pub side: Side,
}

/// Hash of a single address as listed.
pub fn leaf_hash(address: &str) -> String {
	hex::encode(keccak256(address.as_bytes()))
}

fn hash_pair(left: &str, right: &str) -> String {
	let mut data = String::with_capacity(left.len() + right.len());
	data.push_str(left);
	data.push_str(right);
	hex::encode(keccak256(data.as_bytes()))
}

/// Reads one address per line, skipping blank lines.
pub fn read_addresses(path: impl AsRef<Path>) -> Result<Vec<String>, MerkleError> {
	let path = path.as_ref();
	let content = std::fs::read_to_string(path).map_err(|source| MerkleError::Io {
		path: path.to_path_buf(),
		source,
	})?;

	Ok(content
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(str::to_string)
		.collect())
}

/// A complete tree built from an ordered address list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MerkleTree {
	root: MerkleNode,
}

impl MerkleTree {
	pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Result<Self, MerkleError> {
		let mut level: Vec<MerkleNode> = addresses
			.iter()
			.map(|address| MerkleNode::leaf(leaf_hash(address.as_ref())))
			.collect();
		if level.is_empty() {
			return Err(MerkleError::Empty);
		}

		while level.len() > 1 {
			let mut next = Vec::with_capacity(level.len().div_ceil(2));
			let mut nodes = level.into_iter();
			while let Some(left) = nodes.next() {
				match nodes.next() {
					Some(right) => next.push(MerkleNode::parent(left, right)),
					None => next.push(left),
				}
			}
			level = next;
		}

		let root = level.remove(0);
		debug!(leaves = addresses.len(), root = %root.hash, "Built Merkle tree");
		Ok(Self { root })
	}

	pub fn root(&self) -> &str {
		&self.root.hash
	}

	pub fn node(&self) -> &MerkleNode {
		&self.root
	}

	/// Sibling hashes from the leaf for `address` up to the root.
	///
	/// Returns `None` when `address` is not in the tree.
	pub fn proof(&self, address: &str) -> Option<Vec<ProofStep>> {
		let target = leaf_hash(address);
		let mut proof = Vec::new();
		collect_proof(&self.root, &target, &mut proof).then_some(proof)
	}

	/// Pretty-printed JSON of the whole tree.
	pub fn to_json_pretty(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(&self.root)
	}
}

fn collect_proof(node: &MerkleNode, target: &str, proof: &mut Vec<ProofStep>) -> bool {
	if node.is_leaf() {
		return node.hash == target;
	}

	if let (Some(left), Some(right)) = (&node.left, &node.right) {
		if collect_proof(left, target, proof) {
			proof.push(ProofStep {
				hash: right.hash.clone(),
				side: Side::Right,
			});
			return true;
		}
		if collect_proof(right, target, proof) {
			proof.push(ProofStep {
				hash: left.hash.clone(),
				side: Side::Left,
			});
			return true;
		}
	}
	false
}

/// Recomputes the root from `leaf` and `proof` and compares it with `root`.
pub fn verify(leaf: &str, proof: &[ProofStep], root: &str) -> bool {
	let computed = proof.iter().fold(leaf.to_string(), |acc, step| match step.side {
		Side::Left => hash_pair(&step.hash, &acc),
		Side::Right => hash_pair(&acc, &step.hash),
	});
	computed == root
}
