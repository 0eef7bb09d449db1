#![no_std]
#![cfg_attr(not(test), deny(missing_docs))]

//! Binary Merkle trees with sorted-pair hashing and compact inclusion proofs.
//!
//! A [`MerkleTree`] is built once over an ordered list of elements. Every element is hashed
//! into a leaf, then each level is reduced pairwise, left to right, until a single root digest
//! remains. The tree only keeps its digest levels around so that inclusion [`Proof`]s can be
//! cut from it; callers usually keep the root and ship proofs to verifiers that never see
//! the data set.
//!
//! Two rules are fixed crate-wide and shared by the builder and the verifier:
//!
//! * **Sorted pairs.** A parent is `H(min(a, b) || max(a, b))`, comparing the child digests
//!   byte-lexicographically (see [`combine`]). Proofs therefore carry no left/right flags.
//! * **Promotion.** When a level has an odd number of digests the last one is carried up to
//!   the next level unchanged, and contributes no proof element for that level.
//!
//! The digest is injected as a type parameter implementing [`Digest`]. [`Sha256`] is the
//! default; [`Keccak256`] reproduces the commitments checked by EVM contracts.
//!
//! # Complexity
//!
//! * [`MerkleTree::build`] – `O(n)` hash invocations and `O(n)` space for the levels.
//! * [`MerkleTree::proof`] – `O(log n)` time and proof size.
//! * [`verify_proof`] – `O(log n)` hash invocations, no allocation.
//!
//! # Examples
//!
//! ```
//! use merkle_proof::{MerkleTree, Sha256, hash_leaf, verify_proof};
//!
//! let tree = MerkleTree::<Sha256>::build(["alice", "bob", "carol"]).unwrap();
//! let root = tree.root();
//! let proof = tree.proof(1).unwrap();
//!
//! assert!(verify_proof::<Sha256>(proof.siblings(), &root, &hash_leaf::<Sha256>(b"bob")));
//! ```

extern crate alloc;

mod error;
mod proof;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use sha2::digest::Output;
use tracing::{debug, trace};

pub use error::{MerkleError, Result};
pub use proof::{Proof, verify_packed_proof, verify_proof};
pub use sha2::{Digest, Sha256};
pub use sha3::Keccak256;

/// Digest output of the hasher `H`.
pub type HashOf<H> = Output<H>;

/// Digest output for the default [`Sha256`] hasher.
pub type Sha256Hash = Output<Sha256>;

/// Digest output for [`Keccak256`].
pub type Keccak256Hash = Output<Keccak256>;

/// How leaf digests are arranged before the tree is reduced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LeafOrder {
    /// Keep the caller's order, duplicates included. Leaf order is part of the commitment.
    #[default]
    Preserve,
    /// Sort leaf digests byte-lexicographically and drop duplicates, so the root depends
    /// only on the set of elements.
    SortedUnique,
}

/// Binary Merkle tree over a fixed, non-empty list of leaves.
///
/// Levels are stored bottom-up: `levels()[0]` are the leaf digests and the last level holds
/// only the root.
///
/// # Examples
///
/// ```
/// use merkle_proof::{MerkleTree, MerkleError, Sha256};
///
/// let tree = MerkleTree::<Sha256>::build([b"a", b"b", b"c", b"d"]).unwrap();
/// assert_eq!(tree.leaf_count(), 4);
/// assert_eq!(tree.height(), 3);
///
/// let proof = tree.proof_for(b"a").unwrap();
/// assert!(proof.verify_element(b"a", &tree.root()));
///
/// assert_eq!(
///     tree.proof(4).unwrap_err(),
///     MerkleError::IndexOutOfRange { index: 4, len: 4 }
/// );
/// ```
pub struct MerkleTree<H = Sha256>
where
    H: Digest + Clone,
{
    levels: Vec<Vec<HashOf<H>>>,
    root: HashOf<H>,
    order: LeafOrder,
}

impl<H> MerkleTree<H>
where
    H: Digest + Clone,
{
    /// Hashes every element into a leaf and builds the tree in the given order.
    ///
    /// Returns [`MerkleError::EmptyTree`] when `elements` yields nothing.
    #[inline]
    pub fn build<I, E>(elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: AsRef<[u8]>,
    {
        Self::build_with(elements, LeafOrder::Preserve)
    }

    /// Like [`MerkleTree::build`], arranging the leaves according to `order`.
    pub fn build_with<I, E>(elements: I, order: LeafOrder) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: AsRef<[u8]>,
    {
        let leaves = elements
            .into_iter()
            .map(|element| hash_leaf::<H>(element.as_ref()))
            .collect();
        Self::from_leaf_digests(leaves, order)
    }

    /// Builds the tree from leaf digests the caller already computed.
    pub fn from_leaf_digests(mut leaves: Vec<HashOf<H>>, order: LeafOrder) -> Result<Self> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }
        if order == LeafOrder::SortedUnique {
            leaves.sort_unstable_by(|a, b| a.as_slice().cmp(b.as_slice()));
            leaves.dedup();
        }

        let leaf_count = leaves.len();
        let mut levels = Vec::with_capacity(tree_height(leaf_count));
        let mut current = leaves;
        while current.len() > 1 {
            let next = reduce_level::<H>(&current);
            levels.push(current);
            current = next;
        }
        let root = current[0].clone();
        levels.push(current);

        debug!(
            leaves = leaf_count,
            height = levels.len(),
            ?order,
            root = %encode_hex(&root),
            "built merkle tree"
        );

        Ok(Self {
            levels,
            root,
            order,
        })
    }

    /// Root digest committing to every leaf.
    #[inline(always)]
    pub fn root(&self) -> HashOf<H> {
        self.root.clone()
    }

    /// Leaf digests in tree order.
    #[inline(always)]
    pub fn leaves(&self) -> &[HashOf<H>] {
        &self.levels[0]
    }

    /// All digest levels, leaves first, root last.
    #[inline(always)]
    pub fn levels(&self) -> &[Vec<HashOf<H>>] {
        &self.levels
    }

    /// Number of leaves. Always at least one.
    #[inline(always)]
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of levels, counting the leaf level and the root level.
    #[inline(always)]
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Leaf ordering the tree was built with.
    #[inline(always)]
    pub fn order(&self) -> LeafOrder {
        self.order
    }

    /// Index of the first leaf equal to `leaf`, if any.
    pub fn position(&self, leaf: &HashOf<H>) -> Option<usize> {
        let leaves = self.leaves();
        match self.order {
            LeafOrder::SortedUnique => leaves
                .binary_search_by(|probe| probe.as_slice().cmp(leaf.as_slice()))
                .ok(),
            LeafOrder::Preserve => leaves.iter().position(|probe| probe == leaf),
        }
    }

    /// Extracts the inclusion proof for the leaf at `index`.
    ///
    /// Walks the levels bottom-up collecting the sibling of the current node. A node with no
    /// sibling (the promoted last digest of an odd level) adds nothing for that level.
    pub fn proof(&self, index: usize) -> Result<Proof<H>> {
        let len = self.leaf_count();
        if index >= len {
            return Err(MerkleError::IndexOutOfRange { index, len });
        }

        let mut position = index;
        let mut siblings = Vec::with_capacity(self.levels.len() - 1);
        for level in &self.levels {
            if let Some(sibling) = level.get(position ^ 1) {
                siblings.push(sibling.clone());
            }
            position /= 2;
        }

        trace!(index, siblings = siblings.len(), "extracted merkle proof");
        Ok(Proof::new(siblings))
    }

    /// Extracts the proof for `element`, hashing it as a leaf first.
    ///
    /// When the element occurs more than once the first occurrence is used. Returns
    /// [`MerkleError::UnknownLeaf`] when it is not in the tree.
    pub fn proof_for<E>(&self, element: E) -> Result<Proof<H>>
    where
        E: AsRef<[u8]>,
    {
        let leaf = hash_leaf::<H>(element.as_ref());
        let index = self.position(&leaf).ok_or(MerkleError::UnknownLeaf)?;
        self.proof(index)
    }
}

impl<H> Clone for MerkleTree<H>
where
    H: Digest + Clone,
{
    fn clone(&self) -> Self {
        Self {
            levels: self.levels.clone(),
            root: self.root.clone(),
            order: self.order,
        }
    }
}

impl<H> fmt::Debug for MerkleTree<H>
where
    H: Digest + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleTree")
            .field("root", &encode_hex(&self.root))
            .field("leaves", &self.leaf_count())
            .field("height", &self.height())
            .field("order", &self.order)
            .finish()
    }
}

/// Builds a tree over `elements` in their given order and returns its root alongside it.
///
/// The root is also available from [`MerkleTree::root`]; returning it here lets producers
/// publish the commitment and drop the tree once the proofs they need are extracted.
#[inline]
pub fn build_tree<H, I, E>(elements: I) -> Result<(HashOf<H>, MerkleTree<H>)>
where
    H: Digest + Clone,
    I: IntoIterator<Item = E>,
    E: AsRef<[u8]>,
{
    let tree = MerkleTree::<H>::build(elements)?;
    Ok((tree.root(), tree))
}

/// Hashes a raw element into a leaf digest.
///
/// Leaves carry no domain tag, so a 64-byte element equal to the sorted concatenation of two
/// sibling digests hashes to their parent and verifies as a leaf one level up; callers
/// accepting untrusted elements should fix their length or tag them before hashing.
#[inline(always)]
pub fn hash_leaf<H: Digest>(element: &[u8]) -> HashOf<H> {
    H::digest(element)
}

/// Combines two child digests into their parent.
///
/// The children are ordered byte-lexicographically before hashing, so
/// `combine(a, b) == combine(b, a)`. Builder and verifier both go through this function.
#[inline(always)]
pub fn combine<H: Digest>(a: &HashOf<H>, b: &HashOf<H>) -> HashOf<H> {
    let (low, high) = if a.as_slice() <= b.as_slice() {
        (a, b)
    } else {
        (b, a)
    };

    let mut hasher = H::new();
    hasher.update(low.as_slice());
    hasher.update(high.as_slice());
    hasher.finalize()
}

/// `0x`-prefixed lowercase hex of a digest.
pub fn encode_hex<D: AsRef<[u8]>>(digest: D) -> String {
    let mut out = String::from("0x");
    out.push_str(&hex::encode(digest));
    out
}

fn reduce_level<H: Digest>(level: &[HashOf<H>]) -> Vec<HashOf<H>> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => combine::<H>(left, right),
            // odd tail, promoted unchanged
            _ => pair[0].clone(),
        })
        .collect()
}

/// `ceil(log2(n)) + 1` for `n >= 1`.
#[inline(always)]
fn tree_height(leaf_count: usize) -> usize {
    leaf_count.next_power_of_two().trailing_zeros() as usize + 1
}
