use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use sha2::Digest;

use crate::error::{MerkleError, Result};
use crate::{HashOf, combine, encode_hex, hash_leaf};

/// Inclusion proof for a single leaf.
///
/// Holds the sibling digests met on the walk from the leaf to the root, bottom-up. Levels
/// where the walked node was the promoted, unpaired digest contribute nothing, so a proof
/// can be shorter than the tree is tall.
///
/// ```
/// use merkle_proof::{MerkleTree, Sha256, hash_leaf};
///
/// let tree = MerkleTree::<Sha256>::build([b"a", b"b", b"c", b"d"]).unwrap();
/// let proof = tree.proof(2).unwrap();
///
/// assert_eq!(proof.len(), 2);
/// assert!(proof.verify(&hash_leaf::<Sha256>(b"c"), &tree.root()));
/// assert!(!proof.verify(&hash_leaf::<Sha256>(b"a"), &tree.root()));
/// ```
pub struct Proof<H>
where
    H: Digest + Clone,
{
    siblings: Vec<HashOf<H>>,
}

impl<H> Proof<H>
where
    H: Digest + Clone,
{
    /// Wraps an ordered list of sibling digests.
    #[inline(always)]
    pub fn new(siblings: Vec<HashOf<H>>) -> Self {
        Self { siblings }
    }

    /// Sibling digests from leaf to root.
    #[inline(always)]
    pub fn siblings(&self) -> &[HashOf<H>] {
        &self.siblings
    }

    /// Consumes the proof and returns its sibling digests.
    #[inline(always)]
    pub fn into_siblings(self) -> Vec<HashOf<H>> {
        self.siblings
    }

    /// Number of sibling digests.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// Returns `true` for the proof of a single-leaf tree.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Checks the proof for an already hashed leaf against `root`.
    #[inline]
    pub fn verify(&self, leaf: &HashOf<H>, root: &HashOf<H>) -> bool {
        verify_proof::<H>(&self.siblings, root, leaf)
    }

    /// Hashes `element` as a leaf and checks the proof against `root`.
    #[inline]
    pub fn verify_element(&self, element: &[u8], root: &HashOf<H>) -> bool {
        self.verify(&hash_leaf::<H>(element), root)
    }

    /// Fixed-stride encoding: the sibling digests concatenated without delimiters.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.siblings.len() * <H as Digest>::output_size());
        for sibling in &self.siblings {
            out.extend_from_slice(sibling.as_ref());
        }
        out
    }

    /// Decodes the [`Proof::to_bytes`] form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let width = <H as Digest>::output_size();
        if bytes.len() % width != 0 {
            return Err(MerkleError::MalformedProof {
                len: bytes.len(),
                width,
            });
        }
        let siblings = bytes
            .chunks_exact(width)
            .map(HashOf::<H>::clone_from_slice)
            .collect();
        Ok(Self { siblings })
    }

    /// `0x`-prefixed hex of [`Proof::to_bytes`].
    pub fn to_hex(&self) -> String {
        let mut out = String::from("0x");
        out.push_str(&hex::encode(self.to_bytes()));
        out
    }

    /// Decodes [`Proof::to_hex`] output. The `0x` prefix is optional.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let digits = encoded.strip_prefix("0x").unwrap_or(encoded);
        let bytes = hex::decode(digits).map_err(MerkleError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }
}

impl<H> Clone for Proof<H>
where
    H: Digest + Clone,
{
    fn clone(&self) -> Self {
        Self {
            siblings: self.siblings.clone(),
        }
    }
}

impl<H> PartialEq for Proof<H>
where
    H: Digest + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.siblings == other.siblings
    }
}

impl<H> Eq for Proof<H> where H: Digest + Clone {}

impl<H> fmt::Debug for Proof<H>
where
    H: Digest + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.siblings.iter().map(encode_hex))
            .finish()
    }
}

/// Recomputes the root from `leaf` and `proof` and compares it with `root`.
///
/// Each proof element is folded in with [`combine`], the same rule the builder uses. The
/// function never fails: a proof of the wrong length, a tampered sibling and a leaf that
/// is not in the tree all look the same to the caller, they return `false`.
///
/// ```
/// use merkle_proof::{Sha256, build_tree, hash_leaf, verify_proof};
///
/// let (root, tree) = build_tree::<Sha256, _, _>(["a", "b", "c"]).unwrap();
/// let proof = tree.proof(0).unwrap();
/// let leaf = hash_leaf::<Sha256>(b"a");
///
/// assert!(verify_proof::<Sha256>(proof.siblings(), &root, &leaf));
/// assert!(!verify_proof::<Sha256>(&proof.siblings()[..1], &root, &leaf));
/// ```
pub fn verify_proof<H>(proof: &[HashOf<H>], root: &HashOf<H>, leaf: &HashOf<H>) -> bool
where
    H: Digest + Clone,
{
    let computed = proof
        .iter()
        .fold(leaf.clone(), |acc, sibling| combine::<H>(&acc, sibling));
    &computed == root
}

/// Verifies a proof given as packed, fixed-width digests.
///
/// Returns `false` when the byte length is not a whole number of digests, without ever
/// reporting why.
pub fn verify_packed_proof<H>(proof: &[u8], root: &HashOf<H>, leaf: &HashOf<H>) -> bool
where
    H: Digest + Clone,
{
    let width = <H as Digest>::output_size();
    if proof.len() % width != 0 {
        return false;
    }
    let computed = proof.chunks_exact(width).fold(leaf.clone(), |acc, chunk| {
        combine::<H>(&acc, HashOf::<H>::from_slice(chunk))
    });
    &computed == root
}
