use thiserror::Error;

/// Errors surfaced while building a tree or extracting and decoding proofs.
///
/// Verification never produces one of these: a proof that does not fold to the
/// expected root is simply rejected with `false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MerkleError {
    /// A tree was requested over zero elements.
    #[error("cannot build a merkle tree from zero elements")]
    EmptyTree,
    /// A proof was requested for a leaf index the tree does not have.
    #[error("leaf index {index} out of range for tree with {len} leaves")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: usize,
        /// Number of leaves in the tree.
        len: usize,
    },
    /// The element passed to [`MerkleTree::proof_for`](crate::MerkleTree::proof_for) is not a leaf.
    #[error("element is not a leaf of this tree")]
    UnknownLeaf,
    /// An encoded proof is not a whole number of digests.
    #[error("encoded proof of {len} bytes is not a multiple of the {width}-byte digest width")]
    MalformedProof {
        /// Length of the encoded proof in bytes.
        len: usize,
        /// Digest width in bytes.
        width: usize,
    },
    /// A hex encoded proof could not be decoded.
    #[error("invalid hex proof: {0}")]
    InvalidHex(hex::FromHexError),
}

/// Result alias used by the fallible tree operations.
pub type Result<T> = core::result::Result<T, MerkleError>;
