//! Content hashing for Vellum.
//!
//! A single pure function, [`compute_content_hash`], maps bytes to a
//! fixed-width lowercase hex digest under any supported [`HashAlgorithm`].
//! The same function is used when storing documents and when verifying
//! integrity on resolution, so the two can never disagree.

use sha2::{Digest, Sha256, Sha512};
use vellum_types::HashAlgorithm;

/// Hash bytes under the given algorithm.
///
/// Deterministic: identical inputs always yield the identical digest.
/// The output is lowercase hex, 64 characters for sha256/blake3 and 128
/// for sha512.
pub fn compute_content_hash(data: &[u8], algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
        HashAlgorithm::Blake3 => blake3::hash(data).to_hex().to_string(),
    }
}

/// Verify that bytes hash to an expected digest.
///
/// Comparison is case-insensitive on the expected side since URI hashes are
/// normalized to lowercase at parse time.
pub fn verify_content_hash(data: &[u8], algorithm: HashAlgorithm, expected: &str) -> bool {
    compute_content_hash(data, algorithm) == expected.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        let a = compute_content_hash(b"hello world", HashAlgorithm::Sha256);
        let b = compute_content_hash(b"hello world", HashAlgorithm::Sha256);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn known_sha256_vector() {
        // sha256 of the 10 ASCII digits.
        assert_eq!(
            compute_content_hash(b"0123456789", HashAlgorithm::Sha256),
            "84d89877f0d4041efb6bf91a16f0248f2fd573e6af05c19f96bedb9f882f7882"
        );
    }

    #[test]
    fn digest_widths_match_algorithms() {
        for alg in HashAlgorithm::all() {
            let digest = compute_content_hash(b"x", alg);
            assert_eq!(digest.len(), alg.hex_len());
            assert!(digest.bytes().all(|b| b.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn algorithms_disagree_on_same_input() {
        let sha = compute_content_hash(b"content", HashAlgorithm::Sha256);
        let b3 = compute_content_hash(b"content", HashAlgorithm::Blake3);
        assert_ne!(sha, b3);
    }

    #[test]
    fn verify_accepts_uppercase_expected() {
        let digest = compute_content_hash(b"abc", HashAlgorithm::Sha256);
        assert!(verify_content_hash(b"abc", HashAlgorithm::Sha256, &digest.to_uppercase()));
        assert!(!verify_content_hash(b"abd", HashAlgorithm::Sha256, &digest));
    }
}
