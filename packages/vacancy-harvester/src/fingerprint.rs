//! Content fingerprinting for description-level dedup.

use sha2::{Digest, Sha256};

/// Fingerprint a vacancy description for duplicate detection.
///
/// SHA-256 over the raw description bytes, lowercase hex. The digest is the
/// correlation key across runs: every stored record carries it in its
/// `description_hash` field and the dedup cache is seeded from those values,
/// so changing the algorithm orphans every previously stored fingerprint.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_same_fingerprint() {
        let a = fingerprint("Looking for a senior Rust engineer");
        let b = fingerprint("Looking for a senior Rust engineer");
        assert_eq!(a, b);
    }

    #[test]
    fn different_text_different_fingerprint() {
        assert_ne!(
            fingerprint("Looking for a senior Rust engineer"),
            fingerprint("Looking for a senior Go engineer")
        );
    }

    #[test]
    fn formatting_changes_the_fingerprint() {
        // Raw bytes are hashed, so whitespace and case are significant.
        assert_ne!(fingerprint("Hello world"), fingerprint("hello  world"));
    }

    #[test]
    fn fingerprint_is_stable_across_versions() {
        // Pinned digest: if this breaks, every stored fingerprint is orphaned.
        assert_eq!(
            fingerprint("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn fingerprint_format() {
        let hash = fingerprint("");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
