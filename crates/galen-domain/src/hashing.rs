//! Deterministic identifiers
//!
//! Documents and anchors are identified by content hashes so that reloading the
//! same guideline, or anchoring the same text twice, yields the same id.

use sha2::{Digest, Sha256};

/// Number of hex characters kept in a stable id
const ID_HEX_LEN: usize = 16;

/// SHA-256 of `data` as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Build a prefixed identifier from the SHA-256 of `parts`
///
/// Parts are separated by a unit-separator byte so `["ab", "c"]` and
/// `["a", "bc"]` hash differently.
///
/// # Examples
///
/// ```
/// use galen_domain::hashing::stable_id;
///
/// let a = stable_id("anc", &["doc_1", "s1", "ACE inhibitors"]);
/// let b = stable_id("anc", &["doc_1", "s1", "ACE inhibitors"]);
/// assert_eq!(a, b);
/// assert!(a.starts_with("anc_"));
/// ```
pub fn stable_id(prefix: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    let digest = hex::encode(hasher.finalize());
    format!("{}_{}", prefix, &digest[..ID_HEX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_id_is_deterministic() {
        assert_eq!(
            stable_id("doc", &["Title", "NICE", "1.0", "abc"]),
            stable_id("doc", &["Title", "NICE", "1.0", "abc"])
        );
    }

    #[test]
    fn test_stable_id_separates_parts() {
        assert_ne!(stable_id("x", &["ab", "c"]), stable_id("x", &["a", "bc"]));
    }

    #[test]
    fn test_stable_id_length() {
        let id = stable_id("anc", &["a"]);
        assert_eq!(id.len(), "anc_".len() + ID_HEX_LEN);
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
