//! File hashing and the text/binary heuristic.
//!
//! Hash stability (testable property 1) requires no line-ending
//! normalization: the hash covers the raw bytes exactly as read.

use sha2::{Digest, Sha256};

pub fn compute_file_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// A file is treated as text when its first 512 bytes decode as valid UTF-8
/// and contain no NUL byte. Short-circuits on the first violation so large
/// binaries are not fully scanned.
pub fn looks_like_text(bytes: &[u8]) -> bool {
    let sample_len = bytes.len().min(512);
    let sample = &bytes[..sample_len];
    if sample.contains(&0) {
        return false;
    }
    std::str::from_utf8(sample).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_for_the_same_bytes() {
        let a = compute_file_hash(b"fn main() {}");
        let b = compute_file_hash(b"fn main() {}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_content() {
        assert_ne!(compute_file_hash(b"a"), compute_file_hash(b"b"));
    }

    #[test]
    fn plain_source_looks_like_text() {
        assert!(looks_like_text(b"fn main() {\n    println!(\"hi\");\n}"));
    }

    #[test]
    fn nul_bytes_are_treated_as_binary() {
        assert!(!looks_like_text(b"\x00\x01\x02binary"));
    }

    #[test]
    fn invalid_utf8_is_treated_as_binary() {
        assert!(!looks_like_text(&[0xff, 0xfe, 0x00, 0x41]));
    }
}
