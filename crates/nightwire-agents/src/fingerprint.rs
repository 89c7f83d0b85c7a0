//! Agent fingerprints.
//!
//! An agent's permanent fingerprint is derived once from its short uid and
//! never changes. The player only sees it after a successful recon reveal or
//! after the agent is removed; until then the visible fingerprint is
//! [`UNRESOLVED`]. This is a flavor mechanism, not a security primitive.

use sha2::{Digest, Sha256};

/// What the player sees before a fingerprint is revealed.
pub const UNRESOLVED: &str = "UNKNOWN";

/// Number of hex characters kept from the digest.
const FINGERPRINT_LEN: usize = 12;

/// Permanent fingerprint for a short uid: the first twelve hex characters of
/// its SHA-256 digest, uppercased.
pub fn permanent_fingerprint(short_uid: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(short_uid.as_bytes());
    let digest = hex::encode_upper(hasher.finalize());
    digest.chars().take(FINGERPRINT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_uppercase() {
        let a = permanent_fingerprint("1a2b3c4d");
        let b = permanent_fingerprint("1a2b3c4d");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_ne!(a, permanent_fingerprint("1a2b3c4e"));
    }

    #[test]
    fn known_digest_prefix() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(permanent_fingerprint("abc"), "BA7816BF8F01");
    }
}
