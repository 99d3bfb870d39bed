//! Voter fingerprinting
//!
//! Derives a stable, non-reversible pseudonymous identifier from the
//! caller's network identity. Used only for per-match vote dedup, not
//! identity: multiple voters behind the same address collide by design.

use sha2::{Digest, Sha256};

/// One-way hash of the caller's network identity.
pub fn voter_fingerprint(client_ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(client_ip.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(voter_fingerprint("10.0.0.1"), voter_fingerprint("10.0.0.1"));
    }

    #[test]
    fn fingerprint_differs_per_address() {
        assert_ne!(voter_fingerprint("10.0.0.1"), voter_fingerprint("10.0.0.2"));
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        let fp = voter_fingerprint("203.0.113.7");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
