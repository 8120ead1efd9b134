//! Salted password hashing.
//!
//! Hashes are self-describing strings:
//!
//! ```text
//! $sha256$<cost>$<salt hex>$<digest hex>
//! ```
//!
//! The digest is SHA-256 over `salt || password`, then re-hashed with the
//! password `2^cost - 1` more times. The cost is stored with the hash so a
//! hash keeps verifying after the configured cost changes.

use anyhow::{anyhow, bail, Context, Result};
use rand::RngCore;
use sha2::{Digest, Sha256};

pub const DEFAULT_COST: u32 = 10;
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 20;

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    check_cost(cost)?;

    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let digest = derive(password.as_bytes(), &salt, cost);
    Ok(format!(
        "${SCHEME}${cost}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    ))
}

/// Checks `password` against an encoded hash.
///
/// `Ok(false)` means a well-formed hash that does not match; a malformed
/// hash is an error.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool> {
    let parsed = ParsedHash::parse(encoded)?;
    let digest = derive(password.as_bytes(), &parsed.salt, parsed.cost);

    Ok(constant_time_eq(&digest, &parsed.digest))
}

struct ParsedHash {
    cost: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl ParsedHash {
    fn parse(encoded: &str) -> Result<Self> {
        let body = encoded
            .strip_prefix('$')
            .ok_or_else(|| anyhow!("password hash has no scheme prefix"))?;

        let mut parts = body.split('$');
        let (Some(scheme), Some(cost), Some(salt), Some(digest), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            bail!("password hash has the wrong number of sections");
        };

        if scheme != SCHEME {
            bail!("unsupported password hash scheme {scheme:?}");
        }

        let cost: u32 = cost.parse().context("invalid password hash cost")?;
        check_cost(cost)?;

        let salt = hex::decode(salt).context("invalid password hash salt")?;
        let digest = hex::decode(digest).context("invalid password hash digest")?;
        if digest.len() != DIGEST_LEN {
            bail!("password hash digest has {} bytes", digest.len());
        }

        Ok(Self { cost, salt, digest })
    }
}

fn check_cost(cost: u32) -> Result<()> {
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        bail!("password hash cost {cost} outside {MIN_COST}..={MAX_COST}");
    }
    Ok(())
}

fn derive(password: &[u8], salt: &[u8], cost: u32) -> [u8; DIGEST_LEN] {
    let mut digest = Sha256::new()
        .chain_update(salt)
        .chain_update(password)
        .finalize();

    for _ in 1..(1u64 << cost) {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(password)
            .finalize();
    }

    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&digest);
    out
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost keeps the tests fast.
    const TEST_COST: u32 = MIN_COST;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("hunter2", TEST_COST).unwrap();

        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_hash_format() {
        let hash = hash_password("secret", TEST_COST).unwrap();
        let sections: Vec<&str> = hash.split('$').collect();

        assert_eq!(sections.len(), 5);
        assert_eq!(sections[0], "");
        assert_eq!(sections[1], "sha256");
        assert_eq!(sections[2], TEST_COST.to_string());
        assert_eq!(sections[3].len(), SALT_LEN * 2);
        assert_eq!(sections[4].len(), DIGEST_LEN * 2);
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let first = hash_password("secret", TEST_COST).unwrap();
        let second = hash_password("secret", TEST_COST).unwrap();

        assert_ne!(first, second);
        assert!(verify_password("secret", &first).unwrap());
        assert!(verify_password("secret", &second).unwrap());
    }

    #[test]
    fn test_empty_password_is_hashable() {
        let hash = hash_password("", TEST_COST).unwrap();

        assert!(verify_password("", &hash).unwrap());
        assert!(!verify_password(" ", &hash).unwrap());
    }

    #[test]
    fn test_cost_is_read_from_hash() {
        let hash = hash_password("secret", TEST_COST + 1).unwrap();

        assert!(hash.starts_with(&format!("$sha256${}$", TEST_COST + 1)));
        assert!(verify_password("secret", &hash).unwrap());
    }

    #[test]
    fn test_cost_out_of_range_rejected() {
        assert!(hash_password("secret", MIN_COST - 1).is_err());
        assert!(hash_password("secret", MAX_COST + 1).is_err());
    }

    #[test]
    fn test_malformed_hashes_are_errors() {
        let digest = "00".repeat(DIGEST_LEN);
        let cases = [
            String::new(),
            "plaintext".to_string(),
            "$sha256$4$abcd".to_string(),
            format!("$md5$4$abcd${digest}"),
            format!("$sha256$x$abcd${digest}"),
            format!("$sha256$99$abcd${digest}"),
            format!("$sha256$4$zz${digest}"),
            "$sha256$4$abcd$00ff".to_string(),
            format!("$sha256$4$abcd${digest}$extra"),
        ];

        for case in cases {
            assert!(verify_password("secret", &case).is_err(), "{case:?}");
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
