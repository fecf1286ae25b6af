//! Deterministic canonical IRI minting.
//!
//! A minted IRI is `<namespace><prefix><hex>` where `hex` is the 16-digit
//! lowercase xxHash64 of the domain tag, a unit separator, and the key.
//! The domain tag is the entity type name (or `<Type>Authority` for
//! authority resources), so identical keys of different types never mint
//! the same IRI. No state is involved: the same inputs mint the same IRI in
//! every run and every partition.

use xxhash_rust::xxh64::xxh64;

/// Separates the domain tag from the key in the hashed buffer.
const DOMAIN_SEPARATOR: u8 = 0x1F;

/// Hashes a key within a domain.
#[must_use]
pub fn key_hash(domain: &str, key: &str) -> u64 {
    let mut buf = Vec::with_capacity(domain.len() + 1 + key.len());
    buf.extend_from_slice(domain.as_bytes());
    buf.push(DOMAIN_SEPARATOR);
    buf.extend_from_slice(key.as_bytes());
    xxh64(&buf, 0)
}

/// Mints the canonical IRI for `key`, or `None` for an empty key.
#[must_use]
pub fn mint(namespace: &str, prefix: &str, domain: &str, key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    Some(format!("{namespace}{prefix}{:016x}", key_hash(domain, key)))
}
