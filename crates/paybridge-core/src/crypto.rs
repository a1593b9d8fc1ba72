//! Cryptographic helpers for webhook signatures.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 over `message` and return the lowercase hex digest.
///
/// The message is taken as raw bytes so a webhook body is signed exactly
/// as it arrived on the wire.
///
/// # Panics
///
/// Never in practice: HMAC-SHA256 accepts keys of any size per RFC 2104.
#[must_use]
pub fn hmac_sha256_hex(secret: &[u8], message: &[&[u8]]) -> String {
    // INVARIANT: `new_from_slice` only fails for fixed-size-key MACs.
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts any key size");
    for part in message {
        mac.update(part);
    }
    hex::encode(mac.finalize().into_bytes())
}

/// Compare two byte strings without short-circuiting on the first difference.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
