//! Webhook signature verification using HMAC-SHA256.
//!
//! Both providers sign the exact request body with a shared secret and send
//! the hex digest in a header. The source-control host prefixes it with the
//! algorithm (`sha256=<hex>`); the tracker sends the bare digest. The expected
//! encoding is carried by [`SignatureFormat`].

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::SignatureFormat;

type HmacSha256 = Hmac<Sha256>;

/// Parses a signature header value into raw digest bytes.
///
/// Returns `None` for a missing prefix or invalid hex. Never panics.
pub fn parse_signature_header(header: &str, format: SignatureFormat) -> Option<Vec<u8>> {
    let hex_sig = match format {
        SignatureFormat::Prefixed(prefix) => header.strip_prefix(prefix)?,
        SignatureFormat::BareHex => header,
    };
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 of `payload` under `secret`.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a digest the way the provider would send it.
pub fn format_signature_header(signature: &[u8], format: SignatureFormat) -> String {
    match format {
        SignatureFormat::Prefixed(prefix) => format!("{prefix}{}", hex::encode(signature)),
        SignatureFormat::BareHex => hex::encode(signature),
    }
}

/// Verifies a claimed signature against the raw body.
///
/// An absent claim verifies: whether unsigned deliveries are acceptable is a
/// per-provider [`crate::SignaturePolicy`] decision made before this call.
/// A present claim must be the full digest; the comparison is constant-time
/// and a truncated or prefix-only digest never matches.
pub fn verify(secret: &[u8], body: &[u8], claimed: Option<&str>, format: SignatureFormat) -> bool {
    let Some(claimed) = claimed else {
        return true;
    };

    let Some(expected) = parse_signature_header(claimed.trim(), format) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);

    // verify_slice rejects tags shorter than the digest.
    mac.verify_slice(&expected).is_ok()
}
