//! SHA-256 and HMAC-SHA256 hex digest helpers.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

fn keyed(secret: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length")
}

/// Compute an HMAC-SHA256 over `payload` keyed with `secret`, hex encoded.
pub fn hmac_sha256_hex(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = keyed(secret);
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a hex signature from [`hmac_sha256_hex`] in constant time.
///
/// A signature that is not valid hex, or has the wrong length, fails.
pub fn verify_hmac_sha256_hex(secret: &[u8], payload: &[u8], signature: &str) -> bool {
    let Ok(signature) = hex::decode(signature) else {
        return false;
    };
    let mut mac = keyed(secret);
    mac.update(payload);
    mac.verify_slice(&signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        let hash = sha256_hex(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn consistent_output() {
        let data = b"hello world";
        assert_eq!(sha256_hex(data), sha256_hex(data));
        assert_eq!(sha256_hex(data).len(), 64);
    }

    #[test]
    fn hmac_depends_on_secret() {
        let a = hmac_sha256_hex(b"secret_a", b"payload");
        let b = hmac_sha256_hex(b"secret_b", b"payload");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn signature_verifies_only_with_its_secret_and_payload() {
        let signature = hmac_sha256_hex(b"secret", b"payload");
        assert!(verify_hmac_sha256_hex(b"secret", b"payload", &signature));
        assert!(verify_hmac_sha256_hex(b"secret", b"payload", &signature.to_uppercase()));
        assert!(!verify_hmac_sha256_hex(b"other", b"payload", &signature));
        assert!(!verify_hmac_sha256_hex(b"secret", b"payload2", &signature));
    }

    #[test]
    fn malformed_signatures_fail() {
        let signature = hmac_sha256_hex(b"secret", b"payload");
        assert!(!verify_hmac_sha256_hex(b"secret", b"payload", &signature[..62]));
        assert!(!verify_hmac_sha256_hex(b"secret", b"payload", "zz"));
        assert!(!verify_hmac_sha256_hex(b"secret", b"payload", ""));
    }
}
