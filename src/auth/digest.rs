//! Keyed digest computation and verification.
//!
//! The digest binds the user reference, HTTP method, request path, and
//! client timestamp to the identity's secret:
//!
//! ```text
//! message = lowercase(user_ref + method + trim(path, '/') + client_time_ms)
//! digest  = hex(SHAKE256(HMAC-SHA256(message, secret), 32 bytes))
//! ```
//!
//! Mutating any bound field without recomputing the digest makes
//! verification fail. Comparison is constant-time.

use hmac::Hmac;
use sha2::Sha256;
use sha3::Shake256;
use subtle::ConstantTimeEq;

use super::models::SignatureToken;

type HmacSha256 = Hmac<Sha256>;

/// SHAKE256 output length in bytes (64 lowercase hex chars on the wire).
pub const DIGEST_LEN: usize = 32;

/// Build the message the digest is computed over.
///
/// All fields are concatenated with no separator, then lowercased. The path
/// loses its surrounding slashes so `/tasting` and `tasting` sign the same.
pub fn signing_message(
    user_ref: &str,
    http_method: &str,
    url_path: &str,
    client_time_ms: i64,
) -> String {
    format!(
        "{}{}{}{}",
        user_ref,
        http_method,
        url_path.trim_matches('/'),
        client_time_ms
    )
    .to_lowercase()
}

/// Compute the expected digest for a request tuple, as lowercase hex.
pub fn expected_digest(
    user_ref: &str,
    http_method: &str,
    url_path: &str,
    client_time_ms: i64,
    secret: &[u8],
) -> String {
    let message = signing_message(user_ref, http_method, url_path, client_time_ms);
    let raw = hmac_sha256(secret, message.as_bytes());
    hex::encode(shake256(&raw))
}

/// Verify a decoded token against the request it claims to sign.
///
/// Comparison is constant-time.
pub fn verify(token: &SignatureToken, http_method: &str, url_path: &str, secret: &[u8]) -> bool {
    let expected = expected_digest(
        &token.user_ref,
        http_method,
        url_path,
        token.client_time_ms,
        secret,
    );
    expected
        .as_bytes()
        .ct_eq(token.digest_hash.as_bytes())
        .into()
}

fn hmac_sha256(secret: &[u8], message: &[u8]) -> Vec<u8> {
    use hmac::Mac;
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

fn shake256(input: &[u8]) -> [u8; DIGEST_LEN] {
    use sha3::digest::{ExtendableOutput, Update, XofReader};
    let mut hasher = Shake256::default();
    hasher.update(input);
    let mut out = [0u8; DIGEST_LEN];
    hasher.finalize_xof().read(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"s3cr3t";

    fn signed_token(method: &str, path: &str, client_time_ms: i64) -> SignatureToken {
        SignatureToken {
            user_ref: "abc123".to_string(),
            client_time_ms,
            digest_hash: expected_digest("abc123", method, path, client_time_ms, SECRET),
        }
    }

    #[test]
    fn test_worked_example_message() {
        let message = signing_message("abc123", "POST", "/tasting", 1610000000000);
        assert_eq!(message, "abc123posttasting1610000000000");
    }

    #[test]
    fn test_digest_shape() {
        let digest = expected_digest("abc123", "POST", "/tasting", 1610000000000, SECRET);
        assert_eq!(digest.len(), DIGEST_LEN * 2);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, digest.to_lowercase());
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = expected_digest("abc123", "POST", "/tasting", 1610000000000, SECRET);
        let b = expected_digest("abc123", "POST", "/tasting", 1610000000000, SECRET);
        assert_eq!(a, b);
    }

    #[test]
    fn test_verify_valid_token() {
        let token = signed_token("POST", "/tasting", 1610000000000);
        assert!(verify(&token, "POST", "/tasting", SECRET));
    }

    #[test]
    fn test_path_slashes_are_trimmed() {
        let token = signed_token("POST", "/tasting", 1610000000000);
        assert!(verify(&token, "POST", "tasting/", SECRET));
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let token = signed_token("post", "/tasting", 1610000000000);
        assert!(verify(&token, "POST", "/tasting", SECRET));
    }

    #[test]
    fn test_binding_method() {
        let token = signed_token("POST", "/tasting", 1610000000000);
        assert!(!verify(&token, "GET", "/tasting", SECRET));
    }

    #[test]
    fn test_binding_path() {
        let token = signed_token("POST", "/tasting", 1610000000000);
        assert!(!verify(&token, "POST", "/tasting/42", SECRET));
    }

    #[test]
    fn test_binding_time() {
        let mut token = signed_token("POST", "/tasting", 1610000000000);
        token.client_time_ms += 1;
        assert!(!verify(&token, "POST", "/tasting", SECRET));
    }

    #[test]
    fn test_binding_user_ref() {
        let mut token = signed_token("POST", "/tasting", 1610000000000);
        token.user_ref = "abc124".to_string();
        assert!(!verify(&token, "POST", "/tasting", SECRET));
    }

    #[test]
    fn test_binding_secret() {
        let token = signed_token("POST", "/tasting", 1610000000000);
        assert!(!verify(&token, "POST", "/tasting", b"wrong-secret"));
    }

    #[test]
    fn test_empty_digest_never_verifies() {
        let mut token = signed_token("POST", "/tasting", 1610000000000);
        token.digest_hash.clear();
        assert!(!verify(&token, "POST", "/tasting", SECRET));
    }
}
