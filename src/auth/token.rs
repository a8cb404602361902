//! Codec for the compact `who` token.
//!
//! A `who` token is the base32 encoding of `user_ref:client_time_ms:digest`.
//! The digest is rejoined from every remaining field, so a digest that
//! legitimately contains colons survives the round trip.

use data_encoding::BASE32_NOPAD;

use super::error::{AuthError, AuthErrorCode};
use super::models::SignatureToken;

/// Decode a `who` token into its three logical fields.
///
/// Input is case-insensitive and padding is optional. A non-numeric
/// timestamp field is coerced to 0 rather than rejected here; the freshness
/// check rejects it downstream.
pub fn decode(who: &str) -> Result<SignatureToken, AuthError> {
    let normalized = who.trim_end_matches('=').to_ascii_uppercase();
    let bytes = BASE32_NOPAD.decode(normalized.as_bytes()).map_err(|_| {
        AuthError::new(
            AuthErrorCode::Decode,
            "Request token is not valid base32",
            Some("who"),
        )
    })?;
    let decoded = String::from_utf8(bytes).map_err(|_| {
        AuthError::new(
            AuthErrorCode::Decode,
            "Request token payload is not valid UTF-8",
            Some("who"),
        )
    })?;

    let mut fields = decoded.split(':');
    // split always yields at least one item
    let user_ref = fields.next().unwrap_or_default();
    if user_ref.is_empty() {
        return Err(AuthError::new(
            AuthErrorCode::Decode,
            "Request token has no user reference",
            Some("who"),
        ));
    }

    let client_time_ms: i64 = fields.next().unwrap_or_default().parse().unwrap_or(0);
    if client_time_ms < 0 {
        return Err(AuthError::new(
            AuthErrorCode::Decode,
            "Request token timestamp is negative",
            Some("who"),
        ));
    }

    let digest_hash = fields.collect::<Vec<_>>().join(":").to_ascii_lowercase();

    Ok(SignatureToken {
        user_ref: user_ref.to_string(),
        client_time_ms,
        digest_hash,
    })
}

/// Encode the three token fields into a `who` string (inverse of [`decode`]).
///
/// Used by clients and tests; the gate itself only decodes.
pub fn encode(user_ref: &str, client_time_ms: i64, digest_hash: &str) -> String {
    let joined = format!("{}:{}:{}", user_ref, client_time_ms, digest_hash);
    BASE32_NOPAD.encode(joined.as_bytes())
}
