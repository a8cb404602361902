//! Data models for the authentication gate.

/// Route classification, decided by the HTTP layer from the request path.
///
/// Admin routes bypass the replay guard and may use the short-ref bypass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Normal,
    Admin,
}

/// Decoded `who` token fields.
///
/// Lives only for the duration of one authentication call; never cached at
/// process scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureToken {
    pub user_ref: String,
    pub client_time_ms: i64,
    /// Lowercase hex; empty when the client sent no digest
    pub digest_hash: String,
}

/// Per-request descriptor supplied by the HTTP layer.
///
/// Built fresh for every call and never shared across calls.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub http_method: String,
    pub url_path: String,
    /// Raw `who` query parameter; empty when the caller is unauthenticated
    pub raw_who: String,
    pub server_time_ms: i64,
}

/// Result of a successful gate decision.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// The request was signed by the holder of the identity's secret
    Identified(super::identity::Identity),
    /// No `who` token was supplied; some endpoints permit this
    Anonymous,
}

impl AuthOutcome {
    /// The authenticated user reference, if any.
    pub fn user_ref(&self) -> Option<&str> {
        match self {
            AuthOutcome::Identified(identity) => Some(&identity.user_ref),
            AuthOutcome::Anonymous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::Identity;

    #[test]
    fn outcome_user_ref() {
        let identified = AuthOutcome::Identified(Identity {
            user_ref: "abc123".to_string(),
            secret: b"s3cr3t".to_vec(),
        });
        assert_eq!(identified.user_ref(), Some("abc123"));
        assert_eq!(AuthOutcome::Anonymous.user_ref(), None);
    }
}
