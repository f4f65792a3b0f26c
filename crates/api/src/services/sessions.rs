//! Opaque session tokens, bound to accounts server-side.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use brightspoke_core::AccountId;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use rand::RngCore;

/// What a token resolves to.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub account_id: AccountId,
    pub issued_at: DateTime<Utc>,
}

/// Mints and resolves session tokens.
///
/// Tokens are 32 bytes from the OS-seeded CSPRNG, base64url encoded. They
/// encode nothing; the token-to-account binding lives only in this cache,
/// so a token a client invents resolves to nothing. Sessions do not expire
/// here, but the cache is bounded so the oldest bindings fall out under
/// pressure rather than growing without limit.
pub struct SessionIssuer {
    sessions: Cache<String, SessionClaims>,
}

impl SessionIssuer {
    const TOKEN_BYTES: usize = 32;
    const MAX_SESSIONS: u64 = 100_000;

    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Cache::new(Self::MAX_SESSIONS),
        }
    }

    /// Mint a fresh token for an account. Every call yields a new,
    /// independently valid token.
    pub async fn issue(&self, account_id: AccountId) -> String {
        let mut bytes = [0_u8; Self::TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let claims = SessionClaims {
            account_id,
            issued_at: Utc::now(),
        };
        self.sessions.insert(token.clone(), claims).await;

        token
    }

    /// Resolve a presented token to the claims it was minted with.
    pub async fn resolve(&self, token: &str) -> Option<SessionClaims> {
        self.sessions.get(token).await
    }
}

impl Default for SessionIssuer {
    fn default() -> Self {
        Self::new()
    }
}
