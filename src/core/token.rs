use crate::domain::model::AuthResult;

/// Seconds before the advertised expiry at which a token is treated as stale.
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// A cached SGIS access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// Epoch milliseconds.
    pub expires_at_ms: i64,
}

impl AccessToken {
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.expires_at_ms / 1000 - EXPIRY_MARGIN_SECS < now_secs
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}

impl From<&AuthResult> for AccessToken {
    fn from(result: &AuthResult) -> Self {
        Self {
            token: result.access_token.clone(),
            expires_at_ms: result.access_timeout,
        }
    }
}
