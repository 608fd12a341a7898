//! Authentication ports.

use uuid::Uuid;

/// Claims carried by an access token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub exp: i64,
}

/// Token service trait for issuing and verifying access tokens.
pub trait TokenService: Send + Sync {
    /// Generate an access token for a user.
    fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<String>,
    ) -> Result<String, AuthError>;

    /// Validate signature, issuer and expiry, and decode the claims.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Access token required")]
    MissingAuth,

    #[error("Token subject no longer exists")]
    UnknownSubject,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Identity lookup failed: {0}")]
    Backend(String),
}
