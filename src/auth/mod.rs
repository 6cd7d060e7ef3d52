//! Per-role bearer tokens.
//!
//! Every role signs with its own HS256 secret, so a token minted for one role
//! fails the signature check at every other role's gate. The role tag inside
//! the payload is checked as well, which keeps the gates closed even when two
//! roles are misconfigured with the same secret.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::Clock;

pub mod error;
pub mod keys;
pub mod password;
pub mod role;

pub use error::AuthError;
pub use keys::RoleKeys;
pub use password::PasswordHasher;
pub use role::Role;

/// Default claim lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaims {
    /// Subject (entity id of the authenticated user/provider/manager/admin)
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl RoleClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mint a signed claim for `subject` with `role`, valid for `ttl` from `now`.
pub fn issue_claim(
    subject: &str,
    role: Role,
    secret: &[u8],
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<IssuedToken, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret(role));
    }

    let expires_at = now + ttl;
    let claims = RoleClaims {
        sub: subject.to_string(),
        role,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

    Ok(IssuedToken { token, expires_at })
}

/// Verify `token` against the gate for `expected` using that role's secret.
///
/// Expiry is checked against the supplied `now` rather than the wall clock.
pub fn verify_claim(
    token: &str,
    expected: Role,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<RoleClaims, AuthError> {
    if token.trim().is_empty() {
        return Err(AuthError::MissingToken);
    }
    if secret.is_empty() {
        return Err(AuthError::MissingSecret(expected));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<RoleClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::MalformedToken(e.to_string()),
        })?
        .claims;

    if claims.exp <= now.timestamp() {
        return Err(AuthError::Expired);
    }
    if claims.role != expected {
        return Err(AuthError::WrongRole {
            expected,
            actual: claims.role,
        });
    }

    Ok(claims)
}

/// Issues and verifies claims with the configured role keys and clock.
pub struct TokenService {
    keys: RoleKeys,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(keys: RoleKeys, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { keys, ttl, clock }
    }

    pub fn issue(&self, subject: &str, role: Role) -> Result<IssuedToken, AuthError> {
        let secret = self.keys.secret_for(role)?;
        issue_claim(subject, role, secret, self.clock.now(), self.ttl)
    }

    pub fn verify(&self, token: &str, expected: Role) -> Result<RoleClaims, AuthError> {
        let secret = self.keys.secret_for(expected)?;
        verify_claim(token, expected, secret, self.clock.now())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
