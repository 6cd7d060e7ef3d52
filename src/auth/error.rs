use thiserror::Error;

use super::Role;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token role '{actual}' does not satisfy the '{expected}' gate")]
    WrongRole { expected: Role, actual: Role },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No signing secret configured for role '{0}'")]
    MissingSecret(Role),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
