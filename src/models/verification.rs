use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::Document;

/// Outstanding or consumed email verification code. Only the code's digest
/// is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Document for Verification {
    const COLLECTION: &'static str = "verifications";
}

impl Verification {
    pub fn new(user_id: Uuid, email: String, code: &str, now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            email,
            code_hash: hash_code(code),
            expires_at: now + ttl,
            verified: false,
            verified_at: None,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn matches(&self, code: &str) -> bool {
        self.code_hash == hash_code(code.trim())
    }
}

pub fn hash_code(code: &str) -> String {
    format!("{:x}", Sha256::digest(code.as_bytes()))
}
