use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_account, normalize_email, Document, FieldErrors, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manager {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password_hash: String,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Manager {
    const COLLECTION: &'static str = "managers";
}

#[derive(Debug, Deserialize)]
pub struct NewManager {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub company_id: Uuid,
}

impl NewManager {
    pub fn validate(&self) -> Result<String, ValidationError> {
        let mut errors = FieldErrors::default();
        check_account(&mut errors, &self.name, &self.email, &self.password);
        errors.finish()?;
        normalize_email(&self.email).ok_or_else(|| ValidationError::field("email", "A valid email address is required"))
    }

    pub fn into_manager(self, email: String, password_hash: String, now: DateTime<Utc>) -> Manager {
        Manager {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            email,
            phone: self.phone,
            password_hash,
            company_id: self.company_id,
            created_at: now,
            updated_at: now,
        }
    }
}
