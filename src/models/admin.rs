use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{normalize_email, Document, FieldErrors, Patch, User, ValidationError, MIN_PASSWORD_LEN};

/// Company administrator. Always backed by an existing user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password_hash: String,
    #[serde(default)]
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Admin {
    const COLLECTION: &'static str = "admins";
}

/// Promote the user with `email`; the admin login gets its own password.
#[derive(Debug, Deserialize)]
pub struct NewAdmin {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub company_id: Option<Uuid>,
}

impl NewAdmin {
    pub fn validate(&self) -> Result<String, ValidationError> {
        let mut errors = FieldErrors::default();
        errors.check(normalize_email(&self.email).is_some(), "email", "A valid email address is required");
        errors.check(
            self.password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "Password must be at least 8 characters",
        );
        errors.finish()?;
        normalize_email(&self.email).ok_or_else(|| ValidationError::field("email", "A valid email address is required"))
    }

    pub fn into_admin(self, user: &User, password_hash: String, now: DateTime<Utc>) -> Admin {
        Admin {
            id: Uuid::new_v4(),
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            password_hash,
            company_id: self.company_id.or(user.company_id),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
}

impl Patch for AdminPatch {
    const MUTABLE_FIELDS: &'static [&'static str] = &["name", "phone", "company_id"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        if let Some(name) = &self.name {
            errors.check(!name.trim().is_empty(), "name", "Name cannot be empty");
        }
        errors.finish()
    }
}
