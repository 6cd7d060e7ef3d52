use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_account, normalize_email, Document, FieldErrors, Patch, ValidationError};
use crate::auth::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    #[serde(default)]
    pub company_id: Option<Uuid>,
    /// Grants superuser login; only a superuser can set it.
    #[serde(default)]
    pub super_user: bool,
    #[serde(default)]
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";
}

/// Self-registration payload.
#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewUser {
    /// Returns the normalized email.
    pub fn validate(&self) -> Result<String, ValidationError> {
        let mut errors = FieldErrors::default();
        check_account(&mut errors, &self.name, &self.email, &self.password);
        errors.finish()?;
        normalize_email(&self.email).ok_or_else(|| ValidationError::field("email", "A valid email address is required"))
    }

    pub fn into_user(self, email: String, password_hash: String, now: DateTime<Utc>) -> User {
        User {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            email,
            phone: self.phone,
            password_hash,
            role: Role::User,
            company_id: None,
            super_user: false,
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fields a user may change on their own profile.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Patch for UserPatch {
    const MUTABLE_FIELDS: &'static [&'static str] = &["name", "phone"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        if let Some(name) = &self.name {
            errors.check(!name.trim().is_empty(), "name", "Name cannot be empty");
        }
        errors.finish()
    }
}

/// Fields a superuser may change on any user account.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAccountPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_user: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
}

impl Patch for UserAccountPatch {
    const MUTABLE_FIELDS: &'static [&'static str] =
        &["name", "phone", "company_id", "super_user", "email_verified"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        if let Some(name) = &self.name {
            errors.check(!name.trim().is_empty(), "name", "Name cannot be empty");
        }
        errors.finish()
    }
}
