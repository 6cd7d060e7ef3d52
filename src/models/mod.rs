//! Stored entities, request payloads and explicit patch types.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

pub mod admin;
pub mod company;
pub mod manager;
pub mod provider;
pub mod slot;
pub mod user;
pub mod verification;

pub use admin::{Admin, AdminPatch, NewAdmin};
pub use company::{Company, CompanyPatch, NewCompany};
pub use manager::{Manager, NewManager};
pub use provider::{NewProvider, Provider, ServiceEntry, ServiceRequest};
pub use slot::{AppointmentSlot, BookingRequest, SlotQuery};
pub use user::{NewUser, User, UserAccountPatch, UserPatch};
pub use verification::Verification;

pub const MIN_PASSWORD_LEN: usize = 8;

/// A type stored as one document in a named collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
}

/// An entity that can log in with email and password.
pub trait Account: Document {
    fn id(&self) -> uuid::Uuid;
    fn email(&self) -> &str;
    fn password_hash(&self) -> &str;
}

macro_rules! impl_account {
    ($($ty:ty),+) => {
        $(impl Account for $ty {
            fn id(&self) -> uuid::Uuid {
                self.id
            }
            fn email(&self) -> &str {
                &self.email
            }
            fn password_hash(&self) -> &str {
                &self.password_hash
            }
        })+
    };
}

impl_account!(User, Provider, Manager, Admin);

/// Input rejected before it reaches the store.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn field(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.push(field, reason);
        errors.into_error("Invalid field value")
    }
}

/// Collects per-field problems so a request reports all of them at once.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &str, reason: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| reason.into());
    }

    pub fn check(&mut self, ok: bool, field: &str, reason: &str) {
        if !ok {
            self.push(field, reason);
        }
    }

    pub fn into_error(self, message: &str) -> ValidationError {
        ValidationError {
            message: message.to_string(),
            field_errors: self.errors,
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_error("Validation failed"))
        }
    }
}

/// Trimmed, lower-cased address, or `None` if it cannot be an email.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_ascii_lowercase();
    let (local, domain) = email.split_once('@')?;
    let plausible = !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@');
    plausible.then_some(email)
}

/// Shared checks for account-creating payloads.
pub(crate) fn check_account(errors: &mut FieldErrors, name: &str, email: &str, password: &str) {
    errors.check(!name.trim().is_empty(), "name", "Name is required");
    errors.check(normalize_email(email).is_some(), "email", "A valid email address is required");
    errors.check(
        password.chars().count() >= MIN_PASSWORD_LEN,
        "password",
        "Password must be at least 8 characters",
    );
}

/// Explicit partial update: named optional fields, each listed as mutable.
///
/// Implementors use `deny_unknown_fields` so unexpected keys fail to parse
/// rather than being merged.
pub trait Patch: Serialize + Sized {
    const MUTABLE_FIELDS: &'static [&'static str];

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Validated field changes plus `updated_at`, ready for `update_one`.
    fn into_changes(self, now: DateTime<Utc>) -> Result<Map<String, Value>, ValidationError> {
        self.validate()?;

        let mut changes = match serde_json::to_value(&self) {
            Ok(Value::Object(map)) => map,
            _ => return Err(ValidationError::new("Patch must be a JSON object")),
        };
        changes.retain(|_, value| !value.is_null());

        if changes.is_empty() {
            return Err(ValidationError::new("Patch contains no fields to update"));
        }
        if let Some(field) = changes
            .keys()
            .find(|key| !Self::MUTABLE_FIELDS.contains(&key.as_str()))
        {
            return Err(ValidationError::field(field, "Field is not mutable"));
        }

        changes.insert("updated_at".to_string(), Value::String(now.to_rfc3339()));
        Ok(changes)
    }
}

/// Response wrapper that never emits a stored password hash.
#[derive(Debug)]
pub struct Public<T>(pub T);

impl<T: Serialize> Serialize for Public<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(&self.0).map_err(serde::ser::Error::custom)?;
        if let Value::Object(fields) = &mut value {
            fields.remove("password_hash");
        }
        value.serialize(serializer)
    }
}

pub fn public<T>(items: Vec<T>) -> Vec<Public<T>> {
    items.into_iter().map(Public).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NamePatch {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        phone: Option<String>,
    }

    impl Patch for NamePatch {
        const MUTABLE_FIELDS: &'static [&'static str] = &["name", "phone"];
    }

    #[test]
    fn normalizes_emails() {
        assert_eq!(normalize_email("  Ada@Example.COM ").as_deref(), Some("ada@example.com"));
        assert!(normalize_email("no-at-sign").is_none());
        assert!(normalize_email("a@b").is_none());
        assert!(normalize_email("a b@c.de").is_none());
        assert!(normalize_email("@c.de").is_none());
    }

    #[test]
    fn patch_keeps_only_supplied_fields_and_stamps_update() {
        let patch: NamePatch = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        let changes = patch.into_changes(Utc::now()).unwrap();
        assert_eq!(changes.get("name"), Some(&Value::String("Ada".into())));
        assert!(!changes.contains_key("phone"));
        assert!(changes.contains_key("updated_at"));
    }

    #[test]
    fn empty_patch_is_rejected() {
        let patch: NamePatch = serde_json::from_str("{}").unwrap();
        assert!(patch.into_changes(Utc::now()).is_err());
    }

    #[test]
    fn unknown_fields_do_not_parse() {
        assert!(serde_json::from_str::<NamePatch>(r#"{"password_hash":"x"}"#).is_err());
    }

    #[test]
    fn public_wrapper_strips_password_hash() {
        #[derive(Serialize)]
        struct Account {
            email: &'static str,
            password_hash: &'static str,
        }
        let json = serde_json::to_value(Public(Account { email: "a@b.c", password_hash: "$argon2id$..." })).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "a@b.c" }));
    }

    #[test]
    fn field_errors_collect_first_reason_per_field() {
        let mut errors = FieldErrors::default();
        check_account(&mut errors, "", "bad", "short");
        let err = errors.finish().unwrap_err();
        assert_eq!(err.field_errors.len(), 3);
        assert!(err.field_errors.contains_key("password"));
    }
}
