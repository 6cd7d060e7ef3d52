use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Document, FieldErrors, Patch, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Admin that created the company.
    #[serde(default)]
    pub admin_id: Option<Uuid>,
    #[serde(default)]
    pub services: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Company {
    const COLLECTION: &'static str = "companies";
}

#[derive(Debug, Deserialize)]
pub struct NewCompany {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        errors.check(!self.name.trim().is_empty(), "name", "Company name is required");
        errors.finish()
    }

    pub fn into_company(self, admin_id: Uuid, now: DateTime<Utc>) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            address: self.address,
            phone: self.phone,
            admin_id: Some(admin_id),
            services: self.services,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
}

impl Patch for CompanyPatch {
    const MUTABLE_FIELDS: &'static [&'static str] = &["name", "address", "phone", "services"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();
        if let Some(name) = &self.name {
            errors.check(!name.trim().is_empty(), "name", "Company name cannot be empty");
        }
        errors.finish()
    }
}
