use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_account, normalize_email, Document, FieldErrors, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password_hash: String,
    pub company_id: Uuid,
    #[serde(default)]
    pub services: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Provider {
    const COLLECTION: &'static str = "providers";
}

impl Provider {
    /// Services in stored order with their removal index.
    pub fn service_entries(&self) -> Vec<ServiceEntry> {
        self.services
            .iter()
            .enumerate()
            .map(|(index, name)| ServiceEntry { index, name: name.clone() })
            .collect()
    }

    /// Appends `service` unless an equal name (ignoring case) is present.
    /// Returns whether the list changed.
    pub fn add_service(&mut self, service: &str) -> bool {
        let service = service.trim();
        if self.services.iter().any(|s| s.eq_ignore_ascii_case(service)) {
            return false;
        }
        self.services.push(service.to_string());
        true
    }

    pub fn remove_service(&mut self, index: usize) -> Result<String, ValidationError> {
        if index >= self.services.len() {
            return Err(ValidationError::field(
                "index",
                format!("Service index {} is out of range (provider has {})", index, self.services.len()),
            ));
        }
        Ok(self.services.remove(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    pub name: String,
}

/// Provider account created by a manager inside the manager's company.
#[derive(Debug, Deserialize)]
pub struct NewProvider {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

impl NewProvider {
    pub fn validate(&self) -> Result<String, ValidationError> {
        let mut errors = FieldErrors::default();
        check_account(&mut errors, &self.name, &self.email, &self.password);
        errors.check(
            self.services.iter().all(|s| !s.trim().is_empty()),
            "services",
            "Service names cannot be empty",
        );
        errors.finish()?;
        normalize_email(&self.email).ok_or_else(|| ValidationError::field("email", "A valid email address is required"))
    }

    pub fn into_provider(self, email: String, password_hash: String, company_id: Uuid, now: DateTime<Utc>) -> Provider {
        let mut provider = Provider {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            email,
            phone: self.phone,
            password_hash,
            company_id,
            services: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        for service in &self.services {
            provider.add_service(service);
        }
        provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Provider {
        let now = Utc::now();
        Provider {
            id: Uuid::new_v4(),
            name: "Pat".into(),
            email: "pat@example.com".into(),
            phone: None,
            password_hash: "h".into(),
            company_id: Uuid::new_v4(),
            services: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn services_are_deduplicated_case_insensitively() {
        let mut p = provider();
        assert!(p.add_service("Haircut"));
        assert!(!p.add_service("haircut "));
        assert!(p.add_service("Shave"));
        assert_eq!(p.services, vec!["Haircut", "Shave"]);
    }

    #[test]
    fn entries_carry_index_and_removal_uses_it() {
        let mut p = provider();
        p.add_service("A");
        p.add_service("B");
        p.add_service("C");
        assert_eq!(p.service_entries()[1], ServiceEntry { index: 1, name: "B".into() });

        assert_eq!(p.remove_service(1).unwrap(), "B");
        assert_eq!(p.services, vec!["A", "C"]);
        assert!(p.remove_service(2).is_err());
    }

    #[test]
    fn initial_services_are_deduplicated() {
        let req = NewProvider {
            name: "Pat".into(),
            email: "pat@example.com".into(),
            password: "long enough".into(),
            phone: None,
            services: vec!["Cut".into(), "cut".into()],
        };
        let email = req.validate().unwrap();
        let p = req.into_provider(email, "h".into(), Uuid::new_v4(), Utc::now());
        assert_eq!(p.services, vec!["Cut"]);
    }
}
