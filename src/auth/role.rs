use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role tag carried in every claim. Each role is its own gate; there is no
/// ordering between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Provider,
    Manager,
    Admin,
    Superuser,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::User,
        Role::Provider,
        Role::Manager,
        Role::Admin,
        Role::Superuser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Provider => "provider",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::Superuser => "superuser",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "provider" => Ok(Role::Provider),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            "superuser" | "super_user" => Ok(Role::Superuser),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
