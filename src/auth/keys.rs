use std::collections::HashMap;

use crate::config::RoleSecrets;

use super::{AuthError, Role};

/// Role tag to signing key mapping, built once at startup.
#[derive(Clone)]
pub struct RoleKeys {
    secrets: HashMap<Role, Vec<u8>>,
}

impl RoleKeys {
    pub fn new(secrets: impl IntoIterator<Item = (Role, String)>) -> Self {
        Self {
            secrets: secrets
                .into_iter()
                .filter(|(_, secret)| !secret.is_empty())
                .map(|(role, secret)| (role, secret.into_bytes()))
                .collect(),
        }
    }

    pub fn from_config(secrets: &RoleSecrets) -> Self {
        let keys = Self::new([
            (Role::User, secrets.user.clone()),
            (Role::Provider, secrets.provider.clone()),
            (Role::Manager, secrets.manager.clone()),
            (Role::Admin, secrets.admin.clone()),
            (Role::Superuser, secrets.superuser.clone()),
        ]);
        for (a, b) in keys.shared_pairs() {
            tracing::warn!("Roles '{}' and '{}' share a signing secret; their tokens are interchangeable at the signature check", a, b);
        }
        keys
    }

    pub fn secret_for(&self, role: Role) -> Result<&[u8], AuthError> {
        self.secrets
            .get(&role)
            .map(Vec::as_slice)
            .ok_or(AuthError::MissingSecret(role))
    }

    fn shared_pairs(&self) -> Vec<(Role, Role)> {
        let mut pairs = Vec::new();
        for (i, a) in Role::ALL.iter().enumerate() {
            for b in &Role::ALL[i + 1..] {
                if let (Some(x), Some(y)) = (self.secrets.get(a), self.secrets.get(b)) {
                    if x == y {
                        pairs.push((*a, *b));
                    }
                }
            }
        }
        pairs
    }
}

impl std::fmt::Debug for RoleKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut roles: Vec<_> = self.secrets.keys().map(Role::as_str).collect();
        roles.sort_unstable();
        f.debug_struct("RoleKeys").field("roles", &roles).finish()
    }
}
