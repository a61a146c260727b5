// Authentication & Authorization Ports

use crate::domain::Principal;
use crate::error::{AppError, Result};
use async_trait::async_trait;

/// Resolves auth tokens to principals
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// # Errors
    /// - `AppError::Unauthenticated` if the key is unknown or its user is inactive
    async fn authenticate(&self, key: &str) -> Result<Principal>;
}

/// Answers whether a caller may list tokens of a resource
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn can_list_tokens(&self, resource_id: &str, principal: Option<&Principal>)
        -> Result<bool>;
}

/// Query-parameter authentication semantics.
///
/// No key (or an empty one) means anonymous access; a key that does not
/// resolve is a hard failure.
pub async fn authenticate_optional(
    authenticator: &dyn Authenticator,
    key: Option<&str>,
) -> Result<Option<Principal>> {
    match key.map(str::trim).filter(|k| !k.is_empty()) {
        None => Ok(None),
        Some(key) => authenticator.authenticate(key).await.map(Some),
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Fixed key table and permission grants
    #[derive(Default)]
    pub struct StaticAccessControl {
        keys: Mutex<HashMap<String, Principal>>,
        grants: Mutex<HashSet<(String, String)>>,
    }

    impl StaticAccessControl {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_key(&self, key: impl Into<String>, principal: Principal) {
            self.keys.lock().unwrap().insert(key.into(), principal);
        }

        pub fn grant(&self, user_id: impl Into<String>, resource_id: impl Into<String>) {
            self.grants
                .lock()
                .unwrap()
                .insert((user_id.into(), resource_id.into()));
        }
    }

    #[async_trait]
    impl Authenticator for StaticAccessControl {
        async fn authenticate(&self, key: &str) -> Result<Principal> {
            self.keys
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| AppError::Unauthenticated("Invalid token".to_string()))
        }
    }

    #[async_trait]
    impl Authorizer for StaticAccessControl {
        async fn can_list_tokens(
            &self,
            resource_id: &str,
            principal: Option<&Principal>,
        ) -> Result<bool> {
            let Some(principal) = principal else {
                return Ok(false);
            };
            if principal.is_superuser {
                return Ok(true);
            }
            Ok(self
                .grants
                .lock()
                .unwrap()
                .contains(&(principal.user_id.clone(), resource_id.to_string())))
        }
    }
}
