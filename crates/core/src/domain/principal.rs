// Authenticated caller

use serde::{Deserialize, Serialize};

/// User resolved from an auth token. Anonymous callers carry no principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub is_superuser: bool,
}

impl Principal {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_superuser: false,
        }
    }

    pub fn superuser(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_superuser: true,
        }
    }
}
