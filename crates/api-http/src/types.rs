//! Request Types

use serde::Deserialize;

/// `?token=` query parameter shared by the display endpoints
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenQuery {
    pub fn key(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
