// Token & Token Queue Domain Model

use crate::domain::error::DomainError;
use crate::domain::resource::ResourceId;
use crate::domain::sub_queue::SubQueueId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token ID
pub type TokenId = String;

/// Token queue ID
pub type TokenQueueId = String;

/// Placeholder shown when a sub-queue has no in-progress token today
pub const EMPTY_TOKEN_DISPLAY: &str = "--";

/// Token lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStatus {
    Unfulfilled,
    Created,
    InProgress,
    Fulfilled,
    Cancelled,
    EnteredInError,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Unfulfilled => "UNFULFILLED",
            TokenStatus::Created => "CREATED",
            TokenStatus::InProgress => "IN_PROGRESS",
            TokenStatus::Fulfilled => "FULFILLED",
            TokenStatus::Cancelled => "CANCELLED",
            TokenStatus::EnteredInError => "ENTERED_IN_ERROR",
        }
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNFULFILLED" => Ok(TokenStatus::Unfulfilled),
            "CREATED" => Ok(TokenStatus::Created),
            "IN_PROGRESS" => Ok(TokenStatus::InProgress),
            "FULFILLED" => Ok(TokenStatus::Fulfilled),
            "CANCELLED" => Ok(TokenStatus::Cancelled),
            "ENTERED_IN_ERROR" => Ok(TokenStatus::EnteredInError),
            other => Err(DomainError::UnknownTokenStatus(other.to_string())),
        }
    }
}

/// Ticket issued to a person waiting in a queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub queue_id: TokenQueueId,
    pub sub_queue_id: Option<SubQueueId>,
    pub category_shorthand: String,
    pub number: u32,
    pub status: TokenStatus,
    pub created_at: i64, // epoch ms
}

impl Token {
    pub fn new(
        id: impl Into<TokenId>,
        queue_id: impl Into<TokenQueueId>,
        category_shorthand: impl Into<String>,
        number: u32,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: queue_id.into(),
            sub_queue_id: None,
            category_shorthand: category_shorthand.into(),
            number,
            status: TokenStatus::Created,
            created_at,
        }
    }

    pub fn with_sub_queue(mut self, sub_queue_id: SubQueueId) -> Self {
        self.sub_queue_id = Some(sub_queue_id);
        self
    }

    pub fn with_status(mut self, status: TokenStatus) -> Self {
        self.status = status;
        self
    }

    /// Display string such as `A-007`
    pub fn display_number(&self) -> String {
        format!("{}-{:03}", self.category_shorthand, self.number)
    }
}

/// Formats the in-progress token for a display, or the placeholder if none
pub fn format_token_display(token: Option<&Token>) -> String {
    token
        .map(Token::display_number)
        .unwrap_or_else(|| EMPTY_TOKEN_DISPLAY.to_string())
}

/// Daily queue of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenQueue {
    pub id: TokenQueueId,
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub is_primary: bool,
    pub name: String,
}

impl TokenQueue {
    pub fn primary(
        id: impl Into<TokenQueueId>,
        resource_id: impl Into<ResourceId>,
        date: NaiveDate,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_id: resource_id.into(),
            date,
            is_primary: true,
            name: name.into(),
        }
    }
}
