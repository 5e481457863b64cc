use serde_json::json;
use thiserror::Error;

use crate::model::Role;

/// Where the portal sends a visitor that is not allowed on a page.
pub const AUTH_PATH: &str = "/auth";

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("{0}")]
    BadParams(String),

    /// Form-level required-field failures; the message is the banner text.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("sign in first")]
    Unauthenticated,

    #[error("this page requires the {required} role")]
    Forbidden { required: Role },

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl PortalError {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::BadParams(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadParams(_) => "bad_params",
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::NotFound { entity, id } => Some(json!({ "entity": entity, "id": id })),
            Self::Unauthenticated => Some(json!({ "redirect": AUTH_PATH })),
            Self::Forbidden { required } => Some(json!({
                "redirect": AUTH_PATH,
                "requiredRole": required.as_str(),
            })),
            _ => None,
        }
    }
}

pub type PortalResult<T> = Result<T, PortalError>;
