use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("row already exists")]
    Conflict,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found")]
    NotFound,
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Message text suitable for showing next to a form field.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Api { message, .. } | BackendError::Unauthorized(message) => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Row selection for table calls: equality filters, one ordering column,
/// an optional embedded (joined) table and a row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, String)>,
    pub order: Option<(String, Direction)>,
    pub embed: Option<String>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn embed(mut self, table: &str) -> Self {
        self.embed = Some(table.to_string());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn single(self) -> Self {
        self.limit(1)
    }

    /// True when every equality filter holds for `row`.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(column, expected)| {
            row.get(column)
                .map(|actual| value_as_text(actual) == *expected)
                .unwrap_or(false)
        })
    }
}

pub(crate) fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

/// Sign-up returns a session only when the account is usable right away
/// (no email confirmation step).
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpResult {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, BackendError>;
    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError>;
    /// Returns the removed rows.
    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<SignUpResult, BackendError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;
    async fn user(&self, access_token: &str) -> Result<AuthUser, BackendError>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[async_trait]
pub trait HostedBackend: TableStore + AuthProvider + ObjectStore {
    /// A handle whose table and storage calls run as the signed-in user.
    fn scoped(&self, access_token: &str) -> SharedBackend;

    async fn ping(&self) -> Result<(), BackendError>;
}

pub type SharedBackend = Arc<dyn HostedBackend>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_matches_equality_filters() {
        let row = json!({ "user_id": "u-1", "package_id": "p-1", "travelers": 2 });

        assert!(Query::new().matches(&row));
        assert!(Query::new().eq("user_id", "u-1").eq("travelers", 2).matches(&row));
        assert!(!Query::new().eq("user_id", "u-2").matches(&row));
        assert!(!Query::new().eq("missing", "x").matches(&row));
    }

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = BackendError::Api {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid login credentials");
        assert_eq!(BackendError::Conflict.user_message(), "row already exists");
    }
}
