use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::db::backend::{
    value_as_text, AuthProvider, AuthSession, AuthUser, BackendError, Direction, HostedBackend,
    ObjectStore, Query, SharedBackend, SignUpResult, TableStore,
};

struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Value>>,
    unique_keys: HashMap<String, Vec<String>>,
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, Uuid>,
    objects: HashMap<String, Vec<u8>>,
    profile_trigger: bool,
    offline: bool,
}

/// In-process stand-in for the hosted backend.
///
/// Rows are JSON objects. Inserts receive an `id` and a `created_at` when the
/// caller leaves them out, and configured unique keys reject duplicates with
/// [`BackendError::Conflict`].
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let backend = Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
        };
        backend.add_unique_key("profiles", &["id"]);
        backend.add_unique_key("wishlist", &["user_id", "package_id"]);
        backend
    }

    /// Create a profile row on sign-up, the way a server-side trigger would.
    pub fn with_profile_trigger(self) -> Self {
        self.lock().profile_trigger = true;
        self
    }

    pub fn add_unique_key(&self, table: &str, columns: &[&str]) {
        self.lock().unique_keys.insert(
            table.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
    }

    /// While offline every call fails with a request error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.lock()
            .objects
            .get(&format!("{}/{}", bucket, path))
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn connected(&self) -> Result<MutexGuard<'_, MemoryState>, BackendError> {
        let state = self.lock();
        if state.offline {
            return Err(BackendError::Request("backend unreachable".to_string()));
        }
        Ok(state)
    }
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl MemoryState {
    fn insert_row(&mut self, table: &str, row: Value) -> Result<Value, BackendError> {
        let mut object = match row {
            Value::Object(map) => map,
            other => return Err(BackendError::Decode(format!("expected object, got {}", other))),
        };
        object
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        object
            .entry("created_at")
            .or_insert_with(|| Value::String(now_stamp()));
        let row = Value::Object(object);

        if let Some(columns) = self.unique_keys.get(table) {
            let existing = self.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
            let clash = existing.iter().any(|other| {
                columns.iter().all(|column| {
                    matches!(
                        (row.get(column), other.get(column)),
                        (Some(a), Some(b)) if value_as_text(a) == value_as_text(b)
                    )
                })
            });
            if clash {
                return Err(BackendError::Conflict);
            }
        }

        self.tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    fn embed_rows(&self, rows: &mut [Value], embedded: &str) {
        let foreign_key = format!("{}_id", embedded.trim_end_matches('s'));
        let targets = self.tables.get(embedded).map(Vec::as_slice).unwrap_or(&[]);
        for row in rows.iter_mut() {
            let joined = row
                .get(&foreign_key)
                .map(value_as_text)
                .and_then(|key| {
                    targets
                        .iter()
                        .find(|t| t.get("id").map(value_as_text).as_deref() == Some(key.as_str()))
                })
                .cloned()
                .unwrap_or(Value::Null);
            if let Value::Object(map) = row {
                map.insert(embedded.to_string(), joined);
            }
        }
    }

    fn issue_session(&mut self, user: &AuthUser) -> AuthSession {
        let token = format!("memory-{}", Uuid::new_v4());
        self.tokens.insert(token.clone(), user.id);
        AuthSession {
            access_token: token,
            refresh_token: None,
            user: user.clone(),
        }
    }
}

#[async_trait]
impl TableStore for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let state = self.connected()?;
        let mut rows: Vec<Value> = state
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some((column, direction)) = &query.order {
            rows.sort_by(|a, b| {
                let a = a.get(column).map(value_as_text).unwrap_or_default();
                let b = b.get(column).map(value_as_text).unwrap_or_default();
                match direction {
                    Direction::Ascending => a.cmp(&b),
                    Direction::Descending => b.cmp(&a),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        if let Some(embedded) = &query.embed {
            state.embed_rows(&mut rows, embedded);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, BackendError> {
        let mut state = self.connected()?;
        rows.into_iter()
            .map(|row| state.insert_row(table, row))
            .collect()
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        let mut state = self.connected()?;
        let Value::Object(patch) = patch else {
            return Err(BackendError::Decode("patch must be an object".to_string()));
        };
        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| query.matches(r)) {
                if let Value::Object(map) = row {
                    for (key, value) in &patch {
                        map.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let mut state = self.connected()?;
        let Some(rows) = state.tables.get_mut(table) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|r| query.matches(r));
        *rows = kept;
        Ok(removed)
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<SignUpResult, BackendError> {
        let mut state = self.connected()?;
        if password.len() < 6 {
            return Err(BackendError::Api {
                status: 422,
                message: "Password should be at least 6 characters".to_string(),
            });
        }
        if state.accounts.contains_key(email) {
            return Err(BackendError::Api {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            user_metadata: metadata,
        };
        state.accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );

        if state.profile_trigger {
            let mut profile = match &user.user_metadata {
                Value::Object(map) => map.clone(),
                _ => Map::new(),
            };
            profile.insert("id".to_string(), json!(user.id));
            profile.entry("role").or_insert_with(|| json!("user"));
            state.insert_row("profiles", Value::Object(profile))?;
        }

        let session = state.issue_session(&user);
        Ok(SignUpResult {
            user,
            session: Some(session),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut state = self.connected()?;
        let user = match state.accounts.get(email) {
            Some(account) if account.password == password => account.user.clone(),
            _ => {
                return Err(BackendError::Api {
                    status: 400,
                    message: "Invalid login credentials".to_string(),
                })
            }
        };
        Ok(state.issue_session(&user))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let mut state = self.connected()?;
        state.tokens.remove(access_token);
        Ok(())
    }

    async fn user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let state = self.connected()?;
        let id = state
            .tokens
            .get(access_token)
            .ok_or_else(|| BackendError::Unauthorized("invalid JWT".to_string()))?;
        state
            .accounts
            .values()
            .find(|account| account.user.id == *id)
            .map(|account| account.user.clone())
            .ok_or(BackendError::NotFound)
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), BackendError> {
        let mut state = self.connected()?;
        state.objects.insert(format!("{}/{}", bucket, path), bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://storage/{}/{}", bucket, path)
    }
}

#[async_trait]
impl HostedBackend for MemoryBackend {
    fn scoped(&self, _access_token: &str) -> SharedBackend {
        Arc::new(self.clone())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.connected().map(|_| ())
    }
}
