use serde_json::{json, Value};
use tokio::sync::watch;

use crate::db::backend::{AuthSession, AuthUser, SignUpResult};
use crate::db::{BackendError, Query, SharedBackend};
use crate::models::user::{SignUpForm, UserProfile, UserRole};
use crate::services::decode_rows;

/// Domain appended to synthesized sign-in emails.
pub const EMAIL_DOMAIN: &str = "wayfarer.local";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Rejected credentials or sign-up data; carries the backend's own text.
    #[error("{0}")]
    Auth(String),
    #[error(transparent)]
    Backend(BackendError),
}

impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Api { .. } | BackendError::Unauthorized(_) => {
                SessionError::Auth(err.user_message())
            }
            other => SessionError::Backend(other),
        }
    }
}

/// The auth subsystem only takes email addresses, so usernames map onto a
/// placeholder address: lower-cased, everything but `a-z0-9` stripped.
/// Usernames that normalize identically share an address.
pub fn synthesize_email(username: &str) -> String {
    let local: String = username
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    format!("{}@{}", local, EMAIL_DOMAIN)
}

#[derive(Clone)]
pub struct SessionService {
    backend: SharedBackend,
}

impl SessionService {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpResult, SessionError> {
        let email = synthesize_email(&form.username);
        let metadata = json!({
            "username": form.username,
            "full_name": form.full_name,
            "address": form.address,
            "phone": form.phone,
        });

        let result = self
            .backend
            .sign_up(&email, &form.password, metadata.clone())
            .await?;

        // A trigger usually creates the profile already; a conflict means it did.
        if let Some(session) = &result.session {
            let mut profile = metadata;
            profile["id"] = json!(result.user.id);
            profile["role"] = json!(UserRole::User);
            match self
                .backend
                .scoped(&session.access_token)
                .insert("profiles", vec![profile])
                .await
            {
                Ok(_) => log::debug!("Created profile for {}", result.user.id),
                Err(BackendError::Conflict) => {
                    log::debug!("Profile for {} already exists", result.user.id)
                }
                Err(e) => log::warn!("Failed to create profile for {}: {}", result.user.id, e),
            }
        }

        log::info!("Signed up {}", email);
        Ok(result)
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<AuthSession, SessionError> {
        let email = synthesize_email(username);
        let session = self.backend.sign_in(&email, password).await?;
        log::info!("Signed in {}", email);
        Ok(session)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), SessionError> {
        self.backend.sign_out(access_token).await?;
        Ok(())
    }

    /// Looks up the auth user behind an access token.
    pub async fn session_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        self.backend.user(access_token).await
    }

    /// Reads the profile row for `user`. Falls back to sign-up metadata when
    /// the row is missing or unreadable; role then defaults to `user`.
    pub async fn resolve_profile(&self, user: &AuthUser, access_token: &str) -> UserProfile {
        let rows = self
            .backend
            .scoped(access_token)
            .select("profiles", &Query::new().eq("id", user.id).single())
            .await
            .and_then(decode_rows::<UserProfile>);

        match rows {
            Ok(mut profiles) if !profiles.is_empty() => profiles.remove(0),
            Ok(_) => placeholder_profile(user),
            Err(e) => {
                log::error!("Failed to read profile for {}: {}", user.id, e);
                placeholder_profile(user)
            }
        }
    }
}

fn placeholder_profile(user: &AuthUser) -> UserProfile {
    let field = |key: &str| {
        user.user_metadata
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let mut username = field("username");
    if username.is_empty() {
        username = user
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .unwrap_or_default()
            .to_string();
    }

    UserProfile {
        id: user.id,
        username,
        full_name: field("full_name"),
        address: field("address"),
        phone: field("phone"),
        role: UserRole::User,
    }
}

/// Holds the current session and notifies subscribers of every transition.
pub struct SessionGateway {
    service: SessionService,
    current: watch::Sender<Option<AuthSession>>,
}

impl SessionGateway {
    pub fn new(backend: SharedBackend) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            service: SessionService::new(backend),
            current,
        }
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.current.borrow().clone()
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpResult, SessionError> {
        let result = self.service.sign_up(form).await?;
        if let Some(session) = &result.session {
            self.current.send_replace(Some(session.clone()));
        }
        Ok(result)
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<AuthSession, SessionError> {
        let session = self.service.sign_in(username, password).await?;
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Clears the local session even when the upstream revoke fails.
    pub async fn sign_out(&self) {
        let Some(session) = self.session() else {
            return;
        };
        if let Err(e) = self.service.sign_out(&session.access_token).await {
            log::warn!("Sign-out request failed: {}", e);
        }
        self.current.send_replace(None);
    }

    /// Yields the current profile immediately, then once per session change.
    pub fn on_session_change(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.current.subscribe(),
            service: self.service.clone(),
            primed: false,
        }
    }
}

pub struct SessionSubscription {
    receiver: watch::Receiver<Option<AuthSession>>,
    service: SessionService,
    primed: bool,
}

impl SessionSubscription {
    /// True when [`next`](Self::next) would return without waiting.
    pub fn pending(&self) -> bool {
        !self.primed || self.receiver.has_changed().unwrap_or(false)
    }

    /// `None` once the gateway is gone; otherwise the resolved profile, or
    /// `Some(None)` when signed out.
    pub async fn next(&mut self) -> Option<Option<UserProfile>> {
        if self.primed {
            self.receiver.changed().await.ok()?;
        }
        self.primed = true;

        let session = self.receiver.borrow_and_update().clone();
        match session {
            Some(session) => Some(Some(
                self.service
                    .resolve_profile(&session.user, &session.access_token)
                    .await,
            )),
            None => Some(None),
        }
    }
}
