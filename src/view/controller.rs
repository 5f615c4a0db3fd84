use std::sync::Arc;

use uuid::Uuid;

use crate::config::SiteConfig;
use crate::db::local_store::FileStore;
use crate::db::SharedBackend;
use crate::models::bookings::BookingForm;
use crate::models::fallback::{
    fallback_destination_records, fallback_package_records, is_fallback_package,
};
use crate::models::user::SignUpForm;
use crate::services::admin_service::{AdminConsole, AdminError, AdminGate};
use crate::services::booking_service::BookingService;
use crate::services::catalog_service::CatalogService;
use crate::services::session_service::{SessionError, SessionGateway, SessionSubscription};
use crate::services::wishlist_service::WishlistService;
use crate::view::state::{AuthMode, Key, Notice, ViewState};

pub const BOOKING_FAILED: &str = "We couldn't submit your booking. Please try again.";
pub const BOOKING_RECEIVED: &str = "Thanks! Your booking request has been received.";
const WISHLIST_FAILED: &str = "We couldn't update your wishlist. Please try again.";
const WISHLIST_UNAVAILABLE: &str = "This package can't be saved to your wishlist right now.";

/// Owns the page state and runs every visitor action against the backend.
pub struct SiteController {
    backend: SharedBackend,
    gateway: SessionGateway,
    catalog: CatalogService,
    admin_gate: AdminGate,
    image_bucket: String,
    subscription: Option<SessionSubscription>,
    pub state: ViewState,
}

impl SiteController {
    pub fn new(backend: SharedBackend, admin_gate: AdminGate, image_bucket: impl Into<String>) -> Self {
        Self {
            gateway: SessionGateway::new(backend.clone()),
            catalog: CatalogService::new(backend.clone()),
            backend,
            admin_gate,
            image_bucket: image_bucket.into(),
            subscription: None,
            state: ViewState::default(),
        }
    }

    /// Admin flag kept in the file named by the config.
    pub fn from_config(backend: SharedBackend, config: &SiteConfig) -> Self {
        let store = Arc::new(FileStore::new(&config.admin_flag_path));
        let gate = AdminGate::new(config.admin.clone(), store);
        Self::new(backend, gate, config.image_bucket.clone())
    }

    /// Loads the catalog and subscribes to session changes. An empty list
    /// (including a failed read) shows the built-in catalog instead.
    pub async fn mount(&mut self) {
        self.state.destinations = self.catalog.destinations().await;
        if self.state.destinations.is_empty() {
            log::info!("No destinations loaded; showing the built-in list");
            self.state.destinations = fallback_destination_records();
        }

        self.state.packages = self.catalog.packages().await;
        if self.state.packages.is_empty() {
            log::info!("No packages loaded; showing the built-in list");
            self.state.packages = fallback_package_records();
        }

        self.subscription = Some(self.gateway.on_session_change());
        self.sync_session().await;
    }

    /// Applies session transitions observed since the last call.
    async fn sync_session(&mut self) {
        let mut changed = None;
        if let Some(subscription) = self.subscription.as_mut() {
            while subscription.pending() {
                match subscription.next().await {
                    Some(profile) => changed = Some(profile),
                    None => break,
                }
            }
        }

        match changed {
            Some(Some(profile)) => {
                let user_id = profile.id;
                self.state.profile = Some(profile);
                self.load_wishlist(user_id).await;
            }
            Some(None) => self.state.clear_user(),
            None => {}
        }
    }

    /// Table access for the signed-in user, or anonymous access.
    fn user_backend(&self) -> SharedBackend {
        match self.gateway.session() {
            Some(session) => self.backend.scoped(&session.access_token),
            None => self.backend.clone(),
        }
    }

    fn user_id(&self) -> Option<Uuid> {
        self.state.profile.as_ref().map(|p| p.id)
    }

    async fn load_wishlist(&mut self, user_id: Uuid) {
        let items = WishlistService::new(self.user_backend()).list(user_id).await;
        self.state.wishlist = items.iter().map(|item| item.package_id).collect();
        self.state.wishlist_items = items;
    }

    // Booking

    pub fn open_booking(&mut self, package: Option<&str>) {
        self.state.selected_package = package.map(str::to_string);
        self.state.modals.booking = true;
    }

    pub fn close_booking(&mut self) {
        self.state.modals.booking = false;
        self.state.selected_package = None;
    }

    pub async fn submit_booking(&mut self, mut form: BookingForm) -> Notice {
        if form.package.trim().is_empty() {
            if let Some(package) = &self.state.selected_package {
                form.package = package.clone();
            }
        }

        let missing = form.missing_fields();
        let notice = if !missing.is_empty() {
            Notice::error(format!("Please fill in: {}", missing.join(", ")))
        } else if BookingService::new(self.user_backend())
            .create(form, self.user_id())
            .await
        {
            self.close_booking();
            Notice::success(BOOKING_RECEIVED)
        } else {
            Notice::error(BOOKING_FAILED)
        };

        self.state.notice = Some(notice.clone());
        notice
    }

    // Session

    pub fn open_auth(&mut self, mode: AuthMode) {
        self.state.auth_error = None;
        self.state.modals.auth = Some(mode);
    }

    pub fn close_auth(&mut self) {
        self.state.auth_error = None;
        self.state.modals.auth = None;
    }

    pub async fn sign_in(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        match self.gateway.sign_in(username, password).await {
            Ok(_) => {
                self.close_auth();
                self.sync_session().await;
                Ok(())
            }
            Err(err) => {
                self.state.auth_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Signs up and, when the account is usable right away, signs in.
    pub async fn sign_up(&mut self, form: &SignUpForm) -> Result<(), SessionError> {
        match self.gateway.sign_up(form).await {
            Ok(result) => {
                self.close_auth();
                if result.session.is_none() {
                    self.state.notice = Some(Notice::success(
                        "Account created. Please sign in to continue.",
                    ));
                }
                self.sync_session().await;
                Ok(())
            }
            Err(err) => {
                self.state.auth_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn sign_out(&mut self) {
        self.gateway.sign_out().await;
        self.sync_session().await;
    }

    // Dashboard

    /// Opens the dashboard with fresh wishlist and booking history. Visitors
    /// without a session get the sign-in form instead.
    pub async fn open_dashboard(&mut self) {
        let Some(user_id) = self.user_id() else {
            self.open_auth(AuthMode::SignIn);
            return;
        };

        self.load_wishlist(user_id).await;
        self.state.booking_history = BookingService::new(self.user_backend())
            .list_for_user(user_id)
            .await;
        self.state.modals.dashboard = true;
    }

    pub fn close_dashboard(&mut self) {
        self.state.modals.dashboard = false;
    }

    /// Flips the heart on a package right away, then settles on whatever the
    /// backend reports. Returns the settled membership, or `None` when the
    /// visitor has to sign in first.
    pub async fn toggle_wishlist(&mut self, package_id: Uuid) -> Option<bool> {
        let Some(user_id) = self.user_id() else {
            self.open_auth(AuthMode::SignIn);
            return None;
        };

        // Built-in packages have no stored row for the wishlist to reference.
        if is_fallback_package(package_id) {
            log::warn!("Refusing to wishlist built-in package {}", package_id);
            self.state.notice = Some(Notice::error(WISHLIST_UNAVAILABLE));
            return Some(self.state.is_wishlisted(package_id));
        }

        let before = self.state.is_wishlisted(package_id);
        self.state.set_wishlisted(package_id, !before);

        match WishlistService::new(self.user_backend())
            .toggle(user_id, package_id)
            .await
        {
            Ok(member) => {
                self.state.set_wishlisted(package_id, member);
                if !member {
                    self.state
                        .wishlist_items
                        .retain(|item| item.package_id != package_id);
                }
                Some(member)
            }
            Err(err) => {
                log::error!("Wishlist toggle failed for {}: {}", package_id, err);
                self.state.set_wishlisted(package_id, before);
                self.state.notice = Some(Notice::error(WISHLIST_FAILED));
                Some(before)
            }
        }
    }

    // Destination detail

    pub fn open_destination(&mut self, index: usize) {
        self.state.open_destination(index);
    }

    pub fn handle_key(&mut self, key: Key) -> bool {
        self.state.handle_key(key)
    }

    // Admin

    pub fn open_admin(&mut self) {
        self.state.modals.admin = true;
    }

    pub fn close_admin(&mut self) {
        self.state.modals.admin = false;
    }

    pub fn admin_authenticated(&self) -> bool {
        self.admin_gate.is_authenticated()
    }

    pub fn admin_login(&mut self, username: &str, password: &str) -> Result<(), AdminError> {
        self.admin_gate.login(username, password)?;
        log::info!("Admin console unlocked");
        Ok(())
    }

    pub fn admin_logout(&mut self) -> Result<(), AdminError> {
        self.admin_gate.logout()?;
        self.close_admin();
        Ok(())
    }

    /// The console, once the admin gate is open.
    pub fn admin_console(&self) -> Option<AdminConsole> {
        if !self.admin_authenticated() {
            return None;
        }
        Some(AdminConsole::new(self.user_backend(), self.image_bucket.clone()))
    }
}
