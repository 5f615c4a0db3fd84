use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::AdminCredentials;
use crate::db::local_store::{LocalStore, StoreError};
use crate::db::{BackendError, Direction, Query, SharedBackend};
use crate::models::bookings::{Booking, BookingStatus};
use crate::models::destination::{Destination, DestinationInput};
use crate::models::fallback::{fallback_destinations, fallback_packages};
use crate::models::package::{Package, PackageDraft};
use crate::models::user::{ProfileUpdate, UserProfile};
use crate::services::booking_service::BOOKINGS_TABLE;
use crate::services::image_service::{ImageData, ImageService, ImageUploadError};
use crate::services::{decode_each, decode_first};

/// Local storage key of the admin console flag.
pub const ADMIN_FLAG_KEY: &str = "adminAuthenticated";

const DESTINATIONS_TABLE: &str = "destinations";
const PACKAGES_TABLE: &str = "packages";
const PROFILES_TABLE: &str = "profiles";

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Invalid admin credentials")]
    InvalidCredentials,
    #[error("Password changes need server-side privileges and cannot be applied from here")]
    PasswordResetUnavailable,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Image(#[from] ImageUploadError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Opens the admin console on a literal credential match and remembers that
/// in local storage. Not an access control.
pub struct AdminGate {
    credentials: AdminCredentials,
    store: Arc<dyn LocalStore>,
}

impl AdminGate {
    pub fn new(credentials: AdminCredentials, store: Arc<dyn LocalStore>) -> Self {
        Self { credentials, store }
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get(ADMIN_FLAG_KEY).as_deref() == Some("true")
    }

    pub fn login(&self, username: &str, password: &str) -> Result<(), AdminError> {
        if username != self.credentials.username || password != self.credentials.password {
            log::warn!("Rejected admin login for '{}'", username);
            return Err(AdminError::InvalidCredentials);
        }
        self.store.set(ADMIN_FLAG_KEY, "true")?;
        Ok(())
    }

    pub fn logout(&self) -> Result<(), AdminError> {
        self.store.remove(ADMIN_FLAG_KEY)?;
        Ok(())
    }
}

/// Case-insensitive substring match on booker name or package name.
pub fn filter_bookings<'a>(bookings: &'a [Booking], search: &str) -> Vec<&'a Booking> {
    let needle = search.trim().to_lowercase();
    bookings
        .iter()
        .filter(|b| {
            needle.is_empty()
                || b.name.to_lowercase().contains(&needle)
                || b.package.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Zero-based page of `items`; pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if per_page == 0 {
        return &[];
    }
    let start = page.saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub destinations_inserted: usize,
    pub packages_inserted: usize,
    pub skipped: usize,
}

/// CRUD over the four admin-managed collections.
pub struct AdminConsole {
    backend: SharedBackend,
    images: ImageService,
}

impl AdminConsole {
    pub fn new(backend: SharedBackend, image_bucket: impl Into<String>) -> Self {
        Self {
            images: ImageService::new(backend.clone(), image_bucket),
            backend,
        }
    }

    async fn read<T: serde::de::DeserializeOwned>(&self, table: &str, query: Query) -> Vec<T> {
        match self
            .backend
            .select(table, &query)
            .await
            .map(|rows| decode_each::<T>(table, rows))
        {
            Ok(rows) => rows,
            Err(err) => {
                log::error!("Failed to fetch {}: {}", table, err);
                Vec::new()
            }
        }
    }

    async fn save(&self, table: &str, id: Option<Uuid>, row: Value) -> Result<Value, BackendError> {
        let mut rows = match id {
            Some(id) => {
                self.backend
                    .update(table, &Query::new().eq("id", id), row)
                    .await?
            }
            None => self.backend.insert(table, vec![row]).await?,
        };
        if rows.is_empty() {
            return Err(BackendError::NotFound);
        }
        Ok(rows.remove(0))
    }

    async fn remove(&self, table: &str, id: Uuid) -> Result<(), AdminError> {
        let removed = self
            .backend
            .delete(table, &Query::new().eq("id", id))
            .await?;
        if removed.is_empty() {
            return Err(BackendError::NotFound.into());
        }
        log::info!("Deleted {} row {}", table, id);
        Ok(())
    }

    // Bookings

    /// Every booking, newest first.
    pub async fn bookings(&self) -> Vec<Booking> {
        self.read(
            BOOKINGS_TABLE,
            Query::new().order_by("created_at", Direction::Descending),
        )
        .await
    }

    pub async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, AdminError> {
        let row = self
            .save(BOOKINGS_TABLE, Some(id), json!({ "status": status }))
            .await?;
        log::info!("Booking {} is now {}", id, status);
        Ok(decode_first(vec![row])?)
    }

    pub async fn delete_booking(&self, id: Uuid) -> Result<(), AdminError> {
        self.remove(BOOKINGS_TABLE, id).await
    }

    // Users

    pub async fn users(&self) -> Vec<UserProfile> {
        self.read(
            PROFILES_TABLE,
            Query::new().order_by("username", Direction::Ascending),
        )
        .await
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AdminError> {
        let row = self
            .save(PROFILES_TABLE, Some(id), serde_json::to_value(update).map_err(BackendError::from)?)
            .await?;
        Ok(decode_first(vec![row])?)
    }

    /// Always fails: changing another account's password needs the backend's
    /// service role, which this client never holds.
    pub async fn reset_password(&self, id: Uuid, _new_password: &str) -> Result<(), AdminError> {
        log::info!("Password reset requested for {}; not available", id);
        Err(AdminError::PasswordResetUnavailable)
    }

    // Destinations

    pub async fn destinations(&self) -> Vec<Destination> {
        self.read(
            DESTINATIONS_TABLE,
            Query::new().order_by("created_at", Direction::Ascending),
        )
        .await
    }

    /// Creates (`id == None`) or updates a destination. A new image is
    /// uploaded first; if that fails nothing is saved.
    pub async fn save_destination(
        &self,
        id: Option<Uuid>,
        mut input: DestinationInput,
        image: Option<&ImageData>,
    ) -> Result<Destination, AdminError> {
        if input.name.trim().is_empty() {
            return Err(AdminError::MissingField("name"));
        }
        if let Some(image) = image {
            input.image_url = Some(self.images.upload(image).await?);
        }

        let row = serde_json::to_value(&input).map_err(BackendError::from)?;
        let saved = self.save(DESTINATIONS_TABLE, id, row).await?;
        Ok(decode_first(vec![saved])?)
    }

    pub async fn delete_destination(&self, id: Uuid) -> Result<(), AdminError> {
        self.remove(DESTINATIONS_TABLE, id).await
    }

    // Packages

    pub async fn packages(&self) -> Vec<Package> {
        self.read(
            PACKAGES_TABLE,
            Query::new().order_by("created_at", Direction::Ascending),
        )
        .await
    }

    pub async fn save_package(
        &self,
        id: Option<Uuid>,
        draft: PackageDraft,
    ) -> Result<Package, AdminError> {
        if draft.name.trim().is_empty() {
            return Err(AdminError::MissingField("name"));
        }
        let row = serde_json::to_value(draft.into_input()).map_err(BackendError::from)?;
        let saved = self.save(PACKAGES_TABLE, id, row).await?;
        Ok(decode_first(vec![saved])?)
    }

    pub async fn delete_package(&self, id: Uuid) -> Result<(), AdminError> {
        self.remove(PACKAGES_TABLE, id).await
    }

    // Seeding

    async fn existing_names(&self, table: &str) -> Result<HashSet<String>, BackendError> {
        let rows = self.backend.select(table, &Query::new()).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Inserts the built-in catalog, skipping names already present, so
    /// running it again adds nothing.
    pub async fn seed(&self) -> Result<SeedReport, AdminError> {
        let mut report = SeedReport::default();

        let existing = self.existing_names(DESTINATIONS_TABLE).await?;
        for destination in fallback_destinations() {
            if existing.contains(&destination.name) {
                report.skipped += 1;
                continue;
            }
            let row = serde_json::to_value(&destination).map_err(BackendError::from)?;
            self.backend.insert(DESTINATIONS_TABLE, vec![row]).await?;
            report.destinations_inserted += 1;
        }

        let existing = self.existing_names(PACKAGES_TABLE).await?;
        for package in fallback_packages() {
            if existing.contains(&package.name) {
                report.skipped += 1;
                continue;
            }
            let row = serde_json::to_value(&package).map_err(BackendError::from)?;
            self.backend.insert(PACKAGES_TABLE, vec![row]).await?;
            report.packages_inserted += 1;
        }

        log::info!("Seeded catalog: {:?}", report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::backend::TableStore;
    use crate::db::local_store::MemoryStore;
    use crate::db::memory::MemoryBackend;
    use crate::models::package::PackageTheme;
    use chrono::NaiveDate;

    fn console() -> (MemoryBackend, AdminConsole) {
        let backend = MemoryBackend::new();
        let console = AdminConsole::new(Arc::new(backend.clone()), "destination-images");
        (backend, console)
    }

    fn booking(name: &str, package: &str) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: "555-0100".to_string(),
            travelers: 1,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            package: package.to_string(),
            notes: String::new(),
            status: BookingStatus::Pending,
            created_at: None,
            user_id: None,
        }
    }

    #[test]
    fn test_gate_only_opens_for_the_fixed_pair() {
        let store = Arc::new(MemoryStore::default());
        let gate = AdminGate::new(AdminCredentials::default(), store.clone());

        for (user, pass) in [("admin", "wrong"), ("Admin", "wayfarer-admin"), ("", "")] {
            assert!(matches!(gate.login(user, pass), Err(AdminError::InvalidCredentials)));
            assert!(!gate.is_authenticated());
            assert_eq!(store.get(ADMIN_FLAG_KEY), None);
        }

        tokio_test::assert_ok!(gate.login("admin", "wayfarer-admin"));
        assert!(gate.is_authenticated());
        tokio_test::assert_ok!(gate.logout());
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn test_filter_bookings_matches_name_or_package_case_insensitively() {
        let bookings = vec![
            booking("Ana Lima", "Explorer"),
            booking("Ben Ode", "Luxury Escape"),
            booking("Cleo Park", "Adventurer"),
        ];

        let names = |found: Vec<&Booking>| found.iter().map(|b| b.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(filter_bookings(&bookings, "ana")), vec!["Ana Lima"]);
        assert_eq!(names(filter_bookings(&bookings, "ESCAPE")), vec!["Ben Ode"]);
        assert_eq!(filter_bookings(&bookings, "").len(), 3);
        assert!(filter_bookings(&bookings, "zzz").is_empty());
    }

    #[test]
    fn test_paginate_slices_and_clamps() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(paginate(&items, 0, 3), &[1, 2, 3]);
        assert_eq!(paginate(&items, 2, 3), &[7]);
        assert!(paginate(&items, 5, 3).is_empty());
        assert!(paginate(&items, 0, 0).is_empty());
        assert_eq!(page_count(items.len(), 3), 3);
        assert_eq!(page_count(0, 3), 0);
    }

    #[tokio::test]
    async fn test_booking_status_can_move_any_direction() {
        let (backend, console) = console();
        let inserted = backend
            .insert(
                BOOKINGS_TABLE,
                vec![json!({
                    "name": "Ana", "phone": "1", "travelers": 2, "date": "2025-06-01",
                    "package": "Explorer", "notes": "", "status": "completed"
                })],
            )
            .await
            .unwrap();
        let id: Uuid = serde_json::from_value(inserted[0]["id"].clone()).unwrap();

        let updated = console
            .update_booking_status(id, BookingStatus::Pending)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Pending);

        console.delete_booking(id).await.unwrap();
        assert!(console.bookings().await.is_empty());
        tokio_test::assert_err!(console.delete_booking(id).await);
    }

    #[tokio::test]
    async fn test_unreadable_booking_does_not_hide_the_rest() {
        let (backend, console) = console();
        backend
            .insert(
                BOOKINGS_TABLE,
                vec![
                    json!({
                        "name": "Ana", "phone": "1", "travelers": 2, "date": "2025-06-01",
                        "package": "Explorer", "notes": "", "status": "pending"
                    }),
                    json!({
                        "name": "Ben", "phone": "2", "travelers": "many", "date": "2025-06-02",
                        "package": "Adventurer", "notes": "", "status": "pending"
                    }),
                ],
            )
            .await
            .unwrap();

        let names: Vec<String> = console.bookings().await.into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Ana"]);
    }

    #[tokio::test]
    async fn test_password_reset_always_reports_unavailable() {
        let (_, console) = console();
        assert!(matches!(
            console.reset_password(Uuid::new_v4(), "new-secret").await,
            Err(AdminError::PasswordResetUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_update_user_changes_editable_fields_only() {
        let (backend, console) = console();
        let id = Uuid::new_v4();
        backend
            .insert(
                PROFILES_TABLE,
                vec![json!({ "id": id, "username": "ana", "full_name": "Ana", "role": "admin" })],
            )
            .await
            .unwrap();

        let update = ProfileUpdate {
            full_name: "Ana Lima".to_string(),
            address: "1 Harbour St".to_string(),
            phone: "555-0100".to_string(),
        };
        let profile = console.update_user(id, &update).await.unwrap();
        assert_eq!(profile.full_name, "Ana Lima");
        assert_eq!(profile.username, "ana");
        assert!(profile.is_admin());
    }

    #[tokio::test]
    async fn test_save_destination_uploads_image_then_persists_url() {
        let (backend, console) = console();
        let image = ImageData::from_bytes("kyoto.jpg", "image/jpeg", b"jpeg");
        let input = DestinationInput {
            name: "Kyoto".to_string(),
            region: "Japan".to_string(),
            ..DestinationInput::default()
        };

        let saved = console
            .save_destination(None, input, Some(&image))
            .await
            .unwrap();
        let url = saved.image_url.clone().unwrap();
        assert!(url.starts_with("memory://storage/destination-images/"));
        assert!(url.ends_with(".jpg"));

        let renamed = console
            .save_destination(
                Some(saved.id),
                DestinationInput {
                    name: "Kyoto & Nara".to_string(),
                    ..DestinationInput::from(&saved)
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(renamed.image_url, Some(url));
        assert_eq!(backend.rows(DESTINATIONS_TABLE).len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_aborts_the_save() {
        let (backend, console) = console();
        let mut image = ImageData::from_bytes("kyoto.jpg", "image/jpeg", b"jpeg");
        image.data = "not base64!".to_string();

        let result = console
            .save_destination(
                None,
                DestinationInput {
                    name: "Kyoto".to_string(),
                    ..DestinationInput::default()
                },
                Some(&image),
            )
            .await;
        assert!(matches!(result, Err(AdminError::Image(_))));
        assert!(backend.rows(DESTINATIONS_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_save_package_parses_feature_block() {
        let (_, console) = console();
        let draft = PackageDraft {
            name: "Weekender".to_string(),
            price: "$499".to_string(),
            color: PackageTheme::Periwinkle,
            features: "A\n\nB\n".to_string(),
        };

        let package = console.save_package(None, draft).await.unwrap();
        assert_eq!(package.features, vec!["A", "B"]);
        assert_eq!(package.color, PackageTheme::Periwinkle);

        console.delete_package(package.id).await.unwrap();
        assert!(console.packages().await.is_empty());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let (_, console) = console();

        let first = console.seed().await.unwrap();
        assert_eq!(first.destinations_inserted, fallback_destinations().len());
        assert_eq!(first.packages_inserted, fallback_packages().len());

        let second = console.seed().await.unwrap();
        assert_eq!(second.destinations_inserted, 0);
        assert_eq!(second.packages_inserted, 0);
        assert_eq!(
            second.skipped,
            fallback_destinations().len() + fallback_packages().len()
        );
        assert_eq!(console.destinations().await.len(), fallback_destinations().len());
    }
}
