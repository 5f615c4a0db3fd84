use uuid::Uuid;

use crate::db::{Direction, Query, SharedBackend};
use crate::models::bookings::{Booking, BookingForm};
use crate::services::decode_each;

pub const BOOKINGS_TABLE: &str = "bookings";

#[derive(Clone)]
pub struct BookingService {
    backend: SharedBackend,
}

impl BookingService {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Inserts one `pending` booking. Required fields are the form's job.
    /// There is no idempotency key, so a resubmission is a second booking.
    pub async fn create(&self, form: BookingForm, user_id: Option<Uuid>) -> bool {
        let record = form.into_new_booking(user_id);
        let row = match serde_json::to_value(&record) {
            Ok(row) => row,
            Err(err) => {
                log::error!("Failed to encode booking: {}", err);
                return false;
            }
        };

        match self.backend.insert(BOOKINGS_TABLE, vec![row]).await {
            Ok(_) => {
                log::info!("Booking received for package '{}'", record.package);
                true
            }
            Err(err) => {
                log::error!("Failed to create booking: {}", err);
                false
            }
        }
    }

    /// Booking history for the account area, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Vec<Booking> {
        let query = Query::new()
            .eq("user_id", user_id)
            .order_by("created_at", Direction::Descending);
        match self
            .backend
            .select(BOOKINGS_TABLE, &query)
            .await
            .map(|rows| decode_each::<Booking>(BOOKINGS_TABLE, rows))
        {
            Ok(bookings) => bookings,
            Err(err) => {
                log::error!("Failed to fetch bookings for {}: {}", user_id, err);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryBackend;
    use crate::models::bookings::BookingStatus;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn form() -> BookingForm {
        BookingForm {
            name: "Ana Lima".to_string(),
            phone: "555-0100".to_string(),
            travelers: 2,
            date: NaiveDate::from_ymd_opt(2025, 6, 1),
            package: "Adventurer".to_string(),
            notes: "Window seats".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_inserts_exactly_one_pending_row() {
        let backend = MemoryBackend::new();
        let service = BookingService::new(Arc::new(backend.clone()));

        assert!(service.create(form(), None).await);

        let rows = backend.rows(BOOKINGS_TABLE);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], "pending");
        assert_eq!(rows[0]["package"], "Adventurer");
        assert!(rows[0].get("user_id").is_none());
    }

    #[tokio::test]
    async fn test_resubmission_creates_a_duplicate() {
        let backend = MemoryBackend::new();
        let service = BookingService::new(Arc::new(backend.clone()));

        assert!(service.create(form(), None).await);
        assert!(service.create(form(), None).await);
        assert_eq!(backend.rows(BOOKINGS_TABLE).len(), 2);
    }

    #[tokio::test]
    async fn test_create_reports_failure_as_false() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        let service = BookingService::new(Arc::new(backend));
        assert!(!service.create(form(), None).await);
    }

    #[tokio::test]
    async fn test_history_only_lists_the_users_bookings() {
        let backend = MemoryBackend::new();
        let service = BookingService::new(Arc::new(backend));
        let ana = Uuid::new_v4();

        service.create(form(), Some(ana)).await;
        service.create(form(), Some(Uuid::new_v4())).await;
        service.create(form(), None).await;

        let history = service.list_for_user(ana).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_id, Some(ana));
        assert_eq!(history[0].status, BookingStatus::Pending);
    }
}
