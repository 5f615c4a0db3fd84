use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use uuid::Uuid;

/// Any status may follow any other; admins set it freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown booking status: {}", s))
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub travelers: u32,
    pub date: NaiveDate,
    /// Package name as typed on the form, not a reference.
    pub package: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub notes: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// The public booking form. Every field is optional on the wire so that
/// missing input is reported by [`BookingForm::missing_fields`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub travelers: u32,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub notes: String,
}

impl BookingForm {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.travelers == 0 {
            missing.push("travelers");
        }
        if self.package.trim().is_empty() {
            missing.push("package");
        }
        missing
    }

    pub fn into_new_booking(self, user_id: Option<Uuid>) -> NewBooking {
        NewBooking {
            name: self.name,
            phone: self.phone,
            travelers: self.travelers,
            date: self.date,
            package: self.package,
            notes: self.notes,
            status: BookingStatus::Pending,
            user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewBooking {
    pub name: String,
    pub phone: String,
    pub travelers: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub package: String,
    pub notes: String,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_lists_every_required_gap() {
        assert_eq!(
            BookingForm::default().missing_fields(),
            vec!["name", "phone", "date", "travelers", "package"]
        );

        let form = BookingForm {
            name: "Ana".to_string(),
            phone: "555-0100".to_string(),
            travelers: 2,
            date: NaiveDate::from_ymd_opt(2025, 6, 1),
            package: "Island Hopper".to_string(),
            notes: String::new(),
        };
        assert!(form.missing_fields().is_empty());
    }

    #[test]
    fn test_new_booking_is_always_pending() {
        let user = Uuid::new_v4();
        let booking = BookingForm {
            name: "Ana".to_string(),
            ..BookingForm::default()
        }
        .into_new_booking(Some(user));

        assert_eq!(booking.status, BookingStatus::Pending);
        let wire = serde_json::to_value(&booking).unwrap();
        assert_eq!(wire["status"], "pending");
        assert_eq!(wire["user_id"], json!(user));
        assert!(wire.get("date").is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_value::<BookingStatus>(json!("refunded")).is_err());
        assert_eq!("cancelled".parse::<BookingStatus>(), Ok(BookingStatus::Cancelled));
    }
}
