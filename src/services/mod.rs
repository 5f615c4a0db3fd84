pub mod admin_service;
pub mod booking_service;
pub mod catalog_service;
pub mod image_service;
pub mod session_service;
pub mod wishlist_service;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::db::BackendError;

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, BackendError> {
    Ok(serde_json::from_value(Value::Array(rows))?)
}

/// Decodes row by row; rows that don't fit `T` are logged and skipped.
pub(crate) fn decode_each<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value(row) {
                Ok(record) => Some(record),
                Err(err) => {
                    log::warn!("Skipping unreadable {} row {}: {}", table, id, err);
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn decode_first<T: DeserializeOwned>(rows: Vec<Value>) -> Result<T, BackendError> {
    decode_rows::<T>(rows)?
        .into_iter()
        .next()
        .ok_or(BackendError::NotFound)
}
