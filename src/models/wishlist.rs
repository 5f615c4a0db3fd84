use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::package::Package;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub package_id: Uuid,
    /// Package snapshot joined in at read time; `None` once the package is gone.
    #[serde(rename = "packages", default)]
    pub package: Option<Package>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
