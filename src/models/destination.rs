use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use uuid::Uuid;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Destination {
    pub id: Uuid,
    pub name: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub region: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub season: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Writable destination fields, as sent on create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DestinationInput {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&Destination> for DestinationInput {
    fn from(destination: &Destination) -> Self {
        Self {
            name: destination.name.clone(),
            region: destination.region.clone(),
            season: destination.season.clone(),
            description: destination.description.clone(),
            image_url: destination.image_url.clone(),
        }
    }
}
