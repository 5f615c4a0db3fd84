use serde::de::DeserializeOwned;

use crate::db::{Direction, Query, SharedBackend};
use crate::models::destination::Destination;
use crate::models::package::Package;
use crate::services::decode_each;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogResource {
    Destinations,
    Packages,
}

impl CatalogResource {
    pub fn table(self) -> &'static str {
        match self {
            CatalogResource::Destinations => "destinations",
            CatalogResource::Packages => "packages",
        }
    }
}

/// Public catalog reads. Failures are logged and read as an empty list;
/// nothing is cached.
#[derive(Clone)]
pub struct CatalogService {
    backend: SharedBackend,
}

impl CatalogService {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Records of `resource`, oldest first.
    pub async fn list<T: DeserializeOwned>(&self, resource: CatalogResource) -> Vec<T> {
        let query = Query::new().order_by("created_at", Direction::Ascending);
        let rows = self
            .backend
            .select(resource.table(), &query)
            .await
            .map(|rows| decode_each::<T>(resource.table(), rows));

        match rows {
            Ok(records) => records,
            Err(err) => {
                log::error!("Failed to fetch {}: {}", resource.table(), err);
                Vec::new()
            }
        }
    }

    pub async fn destinations(&self) -> Vec<Destination> {
        self.list(CatalogResource::Destinations).await
    }

    pub async fn packages(&self) -> Vec<Package> {
        self.list(CatalogResource::Packages).await
    }
}
