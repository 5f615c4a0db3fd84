use serde_json::json;
use uuid::Uuid;

use crate::db::{BackendError, Direction, Query, SharedBackend};
use crate::models::wishlist::WishlistItem;
use crate::services::decode_each;

pub const WISHLIST_TABLE: &str = "wishlist";

#[derive(Clone)]
pub struct WishlistService {
    backend: SharedBackend,
}

impl WishlistService {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    fn key(user_id: Uuid, package_id: Uuid) -> Query {
        Query::new()
            .eq("user_id", user_id)
            .eq("package_id", package_id)
    }

    /// Flips membership of `package_id` and returns the new state.
    ///
    /// Deletes by the (user, package) key first; only when nothing was removed
    /// is a row inserted. An insert that hits the unique key lost a race with
    /// another toggle that just added the row, so the package is a member.
    pub async fn toggle(&self, user_id: Uuid, package_id: Uuid) -> Result<bool, BackendError> {
        let removed = self
            .backend
            .delete(WISHLIST_TABLE, &Self::key(user_id, package_id))
            .await?;
        if !removed.is_empty() {
            log::debug!("Removed package {} from wishlist of {}", package_id, user_id);
            return Ok(false);
        }

        let row = json!({ "user_id": user_id, "package_id": package_id });
        match self.backend.insert(WISHLIST_TABLE, vec![row]).await {
            Ok(_) | Err(BackendError::Conflict) => {
                log::debug!("Added package {} to wishlist of {}", package_id, user_id);
                Ok(true)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn contains(&self, user_id: Uuid, package_id: Uuid) -> Result<bool, BackendError> {
        let rows = self
            .backend
            .select(WISHLIST_TABLE, &Self::key(user_id, package_id).single())
            .await?;
        Ok(!rows.is_empty())
    }

    /// Wishlist rows with their package joined in, oldest first.
    pub async fn list(&self, user_id: Uuid) -> Vec<WishlistItem> {
        let query = Query::new()
            .eq("user_id", user_id)
            .embed("packages")
            .order_by("created_at", Direction::Ascending);
        match self
            .backend
            .select(WISHLIST_TABLE, &query)
            .await
            .map(|rows| decode_each::<WishlistItem>(WISHLIST_TABLE, rows))
        {
            Ok(items) => items,
            Err(err) => {
                log::error!("Failed to fetch wishlist for {}: {}", user_id, err);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::backend::TableStore;
    use crate::db::memory::MemoryBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_toggle_twice_restores_membership() {
        let backend = MemoryBackend::new();
        let wishlist = WishlistService::new(Arc::new(backend.clone()));
        let (user, package) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(!wishlist.contains(user, package).await.unwrap());
        assert!(wishlist.toggle(user, package).await.unwrap());
        assert!(wishlist.contains(user, package).await.unwrap());
        assert!(!wishlist.toggle(user, package).await.unwrap());
        assert!(!wishlist.contains(user, package).await.unwrap());
        assert!(backend.rows(WISHLIST_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_toggle_is_scoped_to_user_and_package() {
        let backend = MemoryBackend::new();
        let wishlist = WishlistService::new(Arc::new(backend.clone()));
        let (ana, ben, package) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        wishlist.toggle(ana, package).await.unwrap();
        assert!(wishlist.toggle(ben, package).await.unwrap());
        assert!(wishlist.contains(ana, package).await.unwrap());
        assert_eq!(backend.rows(WISHLIST_TABLE).len(), 2);
    }

    #[tokio::test]
    async fn test_list_joins_package_snapshot() {
        let backend = MemoryBackend::new();
        let package = Uuid::new_v4();
        backend
            .insert(
                "packages",
                vec![json!({ "id": package, "name": "Explorer", "price": "$1,299", "color": "white", "features": ["Breakfast"] })],
            )
            .await
            .unwrap();
        let wishlist = WishlistService::new(Arc::new(backend));
        let user = Uuid::new_v4();
        wishlist.toggle(user, package).await.unwrap();

        let items = wishlist.list(user).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].package.as_ref().map(|p| p.name.as_str()), Some("Explorer"));
    }

    #[tokio::test]
    async fn test_toggle_surfaces_backend_errors() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        let wishlist = WishlistService::new(Arc::new(backend));
        assert!(wishlist.toggle(Uuid::new_v4(), Uuid::new_v4()).await.is_err());
    }
}
