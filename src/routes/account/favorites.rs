use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

use crate::middleware::auth_context::SessionContext;
use crate::services::wishlist_service::WishlistService;
use crate::SiteState;

pub async fn get_wishlist(state: web::Data<SiteState>, session: SessionContext) -> impl Responder {
    let items = WishlistService::new(session.backend(&state))
        .list(session.user_id)
        .await;
    HttpResponse::Ok().json(items)
}

pub async fn toggle_wishlist(
    state: web::Data<SiteState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> impl Responder {
    let package_id = path.into_inner();

    match WishlistService::new(session.backend(&state))
        .toggle(session.user_id, package_id)
        .await
    {
        Ok(wishlisted) => HttpResponse::Ok().json(json!({
            "package_id": package_id,
            "wishlisted": wishlisted,
        })),
        Err(err) => {
            log::error!("Failed to toggle wishlist: {}", err);
            HttpResponse::InternalServerError().body("Failed to update wishlist")
        }
    }
}
