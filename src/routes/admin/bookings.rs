use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::middleware::auth_context::SessionContext;
use crate::models::bookings::StatusUpdate;
use crate::routes::admin::{console, error_response};
use crate::services::admin_service::{filter_bookings, page_count, paginate};
use crate::SiteState;

const PER_PAGE: usize = 20;

#[derive(Deserialize)]
pub struct QueryParams {
    search: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

pub async fn list_bookings(
    state: web::Data<SiteState>,
    session: SessionContext,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let bookings = console(&state, &session).bookings().await;
    let filtered = filter_bookings(&bookings, params.search.as_deref().unwrap_or(""));

    let per_page = params.per_page.unwrap_or(PER_PAGE).max(1);
    let page = params.page.unwrap_or(0);

    HttpResponse::Ok().json(json!({
        "items": paginate(&filtered, page, per_page),
        "total": filtered.len(),
        "page": page,
        "pages": page_count(filtered.len(), per_page),
    }))
}

pub async fn update_booking_status(
    state: web::Data<SiteState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    input: web::Json<StatusUpdate>,
) -> impl Responder {
    match console(&state, &session)
        .update_booking_status(path.into_inner(), input.status)
        .await
    {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err),
    }
}

pub async fn delete_booking(
    state: web::Data<SiteState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> impl Responder {
    match console(&state, &session)
        .delete_booking(path.into_inner())
        .await
    {
        Ok(_) => HttpResponse::Ok().body("Booking deleted"),
        Err(err) => error_response(err),
    }
}
