use actix_web::{web, HttpResponse, Responder};

use crate::middleware::auth_context::SessionContext;
use crate::services::booking_service::BookingService;
use crate::SiteState;

pub async fn get_booking_history(
    state: web::Data<SiteState>,
    session: SessionContext,
) -> impl Responder {
    let bookings = BookingService::new(session.backend(&state))
        .list_for_user(session.user_id)
        .await;
    HttpResponse::Ok().json(bookings)
}
