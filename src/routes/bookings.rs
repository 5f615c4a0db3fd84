use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::middleware::auth_context::SessionContext;
use crate::models::bookings::BookingForm;
use crate::services::booking_service::BookingService;
use crate::SiteState;

pub async fn create_booking(
    state: web::Data<SiteState>,
    input: web::Json<BookingForm>,
    session: Option<SessionContext>,
) -> impl Responder {
    let form = input.into_inner();

    let missing = form.missing_fields();
    if !missing.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Please fill in all required fields",
            "fields": missing,
        }));
    }

    let backend = match &session {
        Some(session) => session.backend(&state),
        None => state.backend.clone(),
    };
    let user_id = session.map(|session| session.user_id);

    if BookingService::new(backend).create(form, user_id).await {
        HttpResponse::Created().json(json!({ "success": true }))
    } else {
        HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": "We couldn't submit your booking. Please try again.",
        }))
    }
}
