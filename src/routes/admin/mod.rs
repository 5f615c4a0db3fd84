use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::BackendError;
use crate::middleware::auth::AuthMiddleware;
use crate::middleware::auth_context::SessionContext;
use crate::middleware::role_auth::RequireRole;
use crate::models::user::UserRole;
use crate::services::admin_service::{AdminConsole, AdminError};
use crate::SiteState;

pub mod bookings;
pub mod catalog;
pub mod users;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(AuthMiddleware::required())
            .route("/bookings", web::get().to(bookings::list_bookings))
            .route(
                "/bookings/{id}/status",
                web::put().to(bookings::update_booking_status),
            )
            .route("/bookings/{id}", web::delete().to(bookings::delete_booking))
            .route("/users", web::get().to(users::list_users))
            .route("/users/{id}", web::put().to(users::update_user))
            .route(
                "/users/{id}/password",
                web::post().to(users::reset_password),
            )
            .route("/destinations", web::get().to(catalog::list_destinations))
            .route("/destinations", web::post().to(catalog::create_destination))
            .route(
                "/destinations/{id}",
                web::put().to(catalog::update_destination),
            )
            .route(
                "/destinations/{id}",
                web::delete().to(catalog::delete_destination),
            )
            .route("/packages", web::get().to(catalog::list_packages))
            .route("/packages", web::post().to(catalog::create_package))
            .route("/packages/{id}", web::put().to(catalog::update_package))
            .route("/packages/{id}", web::delete().to(catalog::delete_package))
            .route("/seed", web::post().to(catalog::seed)),
    );
}

pub(crate) fn console(state: &SiteState, session: &SessionContext) -> AdminConsole {
    AdminConsole::new(session.backend(state), state.image_bucket.clone())
}

pub(crate) fn error_response(err: AdminError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        AdminError::InvalidCredentials => HttpResponse::Unauthorized().json(body),
        AdminError::PasswordResetUnavailable => HttpResponse::NotImplemented().json(body),
        AdminError::MissingField(_) | AdminError::Image(_) => {
            HttpResponse::BadRequest().json(body)
        }
        AdminError::Backend(BackendError::NotFound) => HttpResponse::NotFound().json(body),
        AdminError::Backend(BackendError::Conflict) => HttpResponse::Conflict().json(body),
        other => {
            log::error!("Admin operation failed: {}", other);
            HttpResponse::InternalServerError().json(json!({ "error": "Operation failed" }))
        }
    }
}
