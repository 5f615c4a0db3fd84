use actix_web::web;

use crate::middleware::auth::AuthMiddleware;

pub mod account;
pub mod admin;
pub mod bookings;
pub mod catalog;
pub mod health;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                // Public routes
                .route("/destinations", web::get().to(catalog::get_destinations))
                .route("/packages", web::get().to(catalog::get_packages))
                .service(
                    web::resource("/bookings")
                        .wrap(AuthMiddleware::optional())
                        .route(web::post().to(bookings::create_booking)),
                )
                .configure(account::config)
                // Protected routes
                .configure(admin::config),
        );
}
