use actix_web::web;

use crate::middleware::auth::AuthMiddleware;

pub mod auth;
pub mod bookings;
pub mod favorites;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(auth::signup))
            .route("/signin", web::post().to(auth::signin))
            .service(
                web::resource("/signout")
                    .wrap(AuthMiddleware::required())
                    .route(web::post().to(auth::signout)),
            )
            .service(
                web::resource("/session")
                    .wrap(AuthMiddleware::required())
                    .route(web::get().to(auth::user_session)),
            ),
    )
    .service(
        web::scope("/account")
            .wrap(AuthMiddleware::required())
            .route("/wishlist", web::get().to(favorites::get_wishlist))
            .route(
                "/wishlist/{package_id}",
                web::post().to(favorites::toggle_wishlist),
            )
            .route("/bookings", web::get().to(bookings::get_booking_history)),
    );
}
