use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::auth_context::SessionContext;
use crate::models::user::ProfileUpdate;
use crate::routes::admin::{console, error_response};
use crate::SiteState;

#[derive(Deserialize)]
pub struct PasswordReset {
    #[serde(default)]
    password: String,
}

pub async fn list_users(state: web::Data<SiteState>, session: SessionContext) -> impl Responder {
    HttpResponse::Ok().json(console(&state, &session).users().await)
}

pub async fn update_user(
    state: web::Data<SiteState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    input: web::Json<ProfileUpdate>,
) -> impl Responder {
    match console(&state, &session)
        .update_user(path.into_inner(), &input)
        .await
    {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(err) => error_response(err),
    }
}

pub async fn reset_password(
    state: web::Data<SiteState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    input: web::Json<PasswordReset>,
) -> impl Responder {
    match console(&state, &session)
        .reset_password(path.into_inner(), &input.password)
        .await
    {
        Ok(_) => HttpResponse::Ok().body("Password updated"),
        Err(err) => error_response(err),
    }
}
