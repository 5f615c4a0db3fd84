use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use serde_json::json;

use crate::db::backend::{AuthSession, SignUpResult};
use crate::middleware::auth_context::SessionContext;
use crate::models::user::{Credentials, SignUpForm, UserProfile};
use crate::services::session_service::{SessionError, SessionService};
use crate::SiteState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    access_token: String,
    refresh_token: Option<String>,
    profile: UserProfile,
}

async fn session_response(service: &SessionService, session: AuthSession) -> SessionResponse {
    let profile = service
        .resolve_profile(&session.user, &session.access_token)
        .await;
    SessionResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        profile,
    }
}

pub async fn signup(state: web::Data<SiteState>, input: web::Json<SignUpForm>) -> impl Responder {
    let form = input.into_inner();
    if form.username.trim().is_empty() || form.password.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Username and password are required" }));
    }

    let service = SessionService::new(state.backend.clone());
    match service.sign_up(&form).await {
        Ok(SignUpResult {
            session: Some(session),
            ..
        }) => HttpResponse::Ok().json(session_response(&service, session).await),
        Ok(SignUpResult {
            user,
            session: None,
        }) => HttpResponse::Accepted().json(json!({
            "user_id": user.id,
            "message": "Account created. Confirm it before signing in.",
        })),
        Err(SessionError::Auth(message)) => {
            HttpResponse::BadRequest().json(json!({ "error": message }))
        }
        Err(err) => {
            log::error!("Failed to create account: {}", err);
            HttpResponse::InternalServerError().body("Failed to create account.")
        }
    }
}

pub async fn signin(state: web::Data<SiteState>, input: web::Json<Credentials>) -> impl Responder {
    let credentials = input.into_inner();
    let service = SessionService::new(state.backend.clone());

    match service
        .sign_in(&credentials.username, &credentials.password)
        .await
    {
        Ok(session) => HttpResponse::Ok().json(session_response(&service, session).await),
        Err(SessionError::Auth(message)) => {
            HttpResponse::Unauthorized().json(json!({ "error": message }))
        }
        Err(err) => {
            log::error!("Sign-in failed: {}", err);
            HttpResponse::InternalServerError().body("Failed to sign in.")
        }
    }
}

pub async fn signout(state: web::Data<SiteState>, session: SessionContext) -> impl Responder {
    if let Err(err) = SessionService::new(state.backend.clone())
        .sign_out(&session.access_token)
        .await
    {
        log::warn!("Sign-out request failed for {}: {}", session.user_id, err);
    }
    HttpResponse::Ok().body("Signed out")
}

pub async fn user_session(session: SessionContext) -> impl Responder {
    HttpResponse::Ok().json(session.profile)
}
