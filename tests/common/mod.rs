#![allow(dead_code)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{middleware::Logger, test, web, App, Error};
use serde_json::{json, Value};
use uuid::Uuid;

use wayfarer_site::db::backend::TableStore;
use wayfarer_site::db::memory::MemoryBackend;
use wayfarer_site::db::Query;
use wayfarer_site::routes;
use wayfarer_site::services::admin_service::AdminConsole;
use wayfarer_site::SiteState;

pub const TEST_BUCKET: &str = "destination-images";
pub const TEST_PASSWORD: &str = "testpassword123";

pub struct TestApp {
    pub memory: MemoryBackend,
    pub state: web::Data<SiteState>,
}

impl TestApp {
    pub fn new() -> Self {
        let memory = MemoryBackend::new();
        let state = web::Data::new(SiteState {
            backend: Arc::new(memory.clone()),
            image_bucket: TEST_BUCKET.to_string(),
        });
        Self { memory, state }
    }

    /// An app whose catalog holds the built-in destinations and packages.
    pub async fn seeded() -> Self {
        let app = Self::new();
        AdminConsole::new(app.state.backend.clone(), TEST_BUCKET)
            .seed()
            .await
            .expect("seed catalog");
        app
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::configure)
    }

    pub async fn promote_to_admin(&self, user_id: Uuid) {
        self.memory
            .update(
                "profiles",
                &Query::new().eq("id", user_id),
                json!({ "role": "admin" }),
            )
            .await
            .expect("promote user");
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Status of a call, including errors raised by middleware.
pub async fn status_of<S, B>(app: &S, req: Request) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    }
}

/// Signs up `username` and returns its access token and user id.
pub async fn sign_up<S, B>(app: &S, username: &str) -> (String, Uuid)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "username": username,
            "password": TEST_PASSWORD,
            "full_name": format!("{} Traveler", username),
            "phone": "555-0100",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;

    let token = body["access_token"]
        .as_str()
        .expect("access token")
        .to_string();
    let user_id = body["profile"]["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("profile id");
    (token, user_id)
}

pub fn booking_json(package: &str) -> Value {
    json!({
        "name": "Ada Lovelace",
        "phone": "555-0100",
        "travelers": 2,
        "date": "2026-12-01",
        "package": package,
        "notes": "Window seat",
    })
}
