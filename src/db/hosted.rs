use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use url::Url;

use crate::config::BackendConfig;
use crate::db::backend::{
    AuthProvider, AuthSession, AuthUser, BackendError, Direction, HostedBackend, ObjectStore,
    Query, SharedBackend, SignUpResult, TableStore,
};

/// reqwest client for the hosted backend's REST, auth and storage endpoints.
#[derive(Clone)]
pub struct HostedClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    bearer: Option<String>,
}

pub async fn create_hosted_client(config: &BackendConfig) -> Result<SharedBackend, BackendError> {
    log::info!("Connecting to hosted backend: {}", config.url);

    let client = HostedClient::new(config)?;

    match client.ping().await {
        Ok(_) => log::info!("Hosted backend reachable"),
        Err(e) => {
            log::warn!("Hosted backend ping failed: {}", e);
            log::warn!("The site may still work, but some functionality might be impaired");
        }
    }

    Ok(Arc::new(client))
}

impl HostedClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut raw = config.url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url =
            Url::parse(&raw).map_err(|e| BackendError::Request(format!("invalid URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            bearer: None,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Request(format!("invalid endpoint {}: {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.bearer.as_deref().unwrap_or(&self.api_key);
        request.header("apikey", &self.api_key).bearer_auth(token)
    }

    fn table_url(&self, table: &str, query: &Query) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", table))?;
        {
            let mut pairs = url.query_pairs_mut();
            match &query.embed {
                Some(embedded) => pairs.append_pair("select", &format!("*,{}(*)", embedded)),
                None => pairs.append_pair("select", "*"),
            };
            for (column, value) in &query.filters {
                pairs.append_pair(column, &format!("eq.{}", value));
            }
            if let Some((column, direction)) = &query.order {
                let suffix = match direction {
                    Direction::Ascending => "asc",
                    Direction::Descending => "desc",
                };
                pairs.append_pair("order", &format!("{}.{}", column, suffix));
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }
}

/// Postgres error code for a unique-constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<Value>(&body).ok();
    let field = |key: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let unique_violation = field("code").as_deref() == Some(UNIQUE_VIOLATION);
    let message = ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| field(key))
        .unwrap_or(body);

    // Other 409s, foreign-key violations among them, stay errors.
    Err(match status {
        StatusCode::CONFLICT if unique_violation => BackendError::Conflict,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(message),
        StatusCode::NOT_FOUND => BackendError::NotFound,
        _ => BackendError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

async fn read_rows(response: Response) -> Result<Vec<Value>, BackendError> {
    let response = check(response).await?;
    Ok(response.json::<Vec<Value>>().await?)
}

#[async_trait]
impl TableStore for HostedClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(table, query)?;
        let response = self.authorize(self.http.get(url)).send().await?;
        read_rows(response).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(table, &Query::new())?;
        let response = self
            .authorize(self.http.post(url))
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;
        read_rows(response).await
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(table, query)?;
        let response = self
            .authorize(self.http.patch(url))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        read_rows(response).await
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(table, query)?;
        let response = self
            .authorize(self.http.delete(url))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        read_rows(response).await
    }
}

#[async_trait]
impl AuthProvider for HostedClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<SignUpResult, BackendError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .authorize(self.http.post(url))
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;
        let body: Value = check(response).await?.json().await?;

        // With confirmations disabled the body is a session, otherwise a bare user.
        if body.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(body)?;
            Ok(SignUpResult {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user_value = body.get("user").cloned().unwrap_or(body);
            Ok(SignUpResult {
                user: serde_json::from_value(user_value)?,
                session: None,
            })
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let response = self
            .authorize(self.http.post(url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(check(response).await?.json::<AuthSession>().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .http
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        Ok(check(response).await?.json::<AuthUser>().await?)
    }
}

#[async_trait]
impl ObjectStore for HostedClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("storage/v1/object/{}/{}", bucket, path))?;
        let response = self
            .authorize(self.http.post(url))
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}

#[async_trait]
impl HostedBackend for HostedClient {
    fn scoped(&self, access_token: &str) -> SharedBackend {
        Arc::new(Self {
            bearer: Some(access_token.to_string()),
            ..self.clone()
        })
    }

    async fn ping(&self) -> Result<(), BackendError> {
        let url = self.endpoint("rest/v1/")?;
        let response = self.authorize(self.http.get(url)).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use uuid::Uuid;

    use super::*;
    use crate::services::session_service::{SessionError, SessionService};
    use crate::services::wishlist_service::WishlistService;

    const TAKEN_PACKAGE: Uuid = Uuid::from_u128(0xa11);

    /// Runs `configure` on a local server and points a client at it.
    fn serve<F>(configure: F) -> HostedClient
    where
        F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
    {
        let server = HttpServer::new(move || App::new().configure(configure.clone()))
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .unwrap();
        let addr = server.addrs()[0];
        actix_rt::spawn(server.run());

        HostedClient::new(&BackendConfig {
            url: format!("http://{}", addr),
            api_key: "public-key".to_string(),
        })
        .unwrap()
    }

    fn auth_user(email: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "email": email,
            "user_metadata": { "username": "ana" },
        })
    }

    fn client() -> HostedClient {
        HostedClient::new(&BackendConfig {
            url: "https://example.backend.test".to_string(),
            api_key: "public-key".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_table_url_encodes_filters_order_and_embed() {
        let query = Query::new()
            .eq("user_id", "abc")
            .embed("packages")
            .order_by("created_at", Direction::Ascending)
            .single();
        let url = client().table_url("wishlist", &query).unwrap();

        assert_eq!(url.path(), "/rest/v1/wishlist");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("select".to_string(), "*,packages(*)".to_string()),
                ("user_id".to_string(), "eq.abc".to_string()),
                ("order".to_string(), "created_at.asc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_public_url_points_at_public_bucket_path() {
        assert_eq!(
            client().public_url("destination-images", "1700000000000-abc123.jpg"),
            "https://example.backend.test/storage/v1/object/public/destination-images/1700000000000-abc123.jpg"
        );
    }

    /// Rejects every wishlist insert the way the database would: a duplicate
    /// for [`TAKEN_PACKAGE`], a missing package for anything else.
    async fn reject_wishlist_insert(rows: web::Json<Value>) -> HttpResponse {
        let package = rows[0]["package_id"].as_str().unwrap_or_default();
        if package == TAKEN_PACKAGE.to_string() {
            HttpResponse::Conflict().json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"wishlist_user_id_package_id_key\"",
            }))
        } else {
            HttpResponse::Conflict().json(json!({
                "code": "23503",
                "message": "insert or update on table \"wishlist\" violates foreign key constraint \"wishlist_package_id_fkey\"",
            }))
        }
    }

    #[actix_rt::test]
    async fn test_only_unique_violations_count_as_conflicts() {
        let client = serve(|cfg| {
            cfg.service(
                web::resource("/rest/v1/wishlist")
                    .route(web::delete().to(|| async { HttpResponse::Ok().json(json!([])) }))
                    .route(web::post().to(reject_wishlist_insert)),
            );
        });
        let wishlist = WishlistService::new(Arc::new(client));
        let user = Uuid::new_v4();

        assert!(wishlist.toggle(user, TAKEN_PACKAGE).await.unwrap());

        match wishlist.toggle(user, Uuid::from_u128(0xf000)).await {
            Err(BackendError::Api { status, message }) => {
                assert_eq!(status, 409);
                assert!(message.contains("foreign key"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_error_statuses_map_to_backend_errors() {
        let client = serve(|cfg| {
            cfg.route(
                "/rest/v1/locked",
                web::get().to(|| async {
                    HttpResponse::Unauthorized().json(json!({ "message": "JWT expired" }))
                }),
            )
            .route(
                "/rest/v1/hidden",
                web::get().to(|| async {
                    HttpResponse::Forbidden().json(json!({ "message": "permission denied" }))
                }),
            )
            .route(
                "/rest/v1/missing",
                web::get().to(|| async { HttpResponse::NotFound().finish() }),
            )
            .route(
                "/rest/v1/broken",
                web::get().to(|| async { HttpResponse::InternalServerError().body("boom") }),
            );
        });
        let query = Query::new();

        match client.select("locked", &query).await {
            Err(BackendError::Unauthorized(message)) => assert_eq!(message, "JWT expired"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            client.select("hidden", &query).await,
            Err(BackendError::Unauthorized(_))
        ));
        assert!(matches!(
            client.select("missing", &query).await,
            Err(BackendError::NotFound)
        ));
        match client.select("broken", &query).await {
            Err(BackendError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_rejected_sign_in_surfaces_auth_message() {
        let client = serve(|cfg| {
            cfg.route(
                "/auth/v1/token",
                web::post().to(|| async {
                    HttpResponse::BadRequest().json(json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid login credentials",
                    }))
                }),
            );
        });
        let sessions = SessionService::new(Arc::new(client));

        match sessions.sign_in("ana", "wrong-password").await {
            Err(SessionError::Auth(message)) => assert_eq!(message, "Invalid login credentials"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[actix_rt::test]
    async fn test_sign_up_reads_session_and_bare_user_bodies() {
        let client = serve(|cfg| {
            cfg.route(
                "/auth/v1/signup",
                web::post().to(|body: web::Json<Value>| async move {
                    let email = body["email"].as_str().unwrap_or_default();
                    let user = auth_user(email);
                    if email.starts_with("instant") {
                        HttpResponse::Ok().json(json!({
                            "access_token": "token-1",
                            "refresh_token": "refresh-1",
                            "user": user,
                        }))
                    } else {
                        HttpResponse::Ok().json(user)
                    }
                }),
            );
        });

        let immediate = client
            .sign_up("instant@wayfarer.local", "secret1", json!({}))
            .await
            .unwrap();
        let session = immediate.session.unwrap();
        assert_eq!(session.access_token, "token-1");
        assert_eq!(session.user, immediate.user);
        assert_eq!(immediate.user.email.as_deref(), Some("instant@wayfarer.local"));

        let pending = client
            .sign_up("later@wayfarer.local", "secret1", json!({}))
            .await
            .unwrap();
        assert!(pending.session.is_none());
        assert_eq!(pending.user.email.as_deref(), Some("later@wayfarer.local"));
    }

    #[actix_rt::test]
    async fn test_upload_posts_bytes_to_bucket_path() {
        type Received = Mutex<Option<(String, String, String, Vec<u8>)>>;
        let received = web::Data::new(Received::default());
        let shared = received.clone();
        let client = serve(move |cfg| {
            cfg.app_data(shared.clone()).route(
                "/storage/v1/object/{tail:.*}",
                web::post().to(
                    |req: HttpRequest, body: web::Bytes, seen: web::Data<Received>| async move {
                        let header = |name: &str| {
                            req.headers()
                                .get(name)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default()
                                .to_string()
                        };
                        *seen.lock().unwrap() = Some((
                            req.path().to_string(),
                            header("content-type"),
                            header("authorization"),
                            body.to_vec(),
                        ));
                        HttpResponse::Ok().json(json!({ "Key": "destination-images/a.jpg" }))
                    },
                ),
            );
        });

        client
            .upload("destination-images", "a.jpg", vec![0xff, 0xd8, 0xff], "image/jpeg")
            .await
            .unwrap();

        let (path, content_type, authorization, bytes) = received.lock().unwrap().take().unwrap();
        assert_eq!(path, "/storage/v1/object/destination-images/a.jpg");
        assert_eq!(content_type, "image/jpeg");
        assert_eq!(authorization, "Bearer public-key");
        assert_eq!(bytes, vec![0xff, 0xd8, 0xff]);
    }
}
