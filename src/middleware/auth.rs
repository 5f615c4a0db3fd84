use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorInternalServerError, ErrorUnauthorized},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::middleware::auth_context::SessionContext;
use crate::services::session_service::SessionService;
use crate::SiteState;

/// Resolves `Authorization: Bearer <token>` against the hosted backend and
/// stores a [`SessionContext`] in the request extensions.
///
/// `required()` rejects requests without a valid token; `optional()` lets
/// anonymous requests through but still rejects a bad token.
#[derive(Clone, Copy)]
pub struct AuthMiddleware {
    required: bool,
}

impl AuthMiddleware {
    pub fn required() -> Self {
        Self { required: true }
    }

    pub fn optional() -> Self {
        Self { required: false }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    required: bool,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = self.required;

        Box::pin(async move {
            let Some(token) = bearer_token(&req) else {
                if required {
                    return Err(ErrorUnauthorized("No authorization header"));
                }
                return service.call(req).await;
            };

            let state = req
                .app_data::<web::Data<SiteState>>()
                .cloned()
                .ok_or_else(|| ErrorInternalServerError("Site state not configured"))?;
            let sessions = SessionService::new(state.backend.clone());

            match sessions.session_user(&token).await {
                Ok(user) => {
                    let profile = sessions.resolve_profile(&user, &token).await;
                    req.extensions_mut().insert(SessionContext {
                        access_token: token,
                        user_id: user.id,
                        profile,
                    });
                    service.call(req).await
                }
                Err(err) => {
                    log::warn!("Rejected bearer token: {}", err);
                    Err(ErrorUnauthorized("Invalid token"))
                }
            }
        })
    }
}
