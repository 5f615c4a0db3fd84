use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorUnauthorized},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::middleware::auth_context::SessionContext;
use crate::models::user::UserRole;

/// Requires the session's profile role. Must sit inside
/// [`AuthMiddleware`](crate::middleware::auth::AuthMiddleware), i.e. be
/// wrapped before it.
pub struct RequireRole {
    required_role: UserRole,
}

impl RequireRole {
    pub fn new(role: UserRole) -> Self {
        RequireRole {
            required_role: role,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireRoleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            required_role: self.required_role,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    required_role: UserRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let role = req
            .extensions()
            .get::<SessionContext>()
            .map(|session| session.profile.role);

        match role {
            Some(role) if role == self.required_role || role == UserRole::Admin => {
                Box::pin(self.service.call(req))
            }
            Some(role) => {
                log::warn!(
                    "Access denied: role {:?}, required {:?}",
                    role,
                    self.required_role
                );
                Box::pin(ready(Err(ErrorForbidden("Insufficient permissions"))))
            }
            None => Box::pin(ready(Err(ErrorUnauthorized("No authorization")))),
        }
    }
}
