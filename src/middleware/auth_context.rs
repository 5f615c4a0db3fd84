use std::future::{ready, Ready};

use actix_web::{
    dev::Payload, error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest,
};
use uuid::Uuid;

use crate::db::SharedBackend;
use crate::models::user::UserProfile;
use crate::SiteState;

/// The signed-in caller, placed in request extensions by
/// [`AuthMiddleware`](crate::middleware::auth::AuthMiddleware).
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub access_token: String,
    pub user_id: Uuid,
    pub profile: UserProfile,
}

impl SessionContext {
    /// Backend handle acting as this user.
    pub fn backend(&self, state: &SiteState) -> SharedBackend {
        state.backend.scoped(&self.access_token)
    }
}

impl FromRequest for SessionContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<SessionContext>() {
            Some(session) => ready(Ok(session.clone())),
            None => ready(Err(ErrorUnauthorized("User not authenticated"))),
        }
    }
}
