use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};

use crate::domain::access::AccessState;
use crate::domain::error::DomainError;
use crate::domain::session::SessionUser;
use crate::presentation::middleware::RequestId;

/// Whoever the access middleware resolved for this request.
#[derive(Debug, Clone)]
pub struct Caller(pub AccessState);

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req
            .extensions()
            .get::<AccessState>()
            .cloned()
            .unwrap_or(AccessState::Unauthenticated);
        ready(Ok(Caller(state)))
    }
}

#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionUser);

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AccessState>() {
            Some(AccessState::Admin(user)) => ready(Ok(AdminUser(user.clone()))),
            _ => ready(Err(DomainError::Forbidden.into())),
        }
    }
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
