//! Session decoding middleware and the authorization gate.

use std::future::{ready, Ready};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, HttpMessage, HttpRequest, HttpResponse};
use pb_core::models::Identity;

use crate::handlers::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "parkboard_session";

/// Request-scoped authentication marker. Always present once the
/// middleware has run; `None` is the explicit unauthenticated state.
#[derive(Clone)]
pub struct CurrentUser(pub Option<Identity>);

/// Decodes the inbound session cookie once per request, first in the
/// pipeline.
///
/// Every decode failure (missing cookie, bad signature, expired,
/// malformed) resolves to the anonymous state. The middleware never
/// rejects a request and never surfaces the decode error to handlers.
pub struct SessionDecoder;

impl<S, B> Transform<S, ServiceRequest> for SessionDecoder
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionDecoderService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionDecoderService { service }))
    }
}

pub struct SessionDecoderService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for SessionDecoderService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let identity = req.cookie(SESSION_COOKIE).and_then(|cookie| {
            let state = req.app_data::<web::Data<AppState>>()?;
            state.auth.verify_session(cookie.value()).ok()
        });
        req.extensions_mut().insert(CurrentUser(identity));
        self.service.call(req)
    }
}

/// The identity attached by `SessionDecoder`, if any.
pub fn current_user(req: &HttpRequest) -> Option<Identity> {
    req.extensions()
        .get::<CurrentUser>()
        .and_then(|user| user.0.clone())
}

/// Request guard for owner-scoped routes: passes the identity through or
/// short-circuits with a redirect to the entry page. Every protected
/// route answers an anonymous caller identically.
pub fn require_login(req: &HttpRequest) -> Result<Identity, HttpResponse> {
    current_user(req).ok_or_else(|| {
        HttpResponse::SeeOther()
            .insert_header(("Location", "/"))
            .finish()
    })
}
