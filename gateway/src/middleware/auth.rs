//! Bearer-token middleware (spec §4.7), grounded in the same
//! actix `Transform`/`Service` shape the corpus uses for its JWT
//! middleware, but permissive: verification failures never reject the
//! request, they just leave the identity unset. Enforcement is the
//! resolver's job.

use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;

pub use token_auth::Identity;
use token_auth::TokenService;

pub struct AuthMiddleware {
    tokens: Arc<TokenService>,
}

impl AuthMiddleware {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    tokens: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        const PREFIX: &str = "Bearer ";

        let identity = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .filter(|h| h.starts_with(PREFIX))
            .map(|h| h[PREFIX.len()..].trim())
            .filter(|token| !token.is_empty())
            .and_then(|token| self.tokens.verify(token).ok());

        if let Some(identity) = identity {
            req.extensions_mut().insert(identity);
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}
