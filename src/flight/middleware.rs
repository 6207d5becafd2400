/*
Copyright 2024-2025 The Airport Flight Authors

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

     https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Tower middleware layered in front of the Flight service: bearer-token
//! authentication and a write-path rate limiter over `DoExchange`.

use crate::config::Authenticator;
use governor::{
    state::{InMemoryState, NotKeyed},
    RateLimiter,
};
use http::HeaderValue;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

/// The identity resolved by [`AuthLayer`]; absent when no authenticator is
/// configured. Inserted into request extensions for handlers to read.
#[derive(Debug, Clone)]
pub struct Identity(pub String);

#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl AuthLayer {
    #[must_use]
    pub fn new(authenticator: Option<Arc<dyn Authenticator>>) -> Self {
        Self { authenticator }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            authenticator: self.authenticator.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for AuthMiddleware<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: 'static,
    ResBody: Default,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<ReqBody>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let authenticator = self.authenticator.clone();

        let Some(authenticator) = authenticator else {
            return Box::pin(async move { inner.call(req).await });
        };

        let token = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim_start_matches("Bearer ").to_string());

        Box::pin(async move {
            let Some(token) = token else {
                return Ok(unauthenticated_response::<ResBody>());
            };
            match authenticator.authenticate(&token).await {
                Ok(identity) => {
                    req.extensions_mut().insert(Identity(identity));
                    inner.call(req).await
                }
                Err(_) => Ok(unauthenticated_response::<ResBody>()),
            }
        })
    }
}

fn unauthenticated_response<ResBody: Default>() -> http::Response<ResBody> {
    let mut response = http::Response::new(ResBody::default());
    if let Ok(status) = HeaderValue::from_str(&format!("{}", tonic::Code::Unauthenticated as i32)) {
        response.headers_mut().insert("grpc-status", status);
    }
    response
        .headers_mut()
        .insert("grpc-message", HeaderValue::from_static("missing or invalid bearer token"));
    response
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, governor::clock::DefaultClock>;

/// Enforces a request-rate cap on `DoExchange`, the only write path this
/// service exposes.
#[derive(Clone)]
pub struct ExchangeRateLimitLayer {
    rate_limiter: Arc<DirectRateLimiter>,
}

impl ExchangeRateLimitLayer {
    #[must_use]
    pub fn new(quota: governor::Quota) -> Self {
        Self {
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

impl<S> Layer<S> for ExchangeRateLimitLayer {
    type Service = ExchangeRateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExchangeRateLimitMiddleware {
            inner,
            rate_limiter: Arc::clone(&self.rate_limiter),
        }
    }
}

#[derive(Clone)]
pub struct ExchangeRateLimitMiddleware<S> {
    inner: S,
    rate_limiter: Arc<DirectRateLimiter>,
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for ExchangeRateLimitMiddleware<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ResBody: Default,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<ReqBody>) -> Self::Future {
        if req.uri().path() != "/arrow.flight.protocol.FlightService/DoExchange" {
            return Box::pin(self.inner.call(req));
        }

        if self.rate_limiter.check().is_err() {
            return Box::pin(async move {
                let mut response = http::Response::new(ResBody::default());
                *response.status_mut() = http::StatusCode::TOO_MANY_REQUESTS;
                if let Ok(status) =
                    HeaderValue::from_str(&format!("{}", tonic::Code::ResourceExhausted as i32))
                {
                    response.headers_mut().insert("grpc-status", status);
                }
                Ok(response)
            });
        }

        Box::pin(self.inner.call(req))
    }
}
