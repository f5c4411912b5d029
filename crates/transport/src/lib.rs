//! Request transport abstraction for the GraphQL API client
//!
//! Defines the `Transport` trait that decouples operation code from how a
//! request actually reaches the network. `ReqwestTransport` performs real HTTP
//! calls; the session layer implements the same trait as a decorator that
//! carries credentials, and tests substitute scripted transports.
//!
//! A transport reports any HTTP status as `Ok`. Only failures to complete the
//! exchange at all (connect errors, timeouts, unreadable bodies) are `Err`.

pub mod error;
pub mod graphql;
pub mod http;
pub mod reqwest_transport;

pub use error::{Error, Result};
pub use graphql::{GraphqlError, GraphqlErrorLocation, GraphqlRequest, GraphqlResponse};
pub use http::{HttpRequest, HttpResponse};
pub use reqwest_transport::ReqwestTransport;

pub use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
pub use reqwest::{Method, StatusCode};

use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by `Transport::send`.
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>>;

/// One request in, one response out.
///
/// Implementations must not retry or reinterpret responses; that is the job of
/// decorators layered on top (see the `session` crate).
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn Transport>`).
pub trait Transport: Send + Sync {
    /// Identifier for logging (e.g. "reqwest", "session").
    fn id(&self) -> &str;

    /// Perform a single exchange.
    fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}
