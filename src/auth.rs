//! Request identity — typed carrier for the user the session layer resolved.
//!
//! The session layer sits upstream of this service. It attaches an
//! [`AuthenticatedUser`] to the request extensions; handlers read it back with
//! the [`CurrentUser`] extractor and turn it into a [`UserId`] before touching
//! the store.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderName;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::OnboardingError;

/// Identity attached to a request by the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
}

impl AuthenticatedUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A non-empty user id. Only constructed through [`UserId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Returns `None` for an empty (or all-whitespace) id. Otherwise the id
    /// is kept byte-for-byte; `" u1"` and `"u1"` are different users.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the request identity. Missing and empty ids are treated the same.
pub fn require_user(user: Option<&AuthenticatedUser>) -> Result<UserId, OnboardingError> {
    user.and_then(|u| UserId::parse(&u.id))
        .ok_or(OnboardingError::Unauthorized)
}

/// Extractor for the optional identity. Never rejects; the handler decides.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(
            parts.extensions.get::<AuthenticatedUser>().cloned(),
        ))
    }
}

/// State for [`identity_from_header`].
#[derive(Clone)]
pub struct IdentityHeader {
    name: Arc<HeaderName>,
}

impl IdentityHeader {
    pub fn new(name: HeaderName) -> Self {
        Self {
            name: Arc::new(name),
        }
    }
}

/// Middleware: copy the trusted identity header into an [`AuthenticatedUser`].
///
/// The header must be set by a gateway that strips client-supplied values.
/// A missing or non-UTF-8 header leaves the request without an identity.
pub async fn identity_from_header(
    State(header): State<IdentityHeader>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = request
        .headers()
        .get(header.name.as_ref())
        .and_then(|v| v.to_str().ok())
        .map(AuthenticatedUser::new);

    match user {
        Some(user) => {
            request.extensions_mut().insert(user);
        }
        None => debug!(header = %header.name, "No identity header on request"),
    }

    next.run(request).await
}
