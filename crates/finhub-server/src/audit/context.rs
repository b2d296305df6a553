//! Request context for audit records
//!
//! Caller identity is established by an upstream authentication layer and
//! arrives on trusted headers. It is read once at the service boundary
//! into an explicit [`RequestContext`] value that is passed to the audit
//! writer; the audit core never reaches into ambient state.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

/// Fallback actor when no caller context is bound (background jobs,
/// startup health checks).
pub const SYSTEM_USER_ID: &str = "system";

/// Identity and request metadata for the in-flight unit of work.
///
/// All fields are best-effort except `user_id`, which falls back to
/// [`SYSTEM_USER_ID`]. This type only reads identity; it never validates
/// or establishes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: String,
    pub user_email: Option<String>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub http_method: Option<String>,
    pub endpoint: Option<String>,
}

impl RequestContext {
    /// Context for work with no inbound request attached.
    pub fn system() -> Self {
        Self {
            user_id: SYSTEM_USER_ID.to_string(),
            user_email: None,
            session_id: None,
            ip_address: None,
            user_agent: None,
            http_method: None,
            endpoint: None,
        }
    }

    /// Whether this context carries an authenticated caller.
    pub fn is_authenticated(&self) -> bool {
        self.user_id != SYSTEM_USER_ID
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::system()
    }
}

fn header_string(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Identity headers are set by the authentication service in front
        // of this one.
        let user_id = header_string(parts, "x-user-id")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| SYSTEM_USER_ID.to_string());

        // Prefer the proxy-reported client address over the socket peer.
        let ip_address = header_string(parts, "x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ci| ci.0.ip().to_string())
            });

        Ok(RequestContext {
            user_id,
            user_email: header_string(parts, "x-user-email"),
            session_id: header_string(parts, "x-session-id"),
            ip_address,
            user_agent: header_string(parts, "user-agent"),
            http_method: Some(parts.method.to_string()),
            endpoint: Some(parts.uri.path().to_string()),
        })
    }
}
