//! Session Middleware
//!
//! Every visitor gets a session, identified by an HMAC-signed cookie. A
//! missing or forged cookie simply starts a new session.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use platform::cookie::CookieConfig;
use platform::session_token::{sign_session_token, verify_session_token};

use crate::application::config::SessionConfig;
use crate::domain::value_objects::SessionId;

/// Session of the current request, inserted by [`resolve_session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentSession(pub SessionId);

/// Signs and reads the session cookie
#[derive(Debug, Clone)]
pub struct SessionCookie {
    secret: [u8; 32],
    cookie: CookieConfig,
}

impl SessionCookie {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secret: config.secret,
            cookie: CookieConfig::session(
                config.cookie_name.clone(),
                config.cookie_secure,
                config.ttl.as_secs(),
            ),
        }
    }

    /// Session named by a validly signed cookie
    pub fn resolve(&self, headers: &HeaderMap) -> Option<SessionId> {
        let token = platform::cookie::extract_cookie(headers, &self.cookie.name)?;
        verify_session_token(&token, &self.secret).map(SessionId::from_bytes)
    }

    /// `Set-Cookie` value for `session_id`
    pub fn set_cookie(&self, session_id: SessionId) -> String {
        let token = sign_session_token(session_id.as_bytes(), &self.secret);
        self.cookie.build_set_cookie(&token)
    }
}

/// Resolve or start the visitor's session and refresh its cookie
///
/// The cookie is re-issued on every response so its Max-Age slides along
/// with the server-side idle timeout.
pub async fn resolve_session(
    State(cookies): State<SessionCookie>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let session_id = match cookies.resolve(req.headers()) {
        Some(id) => id,
        None => {
            let id = SessionId::new();
            tracing::debug!(session_id = %id, "Starting new session");
            id
        }
    };

    req.extensions_mut().insert(CurrentSession(session_id));

    let mut response = next.run(req).await;

    match HeaderValue::from_str(&cookies.set_cookie(session_id)) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "Session cookie is not a valid header value"),
    }

    response
}
