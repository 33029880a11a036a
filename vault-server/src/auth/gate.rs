//! Page gate
//!
//! Decides, for every HTML page request, whether to serve it or redirect.
//! `decide` is pure; `page_gate` resolves the session and profile state and
//! applies the decision.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::identity_from_headers;
use crate::db;
use crate::state::AppState;

/// Where a signed-in user with a profile lands
pub const HOME_PATH: &str = "/collection";
pub const LOGIN_PATH: &str = "/login";
pub const SETUP_PATH: &str = "/setup-username";

/// Pages only meaningful to signed-out users
const AUTH_PAGES: &[&str] = &["/login", "/signup"];

/// Paths the gate never interferes with
const OPEN_PATHS: &[&str] = &["/", "/health", "/auth/callback"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    /// Signed in, username not chosen yet
    NoProfile,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(String),
}

fn is_auth_page(path: &str) -> bool {
    AUTH_PAGES.contains(&path)
}

/// Gate decision for a page path (query string included in `path_and_query`)
pub fn decide(path: &str, path_and_query: &str, session: SessionState) -> GateDecision {
    if OPEN_PATHS.contains(&path) {
        return GateDecision::Allow;
    }

    match session {
        SessionState::Anonymous => {
            if is_auth_page(path) {
                GateDecision::Allow
            } else {
                GateDecision::Redirect(format!(
                    "{LOGIN_PATH}?redirectTo={}",
                    urlencoding::encode(path_and_query)
                ))
            }
        }
        SessionState::NoProfile => {
            if path == SETUP_PATH {
                GateDecision::Allow
            } else {
                GateDecision::Redirect(SETUP_PATH.to_string())
            }
        }
        SessionState::Ready => {
            if is_auth_page(path) || path == SETUP_PATH {
                GateDecision::Redirect(HOME_PATH.to_string())
            } else {
                GateDecision::Allow
            }
        }
    }
}

/// Middleware applied to page routes
pub async fn page_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let session = match identity_from_headers(request.headers(), &state.jwt_secret) {
        None => SessionState::Anonymous,
        Some(identity) => match db::profiles::exists(&state.pool, identity.user_id).await {
            Ok(true) => SessionState::Ready,
            Ok(false) => SessionState::NoProfile,
            Err(e) => {
                tracing::error!(user_id = %identity.user_id, error = %e, "Profile lookup failed in page gate");
                return shared::error::AppError::internal("Profile lookup failed").into_response();
            }
        },
    };

    match decide(&path, &path_and_query, session) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(to) => Redirect::to(&to).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(to: &str) -> GateDecision {
        GateDecision::Redirect(to.to_string())
    }

    #[test]
    fn anonymous_is_sent_to_login_with_return_path() {
        assert_eq!(
            decide("/collection", "/collection?sort=year", SessionState::Anonymous),
            redirect("/login?redirectTo=%2Fcollection%3Fsort%3Dyear")
        );
        assert_eq!(
            decide("/setup-username", "/setup-username", SessionState::Anonymous),
            redirect("/login?redirectTo=%2Fsetup-username")
        );
        assert_eq!(
            decide("/login", "/login", SessionState::Anonymous),
            GateDecision::Allow
        );
        assert_eq!(
            decide("/signup", "/signup", SessionState::Anonymous),
            GateDecision::Allow
        );
    }

    #[test]
    fn missing_profile_forces_setup() {
        for path in ["/collection", "/forums", "/login", "/profile"] {
            assert_eq!(
                decide(path, path, SessionState::NoProfile),
                redirect("/setup-username"),
                "{path}"
            );
        }
        assert_eq!(
            decide("/setup-username", "/setup-username", SessionState::NoProfile),
            GateDecision::Allow
        );
    }

    #[test]
    fn ready_user_skips_auth_pages() {
        for path in ["/login", "/signup", "/setup-username"] {
            assert_eq!(
                decide(path, path, SessionState::Ready),
                redirect("/collection"),
                "{path}"
            );
        }
        assert_eq!(
            decide("/marketplace", "/marketplace", SessionState::Ready),
            GateDecision::Allow
        );
    }

    #[test]
    fn open_paths_always_allowed() {
        for session in [
            SessionState::Anonymous,
            SessionState::NoProfile,
            SessionState::Ready,
        ] {
            assert_eq!(
                decide("/auth/callback", "/auth/callback?code=x", session),
                GateDecision::Allow
            );
            assert_eq!(decide("/", "/", session), GateDecision::Allow);
        }
    }
}
