//! Account and session wire types

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Minimum local-account password length
pub const PASSWORD_MIN_LEN: usize = 8;

/// Session cookie name
pub const SESSION_COOKIE: &str = "tv_session";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Issued on signup/login; the same token is also set as the session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: SessionInfo,
}

/// Current session as reported by `GET /api/auth/session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub email: String,
    pub has_profile: bool,
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_rules() {
        let ok = SignupRequest {
            email: "a@b.co".into(),
            password: "x".repeat(PASSWORD_MIN_LEN),
        };
        assert!(ok.validate().is_ok());

        let short = SignupRequest {
            email: "a@b.co".into(),
            password: "short".into(),
        };
        assert!(short.validate().unwrap_err().field_errors().contains_key("password"));

        let bad_email = SignupRequest {
            email: "nope".into(),
            password: "long enough".into(),
        };
        assert!(bad_email.validate().unwrap_err().field_errors().contains_key("email"));
    }
}
