//! Unified error codes for the vault service
//!
//! Error codes are shared by the server, the client library and any front end.
//! They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Profile errors
//! - 4xxx: Catalog item errors
//! - 5xxx: Collection errors
//! - 6xxx: Upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Session has expired
    SessionExpired = 1005,
    /// Too many login attempts, cooldown active
    TooManyAttempts = 1006,
    /// Password too short
    PasswordTooShort = 1007,
    /// Hosted auth provider is not configured
    AuthProviderNotConfigured = 1008,
    /// Auth code exchange with the provider failed
    AuthCodeExchangeFailed = 1009,
    /// Email already registered
    EmailAlreadyRegistered = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Profile ====================
    /// Profile not found
    ProfileNotFound = 3001,
    /// A profile must be created before this operation
    ProfileRequired = 3002,
    /// Username already taken
    UsernameTaken = 3003,
    /// Username does not match the allowed format
    UsernameInvalid = 3004,

    // ==================== 4xxx: Catalog ====================
    /// Catalog item not found
    ItemNotFound = 4001,
    /// Listing status "For Sale" requires a price
    PriceRequired = 4002,
    /// Price is negative or malformed
    InvalidPrice = 4003,
    /// Too many ids in one bulk action
    BulkTooLarge = 4004,
    /// Bulk action without ids
    BulkEmpty = 4005,
    /// Item image not found
    ImageNotFound = 4101,

    // ==================== 5xxx: Collection ====================
    /// Collection not found
    CollectionNotFound = 5001,
    /// Collection name is required
    CollectionNameRequired = 5002,

    // ==================== 6xxx: Upload ====================
    /// File too large
    FileTooLarge = 6001,
    /// Unsupported file format
    UnsupportedFileFormat = 6002,
    /// Invalid/corrupted image file
    InvalidImageFile = 6003,
    /// No file provided in request
    NoFileProvided = 6004,
    /// Empty file provided
    EmptyFile = 6005,
    /// Media host rejected or failed the upload
    FileStorageFailed = 6006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Too many concurrent connections or resources
    ResourceLimitExceeded = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::TooManyAttempts => "Too many login attempts, try again later",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::AuthProviderNotConfigured => "Authentication provider is not configured",
            ErrorCode::AuthCodeExchangeFailed => "Could not complete sign-in",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Profile
            ErrorCode::ProfileNotFound => "Profile not found",
            ErrorCode::ProfileRequired => "Choose a username first",
            ErrorCode::UsernameTaken => "Username is already taken",
            ErrorCode::UsernameInvalid => {
                "Username must be 3-30 characters of letters, digits or underscore"
            }

            // Catalog
            ErrorCode::ItemNotFound => "Item not found",
            ErrorCode::PriceRequired => "Items listed For Sale need a price",
            ErrorCode::InvalidPrice => "Price must not be negative",
            ErrorCode::BulkTooLarge => "Too many items selected",
            ErrorCode::BulkEmpty => "No items selected",
            ErrorCode::ImageNotFound => "Image not found",

            // Collection
            ErrorCode::CollectionNotFound => "Collection not found",
            ErrorCode::CollectionNameRequired => "Collection name is required",

            // Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileStorageFailed => "File storage failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ResourceLimitExceeded => "Resource limit exceeded",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionExpired),
            1006 => Ok(ErrorCode::TooManyAttempts),
            1007 => Ok(ErrorCode::PasswordTooShort),
            1008 => Ok(ErrorCode::AuthProviderNotConfigured),
            1009 => Ok(ErrorCode::AuthCodeExchangeFailed),
            1010 => Ok(ErrorCode::EmailAlreadyRegistered),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Profile
            3001 => Ok(ErrorCode::ProfileNotFound),
            3002 => Ok(ErrorCode::ProfileRequired),
            3003 => Ok(ErrorCode::UsernameTaken),
            3004 => Ok(ErrorCode::UsernameInvalid),

            // Catalog
            4001 => Ok(ErrorCode::ItemNotFound),
            4002 => Ok(ErrorCode::PriceRequired),
            4003 => Ok(ErrorCode::InvalidPrice),
            4004 => Ok(ErrorCode::BulkTooLarge),
            4005 => Ok(ErrorCode::BulkEmpty),
            4101 => Ok(ErrorCode::ImageNotFound),

            // Collection
            5001 => Ok(ErrorCode::CollectionNotFound),
            5002 => Ok(ErrorCode::CollectionNameRequired),

            // Upload
            6001 => Ok(ErrorCode::FileTooLarge),
            6002 => Ok(ErrorCode::UnsupportedFileFormat),
            6003 => Ok(ErrorCode::InvalidImageFile),
            6004 => Ok(ErrorCode::NoFileProvided),
            6005 => Ok(ErrorCode::EmptyFile),
            6006 => Ok(ErrorCode::FileStorageFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::ResourceLimitExceeded),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::TooManyAttempts.code(), 1006);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::UsernameTaken.code(), 3003);
        assert_eq!(ErrorCode::PriceRequired.code(), 4002);
        assert_eq!(ErrorCode::CollectionNotFound.code(), 5001);
        assert_eq!(ErrorCode::FileTooLarge.code(), 6001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_matches_code() {
        let all = [
            ErrorCode::Success,
            ErrorCode::NotFound,
            ErrorCode::EmailAlreadyRegistered,
            ErrorCode::UsernameInvalid,
            ErrorCode::ImageNotFound,
            ErrorCode::CollectionNameRequired,
            ErrorCode::FileStorageFailed,
            ErrorCode::ResourceLimitExceeded,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(
            InvalidErrorCode(4242).to_string(),
            "invalid error code: 4242"
        );
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::PriceRequired).unwrap();
        assert_eq!(json, "4002");
        let code: ErrorCode = serde_json::from_str("6001").unwrap();
        assert_eq!(code, ErrorCode::FileTooLarge);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_messages_are_not_empty() {
        assert!(!ErrorCode::UsernameInvalid.message().is_empty());
        assert_eq!(
            ErrorCode::PriceRequired.message(),
            "Items listed For Sale need a price"
        );
    }
}
