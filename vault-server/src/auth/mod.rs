//! Sessions, the page gate, login throttling and the hosted auth provider

pub mod gate;
pub mod provider;
pub mod rate_limit;
pub mod session;

pub use provider::{AuthProvider, HostedAuthProvider};
pub use rate_limit::{ClientIp, LoginThrottle};
pub use session::UserIdentity;
