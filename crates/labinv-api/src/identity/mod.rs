// Identity service: email/password accounts and token refresh.

pub mod client;
pub mod types;

pub use client::{DEFAULT_IDENTITY_URL, DEFAULT_TOKEN_URL, IdentityClient};
pub use types::UserRecord;
