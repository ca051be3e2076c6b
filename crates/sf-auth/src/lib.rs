//! Salesforce OAuth authentication library
//!
//! Holds the connected-app credentials and performs the refresh-token
//! exchange against the login endpoint. The request engine in `sf-client`
//! owns the resulting session token; this crate has no notion of caching
//! or locking and can be tested on its own.
//!
//! Credential flow:
//! 1. Configuration builds a `Credentials` value (secrets wrapped in `Secret`)
//! 2. The client calls `token::authenticate()` when its token is missing or stale
//! 3. The returned `SessionToken` carries the bearer token, instance URL and
//!    a locally computed expiry (`TOKEN_LIFETIME` from now)

pub mod constants;
pub mod credentials;
pub mod error;
pub mod secret;
pub mod token;

pub use constants::*;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use secret::Secret;
pub use token::{AuthResponse, SessionToken, authenticate};
