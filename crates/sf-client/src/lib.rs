//! Salesforce REST client
//!
//! `SalesforceClient` owns the OAuth session (see `sf-auth`) and dispatches
//! authorized calls against the instance returned by the token exchange.
//! Domain operations are implemented as inherent methods in their own
//! modules:
//!
//! - `case`: create and read Case records
//! - `query`: SOQL
//! - `attachment`: base64 file upload onto a case
//! - `email`: EmailMessage records on a case
//!
//! The client remembers the last created case, so a typical flow is
//! `create_case` followed by `create_attachment` / `email_message` without
//! repeating the case ID.

pub mod attachment;
pub mod case;
pub mod classify;
pub mod client;
pub mod email;
pub mod envelope;
pub mod error;
pub mod models;
pub mod query;
mod session;

#[cfg(test)]
mod test_support;

pub use attachment::MAX_ATTACHMENT_SIZE;
pub use classify::{ApiErrorBody, ParseError, classify};
pub use client::{ClientOptions, DEFAULT_API_VERSION, DEFAULT_TIMEOUT, SalesforceClient};
pub use email::DEFAULT_EMAIL_STATUS;
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use models::{
    AttachmentInfo, Case, CaseHeaders, EmailMessageParams, QueryResponse, SaveError, SaveResult,
};
pub use reqwest::Method;
pub use session::Authorization;
pub use sf_auth::{Credentials, Secret};
