//! Salesforce OAuth constants and token lifetime policy

use std::time::Duration;

/// Production login endpoint for the refresh-token exchange
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com/services/oauth2/token";

/// Token endpoint path, relative to a login host
pub const TOKEN_PATH: &str = "/services/oauth2/token";

/// Grant type used when the configuration does not name one
pub const DEFAULT_GRANT_TYPE: &str = "refresh_token";

/// Lifetime assumed for a freshly issued access token.
///
/// Salesforce sessions usually last 60 minutes but the token response does
/// not say so. Five minutes are shaved off up front.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(55 * 60);

/// A token with less than this much lifetime left is refreshed before use,
/// so it cannot expire in the middle of a long upload.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);
