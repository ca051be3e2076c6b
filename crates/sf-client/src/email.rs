//! EmailMessage records attached to cases

use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::client::{SalesforceClient, decode};
use crate::error::Result;
use crate::models::EmailMessageParams;

/// EmailMessage status "Sent"
pub const DEFAULT_EMAIL_STATUS: u8 = 3;

impl SalesforceClient {
    /// Record an email on a case.
    ///
    /// Unset fields are filled in before sending: `Status` (unset or 0)
    /// becomes `DEFAULT_EMAIL_STATUS`, `ParentId` the session case ID and
    /// `ToAddress` the configured default recipient.
    #[instrument(skip_all)]
    pub async fn email_message(&self, mut params: EmailMessageParams) -> Result<Map<String, Value>> {
        if params.status.is_none_or(|status| status == 0) {
            params.status = Some(DEFAULT_EMAIL_STATUS);
        }
        if params.parent_id.as_deref().is_none_or(str::is_empty) {
            params.parent_id = self.case_id().await;
        }
        if params.to_address.as_deref().is_none_or(str::is_empty) {
            params.to_address = self.options().default_to_address.clone();
        }

        let body = self
            .request_checked(
                Method::POST,
                &self.data_path("sobjects/EmailMessage/"),
                Some(&params),
                &[],
            )
            .await
            .map_err(|e| e.context("create email message"))?;
        let created: Map<String, Value> =
            decode(&body, "email message response").map_err(|e| e.context("create email message"))?;

        let email_id = created.get("id").and_then(Value::as_str).unwrap_or_default();
        let parent_id = params.parent_id.as_deref().unwrap_or_default();
        info!(parent_id, email_id, "email message created");
        Ok(created)
    }
}
