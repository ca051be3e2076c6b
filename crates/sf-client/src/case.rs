//! Case create and read

use reqwest::Method;
use tracing::{info, instrument};

use crate::client::{SalesforceClient, decode};
use crate::error::{Error, Result};
use crate::models::{Case, CaseHeaders};

pub const ASSIGNMENT_RULE_HEADER: &str = "Sforce-Assignment-Rule-Header";
pub const EMAIL_HEADER: &str = "Sforce-Email-Header";

impl SalesforceClient {
    /// Create a case. A non-empty id in the response becomes the session
    /// case ID.
    #[instrument(skip_all)]
    pub async fn create_case(&self, case: &Case, headers: Option<&CaseHeaders>) -> Result<Case> {
        let mut extra = Vec::new();
        if let Some(headers) = headers {
            if !headers.assignment_rule.is_empty() {
                extra.push((ASSIGNMENT_RULE_HEADER, headers.assignment_rule.as_str()));
            }
            if !headers.email.is_empty() {
                extra.push((EMAIL_HEADER, headers.email.as_str()));
            }
        }

        let body = self
            .request_checked(Method::POST, &self.data_path("sobjects/Case/"), Some(case), &extra)
            .await
            .map_err(|e| e.context("create case"))?;
        let created: Case =
            decode(&body, "case response").map_err(|e| e.context("create case"))?;

        if let Some(id) = created.id.as_deref().filter(|id| !id.is_empty()) {
            self.set_case_id(id).await;
            info!(case_id = id, "case created");
        }
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_case(&self, case_id: &str) -> Result<Case> {
        if case_id.is_empty() {
            return Err(Error::Validation("case ID is required".into()));
        }
        let operation = || format!("get case {case_id}");
        let body = self
            .request_checked(
                Method::GET,
                &self.data_path(&format!("sobjects/Case/{case_id}")),
                None::<&()>,
                &[],
            )
            .await
            .map_err(|e| e.context(operation()))?;
        decode(&body, "case response").map_err(|e| e.context(operation()))
    }
}
