//! Request and response shapes for the sObject endpoints
//!
//! Field names follow the Salesforce API (PascalCase standard fields,
//! `__c` custom fields). Unset fields are omitted from request bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A support case.
///
/// Create responses carry a lowercase `id`; records read back carry `Id`.
/// Both land in `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(rename = "Id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Subject", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "Priority", skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(rename = "Origin", skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(rename = "Type", alias = "type", skip_serializing_if = "Option::is_none")]
    pub case_type: Option<String>,
    #[serde(rename = "RecordTypeId", skip_serializing_if = "Option::is_none")]
    pub record_type_id: Option<String>,
    #[serde(rename = "AccountId", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "ContactId", skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(rename = "SuppliedName", skip_serializing_if = "Option::is_none")]
    pub supplied_name: Option<String>,
    #[serde(rename = "SuppliedEmail", skip_serializing_if = "Option::is_none")]
    pub supplied_email: Option<String>,
    #[serde(rename = "SuppliedPhone", skip_serializing_if = "Option::is_none")]
    pub supplied_phone: Option<String>,
    #[serde(rename = "SuppliedCountry__c", skip_serializing_if = "Option::is_none")]
    pub supplied_country: Option<String>,
    #[serde(rename = "IP_Address__c", skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(rename = "Severity__c", skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(rename = "Product__c", skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(rename = "Operating_System__c", skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    #[serde(rename = "Web_Queue_Email__c", skip_serializing_if = "Option::is_none")]
    pub web_queue_email: Option<String>,
    #[serde(rename = "Web_URL__c", skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

/// Optional headers for case creation. Empty values are not sent.
#[derive(Debug, Clone, Default)]
pub struct CaseHeaders {
    /// `Sforce-Assignment-Rule-Header`, e.g. `useDefaultRule=true`
    pub assignment_rule: String,
    /// `Sforce-Email-Header`, e.g. `triggerAutoResponseEmail=true`
    pub email: String,
}

/// Result page of a SOQL query. Records stay untyped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "totalSize")]
    pub total_size: u64,
    pub done: bool,
    #[serde(default)]
    pub records: Vec<Value>,
}

/// Body of an EmailMessage create call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailMessageParams {
    #[serde(rename = "ParentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "FromAddress", skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(rename = "FromName", skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(rename = "ToAddress", skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(rename = "Subject", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "TextBody", skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    /// Picklist value; `3` is "Sent"
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
}

/// Standard sObject create response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveResult {
    #[serde(default)]
    pub id: String,
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<SaveError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "statusCode", alias = "errorCode", default)]
    pub status_code: String,
}

/// What `upload_attachment` reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentInfo {
    pub id: String,
    pub name: String,
    /// Bytes before encoding
    pub size: u64,
}
