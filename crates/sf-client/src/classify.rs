//! Error body classification for Salesforce REST responses
//!
//! Failing REST calls usually answer with a JSON array holding one error
//! object, but some endpoints return the object bare. Both forms normalize
//! to one `ApiErrorBody`; anything else is a `ParseError` and the caller
//! falls back to the HTTP status line.

use serde::Deserialize;
use serde_json::Value;

/// A provider-reported error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(rename = "errorCode")]
    pub error_code: String,
    /// Offending field names, when the error concerns specific fields
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Why a body could not be classified.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("error body is not JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("error body is an empty array")]
    EmptyArray,

    #[error("error body does not match the error shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("error body is neither an array nor an object")]
    UnexpectedType,
}

/// Extract message, code and fields from an error body.
///
/// Arrays are tried first (only the first element is inspected), then a
/// single object.
pub fn classify(body: &[u8]) -> Result<ApiErrorBody, ParseError> {
    let value: Value = serde_json::from_slice(body).map_err(ParseError::Json)?;
    let candidate = match value {
        Value::Array(mut items) => {
            if items.is_empty() {
                return Err(ParseError::EmptyArray);
            }
            items.swap_remove(0)
        }
        object @ Value::Object(_) => object,
        _ => return Err(ParseError::UnexpectedType),
    };
    serde_json::from_value(candidate).map_err(ParseError::Shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_and_object_forms_are_equivalent() {
        let from_array = classify(br#"[{"message":"m","errorCode":"C"}]"#).unwrap();
        let from_object = classify(br#"{"message":"m","errorCode":"C"}"#).unwrap();
        assert_eq!(from_array, from_object);
        assert_eq!(from_array.message, "m");
        assert_eq!(from_array.error_code, "C");
        assert!(from_array.fields.is_empty());
    }

    #[test]
    fn fields_are_captured() {
        let body = br#"[{"message":"Required fields are missing: [Subject]","errorCode":"REQUIRED_FIELD_MISSING","fields":["Subject"]}]"#;
        let err = classify(body).unwrap();
        assert_eq!(err.error_code, "REQUIRED_FIELD_MISSING");
        assert_eq!(err.fields, vec!["Subject"]);
    }

    #[test]
    fn only_first_array_element_is_inspected() {
        let body = br#"[{"message":"first","errorCode":"A"},{"unrelated":true}]"#;
        assert_eq!(classify(body).unwrap().message, "first");
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = classify(br#"{"error": "Invalid", "message": "Something went wrong""#).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn empty_array_is_rejected() {
        assert!(matches!(classify(b"[]").unwrap_err(), ParseError::EmptyArray));
    }

    #[test]
    fn mismatched_fields_are_rejected() {
        let err = classify(br#"{"error":"invalid_grant","error_description":"nope"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Shape(_)));
    }

    #[test]
    fn scalars_are_rejected() {
        assert!(matches!(classify(b"\"oops\"").unwrap_err(), ParseError::UnexpectedType));
        assert!(matches!(classify(b"42").unwrap_err(), ParseError::UnexpectedType));
    }
}
