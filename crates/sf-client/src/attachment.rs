//! File attachments on cases
//!
//! Files are read whole, base64-encoded and posted as an Attachment
//! sObject through the lenient dispatch path.

use std::io::ErrorKind;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use serde_json::json;
use tracing::{error, info, instrument};

use crate::client::SalesforceClient;
use crate::error::{Error, Result};
use crate::models::{AttachmentInfo, SaveResult};

/// Largest file accepted for upload (25 MiB)
pub const MAX_ATTACHMENT_SIZE: u64 = 25 * 1024 * 1024;

impl SalesforceClient {
    /// Upload a file as an attachment of `parent_id`.
    #[instrument(skip_all, fields(parent_id = %parent_id))]
    pub async fn upload_attachment(
        &self,
        parent_id: &str,
        file_path: impl AsRef<Path>,
    ) -> Result<AttachmentInfo> {
        let path = file_path.as_ref();
        if parent_id.is_empty() {
            return Err(Error::Validation("parent ID is required".into()));
        }
        if path.as_os_str().is_empty() {
            return Err(Error::Validation("file path is required".into()));
        }

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::Validation(format!(
                    "file does not exist: {}",
                    path.display()
                )));
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        if !metadata.is_file() {
            return Err(Error::Validation(format!(
                "not a regular file: {}",
                path.display()
            )));
        }
        check_size(metadata.len())?;

        let contents = tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // The file may have grown since the metadata check
        check_size(contents.len() as u64)?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let operation = format!("upload attachment {name} to {parent_id}");

        let payload = json!({
            "ParentId": parent_id,
            "Name": name,
            "Body": STANDARD.encode(&contents),
        });
        let envelope = self
            .request(Method::POST, &self.data_path("sobjects/Attachment/"), Some(&payload), &[])
            .await
            .map_err(|e| e.context(operation.as_str()))?;

        if envelope.code >= 400 {
            return Err(Error::UploadStatus(envelope.status.clone()).context(operation));
        }

        let result: SaveResult = envelope
            .decode()
            .map_err(|source| Error::Decode {
                context: "attachment response",
                source,
            })
            .map_err(|e| e.context(operation.as_str()))?;

        if !result.success {
            let err = match result.errors.into_iter().next() {
                Some(first) => Error::Api {
                    message: first.message,
                    code: first.status_code,
                },
                None => Error::Api {
                    message: "attachment upload was not successful".into(),
                    code: "UNKNOWN_ERROR".into(),
                },
            };
            return Err(err.context(operation));
        }

        Ok(AttachmentInfo {
            id: result.id,
            name,
            size: contents.len() as u64,
        })
    }

    /// Upload a file to the session case.
    #[instrument(skip_all)]
    pub async fn create_attachment(&self, file_path: impl AsRef<Path>) -> Result<AttachmentInfo> {
        let path = file_path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::Validation("file path is required".into()));
        }
        let Some(case_id) = self.case_id().await else {
            return Err(Error::Validation(
                "no case ID available, create a case first".into(),
            ));
        };

        let file_name = path.display().to_string();
        match self.upload_attachment(&case_id, path).await {
            Ok(info) => {
                info!(
                    action = "upload attachment",
                    success = true,
                    case_id = %case_id,
                    file_name = %file_name,
                    attachment_id = %info.id,
                    size = info.size,
                    "attachment uploaded"
                );
                Ok(info)
            }
            Err(e) => {
                error!(
                    action = "upload attachment",
                    success = false,
                    case_id = %case_id,
                    file_name = %file_name,
                    error = %e,
                    "attachment upload failed"
                );
                Err(e)
            }
        }
    }
}

fn check_size(size: u64) -> Result<()> {
    if size > MAX_ATTACHMENT_SIZE {
        return Err(Error::Validation(format!(
            "file size exceeds 25MB limit: {size} bytes"
        )));
    }
    Ok(())
}
