//! crates/docuflow_core/src/services/documents.rs
//!
//! Document intake: validates an uploaded file against an order and hands
//! the bytes to the file store.
//!
//! Uploads are staged before the database row is written and only promoted
//! to their final locator afterwards, so a failed insert never leaves an
//! orphaned file behind.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::domain::{Document, DocumentKind};
use crate::ports::{EntityStore, FileStore, ServiceError, ServiceResult};
use crate::services::fetch_owned_order;

#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn EntityStore>,
    files: Arc<dyn FileStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn EntityStore>, files: Arc<dyn FileStore>) -> Self {
        Self { store, files }
    }

    /// Validates and stores an uploaded file against an order.
    pub async fn upload(
        &self,
        order_id: Uuid,
        caller: Uuid,
        filename: Option<&str>,
        bytes: &[u8],
    ) -> ServiceResult<Document> {
        let order = fetch_owned_order(self.store.as_ref(), order_id, caller).await?;

        let raw_name = filename
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ServiceError::BadRequest("no file provided".to_string()))?;
        if bytes.is_empty() {
            return Err(ServiceError::BadRequest("no file provided".to_string()));
        }

        let safe_name = sanitize_filename(raw_name);
        let extension = safe_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let kind = DocumentKind::from_extension(&extension).ok_or_else(|| {
            ServiceError::BadRequest(format!(
                "file type .{} not allowed. allowed types: pdf, docx, txt",
                extension
            ))
        })?;

        // Physical storage is keyed by the document id, so colliding
        // filenames across concurrent uploads cannot clobber each other.
        let document_id = Uuid::new_v4();
        let key = format!("{}_{}", document_id, safe_name);

        let staged = self.files.stage(&key, bytes).await?;
        let document = match self
            .store
            .insert_document(document_id, order.id, &safe_name, &staged.final_locator, kind)
            .await
        {
            Ok(document) => document,
            Err(e) => {
                if let Err(discard_err) = self.files.discard(&staged).await {
                    warn!("failed to discard staged upload {}: {}", key, discard_err);
                }
                return Err(e);
            }
        };
        self.files.promote(&staged).await?;

        Ok(document)
    }

    /// Resolves a document and re-derives ownership through its order.
    pub async fn get(&self, document_id: Uuid, caller: Uuid) -> ServiceResult<Document> {
        let document = self.store.get_document(document_id).await?;
        let order = self.store.get_order(document.order_id).await?;
        if order.user_id != caller {
            return Err(ServiceError::Forbidden(
                "you do not have permission to access this document".to_string(),
            ));
        }
        Ok(document)
    }

    /// Deletes the physical file (tolerating one already gone) and the row.
    pub async fn delete(&self, document_id: Uuid, caller: Uuid) -> ServiceResult<()> {
        let document = self.get(document_id, caller).await?;
        self.files.delete(&document.stored_path).await?;
        self.store.delete_document(document.id).await
    }

    /// Serves the stored bytes for a document.
    ///
    /// A row whose file is missing from storage is reported as NotFound:
    /// metadata and storage have drifted apart.
    pub async fn download(
        &self,
        document_id: Uuid,
        caller: Uuid,
    ) -> ServiceResult<(Document, Vec<u8>)> {
        let document = self.get(document_id, caller).await?;
        if !self.files.exists(&document.stored_path).await? {
            return Err(ServiceError::NotFound(
                "file not found on server".to_string(),
            ));
        }
        let bytes = self.files.read(&document.stored_path).await?;
        Ok((document, bytes))
    }
}

/// Reduces an untrusted filename to a safe form: path components are
/// stripped, anything outside `[A-Za-z0-9._-]` becomes `_`, and leading
/// dots are dropped.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .trim_start_matches('.');
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::sanitize_filename;

    #[test]
    fn strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("uploads/contract.pdf"), "contract.pdf");
    }

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my report (v2).pdf"), "my_report__v2_.pdf");
        assert_eq!(sanitize_filename("naïve.txt"), "na_ve.txt");
    }

    #[test]
    fn drops_leading_dots() {
        assert_eq!(sanitize_filename(".hidden.txt"), "hidden.txt");
    }
}
