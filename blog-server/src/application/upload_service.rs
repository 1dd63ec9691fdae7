use std::sync::Arc;

use tracing::{info, instrument};

use crate::data::store::FileStorage;
use crate::domain::error::DomainError;
use crate::domain::file::StoredFile;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn FileStorage>,
}

impl UploadService {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Result<Vec<StoredFile>, DomainError> {
        self.storage.list_files().await
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        filename: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, DomainError> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(DomainError::missing_field("filename"));
        }
        if bytes.is_empty() {
            return Err(DomainError::missing_field("file"));
        }
        if !mime_type.starts_with("image/") {
            return Err(DomainError::Validation(format!(
                "unsupported file type: {mime_type}"
            )));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(DomainError::Validation(format!(
                "file exceeds {MAX_UPLOAD_BYTES} bytes"
            )));
        }

        let file = self.storage.upload_file(filename, mime_type, bytes).await?;
        info!(file_id = %file.id, name = %file.name, "file uploaded");
        Ok(file)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        if self.storage.delete_file(id).await? {
            info!(file_id = %id, "file deleted");
            Ok(())
        } else {
            Err(DomainError::FileNotFound(id.to_string()))
        }
    }
}
