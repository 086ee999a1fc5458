use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub enum UploadKind {
    Resume,
    Document,
    ProfileImage,
}

impl UploadKind {
    fn folder(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::Document => "documents",
            UploadKind::ProfileImage => "profile-images",
        }
    }

    fn allowed_exts(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Resume | UploadKind::Document => &["pdf", "doc", "docx"],
            UploadKind::ProfileImage => &["jpg", "jpeg", "png", "gif", "webp"],
        }
    }

    fn max_bytes(&self) -> usize {
        match self {
            UploadKind::Resume | UploadKind::Document => MAX_RESUME_BYTES,
            UploadKind::ProfileImage => MAX_IMAGE_BYTES,
        }
    }

    fn rejection_message(&self) -> &'static str {
        match self {
            UploadKind::Resume | UploadKind::Document => {
                "Only PDF, DOC, and DOCX files are allowed"
            }
            UploadKind::ProfileImage => "Only image files are allowed",
        }
    }
}

/// Stored file reference: the public URL plus the opaque id used to release
/// the file later.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub name: String,
    pub public_id: String,
}

#[derive(Clone)]
pub struct MediaService {
    root: PathBuf,
    public_base_url: String,
}

impl MediaService {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub async fn store(
        &self,
        kind: UploadKind,
        original_name: &str,
        data: &Bytes,
    ) -> Result<StoredFile> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !kind.allowed_exts().contains(&ext.as_str()) {
            return Err(Error::BadRequest(kind.rejection_message().to_string()));
        }
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".to_string()));
        }
        if data.len() > kind.max_bytes() {
            return Err(Error::BadRequest(format!(
                "File exceeds the {}MB size limit",
                kind.max_bytes() / (1024 * 1024)
            )));
        }

        if ext == "pdf" && !data.starts_with(b"%PDF") {
            return Err(Error::BadRequest("Invalid PDF file content".into()));
        }
        if (ext == "jpg" || ext == "jpeg") && !data.starts_with(&[0xFF, 0xD8]) {
            return Err(Error::BadRequest("Invalid JPEG file content".into()));
        }
        if ext == "png" && !data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Err(Error::BadRequest("Invalid PNG file content".into()));
        }

        let dir = self.root.join(kind.folder());
        fs::create_dir_all(&dir).await?;

        let file_id = Uuid::new_v4();
        let filename = format!("{}.{}", file_id, ext);
        fs::write(dir.join(&filename), data).await?;

        let public_id = format!("{}/{}", kind.folder(), filename);
        Ok(StoredFile {
            url: format!("{}/uploads/{}", self.public_base_url, public_id),
            name: original_name.to_string(),
            public_id,
        })
    }

    pub async fn delete(&self, public_id: &str) -> Result<()> {
        let relative = Path::new(public_id);
        // a public id is always "<folder>/<uuid>.<ext>"; anything else is hostile
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::BadRequest(format!(
                "Invalid file reference: {}",
                public_id
            )));
        }
        fs::remove_file(self.root.join(relative)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_service() -> MediaService {
        let root = std::env::temp_dir().join(format!("jobify-media-{}", Uuid::new_v4()));
        MediaService::new(root, "http://localhost:5000")
    }

    #[tokio::test]
    async fn stores_and_deletes_a_pdf_resume() {
        let media = temp_service();
        let data = Bytes::from_static(b"%PDF-1.4 fake resume body");
        let stored = media
            .store(UploadKind::Resume, "my resume.pdf", &data)
            .await
            .unwrap();

        assert_eq!(stored.name, "my resume.pdf");
        assert!(stored.public_id.starts_with("resumes/"));
        assert!(stored.url.ends_with(&stored.public_id));
        assert!(media.root.join(&stored.public_id).exists());

        media.delete(&stored.public_id).await.unwrap();
        assert!(!media.root.join(&stored.public_id).exists());
    }

    #[tokio::test]
    async fn rejects_disallowed_extension() {
        let media = temp_service();
        let data = Bytes::from_static(b"#!/bin/sh");
        let err = media
            .store(UploadKind::Resume, "resume.sh", &data)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn rejects_oversized_image() {
        let media = temp_service();
        let data = Bytes::from(vec![0xFF; MAX_IMAGE_BYTES + 1]);
        let err = media
            .store(UploadKind::ProfileImage, "avatar.gif", &data)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn rejects_pdf_without_magic_bytes() {
        let media = temp_service();
        let data = Bytes::from_static(b"not a pdf at all");
        let err = media
            .store(UploadKind::Resume, "resume.pdf", &data)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn refuses_traversal_in_delete() {
        let media = temp_service();
        assert!(media.delete("../etc/passwd").await.is_err());
        assert!(media.delete("/etc/passwd").await.is_err());
    }
}
