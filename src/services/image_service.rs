use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::db::{BackendError, SharedBackend};

/// An image picked in the admin form. `data` is a base64 payload, optionally
/// wrapped as a `data:` URL.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImageData {
    pub data: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
    #[serde(rename = "fileSize", default)]
    pub file_size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageUploadError {
    #[error("Base64 decode error: {0}")]
    Base64Decode(String),
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),
    #[error("Storage upload error: {0}")]
    Storage(#[from] BackendError),
}

impl ImageData {
    /// Wraps raw file bytes the way the browser file reader does.
    pub fn from_bytes(file_name: &str, file_type: &str, bytes: &[u8]) -> Self {
        Self {
            data: preview_data_url(file_type, bytes),
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            file_size: bytes.len() as u64,
        }
    }

    /// `data:` URL suitable for an inline preview.
    pub fn preview(&self) -> String {
        if self.data.starts_with("data:") {
            self.data.clone()
        } else {
            format!("data:{};base64,{}", self.file_type, self.data)
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, ImageUploadError> {
        let base64_data = if self.data.starts_with("data:") {
            self.data.split(',').nth(1).ok_or_else(|| {
                ImageUploadError::InvalidImageFormat("Invalid base64 data format".to_string())
            })?
        } else {
            &self.data
        };

        general_purpose::STANDARD
            .decode(base64_data)
            .map_err(|e| ImageUploadError::Base64Decode(e.to_string()))
    }
}

pub fn preview_data_url(file_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        file_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Extension of the original file name, or one derived from the MIME type.
fn file_extension(file_name: &str, file_type: &str) -> Result<String, ImageUploadError> {
    if let Some(ext) = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
    {
        return Ok(ext.to_lowercase());
    }

    match file_type {
        "image/jpeg" | "image/jpg" => Ok("jpg".to_string()),
        "image/png" => Ok("png".to_string()),
        "image/gif" => Ok("gif".to_string()),
        "image/webp" => Ok("webp".to_string()),
        _ => Err(ImageUploadError::InvalidImageFormat(format!(
            "Unsupported file type: {}",
            file_type
        ))),
    }
}

/// `{unix millis}-{6 random lowercase alphanumerics}.{extension}`
pub fn storage_path(file_name: &str, file_type: &str) -> Result<String, ImageUploadError> {
    let extension = file_extension(file_name, file_type)?;
    let timestamp = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    Ok(format!("{}-{}.{}", timestamp, suffix, extension))
}

pub struct ImageService {
    backend: SharedBackend,
    bucket_name: String,
}

impl ImageService {
    pub fn new(backend: SharedBackend, bucket_name: impl Into<String>) -> Self {
        Self {
            backend,
            bucket_name: bucket_name.into(),
        }
    }

    /// Uploads the image under a fresh path and returns its public URL.
    pub async fn upload(&self, image: &ImageData) -> Result<String, ImageUploadError> {
        if !image.file_type.starts_with("image/") {
            return Err(ImageUploadError::InvalidImageFormat(format!(
                "Not an image: {}",
                image.file_type
            )));
        }

        let bytes = image.decode()?;
        let object_name = storage_path(&image.file_name, &image.file_type)?;

        self.backend
            .upload(&self.bucket_name, &object_name, bytes, &image.file_type)
            .await?;

        let public_url = self.backend.public_url(&self.bucket_name, &object_name);
        log::info!("Uploaded {} to {}", image.file_name, public_url);
        Ok(public_url)
    }
}
