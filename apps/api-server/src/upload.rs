//! Multipart form parsing for image-bearing requests.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::StreamExt;

use crate::middleware::error::AppError;

/// An image file received in a multipart request.
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Parsed multipart form: text fields plus at most one image file.
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    /// A non-empty text field, if present.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str).filter(|s| !s.trim().is_empty())
    }
}

/// Read a multipart body, treating the field named `file_field` as the
/// image upload and everything else as text.
pub async fn read_form(mut payload: Multipart, file_field: &str) -> Result<UploadForm, AppError> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?;

        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?;
            data.extend_from_slice(&chunk);
        }

        if name == file_field {
            if let Some(filename) = filename {
                file = Some(UploadedFile {
                    filename,
                    bytes: data,
                });
                continue;
            }
        }

        fields.insert(name, String::from_utf8_lossy(&data).into_owned());
    }

    Ok(UploadForm { fields, file })
}
