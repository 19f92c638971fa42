use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::ApiError;

/// A file received in a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Course fields as submitted, before validation.
///
/// Text values are trimmed. The `thumbnail` part is always read as a file,
/// with or without a file name; other file parts are ignored.
#[derive(Debug, Clone, Default)]
pub struct CourseForm {
    pub fields: HashMap<String, String>,
    pub thumbnail: Option<Upload>,
}

impl CourseForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = CourseForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;

            if name == "thumbnail" {
                // Browsers send an empty, nameless part when no file was chosen.
                let unnamed = file_name.as_deref().is_none_or(str::is_empty);
                if !(unnamed && data.is_empty()) {
                    form.thumbnail = Some(Upload {
                        file_name,
                        content_type,
                        data,
                    });
                }
            } else if file_name.is_some() {
                continue;
            } else {
                let value = String::from_utf8(data.to_vec())
                    .map_err(|_| ApiError::BadRequest(format!("Field {} is not valid UTF-8", name)))?;
                form.fields.insert(name, value.trim().to_string());
            }
        }

        Ok(form)
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.trim().to_string());
        self
    }

    pub fn with_thumbnail(mut self, upload: Upload) -> Self {
        self.thumbnail = Some(upload);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field value, with blank treated as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }
}
