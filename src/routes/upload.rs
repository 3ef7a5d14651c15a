use std::collections::HashMap;
use std::future::Future;

use axum::{
    body::Bytes,
    extract::Multipart,
    http::{header, HeaderMap, Uri},
};

use crate::config::Config;
use crate::error::AppError;
use crate::services::entries::EntryDetail;
use crate::services::storage::{upload_url, UploadStore};

/// The multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

pub struct UploadedFile {
    pub original_name: String,
    pub data: Bytes,
}

/// A fully read multipart form: text fields plus the `file` part.
#[derive(Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == FILE_FIELD {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await?;
                form.file = Some(UploadedFile {
                    original_name,
                    data,
                });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self) -> Result<UploadedFile, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::BadRequest("No file field found".to_string()))
    }
}

/// `{scheme}://{host}` of the incoming request, used to build upload URLs.
pub fn public_base_url(headers: &HeaderMap, uri: &Uri, config: &Config) -> String {
    let forwarded_proto = config
        .trust_proxy
        .then(|| headers.get("x-forwarded-proto"))
        .flatten()
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let scheme = forwarded_proto
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|authority| authority.to_string()))
        .unwrap_or_else(|| config.public_fallback_host());

    format!("{scheme}://{host}")
}

/// Stores the file, then runs `create` with its public URL. The file is
/// discarded again when `create` fails.
pub async fn persist_with_upload<F, Fut>(
    uploads: &UploadStore,
    file: UploadedFile,
    base_url: &str,
    create: F,
) -> Result<EntryDetail, AppError>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<EntryDetail, AppError>>,
{
    let file_name = uploads.save(&file.original_name, &file.data).await?;

    match create(upload_url(base_url, &file_name)).await {
        Ok(detail) => Ok(detail),
        Err(err) => {
            uploads.discard(&file_name).await;
            Err(err)
        }
    }
}
