use axum::body::Body;
use axum::extract::multipart::Field;
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::{BoxReader, Bucket, ObjectStore, StoredObject};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::error::AppError;

/// How a streamed file is presented to the client.
#[derive(Clone, Copy)]
pub(crate) enum Disposition {
    /// Render in the browser (viewing documents, avatar images).
    Inline,
    /// Trigger a download with the stored filename.
    Attachment,
}

impl Disposition {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

/// Build a streaming response for a stored object.
///
/// Content-Type is guessed from the stored filename; Content-Length comes
/// from the store's size query so clients see progress on large files.
/// Dropping the body (client disconnect) closes the underlying reader.
pub(crate) fn stream_response(
    file_name: &str,
    size: u64,
    reader: BoxReader,
    disposition: Disposition,
) -> Result<Response, AppError> {
    let stream = ReaderStream::new(reader);
    let body = Body::from_stream(stream);

    let content_type = mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or("application/octet-stream");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(disposition, file_name),
        )
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Build a safe `Content-Disposition` header value.
fn content_disposition_value(disposition: Disposition, filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    // RFC 5987 percent-encoding for filename*.
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => String::from(b as char),
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!(
        "{}; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}",
        disposition.as_str()
    )
}

/// Stream a multipart field into the object store via a temp file.
///
/// The field borrows the request body, so it cannot be handed to the store
/// as a reader directly; bytes hop through a temp file that is removed
/// afterwards. The size cap is enforced while reading, before anything
/// reaches the store.
pub(crate) async fn stream_field_to_store(
    mut field: Field<'_>,
    objects: &dyn ObjectStore,
    bucket: Bucket,
    max_size: u64,
) -> Result<StoredObject, AppError> {
    let temp_path = std::env::temp_dir().join(format!("famvault-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        let stored = objects.put_stream(bucket, reader).await?;

        Ok(stored)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}
