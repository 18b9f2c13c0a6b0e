use axum::body::Body;
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose;

use crate::batch::GeneratedImage;
use crate::error::CopyforgeError;

/// Cache-Control for session-scoped downloads.
const NO_STORE: &str = "no-store";

/// Builds the attachment response for the `number`th (1-based) image.
pub(crate) fn download_response(
    image: &GeneratedImage,
    number: usize,
) -> Result<Response, CopyforgeError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, image.mime_type())
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", image.file_name(number)),
        )
        .header(CACHE_CONTROL, NO_STORE)
        .body(Body::from(image.bytes.clone()))
        .map_err(CopyforgeError::from)
}

/// Inline preview source for an image.
pub(crate) fn data_uri(image: &GeneratedImage) -> String {
    format!(
        "data:{};base64,{}",
        image.mime_type(),
        general_purpose::STANDARD.encode(&image.bytes)
    )
}
