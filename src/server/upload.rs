//! Multipart image upload handling shared by the photo flows.

use super::state::ServerState;
use super::NoticesResponse;
use crate::wizard::Notice;

use axum::{
    extract::Multipart,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

pub(crate) struct ImageUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

fn rejection(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(NoticesResponse {
            notices: vec![Notice::warning(message)],
        }),
    )
        .into_response()
}

/// Pulls the `image` field out of a multipart body and verifies it actually
/// holds image bytes.
pub(crate) async fn read_image_upload(mut multipart: Multipart) -> Result<ImageUpload, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                warn!("Malformed multipart upload: {err}");
                return Err(rejection(StatusCode::BAD_REQUEST, "Malformed upload"));
            }
        };

        if field.name() != Some("image") {
            continue;
        }

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                warn!("Failed to read uploaded image: {err}");
                return Err(rejection(StatusCode::BAD_REQUEST, "Malformed upload"));
            }
        };

        if bytes.is_empty() {
            return Err(rejection(StatusCode::BAD_REQUEST, "No selected file"));
        }

        let Some(kind) = infer::get(&bytes).filter(|k| k.mime_type().starts_with("image/")) else {
            return Err(rejection(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Uploaded file is not an image",
            ));
        };

        return Ok(ImageUpload {
            mime_type: kind.mime_type().to_string(),
            bytes,
        });
    }

    Err(rejection(StatusCode::BAD_REQUEST, "No image uploaded"))
}

/// Runs the configured extractor over the upload; failures degrade to an
/// empty title list with a warning notice.
pub(crate) async fn detect_titles(
    state: &ServerState,
    image: &ImageUpload,
) -> (Vec<String>, Vec<Notice>) {
    let Some(extractor) = &state.extractor else {
        warn!("No title extractor configured, skipping extraction");
        return (
            Vec::new(),
            vec![Notice::warning("Title extraction is not configured")],
        );
    };

    match extractor.extract_titles(&image.bytes, &image.mime_type).await {
        Ok(titles) => {
            super::metrics::record_upstream("extractor", "ok");
            (titles, Vec::new())
        }
        Err(err) => {
            warn!("Title extraction failed: {err}");
            super::metrics::record_upstream("extractor", "error");
            (
                Vec::new(),
                vec![Notice::warning("Could not read titles from the image")],
            )
        }
    }
}
