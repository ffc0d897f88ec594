use crate::models::upload::DEFAULT_MEDIA_TYPE;
use crate::models::{DescriptionResult, Upload};
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;

/// Multipart field holding the image.
pub const UPLOAD_FIELD: &str = "file";

/// Set on parse-failure responses; value is the `UnwrapFailure` code.
pub const FAILURE_HEADER: &str = "x-describe-failure";

/// `POST /describe-image`
///
/// Both a described image and an unparseable provider answer are returned
/// with 200; only the body (and [`FAILURE_HEADER`]) tell them apart.
pub async fn describe_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let multipart = multipart.map_err(|e| AppError::ValidationError(anyhow::anyhow!("{}", e)))?;
    let upload = read_upload(multipart).await?;

    tracing::info!(
        file_name = upload.file_name.as_deref().unwrap_or("unnamed"),
        media_type = %upload.media_type,
        size = upload.len(),
        "Describing upload"
    );

    let description = state.describer.describe(&upload).await?;
    let failure = description.failure();

    let mut response = Json(DescriptionResult::from(description)).into_response();
    if let Some(failure) = failure {
        response
            .headers_mut()
            .insert(FAILURE_HEADER, HeaderValue::from_static(failure.code()));
    }

    Ok(response)
}

/// Buffer the first `file` field; other fields are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // A plain form value under `file` is not an upload.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(AppError::ValidationError(anyhow::anyhow!(
                "multipart field `{}` must be a file",
                UPLOAD_FIELD
            )));
        };
        let media_type = field
            .content_type()
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();
        let content = field.bytes().await.map_err(multipart_error)?;

        let mut upload = Upload::new(media_type, content);
        upload.file_name = Some(file_name);
        return Ok(upload);
    }

    Err(AppError::ValidationError(anyhow::anyhow!(
        "multipart field `{}` is required",
        UPLOAD_FIELD
    )))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(anyhow::anyhow!("{}", err.body_text()))
    } else {
        AppError::BadRequest(anyhow::anyhow!(
            "Failed to read multipart body: {}",
            err.body_text()
        ))
    }
}
