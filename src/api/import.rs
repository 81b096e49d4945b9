use axum::{Json, extract::Multipart, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::{BatchReport, ImportService, UploadedFile};

/// POST /upload/excel (admin)
///
/// Accepts up to five spreadsheet files as multipart form fields and
/// loads their rows into the service catalog. The response details
/// per-file and aggregate completed/skipped/failed counts.
pub async fn upload_excel(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<BatchReport>>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart payload: {e}")))?
    {
        let Some(filename) = field.file_name().map(ToString::to_string) else {
            continue;
        };

        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Could not read file {filename}: {e}")))?;

        files.push(UploadedFile {
            filename,
            content: content.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(ApiError::validation("No files uploaded"));
    }

    let report = state.import_service().import_batch(files).await?;

    Ok(Json(ApiResponse::success(report)))
}
