use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::ocr::decode_image_payload;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OcrRequest {
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub text: String,
}

/// POST /api/ocr
///
/// Availability is checked before the body is parsed, so a missing engine
/// always answers 503.
pub async fn handle_ocr(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<OcrResponse>, AppError> {
    let Some(recognizer) = state.ocr.as_ref() else {
        return Err(AppError::ServiceUnavailable(
            "OCR feature is not available. Please install Tesseract OCR.".to_string(),
        ));
    };

    let request: OcrRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;
    if request.image.is_empty() {
        return Err(AppError::Validation("Image data is required".to_string()));
    }

    let image = decode_image_payload(&request.image)
        .map_err(|e| AppError::Validation(format!("Invalid image data: {e}")))?;

    let text = recognizer
        .recognize(&image)
        .await
        .map_err(|e| AppError::Internal(e.context("OCR processing failed")))?;

    info!("OCR extracted {} characters", text.trim().chars().count());
    Ok(Json(OcrResponse {
        text: text.trim().to_string(),
    }))
}
