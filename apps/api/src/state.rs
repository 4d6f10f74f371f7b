use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::llm_client::LanguageModel;
use crate::ocr::TextRecognizer;
use crate::reference::ReferenceData;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Upstream model. Default: `DashScopeClient`; tests inject a scripted model.
    pub llm: Arc<dyn LanguageModel>,
    /// `None` when no OCR engine is installed; `/api/ocr` then answers 503.
    pub ocr: Option<Arc<dyn TextRecognizer>>,
    pub reference: ReferenceData,
    pub config: Config,
}
