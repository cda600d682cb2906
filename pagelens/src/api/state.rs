use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::Config;
use crate::ocr::OcrPipeline;

/// Outcome of the one-time engine probe run when the state is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Available,
    Unavailable { reason: String },
}

impl EngineStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, EngineStatus::Available)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: OcrPipeline,
    /// Bounds the number of OCR jobs running on the blocking pool.
    pub jobs: Arc<Semaphore>,
    pub engine: EngineStatus,
}

impl AppState {
    pub fn new(config: Config, pipeline: OcrPipeline) -> Self {
        let engine = match pipeline.probe_engine(&config.ocr.default_language) {
            Ok(()) => EngineStatus::Available,
            Err(e) => {
                tracing::warn!(
                    engine = pipeline.extractor().engine_name(),
                    language = %config.ocr.default_language,
                    "OCR engine unavailable: {}",
                    e
                );
                EngineStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        let jobs = Arc::new(Semaphore::new(config.server.max_concurrent_jobs.max(1)));

        Self {
            config: Arc::new(config),
            pipeline,
            jobs,
            engine,
        }
    }
}
