//! Production completion backend over the hosted inference service.

use cortex_client::{CompletionService, CortexError};

use crate::backend::CompletionBackend;

/// Adapter binding a [`CompletionService`] to the pipeline's completion
/// seam. Both the summarization and answer stages go through it.
pub struct CortexCompletion {
    svc: CompletionService,
}

impl CortexCompletion {
    pub fn new(svc: CompletionService) -> Self {
        Self { svc }
    }
}

impl CompletionBackend for CortexCompletion {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, CortexError> {
        Ok(self.svc.complete(model, prompt).await?)
    }
}
