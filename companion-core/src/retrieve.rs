//! Production search backend over the managed search service.
//!
//! Maps raw result rows to [`RetrievedChunk`]s using the configured column
//! names. Rows missing a column map to empty fields rather than failing the
//! whole result set; a malformed document never gets this far (the client
//! rejects it).

use cortex_client::{CortexError, SearchService};

use crate::api_types::RetrievedChunk;
use crate::backend::SearchBackend;

/// Adapter binding a [`SearchService`] to the pipeline's retrieval seam.
pub struct CortexSearch {
    svc: SearchService,
    text_column: String,
    source_column: String,
}

impl CortexSearch {
    /// Wraps a search service, naming the columns that carry chunk text and
    /// the source document path.
    pub fn new(
        svc: SearchService,
        text_column: impl Into<String>,
        source_column: impl Into<String>,
    ) -> Self {
        Self {
            svc,
            text_column: text_column.into(),
            source_column: source_column.into(),
        }
    }
}

impl SearchBackend for CortexSearch {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<RetrievedChunk>, CortexError> {
        let rows = self.svc.query(query, limit).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let text = row
                .get(&self.text_column)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let source_id = row
                .get(&self.source_column)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            out.push(RetrievedChunk { text, source_id });
        }
        Ok(out)
    }
}
