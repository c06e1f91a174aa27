//! Collaborator seams: the abstract search and completion backends.
//!
//! Production implementations wrap `cortex-client`; tests plug in stubs.
//! Both collaborators are shared, unversioned remote resources. This
//! pipeline only issues read-only queries and stateless generation
//! requests against them; it holds no lock and assumes no transactional
//! isolation.

use std::future::Future;

use cortex_client::CortexError;

use crate::api_types::RetrievedChunk;

/// External similarity-search collaborator.
///
/// Implementations return at most `limit` chunks, ordered by the
/// collaborator's relevance ranking (ties broken remotely, not reproducible
/// locally). Any failure is fatal for the current turn.
pub trait SearchBackend: Send + Sync {
    /// Fetch the chunks most relevant to `query`.
    fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<RetrievedChunk>, CortexError>> + Send;
}

/// External completion collaborator.
///
/// One synchronous request/response per call; no streaming, no retry.
pub trait CompletionBackend: Send + Sync {
    /// Generate text for `prompt` with the given model identifier.
    fn complete(
        &self,
        model: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, CortexError>> + Send;
}
