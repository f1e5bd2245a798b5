use thiserror::Error;

/// Failure of the storage backend behind a `ReturnsSource`.
///
/// Only genuine backend failures (connection loss, malformed rows) surface
/// here. An entity with no recorded data is NOT an error: sources return an
/// empty series and completeness checking downgrades the window instead.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("return store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl SourceError {
    /// Wraps an adapter-specific error as a backend failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SourceError::Backend(Box::new(err))
    }
}
