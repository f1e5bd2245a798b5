use core_types::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The storage backend failed while materializing window data. Missing
    /// data is not a failure — it yields empty series and incomplete
    /// windows — so this only carries genuine backend errors.
    #[error("failed to materialize window data: {0}")]
    Source(#[from] SourceError),
}
