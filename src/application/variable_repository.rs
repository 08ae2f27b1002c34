// Repository trait for variable data access
use crate::domain::variable::VariableRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Failure modes of a variable query. Validation failures are surfaced
/// before any request is issued; transport failures are already retried by
/// the implementation before reaching the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid query: {0}")]
    Validation(String),
    #[error("upstream request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait VariableRepository: Send + Sync {
    /// Fetch every known variable record.
    async fn fetch_all(&self) -> Result<Vec<VariableRecord>, FetchError>;

    /// Fetch the records produced by one module.
    async fn fetch_by_module(&self, module: &str) -> Result<Vec<VariableRecord>, FetchError>;

    /// Fetch the records inside an inclusive timestamp range. Both bounds
    /// are required; date-only bounds are widened to full date-times.
    async fn fetch_by_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<VariableRecord>, FetchError>;
}
