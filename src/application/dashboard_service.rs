// Dashboard service - Use cases behind the table, chart and summary views
use crate::application::shaping;
use crate::application::variable_repository::{FetchError, VariableRepository};
use crate::domain::series::SymbolSeries;
use crate::domain::summary::VariableSummary;
use crate::domain::variable::VariableRecord;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn VariableRepository>,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn VariableRepository>) -> Self {
        Self { repository }
    }

    pub async fn all_variables(&self) -> Result<Vec<VariableRecord>, FetchError> {
        self.repository.fetch_all().await
    }

    pub async fn variables_by_module(
        &self,
        module: &str,
    ) -> Result<Vec<VariableRecord>, FetchError> {
        self.repository.fetch_by_module(module).await
    }

    pub async fn variables_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<VariableRecord>, FetchError> {
        self.repository.fetch_by_date_range(start, end).await
    }

    /// Per-symbol chart series over the full record set.
    pub async fn symbol_charts(&self) -> Result<Vec<SymbolSeries>, FetchError> {
        let records = self.repository.fetch_all().await?;
        Ok(shaping::group_by_symbol(&records))
    }

    /// Deduplicated tile counts over the full record set.
    pub async fn summary(&self) -> Result<VariableSummary, FetchError> {
        let records = self.repository.fetch_all().await?;
        Ok(shaping::summarize(&records))
    }
}
