// Report service - Canned report shapes over the record collection
use crate::application::shaping;
use crate::application::variable_repository::{FetchError, VariableRepository};
use crate::domain::variable::VariableRecord;
use crate::infrastructure::chart_image::render_series_chart;
use crate::infrastructure::pdf_writer::{ReportArtifact, ReportError, ReportWriter};
use chrono::Local;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Title and the variables table.
    Table,
    /// Adds general statistics ahead of the table.
    Complete,
    /// Statistics, per-type and per-module analysis, table, charts and
    /// narrative conclusions.
    Advanced,
}

impl ReportKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "table" => Some(ReportKind::Table),
            "complete" => Some(ReportKind::Complete),
            "advanced" => Some(ReportKind::Advanced),
            _ => None,
        }
    }
}

/// Which slice of the record collection a report covers.
#[derive(Debug, Clone, Default)]
pub struct RecordSelection {
    pub module: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Clone)]
pub struct ReportService {
    repository: Arc<dyn VariableRepository>,
}

impl ReportService {
    pub fn new(repository: Arc<dyn VariableRepository>) -> Self {
        Self { repository }
    }

    /// Build one downloadable report. Rejected before any document is
    /// started when the selection yields no records.
    pub async fn generate(
        &self,
        kind: ReportKind,
        selection: &RecordSelection,
        title: &str,
    ) -> Result<ReportArtifact, ReportError> {
        let records = self.select_records(selection).await?;
        if records.is_empty() {
            return Err(ReportError::NoData);
        }

        match kind {
            ReportKind::Table => table_report(&records, title),
            ReportKind::Complete => complete_report(&records, title),
            ReportKind::Advanced => advanced_report(&records, title),
        }
    }

    async fn select_records(
        &self,
        selection: &RecordSelection,
    ) -> Result<Vec<VariableRecord>, FetchError> {
        if let Some(module) = &selection.module {
            return self.repository.fetch_by_module(module).await;
        }
        if selection.start_date.is_some() || selection.end_date.is_some() {
            return self
                .repository
                .fetch_by_date_range(
                    selection.start_date.as_deref().unwrap_or(""),
                    selection.end_date.as_deref().unwrap_or(""),
                )
                .await;
        }
        self.repository.fetch_all().await
    }
}

fn table_report(records: &[VariableRecord], title: &str) -> Result<ReportArtifact, ReportError> {
    let mut writer = ReportWriter::new(title)?;
    writer.add_title(title);
    writer.add_variables_table(records, "Variables");
    writer.finalize("report.pdf")
}

fn complete_report(records: &[VariableRecord], title: &str) -> Result<ReportArtifact, ReportError> {
    let mut writer = ReportWriter::new(title)?;
    writer.add_title(title);
    writer.add_text("Report generated automatically by the monitoring system.");
    writer.advance(10.0);
    writer.add_statistics(records);
    writer.add_variables_table(records, "Variable List");
    writer.finalize("report.pdf")
}

fn advanced_report(records: &[VariableRecord], title: &str) -> Result<ReportArtifact, ReportError> {
    let mut writer = ReportWriter::new(title)?;
    writer.add_title(title);
    writer.add_text("Advanced report generated automatically by the monitoring system.");
    writer.add_text(
        "This report includes detailed statistics, data tables and charts \
         for the system variables.",
    );
    writer.advance(10.0);

    writer.add_statistics(records);

    writer.add_subtitle("Analysis by Data Type");
    let bools = shaping::bool_aggregates(records);
    let words = shaping::word_aggregates(records);

    writer.add_text(&format!(
        "BOOL (digital) variables: {}",
        bools.as_ref().map_or(0, |b| b.count)
    ));
    if let Some(bools) = &bools {
        writer.add_text(&format!("  - True values: {}", bools.true_count));
        writer.add_text(&format!("  - False values: {}", bools.false_count));
    }
    writer.add_text(&format!(
        "WORD (analog) variables: {}",
        words.as_ref().map_or(0, |w| w.count)
    ));
    if let Some(words) = &words {
        writer.add_text(&format!("  - Minimum value: {:.2}", words.min));
        writer.add_text(&format!("  - Maximum value: {:.2}", words.max));
        writer.add_text(&format!("  - Average value: {:.2}", words.average));
    }

    writer.add_subtitle("Analysis by Module");
    let stats = shaping::statistics(records);
    for module in &stats.per_module {
        writer.add_text(&format!(
            "{}: {} variables ({} BOOL, {} WORD)",
            module.module, module.count, module.bool_count, module.word_count
        ));
    }

    writer.add_variables_table(records, "Complete Variable List");

    // Charts are rasterized one at a time to keep page order and peak
    // memory deterministic.
    let series = shaping::group_by_symbol(records);
    if !series.is_empty() {
        writer.add_subtitle("Variable Charts");
        writer.add_text("The following charts show how each variable evolved over time:");
        for group in &series {
            match render_series_chart(group) {
                Ok(chart) => writer.add_chart_image(&chart, &chart.caption),
                Err(error) => {
                    tracing::warn!("failed to render chart '{}': {}", group.symbol, error);
                    writer.add_text(&format!("Failed to render chart: {}", group.symbol));
                }
            }
        }
    }

    writer.add_subtitle("Conclusions");
    writer.add_text(&format!(
        "The system monitors {} variables in real time.",
        records.len()
    ));
    writer.add_text(&format!(
        "{} distinct modules were identified in the system.",
        stats.modules.len()
    ));
    if words.is_some() {
        writer.add_text(
            "The analog (WORD) variables show value variations, indicating system activity.",
        );
    }
    if bools.is_some() {
        writer.add_text("The digital (BOOL) variables control discrete system states.");
    }

    let filename = format!("advanced-report-{}.pdf", Local::now().format("%Y-%m-%d"));
    writer.finalize(&filename)
}
