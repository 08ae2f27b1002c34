// Summary and statistics domain models
use serde::Serialize;

/// Counts over the symbol-deduplicated record set, shown as dashboard tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableSummary {
    pub total: usize,
    pub bool_count: usize,
    pub word_count: usize,
    pub module_count: usize,
}

/// Per-module breakdown of one record collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCount {
    pub module: String,
    pub count: usize,
    pub bool_count: usize,
    pub word_count: usize,
}

impl ModuleCount {
    pub fn new(module: String) -> Self {
        Self {
            module,
            count: 0,
            bool_count: 0,
            word_count: 0,
        }
    }
}

/// Counts over the full (non-deduplicated) record collection, with modules
/// listed in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableStatistics {
    pub total: usize,
    pub bool_count: usize,
    pub word_count: usize,
    pub modules: Vec<String>,
    pub per_module: Vec<ModuleCount>,
}

/// Aggregates over WORD-type projections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordAggregates {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Aggregates over BOOL-type raw values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoolAggregates {
    pub count: usize,
    pub true_count: usize,
    pub false_count: usize,
}
