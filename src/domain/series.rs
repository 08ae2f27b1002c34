// Chart-ready series domain models
use super::variable::DataType;
use serde::Serialize;

/// One record projected for charting.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub timestamp: String,
    pub display_timestamp: String,
    pub value: f64,
    pub original_value: String,
    pub address: String,
    pub module: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Change between the latest two points of a series, percentage rounded to
/// one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub percentage: f64,
}

/// All points sharing one symbol, ordered ascending by timestamp. Address,
/// module and data type are taken from the group's first point.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolSeries {
    pub symbol: String,
    pub address: String,
    pub module: String,
    pub data_type: DataType,
    pub points: Vec<SeriesPoint>,
    pub trend: Option<Trend>,
}
