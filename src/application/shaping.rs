// Shaping engine - record grouping, deduplication and aggregation
use crate::domain::series::{SeriesPoint, SymbolSeries, Trend, TrendDirection};
use crate::domain::summary::{
    BoolAggregates, ModuleCount, VariableStatistics, VariableSummary, WordAggregates,
};
use crate::domain::variable::{parse_timestamp, DataType, RawValue, VariableRecord};
use std::collections::{HashMap, HashSet};

const UNKNOWN_SYMBOL: &str = "Unknown";

/// Partition records into per-symbol series, in first-appearance order.
/// Records without a symbol group under "Unknown". Each series is sorted
/// stably ascending by timestamp and carries the group trend.
pub fn group_by_symbol(records: &[VariableRecord]) -> Vec<SymbolSeries> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<SeriesPoint>> = HashMap::new();

    for record in records {
        let symbol = record
            .symbol
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SYMBOL)
            .to_string();
        if !groups.contains_key(&symbol) {
            order.push(symbol.clone());
        }
        groups.entry(symbol).or_default().push(series_point(record));
    }

    order
        .into_iter()
        .filter_map(|symbol| {
            let mut points = groups.remove(&symbol)?;
            points.sort_by_key(|p| parse_timestamp(&p.timestamp));
            let first = points.first()?;
            let (address, module, data_type) =
                (first.address.clone(), first.module.clone(), first.data_type.clone());
            let trend = compute_trend(&points, &data_type);
            Some(SymbolSeries {
                symbol,
                address,
                module,
                data_type,
                points,
                trend,
            })
        })
        .collect()
}

fn series_point(record: &VariableRecord) -> SeriesPoint {
    let display_timestamp = record
        .parsed_timestamp()
        .map(|ts| ts.format("%d/%m/%Y %H:%M:%S").to_string())
        .unwrap_or_else(|| record.timestamp.clone());
    SeriesPoint {
        timestamp: record.timestamp.clone(),
        display_timestamp,
        value: record.projection(),
        original_value: record.value.to_string(),
        address: record.address.clone(),
        module: record.module.clone(),
        data_type: record.data_type.clone(),
    }
}

/// Boolean series never carry a trend. A previous value of exactly zero
/// reports Stable regardless of the latest value.
fn compute_trend(points: &[SeriesPoint], data_type: &DataType) -> Option<Trend> {
    if *data_type == DataType::Bool {
        return None;
    }
    let latest = points.last().map(|p| p.value).unwrap_or(0.0);
    let previous = points
        .len()
        .checked_sub(2)
        .and_then(|i| points.get(i))
        .map(|p| p.value)
        .unwrap_or(0.0);
    if previous == 0.0 {
        return Some(Trend {
            direction: TrendDirection::Stable,
            percentage: 0.0,
        });
    }
    let direction = if latest > previous {
        TrendDirection::Up
    } else if latest < previous {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };
    let percentage = ((latest - previous) / previous * 1000.0).round() / 10.0;
    Some(Trend {
        direction,
        percentage,
    })
}

/// Keep the first occurrence per symbol, in original order. Records sharing
/// a symbol are collapsed even when module or address differ.
pub fn dedupe_by_symbol(records: &[VariableRecord]) -> Vec<VariableRecord> {
    let mut seen: HashSet<Option<String>> = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.symbol.clone()))
        .cloned()
        .collect()
}

/// Tile counts over the symbol-deduplicated set.
pub fn summarize(records: &[VariableRecord]) -> VariableSummary {
    let unique = dedupe_by_symbol(records);
    let modules: HashSet<&str> = unique.iter().map(|r| r.module.as_str()).collect();
    VariableSummary {
        total: unique.len(),
        bool_count: unique.iter().filter(|r| r.data_type == DataType::Bool).count(),
        word_count: unique.iter().filter(|r| r.data_type == DataType::Word).count(),
        module_count: modules.len(),
    }
}

/// One pass over the full collection: totals, counts by data type, modules
/// in first-seen order and per-module counts.
pub fn statistics(records: &[VariableRecord]) -> VariableStatistics {
    let mut per_module: Vec<ModuleCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut bool_count = 0;
    let mut word_count = 0;

    for record in records {
        match record.data_type {
            DataType::Bool => bool_count += 1,
            DataType::Word => word_count += 1,
            DataType::Other(_) => {}
        }
        let slot = *index.entry(record.module.clone()).or_insert_with(|| {
            per_module.push(ModuleCount::new(record.module.clone()));
            per_module.len() - 1
        });
        per_module[slot].count += 1;
        match record.data_type {
            DataType::Bool => per_module[slot].bool_count += 1,
            DataType::Word => per_module[slot].word_count += 1,
            DataType::Other(_) => {}
        }
    }

    VariableStatistics {
        total: records.len(),
        bool_count,
        word_count,
        modules: per_module.iter().map(|m| m.module.clone()).collect(),
        per_module,
    }
}

/// Min/max/average of WORD projections, None when no WORD records exist.
pub fn word_aggregates(records: &[VariableRecord]) -> Option<WordAggregates> {
    let values: Vec<f64> = records
        .iter()
        .filter(|r| r.data_type == DataType::Word)
        .map(|r| r.projection())
        .collect();
    if values.is_empty() {
        return None;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let average = values.iter().sum::<f64>() / values.len() as f64;
    Some(WordAggregates {
        count: values.len(),
        min,
        max,
        average,
    })
}

/// True/False counts over BOOL raw values, None when no BOOL records exist.
/// Only the exact literals are counted; junk text counts as neither.
pub fn bool_aggregates(records: &[VariableRecord]) -> Option<BoolAggregates> {
    let bools: Vec<&VariableRecord> = records
        .iter()
        .filter(|r| r.data_type == DataType::Bool)
        .collect();
    if bools.is_empty() {
        return None;
    }
    let literal_count = |literal: &str| {
        bools
            .iter()
            .filter(|r| matches!(&r.value, RawValue::Text(t) if t == literal))
            .count()
    };
    Some(BoolAggregates {
        count: bools.len(),
        true_count: literal_count("True"),
        false_count: literal_count("False"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(symbol: Option<&str>, data_type: &str, value: &str, timestamp: &str) -> VariableRecord {
        VariableRecord {
            id: None,
            address: "%IW64".to_string(),
            symbol: symbol.map(|s| s.to_string()),
            comment: None,
            data_type: DataType::from(data_type.to_string()),
            value: RawValue::Text(value.to_string()),
            module: "AI8x13Bit".to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn grouping_is_a_partition_with_unknown_fallback() {
        let records = vec![
            record(Some("Temp"), "WORD", "10.5", "2025-01-15T10:00:00"),
            record(None, "WORD", "1.0", "2025-01-15T10:01:00"),
            record(Some("Temp"), "WORD", "12.0", "2025-01-15T10:02:00"),
            record(Some(""), "WORD", "2.0", "2025-01-15T10:03:00"),
        ];
        let series = group_by_symbol(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].symbol, "Temp");
        assert_eq!(series[1].symbol, "Unknown");
        let total: usize = series.iter().map(|s| s.points.len()).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn points_are_sorted_by_timestamp_regardless_of_input_order() {
        let records = vec![
            record(Some("Temp"), "WORD", "3.0", "2025-01-15T12:00:00"),
            record(Some("Temp"), "WORD", "1.0", "2025-01-15T10:00:00"),
            record(Some("Temp"), "WORD", "2.0", "2025-01-15T11:00:00"),
        ];
        let series = group_by_symbol(&records);
        let values: Vec<f64> = series[0].points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn trend_up_with_rounded_percentage() {
        let records = vec![
            record(Some("Temp"), "WORD", "10.5", "2025-01-15T10:00:00"),
            record(Some("Temp"), "WORD", "12.0", "2025-01-15T11:00:00"),
        ];
        let series = group_by_symbol(&records);
        let trend = series[0].trend.unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
        assert_eq!(trend.percentage, 14.3);
    }

    #[test]
    fn trend_is_stable_when_previous_value_is_zero() {
        let records = vec![
            record(Some("Flow"), "WORD", "0", "2025-01-15T10:00:00"),
            record(Some("Flow"), "WORD", "500", "2025-01-15T11:00:00"),
        ];
        let series = group_by_symbol(&records);
        let trend = series[0].trend.unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.percentage, 0.0);
    }

    #[test]
    fn boolean_series_have_no_trend() {
        let records = vec![
            record(Some("Door"), "BOOL", "False", "2025-01-15T10:00:00"),
            record(Some("Door"), "BOOL", "True", "2025-01-15T11:00:00"),
        ];
        let series = group_by_symbol(&records);
        assert!(series[0].trend.is_none());
        assert_eq!(series[0].points[1].value, 1.0);
    }

    #[test]
    fn single_point_series_is_stable() {
        let records = vec![record(Some("Temp"), "WORD", "5.0", "2025-01-15T10:00:00")];
        let series = group_by_symbol(&records);
        let trend = series[0].trend.unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let records = vec![
            record(Some("B"), "WORD", "1", "2025-01-15T10:00:00"),
            record(Some("A"), "BOOL", "True", "2025-01-15T10:01:00"),
            record(Some("B"), "WORD", "2", "2025-01-15T10:02:00"),
            record(Some("A"), "BOOL", "False", "2025-01-15T10:03:00"),
        ];
        let unique = dedupe_by_symbol(&records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].symbol.as_deref(), Some("B"));
        assert_eq!(unique[1].symbol.as_deref(), Some("A"));
        assert_eq!(unique[1].value, RawValue::Text("True".to_string()));
    }

    #[test]
    fn summary_counts_deduplicated_records() {
        let records = vec![
            record(Some("A"), "BOOL", "True", "2025-01-15T10:00:00"),
            record(Some("A"), "BOOL", "False", "2025-01-15T10:01:00"),
            record(Some("B"), "WORD", "7", "2025-01-15T10:02:00"),
        ];
        let summary = summarize(&records);
        assert_eq!(
            summary,
            VariableSummary {
                total: 2,
                bool_count: 1,
                word_count: 1,
                module_count: 1,
            }
        );
    }

    #[test]
    fn statistics_preserve_module_first_seen_order() {
        let mut records = vec![
            record(Some("A"), "BOOL", "True", "2025-01-15T10:00:00"),
            record(Some("B"), "WORD", "7", "2025-01-15T10:01:00"),
        ];
        records[0].module = "DO8xDC24V_2A".to_string();
        let stats = statistics(&records);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.bool_count, 1);
        assert_eq!(stats.word_count, 1);
        assert_eq!(stats.modules, vec!["DO8xDC24V_2A", "AI8x13Bit"]);
        assert_eq!(stats.per_module[0].bool_count, 1);
        assert_eq!(stats.per_module[1].word_count, 1);
    }

    #[test]
    fn word_aggregates_use_parse_defaults() {
        let records = vec![
            record(Some("A"), "WORD", "2.0", "2025-01-15T10:00:00"),
            record(Some("B"), "WORD", "junk", "2025-01-15T10:01:00"),
            record(Some("C"), "WORD", "10.0", "2025-01-15T10:02:00"),
            record(Some("D"), "BOOL", "True", "2025-01-15T10:03:00"),
        ];
        let aggregates = word_aggregates(&records).unwrap();
        assert_eq!(aggregates.count, 3);
        assert_eq!(aggregates.min, 0.0);
        assert_eq!(aggregates.max, 10.0);
        assert_eq!(aggregates.average, 4.0);
        assert!(word_aggregates(&records[3..]).is_none());
    }

    #[test]
    fn bool_aggregates_count_exact_literals() {
        let records = vec![
            record(Some("A"), "BOOL", "True", "2025-01-15T10:00:00"),
            record(Some("B"), "BOOL", "False", "2025-01-15T10:01:00"),
            record(Some("C"), "BOOL", "maybe", "2025-01-15T10:02:00"),
        ];
        let aggregates = bool_aggregates(&records).unwrap();
        assert_eq!(aggregates.count, 3);
        assert_eq!(aggregates.true_count, 1);
        assert_eq!(aggregates.false_count, 1);
    }
}
