//! Per-sample population frequencies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One population's share of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub sample_id: String,
    pub subject_id: String,
    pub population: String,
    /// Raw count for this population.
    pub count: u64,
    /// Sum of counts over the full population panel for this sample.
    pub total_count: u64,
    /// `count / total_count * 100`.
    pub percentage: f64,
    pub response: Option<String>,
    pub indication: String,
    pub treatment: String,
    pub sample_type: String,
    pub gender: String,
    pub time_from_treatment_start: i64,
}

/// Why a sample produced no frequency rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// All population counts are zero; percentages are undefined.
    ZeroTotal,
    /// Some populations of the panel have no count.
    IncompletePopulations { missing: Vec<String> },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::ZeroTotal => f.write_str("total count is zero"),
            DropReason::IncompletePopulations { missing } => {
                write!(f, "missing populations: {}", missing.join(", "))
            }
        }
    }
}

/// A sample excluded from normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedSample {
    pub sample_id: String,
    #[serde(flatten)]
    pub reason: DropReason,
}

/// Frequency rows for a cohort, plus the samples that had to be excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    /// Rows sorted by (sample, population).
    pub rows: Vec<FrequencyRow>,
    /// Samples matching the filter that were excluded, sorted by sample.
    pub dropped: Vec<DroppedSample>,
}

impl FrequencyTable {
    /// Column schema of `rows`, in output order.
    pub const COLUMNS: [&'static str; 12] = [
        "sample_id",
        "subject_id",
        "population",
        "count",
        "total_count",
        "percentage",
        "response",
        "indication",
        "treatment",
        "sample_type",
        "gender",
        "time_from_treatment_start",
    ];

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct samples with rows, in order.
    pub fn sample_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rows.iter().map(|r| r.sample_id.as_str()).collect();
        ids.dedup();
        ids
    }

    /// Rows for one sample.
    pub fn rows_for_sample<'a>(&'a self, sample_id: &'a str) -> impl Iterator<Item = &'a FrequencyRow> + 'a {
        self.rows.iter().filter(move |r| r.sample_id == sample_id)
    }

    /// Number of samples excluded because their total count was zero.
    pub fn n_dropped_zero_total(&self) -> usize {
        self.dropped
            .iter()
            .filter(|d| d.reason == DropReason::ZeroTotal)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_reason_json() {
        let dropped = DroppedSample {
            sample_id: "S3".to_string(),
            reason: DropReason::IncompletePopulations {
                missing: vec!["nk_cell".to_string()],
            },
        };
        let json = serde_json::to_string(&dropped).unwrap();
        assert_eq!(
            json,
            r#"{"sample_id":"S3","reason":"incomplete_populations","missing":["nk_cell"]}"#
        );
    }

    #[test]
    fn test_empty_table_keeps_schema() {
        let table = FrequencyTable::default();
        assert!(table.is_empty());
        assert_eq!(FrequencyTable::COLUMNS.len(), 12);
        assert!(table.sample_ids().is_empty());
    }

    #[test]
    fn test_columns_match_serialized_fields() {
        let row = FrequencyRow {
            sample_id: "S1".to_string(),
            subject_id: "sbj1".to_string(),
            population: "b_cell".to_string(),
            count: 10,
            total_count: 100,
            percentage: 10.0,
            response: None,
            indication: "melanoma".to_string(),
            treatment: "miraclib".to_string(),
            sample_type: "PBMC".to_string(),
            gender: "F".to_string(),
            time_from_treatment_start: 0,
        };
        let json = serde_json::to_value(&row).unwrap();
        let mut fields: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let mut columns = FrequencyTable::COLUMNS.to_vec();
        fields.sort_unstable();
        columns.sort_unstable();
        assert_eq!(fields, columns);
    }
}
