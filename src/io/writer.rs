//! Tabular export of frequency and comparison results.
//!
//! Values are written at full precision; `None` becomes `NA`. The header is
//! always written, so an empty result still carries its schema.

use crate::data::{ComparisonSet, FrequencyTable};
use crate::error::Result;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const MISSING: &str = "NA";

fn opt_f64(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn tsv_writer<W: Write>(writer: W) -> Writer<W> {
    WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

/// Write frequency rows as TSV.
pub fn write_frequency_tsv<W: Write>(table: &FrequencyTable, writer: W) -> Result<()> {
    let mut wtr = tsv_writer(writer);
    wtr.write_record(FrequencyTable::COLUMNS)?;
    for row in &table.rows {
        wtr.write_record([
            row.sample_id.clone(),
            row.subject_id.clone(),
            row.population.clone(),
            row.count.to_string(),
            row.total_count.to_string(),
            row.percentage.to_string(),
            row.response.clone().unwrap_or_else(|| MISSING.to_string()),
            row.indication.clone(),
            row.treatment.clone(),
            row.sample_type.clone(),
            row.gender.clone(),
            row.time_from_treatment_start.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the samples excluded from a frequency table as TSV.
pub fn write_dropped_tsv<W: Write>(table: &FrequencyTable, writer: W) -> Result<()> {
    let mut wtr = tsv_writer(writer);
    wtr.write_record(["sample_id", "reason"])?;
    for dropped in &table.dropped {
        wtr.write_record([dropped.sample_id.clone(), dropped.reason.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write comparison results as TSV.
pub fn write_comparison_tsv<W: Write>(set: &ComparisonSet, writer: W) -> Result<()> {
    let mut wtr = tsv_writer(writer);
    wtr.write_record(ComparisonSet::COLUMNS)?;
    for r in &set.results {
        wtr.write_record([
            r.population.clone(),
            r.n_yes.to_string(),
            r.n_no.to_string(),
            opt_f64(r.mean_yes),
            opt_f64(r.mean_no),
            opt_f64(r.statistic),
            opt_f64(r.df),
            opt_f64(r.p_value),
            opt_f64(r.p_adj),
            r.significant.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write any serializable result as pretty-printed JSON.
pub fn write_json<T: Serialize, W: Write>(value: &T, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Create (or truncate) an output file.
pub fn create_output<P: AsRef<Path>>(path: P) -> Result<File> {
    Ok(File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ComparisonResult, DropReason, DroppedSample, FrequencyRow};

    #[test]
    fn test_empty_frequency_table_has_header() {
        let mut out = Vec::new();
        write_frequency_tsv(&FrequencyTable::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end(), FrequencyTable::COLUMNS.join("\t"));
    }

    #[test]
    fn test_frequency_row_full_precision() {
        let table = FrequencyTable {
            rows: vec![FrequencyRow {
                sample_id: "S1".to_string(),
                subject_id: "sbj1".to_string(),
                population: "b_cell".to_string(),
                count: 1,
                total_count: 3,
                percentage: 100.0 / 3.0,
                response: None,
                indication: "melanoma".to_string(),
                treatment: "miraclib".to_string(),
                sample_type: "PBMC".to_string(),
                gender: "M".to_string(),
                time_from_treatment_start: 0,
            }],
            dropped: vec![],
        };
        let mut out = Vec::new();
        write_frequency_tsv(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let line = text.lines().nth(1).unwrap();
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields[5].parse::<f64>().unwrap(), 100.0 / 3.0);
        assert_eq!(fields[6], "NA");
    }

    #[test]
    fn test_comparison_missing_values() {
        let set = ComparisonSet {
            results: vec![ComparisonResult {
                population: "nk_cell".to_string(),
                n_yes: 1,
                n_no: 4,
                mean_yes: Some(12.5),
                mean_no: Some(10.0),
                statistic: None,
                df: None,
                p_value: None,
                p_adj: None,
                significant: false,
            }],
            n_tested: 0,
        };
        let mut out = Vec::new();
        write_comparison_tsv(&set, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().nth(1).unwrap(),
            "nk_cell\t1\t4\t12.5\t10\tNA\tNA\tNA\tNA\tfalse"
        );
    }

    #[test]
    fn test_dropped_tsv() {
        let table = FrequencyTable {
            rows: vec![],
            dropped: vec![DroppedSample {
                sample_id: "S3".to_string(),
                reason: DropReason::ZeroTotal,
            }],
        };
        let mut out = Vec::new();
        write_dropped_tsv(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "sample_id\treason\nS3\ttotal count is zero\n");
    }

    #[test]
    fn test_json_output() {
        let mut out = Vec::new();
        write_json(&ComparisonSet::default(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["n_tested"], 0);
    }
}
