//! Loading the wide cell-count CSV: one row per sample, metadata columns
//! followed by one count column per population.

use crate::data::{CountRecord, Dataset, PopulationSet, SampleMeta, SampleRegistry};
use crate::error::{FreqError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Accepted header names for each metadata column, matched case-insensitively.
pub const COLUMN_ALIASES: [(&str, &[&str]); 9] = [
    ("project_id", &["project", "project_id"]),
    ("subject_id", &["subject", "subject_id", "patient_id"]),
    ("indication", &["indication", "condition"]),
    ("treatment", &["treatment"]),
    ("response", &["response"]),
    ("gender", &["gender", "sex"]),
    ("sample_id", &["sample", "sample_id"]),
    ("sample_type", &["sample_type"]),
    ("time_from_treatment_start", &["time_from_treatment_start"]),
];

/// Column positions resolved from the header.
struct ColumnMap {
    metadata: HashMap<&'static str, usize>,
    populations: Vec<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord, populations: &PopulationSet) -> Result<Self> {
        let lower: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_ascii_lowercase(), i))
            .collect();

        let mut metadata = HashMap::new();
        for (logical, aliases) in COLUMN_ALIASES.iter() {
            let idx = aliases
                .iter()
                .find_map(|a| lower.get(*a).copied())
                .ok_or_else(|| FreqError::MissingColumn {
                    logical: logical.to_string(),
                    aliases: aliases.join(", "),
                })?;
            metadata.insert(*logical, idx);
        }

        let populations = populations
            .names()
            .iter()
            .map(|name| {
                lower
                    .get(&name.to_ascii_lowercase())
                    .copied()
                    .ok_or_else(|| FreqError::MissingColumn {
                        logical: name.clone(),
                        aliases: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            metadata,
            populations,
        })
    }

    fn field<'r>(&self, record: &'r StringRecord, logical: &str) -> &'r str {
        self.metadata
            .get(logical)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
    }
}

fn is_missing(value: &str) -> bool {
    matches!(value, "" | "NA" | "na" | "NaN" | "nan")
}

/// Load a wide cell-count CSV file.
pub fn load_cell_counts<P: AsRef<Path>>(path: P, populations: &PopulationSet) -> Result<Dataset> {
    let path = path.as_ref();
    info!("Loading cell counts from {}", path.display());
    let file = File::open(path)?;
    read_cell_counts(file, populations)
}

/// Read a wide cell-count CSV from any reader.
///
/// Every metadata column (under any accepted alias) and every population of
/// the panel must be present in the header. A sample listed on several rows
/// keeps the counts of its last row.
pub fn read_cell_counts<R: Read>(reader: R, populations: &PopulationSet) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = ColumnMap::resolve(&headers, populations)?;

    let mut samples = SampleRegistry::new();
    let mut records: Vec<CountRecord> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (row_idx, result) in rdr.records().enumerate() {
        let record = result?;
        let sample_id = columns.field(&record, "sample_id").to_string();
        if sample_id.is_empty() {
            return Err(FreqError::InputShape(format!(
                "Row {} has an empty sample identifier",
                row_idx + 1
            )));
        }

        let time_raw = columns.field(&record, "time_from_treatment_start");
        let time_from_treatment_start = time_raw.parse::<i64>().map_err(|_| {
            FreqError::InvalidParameter(format!(
                "Row {}: time_from_treatment_start '{}' is not an integer",
                row_idx + 1,
                time_raw
            ))
        })?;

        let response = columns.field(&record, "response");
        let meta = SampleMeta {
            sample_id: sample_id.clone(),
            subject_id: columns.field(&record, "subject_id").to_string(),
            project_id: columns.field(&record, "project_id").to_string(),
            indication: columns.field(&record, "indication").to_string(),
            treatment: columns.field(&record, "treatment").to_string(),
            response: (!is_missing(response)).then(|| response.to_string()),
            gender: columns.field(&record, "gender").to_string(),
            sample_type: columns.field(&record, "sample_type").to_string(),
            time_from_treatment_start,
        };
        samples.insert(meta)?;

        if let Some(previous_row) = seen.insert(sample_id.clone(), row_idx) {
            warn!(
                "Sample '{}' appears on rows {} and {}; keeping the later counts",
                sample_id,
                previous_row + 1,
                row_idx + 1
            );
            records.retain(|r| r.sample_id != sample_id);
        }

        for (name, &col) in populations.names().iter().zip(columns.populations.iter()) {
            let raw = record.get(col).unwrap_or("");
            let count = raw.parse::<u64>().map_err(|_| FreqError::InvalidCount {
                value: raw.to_string(),
                row: row_idx + 1,
                column: headers.get(col).unwrap_or(name).to_string(),
            })?;
            records.push(CountRecord::new(sample_id.clone(), name.clone(), count));
        }
    }

    info!(
        "Loaded {} samples from {} subjects ({} count records)",
        samples.n_samples(),
        samples.n_subjects(),
        records.len()
    );

    Ok(Dataset::new(populations.clone(), records, samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "project,subject,condition,age,sex,treatment,response,sample,sample_type,time_from_treatment_start,b_cell,cd8_t_cell,cd4_t_cell,nk_cell,monocyte";

    fn csv(rows: &[&str]) -> String {
        let mut s = HEADER.to_string();
        for row in rows {
            s.push('\n');
            s.push_str(row);
        }
        s.push('\n');
        s
    }

    #[test]
    fn test_read_with_aliases() {
        let data = csv(&[
            "prj1,sbj000,melanoma,57,M,miraclib,no,s000,PBMC,0,36000,24000,42000,6000,12000",
            "prj1,sbj000,melanoma,57,M,miraclib,no,s001,PBMC,7,30000,24000,48000,6000,12000",
            "prj2,sbj001,carcinoma,61,F,none,,s002,WB,0,1,2,3,4,5",
        ]);
        let ds = read_cell_counts(data.as_bytes(), &PopulationSet::standard()).unwrap();

        assert_eq!(ds.samples().n_samples(), 3);
        assert_eq!(ds.samples().n_subjects(), 2);
        assert_eq!(ds.records().len(), 15);

        let s1 = ds.samples().get("s001").unwrap();
        assert_eq!(s1.indication, "melanoma");
        assert_eq!(s1.gender, "M");
        assert_eq!(s1.time_from_treatment_start, 7);
        assert_eq!(ds.samples().get("s002").unwrap().response, None);

        let b_cell = ds
            .records()
            .iter()
            .find(|r| r.sample_id == "s000" && r.population == "b_cell")
            .unwrap();
        assert_eq!(b_cell.count, 36000);
    }

    #[test]
    fn test_missing_metadata_column() {
        let data = "subject,sample,b_cell\nsbj1,s1,10\n";
        let err = read_cell_counts(data.as_bytes(), &PopulationSet::standard()).unwrap_err();
        assert!(err.is_input_shape());
        assert!(err.to_string().contains("project_id"));
    }

    #[test]
    fn test_missing_population_column() {
        let data = "project,subject,indication,gender,treatment,response,sample,sample_type,time_from_treatment_start,b_cell\n\
                    prj1,sbj1,melanoma,F,miraclib,yes,s1,PBMC,0,10\n";
        let err = read_cell_counts(data.as_bytes(), &PopulationSet::standard()).unwrap_err();
        assert!(err.is_input_shape());
        assert!(err.to_string().contains("cd8_t_cell"));
    }

    #[test]
    fn test_invalid_count() {
        let data = csv(&["prj1,sbj000,melanoma,57,M,miraclib,no,s000,PBMC,0,-3,1,1,1,1"]);
        let err = read_cell_counts(data.as_bytes(), &PopulationSet::standard()).unwrap_err();
        assert!(matches!(err, FreqError::InvalidCount { ref column, .. } if column == "b_cell"));
    }

    #[test]
    fn test_repeated_sample_keeps_last_counts() {
        let data = csv(&[
            "prj1,sbj000,melanoma,57,M,miraclib,no,s000,PBMC,0,1,1,1,1,1",
            "prj1,sbj000,melanoma,57,M,miraclib,no,s000,PBMC,0,2,2,2,2,2",
        ]);
        let ds = read_cell_counts(data.as_bytes(), &PopulationSet::standard()).unwrap();
        assert_eq!(ds.records().len(), 5);
        assert!(ds.records().iter().all(|r| r.count == 2));
    }

    #[test]
    fn test_conflicting_subject_rejected() {
        let data = csv(&[
            "prj1,sbj000,melanoma,57,M,miraclib,no,s000,PBMC,0,1,1,1,1,1",
            "prj1,sbj000,melanoma,57,M,miraclib,yes,s001,PBMC,7,1,1,1,1,1",
        ]);
        let err = read_cell_counts(data.as_bytes(), &PopulationSet::standard()).unwrap_err();
        assert!(matches!(err, FreqError::InconsistentSubject { .. }));
    }
}
