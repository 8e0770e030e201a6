//! Dense count matrix of populations × samples.

use crate::data::{CountRecord, PopulationSet};
use crate::error::{FreqError, Result};
use nalgebra::DMatrix;
use std::collections::BTreeMap;

/// Raw counts arranged as a populations × samples matrix.
///
/// Rows follow the order of the `PopulationSet`; columns are samples sorted
/// by identifier. Each cell also records whether a count was actually
/// supplied, so incomplete samples can be told apart from zero counts.
#[derive(Debug, Clone)]
pub struct CountMatrix {
    /// Counts (populations × samples); absent cells hold 0.
    data: DMatrix<u64>,
    /// Which cells were supplied by a record.
    present: DMatrix<bool>,
    populations: PopulationSet,
    sample_ids: Vec<String>,
}

impl CountMatrix {
    /// Arrange count records into a matrix.
    ///
    /// Fails if a record names a population outside `populations`, or if the
    /// same (sample, population) pair occurs more than once.
    pub fn from_records(populations: &PopulationSet, records: &[CountRecord]) -> Result<Self> {
        let mut sample_cols: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            sample_cols.entry(record.sample_id.as_str()).or_insert(0);
        }
        for (j, col) in sample_cols.values_mut().enumerate() {
            *col = j;
        }

        let n_pops = populations.len();
        let n_samples = sample_cols.len();
        let mut data = DMatrix::<u64>::zeros(n_pops, n_samples);
        let mut present = DMatrix::from_element(n_pops, n_samples, false);

        for record in records {
            let i = populations
                .index_of(&record.population)
                .ok_or_else(|| FreqError::UnknownPopulation(record.population.clone()))?;
            let j = sample_cols[record.sample_id.as_str()];
            if present[(i, j)] {
                return Err(FreqError::DuplicateRecord {
                    sample: record.sample_id.clone(),
                    population: record.population.clone(),
                });
            }
            present[(i, j)] = true;
            data[(i, j)] = record.count;
        }

        Ok(Self {
            data,
            present,
            populations: populations.clone(),
            sample_ids: sample_cols.keys().map(|s| s.to_string()).collect(),
        })
    }

    /// Count for (population row, sample column).
    #[inline]
    pub fn get(&self, population: usize, sample: usize) -> u64 {
        self.data[(population, sample)]
    }

    /// Sample identifiers, sorted.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Column index of a sample.
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids
            .binary_search_by(|s| s.as_str().cmp(sample_id))
            .ok()
    }

    /// Total count per sample across all populations.
    ///
    /// Fails with `CountOverflow` when a sample's total does not fit in `u64`.
    pub fn col_sums(&self) -> Result<Vec<u64>> {
        self.data
            .column_iter()
            .zip(self.sample_ids.iter())
            .map(|(col, sample_id)| {
                col.iter()
                    .try_fold(0u64, |acc, &c| acc.checked_add(c))
                    .ok_or_else(|| FreqError::CountOverflow {
                        sample: sample_id.clone(),
                    })
            })
            .collect()
    }

    /// Whether every population has a count for the sample.
    pub fn is_complete(&self, sample: usize) -> bool {
        self.present.column(sample).iter().all(|&p| p)
    }

    /// Populations with no count for the sample.
    pub fn missing_populations(&self, sample: usize) -> Vec<String> {
        self.populations
            .names()
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.present[(*i, sample)])
            .map(|(_, name)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pops() -> PopulationSet {
        PopulationSet::new(["popA", "popB"]).unwrap()
    }

    #[test]
    fn test_from_records() {
        let records = vec![
            CountRecord::new("S2", "popB", 80),
            CountRecord::new("S1", "popA", 10),
            CountRecord::new("S1", "popB", 90),
            CountRecord::new("S2", "popA", 20),
        ];
        let m = CountMatrix::from_records(&pops(), &records).unwrap();

        assert_eq!(m.sample_ids().len(), 2);
        assert_eq!(m.sample_ids(), &["S1", "S2"]);
        assert_eq!(m.get(0, 1), 20);
        assert_eq!(m.col_sums().unwrap(), vec![100, 100]);
        assert!(m.is_complete(0));
        assert_eq!(m.sample_index("S2"), Some(1));
        assert_eq!(m.sample_index("S9"), None);
    }

    #[test]
    fn test_zero_count_is_present() {
        let records = vec![
            CountRecord::new("S1", "popA", 0),
            CountRecord::new("S1", "popB", 0),
        ];
        let m = CountMatrix::from_records(&pops(), &records).unwrap();
        assert!(m.is_complete(0));
        assert_eq!(m.col_sums().unwrap(), vec![0]);
    }

    #[test]
    fn test_missing_population() {
        let records = vec![CountRecord::new("S1", "popA", 5)];
        let m = CountMatrix::from_records(&pops(), &records).unwrap();
        assert!(!m.is_complete(0));
        assert_eq!(m.missing_populations(0), vec!["popB".to_string()]);
    }

    #[test]
    fn test_unknown_population() {
        let records = vec![CountRecord::new("S1", "popC", 5)];
        let err = CountMatrix::from_records(&pops(), &records).unwrap_err();
        assert!(matches!(err, FreqError::UnknownPopulation(ref p) if p == "popC"));
    }

    #[test]
    fn test_duplicate_record() {
        let records = vec![
            CountRecord::new("S1", "popA", 5),
            CountRecord::new("S1", "popA", 6),
        ];
        let err = CountMatrix::from_records(&pops(), &records).unwrap_err();
        assert!(err.is_input_shape());
    }

    #[test]
    fn test_empty() {
        let m = CountMatrix::from_records(&pops(), &[]).unwrap();
        assert!(m.sample_ids().is_empty());
        assert!(m.col_sums().unwrap().is_empty());
    }

    #[test]
    fn test_total_overflow() {
        let records = vec![
            CountRecord::new("S1", "popA", 1),
            CountRecord::new("S1", "popB", 2),
            CountRecord::new("S2", "popA", u64::MAX),
            CountRecord::new("S2", "popB", 1),
        ];
        let m = CountMatrix::from_records(&pops(), &records).unwrap();
        let err = m.col_sums().unwrap_err();
        assert!(matches!(err, FreqError::CountOverflow { ref sample } if sample == "S2"));
    }
}
