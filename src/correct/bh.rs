//! Benjamini-Hochberg false discovery rate correction.

use serde::{Deserialize, Serialize};

/// Result of BH correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BhCorrected {
    /// Test labels in original order.
    pub labels: Vec<String>,
    /// Original p-values.
    pub p_values: Vec<f64>,
    /// Adjusted p-values (q-values), same order as `p_values`.
    pub q_values: Vec<f64>,
    /// Number of tests.
    pub n_tests: usize,
}

impl BhCorrected {
    /// Count results with q strictly below `alpha`.
    pub fn n_significant(&self, alpha: f64) -> usize {
        self.q_values.iter().filter(|&&q| q < alpha).count()
    }
}

/// Apply Benjamini-Hochberg FDR correction.
///
/// For p-values sorted ascending with ranks 1..n, the adjusted value is
/// q[i] = min(p[i] * n / rank[i], q[i+1]), capped at 1.0, and mapped back to
/// input order. Ties are ordered by input position so the result is
/// deterministic.
///
/// # Arguments
/// * `p_values` - Raw p-values, all defined
/// * `labels` - Test labels (same order as `p_values`)
pub fn correct_bh(p_values: &[f64], labels: &[String]) -> BhCorrected {
    let n = p_values.len();
    if n == 0 {
        return BhCorrected {
            labels: vec![],
            p_values: vec![],
            q_values: vec![],
            n_tests: 0,
        };
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]).then(a.cmp(&b)));

    let mut q_sorted = vec![0.0; n];
    let n_f64 = n as f64;

    // Start from the largest p-value and work backwards
    q_sorted[n - 1] = p_values[indices[n - 1]].min(1.0);
    for i in (0..n - 1).rev() {
        let rank = i + 1;
        let adjusted = p_values[indices[i]] * n_f64 / rank as f64;
        q_sorted[i] = adjusted.min(q_sorted[i + 1]).min(1.0);
    }

    let mut q_values = vec![0.0; n];
    for (i, &orig_idx) in indices.iter().enumerate() {
        q_values[orig_idx] = q_sorted[i];
    }

    BhCorrected {
        labels: labels.to_vec(),
        p_values: p_values.to_vec(),
        q_values,
        n_tests: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("pop_{}", i)).collect()
    }

    #[test]
    fn test_bh_ordering() {
        let p_values = vec![0.04, 0.01, 0.03, 0.005];
        let corrected = correct_bh(&p_values, &labels(4));

        // Smallest p-value (0.005 at index 3): q = 0.005 * 4 / 1 = 0.02
        assert_relative_eq!(corrected.q_values[3], 0.02, epsilon = 1e-10);
        // Second smallest (0.01 at index 1): min(0.01 * 4 / 2, next) = 0.02
        assert_relative_eq!(corrected.q_values[1], 0.02, epsilon = 1e-10);
        assert_eq!(corrected.p_values, p_values);
    }

    #[test]
    fn test_bh_known_values() {
        // Rank 1: 0.005 * 5/1 = 0.025
        // Rank 2: 0.01 * 5/2 = 0.025
        // Rank 3: 0.02 * 5/3 = 0.0333
        // Rank 4: 0.04 * 5/4 = 0.05
        // Rank 5: 0.1 * 5/5 = 0.1
        let p_values = vec![0.005, 0.01, 0.02, 0.04, 0.1];
        let corrected = correct_bh(&p_values, &labels(5));

        assert_relative_eq!(corrected.q_values[0], 0.025, epsilon = 1e-10);
        assert_relative_eq!(corrected.q_values[1], 0.025, epsilon = 1e-10);
        assert_relative_eq!(corrected.q_values[2], 1.0 / 30.0, epsilon = 1e-10);
        assert_relative_eq!(corrected.q_values[3], 0.05, epsilon = 1e-10);
        assert_relative_eq!(corrected.q_values[4], 0.1, epsilon = 1e-10);
    }

    #[test]
    fn test_bh_monotone_in_p() {
        let p_values = vec![0.1, 0.001, 0.5, 0.02, 0.01, 0.05];
        let corrected = correct_bh(&p_values, &labels(6));

        let mut pairs: Vec<(f64, f64)> = p_values
            .iter()
            .copied()
            .zip(corrected.q_values.iter().copied())
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        for w in pairs.windows(2) {
            assert!(w[1].1 >= w[0].1 - 1e-12);
        }
        for (p, q) in &pairs {
            assert!(q >= p);
        }
    }

    #[test]
    fn test_bh_bounded() {
        let corrected = correct_bh(&[0.5, 0.6, 0.7, 0.8, 0.9], &labels(5));
        assert!(corrected.q_values.iter().all(|&q| q <= 1.0));
    }

    #[test]
    fn test_bh_no_signal() {
        let corrected = correct_bh(&[0.5; 5], &labels(5));
        for q in &corrected.q_values {
            assert_relative_eq!(*q, 0.5, epsilon = 1e-12);
        }
        assert_eq!(corrected.n_significant(0.05), 0);
    }

    #[test]
    fn test_bh_empty() {
        let corrected = correct_bh(&[], &[]);
        assert_eq!(corrected.n_tests, 0);
        assert!(corrected.q_values.is_empty());
    }

    #[test]
    fn test_bh_single() {
        let corrected = correct_bh(&[0.05], &["b_cell".to_string()]);
        assert_eq!(corrected.n_tests, 1);
        assert_eq!(corrected.labels, vec!["b_cell".to_string()]);
        assert_relative_eq!(corrected.q_values[0], 0.05, epsilon = 1e-10);
    }

    #[test]
    fn test_n_significant_strict_threshold() {
        let corrected = correct_bh(&[0.001, 0.9, 0.025], &labels(3));
        // q = [0.003, 0.9, 0.0375]
        assert_eq!(corrected.n_significant(0.05), 2);
        assert_eq!(corrected.n_significant(0.002), 0);
    }
}
