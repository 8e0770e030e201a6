//! Data profiling primitives for understanding cohort composition.

mod cohort;

pub use cohort::{mean_population_count, profile_cohort, CohortProfile, LabelCount};
