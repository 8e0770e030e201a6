//! Data structures for cell-population frequency analysis.

mod count_matrix;
mod dataset;
mod filter;
mod frequency;
pub(crate) mod metadata;
mod population;
mod record;
mod result;

pub use count_matrix::CountMatrix;
pub use dataset::Dataset;
pub use filter::{CohortAttribute, CohortFilter, FilterValue};
pub use frequency::{DropReason, DroppedSample, FrequencyRow, FrequencyTable};
pub use metadata::{SampleMeta, SampleRegistry};
pub use population::{PopulationSet, STANDARD_POPULATIONS};
pub use record::CountRecord;
pub use result::{ComparisonResult, ComparisonSet};
