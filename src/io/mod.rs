//! Reading cell-count tables and writing analysis results.

pub mod loader;
pub mod writer;

pub use loader::{load_cell_counts, read_cell_counts, COLUMN_ALIASES};
pub use writer::{
    create_output, write_comparison_tsv, write_dropped_tsv, write_frequency_tsv, write_json,
};
