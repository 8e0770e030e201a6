//! Normalization of raw population counts into frequencies.

pub mod frequency;

pub use frequency::{
    build_frequency_table, build_frequency_table_from_parts, scale, CompletenessPolicy,
};
