//! Responder vs non-responder comparison of population frequencies.

mod responders;

pub use responders::{compare_responders, ResponseGroup, SIGNIFICANCE_THRESHOLD};
