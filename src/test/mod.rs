//! Statistical hypothesis testing for group comparisons.


pub use welch::{mean, sample_variance, welch_t_test, WelchResult, MIN_GROUP_SIZE};
