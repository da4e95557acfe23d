//! Derivation of numeric samples from Jenkins job records.
//!
//! [`codes`] holds the fixed code tables, `classify` the per-build classifiers and
//! `aggregate` the per-job assembly across all seven build slots.

mod aggregate;
mod classify;
pub mod codes;

pub use aggregate::{build_metric_set, MetricKey, MetricSet, Property};
