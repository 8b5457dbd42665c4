//! Canonical in-memory representation of one chart observation.
//!
//! This struct is the standard output of the payload parsers in
//! [`providers::ubs_ajax::response`](crate::providers::ubs_ajax::response),
//! regardless of which envelope shape the endpoint answered with.

use chrono::NaiveDate;

/// A single dated price observation.
///
/// Invariants after reconstruction: dates within one series are unique and
/// strictly increasing, and the price is non-negative. Fractional prices in
/// the payload truncate toward zero on conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPoint {
    /// Calendar date of the observation, derived from the payload's
    /// millisecond timestamps under the UTC conversion rule.
    pub date: NaiveDate,

    /// Price in whole currency units.
    pub price: i64,
}
