//! A normalized price series for a single chart.

use crate::models::chart_point::ChartPoint;

/// Represents a complete, normalized series for one chart fetch.
///
/// This struct groups the reconstructed [`ChartPoint`]s with the series
/// name the endpoint reported (or the requested name when the payload
/// carries none), making the data set self-describing for the sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// The series name (e.g., "GOLD").
    pub name: String,
    /// The collection of dated price rows, ascending by date.
    pub points: Vec<ChartPoint>,
}
