use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the gold quote to request.
///
/// The endpoint encodes the side into the locator path
/// (`chart_interval_jual` vs `chart_interval_buyback`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// Selling price ("jual").
    #[default]
    Jual,
    /// Buyback price.
    Buyback,
}

impl PriceMode {
    /// The token the endpoint expects inside the locator.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceMode::Jual => "jual",
            PriceMode::Buyback => "buyback",
        }
    }
}

impl fmt::Display for PriceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The envelope shape the response is expected to carry.
///
/// Two incompatible shapes exist in the wild. The expected one is an
/// explicit configuration choice; the parser never sniffs the payload to
/// pick between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesShape {
    /// `data[0]` is one run: `[start_ts_ms, p0, p1, ...]`, one price per
    /// day from the start date.
    DenseRun,
    /// `data` is a list of self-dated tuples `[ts_ms, v1, v2, ...]`;
    /// `column_index` selects the value field.
    PointList {
        /// Index of the value field within each tuple. Falls back to
        /// index 1 when a tuple is shorter than this.
        column_index: usize,
    },
}

/// What to do with a present-but-invalid price value inside an otherwise
/// well-shaped envelope.
///
/// Structural defects of individual point-list entries (not a list, too
/// short, non-numeric timestamp) are always skipped; this policy only
/// governs bad *values* (non-numeric or negative prices).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Fail the whole parse on the first bad value.
    #[default]
    Strict,
    /// Drop the offending offset/point and keep going.
    SkipInvalid,
}

/// Universal parameters for one chart fetch.
///
/// This struct is the standard input for [`ChartProvider`]
/// implementations and carries everything a fetch needs besides the
/// endpoint configuration itself.
///
/// [`ChartProvider`]: crate::providers::ChartProvider
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartRequestParams {
    /// Price side to request.
    pub mode: PriceMode,

    /// Series name as the endpoint knows it (e.g., "GOLD").
    pub series: String,

    /// Range in days. The site's own UI offers 7/30/90/180/365, but the
    /// action accepts arbitrary values and no bound is enforced here.
    pub days: u32,

    /// Expected envelope shape.
    pub shape: SeriesShape,

    /// Handling of invalid price values.
    #[serde(default)]
    pub policy: ValidationPolicy,
}
