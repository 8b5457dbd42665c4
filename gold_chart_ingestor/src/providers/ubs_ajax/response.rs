//! Response classification and envelope parsing.
//!
//! The admin-ajax endpoint answers with a top-level JSON array of series
//! objects. Anti-automation defenses answer with an HTML document under a
//! 200 status, so classification happens *before* any parse attempt.
//! Two envelope shapes exist in the wild; the expected one is selected by
//! configuration, never sniffed from the payload:
//!
//! - dense-run: `[{"name":"GOLD","data":[[start_ts_ms, p0, p1, ...]]}]`,
//!   one price per consecutive day from the start date;
//! - point-list: `[{"name":..., "data":[[ts_ms, v1, v2, v3, v4], ...]}]`,
//!   each tuple self-dated, one value column selected by index.
//!
//! Only envelope element 0 is consulted; later series are ignored.
//! Timestamps are milliseconds since epoch and convert to calendar dates
//! in UTC.

use chrono::{DateTime, Days, NaiveDate};
use serde_json::Value;
use thiserror::Error;

use crate::models::chart_point::ChartPoint;
use crate::models::request_params::ValidationPolicy;

/// How many leading characters are scanned for an HTML signature.
const HTML_SNIFF_WINDOW: usize = 400;

/// How much of a rejected body is carried in error messages.
pub const SNIPPET_LEN: usize = 1200;

/// First `limit` characters of `text`, on a char boundary.
pub fn snippet_at(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The diagnostic snippet attached to transport and classification errors.
pub fn snippet(text: &str) -> &str {
    snippet_at(text, SNIPPET_LEN)
}

/// True when the body is an HTML document rather than data.
pub fn looks_like_html(text: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(HTML_SNIFF_WINDOW)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("<title>")
}

/// Coarse classification of a response body, decided before parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyClass {
    /// JSON by declared content-type or by a `[`/`{` prefix.
    Json,
    /// An HTML document (block page or changed endpoint).
    Html,
    /// Neither; a parse is still attempted and fails with diagnostics.
    Other,
}

/// Classifies a body given its declared content-type.
///
/// The HTML check wins over the content-type: block pages have been
/// observed with a `json` content-type, and real payloads with a plain
/// `text/html` one.
pub fn classify_body(content_type: &str, body: &str) -> BodyClass {
    if looks_like_html(body) {
        return BodyClass::Html;
    }
    let trimmed = body.trim_start();
    if content_type.to_ascii_lowercase().contains("json")
        || trimmed.starts_with('[')
        || trimmed.starts_with('{')
    {
        BodyClass::Json
    } else {
        BodyClass::Other
    }
}

/// JSON parsed, but the envelope violates the selected shape.
///
/// Each variant names the structural expectation that failed, so callers
/// can tell "wrong shape" apart from "network/HTML" failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesFormatError {
    #[error("envelope is not a JSON array")]
    NotAnArray,

    #[error("envelope is empty")]
    EmptyEnvelope,

    #[error("envelope element 0 is not an object")]
    SeriesNotObject,

    #[error("envelope element 0 has no `data` key")]
    MissingDataKey,

    #[error("`data` is not an array")]
    DataNotArray,

    #[error("`data` is empty")]
    EmptyData,

    #[error("`data[0]` must be a list `[start_ts, price, ...]` of length >= 2")]
    BadRunBlock,

    #[error("start timestamp is not a number")]
    BadStartTimestamp,

    #[error("timestamp {ts_ms} ms does not map to a representable date")]
    TimestampOutOfRange { ts_ms: i64 },

    #[error("price at offset {index} is not a number")]
    NonNumericPrice { index: usize },

    #[error("price at offset {index} is negative ({value})")]
    NegativePrice { index: usize, value: i64 },

    #[error("date arithmetic overflowed at offset {index}")]
    DateOverflow { index: usize },
}

/// The series name the payload reports, if any.
pub fn series_name(envelope: &Value) -> Option<&str> {
    envelope.as_array()?.first()?.get("name")?.as_str()
}

/// Envelope element 0's `data` array, validated to be non-empty.
///
/// Later envelope elements are deliberately not consulted.
fn data_block(envelope: &Value) -> Result<&Vec<Value>, SeriesFormatError> {
    let series = envelope.as_array().ok_or(SeriesFormatError::NotAnArray)?;
    let first = series.first().ok_or(SeriesFormatError::EmptyEnvelope)?;
    let object = first
        .as_object()
        .ok_or(SeriesFormatError::SeriesNotObject)?;
    let data = object
        .get("data")
        .ok_or(SeriesFormatError::MissingDataKey)?
        .as_array()
        .ok_or(SeriesFormatError::DataNotArray)?;
    if data.is_empty() {
        return Err(SeriesFormatError::EmptyData);
    }
    Ok(data)
}

/// Millisecond epoch timestamp from a JSON number, truncating fractions.
fn coerce_ts_ms(value: &Value) -> Option<i64> {
    coerce_i64(value)
}

/// Integer price from a JSON number, truncating fractional values.
fn coerce_i64(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
}

fn date_from_ts_ms(ts_ms: i64) -> Result<NaiveDate, SeriesFormatError> {
    DateTime::from_timestamp_millis(ts_ms)
        .map(|dt| dt.date_naive())
        .ok_or(SeriesFormatError::TimestampOutOfRange { ts_ms })
}

fn coerce_price(
    value: &Value,
    index: usize,
    policy: ValidationPolicy,
) -> Result<Option<i64>, SeriesFormatError> {
    match coerce_i64(value) {
        Some(price) if price >= 0 => Ok(Some(price)),
        Some(price) => match policy {
            ValidationPolicy::Strict => {
                Err(SeriesFormatError::NegativePrice {
                    index,
                    value: price,
                })
            }
            ValidationPolicy::SkipInvalid => Ok(None),
        },
        None => match policy {
            ValidationPolicy::Strict => Err(SeriesFormatError::NonNumericPrice { index }),
            ValidationPolicy::SkipInvalid => Ok(None),
        },
    }
}

/// Parses the dense-run shape: one start anchor plus N consecutive daily
/// prices, `date(i) = utc_date(start_ts) + i days`.
pub fn parse_dense_run(
    envelope: &Value,
    policy: ValidationPolicy,
) -> Result<Vec<ChartPoint>, SeriesFormatError> {
    let data = data_block(envelope)?;
    let block = data[0]
        .as_array()
        .filter(|b| b.len() >= 2)
        .ok_or(SeriesFormatError::BadRunBlock)?;
    let start_ts = coerce_ts_ms(&block[0]).ok_or(SeriesFormatError::BadStartTimestamp)?;
    let start_date = date_from_ts_ms(start_ts)?;

    let mut points = Vec::with_capacity(block.len() - 1);
    for (index, raw) in block[1..].iter().enumerate() {
        let Some(price) = coerce_price(raw, index, policy)? else {
            continue;
        };
        let date = start_date
            .checked_add_days(Days::new(index as u64))
            .ok_or(SeriesFormatError::DateOverflow { index })?;
        points.push(ChartPoint { date, price });
    }
    Ok(points)
}

/// Parses the point-list shape: independent `[ts_ms, v1, v2, ...]` tuples.
///
/// Structurally broken entries (not a list, shorter than 2, non-numeric or
/// unrepresentable timestamp) are skipped regardless of policy. The value
/// column is `tuple[column_index]`, falling back to index 1 when the tuple
/// is shorter than the configured index. Rows are sorted ascending by date
/// after collection (input order is not guaranteed), then de-duplicated by
/// date, first occurrence winning.
pub fn parse_point_list(
    envelope: &Value,
    column_index: usize,
    policy: ValidationPolicy,
) -> Result<Vec<ChartPoint>, SeriesFormatError> {
    let data = data_block(envelope)?;

    let mut points = Vec::with_capacity(data.len());
    for (index, entry) in data.iter().enumerate() {
        let Some(tuple) = entry.as_array().filter(|t| t.len() >= 2) else {
            continue;
        };
        let Some(ts_ms) = coerce_ts_ms(&tuple[0]) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp_millis(ts_ms).map(|dt| dt.date_naive()) else {
            continue;
        };
        let column = if column_index < tuple.len() {
            column_index
        } else {
            1
        };
        let Some(price) = coerce_price(&tuple[column], index, policy)? else {
            continue;
        };
        points.push(ChartPoint { date, price });
    }

    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod classification {
        use super::super::*;

        #[test]
        fn doctype_is_html_before_any_parse_attempt() {
            assert_eq!(
                classify_body("application/json", "<!DOCTYPE html><html>..."),
                BodyClass::Html
            );
            // any case, leading whitespace
            assert_eq!(
                classify_body("text/html", "  \n<!doctype HTML><head>"),
                BodyClass::Html
            );
            assert_eq!(classify_body("", "<HTML lang=\"en\">"), BodyClass::Html);
        }

        #[test]
        fn title_tag_within_window_is_html() {
            let body = format!("{}<title>Blocked</title>", " ".repeat(10));
            assert_eq!(classify_body("text/plain", &body), BodyClass::Html);
        }

        #[test]
        fn title_tag_past_window_is_not_html() {
            let body = format!("{}<title>late</title>", "x".repeat(500));
            assert_eq!(classify_body("text/plain", &body), BodyClass::Other);
        }

        #[test]
        fn json_by_content_type_or_prefix() {
            assert_eq!(classify_body("application/json", "null"), BodyClass::Json);
            // content-type lies, body prefix decides
            assert_eq!(classify_body("text/html", "[{\"name\":\"GOLD\"}]"), BodyClass::Json);
            assert_eq!(classify_body("text/html", "  {\"a\":1}"), BodyClass::Json);
        }

        #[test]
        fn plain_text_is_other() {
            assert_eq!(classify_body("text/plain", "not json at all"), BodyClass::Other);
        }

        #[test]
        fn snippet_respects_char_boundaries() {
            let text = "é".repeat(2000);
            let s = snippet(&text);
            assert_eq!(s.chars().count(), SNIPPET_LEN);
        }
    }

    mod dense_run {
        use super::*;

        #[test]
        fn reconstructs_one_row_per_price_from_the_anchor() {
            // 1700000000000 ms = 2023-11-14T22:13:20Z
            let envelope = json!([{"name":"GOLD","data":[[1_700_000_000_000_i64, 100, 110, 120]]}]);
            let points = parse_dense_run(&envelope, ValidationPolicy::Strict).unwrap();
            assert_eq!(
                points,
                vec![
                    ChartPoint { date: date(2023, 11, 14), price: 100 },
                    ChartPoint { date: date(2023, 11, 15), price: 110 },
                    ChartPoint { date: date(2023, 11, 16), price: 120 },
                ]
            );
        }

        #[test]
        fn fractional_prices_truncate() {
            let envelope = json!([{"data":[[1_700_000_000_000_i64, 100.9, 110.1]]}]);
            let points = parse_dense_run(&envelope, ValidationPolicy::Strict).unwrap();
            assert_eq!(points[0].price, 100);
            assert_eq!(points[1].price, 110);
        }

        #[test]
        fn each_malformed_shape_names_its_violation() {
            let cases = [
                (json!({}), SeriesFormatError::NotAnArray),
                (json!([]), SeriesFormatError::EmptyEnvelope),
                (json!([42]), SeriesFormatError::SeriesNotObject),
                (json!([{"name":"GOLD"}]), SeriesFormatError::MissingDataKey),
                (json!([{"data":"nope"}]), SeriesFormatError::DataNotArray),
                (json!([{"data":[]}]), SeriesFormatError::EmptyData),
                (json!([{"data":[42]}]), SeriesFormatError::BadRunBlock),
                (json!([{"data":[[1_700_000_000_000_i64]]}]), SeriesFormatError::BadRunBlock),
                (json!([{"data":[["ts", 100]]}]), SeriesFormatError::BadStartTimestamp),
            ];
            for (envelope, expected) in cases {
                let got = parse_dense_run(&envelope, ValidationPolicy::Strict).unwrap_err();
                assert_eq!(got, expected, "envelope: {envelope}");
            }
        }

        #[test]
        fn strict_fails_on_non_numeric_price() {
            let envelope = json!([{"data":[[1_700_000_000_000_i64, 100, "x", 120]]}]);
            assert_eq!(
                parse_dense_run(&envelope, ValidationPolicy::Strict).unwrap_err(),
                SeriesFormatError::NonNumericPrice { index: 1 }
            );
        }

        #[test]
        fn strict_fails_on_negative_price() {
            let envelope = json!([{"data":[[1_700_000_000_000_i64, 100, -5]]}]);
            assert_eq!(
                parse_dense_run(&envelope, ValidationPolicy::Strict).unwrap_err(),
                SeriesFormatError::NegativePrice { index: 1, value: -5 }
            );
        }

        #[test]
        fn skip_policy_drops_the_offset_but_keeps_date_arithmetic() {
            let envelope = json!([{"data":[[1_700_000_000_000_i64, 100, "x", 120]]}]);
            let points = parse_dense_run(&envelope, ValidationPolicy::SkipInvalid).unwrap();
            // offset 1 dropped; offset 2 keeps its own date, two days in
            assert_eq!(
                points,
                vec![
                    ChartPoint { date: date(2023, 11, 14), price: 100 },
                    ChartPoint { date: date(2023, 11, 16), price: 120 },
                ]
            );
        }

        #[test]
        fn only_the_first_series_is_consulted() {
            let envelope = json!([
                {"name":"GOLD","data":[[1_700_000_000_000_i64, 100]]},
                {"name":"SILVER","data":[[1_700_000_000_000_i64, 999, 998]]},
            ]);
            let points = parse_dense_run(&envelope, ValidationPolicy::Strict).unwrap();
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].price, 100);
        }

        #[test]
        fn dates_are_unique_and_strictly_increasing() {
            let envelope = json!([{"data":[[1_700_000_000_000_i64, 1, 2, 3, 4, 5]]}]);
            let points = parse_dense_run(&envelope, ValidationPolicy::Strict).unwrap();
            for pair in points.windows(2) {
                assert!(pair[0].date < pair[1].date);
            }
        }
    }

    mod point_list {
        use super::*;

        const D14: i64 = 1_700_000_000_000; // 2023-11-14 UTC
        const D15: i64 = 1_700_086_400_000;
        const D16: i64 = 1_700_172_800_000;

        #[test]
        fn malformed_entries_are_skipped_not_fatal() {
            let envelope = json!([{"data":[
                [D14, 100, 200, 300, 400],
                "not a list",
                [D15],
                ["not numeric", 555],
                [D16, 120, 220, 320, 420],
            ]}]);
            let points = parse_point_list(&envelope, 1, ValidationPolicy::Strict).unwrap();
            assert_eq!(
                points,
                vec![
                    ChartPoint { date: date(2023, 11, 14), price: 100 },
                    ChartPoint { date: date(2023, 11, 16), price: 120 },
                ]
            );
        }

        #[test]
        fn output_is_sorted_ascending_regardless_of_input_order() {
            let envelope = json!([{"data":[
                [D16, 120],
                [D14, 100],
                [D15, 110],
            ]}]);
            let points = parse_point_list(&envelope, 1, ValidationPolicy::Strict).unwrap();
            let dates: Vec<_> = points.iter().map(|p| p.date).collect();
            assert_eq!(
                dates,
                vec![date(2023, 11, 14), date(2023, 11, 15), date(2023, 11, 16)]
            );
        }

        #[test]
        fn duplicate_dates_keep_the_first_occurrence() {
            let envelope = json!([{"data":[
                [D14, 100],
                [D14, 999],
                [D15, 110],
            ]}]);
            let points = parse_point_list(&envelope, 1, ValidationPolicy::Strict).unwrap();
            assert_eq!(points.len(), 2);
            assert_eq!(points[0].price, 100);
        }

        #[test]
        fn column_index_selects_the_value_field() {
            let envelope = json!([{"data":[[D14, 100, 200, 300, 400]]}]);
            for (column, expected) in [(1, 100), (2, 200), (4, 400)] {
                let points =
                    parse_point_list(&envelope, column, ValidationPolicy::Strict).unwrap();
                assert_eq!(points[0].price, expected);
            }
        }

        #[test]
        fn out_of_bounds_column_falls_back_to_index_1() {
            let envelope = json!([{"data":[[D14, 100, 200]]}]);
            let points = parse_point_list(&envelope, 9, ValidationPolicy::Strict).unwrap();
            assert_eq!(points[0].price, 100);
        }

        #[test]
        fn strict_fails_on_non_numeric_value_column() {
            let envelope = json!([{"data":[[D14, "x", 200]]}]);
            assert_eq!(
                parse_point_list(&envelope, 1, ValidationPolicy::Strict).unwrap_err(),
                SeriesFormatError::NonNumericPrice { index: 0 }
            );
        }

        #[test]
        fn skip_policy_drops_bad_values_and_continues() {
            let envelope = json!([{"data":[
                [D14, "x", 200],
                [D15, -3],
                [D16, 120],
            ]}]);
            let points = parse_point_list(&envelope, 1, ValidationPolicy::SkipInvalid).unwrap();
            assert_eq!(points, vec![ChartPoint { date: date(2023, 11, 16), price: 120 }]);
        }

        #[test]
        fn empty_data_is_a_shape_error() {
            let envelope = json!([{"data":[]}]);
            assert_eq!(
                parse_point_list(&envelope, 1, ValidationPolicy::Strict).unwrap_err(),
                SeriesFormatError::EmptyData
            );
        }
    }

    #[test]
    fn series_name_reads_element_zero() {
        let envelope = json!([{"name":"GOLD","data":[[0, 1]]}]);
        assert_eq!(series_name(&envelope), Some("GOLD"));
        assert_eq!(series_name(&json!([{"data":[[0, 1]]}])), None);
    }
}
