//! CSV serialization: UTF-8 with a byte-order mark, `tanggal` plus a
//! configurable price header.

use std::path::PathBuf;

use async_trait::async_trait;
use snafu::ResultExt;

use crate::io::ExportOptions;
use crate::io::sink::{CsvSnafu, IoSnafu, SeriesSink, SinkError};
use crate::models::chart_series::ChartSeries;

/// Spreadsheet tools key off the BOM to pick the encoding.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Serializes a series to BOM-prefixed CSV bytes.
///
/// Dates render as `YYYY-MM-DD`; the header row is
/// `tanggal,<price_header>`.
pub fn csv_bytes(series: &ChartSeries, options: &ExportOptions) -> Result<Vec<u8>, SinkError> {
    let mut out = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut out);
        writer
            .write_record(["tanggal", options.price_header.as_str()])
            .context(CsvSnafu)?;
        for point in &series.points {
            writer
                .write_record([point.date.to_string(), point.price.to_string()])
                .context(CsvSnafu)?;
        }
        writer.flush().context(IoSnafu)?;
    }
    Ok(out)
}

/// Writes `<dir>/<file_stem>.csv`.
pub struct CsvFileSink {
    dir: PathBuf,
    file_stem: String,
    options: ExportOptions,
}

impl CsvFileSink {
    pub fn new(dir: impl Into<PathBuf>, file_stem: impl Into<String>, options: ExportOptions) -> Self {
        Self {
            dir: dir.into(),
            file_stem: file_stem.into(),
            options,
        }
    }
}

#[async_trait]
impl SeriesSink for CsvFileSink {
    type Output = PathBuf;

    async fn write(&self, series: &ChartSeries) -> Result<PathBuf, SinkError> {
        let bytes = csv_bytes(series, &self.options)?;
        std::fs::create_dir_all(&self.dir).context(IoSnafu)?;
        let path = self.dir.join(format!("{}.csv", self.file_stem));
        std::fs::write(&path, bytes).context(IoSnafu)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chart_point::ChartPoint;
    use chrono::NaiveDate;

    fn series() -> ChartSeries {
        ChartSeries {
            name: "GOLD".to_string(),
            points: vec![
                ChartPoint {
                    date: NaiveDate::from_ymd_opt(2023, 11, 14).unwrap(),
                    price: 100,
                },
                ChartPoint {
                    date: NaiveDate::from_ymd_opt(2023, 11, 15).unwrap(),
                    price: 110,
                },
            ],
        }
    }

    #[test]
    fn output_starts_with_bom_and_header() {
        let bytes = csv_bytes(&series(), &ExportOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\xef\xbb\xbf"));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("tanggal,harga\n"));
    }

    #[test]
    fn price_header_is_configurable() {
        let options = ExportOptions {
            price_header: "harga_buyback".to_string(),
            ..ExportOptions::default()
        };
        let bytes = csv_bytes(&series(), &options).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("tanggal,harga_buyback\n"));
    }

    #[test]
    fn round_trip_reproduces_the_rows() {
        let original = series();
        let bytes = csv_bytes(&original, &ExportOptions::default()).unwrap();

        let mut reader = csv::Reader::from_reader(&bytes[3..]);
        let mut restored = Vec::new();
        for record in reader.records() {
            let record = record.unwrap();
            restored.push(ChartPoint {
                date: record[0].parse::<NaiveDate>().unwrap(),
                price: record[1].parse::<i64>().unwrap(),
            });
        }
        assert_eq!(restored, original.points);
    }

    #[tokio::test]
    async fn file_sink_writes_under_the_target_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvFileSink::new(dir.path(), "ubs_jual_GOLD_365d", ExportOptions::default());
        let path = sink.write(&series()).await.unwrap();
        assert_eq!(path, dir.path().join("ubs_jual_GOLD_365d.csv"));
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"\xef\xbb\xbf"));
    }
}
