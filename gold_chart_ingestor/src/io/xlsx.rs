//! Spreadsheet serialization, compiled in behind the `xlsx` feature.
//!
//! Without the feature, [`xlsx_bytes`] reports a missing backend instead
//! of failing to link; CSV export is unaffected either way.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::io::ExportOptions;
use crate::io::sink::{SeriesSink, SinkError};
use crate::models::chart_series::ChartSeries;

/// Hard limit on worksheet names in the xlsx format.
const SHEET_NAME_MAX: usize = 31;

/// Truncates a worksheet name to the format's 31-character limit.
pub fn truncate_sheet_name(name: &str) -> String {
    name.chars().take(SHEET_NAME_MAX).collect()
}

/// Serializes a series to a single-sheet workbook.
#[cfg(feature = "xlsx")]
pub fn xlsx_bytes(series: &ChartSeries, options: &ExportOptions) -> Result<Vec<u8>, SinkError> {
    use rust_xlsxwriter::Workbook;

    fn wb_err(err: rust_xlsxwriter::XlsxError) -> SinkError {
        crate::io::sink::WorkbookSnafu {
            message: err.to_string(),
        }
        .build()
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(truncate_sheet_name(&options.sheet_name))
        .map_err(wb_err)?;

    worksheet.write_string(0, 0, "tanggal").map_err(wb_err)?;
    worksheet
        .write_string(0, 1, &options.price_header)
        .map_err(wb_err)?;
    for (row, point) in series.points.iter().enumerate() {
        let row = (row + 1) as u32;
        worksheet
            .write_string(row, 0, point.date.to_string())
            .map_err(wb_err)?;
        worksheet
            .write_number(row, 1, point.price as f64)
            .map_err(wb_err)?;
    }

    workbook.save_to_buffer().map_err(wb_err)
}

/// Stub used when the `xlsx` feature is disabled.
#[cfg(not(feature = "xlsx"))]
pub fn xlsx_bytes(_series: &ChartSeries, _options: &ExportOptions) -> Result<Vec<u8>, SinkError> {
    crate::io::sink::MissingBackendSnafu { backend: "xlsx" }.fail()
}

/// Writes `<dir>/<file_stem>.xlsx`.
///
/// Constructible regardless of features; without the `xlsx` feature every
/// write reports the missing backend.
pub struct XlsxFileSink {
    dir: PathBuf,
    file_stem: String,
    options: ExportOptions,
}

impl XlsxFileSink {
    pub fn new(dir: impl Into<PathBuf>, file_stem: impl Into<String>, options: ExportOptions) -> Self {
        Self {
            dir: dir.into(),
            file_stem: file_stem.into(),
            options,
        }
    }
}

#[async_trait]
impl SeriesSink for XlsxFileSink {
    type Output = PathBuf;

    async fn write(&self, series: &ChartSeries) -> Result<PathBuf, SinkError> {
        use snafu::ResultExt;

        use crate::io::sink::IoSnafu;

        let bytes = xlsx_bytes(series, &self.options)?;
        std::fs::create_dir_all(&self.dir).context(IoSnafu)?;
        let path = self.dir.join(format!("{}.xlsx", self.file_stem));
        std::fs::write(&path, bytes).context(IoSnafu)?;
        Ok(path)
    }
}
