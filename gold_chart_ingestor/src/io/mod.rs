//! Export of normalized series to tabular files.

pub mod csv;
pub mod sink;
pub mod xlsx;

use crate::models::request_params::PriceMode;

/// Caller-facing knobs for both export formats.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Header for the price column. The jual exports ship as `harga`,
    /// the buyback ones as `harga_buyback`.
    pub price_header: String,
    /// Worksheet name for spreadsheet output; truncated to the format's
    /// 31-character limit on write.
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            price_header: "harga".to_string(),
            sheet_name: "chart".to_string(),
        }
    }
}

/// File stem encoding the fetch parameters: `ubs_<mode>_<series>_<days>d`.
pub fn export_file_stem(mode: PriceMode, series: &str, days: u32) -> String {
    format!("ubs_{mode}_{series}_{days}d")
}
