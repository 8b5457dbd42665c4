//! The fetch-parse-export pipeline behind the binary.

pub mod commands;

use tracing::warn;

use crate::config::EndpointConfig;
use crate::errors::Error;
use crate::io::csv::CsvFileSink;
use crate::io::sink::{SeriesSink, SinkError};
use crate::io::xlsx::XlsxFileSink;
use crate::io::{ExportOptions, export_file_stem};
use crate::models::request_params::{ChartRequestParams, PriceMode};
use crate::providers::ubs_ajax::{UbsAjaxProvider, params as form_params, response};

use commands::{Cli, Commands, FormatArg};

/// How much of the raw body the debug echo shows.
const DEBUG_SNIPPET_LEN: usize = 2000;

/// Runs one parsed invocation to completion.
pub async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = match &cli.config {
        Some(path) => EndpointConfig::from_toml_file(path)?,
        None => EndpointConfig::default(),
    };

    match cli.command {
        Commands::Fetch {
            mode,
            series,
            days,
            shape,
            column_index,
            policy,
            format,
            out_dir,
            price_header,
            action,
            debug,
        } => {
            if let Some(action) = action {
                config.action = action;
            }

            let mode: PriceMode = mode.into();
            let params = ChartRequestParams {
                mode,
                series,
                days,
                shape: shape.into_shape(column_index),
                policy: policy.into(),
            };

            let provider = UbsAjaxProvider::new(config)?;
            let raw = provider.fetch_raw(&params).await?;

            if debug {
                for (key, value) in form_params::build_form(provider.config(), &params) {
                    eprintln!("form: {key}={value}");
                }
                eprintln!("status={} content-type={}", raw.status, raw.content_type);
                eprintln!("{}", response::snippet_at(&raw.body, DEBUG_SNIPPET_LEN));
            }

            let series = UbsAjaxProvider::series_from_raw(&raw, &params)?;

            let stem = export_file_stem(params.mode, &params.series, params.days);
            let options = ExportOptions {
                price_header: price_header.unwrap_or_else(|| default_price_header(mode)),
                sheet_name: format!("{mode}_{days}d"),
            };

            if matches!(format, FormatArg::Csv | FormatArg::Both) {
                let sink = CsvFileSink::new(&out_dir, stem.as_str(), options.clone());
                let path = sink.write(&series).await?;
                println!("{}", path.display());
            }
            if matches!(format, FormatArg::Xlsx | FormatArg::Both) {
                let sink = XlsxFileSink::new(&out_dir, stem.as_str(), options);
                match sink.write(&series).await {
                    Ok(path) => println!("{}", path.display()),
                    // CSV output must survive a missing spreadsheet
                    // backend; anything else is a real failure.
                    Err(err @ SinkError::MissingBackend { .. })
                        if format == FormatArg::Both =>
                    {
                        warn!("{err}");
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            eprintln!("rows={}", series.points.len());
        }
    }
    Ok(())
}

fn default_price_header(mode: PriceMode) -> String {
    match mode {
        PriceMode::Jual => "harga".to_string(),
        PriceMode::Buyback => "harga_buyback".to_string(),
    }
}
