//! Fetches the UBS Lifestyle gold price chart from its `admin-ajax.php`
//! endpoint, normalizes the loosely-shaped payload into dated price rows,
//! and exports the result as CSV or XLSX.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod models;
pub mod providers;
