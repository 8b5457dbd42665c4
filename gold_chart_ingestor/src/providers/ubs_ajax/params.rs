//! Form payload construction for the admin-ajax chart endpoint.

use crate::config::{EndpointConfig, LocatorStyle};
use crate::models::request_params::ChartRequestParams;

/// Builds the `path` locator exactly as the site's own front-end does:
/// `ajax/chart_interval_<mode>/<series>/<days>`.
pub fn chart_path(params: &ChartRequestParams) -> String {
    format!(
        "ajax/chart_interval_{}/{}/{}",
        params.mode, params.series, params.days
    )
}

/// Assembles the ordered form pairs for one POST.
///
/// `days` is passed through unchecked; the upstream action accepts
/// arbitrary ranges and the enumerated presets live in the CLI only.
pub fn build_form(config: &EndpointConfig, params: &ChartRequestParams) -> Vec<(String, String)> {
    let mut form = vec![("action".to_string(), config.action.clone())];
    match &config.locator {
        LocatorStyle::Path => {
            form.push(("path".to_string(), chart_path(params)));
        }
        LocatorStyle::Split { range_field } => {
            form.push((
                "type".to_string(),
                format!("chart_interval_{}", params.mode),
            ));
            form.push(("series".to_string(), params.series.clone()));
            form.push((range_field.clone(), params.days.to_string()));
        }
    }
    form
}
