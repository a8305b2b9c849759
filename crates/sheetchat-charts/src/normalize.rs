//! Chart configuration normalization.
//!
//! Chart configs are untyped nested values produced by the backend; the
//! engine only reads a small known subset (title text, legend data, grid
//! top margin, radar presence) and passes everything else through
//! unmodified. Before a config is applied to a rendering handle, the top
//! margin is raised so the title and legend never overlap the plot.
//! Radar charts skip margin injection: their legend is forced vertical
//! and the plot re-centered once the legend grows past 3 items.

use serde_json::{Value, json};

/// Legend items per row assumed by the margin estimate.
const LEGEND_ITEMS_PER_ROW: usize = 5;
const BASE_TOP: f64 = 16.0;
const TITLE_HEIGHT: f64 = 32.0;
const LEGEND_ROW_HEIGHT: f64 = 24.0;
const LEGEND_GAP: f64 = 8.0;

/// Radar legends longer than this switch to a vertical layout.
const RADAR_LEGEND_LIMIT: usize = 3;

/// Returns a normalized copy of the config, ready to apply to a handle.
pub fn normalize_chart_config(config: &Value) -> Value {
    let mut normalized = config.clone();
    if normalized.get("radar").is_some() {
        normalize_radar(&mut normalized);
    } else {
        inject_top_margin(&mut normalized);
    }
    normalized
}

/// Extracts the chart's declared title text, if any.
pub fn chart_title(config: &Value) -> Option<&str> {
    config
        .get("title")?
        .get("text")?
        .as_str()
        .filter(|text| !text.is_empty())
}

fn has_title(config: &Value) -> bool {
    chart_title(config).is_some()
}

/// Legend item count: the `legend.data` length when present, otherwise
/// the series count as an estimate. `None` when there is no legend.
fn legend_item_count(config: &Value) -> Option<usize> {
    let legend = config.get("legend")?;
    if let Some(data) = legend.get("data").and_then(Value::as_array) {
        return Some(data.len());
    }
    let estimate = config
        .get("series")
        .and_then(Value::as_array)
        .map(|series| series.len())
        .unwrap_or(0);
    Some(estimate)
}

/// Minimum top offset needed to fit the title and legend above the plot.
fn minimum_top(has_title: bool, legend_items: Option<usize>) -> f64 {
    let mut top = BASE_TOP;
    if has_title {
        top += TITLE_HEIGHT;
    }
    if let Some(items) = legend_items {
        let rows = items.max(1).div_ceil(LEGEND_ITEMS_PER_ROW);
        top += LEGEND_GAP + LEGEND_ROW_HEIGHT * rows as f64;
    }
    top
}

/// Raises `grid.top` to at least the computed minimum when the caller
/// supplied a smaller or absent value. Percent strings count as absent:
/// the layout math only reasons about pixel values.
fn inject_top_margin(config: &mut Value) {
    let title = has_title(config);
    let legend_items = legend_item_count(config);
    if !title && legend_items.is_none() {
        return;
    }

    let min_top = minimum_top(title, legend_items);
    let current = config
        .get("grid")
        .and_then(|grid| grid.get("top"))
        .and_then(Value::as_f64);
    if matches!(current, Some(top) if top >= min_top) {
        return;
    }

    if !config.get("grid").is_some_and(Value::is_object) {
        config["grid"] = json!({});
    }
    config["grid"]["top"] = json!(min_top);
}

/// Radar variant: no margin injection; with more than
/// [`RADAR_LEGEND_LIMIT`] legend items the legend goes vertical on the
/// left and the plot shifts right to clear it.
fn normalize_radar(config: &mut Value) {
    // A non-object `radar` value is degenerate; pass it through untouched.
    if !config.get("radar").is_some_and(Value::is_object) {
        return;
    }
    let Some(items) = legend_item_count(config) else {
        return;
    };
    if items <= RADAR_LEGEND_LIMIT {
        return;
    }

    if !config.get("legend").is_some_and(Value::is_object) {
        config["legend"] = json!({});
    }
    config["legend"]["orient"] = json!("vertical");
    config["legend"]["left"] = json!("left");
    config["legend"]["top"] = json!("middle");
    config["radar"]["center"] = json!(["60%", "55%"]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_config_is_untouched() {
        let config = json!({"series": [{"type": "bar"}]});
        assert_eq!(normalize_chart_config(&config), config);
    }

    #[test]
    fn test_title_raises_grid_top() {
        let config = json!({"title": {"text": "Totals"}, "series": []});
        let normalized = normalize_chart_config(&config);
        let top = normalized["grid"]["top"].as_f64().unwrap();
        assert_eq!(top, BASE_TOP + TITLE_HEIGHT);
    }

    #[test]
    fn test_larger_caller_margin_is_kept() {
        let config = json!({
            "title": {"text": "T"},
            "grid": {"top": 200},
            "series": []
        });
        let normalized = normalize_chart_config(&config);
        assert_eq!(normalized["grid"]["top"], json!(200));
    }

    #[test]
    fn test_smaller_caller_margin_is_raised() {
        let config = json!({
            "title": {"text": "T"},
            "grid": {"top": 10},
            "series": []
        });
        let normalized = normalize_chart_config(&config);
        assert!(normalized["grid"]["top"].as_f64().unwrap() > 10.0);
    }

    #[test]
    fn test_percent_margin_counts_as_absent() {
        let config = json!({
            "title": {"text": "T"},
            "grid": {"top": "10%"},
            "series": []
        });
        let normalized = normalize_chart_config(&config);
        assert!(normalized["grid"]["top"].is_number());
    }

    #[test]
    fn test_legend_rows_grow_the_margin() {
        let few = json!({"legend": {"data": ["a", "b"]}, "series": []});
        let many = json!({
            "legend": {"data": ["a", "b", "c", "d", "e", "f"]},
            "series": []
        });
        let few_top = normalize_chart_config(&few)["grid"]["top"]
            .as_f64()
            .unwrap();
        let many_top = normalize_chart_config(&many)["grid"]["top"]
            .as_f64()
            .unwrap();
        assert!(many_top > few_top);
    }

    #[test]
    fn test_radar_skips_margin_injection() {
        let config = json!({
            "title": {"text": "T"},
            "radar": {"indicator": []},
            "legend": {"data": ["a", "b"]},
            "series": []
        });
        let normalized = normalize_chart_config(&config);
        assert!(normalized.get("grid").is_none());
        // 2 items: layout untouched
        assert!(normalized["legend"].get("orient").is_none());
    }

    #[test]
    fn test_non_object_radar_passes_through() {
        let config = json!({
            "radar": true,
            "legend": {"data": ["a", "b", "c", "d"]}
        });
        assert_eq!(normalize_chart_config(&config), config);
    }

    #[test]
    fn test_radar_with_long_legend_goes_vertical() {
        let config = json!({
            "radar": {"indicator": []},
            "legend": {"data": ["a", "b", "c", "d"]},
            "series": []
        });
        let normalized = normalize_chart_config(&config);
        assert_eq!(normalized["legend"]["orient"], "vertical");
        assert_eq!(normalized["radar"]["center"], json!(["60%", "55%"]));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let config = json!({
            "title": {"text": "T"},
            "series": [],
            "customTooling": {"deeply": {"nested": [1, 2, 3]}}
        });
        let normalized = normalize_chart_config(&config);
        assert_eq!(normalized["customTooling"], config["customTooling"]);
    }

    #[test]
    fn test_chart_title_extraction() {
        assert_eq!(
            chart_title(&json!({"title": {"text": "Totals"}})),
            Some("Totals")
        );
        assert_eq!(chart_title(&json!({"title": {"text": ""}})), None);
        assert_eq!(chart_title(&json!({"series": []})), None);
    }
}
