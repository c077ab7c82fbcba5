//! Traffic-pattern chart for the selected route.
//!
//! Mirrors [`crate::map::MapSession`]: the chart itself is drawn by
//! `chart_bridge.js` (Chart.js) into the planner's canvas, the Rust side
//! only assembles the labeled series and owns the availability flag. A
//! missing chart library disables the panel without touching anything else.

use seed::prelude::web_sys;
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use shared::TrafficSample;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/chart_bridge.js")]
extern "C" {
    #[wasm_bindgen(js_name = chartAvailable)]
    fn chart_available() -> bool;
    #[wasm_bindgen(js_name = renderTrafficChart)]
    fn render_traffic_chart(series: JsValue);
    #[wasm_bindgen(js_name = destroyTrafficChart)]
    fn destroy_traffic_chart();
}

/// The labeled time series the chart surface consumes: congestion level on
/// the left axis, travel duration on the right.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrafficChart {
    pub title: String,
    pub labels: Vec<String>,
    pub traffic_levels: Vec<f64>,
    pub durations: Vec<f64>,
}

impl TrafficChart {
    pub fn build(route_name: &str, samples: &[TrafficSample]) -> Self {
        Self {
            title: format!("Traffic Pattern for {route_name}"),
            labels: samples.iter().map(|s| s.time.clone()).collect(),
            traffic_levels: samples.iter().map(|s| s.traffic_level).collect(),
            durations: samples.iter().map(|s| s.duration).collect(),
        }
    }
}

/// Sample with the lowest congestion, for the "best time to travel" note.
pub fn best_window(samples: &[TrafficSample]) -> Option<&TrafficSample> {
    samples.iter().reduce(|best, sample| {
        if sample.traffic_level < best.traffic_level {
            sample
        } else {
            best
        }
    })
}

pub struct ChartPanel {
    available: bool,
}

impl ChartPanel {
    pub fn mount() -> Self {
        let available = chart_available();
        if !available {
            web_sys::console::warn_1(&"chart library missing, traffic chart disabled".into());
        }
        Self { available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn render(&self, chart: &TrafficChart) {
        if !self.available {
            return;
        }
        match to_value(chart) {
            Ok(value) => render_traffic_chart(value),
            Err(err) => web_sys::console::error_1(
                &format!("failed to convert chart series: {err:?}").into(),
            ),
        }
    }

    pub fn destroy(&self) {
        if self.available {
            destroy_traffic_chart();
        }
    }
}
