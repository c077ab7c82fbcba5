//! Session-scoped handle to the map surface.
//!
//! The actual map lives on the JS side (`map_bridge.js`, maplibre-gl). The
//! bridge owns one invariant the planner depends on: every `renderFeatures`
//! call clears the previously drawn feature set before drawing the new one,
//! and re-binds the click listener to the freshly created features so a
//! stale binding can never fire. Feature clicks come back as a
//! `route-select` CustomEvent on the window carrying `{routeIndex}`.

use seed::prelude::web_sys;
use serde_wasm_bindgen::to_value;
use shared::{Coordinate, RouteBounds};
use wasm_bindgen::prelude::*;

use crate::features::FeatureCollection;

#[wasm_bindgen(module = "/map_bridge.js")]
extern "C" {
    #[wasm_bindgen(js_name = mapAvailable)]
    fn map_available() -> bool;
    #[wasm_bindgen(js_name = initMap)]
    fn init_map();
    #[wasm_bindgen(js_name = renderFeatures)]
    fn render_features(collection: JsValue);
    #[wasm_bindgen(js_name = clearFeatures)]
    fn clear_features();
    #[wasm_bindgen(js_name = fitBounds)]
    fn fit_bounds(bounds: JsValue);
    #[wasm_bindgen(js_name = setEndpointMarkers)]
    fn set_endpoint_markers(start: JsValue, end: JsValue);
    #[wasm_bindgen(js_name = setMapVisible)]
    fn set_map_visible(visible: bool);
}

/// Owns the map lifecycle for one UI session: created on app start,
/// released with the model. When the map library failed to load, every
/// call is a no-op and the rest of the UI keeps working.
pub struct MapSession {
    available: bool,
}

impl MapSession {
    pub fn mount() -> Self {
        let available = map_available();
        if available {
            init_map();
        } else {
            web_sys::console::warn_1(&"map library missing, map panel disabled".into());
        }
        Self { available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Replaces everything drawn on the map with `collection`.
    pub fn render(&self, collection: &FeatureCollection) {
        if !self.available {
            return;
        }
        match to_value(collection) {
            Ok(value) => render_features(value),
            Err(err) => web_sys::console::error_1(
                &format!("failed to convert features for the map: {err:?}").into(),
            ),
        }
    }

    pub fn clear(&self) {
        if self.available {
            clear_features();
        }
    }

    pub fn fit(&self, bounds: RouteBounds) {
        if !self.available {
            return;
        }
        if let Ok(value) = to_value(&bounds) {
            fit_bounds(value);
        }
    }

    pub fn set_endpoints(&self, start: Coordinate, end: Coordinate) {
        if !self.available {
            return;
        }
        if let (Ok(start), Ok(end)) = (to_value(&start), to_value(&end)) {
            set_endpoint_markers(start, end);
        }
    }

    /// The map canvas lives outside the app's virtual DOM, so tab switches
    /// toggle it through the bridge.
    pub fn set_visible(&self, visible: bool) {
        if self.available {
            set_map_visible(visible);
        }
    }
}
