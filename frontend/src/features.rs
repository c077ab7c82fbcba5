//! Builds the GeoJSON feature collections handed to the map bridge.
//!
//! The map surface styles and selects features by their properties:
//! overview lines carry a `routeIndex` used for color cycling and click
//! selection, step lines additionally carry a `stepIndex`. Coordinates are
//! emitted `[lon, lat]` as GeoJSON expects.

use serde::Serialize;
use shared::polyline::{self, PolylineError};
use shared::{Coordinate, Route, RouteBounds};

#[derive(Debug, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: LineString,
    pub properties: FeatureProperties,
}

impl Feature {
    fn line(path: &[Coordinate], properties: FeatureProperties) -> Self {
        Self {
            kind: "Feature",
            geometry: LineString {
                kind: "LineString",
                coordinates: path.iter().map(|point| [point.lon, point.lat]).collect(),
            },
            properties,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineString {
    #[serde(rename = "type")]
    kind: &'static str,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub route_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
}

pub fn route_name(index: usize) -> String {
    format!("Route {}", index + 1)
}

/// One full-geometry line per candidate route. A route whose polyline does
/// not decode is skipped rather than failing the whole redraw.
pub fn overview_features(routes: &[Route]) -> FeatureCollection {
    let features = routes
        .iter()
        .enumerate()
        .filter_map(|(index, route)| {
            let path = decode_or_skip(&route.polyline, index)?;
            Some(Feature::line(
                &path,
                FeatureProperties {
                    name: route_name(index),
                    distance: Some(route.distance.clone()),
                    duration: Some(route.duration.clone()),
                    route_index: index,
                    step_index: None,
                },
            ))
        })
        .collect();
    FeatureCollection::new(features)
}

/// Per-step lines for the selected route. Empty or malformed step strings
/// are dropped; a route without usable step geometry falls back to its
/// overview polyline so the detail view is never blank.
pub fn detail_features(route: &Route, route_index: usize) -> FeatureCollection {
    let steps: Vec<Feature> = route
        .step_polylines
        .iter()
        .enumerate()
        .filter(|(_, encoded)| !encoded.is_empty())
        .filter_map(|(step_index, encoded)| {
            let path = decode_or_skip(encoded, route_index)?;
            Some(Feature::line(
                &path,
                FeatureProperties {
                    name: format!("Step {}", step_index + 1),
                    distance: None,
                    duration: None,
                    route_index,
                    step_index: Some(step_index),
                },
            ))
        })
        .collect();

    if !steps.is_empty() {
        return FeatureCollection::new(steps);
    }

    let fallback = decode_or_skip(&route.polyline, route_index)
        .map(|path| {
            vec![Feature::line(
                &path,
                FeatureProperties {
                    name: route_name(route_index),
                    distance: Some(route.distance.clone()),
                    duration: Some(route.duration.clone()),
                    route_index,
                    step_index: None,
                },
            )]
        })
        .unwrap_or_default();
    FeatureCollection::new(fallback)
}

/// Envelope of the first route's geometry, used to fit the viewport after
/// a search.
pub fn first_route_bounds(routes: &[Route]) -> Option<RouteBounds> {
    let route = routes.first()?;
    let path = polyline::decode(&route.polyline).ok()?;
    RouteBounds::from_path(&path)
}

/// Start and end of a route's geometry, for the endpoint markers.
pub fn route_endpoints(route: &Route) -> Option<(Coordinate, Coordinate)> {
    let path = polyline::decode(&route.polyline).ok()?;
    Some((*path.first()?, *path.last()?))
}

fn decode_or_skip(encoded: &str, route_index: usize) -> Option<Vec<Coordinate>> {
    match polyline::decode(encoded) {
        Ok(path) if !path.is_empty() => Some(path),
        Ok(_) => None,
        Err(err) => {
            log_dropped_geometry(route_index, &err);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn log_dropped_geometry(route_index: usize, err: &PolylineError) {
    seed::prelude::web_sys::console::warn_1(
        &format!("route {route_index}: dropping geometry: {err}").into(),
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn log_dropped_geometry(_route_index: usize, _err: &PolylineError) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(polyline: &str, steps: &[&str]) -> Route {
        Route {
            polyline: polyline.to_string(),
            distance: "10 km".to_string(),
            duration: "20 mins".to_string(),
            duration_in_traffic: "26 mins".to_string(),
            eta: String::new(),
            start_location: String::new(),
            end_location: String::new(),
            steps: Vec::new(),
            step_polylines: steps.iter().map(|s| s.to_string()).collect(),
            avoid_tolls: false,
            avoid_highways: false,
            is_optimal: false,
        }
    }

    const LINE: &str = "_p~iF~ps|U_ulLnnqC";

    #[test]
    fn overview_emits_one_feature_per_route() {
        let routes = [route(LINE, &[]), route(LINE, &[])];
        let collection = overview_features(&routes);

        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[0].properties.name, "Route 1");
        assert_eq!(collection.features[1].properties.route_index, 1);
        assert_eq!(collection.features[0].geometry.coordinates.len(), 2);
    }

    #[test]
    fn overview_skips_malformed_geometry() {
        let routes = [route("not a polyline!", &[]), route(LINE, &[])];
        let collection = overview_features(&routes);

        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].properties.route_index, 1);
    }

    #[test]
    fn detail_emits_step_features_with_indices() {
        let selected = route(LINE, &[LINE, "", LINE]);
        let collection = detail_features(&selected, 3);

        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[0].properties.step_index, Some(0));
        assert_eq!(collection.features[1].properties.step_index, Some(2));
        assert!(collection
            .features
            .iter()
            .all(|feature| feature.properties.route_index == 3));
    }

    #[test]
    fn detail_falls_back_to_overview_polyline() {
        let selected = route(LINE, &[]);
        let collection = detail_features(&selected, 0);

        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].properties.step_index, None);
        assert_eq!(collection.features[0].properties.name, "Route 1");
    }

    #[test]
    fn serialized_shape_matches_geojson() {
        let routes = [route(LINE, &[])];
        let value = serde_json::to_value(overview_features(&routes)).expect("serialize");

        assert_eq!(value["type"], "FeatureCollection");
        let feature = &value["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["properties"]["routeIndex"], 0);
        assert!(feature["properties"].get("stepIndex").is_none());

        let first = &feature["geometry"]["coordinates"][0];
        assert!((first[0].as_f64().unwrap() - (-120.2)).abs() < 1e-9);
        assert!((first[1].as_f64().unwrap() - 38.5).abs() < 1e-9);
    }

    #[test]
    fn bounds_and_endpoints_come_from_first_route() {
        let routes = [route(LINE, &[])];
        let bounds = first_route_bounds(&routes).expect("bounds");
        assert!((bounds.min_lat - 38.5).abs() < 1e-9);
        assert!((bounds.max_lat - 40.7).abs() < 1e-9);

        let (start, end) = route_endpoints(&routes[0]).expect("endpoints");
        assert!((start.lat - 38.5).abs() < 1e-9);
        assert!((end.lat - 40.7).abs() < 1e-9);

        assert!(first_route_bounds(&[]).is_none());
    }
}
