use serde::{Deserialize, Serialize};

pub mod polyline;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// One candidate driving route as returned by `POST /routes`.
///
/// Display fields (`distance`, `duration`, ...) arrive pre-formatted by the
/// backend; geometry arrives as encoded polylines and is only decoded on the
/// client. A route is immutable once received and lives as long as the
/// search result set it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub polyline: String,
    pub distance: String,
    pub duration: String,
    pub duration_in_traffic: String,
    #[serde(default)]
    pub eta: String,
    #[serde(default)]
    pub start_location: String,
    #[serde(default)]
    pub end_location: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub step_polylines: Vec<String>,
    #[serde(default)]
    pub avoid_tolls: bool,
    #[serde(default)]
    pub avoid_highways: bool,
    #[serde(default)]
    pub is_optimal: bool,
}

/// Request body for `POST /routes`. `departure_time` is either `"now"` or a
/// unix timestamp in seconds, encoded as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub avoid_tolls: bool,
    #[serde(default)]
    pub avoid_highways: bool,
    #[serde(default = "default_departure_time")]
    pub departure_time: String,
}

fn default_departure_time() -> String {
    "now".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

/// One point of the traffic-pattern series served by `GET /traffic?label=`.
/// `traffic_level` is a congestion percentage, `duration` a travel time in
/// minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficSample {
    pub time: String,
    #[serde(rename = "trafficLevel")]
    pub traffic_level: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RouteBounds {
    /// Envelope of a decoded path. `None` for an empty path, so callers can
    /// skip the map fit instead of zooming to a degenerate box.
    pub fn from_path(path: &[Coordinate]) -> Option<Self> {
        let first = path.first()?;
        let mut bounds = RouteBounds {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        for point in &path[1..] {
            bounds.min_lat = bounds.min_lat.min(point.lat);
            bounds.max_lat = bounds.max_lat.max(point.lat);
            bounds.min_lon = bounds.min_lon.min(point.lon);
            bounds.max_lon = bounds.max_lon.max(point.lon);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "polyline": "_p~iF~ps|U",
            "distance": "12.4 km",
            "duration": "25 mins",
            "duration_in_traffic": "31 mins"
        }"#;

        let route: Route = serde_json::from_str(json).expect("route json");
        assert_eq!(route.distance, "12.4 km");
        assert!(route.steps.is_empty());
        assert!(route.step_polylines.is_empty());
        assert!(!route.is_optimal);
        assert_eq!(route.eta, "");
    }

    #[test]
    fn traffic_sample_uses_wire_field_names() {
        let json = r#"{"time": "08:30", "trafficLevel": 72.0, "duration": 34.0}"#;
        let sample: TrafficSample = serde_json::from_str(json).expect("sample json");
        assert_eq!(sample.traffic_level, 72.0);

        let back = serde_json::to_string(&sample).expect("serialize");
        assert!(back.contains("\"trafficLevel\""));
    }

    #[test]
    fn alert_kind_maps_to_type_field() {
        let json = r#"{"type": "Accident", "description": "Pileup at the junction"}"#;
        let alert: TrafficAlert = serde_json::from_str(json).expect("alert json");
        assert_eq!(alert.kind, "Accident");
    }

    #[test]
    fn bounds_of_empty_path_is_none() {
        assert_eq!(RouteBounds::from_path(&[]), None);
    }

    #[test]
    fn bounds_cover_every_point() {
        let path = [
            Coordinate { lat: 12.97, lon: 77.59 },
            Coordinate { lat: 12.89, lon: 77.61 },
            Coordinate { lat: 13.01, lon: 77.55 },
        ];
        let bounds = RouteBounds::from_path(&path).expect("bounds");
        assert_eq!(bounds.min_lat, 12.89);
        assert_eq!(bounds.max_lat, 13.01);
        assert_eq!(bounds.min_lon, 77.55);
        assert_eq!(bounds.max_lon, 77.61);
    }
}
