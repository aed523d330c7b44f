//! Wire types for the pedestrian route service.
//!
//! Requests are JSON objects naming the endpoints and an optional
//! underscore-separated `passList` of via points. Responses are GeoJSON
//! feature collections: the first feature's `properties.totalTime` holds the
//! walking time in seconds and `LineString` features carry the path.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Coordinate system tag for both request and response coordinates.
pub const WGS84_COORD_TYPE: &str = "WGS84GEO";

/// Request body for the pedestrian route endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PedestrianRequest<'a> {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub req_coord_type: &'static str,
    pub res_coord_type: &'static str,
    pub start_name: &'a str,
    pub end_name: &'a str,
    /// `"0"` asks for the recommended route.
    pub search_option: &'static str,
    pub sort: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_list: Option<String>,
}

impl<'a> PedestrianRequest<'a> {
    pub fn new(
        start: Coord<f64>,
        end: Coord<f64>,
        via: &[Coord<f64>],
        start_name: &'a str,
        end_name: &'a str,
    ) -> Self {
        Self {
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            req_coord_type: WGS84_COORD_TYPE,
            res_coord_type: WGS84_COORD_TYPE,
            start_name,
            end_name,
            search_option: "0",
            sort: "index",
            pass_list: format_pass_list(via),
        }
    }
}

/// Encode via points as `x1,y1_x2,y2`, or `None` when there are none.
pub fn format_pass_list(via: &[Coord<f64>]) -> Option<String> {
    if via.is_empty() {
        return None;
    }
    Some(
        via.iter()
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join("_"),
    )
}

/// GeoJSON feature collection returned by the service.
#[derive(Debug, Default, Deserialize)]
pub struct PedestrianResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<[f64; 2]> },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    /// Walking time in seconds. Only present on the summary feature.
    #[serde(default)]
    pub total_time: Option<f64>,
}

impl PedestrianResponse {
    /// Total time reported by the first feature, if any.
    pub fn total_time_secs(&self) -> Option<f64> {
        self.features
            .first()
            .and_then(|feature| feature.properties.total_time)
    }

    /// Concatenate every `LineString` into one polyline.
    ///
    /// Consecutive segments share their joining vertex, which is kept once.
    pub fn path(&self) -> Vec<Coord<f64>> {
        let mut path: Vec<Coord<f64>> = Vec::new();
        for feature in &self.features {
            let Some(Geometry::LineString { coordinates }) = &feature.geometry else {
                continue;
            };
            for &[x, y] in coordinates {
                let coord = Coord { x, y };
                if path.last() != Some(&coord) {
                    path.push(coord);
                }
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pass_list_joins_coordinates() {
        let via = [Coord { x: 126.9, y: 37.5 }, Coord { x: 127.0, y: 37.6 }];
        assert_eq!(
            format_pass_list(&via).as_deref(),
            Some("126.9,37.5_127,37.6")
        );
        assert_eq!(format_pass_list(&[]), None);
    }

    #[rstest]
    fn request_serialises_service_field_names() {
        let request = PedestrianRequest::new(
            Coord { x: 1.0, y: 2.0 },
            Coord { x: 3.0, y: 4.0 },
            &[],
            "start",
            "end",
        );
        let json = serde_json::to_value(&request).expect("serialise request");
        assert_eq!(json["startX"], 1.0);
        assert_eq!(json["endY"], 4.0);
        assert_eq!(json["reqCoordType"], "WGS84GEO");
        assert_eq!(json["searchOption"], "0");
        assert!(json.get("passList").is_none());
    }

    #[rstest]
    fn deserialise_feature_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
                    "properties": { "totalDistance": 820, "totalTime": 615, "pointType": "SP" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 0.0]] },
                    "properties": { "lineIndex": 0 }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[1.0, 0.0], [1.0, 1.0]] },
                    "properties": { "lineIndex": 1 }
                }
            ]
        }"#;

        let response: PedestrianResponse = serde_json::from_str(json).expect("should deserialise");

        assert_eq!(response.total_time_secs(), Some(615.0));
        assert_eq!(
            response.path(),
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
            ]
        );
    }

    #[rstest]
    fn missing_total_time_is_none() {
        let json = r#"{ "features": [ { "properties": {} } ] }"#;
        let response: PedestrianResponse = serde_json::from_str(json).expect("should deserialise");
        assert_eq!(response.total_time_secs(), None);
    }

    #[rstest]
    fn unknown_geometry_is_tolerated() {
        let json = r#"{ "features": [ { "geometry": { "type": "Polygon", "coordinates": [] } } ] }"#;
        let response: PedestrianResponse = serde_json::from_str(json).expect("should deserialise");
        assert!(response.path().is_empty());
    }
}
