//! Builders for the WMS `GetMap` and WFS `GetFeature` requests sent to GeoServer.

use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::model::Position;

/// WMS protocol version spoken by [`GetMapRequest`].
pub const WMS_VERSION: &str = "1.3.0";
/// WFS protocol version spoken by [`GetFeatureRequest`].
pub const WFS_VERSION: &str = "1.1.0";
/// GeoJSON output format understood by GeoServer.
pub const GEOJSON_FORMAT: &str = "application/json";

/// Metres per degree of latitude on the mean earth sphere.
const METRES_PER_DEGREE: f64 = 111_195.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// Coordinate reference systems used by the map layer.
pub enum Crs {
    /// `EPSG:4326`, longitude/latitude in degrees.
    #[default]
    Wgs84,
    /// `EPSG:3857`, spherical Web Mercator in metres.
    WebMercator,
}

impl Crs {
    /// EPSG code as sent on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Wgs84 => "EPSG:4326",
            Self::WebMercator => "EPSG:3857",
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Axis-aligned extent in x/y (easting/northing or lon/lat) order.
pub struct BoundingBox {
    /// Minimum x.
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Maximum x.
    pub max_x: f64,
    /// Maximum y.
    pub max_y: f64,
    /// Reference system of the coordinates.
    pub crs: Crs,
}

impl BoundingBox {
    /// WGS84 box reaching roughly `radius_m` metres from `center` in every direction.
    ///
    /// Corners are clamped to the valid longitude and latitude ranges.
    #[must_use]
    pub fn around(center: Position, radius_m: f64) -> Self {
        let d_lat = radius_m / METRES_PER_DEGREE;
        let d_lon = radius_m / (METRES_PER_DEGREE * center.lat.to_radians().cos().max(1e-6));
        Self {
            min_x: (center.lon - d_lon).clamp(-180.0, 180.0),
            min_y: (center.lat - d_lat).clamp(-90.0, 90.0),
            max_x: (center.lon + d_lon).clamp(-180.0, 180.0),
            max_y: (center.lat + d_lat).clamp(-90.0, 90.0),
            crs: Crs::Wgs84,
        }
    }

    /// Whether a WGS84 position lies inside a WGS84 box. Always false for other systems.
    #[must_use]
    pub fn contains(&self, position: &Position) -> bool {
        self.crs == Crs::Wgs84
            && (self.min_x..=self.max_x).contains(&position.lon)
            && (self.min_y..=self.max_y).contains(&position.lat)
    }

    fn join(values: [f64; 4]) -> String {
        values.map(|value| value.to_string()).join(",")
    }

    /// Corners as `minx,miny,maxx,maxy`.
    fn xy_order(&self) -> String {
        Self::join([self.min_x, self.min_y, self.max_x, self.max_y])
    }

    /// WMS 1.3.0 puts latitude first for geographic systems.
    fn wms_order(&self) -> String {
        match self.crs {
            Crs::Wgs84 => Self::join([self.min_y, self.min_x, self.max_y, self.max_x]),
            Crs::WebMercator => self.xy_order(),
        }
    }
}

fn append_query(endpoint: &Url, pairs: &[(&'static str, String)]) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(key, value)| (*key, value.as_str())));
    url
}

#[derive(Debug, Clone, PartialEq)]
/// WMS `GetMap` request rendering one or more layers into an image.
pub struct GetMapRequest {
    /// Comma separated qualified layer names.
    pub layers: String,
    /// Comma separated style names; empty selects the default style.
    pub styles: String,
    /// Requested extent.
    pub bbox: BoundingBox,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Image MIME type.
    pub format: String,
    /// Whether areas without data are transparent.
    pub transparent: bool,
}

impl GetMapRequest {
    /// PNG request with default style and transparency.
    #[must_use]
    pub fn new<S: Into<String>>(layers: S, bbox: BoundingBox, width: u32, height: u32) -> Self {
        Self {
            layers: layers.into(),
            styles: String::new(),
            bbox,
            width,
            height,
            format: "image/png".to_owned(),
            transparent: true,
        }
    }

    /// Query parameters in the order GeoServer documents them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("SERVICE", "WMS".to_owned()),
            ("VERSION", WMS_VERSION.to_owned()),
            ("REQUEST", "GetMap".to_owned()),
            ("LAYERS", self.layers.clone()),
            ("STYLES", self.styles.clone()),
            ("FORMAT", self.format.clone()),
            ("TRANSPARENT", if self.transparent { "TRUE" } else { "FALSE" }.to_owned()),
            ("CRS", self.bbox.crs.code().to_owned()),
            ("BBOX", self.bbox.wms_order()),
            ("WIDTH", self.width.to_string()),
            ("HEIGHT", self.height.to_string()),
        ]
    }

    /// Append the request parameters to a WMS endpoint.
    #[must_use]
    pub fn to_url(&self, endpoint: &Url) -> Url {
        append_query(endpoint, &self.query_pairs())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// WFS `GetFeature` request for a single feature type.
pub struct GetFeatureRequest {
    /// Qualified feature type name.
    pub type_name: String,
    /// Output MIME type.
    pub output_format: String,
    /// Reference system of the returned geometries.
    pub srs_name: Crs,
    /// Optional spatial filter.
    pub bbox: Option<BoundingBox>,
    /// Optional server-side limit.
    pub max_features: Option<usize>,
}

impl GetFeatureRequest {
    /// GeoJSON request in WGS84 without filters.
    #[must_use]
    pub fn new<S: Into<String>>(type_name: S) -> Self {
        Self {
            type_name: type_name.into(),
            output_format: GEOJSON_FORMAT.to_owned(),
            srs_name: Crs::Wgs84,
            bbox: None,
            max_features: None,
        }
    }

    /// Restrict the result to features inside `bbox`.
    #[must_use]
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Ask the server to return at most `limit` features.
    #[must_use]
    pub fn with_max_features(mut self, limit: usize) -> Self {
        self.max_features = Some(limit);
        self
    }

    /// Query parameters for the request.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("service", "WFS".to_owned()),
            ("version", WFS_VERSION.to_owned()),
            ("request", "GetFeature".to_owned()),
            ("typeName", self.type_name.clone()),
            ("outputFormat", self.output_format.clone()),
            ("srsName", self.srs_name.code().to_owned()),
        ];
        if let Some(bbox) = &self.bbox {
            pairs.push(("bbox", format!("{},{}", bbox.xy_order(), bbox.crs.code())));
        }
        if let Some(limit) = self.max_features {
            pairs.push(("maxFeatures", limit.to_string()));
        }
        pairs
    }

    /// Append the request parameters to a WFS endpoint.
    #[must_use]
    pub fn to_url(&self, endpoint: &Url) -> Url {
        append_query(endpoint, &self.query_pairs())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn query_of(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    fn kiel_box() -> BoundingBox {
        BoundingBox {
            min_x: 10.1,
            min_y: 54.3,
            max_x: 10.2,
            max_y: 54.4,
            crs: Crs::Wgs84,
        }
    }

    #[test]
    fn get_map_swaps_axes_for_geographic_crs() {
        let endpoint = Url::parse("http://localhost:8080/geoserver/ptf/wms").expect("valid url");
        let url = GetMapRequest::new("ptf:toilets_kiel", kiel_box(), 512, 256).to_url(&endpoint);
        let query = query_of(&url);

        assert_eq!(url.path(), "/geoserver/ptf/wms");
        assert_eq!(query.get("SERVICE").map(String::as_str), Some("WMS"));
        assert_eq!(query.get("VERSION").map(String::as_str), Some("1.3.0"));
        assert_eq!(query.get("REQUEST").map(String::as_str), Some("GetMap"));
        assert_eq!(query.get("LAYERS").map(String::as_str), Some("ptf:toilets_kiel"));
        assert_eq!(query.get("CRS").map(String::as_str), Some("EPSG:4326"));
        assert_eq!(query.get("BBOX").map(String::as_str), Some("54.3,10.1,54.4,10.2"));
        assert_eq!(query.get("WIDTH").map(String::as_str), Some("512"));
        assert_eq!(query.get("HEIGHT").map(String::as_str), Some("256"));
        assert_eq!(query.get("TRANSPARENT").map(String::as_str), Some("TRUE"));
    }

    #[test]
    fn get_map_keeps_xy_order_for_projected_crs() {
        let bbox = BoundingBox {
            min_x: 1_120_000.0,
            min_y: 7_220_000.0,
            max_x: 1_130_000.0,
            max_y: 7_230_000.0,
            crs: Crs::WebMercator,
        };
        let pairs = GetMapRequest::new("ptf:toilets_kiel", bbox, 256, 256).query_pairs();
        assert!(pairs.contains(&("BBOX", "1120000,7220000,1130000,7230000".to_owned())));
        assert!(pairs.contains(&("CRS", "EPSG:3857".to_owned())));
    }

    #[test]
    fn get_feature_defaults_to_geojson() {
        let endpoint = Url::parse("http://localhost:8080/geoserver/ptf/wfs").expect("valid url");
        let url = GetFeatureRequest::new("ptf:toilets_kiel").to_url(&endpoint);
        let query = query_of(&url);

        assert_eq!(query.get("service").map(String::as_str), Some("WFS"));
        assert_eq!(query.get("version").map(String::as_str), Some("1.1.0"));
        assert_eq!(query.get("request").map(String::as_str), Some("GetFeature"));
        assert_eq!(query.get("typeName").map(String::as_str), Some("ptf:toilets_kiel"));
        assert_eq!(query.get("outputFormat").map(String::as_str), Some("application/json"));
        assert_eq!(query.get("srsName").map(String::as_str), Some("EPSG:4326"));
        assert!(!query.contains_key("bbox"));
        assert!(!query.contains_key("maxFeatures"));
    }

    #[test]
    fn get_feature_filters() {
        let pairs = GetFeatureRequest::new("ptf:toilets_kiel")
            .with_bbox(kiel_box())
            .with_max_features(25)
            .query_pairs();
        assert!(pairs.contains(&("bbox", "10.1,54.3,10.2,54.4,EPSG:4326".to_owned())));
        assert!(pairs.contains(&("maxFeatures", "25".to_owned())));
    }

    #[test]
    fn to_url_keeps_existing_query() {
        let endpoint =
            Url::parse("http://localhost:8080/geoserver/ptf/wfs?authkey=abc").expect("valid url");
        let url = GetFeatureRequest::new("ptf:toilets_kiel").to_url(&endpoint);
        let query = query_of(&url);
        assert_eq!(query.get("authkey").map(String::as_str), Some("abc"));
        assert_eq!(query.get("request").map(String::as_str), Some("GetFeature"));
    }

    #[test]
    fn bbox_around_contains_center() {
        let center = Position::new(10.1365, 54.3233);
        let bbox = BoundingBox::around(center, 250.0);
        assert!(bbox.contains(&center));
        assert!(!bbox.contains(&Position::new(10.2, 54.3233)));

        let width_m = (bbox.max_y - bbox.min_y) * 111_195.0;
        assert!((width_m - 500.0).abs() < 1.0, "got {width_m}");
    }

    #[test]
    fn bbox_around_stays_within_world_bounds() {
        for center in [
            Position::new(179.9, 89.99),
            Position::new(-179.9, -89.99),
            Position::new(0.0, 90.0),
        ] {
            let bbox = BoundingBox::around(center, 5_000.0);
            assert!(bbox.min_x >= -180.0 && bbox.max_x <= 180.0, "x out of range: {bbox:?}");
            assert!(bbox.min_y >= -90.0 && bbox.max_y <= 90.0, "y out of range: {bbox:?}");
            assert!(bbox.min_x <= bbox.max_x && bbox.min_y <= bbox.max_y);
        }
    }
}
