//! Provider implementation reading a layer from GeoServer over WFS and WMS.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use ptf_core::{
    endpoints::Endpoints,
    model::{Feature, FeatureId, LayerId, LayerMeta, Position},
    plugin::LayerPlugin,
    ports::{FeaturePort, FeatureQuery, MapPort, MapQuery, PortError},
    request::{GetFeatureRequest, GetMapRequest},
};

/// GeoJSON `FeatureCollection` as produced by `outputFormat=application/json`.
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<GeoFeature>,
    // totalFeatures / numberReturned / crs are ignored
}

/// Single GeoJSON feature.
#[derive(Debug, Deserialize)]
struct GeoFeature {
    #[serde(default)]
    id: Option<Value>,
    // Decoded per feature so one malformed geometry does not fail the collection.
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// Geometry variants we can reduce to a point; everything else is kept as `Unsupported`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    fn decode(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    fn position(&self) -> Option<Position> {
        match self {
            Geometry::Point { coordinates } => point(coordinates),
            Geometry::MultiPoint { coordinates } => coordinates.first().and_then(|first| point(first)),
            Geometry::Unsupported => None,
        }
    }
}

// GeoJSON positions are [lon, lat, (alt)].
fn point(coordinates: &[f64]) -> Option<Position> {
    match coordinates {
        [lon, lat, ..] => Some(Position::new(*lon, *lat)),
        _ => None,
    }
}

/// Feature access over WFS `GetFeature`.
pub struct GeoServerFeaturePort {
    client: Client,
    meta: LayerMeta,
    wfs_url: Url,
}

impl GeoServerFeaturePort {
    /// Create a feature port for the layer served at `wfs_url`.
    #[must_use]
    pub fn new(client: Client, meta: LayerMeta, wfs_url: Url) -> Self {
        Self {
            client,
            meta,
            wfs_url,
        }
    }
}

#[async_trait]
impl FeaturePort for GeoServerFeaturePort {
    fn layer(&self) -> &LayerMeta {
        &self.meta
    }

    async fn features(&self, query: FeatureQuery) -> Result<Vec<Feature>, PortError> {
        if query.limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut request = GetFeatureRequest::new(self.meta.type_name.clone());
        if let Some(bbox) = query.bbox {
            request = request.with_bbox(bbox);
        }
        if let Some(limit) = query.limit {
            request = request.with_max_features(limit);
        }

        let url = request.to_url(&self.wfs_url);
        debug!(%url, "requesting WFS features");

        let collection = fetch_json::<FeatureCollection>(self.client.get(url)).await?;
        Ok(to_features(&self.meta.id, collection, query.limit))
    }
}

/// Rendered map access over WMS `GetMap`.
pub struct GeoServerMapPort {
    meta: LayerMeta,
    wms_url: Url,
}

impl GeoServerMapPort {
    /// Create a map port for the layer served at `wms_url`.
    #[must_use]
    pub fn new(meta: LayerMeta, wms_url: Url) -> Self {
        Self { meta, wms_url }
    }
}

impl MapPort for GeoServerMapPort {
    fn layer(&self) -> &LayerMeta {
        &self.meta
    }

    fn map_url(&self, query: &MapQuery) -> Result<Url, PortError> {
        if query.width == 0 || query.height == 0 {
            return Err(PortError::Internal("Map image must have a non-zero size".into()));
        }
        let request = GetMapRequest::new(
            self.meta.type_name.clone(),
            query.bbox,
            query.width,
            query.height,
        );
        Ok(request.to_url(&self.wms_url))
    }
}

/// Build the plugin bundle for one GeoServer layer.
///
/// # Errors
///
/// Returns [`PortError::Endpoint`] when `origin` cannot be combined with the endpoint paths.
pub fn plugin(client: Client, origin: &str, endpoints: &Endpoints) -> Result<LayerPlugin, PortError> {
    let meta = layer_meta(endpoints);
    let wfs_url = endpoints.wfs_url(origin)?;
    let wms_url = endpoints.wms_url(origin)?;
    debug!(layer = %meta.id, %wfs_url, %wms_url, "registered GeoServer layer");

    let feature_port = Arc::new(GeoServerFeaturePort::new(client, meta.clone(), wfs_url));
    let map_port = Arc::new(GeoServerMapPort::new(meta.clone(), wms_url));

    Ok(LayerPlugin {
        meta,
        feature_port,
        map_port,
    })
}

fn layer_meta(endpoints: &Endpoints) -> LayerMeta {
    let type_name = endpoints.type_name();
    LayerMeta {
        id: LayerId(type_name.clone()),
        title: title_case(endpoints.layer()),
        type_name,
    }
}

/// `toilets_kiel` → `Toilets Kiel`
fn title_case(layer: &str) -> String {
    layer
        .split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// `limit` is applied here too; not every GeoServer setup honours maxFeatures.
fn to_features(
    layer: &LayerId,
    collection: FeatureCollection,
    limit: Option<usize>,
) -> Vec<Feature> {
    let take = limit.unwrap_or(usize::MAX);
    let mut features = Vec::with_capacity(collection.features.len().min(take));

    for (index, raw) in collection.features.into_iter().enumerate().take(take) {
        let id = match raw.id {
            Some(Value::String(text)) if !text.is_empty() => text,
            Some(Value::Number(number)) => number.to_string(),
            _ => format!("{}.{}", layer.0, index + 1),
        };

        let position = raw
            .geometry
            .and_then(Geometry::decode)
            .and_then(|geometry| geometry.position());
        if position.is_none() {
            trace!(%id, "feature has no point geometry");
        }

        let properties: BTreeMap<String, Value> =
            raw.properties.unwrap_or_default().into_iter().collect();

        features.push(Feature {
            id: FeatureId(id),
            layer: layer.clone(),
            position,
            properties,
        });
    }

    debug!(%layer, count = features.len(), "decoded GeoJSON features");
    features
}

// Fetch the body as text first so decoding failures surface as `PortError::Decode`.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let body = req
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(serde_json::from_str(&body)?)
}
