//! High-level service facade combining all layer providers.

use std::sync::Arc;

use reqwest::Url;
use tracing::debug;

use crate::model::{Feature, LayerId, LayerMeta, Position};
use crate::plugin::LayerRegistry;
use crate::ports::{FeatureQuery, MapQuery, PortError};

/// Public entry point for loading features and map images.
pub struct PtfService {
    registry: Arc<LayerRegistry>,
}

impl PtfService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<LayerRegistry>) -> Self {
        Self { registry }
    }

    /// List all available layers.
    #[must_use]
    pub fn layers(&self) -> Vec<LayerMeta> {
        self.registry.layers()
    }

    /// Load features of the given layer.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the layer is unsupported or the provider call fails.
    pub async fn features(
        &self,
        layer: &LayerId,
        query: FeatureQuery,
    ) -> Result<Vec<Feature>, PortError> {
        let plugin = self.registry.plugin(layer)?;
        let features = plugin.feature_port.features(query).await?;
        debug!(%layer, count = features.len(), "loaded features");
        Ok(features)
    }

    /// Load features of the given layer, closest to `from` first, with their distance in metres.
    ///
    /// Features without a position are left out.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the layer is unsupported or the provider call fails.
    pub async fn nearest(
        &self,
        layer: &LayerId,
        from: Position,
        query: FeatureQuery,
    ) -> Result<Vec<(Feature, f64)>, PortError> {
        let features = self.features(layer, query).await?;
        let mut ranked: Vec<(Feature, f64)> = features
            .into_iter()
            .filter_map(|feature| {
                let distance = feature.position?.distance_to(&from);
                Some((feature, distance))
            })
            .collect();
        ranked.sort_by(|(_, left), (_, right)| left.total_cmp(right));
        Ok(ranked)
    }

    /// URL of a rendered map image of the layer.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the layer is unsupported or the query is rejected.
    pub fn map_url(&self, layer: &LayerId, query: &MapQuery) -> Result<Url, PortError> {
        let plugin = self.registry.plugin(layer)?;
        plugin.map_port.map_url(query)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use super::*;
    use crate::model::FeatureId;
    use crate::plugin::LayerPlugin;
    use crate::ports::{FeaturePort, MapPort};
    use crate::request::{BoundingBox, GetMapRequest};

    struct FakeFeatures {
        meta: LayerMeta,
        features: Vec<Feature>,
    }

    #[async_trait]
    impl FeaturePort for FakeFeatures {
        fn layer(&self) -> &LayerMeta {
            &self.meta
        }

        async fn features(&self, query: FeatureQuery) -> Result<Vec<Feature>, PortError> {
            let limit = query.limit.unwrap_or(usize::MAX);
            Ok(self.features.iter().take(limit).cloned().collect())
        }
    }

    struct FakeMap {
        meta: LayerMeta,
    }

    impl MapPort for FakeMap {
        fn layer(&self) -> &LayerMeta {
            &self.meta
        }

        fn map_url(&self, query: &MapQuery) -> Result<Url, PortError> {
            let endpoint = Url::parse("http://localhost:8080/geoserver/ptf/wms")
                .map_err(|err| PortError::Internal(err.to_string()))?;
            Ok(GetMapRequest::new(self.meta.type_name.clone(), query.bbox, query.width, query.height)
                .to_url(&endpoint))
        }
    }

    fn meta() -> LayerMeta {
        LayerMeta {
            id: LayerId("ptf:toilets_kiel".to_owned()),
            title: "toilets_kiel".to_owned(),
            type_name: "ptf:toilets_kiel".to_owned(),
        }
    }

    fn feature(id: &str, position: Option<Position>) -> Feature {
        Feature {
            id: FeatureId(id.to_owned()),
            layer: meta().id,
            position,
            properties: BTreeMap::new(),
        }
    }

    fn service() -> PtfService {
        let features = vec![
            feature("far", Some(Position::new(10.20, 54.35))),
            feature("nowhere", None),
            feature("near", Some(Position::new(10.14, 54.32))),
        ];
        let plugin = LayerPlugin {
            meta: meta(),
            feature_port: Arc::new(FakeFeatures {
                meta: meta(),
                features,
            }),
            map_port: Arc::new(FakeMap { meta: meta() }),
        };
        PtfService::new(Arc::new(LayerRegistry::new(vec![plugin])))
    }

    #[test]
    fn lists_registered_layers() {
        let layers = service().layers();
        assert_eq!(layers, vec![meta()]);
    }

    #[tokio::test]
    async fn features_respect_limit() {
        let features = service()
            .features(&meta().id, FeatureQuery::limited(2))
            .await
            .expect("features");
        assert_eq!(features.len(), 2);
    }

    #[tokio::test]
    async fn nearest_sorts_by_distance_and_drops_unlocated() {
        let from = Position::new(10.1365, 54.3233);
        let ranked = service()
            .nearest(&meta().id, from, FeatureQuery::default())
            .await
            .expect("features");

        let ids: Vec<&str> = ranked.iter().map(|(feature, _)| feature.id.0.as_str()).collect();
        assert_eq!(ids, ["near", "far"]);
        assert!(ranked.windows(2).all(|pair| match pair {
            [first, second] => first.1 <= second.1,
            _ => false,
        }));
    }

    #[tokio::test]
    async fn unknown_layer_is_rejected() {
        let result = service()
            .features(&LayerId("ptf:benches".to_owned()), FeatureQuery::default())
            .await;
        assert!(matches!(result, Err(PortError::UnsupportedLayer)));
    }

    #[test]
    fn map_url_is_delegated() {
        let center = Position::new(10.1365, 54.3233);
        let query = MapQuery {
            bbox: BoundingBox::around(center, 250.0),
            width: 256,
            height: 256,
        };
        let url = service().map_url(&meta().id, &query).expect("map url");
        assert_eq!(url.path(), "/geoserver/ptf/wms");
        assert!(url.query_pairs().any(|(key, value)| key == "LAYERS" && value == "ptf:toilets_kiel"));
    }
}
