//! Registry for all layer plugins and their ports.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{LayerId, LayerMeta};
use crate::ports::{FeaturePort, MapPort, PortError};

/// Collection of ports implementing a provider for a single layer.
pub struct LayerPlugin {
    /// Static metadata describing the layer.
    pub meta: LayerMeta,
    /// Implementation for fetching vector features.
    pub feature_port: Arc<dyn FeaturePort>,
    /// Implementation for rendered map images.
    pub map_port: Arc<dyn MapPort>,
}

/// Registry that resolves plugins by layer identifier.
pub struct LayerRegistry {
    plugins: BTreeMap<LayerId, LayerPlugin>,
}

impl LayerRegistry {
    /// Build a registry from the provided plugin list.
    ///
    /// A later plugin replaces an earlier one with the same layer id.
    #[must_use]
    pub fn new(plugins: Vec<LayerPlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id.clone(), plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Return metadata for all registered layers, ordered by id.
    #[must_use]
    pub fn layers(&self) -> Vec<LayerMeta> {
        self.layers_iter().cloned().collect()
    }

    /// Iterator over layer metadata, ordered by id.
    pub fn layers_iter(&self) -> impl Iterator<Item = &LayerMeta> {
        self.plugins.values().map(|plugin| &plugin.meta)
    }

    /// Look up a plugin for the given layer.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedLayer`] when no plugin is registered.
    pub fn plugin(&self, layer: &LayerId) -> Result<&LayerPlugin, PortError> {
        self.plugins.get(layer).ok_or(PortError::UnsupportedLayer)
    }
}
