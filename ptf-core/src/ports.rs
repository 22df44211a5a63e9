//! Traits describing provider capabilities and shared helper types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use reqwest::Url;
use serde_json::Error as JsonError;

use crate::endpoints::EndpointError;
use crate::model::{Feature, LayerMeta};
use crate::request::BoundingBox;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to provider backends.
pub enum PortError {
    /// Network layer failed or the server answered with an error status.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The response body was not the expected GeoJSON.
    #[error("Decode error: {0}")]
    Decode(#[from] JsonError),
    /// Endpoint configuration could not be turned into a URL.
    #[error("Endpoint error: {0}")]
    Endpoint(#[from] EndpointError),
    /// The layer has no registered plugin.
    #[error("Unsupported layer")]
    UnsupportedLayer,
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
/// Filter for feature requests.
pub struct FeatureQuery {
    /// Only return features inside this extent.
    pub bbox: Option<BoundingBox>,
    /// Return at most this many features.
    pub limit: Option<usize>,
}

impl FeatureQuery {
    /// Query limited to `limit` features.
    #[must_use]
    pub fn limited(limit: usize) -> Self {
        Self {
            bbox: None,
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Extent and pixel size of a rendered map image.
pub struct MapQuery {
    /// Requested extent.
    pub bbox: BoundingBox,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

#[async_trait]
/// Trait for provider-specific vector feature backends.
pub trait FeaturePort: Send + Sync {
    /// Metadata describing the layer handled by this port.
    fn layer(&self) -> &LayerMeta;

    /// Fetch features of the layer.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails or cannot be decoded.
    async fn features(&self, query: FeatureQuery) -> Result<Vec<Feature>, PortError>;
}

/// Trait for provider-specific rendered map backends.
pub trait MapPort: Send + Sync {
    /// Metadata describing the layer handled by this port.
    fn layer(&self) -> &LayerMeta;

    /// URL of an image rendering the layer for the given extent.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the query cannot be expressed for this backend.
    fn map_url(&self, query: &MapQuery) -> Result<Url, PortError>;
}
