//! Core types and service wiring for the ptf public toilet finder.

/// Compile-time GeoServer endpoint registry.
pub mod endpoints;
/// Domain models and identifiers shared by all providers.
pub mod model;
/// Registry for plugging layer providers into the service.
pub mod plugin;
/// Traits describing the provider interfaces.
pub mod ports;
/// WMS and WFS request builders.
pub mod request;
/// High-level service facade used by clients.
pub mod service;

pub use endpoints::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use request::*;
pub use service::*;
