//! Named GeoServer endpoints for the public toilet layer.
//!
//! The three primary values are literal macros, so the derived paths are
//! assembled by `concat!` at compile time and cannot drift from their inputs.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use reqwest::Url;

macro_rules! base_path {
    () => {
        "/geoserver"
    };
}

macro_rules! workspace {
    () => {
        "ptf"
    };
}

macro_rules! layer_name {
    () => {
        "toilets_kiel"
    };
}

/// Root path of the GeoServer instance, relative to the serving origin.
pub const GEOSERVER_BASE_URL: &str = base_path!();
/// Workspace grouping the ptf layers.
pub const GEOSERVER_WORKSPACE: &str = workspace!();
/// Layer holding the public toilets of Kiel.
pub const GEOSERVER_LAYER_NAME: &str = layer_name!();
/// WMS endpoint of the workspace.
pub const GEOSERVER_WMS_URL: &str = concat!(base_path!(), "/", workspace!(), "/wms");
/// WFS endpoint of the workspace.
pub const GEOSERVER_WFS_URL: &str = concat!(base_path!(), "/", workspace!(), "/wfs");
/// Workspace-qualified feature type name of the layer.
pub const GEOSERVER_TYPENAME: &str = concat!(workspace!(), ":", layer_name!());

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised while building or resolving endpoints.
pub enum EndpointError {
    /// Base path is not an absolute path without trailing slash.
    #[error("Invalid base path {0:?}")]
    InvalidBasePath(String),
    /// Workspace or layer contains characters that are not URL-safe.
    #[error("Invalid {field} {value:?}: only ASCII letters, digits, '_', '-' and '.' are allowed")]
    InvalidSegment {
        /// Which primary value was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// Server origin could not be combined with an endpoint path.
    #[error("Invalid server origin {origin:?}: {reason}")]
    InvalidOrigin {
        /// Origin as configured.
        origin: String,
        /// Why it was rejected.
        reason: String,
    },
    /// No endpoint is registered under the given name.
    #[error("Unknown endpoint name: {0}")]
    UnknownName(String),
}

/// Names of the six registry values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointName {
    /// [`GEOSERVER_BASE_URL`].
    BaseUrl,
    /// [`GEOSERVER_WORKSPACE`].
    Workspace,
    /// [`GEOSERVER_LAYER_NAME`].
    LayerName,
    /// [`GEOSERVER_WMS_URL`].
    WmsUrl,
    /// [`GEOSERVER_WFS_URL`].
    WfsUrl,
    /// [`GEOSERVER_TYPENAME`].
    TypeName,
}

impl EndpointName {
    /// Every name, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::BaseUrl,
        Self::Workspace,
        Self::LayerName,
        Self::WmsUrl,
        Self::WfsUrl,
        Self::TypeName,
    ];

    /// Constant name the value is exported under.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::BaseUrl => "GEOSERVER_BASE_URL",
            Self::Workspace => "GEOSERVER_WORKSPACE",
            Self::LayerName => "GEOSERVER_LAYER_NAME",
            Self::WmsUrl => "GEOSERVER_WMS_URL",
            Self::WfsUrl => "GEOSERVER_WFS_URL",
            Self::TypeName => "GEOSERVER_TYPENAME",
        }
    }

    /// Compile-time value registered under this name.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::BaseUrl => GEOSERVER_BASE_URL,
            Self::Workspace => GEOSERVER_WORKSPACE,
            Self::LayerName => GEOSERVER_LAYER_NAME,
            Self::WmsUrl => GEOSERVER_WMS_URL,
            Self::WfsUrl => GEOSERVER_WFS_URL,
            Self::TypeName => GEOSERVER_TYPENAME,
        }
    }
}

impl fmt::Display for EndpointName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.key())
    }
}

impl FromStr for EndpointName {
    type Err = EndpointError;

    /// Accepts the constant name with or without the `GEOSERVER_` prefix, in any case.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let wanted = input.trim();
        Self::ALL
            .into_iter()
            .find(|name| {
                let key = name.key();
                key.eq_ignore_ascii_case(wanted)
                    || key
                        .strip_prefix("GEOSERVER_")
                        .is_some_and(|short| short.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| EndpointError::UnknownName(input.to_owned()))
    }
}

/// Primary endpoint values with the derived paths computed on demand.
///
/// Derived values are methods rather than fields, so they always follow the
/// base path, workspace and layer they were built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoints {
    base_path: Cow<'static, str>,
    workspace: Cow<'static, str>,
    layer: Cow<'static, str>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base_path: Cow::Borrowed(GEOSERVER_BASE_URL),
            workspace: Cow::Borrowed(GEOSERVER_WORKSPACE),
            layer: Cow::Borrowed(GEOSERVER_LAYER_NAME),
        }
    }
}

impl Endpoints {
    /// Build a validated set of endpoints.
    ///
    /// An empty base path means GeoServer is mounted at the origin root.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidBasePath`] or [`EndpointError::InvalidSegment`]
    /// when a value would produce a malformed URL.
    pub fn new<B, W, L>(base_path: B, workspace: W, layer: L) -> Result<Self, EndpointError>
    where
        B: Into<String>,
        W: Into<String>,
        L: Into<String>,
    {
        let base_path = validate_base_path(base_path.into())?;
        let workspace = validate_segment("workspace", workspace.into())?;
        let layer = validate_segment("layer", layer.into())?;
        Ok(Self {
            base_path: Cow::Owned(base_path),
            workspace: Cow::Owned(workspace),
            layer: Cow::Owned(layer),
        })
    }

    /// Same base path and workspace, different layer.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidSegment`] when the layer name is not URL-safe.
    pub fn with_layer<L: Into<String>>(&self, layer: L) -> Result<Self, EndpointError> {
        let layer = validate_segment("layer", layer.into())?;
        Ok(Self {
            base_path: self.base_path.clone(),
            workspace: self.workspace.clone(),
            layer: Cow::Owned(layer),
        })
    }

    /// Root path of the GeoServer instance.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Workspace identifier.
    #[must_use]
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Layer identifier.
    #[must_use]
    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// `{base}/{workspace}/wms`
    #[must_use]
    pub fn wms_path(&self) -> String {
        format!("{}/{}/wms", self.base_path, self.workspace)
    }

    /// `{base}/{workspace}/wfs`
    #[must_use]
    pub fn wfs_path(&self) -> String {
        format!("{}/{}/wfs", self.base_path, self.workspace)
    }

    /// `{workspace}:{layer}`
    #[must_use]
    pub fn type_name(&self) -> String {
        format!("{}:{}", self.workspace, self.layer)
    }

    /// Value registered under `name` for this set of endpoints.
    #[must_use]
    pub fn get(&self, name: EndpointName) -> Cow<'_, str> {
        match name {
            EndpointName::BaseUrl => Cow::Borrowed(self.base_path()),
            EndpointName::Workspace => Cow::Borrowed(self.workspace()),
            EndpointName::LayerName => Cow::Borrowed(self.layer()),
            EndpointName::WmsUrl => Cow::Owned(self.wms_path()),
            EndpointName::WfsUrl => Cow::Owned(self.wfs_path()),
            EndpointName::TypeName => Cow::Owned(self.type_name()),
        }
    }

    /// Absolute WMS URL on the given server origin.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidOrigin`] when the origin is not an http(s) URL.
    pub fn wms_url(&self, origin: &str) -> Result<Url, EndpointError> {
        resolve(origin, &self.wms_path())
    }

    /// Absolute WFS URL on the given server origin.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidOrigin`] when the origin is not an http(s) URL.
    pub fn wfs_url(&self, origin: &str) -> Result<Url, EndpointError> {
        resolve(origin, &self.wfs_path())
    }
}

fn validate_base_path(value: String) -> Result<String, EndpointError> {
    if value.is_empty() {
        return Ok(value);
    }
    let well_formed = value.starts_with('/')
        && !value.ends_with('/')
        && !value
            .chars()
            .any(|ch| ch.is_whitespace() || ch == '?' || ch == '#');
    if well_formed {
        Ok(value)
    } else {
        Err(EndpointError::InvalidBasePath(value))
    }
}

fn validate_segment(field: &'static str, value: String) -> Result<String, EndpointError> {
    let well_formed = !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));
    if well_formed {
        Ok(value)
    } else {
        Err(EndpointError::InvalidSegment { field, value })
    }
}

// Plain concatenation keeps any path prefix on the origin, which `Url::join` would drop.
fn resolve(origin: &str, path: &str) -> Result<Url, EndpointError> {
    let invalid = |reason: String| EndpointError::InvalidOrigin {
        origin: origin.to_owned(),
        reason,
    };

    let trimmed = origin.trim().trim_end_matches('/');
    let base = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;

    if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
        return Err(invalid("expected an http or https origin".to_owned()));
    }
    if base.host_str().is_none_or(str::is_empty) {
        return Err(invalid("origin has no host".to_owned()));
    }
    if base.query().is_some() || base.fragment().is_some() {
        return Err(invalid("origin must not carry a query or fragment".to_owned()));
    }

    let prefix = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{prefix}{path}")).map_err(|err| invalid(err.to_string()))
}
