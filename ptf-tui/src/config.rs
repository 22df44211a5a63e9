use std::path::PathBuf;

use clap::Parser;
use ptf_core::{
    EndpointError, Endpoints, GEOSERVER_BASE_URL, GEOSERVER_LAYER_NAME, GEOSERVER_WORKSPACE,
    model::Position,
};

const DEFAULT_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_LIMIT: usize = 500;

#[derive(Parser, Debug)]
#[command(
    name = "ptf-tui",
    version,
    about = "Find public toilets published on a GeoServer layer"
)]
pub(crate) struct Cli {
    /// Server origin the GeoServer base path is resolved against
    #[arg(long, env = "PTF_GEOSERVER_ORIGIN", default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// GeoServer base path (empty when mounted at the origin root)
    #[arg(long, env = "PTF_GEOSERVER_BASE", default_value = GEOSERVER_BASE_URL)]
    pub base_path: String,

    /// Workspace holding the layers
    #[arg(long, env = "PTF_GEOSERVER_WORKSPACE", default_value = GEOSERVER_WORKSPACE)]
    pub workspace: String,

    /// Layer to offer; repeat or comma-separate for several
    #[arg(
        long = "layer",
        env = "PTF_GEOSERVER_LAYERS",
        value_delimiter = ',',
        default_value = GEOSERVER_LAYER_NAME
    )]
    pub layers: Vec<String>,

    /// Sort features by distance from LAT,LON
    #[arg(long, env = "PTF_NEAR", value_parser = parse_position, allow_hyphen_values = true)]
    pub near: Option<Position>,

    /// Maximum number of features to load per layer
    #[arg(long, env = "PTF_LIMIT", default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long, env = "PTF_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Print the configured endpoint values and exit
    #[arg(long)]
    pub print_endpoints: bool,
}

impl Cli {
    /// One validated endpoint set per configured layer.
    pub(crate) fn endpoints(&self) -> Result<Vec<Endpoints>, EndpointError> {
        self.layers
            .iter()
            .map(|layer| {
                Endpoints::new(
                    self.base_path.trim(),
                    self.workspace.trim(),
                    layer.trim(),
                )
            })
            .collect()
    }
}

/// Parse `LAT,LON` in decimal degrees.
pub(crate) fn parse_position(input: &str) -> Result<Position, String> {
    let (lat, lon) = input
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got {input:?}"))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|err| format!("invalid latitude {lat:?}: {err}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|err| format!("invalid longitude {lon:?}: {err}"))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {lat} is out of range"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude {lon} is out of range"));
    }
    Ok(Position::new(lon, lat))
}
