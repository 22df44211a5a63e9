use std::sync::Arc;

use ptf_core::{
    model::{Feature, LayerId, LayerMeta, Position},
    ports::{FeatureQuery, MapQuery},
    request::BoundingBox,
    service::PtfService,
};

/// Radius of the map image shown for a single feature.
const DETAIL_RADIUS_M: f64 = 250.0;
const DETAIL_IMAGE_SIZE: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    LayerSelect,
    FeatureList,
    FeatureDetail,
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub feature: Feature,
    pub label: String,
    pub distance_m: Option<f64>,
}

impl Entry {
    pub(crate) fn new(feature: Feature, distance_m: Option<f64>) -> Self {
        let label = feature.label();
        Self {
            feature,
            label,
            distance_m,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.label.to_lowercase().contains(needle)
            || self.feature.properties.values().any(|value| {
                value
                    .as_str()
                    .is_some_and(|text| text.to_lowercase().contains(needle))
            })
    }
}

pub(crate) struct App {
    pub service: Arc<PtfService>,
    pub near: Option<Position>,
    pub limit: usize,

    pub screen: Screen,
    pub layers: Vec<LayerMeta>,
    pub layer_list_index: usize,
    pub selected_layer: Option<LayerId>,

    pub filter_input: String,
    pub entries: Vec<Entry>,
    pub entry_list_index: usize,
    pub selected_entry: Option<Entry>,
    pub map_url: Option<String>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<PtfService>, near: Option<Position>, limit: usize) -> Self {
        let layers = service.layers();
        Self {
            service,
            near,
            limit,
            screen: Screen::LayerSelect,
            layers,
            layer_list_index: 0,
            selected_layer: None,
            filter_input: String::new(),
            entries: Vec::new(),
            entry_list_index: 0,
            selected_entry: None,
            map_url: None,
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn query(&self) -> FeatureQuery {
        FeatureQuery::limited(self.limit)
    }

    pub(crate) fn select_current_layer(&mut self) -> Option<LayerId> {
        let layer = self.layers.get(self.layer_list_index)?.id.clone();
        self.selected_layer = Some(layer.clone());
        self.screen = Screen::FeatureList;
        self.filter_input.clear();
        self.entries.clear();
        self.entry_list_index = 0;
        Some(layer)
    }

    pub(crate) fn back_to_layers(&mut self) {
        self.screen = Screen::LayerSelect;
        self.entries.clear();
        self.entry_list_index = 0;
        self.filter_input.clear();
    }

    pub(crate) fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        self.entry_list_index = 0;
        self.selected_entry = None;
    }

    /// Entries matching the filter text, in load order.
    pub(crate) fn visible_entries(&self) -> Vec<&Entry> {
        let needle = self.filter_input.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.matches(&needle))
            .collect()
    }

    pub(crate) fn select_current_entry(&mut self) -> Option<Entry> {
        let entry = self
            .visible_entries()
            .get(self.entry_list_index)
            .map(|entry| (*entry).clone())?;

        self.map_url = None;
        if let (Some(layer), Some(position)) = (&self.selected_layer, entry.feature.position) {
            let query = MapQuery {
                bbox: BoundingBox::around(position, DETAIL_RADIUS_M),
                width: DETAIL_IMAGE_SIZE,
                height: DETAIL_IMAGE_SIZE,
            };
            match self.service.map_url(layer, &query) {
                Ok(url) => self.map_url = Some(url.to_string()),
                Err(err) => self.error_message = Some(format!("No map image: {err}")),
            }
        }

        self.selected_entry = Some(entry.clone());
        self.screen = Screen::FeatureDetail;
        Some(entry)
    }
}
