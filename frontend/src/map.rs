use seed::{prelude::*, *};
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use shared::{Classification, Coordinate, LocationResult};
use wasm_bindgen::prelude::{JsValue, wasm_bindgen};

use crate::results::ResultStore;

pub const MAP_CONTAINER_ID: &str = "map";
pub const DEFAULT_ZOOM: u8 = 15;

#[wasm_bindgen(module = "/leaflet_map.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map_js(container_id: &str, center: JsValue, zoom: u8);
    #[wasm_bindgen(js_name = renderMarkers)]
    fn render_markers_js(markers: JsValue, center: JsValue);
    #[wasm_bindgen(js_name = focusMarker)]
    fn focus_marker_js(kind: &str, index: u32);
}

/// Everything the JS side needs to draw one marker and its popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub kind: Classification,
    pub index: usize,
    pub lat: f64,
    pub lon: f64,
    pub color: &'static str,
    pub title: &'static str,
    pub bullets: Vec<String>,
    pub link: String,
}

impl MarkerSpec {
    fn new(kind: Classification, index: usize, entry: &LocationResult) -> Self {
        Self {
            kind,
            index,
            lat: entry.lat,
            lon: entry.lon,
            color: kind.marker_color(),
            title: kind.title(),
            bullets: shared::reason_bullets(&entry.reason)
                .into_iter()
                .map(str::to_string)
                .collect(),
            link: shared::external_map_link(entry.coordinate()),
        }
    }
}

pub fn markers(store: &ResultStore) -> Vec<MarkerSpec> {
    [Classification::Good, Classification::Danger]
        .into_iter()
        .flat_map(|kind| {
            store
                .entries(kind)
                .iter()
                .enumerate()
                .map(move |(index, entry)| MarkerSpec::new(kind, index, entry))
        })
        .collect()
}

pub fn init(store: &ResultStore) {
    if let Ok(center) = to_value(&store.center()) {
        init_map_js(MAP_CONTAINER_ID, center, DEFAULT_ZOOM);
    }
    render(store);
}

/// Replaces every marker and recenters the map.
pub fn render(store: &ResultStore) {
    let center: Coordinate = store.center();
    match (to_value(&markers(store)), to_value(&center)) {
        (Ok(markers), Ok(center)) => render_markers_js(markers, center),
        (Err(err), _) | (_, Err(err)) => web_sys::console::error_1(
            &format!("[frontend] could not hand markers to the map: {err}").into(),
        ),
    }
}

pub fn focus(kind: Classification, index: usize) {
    focus_marker_js(kind.as_str(), index as u32);
}
