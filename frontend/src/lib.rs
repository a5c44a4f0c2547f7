use seed::{prelude::*, virtual_dom::AtValue, *};
use serde::Deserialize;
use shared::{
    Classification, InfraCategory, LocationResult, RecommendParams, RecommendResponse,
    SearchRadius, SuggestionItem,
};
use wasm_bindgen::{JsCast, prelude::wasm_bindgen};

pub mod api;
pub mod map;
pub mod results;
pub mod search;

use api::ApiError;
use results::ResultStore;
use search::{Command, SearchControl};

const SEARCH_FAILED_ALERT: &str = "Failed to fetch recommendations.";

pub struct Model {
    search: SearchControl,
    results: ResultStore,
    focused: Option<(Classification, usize)>,
    // Backend `error` message of the last completed search, shown inline.
    backend_note: Option<String>,
    // Dropping the handle aborts the autocomplete request it belongs to.
    autocomplete: Option<CmdHandle>,
}

pub enum Msg {
    QueryChanged(String),
    SuggestionsFetched {
        seq: u64,
        result: Result<Vec<SuggestionItem>, ApiError>,
    },
    SuggestionChosen(usize),
    InfraChanged(String),
    RadiusChanged(String),
    Submit,
    RecommendationsFetched(Result<RecommendResponse, ApiError>),
    MarkerClicked { kind: Classification, index: usize },
    EntryFocused { kind: Classification, index: usize },
    DetailClosed,
}

pub fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    orders.stream(streams::window_event(Ev::from("marker-click"), |event| {
        let event = event.dyn_into::<web_sys::CustomEvent>().ok()?;
        let payload: MarkerClickPayload = serde_wasm_bindgen::from_value(event.detail()).ok()?;
        Some(Msg::MarkerClicked {
            kind: payload.kind,
            index: payload.index,
        })
    }));

    let model = Model {
        search: SearchControl::default(),
        results: ResultStore::default(),
        focused: None,
        backend_note: None,
        autocomplete: None,
    };
    map::init(&model.results);
    model
}

pub fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::QueryChanged(text) => {
            model.autocomplete = None;
            if let Some(command) = model.search.input_changed(text) {
                run(command, model, orders);
            }
        }
        Msg::SuggestionsFetched { seq, result } => {
            let failure = result.as_ref().err().map(ToString::to_string);
            if !model.search.suggestions_received(seq, result) {
                web_sys::console::debug_1(
                    &format!("[frontend] dropped stale suggestions seq={seq}").into(),
                );
            } else if let Some(err) = failure {
                web_sys::console::error_1(&format!("[frontend] autocomplete failed: {err}").into());
            }
        }
        Msg::SuggestionChosen(index) => {
            if model.search.choose(index) {
                model.autocomplete = None;
            }
        }
        Msg::InfraChanged(value) => match value.parse::<InfraCategory>() {
            Ok(infra) => model.search.set_infra(infra),
            Err(err) => web_sys::console::error_1(&format!("[frontend] {err}").into()),
        },
        Msg::RadiusChanged(value) => match value.parse::<SearchRadius>() {
            Ok(radius) => model.search.set_radius(radius),
            Err(err) => web_sys::console::error_1(&format!("[frontend] {err}").into()),
        },
        Msg::Submit => {
            if let Some(command) = model.search.submit() {
                run(command, model, orders);
            }
        }
        Msg::RecommendationsFetched(result) => {
            let note = result
                .as_ref()
                .ok()
                .and_then(api::backend_note)
                .map(str::to_string);
            apply_search_outcome(model, result, note);
        }
        Msg::MarkerClicked { kind, index } => {
            if model.results.entry(kind, index).is_some() {
                model.focused = Some((kind, index));
            }
        }
        Msg::EntryFocused { kind, index } => {
            if model.results.entry(kind, index).is_some() {
                model.focused = Some((kind, index));
                map::focus(kind, index);
            }
        }
        Msg::DetailClosed => model.focused = None,
    }
}

fn apply_search_outcome(
    model: &mut Model,
    result: Result<RecommendResponse, ApiError>,
    note: Option<String>,
) {
    match model.search.search_finished(result) {
        Ok((good, danger)) => {
            web_sys::console::debug_1(
                &format!(
                    "[frontend] received {} recommended / {} danger locations",
                    good.len(),
                    danger.len()
                )
                .into(),
            );
            model.results.replace(good, danger);
            model.backend_note = note;
            model.focused = None;
            map::render(&model.results);
        }
        Err(err) => {
            web_sys::console::error_1(
                &format!("[frontend] recommendation request failed: {err}").into(),
            );
            alert(SEARCH_FAILED_ALERT);
        }
    }
}

fn run(command: Command, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match command {
        Command::FetchSuggestions { seq, query } => {
            model.autocomplete = Some(orders.perform_cmd_with_handle(fetch_suggestions(seq, query)));
        }
        Command::FetchRecommendations(params) => {
            orders.perform_cmd(fetch_recommendations(params));
        }
        Command::Alert(message) => alert(message),
    }
}

async fn fetch_suggestions(seq: u64, query: String) -> Msg {
    Msg::SuggestionsFetched {
        seq,
        result: api::autocomplete(query).await,
    }
}

async fn fetch_recommendations(params: RecommendParams) -> Msg {
    web_sys::console::debug_1(
        &format!(
            "[frontend] sending recommend request infra={} radius={} place={:?}",
            params.infra,
            params.radius.meters(),
            params.place
        )
        .into(),
    );
    Msg::RecommendationsFetched(api::recommend(params).await)
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        if window.alert_with_message(message).is_err() {
            web_sys::console::error_1(&format!("[frontend] alert failed: {message}").into());
        }
    }
}

pub fn view(model: &Model) -> Node<Msg> {
    div![
        C!["app-container"],
        header![C!["app-header"], h1!["Ooru Dev"], search::view(&model.search)],
        view_results(model),
    ]
}

fn view_results(model: &Model) -> Node<Msg> {
    let results = &model.results;
    if results.version() == 0 {
        return div![
            C!["results-panel"],
            h2!["Waiting for a search"],
            p!["Pick a suggested location and search to see recommendations."]
        ];
    }
    if results.is_empty() {
        return div![
            C!["results-panel"],
            h2!["No locations found"],
            if let Some(note) = &model.backend_note {
                p![C!["backend-note"], note.as_str()]
            } else {
                empty![]
            },
            p!["Try another infrastructure type or a wider radius."]
        ];
    }

    let detail = model
        .focused
        .and_then(|(kind, index)| results.entry(kind, index).map(|entry| view_detail(kind, entry)))
        .unwrap_or_else(|| empty![]);

    div![
        C!["results-panel"],
        view_result_group(results, Classification::Good, model.focused),
        view_result_group(results, Classification::Danger, model.focused),
        detail,
    ]
}

fn view_result_group(
    results: &ResultStore,
    kind: Classification,
    focused: Option<(Classification, usize)>,
) -> Node<Msg> {
    let entries = results.entries(kind);
    let items = entries.iter().enumerate().map(|(index, entry)| {
        let summary = shared::reason_bullets(&entry.reason)
            .first()
            .copied()
            .unwrap_or_default()
            .to_string();
        li![
            C![
                "result-entry",
                IF!(focused == Some((kind, index)) => "result-entry--focused")
            ],
            strong![format!("{:.4} / {:.4}", entry.lat, entry.lon)],
            small![summary],
            ev(Ev::Click, move |_| Msg::EntryFocused { kind, index }),
        ]
    });

    section![
        C!["result-group", format!("result-group--{}", kind.as_str())],
        h3![format!("{} ({})", group_heading(kind), entries.len())],
        ul![items],
    ]
}

fn view_detail(kind: Classification, entry: &LocationResult) -> Node<Msg> {
    let bullets = shared::reason_bullets(&entry.reason)
        .into_iter()
        .map(|bullet| li![bullet]);

    div![
        C!["detail-card", format!("detail-card--{}", kind.as_str())],
        div![C!["detail-card__title"], kind.title()],
        score_line(entry)
            .map(|line| p![C!["detail-card__score"], line])
            .unwrap_or_else(|| empty![]),
        ul![bullets],
        a![
            attrs! {
                At::Href => shared::external_map_link(entry.coordinate()),
                At::Target => "_blank",
                At::Rel => "noopener noreferrer",
            },
            "Open in Google Maps"
        ],
        button![
            C!["detail-card__close"],
            "Close",
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::DetailClosed
            }),
        ],
    ]
}

fn group_heading(kind: Classification) -> &'static str {
    match kind {
        Classification::Good => "Recommended",
        Classification::Danger => "Danger zones",
    }
}

fn score_line(entry: &LocationResult) -> Option<String> {
    match (entry.rank, entry.score) {
        (Some(rank), Some(score)) => Some(format!("Rank {rank} · Score {score:.0}/100")),
        (None, Some(score)) => Some(format!("Score {score:.0}/100")),
        (Some(rank), None) => Some(format!("Rank {rank}")),
        (None, None) => None,
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    App::start("app", init, update, view);
}

pub(crate) fn bool_attr(value: bool) -> AtValue {
    if value {
        AtValue::Some("true".into())
    } else {
        AtValue::Ignored
    }
}

#[derive(Deserialize)]
struct MarkerClickPayload {
    kind: Classification,
    index: usize,
}
