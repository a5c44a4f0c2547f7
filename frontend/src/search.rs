use seed::{prelude::*, *};
use shared::{
    Coordinate, InfraCategory, LocationResult, MIN_QUERY_CHARS, RecommendParams,
    RecommendResponse, SearchRadius, SuggestionItem,
};

use crate::{Msg, api::ApiError, bool_attr};

pub const MISSING_LOCATION_ALERT: &str = "Please select a location from suggestions!";
pub const SUGGESTIONS_UNAVAILABLE: &str = "Suggestions are unavailable right now.";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Suggesting,
    Selected,
    Searching,
}

impl Phase {
    /// Modifier class of the search bar.
    pub fn class(self) -> &'static str {
        match self {
            Phase::Idle => "search-bar--idle",
            Phase::Suggesting => "search-bar--suggesting",
            Phase::Selected => "search-bar--selected",
            Phase::Searching => "search-bar--searching",
        }
    }
}

/// Side effects requested by the search bar; the shell performs them.
#[derive(Debug, PartialEq)]
pub enum Command {
    FetchSuggestions { seq: u64, query: String },
    FetchRecommendations(RecommendParams),
    Alert(&'static str),
}

#[derive(Default)]
pub struct SearchControl {
    query: String,
    selected: Option<Coordinate>,
    infra: InfraCategory,
    radius: SearchRadius,
    suggestions: Vec<SuggestionItem>,
    notice: Option<String>,
    loading: bool,
    // Sequence number of the newest autocomplete request; older answers are stale.
    latest_seq: u64,
}

impl SearchControl {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> Option<Coordinate> {
        self.selected
    }

    pub fn infra(&self) -> InfraCategory {
        self.infra
    }

    pub fn radius(&self) -> SearchRadius {
        self.radius
    }

    pub fn suggestions(&self) -> &[SuggestionItem] {
        &self.suggestions
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Searching
        } else if self.selected.is_some() {
            Phase::Selected
        } else if self.query.chars().count() >= MIN_QUERY_CHARS {
            Phase::Suggesting
        } else {
            Phase::Idle
        }
    }

    pub fn input_changed(&mut self, text: String) -> Option<Command> {
        if self.loading {
            return None;
        }
        self.query = text;
        self.selected = None;
        self.notice = None;
        self.latest_seq += 1;

        if self.query.chars().count() < MIN_QUERY_CHARS {
            self.suggestions.clear();
            return None;
        }
        Some(Command::FetchSuggestions {
            seq: self.latest_seq,
            query: self.query.clone(),
        })
    }

    /// Returns whether the response was applied.
    pub fn suggestions_received(
        &mut self,
        seq: u64,
        result: Result<Vec<SuggestionItem>, ApiError>,
    ) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        match result {
            Ok(items) => {
                self.suggestions = items;
                self.notice = None;
            }
            Err(_) => {
                self.suggestions.clear();
                self.notice = Some(SUGGESTIONS_UNAVAILABLE.to_string());
            }
        }
        true
    }

    pub fn choose(&mut self, index: usize) -> bool {
        if self.loading {
            return false;
        }
        let Some(item) = self.suggestions.get(index).cloned() else {
            return false;
        };
        self.query = item.display_name.clone();
        self.selected = Some(item.coordinate());
        self.suggestions.clear();
        self.notice = None;
        // Answers still in flight would reopen the dropdown.
        self.latest_seq += 1;
        true
    }

    pub fn set_infra(&mut self, infra: InfraCategory) {
        if !self.loading {
            self.infra = infra;
        }
    }

    pub fn set_radius(&mut self, radius: SearchRadius) {
        if !self.loading {
            self.radius = radius;
        }
    }

    pub fn submit(&mut self) -> Option<Command> {
        if self.loading {
            return None;
        }
        let Some(coordinate) = self.selected else {
            return Some(Command::Alert(MISSING_LOCATION_ALERT));
        };
        self.loading = true;
        Some(Command::FetchRecommendations(RecommendParams {
            place: self.query.clone(),
            infra: self.infra,
            radius: self.radius,
            coordinate: Some(coordinate),
        }))
    }

    pub fn search_finished(
        &mut self,
        result: Result<RecommendResponse, ApiError>,
    ) -> Result<(Vec<LocationResult>, Vec<LocationResult>), ApiError> {
        self.loading = false;
        result.map(|response| (response.good, response.danger))
    }
}

pub fn view(control: &SearchControl) -> Node<Msg> {
    let phase = control.phase();
    let loading = phase == Phase::Searching;

    let infra_options = InfraCategory::ALL.into_iter().map(|infra| {
        option![
            attrs! {
                At::Value => infra.as_str(),
                At::Selected => bool_attr(infra == control.infra()),
            },
            infra.label(),
        ]
    });
    let radius_options = SearchRadius::ALL.into_iter().map(|radius| {
        option![
            attrs! {
                At::Value => radius.meters().to_string(),
                At::Selected => bool_attr(radius == control.radius()),
            },
            radius.label(),
        ]
    });

    div![
        C!["search-bar", phase.class()],
        div![
            C!["search-row"],
            div![
                C!["search-box"],
                input![
                    attrs! {
                        At::Value => control.query(),
                        At::Placeholder => "Search area…",
                        At::AutoComplete => "off",
                        At::SpellCheck => "false",
                        At::Disabled => bool_attr(loading),
                    },
                    input_ev(Ev::Input, Msg::QueryChanged),
                ],
                view_suggestions(control),
                if let Some(notice) = control.notice() {
                    small![C!["search-notice"], notice]
                } else {
                    empty![]
                },
            ],
            select![
                C!["infra-select"],
                attrs! { At::Disabled => bool_attr(loading) },
                infra_options,
                input_ev(Ev::Change, Msg::InfraChanged),
            ],
            select![
                C!["radius-select"],
                attrs! { At::Disabled => bool_attr(loading) },
                radius_options,
                input_ev(Ev::Change, Msg::RadiusChanged),
            ],
            button![
                C!["search-button"],
                if loading { "Searching..." } else { "Search" },
                attrs! { At::Disabled => bool_attr(loading) },
                ev(Ev::Click, |event| {
                    event.prevent_default();
                    Msg::Submit
                }),
            ],
        ],
        IF!(loading => div![C!["search-progress"], "🔍 Analyzing location..."]),
    ]
}

fn view_suggestions(control: &SearchControl) -> Node<Msg> {
    if control.is_loading() || control.suggestions().is_empty() {
        return empty![];
    }
    div![
        C!["suggestions"],
        control
            .suggestions()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                div![
                    C!["suggestion"],
                    item.display_name.as_str(),
                    ev(Ev::Click, move |_| Msg::SuggestionChosen(index)),
                ]
            }),
    ]
}
