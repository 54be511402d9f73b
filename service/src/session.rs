//! UI session state machine.
//!
//! The campaign frontend keeps one session value and transitions it through
//! a pure reducer, so every state change is unit-testable without a rendered
//! UI. The phase enum makes "at most one of {result, suggestions, error}"
//! structural rather than a convention.

use serde::Serialize;

use crate::resolver::Resolution;
use crate::roster::{Mp, ResolvedMp};

/// Where the search flow currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "phase")]
pub enum SearchPhase {
    Idle,
    Searching,
    Resolved { mp: ResolvedMp },
    Suggestions { suggestions: Vec<Mp> },
    Failed { message: String },
}

/// One user session. Drawer and lightbox are orthogonal to the search flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub query: String,
    #[serde(flatten)]
    pub search: SearchPhase,
    pub drawer_open: bool,
    /// Image path shown in the lightbox, if any.
    pub lightbox: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            query: String::new(),
            search: SearchPhase::Idle,
            drawer_open: false,
            lightbox: None,
        }
    }
}

/// Discrete UI events driving the reducer.
#[derive(Debug, Clone)]
pub enum Action {
    SubmitSearch(String),
    ResolverSucceeded(Resolution),
    ResolverFailed(String),
    /// Picking from the suggestion list resolves directly, no new lookup.
    SelectSuggestion(Mp),
    OpenDrawer,
    CloseDrawer,
    ShowLightbox(String),
    CloseLightbox,
}

/// Apply one action to the session.
#[must_use]
pub fn reduce(mut state: SessionState, action: Action) -> SessionState {
    match action {
        Action::SubmitSearch(query) => {
            state.query = query;
            state.search = SearchPhase::Searching;
        }
        Action::ResolverSucceeded(Resolution::Match(mp)) => {
            state.search = SearchPhase::Resolved { mp };
        }
        Action::ResolverSucceeded(Resolution::Suggestions(suggestions)) => {
            state.search = SearchPhase::Suggestions { suggestions };
        }
        Action::ResolverFailed(message) => {
            state.search = SearchPhase::Failed { message };
        }
        Action::SelectSuggestion(mp) => {
            state.search = SearchPhase::Resolved {
                mp: ResolvedMp::direct(mp),
            };
        }
        Action::OpenDrawer => state.drawer_open = true,
        Action::CloseDrawer => state.drawer_open = false,
        Action::ShowLightbox(image) => state.lightbox = Some(image),
        Action::CloseLightbox => state.lightbox = None,
    }
    state
}
