use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::mpsc;

use eframe::egui::Vec2;

use crate::catalog::Catalog;

pub const SEARCH_HISTORY_LIMIT: usize = 20;

/// Viewer-controlled state that shapes scoring and emphasis. Only
/// [`ViewCommand`]s change it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
    pub active_lenses: BTreeSet<String>,
    pub search_query: Option<String>,
    /// `None` while no search is active; an empty set means nothing matched.
    pub search_matches: Option<HashSet<String>>,
    pub selections: BTreeSet<String>,
    /// Most recent first, without duplicates.
    pub search_history: VecDeque<String>,
}

impl ViewState {
    pub fn search_active(&self) -> bool {
        self.search_matches.is_some()
    }

    pub fn is_search_match(&self, id: &str) -> bool {
        self.search_matches
            .as_ref()
            .is_some_and(|matches| matches.contains(id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selections.contains(id)
    }

    pub fn lens_active(&self, lens: &str) -> bool {
        self.active_lenses.contains(&normalize_lens(lens))
    }

    /// True while any viewer filter narrows attention.
    pub fn filtering(&self) -> bool {
        self.search_active() || !self.active_lenses.is_empty() || !self.selections.is_empty()
    }

    /// Returns whether the lens is active afterwards.
    pub fn toggle_lens(&mut self, lens: &str) -> bool {
        let lens = normalize_lens(lens);
        if lens.is_empty() {
            return false;
        }
        if self.active_lenses.remove(&lens) {
            false
        } else {
            self.active_lenses.insert(lens);
            true
        }
    }

    /// A blank query clears the search instead of matching nothing.
    pub fn complete_search(&mut self, query: &str, matched_ids: impl IntoIterator<Item = String>) {
        let query = query.trim();
        if query.is_empty() {
            self.clear_search();
            return;
        }

        self.search_history.retain(|previous| previous != query);
        self.search_history.push_front(query.to_owned());
        self.search_history.truncate(SEARCH_HISTORY_LIMIT);

        self.search_query = Some(query.to_owned());
        self.search_matches = Some(matched_ids.into_iter().collect());
    }

    pub fn clear_search(&mut self) {
        self.search_query = None;
        self.search_matches = None;
    }

    /// Returns whether the node is selected afterwards.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if self.selections.remove(id) {
            false
        } else {
            self.selections.insert(id.to_owned());
            true
        }
    }
}

pub fn normalize_lens(lens: &str) -> String {
    lens.trim().to_lowercase()
}

/// Viewer events, queued by producers and applied by the engine at the start
/// of the next tick.
#[derive(Clone, Debug)]
pub enum ViewCommand {
    ToggleLens(String),
    SearchCompleted {
        query: String,
        matched_ids: Vec<String>,
    },
    ClearSearch,
    /// Toggles membership of the node in the selection set.
    Select(String),
    ClearSelection,
    ReplaceCatalog(Catalog),
    DragNode {
        id: String,
        position: Vec2,
    },
    ReleaseNode(String),
    /// New drawing surface size in world units.
    Resize(Vec2),
}

pub type CommandSender = mpsc::Sender<ViewCommand>;
