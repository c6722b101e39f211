mod controller;

pub(crate) use controller::TreeController;

use crate::api::ApiClient;
use crate::config::EnvConfig;
use crate::models::{Notebook, Section};
use crate::tree::TreeState;
use leptos::prelude::*;

/// What the delete confirmation is waiting on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PendingDelete {
    Notebook { id: String, name: String },
    Section { id: String, name: String },
    Page { id: String, title: String },
}

impl PendingDelete {
    pub fn heading(&self) -> &'static str {
        match self {
            PendingDelete::Notebook { .. } => "Delete notebook",
            PendingDelete::Section { .. } => "Delete section",
            PendingDelete::Page { .. } => "Delete page",
        }
    }

    pub fn message(&self) -> String {
        match self {
            PendingDelete::Notebook { name, .. } => format!(
                "Are you sure you want to delete \"{name}\"? This will also delete all sections and pages within it."
            ),
            PendingDelete::Section { name, .. } => format!(
                "Are you sure you want to delete \"{name}\"? This will also delete all pages within it."
            ),
            PendingDelete::Page { title, .. } => {
                format!("Are you sure you want to delete \"{title}\"?")
            }
        }
    }
}

/// Single pending delete. A newer request replaces the one waiting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfirmSlot {
    pending: Option<PendingDelete>,
}

impl ConfirmSlot {
    pub fn request(&mut self, pending: PendingDelete) {
        self.pending = Some(pending);
    }

    /// Hands out the pending delete and empties the slot.
    pub fn take(&mut self) -> Option<PendingDelete> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&PendingDelete> {
        self.pending.as_ref()
    }
}

/// Create/edit form currently open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum EntityModal {
    NewNotebook,
    EditNotebook(Notebook),
    NewSection,
    EditSection(Section),
    NewPage { section_id: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Fetches in flight for one pane. Overlapping fetches share a spinner, so
/// it stays up until the last one lands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct InFlight(u32);

impl InFlight {
    pub fn start(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn finish(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    pub fn busy(&self) -> bool {
        self.0 > 0
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub config: StoredValue<EnvConfig>,
    pub api_client: RwSignal<ApiClient>,

    pub tree: RwSignal<TreeState>,
    pub notebooks_loading: RwSignal<InFlight>,
    pub tree_loading: RwSignal<InFlight>,
    pub page_loading: RwSignal<InFlight>,

    /// Debounced sidebar filter.
    pub search_query: RwSignal<String>,

    pub confirm: RwSignal<ConfirmSlot>,
    pub modal: RwSignal<Option<EntityModal>>,

    pub toasts: RwSignal<Vec<Toast>>,
    pub next_toast_id: RwSignal<u64>,

    /// Editor has edits not yet saved.
    pub editor_dirty: RwSignal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        let config = EnvConfig::new();
        let api_client = ApiClient::from_env(&config);
        tracing::info!(api_url = %config.api_url, "app state created");

        Self {
            config: StoredValue::new(config),
            api_client: RwSignal::new(api_client),
            tree: RwSignal::new(TreeState::new()),
            notebooks_loading: RwSignal::new(InFlight::default()),
            tree_loading: RwSignal::new(InFlight::default()),
            page_loading: RwSignal::new(InFlight::default()),
            search_query: RwSignal::new(String::new()),
            confirm: RwSignal::new(ConfirmSlot::default()),
            modal: RwSignal::new(None),
            toasts: RwSignal::new(vec![]),
            next_toast_id: RwSignal::new(0),
            editor_dirty: RwSignal::new(false),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

#[cfg(test)]
mod tests {
    use super::*;

    fn page_delete(id: &str) -> PendingDelete {
        PendingDelete::Page {
            id: id.to_string(),
            title: format!("Page {id}"),
        }
    }

    #[test]
    fn test_second_request_overwrites_first() {
        let mut slot = ConfirmSlot::default();
        slot.request(page_delete("p1"));
        slot.request(PendingDelete::Section {
            id: "s1".to_string(),
            name: "Ideas".to_string(),
        });

        let taken = slot.take().expect("a delete is pending");
        assert!(matches!(taken, PendingDelete::Section { ref id, .. } if id == "s1"));
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_in_flight_stays_busy_until_last_finishes() {
        let mut tree = InFlight::default();
        assert!(!tree.busy());

        // Tree fetch, then a section fetch while it is still running.
        tree.start();
        tree.start();
        tree.finish();
        assert!(tree.busy());
        tree.finish();
        assert!(!tree.busy());

        tree.finish();
        assert!(!tree.busy());
        tree.start();
        assert!(tree.busy());
    }

    #[test]
    fn test_cancel_empties_slot() {
        let mut slot = ConfirmSlot::default();
        slot.request(page_delete("p1"));
        slot.cancel();
        assert!(slot.pending().is_none());
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_messages_mention_what_goes_with_it() {
        let nb = PendingDelete::Notebook {
            id: "n".to_string(),
            name: "Work".to_string(),
        };
        assert_eq!(
            nb.message(),
            "Are you sure you want to delete \"Work\"? This will also delete all sections and pages within it."
        );
        assert_eq!(nb.heading(), "Delete notebook");

        let s = PendingDelete::Section {
            id: "s".to_string(),
            name: "Ideas".to_string(),
        };
        assert!(s.message().ends_with("This will also delete all pages within it."));

        assert_eq!(
            page_delete("p").message(),
            "Are you sure you want to delete \"Page p\"?"
        );
    }
}
