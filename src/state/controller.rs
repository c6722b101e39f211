use crate::api::{ApiError, ApiResult, NotebookRequest, PageRequest, SectionRequest};
use crate::state::{AppState, InFlight, PendingDelete, Toast, ToastKind};
use crate::storage::{load_last_notebook_id, save_last_notebook_id};
use crate::tree::{Fetch, Loaded, TreeError, TreeState};
use crate::util::set_timeout_ms;
use leptos::prelude::*;
use leptos::task::spawn_local;

const UNSAVED_CHANGES_PROMPT: &str =
    "You have unsaved changes. Do you want to continue without saving?";

/// Turns UI intents into tree transitions and runs the fetches they ask for.
///
/// Views read `AppState` signals directly; every write to the tree goes
/// through here.
#[derive(Clone, Copy)]
pub(crate) struct TreeController {
    state: AppState,
}

impl TreeController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    // ----- toasts -----

    pub fn toast(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self.state.next_toast_id.get_untracked();
        self.state.next_toast_id.set(id.wrapping_add(1));
        self.state.toasts.update(|t| {
            t.push(Toast {
                id,
                kind,
                message: message.into(),
            })
        });

        let toasts = self.state.toasts;
        let ms = self.state.config.with_value(|c| c.toast_ms);
        set_timeout_ms(move || toasts.update(|t| t.retain(|x| x.id != id)), ms);
    }

    pub fn dismiss_toast(&self, id: u64) {
        self.state.toasts.update(|t| t.retain(|x| x.id != id));
    }

    // ----- fetches -----

    fn loading_flag(&self, fetch: &Fetch) -> RwSignal<InFlight> {
        match fetch {
            Fetch::Notebooks { .. } => self.state.notebooks_loading,
            Fetch::Tree { .. } | Fetch::SectionPages { .. } => self.state.tree_loading,
            Fetch::Page { .. } => self.state.page_loading,
        }
    }

    fn run(self, fetch: Fetch) {
        let api = self.state.api_client.get_untracked();
        let loading = self.loading_flag(&fetch);
        loading.update(InFlight::start);

        spawn_local(async move {
            let result = match fetch {
                Fetch::Notebooks { token } => {
                    let res = api.list_notebooks().await;
                    res.map(|notebooks| Loaded::Notebooks { token, notebooks })
                }
                Fetch::Tree { notebook_id, token } => {
                    let res = api.load_tree(&notebook_id).await;
                    res.map(|(sections, pages)| Loaded::Tree {
                        token,
                        notebook_id,
                        sections,
                        pages,
                    })
                }
                Fetch::SectionPages { section_id, token } => {
                    let res = api.list_pages(&section_id).await;
                    res.map(|pages| Loaded::SectionPages {
                        token,
                        section_id,
                        pages,
                    })
                }
                Fetch::Page { page_id, token } => {
                    let res = api.get_page(&page_id).await;
                    res.map(|page| Loaded::Page { token, page })
                }
            };
            loading.update(InFlight::finish);
            self.finish(result);
        });
    }

    fn finish(self, result: ApiResult<Loaded>) {
        let loaded = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(kind = ?e.kind, error = %e, "fetch failed, keeping cached tree");
                self.toast(ToastKind::Error, e.message);
                return;
            }
        };

        let is_notebook_list = matches!(loaded, Loaded::Notebooks { .. });
        let applied = self
            .state
            .tree
            .try_update(|t| t.apply(loaded))
            .unwrap_or(false);
        if !applied {
            tracing::debug!("dropped stale fetch result");
            return;
        }

        if is_notebook_list {
            self.restore_last_notebook();
        }
    }

    fn restore_last_notebook(self) {
        let Some(id) = load_last_notebook_id() else {
            return;
        };
        let should_select = self.state.tree.with_untracked(|t| {
            t.active_notebook_id().is_none() && t.notebooks().iter().any(|n| n.id == id)
        });
        if should_select {
            tracing::debug!(notebook_id = %id, "restoring last notebook");
            self.select_notebook(&id);
        }
    }

    /// Apply a transition and run the fetch it returns.
    fn transition(self, f: impl FnOnce(&mut TreeState) -> Result<Fetch, TreeError>) -> bool {
        match self.state.tree.try_update(f) {
            Some(Ok(fetch)) => {
                self.run(fetch);
                true
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "tree transition rejected");
                false
            }
            None => false,
        }
    }

    /// Asks before throwing away unsaved editor changes.
    fn confirm_discard(&self) -> bool {
        if !self.state.editor_dirty.get_untracked() {
            return true;
        }
        let ok = window()
            .confirm_with_message(UNSAVED_CHANGES_PROMPT)
            .unwrap_or(false);
        if ok {
            self.state.editor_dirty.set(false);
        }
        ok
    }

    // ----- navigation -----

    pub fn load_notebooks(self) {
        let fetch = self.state.tree.try_update(|t| t.load_notebooks());
        if let Some(fetch) = fetch {
            self.run(fetch);
        }
    }

    pub fn select_notebook(self, id: &str) {
        if !self.confirm_discard() {
            return;
        }
        if self.transition(|t| t.select_notebook(id)) {
            tracing::info!(notebook_id = %id, "notebook selected");
            save_last_notebook_id(Some(id));
        }
    }

    pub fn select_section(self, id: &str) {
        if !self.confirm_discard() {
            return;
        }
        if self.transition(|t| t.select_section(id)) {
            tracing::info!(section_id = %id, "section selected");
        }
    }

    pub fn select_page(self, id: &str) {
        let same = self
            .state
            .tree
            .with_untracked(|t| t.active_page_id() == Some(id));
        if same || !self.confirm_discard() {
            return;
        }
        if self.transition(|t| t.select_page(id)) {
            tracing::info!(page_id = %id, "page selected");
        }
    }

    pub fn toggle_section(self, id: &str) {
        self.state.tree.update(|t| t.toggle_section(id));
    }

    pub fn collapse_all(self) {
        self.state.tree.update(|t| t.collapse_all());
    }

    // ----- mutations -----

    fn active_notebook_id(&self) -> ApiResult<String> {
        self.state
            .tree
            .with_untracked(|t| t.active_notebook_id().map(str::to_string))
            .ok_or_else(|| ApiError::validation(TreeError::NoActiveNotebook.to_string()))
    }

    pub async fn save_notebook(self, id: Option<String>, req: NotebookRequest) -> ApiResult<()> {
        let api = self.state.api_client.get_untracked();
        let created = match &id {
            None => api.create_notebook(&req).await?,
            Some(id) => api.update_notebook(id, &req).await?,
        };
        tracing::info!(notebook_id = %created.id, "notebook saved");

        if let Some(fetch) = self.state.tree.try_update(|t| t.notebook_saved()) {
            self.run(fetch);
        }
        self.toast(
            ToastKind::Success,
            if id.is_none() {
                "Notebook created"
            } else {
                "Notebook updated"
            },
        );
        Ok(())
    }

    pub async fn save_section(self, id: Option<String>, name: String) -> ApiResult<()> {
        let notebook_id = self.active_notebook_id()?;
        let display_order = self.state.tree.with_untracked(|t| match &id {
            Some(id) => t
                .visible_sections()
                .iter()
                .find(|s| &s.id == id)
                .map(|s| s.display_order)
                .unwrap_or(0),
            None => t.next_section_order(),
        });
        let req = SectionRequest {
            notebook_id,
            name: name.trim().to_string(),
            display_order,
        };

        let api = self.state.api_client.get_untracked();
        let section = match &id {
            None => api.create_section(&req).await?,
            Some(id) => api.update_section(id, &req).await?,
        };
        tracing::info!(section_id = %section.id, "section saved");

        self.transition(|t| t.section_saved(&section));
        self.toast(
            ToastKind::Success,
            if id.is_none() {
                "Section created"
            } else {
                "Section updated"
            },
        );
        Ok(())
    }

    pub async fn create_page(self, section_id: String, title: String) -> ApiResult<()> {
        let display_order = self
            .state
            .tree
            .with_untracked(|t| t.next_page_order(&section_id));
        let req = PageRequest {
            section_id,
            title: title.trim().to_string(),
            content: String::new(),
            display_order,
        };

        let page = self.state.api_client.get_untracked().create_page(&req).await?;
        tracing::info!(page_id = %page.id, "page created");

        self.state.editor_dirty.set(false);
        self.transition(|t| t.page_created(page));
        self.toast(ToastKind::Success, "Page created");
        Ok(())
    }

    pub async fn save_page(self, title: String, content: String) -> ApiResult<()> {
        let Some(current) = self.state.tree.with_untracked(|t| t.active_page().cloned()) else {
            return Err(ApiError::validation("No page selected"));
        };
        let req = PageRequest {
            section_id: current.section_id.clone(),
            title: title.trim().to_string(),
            content,
            display_order: current.display_order,
        };

        let page = self
            .state
            .api_client
            .get_untracked()
            .update_page(&current.id, &req)
            .await?;
        tracing::info!(page_id = %page.id, "page saved");

        self.state.editor_dirty.set(false);
        self.transition(|t| t.page_saved(page));
        self.toast(ToastKind::Success, "Page saved");
        Ok(())
    }

    pub fn request_delete(self, pending: PendingDelete) {
        self.state.confirm.update(|slot| slot.request(pending));
    }

    pub fn cancel_delete(self) {
        self.state.confirm.update(|slot| slot.cancel());
    }

    /// Deletes whatever the confirmation slot holds. On failure the tree is
    /// left as it was and the server's message is returned.
    pub async fn confirm_delete(self) -> ApiResult<()> {
        let Some(pending) = self.state.confirm.try_update(|slot| slot.take()).flatten() else {
            return Ok(());
        };

        let api = self.state.api_client.get_untracked();
        let result = match &pending {
            PendingDelete::Notebook { id, .. } => api.delete_notebook(id).await,
            PendingDelete::Section { id, .. } => api.delete_section(id).await,
            PendingDelete::Page { id, .. } => api.delete_page(id).await,
        };
        if let Err(e) = result {
            tracing::warn!(kind = ?e.kind, error = %e, "delete rejected");
            self.toast(ToastKind::Error, e.message.clone());
            return Err(e);
        }

        match &pending {
            PendingDelete::Notebook { id, .. } => {
                tracing::info!(notebook_id = %id, "notebook deleted");
                if load_last_notebook_id().as_deref() == Some(id.as_str()) {
                    save_last_notebook_id(None);
                }
                let was_active = self
                    .state
                    .tree
                    .with_untracked(|t| t.active_notebook_id() == Some(id.as_str()));
                if was_active {
                    self.state.editor_dirty.set(false);
                }
                if let Some(fetch) = self.state.tree.try_update(|t| t.notebook_deleted(id)) {
                    self.run(fetch);
                }
                self.toast(ToastKind::Success, "Notebook deleted");
            }
            PendingDelete::Section { id, .. } => {
                tracing::info!(section_id = %id, "section deleted");
                let held_page = self.state.tree.with_untracked(|t| {
                    t.active_page().is_some_and(|p| &p.section_id == id)
                });
                if held_page {
                    self.state.editor_dirty.set(false);
                }
                self.transition(|t| t.section_deleted(id));
                self.toast(ToastKind::Success, "Section deleted");
            }
            PendingDelete::Page { id, .. } => {
                tracing::info!(page_id = %id, "page deleted");
                if self
                    .state
                    .tree
                    .with_untracked(|t| t.active_page_id() == Some(id.as_str()))
                {
                    self.state.editor_dirty.set(false);
                }
                self.transition(|t| t.page_deleted(id));
                self.toast(ToastKind::Success, "Page deleted");
            }
        }
        Ok(())
    }
}
