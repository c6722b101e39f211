mod editor;
mod modals;
mod sidebar;
mod tree;

use crate::components::ui::ToastViewport;
use crate::state::{AppContext, TreeController};
use editor::PageEditor;
use leptos::prelude::*;
use modals::{DeleteConfirmModal, EntityFormModal};
use sidebar::NotebookSidebar;
use tree::TreePanel;

/// Three-pane workspace: notebooks, the section/page tree and the editor.
#[component]
pub fn WorkspacePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<TreeController>();

    // Fetch once on mount; the last-opened notebook is restored when it lands.
    Effect::new(move |prev: Option<()>| {
        if prev.is_none() {
            controller.load_notebooks();
        }
    });

    let on_dismiss = Callback::new(move |id: u64| controller.dismiss_toast(id));

    view! {
        <div class="flex h-screen w-full overflow-hidden bg-background text-foreground">
            <NotebookSidebar />
            <TreePanel />
            <PageEditor />
        </div>

        <EntityFormModal />
        <DeleteConfirmModal />
        <ToastViewport toasts=app_state.0.toasts on_dismiss=on_dismiss />
    }
}

#[component]
pub fn NotFound() -> impl IntoView {
    view! {
        <div class="px-4 py-8 text-xs text-muted-foreground">
            "Not found. " <a class="underline" href="/">"Back to notebooks"</a>
        </div>
    }
}
