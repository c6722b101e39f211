use crate::api::is_hex_color;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Input, Spinner};
use crate::config::SEARCH_DEBOUNCE_MS;
use crate::models::{Notebook, DEFAULT_NOTEBOOK_COLOR};
use crate::state::{AppContext, EntityModal, InFlight, PendingDelete, TreeController};
use crate::util::{clear_timeout, set_timeout_ms};
use leptos::prelude::*;

#[component]
pub fn NotebookSidebar() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<TreeController>();

    let tree = app_state.0.tree;
    let loading = app_state.0.notebooks_loading;
    let search_query = app_state.0.search_query;

    let search_input: RwSignal<String> = RwSignal::new(search_query.get_untracked());
    let search_timer: RwSignal<Option<i32>> = RwSignal::new(None);

    let on_search = Callback::new(move |v: String| {
        if let Some(id) = search_timer.get_untracked() {
            clear_timeout(id);
        }
        let tid = set_timeout_ms(move || search_query.set(v), SEARCH_DEBOUNCE_MS);
        search_timer.set(tid);
    });

    let filtered = Memo::new(move |_| {
        let q = search_query.get();
        tree.with(|t| {
            t.filter_notebooks(&q)
                .into_iter()
                .cloned()
                .collect::<Vec<Notebook>>()
        })
    });
    let has_notebooks = move || tree.with(|t| !t.notebooks().is_empty());
    let active_id = move || tree.with(|t| t.active_notebook_id().map(str::to_string));

    view! {
        <aside class="flex w-64 shrink-0 flex-col border-r border-border bg-muted/30">
            <div class="flex items-center justify-between gap-2 px-3 py-3">
                <div class="text-sm font-semibold">"Notebooks"</div>
                <Button
                    size=ButtonSize::Sm
                    variant=ButtonVariant::Outline
                    on:click=move |_| app_state.0.modal.set(Some(EntityModal::NewNotebook))
                >
                    "New"
                </Button>
            </div>

            <div class="px-3 pb-2">
                <Input
                    bind_value=search_input
                    on_change=on_search
                    r#type="search"
                    placeholder="Search notebooks..."
                    class="h-8"
                />
            </div>

            <div class="min-h-0 flex-1 overflow-y-auto px-2 pb-3">
                <Show when=move || loading.with(InFlight::busy) && !has_notebooks() fallback=|| ().into_view()>
                    <div class="flex justify-center py-6"><Spinner /></div>
                </Show>

                <Show when=move || !loading.with(InFlight::busy) && !has_notebooks() fallback=|| ().into_view()>
                    <div class="px-2 py-6 text-center text-xs text-muted-foreground">
                        "No notebooks yet. Create one to get started."
                    </div>
                </Show>

                <Show when=move || has_notebooks() && filtered.with(|f| f.is_empty()) fallback=|| ().into_view()>
                    <div class="px-2 py-6 text-center text-xs text-muted-foreground">
                        "No notebooks found"
                    </div>
                </Show>

                <ul class="space-y-0.5">
                    <For
                        each=move || filtered.get()
                        key=|n| (n.id.clone(), n.name.clone(), n.color.clone())
                        children=move |nb: Notebook| {
                            let id = nb.id.clone();
                            let is_active = {
                                let id = id.clone();
                                move || active_id().as_deref() == Some(id.as_str())
                            };
                            let color = nb
                                .color
                                .clone()
                                .filter(|c| is_hex_color(c))
                                .unwrap_or_else(|| DEFAULT_NOTEBOOK_COLOR.to_string());
                            let edit_nb = nb.clone();
                            let delete_req = PendingDelete::Notebook {
                                id: nb.id.clone(),
                                name: nb.name.clone(),
                            };
                            let select_id = id.clone();

                            view! {
                                <li
                                    class=move || {
                                        if is_active() {
                                            "group flex items-center gap-2 rounded-md bg-accent px-2 py-1.5 text-sm text-accent-foreground"
                                        } else {
                                            "group flex items-center gap-2 rounded-md px-2 py-1.5 text-sm hover:bg-accent/60"
                                        }
                                    }
                                >
                                    <span
                                        class="size-2.5 shrink-0 rounded-full"
                                        style=format!("background-color: {color}")
                                    ></span>
                                    <button
                                        class="min-w-0 flex-1 truncate text-left"
                                        title=nb.description.clone().unwrap_or_default()
                                        on:click=move |_| controller.select_notebook(&select_id)
                                    >
                                        {nb.name.clone()}
                                    </button>
                                    <div class="hidden shrink-0 items-center gap-0.5 group-hover:flex">
                                        <Button
                                            size=ButtonSize::Icon
                                            variant=ButtonVariant::Ghost
                                            attr:title="Edit notebook"
                                            on:click=move |_| {
                                                app_state.0.modal.set(Some(EntityModal::EditNotebook(edit_nb.clone())))
                                            }
                                        >
                                            "✎"
                                        </Button>
                                        <Button
                                            size=ButtonSize::Icon
                                            variant=ButtonVariant::Ghost
                                            class="text-destructive"
                                            attr:title="Delete notebook"
                                            on:click=move |_| controller.request_delete(delete_req.clone())
                                        >
                                            "×"
                                        </Button>
                                    </div>
                                </li>
                            }
                        }
                    />
                </ul>
            </div>
        </aside>
    }
}
