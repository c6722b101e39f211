use crate::components::ui::{Button, ButtonSize, ButtonVariant, Spinner};
use crate::models::{Page, Section};
use crate::state::{AppContext, EntityModal, InFlight, PendingDelete, TreeController};
use icons::{ChevronDown, ChevronRight, ChevronUp};
use leptos::prelude::*;

#[component]
pub fn TreePanel() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<TreeController>();

    let tree = app_state.0.tree;
    let loading = app_state.0.tree_loading;

    let notebook_name = move || tree.with(|t| t.active_notebook().map(|n| n.name.clone()));
    let section_name = move || tree.with(|t| t.active_section().map(|s| s.name.clone()));
    let sections = Memo::new(move |_| tree.with(|t| t.visible_sections().to_vec()));

    view! {
        <section class="flex w-72 shrink-0 flex-col border-r border-border">
            <Show
                when=move || notebook_name().is_some()
                fallback=|| view! {
                    <div class="px-4 py-8 text-center text-xs text-muted-foreground">
                        "Select a notebook to view its contents"
                    </div>
                }
            >
                <div class="flex items-center justify-between gap-2 px-3 py-3">
                    <div class="min-w-0">
                        <div class="truncate text-sm font-semibold">
                            {move || notebook_name().unwrap_or_default()}
                        </div>
                        <div class="truncate text-xs text-muted-foreground">
                            {move || section_name().unwrap_or_else(|| "No section selected".to_string())}
                        </div>
                    </div>
                    <div class="flex shrink-0 items-center gap-1">
                        <Button
                            size=ButtonSize::Icon
                            variant=ButtonVariant::Ghost
                            attr:title="Collapse all"
                            on:click=move |_| controller.collapse_all()
                        >
                            <ChevronUp />
                        </Button>
                        <Button
                            size=ButtonSize::Sm
                            variant=ButtonVariant::Outline
                            on:click=move |_| app_state.0.modal.set(Some(EntityModal::NewSection))
                        >
                            "New section"
                        </Button>
                    </div>
                </div>

                <div class="min-h-0 flex-1 overflow-y-auto px-2 pb-3">
                    <Show when=move || loading.with(InFlight::busy) fallback=|| ().into_view()>
                        <div class="flex justify-center py-2"><Spinner /></div>
                    </Show>

                    <Show
                        when=move || !loading.with(InFlight::busy) && sections.with(|s| s.is_empty())
                        fallback=|| ().into_view()
                    >
                        <div class="px-2 py-6 text-center text-xs text-muted-foreground">
                            "No sections yet. Create a section to get started."
                        </div>
                    </Show>

                    <ul class="space-y-0.5">
                        <For
                            each=move || sections.get()
                            key=|s| (s.id.clone(), s.name.clone())
                            children=move |section: Section| view! { <SectionNode section=section /> }
                        />
                    </ul>
                </div>
            </Show>
        </section>
    }
}

#[component]
fn SectionNode(section: Section) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<TreeController>();
    let tree = app_state.0.tree;

    let id = StoredValue::new(section.id.clone());
    let has_children = move || tree.with(|t| id.with_value(|id| t.has_children(id)));
    let expanded = move || tree.with(|t| id.with_value(|id| t.is_expanded(id)));
    let is_active = move || tree.with(|t| id.with_value(|id| t.active_section_id() == Some(id.as_str())));
    let pages = Memo::new(move |_| {
        tree.with(|t| id.with_value(|id| t.pages_of(id).cloned().collect::<Vec<Page>>()))
    });

    let edit_section = section.clone();
    let delete_req = PendingDelete::Section {
        id: section.id.clone(),
        name: section.name.clone(),
    };

    view! {
        <li>
            <div
                class=move || {
                    if is_active() {
                        "group flex items-center gap-1 rounded-md bg-accent/70 px-1 py-1 text-sm"
                    } else {
                        "group flex items-center gap-1 rounded-md px-1 py-1 text-sm hover:bg-accent/50"
                    }
                }
            >
                <button
                    class="flex size-5 shrink-0 items-center justify-center text-muted-foreground disabled:opacity-30"
                    disabled=move || !has_children()
                    aria-label="Toggle section"
                    on:click=move |_| id.with_value(|id| controller.toggle_section(id))
                >
                    {move || if expanded() {
                        view! { <ChevronDown class="size-4" /> }.into_any()
                    } else {
                        view! { <ChevronRight class="size-4" /> }.into_any()
                    }}
                </button>
                <button
                    class="min-w-0 flex-1 truncate text-left font-medium"
                    on:click=move |_| id.with_value(|id| controller.select_section(id))
                >
                    {section.name.clone()}
                </button>
                <div class="hidden shrink-0 items-center gap-0.5 group-hover:flex">
                    <Button
                        size=ButtonSize::Icon
                        variant=ButtonVariant::Ghost
                        attr:title="New page"
                        on:click=move |_| {
                            app_state.0.modal.set(Some(EntityModal::NewPage {
                                section_id: id.get_value(),
                            }))
                        }
                    >
                        "+"
                    </Button>
                    <Button
                        size=ButtonSize::Icon
                        variant=ButtonVariant::Ghost
                        attr:title="Edit section"
                        on:click=move |_| {
                            app_state.0.modal.set(Some(EntityModal::EditSection(edit_section.clone())))
                        }
                    >
                        "✎"
                    </Button>
                    <Button
                        size=ButtonSize::Icon
                        variant=ButtonVariant::Ghost
                        class="text-destructive"
                        attr:title="Delete section"
                        on:click=move |_| controller.request_delete(delete_req.clone())
                    >
                        "×"
                    </Button>
                </div>
            </div>

            <Show when=move || expanded() fallback=|| ().into_view()>
                <ul class="ml-6 space-y-0.5 border-l border-border pl-2">
                    <For
                        each=move || pages.get()
                        key=|p| (p.id.clone(), p.title.clone())
                        children=move |page: Page| view! { <PageNode page=page /> }
                    />
                </ul>
            </Show>
        </li>
    }
}

#[component]
fn PageNode(page: Page) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<TreeController>();
    let tree = app_state.0.tree;

    let id = StoredValue::new(page.id.clone());
    let is_active = move || tree.with(|t| id.with_value(|id| t.active_page_id() == Some(id.as_str())));

    view! {
        <li>
            <button
                class=move || {
                    if is_active() {
                        "w-full truncate rounded-md bg-primary/10 px-2 py-1 text-left text-sm text-primary"
                    } else {
                        "w-full truncate rounded-md px-2 py-1 text-left text-sm hover:bg-accent/50"
                    }
                }
                on:click=move |_| id.with_value(|id| controller.select_page(id))
            >
                {page.title.clone()}
            </button>
        </li>
    }
}
