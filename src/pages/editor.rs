use crate::components::ui::{BusyLabel, Button, ButtonSize, ButtonVariant, Input, Spinner, Textarea};
use crate::markdown;
use crate::state::{AppContext, InFlight, PendingDelete, ToastKind, TreeController};
use crate::util::format_updated_at;
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;

#[component]
pub fn PageEditor() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<TreeController>();

    let tree = app_state.0.tree;
    let dirty = app_state.0.editor_dirty;
    let page_loading = app_state.0.page_loading;

    let title: RwSignal<String> = RwSignal::new(String::new());
    let content: RwSignal<String> = RwSignal::new(String::new());
    let preview: RwSignal<bool> = RwSignal::new(true);
    let saving: RwSignal<bool> = RwSignal::new(false);

    let has_page = move || tree.with(|t| t.active_page().is_some());
    let updated_at = move || {
        tree.with(|t| t.active_page().and_then(|p| p.updated_at.clone()))
            .map(|ts| format_updated_at(&ts))
            .unwrap_or_else(|| "Never".to_string())
    };

    // Reload the drafts whenever the shown page (or its saved revision) changes,
    // unless there are local edits.
    Effect::new(move |prev: Option<Option<String>>| {
        let current = tree.with(|t| {
            t.active_page()
                .map(|p| (p.id.clone(), p.title.clone(), p.content.clone()))
        });
        let current_id = current.as_ref().map(|(id, _, _)| id.clone());
        let switched = prev.flatten() != current_id;

        if switched || !dirty.get_untracked() {
            let (t, c) = current.map(|(_, t, c)| (t, c)).unwrap_or_default();
            title.set(t);
            content.set(c);
            if switched {
                preview.set(true);
            }
        }
        current_id
    });

    let mark_dirty = Callback::new(move |_: String| dirty.set(true));

    let save = move || {
        if saving.get_untracked() || !has_page() {
            return;
        }
        saving.set(true);
        let t = title.get_untracked();
        let c = content.get_untracked();
        spawn_local(async move {
            if let Err(e) = controller.save_page(t, c).await {
                tracing::warn!(error = %e, "page save failed");
                controller.toast(ToastKind::Error, e.message);
            }
            saving.set(false);
        });
    };

    let key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if (ev.ctrl_key() || ev.meta_key()) && ev.key().eq_ignore_ascii_case("s") {
            ev.prevent_default();
            save();
        }
    });
    on_cleanup(move || key_handle.remove());

    let on_delete = move |_: web_sys::MouseEvent| {
        let pending = tree.with_untracked(|t| {
            t.active_page().map(|p| PendingDelete::Page {
                id: p.id.clone(),
                title: p.title.clone(),
            })
        });
        if let Some(pending) = pending {
            controller.request_delete(pending);
        }
    };

    let rendered = move || markdown::render(&content.get());

    view! {
        <section class="flex min-w-0 flex-1 flex-col">
            <Show
                when=has_page
                fallback=move || view! {
                    <div class="flex flex-1 items-center justify-center text-sm text-muted-foreground">
                        <Show when=move || page_loading.with(InFlight::busy) fallback=|| "Select a page to view or edit it">
                            <Spinner />
                        </Show>
                    </div>
                }
            >
                <div class="flex items-start gap-3 border-b border-border px-6 py-4">
                    <div class="min-w-0 flex-1 space-y-1">
                        <Input
                            bind_value=title
                            on_change=mark_dirty
                            placeholder="Page title"
                            class="h-9 border-transparent px-0 text-lg font-semibold shadow-none focus-visible:ring-0"
                        />
                        <div class="text-xs text-muted-foreground">
                            "Last updated: " {updated_at}
                            <Show when=move || dirty.get() fallback=|| ().into_view()>
                                <span class="ml-2 text-warning">"Unsaved changes"</span>
                            </Show>
                        </div>
                    </div>
                    <div class="flex shrink-0 items-center gap-2">
                        <Button
                            size=ButtonSize::Sm
                            variant=ButtonVariant::Outline
                            on:click=move |_| preview.update(|p| *p = !*p)
                        >
                            {move || if preview.get() { "Edit" } else { "Preview" }}
                        </Button>
                        <Button
                            size=ButtonSize::Sm
                            attr:disabled=move || saving.get()
                            attr:title="Save (Ctrl+S)"
                            on:click=move |_| save()
                        >
                            <BusyLabel busy=saving idle="Save" working="Saving..." />
                        </Button>
                        <Button
                            size=ButtonSize::Sm
                            variant=ButtonVariant::Outline
                            class="border-destructive/40 text-destructive"
                            on:click=on_delete
                        >
                            "Delete"
                        </Button>
                    </div>
                </div>

                <div class="min-h-0 flex-1 overflow-y-auto px-6 py-4">
                    <Show
                        when=move || preview.get()
                        fallback=move || view! {
                            <Textarea
                                bind_value=content
                                on_change=mark_dirty
                                placeholder="Write in Markdown..."
                                class="h-full"
                            />
                        }
                    >
                        <article class="prose prose-sm max-w-none" inner_html=rendered></article>
                    </Show>
                </div>
            </Show>
        </section>
    }
}
