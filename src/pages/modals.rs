use crate::api::NotebookRequest;
use crate::components::ui::{BusyLabel, Button, ButtonSize, ButtonVariant, ErrorAlert, Input, Label, Modal};
use crate::models::DEFAULT_NOTEBOOK_COLOR;
use crate::state::{AppContext, EntityModal, TreeController};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Which fields the open form shows.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FormKind {
    Notebook,
    Section,
    Page,
}

fn form_kind(modal: &EntityModal) -> FormKind {
    match modal {
        EntityModal::NewNotebook | EntityModal::EditNotebook(_) => FormKind::Notebook,
        EntityModal::NewSection | EntityModal::EditSection(_) => FormKind::Section,
        EntityModal::NewPage { .. } => FormKind::Page,
    }
}

fn form_title(modal: &EntityModal) -> &'static str {
    match modal {
        EntityModal::NewNotebook => "New notebook",
        EntityModal::EditNotebook(_) => "Edit notebook",
        EntityModal::NewSection => "New section",
        EntityModal::EditSection(_) => "Edit section",
        EntityModal::NewPage { .. } => "New page",
    }
}

/// Create/edit form for notebooks, sections and pages.
#[component]
pub fn EntityFormModal() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<TreeController>();
    let modal = app_state.0.modal;

    let name: RwSignal<String> = RwSignal::new(String::new());
    let color: RwSignal<String> = RwSignal::new(String::new());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let busy: RwSignal<bool> = RwSignal::new(false);
    let name_ref: NodeRef<html::Input> = NodeRef::new();

    // Reset fields from whatever was opened.
    Effect::new(move |_| {
        let Some(m) = modal.get() else {
            return;
        };
        let (n, c, d) = match &m {
            EntityModal::EditNotebook(nb) => (
                nb.name.clone(),
                nb.color.clone().unwrap_or_else(|| DEFAULT_NOTEBOOK_COLOR.to_string()),
                nb.description.clone().unwrap_or_default(),
            ),
            EntityModal::EditSection(s) => (s.name.clone(), String::new(), String::new()),
            EntityModal::NewNotebook => {
                (String::new(), DEFAULT_NOTEBOOK_COLOR.to_string(), String::new())
            }
            _ => (String::new(), String::new(), String::new()),
        };
        name.set(n);
        color.set(c);
        description.set(d);
        error.set(None);
        busy.set(false);

        crate::util::set_timeout_ms(
            move || {
                if let Some(el) = name_ref.get_untracked() {
                    let _ = el.focus();
                }
            },
            0,
        );
    });

    let kind = move || modal.with(|m| m.as_ref().map(form_kind));
    let title = Signal::derive(move || {
        modal.with(|m| m.as_ref().map(form_title).unwrap_or_default().to_string())
    });
    let field_label = move || if kind() == Some(FormKind::Page) { "Title" } else { "Name" };

    let close = move || {
        if !busy.get_untracked() {
            modal.set(None);
        }
    };

    let submit = move || {
        if busy.get_untracked() {
            return;
        }
        let Some(m) = modal.get_untracked() else {
            return;
        };
        let n = name.get_untracked();
        busy.set(true);
        error.set(None);

        spawn_local(async move {
            let result = match m {
                EntityModal::NewNotebook => {
                    let req = NotebookRequest::new(&n, &color.get_untracked(), &description.get_untracked());
                    controller.save_notebook(None, req).await
                }
                EntityModal::EditNotebook(nb) => {
                    let req = NotebookRequest::new(&n, &color.get_untracked(), &description.get_untracked());
                    controller.save_notebook(Some(nb.id), req).await
                }
                EntityModal::NewSection => controller.save_section(None, n).await,
                EntityModal::EditSection(s) => controller.save_section(Some(s.id), n).await,
                EntityModal::NewPage { section_id } => controller.create_page(section_id, n).await,
            };
            busy.set(false);
            match result {
                Ok(()) => modal.set(None),
                Err(e) => {
                    tracing::warn!(kind = ?e.kind, error = %e, "form submit failed");
                    error.set(Some(e.message));
                }
            }
        });
    };

    view! {
        <Modal open=Signal::derive(move || modal.with(|m| m.is_some())) title=title>
            <div
                class="space-y-2"
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Enter" {
                        ev.prevent_default();
                        submit();
                    }
                }
            >
                <div class="space-y-1">
                    <Label html_for="entity-name">{field_label}</Label>
                    <Input id="entity-name" node_ref=name_ref bind_value=name class="h-8" />
                </div>

                <Show when=move || kind() == Some(FormKind::Notebook) fallback=|| ().into_view()>
                    <div class="space-y-1">
                        <Label html_for="entity-color">"Color"</Label>
                        <div class="flex items-center gap-2">
                            <input
                                type="color"
                                class="h-8 w-10 shrink-0 cursor-pointer rounded border border-border bg-background"
                                prop:value=move || color.get()
                                on:input=move |ev: web_sys::Event| color.set(event_target_value(&ev))
                            />
                            <Input id="entity-color" bind_value=color class="h-8 font-mono" placeholder="#0078D4" />
                        </div>
                    </div>
                    <div class="space-y-1">
                        <Label html_for="entity-description">"Description (optional)"</Label>
                        <Input id="entity-description" bind_value=description class="h-8" />
                    </div>
                </Show>

                <ErrorAlert message=error />

                <div class="flex items-center justify-end gap-2 pt-2">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || busy.get()
                        on:click=move |_| close()
                    >
                        "Cancel"
                    </Button>
                    <Button size=ButtonSize::Sm attr:disabled=move || busy.get() on:click=move |_| submit()>
                        <BusyLabel busy=busy idle="Save" working="Saving..." />
                    </Button>
                </div>
            </div>
        </Modal>
    }
}

/// Confirmation for the single pending delete.
#[component]
pub fn DeleteConfirmModal() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let controller = expect_context::<TreeController>();
    let confirm = app_state.0.confirm;
    let busy: RwSignal<bool> = RwSignal::new(false);

    let open = Signal::derive(move || confirm.with(|c| c.pending().is_some()));
    let title = Signal::derive(move || {
        confirm.with(|c| c.pending().map(|p| p.heading()).unwrap_or_default().to_string())
    });
    let message = Signal::derive(move || {
        confirm.with(|c| c.pending().map(|p| p.message()).unwrap_or_default())
    });

    let on_confirm = move |_: web_sys::MouseEvent| {
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        spawn_local(async move {
            // Errors are already reported as a toast.
            let _ = controller.confirm_delete().await;
            busy.set(false);
        });
    };

    view! {
        <Modal open=open title=title description=message destructive=true>
            <div class="flex items-center justify-end gap-2 pt-2">
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    attr:disabled=move || busy.get()
                    on:click=move |_| controller.cancel_delete()
                >
                    "Cancel"
                </Button>
                <Button
                    variant=ButtonVariant::Destructive
                    size=ButtonSize::Sm
                    attr:disabled=move || busy.get()
                    on:click=on_confirm
                >
                    <BusyLabel busy=busy idle="Delete" working="Deleting..." />
                </Button>
            </div>
        </Modal>
    }
}
