use crate::state::{Toast, ToastKind};
use icons::{Check, X};
use leptos::prelude::*;

#[component]
pub fn ToastViewport(
    #[prop(into)] toasts: Signal<Vec<Toast>>,
    on_dismiss: Callback<u64>,
) -> impl IntoView {
    view! {
        <div class="pointer-events-none fixed bottom-4 right-4 z-[60] flex w-80 flex-col gap-2">
            <For
                each=move || toasts.get()
                key=|t| t.id
                children=move |t: Toast| {
                    let tone = match t.kind {
                        ToastKind::Success => "border-success/40",
                        ToastKind::Error => "border-destructive/40 text-destructive",
                    };
                    let id = t.id;
                    let is_success = t.kind == ToastKind::Success;
                    view! {
                        <div
                            class=format!("pointer-events-auto flex items-start gap-2 rounded-md border bg-background px-3 py-2 text-sm shadow-md {tone}")
                            role="status"
                            data-kind=t.kind.as_ref().to_string()
                        >
                            {is_success.then(|| view! { <Check class="mt-0.5 size-4 shrink-0" /> })}
                            <div class="min-w-0 flex-1 break-words">{t.message.clone()}</div>
                            <button
                                class="shrink-0 text-muted-foreground hover:text-foreground"
                                aria-label="Dismiss"
                                on:click=move |_| on_dismiss.run(id)
                            >
                                <X class="size-4" />
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
