use leptos::prelude::*;
use tw_merge::tw_merge;

/// Centered overlay panel. Content is only mounted while `open` is true.
#[component]
pub fn Modal(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] title: Signal<String>,
    #[prop(optional, into)] description: Option<Signal<String>>,
    #[prop(optional)] destructive: bool,
    #[prop(optional, into)] class: String,
    children: ChildrenFn,
) -> impl IntoView {
    let panel_class = tw_merge!(
        "w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg",
        class
    );
    let title_class = if destructive {
        "text-sm font-medium text-destructive"
    } else {
        "text-sm font-medium"
    };

    view! {
        <Show when=move || open.get() fallback=|| ().into_view()>
            <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                <div class=panel_class.clone() role="dialog" aria-modal="true">
                    <div class="mb-3 space-y-1">
                        <div class=title_class>{move || title.get()}</div>
                        {description.map(|d| view! {
                            <div class="text-xs text-muted-foreground">{move || d.get()}</div>
                        })}
                    </div>
                    {children()}
                </div>
            </div>
        </Show>
    }
}
