use crate::pages::{NotFound, WorkspacePage};
use crate::state::{AppContext, AppState, TreeController};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    provide_context(AppContext(state));
    provide_context(TreeController::new(state));

    view! {
        <Router>
            <Routes fallback=|| view! { <NotFound /> }>
                <Route path=path!("") view=WorkspacePage />
            </Routes>
        </Router>
    }
}
