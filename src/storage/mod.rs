use serde::{Deserialize, Serialize};

pub(crate) const LAST_NOTEBOOK_KEY: &str = "notebook_app_last_notebook_id";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = local_storage()?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn remove_from_storage(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

pub(crate) fn load_last_notebook_id() -> Option<String> {
    load_json_from_storage::<String>(LAST_NOTEBOOK_KEY).filter(|id| !id.trim().is_empty())
}

pub(crate) fn save_last_notebook_id(id: Option<&str>) {
    match id {
        Some(id) if !id.trim().is_empty() => save_json_to_storage(LAST_NOTEBOOK_KEY, &id),
        _ => remove_from_storage(LAST_NOTEBOOK_KEY),
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_last_notebook_roundtrip() {
        save_last_notebook_id(Some("nb-42"));
        assert_eq!(load_last_notebook_id().as_deref(), Some("nb-42"));

        save_last_notebook_id(None);
        assert!(load_last_notebook_id().is_none());
    }

    #[wasm_bindgen_test]
    fn test_garbage_value_is_ignored() {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(LAST_NOTEBOOK_KEY, "{not json");
        }
        assert!(load_last_notebook_id().is_none());
        remove_from_storage(LAST_NOTEBOOK_KEY);
    }
}
