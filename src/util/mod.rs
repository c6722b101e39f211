use wasm_bindgen::JsCast;

const MINUTE_MS: f64 = 60_000.0;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;
const DAY_MS: f64 = 24.0 * HOUR_MS;

/// Run `f` once after `ms`. Returns the browser timer id.
pub(crate) fn set_timeout_ms(f: impl FnOnce() + 'static, ms: u32) -> Option<i32> {
    let cb = wasm_bindgen::closure::Closure::once_into_js(f);
    web_sys::window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            ms.min(i32::MAX as u32) as i32,
        )
        .ok()
}

pub(crate) fn clear_timeout(id: i32) {
    if let Some(win) = web_sys::window() {
        win.clear_timeout_with_handle(id);
    }
}

/// Relative label for an age in milliseconds. `None` once the age reaches a
/// week, where callers show an absolute date instead.
pub(crate) fn relative_label(diff_ms: f64) -> Option<String> {
    if diff_ms < MINUTE_MS {
        return Some("Just now".to_string());
    }
    if diff_ms < HOUR_MS {
        let m = (diff_ms / MINUTE_MS).floor() as i64;
        return Some(format!("{m} minute{} ago", if m == 1 { "" } else { "s" }));
    }
    if diff_ms < DAY_MS {
        let h = (diff_ms / HOUR_MS).floor() as i64;
        return Some(format!("{h} hour{} ago", if h == 1 { "" } else { "s" }));
    }
    if diff_ms < 7.0 * DAY_MS {
        let d = (diff_ms / DAY_MS).floor() as i64;
        return Some(format!("{d} day{} ago", if d == 1 { "" } else { "s" }));
    }
    None
}

/// "Last updated" text for a backend timestamp. Unparseable input is shown
/// as-is.
pub(crate) fn format_updated_at(timestamp: &str) -> String {
    let ts = timestamp.trim();
    if ts.is_empty() {
        return "Never".to_string();
    }

    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from(ts));
    let then = date.get_time();
    if then.is_nan() {
        return ts.to_string();
    }

    match relative_label((js_sys::Date::now() - then).max(0.0)) {
        Some(label) => label,
        None => date
            .to_locale_date_string("default", &wasm_bindgen::JsValue::UNDEFINED)
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_label_thresholds() {
        assert_eq!(relative_label(0.0).as_deref(), Some("Just now"));
        assert_eq!(relative_label(59_999.0).as_deref(), Some("Just now"));
        assert_eq!(relative_label(60_000.0).as_deref(), Some("1 minute ago"));
        assert_eq!(relative_label(5.0 * MINUTE_MS).as_deref(), Some("5 minutes ago"));
        assert_eq!(relative_label(HOUR_MS).as_deref(), Some("1 hour ago"));
        assert_eq!(relative_label(23.9 * HOUR_MS).as_deref(), Some("23 hours ago"));
        assert_eq!(relative_label(DAY_MS).as_deref(), Some("1 day ago"));
        assert_eq!(relative_label(6.5 * DAY_MS).as_deref(), Some("6 days ago"));
        assert_eq!(relative_label(7.0 * DAY_MS), None);
    }
}
