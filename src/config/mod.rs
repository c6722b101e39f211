use serde::{Deserialize, Serialize};

pub(crate) const FALLBACK_API_URL: &str = "http://localhost:8000";
pub(crate) const DEFAULT_TOAST_MS: u32 = 3000;
pub(crate) const SEARCH_DEBOUNCE_MS: u32 = 300;

/// Runtime settings injected by the hosting page as `window.ENV`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub toast_ms: u32,
}

impl EnvConfig {
    pub fn new() -> Self {
        let env = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object());

        let read = |key: &str| {
            env.as_ref()
                .and_then(|env| js_sys::Reflect::get(env, &key.into()).ok())
        };

        // Both `API_URL` and the older `api_url` spelling are accepted.
        let api_url = read("API_URL")
            .and_then(|v| v.as_string())
            .or_else(|| read("api_url").and_then(|v| v.as_string()));

        let toast_ms = read("TOAST_MS").and_then(|v| {
            v.as_f64()
                .or_else(|| v.as_string().and_then(|s| s.trim().parse().ok()))
        });

        Self::resolve(api_url, location_origin(), toast_ms)
    }

    /// Explicit URL, then the page's own origin, then the local default.
    pub fn resolve(api_url: Option<String>, origin: Option<String>, toast_ms: Option<f64>) -> Self {
        let api_url = api_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .or_else(|| origin.filter(|o| o.starts_with("http")))
            .unwrap_or_else(|| FALLBACK_API_URL.to_string());

        let toast_ms = toast_ms
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .map(|ms| ms.min(u32::MAX as f64) as u32)
            .unwrap_or(DEFAULT_TOAST_MS);

        Self { api_url, toast_ms }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn location_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_url_wins() {
        let cfg = EnvConfig::resolve(
            Some(" https://notes.example.com ".to_string()),
            Some("http://localhost:3000".to_string()),
            None,
        );
        assert_eq!(cfg.api_url, "https://notes.example.com");
        assert_eq!(cfg.toast_ms, DEFAULT_TOAST_MS);
    }

    #[test]
    fn test_origin_then_fallback() {
        let cfg = EnvConfig::resolve(None, Some("http://localhost:3000".to_string()), None);
        assert_eq!(cfg.api_url, "http://localhost:3000");

        // file:// pages report "null" as their origin.
        let cfg = EnvConfig::resolve(Some(String::new()), Some("null".to_string()), None);
        assert_eq!(cfg.api_url, FALLBACK_API_URL);
    }

    #[test]
    fn test_toast_ms() {
        assert_eq!(EnvConfig::resolve(None, None, Some(5000.0)).toast_ms, 5000);
        assert_eq!(EnvConfig::resolve(None, None, Some(-1.0)).toast_ms, DEFAULT_TOAST_MS);
        assert_eq!(
            EnvConfig::resolve(None, None, Some(f64::NAN)).toast_ms,
            DEFAULT_TOAST_MS
        );
    }
}
