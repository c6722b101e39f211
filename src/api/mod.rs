use crate::config::EnvConfig;
use crate::models::{Notebook, Page, Section};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    /// Referential integrity: the backend refused because of related rows.
    Conflict,
    Parse,
    /// Rejected before any request was made.
    Validation,
}

#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Validation,
            message: message.into(),
        }
    }

    fn http(status: u16, body: &str, ctx: &str) -> Self {
        let kind = if status == 409 {
            ApiErrorKind::Conflict
        } else {
            ApiErrorKind::Http
        };
        Self {
            kind,
            message: extract_detail(body).unwrap_or_else(|| format!("{ctx} ({status})")),
        }
    }

    /// A rejected delete is always a referential-integrity failure.
    fn into_conflict(self) -> Self {
        match self.kind {
            ApiErrorKind::Http => Self {
                kind: ApiErrorKind::Conflict,
                ..self
            },
            _ => self,
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Human-readable message from an error body: `detail`, then `message`, then
/// the `msg` fields of a validation list.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let data: serde_json::Value = serde_json::from_str(body).ok()?;

    let non_empty = |v: Option<&serde_json::Value>| {
        v.and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(detail) = non_empty(data.get("detail")) {
        return Some(detail);
    }
    if let Some(message) = non_empty(data.get("message")) {
        return Some(message);
    }

    let list = data
        .get("errors")
        .or_else(|| data.get("detail"))
        .and_then(|v| v.as_array())?;
    let msgs: Vec<&str> = list
        .iter()
        .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
        .filter(|m| !m.trim().is_empty())
        .collect();
    if msgs.is_empty() {
        None
    } else {
        Some(msgs.join("; "))
    }
}

/// List endpoints return either a bare array or `{ "<key>": [...] }`.
/// Items that do not parse are skipped.
pub(crate) fn parse_list<T: DeserializeOwned>(data: serde_json::Value, key: &str) -> Vec<T> {
    let list = match data {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove(key) {
            Some(serde_json::Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    list.into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

const NAME_MAX: usize = 100;
const TITLE_MAX: usize = 255;

fn validate_len(field: &str, value: &str, max: usize) -> ApiResult<()> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    if len > max {
        return Err(ApiError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub(crate) fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NotebookRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NotebookRequest {
    /// Trims input and drops blank optional fields.
    pub fn new(name: &str, color: &str, description: &str) -> Self {
        let opt = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            name: name.trim().to_string(),
            color: opt(color),
            description: opt(description),
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        validate_len("Name", &self.name, NAME_MAX)?;
        if let Some(color) = &self.color {
            if !is_hex_color(color) {
                return Err(ApiError::validation("Color must look like #RRGGBB"));
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SectionRequest {
    pub notebook_id: String,
    pub name: String,
    pub display_order: u32,
}

impl SectionRequest {
    pub fn validate(&self) -> ApiResult<()> {
        validate_len("Name", &self.name, NAME_MAX)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub section_id: String,
    pub title: String,
    pub content: String,
    pub display_order: u32,
}

impl PageRequest {
    pub fn validate(&self) -> ApiResult<()> {
        validate_len("Title", &self.title, TITLE_MAX)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env(config: &EnvConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(res: reqwest::Response, ctx: &str) -> ApiResult<T> {
        let status = res.status();
        if status.is_success() {
            res.json().await.map_err(ApiError::parse)
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status.as_u16(), &body, ctx))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, ctx: &str) -> ApiResult<T> {
        tracing::debug!(path, "GET");
        let res = reqwest::Client::new()
            .get(self.url(path))
            .send()
            .await
            .map_err(ApiError::network)?;
        Self::read_json(res, ctx).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        ctx: &str,
    ) -> ApiResult<T> {
        tracing::debug!(%method, path, "send");
        let res = reqwest::Client::new()
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::network)?;
        Self::read_json(res, ctx).await
    }

    /// Success may come with an empty body (204), so nothing is parsed.
    async fn delete(&self, path: &str, ctx: &str) -> ApiResult<()> {
        tracing::debug!(path, "DELETE");
        let res = reqwest::Client::new()
            .delete(self.url(path))
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status.as_u16(), &body, ctx).into_conflict())
        }
    }

    // ----- notebooks -----

    pub async fn list_notebooks(&self) -> ApiResult<Vec<Notebook>> {
        let data: serde_json::Value = self
            .get("/api/notebooks/", "Failed to load notebooks")
            .await?;
        Ok(parse_list(data, "notebooks"))
    }

    pub async fn create_notebook(&self, req: &NotebookRequest) -> ApiResult<Notebook> {
        req.validate()?;
        self.send_json(Method::POST, "/api/notebooks/", req, "Failed to create notebook")
            .await
    }

    pub async fn update_notebook(&self, id: &str, req: &NotebookRequest) -> ApiResult<Notebook> {
        req.validate()?;
        self.send_json(
            Method::PUT,
            &format!("/api/notebooks/{}", urlencoding::encode(id)),
            req,
            "Failed to update notebook",
        )
        .await
    }

    pub async fn delete_notebook(&self, id: &str) -> ApiResult<()> {
        self.delete(
            &format!("/api/notebooks/{}", urlencoding::encode(id)),
            "Failed to delete notebook",
        )
        .await
    }

    // ----- sections -----

    pub async fn list_sections(&self, notebook_id: &str) -> ApiResult<Vec<Section>> {
        let data: serde_json::Value = self
            .get(
                &format!(
                    "/api/sections/?notebook_id={}",
                    urlencoding::encode(notebook_id)
                ),
                "Failed to load sections",
            )
            .await?;
        Ok(parse_list(data, "sections"))
    }

    pub async fn create_section(&self, req: &SectionRequest) -> ApiResult<Section> {
        req.validate()?;
        self.send_json(Method::POST, "/api/sections/", req, "Failed to create section")
            .await
    }

    pub async fn update_section(&self, id: &str, req: &SectionRequest) -> ApiResult<Section> {
        req.validate()?;
        self.send_json(
            Method::PUT,
            &format!("/api/sections/{}", urlencoding::encode(id)),
            req,
            "Failed to update section",
        )
        .await
    }

    pub async fn delete_section(&self, id: &str) -> ApiResult<()> {
        self.delete(
            &format!("/api/sections/{}", urlencoding::encode(id)),
            "Failed to delete section",
        )
        .await
    }

    // ----- pages -----

    pub async fn list_pages(&self, section_id: &str) -> ApiResult<Vec<Page>> {
        let data: serde_json::Value = self
            .get(
                &format!("/api/pages/?section_id={}", urlencoding::encode(section_id)),
                "Failed to load pages",
            )
            .await?;
        Ok(parse_list(data, "pages"))
    }

    pub async fn get_page(&self, id: &str) -> ApiResult<Page> {
        self.get(
            &format!("/api/pages/{}", urlencoding::encode(id)),
            "Failed to load page",
        )
        .await
    }

    pub async fn create_page(&self, req: &PageRequest) -> ApiResult<Page> {
        req.validate()?;
        self.send_json(Method::POST, "/api/pages/", req, "Failed to create page")
            .await
    }

    pub async fn update_page(&self, id: &str, req: &PageRequest) -> ApiResult<Page> {
        req.validate()?;
        self.send_json(
            Method::PUT,
            &format!("/api/pages/{}", urlencoding::encode(id)),
            req,
            "Failed to save page",
        )
        .await
    }

    pub async fn delete_page(&self, id: &str) -> ApiResult<()> {
        self.delete(
            &format!("/api/pages/{}", urlencoding::encode(id)),
            "Failed to delete page",
        )
        .await
    }

    /// Sections of a notebook plus all of their pages.
    pub async fn load_tree(&self, notebook_id: &str) -> ApiResult<(Vec<Section>, Vec<Page>)> {
        let sections = self.list_sections(notebook_id).await?;
        let mut pages = Vec::new();
        for section in &sections {
            pages.extend(self.list_pages(&section.id).await?);
        }
        Ok((sections, pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_prefers_detail_string() {
        let body = r#"{"error":"Conflict","message":"Duplicate","detail":"Name already used"}"#;
        assert_eq!(extract_detail(body).as_deref(), Some("Name already used"));
    }

    #[test]
    fn test_extract_detail_falls_back_to_message() {
        let body = r#"{"error":"Internal Server Error","message":"Something broke"}"#;
        assert_eq!(extract_detail(body).as_deref(), Some("Something broke"));
    }

    #[test]
    fn test_extract_detail_joins_validation_errors() {
        let body = r#"{"error":"Validation Error","message":"","errors":[{"msg":"name too long"},{"msg":"bad color"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("name too long; bad color")
        );

        let fastapi = r#"{"detail":[{"loc":["body","title"],"msg":"field required"}]}"#;
        assert_eq!(extract_detail(fastapi).as_deref(), Some("field required"));
    }

    #[test]
    fn test_extract_detail_none_for_unusable_bodies() {
        assert_eq!(extract_detail(""), None);
        assert_eq!(extract_detail("<html>502</html>"), None);
        assert_eq!(extract_detail(r#"{"detail":""}"#), None);
    }

    #[test]
    fn test_http_error_kinds_and_fallback() {
        let e = ApiError::http(409, r#"{"detail":"Exists"}"#, "Failed to create notebook");
        assert_eq!(e.kind, ApiErrorKind::Conflict);
        assert_eq!(e.to_string(), "Exists");

        let e = ApiError::http(500, "", "Failed to load notebooks");
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert_eq!(e.to_string(), "Failed to load notebooks (500)");
    }

    #[test]
    fn test_rejected_delete_is_conflict() {
        let body = r#"{"detail":"Cannot delete section: contains 3 active page(s). Delete or move pages first."}"#;
        let e = ApiError::http(400, body, "Failed to delete section").into_conflict();
        assert_eq!(e.kind, ApiErrorKind::Conflict);
        assert!(e.message.starts_with("Cannot delete section"));

        let net = ApiError::validation("x").into_conflict();
        assert_eq!(net.kind, ApiErrorKind::Validation);
    }

    #[test]
    fn test_parse_list_accepts_both_shapes() {
        let bare = serde_json::json!([
            {"id": "s1", "notebook_id": "n1", "name": "Ideas", "display_order": 0},
            {"id": 7},
            {"id": "s2", "notebook_id": "n1", "name": "Todo"}
        ]);
        let sections: Vec<Section> = parse_list(bare, "sections");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].display_order, 0);

        let wrapped = serde_json::json!({"pages": [
            {"id": "p1", "section_id": "s1", "title": "Hello", "content": "x"}
        ]});
        let pages: Vec<Page> = parse_list(wrapped, "pages");
        assert_eq!(pages[0].title, "Hello");

        let other: Vec<Page> = parse_list(serde_json::json!({"items": []}), "pages");
        assert!(other.is_empty());
    }

    #[test]
    fn test_notebook_request_validation() {
        let req = NotebookRequest::new("  Work  ", " #00ff7A ", "   ");
        assert_eq!(req.name, "Work");
        assert_eq!(req.color.as_deref(), Some("#00ff7A"));
        assert!(req.description.is_none());
        assert!(req.validate().is_ok());

        let err = NotebookRequest::new("", "", "").validate().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.message, "Name is required");

        let long = "n".repeat(101);
        assert!(NotebookRequest::new(&long, "", "").validate().is_err());
        assert!(NotebookRequest::new("ok", "blue", "").validate().is_err());
        assert!(NotebookRequest::new("ok", "#12345G", "").validate().is_err());
    }

    #[test]
    fn test_notebook_request_skips_empty_optionals() {
        let body = serde_json::to_value(NotebookRequest::new("Work", "", "")).expect("serialize");
        assert_eq!(body, serde_json::json!({"name": "Work"}));
    }

    #[test]
    fn test_page_title_limit_counts_chars() {
        let mut req = PageRequest {
            section_id: "s".to_string(),
            title: "é".repeat(255),
            content: String::new(),
            display_order: 0,
        };
        assert!(req.validate().is_ok());
        req.title.push('é');
        assert!(req.validate().is_err());
        req.title = "   ".to_string();
        assert_eq!(req.validate().unwrap_err().message, "Title is required");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/".to_string());
        assert_eq!(client.url("/api/pages/"), "http://localhost:8000/api/pages/");
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color(crate::models::DEFAULT_NOTEBOOK_COLOR));
        assert!(!is_hex_color("#FFF"));
        assert!(!is_hex_color("0078D4"));
    }
}
