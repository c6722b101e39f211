use serde::{Deserialize, Serialize};

/// Default notebook color applied by the backend when none is sent.
pub(crate) const DEFAULT_NOTEBOOK_COLOR: &str = "#0078D4";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notebook {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub color: Option<String>,

    /// Older backends store a free-text description instead of a color.
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Section {
    pub id: String,
    pub notebook_id: String,
    pub name: String,

    #[serde(default)]
    pub display_order: u32,

    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Page {
    pub id: String,
    pub section_id: String,
    pub title: String,

    /// Raw Markdown.
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub display_order: u32,

    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Sort siblings by `display_order`. The sort is stable, so ties keep the
/// order the backend returned them in.
pub(crate) fn sort_sections(sections: &mut [Section]) {
    sections.sort_by_key(|s| s.display_order);
}

pub(crate) fn sort_pages(pages: &mut [Page]) {
    pages.sort_by_key(|p| p.display_order);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_contract_deserialize_with_extra_fields() {
        // Backend also sends parent_page_id, content_plain and deleted_at.
        let json = r##"{
            "id": "p1",
            "section_id": "s1",
            "parent_page_id": null,
            "title": "Groceries",
            "content": "- milk",
            "content_plain": "milk",
            "display_order": 2,
            "created_at": "2024-05-01T10:00:00",
            "updated_at": "2024-05-02T10:00:00",
            "deleted_at": null
        }"##;
        let page: Page = serde_json::from_str(json).expect("page should parse");
        assert_eq!(page.section_id, "s1");
        assert_eq!(page.display_order, 2);
        assert_eq!(page.updated_at.as_deref(), Some("2024-05-02T10:00:00"));
    }

    #[test]
    fn test_notebook_without_optional_fields() {
        let nb: Notebook =
            serde_json::from_str(r#"{"id":"n1","name":"Work"}"#).expect("notebook should parse");
        assert!(nb.color.is_none());
        assert!(nb.description.is_none());
    }

    #[test]
    fn test_sort_sections_is_stable_on_ties() {
        let mk = |id: &str, order: u32| Section {
            id: id.to_string(),
            notebook_id: "n".to_string(),
            name: id.to_string(),
            display_order: order,
            created_at: None,
            updated_at: None,
        };
        let mut sections = vec![mk("c", 1), mk("a", 0), mk("b", 1), mk("d", 0)];
        sort_sections(&mut sections);
        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d", "c", "b"]);
    }
}
