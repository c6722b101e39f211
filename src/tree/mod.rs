//! Notebook → section → page hierarchy with selection and expansion state.
//!
//! `TreeState` never talks to the network. Each transition updates the
//! snapshot and hands back the [`Fetch`]es the caller should run; results
//! come back through [`TreeState::apply`]. Every fetch carries the generation
//! of its level at issue time, and a newer selection at that level (or any
//! level above) makes older results stale.

use crate::models::{sort_pages, sort_sections, Notebook, Page, Section};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum TreeError {
    #[error("No notebook selected")]
    NoActiveNotebook,
    #[error("No section selected")]
    NoActiveSection,
    #[error("Unknown notebook: {0}")]
    UnknownNotebook(String),
    #[error("Section {0} is not part of the selected notebook")]
    UnknownSection(String),
    #[error("Page {0} is not part of the selected notebook")]
    UnknownPage(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fetch {
    Notebooks { token: u64 },
    /// Sections of the notebook plus every page of those sections.
    Tree { notebook_id: String, token: u64 },
    SectionPages { section_id: String, token: u64 },
    Page { page_id: String, token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Loaded {
    Notebooks {
        token: u64,
        notebooks: Vec<Notebook>,
    },
    Tree {
        token: u64,
        notebook_id: String,
        sections: Vec<Section>,
        pages: Vec<Page>,
    },
    SectionPages {
        token: u64,
        section_id: String,
        pages: Vec<Page>,
    },
    Page {
        token: u64,
        page: Page,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Generations {
    notebooks: u64,
    tree: u64,
    section_pages: u64,
    page: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TreeState {
    notebooks: Vec<Notebook>,
    /// Sections of the active notebook, in display order.
    sections: Vec<Section>,
    /// Pages of those sections, each section's pages in display order.
    pages: Vec<Page>,

    active_notebook: Option<String>,
    active_section: Option<String>,
    /// The page shown in the editor, as last fetched or saved.
    active_page: Option<Page>,

    expanded: BTreeSet<String>,
    generations: Generations,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- navigation -----

    pub fn load_notebooks(&mut self) -> Fetch {
        self.generations.notebooks += 1;
        Fetch::Notebooks {
            token: self.generations.notebooks,
        }
    }

    pub fn select_notebook(&mut self, id: &str) -> Result<Fetch, TreeError> {
        if !self.notebooks.iter().any(|n| n.id == id) {
            return Err(TreeError::UnknownNotebook(id.to_string()));
        }

        if self.active_notebook.as_deref() != Some(id) {
            self.sections.clear();
            self.pages.clear();
            self.expanded.clear();
        }
        self.active_notebook = Some(id.to_string());
        self.clear_section();

        self.generations.tree += 1;
        self.generations.section_pages += 1;
        self.generations.page += 1;

        Ok(Fetch::Tree {
            notebook_id: id.to_string(),
            token: self.generations.tree,
        })
    }

    pub fn select_section(&mut self, id: &str) -> Result<Fetch, TreeError> {
        if self.active_notebook.is_none() {
            return Err(TreeError::NoActiveNotebook);
        }
        if !self.sections.iter().any(|s| s.id == id) {
            return Err(TreeError::UnknownSection(id.to_string()));
        }

        self.active_section = Some(id.to_string());
        self.active_page = None;

        self.generations.section_pages += 1;
        self.generations.page += 1;

        Ok(Fetch::SectionPages {
            section_id: id.to_string(),
            token: self.generations.section_pages,
        })
    }

    /// A page can be picked straight from the tree, so a cached page of the
    /// active notebook is accepted even when no section is active yet.
    pub fn select_page(&mut self, id: &str) -> Result<Fetch, TreeError> {
        if self.active_notebook.is_none() {
            return Err(TreeError::NoActiveNotebook);
        }

        match self.pages.iter().find(|p| p.id == id) {
            Some(page) => {
                if !self.has_section(&page.section_id) {
                    return Err(TreeError::UnknownPage(id.to_string()));
                }
                self.active_section = Some(page.section_id.clone());
            }
            None if self.active_section.is_none() => return Err(TreeError::NoActiveSection),
            None => {}
        }

        self.generations.page += 1;
        Ok(Fetch::Page {
            page_id: id.to_string(),
            token: self.generations.page,
        })
    }

    /// No-op for sections without cached pages.
    pub fn toggle_section(&mut self, id: &str) {
        if !self.has_children(id) {
            return;
        }
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    // ----- fetch results -----

    /// Returns false when the result was stale and dropped.
    pub fn apply(&mut self, loaded: Loaded) -> bool {
        match loaded {
            Loaded::Notebooks { token, notebooks } => {
                if token != self.generations.notebooks {
                    return false;
                }
                self.notebooks = notebooks;

                let still_there = self
                    .active_notebook
                    .as_deref()
                    .is_some_and(|id| self.notebooks.iter().any(|n| n.id == id));
                if !still_there && self.active_notebook.is_some() {
                    self.clear_notebook();
                }
                true
            }

            Loaded::Tree {
                token,
                notebook_id,
                mut sections,
                mut pages,
            } => {
                if token != self.generations.tree
                    || self.active_notebook.as_deref() != Some(notebook_id.as_str())
                {
                    return false;
                }

                sections.retain(|s| s.notebook_id == notebook_id);
                sort_sections(&mut sections);
                pages.retain(|p| sections.iter().any(|s| s.id == p.section_id));
                sort_pages(&mut pages);

                self.sections = sections;
                self.pages = pages;
                self.reconcile();
                true
            }

            Loaded::SectionPages {
                token,
                section_id,
                mut pages,
            } => {
                if token != self.generations.section_pages || !self.has_section(&section_id) {
                    return false;
                }

                pages.retain(|p| p.section_id == section_id);
                sort_pages(&mut pages);

                self.pages.retain(|p| p.section_id != section_id);
                self.pages.extend(pages);
                self.reconcile();
                true
            }

            Loaded::Page { token, page } => {
                if token != self.generations.page || !self.has_section(&page.section_id) {
                    return false;
                }

                self.active_section = Some(page.section_id.clone());
                self.expanded.insert(page.section_id.clone());
                self.upsert_cached_page(&page);
                self.active_page = Some(page);
                true
            }
        }
    }

    // ----- mutation results -----

    /// After a notebook was created or renamed.
    pub fn notebook_saved(&mut self) -> Fetch {
        self.load_notebooks()
    }

    pub fn notebook_deleted(&mut self, id: &str) -> Fetch {
        if self.active_notebook.as_deref() == Some(id) {
            self.clear_notebook();
        }
        self.notebooks.retain(|n| n.id != id);
        self.load_notebooks()
    }

    pub fn section_saved(&mut self, section: &Section) -> Result<Fetch, TreeError> {
        self.refresh_tree_for(&section.notebook_id)
    }

    pub fn section_deleted(&mut self, id: &str) -> Result<Fetch, TreeError> {
        if self.active_section.as_deref() == Some(id) {
            self.clear_section();
            self.generations.section_pages += 1;
            self.generations.page += 1;
        }
        self.expanded.remove(id);
        self.refresh_tree()
    }

    pub fn page_saved(&mut self, page: Page) -> Result<Fetch, TreeError> {
        self.upsert_cached_page(&page);
        if self.active_page.as_ref().is_some_and(|p| p.id == page.id) {
            self.active_page = Some(page);
        }
        self.refresh_tree()
    }

    /// The created page becomes the active one straight away; the tree
    /// refresh then brings the cache in line with the backend.
    pub fn page_created(&mut self, page: Page) -> Result<Fetch, TreeError> {
        if !self.has_section(&page.section_id) {
            return Err(TreeError::UnknownSection(page.section_id));
        }

        self.generations.page += 1;
        self.active_section = Some(page.section_id.clone());
        self.expanded.insert(page.section_id.clone());
        self.upsert_cached_page(&page);
        self.active_page = Some(page);

        self.refresh_tree()
    }

    pub fn page_deleted(&mut self, id: &str) -> Result<Fetch, TreeError> {
        if self.active_page.as_ref().is_some_and(|p| p.id == id) {
            self.active_page = None;
            self.generations.page += 1;
        }
        self.refresh_tree()
    }

    /// Re-fetch the active notebook's tree without touching selection.
    pub fn refresh_tree(&mut self) -> Result<Fetch, TreeError> {
        let notebook_id = self
            .active_notebook
            .clone()
            .ok_or(TreeError::NoActiveNotebook)?;
        self.refresh_tree_for(&notebook_id)
    }

    fn refresh_tree_for(&mut self, notebook_id: &str) -> Result<Fetch, TreeError> {
        if self.active_notebook.as_deref() != Some(notebook_id) {
            return Err(TreeError::NoActiveNotebook);
        }
        self.generations.tree += 1;
        Ok(Fetch::Tree {
            notebook_id: notebook_id.to_string(),
            token: self.generations.tree,
        })
    }

    // ----- queries -----

    pub fn notebooks(&self) -> &[Notebook] {
        &self.notebooks
    }

    /// Case-insensitive match on name or description; a blank query keeps all.
    pub fn filter_notebooks(&self, query: &str) -> Vec<&Notebook> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return self.notebooks.iter().collect();
        }
        self.notebooks
            .iter()
            .filter(|n| {
                n.name.to_lowercase().contains(&q)
                    || n
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&q))
            })
            .collect()
    }

    pub fn visible_sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn pages_of<'a>(&'a self, section_id: &'a str) -> impl Iterator<Item = &'a Page> + 'a {
        self.pages.iter().filter(move |p| p.section_id == section_id)
    }

    pub fn has_children(&self, section_id: &str) -> bool {
        self.pages.iter().any(|p| p.section_id == section_id)
    }

    pub fn is_expanded(&self, section_id: &str) -> bool {
        self.expanded.contains(section_id)
    }

    pub fn active_notebook_id(&self) -> Option<&str> {
        self.active_notebook.as_deref()
    }

    pub fn active_notebook(&self) -> Option<&Notebook> {
        let id = self.active_notebook.as_deref()?;
        self.notebooks.iter().find(|n| n.id == id)
    }

    pub fn active_section_id(&self) -> Option<&str> {
        self.active_section.as_deref()
    }

    pub fn active_section(&self) -> Option<&Section> {
        let id = self.active_section.as_deref()?;
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.active_page.as_ref()
    }

    pub fn active_page_id(&self) -> Option<&str> {
        self.active_page.as_ref().map(|p| p.id.as_str())
    }

    /// Next `display_order` for a new child of the notebook / section.
    pub fn next_section_order(&self) -> u32 {
        self.sections
            .iter()
            .map(|s| s.display_order + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn next_page_order(&self, section_id: &str) -> u32 {
        self.pages_of(section_id)
            .map(|p| p.display_order + 1)
            .max()
            .unwrap_or(0)
    }

    // ----- helpers -----

    fn has_section(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s.id == id)
    }

    fn clear_section(&mut self) {
        self.active_section = None;
        self.active_page = None;
    }

    fn clear_notebook(&mut self) {
        self.active_notebook = None;
        self.clear_section();
        self.sections.clear();
        self.pages.clear();
        self.expanded.clear();
        self.generations.tree += 1;
        self.generations.section_pages += 1;
        self.generations.page += 1;
    }

    fn upsert_cached_page(&mut self, page: &Page) {
        match self.pages.iter_mut().find(|p| p.id == page.id) {
            Some(cached) => *cached = page.clone(),
            None => {
                self.pages.push(page.clone());
                sort_pages(&mut self.pages);
            }
        }
    }

    /// Drop selection and expand flags whose targets left the cache.
    fn reconcile(&mut self) {
        if let Some(id) = self.active_section.as_deref() {
            if !self.has_section(id) {
                self.clear_section();
            }
        }

        if let Some(id) = self.active_page.as_ref().map(|p| p.id.clone()) {
            if !self.pages.iter().any(|p| p.id == id) {
                self.active_page = None;
            }
        }

        let pages = &self.pages;
        self.expanded
            .retain(|sid| pages.iter().any(|p| &p.section_id == sid));
    }
}
