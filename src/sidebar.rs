//! Story library sidebar: an exclusive accordion over the prompt catalog.

use crate::catalog::PromptCatalog;

/// Event emitted by the sidebar for the chat view to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    /// A prompt was picked; carries the literal prompt text.
    PromptSelected(String),
}

/// One visible row of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarRow {
    /// Category header at the given catalog index.
    Category(usize),
    /// Prompt `prompt` of category `category`.
    Prompt { category: usize, prompt: usize },
}

/// Sidebar state: the catalog, which category is open, and the keyboard cursor.
#[derive(Debug, Clone)]
pub struct Sidebar {
    catalog: PromptCatalog,
    expanded: Option<usize>,
    cursor: usize,
}

impl Sidebar {
    /// Create a sidebar over the given catalog with every category collapsed.
    pub fn new(catalog: PromptCatalog) -> Self {
        Self {
            catalog,
            expanded: None,
            cursor: 0,
        }
    }

    pub fn catalog(&self) -> &PromptCatalog {
        &self.catalog
    }

    /// Name of the expanded category, if any.
    pub fn expanded(&self) -> Option<&str> {
        self.expanded
            .and_then(|i| self.catalog.categories().get(i))
            .map(|c| c.name.as_str())
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Toggle a category by name.
    ///
    /// Collapses it when it is the open one, otherwise opens it and closes
    /// whichever other category was open. Unknown names are ignored.
    pub fn toggle_category(&mut self, name: &str) {
        if let Some(index) = self.catalog.position(name) {
            self.toggle_index(index);
        }
    }

    fn toggle_index(&mut self, index: usize) {
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
        // Keep the cursor on the header that was just toggled.
        self.cursor = self
            .rows()
            .iter()
            .position(|row| *row == SidebarRow::Category(index))
            .unwrap_or(0);
    }

    /// Emit a prompt selection. Does not touch sidebar state.
    pub fn select_prompt(&self, text: &str) -> SidebarEvent {
        SidebarEvent::PromptSelected(text.to_string())
    }

    /// Visible rows in display order: every header, plus the prompts of the
    /// expanded category directly under its header.
    pub fn rows(&self) -> Vec<SidebarRow> {
        let mut rows = Vec::new();
        for (i, category) in self.catalog.categories().iter().enumerate() {
            rows.push(SidebarRow::Category(i));
            if self.expanded == Some(i) {
                rows.extend((0..category.prompts.len()).map(|p| SidebarRow::Prompt {
                    category: i,
                    prompt: p,
                }));
            }
        }
        rows
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        let last = self.rows().len().saturating_sub(1);
        if self.cursor < last {
            self.cursor += 1;
        }
    }

    /// Act on the row under the cursor: toggle a header or select a prompt.
    pub fn activate(&mut self) -> Option<SidebarEvent> {
        match self.rows().get(self.cursor).copied()? {
            SidebarRow::Category(index) => {
                self.toggle_index(index);
                None
            }
            SidebarRow::Prompt { category, prompt } => {
                let text = self.catalog.categories()[category].prompts[prompt].clone();
                Some(self.select_prompt(&text))
            }
        }
    }
}
