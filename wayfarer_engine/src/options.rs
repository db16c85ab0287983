//! Menu option lists.
//!
//! Displayables (locations, dialogs, fights) describe their choices as an
//! [`OptionList`]; the view renders the current page as a numbered menu and
//! the shell maps a selection back to the option's [`GameEvent`]. Long lists
//! (travel menus, say) are split into pages with synthetic Next/Prev/Cancel
//! entries supplied at render time.

use crate::event::GameEvent;

/// Options shown per page before paging kicks in.
pub const PAGE_SIZE: usize = 8;

/// One selectable entry on a menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuOption {
    pub label: String,
    pub event: GameEvent,
    pub visible: bool,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, event: GameEvent) -> MenuOption {
        MenuOption {
            label: label.into(),
            event,
            visible: true,
        }
    }

    pub fn hidden(label: impl Into<String>, event: GameEvent) -> MenuOption {
        MenuOption {
            label: label.into(),
            event,
            visible: false,
        }
    }
}

/// An ordered, paged collection of menu options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionList {
    pages: Vec<Vec<MenuOption>>,
    page: usize,
}

impl OptionList {
    /// A single-page list. Empty input produces an empty list.
    pub fn new(entries: Vec<MenuOption>) -> OptionList {
        if entries.is_empty() {
            return OptionList::default();
        }
        OptionList {
            pages: vec![entries],
            page: 0,
        }
    }

    /// Split entries into pages of [`PAGE_SIZE`].
    pub fn paged(entries: Vec<MenuOption>) -> OptionList {
        if entries.is_empty() {
            return OptionList::default();
        }
        let mut pages = Vec::new();
        let mut current = Vec::new();
        for entry in entries {
            current.push(entry);
            if current.len() == PAGE_SIZE {
                pages.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            pages.push(current);
        }
        OptionList { pages, page: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(Vec::is_empty)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn has_next_page(&self) -> bool {
        self.page + 1 < self.pages.len()
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 0
    }

    /// The same list opened at another page (clamped to valid pages).
    pub fn with_page(&self, page: usize) -> OptionList {
        let clamped = if self.pages.is_empty() {
            0
        } else {
            page.min(self.pages.len() - 1)
        };
        OptionList {
            pages: self.pages.clone(),
            page: clamped,
        }
    }

    /// Every entry on the current page, hidden ones included.
    pub fn current(&self) -> &[MenuOption] {
        self.pages.get(self.page).map_or(&[], Vec::as_slice)
    }

    /// The visible entries on the current page, in menu order. Selection
    /// numbers index into this.
    pub fn selectable(&self) -> Vec<&MenuOption> {
        self.current().iter().filter(|o| o.visible).collect()
    }
}
