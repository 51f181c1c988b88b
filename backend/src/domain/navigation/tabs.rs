//! Open screens as tabs. A screen is opened at most once; opening it again
//! focuses the existing tab.

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

/// What to open: the menu item behind the tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDescriptor {
    pub menu_id: String,
    pub submenu_id: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub menu_id: String,
    pub submenu_id: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct TabManager {
    tabs: Vec<Tab>,
    active: Option<TabId>,
    next_id: u64,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the screen, or focus it if a tab for the same menu item exists
    pub fn open_tab(&mut self, descriptor: TabDescriptor) -> TabId {
        if let Some(existing) = self
            .tabs
            .iter()
            .find(|t| t.menu_id == descriptor.menu_id && t.submenu_id == descriptor.submenu_id)
        {
            self.active = Some(existing.id);
            return existing.id;
        }

        self.next_id += 1;
        let id = TabId(self.next_id);
        debug!("Opening tab {} ({}/{})", descriptor.label, descriptor.menu_id, descriptor.submenu_id);
        self.tabs.push(Tab {
            id,
            menu_id: descriptor.menu_id,
            submenu_id: descriptor.submenu_id,
            label: descriptor.label,
            description: descriptor.description,
        });
        self.active = Some(id);
        id
    }

    /// Close a tab. If it was active, focus moves to its right neighbour,
    /// else its left one. Returns false for an unknown id.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        let Some(index) = self.tabs.iter().position(|t| t.id == id) else {
            return false;
        };
        self.tabs.remove(index);

        if self.active == Some(id) {
            self.active = self
                .tabs
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|left| self.tabs.get(left)))
                .map(|t| t.id);
        }
        true
    }

    /// Focus a tab; an unknown id changes nothing
    pub fn set_active(&mut self, id: TabId) -> bool {
        if self.tabs.iter().any(|t| t.id == id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active.and_then(|id| self.tabs.iter().find(|t| t.id == id))
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(submenu_id: &str) -> TabDescriptor {
        TabDescriptor {
            menu_id: "controle".to_string(),
            submenu_id: submenu_id.to_string(),
            label: submenu_id.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_open_existing_focuses_it() {
        let mut tabs = TabManager::new();
        let students = tabs.open_tab(descriptor("alunos"));
        tabs.open_tab(descriptor("matriculas"));

        assert_eq!(tabs.open_tab(descriptor("alunos")), students);
        assert_eq!(tabs.tabs().len(), 2);
        assert_eq!(tabs.active().unwrap().id, students);
    }

    #[test]
    fn test_close_active_moves_right_then_left() {
        let mut tabs = TabManager::new();
        let a = tabs.open_tab(descriptor("alunos"));
        let b = tabs.open_tab(descriptor("matriculas"));
        let c = tabs.open_tab(descriptor("turmas"));

        tabs.set_active(b);
        assert!(tabs.close_tab(b));
        assert_eq!(tabs.active().unwrap().id, c);

        assert!(tabs.close_tab(c));
        assert_eq!(tabs.active().unwrap().id, a);

        assert!(tabs.close_tab(a));
        assert!(tabs.active().is_none());
        assert!(tabs.tabs().is_empty());
    }

    #[test]
    fn test_close_inactive_keeps_focus() {
        let mut tabs = TabManager::new();
        let a = tabs.open_tab(descriptor("alunos"));
        let b = tabs.open_tab(descriptor("matriculas"));

        assert!(tabs.close_tab(a));
        assert_eq!(tabs.active().unwrap().id, b);
        assert!(!tabs.close_tab(a));
    }

    #[test]
    fn test_set_active_unknown_is_rejected() {
        let mut tabs = TabManager::new();
        let a = tabs.open_tab(descriptor("alunos"));
        assert!(!tabs.set_active(TabId(99)));
        assert_eq!(tabs.active().unwrap().id, a);
    }
}
