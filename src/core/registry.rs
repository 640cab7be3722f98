/*
 * Bidirectional lookup between stable string identifiers and the live UI's
 * action and menu handles. The host fills the registry at startup (before any
 * workspace is read) and must deregister a handle when the object behind it
 * is torn down. Lookups never fail hard: an absent entry yields `None`.
 */
use crate::core::error::RegistryError;
use crate::core::live_ui::{LiveEntry, LiveUi};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuHandle(pub u32);

// One direction pair; keeps both maps in lock-step.
#[derive(Debug)]
struct BiMap<H> {
    by_id: HashMap<String, H>,
    by_handle: HashMap<H, String>,
}

impl<H: Copy + Eq + std::hash::Hash> BiMap<H> {
    fn new() -> Self {
        BiMap {
            by_id: HashMap::new(),
            by_handle: HashMap::new(),
        }
    }

    fn insert(&mut self, handle: H, id: &str, raw: u32) -> Result<(), RegistryError> {
        if self.by_id.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }
        if self.by_handle.contains_key(&handle) {
            return Err(RegistryError::DuplicateHandle(raw));
        }
        self.by_id.insert(id.to_string(), handle);
        self.by_handle.insert(handle, id.to_string());
        Ok(())
    }

    fn remove_handle(&mut self, handle: H) -> Option<String> {
        let id = self.by_handle.remove(&handle)?;
        self.by_id.remove(&id);
        Some(id)
    }
}

#[derive(Debug)]
pub struct IdentifierRegistry {
    actions: BiMap<ActionHandle>,
    menus: BiMap<MenuHandle>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        IdentifierRegistry {
            actions: BiMap::new(),
            menus: BiMap::new(),
        }
    }

    pub fn register_action(&mut self, handle: ActionHandle, id: &str) -> Result<(), RegistryError> {
        self.actions.insert(handle, id, handle.0)
    }

    pub fn register_menu(&mut self, handle: MenuHandle, id: &str) -> Result<(), RegistryError> {
        self.menus.insert(handle, id, handle.0)
    }

    pub fn deregister_action(&mut self, handle: ActionHandle) -> Option<String> {
        self.actions.remove_handle(handle)
    }

    pub fn deregister_menu(&mut self, handle: MenuHandle) -> Option<String> {
        self.menus.remove_handle(handle)
    }

    pub fn action_handle(&self, id: &str) -> Option<ActionHandle> {
        self.actions.by_id.get(id).copied()
    }

    pub fn action_id(&self, handle: ActionHandle) -> Option<&str> {
        self.actions.by_handle.get(&handle).map(String::as_str)
    }

    pub fn menu_handle(&self, id: &str) -> Option<MenuHandle> {
        self.menus.by_id.get(id).copied()
    }

    pub fn menu_id(&self, handle: MenuHandle) -> Option<&str> {
        self.menus.by_handle.get(&handle).map(String::as_str)
    }

    pub fn action_count(&self) -> usize {
        self.actions.by_id.len()
    }

    /*
     * Walks the live menu bar and registers every action that carries an
     * identifier in its data field but is not registered yet. Used after the
     * host has built its menus from actions that never went through
     * `register_action`. Returns the number of newly registered actions.
     */
    pub fn register_remaining_from_menu_bar(&mut self, live: &LiveUi) -> usize {
        let mut added = 0;
        let mut visited = Vec::new();
        for entry in live.menu_bar() {
            added += self.register_remaining_from_entry(live, *entry, &mut visited);
        }
        log::debug!("IdentifierRegistry: Registered {added} remaining actions from menu bar.");
        added
    }

    fn register_remaining_from_entry(
        &mut self,
        live: &LiveUi,
        entry: LiveEntry,
        visited: &mut Vec<MenuHandle>,
    ) -> usize {
        match entry {
            LiveEntry::Separator => 0,
            LiveEntry::Menu(menu) => {
                if visited.contains(&menu) {
                    return 0;
                }
                visited.push(menu);
                let entries = live.menu(menu).map(|m| m.entries.clone()).unwrap_or_default();
                entries
                    .into_iter()
                    .map(|child| self.register_remaining_from_entry(live, child, visited))
                    .sum()
            }
            LiveEntry::Action(action) => {
                if self.action_id(action).is_some() {
                    return 0;
                }
                match live.action_data(action) {
                    Some(data) if !data.is_empty() => match self.register_action(action, data) {
                        Ok(()) => 1,
                        Err(e) => {
                            log::warn!("IdentifierRegistry: Skipping action {}: {e}", action.0);
                            0
                        }
                    },
                    _ => 0,
                }
            }
        }
    }
}

impl Default for IdentifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_work_in_both_directions() {
        let mut registry = IdentifierRegistry::new();
        registry.register_action(ActionHandle(7), "file-open").unwrap();
        registry.register_menu(MenuHandle(3), "menu-file").unwrap();

        assert_eq!(registry.action_handle("file-open"), Some(ActionHandle(7)));
        assert_eq!(registry.action_id(ActionHandle(7)), Some("file-open"));
        assert_eq!(registry.menu_handle("menu-file"), Some(MenuHandle(3)));
        assert_eq!(registry.menu_id(MenuHandle(3)), Some("menu-file"));
    }

    #[test]
    fn test_absent_entries_yield_none() {
        let registry = IdentifierRegistry::new();
        assert_eq!(registry.action_handle("nope"), None);
        assert_eq!(registry.menu_id(MenuHandle(1)), None);
    }

    #[test]
    fn test_many_to_one_registration_is_rejected() {
        let mut registry = IdentifierRegistry::new();
        registry.register_action(ActionHandle(1), "undo").unwrap();

        assert!(matches!(
            registry.register_action(ActionHandle(2), "undo"),
            Err(RegistryError::DuplicateId(id)) if id == "undo"
        ));
        assert!(matches!(
            registry.register_action(ActionHandle(1), "redo"),
            Err(RegistryError::DuplicateHandle(1))
        ));
        // The failed attempts left the original pair intact.
        assert_eq!(registry.action_id(ActionHandle(1)), Some("undo"));
        assert_eq!(registry.action_handle("redo"), None);
    }

    #[test]
    fn test_deregistration_clears_both_directions() {
        let mut registry = IdentifierRegistry::new();
        registry.register_menu(MenuHandle(4), "menu-edit").unwrap();

        assert_eq!(registry.deregister_menu(MenuHandle(4)), Some("menu-edit".to_string()));
        assert_eq!(registry.menu_handle("menu-edit"), None);
        assert_eq!(registry.deregister_menu(MenuHandle(4)), None);
        // The id is free again.
        registry.register_menu(MenuHandle(5), "menu-edit").unwrap();
    }

    #[test]
    fn test_register_remaining_from_menu_bar_picks_up_data_ids() {
        let mut live = LiveUi::new();
        let mut registry = IdentifierRegistry::new();
        let file = live.create_menu("File");
        let recent = live.create_menu("Open Recent");
        let open = live.create_action("file-open");
        let known = live.create_action("file-save");
        let anonymous = live.create_action("");
        registry.register_action(known, "file-save").unwrap();

        live.add_to_menu(file, LiveEntry::Action(open));
        live.add_to_menu(file, LiveEntry::Separator);
        live.add_to_menu(file, LiveEntry::Action(known));
        live.add_to_menu(file, LiveEntry::Menu(recent));
        live.add_to_menu(recent, LiveEntry::Action(anonymous));
        live.add_to_menu_bar(LiveEntry::Menu(file));

        let added = registry.register_remaining_from_menu_bar(&live);

        assert_eq!(added, 1);
        assert_eq!(registry.action_handle("file-open"), Some(open));
        assert_eq!(registry.action_id(anonymous), None);
    }
}
