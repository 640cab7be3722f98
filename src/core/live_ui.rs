/*
 * A toolkit-free model of the parts of the running UI that a workspace
 * customises: the menu bar and its menus, the three toolbars, the palette box
 * and the opaque layout blob. The host mirrors its real widgets into this model
 * and back; the reconciliation engine only ever talks to this model.
 *
 * Menus and actions are addressed through lightweight handles. Removing a
 * menu returns its handle so the caller can deregister it from the
 * `IdentifierRegistry`.
 */
use crate::core::models::{BuiltInWorkspace, ToolbarKind};
use crate::core::palette::PaletteBox;
use crate::core::registry::{ActionHandle, MenuHandle};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiveEntry {
    Action(ActionHandle),
    Menu(MenuHandle),
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMenu {
    pub title: String,
    pub entries: Vec<LiveEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct LiveUi {
    menus: HashMap<MenuHandle, LiveMenu>,
    actions: HashMap<ActionHandle, String>,
    next_handle: u32,
    menu_bar: Vec<LiveEntry>,
    toolbars: HashMap<ToolbarKind, Vec<String>>,
    pub palette_box: PaletteBox,
    pub layout_state: Vec<u8>,
}

impl LiveUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    // `data` is the identifier hint the host attaches to an action, may be empty.
    pub fn create_action(&mut self, data: &str) -> ActionHandle {
        let handle = ActionHandle(self.allocate_handle());
        self.actions.insert(handle, data.to_string());
        handle
    }

    pub fn action_data(&self, handle: ActionHandle) -> Option<&str> {
        self.actions.get(&handle).map(String::as_str)
    }

    pub fn create_menu(&mut self, title: &str) -> MenuHandle {
        let handle = MenuHandle(self.allocate_handle());
        self.menus.insert(
            handle,
            LiveMenu {
                title: title.to_string(),
                entries: Vec::new(),
            },
        );
        handle
    }

    /*
     * Drops a menu and every reference to it from the menu bar and other
     * menus. The returned handle must be deregistered by the caller.
     */
    pub fn remove_menu(&mut self, handle: MenuHandle) -> Option<MenuHandle> {
        self.menus.remove(&handle)?;
        let target = LiveEntry::Menu(handle);
        self.menu_bar.retain(|e| *e != target);
        for menu in self.menus.values_mut() {
            menu.entries.retain(|e| *e != target);
        }
        Some(handle)
    }

    pub fn menu(&self, handle: MenuHandle) -> Option<&LiveMenu> {
        self.menus.get(&handle)
    }

    pub fn has_menu(&self, handle: MenuHandle) -> bool {
        self.menus.contains_key(&handle)
    }

    pub fn clear_menu(&mut self, handle: MenuHandle) {
        if let Some(menu) = self.menus.get_mut(&handle) {
            menu.entries.clear();
        }
    }

    pub fn add_to_menu(&mut self, handle: MenuHandle, entry: LiveEntry) {
        match self.menus.get_mut(&handle) {
            Some(menu) => menu.entries.push(entry),
            None => log::warn!("LiveUi: add_to_menu on unknown menu handle {}", handle.0),
        }
    }

    pub fn menu_bar(&self) -> &[LiveEntry] {
        &self.menu_bar
    }

    pub fn clear_menu_bar(&mut self) {
        self.menu_bar.clear();
    }

    pub fn add_to_menu_bar(&mut self, entry: LiveEntry) {
        self.menu_bar.push(entry);
    }

    pub fn toolbar_entries(&self, kind: ToolbarKind) -> &[String] {
        self.toolbars.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_toolbar_entries(&mut self, kind: ToolbarKind, entries: Vec<String>) {
        self.toolbars.insert(kind, entries);
    }
}

/*
 * The host's authoritative list of entries each toolbar may contain, plus
 * the entry lists the built-in workspaces start from. Saved toolbar contents
 * are always intersected with `all_entries`.
 */
#[derive(Debug, Clone, Default)]
pub struct ToolbarCatalog {
    all: HashMap<ToolbarKind, Vec<String>>,
    built_in: HashMap<(BuiltInWorkspace, ToolbarKind), Vec<String>>,
}

impl ToolbarCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_all_entries(&mut self, kind: ToolbarKind, entries: &[&str]) {
        self.all
            .insert(kind, entries.iter().map(|s| s.to_string()).collect());
    }

    pub fn set_built_in_entries(
        &mut self,
        workspace: BuiltInWorkspace,
        kind: ToolbarKind,
        entries: &[&str],
    ) {
        self.built_in.insert(
            (workspace, kind),
            entries.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn all_entries(&self, kind: ToolbarKind) -> &[String] {
        self.all.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    // Falls back to every known entry when the host defines no built-in list.
    pub fn built_in_entries(&self, workspace: BuiltInWorkspace, kind: ToolbarKind) -> &[String] {
        self.built_in
            .get(&(workspace, kind))
            .map(Vec::as_slice)
            .unwrap_or_else(|| self.all_entries(kind))
    }

    // Keeps document order; drops anything the current build no longer knows.
    pub fn filter_known(&self, kind: ToolbarKind, saved: &[String]) -> Vec<String> {
        let known = self.all_entries(kind);
        saved
            .iter()
            .filter(|entry| {
                let keep = known.contains(*entry);
                if !keep {
                    log::debug!(
                        "ToolbarCatalog: Dropping stale entry '{entry}' from toolbar '{}'",
                        kind.xml_name()
                    );
                }
                keep
            })
            .cloned()
            .collect()
    }
}
