/*
 * Moves workspace sections between their document form and the live UI.
 *
 * Apply functions take a section that has already been decoded and overwrite
 * the matching part of the live UI. They tolerate identifiers the current
 * build no longer knows: stale toolbar entries and actions are dropped, menus
 * that do not exist yet are created and registered on the fly. Applying the
 * same section twice gives the same live state as applying it once.
 *
 * Capture functions go the other way and never emit an identifier the
 * registry cannot name.
 */
use crate::core::context::UiContext;
use crate::core::document::WORKSPACE_VERSION;
use crate::core::live_ui::LiveEntry;
use crate::core::models::{
    BuiltInWorkspace, MenuNode, PreferenceEntry, SectionFlags, ToolbarKind, WorkspaceDocument,
};
use crate::core::palette::PaletteBox;
use crate::core::registry::MenuHandle;

/*
 * Replaces the live palette box. Palettes of a read-only workspace become
 * system palettes with read-only cells; otherwise everything is editable.
 */
pub fn apply_palette(ctx: &mut UiContext, mut palette: PaletteBox, read_only: bool) {
    palette.set_system(read_only);
    log::debug!(
        "Reconcile: Applying {} palettes (read_only: {read_only})",
        palette.palettes.len()
    );
    ctx.live.palette_box = palette;
}

/*
 * Applies toolbar sections from a document. Each kept entry must still be in
 * the catalog's master list for its toolbar. Kinds without a section in
 * `sections` are reset to the full master list.
 */
pub fn apply_toolbars(ctx: &mut UiContext, sections: &[(ToolbarKind, Vec<String>)]) {
    for kind in ToolbarKind::ALL {
        let entries = match sections.iter().find(|(k, _)| *k == kind) {
            Some((_, saved)) => ctx.catalog.filter_known(kind, saved),
            None => ctx.catalog.all_entries(kind).to_vec(),
        };
        ctx.live.set_toolbar_entries(kind, entries);
    }
}

pub fn apply_all_toolbar_entries(ctx: &mut UiContext) {
    for kind in ToolbarKind::ALL {
        let entries = ctx.catalog.all_entries(kind).to_vec();
        ctx.live.set_toolbar_entries(kind, entries);
    }
}

pub fn apply_built_in_toolbars(ctx: &mut UiContext, which: BuiltInWorkspace) {
    for kind in ToolbarKind::ALL {
        let entries = ctx.catalog.built_in_entries(which, kind).to_vec();
        ctx.live.set_toolbar_entries(kind, entries);
    }
}

// Returns the number of overrides that survived typing.
pub fn apply_preferences(ctx: &mut UiContext, entries: &[PreferenceEntry]) -> usize {
    let applied = ctx.preferences.apply_entries(entries);
    log::debug!(
        "Reconcile: Applied {applied} of {} preference overrides",
        entries.len()
    );
    applied
}

pub fn apply_layout_state(ctx: &mut UiContext, state: &[u8]) {
    ctx.live.layout_state = state.to_vec();
}

/*
 * Rebuilds the live menu bar from `nodes`. Registered menus are reused with
 * their contents cleared; unknown menu ids get a fresh menu registered under
 * the id. Actions unknown to the registry are dropped. A menu that appears
 * inside itself is skipped at the inner occurrence.
 */
pub fn apply_menu_bar(ctx: &mut UiContext, nodes: &[MenuNode]) {
    ctx.live.clear_menu_bar();
    let mut ancestry = Vec::new();
    for node in nodes {
        if let Some(entry) = build_entry(ctx, node, &mut ancestry) {
            ctx.live.add_to_menu_bar(entry);
        }
    }
    log::debug!(
        "Reconcile: Menu bar rebuilt with {} top-level entries",
        ctx.live.menu_bar().len()
    );
}

fn build_entry(
    ctx: &mut UiContext,
    node: &MenuNode,
    ancestry: &mut Vec<String>,
) -> Option<LiveEntry> {
    match node {
        MenuNode::Separator => Some(LiveEntry::Separator),
        MenuNode::Action(id) => match ctx.registry.action_handle(id) {
            Some(handle) => Some(LiveEntry::Action(handle)),
            None => {
                log::debug!("Reconcile: Dropping unknown action '{id}'");
                None
            }
        },
        MenuNode::Menu { id, children } => {
            if ancestry.iter().any(|a| a == id) {
                log::warn!("Reconcile: Menu '{id}' contains itself, inner occurrence skipped");
                return None;
            }
            let handle = resolve_menu(ctx, id)?;
            ctx.live.clear_menu(handle);
            ancestry.push(id.clone());
            for child in children {
                if let Some(entry) = build_entry(ctx, child, ancestry) {
                    ctx.live.add_to_menu(handle, entry);
                }
            }
            ancestry.pop();
            Some(LiveEntry::Menu(handle))
        }
    }
}

fn resolve_menu(ctx: &mut UiContext, id: &str) -> Option<MenuHandle> {
    if let Some(handle) = ctx.registry.menu_handle(id) {
        if ctx.live.has_menu(handle) {
            return Some(handle);
        }
        // The menu behind this registration is gone.
        ctx.registry.deregister_menu(handle);
    }
    let handle = ctx.live.create_menu(id);
    match ctx.registry.register_menu(handle, id) {
        Ok(()) => {
            log::debug!("Reconcile: Created menu '{id}' on the fly");
            Some(handle)
        }
        Err(e) => {
            log::warn!("Reconcile: Could not register menu '{id}': {e}");
            ctx.live.remove_menu(handle);
            None
        }
    }
}

// The live menu bar as a tree of registered identifiers.
pub fn capture_menu_bar(ctx: &UiContext) -> Vec<MenuNode> {
    let mut ancestry = Vec::new();
    ctx.live
        .menu_bar()
        .iter()
        .filter_map(|entry| capture_entry(ctx, *entry, &mut ancestry))
        .collect()
}

fn capture_entry(
    ctx: &UiContext,
    entry: LiveEntry,
    ancestry: &mut Vec<MenuHandle>,
) -> Option<MenuNode> {
    match entry {
        LiveEntry::Separator => Some(MenuNode::Separator),
        LiveEntry::Action(handle) => match ctx.registry.action_id(handle) {
            Some(id) if !id.is_empty() => Some(MenuNode::action(id)),
            _ => {
                log::debug!("Reconcile: Unregistered action {} not captured", handle.0);
                None
            }
        },
        LiveEntry::Menu(handle) => {
            if ancestry.contains(&handle) {
                return None;
            }
            let Some(id) = ctx.registry.menu_id(handle) else {
                log::debug!("Reconcile: Unregistered menu {} not captured", handle.0);
                return None;
            };
            let menu = ctx.live.menu(handle)?;
            ancestry.push(handle);
            let children = menu
                .entries
                .iter()
                .filter_map(|child| capture_entry(ctx, *child, ancestry))
                .collect();
            ancestry.pop();
            Some(MenuNode::menu(id, children))
        }
    }
}

pub fn capture_toolbars(ctx: &UiContext) -> Vec<(ToolbarKind, Vec<String>)> {
    ToolbarKind::ALL
        .into_iter()
        .map(|kind| (kind, ctx.live.toolbar_entries(kind).to_vec()))
        .collect()
}

/*
 * Builds the root document for a workspace from the live UI. The palette is
 * always present; the other sections only when their flag is set.
 */
pub fn document_from_live(ctx: &UiContext, sections: SectionFlags) -> WorkspaceDocument {
    WorkspaceDocument {
        version: WORKSPACE_VERSION.to_string(),
        palette: Some(ctx.live.palette_box.clone()),
        toolbars: if sections.toolbars {
            capture_toolbars(ctx)
        } else {
            Vec::new()
        },
        preferences: sections
            .preferences
            .then(|| ctx.preferences.workspace_entries()),
        menu_bar: sections.menu_bar.then(|| capture_menu_bar(ctx)),
        gui_state: sections
            .components
            .then(|| ctx.live.layout_state.clone()),
    }
}
