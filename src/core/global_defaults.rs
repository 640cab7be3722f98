/*
 * Global defaults: the menu bar, toolbars and layout state shared by every
 * workspace that does not carry its own copy. Each section lives in its own
 * small container in the global defaults directory, with a root document
 * holding only that section. When a container is missing or unusable the
 * factory state is applied instead.
 */
use crate::core::archiver::{self, WorkspaceContainer};
use crate::core::context::UiContext;
use crate::core::default_menu::default_menu_bar;
use crate::core::document::{
    ROOT_DOCUMENT_NAME, WORKSPACE_VERSION, parse_workspace_document, write_workspace_document,
};
use crate::core::error::Result;
use crate::core::models::{SectionSource, WorkspaceDocument};
use crate::core::path_utils::{self, WorkspacePaths};
use crate::core::reconcile;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalSection {
    MenuBar,
    Toolbars,
    GuiState,
}

impl GlobalSection {
    pub const ALL: [GlobalSection; 3] = [
        GlobalSection::MenuBar,
        GlobalSection::Toolbars,
        GlobalSection::GuiState,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            GlobalSection::MenuBar => "menubar.xml",
            GlobalSection::Toolbars => "toolbar.xml",
            GlobalSection::GuiState => "guistate.xml",
        }
    }
}

fn section_document(section: GlobalSection, ctx: &UiContext) -> WorkspaceDocument {
    let mut doc = WorkspaceDocument {
        version: WORKSPACE_VERSION.to_string(),
        ..WorkspaceDocument::default()
    };
    match section {
        GlobalSection::MenuBar => doc.menu_bar = Some(reconcile::capture_menu_bar(ctx)),
        GlobalSection::Toolbars => doc.toolbars = reconcile::capture_toolbars(ctx),
        GlobalSection::GuiState => doc.gui_state = Some(ctx.live.layout_state.clone()),
    }
    doc
}

// Overwrites the global container for `section` with the live state.
pub fn write_global_section(
    paths: &WorkspacePaths,
    section: GlobalSection,
    ctx: &UiContext,
) -> Result<()> {
    path_utils::ensure_dir(&paths.global_defaults_dir)?;
    let path = paths.global_defaults_file(section.file_name());
    let bytes = write_workspace_document(&section_document(section, ctx))?;
    archiver::write_container(&path, &WorkspaceContainer::new(ROOT_DOCUMENT_NAME, bytes))?;
    log::debug!("GlobalDefaults: Wrote {section:?} to {path:?}");
    Ok(())
}

fn load_document(path: &Path) -> Result<WorkspaceDocument> {
    let container = archiver::read_container(path)?;
    parse_workspace_document(&container.root_document)
}

/*
 * Applies one global section to the live UI. Returns `GlobalDefaults` when
 * the container supplied it, `BuiltIn` when the factory state was used.
 */
pub fn read_global_section(
    paths: &WorkspacePaths,
    section: GlobalSection,
    ctx: &mut UiContext,
) -> SectionSource {
    let path = paths.global_defaults_file(section.file_name());
    if !path.exists() {
        log::debug!("GlobalDefaults: {path:?} not found, using factory {section:?}");
        apply_factory(section, ctx);
        return SectionSource::BuiltIn;
    }
    let doc = match load_document(&path) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("GlobalDefaults: Could not read {path:?}: {e}");
            apply_factory(section, ctx);
            return SectionSource::BuiltIn;
        }
    };
    let supplied = match section {
        GlobalSection::MenuBar => doc.menu_bar.map(|menu| {
            reconcile::apply_menu_bar(ctx, &menu);
        }),
        GlobalSection::Toolbars => (!doc.toolbars.is_empty()).then(|| {
            reconcile::apply_toolbars(ctx, &doc.toolbars);
        }),
        GlobalSection::GuiState => doc.gui_state.map(|state| {
            reconcile::apply_layout_state(ctx, &state);
        }),
    };
    match supplied {
        Some(()) => SectionSource::GlobalDefaults,
        None => {
            log::warn!("GlobalDefaults: {path:?} has no {section:?} section");
            apply_factory(section, ctx);
            SectionSource::BuiltIn
        }
    }
}

fn apply_factory(section: GlobalSection, ctx: &mut UiContext) {
    match section {
        GlobalSection::MenuBar => reconcile::apply_menu_bar(ctx, &default_menu_bar()),
        GlobalSection::Toolbars => reconcile::apply_all_toolbar_entries(ctx),
        // The host's current layout stays as it is.
        GlobalSection::GuiState => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{MenuNode, ToolbarKind};
    use std::fs;
    use tempfile::tempdir;

    fn context() -> UiContext {
        let mut ctx = UiContext::new();
        for id in ["undo", "redo", "about"] {
            let handle = ctx.live.create_action(id);
            ctx.registry.register_action(handle, id).unwrap();
        }
        ctx.catalog
            .set_all_entries(ToolbarKind::FileOperation, &["file-open", "file-save", "print"]);
        ctx
    }

    #[test]
    fn test_write_then_read_each_section() {
        // Arrange
        let dir = tempdir().unwrap();
        let paths = WorkspacePaths::rooted_at(dir.path());
        let mut ctx = context();
        let tree = vec![MenuNode::menu(
            "menu-edit",
            vec![MenuNode::action("undo"), MenuNode::action("redo")],
        )];
        reconcile::apply_menu_bar(&mut ctx, &tree);
        ctx.live
            .set_toolbar_entries(ToolbarKind::FileOperation, vec!["print".to_string()]);
        ctx.live.layout_state = b"dock-layout".to_vec();
        for section in GlobalSection::ALL {
            write_global_section(&paths, section, &ctx).unwrap();
        }

        // Act
        let mut fresh = context();
        let sources: Vec<SectionSource> = GlobalSection::ALL
            .into_iter()
            .map(|section| read_global_section(&paths, section, &mut fresh))
            .collect();

        // Assert
        assert!(sources.iter().all(|s| *s == SectionSource::GlobalDefaults));
        assert_eq!(reconcile::capture_menu_bar(&fresh), tree);
        assert_eq!(
            fresh.live.toolbar_entries(ToolbarKind::FileOperation),
            ["print".to_string()]
        );
        assert_eq!(fresh.live.layout_state, b"dock-layout".to_vec());
    }

    #[test]
    fn test_missing_containers_fall_back_to_factory() {
        let dir = tempdir().unwrap();
        let paths = WorkspacePaths::rooted_at(dir.path());
        let mut ctx = context();
        ctx.live.layout_state = b"untouched".to_vec();

        for section in GlobalSection::ALL {
            assert_eq!(
                read_global_section(&paths, section, &mut ctx),
                SectionSource::BuiltIn
            );
        }

        assert_eq!(
            ctx.live.toolbar_entries(ToolbarKind::FileOperation).len(),
            3
        );
        assert_eq!(ctx.live.layout_state, b"untouched".to_vec());
        assert!(ctx.registry.menu_handle("menu-file").is_some());
        assert_eq!(ctx.live.menu_bar().len(), default_menu_bar().len());
    }

    #[test]
    fn test_corrupt_container_falls_back_to_factory() {
        let dir = tempdir().unwrap();
        let paths = WorkspacePaths::rooted_at(dir.path());
        fs::create_dir_all(&paths.global_defaults_dir).unwrap();
        fs::write(paths.global_defaults_file("toolbar.xml"), b"not a container").unwrap();
        let mut ctx = context();

        let source = read_global_section(&paths, GlobalSection::Toolbars, &mut ctx);

        assert_eq!(source, SectionSource::BuiltIn);
        assert_eq!(
            ctx.live.toolbar_entries(ToolbarKind::FileOperation).len(),
            3
        );
    }
}
