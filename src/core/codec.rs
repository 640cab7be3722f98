/*
 * Reads and writes whole workspaces: one container per workspace plus the
 * global defaults containers for every section the workspace does not carry.
 *
 * A read never fails. Whatever cannot be taken from the workspace file is
 * taken from the global defaults (or the factory state behind them), and the
 * returned `ReadReport` says which source supplied each section.
 */
use crate::core::archiver::{self, WorkspaceContainer};
use crate::core::context::UiContext;
use crate::core::document::{ROOT_DOCUMENT_NAME, parse_workspace_document, write_workspace_document};
use crate::core::error::{Result, WorkspaceError};
use crate::core::global_defaults::{self, GlobalSection};
use crate::core::models::{
    BuiltInWorkspace, ReadReport, SectionFlags, SectionSource, Workspace, WorkspaceDocument,
};
use crate::core::path_utils::{self, WorkspacePaths};
use crate::core::reconcile;
use std::path::{Path, PathBuf};

pub trait WorkspaceCodecOperations: Send + Sync {
    /*
     * Persists the live state of `ctx` as `workspace`. Assigns the default
     * path when the workspace has none yet. Sections the workspace does not
     * carry are written to their global defaults container instead.
     */
    fn write_workspace(&self, workspace: &mut Workspace, ctx: &UiContext) -> Result<()>;

    // Applies `workspace` to the live state of `ctx`.
    fn read_workspace(&self, workspace: &mut Workspace, ctx: &mut UiContext) -> ReadReport;

    fn paths(&self) -> &WorkspacePaths;
}

pub struct CoreWorkspaceCodec {
    paths: WorkspacePaths,
}

impl CoreWorkspaceCodec {
    pub fn new(paths: WorkspacePaths) -> Self {
        CoreWorkspaceCodec { paths }
    }

    fn target_path(&self, workspace: &Workspace) -> Result<PathBuf> {
        if let Some(path) = workspace.path() {
            return Ok(path.clone());
        }
        path_utils::ensure_dir(&self.paths.user_dir)?;
        Ok(self
            .paths
            .workspace_file(&path_utils::sanitize_workspace_name(workspace.name())))
    }

    // Images referenced by the palette and present in the store, in name order.
    fn collect_images(ctx: &UiContext) -> Vec<(String, Vec<u8>)> {
        ctx.live
            .palette_box
            .referenced_images()
            .into_iter()
            .filter_map(|name| match ctx.images.get(name) {
                Some(bytes) => Some((name.to_string(), bytes.to_vec())),
                None => {
                    log::debug!("CoreWorkspaceCodec: Image '{name}' not in store, not written");
                    None
                }
            })
            .collect()
    }

    fn write_globals(&self, sections: SectionFlags, ctx: &UiContext) -> Result<()> {
        let deferred = [
            (GlobalSection::MenuBar, sections.menu_bar),
            (GlobalSection::Toolbars, sections.toolbars),
            (GlobalSection::GuiState, sections.components),
        ];
        for (section, carried) in deferred {
            if carried {
                continue;
            }
            global_defaults::write_global_section(&self.paths, section, ctx).map_err(|e| {
                WorkspaceError::write_failed(
                    &self.paths.global_defaults_file(section.file_name()),
                    &e,
                )
            })?;
        }
        Ok(())
    }

    fn read_built_in(&self, which: BuiltInWorkspace, ctx: &mut UiContext) -> ReadReport {
        ctx.apply_built_in_palettes(which);
        reconcile::apply_built_in_toolbars(ctx, which);
        ctx.preferences.clear_overrides();
        let mut report = ReadReport::built_in();
        report.menu_bar = global_defaults::read_global_section(&self.paths, GlobalSection::MenuBar, ctx);
        report.components =
            global_defaults::read_global_section(&self.paths, GlobalSection::GuiState, ctx);
        report
    }

    /*
     * Used when the workspace file cannot supply anything: the advanced
     * palette set plus every section from the global defaults.
     */
    fn read_fallback(&self, workspace: &mut Workspace, ctx: &mut UiContext, note: String) -> ReadReport {
        log::warn!(
            "CoreWorkspaceCodec: Workspace '{}' falls back to defaults: {note}",
            workspace.name()
        );
        workspace.sections = SectionFlags::default();
        ctx.apply_built_in_palettes(BuiltInWorkspace::Advanced);
        ctx.preferences.clear_overrides();
        ReadReport {
            components: global_defaults::read_global_section(&self.paths, GlobalSection::GuiState, ctx),
            toolbars: global_defaults::read_global_section(&self.paths, GlobalSection::Toolbars, ctx),
            menu_bar: global_defaults::read_global_section(&self.paths, GlobalSection::MenuBar, ctx),
            preferences: SectionSource::GlobalDefaults,
            recovered: Some(note),
        }
    }

    fn load(path: &Path, ctx: &mut UiContext) -> Result<WorkspaceDocument> {
        let container = archiver::read_container(path)?;
        let doc = parse_workspace_document(&container.root_document)?;
        // Only stored once the document is known to be usable.
        for (name, bytes) in container.images {
            ctx.images.add(&name, bytes);
        }
        Ok(doc)
    }

    fn apply_document(
        &self,
        workspace: &mut Workspace,
        doc: WorkspaceDocument,
        ctx: &mut UiContext,
    ) -> ReadReport {
        let mut sections = SectionFlags::default();
        match doc.palette {
            Some(palette) => reconcile::apply_palette(ctx, palette, workspace.is_read_only()),
            None => log::debug!(
                "CoreWorkspaceCodec: '{}' has no palette section, palettes kept",
                workspace.name()
            ),
        }

        let toolbars = if doc.toolbars.is_empty() {
            global_defaults::read_global_section(&self.paths, GlobalSection::Toolbars, ctx)
        } else {
            reconcile::apply_toolbars(ctx, &doc.toolbars);
            sections.toolbars = true;
            SectionSource::Profile
        };

        let preferences = match doc.preferences {
            Some(entries) => {
                reconcile::apply_preferences(ctx, &entries);
                sections.preferences = true;
                SectionSource::Profile
            }
            None => {
                ctx.preferences.clear_overrides();
                SectionSource::GlobalDefaults
            }
        };

        let menu_bar = match doc.menu_bar {
            Some(menu) => {
                reconcile::apply_menu_bar(ctx, &menu);
                sections.menu_bar = true;
                SectionSource::Profile
            }
            None => global_defaults::read_global_section(&self.paths, GlobalSection::MenuBar, ctx),
        };

        let components = match doc.gui_state {
            Some(state) => {
                reconcile::apply_layout_state(ctx, &state);
                sections.components = true;
                SectionSource::Profile
            }
            None => global_defaults::read_global_section(&self.paths, GlobalSection::GuiState, ctx),
        };

        workspace.sections = sections;
        ReadReport {
            components,
            toolbars,
            menu_bar,
            preferences,
            recovered: None,
        }
    }
}

impl WorkspaceCodecOperations for CoreWorkspaceCodec {
    fn write_workspace(&self, workspace: &mut Workspace, ctx: &UiContext) -> Result<()> {
        if workspace.is_built_in() {
            return Err(WorkspaceError::BuiltInWorkspace(workspace.name().to_string()));
        }
        let path = self
            .target_path(workspace)
            .map_err(|e| WorkspaceError::write_failed(&self.paths.user_dir, &e))?;
        log::debug!(
            "CoreWorkspaceCodec: Writing workspace '{}' to {path:?} with {:?}",
            workspace.name(),
            workspace.sections
        );

        let doc = reconcile::document_from_live(ctx, workspace.sections);
        let mut container = WorkspaceContainer::new(
            ROOT_DOCUMENT_NAME,
            write_workspace_document(&doc).map_err(|e| WorkspaceError::write_failed(&path, &e))?,
        );
        container.images = Self::collect_images(ctx);
        archiver::write_container(&path, &container)
            .map_err(|e| WorkspaceError::write_failed(&path, &e))?;
        workspace.path = Some(path);

        self.write_globals(workspace.sections, ctx)
    }

    fn read_workspace(&self, workspace: &mut Workspace, ctx: &mut UiContext) -> ReadReport {
        if let Some(which) = workspace.built_in_kind() {
            log::debug!("CoreWorkspaceCodec: Reading built-in workspace '{}'", which.name());
            return self.read_built_in(which, ctx);
        }

        let path = match workspace.path() {
            Some(path) if !path.as_os_str().is_empty() && path.exists() => path.clone(),
            Some(path) => {
                let note = format!("workspace file {path:?} not found");
                return self.read_fallback(workspace, ctx, note);
            }
            None => {
                let note = "workspace has no file yet".to_string();
                return self.read_fallback(workspace, ctx, note);
            }
        };

        workspace.read_only = !path_utils::is_writable(&path);
        log::debug!(
            "CoreWorkspaceCodec: Reading workspace '{}' from {path:?} (read_only: {})",
            workspace.name(),
            workspace.read_only
        );

        match Self::load(&path, ctx) {
            Ok(doc) => self.apply_document(workspace, doc, ctx),
            Err(e) => {
                let note = WorkspaceError::read_failed(&path, &e).to_string();
                self.read_fallback(workspace, ctx, note)
            }
        }
    }

    fn paths(&self) -> &WorkspacePaths {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{MenuNode, PreferenceValue, ToolbarKind};
    use crate::core::palette::{Palette, PaletteBox, PaletteCell};
    use std::fs;
    use tempfile::tempdir;

    fn context() -> UiContext {
        let mut ctx = UiContext::new();
        for id in ["file-open", "file-save", "undo", "about"] {
            let handle = ctx.live.create_action(id);
            ctx.registry.register_action(handle, id).unwrap();
        }
        ctx.catalog
            .set_all_entries(ToolbarKind::FileOperation, &["file-open", "file-save", "print"]);
        ctx.catalog.set_all_entries(ToolbarKind::NoteInput, &["note-input", "tie"]);
        ctx.catalog.set_all_entries(ToolbarKind::PlaybackControl, &["play"]);
        ctx.preferences
            .define("ui/palette/scale", PreferenceValue::Int(100), true);
        ctx.built_in_palettes.advanced = PaletteBox::new(vec![Palette::new(
            "Advanced clefs",
            vec![PaletteCell::new("Alto clef", "clef-C3")],
        )]);
        ctx
    }

    #[test]
    fn test_write_assigns_sanitized_default_path() {
        // Arrange
        crate::initialize_logging();
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let ctx = context();
        let mut workspace = Workspace::new("Strings: Solo/Tutti".to_string(), None);

        // Act
        codec.write_workspace(&mut workspace, &ctx).unwrap();

        // Assert
        let expected = dir
            .path()
            .join("workspaces")
            .join("Strings_ Solo_Tutti.workspace");
        assert_eq!(workspace.path(), Some(&expected));
        assert!(expected.is_file());
    }

    #[test]
    fn test_write_prunes_unreferenced_images() {
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let mut ctx = context();
        let used = ctx.images.add_bytes(vec![1, 2, 3], "png");
        ctx.images.add_bytes(vec![4, 5, 6], "png");
        ctx.live.palette_box = PaletteBox::new(vec![Palette::new(
            "Custom",
            vec![
                PaletteCell::new("Logo", "image").with_image(&used),
                PaletteCell::new("Ghost", "image").with_image("missing.png"),
            ],
        )]);
        let mut workspace = Workspace::new("Pictures".to_string(), None);

        codec.write_workspace(&mut workspace, &ctx).unwrap();

        let container = archiver::read_container(workspace.path().unwrap()).unwrap();
        assert_eq!(container.images, vec![(used, vec![1, 2, 3])]);
    }

    #[test]
    fn test_write_refuses_built_in() {
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let mut workspace = Workspace::built_in(BuiltInWorkspace::Basic);

        let result = codec.write_workspace(&mut workspace, &context());

        assert!(matches!(result, Err(WorkspaceError::BuiltInWorkspace(_))));
    }

    #[test]
    fn test_write_failure_is_reported_with_path() {
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let bogus = dir.path().join("no-such-dir").join("x.workspace");
        let mut workspace = Workspace::new("x".to_string(), Some(bogus.clone()));

        match codec.write_workspace(&mut workspace, &context()) {
            Err(WorkspaceError::WriteFailed { path, .. }) => assert_eq!(path, bogus),
            other => panic!("expected WriteFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_read_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let mut ctx = context();
        let mut workspace = Workspace::new(
            "Gone".to_string(),
            Some(dir.path().join("Gone.workspace")),
        );

        let report = codec.read_workspace(&mut workspace, &mut ctx);

        assert!(report.recovered.is_some());
        assert_eq!(report.toolbars, SectionSource::BuiltIn);
        assert_eq!(ctx.live.palette_box.palettes[0].name, "Advanced clefs");
        assert!(ctx.live.palette_box.is_fully_system());
        assert_eq!(ctx.live.toolbar_entries(ToolbarKind::FileOperation).len(), 3);
    }

    #[test]
    fn test_read_corrupt_file_falls_back() {
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let path = dir.path().join("Corrupt.workspace");
        fs::write(&path, b"PK\x03\x04 truncated").unwrap();
        let mut ctx = context();
        let mut workspace = Workspace::new("Corrupt".to_string(), Some(path));

        let report = codec.read_workspace(&mut workspace, &mut ctx);

        assert!(report.recovered.unwrap().contains("Corrupt.workspace"));
        assert_eq!(workspace.sections, SectionFlags::default());
    }

    #[test]
    fn test_read_built_in_uses_built_in_sources() {
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let mut ctx = context();
        ctx.catalog
            .set_built_in_entries(BuiltInWorkspace::Basic, ToolbarKind::FileOperation, &["file-open"]);
        assert!(ctx.preferences.set_override("ui/palette/scale", PreferenceValue::Int(120)));
        let mut workspace = Workspace::built_in(BuiltInWorkspace::Basic);

        let report = codec.read_workspace(&mut workspace, &mut ctx);

        assert_eq!(report.toolbars, SectionSource::BuiltIn);
        assert_eq!(report.preferences, SectionSource::BuiltIn);
        assert_eq!(
            ctx.live.toolbar_entries(ToolbarKind::FileOperation),
            ["file-open".to_string()]
        );
        assert!(ctx.preferences.overrides().is_empty());
        assert!(ctx.live.palette_box.is_fully_system());
    }

    #[test]
    fn test_read_sets_flags_from_present_sections() {
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let mut ctx = context();
        reconcile::apply_menu_bar(
            &mut ctx,
            &[MenuNode::menu("menu-edit", vec![MenuNode::action("undo")])],
        );
        let mut workspace = Workspace::new("Partial".to_string(), None);
        workspace.sections.menu_bar = true;
        codec.write_workspace(&mut workspace, &ctx).unwrap();

        let mut reread = Workspace::new("Partial".to_string(), workspace.path().cloned());
        let report = codec.read_workspace(&mut reread, &mut context());

        assert!(reread.sections.menu_bar);
        assert!(!reread.sections.toolbars);
        assert_eq!(report.menu_bar, SectionSource::Profile);
        assert_eq!(report.toolbars, SectionSource::GlobalDefaults);
        assert_eq!(report.preferences, SectionSource::GlobalDefaults);
    }

    #[test]
    fn test_read_writable_file_keeps_palettes_editable() {
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let mut ctx = context();
        ctx.live.palette_box = PaletteBox::new(vec![Palette::new(
            "Clefs",
            vec![PaletteCell::new("Treble clef", "clef-G")],
        )]);
        let mut workspace = Workspace::new("Editable".to_string(), None);
        codec.write_workspace(&mut workspace, &ctx).unwrap();

        let mut reread = Workspace::new("Editable".to_string(), workspace.path().cloned());
        let mut target = context();
        codec.read_workspace(&mut reread, &mut target);

        assert!(!reread.is_read_only());
        assert!(!target.live.palette_box.is_fully_system());
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_follows_actual_write_access() {
        use std::os::unix::fs::PermissionsExt;

        // Arrange
        crate::initialize_logging();
        let dir = tempdir().unwrap();
        let codec = CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir.path()));
        let mut ctx = context();
        ctx.live.palette_box = PaletteBox::new(vec![Palette::new(
            "Clefs",
            vec![PaletteCell::new("Treble clef", "clef-G")],
        )]);
        let mut workspace = Workspace::new("Shared".to_string(), None);
        codec.write_workspace(&mut workspace, &ctx).unwrap();
        let path = workspace.path().cloned().unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();
        let writable = fs::OpenOptions::new().append(true).open(&path).is_ok();

        // Act
        let mut reread = Workspace::new("Shared".to_string(), Some(path));
        let mut target = context();
        codec.read_workspace(&mut reread, &mut target);

        // Assert
        assert_eq!(reread.is_read_only(), !writable);
        assert_eq!(target.live.palette_box.is_fully_system(), !writable);
    }
}
