/*
 * The list of known workspaces and the single current one. The list holds the
 * two built-in workspaces followed by every `*.workspace` file found in the
 * share directory and then the user directory, scanned once on first use.
 *
 * `WorkspaceManager` drives the codec for every user-facing operation:
 * creating, switching, renaming, editing, deleting, saving and reverting.
 * The outgoing workspace is saved before a switch only when it is dirty, and
 * a failure to save it is reported through the notifier without stopping the
 * switch.
 */
use crate::core::codec::{CoreWorkspaceCodec, WorkspaceCodecOperations};
use crate::core::config::{AppConfig, ConfigManagerOperations, CoreConfigManager};
use crate::core::context::UiContext;
use crate::core::error::{Result, WorkspaceError};
use crate::core::models::{BuiltInWorkspace, ReadReport, SectionFlags, Workspace, names_match};
use crate::core::notifier::{LogNotifier, WorkspaceNotifier};
use crate::core::path_utils::{self, WORKSPACE_EXTENSION, WorkspacePaths};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub struct WorkspaceManager {
    codec: Arc<dyn WorkspaceCodecOperations>,
    config: Arc<dyn ConfigManagerOperations>,
    notifier: Arc<dyn WorkspaceNotifier>,
    workspaces: Vec<Workspace>,
    scanned: bool,
    current: Option<usize>,
}

impl WorkspaceManager {
    pub fn new(
        codec: Arc<dyn WorkspaceCodecOperations>,
        config: Arc<dyn ConfigManagerOperations>,
        notifier: Arc<dyn WorkspaceNotifier>,
    ) -> Self {
        WorkspaceManager {
            codec,
            config,
            notifier,
            workspaces: Vec::new(),
            scanned: false,
            current: None,
        }
    }

    // The stock wiring: files under `paths`, config beside them, errors logged.
    pub fn with_paths(paths: WorkspacePaths) -> Self {
        let config = Arc::new(CoreConfigManager::new(paths.config_dir.clone()));
        Self::new(
            Arc::new(CoreWorkspaceCodec::new(paths)),
            config,
            Arc::new(LogNotifier),
        )
    }

    fn ensure_scanned(&mut self) {
        if self.scanned {
            return;
        }
        let paths = self.codec.paths().clone();
        let mut list: Vec<Workspace> = BuiltInWorkspace::ALL
            .into_iter()
            .map(Workspace::built_in)
            .collect();
        if let Some(share_dir) = &paths.share_dir {
            scan_dir(share_dir, &mut list);
        }
        scan_dir(&paths.user_dir, &mut list);
        log::debug!("WorkspaceManager: {} workspaces known", list.len());
        self.workspaces = list;
        self.scanned = true;
    }

    pub fn workspaces(&mut self) -> &[Workspace] {
        self.ensure_scanned();
        &self.workspaces
    }

    pub fn current(&self) -> Option<&Workspace> {
        self.current.and_then(|i| self.workspaces.get(i))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.workspaces
            .iter()
            .position(|w| w.name() == name)
            .or_else(|| {
                self.workspaces
                    .iter()
                    .position(|w| names_match(w.name(), name))
            })
    }

    /*
     * Picks the current workspace: the one remembered in the config when it
     * still exists, otherwise the first in the list. Then reads it.
     */
    pub fn init_workspace(&mut self, ctx: &mut UiContext) -> ReadReport {
        self.ensure_scanned();
        let remembered = match self.config.load_app_config() {
            Ok(config) => config.last_workspace,
            Err(e) => {
                log::warn!("WorkspaceManager: Could not load config, using defaults: {e}");
                None
            }
        };
        let index = remembered
            .as_deref()
            .and_then(|name| self.index_of(name))
            .unwrap_or(0);
        log::debug!(
            "WorkspaceManager: Initial workspace '{}' (remembered: {remembered:?})",
            self.workspaces[index].name()
        );
        self.current = Some(index);
        self.codec.read_workspace(&mut self.workspaces[index], ctx)
    }

    /*
     * Checks a candidate name and returns its sanitized form. Collisions are
     * case-insensitive, against every known workspace except `ignore` and
     * always against the built-in names.
     */
    fn validate_name(&mut self, candidate: &str, ignore: Option<usize>) -> Result<String> {
        self.ensure_scanned();
        let name = path_utils::sanitize_workspace_name(candidate.trim());
        if name.is_empty() {
            return Err(WorkspaceError::InvalidName(candidate.to_string()));
        }
        let clashes_built_in = BuiltInWorkspace::from_name(&name).is_some();
        let clashes_known = self
            .workspaces
            .iter()
            .enumerate()
            .any(|(i, w)| Some(i) != ignore && names_match(w.name(), &name));
        if clashes_built_in || clashes_known {
            return Err(WorkspaceError::NameConflict(name));
        }
        Ok(name)
    }

    fn save_outgoing_if_dirty(&mut self, ctx: &UiContext) {
        let Some(index) = self.current else {
            return;
        };
        let outgoing = &mut self.workspaces[index];
        if !outgoing.is_dirty() || outgoing.is_read_only() {
            return;
        }
        match self.codec.write_workspace(outgoing, ctx) {
            Ok(()) => outgoing.set_dirty(false),
            Err(e) => self.notifier.write_failed(outgoing.name(), &e),
        }
    }

    fn remember_current(&self) {
        let Some(current) = self.current() else {
            return;
        };
        let config = AppConfig {
            last_workspace: Some(current.name().to_string()),
        };
        if let Err(e) = self.config.save_app_config(&config) {
            log::warn!("WorkspaceManager: Could not remember current workspace: {e}");
        }
    }

    /*
     * Creates a workspace from the live state carrying the given sections,
     * writes it and makes it current. Nothing is added when the write fails.
     */
    pub fn create_new_workspace(
        &mut self,
        name: &str,
        sections: SectionFlags,
        ctx: &mut UiContext,
    ) -> Result<()> {
        let name = self.validate_name(name, None)?;
        self.save_outgoing_if_dirty(ctx);

        let mut workspace = Workspace::new(name, None);
        workspace.sections = sections;
        self.codec.write_workspace(&mut workspace, ctx)?;
        ctx.live.palette_box.set_system(false);

        log::debug!("WorkspaceManager: Created workspace '{}'", workspace.name());
        self.workspaces.push(workspace);
        self.current = Some(self.workspaces.len() - 1);
        self.remember_current();
        Ok(())
    }

    pub fn switch_to(&mut self, name: &str, ctx: &mut UiContext) -> Result<ReadReport> {
        self.ensure_scanned();
        let index = self
            .index_of(name)
            .ok_or_else(|| WorkspaceError::NotFound(name.to_string()))?;
        self.save_outgoing_if_dirty(ctx);

        log::debug!(
            "WorkspaceManager: Switching to workspace '{}'",
            self.workspaces[index].name()
        );
        let report = self.codec.read_workspace(&mut self.workspaces[index], ctx);
        self.current = Some(index);
        self.remember_current();
        Ok(report)
    }

    fn current_index(&self) -> Result<usize> {
        self.current
            .ok_or_else(|| WorkspaceError::NotFound("<no current workspace>".to_string()))
    }

    /*
     * Renames the current workspace. The old file is removed before the new
     * one is written, so a failed write leaves the workspace without a file.
     * When the old file cannot be removed nothing changes.
     */
    pub fn rename_current(&mut self, new_name: &str, ctx: &mut UiContext) -> Result<()> {
        let index = self.current_index()?;
        if self.workspaces[index].is_built_in() {
            return Err(WorkspaceError::BuiltInWorkspace(
                self.workspaces[index].name().to_string(),
            ));
        }
        if self.workspaces[index].name() == new_name {
            return self.save_current(ctx);
        }
        let name = self.validate_name(new_name, Some(index))?;

        let workspace = &mut self.workspaces[index];
        if let Some(old_path) = workspace.path()
            && old_path.exists()
        {
            fs::remove_file(old_path).inspect_err(|e| {
                log::error!("WorkspaceManager: Could not remove {old_path:?} for rename: {e}");
            })?;
            log::debug!("WorkspaceManager: Removed {old_path:?} for rename");
        }
        workspace.path = None;
        log::debug!("WorkspaceManager: Renaming '{}' to '{name}'", workspace.name);
        workspace.name = name;
        self.codec.write_workspace(workspace, ctx)?;
        workspace.set_dirty(false);
        self.remember_current();
        Ok(())
    }

    // Applies the edit dialog: new section flags, then rename or plain save.
    pub fn edit_current(
        &mut self,
        name: &str,
        sections: SectionFlags,
        ctx: &mut UiContext,
    ) -> Result<()> {
        let index = self.current_index()?;
        if self.workspaces[index].is_built_in() {
            return Err(WorkspaceError::BuiltInWorkspace(
                self.workspaces[index].name().to_string(),
            ));
        }
        let renaming = self.workspaces[index].name() != name;
        if renaming {
            self.validate_name(name, Some(index))?;
        }
        let previous = std::mem::replace(&mut self.workspaces[index].sections, sections);
        let result = if renaming {
            self.rename_current(name, ctx)
        } else {
            self.save_current(ctx)
        };
        if result.is_err() {
            self.workspaces[index].sections = previous;
        }
        result
    }

    /*
     * Removes a workspace from the list and from disk. Deleting the current
     * workspace clears the palettes and makes the first remaining workspace
     * current.
     */
    pub fn delete_workspace(&mut self, name: &str, ctx: &mut UiContext) -> Result<()> {
        self.ensure_scanned();
        let index = self
            .index_of(name)
            .ok_or_else(|| WorkspaceError::NotFound(name.to_string()))?;
        if self.workspaces[index].is_built_in() {
            return Err(WorkspaceError::BuiltInWorkspace(
                self.workspaces[index].name().to_string(),
            ));
        }
        if let Some(path) = self.workspaces[index].path()
            && path.exists()
        {
            fs::remove_file(path)?;
        }
        let removed = self.workspaces.remove(index);
        log::debug!("WorkspaceManager: Deleted workspace '{}'", removed.name());

        match self.current {
            Some(current) if current == index => {
                ctx.live.palette_box.clear();
                self.current = Some(0);
                self.codec.read_workspace(&mut self.workspaces[0], ctx);
                self.remember_current();
            }
            Some(current) if current > index => self.current = Some(current - 1),
            _ => {}
        }
        Ok(())
    }

    // Writes the current workspace unless it is read-only.
    pub fn save_current(&mut self, ctx: &UiContext) -> Result<()> {
        let index = self.current_index()?;
        let workspace = &mut self.workspaces[index];
        if workspace.is_read_only() {
            log::debug!(
                "WorkspaceManager: '{}' is read-only, not saved",
                workspace.name()
            );
            return Ok(());
        }
        self.codec.write_workspace(workspace, ctx)?;
        workspace.set_dirty(false);
        Ok(())
    }

    // Discards live edits by reading the current workspace again.
    pub fn undo_changes(&mut self, ctx: &mut UiContext) -> Result<ReadReport> {
        let index = self.current_index()?;
        let workspace = &mut self.workspaces[index];
        let report = self.codec.read_workspace(workspace, ctx);
        workspace.set_dirty(false);
        Ok(report)
    }

    pub fn mark_dirty(&mut self) {
        if let Some(index) = self.current {
            self.workspaces[index].set_dirty(true);
        }
    }
}

// Appends the workspaces in `dir`; a name seen before keeps its slot but
// takes the new path.
fn scan_dir(dir: &Path, list: &mut Vec<Workspace>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("WorkspaceManager: Not scanning {dir:?}: {e}");
            return;
        }
    };
    let mut found: Vec<(String, std::path::PathBuf)> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| {
            if path.is_file()
                && let Some(ext) = path.extension()
                && ext == WORKSPACE_EXTENSION
                && let Some(stem) = path.file_stem()
            {
                return Some((stem.to_string_lossy().into_owned(), path));
            }
            None
        })
        .collect();
    found.sort_unstable();

    for (name, path) in found {
        if BuiltInWorkspace::from_name(&name).is_some() {
            log::warn!("WorkspaceManager: {path:?} names a built-in workspace, keeping the built-in");
            continue;
        }
        let read_only = !path_utils::is_writable(&path);
        match list.iter_mut().find(|w| names_match(w.name(), &name)) {
            Some(existing) => {
                log::debug!("WorkspaceManager: {path:?} overrides workspace '{name}'");
                existing.path = Some(path);
                existing.read_only = read_only;
            }
            None => {
                let mut workspace = Workspace::new(name, Some(path));
                workspace.read_only = read_only;
                list.push(workspace);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Result as ConfigResult;
    use crate::core::notifier::test_support::RecordingNotifier;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MemoryConfig {
        stored: Mutex<AppConfig>,
    }

    impl ConfigManagerOperations for MemoryConfig {
        fn load_app_config(&self) -> ConfigResult<AppConfig> {
            Ok(self.stored.lock().unwrap().clone())
        }

        fn save_app_config(&self, config: &AppConfig) -> ConfigResult<()> {
            *self.stored.lock().unwrap() = config.clone();
            Ok(())
        }
    }

    fn manager_in(dir: &Path) -> (WorkspaceManager, Arc<MemoryConfig>) {
        let config = Arc::new(MemoryConfig::default());
        let manager = WorkspaceManager::new(
            Arc::new(CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(dir))),
            config.clone(),
            Arc::new(LogNotifier),
        );
        (manager, config)
    }

    fn touch_workspace(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(format!("{name}.{WORKSPACE_EXTENSION}")), b"").unwrap();
    }

    #[test]
    fn test_scan_lists_built_ins_then_share_then_user() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let share = temp_dir.path().join("share");
        let paths = WorkspacePaths::rooted_at(temp_dir.path()).with_share_dir(share.clone());
        touch_workspace(&share, "Shipped");
        touch_workspace(&share, "Common");
        touch_workspace(&paths.user_dir, "Common");
        touch_workspace(&paths.user_dir, "mine");
        touch_workspace(&paths.user_dir, "basic");
        let mut manager = WorkspaceManager::new(
            Arc::new(CoreWorkspaceCodec::new(paths.clone())),
            Arc::new(MemoryConfig::default()),
            Arc::new(LogNotifier),
        );

        // Act
        let names: Vec<String> = manager
            .workspaces()
            .iter()
            .map(|w| w.name().to_string())
            .collect();

        // Assert
        assert_eq!(names, vec!["Basic", "Advanced", "Common", "Shipped", "mine"]);
        let common = manager
            .workspaces()
            .iter()
            .find(|w| w.name() == "Common")
            .unwrap();
        assert_eq!(common.path(), Some(&paths.user_dir.join("Common.workspace")));
    }

    #[test]
    fn test_validate_name_rejects_empty_and_reserved() {
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, _) = manager_in(temp_dir.path());

        assert!(matches!(
            manager.validate_name("   ", None),
            Err(WorkspaceError::InvalidName(_))
        ));
        assert!(matches!(
            manager.validate_name("ADVANCED", None),
            Err(WorkspaceError::NameConflict(_))
        ));
        assert_eq!(manager.validate_name("a/b", None).unwrap(), "a_b");
        assert_eq!(manager.validate_name("  Draft  ", None).unwrap(), "Draft");
    }

    #[test]
    fn test_init_prefers_remembered_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, config) = manager_in(temp_dir.path());
        *config.stored.lock().unwrap() = AppConfig {
            last_workspace: Some("Advanced".to_string()),
        };
        let mut ctx = UiContext::new();

        manager.init_workspace(&mut ctx);

        assert_eq!(manager.current().unwrap().name(), "Advanced");
    }

    #[test]
    fn test_init_defaults_to_first_when_remembered_is_gone() {
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, config) = manager_in(temp_dir.path());
        *config.stored.lock().unwrap() = AppConfig {
            last_workspace: Some("Deleted long ago".to_string()),
        };
        let mut ctx = UiContext::new();

        manager.init_workspace(&mut ctx);

        assert_eq!(manager.current().unwrap().name(), "Basic");
    }

    #[test]
    fn test_switch_reports_outgoing_write_failure_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let mut manager = WorkspaceManager::new(
            Arc::new(CoreWorkspaceCodec::new(WorkspacePaths::rooted_at(temp_dir.path()))),
            Arc::new(MemoryConfig::default()),
            notifier.clone(),
        );
        let mut ctx = UiContext::new();
        manager.init_workspace(&mut ctx);
        manager
            .create_new_workspace("Doomed", SectionFlags::default(), &mut ctx)
            .unwrap();
        // Point the workspace at a directory that cannot hold a file.
        manager.workspaces[2].path = Some(temp_dir.path().join("missing").join("x.workspace"));
        manager.mark_dirty();

        let result = manager.switch_to("Basic", &mut ctx);

        assert!(result.is_ok());
        assert_eq!(manager.current().unwrap().name(), "Basic");
        assert_eq!(*notifier.failures.lock().unwrap(), vec!["Doomed".to_string()]);
    }

    #[test]
    fn test_switch_to_unknown_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, _) = manager_in(temp_dir.path());
        let mut ctx = UiContext::new();

        assert!(matches!(
            manager.switch_to("Nowhere", &mut ctx),
            Err(WorkspaceError::NotFound(_))
        ));
    }

    #[test]
    fn test_built_ins_cannot_be_deleted_or_renamed() {
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, _) = manager_in(temp_dir.path());
        let mut ctx = UiContext::new();
        manager.init_workspace(&mut ctx);

        assert!(matches!(
            manager.delete_workspace("basic", &mut ctx),
            Err(WorkspaceError::BuiltInWorkspace(_))
        ));
        assert!(matches!(
            manager.rename_current("Other", &mut ctx),
            Err(WorkspaceError::BuiltInWorkspace(_))
        ));
        // Saving a read-only workspace quietly does nothing.
        assert!(manager.save_current(&ctx).is_ok());
    }

    #[test]
    fn test_switch_remembers_current_in_config() {
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, config) = manager_in(temp_dir.path());
        let mut ctx = UiContext::new();
        manager.init_workspace(&mut ctx);

        manager.switch_to("advanced", &mut ctx).unwrap();

        assert_eq!(
            config.stored.lock().unwrap().last_workspace.as_deref(),
            Some("Advanced")
        );
    }

    #[test]
    fn test_mark_dirty_and_undo() {
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, _) = manager_in(temp_dir.path());
        let mut ctx = UiContext::new();
        manager.init_workspace(&mut ctx);
        manager
            .create_new_workspace("Scratch", SectionFlags::all(), &mut ctx)
            .unwrap();

        manager.mark_dirty();
        assert!(manager.current().unwrap().is_dirty());
        manager.undo_changes(&mut ctx).unwrap();

        assert!(!manager.current().unwrap().is_dirty());
    }

    #[test]
    fn test_names_collide_across_non_ascii_case() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, _) = manager_in(temp_dir.path());
        let mut ctx = UiContext::new();
        manager.init_workspace(&mut ctx);
        manager
            .create_new_workspace("Ärger", SectionFlags::default(), &mut ctx)
            .unwrap();

        // Act
        let result = manager.create_new_workspace("ärger", SectionFlags::default(), &mut ctx);

        // Assert
        assert!(matches!(result, Err(WorkspaceError::NameConflict(_))));
        assert_eq!(manager.workspaces().len(), 3);
        manager.switch_to("Basic", &mut ctx).unwrap();
        manager.switch_to("ÄRGER", &mut ctx).unwrap();
        assert_eq!(manager.current().unwrap().name(), "Ärger");
    }

    #[test]
    fn test_rename_keeps_path_when_old_file_cannot_be_removed() {
        // Arrange
        crate::initialize_logging();
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, _) = manager_in(temp_dir.path());
        let mut ctx = UiContext::new();
        manager.init_workspace(&mut ctx);
        manager
            .create_new_workspace("Draft", SectionFlags::default(), &mut ctx)
            .unwrap();
        // A directory in place of the file makes removal fail for any user.
        let blocker = temp_dir.path().join("Blocker.workspace");
        fs::create_dir_all(blocker.join("inner")).unwrap();
        manager.workspaces[2].path = Some(blocker.clone());

        // Act
        let result = manager.rename_current("Final", &mut ctx);

        // Assert
        assert!(result.is_err());
        let current = manager.current().unwrap();
        assert_eq!(current.name(), "Draft");
        assert_eq!(current.path(), Some(&blocker));
        assert!(!WorkspacePaths::rooted_at(temp_dir.path())
            .workspace_file("Final")
            .exists());
    }

    #[test]
    fn test_edit_with_conflicting_name_keeps_sections() {
        let temp_dir = TempDir::new().unwrap();
        let (mut manager, _) = manager_in(temp_dir.path());
        let mut ctx = UiContext::new();
        manager.init_workspace(&mut ctx);
        manager
            .create_new_workspace("One", SectionFlags::default(), &mut ctx)
            .unwrap();
        manager
            .create_new_workspace("Two", SectionFlags::default(), &mut ctx)
            .unwrap();

        let result = manager.edit_current("one", SectionFlags::all(), &mut ctx);

        assert!(matches!(result, Err(WorkspaceError::NameConflict(_))));
        let current = manager.current().unwrap();
        assert_eq!(current.name(), "Two");
        assert_eq!(current.sections, SectionFlags::default());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_marks_unwritable_files_read_only() {
        use std::os::unix::fs::PermissionsExt;

        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let share = temp_dir.path().join("share");
        let paths = WorkspacePaths::rooted_at(temp_dir.path()).with_share_dir(share.clone());
        touch_workspace(&share, "Shipped");
        touch_workspace(&paths.user_dir, "Mine");
        let shipped = share.join("Shipped.workspace");
        fs::set_permissions(&shipped, fs::Permissions::from_mode(0o444)).unwrap();
        let shipped_writable = fs::OpenOptions::new().append(true).open(&shipped).is_ok();
        let mut manager = WorkspaceManager::new(
            Arc::new(CoreWorkspaceCodec::new(paths)),
            Arc::new(MemoryConfig::default()),
            Arc::new(LogNotifier),
        );

        // Act
        let list = manager.workspaces();

        // Assert
        let read_only_of = |name: &str| {
            list.iter()
                .find(|w| w.name() == name)
                .map(|w| w.is_read_only())
                .unwrap()
        };
        assert_eq!(read_only_of("Shipped"), !shipped_writable);
        assert!(!read_only_of("Mine"));
    }
}
