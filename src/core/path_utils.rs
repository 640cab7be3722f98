/*
 * Locations the workspace layer reads from and writes to. Production code
 * derives them from the platform's per-user data and config directories via
 * `ProjectDirs`; tests root everything under a temporary directory.
 *
 *   <data>/workspaces/<name>.workspace     user workspaces
 *   <data>/workspaces/global/<section>.xml global default containers
 *   <share>/<name>.workspace               shipped workspaces (optional)
 *   <config>/                              last-used workspace and friends
 */
use directories::ProjectDirs;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

pub const WORKSPACE_EXTENSION: &str = "workspace";
const WORKSPACES_DIR_NAME: &str = "workspaces";
const GLOBAL_DIR_NAME: &str = "global";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    pub user_dir: PathBuf,
    pub share_dir: Option<PathBuf>,
    pub global_defaults_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl WorkspacePaths {
    /*
     * Platform directories for `app_name`, without an organization qualifier.
     * Returns `None` when the platform offers no home directory. Nothing is
     * created here; writers create what they need.
     */
    pub fn for_app(app_name: &str) -> Option<Self> {
        log::trace!("PathUtils: Resolving workspace directories for '{app_name}'");
        let dirs = ProjectDirs::from("", "", app_name)?;
        let user_dir = dirs.data_local_dir().join(WORKSPACES_DIR_NAME);
        Some(WorkspacePaths {
            global_defaults_dir: user_dir.join(GLOBAL_DIR_NAME),
            user_dir,
            share_dir: None,
            config_dir: dirs.config_local_dir().to_path_buf(),
        })
    }

    pub fn rooted_at(root: &Path) -> Self {
        let user_dir = root.join(WORKSPACES_DIR_NAME);
        WorkspacePaths {
            global_defaults_dir: user_dir.join(GLOBAL_DIR_NAME),
            user_dir,
            share_dir: None,
            config_dir: root.join("config"),
        }
    }

    pub fn with_share_dir(mut self, share_dir: PathBuf) -> Self {
        self.share_dir = Some(share_dir);
        self
    }

    // Where a user workspace with this (already sanitized) name lives.
    pub fn workspace_file(&self, sanitized_name: &str) -> PathBuf {
        self.user_dir
            .join(format!("{sanitized_name}.{WORKSPACE_EXTENSION}"))
    }

    pub fn global_defaults_file(&self, file_name: &str) -> PathBuf {
        self.global_defaults_dir.join(file_name)
    }
}

const FORBIDDEN_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

// File-system safe form of a workspace name; each forbidden character becomes `_`.
pub fn sanitize_workspace_name(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/*
 * Makes sure `dir` exists, creating missing parents. Logged the same way for
 * every directory the workspace layer owns.
 */
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        log::trace!("PathUtils: Directory already exists: {dir:?}");
        return Ok(());
    }
    fs::create_dir_all(dir).inspect_err(|e| {
        log::error!("PathUtils: Failed to create directory {dir:?}: {e}");
    })?;
    log::debug!("PathUtils: Created directory: {dir:?}");
    Ok(())
}

// Whether the current user may write `path`. Opens for append without
// creating, so missing files and directories count as not writable.
pub fn is_writable(path: &Path) -> bool {
    match OpenOptions::new().append(true).open(path) {
        Ok(_) => true,
        Err(e) => {
            log::trace!("PathUtils: {path:?} is not writable: {e}");
            false
        }
    }
}
