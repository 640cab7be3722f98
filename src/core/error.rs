/*
 * Error types shared by the workspace codec, the reconciliation engine and the
 * workspace registry. Only conditions that abort an operation are errors;
 * stale identifiers and untyped preference values are logged and skipped by
 * the callers instead.
 */
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("identifier '{0}' is already registered")]
    DuplicateId(String),
    #[error("handle {0} is already registered")]
    DuplicateHandle(u32),
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("writing workspace file {path:?} failed: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
    #[error("reading workspace file {path:?} failed: {reason}")]
    ReadFailed { path: PathBuf, reason: String },
    #[error("'{0}' does already exist, please choose a different name")]
    NameConflict(String),
    #[error("invalid workspace name: '{0}'")]
    InvalidName(String),
    #[error("workspace '{0}' is built in and cannot be changed")]
    BuiltInWorkspace(String),
    #[error("workspace '{0}' not found")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("container error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl WorkspaceError {
    pub fn malformed<T: Into<String>>(message: T) -> Self {
        Self::Malformed(message.into())
    }

    pub(crate) fn write_failed(path: &std::path::Path, err: &dyn std::fmt::Display) -> Self {
        Self::WriteFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn read_failed(path: &std::path::Path, err: &dyn std::fmt::Display) -> Self {
        Self::ReadFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for WorkspaceError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        WorkspaceError::Xml(quick_xml::Error::from(err))
    }
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;
