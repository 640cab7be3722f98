/*
 * Workspace persistence core. Leaf modules model the live UI and the on-disk
 * formats; `reconcile` moves sections between the two; `codec` reads and
 * writes whole workspaces; `profiles` keeps the list of workspaces and the
 * current one. The codec, config and notifier sit behind `*Operations`-style
 * traits so hosts and tests can substitute their own.
 */
pub mod archiver;
pub mod checksum_utils;
pub mod codec;
pub mod config;
pub mod context;
pub mod default_menu;
pub mod document;
pub mod error;
pub mod global_defaults;
pub mod images;
pub mod live_ui;
pub mod models;
pub mod notifier;
pub mod palette;
pub mod path_utils;
pub mod preferences;
pub mod profiles;
pub mod reconcile;
pub mod registry;
mod xml_support;


// Re-export key structures and enums
pub use models::{
    BuiltInWorkspace, Color, MenuNode, PreferenceEntry, PreferenceValue, ReadReport,
    SectionFlags, SectionSource, ToolbarKind, Workspace, WorkspaceDocument,
};

pub use context::{BuiltInPalettes, UiContext};
pub use live_ui::{LiveEntry, LiveMenu, LiveUi, ToolbarCatalog};
pub use palette::{Palette, PaletteBox, PaletteCell};
pub use preferences::PreferenceTable;
pub use registry::{ActionHandle, IdentifierRegistry, MenuHandle};

pub use error::{RegistryError, WorkspaceError};

// Re-export codec and registry-of-workspaces items
pub use codec::{CoreWorkspaceCodec, WorkspaceCodecOperations};
pub use profiles::WorkspaceManager;

// Re-export config, path and notification items
pub use config::{AppConfig, ConfigError, ConfigManagerOperations, CoreConfigManager};
pub use notifier::{LogNotifier, WorkspaceNotifier};
pub use path_utils::{WorkspacePaths, sanitize_workspace_name};
