/*
 * Workspace persistence for the notation editor's UI layer. A workspace is a
 * named bundle of UI customisation (palettes, toolbars, menu bar, preferences
 * and an opaque layout blob) stored in a zip container. This crate reads and
 * writes those containers, reconciles them against a live UI model, and keeps
 * the registry of known workspaces.
 *
 * All state lives in an explicitly owned `UiContext` and `WorkspaceManager`;
 * the host application drives them from its UI thread.
 */
pub mod core;

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/*
 * Installs the terminal logger once per process. Safe to call repeatedly,
 * which lets every test call it before exercising the core.
 */
pub fn initialize_logging() {
    LOGGING_INIT.call_once(|| {
        let level = if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        let config = ConfigBuilder::new()
            .set_target_level(LevelFilter::Error)
            .set_location_level(LevelFilter::Off)
            .build();
        if let Err(e) = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto) {
            eprintln!("Failed to initialize logger: {e}");
        }
    });
}

pub use crate::core::{
    BuiltInWorkspace, MenuNode, PreferenceValue, ReadReport, SectionFlags, SectionSource,
    ToolbarKind, UiContext, Workspace, WorkspaceError, WorkspaceManager,
};
