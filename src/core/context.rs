/*
 * The application UI context: everything a workspace read or write touches,
 * owned by the host session and passed by reference into the codec and the
 * workspace manager. Holds the identifier registry, the live UI model, the
 * toolbar catalog, the preference table, the shared image store and the
 * palette sets of the built-in workspaces.
 */
use crate::core::images::ImageStore;
use crate::core::live_ui::{LiveUi, ToolbarCatalog};
use crate::core::models::BuiltInWorkspace;
use crate::core::palette::PaletteBox;
use crate::core::preferences::PreferenceTable;
use crate::core::registry::IdentifierRegistry;

#[derive(Debug, Clone, Default)]
pub struct BuiltInPalettes {
    pub basic: PaletteBox,
    pub advanced: PaletteBox,
}

impl BuiltInPalettes {
    pub fn for_workspace(&self, which: BuiltInWorkspace) -> &PaletteBox {
        match which {
            BuiltInWorkspace::Basic => &self.basic,
            BuiltInWorkspace::Advanced => &self.advanced,
        }
    }
}

#[derive(Debug, Default)]
pub struct UiContext {
    pub registry: IdentifierRegistry,
    pub live: LiveUi,
    pub catalog: ToolbarCatalog,
    pub preferences: PreferenceTable,
    pub images: ImageStore,
    pub built_in_palettes: BuiltInPalettes,
}

impl UiContext {
    pub fn new() -> Self {
        Self::default()
    }

    /*
     * Installs the palette set of a built-in workspace into the live palette
     * box, with every palette marked as a read-only system palette.
     */
    pub fn apply_built_in_palettes(&mut self, which: BuiltInWorkspace) {
        let mut palettes = self.built_in_palettes.for_workspace(which).clone();
        palettes.set_system(true);
        self.live.palette_box = palettes;
        log::debug!(
            "UiContext: Applied built-in palette set '{}' ({} palettes)",
            which.name(),
            self.live.palette_box.palettes.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::palette::{Palette, PaletteCell};

    #[test]
    fn test_apply_built_in_palettes_marks_system() {
        let mut ctx = UiContext::new();
        ctx.built_in_palettes.basic = PaletteBox::new(vec![Palette::new(
            "Clefs",
            vec![PaletteCell::new("Treble clef", "clef-G")],
        )]);

        ctx.apply_built_in_palettes(BuiltInWorkspace::Basic);

        assert_eq!(ctx.live.palette_box.palettes.len(), 1);
        assert!(ctx.live.palette_box.is_fully_system());
        // The source set is left untouched.
        assert!(!ctx.built_in_palettes.basic.palettes[0].system);
    }
}
