/*
 * The factory menu bar. Used when neither the workspace nor the global
 * defaults supply a menu bar section. Submenus whose contents the host fills
 * at runtime (recent files, workspaces) are listed without children.
 */
use crate::core::models::MenuNode;

fn actions(ids: &[&str]) -> Vec<MenuNode> {
    ids.iter().map(|id| MenuNode::action(*id)).collect()
}

// Concatenates groups of entries with a separator between each group.
fn grouped(groups: Vec<Vec<MenuNode>>) -> Vec<MenuNode> {
    let mut out = Vec::new();
    for (i, group) in groups.into_iter().enumerate() {
        if i > 0 {
            out.push(MenuNode::Separator);
        }
        out.extend(group);
    }
    out
}

fn numbered(prefix: &str, range: std::ops::RangeInclusive<u32>) -> Vec<MenuNode> {
    range.map(|i| MenuNode::action(format!("{prefix}{i}"))).collect()
}

fn file_menu() -> MenuNode {
    let mut opening = actions(&["startcenter", "file-new", "file-open"]);
    opening.push(MenuNode::menu("menu-open-recent", Vec::new()));
    MenuNode::menu(
        "menu-file",
        grouped(vec![
            opening,
            actions(&[
                "file-save",
                "file-save-as",
                "file-save-a-copy",
                "file-save-selection",
                "file-save-online",
                "file-export",
                "file-part-export",
                "file-import-pdf",
            ]),
            actions(&["file-close"]),
            actions(&["parts", "album", "layer"]),
            actions(&["edit-info", "media"]),
            actions(&["print"]),
            actions(&["quit"]),
        ]),
    )
}

fn edit_menu() -> MenuNode {
    MenuNode::menu(
        "menu-edit",
        grouped(vec![
            actions(&["undo", "redo"]),
            actions(&["cut", "copy", "paste", "swap", "delete"]),
            actions(&["select-all", "select-section", "find"]),
            actions(&["instruments"]),
            actions(&["debugger"]),
            actions(&["preference-dialog"]),
        ]),
    )
}

fn view_menu() -> MenuNode {
    let toolbars = MenuNode::menu(
        "menu-toolbars",
        grouped(vec![
            actions(&[
                "toggle-fileoperations",
                "toggle-transport",
                "toggle-concertpitch",
                "toggle-imagecapture",
                "toggle-noteinput",
            ]),
            actions(&["edit-toolbars"]),
        ]),
    );
    let mut bars = vec![toolbars, MenuNode::menu("menu-workspaces", Vec::new())];
    bars.extend(actions(&["toggle-statusbar"]));
    MenuNode::menu(
        "menu-view",
        grouped(vec![
            actions(&[
                "toggle-palette",
                "masterpalette",
                "inspector",
                "omr",
                "toggle-playpanel",
                "toggle-navigator",
                "toggle-timeline",
                "toggle-mixer",
                "synth-control",
                "toggle-selection-window",
                "toggle-piano",
            ]),
            actions(&["zoomin", "zoomout"]),
            bars,
            actions(&["split-h", "split-v"]),
            actions(&[
                "show-invisible",
                "show-unprintable",
                "show-frames",
                "show-pageborders",
                "mark-irregular",
            ]),
            actions(&["fullscreen"]),
        ]),
    )
}

fn add_menu() -> MenuNode {
    let notes: Vec<MenuNode> = "cdefgab"
        .chars()
        .map(|c| MenuNode::action(format!("note-{c}")))
        .collect();
    let chords: Vec<MenuNode> = "cdefgab"
        .chars()
        .map(|c| MenuNode::action(format!("chord-{c}")))
        .collect();
    let pitch = MenuNode::menu(
        "menu-add-pitch",
        grouped(vec![actions(&["note-input"]), notes, chords]),
    );
    let interval = MenuNode::menu(
        "menu-add-interval",
        grouped(vec![numbered("interval", 1..=9), numbered("interval-", 2..=9)]),
    );
    let tuplet = MenuNode::menu(
        "menu-tuplet",
        grouped(vec![
            actions(&[
                "duplet",
                "triplet",
                "quadruplet",
                "quintuplet",
                "sextuplet",
                "septuplet",
                "octuplet",
                "nonuplet",
            ]),
            actions(&["tuplet-dialog"]),
        ]),
    );
    let measures = MenuNode::menu(
        "menu-add-measures",
        grouped(vec![
            actions(&["insert-measure", "insert-measures"]),
            actions(&["append-measure", "append-measures"]),
        ]),
    );
    let frames = MenuNode::menu(
        "menu-add-frames",
        grouped(vec![
            actions(&["insert-hbox", "insert-vbox", "insert-textframe", "insert-fretframe"]),
            actions(&["append-hbox", "append-vbox", "append-textframe"]),
        ]),
    );
    let text = MenuNode::menu(
        "menu-add-text",
        grouped(vec![
            actions(&["title-text", "subtitle-text", "composer-text", "poet-text", "part-text"]),
            actions(&[
                "system-text",
                "staff-text",
                "expression-text",
                "chord-text",
                "rehearsalmark-text",
                "instrument-change-text",
                "fingering-text",
            ]),
            actions(&["lyrics", "figured-bass", "tempo"]),
        ]),
    );
    let lines = MenuNode::menu(
        "menu-add-lines",
        actions(&[
            "add-slur",
            "add-hairpin",
            "add-hairpin-reverse",
            "add-8va",
            "add-8vb",
            "add-noteline",
        ]),
    );
    MenuNode::menu(
        "menu-add",
        grouped(vec![
            vec![pitch, interval, tuplet],
            vec![measures, frames, text, lines],
        ]),
    )
}

fn format_menu() -> MenuNode {
    let stretch = MenuNode::menu(
        "menu-stretch",
        grouped(vec![
            actions(&["stretch+", "stretch-"]),
            actions(&["reset-stretch"]),
        ]),
    );
    let mut breaks = actions(&["add-remove-breaks"]);
    breaks.push(stretch);
    MenuNode::menu(
        "menu-format",
        grouped(vec![
            actions(&["edit-style", "page-settings"]),
            breaks,
            actions(&["reset-beammode", "reset"]),
            actions(&["edit-harmony"]),
            actions(&["load-style", "save-style"]),
        ]),
    )
}

fn tools_menu() -> MenuNode {
    let voices = MenuNode::menu(
        "menu-voices",
        actions(&["voice-x12", "voice-x13", "voice-x14", "voice-x23", "voice-x24", "voice-x34"]),
    );
    let mut explode = actions(&["explode", "implode"]);
    explode.push(voices);
    MenuNode::menu(
        "menu-tools",
        grouped(vec![
            actions(&["transpose"]),
            explode,
            actions(&["slash-fill", "slash-rhythm"]),
            actions(&["pitch-spell", "reset-groupings", "resequence-rehearsal-marks"]),
            actions(&["copy-lyrics-to-clipboard", "fotomode", "del-empty-measures"]),
        ]),
    )
}

fn plugins_menu() -> MenuNode {
    MenuNode::menu(
        "menu-plugins",
        grouped(vec![actions(&["plugin-manager", "plugin-creator"]), Vec::new()]),
    )
}

fn help_menu() -> MenuNode {
    MenuNode::menu(
        "menu-help",
        grouped(vec![
            actions(&["online-handbook"]),
            actions(&["about", "about-qt", "about-musicxml", "check-update"]),
            actions(&["ask-help", "report-bug"]),
            actions(&["resource-manager"]),
            actions(&["revert-factory"]),
        ]),
    )
}

pub fn default_menu_bar() -> Vec<MenuNode> {
    vec![
        file_menu(),
        edit_menu(),
        view_menu(),
        add_menu(),
        format_menu(),
        tools_menu(),
        plugins_menu(),
        MenuNode::Separator,
        help_menu(),
    ]
}
