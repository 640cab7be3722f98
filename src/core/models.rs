use crate::core::palette::PaletteBox;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// The two workspaces that ship with the application. They are never backed by a
// file of their own and can neither be renamed nor deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInWorkspace {
    Basic,
    Advanced,
}

impl BuiltInWorkspace {
    pub const ALL: [BuiltInWorkspace; 2] = [BuiltInWorkspace::Basic, BuiltInWorkspace::Advanced];

    pub fn name(self) -> &'static str {
        match self {
            BuiltInWorkspace::Basic => "Basic",
            BuiltInWorkspace::Advanced => "Advanced",
        }
    }

    /// Case-insensitive lookup, used for the reserved-name rule.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| names_match(b.name(), name))
    }
}

// Workspace names compare case-insensitively, folding non-ASCII letters too.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

// Which parts of the UI a workspace carries itself instead of deferring to the
// shared global defaults. All false for a freshly created workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SectionFlags {
    pub components: bool,
    pub toolbars: bool,
    pub menu_bar: bool,
    pub preferences: bool,
}

impl SectionFlags {
    pub fn all() -> Self {
        SectionFlags {
            components: true,
            toolbars: true,
            menu_bar: true,
            preferences: true,
        }
    }

    // Bit order: components, toolbars, menu_bar, preferences.
    pub fn from_bits(bits: u8) -> Self {
        SectionFlags {
            components: bits & 0b0001 != 0,
            toolbars: bits & 0b0010 != 0,
            menu_bar: bits & 0b0100 != 0,
            preferences: bits & 0b1000 != 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub(crate) name: String,
    pub(crate) path: Option<PathBuf>,
    pub(crate) dirty: bool,
    pub(crate) read_only: bool,
    pub(crate) built_in: Option<BuiltInWorkspace>,
    pub sections: SectionFlags,
}

impl Workspace {
    pub fn new(name: String, path: Option<PathBuf>) -> Self {
        Workspace {
            name,
            path,
            dirty: false,
            read_only: false,
            built_in: None,
            sections: SectionFlags::default(),
        }
    }

    pub fn built_in(which: BuiltInWorkspace) -> Self {
        Workspace {
            name: which.name().to_string(),
            path: None,
            dirty: false,
            read_only: true,
            built_in: Some(which),
            sections: SectionFlags::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only || self.built_in.is_some()
    }

    pub fn built_in_kind(&self) -> Option<BuiltInWorkspace> {
        self.built_in
    }

    pub fn is_built_in(&self) -> bool {
        self.built_in.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolbarKind {
    NoteInput,
    FileOperation,
    PlaybackControl,
}

impl ToolbarKind {
    pub const ALL: [ToolbarKind; 3] = [
        ToolbarKind::NoteInput,
        ToolbarKind::FileOperation,
        ToolbarKind::PlaybackControl,
    ];

    pub fn xml_name(self) -> &'static str {
        match self {
            ToolbarKind::NoteInput => "noteInput",
            ToolbarKind::FileOperation => "fileOperation",
            ToolbarKind::PlaybackControl => "playbackControl",
        }
    }

    pub fn from_xml_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.xml_name() == name)
    }
}

// On-disk menu bar tree, independent of the live menus it is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNode {
    Menu { id: String, children: Vec<MenuNode> },
    Action(String),
    Separator,
}

impl MenuNode {
    pub fn menu<S: Into<String>>(id: S, children: Vec<MenuNode>) -> Self {
        MenuNode::Menu {
            id: id.into(),
            children,
        }
    }

    pub fn action<S: Into<String>>(id: S) -> Self {
        MenuNode::Action(id.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }
}

// `#rrggbb`, with a trailing alpha byte only when not opaque.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("color '{s}' does not start with '#'"))?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(format!("color '{s}' is not #rrggbb or #rrggbbaa"));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("color '{s}': {e}"))
        };
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Color {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    Int(i64),
    Bool(bool),
    String(String),
    Color(Color),
}

impl PreferenceValue {
    // Parses `text` as the same variant as `self`; the declared default decides the type.
    pub fn parse_like(&self, text: &str) -> Result<PreferenceValue, String> {
        match self {
            PreferenceValue::Int(_) => text
                .trim()
                .parse::<i64>()
                .map(PreferenceValue::Int)
                .map_err(|e| format!("'{text}' is not an integer: {e}")),
            PreferenceValue::Bool(_) => match text.trim() {
                "1" | "true" => Ok(PreferenceValue::Bool(true)),
                "0" | "false" => Ok(PreferenceValue::Bool(false)),
                other => Err(format!("'{other}' is not a boolean")),
            },
            PreferenceValue::String(_) => Ok(PreferenceValue::String(text.to_string())),
            PreferenceValue::Color(_) => text.parse::<Color>().map(PreferenceValue::Color),
        }
    }

    pub fn to_xml_text(&self) -> String {
        match self {
            PreferenceValue::Int(v) => v.to_string(),
            PreferenceValue::Bool(v) => String::from(if *v { "1" } else { "0" }),
            PreferenceValue::String(v) => v.clone(),
            PreferenceValue::Color(c) => c.to_string(),
        }
    }

    pub fn same_type(&self, other: &PreferenceValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

// Untyped preference as found in a document; typed later against the master table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceEntry {
    pub name: String,
    pub text: String,
}

// In-memory form of `workspace.xml`. `None`/empty means the section is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceDocument {
    pub version: String,
    pub palette: Option<PaletteBox>,
    pub toolbars: Vec<(ToolbarKind, Vec<String>)>,
    pub preferences: Option<Vec<PreferenceEntry>>,
    pub menu_bar: Option<Vec<MenuNode>>,
    pub gui_state: Option<Vec<u8>>,
}

impl WorkspaceDocument {
    pub fn toolbar(&self, kind: ToolbarKind) -> Option<&[String]> {
        self.toolbars
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, entries)| entries.as_slice())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionSource {
    Profile,
    GlobalDefaults,
    BuiltIn,
}

// Where each section of the live UI came from after a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReport {
    pub components: SectionSource,
    pub toolbars: SectionSource,
    pub menu_bar: SectionSource,
    pub preferences: SectionSource,
    pub recovered: Option<String>,
}

impl ReadReport {
    pub(crate) fn built_in() -> Self {
        ReadReport {
            components: SectionSource::BuiltIn,
            toolbars: SectionSource::BuiltIn,
            menu_bar: SectionSource::BuiltIn,
            preferences: SectionSource::BuiltIn,
            recovered: None,
        }
    }
}
