/*
 * Encoding and parsing of the root document (`workspace.xml`) of a workspace
 * container. The document is turned into a `WorkspaceDocument` value with no
 * reference to the live UI, so it can be produced, inspected and compared on
 * its own. Global default containers use the same document shape with a
 * single section present.
 *
 * Layout:
 *   <museScore version="..">
 *     <Workspace>
 *       <PaletteBox>..</PaletteBox>
 *       <Toolbar name="noteInput"><action>id</action>..</Toolbar>
 *       <Preferences><Preference name="..">text</Preference>..</Preferences>
 *       <MenuBar><Menu name="id">..</Menu><action>id</action><action/>..</MenuBar>
 *       <State>base64</State>
 *     </Workspace>
 *   </museScore>
 */
use crate::core::error::{Result, WorkspaceError};
use crate::core::models::{MenuNode, PreferenceEntry, ToolbarKind, WorkspaceDocument};
use crate::core::palette::PaletteBox;
use crate::core::xml_support::{self, XmlWriter};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

pub const ROOT_DOCUMENT_NAME: &str = "workspace.xml";
pub const WORKSPACE_VERSION: &str = "3.02";
const ROOT_TAG: &str = "museScore";
const WORKSPACE_TAG: &str = "Workspace";

pub fn write_workspace_document(doc: &WorkspaceDocument) -> Result<Vec<u8>> {
    let mut writer = xml_support::new_writer()?;
    let version = if doc.version.is_empty() {
        WORKSPACE_VERSION
    } else {
        doc.version.as_str()
    };
    xml_support::start(&mut writer, ROOT_TAG, &[("version", version)])?;
    xml_support::start(&mut writer, WORKSPACE_TAG, &[])?;

    if let Some(palette) = &doc.palette {
        palette.write_xml(&mut writer)?;
    }
    for (kind, entries) in &doc.toolbars {
        xml_support::start(&mut writer, "Toolbar", &[("name", kind.xml_name())])?;
        for entry in entries {
            xml_support::text_element(&mut writer, "action", &[], entry)?;
        }
        xml_support::end(&mut writer, "Toolbar")?;
    }
    if let Some(preferences) = &doc.preferences {
        xml_support::start(&mut writer, "Preferences", &[])?;
        for pref in preferences {
            xml_support::text_element(
                &mut writer,
                "Preference",
                &[("name", pref.name.as_str())],
                &pref.text,
            )?;
        }
        xml_support::end(&mut writer, "Preferences")?;
    }
    if let Some(menu_bar) = &doc.menu_bar {
        xml_support::start(&mut writer, "MenuBar", &[])?;
        write_menu_nodes(&mut writer, menu_bar)?;
        xml_support::end(&mut writer, "MenuBar")?;
    }
    if let Some(state) = &doc.gui_state {
        xml_support::text_element(&mut writer, "State", &[], &STANDARD.encode(state))?;
    }

    xml_support::end(&mut writer, WORKSPACE_TAG)?;
    xml_support::end(&mut writer, ROOT_TAG)?;
    Ok(xml_support::finish(writer))
}

fn write_menu_nodes(writer: &mut XmlWriter, nodes: &[MenuNode]) -> Result<()> {
    for node in nodes {
        match node {
            MenuNode::Menu { id, children } => {
                xml_support::start(writer, "Menu", &[("name", id.as_str())])?;
                write_menu_nodes(writer, children)?;
                xml_support::end(writer, "Menu")?;
            }
            MenuNode::Action(id) => xml_support::text_element(writer, "action", &[], id)?,
            MenuNode::Separator => xml_support::empty(writer, "action", &[])?,
        }
    }
    Ok(())
}

pub fn parse_workspace_document(bytes: &[u8]) -> Result<WorkspaceDocument> {
    let mut reader = xml_support::new_reader(bytes);
    let mut doc = WorkspaceDocument::default();
    let mut found_workspace = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == ROOT_TAG.as_bytes() => {
                doc.version = xml_support::attribute(&e, "version")?.unwrap_or_default();
                found_workspace |= parse_root_children(&mut reader, &mut doc)?;
            }
            Event::Start(e) if e.name().as_ref() == WORKSPACE_TAG.as_bytes() => {
                parse_workspace_body(&mut reader, &mut doc)?;
                found_workspace = true;
            }
            Event::Start(e) => xml_support::skip_element(&mut reader, &e)?,
            Event::Eof => break,
            _ => {}
        }
    }
    if !found_workspace {
        return Err(WorkspaceError::malformed("no Workspace element in document"));
    }
    Ok(doc)
}

fn parse_root_children(reader: &mut Reader<&[u8]>, doc: &mut WorkspaceDocument) -> Result<bool> {
    let mut found = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == WORKSPACE_TAG.as_bytes() => {
                parse_workspace_body(reader, doc)?;
                found = true;
            }
            Event::Start(e) => xml_support::skip_element(reader, &e)?,
            Event::End(_) => return Ok(found),
            Event::Eof => return Err(WorkspaceError::malformed("unterminated root element")),
            _ => {}
        }
    }
}

fn parse_workspace_body(reader: &mut Reader<&[u8]>, doc: &mut WorkspaceDocument) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"PaletteBox" => doc.palette = Some(PaletteBox::read_xml(reader)?),
                b"Toolbar" => {
                    let entries = parse_toolbar_entries(reader)?;
                    push_toolbar(doc, &e, entries)?;
                }
                b"Preferences" => doc.preferences = Some(parse_preferences(reader)?),
                b"MenuBar" => doc.menu_bar = Some(parse_menu_children(reader, 0)?),
                b"State" => {
                    let text = xml_support::read_text(reader)?;
                    let compact: String = text.split_whitespace().collect();
                    match STANDARD.decode(compact.as_bytes()) {
                        Ok(state) => doc.gui_state = Some(state),
                        Err(e) => log::warn!("WorkspaceDocument: Ignoring invalid State blob: {e}"),
                    }
                }
                // Written by old versions; the file name is authoritative.
                b"name" => {
                    xml_support::read_text(reader)?;
                }
                _ => xml_support::skip_element(reader, &e)?,
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"PaletteBox" => doc.palette = Some(PaletteBox::default()),
                b"Toolbar" => push_toolbar(doc, &e, Vec::new())?,
                b"Preferences" => doc.preferences = Some(Vec::new()),
                b"MenuBar" => doc.menu_bar = Some(Vec::new()),
                b"State" => doc.gui_state = Some(Vec::new()),
                _ => {}
            },
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(WorkspaceError::malformed("unterminated Workspace element")),
            _ => {}
        }
    }
}

fn push_toolbar(doc: &mut WorkspaceDocument, e: &BytesStart, entries: Vec<String>) -> Result<()> {
    let name = xml_support::attribute(e, "name")?.unwrap_or_default();
    match ToolbarKind::from_xml_name(&name) {
        Some(kind) => {
            doc.toolbars.retain(|(k, _)| *k != kind);
            doc.toolbars.push((kind, entries));
        }
        None => log::warn!("WorkspaceDocument: Ignoring unknown toolbar '{name}'"),
    }
    Ok(())
}

fn parse_toolbar_entries(reader: &mut Reader<&[u8]>) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"action" => {
                let id = xml_support::read_text(reader)?;
                let id = id.trim();
                if !id.is_empty() {
                    entries.push(id.to_string());
                }
            }
            Event::Start(e) => xml_support::skip_element(reader, &e)?,
            Event::End(_) => return Ok(entries),
            Event::Eof => return Err(WorkspaceError::malformed("unterminated Toolbar element")),
            _ => {}
        }
    }
}

fn parse_preferences(reader: &mut Reader<&[u8]>) -> Result<Vec<PreferenceEntry>> {
    let mut entries = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = xml_support::attribute(&e, "name")?;
                let text = xml_support::read_text(reader)?;
                match name {
                    Some(name) => entries.push(PreferenceEntry { name, text }),
                    None => log::warn!("WorkspaceDocument: Preference without a name skipped"),
                }
            }
            Event::Empty(e) => {
                if let Some(name) = xml_support::attribute(&e, "name")? {
                    entries.push(PreferenceEntry {
                        name,
                        text: String::new(),
                    });
                }
            }
            Event::End(_) => return Ok(entries),
            Event::Eof => {
                return Err(WorkspaceError::malformed("unterminated Preferences element"));
            }
            _ => {}
        }
    }
}

// Any element carrying a `name` attribute is a menu; anything else is an action.
fn parse_menu_children(reader: &mut Reader<&[u8]>, depth: usize) -> Result<Vec<MenuNode>> {
    const MAX_MENU_DEPTH: usize = 64;
    if depth > MAX_MENU_DEPTH {
        return Err(WorkspaceError::malformed("menu nesting too deep"));
    }
    let mut nodes = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match xml_support::attribute(&e, "name")? {
                Some(id) => {
                    let children = parse_menu_children(reader, depth + 1)?;
                    nodes.push(MenuNode::Menu { id, children });
                }
                None => {
                    let id = xml_support::read_text(reader)?;
                    let id = id.trim();
                    if id.is_empty() {
                        nodes.push(MenuNode::Separator);
                    } else {
                        nodes.push(MenuNode::Action(id.to_string()));
                    }
                }
            },
            Event::Empty(e) => match xml_support::attribute(&e, "name")? {
                Some(id) => nodes.push(MenuNode::Menu {
                    id,
                    children: Vec::new(),
                }),
                None => nodes.push(MenuNode::Separator),
            },
            Event::End(_) => return Ok(nodes),
            Event::Eof => return Err(WorkspaceError::malformed("unterminated menu element")),
            _ => {}
        }
    }
}
