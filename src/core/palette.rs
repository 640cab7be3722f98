/*
 * Palette contents as carried by a workspace: named palettes made of cells,
 * each cell naming the score element it inserts and optionally an image asset
 * from the `ImageStore`. Built-in workspaces mark every palette as a system
 * palette with read-only cells; user workspaces leave them editable.
 */
use crate::core::error::Result;
use crate::core::xml_support::{self, XmlWriter};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeSet;

pub const PALETTE_BOX_TAG: &str = "PaletteBox";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteCell {
    pub name: String,
    pub element: String,
    pub image: Option<String>,
    pub read_only: bool,
}

impl PaletteCell {
    pub fn new(name: &str, element: &str) -> Self {
        PaletteCell {
            name: name.to_string(),
            element: element.to_string(),
            image: None,
            read_only: false,
        }
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.image = Some(image.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub name: String,
    pub system: bool,
    pub cells: Vec<PaletteCell>,
}

impl Palette {
    pub fn new(name: &str, cells: Vec<PaletteCell>) -> Self {
        Palette {
            name: name.to_string(),
            system: false,
            cells,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteBox {
    pub palettes: Vec<Palette>,
}

impl PaletteBox {
    pub fn new(palettes: Vec<Palette>) -> Self {
        PaletteBox { palettes }
    }

    pub fn clear(&mut self) {
        self.palettes.clear();
    }

    // System palettes have every cell read-only.
    pub fn set_system(&mut self, system: bool) {
        for palette in &mut self.palettes {
            palette.system = system;
            for cell in &mut palette.cells {
                cell.read_only = system;
            }
        }
    }

    pub fn is_fully_system(&self) -> bool {
        self.palettes
            .iter()
            .all(|p| p.system && p.cells.iter().all(|c| c.read_only))
    }

    pub fn referenced_images(&self) -> BTreeSet<&str> {
        self.palettes
            .iter()
            .flat_map(|p| p.cells.iter())
            .filter_map(|c| c.image.as_deref())
            .collect()
    }

    pub(crate) fn write_xml(&self, writer: &mut XmlWriter) -> Result<()> {
        xml_support::start(writer, PALETTE_BOX_TAG, &[])?;
        for palette in &self.palettes {
            xml_support::start(writer, "Palette", &[("name", palette.name.as_str())])?;
            for cell in &palette.cells {
                let mut attributes = vec![
                    ("name", cell.name.as_str()),
                    ("element", cell.element.as_str()),
                ];
                if let Some(image) = &cell.image {
                    attributes.push(("image", image.as_str()));
                }
                xml_support::empty(writer, "Cell", &attributes)?;
            }
            xml_support::end(writer, "Palette")?;
        }
        xml_support::end(writer, PALETTE_BOX_TAG)
    }

    // Reads the children of a `<PaletteBox>` whose start tag was just consumed.
    pub(crate) fn read_xml(reader: &mut Reader<&[u8]>) -> Result<PaletteBox> {
        let mut palettes = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == b"Palette" => {
                    let name = xml_support::attribute(&e, "name")?.unwrap_or_default();
                    palettes.push(Palette::new(&name, read_cells(reader)?));
                }
                Event::Empty(e) if e.name().as_ref() == b"Palette" => {
                    let name = xml_support::attribute(&e, "name")?.unwrap_or_default();
                    palettes.push(Palette::new(&name, Vec::new()));
                }
                Event::Start(e) => xml_support::skip_element(reader, &e)?,
                Event::End(_) => break,
                Event::Eof => {
                    return Err(crate::core::error::WorkspaceError::malformed(
                        "unterminated PaletteBox",
                    ));
                }
                _ => {}
            }
        }
        Ok(PaletteBox { palettes })
    }
}

fn read_cells(reader: &mut Reader<&[u8]>) -> Result<Vec<PaletteCell>> {
    let mut cells = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Empty(e) if e.name().as_ref() == b"Cell" => cells.push(cell_from(&e)?),
            Event::Start(e) if e.name().as_ref() == b"Cell" => {
                cells.push(cell_from(&e)?);
                xml_support::read_text(reader)?;
            }
            Event::Start(e) => xml_support::skip_element(reader, &e)?,
            Event::End(_) => return Ok(cells),
            Event::Eof => {
                return Err(crate::core::error::WorkspaceError::malformed(
                    "unterminated Palette",
                ));
            }
            _ => {}
        }
    }
}

fn cell_from(e: &BytesStart) -> Result<PaletteCell> {
    Ok(PaletteCell {
        name: xml_support::attribute(e, "name")?.unwrap_or_default(),
        element: xml_support::attribute(e, "element")?.unwrap_or_default(),
        image: xml_support::attribute(e, "image")?,
        read_only: false,
    })
}
