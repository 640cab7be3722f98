// Small helpers over quick-xml shared by the manifest, palette and workspace document codecs.
use crate::core::error::{Result, WorkspaceError};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

pub(crate) type XmlWriter = Writer<Vec<u8>>;

pub(crate) fn new_writer() -> Result<XmlWriter> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

pub(crate) fn new_reader(bytes: &[u8]) -> Reader<&[u8]> {
    Reader::from_reader(bytes)
}

pub(crate) fn start(writer: &mut XmlWriter, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
    let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
    writer.write_event(Event::Start(element))?;
    Ok(())
}

pub(crate) fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub(crate) fn empty(writer: &mut XmlWriter, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
    let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

// Writes `<name attrs>text</name>`, or `<name attrs/>` when `text` is empty.
pub(crate) fn text_element(
    writer: &mut XmlWriter,
    name: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> Result<()> {
    if text.is_empty() {
        return empty(writer, name, attributes);
    }
    start(writer, name, attributes)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

pub(crate) fn attribute(element: &BytesStart, key: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

pub(crate) fn element_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/*
 * Reads the text content of the element whose start tag was just consumed,
 * up to and including its end tag. Nested elements are skipped.
 */
pub(crate) fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::Start(nested) => {
                reader.read_to_end(nested.name())?;
            }
            Event::End(_) => return Ok(text),
            Event::Eof => {
                return Err(WorkspaceError::malformed(
                    "unexpected end of document inside text element",
                ));
            }
            _ => {}
        }
    }
}

// Skips the rest of an element whose start tag was just consumed.
pub(crate) fn skip_element(reader: &mut Reader<&[u8]>, element: &BytesStart) -> Result<()> {
    log::trace!("XmlSupport: Skipping unknown element <{}>", element_name(element));
    reader.read_to_end(element.name())?;
    Ok(())
}

pub(crate) fn finish(writer: XmlWriter) -> Vec<u8> {
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    bytes
}
