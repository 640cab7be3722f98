/*
 * The workspace container: a zip file holding a manifest
 * (`META-INF/container.xml`), the root document it points at, and zero or
 * more embedded images under `Pictures/`. This module only moves bytes in and
 * out of the container; what the root document means is up to `document`.
 */
use crate::core::error::{Result, WorkspaceError};
use crate::core::images;
use crate::core::xml_support;
use quick_xml::events::Event;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const MANIFEST_PATH: &str = "META-INF/container.xml";
const CREATION_MODE: u32 = 0o666;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContainer {
    pub root_file: String,
    pub root_document: Vec<u8>,
    // (logical name, bytes); stored as `Pictures/<logical name>`.
    pub images: Vec<(String, Vec<u8>)>,
}

impl WorkspaceContainer {
    pub fn new(root_file: &str, root_document: Vec<u8>) -> Self {
        WorkspaceContainer {
            root_file: root_file.to_string(),
            root_document,
            images: Vec::new(),
        }
    }
}

pub(crate) fn write_manifest(root_file: &str, image_paths: &[String]) -> Result<Vec<u8>> {
    let mut writer = xml_support::new_writer()?;
    xml_support::start(&mut writer, "container", &[])?;
    xml_support::start(&mut writer, "rootfiles", &[])?;
    xml_support::empty(&mut writer, "rootfile", &[("full-path", root_file)])?;
    for path in image_paths {
        xml_support::text_element(&mut writer, "file", &[], path)?;
    }
    xml_support::end(&mut writer, "rootfiles")?;
    xml_support::end(&mut writer, "container")?;
    Ok(xml_support::finish(writer))
}

// Returns the root file name (if any) and the listed asset paths.
pub(crate) fn parse_manifest(bytes: &[u8]) -> Result<(Option<String>, Vec<String>)> {
    let mut reader = xml_support::new_reader(bytes);
    let mut root_file = None;
    let mut files = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"rootfile" => {
                if root_file.is_none() {
                    root_file = xml_support::attribute(&e, "full-path")?;
                }
            }
            Event::Start(e) if e.name().as_ref() == b"file" => {
                let path = xml_support::read_text(&mut reader)?;
                let path = path.trim();
                if !path.is_empty() {
                    files.push(path.to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok((root_file, files))
}

/*
 * Writes `container` to `path`, replacing any existing file. The file is
 * created readable and writable by everyone; entries carry the same mode.
 */
pub fn write_container(path: &Path, container: &WorkspaceContainer) -> Result<()> {
    log::trace!("Archiver: Writing container {path:?}");
    let image_paths: Vec<String> = container
        .images
        .iter()
        .map(|(name, _)| images::container_path(name))
        .collect();
    let manifest = write_manifest(&container.root_file, &image_paths)?;

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(CREATION_MODE);

    zip.start_file(MANIFEST_PATH, options)?;
    zip.write_all(&manifest)?;
    for ((_, bytes), entry_path) in container.images.iter().zip(&image_paths) {
        zip.start_file(entry_path.as_str(), options)?;
        zip.write_all(bytes)?;
    }
    zip.start_file(container.root_file.as_str(), options)?;
    zip.write_all(&container.root_document)?;
    let mut writer = zip.finish()?;
    writer.flush()?;
    drop(writer);

    set_creation_permissions(path);
    log::debug!(
        "Archiver: Wrote container {path:?} ({} images, {} byte root document)",
        container.images.len(),
        container.root_document.len()
    );
    Ok(())
}

#[cfg(unix)]
fn set_creation_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(CREATION_MODE)) {
        log::warn!("Archiver: Could not set permissions on {path:?}: {e}");
    }
}

#[cfg(not(unix))]
fn set_creation_permissions(_path: &Path) {}

/*
 * Reads a container. The manifest decides the root document name and which
 * image assets to load; listed assets missing from the zip are skipped with a
 * warning. A container without a root file is malformed.
 */
pub fn read_container(path: &Path) -> Result<WorkspaceContainer> {
    log::trace!("Archiver: Reading container {path:?}");
    let file = File::open(path)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;

    let manifest = read_entry(&mut zip, MANIFEST_PATH)?;
    let (root_file, image_paths) = parse_manifest(&manifest)?;
    let root_file = root_file.ok_or_else(|| {
        WorkspaceError::malformed(format!("can't find rootfile in {}", path.display()))
    })?;

    let mut images = Vec::new();
    for image_path in &image_paths {
        match read_entry(&mut zip, image_path) {
            Ok(bytes) => images.push((images::logical_name(image_path).to_string(), bytes)),
            Err(e) => log::warn!("Archiver: Skipping asset '{image_path}' in {path:?}: {e}"),
        }
    }
    let root_document = read_entry(&mut zip, &root_file)?;

    Ok(WorkspaceContainer {
        root_file,
        root_document,
        images,
    })
}

fn read_entry<R: Read + std::io::Seek>(zip: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = zip.by_name(name)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}
