//! Riivolution manifest model and loader
//!
//! A manifest is an XML document of the shape
//!
//! ```xml
//! <wiidisc version="1" root="/mymod">
//!   <patch id="textures">
//!     <folder external="textures" disc="/Stage/Texture" />
//!     <file external="title.arc" disc="/Layout/title.arc" />
//!     <memory offset="0x80001234" value="38600001" original="38600000" />
//!   </patch>
//! </wiidisc>
//! ```
//!
//! Elements other than `patch`, `folder`, `file` and `memory` are ignored, as
//! are unknown attributes. Entries are kept exactly as written; deciding which
//! of them are applicable is the job of [`crate::rules`].

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{Error, Result};

/// Expected root element name
pub const ROOT_ELEMENT: &str = "wiidisc";

/// How often a child element appeared below its parent
///
/// XML has no list wrapper, so a single `<patch>` and several `<patch>`
/// siblings look different to a naive reader. The loader records the
/// difference here and immediately flattens it with [`Occurrence::into_vec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occurrence<T> {
    /// Exactly one element
    Single(T),
    /// Two or more sibling elements, in document order
    Repeated(Vec<T>),
}

impl<T> Occurrence<T> {
    /// Flatten into document-ordered items
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Occurrence::Single(item) => vec![item],
            Occurrence::Repeated(items) => items,
        }
    }
}

/// `<folder>` entry as written in the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderEntry {
    /// Disc-relative destination
    pub disc: Option<String>,
    /// Source path below the asset root
    pub external: Option<String>,
}

/// `<file>` entry as written in the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    /// Disc-relative destination
    pub disc: Option<String>,
    /// Source path below the asset root
    pub external: Option<String>,
}

/// `<memory>` entry as written in the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEntry {
    /// Hexadecimal memory address
    pub offset: Option<String>,
    /// Hexadecimal literal bytes
    pub value: Option<String>,
    /// File holding the bytes, below the asset root
    pub valuefile: Option<String>,
    /// Hexadecimal bytes expected before patching
    pub original: Option<String>,
}

/// A named, independently selectable group of entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    /// Patch identifier shown to the user
    pub id: String,
    /// Folder overlays
    pub folders: Vec<FolderEntry>,
    /// File overlays
    pub files: Vec<FileEntry>,
    /// Memory directives
    pub memory: Vec<MemoryEntry>,
}

/// A parsed manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Where the manifest was loaded from
    pub path: PathBuf,
    /// `root` attribute of `<wiidisc>`, an SD-relative asset directory
    pub root: Option<String>,
    /// Patches in document order
    pub patches: Vec<Patch>,
}

impl Manifest {
    /// Read and parse a manifest file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::parse(path, format!("cannot read file: {e}")))?;
        Self::parse(path, &text)
    }

    /// Parse manifest text; `path` is recorded and used in error messages
    pub fn parse<P: AsRef<Path>>(path: P, text: &str) -> Result<Self> {
        let path = path.as_ref();
        let root = read_tree(text).map_err(|reason| Error::parse(path, reason))?;

        if root.name != ROOT_ELEMENT {
            return Err(Error::parse(
                path,
                format!("root element is <{}>, expected <{ROOT_ELEMENT}>", root.name),
            ));
        }

        let patch_nodes = root
            .occurrences("patch")
            .ok_or_else(|| Error::parse(path, "no <patch> elements"))?
            .into_vec();

        let mut patches = Vec::with_capacity(patch_nodes.len());
        for node in patch_nodes {
            let id = node
                .attr("id")
                .ok_or_else(|| Error::parse(path, "<patch> without an id"))?;
            patches.push(Patch {
                id,
                folders: node
                    .children_named("folder")
                    .map(|n| FolderEntry {
                        disc: n.attr("disc"),
                        external: n.attr("external"),
                    })
                    .collect(),
                files: node
                    .children_named("file")
                    .map(|n| FileEntry {
                        disc: n.attr("disc"),
                        external: n.attr("external"),
                    })
                    .collect(),
                memory: node
                    .children_named("memory")
                    .map(|n| MemoryEntry {
                        offset: n.attr("offset"),
                        value: n.attr("value"),
                        valuefile: n.attr("valuefile"),
                        original: n.attr("original"),
                    })
                    .collect(),
            });
        }

        debug!("Parsed {} patches from {}", patches.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            root: root.attr("root"),
            patches,
        })
    }

    /// File stem of the manifest, the name of its asset folder on the SD card
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    /// Look up a patch by identifier
    pub fn patch(&self, id: &str) -> Option<&Patch> {
        self.patches.iter().find(|p| p.id == id)
    }
}

/// Minimal element tree; text content is irrelevant for manifests
#[derive(Debug, Default)]
struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Node {
    fn from_start(start: &BytesStart<'_>) -> std::result::Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| format!("bad attribute on <{name}>: {e}"))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| format!("bad value for {key} on <{name}>: {e}"))?;
            attrs.push((key, value.into_owned()));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    /// Attribute value; empty values count as absent
    fn attr(&self, key: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.occurrences(name)
            .map(Occurrence::into_vec)
            .unwrap_or_default()
            .into_iter()
    }

    fn occurrences(&self, name: &str) -> Option<Occurrence<&Node>> {
        let mut matching: Vec<&Node> = self.children.iter().filter(|c| c.name == name).collect();
        match matching.len() {
            0 => None,
            1 => matching.pop().map(Occurrence::Single),
            _ => Some(Occurrence::Repeated(matching)),
        }
    }
}

/// Parse `text` into its single root element
fn read_tree(text: &str) -> std::result::Result<Node, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("not well-formed XML at byte {}: {e}", reader.error_position()))?;

        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err("more than one root element".to_string());
                }
                stack.push(Node::from_start(&start)?);
            }
            Event::Empty(start) => {
                let node = Node::from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None if root.is_none() => root = Some(node),
                    None => return Err("more than one root element".to_string()),
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Text(text) if stack.is_empty() => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return Err("text outside of the root element".to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}
