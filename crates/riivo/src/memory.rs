//! Applying memory rules to the main executable
//!
//! Riivolution writes memory patches into RAM at boot. On a repacked disc the
//! same effect is achieved by patching `sys/main.dol` at the file offset that
//! gets loaded to the rule's address. The DOL header maps addresses to file
//! offsets:
//!
//! | Offset | Contents |
//! |--------|----------|
//! | `0x00` | 7 text + 11 data section file offsets |
//! | `0x48` | 18 section load addresses |
//! | `0x90` | 18 section sizes |
//!
//! All values are big-endian `u32`. Addresses outside every section (BSS,
//! heap, relocatable modules) cannot be patched on disc and are skipped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use log::{info, warn};

use crate::assets::AssetRoots;
use crate::error::{Error, Result};
use crate::rules::{MemoryRule, MemoryValue};

/// Location of the main executable in an extracted tree
pub const DOL_PATH: &str = "sys/main.dol";

/// Number of text sections in a DOL header
pub const TEXT_SECTIONS: usize = 7;
/// Number of data sections in a DOL header
pub const DATA_SECTIONS: usize = 11;
const SECTIONS: usize = TEXT_SECTIONS + DATA_SECTIONS;

/// One loadable section of a DOL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Offset of the section in the file
    pub file_offset: u32,
    /// Address the section is loaded to
    pub address: u32,
    /// Section length in bytes
    pub size: u32,
}

/// Section table of a DOL file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DolHeader {
    sections: Vec<Section>,
}

impl DolHeader {
    /// Read the section table from the start of a DOL
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut offsets = [0u32; SECTIONS];
        let mut addresses = [0u32; SECTIONS];
        let mut sizes = [0u32; SECTIONS];
        reader.read_u32_into::<BigEndian>(&mut offsets)?;
        reader.read_u32_into::<BigEndian>(&mut addresses)?;
        reader.read_u32_into::<BigEndian>(&mut sizes)?;

        let sections = (0..SECTIONS)
            .map(|i| Section {
                file_offset: offsets[i],
                address: addresses[i],
                size: sizes[i],
            })
            .filter(|s| s.size > 0)
            .collect();
        Ok(Self { sections })
    }

    /// Non-empty sections, text sections first
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// File offset of `len` bytes at `address`, if they lie in one section
    pub fn file_offset(&self, address: u32, len: usize) -> Option<u64> {
        let start = u64::from(address);
        let end = start.checked_add(len as u64)?;
        self.sections.iter().find_map(|s| {
            let section_start = u64::from(s.address);
            let section_end = section_start + u64::from(s.size);
            (start >= section_start && end <= section_end)
                .then(|| u64::from(s.file_offset) + (start - section_start))
        })
    }
}

/// Outcome of applying memory rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryReport {
    /// Rules written to the executable
    pub applied: usize,
    /// Rules skipped with a warning
    pub skipped: usize,
}

/// Write every memory rule into the working tree's `main.dol`
pub fn apply_memory_rules(work_dir: &Path, assets: &AssetRoots, rules: &[MemoryRule]) -> Result<MemoryReport> {
    let mut report = MemoryReport::default();
    if rules.is_empty() {
        return Ok(report);
    }

    let dol_path = work_dir.join(DOL_PATH);
    if !dol_path.is_file() {
        return Err(Error::environment(format!(
            "\"{}\" does not exist, memory patches cannot be applied",
            dol_path.display()
        )));
    }

    let mut dol = OpenOptions::new().read(true).write(true).open(&dol_path)?;
    let header = DolHeader::read(&mut dol).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::environment(format!(
            "\"{}\" is too short to be a DOL",
            dol_path.display()
        )),
        _ => Error::Io(e),
    })?;
    let file_len = dol.metadata()?.len();

    for rule in rules {
        if apply_rule(&mut dol, &header, file_len, assets, rule)? {
            report.applied += 1;
        } else {
            report.skipped += 1;
        }
    }
    dol.flush()?;

    Ok(report)
}

fn apply_rule(
    dol: &mut File,
    header: &DolHeader,
    file_len: u64,
    assets: &AssetRoots,
    rule: &MemoryRule,
) -> Result<bool> {
    let bytes = match &rule.value {
        MemoryValue::Literal(bytes) => bytes.clone(),
        MemoryValue::File(name) => match assets.resolve(name) {
            Some(path) if path.is_file() => fs::read(path)?,
            _ => {
                warn!("\"{}\" does not exist. Skipping.", assets.primary(name).display());
                return Ok(false);
            }
        },
    };
    if bytes.is_empty() {
        warn!("Memory patch at {:#010x} has no data. Skipping.", rule.offset);
        return Ok(false);
    }

    let check_len = rule.original.as_ref().map_or(0, Vec::len);
    let Some(position) = header.file_offset(rule.offset, bytes.len().max(check_len)) else {
        warn!(
            "Address {:#010x} (+{} bytes) is not inside main.dol. Skipping.",
            rule.offset,
            bytes.len()
        );
        return Ok(false);
    };
    if position + bytes.len().max(check_len) as u64 > file_len {
        warn!("Address {:#010x} maps past the end of main.dol. Skipping.", rule.offset);
        return Ok(false);
    }

    if let Some(original) = &rule.original {
        let mut current = vec![0u8; original.len()];
        dol.seek(SeekFrom::Start(position))?;
        dol.read_exact(&mut current)?;
        if &current != original {
            warn!(
                "Original bytes at {:#010x} do not match ({} != {}). Skipping.",
                rule.offset,
                hex(&current),
                hex(original)
            );
            return Ok(false);
        }
    }

    dol.seek(SeekFrom::Start(position))?;
    dol.write_all(&bytes)?;
    info!(
        "Patched {} bytes at {:#010x} (main.dol offset {position:#x})",
        bytes.len(),
        rule.offset
    );
    Ok(true)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
