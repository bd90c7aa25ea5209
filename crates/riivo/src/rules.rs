//! Collecting applicable rules from selected patches
//!
//! Only fully populated entries become rules. Anything partial or malformed is
//! dropped without an error, the way Riivolution itself ignores entries it
//! cannot use.

use log::debug;

use crate::error::{Error, Result};
use crate::manifest::{FileEntry, FolderEntry, MemoryEntry, Patch};

/// Replace a folder of the working tree with an external folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRule {
    /// Disc-relative destination
    pub disc: String,
    /// Source path below the asset root
    pub external: String,
}

/// Place an external file into the working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRule {
    /// Disc-relative destination fragment
    pub disc: String,
    /// Source path below the asset root
    pub external: String,
}

/// Where the bytes of a memory rule come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryValue {
    /// Bytes written inline in the manifest
    Literal(Vec<u8>),
    /// Path of a file below the asset root
    File(String),
}

/// Write bytes at a memory address of the main executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRule {
    /// Memory address
    pub offset: u32,
    /// Bytes to write
    pub value: MemoryValue,
    /// Bytes that must be present before writing
    pub original: Option<Vec<u8>>,
}

/// Rules of all selected patches, in manifest order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Folder overlays
    pub folders: Vec<FolderRule>,
    /// File overlays
    pub files: Vec<FileRule>,
    /// Memory directives
    pub memory: Vec<MemoryRule>,
}

impl RuleSet {
    /// Flatten the applicable entries of `patches`
    pub fn collect<'a, I>(patches: I) -> Self
    where
        I: IntoIterator<Item = &'a Patch>,
    {
        let mut rules = Self::default();
        for patch in patches {
            rules
                .folders
                .extend(patch.folders.iter().filter_map(FolderRule::from_entry));
            rules
                .files
                .extend(patch.files.iter().filter_map(FileRule::from_entry));
            rules
                .memory
                .extend(patch.memory.iter().filter_map(MemoryRule::from_entry));
        }
        debug!(
            "Collected {} folder, {} file and {} memory rules",
            rules.folders.len(),
            rules.files.len(),
            rules.memory.len()
        );
        rules
    }

    /// Total number of rules
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len() + self.memory.len()
    }

    /// True when no rule of any kind was collected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject an empty rule set
    pub fn require_non_empty(self) -> Result<Self> {
        if self.is_empty() {
            Err(Error::EmptySelection)
        } else {
            Ok(self)
        }
    }
}

impl FolderRule {
    fn from_entry(entry: &FolderEntry) -> Option<Self> {
        Some(Self {
            disc: entry.disc.clone()?,
            external: entry.external.clone()?,
        })
    }
}

impl FileRule {
    fn from_entry(entry: &FileEntry) -> Option<Self> {
        Some(Self {
            disc: entry.disc.clone()?,
            external: entry.external.clone()?,
        })
    }
}

impl MemoryRule {
    fn from_entry(entry: &MemoryEntry) -> Option<Self> {
        let offset = parse_address(entry.offset.as_deref()?)?;
        let literal = entry.value.as_deref().and_then(parse_hex_bytes);
        let value = match (literal, &entry.valuefile) {
            (Some(bytes), _) => MemoryValue::Literal(bytes),
            (None, Some(file)) => MemoryValue::File(file.clone()),
            (None, None) => return None,
        };
        let original = match &entry.original {
            Some(original) => Some(parse_hex_bytes(original)?),
            None => None,
        };
        Some(Self {
            offset,
            value,
            original,
        })
    }
}

/// Parse a hexadecimal address with or without `0x`
pub fn parse_address(text: &str) -> Option<u32> {
    let digits = strip_hex_prefix(text.trim());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Parse a hexadecimal byte string with or without `0x`
pub fn parse_hex_bytes(text: &str) -> Option<Vec<u8>> {
    let digits = strip_hex_prefix(text.trim());
    if digits.is_empty()
        || digits.len() % 2 != 0
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn folder(disc: Option<&str>, external: Option<&str>) -> FolderEntry {
        FolderEntry {
            disc: disc.map(str::to_string),
            external: external.map(str::to_string),
        }
    }

    fn file(disc: Option<&str>, external: Option<&str>) -> FileEntry {
        FileEntry {
            disc: disc.map(str::to_string),
            external: external.map(str::to_string),
        }
    }

    fn memory(offset: Option<&str>, value: Option<&str>, valuefile: Option<&str>) -> MemoryEntry {
        MemoryEntry {
            offset: offset.map(str::to_string),
            value: value.map(str::to_string),
            valuefile: valuefile.map(str::to_string),
            original: None,
        }
    }

    #[test]
    fn test_empty_patch_yields_empty_rules() {
        let patch = Patch {
            id: "P1".to_string(),
            ..Patch::default()
        };
        let rules = RuleSet::collect([&patch]);

        assert!(rules.folders.is_empty());
        assert!(rules.files.is_empty());
        assert!(rules.memory.is_empty());
        assert!(matches!(
            rules.require_non_empty(),
            Err(Error::EmptySelection)
        ));
    }

    #[test]
    fn test_partial_entries_are_dropped() {
        let patch = Patch {
            id: "mixed".to_string(),
            folders: vec![
                folder(Some("a"), Some("b")),
                folder(None, Some("b")),
                folder(Some("a"), None),
            ],
            files: vec![file(Some("x"), Some("y")), file(None, None)],
            memory: vec![
                memory(Some("80001000"), Some("00"), None),
                memory(Some("80001000"), None, None),
                memory(None, Some("00"), None),
                memory(Some("80001000"), None, Some("code.bin")),
            ],
        };
        let rules = RuleSet::collect([&patch]);

        assert_eq!(
            rules.folders,
            vec![FolderRule {
                disc: "a".to_string(),
                external: "b".to_string()
            }]
        );
        assert_eq!(rules.files.len(), 1);
        assert_eq!(rules.memory.len(), 2);
        assert_eq!(rules.memory[1].value, MemoryValue::File("code.bin".to_string()));
        assert!(rules.len() < patch.folders.len() + patch.files.len() + patch.memory.len());
    }

    #[test]
    fn test_rule_count_matches_when_fully_populated() {
        let patch = Patch {
            id: "full".to_string(),
            folders: vec![folder(Some("a"), Some("b")), folder(Some("c"), Some("d"))],
            files: vec![file(Some("x"), Some("y"))],
            memory: vec![memory(Some("0x80000000"), Some("0xDEADBEEF"), None)],
        };
        let rules = RuleSet::collect([&patch]);
        assert_eq!(rules.len(), 4);
    }

    #[test]
    fn test_order_follows_patches() {
        let first = Patch {
            id: "1".to_string(),
            folders: vec![folder(Some("one"), Some("1"))],
            ..Patch::default()
        };
        let second = Patch {
            id: "2".to_string(),
            folders: vec![folder(Some("two"), Some("2"))],
            ..Patch::default()
        };
        let rules = RuleSet::collect([&first, &second]);
        let discs: Vec<_> = rules.folders.iter().map(|r| r.disc.as_str()).collect();
        assert_eq!(discs, ["one", "two"]);
    }

    #[test]
    fn test_literal_value_wins_over_valuefile() {
        let entry = memory(Some("80000000"), Some("0102"), Some("ignored.bin"));
        let rule = MemoryRule::from_entry(&entry).unwrap();
        assert_eq!(rule.value, MemoryValue::Literal(vec![1, 2]));
    }

    #[test_case(Some("0102"), None, Some(MemoryValue::Literal(vec![1, 2])) ; "literal")]
    #[test_case(None, Some("v.bin"), Some(MemoryValue::File("v.bin".to_string())) ; "value file")]
    #[test_case(Some("zz"), Some("v.bin"), Some(MemoryValue::File("v.bin".to_string())) ; "bad literal falls back to value file")]
    #[test_case(Some("zz"), None, None ; "bad literal alone")]
    #[test_case(None, None, None ; "no value")]
    fn test_memory_value_source(
        value: Option<&str>,
        valuefile: Option<&str>,
        expected: Option<MemoryValue>,
    ) {
        let entry = memory(Some("80000000"), value, valuefile);
        let rule = MemoryRule::from_entry(&entry);
        assert_eq!(rule.map(|r| r.value), expected);
    }

    #[test]
    fn test_malformed_original_drops_rule() {
        let mut entry = memory(Some("80000000"), Some("0102"), None);
        entry.original = Some("zz".to_string());
        assert!(MemoryRule::from_entry(&entry).is_none());
    }

    #[test_case("0x80001234", Some(0x8000_1234) ; "prefixed")]
    #[test_case("80001234", Some(0x8000_1234) ; "bare")]
    #[test_case("0X10", Some(0x10) ; "upper prefix")]
    #[test_case("0x", None ; "prefix only")]
    #[test_case("1_000", None ; "not hex")]
    #[test_case("+10", None ; "sign")]
    #[test_case("100000000", None ; "too wide")]
    fn test_parse_address(text: &str, expected: Option<u32>) {
        assert_eq!(parse_address(text), expected);
    }

    #[test_case("38600001", Some(vec![0x38, 0x60, 0x00, 0x01]) ; "word")]
    #[test_case("0xff", Some(vec![0xff]) ; "prefixed")]
    #[test_case("abc", None ; "odd length")]
    #[test_case("", None ; "empty")]
    #[test_case("g0", None ; "not hex")]
    fn test_parse_hex_bytes(text: &str, expected: Option<Vec<u8>>) {
        assert_eq!(parse_hex_bytes(text), expected);
    }
}
