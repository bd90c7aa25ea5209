//! # riivo - Riivolution patches for Wii disc images
//!
//! Applies the file, folder and memory patches of a Riivolution XML manifest
//! to a Wii disc image. Instead of patching at boot like the Riivolution
//! loader does, the image is extracted with Wiimms ISO Tools, the patches are
//! written into the extracted tree, and the tree is packed into a new image.
//!
//! ## Example
//!
//! ```no_run
//! use riivo::{Layout, Manifest, RuleSet};
//!
//! # fn main() -> Result<(), riivo::Error> {
//! let layout = Layout::new(".");
//! let manifest = Manifest::load(layout.manifest_dir.join("mymod.xml"))?;
//!
//! // Apply every patch of the manifest
//! let rules = RuleSet::collect(&manifest.patches).require_non_empty()?;
//! println!(
//!     "{} folders, {} files, {} memory patches",
//!     rules.folders.len(),
//!     rules.files.len(),
//!     rules.memory.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! The full interactive run lives in [`pipeline::run`]; it takes a
//! [`Prompter`] for every user decision and a [`DiscTool`] for the external
//! program, so both can be replaced.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod assets;
pub mod discover;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod memory;
pub mod overlay;
pub mod pipeline;
pub mod prompt;
pub mod rules;
pub mod tool;

pub use assets::AssetRoots;
pub use error::{Error, Result};
pub use layout::Layout;
pub use manifest::{FileEntry, FolderEntry, Manifest, MemoryEntry, Occurrence, Patch};
pub use memory::{DolHeader, MemoryReport};
pub use overlay::OverlayReport;
pub use pipeline::{RunSummary, run};
pub use prompt::{Answer, Prompter, ScriptedPrompter};
pub use rules::{FileRule, FolderRule, MemoryRule, MemoryValue, RuleSet};
pub use tool::{DiscTool, Wit};
