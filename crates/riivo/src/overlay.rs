//! Overlaying external files and folders onto the working tree
//!
//! Disc paths are relative to the data partition's `files/` directory of the
//! extracted tree. A disc path that already starts with `files/` is taken as
//! relative to the tree itself.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use filetime::FileTime;
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::assets::{AssetRoots, trim_relative};
use crate::error::Result;
use crate::rules::{FileRule, FolderRule, RuleSet};

/// Name of the data partition directory in an extracted tree
pub const FILES_DIR: &str = "files";

/// Outcome of applying overlays
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Folder rules applied
    pub folders_copied: usize,
    /// File rules applied
    pub files_copied: usize,
    /// Sources that were missing or of the wrong kind, or whose disc path
    /// points outside the data partition
    pub skipped: Vec<PathBuf>,
}

/// Apply all folder rules, then all file rules
pub fn apply_overlays(work_dir: &Path, assets: &AssetRoots, rules: &RuleSet) -> Result<OverlayReport> {
    let mut report = OverlayReport::default();

    for rule in &rules.folders {
        match apply_folder(work_dir, assets, rule)? {
            Some(_) => report.folders_copied += 1,
            None => report.skipped.push(assets.primary(&rule.external)),
        }
    }

    for rule in &rules.files {
        match apply_file(work_dir, assets, rule)? {
            Some(_) => report.files_copied += 1,
            None => report.skipped.push(assets.primary(&rule.external)),
        }
    }

    Ok(report)
}

/// Replace the disc folder with the external folder
///
/// Returns the replaced directory, or `None` when the source is missing.
pub fn apply_folder(work_dir: &Path, assets: &AssetRoots, rule: &FolderRule) -> Result<Option<PathBuf>> {
    let Some(src) = assets.resolve(&rule.external) else {
        warn!("\"{}\" does not exist. Skipping.", assets.primary(&rule.external).display());
        return Ok(None);
    };
    if !src.is_dir() {
        warn!("\"{}\" is not a folder. Skipping.", src.display());
        return Ok(None);
    }

    let Some(dest) = disc_target(work_dir, &rule.disc) else {
        warn!("Disc path \"{}\" is outside the disc. Skipping.", rule.disc);
        return Ok(None);
    };
    info!("Copying folder {} -> {}", src.display(), dest.display());

    if dest.is_dir() {
        fs::remove_dir_all(&dest)?;
    } else if dest.exists() {
        fs::remove_file(&dest)?;
    }
    copy_tree(&src, &dest)?;

    Ok(Some(dest))
}

/// Place the external file into the working tree
///
/// The first directory (top-down, by name) whose tree-relative path contains
/// the disc fragment receives the file under its own name. Without such a
/// directory the file is written to the disc path itself. Returns the written
/// file, or `None` when the source is missing.
pub fn apply_file(work_dir: &Path, assets: &AssetRoots, rule: &FileRule) -> Result<Option<PathBuf>> {
    let Some(src) = assets.resolve(&rule.external) else {
        warn!("\"{}\" does not exist. Skipping.", assets.primary(&rule.external).display());
        return Ok(None);
    };
    if !src.is_file() {
        warn!("\"{}\" is not a file. Skipping.", src.display());
        return Ok(None);
    }

    let Some(fallback) = disc_target(work_dir, &rule.disc) else {
        warn!("Disc path \"{}\" is outside the disc. Skipping.", rule.disc);
        return Ok(None);
    };

    let dest = match find_directory_containing(work_dir, &rule.disc)? {
        Some(dir) => match src.file_name() {
            Some(name) => dir.join(name),
            None => dir,
        },
        None => {
            if let Some(parent) = fallback.parent() {
                fs::create_dir_all(parent)?;
            }
            fallback
        }
    };

    info!("Copying file {} -> {}", src.display(), dest.display());
    copy_file(&src, &dest)?;

    Ok(Some(dest))
}

/// Path in the working tree addressed by a disc path
///
/// `None` when the path names no entry or could leave the data partition
/// (`..`, drive prefixes).
pub fn disc_target(work_dir: &Path, disc: &str) -> Option<PathBuf> {
    let relative = trim_relative(disc);
    let mut named = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if !named {
        return None;
    }

    let target = match relative.components().find(|c| *c != Component::CurDir) {
        Some(Component::Normal(first)) if first == FILES_DIR => work_dir.join(relative),
        _ => work_dir.join(FILES_DIR).join(relative),
    };
    Some(target)
}

/// First directory below `work_dir` whose relative path contains `fragment`
fn find_directory_containing(work_dir: &Path, fragment: &str) -> Result<Option<PathBuf>> {
    let fragment = fragment.trim_matches(['/', '\\']).replace('\\', "/");
    if fragment.is_empty() {
        return Ok(None);
    }

    for entry in WalkDir::new(work_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(work_dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if relative.contains(&fragment) {
            debug!("Disc fragment {fragment:?} matched {}", entry.path().display());
            return Ok(Some(entry.into_path()));
        }
    }

    Ok(None)
}

/// Copy a directory tree, preserving file metadata
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copy a file with its permissions and access/modification times
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest)?;
    let metadata = fs::metadata(src)?;
    filetime::set_file_times(
        dest,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;
    Ok(())
}
