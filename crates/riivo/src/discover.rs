//! Finding manifests and disc images

use std::path::{Path, PathBuf};

use glob::{MatchOptions, glob_with};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::prompt::Prompter;

/// Extensions recognised as disc images
pub const DISC_IMAGE_EXTENSIONS: &[&str] = &["wbfs", "iso"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// List files in `dir` with one of `extensions`, sorted by file name
fn list_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::environment(format!(
            "\"{}\" does not exist",
            dir.display()
        )));
    }

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let mut found = Vec::new();
    for ext in extensions {
        let pattern = format!("{escaped}/*.{ext}");
        let entries = glob_with(&pattern, MATCH_OPTIONS)
            .map_err(|e| Error::environment(format!("invalid search pattern {pattern}: {e}")))?;
        found.extend(entries.filter_map(|entry| entry.ok()).filter(|p| p.is_file()));
    }
    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    found.dedup();
    Ok(found)
}

/// Manifests in the manifest directory
pub fn find_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    let manifests = list_with_extensions(dir, &["xml"])?;
    if manifests.is_empty() {
        return Err(Error::environment(format!(
            "No XML files found in \"{}\"",
            dir.display()
        )));
    }
    debug!("Found {} manifests in {}", manifests.len(), dir.display());
    Ok(manifests)
}

/// Disc images in the input directory
pub fn find_disc_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let images = list_with_extensions(dir, DISC_IMAGE_EXTENSIONS)?;
    debug!("Found {} disc images in {}", images.len(), dir.display());
    Ok(images)
}

/// Let the user pick a manifest
pub fn select_manifest<P: Prompter + ?Sized>(dir: &Path, prompter: &mut P) -> Result<PathBuf> {
    let mut manifests = find_manifests(dir)?;
    let names = display_names(&manifests);
    match prompter.select("Select a Riivolution XML file:", &names)? {
        Some(index) if index < manifests.len() => Ok(manifests.swap_remove(index)),
        _ => Err(Error::user_abort("No manifest selected")),
    }
}

/// Pick the disc image to patch
///
/// No image is fatal, a single image is used without asking, several images
/// are offered to the user.
pub fn select_disc_image<P: Prompter + ?Sized>(dir: &Path, prompter: &mut P) -> Result<PathBuf> {
    let mut images = find_disc_images(dir)?;
    match images.len() {
        0 => Err(Error::environment(format!(
            "No .wbfs or .iso files found in \"{}\"",
            dir.display()
        ))),
        1 => {
            let image = images.swap_remove(0);
            info!("Selected disc image: {}", image.display());
            Ok(image)
        }
        _ => {
            let names = display_names(&images);
            match prompter.select("Multiple disc images found. Select one to use:", &names)? {
                Some(index) if index < images.len() => Ok(images.swap_remove(index)),
                _ => Err(Error::user_abort("No selection made")),
            }
        }
    }
}

fn display_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.file_name()
                .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned())
        })
        .collect()
}
