//! The patching run, start to finish

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::assets::AssetRoots;
use crate::discover::{select_disc_image, select_manifest};
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::manifest::{Manifest, Patch};
use crate::memory::{MemoryReport, apply_memory_rules};
use crate::overlay::{OverlayReport, apply_overlays};
use crate::prompt::Prompter;
use crate::rules::RuleSet;
use crate::tool::DiscTool;

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Manifest that was applied
    pub manifest: PathBuf,
    /// Identifiers of the selected patches
    pub patches: Vec<String>,
    /// Source disc image
    pub disc_image: PathBuf,
    /// Repacked disc image
    pub output_image: PathBuf,
    /// Overlay results
    pub overlay: OverlayReport,
    /// Memory patch results
    pub memory: MemoryReport,
    /// Whether the working tree was deleted at the end
    pub work_dir_removed: bool,
}

/// Ask for every patch of `manifest` whether to apply it
///
/// The result keeps manifest order.
pub fn select_patches<'m, P: Prompter + ?Sized>(
    manifest: &'m Manifest,
    prompter: &mut P,
) -> Result<Vec<&'m Patch>> {
    let mut selected = Vec::new();
    for patch in &manifest.patches {
        if prompter.confirm(&format!("Apply patch \"{}\"?", patch.id))? {
            selected.push(patch);
        }
    }
    Ok(selected)
}

/// Delete any previous working tree
pub fn reset_work_dir(work_dir: &Path) -> Result<()> {
    if work_dir.exists() {
        info!("Removing previous working tree {}", work_dir.display());
        fs::remove_dir_all(work_dir)?;
    }
    Ok(())
}

/// Run the whole patching pipeline
///
/// Any error ends the run where it happened. In particular a failed repack
/// skips verification and leaves the working tree on disk.
pub fn run<P, T>(layout: &Layout, prompter: &mut P, tool: &T) -> Result<RunSummary>
where
    P: Prompter + ?Sized,
    T: DiscTool + ?Sized,
{
    let manifest_path = select_manifest(&layout.manifest_dir, prompter)?;
    let manifest = Manifest::load(&manifest_path)?;

    let selected = select_patches(&manifest, prompter)?;
    let patch_ids: Vec<String> = selected.iter().map(|p| p.id.clone()).collect();
    info!("Selected patches: {}", patch_ids.join(", "));

    let rules = RuleSet::collect(selected.iter().copied()).require_non_empty()?;
    if !prompter.confirm("Continue with patch?")? {
        return Err(Error::user_abort("Ending script"));
    }

    let disc_image = select_disc_image(&layout.disc_dir, prompter)?;

    reset_work_dir(&layout.work_dir)?;
    info!("Extracting {} (this may take a while)", disc_image.display());
    tool.extract(&disc_image, &layout.work_dir)?;

    info!("Patching files...");
    let assets = AssetRoots::for_manifest(layout, &manifest);
    let overlay = apply_overlays(&layout.work_dir, &assets, &rules)?;
    let memory = apply_memory_rules(&layout.work_dir, &assets, &rules.memory)?;

    fs::create_dir_all(&layout.output_dir)?;
    let output_image = layout.output_image();
    info!("Repacking into {} (this may take a while)", output_image.display());
    tool.copy(&layout.work_dir, &output_image)?;
    info!("Verifying {} (this may take a while)", output_image.display());
    tool.verify(&output_image)?;

    let work_dir_removed = prompter.confirm("Remove tmp folder?")?;
    if work_dir_removed {
        info!("Removing tmp files...");
        fs::remove_dir_all(&layout.work_dir)?;
    } else {
        info!("Keeping tmp files.");
    }

    Ok(RunSummary {
        manifest: manifest_path,
        patches: patch_ids,
        disc_image,
        output_image,
        overlay,
        memory,
        work_dir_removed,
    })
}
