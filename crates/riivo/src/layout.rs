//! Filesystem layout of a patching run
//!
//! All stages receive their paths from a [`Layout`] instead of reading the
//! process working directory, so a run can be pointed at any base directory.

use std::path::{Path, PathBuf};

/// Directory holding the SD card contents, relative to the base directory
pub const SD_DIR: &str = "sd_files";
/// Directory holding the manifests, relative to the SD directory
pub const MANIFEST_DIR: &str = "riivolution";
/// Directory searched for the source disc image
pub const DISC_DIR: &str = "disc_image";
/// Working tree the disc image is extracted into
pub const WORK_DIR: &str = "tmp";
/// Directory the repacked image is written to
pub const OUTPUT_DIR: &str = "patched_disc_image";
/// Default file name of the repacked image
pub const DEFAULT_OUTPUT_NAME: &str = "game.wbfs";

/// Paths used by one patching run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// SD card root, the base for asset resolution
    pub sd_root: PathBuf,
    /// Directory scanned for `*.xml` manifests
    pub manifest_dir: PathBuf,
    /// Directory scanned for `.wbfs`/`.iso` images
    pub disc_dir: PathBuf,
    /// Extraction target, deleted and recreated every run
    pub work_dir: PathBuf,
    /// Directory receiving the output image
    pub output_dir: PathBuf,
    /// File name of the output image
    pub output_name: String,
}

impl Layout {
    /// Standard layout below `base`
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        let sd_root = base.join(SD_DIR);
        Self {
            manifest_dir: sd_root.join(MANIFEST_DIR),
            sd_root,
            disc_dir: base.join(DISC_DIR),
            work_dir: base.join(WORK_DIR),
            output_dir: base.join(OUTPUT_DIR),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }

    /// Replace the output image file name
    pub fn with_output_name<S: Into<String>>(mut self, name: S) -> Self {
        self.output_name = name.into();
        self
    }

    /// Full path of the output image
    pub fn output_image(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_below_base() {
        let layout = Layout::new("/work");
        assert_eq!(layout.sd_root, PathBuf::from("/work/sd_files"));
        assert_eq!(
            layout.manifest_dir,
            PathBuf::from("/work/sd_files/riivolution")
        );
        assert_eq!(layout.disc_dir, PathBuf::from("/work/disc_image"));
        assert_eq!(layout.work_dir, PathBuf::from("/work/tmp"));
        assert_eq!(
            layout.output_image(),
            PathBuf::from("/work/patched_disc_image/game.wbfs")
        );
    }

    #[test]
    fn test_output_name_override() {
        let layout = Layout::new("base").with_output_name("mod.iso");
        assert_eq!(
            layout.output_image(),
            Path::new("base").join("patched_disc_image").join("mod.iso")
        );
    }
}
