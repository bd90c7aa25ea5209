//! Resolving `external` paths on the SD card

use std::path::{Path, PathBuf};

use crate::layout::Layout;
use crate::manifest::Manifest;

/// Candidate directories that `external` paths are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoots {
    roots: Vec<PathBuf>,
}

impl AssetRoots {
    /// Use exactly these roots, in priority order
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Roots for a manifest loaded from `layout`
    ///
    /// In priority order: the manifest's `root` attribute below the SD root,
    /// a folder named after the manifest file below the SD root, the
    /// manifest directory, and the SD root itself.
    pub fn for_manifest(layout: &Layout, manifest: &Manifest) -> Self {
        let mut roots = Vec::new();
        if let Some(root) = &manifest.root {
            roots.push(layout.sd_root.join(trim_relative(root)));
        }
        if let Some(stem) = manifest.stem() {
            roots.push(layout.sd_root.join(stem));
        }
        roots.push(layout.manifest_dir.clone());
        roots.push(layout.sd_root.clone());
        roots.dedup();
        Self { roots }
    }

    /// First existing path for `external`
    pub fn resolve(&self, external: &str) -> Option<PathBuf> {
        let relative = trim_relative(external);
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.exists())
    }

    /// Path reported when `external` cannot be found
    pub fn primary(&self, external: &str) -> PathBuf {
        let relative = trim_relative(external);
        self.roots
            .first()
            .map_or_else(|| PathBuf::from(relative), |root| root.join(relative))
    }

    /// The candidate roots
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Strip leading separators so the value joins below a root
pub(crate) fn trim_relative(path: &str) -> &Path {
    Path::new(path.trim_start_matches(['/', '\\']))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn manifest(dir: &Path, root: Option<&str>) -> Manifest {
        Manifest {
            path: dir.join("mymod.xml"),
            root: root.map(str::to_string),
            patches: Vec::new(),
        }
    }

    #[test]
    fn test_root_order() {
        let layout = Layout::new("/base");
        let roots = AssetRoots::for_manifest(&layout, &manifest(&layout.manifest_dir, Some("/custom")));

        assert_eq!(
            roots.roots(),
            [
                PathBuf::from("/base/sd_files/custom"),
                PathBuf::from("/base/sd_files/mymod"),
                PathBuf::from("/base/sd_files/riivolution"),
                PathBuf::from("/base/sd_files"),
            ]
        );
    }

    #[test]
    fn test_resolve_prefers_earlier_roots() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        fs::create_dir_all(layout.sd_root.join("mymod/DATA")).unwrap();
        fs::create_dir_all(layout.manifest_dir.join("DATA")).unwrap();
        fs::create_dir_all(layout.manifest_dir.join("Only")).unwrap();

        let roots = AssetRoots::for_manifest(&layout, &manifest(&layout.manifest_dir, None));

        assert_eq!(
            roots.resolve("/DATA"),
            Some(layout.sd_root.join("mymod/DATA"))
        );
        assert_eq!(roots.resolve("Only"), Some(layout.manifest_dir.join("Only")));
        assert_eq!(roots.resolve("Missing"), None);
        assert_eq!(roots.primary("Missing"), layout.sd_root.join("mymod/Missing"));
    }

    #[test]
    fn test_trim_relative() {
        assert_eq!(trim_relative("/a/b"), Path::new("a/b"));
        assert_eq!(trim_relative("a"), Path::new("a"));
        assert_eq!(trim_relative("//"), Path::new(""));
    }
}
