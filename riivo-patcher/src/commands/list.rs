//! Manifest listing

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use riivo::{AssetRoots, Layout, Manifest, MemoryValue, Patch, RuleSet};

use crate::utils::format_hex;
use crate::utils::tree::{NodeType, TreeNode, TreeOptions, render_tree};

#[derive(Args)]
pub struct ListArgs {
    /// Path to the manifest
    pub manifest: PathBuf,

    /// Base directory used to resolve external sources
    #[arg(long, default_value = ".", env = "RIIVO_ROOT")]
    pub root: PathBuf,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

pub fn execute(args: ListArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest: {}", args.manifest.display()))?;
    let assets = AssetRoots::for_manifest(&Layout::new(&args.root), &manifest);

    let tree = build_tree(&manifest, &assets);
    print!("{}", render_tree(&tree, &TreeOptions { no_color: args.no_color }));
    Ok(())
}

fn build_tree(manifest: &Manifest, assets: &AssetRoots) -> TreeNode {
    let name = manifest
        .path
        .file_name()
        .map_or_else(|| manifest.path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let mut root = TreeNode::new(name, NodeType::Manifest);
    if let Some(asset_root) = &manifest.root {
        root = root.with_note(format!("root: {asset_root}"));
    }

    for patch in &manifest.patches {
        root = root.add_child(patch_node(patch, assets));
    }
    root
}

fn patch_node(patch: &Patch, assets: &AssetRoots) -> TreeNode {
    let rules = RuleSet::collect([patch]);
    let mut node = TreeNode::new(&patch.id, NodeType::Patch);

    let ignored = patch.folders.len() + patch.files.len() + patch.memory.len() - rules.len();
    if ignored > 0 {
        node = node.with_note(format!("{ignored} incomplete entries ignored"));
    }

    for rule in &rules.folders {
        node = node.add_child(source_node(&rule.disc, NodeType::Folder, &rule.external, assets));
    }
    for rule in &rules.files {
        node = node.add_child(source_node(&rule.disc, NodeType::File, &rule.external, assets));
    }
    for rule in &rules.memory {
        let mut child = match &rule.value {
            MemoryValue::Literal(bytes) => TreeNode::new(
                format!("{:#010x} = {}", rule.offset, format_hex(bytes)),
                NodeType::Memory,
            ),
            MemoryValue::File(file) => {
                source_node(&format!("{:#010x}", rule.offset), NodeType::Memory, file, assets)
            }
        };
        if let Some(original) = &rule.original {
            child = child.with_note(format!("original: {}", format_hex(original)));
        }
        node = node.add_child(child);
    }
    node
}

fn source_node(name: &str, node_type: NodeType, external: &str, assets: &AssetRoots) -> TreeNode {
    let (path, exists) = match assets.resolve(external) {
        Some(path) => (path, true),
        None => (assets.primary(external), false),
    };
    TreeNode::new(name, node_type).with_source(path.display().to_string(), exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tree_marks_sources() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        std::fs::create_dir_all(layout.manifest_dir.join("tex")).unwrap();

        let manifest = Manifest::parse(
            layout.manifest_dir.join("mod.xml"),
            r#"<wiidisc>
  <patch id="textures">
    <folder disc="/Stage" external="tex" />
    <file disc="/Layout/a.arc" external="a.arc" />
    <file disc="/Layout/b.arc" />
  </patch>
  <patch id="code">
    <memory offset="80004000" value="60000000" original="4E800020" />
  </patch>
</wiidisc>"#,
        )
        .unwrap();
        let assets = AssetRoots::for_manifest(&layout, &manifest);

        let tree = build_tree(&manifest, &assets);
        let output = render_tree(&tree, &TreeOptions { no_color: true });

        assert_eq!(tree.children.len(), 2);
        assert!(output.contains("[patch] textures"));
        assert!(output.contains("1 incomplete entries ignored"));
        assert!(output.contains("[folder] /Stage"));
        assert!(output.contains("a.arc (missing)"));
        assert!(output.contains("[memory] 0x80004000 = 60000000"));
        assert!(output.contains("original: 4E800020"));

        let folder = &tree.children[0].children[0];
        let source = folder.source.as_ref().unwrap();
        assert!(source.exists);
        assert!(source.path.ends_with("tex"));
    }
}
