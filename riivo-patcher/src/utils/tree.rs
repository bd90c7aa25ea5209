//! Tree rendering for manifest listings

use console::Style;

/// Represents a node in a manifest tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    pub notes: Vec<String>,
    pub source: Option<SourceRef>,
}

/// Types of nodes in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Manifest,
    Patch,
    Folder,
    File,
    Memory,
}

/// External asset a rule reads from
#[derive(Debug, Clone)]
pub struct SourceRef {
    pub path: String,
    pub exists: bool,
}

/// Options for tree rendering
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub no_color: bool,
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            children: Vec::new(),
            notes: Vec::new(),
            source: None,
        }
    }

    /// Add a child node
    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add a dimmed note line
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Attach the source this rule reads from
    pub fn with_source(mut self, path: impl Into<String>, exists: bool) -> Self {
        self.source = Some(SourceRef {
            path: path.into(),
            exists,
        });
        self
    }
}

impl SourceRef {
    /// Green when the source resolves, red when it is missing
    pub fn style(&self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else if self.exists {
            Style::new().green()
        } else {
            Style::new().red()
        }
    }
}

impl NodeType {
    /// Short tag printed before the node name
    pub fn tag(self) -> &'static str {
        match self {
            NodeType::Manifest => "manifest",
            NodeType::Patch => "patch",
            NodeType::Folder => "folder",
            NodeType::File => "file",
            NodeType::Memory => "memory",
        }
    }

    /// Get color style for node type
    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                NodeType::Manifest => Style::new().bold().cyan(),
                NodeType::Patch => Style::new().bold().yellow(),
                NodeType::Folder => Style::new().cyan(),
                NodeType::File => Style::new().green(),
                NodeType::Memory => Style::new().magenta(),
            }
        }
    }
}

/// Render a tree structure to string
pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };
    let style = node.node_type.style(options.no_color);

    output.push_str(&format!(
        "{prefix}{connector}{} {}\n",
        style.apply_to(format!("[{}]", node.node_type.tag())),
        node.name
    ));

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{prefix}{}", if is_last { "    " } else { "│   " })
    };

    if let Some(source) = &node.source {
        let marker = if source.exists { "" } else { " (missing)" };
        output.push_str(&format!(
            "{child_prefix}    └─→ {}{marker}\n",
            source.style(options.no_color).apply_to(&source.path)
        ));
    }

    let note_style = if options.no_color {
        Style::new()
    } else {
        Style::new().dim()
    };
    for note in &node.notes {
        output.push_str(&format!(
            "{child_prefix}    {}\n",
            note_style.apply_to(note)
        ));
    }

    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == node.children.len() - 1;
        render_node(child, output, &child_prefix, is_last_child, depth + 1, options);
    }
}
