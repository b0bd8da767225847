//! Source tree view with excluded entries marked ` ❌`.
//!
//! Directories are listed before files, each group by name, and carry a
//! trailing `/`. Drawn with ptree using the classic `├── ` / `└── ` layout.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use ptree::print_config::StyleWhen;
use ptree::{PrintConfig, TreeBuilder};
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{AppContext, TreeArgs};
use crate::infra::config::load_config;
use crate::infra::excludes::{resolve_excludes, user_patterns_dir};
use crate::infra::walk::{FileWalker, WalkEntry};

/// First line of a tree that shows exclusions.
pub const EXCLUSION_HEADER: &str =
    "(Files/directories marked with ❌ are excluded or not included here)";

pub fn run(args: TreeArgs, ctx: &AppContext) -> Result<()> {
    let config = load_config()?;

    let mut excludes = resolve_excludes(
        args.pattern_exclude.as_deref(),
        args.no_default_excludes,
        user_patterns_dir().as_deref(),
    )?;
    excludes.extend(config.excludes);
    excludes.extend(args.exclude);

    let walker = FileWalker::new(&excludes)?
        .with_includes(&args.include)?
        .with_follow_symlinks(args.follow_symlinks || config.follow_symlinks)
        .with_git_ignore(!args.no_ignore);

    if ctx.dry_run {
        if !ctx.quiet {
            println!("{}", "DRY RUN: Would scan:".yellow());
            println!("  Root: {}", args.path.display());
            println!("  Exclude patterns: {}", excludes.len());
        }
        return Ok(());
    }

    let root = dunce::canonicalize(&args.path)
        .with_context(|| format!("Failed to resolve {}", args.path.display()))?;

    let rendered = if root.is_dir() {
        render_tree(&root, &walker.walk(&root), args.exclude_from_tree)?
    } else {
        render_single_file(&root)
    };

    if !ctx.quiet {
        println!("{rendered}");
    }

    Ok(())
}

#[derive(Debug, Default)]
struct TreeNode {
    is_dir: bool,
    excluded: bool,
    children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    fn dir() -> Self {
        Self {
            is_dir: true,
            ..Self::default()
        }
    }

    /// Insert `entry` below this node, creating intermediate directories.
    fn insert(&mut self, entry: &WalkEntry) {
        let parts: Vec<String> = entry
            .rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        let Some((leaf, dirs)) = parts.split_last() else {
            return;
        };

        let mut current = self;
        for part in dirs {
            current = current
                .children
                .entry(part.clone())
                .or_insert_with(TreeNode::dir);
        }

        let node = current.children.entry(leaf.clone()).or_default();
        node.is_dir = entry.is_dir;
        node.excluded = entry.excluded;
    }

    /// Children with directories first, then by name.
    fn ordered(&self) -> impl Iterator<Item = (&String, &TreeNode)> {
        let dirs = self.children.iter().filter(|(_, n)| n.is_dir);
        let files = self.children.iter().filter(|(_, n)| !n.is_dir);
        dirs.chain(files)
    }
}

fn label(name: &str, node: &TreeNode) -> String {
    let mut out = name.to_string();
    if node.is_dir {
        out.push('/');
    }
    if node.excluded {
        out.push_str(" ❌");
    }
    out
}

fn add_children_to_builder(builder: &mut TreeBuilder, node: &TreeNode) {
    for (name, child) in node.ordered() {
        if child.children.is_empty() {
            builder.add_empty_child(label(name, child));
        } else {
            builder.begin_child(label(name, child));
            add_children_to_builder(builder, child);
            builder.end_child();
        }
    }
}

/// Render the walked entries of the directory `root`.
///
/// With `exclude_from_tree` excluded entries (and the header) are left out.
pub fn render_tree(root: &Path, entries: &[WalkEntry], exclude_from_tree: bool) -> Result<String> {
    let mut tree = TreeNode::dir();
    let mut has_exclusions = false;

    for entry in entries {
        if entry.excluded {
            if exclude_from_tree {
                continue;
            }
            has_exclusions = true;
        }
        tree.insert(entry);
    }

    let root_name = root
        .file_name()
        .unwrap_or(root.as_os_str())
        .to_string_lossy()
        .to_string();

    let mut builder = TreeBuilder::new(format!("{root_name}/"));
    add_children_to_builder(&mut builder, &tree);
    let item = builder.build();

    let config = PrintConfig {
        indent: 4,
        padding: 1,
        styled: StyleWhen::Never,
        ..PrintConfig::default()
    };

    let mut buf = Vec::new();
    ptree::write_tree_with(&item, &mut buf, &config).context("Failed to render tree")?;
    let drawn = String::from_utf8(buf).context("Tree output is not UTF-8")?;

    let mut out = String::new();
    if has_exclusions {
        out.push_str(EXCLUSION_HEADER);
        out.push_str("\n\n");
    }
    out.push_str(drawn.trim_end_matches('\n'));

    Ok(out)
}

pub fn render_single_file(path: &Path) -> String {
    format!("File: {}", path.display())
}
