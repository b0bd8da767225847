//! The `pack` pipeline: walk → process → git → render → output.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cli::{AppContext, PackArgs};
use crate::compress::Compressor;
use crate::core::files::{ExcludedInfo, FileEntry, FormatOptions, process_file};
use crate::core::git;
use crate::core::output::{self, OutputOptions};
use crate::core::template::{PromptContext, PromptTemplate};
use crate::core::tokens::{Encoding, TokenCounter};
use crate::core::tree::{render_single_file, render_tree};
use crate::infra::config::{Config, load_config};
use crate::infra::excludes::{resolve_excludes, user_patterns_dir};
use crate::infra::utils::{Status, print_status};
use crate::infra::walk::FileWalker;

/// Command-line flags merged over the loaded config.
#[derive(Debug, Clone)]
pub struct PackSettings {
    pub format: FormatOptions,
    pub compress: bool,
    pub follow_symlinks: bool,
    pub encoding: Encoding,
    pub template: Option<PathBuf>,
    pub output: OutputOptions,
}

impl PackSettings {
    pub fn resolve(args: &PackArgs, config: &Config, verbose: bool) -> Self {
        let encoding = args.encoding.as_deref().unwrap_or(&config.encoding);

        Self {
            format: FormatOptions {
                line_numbers: args.line_number || config.line_numbers,
                no_codeblock: args.no_codeblock || config.no_codeblock,
                relative_paths: args.relative_paths || config.relative_paths,
            },
            compress: args.compress || config.compress,
            follow_symlinks: args.follow_symlinks || config.follow_symlinks,
            encoding: Encoding::from_name(encoding),
            template: args.template.clone().or_else(|| config.template.clone()),
            output: OutputOptions {
                show_tokens: !args.no_tokens,
                no_clipboard: args.no_clipboard || config.no_clipboard,
                output: args.output.clone(),
                json: args.json,
                report: args.report || verbose,
            },
        }
    }

    fn needs_tokens(&self) -> bool {
        self.output.show_tokens || self.output.report || self.output.json
    }
}

/// What one root contributes to the prompt.
#[derive(Debug)]
pub struct PackedRoot {
    pub tree: String,
    pub files: Vec<FileEntry>,
}

/// Walk `root`, record exclusions and render every included file.
///
/// Files are processed in parallel; the result keeps the walker's path order.
pub fn pack_root(
    root: &Path,
    walker: &FileWalker,
    format: &FormatOptions,
    exclude_from_tree: bool,
    compressor: Option<&Compressor>,
    excluded: &mut ExcludedInfo,
) -> Result<PackedRoot> {
    let entries = walker.walk(root);

    for entry in entries.iter().filter(|e| e.excluded) {
        if entry.is_dir {
            excluded.record_dir(&entry.path);
        } else {
            excluded.record_file(&entry.path);
        }
    }

    let (tree, base) = if root.is_dir() {
        (render_tree(root, &entries, exclude_from_tree)?, root)
    } else {
        (render_single_file(root), root.parent().unwrap_or(root))
    };

    let files: Vec<FileEntry> = entries
        .par_iter()
        .filter(|e| !e.is_dir && !e.excluded)
        .filter_map(|e| match process_file(&e.path, &e.rel, base, format, compressor) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(path = %e.path.display(), error = %format!("{err:#}"), "skipping unreadable file");
                None
            }
        })
        .collect();

    debug!(root = %root.display(), files = files.len(), "packed root");

    Ok(PackedRoot { tree, files })
}

fn spinner(ctx: &AppContext) -> Result<ProgressBar> {
    if ctx.quiet {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Git sections requested by the flags, run against `repo`.
fn git_sections(args: &PackArgs, repo: &Path, progress: &ProgressBar) -> Result<(String, String, String)> {
    let mut diff = String::new();
    if args.git_diff {
        progress.set_message("Generating git diff...");
        diff = git::diff(repo)?;
    }

    let mut diff_branch = String::new();
    if let Some(spec) = &args.git_diff_branch {
        progress.set_message("Generating git diff between two branches...");
        let (a, b) = git::parse_branch_pair(spec)?;
        diff_branch = git::diff_between(repo, &a, &b)?;
    }

    let mut log_branch = String::new();
    if let Some(spec) = &args.git_log_branch {
        progress.set_message("Generating git log between two branches...");
        let (a, b) = git::parse_branch_pair(spec)?;
        log_branch = git::log_between(repo, &a, &b)?;
    }

    Ok((diff, diff_branch, log_branch))
}

fn print_excludes(patterns: &[String], ctx: &AppContext) {
    print_status(Status::Info, "Active exclude patterns:", ctx.no_color);
    for pattern in patterns {
        if ctx.no_color {
            eprintln!("  {pattern}");
        } else {
            eprintln!("  {}", pattern.dimmed());
        }
    }
}

fn print_excluded_summary(excluded: &ExcludedInfo, ctx: &AppContext) {
    if excluded.is_empty() {
        return;
    }

    print_status(
        Status::Info,
        &format!(
            "Excluded {} files in {} directories",
            excluded.total_files,
            excluded.directories.len()
        ),
        ctx.no_color,
    );
    for (ext, count) in &excluded.extensions {
        eprintln!("  {ext}: {count}");
    }
    for file in &excluded.files {
        eprintln!("  {file}");
    }
}

pub fn run(args: PackArgs, ctx: &AppContext) -> Result<()> {
    let config = load_config()?;
    let settings = PackSettings::resolve(&args, &config, ctx.verbose);

    let mut excludes = resolve_excludes(
        args.pattern_exclude.as_deref(),
        args.no_default_excludes,
        user_patterns_dir().as_deref(),
    )
    .context("Failed to read exclude patterns")?;
    excludes.extend(config.excludes.iter().cloned());
    excludes.extend(args.exclude.iter().cloned());

    if ctx.verbose {
        print_excludes(&excludes, ctx);
    }

    let walker = FileWalker::new(&excludes)
        .context("Invalid exclude pattern")?
        .with_includes(&args.include)
        .context("Invalid include pattern")?
        .with_include_priority(args.include_priority)
        .with_follow_symlinks(settings.follow_symlinks)
        .with_git_ignore(!args.no_ignore);

    let template = PromptTemplate::load(settings.template.as_deref())?;
    debug!(template = template.name(), "loaded prompt template");

    // Fail on bad branch specs before doing any work
    for spec in [&args.git_diff_branch, &args.git_log_branch].into_iter().flatten() {
        git::parse_branch_pair(spec)?;
    }

    let progress = spinner(ctx)?;
    progress.set_message("Traversing directory and building tree...");

    let compressor = settings.compress.then(Compressor::new);

    let mut files = Vec::new();
    let mut trees = Vec::new();
    let mut excluded = ExcludedInfo::default();
    let mut first_root: Option<PathBuf> = None;

    for path in &args.paths {
        let root = dunce::canonicalize(path)
            .with_context(|| format!("Failed to resolve {}", path.display()))?;

        let packed = pack_root(
            &root,
            &walker,
            &settings.format,
            args.exclude_from_tree,
            compressor.as_ref(),
            &mut excluded,
        )
        .with_context(|| format!("Failed to process {}", path.display()))?;

        trees.push(format!("{}:\n{}", root.display(), packed.tree));
        files.extend(packed.files);
        first_root.get_or_insert(root);
    }

    let absolute_code_path = first_root.unwrap_or_default();
    let repo = if absolute_code_path.is_dir() {
        absolute_code_path.as_path()
    } else {
        absolute_code_path.parent().unwrap_or(Path::new("."))
    };

    let (git_diff, git_diff_branch, git_log_branch) = git_sections(&args, repo, &progress)?;

    progress.finish_and_clear();

    info!(files = files.len(), excluded = excluded.total_files, "rendering prompt");

    let rendered = template.render(&PromptContext {
        absolute_code_path: absolute_code_path.display().to_string(),
        source_trees: trees.join("\n\n"),
        files: &files,
        git_diff,
        git_diff_branch,
        git_log_branch,
    })?;

    if ctx.verbose {
        print_excluded_summary(&excluded, ctx);
    }

    let counter = if settings.needs_tokens() {
        Some(TokenCounter::new(settings.encoding, !args.no_correction)?)
    } else {
        None
    };

    output::emit(&rendered, &files, &excluded, counter.as_ref(), &settings.output, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn pack_args(extra: &[&str]) -> PackArgs {
        let mut argv = vec!["pack"];
        argv.extend_from_slice(extra);
        PackArgs::parse_from(argv)
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            encoding: "cl100k".to_string(),
            line_numbers: true,
            ..Config::default()
        };

        let settings = PackSettings::resolve(&pack_args(&[]), &config, false);
        assert_eq!(settings.encoding, Encoding::Cl100kBase);
        assert!(settings.format.line_numbers);
        assert!(!settings.output.report);

        let settings = PackSettings::resolve(&pack_args(&["-c", "gpt2", "--no-tokens"]), &config, true);
        assert_eq!(settings.encoding, Encoding::R50kBase);
        assert!(!settings.output.show_tokens);
        assert!(settings.output.report);
    }

    #[test]
    fn test_pack_root_orders_files_and_records_exclusions() -> Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path().join("proj");
        fs::create_dir_all(root.join("src"))?;
        fs::create_dir_all(root.join("node_modules/x"))?;
        fs::write(root.join("src/b.rs"), "fn b() {}")?;
        fs::write(root.join("src/a.rs"), "fn a() {}")?;
        fs::write(root.join("debug.log"), "noise")?;
        fs::write(root.join("node_modules/x/i.js"), "x")?;

        let walker = FileWalker::new(&["**/node_modules/**".to_string(), "**/*.log".to_string()])?;
        let mut excluded = ExcludedInfo::default();
        let format = FormatOptions {
            relative_paths: true,
            ..FormatOptions::default()
        };

        let packed = pack_root(&root, &walker, &format, false, None, &mut excluded)?;

        let paths: Vec<PathBuf> = packed.files.iter().map(|f| PathBuf::from(&f.path)).collect();
        assert_eq!(paths, vec![PathBuf::from("proj/src/a.rs"), PathBuf::from("proj/src/b.rs")]);
        assert_eq!(excluded.total_files, 1);
        assert_eq!(excluded.directories.len(), 2);
        assert!(packed.tree.contains("debug.log ❌"));
        assert!(packed.tree.contains("node_modules/ ❌"));
        Ok(())
    }

    #[test]
    fn test_pack_single_file_root() -> Result<()> {
        let tmp = TempDir::new()?;
        let file = tmp.path().join("main.py");
        fs::write(&file, "import os\n\ndef f():\n    return 1\n")?;

        let walker = FileWalker::new(&[])?;
        let compressor = Compressor::new();
        let mut excluded = ExcludedInfo::default();

        let packed = pack_root(
            &file,
            &walker,
            &FormatOptions::default(),
            false,
            Some(&compressor),
            &mut excluded,
        )?;

        assert_eq!(packed.tree, format!("File: {}", file.display()));
        assert_eq!(packed.files.len(), 1);
        assert!(packed.files[0].code.contains("def f(): { ... } # Body removed"));
        Ok(())
    }
}
