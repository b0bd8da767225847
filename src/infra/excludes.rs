//! Exclude pattern sources.
//!
//! Patterns come from one of three places, in this order of precedence:
//!   1) an explicit `.glob` file (`--pattern-exclude`), which replaces everything
//!   2) `~/.config/ingest/patterns/exclude/default.glob`, which replaces the built-ins
//!   3) the built-in list plus every other `*.glob` file in the user directory
//!
//! A `.glob` file holds one pattern per line; blank lines and `#` comments are
//! skipped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use tracing::debug;

use crate::cli::{AppContext, ExcludesArgs};
use crate::infra::config::load_config;

/// Built-in exclude list shipped with the binary.
pub const DEFAULT_GLOB: &str = include_str!("default.glob");

/// Directory holding user-provided `.glob` files.
pub const USER_PATTERNS_DIR: &str = "~/.config/ingest/patterns/exclude";

/// Split `.glob` file text into patterns.
pub fn parse_glob_lines(text: &str) -> Vec<String>
{
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn default_excludes() -> Vec<String>
{
    parse_glob_lines(DEFAULT_GLOB)
}

pub fn read_glob_file(path: &Path) -> Result<Vec<String>>
{
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pattern file {}", path.display()))?;
    Ok(parse_glob_lines(&text))
}

/// Read every `*.glob` file under `dir` in path order. A missing directory
/// yields no patterns.
pub fn read_glob_dir(dir: &Path) -> Result<Vec<String>>
{
    if !dir.is_dir()
    {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = WalkBuilder::new(dir)
        .standard_filters(false)
        .build()
        .filter_map(|res| res.ok())
        .filter(|e| {
            e.file_type()
                .is_some_and(|ft| ft.is_file())
        })
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext == "glob")
        })
        .collect();
    files.sort();

    let mut patterns = Vec::new();
    for file in files
    {
        patterns.extend(read_glob_file(&file)?);
    }
    Ok(patterns)
}

/// Expanded user pattern directory, if a home directory is known.
pub fn user_patterns_dir() -> Option<PathBuf>
{
    let expanded = shellexpand::tilde(USER_PATTERNS_DIR);
    if expanded.starts_with('~')
    {
        return None;
    }
    Some(PathBuf::from(expanded.as_ref()))
}

/// Resolve the effective exclude list.
pub fn resolve_excludes(
    pattern_file: Option<&Path>,
    no_default_excludes: bool,
    user_dir: Option<&Path>,
) -> Result<Vec<String>>
{
    if let Some(file) = pattern_file
    {
        debug!(file = %file.display(), "using explicit pattern file");
        return read_glob_file(file);
    }

    let mut patterns = if no_default_excludes { Vec::new() } else { default_excludes() };

    if let Some(dir) = user_dir
    {
        let user_default = dir.join("default.glob");
        if user_default.is_file()
        {
            debug!(file = %user_default.display(), "user default.glob replaces built-ins");
            return read_glob_file(&user_default);
        }

        patterns.extend(read_glob_dir(dir)?);
    }

    Ok(patterns)
}

/// Print the exclude patterns a `pack` run would apply, one per line.
///
/// `--builtin` prints the shipped list verbatim, comments included, so it can
/// seed a user `default.glob`.
pub fn run(
    args: ExcludesArgs,
    ctx: &AppContext,
) -> Result<()>
{
    if args.builtin
    {
        print!("{DEFAULT_GLOB}");
        return Ok(());
    }

    let config = load_config()?;
    let mut patterns = resolve_excludes(
        args.pattern_exclude
            .as_deref(),
        args.no_default_excludes,
        user_patterns_dir().as_deref(),
    )?;
    patterns.extend(config.excludes);

    if !ctx.quiet
    {
        for pattern in &patterns
        {
            println!("{pattern}");
        }
    }

    Ok(())
}
