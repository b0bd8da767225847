//! Per-file processing and exclusion bookkeeping.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, warn};

use crate::compress::Compressor;
use crate::infra::io::read_file_smart;
use crate::infra::utils::{add_line_numbers, wrap_code_block};

/// One file as it appears in the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry
{
    pub path: String,

    /// Extension with the leading dot, or empty
    pub extension: String,

    pub code: String,
}

/// How file contents are rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions
{
    pub line_numbers: bool,
    pub no_codeblock: bool,
    pub relative_paths: bool,
}

/// Extension of `path` with its dot (`.rs`), or empty.
pub fn extension_of(path: &Path) -> String
{
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// Read and render one file. Binary files yield `None`.
///
/// `base` is the directory the walk started from; with `relative_paths` the
/// reported path is `<base name>/<rel>`.
pub fn process_file(
    path: &Path,
    rel: &Path,
    base: &Path,
    opts: &FormatOptions,
    compressor: Option<&Compressor>,
) -> Result<Option<FileEntry>>
{
    let content = read_file_smart(path)?;
    if content.is_binary()
    {
        debug!(path = %path.display(), "skipping binary file");
        return Ok(None);
    }

    let text = content.text();
    let extension = extension_of(path);

    let compressed = compressor.and_then(|c| match c.compress_path(path, &text)
    {
        Ok(out) => Some(out),
        Err(crate::compress::CompressError::UnsupportedExtension(_)) =>
        {
            debug!(path = %path.display(), "no compressor for file, using original content");
            None
        }
        Err(err) =>
        {
            warn!(path = %path.display(), error = %err, "compression failed, using original content");
            None
        }
    });

    let code = match compressed
    {
        Some(out) => out,
        None =>
        {
            let mut code = text.into_owned();
            if opts.line_numbers
            {
                code = add_line_numbers(&code);
            }
            if !opts.no_codeblock
            {
                code = wrap_code_block(&code, &extension);
            }
            code
        }
    };

    Ok(Some(FileEntry { path: display_path(path, rel, base, opts.relative_paths), extension, code }))
}

fn display_path(
    path: &Path,
    rel: &Path,
    base: &Path,
    relative: bool,
) -> String
{
    if !relative
    {
        return path
            .display()
            .to_string();
    }

    let shown: PathBuf = match base.file_name()
    {
        Some(name) => Path::new(name).join(rel),
        None => rel.to_path_buf(),
    };
    shown
        .display()
        .to_string()
}

/// Summary of everything left out of the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExcludedInfo
{
    /// Directory -> excluded files inside it (pruned directories map to 0)
    pub directories: BTreeMap<String, usize>,

    /// Extension -> excluded files with it
    pub extensions: BTreeMap<String, usize>,

    pub total_files: usize,

    /// Individual files, only while `total_files` stays within [`Self::MAX_LISTED`]
    pub files: Vec<String>,
}

impl ExcludedInfo
{
    pub const MAX_LISTED: usize = 20;

    pub fn record_file(
        &mut self,
        path: &Path,
    )
    {
        self.total_files += 1;

        let dir = path
            .parent()
            .map(|p| {
                p.display()
                    .to_string()
            })
            .unwrap_or_default();
        *self
            .directories
            .entry(dir)
            .or_insert(0) += 1;

        let ext = extension_of(path);
        if !ext.is_empty()
        {
            *self
                .extensions
                .entry(ext)
                .or_insert(0) += 1;
        }

        if self.total_files <= Self::MAX_LISTED
        {
            self.files
                .push(
                    path.display()
                        .to_string(),
                );
        }
    }

    pub fn record_dir(
        &mut self,
        path: &Path,
    )
    {
        self.directories
            .insert(
                path.display()
                    .to_string(),
                0,
            );
    }

    pub fn is_empty(&self) -> bool
    {
        self.total_files == 0 && self.directories.is_empty()
    }
}
