//! Syntax-aware source compression.
//!
//! Reduces a source file to its outline: imports, comments, type
//! declarations, and function/class signatures whose bodies are replaced by a
//! placeholder. Grammar-backed languages go through tree-sitter queries;
//! HTML, Java and Swift use ordered regex rules.
//!
//! Every emitted chunk is followed by [`SEPARATOR`]. Input with nothing worth
//! keeping compresses to [`NOTHING_FOUND`].

pub mod language;
pub mod pattern;
pub mod queries;
pub mod syntax;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use moka::sync::Cache;
use tracing::debug;
use tree_sitter::Query;

use crate::cli::{AppContext, CompressArgs};
use crate::infra::excludes::default_excludes;
use crate::infra::io::read_file_smart;
use crate::infra::walk::FileWalker;

pub use language::{Backend, Language};
use pattern::PatternSet;

/// Line written after every chunk.
pub const SEPARATOR: &str = "\n// -----\n";

/// Output for syntax-backed input with no relevant constructs.
pub const NOTHING_FOUND: &str = "// No relevant code found after compression.\n";

#[derive(Debug, thiserror::Error)]
pub enum CompressError
{
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("no query found for language: {0}")]
    NoQuery(Language),

    #[error("no extraction patterns for language: {0}")]
    NoPatterns(Language),

    #[error("failed to load {language} grammar")]
    Grammar
    {
        language: Language,
        #[source]
        source: tree_sitter::LanguageError,
    },

    #[error("failed to parse {0} source")]
    Parse(Language),

    #[error("failed to compile {language} query at {row}:{column}: {message}")]
    Query
    {
        language: Language,
        row: usize,
        column: usize,
        message: String,
    },

    #[error("invalid {language} extraction pattern")]
    Pattern
    {
        language: Language,
        #[source]
        source: regex::Error,
    },
}

/// How much of the source a chunk accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind
{
    /// Signature kept, whole body dropped; covers the full node.
    Elided,
    /// Signature kept, members still listed; covers only the header.
    Outline
    {
        header_end: usize
    },
    /// Node text kept as-is; covers the full node.
    Verbatim,
}

impl ChunkKind
{
    fn rank(self) -> u8
    {
        match self
        {
            ChunkKind::Elided => 0,
            ChunkKind::Outline { .. } => 1,
            ChunkKind::Verbatim => 2,
        }
    }
}

/// A captured piece of output with its byte span in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk
{
    pub content: String,
    pub start: usize,
    pub end: usize,
    pub kind: ChunkKind,
}

impl Chunk
{
    /// Region of the source this chunk stands in for.
    fn covers(&self) -> std::ops::Range<usize>
    {
        match self.kind
        {
            ChunkKind::Outline { header_end } => self.start..header_end.max(self.start + 1),
            _ => self.start..self.end,
        }
    }
}

#[derive(Clone)]
enum Compiled
{
    Syntax(Arc<Query>),
    Pattern(Arc<PatternSet>),
}

/// Compressor with per-language compiled queries and patterns cached.
///
/// Cheap to share across threads; compiled artefacts are built on first use.
pub struct Compressor
{
    compiled: Cache<Language, Compiled>,
}

impl Default for Compressor
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl Compressor
{
    pub fn new() -> Self
    {
        Self { compiled: Cache::new(Language::ALL.len() as u64) }
    }

    /// Identify the language from `path` and compress `content`.
    pub fn compress_path(
        &self,
        path: &Path,
        content: &str,
    ) -> Result<String, CompressError>
    {
        let language = Language::identify(path)?;
        self.compress(content, language)
    }

    /// Compress `content` written in `language`.
    pub fn compress(
        &self,
        content: &str,
        language: Language,
    ) -> Result<String, CompressError>
    {
        match self.compiled_for(language)?
        {
            Compiled::Pattern(set) => Ok(set.compress(content)),
            Compiled::Syntax(query) =>
            {
                let grammar = language
                    .grammar()
                    .ok_or(CompressError::NoQuery(language))?;
                let tree = syntax::parse_source(content, &grammar, language)?;
                let hits = syntax::execute_query(&tree, &query, content);
                let chunks = syntax::chunks_from_hits(&hits, &query, content, language);

                debug!(
                    language = %language,
                    matches = hits.len(),
                    chunks = chunks.len(),
                    "compressed source"
                );

                Ok(assemble(chunks))
            }
        }
    }

    fn compiled_for(
        &self,
        language: Language,
    ) -> Result<Compiled, CompressError>
    {
        if let Some(hit) = self
            .compiled
            .get(&language)
        {
            return Ok(hit);
        }

        let compiled = match language.backend()
        {
            Backend::Pattern => Compiled::Pattern(Arc::new(PatternSet::new(language)?)),
            Backend::Syntax =>
            {
                let grammar = language
                    .grammar()
                    .ok_or(CompressError::NoQuery(language))?;
                let source =
                    queries::query_source(language).ok_or(CompressError::NoQuery(language))?;
                Compiled::Syntax(Arc::new(syntax::compile_query(source, &grammar, language)?))
            }
        };

        self.compiled
            .insert(language, compiled.clone());
        Ok(compiled)
    }
}

/// Order chunks by position and drop any that fall inside a region already
/// accounted for by an emitted chunk.
///
/// For equal starts the longer chunk wins, and an elided or outlined
/// definition wins over a verbatim capture of the same node.
pub fn assemble(mut chunks: Vec<Chunk>) -> String
{
    chunks.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.end.cmp(&a.end))
            .then(
                a.kind
                    .rank()
                    .cmp(&b.kind.rank()),
            )
    });

    let mut out = String::new();
    let mut covered: Vec<std::ops::Range<usize>> = Vec::new();
    let mut last_start = None;

    for chunk in chunks
    {
        if last_start == Some(chunk.start)
        {
            continue;
        }

        covered.retain(|r| r.end > chunk.start);
        if covered
            .iter()
            .any(|r| r.contains(&chunk.start))
        {
            continue;
        }

        last_start = Some(chunk.start);
        covered.push(chunk.covers());
        out.push_str(&chunk.content);
        out.push_str(SEPARATOR);
    }

    if out.is_empty()
    {
        return NOTHING_FOUND.to_string();
    }

    out
}

/// Expand directory arguments into the supported source files below them,
/// honouring .gitignore and the built-in excludes.
fn expand_inputs(
    inputs: &[PathBuf],
    forced: bool,
) -> anyhow::Result<Vec<PathBuf>>
{
    let walker = FileWalker::new(&default_excludes())?;
    let mut files = Vec::new();

    for input in inputs
    {
        if !input.is_dir()
        {
            files.push(input.clone());
            continue;
        }

        files.extend(
            walker
                .walk_files(input)
                .into_iter()
                .filter(|p| forced || Language::identify(p).is_ok()),
        );
    }

    Ok(files)
}

/// Print the compressed outline of each file in `args.files`.
///
/// With more than one file each outline is preceded by a `==> path <==` header.
pub fn run(
    args: CompressArgs,
    ctx: &AppContext,
) -> anyhow::Result<()>
{
    let forced = args
        .language
        .as_deref()
        .map(Language::from_name)
        .transpose()?;

    let files = expand_inputs(&args.files, forced.is_some())?;
    let compressor = Compressor::new();
    let many = files.len() > 1;

    for (i, path) in files
        .iter()
        .enumerate()
    {
        let content = read_file_smart(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let text = content.text();

        let language = match forced
        {
            Some(language) => language,
            None => Language::identify(path)?,
        };

        let outline = compressor
            .compress(&text, language)
            .with_context(|| format!("Failed to compress {}", path.display()))?;

        if ctx.quiet
        {
            continue;
        }
        if many
        {
            if i > 0
            {
                println!();
            }
            println!("==> {} <==", path.display());
        }
        print!("{outline}");
    }

    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn chunk(
        content: &str,
        start: usize,
        end: usize,
        kind: ChunkKind,
    ) -> Chunk
    {
        Chunk { content: content.to_string(), start, end, kind }
    }

    #[test]
    fn assemble_orders_by_position()
    {
        let out = assemble(vec![
            chunk("b", 10, 12, ChunkKind::Verbatim),
            chunk("a", 0, 5, ChunkKind::Verbatim),
        ]);
        assert_eq!(out, "a\n// -----\nb\n// -----\n");
    }

    #[test]
    fn assemble_drops_chunks_inside_elided_bodies()
    {
        let out = assemble(vec![
            chunk("fn f() { ... }", 0, 50, ChunkKind::Elided),
            chunk("// inner", 20, 28, ChunkKind::Verbatim),
        ]);
        assert_eq!(out, "fn f() { ... }\n// -----\n");
    }

    #[test]
    fn assemble_keeps_members_of_outlines()
    {
        let out = assemble(vec![
            chunk("impl A { ... }", 0, 100, ChunkKind::Outline { header_end: 7 }),
            chunk("fn m() { ... }", 12, 40, ChunkKind::Elided),
        ]);
        assert_eq!(out, "impl A { ... }\n// -----\nfn m() { ... }\n// -----\n");
    }

    #[test]
    fn assemble_prefers_definition_over_verbatim_of_same_node()
    {
        let out = assemble(vec![
            chunk("export default 1", 0, 30, ChunkKind::Verbatim),
            chunk("export default function() { ... }", 0, 30, ChunkKind::Elided),
        ]);
        assert_eq!(out, "export default function() { ... }\n// -----\n");
    }

    #[test]
    fn assemble_empty_reports_nothing_found()
    {
        assert_eq!(assemble(Vec::new()), NOTHING_FOUND);
    }

    #[test]
    fn unsupported_path_is_an_error()
    {
        let c = Compressor::new();
        let err = c
            .compress_path(Path::new("notes.txt"), "hello")
            .unwrap_err();
        assert!(matches!(err, CompressError::UnsupportedExtension(_)));
    }

    #[test]
    fn compiled_artifacts_are_reused()
    {
        let c = Compressor::new();
        let first = c
            .compress("package main\n", Language::Go)
            .unwrap();
        let second = c
            .compress("package main\n", Language::Go)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "package main\n// -----\n");
    }
}
