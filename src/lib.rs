//! **ingest** - Pack source trees into a single LLM prompt
//!
//! Gitignore-aware walking with glob excludes, parallel file processing,
//! Handlebars prompt templates, tiktoken counts, and tree-sitter outline
//! compression for supported languages.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Syntax-aware code compression (tree-sitter queries and regex rules)
pub mod compress;
pub use compress::run as compress_run;

/// Prompt pipeline - walk, render, count, deliver
pub mod core {
    /// Per-file reading, formatting and exclusion bookkeeping
    pub mod files;

    /// Working-tree diff and branch diff/log capture
    pub mod git;

    /// Clipboard, file, stdout and JSON delivery
    pub mod output;

    /// The `pack` command
    pub mod pack;
    pub use pack::run as pack_run;

    /// Prompt templates (Handlebars)
    pub mod template;

    /// tiktoken-based token counting with moka caching
    pub mod tokens;
    pub use tokens::{Encoding, TokenCounter};

    /// Source tree rendering with exclusion markers
    pub mod tree;
    pub use tree::run as tree_run;
}

/// Infrastructure - Configuration, patterns, I/O, and utilities
pub mod infra {
    /// Layered configuration (ingest.toml, user config, INGEST_ env)
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Built-in and user exclude pattern lists
    pub mod excludes;
    pub use excludes::resolve_excludes;

    /// Memory-mapped file I/O for large files (>1MB threshold)
    pub mod io;
    pub use io::{FileContent, read_file_smart};

    /// Gitignore-aware directory walking with glob excludes
    pub mod walk;
    pub use walk::FileWalker;

    /// Formatting helpers and status lines
    pub mod utils;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use compress::{Compressor, Language};
pub use core::{pack_run, tree_run};
pub use infra::{Config, FileWalker, load_config};
