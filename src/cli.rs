use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub verbose: bool,  // global --verbose
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "ingest")]
#[command(
    about = "Pack files and directories into a single LLM prompt, optionally compressing source to its outline"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress spinners and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Debug logging, active excludes and the largest-file report
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show what would be done without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack files and directories into a prompt
    Pack(PackArgs),

    /// Print the compressed outline of source files
    Compress(CompressArgs),

    /// Display the source tree with excluded entries marked
    Tree(TreeArgs),

    /// Print the effective exclude patterns
    Excludes(ExcludesArgs),

    /// Print the built-in prompt template
    Template,

    /// Initialize an ingest.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Files or directories to pack
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Glob patterns a file must match to be included
    #[arg(short, long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Additional glob patterns to exclude
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Keep files that match both an include and an exclude pattern
    #[arg(long)]
    pub include_priority: bool,

    /// Leave excluded entries out of the source tree
    #[arg(long)]
    pub exclude_from_tree: bool,

    /// Read exclude patterns from this .glob file only
    #[arg(long)]
    pub pattern_exclude: Option<PathBuf>,

    /// Do not apply the built-in exclude patterns
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Ignore .gitignore and .ignore rules
    #[arg(long)]
    pub no_ignore: bool,

    /// Compress supported source files to their outline
    #[arg(long)]
    pub compress: bool,

    /// Prefix every line with its number
    #[arg(short, long)]
    pub line_number: bool,

    /// Do not wrap file contents in fenced code blocks
    #[arg(long)]
    pub no_codeblock: bool,

    /// Show paths relative to the packed directory (prefixed with its name)
    #[arg(long)]
    pub relative_paths: bool,

    /// Include the working tree git diff
    #[arg(short = 'd', long = "diff")]
    pub git_diff: bool,

    /// Include the git diff between two branches (e.g. main,feature)
    #[arg(long, value_name = "A,B")]
    pub git_diff_branch: Option<String>,

    /// Include the git log between two branches (e.g. main,feature)
    #[arg(long, value_name = "A,B")]
    pub git_log_branch: Option<String>,

    /// Custom prompt template (Handlebars syntax)
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Tokenizer encoding or model name (o200k, cl100k, p50k, r50k, gpt-4o, ...)
    #[arg(short = 'c', long)]
    pub encoding: Option<String>,

    /// Do not print the token count
    #[arg(long)]
    pub no_tokens: bool,

    /// Report raw token counts without the accuracy correction
    #[arg(long)]
    pub no_correction: bool,

    /// Do not copy the prompt to the clipboard
    #[arg(short, long)]
    pub no_clipboard: bool,

    /// Write the prompt to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the prompt, token count and files as JSON
    #[arg(long)]
    pub json: bool,

    /// Report the five largest files
    #[arg(long)]
    pub report: bool,
}

#[derive(Parser, Debug)]
pub struct CompressArgs {
    /// Source files to compress; directories are walked for supported files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Language to use instead of the one implied by the extension
    #[arg(long)]
    pub language: Option<String>,
}

#[derive(Parser, Debug)]
pub struct TreeArgs {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Glob patterns a file must match to be included
    #[arg(short, long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Additional glob patterns to exclude
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Leave excluded entries out of the tree
    #[arg(long)]
    pub exclude_from_tree: bool,

    /// Read exclude patterns from this .glob file only
    #[arg(long)]
    pub pattern_exclude: Option<PathBuf>,

    /// Do not apply the built-in exclude patterns
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Ignore .gitignore and .ignore rules
    #[arg(long)]
    pub no_ignore: bool,
}

#[derive(Parser, Debug)]
pub struct ExcludesArgs {
    /// Print only the built-in list
    #[arg(long)]
    pub builtin: bool,

    /// Read exclude patterns from this .glob file only
    #[arg(long)]
    pub pattern_exclude: Option<PathBuf>,

    /// Do not apply the built-in exclude patterns
    #[arg(long)]
    pub no_default_excludes: bool,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,

    /// Write the user-level config (~/.config/ingest/ingest.toml) instead
    #[arg(long)]
    pub global: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
