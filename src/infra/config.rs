use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

/// File name looked up in the user config dir and the working directory.
pub const CONFIG_FILE: &str = "ingest.toml";

/// User-level config location; expanded with `shellexpand`.
pub const USER_CONFIG: &str = "~/.config/ingest/ingest.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Extra exclude globs (on top of the resolved defaults)
    pub excludes: Vec<String>,

    /// Tokenizer encoding or model name
    pub encoding: String,

    /// Compress supported source files to their outline
    pub compress: bool,

    /// Prefix every line with its number
    pub line_numbers: bool,

    /// Do not wrap file contents in fenced code blocks
    pub no_codeblock: bool,

    /// Report paths relative to the walked root
    pub relative_paths: bool,

    /// Follow symbolic links while walking
    pub follow_symlinks: bool,

    /// Custom template used instead of the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// Never touch the clipboard
    pub no_clipboard: bool,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            excludes: Vec::new(),
            encoding: "o200k".to_string(),
            compress: false,
            line_numbers: false,
            no_codeblock: false,
            relative_paths: false,
            follow_symlinks: false,
            template: None,
            no_clipboard: false,
        }
    }
}

/// Candidate config files, lowest priority first.
pub fn config_paths() -> Vec<PathBuf>
{
    let mut paths = Vec::new();

    let user = shellexpand::tilde(USER_CONFIG);
    if !user.starts_with('~')
    {
        paths.push(PathBuf::from(user.as_ref()));
    }

    paths.push(PathBuf::from(CONFIG_FILE));
    paths
}

/// Load user config, then project config, then `INGEST_*` environment.
pub fn load_config() -> Result<Config>
{
    load_from(&config_paths(), None)
}

/// Layer `paths` (missing files are skipped) and the environment.
/// `env` replaces the process environment when given.
pub fn load_from(
    paths: &[PathBuf],
    env: Option<config::Map<String, String>>,
) -> Result<Config>
{
    let mut builder = config::Config::builder();

    for path in paths
    {
        builder = builder.add_source(config::File::from(path.as_path()).required(false));
    }

    // INGEST_LINE_NUMBERS=true, INGEST_EXCLUDES="a/**,b/**"
    builder = builder.add_source(
        config::Environment::with_prefix("INGEST")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("excludes")
            .source(env),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = if args.global
    {
        PathBuf::from(shellexpand::tilde(USER_CONFIG).as_ref())
    }
    else
    {
        args.path
            .join(CONFIG_FILE)
    };

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("Would create config file at {}", config_path.display());
        }
        return Ok(());
    }

    write_default(&config_path)?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

fn write_default(path: &Path) -> Result<()>
{
    if let Some(parent) = path.parent()
        && !parent
            .as_os_str()
            .is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(path, toml_string).context("Failed to write config file")?;
    Ok(())
}
