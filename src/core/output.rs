//! Delivery of the rendered prompt: token summary, largest-file report,
//! JSON document, clipboard, file or stdout.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::cli::AppContext;
use crate::core::files::{ExcludedInfo, FileEntry};
use crate::core::tokens::TokenCounter;
use crate::infra::utils::{Status, format_number, print_status};

/// Files listed by the largest-file report.
pub const REPORT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Print the token count
    pub show_tokens: bool,
    pub no_clipboard: bool,
    pub output: Option<PathBuf>,
    pub json: bool,
    /// List the largest files
    pub report: bool,
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    prompt: &'a str,
    token_count: usize,
    model_info: &'static str,
    files: &'a [FileEntry],
    excluded: &'a ExcludedInfo,
}

/// Pretty JSON with the prompt, its token count and the packed files.
pub fn json_document(
    rendered: &str,
    files: &[FileEntry],
    excluded: &ExcludedInfo,
    counter: &TokenCounter,
) -> Result<String> {
    let doc = JsonDocument {
        prompt: rendered,
        token_count: counter.count(rendered),
        model_info: counter.encoding().model_info(),
        files,
        excluded,
    };
    serde_json::to_string_pretty(&doc).context("Failed to serialize JSON output")
}

/// The `limit` files with the most code, largest first; ties keep input order.
pub fn largest_files(files: &[FileEntry], limit: usize) -> Vec<&FileEntry> {
    let mut sorted: Vec<&FileEntry> = files.iter().collect();
    sorted.sort_by(|a, b| b.code.len().cmp(&a.code.len()));
    sorted.truncate(limit);
    sorted
}

pub fn render_report(files: &[FileEntry], counter: &TokenCounter) -> String {
    let mut out = String::from("Top 5 largest files (by estimated token count):\n");
    for (i, file) in largest_files(files, REPORT_LIMIT).iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({} tokens)\n",
            i + 1,
            file.path,
            format_number(counter.count(&file.code))
        ));
    }
    out
}

fn copy_to_clipboard(content: &str) -> Result<()> {
    use arboard::Clipboard;

    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;

    clipboard
        .set_text(content)
        .context("Failed to copy to clipboard")?;

    Ok(())
}

pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write to {}", path.display()))
}

/// Deliver `rendered` according to `opts`.
///
/// Status lines go to stderr; stdout only ever carries the prompt or JSON.
pub fn emit(
    rendered: &str,
    files: &[FileEntry],
    excluded: &ExcludedInfo,
    counter: Option<&TokenCounter>,
    opts: &OutputOptions,
    ctx: &AppContext,
) -> Result<()> {
    if let Some(counter) = counter {
        if opts.show_tokens {
            let n = counter.count(rendered);
            print_status(
                Status::Info,
                &format!("{} Tokens (Approximate)", format_number(n)),
                ctx.no_color,
            );
        }

        if opts.report {
            eprint!("\n{}", render_report(files, counter));
        }

        if opts.json {
            println!("{}", json_document(rendered, files, excluded, counter)?);
            return Ok(());
        }
    }

    if ctx.dry_run {
        if !ctx.quiet {
            let target = match &opts.output {
                Some(path) => path.display().to_string(),
                None if !opts.no_clipboard => "clipboard".to_string(),
                None => "stdout".to_string(),
            };
            eprintln!(
                "{}",
                format!("DRY RUN: Would write {} bytes to {}", rendered.len(), target).yellow()
            );
        }
        return Ok(());
    }

    let mut delivered = false;

    if !opts.no_clipboard {
        match copy_to_clipboard(rendered) {
            Ok(()) => {
                delivered = true;
                if !ctx.quiet {
                    print_status(Status::Success, "Copied to clipboard successfully.", ctx.no_color);
                }
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "clipboard unavailable");
                if !ctx.quiet {
                    print_status(
                        Status::Warning,
                        &format!("Failed to copy to clipboard: {err:#}. Falling back to console output."),
                        ctx.no_color,
                    );
                }
            }
        }
    }

    if let Some(path) = &opts.output {
        write_output(path, rendered)?;
        delivered = true;
        if !ctx.quiet {
            print_status(
                Status::Success,
                &format!("Written to file: {}", path.display()),
                ctx.no_color,
            );
        }
    }

    if !delivered {
        print!("{rendered}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokens::Encoding;
    use tempfile::TempDir;

    fn entry(path: &str, code: &str) -> FileEntry {
        FileEntry {
            path: path.to_string(),
            extension: String::new(),
            code: code.to_string(),
        }
    }

    #[test]
    fn test_largest_files_order_and_limit() {
        let files: Vec<FileEntry> = (0..7).map(|i| entry(&format!("f{i}"), &"x".repeat(i))).collect();

        let top: Vec<&str> = largest_files(&files, REPORT_LIMIT)
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(top, vec!["f6", "f5", "f4", "f3", "f2"]);
    }

    #[test]
    fn test_report_lists_token_counts() -> Result<()> {
        let counter = TokenCounter::new(Encoding::O200kBase, false)?;
        let files = vec![entry("small", "a"), entry("big", "hello world hello world")];

        let report = render_report(&files, &counter);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Top 5 largest files (by estimated token count):");
        assert!(lines[1].starts_with("1. big ("));
        assert!(lines[2].starts_with("2. small ("));
        Ok(())
    }

    #[test]
    fn test_json_document_shape() -> Result<()> {
        let counter = TokenCounter::new(Encoding::Cl100kBase, true)?;
        let files = vec![entry("a.rs", "fn a() {}")];
        let mut excluded = ExcludedInfo::default();
        excluded.record_file(Path::new("/r/x.log"));

        let doc = json_document("prompt text", &files, &excluded, &counter)?;
        let value: serde_json::Value = serde_json::from_str(&doc)?;

        assert_eq!(value["prompt"], "prompt text");
        assert_eq!(value["token_count"], counter.count("prompt text"));
        assert_eq!(value["model_info"], Encoding::Cl100kBase.model_info());
        assert_eq!(value["files"][0]["path"], "a.rs");
        assert_eq!(value["excluded"]["total_files"], 1);
        Ok(())
    }

    #[test]
    fn test_write_output_creates_parents() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("out/prompt.md");

        write_output(&path, "hello")?;
        assert_eq!(std::fs::read_to_string(path)?, "hello");
        Ok(())
    }
}
