//! Prompt templates rendered with Handlebars.
//!
//! Templates see `absolute_code_path`, `source_trees`, `files` (each with
//! `path`, `extension`, `code`), `git_diff`, `git_diff_branch` and
//! `git_log_branch`.

use std::path::Path;

use anyhow::{Context, Result};
use handlebars::{Handlebars, no_escape};
use serde::Serialize;

use crate::cli::AppContext;
use crate::core::files::FileEntry;

pub const DEFAULT_TEMPLATE: &str = r#"Project Path: {{ absolute_code_path }}

Source Tree:

```
{{ source_trees }}
```

{{#each files}}
{{#if code}}
`{{path}}:`

{{code}}

{{/if}}
{{/each}}
{{#if git_diff}}
Git Diff:

```diff
{{ git_diff }}
```

{{/if}}
{{#if git_diff_branch}}
Git Diff Between Branches:

```diff
{{ git_diff_branch }}
```

{{/if}}
{{#if git_log_branch}}
Git Log Between Branches:

```
{{ git_log_branch }}
```

{{/if}}
"#;

/// Values exposed to a template.
#[derive(Debug, Default, Serialize)]
pub struct PromptContext<'a>
{
    pub absolute_code_path: String,
    pub source_trees: String,
    pub files: &'a [FileEntry],
    pub git_diff: String,
    pub git_diff_branch: String,
    pub git_log_branch: String,
}

#[derive(Debug, Clone)]
pub struct PromptTemplate
{
    name: String,
    source: String,
}

impl PromptTemplate
{
    pub fn builtin() -> Self
    {
        Self { name: "default".to_string(), source: DEFAULT_TEMPLATE.to_string() }
    }

    pub fn from_file(path: &Path) -> Result<Self>
    {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        Ok(Self {
            name: path
                .display()
                .to_string(),
            source,
        })
    }

    /// Custom template when a path is given, else the built-in one.
    pub fn load(path: Option<&Path>) -> Result<Self>
    {
        match path
        {
            Some(p) => Self::from_file(p),
            None => Ok(Self::builtin()),
        }
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn source(&self) -> &str
    {
        &self.source
    }

    pub fn render(
        &self,
        ctx: &PromptContext<'_>,
    ) -> Result<String>
    {
        let mut hb = Handlebars::new();
        // Prompts are plain text, never HTML
        hb.register_escape_fn(no_escape);

        hb.register_template_string(&self.name, &self.source)
            .with_context(|| format!("Failed to parse template {}", self.name))?;

        hb.render(&self.name, ctx)
            .with_context(|| format!("Failed to render template {}", self.name))
    }
}

/// Print the built-in template, a starting point for `--template` files.
pub fn run(ctx: &AppContext) -> Result<()>
{
    if !ctx.quiet
    {
        print!("{}", PromptTemplate::builtin().source());
    }
    Ok(())
}
