//! Language identification and per-language compression traits.

use std::fmt;
use std::path::Path;

use tree_sitter::Language as Grammar;

use super::CompressError;

/// Languages the compressor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language
{
    Go,
    Python,
    JavaScript,
    Bash,
    C,
    Css,
    Html,
    Rust,
    Java,
    Swift,
}

/// How a language is reduced to its outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend
{
    /// Tree-sitter grammar plus a capture query
    Syntax,
    /// Ordered regular-expression rules
    Pattern,
}

impl Language
{
    pub const ALL: [Language; 10] = [
        Language::Go,
        Language::Python,
        Language::JavaScript,
        Language::Bash,
        Language::C,
        Language::Css,
        Language::Html,
        Language::Rust,
        Language::Java,
        Language::Swift,
    ];

    /// Identify the language of `path` from its (case-insensitive) extension.
    pub fn identify(path: &Path) -> Result<Self, CompressError>
    {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let lang = match ext.as_str()
        {
            "go" => Language::Go,
            "py" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" => Language::JavaScript,
            "sh" | "bash" => Language::Bash,
            "c" | "h" => Language::C,
            "css" => Language::Css,
            "html" | "htm" => Language::Html,
            "rs" => Language::Rust,
            "java" => Language::Java,
            "swift" => Language::Swift,
            _ =>
            {
                let shown = if ext.is_empty() { String::new() } else { format!(".{ext}") };
                return Err(CompressError::UnsupportedExtension(shown));
            }
        };

        Ok(lang)
    }

    /// Look up a language by its identifier ("go", "Python", ...).
    pub fn from_name(name: &str) -> Result<Self, CompressError>
    {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.name() == lower)
            .ok_or_else(|| CompressError::UnsupportedLanguage(name.to_string()))
    }

    pub fn name(self) -> &'static str
    {
        match self
        {
            Language::Go => "go",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Bash => "bash",
            Language::C => "c",
            Language::Css => "css",
            Language::Html => "html",
            Language::Rust => "rust",
            Language::Java => "java",
            Language::Swift => "swift",
        }
    }

    pub fn backend(self) -> Backend
    {
        match self
        {
            Language::Html | Language::Java | Language::Swift => Backend::Pattern,
            _ => Backend::Syntax,
        }
    }

    /// Tree-sitter grammar for syntax-backed languages.
    ///
    /// C sources go through the C++ grammar, and TypeScript through the
    /// JavaScript one; both parse the constructs we capture.
    pub fn grammar(self) -> Option<Grammar>
    {
        let grammar = match self
        {
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::Bash => tree_sitter_bash::LANGUAGE.into(),
            Language::C => tree_sitter_cpp::LANGUAGE.into(),
            Language::Css => tree_sitter_css::LANGUAGE.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Html | Language::Java | Language::Swift => return None,
        };
        Some(grammar)
    }

    /// Text appended to a signature in place of its removed body.
    pub fn placeholder(self) -> &'static str
    {
        match self
        {
            Language::Go => " { ... }",
            Language::Python | Language::Bash => " { ... } # Body removed",
            _ => " { ... } // Body removed",
        }
    }

    /// Human-readable name used in "nothing found" messages.
    pub(crate) fn display_name(self) -> &'static str
    {
        match self
        {
            Language::Go => "Go",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::Bash => "Bash",
            Language::C => "C",
            Language::Css => "CSS",
            Language::Html => "HTML",
            Language::Rust => "Rust",
            Language::Java => "Java",
            Language::Swift => "Swift",
        }
    }
}

impl fmt::Display for Language
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        f.write_str(self.name())
    }
}
