//! Regex backend for languages compressed without a grammar (HTML, Java, Swift).

use regex::Regex;

use super::{CompressError, Language, SEPARATOR};

/// What to do with a rule's match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind
{
    /// Keep the trimmed match
    Verbatim,
    /// Drop the trailing `{` and append the body placeholder; the body up to
    /// the matching `}` is covered
    Signature,
}

/// Names that look like calls followed by a block but are control flow.
/// Checked against both the name and the return-type slot, so
/// `new Runnable() {` is not taken for a method.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "synchronized", "try", "do", "else", "return",
    "guard", "repeat", "defer", "new",
];

const HTML_RULES: &[(&str, RuleKind)] = &[
    (r"(?i)<!DOCTYPE[^>]*>", RuleKind::Verbatim),
    (r"(?i)<html(?:\s[^>]*)?>|</html>", RuleKind::Verbatim),
    (r"(?i)<head(?:\s[^>]*)?>|</head>", RuleKind::Verbatim),
    (r"(?i)<body(?:\s[^>]*)?>|</body>", RuleKind::Verbatim),
    (r"<!--[\s\S]*?-->", RuleKind::Verbatim),
    (r"(?i)<title(?:\s[^>]*)?>[\s\S]*?</title>", RuleKind::Verbatim),
    (r"(?i)<script(?:\s[^>]*)?>", RuleKind::Verbatim),
    (r"(?i)<style(?:\s[^>]*)?>", RuleKind::Verbatim),
];

const JAVA_RULES: &[(&str, RuleKind)] = &[
    (r"(?m)//.*$", RuleKind::Verbatim),
    (r"/\*[\s\S]*?\*/", RuleKind::Verbatim),
    (r"\bpackage\s+[^;]+;", RuleKind::Verbatim),
    (r"\bimport\s+[^;]+;", RuleKind::Verbatim),
    (
        r"(?:public\s+|private\s+|protected\s+)?(?:static\s+)?(?:abstract\s+|final\s+)?class\s+\w+(?:<[^>{]*>)?(?:\s+extends\s+[\w.<>, ]+?)?(?:\s+implements\s+[^{]+)?\s*\{",
        RuleKind::Verbatim,
    ),
    (
        r"(?:public\s+|private\s+|protected\s+)?interface\s+\w+(?:<[^>{]*>)?(?:\s+extends\s+[^{]+)?\s*\{",
        RuleKind::Verbatim,
    ),
    (r"(?:public\s+|private\s+|protected\s+)?enum\s+\w+(?:\s+implements\s+[^{]+)?\s*\{", RuleKind::Verbatim),
    (
        r"(?:public\s+|private\s+|protected\s+)?(?:static\s+|final\s+|abstract\s+|synchronized\s+)*(?:<[^>]+>\s+)?(?:(?P<ret>[\w.]+)(?:<[^>{;]*>)?(?:\[\])*\s+)?(?P<name>\w+)\s*\([^)]*\)(?:\s+throws\s+[^{;]+)?\s*\{",
        RuleKind::Signature,
    ),
];

const SWIFT_RULES: &[(&str, RuleKind)] = &[
    (r"(?m)//.*$", RuleKind::Verbatim),
    (r"/\*[\s\S]*?\*/", RuleKind::Verbatim),
    (r"(?m)^\s*import\s+[\w.]+", RuleKind::Verbatim),
    (
        r"(?:public\s+|private\s+|fileprivate\s+|internal\s+|open\s+)?struct\s+\w+(?::\s*[^{]+)?\s*\{",
        RuleKind::Verbatim,
    ),
    (
        r"(?:public\s+|private\s+|fileprivate\s+|internal\s+|open\s+)?(?:final\s+)?class\s+\w+(?::\s*[^{]+)?\s*\{",
        RuleKind::Verbatim,
    ),
    (
        r"(?:public\s+|private\s+|fileprivate\s+|internal\s+)?protocol\s+\w+(?::\s*[^{]+)?\s*\{",
        RuleKind::Verbatim,
    ),
    (
        r"(?:public\s+|private\s+|fileprivate\s+|internal\s+)?(?:indirect\s+)?enum\s+\w+(?::\s*[^{]+)?\s*\{",
        RuleKind::Verbatim,
    ),
    (r"(?:public\s+|private\s+|fileprivate\s+|internal\s+)?extension\s+\w+(?::\s*[^{]+)?\s*\{", RuleKind::Verbatim),
    (
        r"(?:public\s+|private\s+|fileprivate\s+|internal\s+|open\s+)?(?:override\s+)?(?:static\s+|class\s+)?(?:mutating\s+)?func\s+(?P<name>\w+)\s*(?:<[^>]*>)?\s*\([^)]*\)(?:\s*(?:throws|rethrows|async))*(?:\s*->\s*[^{]+)?\s*\{",
        RuleKind::Signature,
    ),
];

/// Compiled rule table for one language.
#[derive(Debug)]
pub struct PatternSet
{
    language: Language,
    rules: Vec<(Regex, RuleKind)>,
}

struct Extract
{
    start: usize,
    end: usize,
    content: String,
}

impl PatternSet
{
    pub fn new(language: Language) -> Result<Self, CompressError>
    {
        let table = match language
        {
            Language::Html => HTML_RULES,
            Language::Java => JAVA_RULES,
            Language::Swift => SWIFT_RULES,
            other => return Err(CompressError::NoPatterns(other)),
        };

        let rules = table
            .iter()
            .map(|(src, kind)| {
                Regex::new(src)
                    .map(|re| (re, *kind))
                    .map_err(|source| CompressError::Pattern { language, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { language, rules })
    }

    /// Extract matches in source order; a match lying entirely inside an
    /// earlier one (e.g. `//` inside a block comment) is dropped.
    pub fn compress(
        &self,
        content: &str,
    ) -> String
    {
        let mut found = Vec::new();

        for (re, kind) in &self.rules
        {
            for caps in re.captures_iter(content)
            {
                let Some(m) = caps.get(0)
                else
                {
                    continue;
                };

                if *kind == RuleKind::Signature
                    && ["name", "ret"]
                        .iter()
                        .filter_map(|group| caps.name(group))
                        .any(|g| CONTROL_KEYWORDS.contains(&g.as_str()))
                {
                    continue;
                }

                let text = m
                    .as_str()
                    .trim();
                if text.is_empty()
                {
                    continue;
                }

                let (content, end) = match kind
                {
                    RuleKind::Verbatim => (text.to_string(), m.end()),
                    RuleKind::Signature =>
                    {
                        let signature = text
                            .trim_end_matches('{')
                            .trim_end();
                        (format!("{signature} {{ ... }} // Body removed"), body_end(content, m.end()))
                    }
                };

                found.push(Extract { start: m.start(), end, content });
            }
        }

        found.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.end.cmp(&a.end))
        });

        let mut out = String::new();
        let mut covered_end = 0;

        for extract in found
        {
            if extract.end <= covered_end
            {
                continue;
            }
            covered_end = covered_end.max(extract.end);
            out.push_str(&extract.content);
            out.push_str(SEPARATOR);
        }

        if out.is_empty()
        {
            return format!(
                "// No relevant {} elements found after compression.\n",
                self.language.display_name()
            );
        }

        out
    }
}

/// Offset just past the `}` closing the block opened right before `from`.
///
/// String and character literals and comments are skipped. An unbalanced
/// block runs to the end of the input.
fn body_end(
    content: &str,
    from: usize,
) -> usize
{
    let bytes = content.as_bytes();
    let mut depth = 1usize;
    let mut i = from;

    while i < bytes.len()
    {
        match bytes[i]
        {
            b'{' => depth += 1,
            b'}' =>
            {
                depth -= 1;
                if depth == 0
                {
                    return i + 1;
                }
            }
            quote @ (b'"' | b'\'') =>
            {
                i += 1;
                while i < bytes.len() && bytes[i] != quote
                {
                    if bytes[i] == b'\\'
                    {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') =>
            {
                while i < bytes.len() && bytes[i] != b'\n'
                {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') =>
            {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/')
                {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    bytes.len()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn all_tables_compile()
    {
        for lang in [Language::Html, Language::Java, Language::Swift]
        {
            PatternSet::new(lang).unwrap();
        }
        assert!(PatternSet::new(Language::Go).is_err());
    }

    #[test]
    fn java_control_flow_is_not_a_method()
    {
        let set = PatternSet::new(Language::Java).unwrap();
        let out = set.compress(
            "class A {\n    void run(int x) {\n        if (x > 0) {\n            go();\n        }\n    }\n}\n",
        );

        assert!(out.contains("class A {"));
        assert!(out.contains("void run(int x) { ... } // Body removed"));
        assert!(!out.contains("if (x > 0)"));
    }

    #[test]
    fn java_anonymous_class_is_not_a_method()
    {
        let set = PatternSet::new(Language::Java).unwrap();
        let out = set.compress(
            "class A {\n    void run() {\n        Runnable r = new Runnable() {\n            public void run() { go(); }\n        };\n    }\n}\n",
        );

        assert_eq!(out, "class A {\n// -----\nvoid run() { ... } // Body removed\n// -----\n");
    }

    #[test]
    fn field_initialised_with_anonymous_class()
    {
        let set = PatternSet::new(Language::Java).unwrap();
        let out = set.compress("class A {\n    Runnable r = new Runnable() {\n        public void run() {}\n    };\n}\n");

        assert!(!out.contains("new Runnable"));
        assert!(out.contains("public void run() { ... } // Body removed"));
    }

    #[test]
    fn comments_inside_elided_bodies_are_dropped()
    {
        let set = PatternSet::new(Language::Java).unwrap();
        let out = set.compress(
            "// kept\nclass A {\n    void run() {\n        // secret body comment\n        String s = \"}\";\n        /* { */\n    }\n    // after\n    int f() { return 1; }\n}\n",
        );

        assert!(out.contains("// kept"));
        assert!(out.contains("// after"));
        assert!(out.contains("int f() { ... } // Body removed"));
        assert!(!out.contains("secret"));
        assert!(!out.contains("/* { */"));

        let set = PatternSet::new(Language::Swift).unwrap();
        let out = set.compress("func go() {\n    // inner note\n    print(1)\n}\n// trailing\n");
        assert_eq!(out, "func go() { ... } // Body removed\n// -----\n// trailing\n// -----\n");
    }

    #[test]
    fn body_end_skips_literals_and_comments()
    {
        let src = "f() { a = \"}\"; b = '}'; // }\n /* } */ { } } tail";
        let open = src.find('{').unwrap() + 1;
        assert_eq!(&src[body_end(src, open)..], " tail");

        assert_eq!(body_end("x { never closed", 3), 16);
    }

    #[test]
    fn nested_comment_markers_are_deduplicated()
    {
        let set = PatternSet::new(Language::Swift).unwrap();
        let out = set.compress("/* see // inner */\nimport Foundation\n");

        assert_eq!(out, "/* see // inner */\n// -----\nimport Foundation\n// -----\n");
    }

    #[test]
    fn empty_input_reports_language()
    {
        let set = PatternSet::new(Language::Html).unwrap();
        assert_eq!(
            set.compress("just text"),
            "// No relevant HTML elements found after compression.\n"
        );
    }
}
