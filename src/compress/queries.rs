//! Capture queries for the syntax-backed languages.
//!
//! Capture names drive chunk construction:
//! - `@definition.function` + `@body`: signature kept, whole body elided
//! - `@definition.outline` + `@body`: signature kept, members still listed
//! - any name in [`VERBATIM_CAPTURES`]: node text kept as-is
//!
//! Everything else (e.g. helper `@name` captures) is ignored.

use super::Language;

pub const FUNCTION_CAPTURE: &str = "definition.function";
pub const OUTLINE_CAPTURE: &str = "definition.outline";
pub const BODY_CAPTURE: &str = "body";

pub const VERBATIM_CAPTURES: &[&str] = &[
    "import",
    "package",
    "comment",
    "definition.type",
    "export",
    "command",
    "rule",
    "declaration",
    "decorator",
    "attribute",
    "macro",
];

const GO: &str = r#"
(package_clause) @package
(import_declaration) @import
(type_declaration) @definition.type
(comment) @comment

(function_declaration
  name: (identifier) @name
  body: (block) @body) @definition.function
(method_declaration
  name: (field_identifier) @name
  body: (block) @body) @definition.function
"#;

const PYTHON: &str = r#"
(import_statement) @import
(import_from_statement) @import
(future_import_statement) @import
(comment) @comment
(decorator) @decorator

(function_definition
  name: (identifier) @name
  body: (block) @body) @definition.function
(class_definition
  name: (identifier) @name
  body: (block) @body) @definition.outline
"#;

const JAVASCRIPT: &str = r#"
(import_statement) @import
(comment) @comment

; classes list their members, everything callable loses its body
(class_declaration body: (class_body) @body) @definition.outline
(method_definition body: (statement_block) @body) @definition.function
(function_declaration body: (statement_block) @body) @definition.function
(generator_function_declaration body: (statement_block) @body) @definition.function

(export_statement
  declaration: (function_declaration body: (statement_block) @body)) @definition.function
(export_statement
  declaration: (generator_function_declaration body: (statement_block) @body)) @definition.function
(export_statement
  declaration: (class_declaration body: (class_body) @body)) @definition.outline

; export default function () {} / export default class {}
(export_statement
  value: (function_expression body: (statement_block) @body)) @definition.function
(export_statement
  value: (class body: (class_body) @body)) @definition.outline

; const f = () => ..., var g = function () {}
(lexical_declaration
  (variable_declarator value: (arrow_function body: (_) @body))) @definition.function
(variable_declaration
  (variable_declarator value: (arrow_function body: (_) @body))) @definition.function
(lexical_declaration
  (variable_declarator value: (function_expression body: (statement_block) @body))) @definition.function
(variable_declaration
  (variable_declarator value: (function_expression body: (statement_block) @body))) @definition.function
(export_statement
  declaration: (lexical_declaration
    (variable_declarator value: (arrow_function body: (_) @body)))) @definition.function

; remaining export forms are kept whole
(export_statement declaration: (lexical_declaration)) @export
(export_statement declaration: (variable_declaration)) @export
(export_statement (export_clause)) @export
(export_statement source: (string)) @export
(export_statement value: (_)) @export
"#;

const BASH: &str = r#"
(comment) @comment
(function_definition
  name: (word) @name
  body: (_) @body) @definition.function
(program (command) @command)
"#;

// Parsed with the C++ grammar.
const C: &str = r#"
(preproc_include) @import
(preproc_def) @macro
(preproc_function_def) @macro
(comment) @comment
(function_definition body: (_) @body) @definition.function
(struct_specifier body: (field_declaration_list)) @definition.type
(enum_specifier body: (enumerator_list)) @definition.type
(union_specifier body: (field_declaration_list)) @definition.type
(type_definition) @definition.type
(translation_unit (declaration) @declaration)
"#;

const CSS: &str = r#"
(comment) @comment
(import_statement) @import
(rule_set) @rule
(media_statement) @rule
(keyframes_statement) @rule
(declaration) @declaration
"#;

const RUST: &str = r#"
(use_declaration) @import
(extern_crate_declaration) @import
(line_comment) @comment
(block_comment) @comment
(attribute_item) @attribute
(inner_attribute_item) @attribute
(struct_item) @definition.type
(enum_item) @definition.type
(union_item) @definition.type
(type_item) @definition.type
(const_item) @declaration
(static_item) @declaration
(function_signature_item) @declaration
(macro_definition) @macro

(function_item body: (block) @body) @definition.function
(impl_item body: (declaration_list) @body) @definition.outline
(trait_item body: (declaration_list) @body) @definition.outline
(mod_item body: (declaration_list) @body) @definition.outline
(mod_item !body) @declaration
"#;

/// Query source for a syntax-backed language; `None` for pattern languages.
pub fn query_source(language: Language) -> Option<&'static str>
{
    let src = match language
    {
        Language::Go => GO,
        Language::Python => PYTHON,
        Language::JavaScript => JAVASCRIPT,
        Language::Bash => BASH,
        Language::C => C,
        Language::Css => CSS,
        Language::Rust => RUST,
        Language::Html | Language::Java | Language::Swift => return None,
    };
    Some(src)
}
