//! Tree-sitter backend: parse, query, and turn captures into chunks.

use std::collections::HashSet;

use tree_sitter::{Language as Grammar, Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

use super::queries::{BODY_CAPTURE, FUNCTION_CAPTURE, OUTLINE_CAPTURE, VERBATIM_CAPTURES};
use super::{Chunk, ChunkKind, CompressError, Language};

/// One query match with its captures resolved to nodes.
#[derive(Debug, Clone)]
pub struct QueryHit<'tree>
{
    pub pattern_index: usize,
    pub captures: Vec<(u32, Node<'tree>)>,
}

impl QueryHit<'_>
{
    fn key(&self) -> (usize, Vec<(u32, usize, usize)>)
    {
        let caps = self
            .captures
            .iter()
            .map(|(idx, node)| (*idx, node.start_byte(), node.end_byte()))
            .collect();
        (self.pattern_index, caps)
    }
}

/// Parse `content` with `grammar`.
///
/// Malformed input still yields a tree (with error nodes); only a parser
/// that refuses to run at all is reported as an error.
pub fn parse_source(
    content: &str,
    grammar: &Grammar,
    language: Language,
) -> Result<Tree, CompressError>
{
    let mut parser = Parser::new();
    parser
        .set_language(grammar)
        .map_err(|source| CompressError::Grammar { language, source })?;

    parser
        .parse(content, None)
        .ok_or(CompressError::Parse(language))
}

pub fn compile_query(
    source: &str,
    grammar: &Grammar,
    language: Language,
) -> Result<Query, CompressError>
{
    Query::new(grammar, source).map_err(|e| CompressError::Query {
        language,
        row: e.row,
        column: e.column,
        message: e.message,
    })
}

/// Run `query` over the whole tree. A match identical to an earlier one
/// (same pattern, same captures over the same byte ranges) is dropped.
pub fn execute_query<'tree>(
    tree: &'tree Tree,
    query: &Query,
    source: &str,
) -> Vec<QueryHit<'tree>>
{
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());

    let mut seen = HashSet::new();
    let mut hits = Vec::new();

    while let Some(m) = matches.next()
    {
        let hit = QueryHit {
            pattern_index: m.pattern_index,
            captures: m
                .captures
                .iter()
                .map(|c| (c.index, c.node))
                .collect(),
        };

        if seen.insert(hit.key())
        {
            hits.push(hit);
        }
    }

    hits
}

/// Build chunks from query hits. Definitions become signature + placeholder;
/// verbatim captures keep their trimmed text.
pub fn chunks_from_hits(
    hits: &[QueryHit<'_>],
    query: &Query,
    source: &str,
    language: Language,
) -> Vec<Chunk>
{
    let names = query.capture_names();
    let mut chunks = Vec::new();

    for hit in hits
    {
        let mut definition: Option<(Node, bool)> = None;
        let mut body: Option<Node> = None;

        for (idx, node) in &hit.captures
        {
            match names[*idx as usize]
            {
                FUNCTION_CAPTURE => definition = Some((*node, false)),
                OUTLINE_CAPTURE => definition = Some((*node, true)),
                BODY_CAPTURE => body = Some(*node),
                _ =>
                {}
            }
        }

        if let Some((def, outline)) = definition
        {
            if let Some(chunk) = definition_chunk(def, body, outline, source, language)
            {
                chunks.push(chunk);
            }
            continue;
        }

        for (idx, node) in &hit.captures
        {
            if !VERBATIM_CAPTURES.contains(&names[*idx as usize])
            {
                continue;
            }
            if let Some(chunk) = verbatim_chunk(*node, source)
            {
                chunks.push(chunk);
            }
        }
    }

    chunks
}

fn verbatim_chunk(
    node: Node,
    source: &str,
) -> Option<Chunk>
{
    let text = source
        .get(node.start_byte()..node.end_byte())?
        .trim();
    if text.is_empty()
    {
        return None;
    }

    Some(Chunk {
        content: text.to_string(),
        start: node.start_byte(),
        end: node.end_byte(),
        kind: ChunkKind::Verbatim,
    })
}

fn definition_chunk(
    def: Node,
    body: Option<Node>,
    outline: bool,
    source: &str,
    language: Language,
) -> Option<Chunk>
{
    let Some(body) = body
    else
    {
        return verbatim_chunk(def, source);
    };

    let signature_end = match language
    {
        // `def f(x):` / `class C(Base):` end at the colon token
        Language::Python => colon_end(def).unwrap_or(body.start_byte()),
        _ => body.start_byte(),
    };

    if signature_end <= def.start_byte() || signature_end > def.end_byte()
    {
        return verbatim_chunk(def, source);
    }

    let signature = source
        .get(def.start_byte()..signature_end)?
        .trim();

    let kind = if outline
    {
        ChunkKind::Outline { header_end: body.start_byte() }
    }
    else
    {
        ChunkKind::Elided
    };

    Some(Chunk {
        content: format!("{signature}{}", language.placeholder()),
        start: def.start_byte(),
        end: def.end_byte(),
        kind,
    })
}

fn colon_end(def: Node) -> Option<usize>
{
    (0..def.child_count())
        .filter_map(|i| def.child(i))
        .find(|child| child.kind() == ":")
        .map(|child| child.end_byte())
}
