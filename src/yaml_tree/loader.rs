// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{collections::HashMap, str::Chars};

use saphyr_parser::{Event, Marker, Parser as YamlParser, ScanError, TScalarStyle, Tag as EventTag};
use thiserror::Error;
use tracing::warn;

use super::{
    source_lines::{SourceLines, SourcePos},
    Document, DocumentBody, MapEntry, Mapping, Node, NodeValue, Scalar, ScalarStyle, Sequence, Tag,
};

/// The event stream cannot be resumed after a scan error, so it ends the load.
#[derive(Debug, Error)]
#[error("error parsing YAML: {0}")]
pub struct LoadError(#[from] ScanError);

#[derive(Debug, Error)]
enum NodeError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("yaml {0} are not supported")]
    Unsupported(&'static str),
}

#[derive(Clone, Copy)]
struct NodeContext {
    // Column of the key or sequence entry that owns the node.
    owner_col: Option<usize>,
    in_flow: bool,
    is_key: bool,
    // Value of a block mapping entry.
    is_value: bool,
}

pub fn load_documents(input: &str) -> Result<Vec<Document>, LoadError> {
    let run = LoaderRun::new(input);
    run.load()
}

struct LoaderRun<'a> {
    yaml_parser: YamlParser<Chars<'a>>,
    source: SourceLines<'a>,
    // Anchor names by parser anchor id.
    anchors: HashMap<usize, String>,
    // Markers of the previous and the current event.
    prev_pos: SourcePos,
    last_pos: SourcePos,
}

impl<'a> LoaderRun<'a> {
    fn new(input: &'a str) -> LoaderRun<'a> {
        LoaderRun {
            yaml_parser: YamlParser::new(input.chars()),
            source: SourceLines::new(input),
            anchors: HashMap::new(),
            prev_pos: SourcePos::default(),
            last_pos: SourcePos::default(),
        }
    }

    fn next_event(&mut self) -> Result<(Event, Marker), ScanError> {
        let (event, mark) = self.yaml_parser.next_token()?;
        self.prev_pos = self.last_pos;
        self.last_pos = SourcePos::of(&mark);
        Ok((event, mark))
    }

    fn load(mut self) -> Result<Vec<Document>, LoadError> {
        // Parse StreamStart.
        let (evt_strm_start, _) = self.next_event()?;
        assert_eq!(evt_strm_start, Event::StreamStart);

        // Parse docs.
        let mut docs: Vec<Document> = Vec::new();
        loop {
            let (event, _) = self.next_event()?;
            match event {
                Event::DocumentStart { .. } => {
                    let doc = self.load_doc(docs.len() + 1)?;
                    docs.push(doc);
                }
                Event::StreamEnd => break,
                _ => unreachable!(),
            }
        }

        // Comments after the last document.
        let trailing = self.source.take_until(self.source.len());
        if let Some(last) = docs.last_mut() {
            last.foot_comment.extend(trailing);
        }

        Ok(docs)
    }

    fn load_doc(&mut self, number: usize) -> Result<Document, LoadError> {
        let first_line = self.source.next_line();

        match self.load_root() {
            Ok(root) => {
                // Parse DocumentEnd.
                let (doc_end, end) = self.next_event()?;
                assert_eq!(doc_end, Event::DocumentEnd);

                let foot_comment = self.source.take_until(SourceLines::line_of(&end));
                Ok(Document {
                    body: DocumentBody::Tree(root),
                    foot_comment,
                })
            }
            Err(NodeError::Unsupported(feature)) => {
                warn!(document = number, "yaml {} are not supported; passing document through unchanged", feature);

                let end = self.skip_to_doc_end()?;
                let end_line = SourceLines::line_of(&end);
                let text = self.source.verbatim(first_line, end_line);
                self.source.skip_to(end_line);
                Ok(Document {
                    body: DocumentBody::Verbatim(text),
                    foot_comment: Vec::new(),
                })
            }
            Err(NodeError::Scan(err)) => Err(LoadError(err)),
        }
    }

    fn skip_to_doc_end(&mut self) -> Result<Marker, ScanError> {
        loop {
            let (event, mark) = self.next_event()?;
            if event == Event::DocumentEnd {
                return Ok(mark);
            }
        }
    }

    fn load_root(&mut self) -> Result<Node, NodeError> {
        let (event, mark) = self.next_event()?;
        let line = self.node_line(&event, &mark);
        let head_comment = self.source.take_head(line);

        let ctx = NodeContext {
            owner_col: None,
            in_flow: false,
            is_key: false,
            is_value: false,
        };
        let mut root = self.load_node(event, mark, line, ctx)?;
        root.head_comment = head_comment;
        Ok(root)
    }

    // Block scalar markers point past the body, so their line is the one
    // holding the `|` or `>` header.
    fn node_line(&self, event: &Event, mark: &Marker) -> usize {
        let line = SourceLines::line_of(mark);
        match event {
            Event::Scalar(_, TScalarStyle::Literal | TScalarStyle::Folded, _, _) => {
                self.source.find_block_scalar_header(line).unwrap_or(line)
            }
            _ => line,
        }
    }

    fn load_node(&mut self, event: Event, mark: Marker, line: usize, ctx: NodeContext) -> Result<Node, NodeError> {
        match event {
            Event::Scalar(value, style, anchor, tag) => {
                let anchor = self.anchor_name(anchor)?;
                let mut node = self.load_scalar(value, style, tag, mark, line, ctx);
                node.anchor = anchor;
                Ok(node)
            }
            Event::SequenceStart(anchor, tag) => {
                let anchor = self.anchor_name(anchor)?;
                let mut node = self.load_sequence(tag, mark, ctx)?;
                node.anchor = anchor;
                Ok(node)
            }
            Event::MappingStart(anchor, tag) => {
                let anchor = self.anchor_name(anchor)?;
                let mut node = self.load_mapping(tag, mark, ctx)?;
                node.anchor = anchor;
                Ok(node)
            }
            Event::Alias(id) => self.load_alias(id, line, ctx),
            _ => unreachable!(),
        }
    }

    // The parser only reports anchor ids; the name is read back from the
    // source between the previous event and this one.
    fn anchor_name(&mut self, anchor: usize) -> Result<Option<String>, NodeError> {
        if anchor == 0 {
            return Ok(None);
        }
        let name = self
            .source
            .find_anchor(self.prev_pos, self.last_pos)
            .ok_or(NodeError::Unsupported("anchors"))?;
        self.anchors.insert(anchor, name.clone());
        Ok(Some(name))
    }

    fn load_alias(&mut self, id: usize, line: usize, ctx: NodeContext) -> Result<Node, NodeError> {
        let name = self.anchors.get(&id).cloned().ok_or(NodeError::Unsupported("aliases"))?;
        let mut node = Node::new(NodeValue::Alias(name));
        if !ctx.in_flow && !ctx.is_key {
            node.line_comment = self.source.take_trailing(line);
        }
        Ok(node)
    }

    fn load_scalar(
        &mut self,
        value: String,
        style: TScalarStyle,
        tag: Option<EventTag>,
        mark: Marker,
        line: usize,
        ctx: NodeContext,
    ) -> Node {
        let style = match style {
            TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
            TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
            TScalarStyle::Literal => ScalarStyle::Literal,
            TScalarStyle::Folded => ScalarStyle::Folded,
            _ => ScalarStyle::Plain,
        };

        if matches!(style, ScalarStyle::Literal | ScalarStyle::Folded) {
            self.source.skip_block_scalar(line, ctx.owner_col);
        }

        // The parser reports a missing value as a plain "~" whose marker points
        // at whatever token comes next, so it owns no comment.
        let is_missing = style == ScalarStyle::Plain
            && (value.is_empty() || (value == "~" && self.source.char_at(&mark) != Some('~')));
        let text = match is_missing {
            true => String::new(),
            false => value,
        };

        let mut node = Node::new(NodeValue::Scalar(Scalar { text, style }));
        node.tag = tag.map(Self::to_tag);
        if !ctx.in_flow && !ctx.is_key && !is_missing {
            node.line_comment = self.source.take_trailing(line);
        }
        node
    }

    fn load_sequence(&mut self, tag: Option<EventTag>, mark: Marker, ctx: NodeContext) -> Result<Node, NodeError> {
        // An indentless sequence under a key starts at its first item, which
        // may itself be a flow sequence.
        let flow = self.source.char_at(&mark) == Some('[')
            && !(ctx.is_value && !ctx.in_flow && self.source.follows_entry_indicator(&mark));
        let in_flow = ctx.in_flow || flow;

        // Parse items.
        let mut items = Vec::new();
        let end = loop {
            let (event, item_mark) = self.next_event()?;
            if event == Event::SequenceEnd {
                break item_mark;
            }

            let item_line = self.node_line(&event, &item_mark);
            let (head_comment, owner_col) = match in_flow {
                true => (Vec::new(), ctx.owner_col),
                false => (self.source.take_head(item_line), Some(self.source.indent(item_line))),
            };

            let item_ctx = NodeContext {
                owner_col,
                in_flow,
                is_key: false,
                is_value: false,
            };
            let mut item = self.load_node(event, item_mark, item_line, item_ctx)?;
            item.head_comment = head_comment;
            items.push(item);
        };

        let mut node = Node::new(NodeValue::Sequence(Sequence { items, flow }));
        node.tag = tag.map(Self::to_tag);
        if flow {
            self.finish_flow(&mut node, &end, ctx);
        }
        Ok(node)
    }

    fn load_mapping(&mut self, tag: Option<EventTag>, mark: Marker, ctx: NodeContext) -> Result<Node, NodeError> {
        let flow = self.source.char_at(&mark) == Some('{');
        let in_flow = ctx.in_flow || flow;

        // Parse entries.
        let mut entries = Vec::new();
        let end = loop {
            let (event, key_mark) = self.next_event()?;
            if event == Event::MappingEnd {
                break key_mark;
            }

            let key_line = SourceLines::line_of(&key_mark);
            let (head_comment, owner_col) = match in_flow {
                true => (Vec::new(), ctx.owner_col),
                false => (self.source.take_head(key_line), Some(key_mark.col())),
            };

            let key_ctx = NodeContext {
                owner_col,
                in_flow,
                is_key: true,
                is_value: false,
            };
            let mut key = self.load_node(event, key_mark, key_line, key_ctx)?;
            key.head_comment = head_comment;

            let (event, value_mark) = self.next_event()?;
            let value_line = self.node_line(&event, &value_mark);
            let value_ctx = NodeContext {
                owner_col,
                in_flow,
                is_key: false,
                is_value: true,
            };
            let value = self.load_node(event, value_mark, value_line, value_ctx)?;

            // Left over when the value is a block collection on the next lines.
            if !in_flow {
                key.line_comment = self.source.take_trailing(key_line);
            }

            entries.push(MapEntry { key, value });
        };

        let mut node = Node::new(NodeValue::Mapping(Mapping { entries, flow }));
        node.tag = tag.map(Self::to_tag);
        if flow {
            self.finish_flow(&mut node, &end, ctx);
        }
        Ok(node)
    }

    // Comments inside a flow collection are dropped; the one after its closing
    // bracket belongs to the collection.
    fn finish_flow(&mut self, node: &mut Node, end: &Marker, ctx: NodeContext) {
        if ctx.in_flow {
            return;
        }
        let end_line = SourceLines::line_of(end);
        if !ctx.is_key {
            node.line_comment = self.source.take_trailing(end_line);
        }
        self.source.skip_to(end_line + 1);
    }

    fn to_tag(tag: EventTag) -> Tag {
        Tag::from_parts(&tag.handle, &tag.suffix)
    }
}
