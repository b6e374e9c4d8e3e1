// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Block-style YAML writer with two-space indentation. Scalars keep the style
// they were loaded with unless that style cannot represent their text.

use super::{Document, DocumentBody, Mapping, Node, NodeValue, Scalar, ScalarStyle, Sequence};

const INDENT: usize = 2;

pub fn emit_documents_to_string(docs: &[Document]) -> String {
    let mut emitter = Emitter::default();
    for (index, doc) in docs.iter().enumerate() {
        if index > 0 {
            emitter.out.push_str("---\n");
        }
        emitter.emit_document(doc);
    }
    emitter.out
}

#[derive(Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn emit_document(&mut self, doc: &Document) {
        match &doc.body {
            DocumentBody::Tree(root) => {
                self.write_leading_comments(root, 0);
                self.emit_root(root);
            }
            DocumentBody::Verbatim(text) => {
                self.out.push_str(text);
                self.out.push('\n');
            }
        }
        self.write_comments(&doc.foot_comment, 0);
    }

    fn emit_root(&mut self, root: &Node) {
        if is_block_collection(root) {
            if let Some(props) = properties(root) {
                self.out.push_str(&props);
                self.out.push('\n');
                self.emit_block_collection(root, 0, false);
            } else {
                self.emit_block_collection(root, 0, true);
            }
            return;
        }

        // A document holding only a missing value.
        if is_missing(root) {
            self.out.push_str("null");
            self.end_line(root.line_comment.as_deref());
            return;
        }

        self.emit_inline_value(root, 0, root.line_comment.as_deref());
    }

    // With `leading_written`, the comments above the first entry have already
    // been written by the caller, which owns the current line.
    fn emit_block_collection(&mut self, node: &Node, indent: usize, leading_written: bool) {
        match &node.value {
            NodeValue::Mapping(mapping) => self.emit_block_mapping(mapping, indent, leading_written, false),
            NodeValue::Sequence(sequence) => self.emit_block_sequence(sequence, indent, leading_written, false),
            NodeValue::Scalar(_) | NodeValue::Alias(_) => unreachable!(),
        }
    }

    // With `first_inline`, the first entry continues the caller's line after "- ".
    fn emit_block_mapping(&mut self, mapping: &Mapping, indent: usize, leading_written: bool, first_inline: bool) {
        for (index, entry) in mapping.entries.iter().enumerate() {
            let first = index == 0;
            if !(first && leading_written) {
                self.write_comments(&entry.key.head_comment, indent);
                self.write_flow_comments(&entry.value, indent);
            }
            if !(first && first_inline) {
                self.write_indent(indent);
            }

            self.write_key(&entry.key);
            self.out.push(':');
            self.emit_mapping_value(&entry.key, &entry.value, indent);
        }
    }

    fn emit_mapping_value(&mut self, key: &Node, value: &Node, indent: usize) {
        if is_block_collection(value) {
            if let Some(props) = properties(value) {
                self.out.push(' ');
                self.out.push_str(&props);
            }
            self.end_line(key.line_comment.as_deref());
            self.write_comments(&value.head_comment, indent + INDENT);
            self.emit_block_collection(value, indent + INDENT, false);
            return;
        }

        let comment = value.line_comment.as_deref().or(key.line_comment.as_deref());
        if is_missing(value) {
            self.end_line(comment);
            return;
        }

        self.out.push(' ');
        self.emit_inline_value(value, indent, comment);
    }

    fn emit_block_sequence(&mut self, sequence: &Sequence, indent: usize, leading_written: bool, first_inline: bool) {
        for (index, item) in sequence.items.iter().enumerate() {
            let first = index == 0;
            if !(first && leading_written) {
                self.write_leading_comments(item, indent);
            }
            if !(first && first_inline) {
                self.write_indent(indent);
            }

            self.out.push('-');
            self.emit_sequence_item(item, indent);
        }
    }

    fn emit_sequence_item(&mut self, item: &Node, indent: usize) {
        if is_block_collection(item) {
            match properties(item) {
                Some(props) => {
                    self.out.push(' ');
                    self.out.push_str(&props);
                    self.end_line(item.line_comment.as_deref());
                    self.emit_block_collection(item, indent + INDENT, false);
                }
                None => {
                    // The first entry shares the "- " line.
                    self.out.push(' ');
                    match &item.value {
                        NodeValue::Mapping(mapping) => self.emit_block_mapping(mapping, indent + INDENT, true, true),
                        NodeValue::Sequence(sequence) => {
                            self.emit_block_sequence(sequence, indent + INDENT, true, true)
                        }
                        NodeValue::Scalar(_) | NodeValue::Alias(_) => unreachable!(),
                    }
                }
            }
            return;
        }

        if is_missing(item) {
            self.end_line(item.line_comment.as_deref());
            return;
        }

        self.out.push(' ');
        self.emit_inline_value(item, indent, item.line_comment.as_deref());
    }

    // Writes a scalar or flow collection followed by the line comment and a
    // line break. Block scalar bodies go one level below `indent`.
    fn emit_inline_value(&mut self, node: &Node, indent: usize, comment: Option<&str>) {
        if let Some(props) = properties(node) {
            self.out.push_str(&props);
            // A tagged or anchored empty value has nothing after its properties.
            if is_empty_plain(node) {
                self.end_line(comment);
                return;
            }
            self.out.push(' ');
        }

        match &node.value {
            NodeValue::Scalar(scalar) => match choose_style(scalar, true, false) {
                ScalarStyle::Literal | ScalarStyle::Folded => self.write_literal(&scalar.text, indent, comment),
                style => {
                    self.write_scalar(&scalar.text, style);
                    self.end_line(comment);
                }
            },
            NodeValue::Sequence(_) | NodeValue::Mapping(_) => {
                self.write_flow_body(node);
                self.end_line(comment);
            }
            NodeValue::Alias(name) => {
                self.write_alias(name);
                self.end_line(comment);
            }
        }
    }

    fn write_key(&mut self, key: &Node) {
        match &key.value {
            NodeValue::Scalar(scalar) => {
                if let Some(props) = properties(key) {
                    self.out.push_str(&props);
                    self.out.push(' ');
                }
                let style = choose_style(scalar, false, false);
                self.write_scalar(&scalar.text, style);
            }
            NodeValue::Alias(name) => {
                // The ':' would otherwise be read as part of the alias name.
                self.write_alias(name);
                self.out.push(' ');
            }
            NodeValue::Sequence(_) | NodeValue::Mapping(_) => self.write_flow(key),
        }
    }

    fn write_flow(&mut self, node: &Node) {
        if let Some(props) = properties(node) {
            self.out.push_str(&props);
            self.out.push(' ');
        }
        self.write_flow_body(node);
    }

    fn write_flow_body(&mut self, node: &Node) {
        match &node.value {
            NodeValue::Scalar(scalar) => {
                if is_missing(node) {
                    self.out.push_str("null");
                    return;
                }
                let style = choose_style(scalar, false, true);
                self.write_scalar(&scalar.text, style);
            }
            NodeValue::Sequence(sequence) => {
                self.out.push('[');
                for (index, item) in sequence.items.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str(", ");
                    }
                    self.write_flow(item);
                }
                self.out.push(']');
            }
            NodeValue::Mapping(mapping) => {
                self.out.push('{');
                for (index, entry) in mapping.entries.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str(", ");
                    }
                    self.write_flow(&entry.key);
                    if matches!(entry.key.value, NodeValue::Alias(_)) {
                        self.out.push(' ');
                    }
                    self.out.push_str(": ");
                    self.write_flow(&entry.value);
                }
                self.out.push('}');
            }
            NodeValue::Alias(name) => self.write_alias(name),
        }
    }

    fn write_alias(&mut self, name: &str) {
        self.out.push('*');
        self.out.push_str(name);
    }

    fn write_scalar(&mut self, text: &str, style: ScalarStyle) {
        match style {
            ScalarStyle::Plain => self.out.push_str(text),
            ScalarStyle::SingleQuoted => {
                self.out.push('\'');
                self.out.push_str(&text.replace('\'', "''"));
                self.out.push('\'');
            }
            ScalarStyle::DoubleQuoted | ScalarStyle::Literal | ScalarStyle::Folded => self.write_double_quoted(text),
        }
    }

    fn write_double_quoted(&mut self, text: &str) {
        self.out.push('"');
        for c in text.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\t' => self.out.push_str("\\t"),
                '\r' => self.out.push_str("\\r"),
                '\0' => self.out.push_str("\\0"),
                c if c.is_control() || c == '\u{feff}' => {
                    let code = u32::from(c);
                    if code <= 0xFFFF {
                        self.out.push_str(&format!("\\u{:04X}", code));
                    } else {
                        self.out.push_str(&format!("\\U{:08X}", code));
                    }
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn write_literal(&mut self, text: &str, indent: usize, comment: Option<&str>) {
        let (header, body) = match text.strip_suffix('\n') {
            Some(clipped) if clipped.ends_with('\n') => ("|+", clipped),
            Some(clipped) => ("|", clipped),
            None => ("|-", text),
        };

        self.out.push_str(header);
        self.end_line(comment);
        for line in body.split('\n') {
            if !line.is_empty() {
                self.write_indent(indent + INDENT);
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
    }

    fn write_leading_comments(&mut self, node: &Node, indent: usize) {
        self.write_comments(&node.head_comment, indent);
        self.write_flow_comments(node, indent);
        if properties(node).is_some() {
            return;
        }
        match &node.value {
            NodeValue::Mapping(mapping) if !mapping.flow => {
                if let Some(first) = mapping.entries.first() {
                    self.write_comments(&first.key.head_comment, indent);
                    self.write_flow_comments(&first.value, indent);
                }
            }
            NodeValue::Sequence(sequence) if !sequence.flow => {
                if let Some(first) = sequence.items.first() {
                    self.write_leading_comments(first, indent);
                }
            }
            _ => {}
        }
    }

    // Flow collections have no room for comments, so the ones attached to their
    // children are lifted above the line that holds the collection.
    fn write_flow_comments(&mut self, node: &Node, indent: usize) {
        let mut comments = Vec::new();
        collect_flow_comments(node, &mut comments);
        for comment in comments {
            self.write_indent(indent);
            self.out.push_str(comment);
            self.out.push('\n');
        }
    }

    fn write_comments(&mut self, comments: &[String], indent: usize) {
        for comment in comments {
            self.write_indent(indent);
            self.out.push_str(comment);
            self.out.push('\n');
        }
    }

    fn end_line(&mut self, comment: Option<&str>) {
        if let Some(comment) = comment {
            self.out.push(' ');
            self.out.push_str(comment);
        }
        self.out.push('\n');
    }

    fn write_indent(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat(' ').take(indent));
    }
}

fn collect_flow_comments<'a>(node: &'a Node, comments: &mut Vec<&'a str>) {
    match &node.value {
        NodeValue::Mapping(mapping) if mapping.flow => {
            for entry in &mapping.entries {
                comments.extend(entry.key.head_comment.iter().map(String::as_str));
                comments.extend(entry.value.head_comment.iter().map(String::as_str));
                collect_flow_comments(&entry.value, comments);
            }
        }
        NodeValue::Sequence(sequence) if sequence.flow => {
            for item in &sequence.items {
                comments.extend(item.head_comment.iter().map(String::as_str));
                collect_flow_comments(item, comments);
            }
        }
        _ => {}
    }
}

fn is_block_collection(node: &Node) -> bool {
    match &node.value {
        NodeValue::Mapping(mapping) => !mapping.flow && !mapping.entries.is_empty(),
        NodeValue::Sequence(sequence) => !sequence.flow && !sequence.items.is_empty(),
        NodeValue::Scalar(_) | NodeValue::Alias(_) => false,
    }
}

// Anchor and tag, as written before the node's content.
fn properties(node: &Node) -> Option<String> {
    match (&node.anchor, &node.tag) {
        (None, None) => None,
        (Some(anchor), None) => Some(format!("&{}", anchor)),
        (None, Some(tag)) => Some(tag.as_str().to_string()),
        (Some(anchor), Some(tag)) => Some(format!("&{} {}", anchor, tag.as_str())),
    }
}

fn is_empty_plain(node: &Node) -> bool {
    match &node.value {
        NodeValue::Scalar(scalar) => scalar.style == ScalarStyle::Plain && scalar.text.is_empty(),
        _ => false,
    }
}

// An empty plain scalar without properties is written as nothing at all.
fn is_missing(node: &Node) -> bool {
    properties(node).is_none() && is_empty_plain(node)
}

fn choose_style(scalar: &Scalar, allow_block: bool, in_flow: bool) -> ScalarStyle {
    let text = scalar.text.as_str();
    match scalar.style {
        ScalarStyle::Plain if is_plain_safe(text, in_flow) => ScalarStyle::Plain,
        ScalarStyle::SingleQuoted if is_single_quote_safe(text) => ScalarStyle::SingleQuoted,
        ScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        ScalarStyle::Literal | ScalarStyle::Folded if allow_block && is_literal_safe(text) => ScalarStyle::Literal,
        _ if allow_block && text.contains('\n') && is_literal_safe(text) => ScalarStyle::Literal,
        _ => ScalarStyle::DoubleQuoted,
    }
}

fn is_plain_safe(text: &str, in_flow: bool) -> bool {
    let mut chars = text.chars();
    let (Some(first), second) = (chars.next(), chars.next()) else {
        return false;
    };

    if text.starts_with([' ', '\t']) || text.ends_with([' ', '\t']) || text.chars().any(char::is_control) {
        return false;
    }

    match first {
        ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`' => {
            return false
        }
        // Indicators only when followed by a space or nothing.
        '-' | '?' | ':' if second.map_or(true, |c| c == ' ') => return false,
        _ => {}
    }

    if text.contains(": ") || text.contains(" #") || text.ends_with(':') {
        return false;
    }
    if in_flow && text.contains(|c| matches!(c, ',' | '[' | ']' | '{' | '}')) {
        return false;
    }
    if text.starts_with("---") || text.starts_with("...") {
        return false;
    }
    true
}

fn is_single_quote_safe(text: &str) -> bool {
    !text.chars().any(char::is_control)
}

fn is_literal_safe(text: &str) -> bool {
    if text.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return false;
    }
    // The first content line sets the indentation, so it cannot start with a space.
    text.split('\n')
        .find(|line| !line.is_empty())
        .is_some_and(|line| !line.starts_with([' ', '\t']))
}
