// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Comment-preserving YAML syntax tree. Every node is owned by its parent, so a
// document can be rewritten in place without losing its comments or tags.

mod emitter;
mod loader;
mod source_lines;


pub use emitter::emit_documents_to_string;
pub use loader::load_documents;

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub body: DocumentBody,
    // Comments after the document's last node.
    pub foot_comment: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DocumentBody {
    Tree(Node),
    // Source text of a document the tree cannot carry. Emitted unchanged.
    Verbatim(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub value: NodeValue,
    pub anchor: Option<String>,
    pub tag: Option<Tag>,
    // Whole-line comments above the node, each including its leading '#'.
    pub head_comment: Vec<String>,
    // Comment at the end of the node's line.
    pub line_comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeValue {
    Scalar(Scalar),
    Sequence(Sequence),
    Mapping(Mapping),
    // `*name`, referring to the node anchored as `&name`.
    Alias(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scalar {
    pub text: String,
    pub style: ScalarStyle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    pub items: Vec<Node>,
    pub flow: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mapping {
    pub entries: Vec<MapEntry>,
    pub flow: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapEntry {
    pub key: Node,
    pub value: Node,
}

/// A node tag in its shorthand form, e.g. `!!binary` or `!custom`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag(String);

impl Node {
    pub fn new(value: NodeValue) -> Node {
        Node {
            value,
            anchor: None,
            tag: None,
            head_comment: Vec::new(),
            line_comment: None,
        }
    }

    /// Text of a scalar node.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            NodeValue::Scalar(scalar) => Some(&scalar.text),
            _ => None,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Option<&mut Scalar> {
        match &mut self.value {
            NodeValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match &self.value {
            NodeValue::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match &mut self.value {
            NodeValue::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Sequence> {
        match &mut self.value {
            NodeValue::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    /// Value stored under `key` when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?.entry(key).map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entry_mut(key).map(|entry| &mut entry.value)
    }

    pub fn entry_mut(&mut self, key: &str) -> Option<&mut MapEntry> {
        self.as_mapping_mut()?.entry_mut(key)
    }

    pub fn type_name(&self) -> &'static str {
        match &self.value {
            NodeValue::Scalar(_) => "scalar",
            NodeValue::Sequence(_) => "sequence",
            NodeValue::Mapping(_) => "mapping",
            NodeValue::Alias(_) => "alias",
        }
    }
}

impl Mapping {
    // The first entry wins when a key is repeated.
    pub fn entry(&self, key: &str) -> Option<&MapEntry> {
        self.entries.iter().find(|entry| entry.key.as_str() == Some(key))
    }

    pub fn entry_mut(&mut self, key: &str) -> Option<&mut MapEntry> {
        self.entries.iter_mut().find(|entry| entry.key.as_str() == Some(key))
    }
}

impl Scalar {
    /// Replaces the text with a string value. A plain scalar whose new text
    /// would read back as a number, bool or null switches to double quotes.
    pub fn set_string(&mut self, text: String) {
        if self.style == ScalarStyle::Plain && !plain_resolves_to_string(&text) {
            self.style = ScalarStyle::DoubleQuoted;
        }
        self.text = text;
    }
}

impl Tag {
    pub fn binary() -> Tag {
        Tag("!!binary".to_string())
    }

    /// Builds the shorthand form from a parsed tag handle and suffix.
    pub fn from_parts(handle: &str, suffix: &str) -> Tag {
        match handle {
            "!!" | "tag:yaml.org,2002:" => Tag(format!("!!{}", suffix)),
            "" => Tag(format!("!<{}>", suffix)),
            handle if handle.starts_with('!') && handle.ends_with('!') => Tag(format!("{}{}", handle, suffix)),
            handle => Tag(format!("!<{}{}>", handle, suffix)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn plain_resolves_to_string(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    let keyword = matches!(
        lower.as_str(),
        "" | "~"
            | "null"
            | "true"
            | "false"
            | "yes"
            | "no"
            | "on"
            | "off"
            | "y"
            | "n"
            | ".inf"
            | "+.inf"
            | "-.inf"
            | ".nan"
    );
    if keyword {
        return false;
    }

    // Integers, floats, and the "1_000" digit grouping of YAML 1.1.
    let unsigned = lower.trim_start_matches(['+', '-']);
    if text.parse::<f64>().is_ok()
        || (unsigned.chars().any(|c| c.is_ascii_digit()) && unsigned.chars().all(|c| c.is_ascii_digit() || c == '_'))
    {
        return false;
    }

    let radix_digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0o"))
        .or_else(|| unsigned.strip_prefix("0b"));
    if let Some(digits) = radix_digits {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit() || c == '_') {
            return false;
        }
    }

    true
}
