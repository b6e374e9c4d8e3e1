// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

#[cfg(test)]
mod tests;

use std::fmt;

use anyhow::{anyhow, Error};
use chumsky::prelude::*;
use tracing::debug;

use crate::yaml_tree::{MapEntry, Node};

/// Location of a node below a mapping root, written as `.spec.template` or
/// `."some key".child`.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    pub fn resolve_mut<'a>(&self, root: &'a mut Node) -> Option<&'a mut Node> {
        self.segments.iter().try_fold(root, |node, segment| node.get_mut(segment))
    }

    /// The key and value of the path's last segment, so the key can be renamed in place.
    pub fn resolve_entry_mut<'a>(&self, root: &'a mut Node) -> Option<&'a mut MapEntry> {
        let (last, parents) = self.segments.split_last()?;
        let parent = parents.iter().try_fold(root, |node, segment| node.get_mut(segment))?;
        parent.entry_mut(last)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for segment in &self.segments {
            if is_bare_segment(segment) {
                write!(f, ".{}", segment)?;
            } else {
                write!(f, ".{:?}", segment)?;
            }
        }
        Ok(())
    }
}

pub struct NodePathParser {
    parser: Box<dyn Parser<char, Vec<String>, Error = Simple<char>>>,
}

impl NodePathParser {
    pub fn new() -> NodePathParser {
        let parser = gen_node_path_parser();
        NodePathParser {
            parser: Box::new(parser),
        }
    }

    pub fn parse(&self, path_str: &str) -> Result<NodePath, Error> {
        match self.parser.parse(path_str) {
            Ok(segments) => Ok(NodePath { segments }),
            Err(errs) => {
                for err in &errs {
                    debug!("path parse error: {}", err);
                }
                Err(anyhow!("invalid node path {:?} (errors={})", path_str, errs.len()))
            }
        }
    }
}

fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_bare_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(is_bare_char)
}

fn gen_node_path_parser() -> impl Parser<char, Vec<String>, Error = Simple<char>> {
    let escape = just('\\').ignore_then(just('\\').or(just('"')));

    let quoted = just('"')
        .ignore_then(filter(|c: &char| *c != '\\' && *c != '"').or(escape).repeated())
        .then_ignore(just('"'))
        .collect::<String>()
        .labelled("quoted key");

    let bare = filter(|c: &char| is_bare_char(*c))
        .repeated()
        .at_least(1)
        .collect::<String>()
        .labelled("key");

    let segment = just('.').ignore_then(quoted.or(bare));

    segment.repeated().at_least(1).then_ignore(end())
}
