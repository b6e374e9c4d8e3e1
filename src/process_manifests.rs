// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

#[cfg(test)]
mod tests;

use anyhow::{Context, Error};
use tracing::debug;

use crate::{
    rewrite::SecretRewriter,
    yaml_tree::{emit_documents_to_string, load_documents, Document, DocumentBody, Node},
};

pub fn process_manifests_str(input: &str) -> Result<String, Error> {
    let docs = process_manifests(input)?;
    let out_str = emit_documents_to_string(&docs);
    Ok(out_str)
}

pub fn process_manifests(input: &str) -> Result<Vec<Document>, Error> {
    let mut docs = load_documents(input).context("error parsing input")?;

    let rewriter = SecretRewriter::new()?;
    for (index, doc) in docs.iter_mut().enumerate() {
        if let DocumentBody::Tree(root) = &mut doc.body {
            let shape = rewriter.rewrite(root);
            debug!(document = index + 1, name = object_name(root), "handled as {:?}", shape);
        }
    }

    Ok(docs)
}

fn object_name(root: &Node) -> &str {
    root.get("metadata").and_then(|metadata| metadata.get("name")).and_then(Node::as_str).unwrap_or_default()
}
