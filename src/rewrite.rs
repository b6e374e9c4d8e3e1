// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Rewrites Secret-like objects in place, turning base64 `data` into plaintext
// `stringData`. Failures stay local to the field or object they occur in.

#[cfg(test)]
mod tests;

use anyhow::Error;
use base64::{
    alphabet,
    engine::{general_purpose, GeneralPurpose},
    Engine as _,
};
use tracing::{debug, warn};

use crate::{
    node_path::{NodePath, NodePathParser},
    shape::{ObjectDescriptor, Shape},
    yaml_tree::{MapEntry, Node, Tag},
};

const STRING_DATA_KEY: &str = "stringData";
const ITEMS_KEY: &str = "items";

// Standard alphabet and padding. Non-zero bits left over after the last
// character are ignored.
const DECODER: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, general_purpose::PAD.with_decode_allow_trailing_bits(true));

pub struct SecretRewriter {
    data_path: NodePath,
    template_path: NodePath,
}

impl SecretRewriter {
    pub fn new() -> Result<SecretRewriter, Error> {
        let parser = NodePathParser::new();
        Ok(SecretRewriter {
            data_path: parser.parse(".data")?,
            template_path: parser.parse(".spec.template")?,
        })
    }

    /// Classifies `root` and rewrites it in place. Returns the shape it was handled as.
    pub fn rewrite(&self, root: &mut Node) -> Shape {
        let shape = Self::classify(root);
        match shape {
            Shape::List => self.rewrite_list(root),
            Shape::Secret | Shape::ClusterSecretV1 => self.rewrite_secret(root),
            Shape::ClusterSecretV2 => self.rewrite_cluster_secret_v2(root),
            Shape::Unrecognized => {}
        }
        shape
    }

    fn classify(node: &Node) -> Shape {
        match ObjectDescriptor::decode(node) {
            Ok(descriptor) => descriptor.shape(),
            Err(err) => {
                warn!("error decoding YAML: {}", err);
                Shape::Unrecognized
            }
        }
    }

    fn rewrite_list(&self, node: &mut Node) {
        let Some(items) = node.get_mut(ITEMS_KEY).and_then(Node::as_sequence_mut) else {
            return;
        };

        for (index, item) in items.items.iter_mut().enumerate() {
            match Self::classify(item) {
                Shape::Secret | Shape::ClusterSecretV1 => self.rewrite_secret(item),
                Shape::ClusterSecretV2 => self.rewrite_cluster_secret_v2(item),
                Shape::List => debug!(item = index, "nested lists are not supported; skipping item"),
                Shape::Unrecognized => {}
            }
        }
    }

    fn rewrite_secret(&self, node: &mut Node) {
        let Some(entry) = self.data_path.resolve_entry_mut(node) else {
            return;
        };
        if entry.value.as_mapping().is_none() {
            debug!("{} is a {}, not a mapping; skipping", self.data_path, entry.value.type_name());
            return;
        }
        decode_data_entry(entry);
    }

    fn rewrite_cluster_secret_v2(&self, node: &mut Node) {
        match self.template_path.resolve_mut(node) {
            Some(template) => self.rewrite_secret(template),
            None => debug!("no {} found; skipping", self.template_path),
        }
    }
}

fn decode_data_entry(entry: &mut MapEntry) {
    if let Some(key) = entry.key.as_scalar_mut() {
        key.text = STRING_DATA_KEY.to_string();
    }

    let Some(data) = entry.value.as_mapping_mut() else {
        return;
    };
    for field in &mut data.entries {
        decode_field(field);
    }
}

fn decode_field(field: &mut MapEntry) {
    let name = field.key.as_str().unwrap_or_default().to_string();
    let Some(value) = field.value.as_scalar_mut() else {
        debug!(key = %name, "value is not a scalar; leaving it as is");
        return;
    };

    // Line breaks are allowed inside encoded values.
    let encoded: String = value.text.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    let decoded = match DECODER.decode(encoded) {
        Ok(decoded) => decoded,
        Err(err) => {
            debug!(key = %name, "base64 decode error: {}", err);
            annotate(&mut field.key, format!("key {:?}: base64 decode error: {}", name, err));
            value.set_string(String::new());
            return;
        }
    };

    match String::from_utf8(decoded) {
        Ok(text) => value.set_string(text),
        Err(_) => {
            // Keep the base64 text, which is how YAML spells binary data.
            debug!(key = %name, "decoded value is not valid UTF-8");
            annotate(&mut field.key, format!("key {:?}: value contains invalid UTF-8 characters", name));
            field.value.tag = Some(Tag::binary());
        }
    }
}

fn annotate(node: &mut Node, message: String) {
    node.head_comment.push(format!("# {}", message));
}
