// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

#[cfg(test)]
mod tests;

use thiserror::Error;

use crate::yaml_tree::{Mapping, Node};

const CORE_V1: &str = "v1";
const CLUSTER_SECRET_V1: &str = "clustersecret.io/v1";
const CLUSTER_SECRET_V2: &str = "clustersecret.io/v2";

/// Where an object keeps its secret data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    // `data` at the top level.
    Secret,
    // `data` at the top level of a legacy ClusterSecret.
    ClusterSecretV1,
    // `data` under `spec.template`.
    ClusterSecretV2,
    // `items` holding objects of the shapes above.
    List,
    Unrecognized,
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("object is a {0}, not a mapping")]
    NotAMapping(&'static str),
    #[error("field {field:?} is a {found}, not a string")]
    NotAString { field: &'static str, found: &'static str },
}

/// The identifying fields of a Kubernetes object. Missing fields read as "".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectDescriptor<'a> {
    pub api_version: &'a str,
    pub kind: &'a str,
}

impl<'a> ObjectDescriptor<'a> {
    pub fn decode(node: &'a Node) -> Result<ObjectDescriptor<'a>, DescriptorError> {
        let mapping = node.as_mapping().ok_or(DescriptorError::NotAMapping(node.type_name()))?;
        Ok(ObjectDescriptor {
            api_version: string_field(mapping, "apiVersion")?,
            kind: string_field(mapping, "kind")?,
        })
    }

    pub fn shape(&self) -> Shape {
        match (self.api_version, self.kind) {
            (CORE_V1, "Secret") => Shape::Secret,
            (CLUSTER_SECRET_V1, "ClusterSecret") => Shape::ClusterSecretV1,
            // Versions after v1 keep the data under a template.
            (_, "ClusterSecret") => Shape::ClusterSecretV2,
            (CORE_V1 | CLUSTER_SECRET_V1 | CLUSTER_SECRET_V2, "List") => Shape::List,
            _ => Shape::Unrecognized,
        }
    }
}

fn string_field<'a>(mapping: &'a Mapping, field: &'static str) -> Result<&'a str, DescriptorError> {
    let Some(entry) = mapping.entry(field) else {
        return Ok("");
    };
    entry.value.as_str().ok_or(DescriptorError::NotAString {
        field,
        found: entry.value.type_name(),
    })
}
