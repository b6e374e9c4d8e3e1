use crate::yaml_tree::{load_documents, DocumentBody, Node};

use super::*;

fn load_root(input: &str) -> Node {
    let mut docs = load_documents(input).unwrap();
    match docs.remove(0).body {
        DocumentBody::Tree(root) => root,
        DocumentBody::Verbatim(text) => panic!("unexpected verbatim document: {}", text),
    }
}

fn shape_of(input: &str) -> Shape {
    let root = load_root(input);
    ObjectDescriptor::decode(&root).unwrap().shape()
}

#[test]
fn classify_known_shapes() {
    assert_eq!(shape_of("apiVersion: v1\nkind: Secret\n"), Shape::Secret);
    assert_eq!(shape_of("apiVersion: clustersecret.io/v1\nkind: ClusterSecret\n"), Shape::ClusterSecretV1);
    assert_eq!(shape_of("apiVersion: clustersecret.io/v2\nkind: ClusterSecret\n"), Shape::ClusterSecretV2);
    assert_eq!(shape_of("apiVersion: v1\nkind: List\n"), Shape::List);
    assert_eq!(shape_of("apiVersion: clustersecret.io/v1\nkind: List\n"), Shape::List);
    assert_eq!(shape_of("apiVersion: clustersecret.io/v2\nkind: List\n"), Shape::List);
}

#[test]
fn classify_future_cluster_secret_as_v2() {
    assert_eq!(shape_of("apiVersion: clustersecret.io/v3\nkind: ClusterSecret\n"), Shape::ClusterSecretV2);
    assert_eq!(shape_of("kind: ClusterSecret\n"), Shape::ClusterSecretV2);
}

#[test]
fn classify_unrecognized() {
    assert_eq!(shape_of("apiVersion: v2\nkind: Secret\n"), Shape::Unrecognized);
    assert_eq!(shape_of("apiVersion: apps/v1\nkind: List\n"), Shape::Unrecognized);
    assert_eq!(shape_of("apiVersion: v1\nkind: ConfigMap\n"), Shape::Unrecognized);
    assert_eq!(shape_of("metadata:\n  name: empty\n"), Shape::Unrecognized);
}

#[test]
fn missing_fields_decode_as_empty() {
    let root = load_root("metadata:\n  name: empty\n");
    let descriptor = ObjectDescriptor::decode(&root).unwrap();
    assert_eq!(descriptor, ObjectDescriptor { api_version: "", kind: "" });
}

#[test]
fn decode_rejects_non_mapping() {
    let root = load_root("- apiVersion: v1\n");
    let err = ObjectDescriptor::decode(&root).unwrap_err();
    assert_eq!(err.to_string(), "object is a sequence, not a mapping");
}

#[test]
fn decode_rejects_non_string_field() {
    let root = load_root("apiVersion: v1\nkind:\n  name: Secret\n");
    let err = ObjectDescriptor::decode(&root).unwrap_err();
    assert_eq!(err.to_string(), "field \"kind\" is a mapping, not a string");
}
