use crate::yaml_tree::{load_documents, DocumentBody, Node};

use super::*;

fn load_root(input: &str) -> Node {
    let mut docs = load_documents(input).unwrap();
    match docs.remove(0).body {
        DocumentBody::Tree(root) => root,
        DocumentBody::Verbatim(text) => panic!("unexpected verbatim document: {}", text),
    }
}

#[test]
fn parse_bare_segments() {
    let parser = NodePathParser::new();
    let path = parser.parse(".spec.template").unwrap();
    assert_eq!(path.segments, vec!["spec", "template"]);
    assert_eq!(path.to_string(), ".spec.template");
}

#[test]
fn parse_quoted_segments() {
    let parser = NodePathParser::new();
    let path = parser.parse(r#".metadata."app.kubernetes.io/name"."say \"hi\" \\ bye""#).unwrap();
    assert_eq!(path.segments, vec!["metadata", "app.kubernetes.io/name", r#"say "hi" \ bye"#]);
    assert_eq!(path.to_string(), r#".metadata."app.kubernetes.io/name"."say \"hi\" \\ bye""#);
}

#[test]
fn parse_invalid_paths() {
    let parser = NodePathParser::new();
    for path in ["", "spec", ".", ".spec.", ".a b", ".\"open"] {
        let err = parser.parse(path).unwrap_err();
        assert!(err.to_string().starts_with("invalid node path"), "{}: {}", path, err);
    }
}

#[test]
fn resolve_nested_node() {
    let parser = NodePathParser::new();
    let path = parser.parse(".spec.template").unwrap();
    let mut root = load_root("spec:\n  template:\n    data: {}\n");

    let template = path.resolve_mut(&mut root).unwrap();
    assert!(template.get("data").is_some());
}

#[test]
fn resolve_missing_segment() {
    let parser = NodePathParser::new();
    let path = parser.parse(".spec.template").unwrap();

    let mut root = load_root("spec:\n  other: 1\n");
    assert!(path.resolve_mut(&mut root).is_none());

    let mut root = load_root("spec: scalar\n");
    assert!(path.resolve_mut(&mut root).is_none());
}

#[test]
fn resolve_entry_allows_key_rename() {
    let parser = NodePathParser::new();
    let path = parser.parse(".data").unwrap();
    let mut root = load_root("data:\n  a: b\n");

    let entry = path.resolve_entry_mut(&mut root).unwrap();
    entry.key.as_scalar_mut().unwrap().text = "renamed".to_string();

    assert!(root.get("data").is_none());
    assert!(root.get("renamed").is_some());
}
