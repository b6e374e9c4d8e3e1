use crate::yaml_tree::{emit_documents_to_string, load_documents, DocumentBody};

use super::*;

fn rewrite_str(input: &str) -> (Vec<Shape>, String) {
    let rewriter = SecretRewriter::new().unwrap();
    let mut docs = load_documents(input).unwrap();
    let mut shapes = Vec::new();
    for doc in &mut docs {
        if let DocumentBody::Tree(root) = &mut doc.body {
            shapes.push(rewriter.rewrite(root));
        }
    }
    (shapes, emit_documents_to_string(&docs))
}

#[test]
fn decode_error_blanks_value() {
    let input = "apiVersion: v1\nkind: Secret\ndata:\n  token: not-base64!\n";
    let (shapes, output) = rewrite_str(input);

    assert_eq!(shapes, vec![Shape::Secret]);
    assert!(output.contains("stringData:\n"));
    assert!(output.contains("  # key \"token\": base64 decode error: "));
    assert!(output.contains("  token: \"\"\n"));
}

#[test]
fn invalid_utf8_is_tagged_binary() {
    let input = "apiVersion: v1\nkind: Secret\ndata:\n  raw: //4=\n";
    let (_, output) = rewrite_str(input);

    assert!(output.contains("  # key \"raw\": value contains invalid UTF-8 characters\n"));
    assert!(output.contains("  raw: !!binary //4=\n"));
}

#[test]
fn line_breaks_in_encoded_value_are_ignored() {
    let input = "apiVersion: v1\nkind: Secret\ndata:\n  long: \"aGVs\\nbG8=\"\n";
    let (_, output) = rewrite_str(input);

    assert!(output.contains("  long: \"hello\"\n"));
}

#[test]
fn unknown_cluster_secret_version_uses_template() {
    let input = "\
apiVersion: clustersecret.io/v3
kind: ClusterSecret
data:
  top: dG9w
spec:
  template:
    data:
      nested: bmVzdGVk
";
    let (shapes, output) = rewrite_str(input);

    assert_eq!(shapes, vec![Shape::ClusterSecretV2]);
    assert!(output.contains("data:\n  top: dG9w\n"));
    assert!(output.contains("    stringData:\n      nested: nested\n"));
}

#[test]
fn cluster_secret_v1_uses_top_level_data() {
    let input = "\
apiVersion: clustersecret.io/v1
kind: ClusterSecret
data:
  top: dG9w
spec:
  template:
    data:
      nested: bmVzdGVk
";
    let (shapes, output) = rewrite_str(input);

    assert_eq!(shapes, vec![Shape::ClusterSecretV1]);
    assert!(output.contains("stringData:\n  top: top\n"));
    assert!(output.contains("    data:\n      nested: bmVzdGVk\n"));
}

#[test]
fn non_mapping_data_is_untouched() {
    let input = "apiVersion: v1\nkind: Secret\ndata:\n  - dXNlcg==\n";
    let (shapes, output) = rewrite_str(input);

    assert_eq!(shapes, vec![Shape::Secret]);
    assert_eq!(output, "apiVersion: v1\nkind: Secret\ndata:\n  - dXNlcg==\n");
}

#[test]
fn missing_template_is_untouched() {
    let input = "apiVersion: clustersecret.io/v2\nkind: ClusterSecret\nspec:\n  other: 1\n";
    let (shapes, output) = rewrite_str(input);

    assert_eq!(shapes, vec![Shape::ClusterSecretV2]);
    assert_eq!(output, input);
}

#[test]
fn non_string_kind_is_unrecognized() {
    let input = "apiVersion: v1\nkind: [Secret]\ndata:\n  user: dXNlcg==\n";
    let (shapes, output) = rewrite_str(input);

    assert_eq!(shapes, vec![Shape::Unrecognized]);
    assert_eq!(output, input);
}

#[test]
fn list_with_unknown_api_version_is_untouched() {
    let input = "\
apiVersion: example.com/v1
kind: List
items:
  - apiVersion: v1
    kind: Secret
    data:
      user: dXNlcg==
";
    let (shapes, output) = rewrite_str(input);

    assert_eq!(shapes, vec![Shape::Unrecognized]);
    assert_eq!(output, input);
}

#[test]
fn nested_list_is_skipped() {
    let input = "\
apiVersion: v1
kind: List
items:
  - apiVersion: v1
    kind: List
    items:
      - apiVersion: v1
        kind: Secret
        data:
          user: dXNlcg==
  - apiVersion: clustersecret.io/v2
    kind: ClusterSecret
    spec:
      template:
        data:
          user: dXNlcg==
";
    let (shapes, output) = rewrite_str(input);

    assert_eq!(shapes, vec![Shape::List]);
    assert!(output.contains("        data:\n          user: dXNlcg==\n"));
    assert!(output.contains("        stringData:\n          user: user\n"));
}

#[test]
fn non_scalar_field_is_left_alone() {
    let input = "apiVersion: v1\nkind: Secret\ndata:\n  nested:\n    inner: dXNlcg==\n  user: dXNlcg==\n";
    let (_, output) = rewrite_str(input);

    assert_eq!(
        output,
        "apiVersion: v1\nkind: Secret\nstringData:\n  nested:\n    inner: dXNlcg==\n  user: user\n"
    );
}

#[test]
fn trailing_bits_are_ignored() {
    // "YQ==" is the canonical encoding of "a"; "YR==" differs only in the unused low bits.
    let input = "apiVersion: v1\nkind: Secret\ndata:\n  loose: YR==\n  exact: YQ==\n";
    let (_, output) = rewrite_str(input);

    assert!(output.contains("  loose: a\n"), "{}", output);
    assert!(output.contains("  exact: a\n"), "{}", output);
    assert!(!output.contains("base64 decode error"));
}
