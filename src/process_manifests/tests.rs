use std::{fs, path::Path};

use super::*;

macro_rules! testlist {
    ($($name:ident,)*) => {
    $(
        #[test]
        fn $name() {
            run_test(stringify!($name))
        }
    )*
    }
}

testlist! {
    anchored_documents,
    anchored_secret,
    cluster_secret_v1,
    cluster_secret_v2,
    empty_input,
    list_of_secrets,
    non_mapping_documents,
    secret_invalid_utf8,
    secret_simple,
    secret_value_styles,
    unrecognized_passthrough,
}

fn run_test(name: &str) {
    let rootdir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let test_data_dir = rootdir.join("src/process_manifests/tests/testdata");

    let test_file = test_data_dir.join(format!("tests/{}.yaml", name));
    let expected_file = test_data_dir.join(format!("expected/{}.yaml", name));
    let actual_dir = test_data_dir.join("actual");
    let actual_file = actual_dir.join(format!("{}.yaml", name));

    let test = fs::read_to_string(&test_file).unwrap();

    let result = process_manifests_str(&test);
    let actual = format_result(result);

    fs::create_dir_all(actual_dir).unwrap();
    fs::write(actual_file, &actual).unwrap();

    let expected = fs::read_to_string(expected_file).unwrap();
    assert_eq!(expected, actual);
}

fn format_result(result: Result<String, Error>) -> String {
    let mut string = String::new();

    string.push_str("ERROR: ");
    let output = match result {
        Ok(output) => output,
        Err(err) => {
            string.push_str(&format!("{:#}", err));
            return string;
        }
    };

    string.push_str("<None>\n");
    string.push_str("OUTPUT:\n");
    string.push_str(&output);
    string
}

#[test]
fn document_count_is_preserved() {
    let input = "a: 1\n---\nb: &x 2\nc: *x\n---\n[1, 2]\n";
    let docs = process_manifests(input).unwrap();
    assert_eq!(docs.len(), 3);
    assert!(docs.iter().all(|doc| matches!(doc.body, DocumentBody::Tree(_))));
}

#[test]
fn anchored_data_is_decoded() {
    let input = "kind: Secret\napiVersion: v1\ndata: &d\n  user: dXNlcg==\ncopy: *d\n";
    let output = process_manifests_str(input).unwrap();
    assert_eq!(output, "kind: Secret\napiVersion: v1\nstringData: &d\n  user: user\ncopy: *d\n");
}

#[test]
fn scan_error_is_fatal() {
    let err = process_manifests_str("key: \"unterminated\n").unwrap_err();
    assert!(format!("{:#}", err).starts_with("error parsing input: error parsing YAML"));
}
