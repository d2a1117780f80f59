//! CLI integration tests for the jsonapi-codec binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("jsonapi-codec"))
}

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const CLEAN_DOCUMENT: &str = r#"{
    "data": {
        "id": "1",
        "type": "movies",
        "attributes": {"title": "Star Wars", "year": 1977},
        "relationships": {
            "directors": {"data": [{"id": "3", "type": "directors"}]}
        }
    },
    "included": [
        {"id": "3", "type": "directors", "attributes": {"name": "George Lucas"}}
    ]
}"#;

mod check_command {
    use super::*;

    #[test]
    fn clean_document_passes() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", CLEAN_DOCUMENT);

        cmd()
            .args(["check", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("document passed"));
    }

    #[test]
    fn structural_errors_fail_with_exit_1() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", r#"{"data": {"id": 1}}"#);

        cmd()
            .args(["check", doc.to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("error["));
    }

    #[test]
    fn warnings_pass_unless_strict() {
        let dir = TempDir::new().unwrap();
        // Dangling reference: warning only.
        let doc = write_temp_file(
            &dir,
            "doc.json",
            r#"{
                "data": {
                    "id": "1",
                    "type": "movies",
                    "relationships": {"directors": {"data": {"id": "404", "type": "directors"}}}
                }
            }"#,
        );

        cmd()
            .args(["check", doc.to_str().unwrap()])
            .assert()
            .success();

        cmd()
            .args(["check", doc.to_str().unwrap(), "--strict"])
            .assert()
            .code(1);
    }

    #[test]
    fn json_format_emits_machine_readable_result() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", r#"{"meta": {"k": 1}}"#);

        cmd()
            .args(["check", doc.to_str().unwrap(), "--format", "json"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""code": "E002""#));
    }

    #[test]
    fn invalid_json_exits_2() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", "{not json");

        cmd()
            .args(["check", doc.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn missing_file_exits_3() {
        cmd()
            .args(["check", "no/such/file.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("cannot read"));
    }
}

mod filter_command {
    use super::*;

    #[test]
    fn prunes_attributes_to_fieldset() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", CLEAN_DOCUMENT);

        cmd()
            .args([
                "filter",
                doc.to_str().unwrap(),
                "--fields",
                "movies=title",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""attributes":{"title":"Star Wars"}"#))
            .stdout(predicate::str::contains("year").not());
    }

    #[test]
    fn filtering_included_to_nothing_suppresses_it() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", CLEAN_DOCUMENT);

        cmd()
            .args([
                "filter",
                doc.to_str().unwrap(),
                "--fields",
                "directors=",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("included").not());
    }

    #[test]
    fn writes_output_file_when_requested() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", CLEAN_DOCUMENT);
        let output = dir.path().join("filtered.json");

        cmd()
            .args([
                "filter",
                doc.to_str().unwrap(),
                "--fields",
                "movies=title",
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains(r#""title":"Star Wars""#));
    }

    #[test]
    fn pretty_output_is_indented() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", CLEAN_DOCUMENT);

        cmd()
            .args([
                "filter",
                doc.to_str().unwrap(),
                "--fields",
                "movies=title",
                "--pretty",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn malformed_fieldset_spec_exits_2() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", CLEAN_DOCUMENT);

        cmd()
            .args(["filter", doc.to_str().unwrap(), "--fields", "movies"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid fieldset"));
    }

    #[test]
    fn malformed_document_exits_2() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "doc.json", r#"{"meta": {}}"#);

        cmd()
            .args(["filter", doc.to_str().unwrap(), "--fields", "movies=title"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("data"));
    }
}
